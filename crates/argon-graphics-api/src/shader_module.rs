use std::sync::Arc;

use crate::backends::BackendShaderModule;
use crate::{DeviceContext, GfxResult};

/// Used to create a `ShaderModule`. Shaders are compiled offline into the
/// platform's native shader-library format; this crate only loads the blob.
#[derive(Clone, Copy, Debug)]
pub struct ShaderModuleDef<'a> {
    pub library_bytes: &'a [u8],
}

pub(crate) struct ShaderModuleInner {
    device_context: DeviceContext,
    pub(crate) backend_shader_module: BackendShaderModule,
}

impl Drop for ShaderModuleInner {
    fn drop(&mut self) {
        self.backend_shader_module.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct ShaderModule {
    pub(crate) inner: Arc<ShaderModuleInner>,
}

impl ShaderModule {
    pub fn new(device_context: &DeviceContext, def: ShaderModuleDef<'_>) -> GfxResult<Self> {
        let backend_shader_module = BackendShaderModule::new(device_context, def)?;
        Ok(Self {
            inner: Arc::new(ShaderModuleInner {
                device_context: device_context.clone(),
                backend_shader_module,
            }),
        })
    }
}
