use crate::{DeviceContext, GfxError, GfxResult, ShaderModuleDef};

pub(crate) struct MetalShaderModule {
    pub(crate) library: metal::Library,
}

impl MetalShaderModule {
    pub(crate) fn new(device_context: &DeviceContext, def: ShaderModuleDef<'_>) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();
        let library = device
            .new_library_with_data(def.library_bytes)
            .map_err(GfxError::ShaderCompileError)?;
        Ok(Self { library })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
