use std::sync::Arc;

use crate::backends::BackendApi;
use crate::{DeviceContext, GfxResult};

/// Used to create a `GfxApi`.
#[derive(Default, Clone, Debug)]
pub struct ApiDef {
    /// Name reported to the platform for debugging/captures.
    pub app_name: String,
    /// Render-frame overlap the caller intends to run with. Sized against
    /// the argument-buffer ring; purely advisory, see
    /// `DESCRIPTOR_RING_BUFFER_SIZE`.
    pub num_frames_in_flight: u32,
}

pub struct GfxApi {
    device_context: Option<DeviceContext>,

    #[allow(dead_code)]
    pub(crate) backend_api: BackendApi,
}

impl Drop for GfxApi {
    fn drop(&mut self) {
        self.destroy().unwrap();
    }
}

impl GfxApi {
    /// # Safety
    ///
    /// GPU programming is fundamentally unsafe, so all APIs that interact
    /// with the GPU should be considered unsafe. However, APIs are only
    /// gated by unsafe if they can cause undefined behavior on the CPU for
    /// reasons other than interacting with the GPU.
    #[allow(unsafe_code)]
    pub unsafe fn new(api_def: &ApiDef) -> GfxResult<Self> {
        let backend_api = BackendApi::new(api_def)?;
        let device_context = DeviceContext::new(&backend_api, api_def)?;

        Ok(Self {
            device_context: Some(device_context),
            backend_api,
        })
    }

    fn destroy(&mut self) -> GfxResult<()> {
        if let Some(device_context) = self.device_context.take() {
            let inner = device_context.inner.clone();
            std::mem::drop(device_context);

            let strong_count = Arc::strong_count(&inner);
            match Arc::try_unwrap(inner) {
                Ok(inner) => std::mem::drop(inner),
                Err(_arc) => {
                    return Err(format!(
                        "Could not destroy device, {} references to it exist",
                        strong_count
                    )
                    .into());
                }
            }
        }

        Ok(())
    }

    pub fn device_context(&self) -> &DeviceContext {
        self.device_context.as_ref().unwrap()
    }
}
