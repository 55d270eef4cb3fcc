use std::sync::atomic::AtomicU64;

use crate::{DeviceContext, GfxResult};

/// Timeline-style semaphore backed by a shared event. `target` is the value
/// the most recent submission will signal; waits encode against it.
pub(crate) struct MetalSemaphore {
    pub(crate) event: metal::SharedEvent,
    pub(crate) target: AtomicU64,
}

impl MetalSemaphore {
    pub(crate) fn new(device_context: &DeviceContext) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();
        Ok(Self {
            event: device.new_shared_event(),
            target: AtomicU64::new(0),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
