use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::backends::BackendSemaphore;
use crate::{DeviceContext, GfxResult};

pub(crate) struct SemaphoreInner {
    device_context: DeviceContext,

    // Set to true when an operation is scheduled to signal this semaphore
    // Cleared when an operation is scheduled to consume this semaphore
    signal_available: AtomicBool,

    /// Monotonically increasing event value; each GPU-side signal bumps it.
    value: AtomicU64,

    pub(crate) backend_semaphore: BackendSemaphore,
}

impl Drop for SemaphoreInner {
    fn drop(&mut self) {
        self.backend_semaphore.destroy(&self.device_context);
    }
}

/// Cross-queue/GPU synchronization primitive backed by a monotonically
/// increasing event value.
#[derive(Clone)]
pub struct Semaphore {
    pub(crate) inner: Arc<SemaphoreInner>,
}

impl Semaphore {
    pub fn new(device_context: &DeviceContext) -> GfxResult<Self> {
        let backend_semaphore = BackendSemaphore::new(device_context)?;
        Ok(Self {
            inner: Arc::new(SemaphoreInner {
                device_context: device_context.clone(),
                signal_available: AtomicBool::new(false),
                value: AtomicU64::new(0),
                backend_semaphore,
            }),
        })
    }

    pub fn signal_available(&self) -> bool {
        self.inner.signal_available.load(Ordering::Relaxed)
    }

    pub(crate) fn set_signal_available(&self, available: bool) {
        self.inner
            .signal_available
            .store(available, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.inner.value.load(Ordering::Acquire)
    }

    /// The value a pending GPU-side signal will write.
    pub(crate) fn next_value(&self) -> u64 {
        self.value() + 1
    }

    /// Called once the GPU-side signal has actually executed.
    pub(crate) fn signal_from_callback(&self, value: u64) {
        self.inner.value.fetch_max(value, Ordering::AcqRel);
    }
}
