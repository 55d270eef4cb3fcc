use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::{DeviceContext, FenceStatus};

struct FenceInner {
    device_context: DeviceContext,
    // Set to true when an operation is scheduled to signal this fence
    // Cleared when an operation is scheduled to consume this fence
    submitted: AtomicBool,
    signaled: Mutex<bool>,
    condvar: Condvar,
}

/// Binary CPU/GPU fence. Signaled from the driver's completion-callback
/// thread when a submission finishes; waiting blocks the calling thread
/// unboundedly. The callback only touches the small self-contained state
/// behind the inner `Arc`, never recorder-owned state.
#[derive(Clone)]
pub struct Fence {
    inner: Arc<FenceInner>,
}

impl Fence {
    pub fn new(device_context: &DeviceContext) -> Self {
        Self {
            inner: Arc::new(FenceInner {
                device_context: device_context.clone(),
                submitted: AtomicBool::new(false),
                signaled: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn submitted(&self) -> bool {
        self.inner.submitted.load(Ordering::Relaxed)
    }

    pub(crate) fn set_submitted(&self, submitted: bool) {
        self.inner.submitted.store(submitted, Ordering::Relaxed);
        if submitted {
            *self.inner.signaled.lock().unwrap() = false;
        }
    }

    /// Called from the submission completion handler.
    pub(crate) fn signal_from_callback(&self) {
        let mut signaled = self.inner.signaled.lock().unwrap();
        *signaled = true;
        self.inner.condvar.notify_all();
    }

    /// Blocks until the submitted work completes. Returns immediately for a
    /// fence that was never submitted.
    pub fn wait(&self) {
        if !self.submitted() {
            return;
        }
        let mut signaled = self.inner.signaled.lock().unwrap();
        while !*signaled {
            signaled = self.inner.condvar.wait(signaled).unwrap();
        }
        drop(signaled);
        self.set_submitted(false);
    }

    pub fn get_fence_status(&self) -> FenceStatus {
        if !self.submitted() {
            FenceStatus::Unsubmitted
        } else if *self.inner.signaled.lock().unwrap() {
            self.set_submitted(false);
            FenceStatus::Complete
        } else {
            FenceStatus::Incomplete
        }
    }
}
