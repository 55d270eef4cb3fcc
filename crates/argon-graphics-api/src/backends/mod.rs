#[cfg(all(feature = "metal", target_os = "macos"))]
pub mod metal;
#[cfg(all(feature = "metal", target_os = "macos"))]
pub(crate) use metal::backend_impl::*;

/// No-op implementation of all types. Unlike a stub, it keeps the frontend
/// fully functional (allocation, index math, ring claims, state machine), so
/// the recording layer runs and tests on platforms without the GPU stack.
#[cfg(not(all(feature = "metal", target_os = "macos")))]
pub mod null;
#[cfg(not(all(feature = "metal", target_os = "macos")))]
pub(crate) use null::backend_impl::*;
