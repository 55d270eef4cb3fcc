use crate::backends::BackendSwapchain;
use crate::{
    DeviceContext, Format, GfxResult, Semaphore, Texture, TextureView, SWAPCHAIN_IMAGE_COUNT,
};

/// Used to create a `Swapchain`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainDef {
    pub width: u32,
    pub height: u32,
    pub enable_vsync: bool,
}

/// One drawable of the swapchain ring.
#[derive(Clone)]
pub struct SwapchainImage {
    pub texture: Texture,
    pub render_target_view: TextureView,
    pub image_index: u32,
}

/// A fixed ring of drawable surfaces (hardware maximum of three).
///
/// `acquire_next_image` returns the next ring slot immediately; the caller's
/// semaphore only signals once the GPU processes the throwaway buffer that
/// encodes the signal. The returned index and the semaphore are decoupled
/// events, with the semaphore as the true readiness gate.
pub struct Swapchain {
    device_context: DeviceContext,
    swapchain_def: SwapchainDef,
    next_image_index: u32,
    pub(crate) backend_swapchain: BackendSwapchain,
}

impl Swapchain {
    pub(crate) fn new(
        device_context: &DeviceContext,
        raw_window_handle: &dyn raw_window_handle::HasRawWindowHandle,
        swapchain_def: &SwapchainDef,
    ) -> GfxResult<Self> {
        let backend_swapchain =
            BackendSwapchain::new(device_context, raw_window_handle, swapchain_def)?;

        Ok(Self {
            device_context: device_context.clone(),
            swapchain_def: *swapchain_def,
            next_image_index: 0,
            backend_swapchain,
        })
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.device_context
    }

    pub fn definition(&self) -> &SwapchainDef {
        &self.swapchain_def
    }

    pub fn image_count(&self) -> u32 {
        SWAPCHAIN_IMAGE_COUNT
    }

    pub fn format(&self) -> Format {
        self.backend_format()
    }

    /// Recreates the drawable ring, usually after a window resize. Resets
    /// the ring cursor; any previously acquired indices are stale.
    pub fn rebuild(&mut self, swapchain_def: &SwapchainDef) -> GfxResult<()> {
        self.backend_rebuild(swapchain_def)?;
        self.swapchain_def = *swapchain_def;
        self.next_image_index = 0;
        Ok(())
    }

    /// Requests the next drawable. The ring index is returned synchronously
    /// and cycles modulo the image count; `signal_semaphore` signals
    /// GPU-side once the drawable is actually ready.
    pub fn acquire_next_image(&mut self, signal_semaphore: &Semaphore) -> GfxResult<SwapchainImage> {
        let image_index = self.next_image_index;
        self.next_image_index = (self.next_image_index + 1) % SWAPCHAIN_IMAGE_COUNT;

        signal_semaphore.set_signal_available(true);
        self.backend_acquire_next_image(image_index, signal_semaphore)
    }
}

// the null backend ignores the window handle, so these run on any host
// where it is the selected backend
#[cfg(test)]
#[cfg(not(all(feature = "metal", target_os = "macos")))]
mod tests {
    use super::*;
    use crate::{ApiDef, GfxApi};

    struct TestWindow;

    #[allow(unsafe_code)]
    unsafe impl raw_window_handle::HasRawWindowHandle for TestWindow {
        #[cfg(target_os = "macos")]
        fn raw_window_handle(&self) -> raw_window_handle::RawWindowHandle {
            raw_window_handle::RawWindowHandle::MacOS(
                raw_window_handle::macos::MacOSHandle::empty(),
            )
        }

        #[cfg(target_os = "windows")]
        fn raw_window_handle(&self) -> raw_window_handle::RawWindowHandle {
            raw_window_handle::RawWindowHandle::Windows(
                raw_window_handle::windows::WindowsHandle::empty(),
            )
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        fn raw_window_handle(&self) -> raw_window_handle::RawWindowHandle {
            raw_window_handle::RawWindowHandle::Xlib(raw_window_handle::unix::XlibHandle::empty())
        }
    }

    #[test]
    fn ring_index_cycles_without_presenting() {
        #[allow(unsafe_code)]
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let mut swapchain = device_context
            .create_swapchain(
                &TestWindow,
                &SwapchainDef {
                    width: 128,
                    height: 128,
                    enable_vsync: true,
                },
            )
            .unwrap();
        let semaphore = device_context.create_semaphore().unwrap();

        let mut indices = Vec::new();
        for _ in 0..4 {
            let image = swapchain.acquire_next_image(&semaphore).unwrap();
            indices.push(image.image_index);
        }
        assert_eq!(indices, vec![0, 1, 2, 0]);

        // the ring keeps cycling past the wrap
        let next = swapchain.acquire_next_image(&semaphore).unwrap();
        assert_eq!(next.image_index, 1);
    }

    #[test]
    fn rebuild_resets_the_ring() {
        #[allow(unsafe_code)]
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let mut swapchain = device_context
            .create_swapchain(
                &TestWindow,
                &SwapchainDef {
                    width: 64,
                    height: 64,
                    enable_vsync: true,
                },
            )
            .unwrap();
        let semaphore = device_context.create_semaphore().unwrap();

        let _ = swapchain.acquire_next_image(&semaphore).unwrap();
        let _ = swapchain.acquire_next_image(&semaphore).unwrap();

        swapchain
            .rebuild(&SwapchainDef {
                width: 256,
                height: 256,
                enable_vsync: true,
            })
            .unwrap();
        assert_eq!(swapchain.definition().width, 256);

        let image = swapchain.acquire_next_image(&semaphore).unwrap();
        assert_eq!(image.image_index, 0);
    }
}
