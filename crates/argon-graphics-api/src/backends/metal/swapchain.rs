use std::sync::atomic::Ordering;

use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};

use crate::{
    DeviceContext, Extents3D, Format, GfxError, GfxResult, ResourceUsage, Semaphore, Swapchain,
    SwapchainDef, SwapchainImage, TextureDef, TextureViewDef, SWAPCHAIN_IMAGE_COUNT,
};

use super::conversions;

/// Window surface plus the offscreen drawable ring the caller renders into.
/// The ring keeps acquire free of layer back-pressure; presentation blits
/// the ring image into whatever drawable the layer hands out.
pub(crate) struct MetalSwapchain {
    pub(crate) layer: metal::MetalLayer,
    pub(crate) format: Format,
    pub(crate) images: Vec<SwapchainImage>,
}

impl MetalSwapchain {
    pub(crate) fn new(
        device_context: &DeviceContext,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &SwapchainDef,
    ) -> GfxResult<Self> {
        let layer = match raw_window_handle.raw_window_handle() {
            RawWindowHandle::MacOS(handle) => {
                match unsafe { raw_window_metal::macos::metal_layer_from_handle(handle) } {
                    raw_window_metal::Layer::Existing(layer)
                    | raw_window_metal::Layer::Allocated(layer) => unsafe {
                        std::mem::transmute::<*mut objc::runtime::Object, &metal::MetalLayerRef>(
                            layer,
                        )
                        .to_owned()
                    },
                    raw_window_metal::Layer::None => {
                        return Err(GfxError::from("could not attach a layer to the window"))
                    }
                }
            }
            _ => return Err(GfxError::from("unsupported window handle kind")),
        };

        let device = device_context.inner.backend_device_context.device();
        layer.set_device(device);
        layer.set_pixel_format(metal::MTLPixelFormat::BGRA8Unorm);
        layer.set_presents_with_transaction(false);
        layer.set_display_sync_enabled(swapchain_def.enable_vsync);
        layer.set_drawable_size(metal::CGSize::new(
            f64::from(swapchain_def.width),
            f64::from(swapchain_def.height),
        ));

        let format = conversions::format(layer.pixel_format());
        Ok(Self {
            layer,
            format,
            images: Self::create_images(device_context, swapchain_def, format)?,
        })
    }

    fn create_images(
        device_context: &DeviceContext,
        swapchain_def: &SwapchainDef,
        format: Format,
    ) -> GfxResult<Vec<SwapchainImage>> {
        (0..SWAPCHAIN_IMAGE_COUNT)
            .map(|image_index| {
                let texture = device_context.create_texture(&TextureDef {
                    extents: Extents3D {
                        width: swapchain_def.width,
                        height: swapchain_def.height,
                        depth: 1,
                    },
                    format,
                    usage_flags: ResourceUsage::AS_RENDER_TARGET | ResourceUsage::AS_TRANSFERABLE,
                    ..TextureDef::default()
                })?;
                let render_target_view =
                    texture.create_view(&TextureViewDef::as_render_target_view(&texture))?;
                Ok(SwapchainImage {
                    texture,
                    render_target_view,
                    image_index,
                })
            })
            .collect()
    }
}

impl Swapchain {
    pub(crate) fn backend_format(&self) -> Format {
        self.backend_swapchain.format
    }

    pub(crate) fn backend_rebuild(&mut self, swapchain_def: &SwapchainDef) -> GfxResult<()> {
        let device_context = self.device_context().clone();
        let format = self.backend_swapchain.format;
        self.backend_swapchain.layer.set_drawable_size(metal::CGSize::new(
            f64::from(swapchain_def.width),
            f64::from(swapchain_def.height),
        ));
        self.backend_swapchain.images =
            MetalSwapchain::create_images(&device_context, swapchain_def, format)?;
        Ok(())
    }

    /// Ring images are always reusable by the time the caller cycles back to
    /// them, so the acquire signals from the CPU; drawable availability is
    /// dealt with at present time instead.
    pub(crate) fn backend_acquire_next_image(
        &mut self,
        image_index: u32,
        signal_semaphore: &Semaphore,
    ) -> GfxResult<SwapchainImage> {
        let value = signal_semaphore.next_value();
        let backend = &signal_semaphore.inner.backend_semaphore;
        backend.target.store(value, Ordering::Release);
        backend.event.set_signaled_value(value);
        signal_semaphore.signal_from_callback(value);
        Ok(self.backend_swapchain.images[image_index as usize].clone())
    }
}
