use std::sync::Arc;

use crate::backends::BackendTexture;
use crate::internal::residency::ResourceBindings;
use crate::{
    DeviceContext, Extents3D, Format, GfxResult, MemoryUsage, ResourceUsage, SampleCount,
    TextureType, TextureView, TextureViewDef,
};

/// Used to create a `Texture`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureDef {
    pub extents: Extents3D,
    pub array_length: u32,
    pub mip_count: u32,
    pub format: Format,
    pub usage_flags: ResourceUsage,
    pub memory_usage: MemoryUsage,
    pub resource_type: TextureType,
    pub sample_count: SampleCount,
}

impl Default for TextureDef {
    fn default() -> Self {
        Self {
            extents: Extents3D {
                width: 0,
                height: 0,
                depth: 1,
            },
            array_length: 1,
            mip_count: 1,
            format: Format::UNDEFINED,
            usage_flags: ResourceUsage::empty(),
            memory_usage: MemoryUsage::GpuOnly,
            resource_type: TextureType::_2D,
            sample_count: SampleCount::SampleCount1,
        }
    }
}

impl TextureDef {
    pub fn verify(&self) {
        assert!(self.extents.width > 0);
        assert!(self.extents.height > 0);
        assert!(self.extents.depth > 0);
        assert!(self.array_length > 0);
        assert!(self.mip_count > 0);
        assert_ne!(self.format, Format::UNDEFINED);
        assert!(!self
            .usage_flags
            .intersects(ResourceUsage::BUFFER_ONLY_USAGE_FLAGS));

        if self.resource_type == TextureType::Cube {
            assert_eq!(self.array_length % 6, 0);
        }
        if self.usage_flags.intersects(ResourceUsage::AS_DEPTH_STENCIL) {
            assert!(self.format.is_depth());
        }
        if self.sample_count != SampleCount::SampleCount1 {
            // multisampled textures cannot be mipmapped
            assert_eq!(self.mip_count, 1);
        }
    }

    pub fn is_render_target(&self) -> bool {
        self.usage_flags
            .intersects(ResourceUsage::AS_RENDER_TARGET | ResourceUsage::AS_DEPTH_STENCIL)
    }
}

pub(crate) struct TextureInner {
    pub(crate) device_context: DeviceContext,
    pub(crate) texture_def: TextureDef,
    pub(crate) uid: u64,
    pub(crate) bindings: ResourceBindings,
    pub(crate) backend_texture: BackendTexture,
}

impl Drop for TextureInner {
    fn drop(&mut self) {
        self.bindings.purge(self.uid);
        self.backend_texture.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct Texture {
    pub(crate) inner: Arc<TextureInner>,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture").finish()
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.inner.uid == other.inner.uid
    }
}

impl Texture {
    pub fn new(device_context: &DeviceContext, texture_def: &TextureDef) -> GfxResult<Self> {
        texture_def.verify();
        let backend_texture = BackendTexture::new(device_context, texture_def)?;
        Ok(Self::from_backend(device_context, texture_def, backend_texture))
    }

    pub(crate) fn from_backend(
        device_context: &DeviceContext,
        texture_def: &TextureDef,
        backend_texture: BackendTexture,
    ) -> Self {
        Self {
            inner: Arc::new(TextureInner {
                device_context: device_context.clone(),
                texture_def: *texture_def,
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_texture,
            }),
        }
    }

    pub fn definition(&self) -> &TextureDef {
        &self.inner.texture_def
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }

    pub fn extents(&self) -> &Extents3D {
        &self.inner.texture_def.extents
    }

    pub fn format(&self) -> Format {
        self.inner.texture_def.format
    }

    pub fn create_view(&self, view_def: &TextureViewDef) -> GfxResult<TextureView> {
        TextureView::new(self, view_def)
    }
}
