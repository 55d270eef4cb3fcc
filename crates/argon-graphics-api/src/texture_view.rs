use std::sync::Arc;

use crate::backends::BackendTextureView;
use crate::internal::residency::ResourceBindings;
use crate::{
    DeviceContext, Format, GPUViewType, GfxResult, PlaneSlice, ShaderResourceType, Texture,
    TextureType,
};

/// Used to create a `TextureView`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureViewDef {
    pub gpu_view_type: GPUViewType,
    pub view_dim: TextureType,
    /// `None` inherits the backing texture's format; typeless backings must
    /// supply a typed format here.
    pub format: Option<Format>,
    pub first_mip: u32,
    pub mip_count: u32,
    pub first_array_slice: u32,
    pub array_size: u32,
    pub plane_slice: PlaneSlice,
}

impl TextureViewDef {
    pub fn as_shader_resource_view(texture: &Texture) -> Self {
        let def = texture.definition();
        Self {
            gpu_view_type: GPUViewType::ShaderResource,
            view_dim: def.resource_type,
            format: None,
            first_mip: 0,
            mip_count: def.mip_count,
            first_array_slice: 0,
            array_size: def.array_length,
            plane_slice: PlaneSlice::Default,
        }
    }

    pub fn as_render_target_view(texture: &Texture) -> Self {
        let def = texture.definition();
        Self {
            gpu_view_type: GPUViewType::RenderTarget,
            view_dim: def.resource_type,
            format: None,
            first_mip: 0,
            mip_count: 1,
            first_array_slice: 0,
            array_size: 1,
            plane_slice: PlaneSlice::Default,
        }
    }

    pub fn as_depth_stencil_view(texture: &Texture) -> Self {
        let def = texture.definition();
        Self {
            gpu_view_type: GPUViewType::DepthStencil,
            view_dim: def.resource_type,
            format: None,
            first_mip: 0,
            mip_count: 1,
            first_array_slice: 0,
            array_size: 1,
            plane_slice: PlaneSlice::Default,
        }
    }

    pub fn verify(&self, texture: &Texture) {
        let texture_def = texture.definition();

        // A view may not change the dimensionality of its backing resource.
        assert_eq!(self.view_dim, texture_def.resource_type);

        assert!(self.mip_count >= 1);
        assert!(self.first_mip + self.mip_count <= texture_def.mip_count);
        assert!(self.first_array_slice + self.array_size <= texture_def.array_length);

        if texture_def.format.is_typeless() {
            assert!(self.format.is_some());
        }

        match self.gpu_view_type {
            GPUViewType::ShaderResource => {
                assert!(texture_def
                    .usage_flags
                    .intersects(crate::ResourceUsage::AS_SHADER_RESOURCE));
            }
            GPUViewType::UnorderedAccess => {
                assert!(texture_def
                    .usage_flags
                    .intersects(crate::ResourceUsage::AS_UNORDERED_ACCESS));
                assert_eq!(self.mip_count, 1);
            }
            GPUViewType::RenderTarget => {
                assert!(texture_def
                    .usage_flags
                    .intersects(crate::ResourceUsage::AS_RENDER_TARGET));
                assert_eq!(self.mip_count, 1);
            }
            GPUViewType::DepthStencil => {
                assert!(texture_def
                    .usage_flags
                    .intersects(crate::ResourceUsage::AS_DEPTH_STENCIL));
                assert_eq!(self.mip_count, 1);
            }
            GPUViewType::ConstantBuffer => panic!("constant-buffer view of a texture"),
        }
    }
}

pub(crate) struct TextureViewInner {
    pub(crate) definition: TextureViewDef,
    // keeps the backing texture alive for the view's whole lifetime
    pub(crate) texture: Texture,
    pub(crate) uid: u64,
    pub(crate) bindings: ResourceBindings,
    pub(crate) backend_texture_view: BackendTextureView,
}

impl Drop for TextureViewInner {
    fn drop(&mut self) {
        self.bindings.purge(self.uid);
        self.backend_texture_view
            .destroy(self.texture.device_context());
    }
}

#[derive(Clone)]
pub struct TextureView {
    pub(crate) inner: Arc<TextureViewInner>,
}

impl std::fmt::Debug for TextureView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureView").finish()
    }
}

impl PartialEq for TextureView {
    fn eq(&self, other: &Self) -> bool {
        self.inner.uid == other.inner.uid
    }
}

impl TextureView {
    pub(crate) fn new(texture: &Texture, view_def: &TextureViewDef) -> GfxResult<Self> {
        view_def.verify(texture);
        let backend_texture_view = BackendTextureView::new(texture, view_def)?;

        Ok(Self {
            inner: Arc::new(TextureViewInner {
                definition: *view_def,
                texture: texture.clone(),
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_texture_view,
            }),
        })
    }

    pub fn definition(&self) -> &TextureViewDef {
        &self.inner.definition
    }

    pub fn texture(&self) -> &Texture {
        &self.inner.texture
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }

    pub fn format(&self) -> Format {
        self.inner
            .definition
            .format
            .unwrap_or_else(|| self.inner.texture.format())
    }

    pub fn sample_count(&self) -> crate::SampleCount {
        self.inner.texture.definition().sample_count
    }

    pub(crate) fn is_compatible_with_descriptor(&self, descriptor_type: ShaderResourceType) -> bool {
        match descriptor_type {
            ShaderResourceType::Texture2D
            | ShaderResourceType::Texture3D
            | ShaderResourceType::Texture2DArray
            | ShaderResourceType::TextureCube
            | ShaderResourceType::TextureCubeArray => {
                self.inner.definition.gpu_view_type == GPUViewType::ShaderResource
            }
            ShaderResourceType::RWTexture2D
            | ShaderResourceType::RWTexture2DArray
            | ShaderResourceType::RWTexture3D => {
                self.inner.definition.gpu_view_type == GPUViewType::UnorderedAccess
            }
            _ => false,
        }
    }
}
