use metal::{MTLTextureUsage, NSRange};

use crate::{
    DeviceContext, GfxError, GfxResult, Heap, ResourceUsage, Texture, TextureDef, TextureType,
    TextureViewDef,
};

use super::conversions;

pub(crate) struct MetalTexture {
    pub(crate) texture: metal::Texture,
}

fn texture_descriptor(texture_def: &TextureDef) -> metal::TextureDescriptor {
    let descriptor = metal::TextureDescriptor::new();
    descriptor.set_texture_type(conversions::texture_type(
        texture_def.resource_type,
        texture_def.sample_count,
    ));
    descriptor.set_pixel_format(conversions::pixel_format(texture_def.format));
    descriptor.set_width(u64::from(texture_def.extents.width));
    descriptor.set_height(u64::from(texture_def.extents.height));
    descriptor.set_depth(u64::from(texture_def.extents.depth));
    descriptor.set_mipmap_level_count(u64::from(texture_def.mip_count));
    descriptor.set_sample_count(u64::from(texture_def.sample_count.as_u32()));

    // native array length counts whole cubes, not faces
    let array_length = match texture_def.resource_type {
        TextureType::Cube => 1,
        TextureType::CubeArray => u64::from(texture_def.array_length) / 6,
        _ => u64::from(texture_def.array_length),
    };
    descriptor.set_array_length(array_length);

    let mut usage = MTLTextureUsage::empty();
    if texture_def
        .usage_flags
        .intersects(ResourceUsage::AS_SHADER_RESOURCE)
    {
        usage |= MTLTextureUsage::ShaderRead;
    }
    if texture_def
        .usage_flags
        .intersects(ResourceUsage::AS_UNORDERED_ACCESS)
    {
        usage |= MTLTextureUsage::ShaderWrite | MTLTextureUsage::ShaderRead;
    }
    if texture_def
        .usage_flags
        .intersects(ResourceUsage::AS_RENDER_TARGET | ResourceUsage::AS_DEPTH_STENCIL)
    {
        usage |= MTLTextureUsage::RenderTarget;
    }
    if texture_def.format.is_typeless() {
        usage |= MTLTextureUsage::PixelFormatView;
    }
    descriptor.set_usage(usage);
    descriptor.set_storage_mode(conversions::storage_mode(texture_def.memory_usage));

    descriptor
}

impl MetalTexture {
    pub(crate) fn new(device_context: &DeviceContext, texture_def: &TextureDef) -> GfxResult<Self> {
        let descriptor = texture_descriptor(texture_def);
        let device = device_context.inner.backend_device_context.device();
        Ok(Self {
            texture: device.new_texture(&descriptor),
        })
    }

    pub(crate) fn new_placed(heap: &Heap, texture_def: &TextureDef) -> GfxResult<Self> {
        let descriptor = texture_descriptor(texture_def);
        // placed resources inherit the heap's storage mode
        descriptor.set_storage_mode(conversions::storage_mode(heap.definition().memory_usage));
        let texture = heap
            .inner
            .backend_heap
            .heap
            .new_texture(&descriptor)
            .ok_or_else(|| GfxError::from("heap has insufficient space for texture"))?;
        Ok(Self { texture })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

pub(crate) struct MetalTextureView {
    pub(crate) texture: metal::Texture,
}

impl MetalTextureView {
    pub(crate) fn new(texture: &Texture, view_def: &TextureViewDef) -> GfxResult<Self> {
        let texture_def = texture.definition();
        let format = view_def.format.unwrap_or(texture_def.format);

        let view = texture.inner.backend_texture.texture.new_texture_view_from_slice(
            conversions::pixel_format(format),
            conversions::texture_type(view_def.view_dim, texture_def.sample_count),
            NSRange::new(u64::from(view_def.first_mip), u64::from(view_def.mip_count)),
            NSRange::new(
                u64::from(view_def.first_array_slice),
                u64::from(view_def.array_size),
            ),
        );
        Ok(Self { texture: view })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
