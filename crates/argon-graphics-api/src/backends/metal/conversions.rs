//! Translation of the abstract enums onto their native equivalents. All
//! conversions are total; formats without a native sibling map to `Invalid`
//! and fail at resource creation rather than here.

use metal::{
    MTLBlendFactor, MTLBlendOperation, MTLColorWriteMask, MTLCompareFunction, MTLCullMode,
    MTLIndexType, MTLLoadAction, MTLPixelFormat, MTLPrimitiveTopologyClass, MTLPrimitiveType,
    MTLResourceOptions, MTLSamplerAddressMode, MTLSamplerMinMagFilter, MTLSamplerMipFilter,
    MTLStencilOperation, MTLStorageMode, MTLStoreAction, MTLTextureType, MTLTriangleFillMode,
    MTLVertexFormat, MTLVertexStepFunction, MTLWinding,
};

use crate::{
    AddressMode, BlendFactor, BlendOp, CompareOp, CullMode, FillMode, FilterType, Format,
    FrontFace, IndexType, LoadOp, MemoryUsage, MipMapMode, PrimitiveTopology, SampleCount,
    ShaderResourceType, StencilOp, StoreOp, TextureType, VertexAttributeRate,
};

/// Typeless formats collapse onto the native format of their typed sibling;
/// the mapping is deliberately lossy in that direction.
pub(crate) fn pixel_format(format: Format) -> MTLPixelFormat {
    match format.typeless_canonical() {
        Format::UNDEFINED => MTLPixelFormat::Invalid,
        Format::R8_UNORM => MTLPixelFormat::R8Unorm,
        Format::R8_SNORM => MTLPixelFormat::R8Snorm,
        Format::R8_UINT => MTLPixelFormat::R8Uint,
        Format::R8_SINT => MTLPixelFormat::R8Sint,
        Format::R8G8_UNORM => MTLPixelFormat::RG8Unorm,
        Format::R8G8_SNORM => MTLPixelFormat::RG8Snorm,
        Format::R8G8_UINT => MTLPixelFormat::RG8Uint,
        Format::R8G8_SINT => MTLPixelFormat::RG8Sint,
        Format::R8G8B8A8_UNORM => MTLPixelFormat::RGBA8Unorm,
        Format::R8G8B8A8_SNORM => MTLPixelFormat::RGBA8Snorm,
        Format::R8G8B8A8_UINT => MTLPixelFormat::RGBA8Uint,
        Format::R8G8B8A8_SINT => MTLPixelFormat::RGBA8Sint,
        Format::R8G8B8A8_SRGB => MTLPixelFormat::RGBA8Unorm_sRGB,
        Format::B8G8R8A8_UNORM => MTLPixelFormat::BGRA8Unorm,
        Format::B8G8R8A8_SRGB => MTLPixelFormat::BGRA8Unorm_sRGB,
        Format::R16_UNORM => MTLPixelFormat::R16Unorm,
        Format::R16_SNORM => MTLPixelFormat::R16Snorm,
        Format::R16_UINT => MTLPixelFormat::R16Uint,
        Format::R16_SINT => MTLPixelFormat::R16Sint,
        Format::R16_SFLOAT => MTLPixelFormat::R16Float,
        Format::R16G16_UNORM => MTLPixelFormat::RG16Unorm,
        Format::R16G16_SNORM => MTLPixelFormat::RG16Snorm,
        Format::R16G16_UINT => MTLPixelFormat::RG16Uint,
        Format::R16G16_SINT => MTLPixelFormat::RG16Sint,
        Format::R16G16_SFLOAT => MTLPixelFormat::RG16Float,
        Format::R16G16B16A16_UNORM => MTLPixelFormat::RGBA16Unorm,
        Format::R16G16B16A16_SNORM => MTLPixelFormat::RGBA16Snorm,
        Format::R16G16B16A16_UINT => MTLPixelFormat::RGBA16Uint,
        Format::R16G16B16A16_SINT => MTLPixelFormat::RGBA16Sint,
        Format::R16G16B16A16_SFLOAT => MTLPixelFormat::RGBA16Float,
        Format::R32_UINT => MTLPixelFormat::R32Uint,
        Format::R32_SINT => MTLPixelFormat::R32Sint,
        Format::R32_SFLOAT => MTLPixelFormat::R32Float,
        Format::R32G32_UINT => MTLPixelFormat::RG32Uint,
        Format::R32G32_SINT => MTLPixelFormat::RG32Sint,
        Format::R32G32_SFLOAT => MTLPixelFormat::RG32Float,
        Format::R32G32B32A32_UINT => MTLPixelFormat::RGBA32Uint,
        Format::R32G32B32A32_SINT => MTLPixelFormat::RGBA32Sint,
        Format::R32G32B32A32_SFLOAT => MTLPixelFormat::RGBA32Float,
        Format::R10G10B10A2_UNORM => MTLPixelFormat::RGB10A2Unorm,
        Format::R11G11B10_UFLOAT => MTLPixelFormat::RG11B10Float,
        Format::D16_UNORM => MTLPixelFormat::Depth16Unorm,
        Format::D32_SFLOAT => MTLPixelFormat::Depth32Float,
        Format::D24_UNORM_S8_UINT => MTLPixelFormat::Depth24Unorm_Stencil8,
        Format::D32_SFLOAT_S8_UINT => MTLPixelFormat::Depth32Float_Stencil8,
        Format::BC1_RGBA_UNORM_BLOCK => MTLPixelFormat::BC1_RGBA,
        Format::BC1_RGBA_SRGB_BLOCK => MTLPixelFormat::BC1_RGBA_sRGB,
        Format::BC3_UNORM_BLOCK => MTLPixelFormat::BC3_RGBA,
        Format::BC3_SRGB_BLOCK => MTLPixelFormat::BC3_RGBA_sRGB,
        Format::BC4_UNORM_BLOCK => MTLPixelFormat::BC4_RUnorm,
        Format::BC5_UNORM_BLOCK => MTLPixelFormat::BC5_RGUnorm,
        Format::BC7_UNORM_BLOCK => MTLPixelFormat::BC7_RGBAUnorm,
        Format::BC7_SRGB_BLOCK => MTLPixelFormat::BC7_RGBAUnorm_sRGB,
        // typeless variants are canonicalized above
        Format::R8G8B8A8_TYPELESS
        | Format::B8G8R8A8_TYPELESS
        | Format::R16G16B16A16_TYPELESS
        | Format::R32_TYPELESS
        | Format::R32G32B32A32_TYPELESS => unreachable!(),
    }
}

/// Reverse of `pixel_format`. Merged formats come back as their typed
/// sibling, and natives the abstract enum never produces map to `UNDEFINED`.
pub(crate) fn format(native: MTLPixelFormat) -> Format {
    match native {
        MTLPixelFormat::R8Unorm => Format::R8_UNORM,
        MTLPixelFormat::R8Snorm => Format::R8_SNORM,
        MTLPixelFormat::R8Uint => Format::R8_UINT,
        MTLPixelFormat::R8Sint => Format::R8_SINT,
        MTLPixelFormat::RG8Unorm => Format::R8G8_UNORM,
        MTLPixelFormat::RG8Snorm => Format::R8G8_SNORM,
        MTLPixelFormat::RG8Uint => Format::R8G8_UINT,
        MTLPixelFormat::RG8Sint => Format::R8G8_SINT,
        MTLPixelFormat::RGBA8Unorm => Format::R8G8B8A8_UNORM,
        MTLPixelFormat::RGBA8Snorm => Format::R8G8B8A8_SNORM,
        MTLPixelFormat::RGBA8Uint => Format::R8G8B8A8_UINT,
        MTLPixelFormat::RGBA8Sint => Format::R8G8B8A8_SINT,
        MTLPixelFormat::RGBA8Unorm_sRGB => Format::R8G8B8A8_SRGB,
        MTLPixelFormat::BGRA8Unorm => Format::B8G8R8A8_UNORM,
        MTLPixelFormat::BGRA8Unorm_sRGB => Format::B8G8R8A8_SRGB,
        MTLPixelFormat::R16Unorm => Format::R16_UNORM,
        MTLPixelFormat::R16Snorm => Format::R16_SNORM,
        MTLPixelFormat::R16Uint => Format::R16_UINT,
        MTLPixelFormat::R16Sint => Format::R16_SINT,
        MTLPixelFormat::R16Float => Format::R16_SFLOAT,
        MTLPixelFormat::RG16Unorm => Format::R16G16_UNORM,
        MTLPixelFormat::RG16Snorm => Format::R16G16_SNORM,
        MTLPixelFormat::RG16Uint => Format::R16G16_UINT,
        MTLPixelFormat::RG16Sint => Format::R16G16_SINT,
        MTLPixelFormat::RG16Float => Format::R16G16_SFLOAT,
        MTLPixelFormat::RGBA16Unorm => Format::R16G16B16A16_UNORM,
        MTLPixelFormat::RGBA16Snorm => Format::R16G16B16A16_SNORM,
        MTLPixelFormat::RGBA16Uint => Format::R16G16B16A16_UINT,
        MTLPixelFormat::RGBA16Sint => Format::R16G16B16A16_SINT,
        MTLPixelFormat::RGBA16Float => Format::R16G16B16A16_SFLOAT,
        MTLPixelFormat::R32Uint => Format::R32_UINT,
        MTLPixelFormat::R32Sint => Format::R32_SINT,
        MTLPixelFormat::R32Float => Format::R32_SFLOAT,
        MTLPixelFormat::RG32Uint => Format::R32G32_UINT,
        MTLPixelFormat::RG32Sint => Format::R32G32_SINT,
        MTLPixelFormat::RG32Float => Format::R32G32_SFLOAT,
        MTLPixelFormat::RGBA32Uint => Format::R32G32B32A32_UINT,
        MTLPixelFormat::RGBA32Sint => Format::R32G32B32A32_SINT,
        MTLPixelFormat::RGBA32Float => Format::R32G32B32A32_SFLOAT,
        MTLPixelFormat::RGB10A2Unorm => Format::R10G10B10A2_UNORM,
        MTLPixelFormat::RG11B10Float => Format::R11G11B10_UFLOAT,
        MTLPixelFormat::Depth16Unorm => Format::D16_UNORM,
        MTLPixelFormat::Depth32Float => Format::D32_SFLOAT,
        MTLPixelFormat::Depth24Unorm_Stencil8 => Format::D24_UNORM_S8_UINT,
        MTLPixelFormat::Depth32Float_Stencil8 => Format::D32_SFLOAT_S8_UINT,
        MTLPixelFormat::BC1_RGBA => Format::BC1_RGBA_UNORM_BLOCK,
        MTLPixelFormat::BC1_RGBA_sRGB => Format::BC1_RGBA_SRGB_BLOCK,
        MTLPixelFormat::BC3_RGBA => Format::BC3_UNORM_BLOCK,
        MTLPixelFormat::BC3_RGBA_sRGB => Format::BC3_SRGB_BLOCK,
        MTLPixelFormat::BC4_RUnorm => Format::BC4_UNORM_BLOCK,
        MTLPixelFormat::BC5_RGUnorm => Format::BC5_UNORM_BLOCK,
        MTLPixelFormat::BC7_RGBAUnorm => Format::BC7_UNORM_BLOCK,
        MTLPixelFormat::BC7_RGBAUnorm_sRGB => Format::BC7_SRGB_BLOCK,
        _ => Format::UNDEFINED,
    }
}

pub(crate) fn vertex_format(format: Format) -> MTLVertexFormat {
    match format {
        Format::R8G8_UNORM => MTLVertexFormat::UChar2Normalized,
        Format::R8G8B8A8_UNORM => MTLVertexFormat::UChar4Normalized,
        Format::R8G8B8A8_SNORM => MTLVertexFormat::Char4Normalized,
        Format::R8G8B8A8_UINT => MTLVertexFormat::UChar4,
        Format::R8G8B8A8_SINT => MTLVertexFormat::Char4,
        Format::R16G16_UNORM => MTLVertexFormat::UShort2Normalized,
        Format::R16G16_SNORM => MTLVertexFormat::Short2Normalized,
        Format::R16G16_SFLOAT => MTLVertexFormat::Half2,
        Format::R16G16B16A16_UNORM => MTLVertexFormat::UShort4Normalized,
        Format::R16G16B16A16_SNORM => MTLVertexFormat::Short4Normalized,
        Format::R16G16B16A16_SFLOAT => MTLVertexFormat::Half4,
        Format::R32_UINT => MTLVertexFormat::UInt,
        Format::R32_SINT => MTLVertexFormat::Int,
        Format::R32_SFLOAT => MTLVertexFormat::Float,
        Format::R32G32_UINT => MTLVertexFormat::UInt2,
        Format::R32G32_SINT => MTLVertexFormat::Int2,
        Format::R32G32_SFLOAT => MTLVertexFormat::Float2,
        Format::R32G32B32A32_UINT => MTLVertexFormat::UInt4,
        Format::R32G32B32A32_SINT => MTLVertexFormat::Int4,
        Format::R32G32B32A32_SFLOAT => MTLVertexFormat::Float4,
        Format::R10G10B10A2_UNORM => MTLVertexFormat::UInt1010102Normalized,
        _ => MTLVertexFormat::Invalid,
    }
}

pub(crate) fn blend_factor(factor: BlendFactor) -> MTLBlendFactor {
    match factor {
        BlendFactor::Zero => MTLBlendFactor::Zero,
        BlendFactor::One => MTLBlendFactor::One,
        BlendFactor::SrcColor => MTLBlendFactor::SourceColor,
        BlendFactor::OneMinusSrcColor => MTLBlendFactor::OneMinusSourceColor,
        BlendFactor::DstColor => MTLBlendFactor::DestinationColor,
        BlendFactor::OneMinusDstColor => MTLBlendFactor::OneMinusDestinationColor,
        BlendFactor::SrcAlpha => MTLBlendFactor::SourceAlpha,
        BlendFactor::OneMinusSrcAlpha => MTLBlendFactor::OneMinusSourceAlpha,
        BlendFactor::DstAlpha => MTLBlendFactor::DestinationAlpha,
        BlendFactor::OneMinusDstAlpha => MTLBlendFactor::OneMinusDestinationAlpha,
        BlendFactor::SrcAlphaSaturate => MTLBlendFactor::SourceAlphaSaturated,
        BlendFactor::ConstantColor => MTLBlendFactor::BlendColor,
        BlendFactor::OneMinusConstantColor => MTLBlendFactor::OneMinusBlendColor,
    }
}

pub(crate) fn blend_op(op: BlendOp) -> MTLBlendOperation {
    match op {
        BlendOp::Add => MTLBlendOperation::Add,
        BlendOp::Subtract => MTLBlendOperation::Subtract,
        BlendOp::ReverseSubtract => MTLBlendOperation::ReverseSubtract,
        BlendOp::Min => MTLBlendOperation::Min,
        BlendOp::Max => MTLBlendOperation::Max,
    }
}

pub(crate) fn compare_function(op: CompareOp) -> MTLCompareFunction {
    match op {
        CompareOp::Never => MTLCompareFunction::Never,
        CompareOp::Less => MTLCompareFunction::Less,
        CompareOp::Equal => MTLCompareFunction::Equal,
        CompareOp::LessOrEqual => MTLCompareFunction::LessEqual,
        CompareOp::Greater => MTLCompareFunction::Greater,
        CompareOp::NotEqual => MTLCompareFunction::NotEqual,
        CompareOp::GreaterOrEqual => MTLCompareFunction::GreaterEqual,
        CompareOp::Always => MTLCompareFunction::Always,
    }
}

pub(crate) fn stencil_operation(op: StencilOp) -> MTLStencilOperation {
    match op {
        StencilOp::Keep => MTLStencilOperation::Keep,
        StencilOp::Zero => MTLStencilOperation::Zero,
        StencilOp::Replace => MTLStencilOperation::Replace,
        StencilOp::IncrementAndClamp => MTLStencilOperation::IncrementClamp,
        StencilOp::DecrementAndClamp => MTLStencilOperation::DecrementClamp,
        StencilOp::Invert => MTLStencilOperation::Invert,
        StencilOp::IncrementAndWrap => MTLStencilOperation::IncrementWrap,
        StencilOp::DecrementAndWrap => MTLStencilOperation::DecrementWrap,
    }
}

pub(crate) fn cull_mode(mode: CullMode) -> MTLCullMode {
    match mode {
        CullMode::None => MTLCullMode::None,
        CullMode::Back => MTLCullMode::Back,
        CullMode::Front => MTLCullMode::Front,
    }
}

pub(crate) fn winding(front_face: FrontFace) -> MTLWinding {
    match front_face {
        FrontFace::CounterClockwise => MTLWinding::CounterClockwise,
        FrontFace::Clockwise => MTLWinding::Clockwise,
    }
}

pub(crate) fn triangle_fill_mode(mode: FillMode) -> MTLTriangleFillMode {
    match mode {
        FillMode::Solid => MTLTriangleFillMode::Fill,
        FillMode::Wireframe => MTLTriangleFillMode::Lines,
    }
}

pub(crate) fn min_mag_filter(filter: FilterType) -> MTLSamplerMinMagFilter {
    match filter {
        FilterType::Nearest => MTLSamplerMinMagFilter::Nearest,
        FilterType::Linear => MTLSamplerMinMagFilter::Linear,
    }
}

pub(crate) fn mip_filter(mode: MipMapMode) -> MTLSamplerMipFilter {
    match mode {
        MipMapMode::Nearest => MTLSamplerMipFilter::Nearest,
        MipMapMode::Linear => MTLSamplerMipFilter::Linear,
    }
}

pub(crate) fn address_mode(mode: AddressMode) -> MTLSamplerAddressMode {
    match mode {
        AddressMode::Mirror => MTLSamplerAddressMode::MirrorRepeat,
        AddressMode::Repeat => MTLSamplerAddressMode::Repeat,
        AddressMode::ClampToEdge => MTLSamplerAddressMode::ClampToEdge,
        AddressMode::ClampToBorder => MTLSamplerAddressMode::ClampToBorderColor,
    }
}

pub(crate) fn primitive_type(topology: PrimitiveTopology) -> MTLPrimitiveType {
    match topology {
        PrimitiveTopology::PointList => MTLPrimitiveType::Point,
        PrimitiveTopology::LineList => MTLPrimitiveType::Line,
        PrimitiveTopology::LineStrip => MTLPrimitiveType::LineStrip,
        PrimitiveTopology::TriangleList => MTLPrimitiveType::Triangle,
        PrimitiveTopology::TriangleStrip => MTLPrimitiveType::TriangleStrip,
    }
}

pub(crate) fn topology_class(topology: PrimitiveTopology) -> MTLPrimitiveTopologyClass {
    match topology {
        PrimitiveTopology::PointList => MTLPrimitiveTopologyClass::Point,
        PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => {
            MTLPrimitiveTopologyClass::Line
        }
        PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => {
            MTLPrimitiveTopologyClass::Triangle
        }
    }
}

pub(crate) fn index_type(ty: IndexType) -> MTLIndexType {
    match ty {
        IndexType::Uint32 => MTLIndexType::UInt32,
        IndexType::Uint16 => MTLIndexType::UInt16,
    }
}

pub(crate) fn index_size(ty: IndexType) -> u64 {
    match ty {
        IndexType::Uint32 => 4,
        IndexType::Uint16 => 2,
    }
}

pub(crate) fn load_action(op: LoadOp) -> MTLLoadAction {
    match op {
        LoadOp::DontCare => MTLLoadAction::DontCare,
        LoadOp::Load => MTLLoadAction::Load,
        LoadOp::Clear => MTLLoadAction::Clear,
    }
}

pub(crate) fn store_action(op: StoreOp) -> MTLStoreAction {
    match op {
        StoreOp::DontCare => MTLStoreAction::DontCare,
        StoreOp::Store => MTLStoreAction::Store,
    }
}

pub(crate) fn step_function(rate: VertexAttributeRate) -> MTLVertexStepFunction {
    match rate {
        VertexAttributeRate::Vertex => MTLVertexStepFunction::PerVertex,
        VertexAttributeRate::Instance => MTLVertexStepFunction::PerInstance,
    }
}

pub(crate) fn texture_type(resource_type: TextureType, sample_count: SampleCount) -> MTLTextureType {
    match resource_type {
        TextureType::_2D => {
            if sample_count == SampleCount::SampleCount1 {
                MTLTextureType::D2
            } else {
                MTLTextureType::D2Multisample
            }
        }
        TextureType::_2DArray => MTLTextureType::D2Array,
        TextureType::_3D => MTLTextureType::D3,
        TextureType::Cube => MTLTextureType::Cube,
        TextureType::CubeArray => MTLTextureType::CubeArray,
    }
}

/// Texture dimensionality baked into the argument encoding for a texture
/// descriptor range.
pub(crate) fn descriptor_texture_type(resource_type: ShaderResourceType) -> MTLTextureType {
    match resource_type {
        ShaderResourceType::Texture2D | ShaderResourceType::RWTexture2D => MTLTextureType::D2,
        ShaderResourceType::Texture2DArray | ShaderResourceType::RWTexture2DArray => {
            MTLTextureType::D2Array
        }
        ShaderResourceType::Texture3D | ShaderResourceType::RWTexture3D => MTLTextureType::D3,
        ShaderResourceType::TextureCube => MTLTextureType::Cube,
        ShaderResourceType::TextureCubeArray => MTLTextureType::CubeArray,
        _ => panic!("not a texture descriptor kind: {:?}", resource_type),
    }
}

pub(crate) fn color_write_mask(mask: u8) -> MTLColorWriteMask {
    let flags = crate::ColorFlags::from_bits_truncate(mask);
    let mut write_mask = MTLColorWriteMask::empty();
    if flags.intersects(crate::ColorFlags::RED) {
        write_mask |= MTLColorWriteMask::Red;
    }
    if flags.intersects(crate::ColorFlags::GREEN) {
        write_mask |= MTLColorWriteMask::Green;
    }
    if flags.intersects(crate::ColorFlags::BLUE) {
        write_mask |= MTLColorWriteMask::Blue;
    }
    if flags.intersects(crate::ColorFlags::ALPHA) {
        write_mask |= MTLColorWriteMask::Alpha;
    }
    write_mask
}

pub(crate) fn resource_options(memory_usage: MemoryUsage) -> MTLResourceOptions {
    match memory_usage {
        MemoryUsage::GpuOnly => MTLResourceOptions::StorageModePrivate,
        MemoryUsage::CpuToGpu => {
            MTLResourceOptions::StorageModeShared | MTLResourceOptions::CPUCacheModeWriteCombined
        }
        MemoryUsage::Unknown | MemoryUsage::CpuOnly | MemoryUsage::GpuToCpu => {
            MTLResourceOptions::StorageModeShared
        }
    }
}

pub(crate) fn storage_mode(memory_usage: MemoryUsage) -> MTLStorageMode {
    match memory_usage {
        MemoryUsage::GpuOnly => MTLStorageMode::Private,
        MemoryUsage::Unknown
        | MemoryUsage::CpuOnly
        | MemoryUsage::CpuToGpu
        | MemoryUsage::GpuToCpu => MTLStorageMode::Shared,
    }
}

fn pixel_size_bytes(format: Format) -> u64 {
    match format.typeless_canonical() {
        Format::R8_UNORM | Format::R8_SNORM | Format::R8_UINT | Format::R8_SINT => 1,
        Format::R8G8_UNORM
        | Format::R8G8_SNORM
        | Format::R8G8_UINT
        | Format::R8G8_SINT
        | Format::R16_UNORM
        | Format::R16_SNORM
        | Format::R16_UINT
        | Format::R16_SINT
        | Format::R16_SFLOAT
        | Format::D16_UNORM => 2,
        Format::R16G16B16A16_UNORM
        | Format::R16G16B16A16_SNORM
        | Format::R16G16B16A16_UINT
        | Format::R16G16B16A16_SINT
        | Format::R16G16B16A16_SFLOAT
        | Format::R32G32_UINT
        | Format::R32G32_SINT
        | Format::R32G32_SFLOAT
        | Format::D32_SFLOAT_S8_UINT => 8,
        Format::R32G32B32A32_UINT | Format::R32G32B32A32_SINT | Format::R32G32B32A32_SFLOAT => 16,
        _ => 4,
    }
}

/// Source row pitch of tightly-packed upload data, in bytes. Compressed
/// formats count 4x4 blocks.
pub(crate) fn bytes_per_row(format: Format, width: u32) -> u64 {
    if format.is_compressed() {
        let block_size = match format {
            Format::BC1_RGBA_UNORM_BLOCK | Format::BC1_RGBA_SRGB_BLOCK | Format::BC4_UNORM_BLOCK => {
                8
            }
            _ => 16,
        };
        u64::from((width + 3) / 4) * block_size
    } else {
        u64::from(width) * pixel_size_bytes(format)
    }
}

pub(crate) fn rows_per_image(format: Format, height: u32) -> u64 {
    if format.is_compressed() {
        u64::from((height + 3) / 4)
    } else {
        u64::from(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: [Format; 59] = [
        Format::UNDEFINED,
        Format::R8_UNORM,
        Format::R8_SNORM,
        Format::R8_UINT,
        Format::R8_SINT,
        Format::R8G8_UNORM,
        Format::R8G8_SNORM,
        Format::R8G8_UINT,
        Format::R8G8_SINT,
        Format::R8G8B8A8_UNORM,
        Format::R8G8B8A8_SNORM,
        Format::R8G8B8A8_UINT,
        Format::R8G8B8A8_SINT,
        Format::R8G8B8A8_SRGB,
        Format::R8G8B8A8_TYPELESS,
        Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB,
        Format::B8G8R8A8_TYPELESS,
        Format::R16_UNORM,
        Format::R16_SNORM,
        Format::R16_UINT,
        Format::R16_SINT,
        Format::R16_SFLOAT,
        Format::R16G16_UNORM,
        Format::R16G16_SNORM,
        Format::R16G16_UINT,
        Format::R16G16_SINT,
        Format::R16G16_SFLOAT,
        Format::R16G16B16A16_UNORM,
        Format::R16G16B16A16_SNORM,
        Format::R16G16B16A16_UINT,
        Format::R16G16B16A16_SINT,
        Format::R16G16B16A16_SFLOAT,
        Format::R16G16B16A16_TYPELESS,
        Format::R32_UINT,
        Format::R32_SINT,
        Format::R32_SFLOAT,
        Format::R32_TYPELESS,
        Format::R32G32_UINT,
        Format::R32G32_SINT,
        Format::R32G32_SFLOAT,
        Format::R32G32B32A32_UINT,
        Format::R32G32B32A32_SINT,
        Format::R32G32B32A32_SFLOAT,
        Format::R32G32B32A32_TYPELESS,
        Format::R10G10B10A2_UNORM,
        Format::R11G11B10_UFLOAT,
        Format::D16_UNORM,
        Format::D32_SFLOAT,
        Format::D24_UNORM_S8_UINT,
        Format::D32_SFLOAT_S8_UINT,
        Format::BC1_RGBA_UNORM_BLOCK,
        Format::BC1_RGBA_SRGB_BLOCK,
        Format::BC3_UNORM_BLOCK,
        Format::BC3_SRGB_BLOCK,
        Format::BC4_UNORM_BLOCK,
        Format::BC5_UNORM_BLOCK,
        Format::BC7_UNORM_BLOCK,
        Format::BC7_SRGB_BLOCK,
    ];

    #[test]
    fn pixel_format_round_trips_except_merged_typeless() {
        for abstract_format in ALL_FORMATS {
            let round_tripped = format(pixel_format(abstract_format));
            // merged typeless variants come back as their typed sibling,
            // everything else must survive unchanged
            assert_eq!(
                round_tripped,
                abstract_format.typeless_canonical(),
                "{:?}",
                abstract_format
            );
            if !abstract_format.is_typeless() {
                assert_eq!(round_tripped, abstract_format, "{:?}", abstract_format);
            }
        }
    }

    #[test]
    fn typeless_formats_collapse_to_their_typed_sibling() {
        assert_eq!(
            pixel_format(Format::R8G8B8A8_TYPELESS),
            pixel_format(Format::R8G8B8A8_UNORM)
        );
        assert_eq!(
            pixel_format(Format::R32_TYPELESS),
            pixel_format(Format::R32_SFLOAT)
        );
        assert_eq!(
            pixel_format(Format::R32G32B32A32_TYPELESS),
            pixel_format(Format::R32G32B32A32_SFLOAT)
        );
    }

    #[test]
    fn every_defined_format_has_a_native_equivalent() {
        for format in ALL_FORMATS {
            if format == Format::UNDEFINED {
                assert_eq!(pixel_format(format), MTLPixelFormat::Invalid);
            } else {
                assert_ne!(pixel_format(format), MTLPixelFormat::Invalid, "{:?}", format);
            }
        }
    }

    #[test]
    fn compressed_row_pitch_counts_blocks() {
        // 10 texels wide -> 3 BC1 blocks of 8 bytes
        assert_eq!(bytes_per_row(Format::BC1_RGBA_UNORM_BLOCK, 10), 24);
        assert_eq!(rows_per_image(Format::BC1_RGBA_UNORM_BLOCK, 10), 3);
        assert_eq!(bytes_per_row(Format::R8G8B8A8_UNORM, 10), 40);
    }
}
