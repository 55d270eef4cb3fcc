use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    pub struct ResourceUsage: u16 {
        // buffer
        const AS_CONST_BUFFER = 0x0001;
        // buffer/texture
        const AS_SHADER_RESOURCE = 0x0002;
        // buffer/texture
        const AS_UNORDERED_ACCESS = 0x0004;
        // texture
        const AS_RENDER_TARGET = 0x0008;
        // texture
        const AS_DEPTH_STENCIL = 0x0010;
        // buffer
        const AS_VERTEX_BUFFER = 0x0020;
        // buffer
        const AS_INDEX_BUFFER = 0x0040;
        // buffer/texture
        const AS_TRANSFERABLE = 0x0080;
        // meta
        const BUFFER_ONLY_USAGE_FLAGS =
            Self::AS_CONST_BUFFER.bits|
            Self::AS_VERTEX_BUFFER.bits|
            Self::AS_INDEX_BUFFER.bits;
        const TEXTURE_ONLY_USAGE_FLAGS =
            Self::AS_RENDER_TARGET.bits|
            Self::AS_DEPTH_STENCIL.bits;
    }
}

bitflags::bitflags! {
    pub struct ShaderStageFlags: u8 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x02;
        const COMPUTE = 0x04;
        const GRAPHICS_STAGE_FLAGS = Self::VERTEX.bits | Self::FRAGMENT.bits;
    }
}

bitflags::bitflags! {
    pub struct ColorFlags: u8 {
        const RED = 0x01;
        const GREEN = 0x02;
        const BLUE = 0x04;
        const ALPHA = 0x08;
        const ALL = Self::RED.bits | Self::GREEN.bits | Self::BLUE.bits | Self::ALPHA.bits;
    }
}

impl Default for ColorFlags {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemoryUsage {
    Unknown,
    GpuOnly,
    CpuOnly,
    CpuToGpu,
    GpuToCpu,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SampleCount {
    SampleCount1,
    SampleCount2,
    SampleCount4,
    SampleCount8,
}

impl Default for SampleCount {
    fn default() -> Self {
        Self::SampleCount1
    }
}

impl SampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::SampleCount1 => 1,
            Self::SampleCount2 => 2,
            Self::SampleCount4 => 4,
            Self::SampleCount8 => 8,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PipelineType {
    Graphics = 0,
    Compute = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QueueType {
    /// Graphics queues generally support all operations and are a safe
    /// default choice
    Graphics,
    Compute,
    Transfer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextureType {
    _2D,
    _2DArray,
    _3D,
    Cube,
    CubeArray,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GPUViewType {
    ConstantBuffer,
    ShaderResource,
    UnorderedAccess,
    RenderTarget,
    DepthStencil,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaneSlice {
    Default,
    Depth,
    Stencil,
}

/// Resource kind a descriptor range declares. The type table derived from
/// these is authoritative when validating a bind into a descriptor set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShaderResourceType {
    Sampler,
    ConstantBuffer,
    StructuredBuffer,
    RWStructuredBuffer,
    ByteAddressBuffer,
    RWByteAddressBuffer,
    Texture2D,
    RWTexture2D,
    Texture2DArray,
    RWTexture2DArray,
    Texture3D,
    RWTexture3D,
    TextureCube,
    TextureCubeArray,
}

impl ShaderResourceType {
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture2D
                | Self::RWTexture2D
                | Self::Texture2DArray
                | Self::RWTexture2DArray
                | Self::Texture3D
                | Self::RWTexture3D
                | Self::TextureCube
                | Self::TextureCubeArray
        )
    }

    pub fn is_buffer(self) -> bool {
        matches!(
            self,
            Self::ConstantBuffer
                | Self::StructuredBuffer
                | Self::RWStructuredBuffer
                | Self::ByteAddressBuffer
                | Self::RWByteAddressBuffer
        )
    }

    /// Read-write kinds require a read-write residency declaration on the
    /// encoder; everything else is declared read-only.
    pub fn is_read_write(self) -> bool {
        matches!(
            self,
            Self::RWStructuredBuffer
                | Self::RWByteAddressBuffer
                | Self::RWTexture2D
                | Self::RWTexture2DArray
                | Self::RWTexture3D
        )
    }
}

//
// Fixed-function state
//

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl Default for CompareOp {
    fn default() -> Self {
        Self::Always
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

impl Default for StencilOp {
    fn default() -> Self {
        Self::Keep
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CullMode {
    None,
    Back,
    Front,
}

impl Default for CullMode {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

impl Default for FrontFace {
    fn default() -> Self {
        Self::CounterClockwise
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillMode {
    Solid,
    Wireframe,
}

impl Default for FillMode {
    fn default() -> Self {
        Self::Solid
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterType {
    Nearest,
    Linear,
}

impl Default for FilterType {
    fn default() -> Self {
        Self::Nearest
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MipMapMode {
    Nearest,
    Linear,
}

impl Default for MipMapMode {
    fn default() -> Self {
        Self::Nearest
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddressMode {
    Mirror,
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

impl Default for AddressMode {
    fn default() -> Self {
        Self::ClampToEdge
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
    ConstantColor,
    OneMinusConstantColor,
}

impl Default for BlendFactor {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl Default for BlendOp {
    fn default() -> Self {
        Self::Add
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        Self::TriangleList
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexType {
    Uint32,
    Uint16,
}

impl Default for IndexType {
    fn default() -> Self {
        Self::Uint32
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VertexAttributeRate {
    Vertex,
    Instance,
}

impl Default for VertexAttributeRate {
    fn default() -> Self {
        Self::Vertex
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoadOp {
    DontCare,
    Load,
    Clear,
}

impl Default for LoadOp {
    fn default() -> Self {
        Self::DontCare
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StoreOp {
    DontCare,
    Store,
}

impl Default for StoreOp {
    fn default() -> Self {
        Self::Store
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorClearValue(pub [f32; 4]);

impl Default for ColorClearValue {
    fn default() -> Self {
        Self([0.0; 4])
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DepthStencilClearValue {
    pub depth: f32,
    pub stencil: u32,
}

impl Default for DepthStencilClearValue {
    fn default() -> Self {
        Self {
            depth: 1.0,
            stencil: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth_min: f32,
    pub depth_max: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Offset3D {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

//
// Pipeline state blocks
//

/// Per-attachment blend description, expanded element by element during
/// pipeline creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlendStateRenderTarget {
    pub blend_enabled: bool,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub blend_op: BlendOp,
    pub src_factor_alpha: BlendFactor,
    pub dst_factor_alpha: BlendFactor,
    pub blend_op_alpha: BlendOp,
    pub masks: u8,
}

impl Default for BlendStateRenderTarget {
    fn default() -> Self {
        Self {
            blend_enabled: false,
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::Zero,
            blend_op: BlendOp::Add,
            src_factor_alpha: BlendFactor::One,
            dst_factor_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOp::Add,
            masks: ColorFlags::ALL.bits(),
        }
    }
}

impl BlendStateRenderTarget {
    pub fn default_alpha_enabled() -> Self {
        Self {
            blend_enabled: true,
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            blend_op: BlendOp::Add,
            src_factor_alpha: BlendFactor::One,
            dst_factor_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOp::Add,
            masks: ColorFlags::ALL.bits(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlendState {
    /// One entry per color attachment, or a single entry applied to all when
    /// `independent_blend` is false.
    pub render_targets: Vec<BlendStateRenderTarget>,
    pub independent_blend: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_depth_fail_op: StencilOp,
    pub front_stencil_compare_op: CompareOp,
    pub front_stencil_fail_op: StencilOp,
    pub front_stencil_pass_op: StencilOp,
    pub back_depth_fail_op: StencilOp,
    pub back_stencil_compare_op: CompareOp,
    pub back_stencil_fail_op: StencilOp,
    pub back_stencil_pass_op: StencilOp,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: CompareOp::Always,
            stencil_test_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_depth_fail_op: StencilOp::Keep,
            front_stencil_compare_op: CompareOp::Always,
            front_stencil_fail_op: StencilOp::Keep,
            front_stencil_pass_op: StencilOp::Keep,
            back_depth_fail_op: StencilOp::Keep,
            back_stencil_compare_op: CompareOp::Always,
            back_stencil_fail_op: StencilOp::Keep,
            back_stencil_pass_op: StencilOp::Keep,
        }
    }
}

/// Rasterizer state. On this platform cull mode, winding and fill mode are
/// encoder-level state rather than baked into the pipeline object; the
/// command list re-applies them whenever a pipeline is bound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub fill_mode: FillMode,
}

//
// Vertex input
//

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexLayoutAttribute {
    pub format: crate::Format,
    /// Index of the vertex buffer the attribute reads from.
    pub buffer_index: u32,
    /// Shader attribute location.
    pub location: u32,
    pub byte_offset: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexLayoutBuffer {
    pub stride: u32,
    pub rate: VertexAttributeRate,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexLayout {
    pub attributes: Vec<VertexLayoutAttribute>,
    pub buffers: Vec<VertexLayoutBuffer>,
}

//
// Misc submission/copy types
//

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FenceStatus {
    /// The fence was never submitted
    Unsubmitted,
    /// The fence was submitted but the work has not completed
    Incomplete,
    /// The submitted work has completed
    Complete,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresentSuccessResult {
    Success,
    /// Presentation succeeded but the swapchain no longer matches the
    /// surface and should be rebuilt.
    SuccessSuboptimal,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferCopy {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub size: u64,
}

#[derive(Copy, Clone, Debug)]
pub struct CmdCopyTextureParams {
    pub src_mip_level: u8,
    pub dst_mip_level: u8,
    pub src_array_slice: u16,
    pub dst_array_slice: u16,
    pub src_offset: Offset3D,
    pub dst_offset: Offset3D,
    pub extent: Extents3D,
}

#[derive(Copy, Clone, Debug)]
pub struct CmdCopyBufferToTextureParams {
    pub buffer_offset: u64,
    pub mip_level: u8,
    pub array_slice: u16,
}

#[derive(Copy, Clone, Debug)]
pub struct CmdResolveTextureRegionParams {
    pub src_offset: Offset3D,
    pub dst_offset: Offset3D,
    pub extent: Extents3D,
    pub array_slice: u16,
}

/// Barriers are accepted for interface compatibility; the platform's own
/// hazard tracking makes them no-ops.
#[derive(Copy, Clone, Debug)]
pub struct BufferBarrier<'a> {
    pub buffer: &'a crate::Buffer,
}

#[derive(Copy, Clone, Debug)]
pub struct TextureBarrier<'a> {
    pub texture: &'a crate::Texture,
}
