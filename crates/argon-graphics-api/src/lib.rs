//! Render-hardware-interface backend for an argument-buffer based GPU API.
//!
//! The public surface exposes an abstract device/queue/command-list/resource
//! model; the platform backend maps it onto a binding model built around
//! argument buffers, encoder-scoped state and explicit residency
//! declarations. The command-list state machine tracks dirty pipeline state
//! and materializes it lazily into whichever hardware encoder is open.

// crate-specific lint exceptions:
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(feature = "metal", allow(clippy::too_many_lines))]

pub mod backends;
pub mod error;
pub mod types;

pub(crate) mod internal;

mod api;
pub use api::*;

mod buffer;
pub use buffer::*;

mod buffer_view;
pub use buffer_view::*;

mod command_buffer;
pub use command_buffer::*;

mod descriptor_set;
pub use descriptor_set::*;

mod descriptor_set_layout;
pub use descriptor_set_layout::*;

mod device_context;
pub use device_context::*;

mod fence;
pub use fence::*;

mod heap;
pub use heap::*;

mod pipeline;
pub use pipeline::*;

mod pipeline_layout;
pub use pipeline_layout::*;

mod queue;
pub use queue::*;

mod sampler;
pub use sampler::*;

mod semaphore;
pub use semaphore::*;

mod shader;
pub use shader::*;

mod shader_module;
pub use shader_module::*;

mod swapchain;
pub use swapchain::*;

mod texture;
pub use texture::*;

mod texture_view;
pub use texture_view::*;

pub mod prelude {
    pub use crate::types::*;
    pub use crate::{
        Buffer, BufferView, CommandBuffer, DescriptorSet, DescriptorSetLayout, DeviceContext,
        Fence, GfxApi, GfxResult, Pipeline, PipelineLayout, Queue, Sampler, Semaphore, Shader,
        Swapchain, Texture, TextureView,
    };
}

pub use error::*;
pub use types::*;

//
// Constants
//

/// The maximum descriptor set layout index allowed.
pub const MAX_DESCRIPTOR_SET_LAYOUTS: usize = 4;
/// The maximum number of simultaneously attached render targets
pub const MAX_RENDER_TARGET_ATTACHMENTS: usize = 8;
pub const MAX_VERTEX_INPUT_BINDINGS: usize = 16;
/// Number of drawables in the swapchain ring; hardware maximum.
pub const SWAPCHAIN_IMAGE_COUNT: u32 = 3;
/// Size of the per-layout argument-buffer backing store. Bound-set snapshots
/// are ring-allocated out of this store; the caller must keep few enough
/// frames in flight that a wrap never lands on a region the GPU still reads.
pub const DESCRIPTOR_RING_BUFFER_SIZE: u64 = 1024 * 1024;
/// Fixed capacity reserved for a boundless (variable-length) descriptor
/// range. The binding model requires static sizing, so the upper bound is
/// baked into the argument encoder regardless of the requested count.
pub const BOUNDLESS_DESCRIPTOR_CAPACITY: u32 = 8192;
/// First buffer slot used for inline push-constant uploads, placed past the
/// descriptor-set slots so the two binding spaces never collide.
pub const PUSH_CONSTANT_SLOT_BASE: u32 = MAX_DESCRIPTOR_SET_LAYOUTS as u32;
