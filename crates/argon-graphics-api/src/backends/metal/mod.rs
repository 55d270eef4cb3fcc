//! Metal backend. Maps the descriptor-set binding model onto argument
//! buffers, emulates explicit render/compute/blit pass control on top of
//! encoder-scoped state, and declares resource residency per encoder.

#![allow(unsafe_code)]

mod api;
mod buffer;
mod command_buffer;
mod conversions;
mod descriptor_set_layout;
mod device_context;
mod heap;
mod pipeline;
mod queue;
mod sampler;
mod semaphore;
mod shader_module;
mod swapchain;
mod texture;

pub(crate) use api::MetalApi;
pub(crate) use buffer::{MetalBuffer, MetalBufferView};
pub(crate) use command_buffer::MetalCommandBuffer;
pub(crate) use descriptor_set_layout::MetalDescriptorSetLayout;
pub(crate) use device_context::MetalDeviceContext;
pub(crate) use heap::MetalHeap;
pub(crate) use pipeline::{MetalClearPipeline, MetalPipeline};
pub(crate) use queue::MetalQueue;
pub(crate) use sampler::MetalSampler;
pub(crate) use semaphore::MetalSemaphore;
pub(crate) use shader_module::MetalShaderModule;
pub(crate) use swapchain::MetalSwapchain;
pub(crate) use texture::{MetalTexture, MetalTextureView};

pub(crate) mod backend_impl {
    pub(crate) type BackendApi = super::MetalApi;
    pub(crate) type BackendDeviceContext = super::MetalDeviceContext;
    pub(crate) type BackendBuffer = super::MetalBuffer;
    pub(crate) type BackendBufferView = super::MetalBufferView;
    pub(crate) type BackendTexture = super::MetalTexture;
    pub(crate) type BackendTextureView = super::MetalTextureView;
    pub(crate) type BackendSampler = super::MetalSampler;
    pub(crate) type BackendHeap = super::MetalHeap;
    pub(crate) type BackendShaderModule = super::MetalShaderModule;
    pub(crate) type BackendDescriptorSetLayout = super::MetalDescriptorSetLayout;
    pub(crate) type BackendPipeline = super::MetalPipeline;
    pub(crate) type BackendClearPipeline = super::MetalClearPipeline;
    pub(crate) type BackendCommandBuffer = super::MetalCommandBuffer;
    pub(crate) type BackendQueue = super::MetalQueue;
    pub(crate) type BackendSemaphore = super::MetalSemaphore;
    pub(crate) type BackendSwapchain = super::MetalSwapchain;
}
