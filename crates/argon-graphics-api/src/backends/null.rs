//! No-op backend. Every native object is an empty shell, but the calls keep
//! the frontend's contracts: creation succeeds, buffers expose real
//! CPU-visible memory, submissions complete synchronously, and the swapchain
//! hands out a real offscreen drawable ring.

use raw_window_handle::HasRawWindowHandle;

use crate::descriptor_set_layout::DescriptorRange;
use crate::{
    ApiDef, Buffer, BufferCopy, BufferDef, BufferMappingInfo, ClearPipelineKey,
    CmdCopyBufferToTextureParams, CmdCopyTextureParams, CommandBuffer, CommandBufferDef,
    ComputePipelineDef, DescriptorSet, DescriptorSetLayout, DeviceContext, DeviceInfo, Extents3D,
    Fence, Format, GfxResult, GraphicsPipelineDef, Heap, HeapDef, PipelineType,
    PresentSuccessResult, Queue, QueueType, ResourceUsage, SamplerDef, ScissorRect, Semaphore,
    ShaderModuleDef, ShaderStageFlags, Swapchain, SwapchainDef, SwapchainImage, Texture,
    TextureDef, TextureViewDef, Viewport, SWAPCHAIN_IMAGE_COUNT,
};

#[derive(Debug)]
pub(crate) struct NullApi;

impl NullApi {
    pub fn new(_api_def: &ApiDef) -> GfxResult<Self> {
        Ok(Self)
    }
}

#[derive(Debug)]
pub(crate) struct NullDeviceContext;

impl NullDeviceContext {
    pub(crate) fn new(_api: &NullApi, _api_def: &ApiDef) -> GfxResult<(Self, DeviceInfo)> {
        Ok((
            Self,
            DeviceInfo {
                supports_multithreaded_usage: true,
                min_uniform_buffer_offset_alignment: 256,
                min_storage_buffer_offset_alignment: 16,
                upload_buffer_texture_alignment: 16,
                upload_buffer_texture_row_alignment: 256,
                supports_clamp_to_border_color: true,
                max_vertex_attribute_count: 31,
            },
        ))
    }

    pub(crate) fn destroy(&mut self) {}
}

pub(crate) struct NullBuffer {
    memory: Box<[u8]>,
}

impl NullBuffer {
    pub(crate) fn new(_device_context: &DeviceContext, buffer_def: &BufferDef) -> GfxResult<Self> {
        Ok(Self {
            memory: vec![0u8; buffer_def.size as usize].into_boxed_slice(),
        })
    }

    pub(crate) fn new_placed(_heap: &Heap, buffer_def: &BufferDef) -> GfxResult<Self> {
        Ok(Self {
            memory: vec![0u8; buffer_def.size as usize].into_boxed_slice(),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext, _buffer_def: &BufferDef) {}
}

impl Buffer {
    pub(crate) fn backend_required_alignment(&self) -> u64 {
        256
    }

    pub(crate) fn backend_map_memory(&self) -> GfxResult<BufferMappingInfo> {
        let memory = &self.inner.backend_buffer.memory;
        Ok(BufferMappingInfo {
            data_ptr: memory.as_ptr() as *mut u8,
            size: memory.len() as u64,
        })
    }
}

#[derive(Debug)]
pub(crate) struct NullTexture;

impl NullTexture {
    pub(crate) fn new(_device_context: &DeviceContext, _texture_def: &TextureDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn new_placed(_heap: &Heap, _texture_def: &TextureDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullTextureView;

impl NullTextureView {
    pub(crate) fn new(_texture: &Texture, _view_def: &TextureViewDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullBufferView;

impl NullBufferView {
    pub(crate) fn new(_buffer: &Buffer, _view_def: &crate::BufferViewDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullSampler;

impl NullSampler {
    pub(crate) fn new(_device_context: &DeviceContext, _sampler_def: &SamplerDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullHeap;

impl NullHeap {
    pub(crate) fn new(_device_context: &DeviceContext, _heap_def: &HeapDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullShaderModule;

impl NullShaderModule {
    pub(crate) fn new(_device_context: &DeviceContext, _def: ShaderModuleDef<'_>) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

/// Mirrors the argument-encoder size query without a real encoder: eight
/// bytes per encoded slot, boundless ranges at their reserved capacity.
#[derive(Debug)]
pub(crate) struct NullDescriptorSetLayout {
    encoded_size: u64,
}

impl NullDescriptorSetLayout {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        ranges: &[DescriptorRange],
    ) -> GfxResult<Self> {
        let slots: u64 = ranges
            .iter()
            .map(|range| u64::from(range.encoded_array_length()))
            .sum();
        Ok(Self {
            encoded_size: slots * 8,
        })
    }

    pub(crate) fn encoded_size(&self) -> u64 {
        self.encoded_size
    }

    pub(crate) fn encoded_alignment(&self) -> u64 {
        256
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullPipeline;

impl NullPipeline {
    pub(crate) fn new_graphics_pipeline(
        _device_context: &DeviceContext,
        _pipeline_def: &GraphicsPipelineDef<'_>,
    ) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn new_compute_pipeline(
        _device_context: &DeviceContext,
        _pipeline_def: &ComputePipelineDef<'_>,
    ) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

#[derive(Debug)]
pub(crate) struct NullClearPipeline;

impl NullClearPipeline {
    pub(crate) fn new(_device_context: &DeviceContext, _key: &ClearPipelineKey) -> GfxResult<Self> {
        Ok(Self)
    }
}

#[derive(Debug)]
pub(crate) struct NullCommandBuffer;

impl NullCommandBuffer {
    pub(crate) fn new(_queue: &Queue, _command_buffer_def: &CommandBufferDef) -> GfxResult<Self> {
        Ok(Self)
    }
}

impl CommandBuffer {
    pub(crate) fn backend_begin(&mut self) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_end(&mut self) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_begin_render_pass(
        &mut self,
        _setup: &crate::command_buffer::RenderPassSetup,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_end_render_pass(&mut self) {}

    pub(crate) fn backend_begin_compute_pass(&mut self) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_end_compute_pass(&mut self) {}

    pub(crate) fn backend_begin_blit_pass(&mut self) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_end_blit_pass(&mut self) {}

    pub(crate) fn backend_bind_pipeline(&mut self, _pipeline: &crate::Pipeline) {}

    pub(crate) fn backend_set_viewports(&mut self, _viewports: &[Viewport]) {}

    pub(crate) fn backend_set_scissors(&mut self, _scissors: &[ScissorRect]) {}

    pub(crate) fn backend_bind_vertex_buffer(
        &mut self,
        _slot: u32,
        _buffer: &Buffer,
        _byte_offset: u64,
    ) {
    }

    pub(crate) fn backend_bind_descriptor_set(
        &mut self,
        layout: &DescriptorSetLayout,
        descriptor_set: &DescriptorSet,
        _ring_offset: u64,
        _pipeline_type: PipelineType,
        _skip_vertex_stage: bool,
    ) -> GfxResult<()> {
        // walk the bindings so stale entries would be caught even here
        descriptor_set.for_each_binding(|flat_index, _descriptor| {
            let _ = layout.argument_slot(flat_index);
        });
        Ok(())
    }

    pub(crate) fn backend_push_constants(
        &mut self,
        _slot: u32,
        _stage_flags: ShaderStageFlags,
        _data: &[u8],
    ) {
    }

    pub(crate) fn backend_draw(&mut self, _vertex_count: u32, _first_vertex: u32) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_draw_instanced(
        &mut self,
        _vertex_count: u32,
        _first_vertex: u32,
        _instance_count: u32,
        _first_instance: u32,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_draw_indexed(
        &mut self,
        _index_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
    ) -> GfxResult<()> {
        debug_assert!(self.bound_index_buffer().is_some());
        Ok(())
    }

    pub(crate) fn backend_draw_indexed_instanced(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _first_instance: u32,
        _vertex_offset: i32,
    ) -> GfxResult<()> {
        debug_assert!(self.bound_index_buffer().is_some());
        Ok(())
    }

    pub(crate) fn backend_dispatch(&mut self, _group_counts: [u32; 3]) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_copy_buffer_to_buffer(
        &mut self,
        src_buffer: &Buffer,
        dst_buffer: &Buffer,
        copy_data: &[BufferCopy],
    ) -> GfxResult<()> {
        for copy in copy_data {
            assert!(copy.src_offset + copy.size <= src_buffer.definition().size);
            assert!(copy.dst_offset + copy.size <= dst_buffer.definition().size);
        }
        Ok(())
    }

    pub(crate) fn backend_copy_buffer_to_texture(
        &mut self,
        _src_buffer: &Buffer,
        _dst_texture: &Texture,
        _params: &CmdCopyBufferToTextureParams,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_copy_texture(
        &mut self,
        _src_texture: &Texture,
        _dst_texture: &Texture,
        _params: &CmdCopyTextureParams,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_clear_draw(
        &mut self,
        _clear_pipeline: &std::sync::Arc<NullClearPipeline>,
        _color: [f32; 4],
        _depth: f32,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_resolve_texture(
        &mut self,
        _src_texture: &Texture,
        _dst_texture: &Texture,
    ) -> GfxResult<()> {
        Ok(())
    }

    pub(crate) fn backend_resolve_texture_region(
        &mut self,
        _src_texture: &Texture,
        _dst_texture: &Texture,
        _params: &crate::CmdResolveTextureRegionParams,
    ) -> GfxResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct NullQueue;

impl NullQueue {
    pub(crate) fn new(_device_context: &DeviceContext, _queue_type: QueueType) -> GfxResult<Self> {
        Ok(Self)
    }
}

impl Queue {
    /// Work completes synchronously: the fence and semaphores signal before
    /// this returns, as if the completion handler had already run.
    pub(crate) fn backend_submit(
        &mut self,
        _command_buffers: &[&CommandBuffer],
        _wait_semaphores: &[&Semaphore],
        signal_semaphores: &[&Semaphore],
        signal_fence: Option<&Fence>,
    ) -> GfxResult<()> {
        for semaphore in signal_semaphores {
            semaphore.signal_from_callback(semaphore.next_value());
        }
        if let Some(fence) = signal_fence {
            fence.signal_from_callback();
        }
        Ok(())
    }

    pub(crate) fn backend_present(
        &mut self,
        _swapchain: &Swapchain,
        _wait_semaphores: &[&Semaphore],
        image_index: u32,
    ) -> GfxResult<PresentSuccessResult> {
        assert!(image_index < SWAPCHAIN_IMAGE_COUNT);
        Ok(PresentSuccessResult::Success)
    }

    pub(crate) fn backend_wait_for_queue_idle(&mut self) -> GfxResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct NullSemaphore;

impl NullSemaphore {
    pub(crate) fn new(_device_context: &DeviceContext) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

/// An offscreen drawable ring standing in for real window surfaces.
pub(crate) struct NullSwapchain {
    format: Format,
    images: Vec<SwapchainImage>,
}

impl NullSwapchain {
    pub(crate) fn new(
        device_context: &DeviceContext,
        _raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &SwapchainDef,
    ) -> GfxResult<Self> {
        let format = Format::B8G8R8A8_UNORM;
        Ok(Self {
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
                    usage_flags: ResourceUsage::AS_RENDER_TARGET,
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
        self.backend_swapchain.images =
            NullSwapchain::create_images(&device_context, swapchain_def, format)?;
        Ok(())
    }

    /// The drawable is always ready; signal the semaphore as if the GPU had
    /// already processed the throwaway signal buffer.
    pub(crate) fn backend_acquire_next_image(
        &mut self,
        image_index: u32,
        signal_semaphore: &Semaphore,
    ) -> GfxResult<SwapchainImage> {
        signal_semaphore.signal_from_callback(signal_semaphore.next_value());
        Ok(self.backend_swapchain.images[image_index as usize].clone())
    }
}

pub(crate) mod backend_impl {
    pub(crate) type BackendApi = super::NullApi;
    pub(crate) type BackendDeviceContext = super::NullDeviceContext;
    pub(crate) type BackendBuffer = super::NullBuffer;
    pub(crate) type BackendBufferView = super::NullBufferView;
    pub(crate) type BackendTexture = super::NullTexture;
    pub(crate) type BackendTextureView = super::NullTextureView;
    pub(crate) type BackendSampler = super::NullSampler;
    pub(crate) type BackendHeap = super::NullHeap;
    pub(crate) type BackendShaderModule = super::NullShaderModule;
    pub(crate) type BackendDescriptorSetLayout = super::NullDescriptorSetLayout;
    pub(crate) type BackendPipeline = super::NullPipeline;
    pub(crate) type BackendClearPipeline = super::NullClearPipeline;
    pub(crate) type BackendCommandBuffer = super::NullCommandBuffer;
    pub(crate) type BackendQueue = super::NullQueue;
    pub(crate) type BackendSemaphore = super::NullSemaphore;
    pub(crate) type BackendSwapchain = super::NullSwapchain;
}
