use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use fnv::FnvHashMap;

use crate::backends::{BackendApi, BackendClearPipeline, BackendDeviceContext};
use crate::{
    ApiDef, Buffer, BufferDef, ColorFlags, ComputePipelineDef, DescriptorSet,
    DescriptorSetLayout, DescriptorSetLayoutDef, Fence, Format, GfxResult, GraphicsPipelineDef,
    Heap, HeapDef, Pipeline, PipelineLayout, PipelineLayoutDef, Queue, QueueType, SampleCount,
    Sampler, SamplerDef, Semaphore, Shader, ShaderModule, ShaderModuleDef, ShaderStageDef,
    Swapchain, SwapchainDef, Texture, TextureDef,
};

/// Information about the device, mostly limits, requirements (like memory
/// alignment), and flags to indicate whether certain features are supported
#[derive(Clone, Copy)]
pub struct DeviceInfo {
    pub supports_multithreaded_usage: bool,
    pub min_uniform_buffer_offset_alignment: u32,
    pub min_storage_buffer_offset_alignment: u32,
    pub upload_buffer_texture_alignment: u32,
    pub upload_buffer_texture_row_alignment: u32,
    pub supports_clamp_to_border_color: bool,
    pub max_vertex_attribute_count: u32,
}

/// Key for the cached clear pipelines: a clear is a full-screen (or
/// per-rect) draw, and its pipeline is determined entirely by the attachment
/// formats, sample count and write masks of the pass it runs inside.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ClearPipelineKey {
    pub color_formats: Vec<Format>,
    pub depth_stencil_format: Option<Format>,
    pub sample_count: SampleCount,
    pub write_mask: u8,
    pub depth_write: bool,
}

impl ClearPipelineKey {
    // The clear pipeline must declare every attachment of the pass it runs
    // inside, so both constructors take the full attachment set; the kind of
    // clear only selects which writes are enabled.

    pub fn for_color(
        color_formats: Vec<Format>,
        depth_stencil_format: Option<Format>,
        sample_count: SampleCount,
        mask: ColorFlags,
    ) -> Self {
        Self {
            color_formats,
            depth_stencil_format,
            sample_count,
            write_mask: mask.bits(),
            depth_write: false,
        }
    }

    pub fn for_depth(
        color_formats: Vec<Format>,
        depth_stencil_format: Format,
        sample_count: SampleCount,
    ) -> Self {
        Self {
            color_formats,
            depth_stencil_format: Some(depth_stencil_format),
            sample_count,
            write_mask: 0,
            depth_write: true,
        }
    }
}

pub(crate) struct DeviceContextInner {
    device_info: DeviceInfo,
    destroyed: AtomicBool,

    // Command lists on different threads may request the same clear pipeline
    // concurrently; lookup-or-insert is serialized here. Lives on the device
    // so teardown releases every cached pipeline.
    pub(crate) clear_pipelines: Mutex<FnvHashMap<ClearPipelineKey, Arc<BackendClearPipeline>>>,

    pub(crate) backend_device_context: BackendDeviceContext,
}

impl Drop for DeviceContextInner {
    fn drop(&mut self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            log::trace!("destroying device");
            self.clear_pipelines.lock().unwrap().clear();
            self.backend_device_context.destroy();
            log::trace!("destroyed device");
        }
    }
}

#[derive(Clone)]
pub struct DeviceContext {
    pub(crate) inner: Arc<DeviceContextInner>,
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext").finish()
    }
}

impl DeviceContext {
    pub(crate) fn new(backend_api: &BackendApi, api_def: &ApiDef) -> GfxResult<Self> {
        let (backend_device_context, device_info) = BackendDeviceContext::new(backend_api, api_def)?;

        Ok(Self {
            inner: Arc::new(DeviceContextInner {
                device_info,
                destroyed: AtomicBool::new(false),
                clear_pipelines: Mutex::new(FnvHashMap::default()),
                backend_device_context,
            }),
        })
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.inner.device_info
    }

    pub fn create_queue(&self, queue_type: QueueType) -> GfxResult<Queue> {
        Queue::new(self, queue_type)
    }

    pub fn create_fence(&self) -> GfxResult<Fence> {
        Ok(Fence::new(self))
    }

    pub fn create_semaphore(&self) -> GfxResult<Semaphore> {
        Semaphore::new(self)
    }

    pub fn create_swapchain(
        &self,
        raw_window_handle: &dyn raw_window_handle::HasRawWindowHandle,
        swapchain_def: &SwapchainDef,
    ) -> GfxResult<Swapchain> {
        Swapchain::new(self, raw_window_handle, swapchain_def)
    }

    pub fn create_buffer(&self, buffer_def: &BufferDef) -> GfxResult<Buffer> {
        Buffer::new(self, buffer_def)
    }

    pub fn create_texture(&self, texture_def: &TextureDef) -> GfxResult<Texture> {
        Texture::new(self, texture_def)
    }

    pub fn create_sampler(&self, sampler_def: &SamplerDef) -> GfxResult<Sampler> {
        Sampler::new(self, sampler_def)
    }

    pub fn create_heap(&self, heap_def: &HeapDef) -> GfxResult<Heap> {
        Heap::new(self, heap_def)
    }

    pub fn create_shader_module(&self, shader_module_def: ShaderModuleDef<'_>) -> GfxResult<ShaderModule> {
        ShaderModule::new(self, shader_module_def)
    }

    pub fn create_shader(&self, stages: Vec<ShaderStageDef>) -> GfxResult<Shader> {
        Shader::new(self, stages)
    }

    pub fn create_descriptor_set_layout(
        &self,
        def: &DescriptorSetLayoutDef,
    ) -> GfxResult<DescriptorSetLayout> {
        DescriptorSetLayout::new(self, def)
    }

    pub fn create_descriptor_set(&self, layout: &DescriptorSetLayout) -> DescriptorSet {
        DescriptorSet::new(layout)
    }

    pub fn create_pipeline_layout(&self, def: PipelineLayoutDef) -> GfxResult<PipelineLayout> {
        PipelineLayout::new(self, def)
    }

    pub fn create_graphics_pipeline(
        &self,
        pipeline_def: &GraphicsPipelineDef<'_>,
    ) -> GfxResult<Pipeline> {
        Pipeline::new_graphics_pipeline(self, pipeline_def)
    }

    pub fn create_compute_pipeline(
        &self,
        pipeline_def: &ComputePipelineDef<'_>,
    ) -> GfxResult<Pipeline> {
        Pipeline::new_compute_pipeline(self, pipeline_def)
    }

    pub(crate) fn clear_pipeline(
        &self,
        key: &ClearPipelineKey,
    ) -> GfxResult<Arc<BackendClearPipeline>> {
        let mut cache = self.inner.clear_pipelines.lock().unwrap();
        if let Some(pipeline) = cache.get(key) {
            return Ok(pipeline.clone());
        }
        let pipeline = Arc::new(BackendClearPipeline::new(self, key)?);
        cache.insert(key.clone(), pipeline.clone());
        Ok(pipeline)
    }
}
