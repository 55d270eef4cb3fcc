use std::sync::Arc;

use crate::backends::BackendPipeline;
use crate::{
    BlendState, CullMode, DepthState, DeviceContext, FillMode, Format, FrontFace, GfxResult,
    PipelineLayout, PipelineType, PrimitiveTopology, RasterizerState, SampleCount, Shader,
    ShaderStageFlags, VertexLayout,
};

#[derive(Clone)]
pub struct GraphicsPipelineDef<'a> {
    pub shader: &'a Shader,
    pub pipeline_layout: &'a PipelineLayout,
    pub vertex_layout: &'a VertexLayout,
    pub blend_state: &'a BlendState,
    pub depth_state: &'a DepthState,
    pub rasterizer_state: &'a RasterizerState,
    pub color_formats: &'a [Format],
    pub depth_stencil_format: Option<Format>,
    pub sample_count: SampleCount,
    pub primitive_topology: PrimitiveTopology,
}

#[derive(Clone)]
pub struct ComputePipelineDef<'a> {
    pub shader: &'a Shader,
    pub pipeline_layout: &'a PipelineLayout,
    /// Thread-group size declared by the kernel; reported by the offline
    /// shader compiler alongside the library blob.
    pub thread_group_size: [u32; 3],
}

/// State that is encoder-level on this platform rather than baked into the
/// compiled pipeline; denormalized here so the command list can re-apply it
/// every time the pipeline is bound.
#[derive(Clone, Copy, Debug)]
pub(crate) enum PipelineBindState {
    Graphics {
        cull_mode: CullMode,
        front_face: FrontFace,
        fill_mode: FillMode,
        primitive_topology: PrimitiveTopology,
        sample_count: SampleCount,
    },
    Compute {
        thread_group_size: [u32; 3],
    },
}

pub(crate) struct PipelineInner {
    pipeline_layout: PipelineLayout,
    pipeline_type: PipelineType,
    uid: u64,
    pub(crate) bind_state: PipelineBindState,
    pub(crate) backend_pipeline: BackendPipeline,
}

impl Drop for PipelineInner {
    fn drop(&mut self) {
        self.backend_pipeline
            .destroy(self.pipeline_layout.device_context());
    }
}

#[derive(Clone)]
pub struct Pipeline {
    pub(crate) inner: Arc<PipelineInner>,
}

impl Pipeline {
    pub fn new_graphics_pipeline(
        device_context: &DeviceContext,
        pipeline_def: &GraphicsPipelineDef<'_>,
    ) -> GfxResult<Self> {
        assert!(pipeline_def
            .shader
            .stage_flags()
            .intersects(ShaderStageFlags::VERTEX));
        assert!(
            !pipeline_def.color_formats.is_empty() || pipeline_def.depth_stencil_format.is_some()
        );

        let backend_pipeline = BackendPipeline::new_graphics_pipeline(device_context, pipeline_def)
            .map_err(|e| {
                log::error!("Error creating graphics pipeline {:?}", e);
                e
            })?;

        let rasterizer = pipeline_def.rasterizer_state;
        Ok(Self {
            inner: Arc::new(PipelineInner {
                pipeline_layout: pipeline_def.pipeline_layout.clone(),
                pipeline_type: PipelineType::Graphics,
                uid: crate::internal::next_uid(),
                bind_state: PipelineBindState::Graphics {
                    cull_mode: rasterizer.cull_mode,
                    front_face: rasterizer.front_face,
                    fill_mode: rasterizer.fill_mode,
                    primitive_topology: pipeline_def.primitive_topology,
                    sample_count: pipeline_def.sample_count,
                },
                backend_pipeline,
            }),
        })
    }

    pub fn new_compute_pipeline(
        device_context: &DeviceContext,
        pipeline_def: &ComputePipelineDef<'_>,
    ) -> GfxResult<Self> {
        assert!(pipeline_def
            .shader
            .stage_flags()
            .intersects(ShaderStageFlags::COMPUTE));
        assert!(pipeline_def.thread_group_size.iter().all(|&size| size > 0));

        let backend_pipeline = BackendPipeline::new_compute_pipeline(device_context, pipeline_def)
            .map_err(|e| {
                log::error!("Error creating compute pipeline {:?}", e);
                e
            })?;

        Ok(Self {
            inner: Arc::new(PipelineInner {
                pipeline_layout: pipeline_def.pipeline_layout.clone(),
                pipeline_type: PipelineType::Compute,
                uid: crate::internal::next_uid(),
                bind_state: PipelineBindState::Compute {
                    thread_group_size: pipeline_def.thread_group_size,
                },
                backend_pipeline,
            }),
        })
    }

    pub fn pipeline_type(&self) -> PipelineType {
        self.inner.pipeline_type
    }

    pub fn pipeline_layout(&self) -> &PipelineLayout {
        &self.inner.pipeline_layout
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }

    pub fn sample_count(&self) -> Option<SampleCount> {
        match self.inner.bind_state {
            PipelineBindState::Graphics { sample_count, .. } => Some(sample_count),
            PipelineBindState::Compute { .. } => None,
        }
    }

    pub(crate) fn thread_group_size(&self) -> [u32; 3] {
        match self.inner.bind_state {
            PipelineBindState::Compute { thread_group_size } => thread_group_size,
            PipelineBindState::Graphics { .. } => panic!("not a compute pipeline"),
        }
    }
}
