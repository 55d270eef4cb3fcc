use std::ffi::c_void;
use std::mem;

use metal::{
    MTLBlitOption, MTLClearColor, MTLLoadAction, MTLOrigin, MTLPrimitiveType, MTLResourceUsage,
    MTLScissorRect, MTLSize, MTLStoreAction, MTLViewport,
};

use crate::command_buffer::RenderPassSetup;
use crate::descriptor_set::DescriptorRef;
use crate::pipeline::PipelineBindState;
use crate::{
    Buffer, BufferCopy, CmdCopyBufferToTextureParams, CmdCopyTextureParams, CommandBuffer,
    CommandBufferDef, DescriptorSet, DescriptorSetLayout, GfxError, GfxResult, PipelineType,
    Queue, ScissorRect, ShaderStageFlags, Texture, Viewport,
};

use super::pipeline::CLEAR_PARAMS_SLOT;
use super::{conversions, MetalClearPipeline};

/// Inline parameter block for the cached clear draw.
#[repr(C)]
struct ClearParams {
    color: [f32; 4],
    depth: f32,
    _pad: [f32; 3],
}

/// Per-rectangle parameter block for the compute resolve fallback.
#[repr(C)]
struct ResolveRegion {
    src_offset: [u32; 2],
    dst_offset: [u32; 2],
    extent: [u32; 2],
}

/// Stages the work of one command list onto native command buffers. At most
/// one encoder is open at a time; the frontend closes the previous pass
/// before opening the next.
pub(crate) struct MetalCommandBuffer {
    queue: metal::CommandQueue,
    pub(crate) command_buffer: Option<metal::CommandBuffer>,
    render_encoder: Option<metal::RenderCommandEncoder>,
    compute_encoder: Option<metal::ComputeCommandEncoder>,
    blit_encoder: Option<metal::BlitCommandEncoder>,
    /// Draw-call arguments that are pipeline state elsewhere but per-call
    /// arguments here; captured at bind time.
    primitive_type: MTLPrimitiveType,
    thread_group_size: MTLSize,
}

impl MetalCommandBuffer {
    pub(crate) fn new(queue: &Queue, _command_buffer_def: &CommandBufferDef) -> GfxResult<Self> {
        let queue_ref: &metal::CommandQueueRef = &queue.backend_queue.queue;
        Ok(Self {
            queue: queue_ref.to_owned(),
            command_buffer: None,
            render_encoder: None,
            compute_encoder: None,
            blit_encoder: None,
            primitive_type: MTLPrimitiveType::Triangle,
            thread_group_size: MTLSize {
                width: 1,
                height: 1,
                depth: 1,
            },
        })
    }

    fn native(&self) -> &metal::CommandBufferRef {
        self.command_buffer.as_ref().expect("not recording")
    }

    fn render_encoder(&self) -> &metal::RenderCommandEncoderRef {
        self.render_encoder.as_ref().expect("no open render pass")
    }

    fn compute_encoder(&self) -> &metal::ComputeCommandEncoderRef {
        self.compute_encoder.as_ref().expect("no open compute pass")
    }

    fn blit_encoder(&self) -> &metal::BlitCommandEncoderRef {
        self.blit_encoder.as_ref().expect("no open blit pass")
    }
}

#[derive(Clone, Copy)]
enum ActiveEncoder<'a> {
    Render(&'a metal::RenderCommandEncoderRef),
    Compute(&'a metal::ComputeCommandEncoderRef),
}

impl ActiveEncoder<'_> {
    fn use_resource(self, resource: &metal::ResourceRef, read_write: bool) {
        let usage = if read_write {
            MTLResourceUsage::Read | MTLResourceUsage::Write
        } else {
            MTLResourceUsage::Read
        };
        match self {
            Self::Render(encoder) => encoder.use_resource(resource, usage),
            Self::Compute(encoder) => encoder.use_resource(resource, usage),
        }
    }
}

impl CommandBuffer {
    pub(crate) fn backend_begin(&mut self) -> GfxResult<()> {
        let backend = &mut self.backend_command_buffer;
        backend.command_buffer = Some(backend.queue.new_command_buffer().to_owned());
        Ok(())
    }

    pub(crate) fn backend_end(&mut self) -> GfxResult<()> {
        // commit happens at submit; nothing to flush here
        Ok(())
    }

    pub(crate) fn backend_begin_render_pass(&mut self, setup: &RenderPassSetup) -> GfxResult<()> {
        let descriptor = metal::RenderPassDescriptor::new();

        for (i, target) in setup.color_targets.iter().enumerate() {
            let attachment = descriptor
                .color_attachments()
                .object_at(i as u64)
                .ok_or_else(|| GfxError::from("too many color attachments"))?;
            attachment.set_texture(Some(&target.texture_view.inner.backend_texture_view.texture));
            attachment.set_load_action(conversions::load_action(target.load_op));
            attachment.set_store_action(conversions::store_action(target.store_op));
            let [r, g, b, a] = target.clear_value.0;
            attachment.set_clear_color(MTLClearColor::new(
                f64::from(r),
                f64::from(g),
                f64::from(b),
                f64::from(a),
            ));
        }

        if let Some(target) = &setup.depth_stencil_target {
            let texture = &target.texture_view.inner.backend_texture_view.texture;
            let attachment = descriptor
                .depth_attachment()
                .ok_or_else(|| GfxError::from("missing depth attachment slot"))?;
            attachment.set_texture(Some(texture));
            attachment.set_load_action(conversions::load_action(target.depth_load_op));
            attachment.set_store_action(conversions::store_action(target.depth_store_op));
            attachment.set_clear_depth(f64::from(target.clear_value.depth));

            if target.texture_view.format().has_stencil() {
                let stencil = descriptor
                    .stencil_attachment()
                    .ok_or_else(|| GfxError::from("missing stencil attachment slot"))?;
                stencil.set_texture(Some(texture));
                stencil.set_load_action(conversions::load_action(target.stencil_load_op));
                stencil.set_store_action(conversions::store_action(target.stencil_store_op));
                stencil.set_clear_stencil(target.clear_value.stencil);
            }
        }

        let backend = &mut self.backend_command_buffer;
        let encoder = backend
            .command_buffer
            .as_ref()
            .expect("not recording")
            .new_render_command_encoder(descriptor);
        backend.render_encoder = Some(encoder.to_owned());
        Ok(())
    }

    pub(crate) fn backend_end_render_pass(&mut self) {
        if let Some(encoder) = self.backend_command_buffer.render_encoder.take() {
            encoder.end_encoding();
        }
    }

    pub(crate) fn backend_begin_compute_pass(&mut self) -> GfxResult<()> {
        let backend = &mut self.backend_command_buffer;
        let encoder = backend
            .command_buffer
            .as_ref()
            .expect("not recording")
            .new_compute_command_encoder();
        backend.compute_encoder = Some(encoder.to_owned());
        Ok(())
    }

    pub(crate) fn backend_end_compute_pass(&mut self) {
        if let Some(encoder) = self.backend_command_buffer.compute_encoder.take() {
            encoder.end_encoding();
        }
    }

    pub(crate) fn backend_begin_blit_pass(&mut self) -> GfxResult<()> {
        let backend = &mut self.backend_command_buffer;
        let encoder = backend
            .command_buffer
            .as_ref()
            .expect("not recording")
            .new_blit_command_encoder();
        backend.blit_encoder = Some(encoder.to_owned());
        Ok(())
    }

    pub(crate) fn backend_end_blit_pass(&mut self) {
        if let Some(encoder) = self.backend_command_buffer.blit_encoder.take() {
            encoder.end_encoding();
        }
    }

    pub(crate) fn backend_bind_pipeline(&mut self, pipeline: &crate::Pipeline) {
        match (&pipeline.inner.backend_pipeline, &pipeline.inner.bind_state) {
            (
                super::MetalPipeline::Graphics {
                    pipeline,
                    depth_stencil,
                },
                PipelineBindState::Graphics {
                    cull_mode,
                    front_face,
                    fill_mode,
                    primitive_topology,
                    ..
                },
            ) => {
                {
                    let encoder = self.backend_command_buffer.render_encoder();
                    encoder.set_render_pipeline_state(pipeline);
                    if let Some(depth_stencil) = depth_stencil {
                        encoder.set_depth_stencil_state(depth_stencil);
                    }
                    encoder.set_cull_mode(conversions::cull_mode(*cull_mode));
                    encoder.set_front_facing_winding(conversions::winding(*front_face));
                    encoder.set_triangle_fill_mode(conversions::triangle_fill_mode(*fill_mode));
                }
                self.backend_command_buffer.primitive_type =
                    conversions::primitive_type(*primitive_topology);
            }
            (
                super::MetalPipeline::Compute { pipeline },
                PipelineBindState::Compute { thread_group_size },
            ) => {
                self.backend_command_buffer
                    .compute_encoder()
                    .set_compute_pipeline_state(pipeline);
                self.backend_command_buffer.thread_group_size = MTLSize {
                    width: u64::from(thread_group_size[0]),
                    height: u64::from(thread_group_size[1]),
                    depth: u64::from(thread_group_size[2]),
                };
            }
            _ => panic!("pipeline kind does not match its bind state"),
        }
    }

    /// Only the first viewport applies; multi-viewport rendering is not part
    /// of the binding model here.
    pub(crate) fn backend_set_viewports(&mut self, viewports: &[Viewport]) {
        if let Some(viewport) = viewports.first() {
            self.backend_command_buffer
                .render_encoder()
                .set_viewport(MTLViewport {
                    originX: f64::from(viewport.x),
                    originY: f64::from(viewport.y),
                    width: f64::from(viewport.width),
                    height: f64::from(viewport.height),
                    znear: f64::from(viewport.depth_min),
                    zfar: f64::from(viewport.depth_max),
                });
        }
    }

    pub(crate) fn backend_set_scissors(&mut self, scissors: &[ScissorRect]) {
        if let Some(scissor) = scissors.first() {
            self.backend_command_buffer
                .render_encoder()
                .set_scissor_rect(MTLScissorRect {
                    x: u64::from(scissor.x),
                    y: u64::from(scissor.y),
                    width: u64::from(scissor.width),
                    height: u64::from(scissor.height),
                });
        }
    }

    pub(crate) fn backend_bind_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, byte_offset: u64) {
        self.backend_command_buffer.render_encoder().set_vertex_buffer(
            u64::from(slot),
            Some(&buffer.inner.backend_buffer.buffer),
            byte_offset,
        );
    }

    /// Replays one bound set: writes every caller binding (plus baked static
    /// samplers) through the layout's argument encoder into the claimed ring
    /// region, declares residency on the open encoder, then binds the region
    /// at the set's frequency slot.
    pub(crate) fn backend_bind_descriptor_set(
        &mut self,
        layout: &DescriptorSetLayout,
        descriptor_set: &DescriptorSet,
        ring_offset: u64,
        pipeline_type: PipelineType,
        skip_vertex_stage: bool,
    ) -> GfxResult<()> {
        let backend_layout = &layout.inner.backend_layout;
        let argument_encoder = backend_layout.argument_encoder.lock().unwrap();
        argument_encoder.set_argument_buffer(&backend_layout.ring_buffer, ring_offset);

        let active = match pipeline_type {
            PipelineType::Graphics => {
                ActiveEncoder::Render(self.backend_command_buffer.render_encoder())
            }
            PipelineType::Compute => {
                ActiveEncoder::Compute(self.backend_command_buffer.compute_encoder())
            }
        };

        for (flat_index, sampler) in layout.static_samplers() {
            argument_encoder.set_sampler_state(
                u64::from(layout.argument_slot(*flat_index)),
                &sampler.inner.backend_sampler.sampler,
            );
        }

        descriptor_set.for_each_binding(|flat_index, descriptor| {
            let slot = u64::from(layout.argument_slot(flat_index));
            let read_write = layout.descriptor_type(flat_index).is_read_write();
            match descriptor {
                DescriptorRef::Buffer { buffer, offset } => {
                    let native = &buffer.inner.backend_buffer.buffer;
                    argument_encoder.set_buffer(slot, native, offset);
                    active.use_resource(native, read_write);
                }
                DescriptorRef::BufferView { view } => {
                    let native = &view.buffer().inner.backend_buffer.buffer;
                    argument_encoder.set_buffer(
                        slot,
                        native,
                        view.definition().derived_byte_offset(),
                    );
                    active.use_resource(native, read_write);
                }
                DescriptorRef::Texture { texture } => {
                    let native = &texture.inner.backend_texture.texture;
                    argument_encoder.set_texture(slot, native);
                    active.use_resource(native, read_write);
                }
                DescriptorRef::TextureView { view } => {
                    let native = &view.inner.backend_texture_view.texture;
                    argument_encoder.set_texture(slot, native);
                    active.use_resource(native, read_write);
                }
                DescriptorRef::Sampler { sampler } => {
                    argument_encoder
                        .set_sampler_state(slot, &sampler.inner.backend_sampler.sampler);
                }
            }
        });

        let frequency = u64::from(layout.frequency());
        match active {
            ActiveEncoder::Render(encoder) => {
                encoder.set_fragment_buffer(frequency, Some(&backend_layout.ring_buffer), ring_offset);
                if !skip_vertex_stage {
                    encoder.set_vertex_buffer(
                        frequency,
                        Some(&backend_layout.ring_buffer),
                        ring_offset,
                    );
                }
            }
            ActiveEncoder::Compute(encoder) => {
                encoder.set_buffer(frequency, Some(&backend_layout.ring_buffer), ring_offset);
            }
        }
        Ok(())
    }

    pub(crate) fn backend_push_constants(
        &mut self,
        slot: u32,
        stage_flags: ShaderStageFlags,
        data: &[u8],
    ) {
        let slot = u64::from(slot);
        let length = data.len() as u64;
        let bytes = data.as_ptr().cast::<c_void>();

        if stage_flags.intersects(ShaderStageFlags::COMPUTE) {
            self.backend_command_buffer
                .compute_encoder()
                .set_bytes(slot, length, bytes);
        }
        if stage_flags.intersects(ShaderStageFlags::GRAPHICS_STAGE_FLAGS) {
            let encoder = self.backend_command_buffer.render_encoder();
            if stage_flags.intersects(ShaderStageFlags::VERTEX) {
                encoder.set_vertex_bytes(slot, length, bytes);
            }
            if stage_flags.intersects(ShaderStageFlags::FRAGMENT) {
                encoder.set_fragment_bytes(slot, length, bytes);
            }
        }
    }

    pub(crate) fn backend_draw(&mut self, vertex_count: u32, first_vertex: u32) -> GfxResult<()> {
        let backend = &self.backend_command_buffer;
        backend.render_encoder().draw_primitives(
            backend.primitive_type,
            u64::from(first_vertex),
            u64::from(vertex_count),
        );
        Ok(())
    }

    pub(crate) fn backend_draw_instanced(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
        first_instance: u32,
    ) -> GfxResult<()> {
        let backend = &self.backend_command_buffer;
        let encoder = backend.render_encoder();
        if first_instance == 0 {
            encoder.draw_primitives_instanced(
                backend.primitive_type,
                u64::from(first_vertex),
                u64::from(vertex_count),
                u64::from(instance_count),
            );
        } else {
            encoder.draw_primitives_instanced_base_instance(
                backend.primitive_type,
                u64::from(first_vertex),
                u64::from(vertex_count),
                u64::from(instance_count),
                u64::from(first_instance),
            );
        }
        Ok(())
    }

    pub(crate) fn backend_draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> GfxResult<()> {
        let bound = self
            .bound_index_buffer()
            .ok_or_else(|| GfxError::from("indexed draw without an index buffer"))?
            .clone();
        let index_buffer = &bound.buffer.inner.backend_buffer.buffer;
        let offset =
            bound.byte_offset + u64::from(first_index) * conversions::index_size(bound.index_type);

        let backend = &self.backend_command_buffer;
        let encoder = backend.render_encoder();
        if vertex_offset == 0 {
            encoder.draw_indexed_primitives(
                backend.primitive_type,
                u64::from(index_count),
                conversions::index_type(bound.index_type),
                index_buffer,
                offset,
            );
        } else {
            encoder.draw_indexed_primitives_instanced_base_instance(
                backend.primitive_type,
                u64::from(index_count),
                conversions::index_type(bound.index_type),
                index_buffer,
                offset,
                1,
                i64::from(vertex_offset),
                0,
            );
        }
        Ok(())
    }

    pub(crate) fn backend_draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        first_instance: u32,
        vertex_offset: i32,
    ) -> GfxResult<()> {
        let bound = self
            .bound_index_buffer()
            .ok_or_else(|| GfxError::from("indexed draw without an index buffer"))?
            .clone();
        let index_buffer = &bound.buffer.inner.backend_buffer.buffer;
        let offset =
            bound.byte_offset + u64::from(first_index) * conversions::index_size(bound.index_type);

        let backend = &self.backend_command_buffer;
        let encoder = backend.render_encoder();
        if vertex_offset == 0 && first_instance == 0 {
            encoder.draw_indexed_primitives_instanced(
                backend.primitive_type,
                u64::from(index_count),
                conversions::index_type(bound.index_type),
                index_buffer,
                offset,
                u64::from(instance_count),
            );
        } else {
            encoder.draw_indexed_primitives_instanced_base_instance(
                backend.primitive_type,
                u64::from(index_count),
                conversions::index_type(bound.index_type),
                index_buffer,
                offset,
                u64::from(instance_count),
                i64::from(vertex_offset),
                u64::from(first_instance),
            );
        }
        Ok(())
    }

    pub(crate) fn backend_dispatch(&mut self, group_counts: [u32; 3]) -> GfxResult<()> {
        let backend = &self.backend_command_buffer;
        backend.compute_encoder().dispatch_thread_groups(
            MTLSize {
                width: u64::from(group_counts[0]),
                height: u64::from(group_counts[1]),
                depth: u64::from(group_counts[2]),
            },
            backend.thread_group_size,
        );
        Ok(())
    }

    pub(crate) fn backend_copy_buffer_to_buffer(
        &mut self,
        src_buffer: &Buffer,
        dst_buffer: &Buffer,
        copy_data: &[BufferCopy],
    ) -> GfxResult<()> {
        let encoder = self.backend_command_buffer.blit_encoder();
        for copy in copy_data {
            encoder.copy_from_buffer(
                &src_buffer.inner.backend_buffer.buffer,
                copy.src_offset,
                &dst_buffer.inner.backend_buffer.buffer,
                copy.dst_offset,
                copy.size,
            );
        }
        Ok(())
    }

    pub(crate) fn backend_copy_buffer_to_texture(
        &mut self,
        src_buffer: &Buffer,
        dst_texture: &Texture,
        params: &CmdCopyBufferToTextureParams,
    ) -> GfxResult<()> {
        let texture_def = dst_texture.definition();
        let width = (texture_def.extents.width >> params.mip_level).max(1);
        let height = (texture_def.extents.height >> params.mip_level).max(1);
        let depth = (texture_def.extents.depth >> params.mip_level).max(1);
        let bytes_per_row = conversions::bytes_per_row(texture_def.format, width);
        let bytes_per_image = bytes_per_row * conversions::rows_per_image(texture_def.format, height);

        self.backend_command_buffer.blit_encoder().copy_from_buffer_to_texture(
            &src_buffer.inner.backend_buffer.buffer,
            params.buffer_offset,
            bytes_per_row,
            bytes_per_image,
            MTLSize {
                width: u64::from(width),
                height: u64::from(height),
                depth: u64::from(depth),
            },
            &dst_texture.inner.backend_texture.texture,
            u64::from(params.array_slice),
            u64::from(params.mip_level),
            MTLOrigin { x: 0, y: 0, z: 0 },
            MTLBlitOption::empty(),
        );
        Ok(())
    }

    pub(crate) fn backend_copy_texture(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
        params: &CmdCopyTextureParams,
    ) -> GfxResult<()> {
        self.backend_command_buffer.blit_encoder().copy_from_texture(
            &src_texture.inner.backend_texture.texture,
            u64::from(params.src_array_slice),
            u64::from(params.src_mip_level),
            MTLOrigin {
                x: u64::from(params.src_offset.x),
                y: u64::from(params.src_offset.y),
                z: u64::from(params.src_offset.z),
            },
            MTLSize {
                width: u64::from(params.extent.width),
                height: u64::from(params.extent.height),
                depth: u64::from(params.extent.depth),
            },
            &dst_texture.inner.backend_texture.texture,
            u64::from(params.dst_array_slice),
            u64::from(params.dst_mip_level),
            MTLOrigin {
                x: u64::from(params.dst_offset.x),
                y: u64::from(params.dst_offset.y),
                z: u64::from(params.dst_offset.z),
            },
        );
        Ok(())
    }

    /// Full-screen draw inside the open render pass. Parameters ride at a
    /// reserved slot so caller bindings survive; the frontend re-applies the
    /// pipeline and push constants afterwards.
    pub(crate) fn backend_clear_draw(
        &mut self,
        clear_pipeline: &std::sync::Arc<MetalClearPipeline>,
        color: [f32; 4],
        depth: f32,
    ) -> GfxResult<()> {
        let params = ClearParams {
            color,
            depth,
            _pad: [0.0; 3],
        };

        let encoder = self.backend_command_buffer.render_encoder();
        encoder.set_render_pipeline_state(&clear_pipeline.pipeline);
        if let Some(depth_stencil) = &clear_pipeline.depth_stencil {
            encoder.set_depth_stencil_state(depth_stencil);
        }
        let bytes = (&params as *const ClearParams).cast::<c_void>();
        let length = mem::size_of::<ClearParams>() as u64;
        encoder.set_vertex_bytes(CLEAR_PARAMS_SLOT, length, bytes);
        encoder.set_fragment_bytes(CLEAR_PARAMS_SLOT, length, bytes);
        encoder.draw_primitives(MTLPrimitiveType::Triangle, 0, 3);
        Ok(())
    }

    /// Whole-surface resolve through a transient load/resolve render pass.
    pub(crate) fn backend_resolve_texture(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
    ) -> GfxResult<()> {
        let descriptor = metal::RenderPassDescriptor::new();
        let src = &src_texture.inner.backend_texture.texture;
        let dst = &dst_texture.inner.backend_texture.texture;

        if src_texture.definition().format.is_depth() {
            let attachment = descriptor
                .depth_attachment()
                .ok_or_else(|| GfxError::from("missing depth attachment slot"))?;
            attachment.set_texture(Some(src));
            attachment.set_resolve_texture(Some(dst));
            attachment.set_load_action(MTLLoadAction::Load);
            attachment.set_store_action(MTLStoreAction::MultisampleResolve);
        } else {
            let attachment = descriptor
                .color_attachments()
                .object_at(0)
                .ok_or_else(|| GfxError::from("missing color attachment slot"))?;
            attachment.set_texture(Some(src));
            attachment.set_resolve_texture(Some(dst));
            attachment.set_load_action(MTLLoadAction::Load);
            attachment.set_store_action(MTLStoreAction::MultisampleResolve);
        }

        let encoder = self
            .backend_command_buffer
            .native()
            .new_render_command_encoder(descriptor);
        encoder.end_encoding();
        Ok(())
    }

    /// Sub-rectangle resolve; the blit encoder cannot express this, so a
    /// small compute kernel averages the samples.
    pub(crate) fn backend_resolve_texture_region(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
        params: &crate::CmdResolveTextureRegionParams,
    ) -> GfxResult<()> {
        debug_assert_eq!(params.array_slice, 0, "region resolve targets slice 0");

        let pipeline = self
            .device_context()
            .inner
            .backend_device_context
            .resolve_region_pipeline()?;

        let region = ResolveRegion {
            src_offset: [params.src_offset.x, params.src_offset.y],
            dst_offset: [params.dst_offset.x, params.dst_offset.y],
            extent: [params.extent.width, params.extent.height],
        };

        let encoder = self.backend_command_buffer.native().new_compute_command_encoder();
        encoder.set_compute_pipeline_state(&pipeline);
        encoder.set_texture(0, Some(&src_texture.inner.backend_texture.texture));
        encoder.set_texture(1, Some(&dst_texture.inner.backend_texture.texture));
        encoder.set_bytes(
            0,
            mem::size_of::<ResolveRegion>() as u64,
            (&region as *const ResolveRegion).cast::<c_void>(),
        );
        encoder.dispatch_thread_groups(
            MTLSize {
                width: u64::from((params.extent.width + 7) / 8),
                height: u64::from((params.extent.height + 7) / 8),
                depth: 1,
            },
            MTLSize {
                width: 8,
                height: 8,
                depth: 1,
            },
        );
        encoder.end_encoding();
        Ok(())
    }
}
