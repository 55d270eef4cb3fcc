use std::ffi::c_void;

use metal::MTLDataType;

use crate::{
    BlendStateRenderTarget, ClearPipelineKey, ComputePipelineDef, DepthState, DeviceContext,
    GfxError, GfxResult, GraphicsPipelineDef, ShaderStageDef, ShaderStageFlags,
};

use super::conversions;

/// Buffer slot the clear draw's inline parameters live at, far above the
/// descriptor-set, push-constant and vertex-buffer slots so a clear never
/// clobbers caller bindings.
pub(crate) const CLEAR_PARAMS_SLOT: u64 = 30;

fn stage_function(stage: &ShaderStageDef) -> GfxResult<metal::Function> {
    let library = &stage.shader_module.inner.backend_shader_module.library;
    let constants = if stage.specializations.is_empty() {
        None
    } else {
        let values = metal::FunctionConstantValues::new();
        for specialization in &stage.specializations {
            values.set_constant_value_at_index(
                (&specialization.value as *const u32).cast::<c_void>(),
                MTLDataType::UInt,
                u64::from(specialization.index),
            );
        }
        Some(values)
    };
    library
        .get_function(&stage.entry_point, constants)
        .map_err(GfxError::ShaderCompileError)
}

fn apply_blend_target(
    attachment: &metal::RenderPipelineColorAttachmentDescriptorRef,
    target: &BlendStateRenderTarget,
) {
    attachment.set_blending_enabled(target.blend_enabled);
    attachment.set_source_rgb_blend_factor(conversions::blend_factor(target.src_factor));
    attachment.set_destination_rgb_blend_factor(conversions::blend_factor(target.dst_factor));
    attachment.set_rgb_blend_operation(conversions::blend_op(target.blend_op));
    attachment.set_source_alpha_blend_factor(conversions::blend_factor(target.src_factor_alpha));
    attachment
        .set_destination_alpha_blend_factor(conversions::blend_factor(target.dst_factor_alpha));
    attachment.set_alpha_blend_operation(conversions::blend_op(target.blend_op_alpha));
    attachment.set_write_mask(conversions::color_write_mask(target.masks));
}

fn stencil_descriptor(
    compare: crate::CompareOp,
    fail: crate::StencilOp,
    depth_fail: crate::StencilOp,
    pass: crate::StencilOp,
    read_mask: u8,
    write_mask: u8,
) -> metal::StencilDescriptor {
    let descriptor = metal::StencilDescriptor::new();
    descriptor.set_stencil_compare_function(conversions::compare_function(compare));
    descriptor.set_stencil_failure_operation(conversions::stencil_operation(fail));
    descriptor.set_depth_failure_operation(conversions::stencil_operation(depth_fail));
    descriptor.set_depth_stencil_pass_operation(conversions::stencil_operation(pass));
    descriptor.set_read_mask(u32::from(read_mask));
    descriptor.set_write_mask(u32::from(write_mask));
    descriptor
}

fn depth_stencil_state(
    device: &metal::DeviceRef,
    depth_state: &DepthState,
) -> metal::DepthStencilState {
    let descriptor = metal::DepthStencilDescriptor::new();
    if depth_state.depth_test_enable {
        descriptor.set_depth_compare_function(conversions::compare_function(
            depth_state.depth_compare_op,
        ));
    } else {
        descriptor.set_depth_compare_function(metal::MTLCompareFunction::Always);
    }
    descriptor.set_depth_write_enabled(depth_state.depth_write_enable);

    if depth_state.stencil_test_enable {
        descriptor.set_front_face_stencil(Some(&stencil_descriptor(
            depth_state.front_stencil_compare_op,
            depth_state.front_stencil_fail_op,
            depth_state.front_depth_fail_op,
            depth_state.front_stencil_pass_op,
            depth_state.stencil_read_mask,
            depth_state.stencil_write_mask,
        )));
        descriptor.set_back_face_stencil(Some(&stencil_descriptor(
            depth_state.back_stencil_compare_op,
            depth_state.back_stencil_fail_op,
            depth_state.back_depth_fail_op,
            depth_state.back_stencil_pass_op,
            depth_state.stencil_read_mask,
            depth_state.stencil_write_mask,
        )));
    }

    device.new_depth_stencil_state(&descriptor)
}

pub(crate) enum MetalPipeline {
    Graphics {
        pipeline: metal::RenderPipelineState,
        depth_stencil: Option<metal::DepthStencilState>,
    },
    Compute {
        pipeline: metal::ComputePipelineState,
    },
}

impl MetalPipeline {
    pub(crate) fn new_graphics_pipeline(
        device_context: &DeviceContext,
        pipeline_def: &GraphicsPipelineDef<'_>,
    ) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();

        let vertex_stage = pipeline_def
            .shader
            .stage(ShaderStageFlags::VERTEX)
            .ok_or_else(|| GfxError::from("graphics pipeline requires a vertex stage"))?;

        let descriptor = metal::RenderPipelineDescriptor::new();
        descriptor.set_vertex_function(Some(&stage_function(vertex_stage)?));
        if let Some(fragment_stage) = pipeline_def.shader.stage(ShaderStageFlags::FRAGMENT) {
            descriptor.set_fragment_function(Some(&stage_function(fragment_stage)?));
        }

        let default_target = BlendStateRenderTarget::default();
        for (i, format) in pipeline_def.color_formats.iter().enumerate() {
            let attachment = descriptor
                .color_attachments()
                .object_at(i as u64)
                .ok_or_else(|| GfxError::from("too many color attachments"))?;
            attachment.set_pixel_format(conversions::pixel_format(*format));

            let targets = &pipeline_def.blend_state.render_targets;
            let target = if pipeline_def.blend_state.independent_blend {
                targets.get(i).unwrap_or(&default_target)
            } else {
                targets.first().unwrap_or(&default_target)
            };
            apply_blend_target(attachment, target);
        }

        if let Some(format) = pipeline_def.depth_stencil_format {
            descriptor.set_depth_attachment_pixel_format(conversions::pixel_format(format));
            if format.has_stencil() {
                descriptor.set_stencil_attachment_pixel_format(conversions::pixel_format(format));
            }
        }

        descriptor.set_sample_count(u64::from(pipeline_def.sample_count.as_u32()));
        descriptor.set_input_primitive_topology(conversions::topology_class(
            pipeline_def.primitive_topology,
        ));

        if !pipeline_def.vertex_layout.attributes.is_empty() {
            let vertex_descriptor = metal::VertexDescriptor::new();
            for attribute in &pipeline_def.vertex_layout.attributes {
                let slot = vertex_descriptor
                    .attributes()
                    .object_at(u64::from(attribute.location))
                    .ok_or_else(|| GfxError::from("vertex attribute location out of range"))?;
                slot.set_format(conversions::vertex_format(attribute.format));
                slot.set_buffer_index(u64::from(attribute.buffer_index));
                slot.set_offset(u64::from(attribute.byte_offset));
            }
            for (i, buffer) in pipeline_def.vertex_layout.buffers.iter().enumerate() {
                let layout = vertex_descriptor
                    .layouts()
                    .object_at(i as u64)
                    .ok_or_else(|| GfxError::from("vertex buffer binding out of range"))?;
                layout.set_stride(u64::from(buffer.stride));
                layout.set_step_function(conversions::step_function(buffer.rate));
                layout.set_step_rate(1);
            }
            descriptor.set_vertex_descriptor(Some(vertex_descriptor));
        }

        let pipeline = device
            .new_render_pipeline_state(&descriptor)
            .map_err(GfxError::PipelineCreateError)?;

        let depth_stencil = pipeline_def
            .depth_stencil_format
            .map(|_| depth_stencil_state(device, pipeline_def.depth_state));

        Ok(Self::Graphics {
            pipeline,
            depth_stencil,
        })
    }

    pub(crate) fn new_compute_pipeline(
        device_context: &DeviceContext,
        pipeline_def: &ComputePipelineDef<'_>,
    ) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();

        let compute_stage = pipeline_def
            .shader
            .stage(ShaderStageFlags::COMPUTE)
            .ok_or_else(|| GfxError::from("compute pipeline requires a compute stage"))?;

        let pipeline = device
            .new_compute_pipeline_state_with_function(&stage_function(compute_stage)?)
            .map_err(GfxError::PipelineCreateError)?;

        Ok(Self::Compute { pipeline })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

/// Generates the full-screen clear shader for one attachment-format set. The
/// vertex stage places the clear depth in the position output, so a depth
/// clear is just this draw with depth writes enabled; stencil values cannot
/// be written this way and stencil clears through the draw path are not
/// supported.
fn clear_shader_source(key: &ClearPipelineKey) -> String {
    use std::fmt::Write;

    let mut source = String::from(
        r#"#include <metal_stdlib>
using namespace metal;

struct ClearParams {
    float4 color;
    float depth;
};

vertex float4 clear_vs(uint vid [[vertex_id]],
                       constant ClearParams& params [[buffer(30)]])
{
    float2 pos = float2((vid << 1) & 2, vid & 2);
    return float4(pos * 2.0 - 1.0, params.depth, 1.0);
}
"#,
    );

    if !key.color_formats.is_empty() {
        source.push_str("\nstruct ClearOut {\n");
        for i in 0..key.color_formats.len() {
            let _ = writeln!(source, "    float4 target{i} [[color({i})]];");
        }
        source.push_str("};\n\nfragment ClearOut clear_fs(constant ClearParams& params [[buffer(30)]])\n{\n    ClearOut out;\n");
        for i in 0..key.color_formats.len() {
            let _ = writeln!(source, "    out.target{i} = params.color;");
        }
        source.push_str("    return out;\n}\n");
    }

    source
}

pub(crate) struct MetalClearPipeline {
    pub(crate) pipeline: metal::RenderPipelineState,
    pub(crate) depth_stencil: Option<metal::DepthStencilState>,
}

impl MetalClearPipeline {
    pub(crate) fn new(device_context: &DeviceContext, key: &ClearPipelineKey) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();

        let library = device
            .new_library_with_source(&clear_shader_source(key), &metal::CompileOptions::new())
            .map_err(GfxError::ShaderCompileError)?;

        let descriptor = metal::RenderPipelineDescriptor::new();
        descriptor.set_vertex_function(Some(
            &library
                .get_function("clear_vs", None)
                .map_err(GfxError::ShaderCompileError)?,
        ));
        if !key.color_formats.is_empty() {
            descriptor.set_fragment_function(Some(
                &library
                    .get_function("clear_fs", None)
                    .map_err(GfxError::ShaderCompileError)?,
            ));
        }

        for (i, format) in key.color_formats.iter().enumerate() {
            let attachment = descriptor
                .color_attachments()
                .object_at(i as u64)
                .ok_or_else(|| GfxError::from("too many color attachments"))?;
            attachment.set_pixel_format(conversions::pixel_format(*format));
            attachment.set_blending_enabled(false);
            attachment.set_write_mask(conversions::color_write_mask(key.write_mask));
        }

        if let Some(format) = key.depth_stencil_format {
            descriptor.set_depth_attachment_pixel_format(conversions::pixel_format(format));
            if format.has_stencil() {
                descriptor.set_stencil_attachment_pixel_format(conversions::pixel_format(format));
            }
        }

        descriptor.set_sample_count(u64::from(key.sample_count.as_u32()));
        descriptor.set_input_primitive_topology(metal::MTLPrimitiveTopologyClass::Triangle);

        let pipeline = device
            .new_render_pipeline_state(&descriptor)
            .map_err(GfxError::PipelineCreateError)?;

        let depth_stencil = key.depth_stencil_format.map(|_| {
            let ds_descriptor = metal::DepthStencilDescriptor::new();
            ds_descriptor.set_depth_compare_function(metal::MTLCompareFunction::Always);
            ds_descriptor.set_depth_write_enabled(key.depth_write);
            device.new_depth_stencil_state(&ds_descriptor)
        });

        Ok(Self {
            pipeline,
            depth_stencil,
        })
    }
}
