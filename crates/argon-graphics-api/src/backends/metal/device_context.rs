use std::sync::Mutex;

use crate::{ApiDef, DeviceInfo, GfxError, GfxResult};

use super::MetalApi;

/// MSL kernel behind `backend_resolve_texture_region`; the platform blit
/// encoder cannot resolve sub-rectangles, so partial resolves average the
/// samples in compute.
const RESOLVE_REGION_SHADER: &str = r#"
#include <metal_stdlib>
using namespace metal;

struct Region {
    uint2 src_offset;
    uint2 dst_offset;
    uint2 extent;
};

kernel void resolve_region(
    texture2d_ms<float, access::read> src [[texture(0)]],
    texture2d<float, access::write> dst [[texture(1)]],
    constant Region& region [[buffer(0)]],
    uint2 tid [[thread_position_in_grid]])
{
    if (tid.x >= region.extent.x || tid.y >= region.extent.y) {
        return;
    }
    uint2 src_coord = region.src_offset + tid;
    uint sample_count = src.get_num_samples();
    float4 sum = float4(0.0);
    for (uint i = 0; i < sample_count; ++i) {
        sum += src.read(src_coord, i);
    }
    dst.write(sum / float(sample_count), region.dst_offset + tid);
}
"#;

pub(crate) struct MetalDeviceContext {
    device: metal::Device,
    resolve_region_pipeline: Mutex<Option<metal::ComputePipelineState>>,
}

impl MetalDeviceContext {
    pub(crate) fn new(_api: &MetalApi, _api_def: &ApiDef) -> GfxResult<(Self, DeviceInfo)> {
        let device = metal::Device::system_default()
            .ok_or_else(|| GfxError::from("no metal-capable device"))?;

        log::info!("Using device: {}", device.name());

        let device_info = DeviceInfo {
            supports_multithreaded_usage: true,
            min_uniform_buffer_offset_alignment: 256,
            min_storage_buffer_offset_alignment: 16,
            upload_buffer_texture_alignment: 16,
            upload_buffer_texture_row_alignment: 256,
            supports_clamp_to_border_color: true,
            max_vertex_attribute_count: 31,
        };

        Ok((
            Self {
                device,
                resolve_region_pipeline: Mutex::new(None),
            },
            device_info,
        ))
    }

    pub(crate) fn device(&self) -> &metal::DeviceRef {
        &self.device
    }

    pub(crate) fn resolve_region_pipeline(&self) -> GfxResult<metal::ComputePipelineState> {
        let mut cached = self.resolve_region_pipeline.lock().unwrap();
        if let Some(pipeline) = cached.as_ref() {
            return Ok(pipeline.clone());
        }

        let library = self
            .device
            .new_library_with_source(RESOLVE_REGION_SHADER, &metal::CompileOptions::new())
            .map_err(GfxError::ShaderCompileError)?;
        let function = library
            .get_function("resolve_region", None)
            .map_err(GfxError::ShaderCompileError)?;
        let pipeline = self
            .device
            .new_compute_pipeline_state_with_function(&function)
            .map_err(GfxError::PipelineCreateError)?;

        *cached = Some(pipeline.clone());
        Ok(pipeline)
    }

    pub(crate) fn destroy(&mut self) {
        *self.resolve_region_pipeline.lock().unwrap() = None;
    }
}
