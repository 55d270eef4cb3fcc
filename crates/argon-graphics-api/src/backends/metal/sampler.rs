use crate::{DeviceContext, GfxResult, SamplerDef};

use super::conversions;

pub(crate) struct MetalSampler {
    pub(crate) sampler: metal::SamplerState,
}

impl MetalSampler {
    pub(crate) fn new(device_context: &DeviceContext, sampler_def: &SamplerDef) -> GfxResult<Self> {
        let descriptor = metal::SamplerDescriptor::new();
        descriptor.set_min_filter(conversions::min_mag_filter(sampler_def.min_filter));
        descriptor.set_mag_filter(conversions::min_mag_filter(sampler_def.mag_filter));
        descriptor.set_mip_filter(conversions::mip_filter(sampler_def.mip_map_mode));
        descriptor.set_address_mode_s(conversions::address_mode(sampler_def.address_mode_u));
        descriptor.set_address_mode_t(conversions::address_mode(sampler_def.address_mode_v));
        descriptor.set_address_mode_r(conversions::address_mode(sampler_def.address_mode_w));
        descriptor.set_max_anisotropy(sampler_def.max_anisotropy.max(1.0) as u64);
        descriptor.set_compare_function(conversions::compare_function(sampler_def.compare_op));
        // mip_lod_bias has no sampler-state equivalent here; biasing is a
        // shader-side concern on this platform
        descriptor.set_support_argument_buffers(true);

        let device = device_context.inner.backend_device_context.device();
        Ok(Self {
            sampler: device.new_sampler(&descriptor),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
