use std::sync::Arc;

use crate::backends::BackendSampler;
use crate::internal::residency::ResourceBindings;
use crate::{AddressMode, CompareOp, DeviceContext, FilterType, GfxResult, MipMapMode};

/// Used to create a `Sampler`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerDef {
    pub min_filter: FilterType,
    pub mag_filter: FilterType,
    pub mip_map_mode: MipMapMode,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub address_mode_w: AddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: f32,
    pub compare_op: CompareOp,
}

impl Default for SamplerDef {
    fn default() -> Self {
        Self {
            min_filter: FilterType::Linear,
            mag_filter: FilterType::Linear,
            mip_map_mode: MipMapMode::Linear,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mip_lod_bias: 0.0,
            max_anisotropy: 1.0,
            compare_op: CompareOp::Never,
        }
    }
}

pub(crate) struct SamplerInner {
    pub(crate) device_context: DeviceContext,
    pub(crate) sampler_def: SamplerDef,
    pub(crate) uid: u64,
    pub(crate) bindings: ResourceBindings,
    pub(crate) backend_sampler: BackendSampler,
}

impl Drop for SamplerInner {
    fn drop(&mut self) {
        self.bindings.purge(self.uid);
        self.backend_sampler.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct Sampler {
    pub(crate) inner: Arc<SamplerInner>,
}

impl Sampler {
    pub fn new(device_context: &DeviceContext, sampler_def: &SamplerDef) -> GfxResult<Self> {
        let backend_sampler = BackendSampler::new(device_context, sampler_def)?;
        Ok(Self {
            inner: Arc::new(SamplerInner {
                device_context: device_context.clone(),
                sampler_def: *sampler_def,
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_sampler,
            }),
        })
    }

    pub fn definition(&self) -> &SamplerDef {
        &self.inner.sampler_def
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }
}
