use std::sync::Arc;

use crate::{
    DescriptorSetLayout, DeviceContext, GfxResult, ShaderStageFlags, MAX_DESCRIPTOR_SET_LAYOUTS,
};

/// One push-constant range. Replayed as inline constant bytes at buffer slot
/// `PUSH_CONSTANT_SLOT_BASE + binding`, past the descriptor-set slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PushConstantDef {
    pub offset: u32,
    pub size: u32,
    pub binding: u32,
    pub stage_flags: ShaderStageFlags,
}

#[derive(Clone, Default)]
pub struct PipelineLayoutDef {
    /// One layout per set index, in order.
    pub descriptor_set_layouts: Vec<DescriptorSetLayout>,
    pub push_constants: Vec<PushConstantDef>,
}

pub(crate) struct PipelineLayoutInner {
    device_context: DeviceContext,
    id: u64,
    definition: PipelineLayoutDef,
}

/// Owns the ordered descriptor-set layouts plus push-constant metadata.
/// Created once, immutable, shared across command lists.
#[derive(Clone)]
pub struct PipelineLayout {
    pub(crate) inner: Arc<PipelineLayoutInner>,
}

impl PartialEq for PipelineLayout {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl PipelineLayout {
    pub fn new(device_context: &DeviceContext, definition: PipelineLayoutDef) -> GfxResult<Self> {
        assert!(definition.descriptor_set_layouts.len() <= MAX_DESCRIPTOR_SET_LAYOUTS);
        for (set_index, layout) in definition.descriptor_set_layouts.iter().enumerate() {
            assert_eq!(
                layout.frequency(),
                set_index as u32,
                "descriptor set layout frequency does not match its slot"
            );
        }
        for push_constant in &definition.push_constants {
            assert_ne!(push_constant.size, 0);
            assert!(!push_constant.stage_flags.is_empty());
        }

        Ok(Self {
            inner: Arc::new(PipelineLayoutInner {
                device_context: device_context.clone(),
                id: crate::internal::next_uid(),
                definition,
            }),
        })
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn uid(&self) -> u64 {
        self.inner.id
    }

    pub fn descriptor_set_layouts(&self) -> &[DescriptorSetLayout] {
        &self.inner.definition.descriptor_set_layouts
    }

    pub fn push_constants(&self) -> &[PushConstantDef] {
        &self.inner.definition.push_constants
    }
}
