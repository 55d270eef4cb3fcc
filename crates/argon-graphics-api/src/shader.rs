use std::sync::Arc;

use crate::{DeviceContext, GfxResult, ShaderModule, ShaderStageFlags};

/// Substitution of a 32-bit function constant by index, applied when the
/// stage's entry point is specialized at pipeline creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpecializationConstant {
    pub index: u32,
    pub value: u32,
}

#[derive(Clone)]
pub struct ShaderStageDef {
    pub shader_module: ShaderModule,
    pub entry_point: String,
    pub shader_stage: ShaderStageFlags,
    pub specializations: Vec<SpecializationConstant>,
}

pub(crate) struct ShaderInner {
    #[allow(dead_code)]
    device_context: DeviceContext,
    stage_flags: ShaderStageFlags,
    stages: Vec<ShaderStageDef>,
}

#[derive(Clone)]
pub struct Shader {
    pub(crate) inner: Arc<ShaderInner>,
}

impl Shader {
    pub fn new(device_context: &DeviceContext, stages: Vec<ShaderStageDef>) -> GfxResult<Self> {
        assert!(!stages.is_empty());
        let mut stage_flags = ShaderStageFlags::empty();
        for stage in &stages {
            assert!(
                !stage_flags.intersects(stage.shader_stage),
                "duplicate shader stage"
            );
            stage_flags |= stage.shader_stage;
        }

        Ok(Self {
            inner: Arc::new(ShaderInner {
                device_context: device_context.clone(),
                stage_flags,
                stages,
            }),
        })
    }

    pub fn stage_flags(&self) -> ShaderStageFlags {
        self.inner.stage_flags
    }

    pub fn stages(&self) -> &[ShaderStageDef] {
        &self.inner.stages
    }

    pub fn stage(&self, flag: ShaderStageFlags) -> Option<&ShaderStageDef> {
        self.inner
            .stages
            .iter()
            .find(|stage| stage.shader_stage.intersects(flag))
    }
}
