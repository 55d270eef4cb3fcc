use crate::{ApiDef, GfxResult};

pub(crate) struct MetalApi;

impl MetalApi {
    pub fn new(_api_def: &ApiDef) -> GfxResult<Self> {
        Ok(Self)
    }
}
