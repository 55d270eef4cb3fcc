use crate::{DeviceContext, GfxResult, HeapDef};

use super::conversions;

pub(crate) struct MetalHeap {
    pub(crate) heap: metal::Heap,
}

impl MetalHeap {
    pub(crate) fn new(device_context: &DeviceContext, heap_def: &HeapDef) -> GfxResult<Self> {
        let descriptor = metal::HeapDescriptor::new();
        descriptor.set_size(heap_def.size);
        descriptor.set_storage_mode(conversions::storage_mode(heap_def.memory_usage));

        let device = device_context.inner.backend_device_context.device();
        Ok(Self {
            heap: device.new_heap(&descriptor),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
