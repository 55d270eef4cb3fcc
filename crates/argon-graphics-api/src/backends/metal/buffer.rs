use crate::{
    Buffer, BufferDef, BufferMappingInfo, DeviceContext, GfxError, GfxResult, Heap, MemoryUsage,
    ResourceUsage,
};

use super::conversions;

pub(crate) struct MetalBuffer {
    pub(crate) buffer: metal::Buffer,
}

impl MetalBuffer {
    pub(crate) fn new(device_context: &DeviceContext, buffer_def: &BufferDef) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();
        let buffer = device.new_buffer(
            buffer_def.size,
            conversions::resource_options(buffer_def.memory_usage),
        );
        Ok(Self { buffer })
    }

    pub(crate) fn new_placed(heap: &Heap, buffer_def: &BufferDef) -> GfxResult<Self> {
        // cache-mode flags must match the heap exactly, so only the storage
        // mode is carried over
        let options = match conversions::storage_mode(heap.definition().memory_usage) {
            metal::MTLStorageMode::Private => {
                metal::MTLResourceOptions::StorageModePrivate
            }
            _ => metal::MTLResourceOptions::StorageModeShared,
        };
        let buffer = heap
            .inner
            .backend_heap
            .heap
            .new_buffer(buffer_def.size, options)
            .ok_or_else(|| GfxError::from("heap has insufficient space for buffer"))?;
        Ok(Self { buffer })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext, _buffer_def: &BufferDef) {}
}

impl Buffer {
    pub(crate) fn backend_required_alignment(&self) -> u64 {
        if self
            .definition()
            .usage_flags
            .intersects(ResourceUsage::AS_CONST_BUFFER)
        {
            256
        } else {
            16
        }
    }

    pub(crate) fn backend_map_memory(&self) -> GfxResult<BufferMappingInfo> {
        if self.definition().memory_usage == MemoryUsage::GpuOnly {
            return Err(GfxError::from("cannot map a device-local buffer"));
        }
        let buffer = &self.inner.backend_buffer.buffer;
        Ok(BufferMappingInfo {
            data_ptr: buffer.contents().cast::<u8>(),
            size: buffer.length(),
        })
    }
}

/// Views carry no native object; binding resolves to the base buffer plus
/// the view's derived byte offset.
pub(crate) struct MetalBufferView;

impl MetalBufferView {
    pub(crate) fn new(_buffer: &Buffer, _view_def: &crate::BufferViewDef) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
