use std::sync::Arc;

use crate::backends::BackendBuffer;
use crate::internal::residency::ResourceBindings;
use crate::{
    BufferView, BufferViewDef, DeviceContext, GfxResult, MemoryUsage, ResourceUsage,
};

/// Used to create a `Buffer`
#[derive(Clone, Copy, Debug)]
pub struct BufferDef {
    pub size: u64,
    pub usage_flags: ResourceUsage,
    pub memory_usage: MemoryUsage,
}

impl Default for BufferDef {
    fn default() -> Self {
        Self {
            size: 0,
            usage_flags: ResourceUsage::empty(),
            memory_usage: MemoryUsage::GpuOnly,
        }
    }
}

impl BufferDef {
    pub fn verify(&self) {
        assert_ne!(self.size, 0);
        assert!(!self
            .usage_flags
            .intersects(ResourceUsage::TEXTURE_ONLY_USAGE_FLAGS));
    }

    pub fn for_staging_buffer(size: usize, usage_flags: ResourceUsage) -> Self {
        Self {
            size: size as u64,
            usage_flags,
            memory_usage: MemoryUsage::CpuToGpu,
        }
    }

    pub fn for_staging_buffer_data<T: Copy>(data: &[T], usage_flags: ResourceUsage) -> Self {
        Self::for_staging_buffer(std::mem::size_of_val(data), usage_flags)
    }

    pub fn for_staging_vertex_buffer(size: usize) -> Self {
        Self::for_staging_buffer(size, ResourceUsage::AS_VERTEX_BUFFER)
    }

    pub fn for_staging_vertex_buffer_data<T: Copy>(data: &[T]) -> Self {
        Self::for_staging_buffer_data(data, ResourceUsage::AS_VERTEX_BUFFER)
    }

    pub fn for_staging_index_buffer(size: usize) -> Self {
        Self::for_staging_buffer(size, ResourceUsage::AS_INDEX_BUFFER)
    }

    pub fn for_staging_index_buffer_data<T: Copy>(data: &[T]) -> Self {
        Self::for_staging_buffer_data(data, ResourceUsage::AS_INDEX_BUFFER)
    }

    pub fn for_staging_uniform_buffer(size: usize) -> Self {
        Self::for_staging_buffer(size, ResourceUsage::AS_CONST_BUFFER)
    }

    pub fn for_staging_uniform_buffer_data<T: Copy>(data: &[T]) -> Self {
        Self::for_staging_buffer_data(data, ResourceUsage::AS_CONST_BUFFER)
    }
}

/// Shared-storage allocations are always CPU-visible on this platform, so a
/// mapping is a plain persistent pointer and `unmap` is a no-op.
pub struct BufferMappingInfo {
    pub data_ptr: *mut u8,
    pub size: u64,
}

pub(crate) struct BufferInner {
    pub(crate) device_context: DeviceContext,
    pub(crate) buffer_def: BufferDef,
    pub(crate) uid: u64,
    pub(crate) bindings: ResourceBindings,
    pub(crate) backend_buffer: BackendBuffer,
}

impl Drop for BufferInner {
    fn drop(&mut self) {
        self.bindings.purge(self.uid);
        self.backend_buffer
            .destroy(&self.device_context, &self.buffer_def);
    }
}

#[derive(Clone)]
pub struct Buffer {
    pub(crate) inner: Arc<BufferInner>,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").finish()
    }
}

impl Buffer {
    pub fn new(device_context: &DeviceContext, buffer_def: &BufferDef) -> GfxResult<Self> {
        buffer_def.verify();
        let backend_buffer = BackendBuffer::new(device_context, buffer_def)?;

        Ok(Self {
            inner: Arc::new(BufferInner {
                device_context: device_context.clone(),
                buffer_def: *buffer_def,
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_buffer,
            }),
        })
    }

    pub fn definition(&self) -> &BufferDef {
        &self.inner.buffer_def
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }

    pub fn required_alignment(&self) -> u64 {
        self.backend_required_alignment()
    }

    pub fn map_memory(&self) -> GfxResult<BufferMappingInfo> {
        self.backend_map_memory()
    }

    pub fn unmap_memory(&self) {
        // persistent mapping, nothing to do
    }

    pub fn create_view(&self, view_def: &BufferViewDef) -> GfxResult<BufferView> {
        BufferView::from_buffer(self, view_def)
    }
}
