use std::sync::Arc;

use crate::backends::{BackendBuffer, BackendHeap, BackendTexture};
use crate::buffer::BufferInner;
use crate::internal::residency::ResourceBindings;
use crate::{Buffer, BufferDef, DeviceContext, GfxResult, MemoryUsage, Texture, TextureDef};

/// Used to create a `Heap`: one native allocation several resources
/// sub-allocate from.
#[derive(Clone, Copy, Debug)]
pub struct HeapDef {
    pub size: u64,
    pub memory_usage: MemoryUsage,
}

impl HeapDef {
    pub fn verify(&self) {
        assert_ne!(self.size, 0);
    }
}

pub(crate) struct HeapInner {
    pub(crate) device_context: DeviceContext,
    pub(crate) heap_def: HeapDef,
    pub(crate) backend_heap: BackendHeap,
}

impl Drop for HeapInner {
    fn drop(&mut self) {
        self.backend_heap.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct Heap {
    pub(crate) inner: Arc<HeapInner>,
}

impl Heap {
    pub fn new(device_context: &DeviceContext, heap_def: &HeapDef) -> GfxResult<Self> {
        heap_def.verify();
        let backend_heap = BackendHeap::new(device_context, heap_def)?;
        Ok(Self {
            inner: Arc::new(HeapInner {
                device_context: device_context.clone(),
                heap_def: *heap_def,
                backend_heap,
            }),
        })
    }

    pub fn definition(&self) -> &HeapDef {
        &self.inner.heap_def
    }

    /// Sub-allocates a buffer from this heap. The buffer retains the heap,
    /// so the shared allocation outlives every resource placed in it.
    pub fn create_buffer(&self, buffer_def: &BufferDef) -> GfxResult<Buffer> {
        buffer_def.verify();
        assert_eq!(buffer_def.memory_usage, self.inner.heap_def.memory_usage);
        let backend_buffer = BackendBuffer::new_placed(self, buffer_def)?;

        Ok(Buffer {
            inner: Arc::new(BufferInner {
                device_context: self.inner.device_context.clone(),
                buffer_def: *buffer_def,
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_buffer,
            }),
        })
    }

    /// Sub-allocates a texture from this heap.
    pub fn create_texture(&self, texture_def: &TextureDef) -> GfxResult<Texture> {
        texture_def.verify();
        let backend_texture = BackendTexture::new_placed(self, texture_def)?;
        Ok(Texture::from_backend(
            &self.inner.device_context,
            texture_def,
            backend_texture,
        ))
    }
}
