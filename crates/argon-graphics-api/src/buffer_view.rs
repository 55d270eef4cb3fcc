use std::sync::Arc;

use crate::backends::BackendBufferView;
use crate::internal::residency::ResourceBindings;
use crate::{Buffer, Format, GPUViewType, GfxResult, ShaderResourceType};

/// Used to create a `BufferView`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferViewDef {
    pub gpu_view_type: GPUViewType,
    pub byte_offset: u64,
    pub element_count: u64,
    pub element_size: u64,
    /// Set for formatted views; `None` for raw/structured views.
    pub format: Option<Format>,
    pub first_element: u64,
}

impl BufferViewDef {
    pub fn as_const_buffer(size: u64) -> Self {
        Self {
            gpu_view_type: GPUViewType::ConstantBuffer,
            byte_offset: 0,
            element_count: 1,
            element_size: size,
            format: None,
            first_element: 0,
        }
    }

    pub fn as_structured_buffer(element_count: u64, element_size: u64, read_only: bool) -> Self {
        Self {
            gpu_view_type: if read_only {
                GPUViewType::ShaderResource
            } else {
                GPUViewType::UnorderedAccess
            },
            byte_offset: 0,
            element_count,
            element_size,
            format: None,
            first_element: 0,
        }
    }

    pub fn verify(&self, buffer: &Buffer) {
        assert!(self.element_count >= 1);
        assert!(self.element_size >= 1);
        let total = self.byte_offset + (self.first_element + self.element_count) * self.element_size;
        assert!(total <= buffer.definition().size);
        match self.gpu_view_type {
            GPUViewType::ConstantBuffer | GPUViewType::ShaderResource
            | GPUViewType::UnorderedAccess => {}
            GPUViewType::RenderTarget | GPUViewType::DepthStencil => {
                panic!("render-target view of a buffer")
            }
        }
    }

    /// Structured views contribute their element window as a byte offset on
    /// the underlying binding.
    pub fn derived_byte_offset(&self) -> u64 {
        self.byte_offset + self.first_element * self.element_size
    }
}

pub(crate) struct BufferViewInner {
    pub(crate) definition: BufferViewDef,
    // keeps the backing buffer alive for the view's whole lifetime
    pub(crate) buffer: Buffer,
    pub(crate) uid: u64,
    pub(crate) bindings: ResourceBindings,
    pub(crate) backend_buffer_view: BackendBufferView,
}

impl Drop for BufferViewInner {
    fn drop(&mut self) {
        self.bindings.purge(self.uid);
        self.backend_buffer_view
            .destroy(self.buffer.device_context());
    }
}

#[derive(Clone)]
pub struct BufferView {
    pub(crate) inner: Arc<BufferViewInner>,
}

impl BufferView {
    pub(crate) fn from_buffer(buffer: &Buffer, view_def: &BufferViewDef) -> GfxResult<Self> {
        view_def.verify(buffer);
        let backend_buffer_view = BackendBufferView::new(buffer, view_def)?;

        Ok(Self {
            inner: Arc::new(BufferViewInner {
                definition: *view_def,
                buffer: buffer.clone(),
                uid: crate::internal::next_uid(),
                bindings: ResourceBindings::default(),
                backend_buffer_view,
            }),
        })
    }

    pub fn definition(&self) -> &BufferViewDef {
        &self.inner.definition
    }

    pub fn buffer(&self) -> &Buffer {
        &self.inner.buffer
    }

    pub fn uid(&self) -> u64 {
        self.inner.uid
    }

    pub(crate) fn is_compatible_with_descriptor(&self, descriptor_type: ShaderResourceType) -> bool {
        match descriptor_type {
            ShaderResourceType::ConstantBuffer => {
                self.inner.definition.gpu_view_type == GPUViewType::ConstantBuffer
            }
            ShaderResourceType::StructuredBuffer | ShaderResourceType::ByteAddressBuffer => {
                self.inner.definition.gpu_view_type == GPUViewType::ShaderResource
            }
            ShaderResourceType::RWStructuredBuffer | ShaderResourceType::RWByteAddressBuffer => {
                self.inner.definition.gpu_view_type == GPUViewType::UnorderedAccess
            }
            _ => false,
        }
    }
}
