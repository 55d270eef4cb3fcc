use std::sync::Mutex;

use metal::{MTLArgumentAccess, MTLDataType, MTLResourceOptions};

use crate::descriptor_set_layout::DescriptorRange;
use crate::{DeviceContext, GfxResult, ShaderResourceType, DESCRIPTOR_RING_BUFFER_SIZE};

use super::conversions;

/// Argument encoder plus the backing store its encodings are written into.
/// The encoder object is not thread safe, so concurrent bind replays from
/// different command lists serialize on it.
pub(crate) struct MetalDescriptorSetLayout {
    pub(crate) argument_encoder: Mutex<metal::ArgumentEncoder>,
    pub(crate) ring_buffer: metal::Buffer,
}

impl MetalDescriptorSetLayout {
    pub(crate) fn new(
        device_context: &DeviceContext,
        ranges: &[DescriptorRange],
    ) -> GfxResult<Self> {
        let mut descriptors = Vec::with_capacity(ranges.len());
        for range in ranges {
            let descriptor = metal::ArgumentDescriptor::new();
            descriptor.set_index(u64::from(range.binding));
            descriptor.set_array_length(u64::from(range.encoded_array_length()));
            descriptor.set_access(if range.shader_resource_type.is_read_write() {
                MTLArgumentAccess::ReadWrite
            } else {
                MTLArgumentAccess::ReadOnly
            });
            match range.shader_resource_type {
                ShaderResourceType::Sampler => {
                    descriptor.set_data_type(MTLDataType::Sampler);
                }
                resource_type if resource_type.is_texture() => {
                    descriptor.set_data_type(MTLDataType::Texture);
                    descriptor
                        .set_texture_type(conversions::descriptor_texture_type(resource_type));
                }
                _ => {
                    descriptor.set_data_type(MTLDataType::Pointer);
                }
            }
            descriptors.push(descriptor);
        }

        let device = device_context.inner.backend_device_context.device();
        let argument_encoder = device.new_argument_encoder(&metal::Array::from_slice(&descriptors));
        let ring_buffer = device.new_buffer(
            DESCRIPTOR_RING_BUFFER_SIZE,
            MTLResourceOptions::StorageModeShared,
        );

        Ok(Self {
            argument_encoder: Mutex::new(argument_encoder),
            ring_buffer,
        })
    }

    pub(crate) fn encoded_size(&self) -> u64 {
        self.argument_encoder.lock().unwrap().encoded_length()
    }

    pub(crate) fn encoded_alignment(&self) -> u64 {
        self.argument_encoder.lock().unwrap().alignment()
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}
