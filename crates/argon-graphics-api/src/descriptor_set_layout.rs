use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use crate::backends::BackendDescriptorSetLayout;
use crate::internal::ring_alloc::RingAllocator;
use crate::{
    DeviceContext, GfxResult, Sampler, ShaderResourceType, BOUNDLESS_DESCRIPTOR_CAPACITY,
    DESCRIPTOR_RING_BUFFER_SIZE,
};

static NEXT_DESCRIPTOR_SET_LAYOUT_ID: std::sync::atomic::AtomicU64 =
    std::sync::atomic::AtomicU64::new(1);

/// One contiguous group of binding slots sharing a resource kind.
#[derive(Clone)]
pub struct DescriptorRangeDef {
    pub name: String,
    /// First physical binding number of the range. Ranges may be declared in
    /// any order; the layout sorts them by binding before generating the
    /// argument encoding.
    pub binding: u32,
    pub shader_resource_type: ShaderResourceType,
    pub array_size: u32,
    /// Baked into the layout and written during bind replay; slots with an
    /// immutable sampler are not writable through a descriptor set.
    pub immutable_samplers: Vec<Sampler>,
    /// Variable-length range; must be the highest-binding range. Reserved at
    /// `BOUNDLESS_DESCRIPTOR_CAPACITY` in the argument encoding regardless
    /// of `array_size`.
    pub boundless: bool,
}

impl DescriptorRangeDef {
    pub fn new(
        name: impl Into<String>,
        binding: u32,
        shader_resource_type: ShaderResourceType,
        array_size: u32,
    ) -> Self {
        Self {
            name: name.into(),
            binding,
            shader_resource_type,
            array_size,
            immutable_samplers: Vec::new(),
            boundless: false,
        }
    }

    pub fn array_size_normalized(&self) -> u32 {
        self.array_size.max(1)
    }
}

#[derive(Clone, Default)]
pub struct DescriptorSetLayoutDef {
    /// Set index this layout occupies in a pipeline layout.
    pub frequency: u32,
    pub ranges: Vec<DescriptorRangeDef>,
}

#[derive(Clone, Debug)]
pub(crate) struct DescriptorRange {
    pub name: String,
    pub binding: u32,
    pub shader_resource_type: ShaderResourceType,
    pub element_count: u32,
    pub flat_index_base: u32,
    pub boundless: bool,
}

impl DescriptorRange {
    /// Array length reserved in the argument encoding; boundless ranges are
    /// over-allocated to the platform upper bound.
    pub fn encoded_array_length(&self) -> u32 {
        if self.boundless {
            BOUNDLESS_DESCRIPTOR_CAPACITY
        } else {
            self.element_count
        }
    }
}

pub(crate) struct DescriptorSetLayoutInner {
    device_context: DeviceContext,
    id: u64,
    frequency: u32,
    ranges: Vec<DescriptorRange>,
    /// Per flat slot: the owning range's declared resource kind.
    descriptor_types: Vec<ShaderResourceType>,
    /// Per flat slot: the owning range's first flat index.
    index_bases: Vec<u32>,
    /// Per flat slot: the owning range's declared binding number.
    range_bindings: Vec<u32>,
    flat_descriptor_count: u32,
    /// (flat index, sampler) pairs for baked immutable samplers.
    static_samplers: Vec<(u32, Sampler)>,
    /// Ring allocator handing out bound-set snapshot regions from the
    /// backing store. No in-flight tracking; see `RingAllocator`.
    ring: Mutex<RingAllocator>,
    encoded_size: u64,
    encoded_alignment: u64,
    pub(crate) backend_layout: BackendDescriptorSetLayout,
}

impl Drop for DescriptorSetLayoutInner {
    fn drop(&mut self) {
        self.backend_layout.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct DescriptorSetLayout {
    pub(crate) inner: Arc<DescriptorSetLayoutInner>,
}

impl PartialEq for DescriptorSetLayout {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl DescriptorSetLayout {
    pub fn new(device_context: &DeviceContext, definition: &DescriptorSetLayoutDef) -> GfxResult<Self> {
        assert!(!definition.ranges.is_empty(), "empty descriptor set layout");

        let mut sorted: Vec<&DescriptorRangeDef> = definition.ranges.iter().collect();
        sorted.sort_by_key(|range| range.binding);

        let mut ranges = Vec::with_capacity(sorted.len());
        let mut descriptor_types = Vec::new();
        let mut index_bases = Vec::new();
        let mut range_bindings = Vec::new();
        let mut static_samplers = Vec::new();
        let mut flat_descriptor_count = 0u32;

        for (i, range_def) in sorted.iter().enumerate() {
            let element_count = range_def.array_size_normalized();

            if let Some(next) = sorted.get(i + 1) {
                assert!(
                    range_def.binding + element_count <= next.binding,
                    "descriptor ranges overlap at binding {}",
                    next.binding
                );
                assert!(!range_def.boundless, "boundless range must come last");
            }

            if !range_def.immutable_samplers.is_empty() {
                assert_eq!(
                    range_def.shader_resource_type,
                    ShaderResourceType::Sampler,
                    "immutable samplers on a non-sampler range"
                );
                assert_eq!(range_def.immutable_samplers.len() as u32, element_count);
                for (element, sampler) in range_def.immutable_samplers.iter().enumerate() {
                    static_samplers.push((flat_descriptor_count + element as u32, sampler.clone()));
                }
            }

            for _ in 0..element_count {
                descriptor_types.push(range_def.shader_resource_type);
                index_bases.push(flat_descriptor_count);
                range_bindings.push(range_def.binding);
            }

            ranges.push(DescriptorRange {
                name: range_def.name.clone(),
                binding: range_def.binding,
                shader_resource_type: range_def.shader_resource_type,
                element_count,
                flat_index_base: flat_descriptor_count,
                boundless: range_def.boundless,
            });

            flat_descriptor_count += element_count;
        }

        let backend_layout = BackendDescriptorSetLayout::new(device_context, &ranges)?;
        let encoded_size = backend_layout.encoded_size();
        let encoded_alignment = backend_layout.encoded_alignment();

        let id = NEXT_DESCRIPTOR_SET_LAYOUT_ID.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            inner: Arc::new(DescriptorSetLayoutInner {
                device_context: device_context.clone(),
                id,
                frequency: definition.frequency,
                ranges,
                descriptor_types,
                index_bases,
                range_bindings,
                flat_descriptor_count,
                static_samplers,
                ring: Mutex::new(RingAllocator::new(DESCRIPTOR_RING_BUFFER_SIZE)),
                encoded_size,
                encoded_alignment,
                backend_layout,
            }),
        })
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn uid(&self) -> u64 {
        self.inner.id
    }

    pub fn frequency(&self) -> u32 {
        self.inner.frequency
    }

    /// Total number of flat descriptor slots (arrays expanded).
    pub fn entry_count(&self) -> u32 {
        self.inner.flat_descriptor_count
    }

    pub fn range_count(&self) -> u32 {
        self.inner.ranges.len() as u32
    }

    pub(crate) fn ranges(&self) -> &[DescriptorRange] {
        &self.inner.ranges
    }

    /// Clamps a caller index to the last valid slot. Deliberate tolerance
    /// for boundless ranges, where the caller may index past the declared
    /// count but stays inside the reserved encoding.
    pub(crate) fn clamp_index(&self, index: u32) -> u32 {
        index.min(self.inner.flat_descriptor_count - 1)
    }

    pub fn descriptor_type(&self, flat_index: u32) -> ShaderResourceType {
        self.inner.descriptor_types[flat_index as usize]
    }

    /// Translates a flat logical index back to the physical binding slot the
    /// argument encoder expects: `index - range_base + range_binding`.
    pub fn argument_slot(&self, flat_index: u32) -> u32 {
        let i = flat_index as usize;
        flat_index - self.inner.index_bases[i] + self.inner.range_bindings[i]
    }

    pub(crate) fn static_samplers(&self) -> &[(u32, Sampler)] {
        &self.inner.static_samplers
    }

    pub(crate) fn is_static_sampler_slot(&self, flat_index: u32) -> bool {
        self.inner
            .static_samplers
            .iter()
            .any(|(index, _)| *index == flat_index)
    }

    pub fn find_descriptor_index_by_name(&self, name: &str) -> Option<u32> {
        self.inner
            .ranges
            .iter()
            .find(|range| range.name == name)
            .map(|range| range.flat_index_base)
    }

    /// Size of one fully-encoded bound-set snapshot.
    pub fn encoded_size(&self) -> u64 {
        self.inner.encoded_size
    }

    /// Claims the next snapshot region from the backing store, wrapping when
    /// insufficient capacity remains.
    pub(crate) fn claim_ring_region(&self) -> u64 {
        let mut ring = self.inner.ring.lock().unwrap();
        ring.claim(self.inner.encoded_size, self.inner.encoded_alignment)
    }

    /// Number of times the backing store wrapped; a non-zero delta across a
    /// frame means in-flight snapshots may have been overwritten.
    pub fn ring_wrap_count(&self) -> u64 {
        self.inner.ring.lock().unwrap().wrap_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiDef, GfxApi};

    fn test_api() -> GfxApi {
        #[allow(unsafe_code)]
        unsafe {
            GfxApi::new(&ApiDef::default()).unwrap()
        }
    }

    fn layout_def(ranges: Vec<DescriptorRangeDef>) -> DescriptorSetLayoutDef {
        DescriptorSetLayoutDef {
            frequency: 0,
            ranges,
        }
    }

    #[test]
    fn boundless_range_reserves_fixed_capacity() {
        let api = test_api();
        let device_context = api.device_context();

        let mut boundless = DescriptorRangeDef::new(
            "material_textures",
            8,
            ShaderResourceType::Texture2D,
            16,
        );
        boundless.boundless = true;

        let layout = device_context
            .create_descriptor_set_layout(&layout_def(vec![
                DescriptorRangeDef::new("frame_cb", 0, ShaderResourceType::ConstantBuffer, 1),
                DescriptorRangeDef::new("draw_cb", 2, ShaderResourceType::ConstantBuffer, 1),
                boundless,
            ]))
            .unwrap();

        assert_eq!(layout.entry_count(), 2 + 16);
        // highest valid flat index
        assert_eq!(layout.clamp_index(u32::MAX), 17);
        // the encoding reserves the platform upper bound, not the requested 16
        assert_eq!(layout.ranges()[2].encoded_array_length(), 8192);
    }

    #[test]
    fn argument_slot_stays_inside_owning_range() {
        let api = test_api();
        let device_context = api.device_context();

        // deliberately declared out of binding order
        let layout = device_context
            .create_descriptor_set_layout(&layout_def(vec![
                DescriptorRangeDef::new("samplers", 6, ShaderResourceType::Sampler, 2),
                DescriptorRangeDef::new("frame_cb", 0, ShaderResourceType::ConstantBuffer, 1),
                DescriptorRangeDef::new("textures", 2, ShaderResourceType::Texture2D, 4),
            ]))
            .unwrap();

        assert_eq!(layout.entry_count(), 7);

        for range in layout.ranges() {
            for element in 0..range.element_count {
                let flat_index = range.flat_index_base + element;
                let slot = layout.argument_slot(flat_index);
                assert!(slot >= range.binding);
                assert!(slot < range.binding + range.element_count);
            }
        }

        // sorted by binding: cb at flat 0, textures at flat 1..=4, samplers 5..=6
        assert_eq!(
            layout.descriptor_type(0),
            ShaderResourceType::ConstantBuffer
        );
        assert_eq!(layout.descriptor_type(4), ShaderResourceType::Texture2D);
        assert_eq!(layout.descriptor_type(5), ShaderResourceType::Sampler);
        assert_eq!(layout.argument_slot(3), 4);
        assert_eq!(layout.argument_slot(6), 7);
    }

    #[test]
    fn ring_claims_are_contiguous() {
        let api = test_api();
        let device_context = api.device_context();

        let layout = device_context
            .create_descriptor_set_layout(&layout_def(vec![DescriptorRangeDef::new(
                "cb",
                0,
                ShaderResourceType::ConstantBuffer,
                1,
            )]))
            .unwrap();

        let first = layout.claim_ring_region();
        let second = layout.claim_ring_region();
        assert!(second >= first + layout.encoded_size());
        assert_eq!(layout.ring_wrap_count(), 0);
    }

    #[test]
    #[should_panic(expected = "empty descriptor set layout")]
    fn empty_layout_is_rejected() {
        let api = test_api();
        let _ = api
            .device_context()
            .create_descriptor_set_layout(&layout_def(Vec::new()));
    }

    #[test]
    fn find_by_name() {
        let api = test_api();
        let layout = api
            .device_context()
            .create_descriptor_set_layout(&layout_def(vec![
                DescriptorRangeDef::new("frame_cb", 0, ShaderResourceType::ConstantBuffer, 1),
                DescriptorRangeDef::new("textures", 1, ShaderResourceType::Texture2D, 4),
            ]))
            .unwrap();

        assert_eq!(layout.find_descriptor_index_by_name("textures"), Some(1));
        assert_eq!(layout.find_descriptor_index_by_name("missing"), None);
    }
}
