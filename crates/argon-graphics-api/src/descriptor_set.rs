use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use fnv::FnvHashMap;

use crate::buffer::BufferInner;
use crate::buffer_view::BufferViewInner;
use crate::sampler::SamplerInner;
use crate::texture::TextureInner;
use crate::texture_view::TextureViewInner;
use crate::{
    Buffer, BufferView, DescriptorSetLayout, GfxError, GfxResult, Sampler, Texture, TextureView,
};

struct BufferBinding {
    uid: u64,
    buffer: Weak<BufferInner>,
    offset: u64,
}

struct BufferViewBinding {
    uid: u64,
    view: Weak<BufferViewInner>,
}

struct TextureBinding {
    uid: u64,
    texture: Weak<TextureInner>,
}

struct TextureViewBinding {
    uid: u64,
    view: Weak<TextureViewInner>,
}

struct SamplerBinding {
    uid: u64,
    sampler: Weak<SamplerInner>,
}

/// Sparse binding table: parallel maps keyed by flat descriptor index.
/// Bindings hold weak handles; a destroyed resource removes its own entries
/// through its reverse residency set, so replay never resolves a stale
/// pointer.
#[derive(Default)]
struct BindingTable {
    buffers: FnvHashMap<u32, BufferBinding>,
    buffer_views: FnvHashMap<u32, BufferViewBinding>,
    textures: FnvHashMap<u32, TextureBinding>,
    texture_views: FnvHashMap<u32, TextureViewBinding>,
    samplers: FnvHashMap<u32, SamplerBinding>,
}

/// A resolved binding handed to the backend during bind replay.
pub(crate) enum DescriptorRef {
    Buffer { buffer: Buffer, offset: u64 },
    BufferView { view: BufferView },
    Texture { texture: Texture },
    TextureView { view: TextureView },
    Sampler { sampler: Sampler },
}

pub(crate) struct DescriptorSetInner {
    id: u64,
    layout: DescriptorSetLayout,
    /// Bumped on every mutation; the command list uses (id, version) to skip
    /// re-binding an unchanged set.
    version: AtomicU64,
    bindings: Mutex<BindingTable>,
}

impl DescriptorSetInner {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Removes the binding a dying resource left at `flat_index`, if it is
    /// still this resource's. Called from the resource's reverse residency
    /// set during destruction.
    pub(crate) fn remove_resource_binding(&self, flat_index: u32, resource_uid: u64) {
        let mut table = self.bindings.lock().unwrap();
        let removed = remove_if_uid(&mut table.buffers, flat_index, resource_uid, |b| b.uid)
            || remove_if_uid(&mut table.buffer_views, flat_index, resource_uid, |b| b.uid)
            || remove_if_uid(&mut table.textures, flat_index, resource_uid, |b| b.uid)
            || remove_if_uid(&mut table.texture_views, flat_index, resource_uid, |b| b.uid)
            || remove_if_uid(&mut table.samplers, flat_index, resource_uid, |b| b.uid);
        if removed {
            self.version.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn remove_if_uid<T>(
    map: &mut FnvHashMap<u32, T>,
    flat_index: u32,
    uid: u64,
    get_uid: impl Fn(&T) -> u64,
) -> bool {
    if map.get(&flat_index).map(|b| get_uid(b)) == Some(uid) {
        map.remove(&flat_index);
        true
    } else {
        false
    }
}

impl Drop for DescriptorSetInner {
    fn drop(&mut self) {
        // unhook ourselves from every bound resource's residency set
        let table = std::mem::take(&mut *self.bindings.lock().unwrap());
        for (index, binding) in &table.buffers {
            if let Some(buffer) = binding.buffer.upgrade() {
                buffer.bindings.unregister(self.id, *index);
            }
        }
        for (index, binding) in &table.buffer_views {
            if let Some(view) = binding.view.upgrade() {
                view.bindings.unregister(self.id, *index);
            }
        }
        for (index, binding) in &table.textures {
            if let Some(texture) = binding.texture.upgrade() {
                texture.bindings.unregister(self.id, *index);
            }
        }
        for (index, binding) in &table.texture_views {
            if let Some(view) = binding.view.upgrade() {
                view.bindings.unregister(self.id, *index);
            }
        }
        for (index, binding) in &table.samplers {
            if let Some(sampler) = binding.sampler.upgrade() {
                sampler.bindings.unregister(self.id, *index);
            }
        }
    }
}

/// A mutable table mapping flat descriptor index to bound resource. Carries
/// no per-command-list state; a command list replays it into an
/// argument-buffer snapshot at draw/dispatch time.
#[derive(Clone)]
pub struct DescriptorSet {
    pub(crate) inner: Arc<DescriptorSetInner>,
}

impl DescriptorSet {
    pub fn new(layout: &DescriptorSetLayout) -> Self {
        Self {
            inner: Arc::new(DescriptorSetInner {
                id: crate::internal::next_uid(),
                layout: layout.clone(),
                version: AtomicU64::new(0),
                bindings: Mutex::new(BindingTable::default()),
            }),
        }
    }

    pub fn layout(&self) -> &DescriptorSetLayout {
        &self.inner.layout
    }

    pub fn uid(&self) -> u64 {
        self.inner.id
    }

    pub(crate) fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Relaxed)
    }

    /// Binds a buffer at `index` with byte offset 0.
    pub fn set_buffer(&self, index: u32, buffer: &Buffer) {
        self.set_buffer_with_offset(index, buffer, 0);
    }

    pub fn set_buffer_with_offset(&self, index: u32, buffer: &Buffer, offset: u64) {
        let index = self.inner.layout.clamp_index(index);
        let descriptor_type = self.inner.layout.descriptor_type(index);
        assert!(
            descriptor_type.is_buffer(),
            "descriptor {} is a {:?}, not a buffer",
            index,
            descriptor_type
        );

        self.clear_buffer_slot(index);
        {
            let mut table = self.inner.bindings.lock().unwrap();
            table.buffers.insert(
                index,
                BufferBinding {
                    uid: buffer.uid(),
                    buffer: Arc::downgrade(&buffer.inner),
                    offset,
                },
            );
        }
        buffer.inner.bindings.register(&self.inner, index);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Binds a structured/formatted buffer view; the view's element window
    /// contributes the derived byte offset.
    pub fn set_buffer_view(&self, index: u32, view: &BufferView) {
        let index = self.inner.layout.clamp_index(index);
        let descriptor_type = self.inner.layout.descriptor_type(index);
        assert!(
            view.is_compatible_with_descriptor(descriptor_type),
            "buffer view incompatible with descriptor {} ({:?})",
            index,
            descriptor_type
        );

        self.clear_buffer_slot(index);
        {
            let mut table = self.inner.bindings.lock().unwrap();
            table.buffer_views.insert(
                index,
                BufferViewBinding {
                    uid: view.uid(),
                    view: Arc::downgrade(&view.inner),
                },
            );
        }
        view.inner.bindings.register(&self.inner, index);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Binds a texture at `index`. Mutually exclusive with a view binding at
    /// the same slot.
    pub fn set_texture(&self, index: u32, texture: &Texture) {
        let index = self.inner.layout.clamp_index(index);
        let descriptor_type = self.inner.layout.descriptor_type(index);
        assert!(
            descriptor_type.is_texture(),
            "descriptor {} is a {:?}, not a texture",
            index,
            descriptor_type
        );

        self.clear_texture_slot(index);
        {
            let mut table = self.inner.bindings.lock().unwrap();
            table.textures.insert(
                index,
                TextureBinding {
                    uid: texture.uid(),
                    texture: Arc::downgrade(&texture.inner),
                },
            );
        }
        texture.inner.bindings.register(&self.inner, index);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Binds a texture view in place of its base texture.
    pub fn set_texture_view(&self, index: u32, view: &TextureView) {
        let index = self.inner.layout.clamp_index(index);
        let descriptor_type = self.inner.layout.descriptor_type(index);
        assert!(
            view.is_compatible_with_descriptor(descriptor_type),
            "texture view incompatible with descriptor {} ({:?})",
            index,
            descriptor_type
        );

        self.clear_texture_slot(index);
        {
            let mut table = self.inner.bindings.lock().unwrap();
            table.texture_views.insert(
                index,
                TextureViewBinding {
                    uid: view.uid(),
                    view: Arc::downgrade(&view.inner),
                },
            );
        }
        view.inner.bindings.register(&self.inner, index);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_sampler(&self, index: u32, sampler: &Sampler) {
        let index = self.inner.layout.clamp_index(index);
        let descriptor_type = self.inner.layout.descriptor_type(index);
        assert_eq!(
            descriptor_type,
            crate::ShaderResourceType::Sampler,
            "descriptor {} is not a sampler",
            index
        );
        assert!(
            !self.inner.layout.is_static_sampler_slot(index),
            "descriptor {} carries an immutable sampler",
            index
        );

        let old = {
            let mut table = self.inner.bindings.lock().unwrap();
            table.samplers.insert(
                index,
                SamplerBinding {
                    uid: sampler.uid(),
                    sampler: Arc::downgrade(&sampler.inner),
                },
            )
        };
        if let Some(old) = old {
            if old.uid != sampler.uid() {
                if let Some(old_sampler) = old.sampler.upgrade() {
                    old_sampler.bindings.unregister(self.inner.id, index);
                }
            }
        }
        sampler.inner.bindings.register(&self.inner, index);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Acceleration structures are not implemented on this backend.
    pub fn set_acceleration_structure(&self, _index: u32) -> GfxResult<()> {
        Err(GfxError::Unsupported("acceleration structures"))
    }

    /// True if any live resource is bound at `index`.
    pub fn has_binding(&self, index: u32) -> bool {
        let table = self.inner.bindings.lock().unwrap();
        table.buffers.contains_key(&index)
            || table.buffer_views.contains_key(&index)
            || table.textures.contains_key(&index)
            || table.texture_views.contains_key(&index)
            || table.samplers.contains_key(&index)
    }

    /// Enumerates live bindings, resolving weak handles. Entries whose
    /// resource died are skipped (their removal is normally handled by the
    /// resource's own destruction).
    pub(crate) fn for_each_binding(&self, mut f: impl FnMut(u32, DescriptorRef)) {
        let table = self.inner.bindings.lock().unwrap();
        for (index, binding) in &table.buffers {
            if let Some(inner) = binding.buffer.upgrade() {
                f(
                    *index,
                    DescriptorRef::Buffer {
                        buffer: Buffer { inner },
                        offset: binding.offset,
                    },
                );
            }
        }
        for (index, binding) in &table.buffer_views {
            if let Some(inner) = binding.view.upgrade() {
                f(*index, DescriptorRef::BufferView {
                    view: BufferView { inner },
                });
            }
        }
        for (index, binding) in &table.textures {
            if let Some(inner) = binding.texture.upgrade() {
                f(*index, DescriptorRef::Texture {
                    texture: Texture { inner },
                });
            }
        }
        for (index, binding) in &table.texture_views {
            if let Some(inner) = binding.view.upgrade() {
                f(*index, DescriptorRef::TextureView {
                    view: TextureView { inner },
                });
            }
        }
        for (index, binding) in &table.samplers {
            if let Some(inner) = binding.sampler.upgrade() {
                f(*index, DescriptorRef::Sampler {
                    sampler: Sampler { inner },
                });
            }
        }
    }

    fn clear_buffer_slot(&self, index: u32) {
        let (old_buffer, old_view) = {
            let mut table = self.inner.bindings.lock().unwrap();
            (table.buffers.remove(&index), table.buffer_views.remove(&index))
        };
        if let Some(old) = old_buffer {
            if let Some(inner) = old.buffer.upgrade() {
                inner.bindings.unregister(self.inner.id, index);
            }
        }
        if let Some(old) = old_view {
            if let Some(inner) = old.view.upgrade() {
                inner.bindings.unregister(self.inner.id, index);
            }
        }
    }

    fn clear_texture_slot(&self, index: u32) {
        let (old_texture, old_view) = {
            let mut table = self.inner.bindings.lock().unwrap();
            (
                table.textures.remove(&index),
                table.texture_views.remove(&index),
            )
        };
        if let Some(old) = old_texture {
            if let Some(inner) = old.texture.upgrade() {
                inner.bindings.unregister(self.inner.id, index);
            }
        }
        if let Some(old) = old_view {
            if let Some(inner) = old.view.upgrade() {
                inner.bindings.unregister(self.inner.id, index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ApiDef, BufferDef, DescriptorRangeDef, DescriptorSetLayoutDef, GfxApi, MemoryUsage,
        ResourceUsage, ShaderResourceType,
    };

    fn test_api() -> GfxApi {
        #[allow(unsafe_code)]
        unsafe {
            GfxApi::new(&ApiDef::default()).unwrap()
        }
    }

    fn buffer_layout(api: &GfxApi) -> DescriptorSetLayout {
        api.device_context()
            .create_descriptor_set_layout(&DescriptorSetLayoutDef {
                frequency: 0,
                ranges: vec![DescriptorRangeDef::new(
                    "cb",
                    0,
                    ShaderResourceType::ConstantBuffer,
                    2,
                )],
            })
            .unwrap()
    }

    fn make_buffer(api: &GfxApi) -> Buffer {
        api.device_context()
            .create_buffer(&BufferDef {
                size: 256,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap()
    }

    #[test]
    fn destroying_a_bound_resource_removes_its_entry() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);

        let buffer = make_buffer(&api);
        set.set_buffer(0, &buffer);
        assert!(set.has_binding(0));

        drop(buffer);
        assert!(!set.has_binding(0));

        // a later replay enumerates nothing
        let mut seen = 0;
        set.for_each_binding(|_, _| seen += 1);
        assert_eq!(seen, 0);
    }

    #[test]
    fn destroying_one_resource_keeps_other_bindings() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);

        let short_lived = make_buffer(&api);
        let long_lived = make_buffer(&api);
        set.set_buffer(0, &short_lived);
        set.set_buffer(1, &long_lived);

        drop(short_lived);
        assert!(!set.has_binding(0));
        assert!(set.has_binding(1));
    }

    #[test]
    fn rebinding_a_slot_unregisters_the_old_resource() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);

        let first = make_buffer(&api);
        let second = make_buffer(&api);
        set.set_buffer(0, &first);
        set.set_buffer(0, &second);

        // dropping the replaced buffer must not disturb the new binding
        drop(first);
        assert!(set.has_binding(0));

        let mut bound_uid = None;
        set.for_each_binding(|index, binding| {
            if let DescriptorRef::Buffer { buffer, .. } = binding {
                assert_eq!(index, 0);
                bound_uid = Some(buffer.uid());
            }
        });
        assert_eq!(bound_uid, Some(second.uid()));
    }

    #[test]
    fn out_of_range_index_clamps_to_last_slot() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);

        let buffer = make_buffer(&api);
        set.set_buffer(99, &buffer);
        assert!(set.has_binding(1));
    }

    #[test]
    #[should_panic(expected = "not a texture")]
    fn wrong_kind_bind_fails_fast() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);

        let texture = api
            .device_context()
            .create_texture(&crate::TextureDef {
                extents: crate::Extents3D {
                    width: 4,
                    height: 4,
                    depth: 1,
                },
                format: crate::Format::R8G8B8A8_UNORM,
                usage_flags: ResourceUsage::AS_SHADER_RESOURCE,
                ..crate::TextureDef::default()
            })
            .unwrap();
        set.set_texture(0, &texture);
    }

    #[test]
    fn set_destruction_unregisters_from_resources() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let buffer = make_buffer(&api);

        {
            let set = DescriptorSet::new(&layout);
            set.set_buffer(0, &buffer);
        }
        // set is gone; dropping the buffer afterwards must not touch it
        drop(buffer);
    }

    #[test]
    fn acceleration_structures_are_unsupported() {
        let api = test_api();
        let layout = buffer_layout(&api);
        let set = DescriptorSet::new(&layout);
        assert!(matches!(
            set.set_acceleration_structure(0),
            Err(crate::GfxError::Unsupported(_))
        ));
    }
}
