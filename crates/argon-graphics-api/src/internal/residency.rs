use std::sync::{Arc, Mutex, Weak};

use crate::descriptor_set::DescriptorSetInner;

/// One descriptor-set slot this resource is currently bound into.
#[derive(Debug)]
pub(crate) struct ResidencyEntry {
    pub set: Weak<DescriptorSetInner>,
    pub set_id: u64,
    pub flat_index: u32,
}

/// Reverse residency set carried by every resource: the (descriptor-set,
/// flat-index) pairs the resource is bound into. When the resource dies it
/// unbinds itself from every set, so a later bind replay never resolves a
/// stale entry.
///
/// Lock ordering: never hold this lock while locking a set's binding table
/// (and vice versa); callers take them strictly one at a time.
#[derive(Debug, Default)]
pub(crate) struct ResourceBindings {
    entries: Mutex<Vec<ResidencyEntry>>,
}

impl ResourceBindings {
    pub fn register(&self, set: &Arc<DescriptorSetInner>, flat_index: u32) {
        let mut entries = self.entries.lock().unwrap();
        let set_id = set.id();
        if !entries
            .iter()
            .any(|e| e.set_id == set_id && e.flat_index == flat_index)
        {
            entries.push(ResidencyEntry {
                set: Arc::downgrade(set),
                set_id,
                flat_index,
            });
        }
    }

    pub fn unregister(&self, set_id: u64, flat_index: u32) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|e| !(e.set_id == set_id && e.flat_index == flat_index));
    }

    /// Drops every entry this resource left behind, removing the matching
    /// binding from each still-live descriptor set. Called from the owning
    /// resource's `Drop` with that resource's uid.
    pub fn purge(&self, resource_uid: u64) {
        let entries = std::mem::take(&mut *self.entries.lock().unwrap());
        for entry in entries {
            if let Some(set) = entry.set.upgrade() {
                set.remove_resource_binding(entry.flat_index, resource_uid);
            }
        }
    }
}
