pub(crate) mod residency;
pub(crate) mod ring_alloc;

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_UID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier assigned to every resource and descriptor set; used to
/// compare identities in the dirty-state caches and to match reverse
/// residency entries without holding strong references.
pub(crate) fn next_uid() -> u64 {
    NEXT_RESOURCE_UID.fetch_add(1, Ordering::Relaxed)
}
