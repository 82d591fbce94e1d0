//! Tracking for parents created by a discovery scan.
//!
//! A registry is an explicit handle owned by whatever performs discovery. Each
//! tracked parent keeps a weak handle back to its registry so that its own
//! `remove()` can trigger a sweep.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use pymprims_host::{FrameState, ParentHost};

use crate::config::ParentConfig;
use crate::error::Result;
use crate::parent::Parent;

/// Custom event discovery code dispatches after a scan.
pub const PYM_INITIALIZED_EVENT: &str = "pym:pym-initialized";

/// A shared, mutable parent.
pub type SharedParent<H> = Rc<RefCell<Parent<H>>>;

struct Tracked<H: ParentHost> {
    container_id: String,
    host: H,
    parent: SharedParent<H>,
}

/// The set of tracked parents.
pub struct InstanceRegistry<H: ParentHost> {
    tracked: Rc<RefCell<Vec<Tracked<H>>>>,
}

/// A weak handle to an [`InstanceRegistry`].
pub struct RegistryHandle<H: ParentHost> {
    tracked: Weak<RefCell<Vec<Tracked<H>>>>,
}

impl<H: ParentHost> RegistryHandle<H> {
    /// The registry, if it still exists.
    pub fn upgrade(&self) -> Option<InstanceRegistry<H>> {
        self.tracked
            .upgrade()
            .map(|tracked| InstanceRegistry { tracked })
    }
}

impl<H: ParentHost + Clone + 'static> InstanceRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tracked: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Construct a parent and track it.
    pub fn create(
        &self,
        host: H,
        container_id: &str,
        url: &str,
        config: ParentConfig,
    ) -> Result<SharedParent<H>> {
        let parent = Parent::new(host, container_id, url, config)?;
        Ok(self.track(parent))
    }

    /// Track an existing parent.
    pub fn track(&self, mut parent: Parent<H>) -> SharedParent<H> {
        parent.attach_registry(self.handle());
        let container_id = parent.id().to_string();
        let host = parent.host().clone();
        let parent = Rc::new(RefCell::new(parent));
        self.tracked.borrow_mut().push(Tracked {
            container_id,
            host,
            parent: Rc::clone(&parent),
        });
        parent
    }

    /// Drop every tracked parent whose container no longer holds a frame with a
    /// reachable content window. Returns how many were dropped.
    ///
    /// Only the hosts are consulted, so sweeping is safe while one of the
    /// tracked parents is mutably borrowed.
    pub fn sweep(&self) -> usize {
        let mut tracked = self.tracked.borrow_mut();
        let mut pruned = 0;
        for idx in (0..tracked.len()).rev() {
            let entry = &tracked[idx];
            let state = entry.host.frame_state(&entry.container_id);
            if state != FrameState::Live {
                tracing::debug!(id = %entry.container_id, ?state, "pruning stale instance");
                tracked.remove(idx);
                pruned += 1;
            }
        }
        pruned
    }

    /// The tracked parents, in tracking order.
    pub fn instances(&self) -> Vec<SharedParent<H>> {
        self.tracked
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.parent))
            .collect()
    }

    /// Container ids of the tracked parents, in tracking order.
    pub fn container_ids(&self) -> Vec<String> {
        self.tracked
            .borrow()
            .iter()
            .map(|entry| entry.container_id.clone())
            .collect()
    }

    /// Number of tracked parents.
    pub fn len(&self) -> usize {
        self.tracked.borrow().len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.tracked.borrow().is_empty()
    }

    /// A weak handle to this registry.
    pub fn handle(&self) -> RegistryHandle<H> {
        RegistryHandle {
            tracked: Rc::downgrade(&self.tracked),
        }
    }

    /// Tell the document a discovery scan finished.
    pub fn announce(&self, host: &H) {
        host.dispatch_custom_event(PYM_INITIALIZED_EVENT);
    }
}

impl<H: ParentHost + Clone + 'static> Default for InstanceRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ParentHost> Clone for InstanceRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            tracked: Rc::clone(&self.tracked),
        }
    }
}

impl<H: ParentHost> fmt::Debug for InstanceRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self
            .tracked
            .try_borrow()
            .map(|tracked| tracked.iter().map(|t| t.container_id.clone()).collect())
            .unwrap_or_default();
        f.debug_struct("InstanceRegistry")
            .field("instances", &ids)
            .finish()
    }
}

impl<H: ParentHost> fmt::Debug for RegistryHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("live", &(self.tracked.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pymprims_host::MemoryPage;

    use super::*;

    fn page_with(ids: &[&str]) -> MemoryPage {
        let page = MemoryPage::default();
        for (idx, id) in ids.iter().enumerate() {
            page.add_element(id, idx as f64 * 500.0, 0.0, 600.0);
        }
        page
    }

    fn registry_for(page: &MemoryPage, ids: &[&str]) -> InstanceRegistry<MemoryPage> {
        let registry = InstanceRegistry::new();
        for id in ids {
            registry
                .create(page.clone(), id, "child.html", ParentConfig::default())
                .expect("parent should mount");
        }
        registry
    }

    #[test]
    fn sweep_keeps_live_instances() {
        let ids = ["a", "b", "c"];
        let page = page_with(&ids);
        let registry = registry_for(&page, &ids);
        assert_eq!(registry.sweep(), 0);
        assert_eq!(registry.container_ids(), ["a", "b", "c"]);
    }

    #[test]
    fn sweep_prunes_missing_and_detached_frames() {
        let ids = ["a", "b", "c", "d"];
        let page = page_with(&ids);
        let registry = registry_for(&page, &ids);

        page.remove_frame_externally("b");
        page.orphan_frame("c");
        page.remove_element("d");

        assert_eq!(registry.sweep(), 3);
        assert_eq!(registry.container_ids(), ["a"]);
    }

    #[test]
    fn adjacent_stale_entries_are_all_pruned() {
        let ids = ["a", "b", "c"];
        let page = page_with(&ids);
        let registry = registry_for(&page, &ids);
        for id in ids {
            page.remove_frame_externally(id);
        }
        assert_eq!(registry.sweep(), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn parent_remove_sweeps_its_registry() {
        let ids = ["a", "b"];
        let page = page_with(&ids);
        let registry = registry_for(&page, &ids);

        let first = registry.instances().remove(0);
        first.borrow_mut().remove();

        assert_eq!(registry.container_ids(), ["b"]);
        assert!(first.borrow().is_removed());
    }

    #[test]
    fn dropped_registry_leaves_parents_usable() {
        let page = page_with(&["a"]);
        let parent = {
            let registry = registry_for(&page, &["a"]);
            registry.instances().remove(0)
        };
        parent.borrow_mut().remove();
        assert!(parent.borrow().is_removed());
    }

    #[test]
    fn announce_dispatches_initialized_event() {
        let page = page_with(&[]);
        let registry: InstanceRegistry<MemoryPage> = InstanceRegistry::new();
        registry.announce(&page);
        assert_eq!(page.custom_events(), [PYM_INITIALIZED_EVENT]);
    }
}
