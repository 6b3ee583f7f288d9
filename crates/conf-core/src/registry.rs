//! Registry of bound targets
//!
//! One configuration can drive many live targets. The registry holds only
//! weak references, so a target is dropped as soon as its owner drops it;
//! dead entries are pruned whenever a resolution is pushed.

use crate::{ApplyReport, Binder, Configurable, Resolution};
use std::sync::{Arc, Mutex, Weak};

/// A target shared between its owner and the registry.
pub type SharedConfigurable = Arc<Mutex<dyn Configurable + Send>>;

/// Identifies a registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(usize);

struct Registration {
    id: TargetId,
    target: Weak<Mutex<dyn Configurable + Send>>,
    binder: Binder,
}

/// Weak references to targets bound to one configuration.
#[derive(Default)]
pub struct ConfigurableRegistry {
    targets: Vec<Registration>,
    next_id: usize,
}

impl ConfigurableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target`, applying values through `binder`.
    pub fn register<T>(&mut self, target: &Arc<Mutex<T>>, binder: Binder) -> TargetId
    where
        T: Configurable + Send + 'static,
    {
        let shared: SharedConfigurable = target.clone();
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.push(Registration {
            id,
            target: Arc::downgrade(&shared),
            binder,
        });
        tracing::debug!(target_id = id.0, "Registered configurable target");
        id
    }

    /// Remove a target. Returns false when it was not registered.
    pub fn unregister(&mut self, id: TargetId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|r| r.id != id);
        self.targets.len() != before
    }

    /// Number of targets still alive.
    pub fn live(&self) -> usize {
        self.targets.iter().filter(|r| r.target.strong_count() > 0).count()
    }

    /// Drop registrations whose target is gone. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.targets.len();
        self.targets.retain(|r| r.target.strong_count() > 0);
        let removed = before - self.targets.len();
        if removed > 0 {
            tracing::debug!(removed, "Pruned dropped targets");
        }
        removed
    }

    /// Apply `resolution` to every live target.
    pub fn apply(&mut self, resolution: &Resolution) -> Vec<(TargetId, ApplyReport)> {
        self.prune();
        let mut reports = Vec::with_capacity(self.targets.len());
        for registration in &self.targets {
            let Some(target) = registration.target.upgrade() else {
                continue;
            };
            match target.lock() {
                Ok(mut guard) => {
                    let report = registration.binder.apply(resolution, &mut *guard);
                    reports.push((registration.id, report));
                }
                Err(_) => {
                    tracing::warn!(target_id = registration.id.0, "Skipping poisoned target");
                }
            }
        }
        reports
    }
}

impl std::fmt::Debug for ConfigurableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurableRegistry")
            .field("targets", &self.targets.len())
            .field("live", &self.live())
            .finish()
    }
}
