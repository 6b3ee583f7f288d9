//! End-to-end coordination: load, merge, resolve, apply
//!
//! ```text
//! defaults layer + located resources -> LayerMerger -> Resolver -> targets
//! ```

use crate::binder::snapshot;
use crate::{
    ApplyReport, Binder, ConfLoader, Configurable, ConfigurableRegistry, LayerMerger, Resolution,
    Resolver, Result, TargetId,
};
use conf_fs::NormalizedPath;
use conf_model::{Configuration, Layer};
use std::sync::{Arc, Mutex};

/// Owns a configuration and keeps its bound targets up to date.
#[derive(Debug)]
pub struct ConfEngine {
    defaults: Option<Layer>,
    resources: Vec<String>,
    loader: ConfLoader,
    merger: LayerMerger,
    resolver: Resolver,
    registry: ConfigurableRegistry,
    conf: Configuration,
    resolution: Option<Resolution>,
}

impl ConfEngine {
    pub fn new(loader: ConfLoader, resolver: Resolver) -> Self {
        Self {
            defaults: None,
            resources: Vec::new(),
            loader,
            merger: LayerMerger::new(),
            resolver,
            registry: ConfigurableRegistry::new(),
            conf: Configuration::new(),
            resolution: None,
        }
    }

    /// Layer merged below every resource.
    pub fn with_defaults(mut self, defaults: Layer) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Add a resource hint with higher precedence than those already added.
    pub fn with_resource(mut self, hint: impl Into<String>) -> Self {
        self.resources.push(hint.into());
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.conf
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// Outcome of the latest [`reload`](Self::reload) or [`refresh`](Self::refresh).
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Reload every resource, rebuild the configuration, resolve it and push
    /// the values to registered targets.
    ///
    /// Parameters that survive the reload keep their last known good value,
    /// so a value that fails now can still fall back to it.
    pub fn reload(&mut self) -> Result<&Resolution> {
        let hints: Vec<&str> = self.resources.iter().map(String::as_str).collect();
        let loaded = self.loader.load_layers(&hints)?;
        let layers = self.defaults.iter().chain(loaded.iter());
        let mut conf = self.merger.merge(layers)?;
        carry_resolved(&self.conf, &mut conf);
        self.conf = conf;
        tracing::debug!(
            resources = self.resources.len(),
            categories = self.conf.len(),
            "Reloaded configuration"
        );
        Ok(self.refresh())
    }

    /// Merge one more layer on top of the current configuration.
    pub fn merge(&mut self, layer: &Layer) -> Result<()> {
        self.merger.merge_into(&mut self.conf, layer)
    }

    /// Resolve the current configuration and push it to registered targets.
    pub fn refresh(&mut self) -> &Resolution {
        let resolution = self.resolver.resolve(&mut self.conf);
        self.registry.apply(&resolution);
        self.resolution.insert(resolution)
    }

    /// Register a shared target. It receives the latest resolution at once
    /// and every later one until it is dropped.
    pub fn register<T>(&mut self, target: &Arc<Mutex<T>>, binder: Binder) -> TargetId
    where
        T: Configurable + Send + 'static,
    {
        let id = self.registry.register(target, binder.clone());
        if let Some(resolution) = &self.resolution {
            if let Ok(mut guard) = target.lock() {
                binder.apply(resolution, &mut *guard);
            }
        }
        id
    }

    pub fn unregister(&mut self, id: TargetId) -> bool {
        self.registry.unregister(id)
    }

    /// Resolve with `target`'s fields visible as `configurable.*` and apply
    /// the result to it.
    pub fn configure(&mut self, target: &mut dyn Configurable, binder: &Binder) -> ApplyReport {
        let fields = snapshot(target);
        let resolution = self.resolver.resolve_with(&mut self.conf, Some(&fields));
        binder.apply(&resolution, target)
    }

    /// Write the current configuration to the resource for `hint`.
    pub fn save(&self, hint: &str) -> Result<NormalizedPath> {
        self.loader.save(&self.conf, hint)
    }
}

fn carry_resolved(previous: &Configuration, next: &mut Configuration) {
    for category in next.categories_mut() {
        let Some(old) = previous.get(category.name().as_str()) else {
            continue;
        };
        for param in category.params_mut() {
            if let Some(value) = old.get(param.name().as_str()).and_then(|p| p.resolved()) {
                param.record_success(value.clone());
            }
        }
    }
}
