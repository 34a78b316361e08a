//! Capability lookup
//!
//! Hosts expose optional services by id through a [`CapabilitySource`].
//! Handles are type-erased; a trait-object service is wrapped in
//! [`Capability`] so it can be recovered by downcasting.
//!
//! ```rust,ignore
//! let menu: Arc<dyn ConfigMenu> = Arc::new(HostMenu::new());
//! registry.insert("spacechase0.GenericModConfigMenu", Capability::handle(menu));
//!
//! let cache = CapabilityCache::new(Arc::new(registry));
//! let menu = cache.get_capability::<dyn ConfigMenu>("spacechase0.GenericModConfigMenu", true)?;
//! ```

use crate::error::{BridgeError, Result};
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, trace, warn};

/// A type-erased service handle
pub type CapabilityHandle = Arc<dyn Any + Send + Sync>;

/// Host-side registry of services by id
pub trait CapabilitySource: Send + Sync {
    /// The handle registered under `id`, if any
    fn lookup(&self, id: &str) -> anyhow::Result<Option<CapabilityHandle>>;
}

/// A typed service behind a [`CapabilityHandle`]
pub struct Capability<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized + Send + Sync + 'static> Capability<T> {
    /// Erase `service` into a handle
    pub fn handle(service: Arc<T>) -> CapabilityHandle {
        Arc::new(Self(service))
    }
}

/// A fixed map of capabilities, for hosts that know them up front
#[derive(Default)]
pub struct StaticCapabilities {
    handles: HashMap<String, CapabilityHandle>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under `id`
    pub fn insert(&mut self, id: impl Into<String>, handle: CapabilityHandle) {
        self.handles.insert(id.into(), handle);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, id: impl Into<String>, handle: CapabilityHandle) -> Self {
        self.insert(id, handle);
        self
    }
}

impl CapabilitySource for StaticCapabilities {
    fn lookup(&self, id: &str) -> anyhow::Result<Option<CapabilityHandle>> {
        Ok(self.handles.get(id).cloned())
    }
}

/// Typed, caching front for a [`CapabilitySource`]
///
/// A handle is cached after its first successful typed lookup.
pub struct CapabilityCache {
    source: Arc<dyn CapabilitySource>,
    cache: Mutex<HashMap<String, CapabilityHandle>>,
}

impl CapabilityCache {
    pub fn new(source: Arc<dyn CapabilitySource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `id` as a `T`
    ///
    /// With `soft_fail`, absence (or a handle of the wrong type) yields
    /// `Ok(None)` and is logged quietly. Without it, absence is an error and
    /// logged as one.
    pub fn get_capability<T>(&self, id: &str, soft_fail: bool) -> Result<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if let Some(handle) = self.cache.lock().get(id) {
            if let Some(typed) = handle.downcast_ref::<Capability<T>>() {
                return Ok(Some(Arc::clone(&typed.0)));
            }
        }

        let handle = match self.source.lookup(id) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                if soft_fail {
                    trace!(category = "bridge", capability = id, "capability not present");
                    return Ok(None);
                }
                error!(category = "bridge", capability = id, "capability not present");
                return Err(BridgeError::CapabilityAbsent(id.to_string()));
            }
            Err(err) => {
                warn!(category = "bridge", capability = id, "capability lookup failed: {:#}", err);
                if soft_fail {
                    return Ok(None);
                }
                return Err(BridgeError::CapabilityAbsent(id.to_string()));
            }
        };

        let Some(typed) = handle.downcast_ref::<Capability<T>>() else {
            warn!(
                category = "bridge",
                capability = id,
                expected = type_name::<T>(),
                "capability has an unexpected type"
            );
            if soft_fail {
                return Ok(None);
            }
            return Err(BridgeError::CapabilityType {
                id: id.to_string(),
                expected: type_name::<T>(),
            });
        };
        let service = Arc::clone(&typed.0);

        self.cache.lock().insert(id.to_string(), handle);
        trace!(category = "bridge", capability = id, "capability acquired");
        Ok(Some(service))
    }
}
