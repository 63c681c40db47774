use crate::core::Result;
use crate::property::kind::{Hook, PropertyKind};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace, warn};

lazy_static! {
    static ref GLOBAL_CACHE: Arc<MethodCache> = Arc::new(MethodCache::new());
}

/// A hook located on a specific layer of a kind's chain.
#[derive(Clone)]
pub struct ResolvedMethod {
    owner: String,
    name: String,
    hook: Hook,
}

impl ResolvedMethod {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hook(&self) -> &Hook {
        &self.hook
    }
}

impl PartialEq for ResolvedMethod {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name && Arc::ptr_eq(&self.hook, &other.hook)
    }
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

impl fmt::Debug for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedMethod({})", self)
    }
}

pub type MethodList = Arc<[ResolvedMethod]>;

/// Chains memoized for one qualified kind name, together with the owners
/// of the layer chain they were resolved against.
#[derive(Default)]
struct KindEntry {
    owners: Vec<String>,
    chains: HashMap<Vec<String>, MethodList>,
}

/// Memoized method chains, keyed by qualified kind name and then by the
/// requested method-name tuple.
///
/// Entries are never evicted; the number of kinds in a process is small
/// and fixed. The mutex is held across lookup and population so that
/// concurrent first resolutions of the same kind do not race.
pub struct MethodCache {
    entries: Mutex<HashMap<String, KindEntry>>,
}

impl MethodCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the process-wide cache used when none is injected.
    pub fn global() -> &'static Arc<MethodCache> {
        &GLOBAL_CACHE
    }

    /// Collect the overriding hooks named in `names` along the chain of
    /// `kind`.
    ///
    /// Layers are visited most derived first; every layer contributes the
    /// requested hooks it defines itself, in the order given by `names`.
    /// With `reverse` the memoized list is returned base-first.
    pub fn find_methods(&self, kind: &PropertyKind, names: &[&str], reverse: bool) -> Result<MethodList> {
        let methods = self.resolve(kind, names)?;

        if reverse {
            let reversed: Vec<ResolvedMethod> = methods.iter().rev().cloned().collect();
            return Ok(Arc::from(reversed));
        }

        Ok(methods)
    }

    fn resolve(&self, kind: &PropertyKind, names: &[&str]) -> Result<MethodList> {
        let kind_name = kind.qualified_name();
        let key: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let owners: Vec<String> = kind.layers().iter().map(|l| l.owner().to_string()).collect();

        let mut entries = self.entries.lock()?;
        let entry = entries.entry(kind_name.clone()).or_insert_with(|| KindEntry {
            owners: owners.clone(),
            chains: HashMap::new(),
        });

        // Another kind already owns this name; serve it uncached.
        if entry.owners != owners {
            warn!(
                kind = %kind_name,
                cached = ?entry.owners,
                requested = ?owners,
                "qualified kind name shared by different layer chains"
            );
            return Ok(collect_methods(kind, names));
        }

        if let Some(methods) = entry.chains.get(&key) {
            trace!(kind = %kind_name, names = ?key, "method chain cache hit");
            return Ok(Arc::clone(methods));
        }

        let methods = collect_methods(kind, names);
        debug!(
            kind = %kind_name,
            names = ?key,
            resolved = methods.len(),
            "resolved method chain"
        );

        entry.chains.insert(key, Arc::clone(&methods));
        Ok(methods)
    }

    /// Whether any chain has been memoized for the given qualified kind name.
    pub fn contains_kind(&self, qualified_name: &str) -> Result<bool> {
        Ok(self.entries.lock()?.contains_key(qualified_name))
    }

    /// Number of kinds with memoized chains.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries.lock()?.is_empty())
    }

    /// Drop every memoized chain. Only meant for test isolation.
    pub fn clear(&self) -> Result<()> {
        self.entries.lock()?.clear();
        Ok(())
    }
}

fn collect_methods(kind: &PropertyKind, names: &[&str]) -> MethodList {
    let mut methods = Vec::new();
    for layer in kind.layers() {
        for name in names {
            if let Some(hook) = layer.get(name) {
                methods.push(ResolvedMethod {
                    owner: layer.owner().to_string(),
                    name: name.to_string(),
                    hook: Arc::clone(hook),
                });
            }
        }
    }
    Arc::from(methods)
}

impl Default for MethodCache {
    fn default() -> Self {
        Self::new()
    }
}
