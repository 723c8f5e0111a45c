use std::collections::HashMap;

use tangle_schema::EntityHandle;

use crate::path::DocPath;

// -----------------------------------------------------------------------------
// EncodeMemo

/// Identity→path map for one serialization call.
///
/// The encoder probes it before recursing into any entity value: a hit means
/// the entity was already emitted and the occurrence becomes a `@ref` to the
/// recorded path. The first write for an identity wins, so the recorded path
/// is always where the full encoding lives.
///
/// Keys are handle identities, which stay valid because the graph being
/// serialized keeps every handle alive for the duration of the call; a memo
/// must not outlive its call.
#[derive(Debug, Default)]
pub struct EncodeMemo {
    paths: HashMap<usize, DocPath>,
}

impl EncodeMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// The path at which this entity was first emitted, if it was.
    pub fn get(&self, handle: &EntityHandle) -> Option<&DocPath> {
        self.paths.get(&handle.identity())
    }

    /// Records the entity's first emission path; later records for the same
    /// identity are ignored.
    pub fn record(&mut self, handle: &EntityHandle, path: DocPath) {
        self.paths.entry(handle.identity()).or_insert(path);
    }
}

// -----------------------------------------------------------------------------
// DecodeMemo

/// Path→entity map for one deserialization call.
///
/// Every constructed entity is recorded at its document path before its
/// deferred fields are populated, which is what lets a `@ref` resolve to an
/// instance that is still being wired up, including the instance itself.
#[derive(Debug, Default)]
pub struct DecodeMemo {
    entities: HashMap<DocPath, EntityHandle>,
}

impl DecodeMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// The entity decoded at `path`, if any.
    pub fn get(&self, path: &DocPath) -> Option<EntityHandle> {
        self.entities.get(path).cloned()
    }

    pub fn record(&mut self, path: DocPath, handle: EntityHandle) {
        self.entities.insert(path, handle);
    }
}

// -----------------------------------------------------------------------------
// Tests
