use core::fmt;
use core::ptr;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::entity::TypedEntity;
use crate::info::{EntityInfo, EntityType};

// -----------------------------------------------------------------------------
// EntityRegistration

/// A submission declaring one concrete entity type to the process-wide
/// registry.
///
/// Registrations are collected through [`inventory`], so declaring a type is
/// a single line next to its definition:
///
/// ```ignore
/// inventory::submit! { EntityRegistration::of::<Circle>() }
/// ```
///
/// All submissions are folded into [`SubclassRegistry::global`] the first
/// time it is consulted; nothing registers at instantiation time.
pub struct EntityRegistration {
    info: fn() -> &'static EntityInfo,
}

impl EntityRegistration {
    #[inline]
    pub const fn new(info: fn() -> &'static EntityInfo) -> Self {
        Self { info }
    }

    #[inline]
    pub const fn of<T: TypedEntity>() -> Self {
        Self::new(T::entity_info)
    }

    #[inline]
    pub fn info(&self) -> &'static EntityInfo {
        (self.info)()
    }
}

inventory::collect!(EntityRegistration);

// -----------------------------------------------------------------------------
// SubclassRegistry

/// Class-tag resolution tables for polymorphic reconstruction.
///
/// Every registered type gets an entry in its own table and, cascading along
/// its parent chain, in the table of each ancestor, so the most distant
/// ancestor asked to resolve a tag still finds a far descendant:
///
/// ```ignore
/// let mut registry = SubclassRegistry::new();
/// registry.register(Circle::entity_info()); // parent: Shape
///
/// let info = registry.resolve(Shape::entity_info(), "Circle")?;
/// assert_eq!(info.tag(), "Circle");
/// ```
///
/// Lookup failure is fatal for the subtree being decoded; there is no
/// fallback to a base type, because guessing wrong would silently corrupt
/// data. The error carries the registered tags for diagnosability.
pub struct SubclassRegistry {
    // Root tag → (descendant tag → descriptor). BTreeMaps keep error dumps
    // and iteration deterministic.
    roots: BTreeMap<&'static str, BTreeMap<&'static str, &'static EntityInfo>>,
    // Every registered tag, for forward-reference resolution.
    tags: BTreeMap<&'static str, &'static EntityInfo>,
}

impl SubclassRegistry {
    /// An empty registry; entries are added with [`register`](Self::register).
    pub fn new() -> Self {
        Self {
            roots: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// The process-wide registry, built on first access from every
    /// [`EntityRegistration`] submitted through `inventory`.
    ///
    /// Write-once: after this returns, the registry is only ever read, so
    /// concurrent readers need no synchronization.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SubclassRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let mut registry = Self::new();
            for registration in inventory::iter::<EntityRegistration> {
                registry.register(registration.info());
            }
            registry
        })
    }

    /// Registers one concrete type, cascading its tag into the table of
    /// every ancestor on its parent chain.
    ///
    /// Re-registering the same descriptor is a no-op. A different descriptor
    /// under an already-known tag is refused with a warning; first
    /// registration wins.
    pub fn register(&mut self, info: &'static EntityInfo) {
        match self.tags.get(info.tag()) {
            Some(existing) if !ptr::eq(*existing, info) => {
                log::warn!(
                    "entity tag `{}` registered twice with different descriptors; keeping the first",
                    info.tag()
                );
                return;
            }
            Some(_) => return,
            None => {
                self.tags.insert(info.tag(), info);
            }
        }

        let mut ancestor = Some(info);
        while let Some(current) = ancestor {
            self.roots
                .entry(current.tag())
                .or_default()
                .insert(info.tag(), info);
            ancestor = current.parent().map(EntityType::info);
        }
    }

    /// Resolves a class tag against the table of the given hierarchy root.
    pub fn resolve(
        &self,
        root: &'static EntityInfo,
        tag: &str,
    ) -> Result<&'static EntityInfo, ResolveError> {
        if tag == root.tag() {
            return Ok(root);
        }
        self.roots
            .get(root.tag())
            .and_then(|table| table.get(tag).copied())
            .ok_or_else(|| ResolveError {
                tag: tag.into(),
                root: root.tag(),
                known: self.known_tags(root),
            })
    }

    /// Whether `tag` resolves under `root`.
    pub fn contains(&self, root: &'static EntityInfo, tag: &str) -> bool {
        self.resolve(root, tag).is_ok()
    }

    /// Resolves a tag against every registration, regardless of hierarchy.
    /// Backs forward-reference hints.
    pub fn lookup_tag(&self, tag: &str) -> Option<&'static EntityInfo> {
        self.tags.get(tag).copied()
    }

    /// The tags registered under a root, in sorted order.
    pub fn known_tags(&self, root: &'static EntityInfo) -> Vec<&'static str> {
        self.roots
            .get(root.tag())
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for SubclassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubclassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.roots
                    .iter()
                    .map(|(root, table)| (root, table.keys().collect::<Vec<_>>())),
            )
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ResolveError

/// An unresolvable class tag, with the registered tags of the queried root
/// so the failure is diagnosable without a debugger.
#[derive(Debug)]
pub struct ResolveError {
    pub tag: String,
    pub root: &'static str,
    pub known: Vec<&'static str>,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown entity class tag `{}`: not registered under root `{}` (known tags: ",
            self.tag, self.root
        )?;
        if self.known.is_empty() {
            f.write_str("none")?;
        }
        for (i, tag) in self.known.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
        }
        f.write_str(")")
    }
}

impl core::error::Error for ResolveError {}

// -----------------------------------------------------------------------------
// Tests
