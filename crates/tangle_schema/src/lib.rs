#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Modules

mod compat;
mod entity;
mod hint;
mod registry;
mod value;

pub mod info;

#[cfg(test)]
mod test_support;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use compat::{hint_matches_type, type_matches_hint, value_matches_hint};
pub use entity::{Entity, EntityHandle, TypedEntity};
pub use hint::{TypeHint, TypeVar};
pub use registry::{EntityRegistration, ResolveError, SubclassRegistry};
pub use value::{EnumValue, FieldValue, ValueKind};

/// The JSON-shaped wire tree entities are encoded into.
///
/// Object key order is preserved, so field order in a document follows the
/// declaration order of the entity that produced it.
pub type Document = serde_json::Value;
