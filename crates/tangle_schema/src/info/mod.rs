//! Per-type descriptors, built once at schema-registration time.
//!
//! Nothing in here is discovered through runtime reflection: an entity's
//! fields, defaults and metadata are spelled out by whoever implements
//! [`TypedEntity`](crate::TypedEntity), usually inside a `OnceLock` so the
//! descriptor is assembled lazily on first access and shared afterwards.

mod entity_info;
mod enum_info;
mod field_info;

pub use entity_info::{ConstructError, ConstructFn, EntityInfo, EntityType, FieldArgs};
pub use enum_info::EnumInfo;
pub use field_info::{
    DecodeHook, DefaultFn, EncodeHook, FieldDescriptor, FieldMetadata, HookError,
};
