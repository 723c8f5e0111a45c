#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Modules

mod copy;
mod de;
mod document;
mod error;
mod memo;
mod path;
mod ser;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use copy::{copy_from, create_copy};
pub use de::{Decoded, OnFieldError, deserialize_entity, deserialize_field, deserialize_value};
pub use document::{
    from_document, from_document_with, from_json_reader, from_json_str, from_json_str_with,
    to_document, to_document_with, to_json_string, to_json_writer,
};
pub use error::{ErrorReason, SerializationError};
pub use memo::{DecodeMemo, EncodeMemo};
pub use path::{DocPath, PathSegment};
pub use ser::{SerializeOptions, serialize_entity, serialize_field, serialize_value};

pub use tangle_schema::Document;

/// Reserved document key carrying the class tag of an entity value.
pub const CLASS_KEY: &str = "@class";

/// Reserved document key marking a pointer to an already-emitted value.
pub const REF_KEY: &str = "@ref";
