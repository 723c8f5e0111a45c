//! Top-level entry points: whole-graph encoding to documents, JSON strings
//! and writers, and back.
//!
//! Every function here creates fresh memos, so independent calls never share
//! state; the subclass registry is the only long-lived collaborator.

use std::io;

use tangle_schema::info::EntityType;
use tangle_schema::{Document, EntityHandle, TypedEntity};

use crate::de::{OnFieldError, deserialize_entity};
use crate::error::{ErrorReason, SerializationError};
use crate::memo::{DecodeMemo, EncodeMemo};
use crate::path::DocPath;
use crate::ser::{SerializeOptions, serialize_entity};

// -----------------------------------------------------------------------------
// Encoding

/// Encodes a whole graph into a document, strict mode on.
pub fn to_document(root: &EntityHandle) -> Result<Document, SerializationError> {
    to_document_with(root, SerializeOptions::default())
}

/// Encodes a whole graph into a document with explicit options.
pub fn to_document_with(
    root: &EntityHandle,
    options: SerializeOptions,
) -> Result<Document, SerializationError> {
    let mut memo = EncodeMemo::new();
    serialize_entity(root, options, &mut memo, &DocPath::root())
}

/// Encodes a whole graph as pretty-printed JSON (two-space indent).
pub fn to_json_string(root: &EntityHandle) -> Result<String, SerializationError> {
    let document = to_document(root)?;
    serde_json::to_string_pretty(&document)
        .map_err(|err| SerializationError::new(ErrorReason::Json(err), DocPath::root()))
}

/// Encodes a whole graph as pretty-printed JSON into a writer.
pub fn to_json_writer<W: io::Write>(
    root: &EntityHandle,
    writer: W,
) -> Result<(), SerializationError> {
    let document = to_document(root)?;
    serde_json::to_writer_pretty(writer, &document)
        .map_err(|err| SerializationError::new(ErrorReason::Json(err), DocPath::root()))
}

// -----------------------------------------------------------------------------
// Decoding

/// Decodes a document into a fully wired graph rooted at `T` (or a
/// registered subtype named by the document's `@class` tag).
pub fn from_document<T: TypedEntity>(doc: &Document) -> Result<EntityHandle, SerializationError> {
    from_document_with(doc, T::entity_type(), None)
}

/// Decodes a document against an explicit root type, optionally collecting
/// per-field errors instead of failing fast.
pub fn from_document_with(
    doc: &Document,
    root: EntityType,
    on_error: Option<&mut OnFieldError<'_>>,
) -> Result<EntityHandle, SerializationError> {
    let mut memo = DecodeMemo::new();
    deserialize_entity(doc, root, &mut memo, &DocPath::root(), on_error)
}

/// Parses JSON text and decodes it into a graph rooted at `T`.
pub fn from_json_str<T: TypedEntity>(text: &str) -> Result<EntityHandle, SerializationError> {
    from_json_str_with(text, T::entity_type(), None)
}

/// Parses JSON text and decodes it against an explicit root type.
pub fn from_json_str_with(
    text: &str,
    root: EntityType,
    on_error: Option<&mut OnFieldError<'_>>,
) -> Result<EntityHandle, SerializationError> {
    let document: Document = serde_json::from_str(text)
        .map_err(|err| SerializationError::new(ErrorReason::Json(err), DocPath::root()))?;
    from_document_with(&document, root, on_error)
}

/// Reads JSON from a reader and decodes it into a graph rooted at `T`.
pub fn from_json_reader<T: TypedEntity, R: io::Read>(
    reader: R,
) -> Result<EntityHandle, SerializationError> {
    let document: Document = serde_json::from_reader(reader)
        .map_err(|err| SerializationError::new(ErrorReason::Json(err), DocPath::root()))?;
    from_document::<T>(&document)
}

// -----------------------------------------------------------------------------
// Tests
