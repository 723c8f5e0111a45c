use core::ptr;

use serde_json::Number;

use tangle_schema::info::{EnumInfo, FieldDescriptor};
use tangle_schema::{Document, Entity, EntityHandle, FieldValue, TypeHint};

use crate::error::{ErrorReason, SerializationError};
use crate::memo::EncodeMemo;
use crate::path::{DocPath, PathSegment};
use crate::{CLASS_KEY, REF_KEY};

static ANY_HINT: TypeHint = TypeHint::Any;

// -----------------------------------------------------------------------------
// SerializeOptions

/// Knobs for one serialization call.
#[derive(Clone, Copy, Debug)]
pub struct SerializeOptions {
    /// Reject values whose runtime enum type is not exactly the declared
    /// one. On by default, and always on for the I/O entry points.
    pub strict: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

// -----------------------------------------------------------------------------
// Engine

/// Encodes one entity as a document node: its `@class` tag plus every field
/// passing the serialize predicate, keyed by serialized name.
///
/// The handle is recorded in the memo at the current path before any field
/// is walked, so a cycle that leads back here becomes a `@ref` instead of
/// recursing forever. Singletons emit their tag alone.
///
/// The memo is shared across one top-level call; start from
/// [`to_document`](crate::to_document) unless you are threading a memo
/// yourself.
pub fn serialize_entity(
    handle: &EntityHandle,
    options: SerializeOptions,
    memo: &mut EncodeMemo,
    path: &DocPath,
) -> Result<Document, SerializationError> {
    memo.record(handle, path.clone());

    let entity = handle.borrow();
    let info = entity.info();

    let mut out = serde_json::Map::new();
    out.insert(CLASS_KEY.into(), Document::String(info.tag().into()));
    if info.is_singleton() {
        return Ok(Document::Object(out));
    }

    for field in info.fields() {
        if field.should_serialize(Some(&*entity)) {
            let name = field.serialized_name();
            let value = serialize_field(field, &*entity, options, memo, &path.child(name))?;
            out.insert(name.into(), value);
        }
    }

    Ok(Document::Object(out))
}

/// Encodes one field of `entity` at `path` (which already ends in the
/// field's serialized name).
///
/// An encode hook, when present, replaces the generic value serializer; the
/// memo probe for entity values still happens first, so hooks never break
/// at-most-once encoding.
pub fn serialize_field(
    field: &FieldDescriptor,
    entity: &dyn Entity,
    options: SerializeOptions,
    memo: &mut EncodeMemo,
    path: &DocPath,
) -> Result<Document, SerializationError> {
    let value = entity.get(field.name()).ok_or_else(|| {
        SerializationError::new(
            ErrorReason::Message(format!(
                "entity `{}` has no readable field `{}`",
                entity.info().tag(),
                field.name()
            )),
            path.clone(),
        )
    })?;

    if matches!(field.hint(), TypeHint::Any) {
        log::warn!(
            "field `{}` of `{}` has no usable type hint",
            field.name(),
            entity.info().tag()
        );
    }

    if let Some(hook) = field.metadata().encode_hook() {
        if let FieldValue::Entity(target) = &value {
            if let Some(existing) = memo.get(target) {
                return Ok(ref_document(existing));
            }
            memo.record(target, path.clone());
        }
        return hook(entity, &value).map_err(|err| {
            SerializationError::new(ErrorReason::Hook(err), path.clone()).with_hint(field.hint())
        });
    }

    serialize_value(field.hint(), &value, options, memo, path)
}

/// Encodes one value against its declared hint.
///
/// Entity values probe the memo first: a hit returns `{"@ref": path}` with
/// no further recursion, a miss records the current path and recurses.
/// Containers recurse element-wise with the declared element hint; map keys
/// are serialized then stringified (JSON objects have string keys);
/// multi-maps become arrays of `[key, value]` pairs; enums become their
/// member name; primitives pass through, an integer widening to a float
/// when only a float is declared.
pub fn serialize_value(
    hint: &TypeHint,
    value: &FieldValue,
    options: SerializeOptions,
    memo: &mut EncodeMemo,
    path: &DocPath,
) -> Result<Document, SerializationError> {
    match value {
        FieldValue::Entity(handle) => {
            if let Some(existing) = memo.get(handle) {
                return Ok(ref_document(existing));
            }
            memo.record(handle, path.clone());
            serialize_entity(handle, options, memo, path)
        }
        FieldValue::Null => Ok(Document::Null),
        FieldValue::Bool(value) => Ok(Document::Bool(*value)),
        FieldValue::Int(value) => {
            if widens_to_float(hint) {
                finite_number(*value as f64, path)
            } else {
                Ok(Document::from(*value))
            }
        }
        FieldValue::Float(value) => finite_number(*value, path),
        FieldValue::Str(value) => Ok(Document::String(value.clone())),
        FieldValue::List(items) => {
            serialize_elements(items, hint.list_arm(), options, memo, path)
        }
        FieldValue::Tuple(items) => {
            serialize_elements(items, hint.tuple_arm(), options, memo, path)
        }
        FieldValue::Set(items) => serialize_elements(items, hint.set_arm(), options, memo, path),
        FieldValue::Map(pairs) => {
            let (key_hint, value_hint) = hint.map_arm().unwrap_or((&ANY_HINT, &ANY_HINT));
            let mut out = serde_json::Map::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key_doc =
                    serialize_value(key_hint, key, options, memo, &path.child(PathSegment::MapKey))?;
                let key_str = stringify_key(&key_doc, path)?;
                let value_doc =
                    serialize_value(value_hint, value, options, memo, &path.child(key_str.as_str()))?;
                out.insert(key_str, value_doc);
            }
            Ok(Document::Object(out))
        }
        FieldValue::MultiMap(pairs) => {
            let (key_hint, value_hint) = hint.multimap_arm().unwrap_or((&ANY_HINT, &ANY_HINT));
            let mut out = Vec::with_capacity(pairs.len());
            for (index, (key, value)) in pairs.iter().enumerate() {
                let key_doc =
                    serialize_value(key_hint, key, options, memo, &path.child(PathSegment::MapKey))?;
                let value_doc =
                    serialize_value(value_hint, value, options, memo, &path.child(index))?;
                out.push(Document::Array(vec![key_doc, value_doc]));
            }
            Ok(Document::Array(out))
        }
        FieldValue::Enum(value) => {
            if options.strict && !declared_enum_matches(hint, value.info()) {
                return Err(SerializationError::new(
                    ErrorReason::EnumTypeMismatch {
                        declared: hint.to_string(),
                        found: value.info().name(),
                    },
                    path.clone(),
                )
                .with_hint(hint));
            }
            Ok(Document::String(value.member().into()))
        }
    }
}

fn serialize_elements(
    items: &[FieldValue],
    element: Option<&TypeHint>,
    options: SerializeOptions,
    memo: &mut EncodeMemo,
    path: &DocPath,
) -> Result<Document, SerializationError> {
    let element = element.unwrap_or(&ANY_HINT);
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        out.push(serialize_value(element, item, options, memo, &path.child(index))?);
    }
    Ok(Document::Array(out))
}

fn ref_document(target: &DocPath) -> Document {
    let mut out = serde_json::Map::with_capacity(1);
    out.insert(REF_KEY.into(), target.to_document());
    Document::Object(out)
}

fn finite_number(value: f64, path: &DocPath) -> Result<Document, SerializationError> {
    Number::from_f64(value).map(Document::Number).ok_or_else(|| {
        SerializationError::new(
            ErrorReason::Message(format!("non-finite float `{value}` has no JSON form")),
            path.clone(),
        )
    })
}

// JSON object keys are strings; scalar keys flatten to their textual form
// and are parsed back per the declared key hint on decode.
fn stringify_key(key: &Document, path: &DocPath) -> Result<String, SerializationError> {
    match key {
        Document::String(key) => Ok(key.clone()),
        Document::Number(number) => Ok(number.to_string()),
        Document::Bool(true) => Ok("true".into()),
        Document::Bool(false) => Ok("false".into()),
        Document::Null => Ok("null".into()),
        Document::Array(_) | Document::Object(_) => Err(SerializationError::new(
            ErrorReason::Message("map keys must serialize to scalars".into()),
            path.clone(),
        )),
    }
}

fn widens_to_float(hint: &TypeHint) -> bool {
    hint.has_exact_arm(|leaf| matches!(leaf, TypeHint::Float))
        && !hint.has_exact_arm(|leaf| matches!(leaf, TypeHint::Int | TypeHint::Any))
}

fn declared_enum_matches(hint: &TypeHint, info: &'static EnumInfo) -> bool {
    hint.leaves().into_iter().any(|leaf| match leaf {
        TypeHint::Any => true,
        TypeHint::Enum(declared) => ptr::eq(*declared, info),
        _ => false,
    })
}

// -----------------------------------------------------------------------------
// Tests
