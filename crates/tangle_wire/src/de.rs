use tangle_schema::info::{EntityInfo, EntityType, FieldArgs, FieldDescriptor};
use tangle_schema::{
    Document, EntityHandle, EnumValue, FieldValue, SubclassRegistry, TypeHint, value_matches_hint,
};

use crate::error::{ErrorReason, SerializationError};
use crate::memo::DecodeMemo;
use crate::path::{DocPath, PathSegment};
use crate::{CLASS_KEY, REF_KEY};

// -----------------------------------------------------------------------------
// Error policy

/// Per-field error callback for deserialization.
///
/// When supplied, every per-field failure (including a missing required
/// field) is passed to the callback exactly once and decoding continues
/// without the field; without one, the failure is logged and decoding stops
/// at the first error.
pub type OnFieldError<'a> = dyn FnMut(&SerializationError, &FieldDescriptor) + 'a;

pub(crate) struct FieldErrorPolicy<'h, 'f> {
    hook: Option<&'h mut OnFieldError<'f>>,
}

impl<'h, 'f> FieldErrorPolicy<'h, 'f> {
    pub(crate) fn new(hook: Option<&'h mut OnFieldError<'f>>) -> Self {
        Self { hook }
    }

    /// Whether failures are being collected instead of aborting the call.
    fn collecting(&self) -> bool {
        self.hook.is_some()
    }

    fn report(
        &mut self,
        err: SerializationError,
        field: &FieldDescriptor,
    ) -> Result<(), SerializationError> {
        match self.hook.as_mut() {
            Some(hook) => {
                hook(&err, field);
                Ok(())
            }
            None => {
                log::error!("{err}");
                Err(err)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Decoded

/// The result of decoding one container element.
///
/// `Absent` is the distinguished "no value" outcome: an element that failed
/// while an error callback was collecting is dropped by the enclosing
/// container rather than silently becoming null and corrupting its length.
#[derive(Debug)]
pub enum Decoded {
    Value(FieldValue),
    Absent,
}

// -----------------------------------------------------------------------------
// Engine

/// Decodes an entity document against the registry of the given root type.
///
/// The concrete type comes from the document's `@class` tag (absent tag:
/// the root itself); an unresolvable tag is fatal for this subtree. Fields
/// populate in two phases: immediate fields are decoded into the
/// constructor-argument map, the constructed instance is recorded in the
/// memo at the current path, and only then are deferred fields decoded and
/// assigned, so they may refer back to the instance itself or to siblings.
///
/// Start from [`from_document`](crate::from_document) unless you are
/// threading a memo yourself.
pub fn deserialize_entity(
    doc: &Document,
    root: EntityType,
    memo: &mut DecodeMemo,
    path: &DocPath,
    on_error: Option<&mut OnFieldError<'_>>,
) -> Result<EntityHandle, SerializationError> {
    let mut policy = FieldErrorPolicy::new(on_error);
    entity_inner(doc, root.info(), memo, path, &mut policy)
}

/// Decodes one field value of a document, applying the field's decode hook
/// (if any) before the generic value deserializer. `parent_path` is the
/// owning entity's path; the field's serialized name is appended here.
pub fn deserialize_field(
    field: &FieldDescriptor,
    owner: Option<&EntityHandle>,
    doc: &Document,
    memo: &mut DecodeMemo,
    parent_path: &DocPath,
    on_error: Option<&mut OnFieldError<'_>>,
) -> Result<FieldValue, SerializationError> {
    let mut policy = FieldErrorPolicy::new(on_error);
    field_inner(field, owner, doc, memo, parent_path, &mut policy)
}

/// Decodes one wire value against a declared hint.
///
/// Resolution order: `@ref` objects resolve through the memo with no
/// recursion; entity-shaped hints recurse into [`deserialize_entity`]; a
/// `@class` object under a union hint goes to the first arm whose registry
/// resolves the tag; maps, element-wise containers and multi-maps rebuild
/// per the declared element hints; enums resolve by member name; a scalar
/// is accepted as-is when it satisfies the hint. Anything unresolved is an
/// error naming the field, the declared hint and the offending shape.
pub fn deserialize_value(
    field: &FieldDescriptor,
    hint: &TypeHint,
    doc: &Document,
    memo: &mut DecodeMemo,
    path: &DocPath,
    on_error: Option<&mut OnFieldError<'_>>,
) -> Result<FieldValue, SerializationError> {
    let mut policy = FieldErrorPolicy::new(on_error);
    value_inner(field, hint, doc, memo, path, &mut policy)
}

pub(crate) fn entity_inner(
    doc: &Document,
    root: &'static EntityInfo,
    memo: &mut DecodeMemo,
    path: &DocPath,
    policy: &mut FieldErrorPolicy<'_, '_>,
) -> Result<EntityHandle, SerializationError> {
    let Some(obj) = doc.as_object() else {
        return Err(SerializationError::new(
            ErrorReason::Message(format!(
                "expected an entity document for `{}`, found {}",
                root.tag(),
                json_shape(doc)
            )),
            path.clone(),
        ));
    };

    let info = match obj.get(CLASS_KEY) {
        None => root,
        Some(Document::String(tag)) => {
            SubclassRegistry::global()
                .resolve(root, tag)
                .map_err(|err| {
                    SerializationError::new(
                        ErrorReason::UnknownClassTag {
                            tag: err.tag,
                            root: err.root,
                            known: err.known,
                        },
                        path.clone(),
                    )
                })?
        }
        Some(other) => {
            return Err(SerializationError::new(
                ErrorReason::Message(format!(
                    "`@class` must be a string, found {}",
                    json_shape(other)
                )),
                path.clone(),
            ));
        }
    };

    // Phase 1: immediate fields into the constructor-argument map.
    let mut args = FieldArgs::new(info.tag());
    let mut deferred: Vec<&FieldDescriptor> = Vec::new();
    for field in info.fields() {
        let name = field.serialized_name();
        match obj.get(name) {
            Some(wire) if field.should_serialize(None) => {
                if field.defers_loading() {
                    deferred.push(field);
                    continue;
                }
                match field_inner(field, None, wire, memo, path, policy) {
                    Ok(value) => args.insert(field.name(), value),
                    Err(err) => policy.report(err, field)?,
                }
            }
            Some(_) => {}
            None => {
                if field.is_required() {
                    let err = SerializationError::new(
                        ErrorReason::MissingField {
                            entity: info.tag(),
                            field: field.name(),
                        },
                        path.child(name),
                    )
                    .with_hint(field.hint());
                    policy.report(err, field)?;
                }
            }
        }
    }

    for key in obj.keys() {
        if key != CLASS_KEY
            && info.field_by_serialized_name(key).is_none()
            && !info.ignores_key(key)
        {
            log::warn!("document key `{key}` matches no field of `{}`", info.tag());
        }
    }

    let handle = info
        .construct(args)
        .map_err(|err| SerializationError::new(ErrorReason::Construct(err), path.clone()))?;

    // The instance must be reachable before its deferred fields decode, so
    // they can point back at it.
    memo.record(path.clone(), handle.clone());

    // Phase 2: deferred fields through `Entity::set`.
    for field in deferred {
        let name = field.serialized_name();
        let Some(wire) = obj.get(name) else { continue };
        match field_inner(field, Some(&handle), wire, memo, path, policy) {
            Ok(value) => {
                if let Err(err) = handle.borrow_mut().set(field.name(), value) {
                    let err = SerializationError::new(
                        ErrorReason::Construct(err),
                        path.child(name),
                    )
                    .with_hint(field.hint());
                    policy.report(err, field)?;
                }
            }
            Err(err) => policy.report(err, field)?,
        }
    }

    Ok(handle)
}

pub(crate) fn field_inner(
    field: &FieldDescriptor,
    owner: Option<&EntityHandle>,
    doc: &Document,
    memo: &mut DecodeMemo,
    parent_path: &DocPath,
    policy: &mut FieldErrorPolicy<'_, '_>,
) -> Result<FieldValue, SerializationError> {
    let path = parent_path.child(field.serialized_name());

    if matches!(field.hint(), TypeHint::Any) {
        log::warn!("field `{}` has no usable type hint", field.name());
    }

    match field.metadata().decode_hook() {
        Some(hook) => {
            let transformed = {
                // Scope the borrow to the hook call: recursion below may
                // hand out the owner handle again through the memo.
                let borrowed = owner.map(|handle| handle.borrow());
                hook(borrowed.as_deref(), doc.clone())
            }
            .map_err(|err| {
                SerializationError::new(ErrorReason::Hook(err), path.clone())
                    .with_hint(field.hint())
            })?;
            value_inner(field, field.hint(), &transformed, memo, &path, policy)
        }
        None => value_inner(field, field.hint(), doc, memo, &path, policy),
    }
}

fn value_inner(
    field: &FieldDescriptor,
    hint: &TypeHint,
    doc: &Document,
    memo: &mut DecodeMemo,
    path: &DocPath,
    policy: &mut FieldErrorPolicy<'_, '_>,
) -> Result<FieldValue, SerializationError> {
    match doc {
        Document::Object(obj) => {
            if let Some(ref_doc) = obj.get(REF_KEY) {
                let target = DocPath::from_document(ref_doc).ok_or_else(|| {
                    SerializationError::new(
                        ErrorReason::Message(format!("malformed `@ref` path {ref_doc}")),
                        path.clone(),
                    )
                })?;
                return match memo.get(&target) {
                    Some(handle) => Ok(FieldValue::Entity(handle)),
                    None => Err(SerializationError::new(
                        ErrorReason::DanglingRef { target },
                        path.clone(),
                    )),
                };
            }

            if let Some(target) = hint.entity_target() {
                return Ok(FieldValue::Entity(entity_inner(doc, target, memo, path, policy)?));
            }

            // A tagged object under a union hint: the first arm whose
            // registry resolves the tag wins.
            if let Some(Document::String(tag)) = obj.get(CLASS_KEY) {
                for leaf in hint.leaves() {
                    let root = match leaf {
                        TypeHint::Entity(ty) => Some(ty.info()),
                        TypeHint::ForwardRef(name) => SubclassRegistry::global().lookup_tag(name),
                        _ => None,
                    };
                    if let Some(root) = root {
                        if SubclassRegistry::global().contains(root, tag) {
                            return Ok(FieldValue::Entity(entity_inner(
                                doc, root, memo, path, policy,
                            )?));
                        }
                    }
                }
            }

            if let Some((key_hint, value_hint)) = hint.map_arm() {
                let mut pairs = Vec::with_capacity(obj.len());
                for (key_str, value_doc) in obj {
                    let key =
                        decode_map_key(key_str, key_hint, &path.child(PathSegment::MapKey))?;
                    let element = element_inner(
                        field,
                        value_hint,
                        value_doc,
                        memo,
                        &path.child(key_str.as_str()),
                        policy,
                    )?;
                    match element {
                        Decoded::Value(value) => pairs.push((key, value)),
                        Decoded::Absent => {}
                    }
                }
                return Ok(FieldValue::Map(pairs));
            }

            Err(mismatch(field, hint, "map", path))
        }
        Document::Array(items) => {
            if let Some(element) = hint.list_arm() {
                Ok(FieldValue::List(decode_elements(
                    field, element, items, memo, path, policy,
                )?))
            } else if let Some(element) = hint.tuple_arm() {
                Ok(FieldValue::Tuple(decode_elements(
                    field, element, items, memo, path, policy,
                )?))
            } else if let Some(element) = hint.set_arm() {
                let decoded = decode_elements(field, element, items, memo, path, policy)?;
                let mut unique: Vec<FieldValue> = Vec::with_capacity(decoded.len());
                for item in decoded {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(FieldValue::Set(unique))
            } else if let Some((key_hint, value_hint)) = hint.multimap_arm() {
                let mut pairs = Vec::with_capacity(items.len());
                for (index, pair_doc) in items.iter().enumerate() {
                    let pair = pair_doc.as_array().filter(|pair| pair.len() == 2).ok_or_else(
                        || {
                            SerializationError::new(
                                ErrorReason::Message(
                                    "multimap entries must be [key, value] pairs".into(),
                                ),
                                path.child(index),
                            )
                            .with_hint(hint)
                        },
                    )?;
                    let key = element_inner(
                        field,
                        key_hint,
                        &pair[0],
                        memo,
                        &path.child(PathSegment::MapKey),
                        policy,
                    )?;
                    let value = element_inner(
                        field,
                        value_hint,
                        &pair[1],
                        memo,
                        &path.child(index),
                        policy,
                    )?;
                    match (key, value) {
                        (Decoded::Value(key), Decoded::Value(value)) => pairs.push((key, value)),
                        _ => {}
                    }
                }
                Ok(FieldValue::MultiMap(pairs))
            } else {
                Err(mismatch(field, hint, "list", path))
            }
        }
        Document::String(text) => {
            if let Some(info) = hint.enum_arm() {
                match EnumValue::new(info, text) {
                    Some(value) => return Ok(FieldValue::Enum(value)),
                    // With a string alternative declared alongside the enum,
                    // a non-member falls through to the plain string.
                    None if hint.has_exact_arm(|leaf| matches!(leaf, TypeHint::Str)) => {}
                    None => {
                        return Err(SerializationError::new(
                            ErrorReason::UnknownEnumMember {
                                declared: info.name(),
                                member: text.clone(),
                            },
                            path.clone(),
                        )
                        .with_hint(hint));
                    }
                }
            }
            accept_scalar(field, hint, FieldValue::Str(text.clone()), path)
        }
        Document::Null => {
            if hint.admits_null() {
                Ok(FieldValue::Null)
            } else {
                Err(mismatch(field, hint, "null", path))
            }
        }
        Document::Bool(value) => accept_scalar(field, hint, FieldValue::Bool(*value), path),
        Document::Number(number) => {
            let value = if let Some(int) = number.as_i64() {
                let int_declared =
                    hint.has_exact_arm(|leaf| matches!(leaf, TypeHint::Int | TypeHint::Any));
                let float_declared = hint.has_exact_arm(|leaf| matches!(leaf, TypeHint::Float));
                if float_declared && !int_declared {
                    FieldValue::Float(int as f64)
                } else {
                    FieldValue::Int(int)
                }
            } else if let Some(float) = number.as_f64() {
                FieldValue::Float(float)
            } else {
                return Err(mismatch(field, hint, "an out-of-range integer", path));
            };
            accept_scalar(field, hint, value, path)
        }
    }
}

/// Decodes one container element, converting a failure into the absent
/// result while an error callback is collecting.
fn element_inner(
    field: &FieldDescriptor,
    hint: &TypeHint,
    doc: &Document,
    memo: &mut DecodeMemo,
    path: &DocPath,
    policy: &mut FieldErrorPolicy<'_, '_>,
) -> Result<Decoded, SerializationError> {
    match value_inner(field, hint, doc, memo, path, policy) {
        Ok(value) => Ok(Decoded::Value(value)),
        Err(err) if policy.collecting() => {
            policy.report(err, field)?;
            Ok(Decoded::Absent)
        }
        Err(err) => Err(err),
    }
}

fn decode_elements(
    field: &FieldDescriptor,
    element: &TypeHint,
    items: &[Document],
    memo: &mut DecodeMemo,
    path: &DocPath,
    policy: &mut FieldErrorPolicy<'_, '_>,
) -> Result<Vec<FieldValue>, SerializationError> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match element_inner(field, element, item, memo, &path.child(index), policy)? {
            Decoded::Value(value) => out.push(value),
            Decoded::Absent => {}
        }
    }
    Ok(out)
}

// Map keys arrive as JSON strings; parse them back per the declared key
// hint, trying each alternative in declaration order.
fn decode_map_key(
    key: &str,
    hint: &TypeHint,
    path: &DocPath,
) -> Result<FieldValue, SerializationError> {
    for leaf in hint.leaves() {
        match leaf {
            TypeHint::Str | TypeHint::Any => return Ok(FieldValue::Str(key.into())),
            TypeHint::Int => {
                if let Ok(value) = key.parse::<i64>() {
                    return Ok(FieldValue::Int(value));
                }
            }
            TypeHint::Float => {
                if let Ok(value) = key.parse::<f64>() {
                    return Ok(FieldValue::Float(value));
                }
            }
            TypeHint::Bool => match key {
                "true" => return Ok(FieldValue::Bool(true)),
                "false" => return Ok(FieldValue::Bool(false)),
                _ => {}
            },
            TypeHint::Null if key == "null" => return Ok(FieldValue::Null),
            TypeHint::Enum(info) => {
                if let Some(value) = EnumValue::new(info, key) {
                    return Ok(FieldValue::Enum(value));
                }
            }
            _ => {}
        }
    }
    Err(SerializationError::new(
        ErrorReason::Message(format!("map key `{key}` does not fit the declared key type")),
        path.clone(),
    )
    .with_hint(hint))
}

fn accept_scalar(
    field: &FieldDescriptor,
    hint: &TypeHint,
    value: FieldValue,
    path: &DocPath,
) -> Result<FieldValue, SerializationError> {
    if value_matches_hint(&value, hint) {
        Ok(value)
    } else {
        Err(mismatch(field, hint, value.kind().to_string(), path))
    }
}

fn mismatch(
    field: &FieldDescriptor,
    hint: &TypeHint,
    found: impl Into<String>,
    path: &DocPath,
) -> SerializationError {
    SerializationError::new(
        ErrorReason::TypeMismatch {
            field: field.name(),
            expected: hint.to_string(),
            found: found.into(),
        },
        path.clone(),
    )
    .with_hint(hint)
}

fn json_shape(doc: &Document) -> &'static str {
    match doc {
        Document::Null => "null",
        Document::Bool(_) => "bool",
        Document::Number(_) => "number",
        Document::String(_) => "string",
        Document::Array(_) => "array",
        Document::Object(_) => "object",
    }
}

// -----------------------------------------------------------------------------
// Tests
