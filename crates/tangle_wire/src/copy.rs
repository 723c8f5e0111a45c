use tangle_schema::info::FieldArgs;
use tangle_schema::{EntityHandle, FieldValue};

use crate::error::{ErrorReason, SerializationError};
use crate::path::DocPath;

// -----------------------------------------------------------------------------
// Graph copy

/// Sets `target` to a structural copy of `source`.
///
/// Both handles must refer to the same concrete type. Every field passing
/// the serialize predicate is deep-copied with [`create_copy`] and assigned;
/// other fields are left untouched. Copying a handle onto itself is a no-op
/// (singletons hand out one shared instance).
pub fn copy_from(
    target: &EntityHandle,
    source: &EntityHandle,
) -> Result<(), SerializationError> {
    if target.ptr_eq(source) {
        return Ok(());
    }
    let info = source.info();
    if !core::ptr::eq(target.info(), info) {
        return Err(SerializationError::new(
            ErrorReason::Message(format!(
                "cannot copy `{}` onto `{}`",
                info.tag(),
                target.info().tag()
            )),
            DocPath::root(),
        ));
    }

    for field in info.fields() {
        let value = {
            let source = source.borrow();
            if !field.should_serialize(Some(&*source)) {
                continue;
            }
            source.get(field.name())
        };
        let Some(value) = value else { continue };
        let copied = create_copy(&value)?;
        target
            .borrow_mut()
            .set(field.name(), copied)
            .map_err(|err| {
                SerializationError::new(ErrorReason::Construct(err), DocPath::root())
                    .with_hint(field.hint())
            })?;
    }
    Ok(())
}

/// Deep-copies one runtime value.
///
/// Entities are rebuilt as fresh instances of the same concrete type: the
/// registered constructor runs on copies of the immediate fields, then
/// deferred fields are copied over through `set`. Containers copy
/// element-wise; scalars and enum members clone. The result shares no
/// handles with the input.
///
/// Copying follows the graph without a memo, so a cyclic graph must be
/// copied via a serialize/deserialize round trip instead.
pub fn create_copy(value: &FieldValue) -> Result<FieldValue, SerializationError> {
    match value {
        FieldValue::Entity(source) => {
            let info = source.info();
            let mut args = FieldArgs::new(info.tag());
            let mut deferred = Vec::new();
            {
                let entity = source.borrow();
                for field in info.fields() {
                    if !field.should_serialize(Some(&*entity)) {
                        continue;
                    }
                    let Some(current) = entity.get(field.name()) else { continue };
                    let copied = create_copy(&current)?;
                    if field.defers_loading() {
                        deferred.push((field, copied));
                    } else {
                        args.insert(field.name(), copied);
                    }
                }
            }
            let target = info.construct(args).map_err(|err| {
                SerializationError::new(ErrorReason::Construct(err), DocPath::root())
            })?;
            for (field, copied) in deferred {
                target.borrow_mut().set(field.name(), copied).map_err(|err| {
                    SerializationError::new(ErrorReason::Construct(err), DocPath::root())
                        .with_hint(field.hint())
                })?;
            }
            Ok(FieldValue::Entity(target))
        }
        FieldValue::List(items) => Ok(FieldValue::List(copy_items(items)?)),
        FieldValue::Tuple(items) => Ok(FieldValue::Tuple(copy_items(items)?)),
        FieldValue::Set(items) => Ok(FieldValue::Set(copy_items(items)?)),
        FieldValue::Map(pairs) => Ok(FieldValue::Map(copy_pairs(pairs)?)),
        FieldValue::MultiMap(pairs) => Ok(FieldValue::MultiMap(copy_pairs(pairs)?)),
        scalar => Ok(scalar.clone()),
    }
}

fn copy_items(items: &[FieldValue]) -> Result<Vec<FieldValue>, SerializationError> {
    items.iter().map(create_copy).collect()
}

fn copy_pairs(
    pairs: &[(FieldValue, FieldValue)],
) -> Result<Vec<(FieldValue, FieldValue)>, SerializationError> {
    pairs
        .iter()
        .map(|(key, value)| Ok((create_copy(key)?, create_copy(value)?)))
        .collect()
}

// -----------------------------------------------------------------------------
// Tests
