//! Minimal hand-written entities shared by the unit tests in this crate.
//!
//! These stand in for the declarative layer that would normally generate
//! [`Entity`] implementations.

use core::any::Any;
use std::sync::OnceLock;

use crate::entity::{Entity, EntityHandle, TypedEntity};
use crate::info::{ConstructError, EntityInfo, EntityType, EnumInfo, FieldDescriptor};
use crate::registry::EntityRegistration;
use crate::value::FieldValue;
use crate::TypeHint;

pub static COLOR: EnumInfo = EnumInfo::new("Color", &["Red", "Green", "Blue"]);
pub static SHADE: EnumInfo = EnumInfo::new("Shade", &["Light", "Dark"]);

// -----------------------------------------------------------------------------
// Plain — a fieldless hierarchy root

pub struct Plain;

impl Entity for Plain {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, _field: &str) -> Option<FieldValue> {
        None
    }

    fn set(&mut self, field: &str, _value: FieldValue) -> Result<(), ConstructError> {
        Err(ConstructError::UnknownField {
            entity: "Plain",
            field: field.into(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Plain {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new("Plain", Vec::new(), |_args| Ok(EntityHandle::new(Plain)))
        })
    }
}

inventory::submit! { EntityRegistration::of::<Plain>() }

// -----------------------------------------------------------------------------
// Blob — a child of Plain with one defaulted field

pub struct Blob {
    pub count: i64,
}

impl Entity for Blob {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "count" => Some(FieldValue::Int(self.count)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "count" => {
                self.count = value.clone().into_int().ok_or(ConstructError::UnexpectedShape {
                    entity: "Blob",
                    field: "count",
                    expected: "int",
                    found: value.kind().to_string(),
                })?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Blob",
                field: field.into(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Blob {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Blob",
                vec![
                    FieldDescriptor::new("count", TypeHint::Int)
                        .with_default(|| FieldValue::Int(0)),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Blob {
                        count: args.int("count", 0)?,
                    }))
                },
            )
            .with_parent(EntityType::of::<Plain>())
        })
    }
}

inventory::submit! { EntityRegistration::of::<Blob>() }

// -----------------------------------------------------------------------------
// Label — an unrelated hierarchy with one required field

pub struct Label {
    pub text: String,
}

impl Entity for Label {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "text" => Some(FieldValue::Str(self.text.clone())),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "text" => {
                self.text = value.clone().into_str().ok_or(ConstructError::UnexpectedShape {
                    entity: "Label",
                    field: "text",
                    expected: "str",
                    found: value.kind().to_string(),
                })?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Label",
                field: field.into(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Label {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Label",
                vec![FieldDescriptor::new("text", TypeHint::Str)],
                |mut args| {
                    let text = args.required("text")?;
                    Ok(EntityHandle::new(Label {
                        text: text.clone().into_str().ok_or(
                            ConstructError::UnexpectedShape {
                                entity: "Label",
                                field: "text",
                                expected: "str",
                                found: text.kind().to_string(),
                            },
                        )?,
                    }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Label>() }
