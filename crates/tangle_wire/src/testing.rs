//! Hand-written fixture entities for the tests in this crate.
//!
//! The declarative layer that would normally generate [`Entity`]
//! implementations is out of scope, so these spell out the collaborator
//! interface by hand: descriptor, dynamic access, constructor, registration.

use core::any::Any;
use std::sync::OnceLock;

use tangle_schema::info::{
    ConstructError, EntityInfo, EntityType, EnumInfo, FieldDescriptor, FieldMetadata, HookError,
};
use tangle_schema::{
    Document, Entity, EntityHandle, EntityRegistration, EnumValue, FieldValue, TypeHint,
    TypedEntity,
};

pub static COLOR: EnumInfo = EnumInfo::new("Color", &["Red", "Green", "Blue"]);
pub static SHADE: EnumInfo = EnumInfo::new("Shade", &["Light", "Dark"]);

pub fn color_value(member: &str) -> EnumValue {
    EnumValue::new(&COLOR, member).unwrap()
}

pub fn shade_value(member: &str) -> EnumValue {
    EnumValue::new(&SHADE, member).unwrap()
}

fn shape_err(
    entity: &'static str,
    field: &'static str,
    expected: &'static str,
    found: &FieldValue,
) -> ConstructError {
    ConstructError::UnexpectedShape {
        entity,
        field,
        expected,
        found: found.kind().to_string(),
    }
}

// -----------------------------------------------------------------------------
// Point

pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Entity for Point {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "x" => Some(FieldValue::Int(self.x)),
            "y" => Some(FieldValue::Int(self.y)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        let (slot, name) = match field {
            "x" => (&mut self.x, "x"),
            "y" => (&mut self.y, "y"),
            _ => {
                return Err(ConstructError::UnknownField {
                    entity: "Point",
                    field: field.into(),
                });
            }
        };
        *slot = value
            .clone()
            .into_int()
            .ok_or_else(|| shape_err("Point", name, "int", &value))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Point {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Point",
                vec![
                    FieldDescriptor::new("x", TypeHint::Int).with_default(|| FieldValue::Int(0)),
                    FieldDescriptor::new("y", TypeHint::Int).with_default(|| FieldValue::Int(0)),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Point {
                        x: args.int("x", 0)?,
                        y: args.int("y", 0)?,
                    }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Point>() }

// -----------------------------------------------------------------------------
// Line

pub struct Line {
    pub start: EntityHandle,
    pub end: EntityHandle,
}

impl Entity for Line {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "start" => Some(FieldValue::Entity(self.start.clone())),
            "end" => Some(FieldValue::Entity(self.end.clone())),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        let (slot, name) = match field {
            "start" => (&mut self.start, "start"),
            "end" => (&mut self.end, "end"),
            _ => {
                return Err(ConstructError::UnknownField {
                    entity: "Line",
                    field: field.into(),
                });
            }
        };
        *slot = value
            .clone()
            .into_entity()
            .ok_or_else(|| shape_err("Line", name, "entity", &value))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Line {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Line",
                vec![
                    FieldDescriptor::new("start", TypeHint::entity::<Point>()),
                    FieldDescriptor::new("end", TypeHint::entity::<Point>()),
                ],
                |mut args| {
                    let start = args.entity("start")?.ok_or(ConstructError::MissingArgument {
                        entity: "Line",
                        field: "start",
                    })?;
                    let end = args.entity("end")?.ok_or(ConstructError::MissingArgument {
                        entity: "Line",
                        field: "end",
                    })?;
                    Ok(EntityHandle::new(Line { start, end }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Line>() }

// -----------------------------------------------------------------------------
// Node — self/sibling references through a deferred field

pub struct Node {
    pub name: String,
    pub next: Option<EntityHandle>,
}

impl Entity for Node {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "next" => Some(match &self.next {
                Some(next) => FieldValue::Entity(next.clone()),
                None => FieldValue::Null,
            }),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "name" => {
                self.name = value
                    .clone()
                    .into_str()
                    .ok_or_else(|| shape_err("Node", "name", "str", &value))?;
                Ok(())
            }
            "next" => {
                self.next = match value {
                    FieldValue::Null => None,
                    FieldValue::Entity(handle) => Some(handle),
                    other => return Err(shape_err("Node", "next", "entity", &other)),
                };
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Node",
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

impl TypedEntity for Node {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Node",
                vec![
                    FieldDescriptor::new("name", TypeHint::Str)
                        .with_default(|| FieldValue::Str(String::new())),
                    FieldDescriptor::new("next", TypeHint::optional(TypeHint::ForwardRef("Node")))
                        .with_default(|| FieldValue::Null)
                        .with_metadata(FieldMetadata::new().defer_loading(true)),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Node {
                        name: args.text("name", "")?,
                        next: args.entity("next")?,
                    }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Node>() }

// -----------------------------------------------------------------------------
// Shape hierarchy

pub struct Shape {
    pub name: String,
}

impl Entity for Shape {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Str(self.name.clone())),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "name" => {
                self.name = value
                    .clone()
                    .into_str()
                    .ok_or_else(|| shape_err("Shape", "name", "str", &value))?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Shape",
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

impl TypedEntity for Shape {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Shape",
                vec![
                    FieldDescriptor::new("name", TypeHint::Str)
                        .with_default(|| FieldValue::Str(String::new())),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Shape {
                        name: args.text("name", "")?,
                    }))
                },
            )
            // Documents written before the outline feature was dropped still
            // carry this key.
            .with_ignored_fields(&["outline_width"])
        })
    }
}

inventory::submit! { EntityRegistration::of::<Shape>() }

pub struct Circle {
    pub name: String,
    pub radius: f64,
}

impl Entity for Circle {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "radius" => Some(FieldValue::Float(self.radius)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "name" => {
                self.name = value
                    .clone()
                    .into_str()
                    .ok_or_else(|| shape_err("Circle", "name", "str", &value))?;
                Ok(())
            }
            "radius" => {
                self.radius = value
                    .clone()
                    .into_float()
                    .ok_or_else(|| shape_err("Circle", "radius", "float", &value))?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Circle",
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

impl TypedEntity for Circle {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Circle",
                vec![
                    FieldDescriptor::new("name", TypeHint::Str)
                        .with_default(|| FieldValue::Str(String::new())),
                    FieldDescriptor::new("radius", TypeHint::Float),
                ],
                |mut args| {
                    let radius = args.required("radius")?;
                    let radius = radius
                        .clone()
                        .into_float()
                        .ok_or_else(|| shape_err("Circle", "radius", "float", &radius))?;
                    Ok(EntityHandle::new(Circle {
                        name: args.text("name", "")?,
                        radius,
                    }))
                },
            )
            .with_parent(EntityType::of::<Shape>())
        })
    }
}

inventory::submit! { EntityRegistration::of::<Circle>() }

pub struct Square {
    pub name: String,
    pub side: f64,
}

impl Entity for Square {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "side" => Some(FieldValue::Float(self.side)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "name" => {
                self.name = value
                    .clone()
                    .into_str()
                    .ok_or_else(|| shape_err("Square", "name", "str", &value))?;
                Ok(())
            }
            "side" => {
                self.side = value
                    .clone()
                    .into_float()
                    .ok_or_else(|| shape_err("Square", "side", "float", &value))?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Square",
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

impl TypedEntity for Square {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Square",
                vec![
                    FieldDescriptor::new("name", TypeHint::Str)
                        .with_default(|| FieldValue::Str(String::new())),
                    FieldDescriptor::new("side", TypeHint::Float)
                        .with_default(|| FieldValue::Float(1.0)),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Square {
                        name: args.text("name", "")?,
                        side: args.float("side", 1.0)?,
                    }))
                },
            )
            .with_parent(EntityType::of::<Shape>())
        })
    }
}

inventory::submit! { EntityRegistration::of::<Square>() }

// -----------------------------------------------------------------------------
// Drawing — a polymorphic container plus an enum field

pub struct Drawing {
    pub shapes: Vec<EntityHandle>,
    pub background: Option<EnumValue>,
}

impl Entity for Drawing {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "shapes" => Some(FieldValue::List(
                self.shapes.iter().cloned().map(FieldValue::Entity).collect(),
            )),
            "background" => Some(match self.background {
                Some(color) => FieldValue::Enum(color),
                None => FieldValue::Null,
            }),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "shapes" => {
                let items = value
                    .clone()
                    .into_list()
                    .ok_or_else(|| shape_err("Drawing", "shapes", "list", &value))?;
                self.shapes = items
                    .into_iter()
                    .map(|item| {
                        item.clone()
                            .into_entity()
                            .ok_or_else(|| shape_err("Drawing", "shapes", "entity", &item))
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            "background" => {
                self.background = match value {
                    FieldValue::Null => None,
                    FieldValue::Enum(color) => Some(color),
                    other => return Err(shape_err("Drawing", "background", "Color", &other)),
                };
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Drawing",
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

impl TypedEntity for Drawing {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Drawing",
                vec![
                    FieldDescriptor::new("shapes", TypeHint::list(TypeHint::entity::<Shape>()))
                        .with_default(|| FieldValue::List(Vec::new())),
                    FieldDescriptor::new("background", TypeHint::optional(TypeHint::Enum(&COLOR)))
                        .with_default(|| FieldValue::Null),
                ],
                |mut args| {
                    let mut drawing = Drawing {
                        shapes: Vec::new(),
                        background: None,
                    };
                    for name in ["shapes", "background"] {
                        if let Some(value) = args.take(name) {
                            drawing.set(name, value)?;
                        }
                    }
                    Ok(EntityHandle::new(drawing))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Drawing>() }

// -----------------------------------------------------------------------------
// Token — encode/decode hooks

fn token_encode(_entity: &dyn Entity, value: &FieldValue) -> Result<Document, HookError> {
    match value {
        FieldValue::Str(secret) => Ok(Document::String(secret.chars().rev().collect())),
        other => Err(format!("token secrets are strings, found {}", other.kind()).into()),
    }
}

fn token_decode(_entity: Option<&dyn Entity>, doc: Document) -> Result<Document, HookError> {
    match doc {
        Document::String(masked) => Ok(Document::String(masked.chars().rev().collect())),
        _ => Err("token secrets are strings".into()),
    }
}

pub struct Token {
    pub secret: String,
}

impl Entity for Token {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "secret" => Some(FieldValue::Str(self.secret.clone())),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "secret" => {
                self.secret = value
                    .clone()
                    .into_str()
                    .ok_or_else(|| shape_err("Token", "secret", "str", &value))?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "Token",
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

impl TypedEntity for Token {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Token",
                vec![
                    FieldDescriptor::new("secret", TypeHint::Str).with_metadata(
                        FieldMetadata::new()
                            .encode_with(token_encode)
                            .decode_with(token_decode),
                    ),
                ],
                |mut args| {
                    let secret = args.required("secret")?;
                    Ok(EntityHandle::new(Token {
                        secret: secret
                            .clone()
                            .into_str()
                            .ok_or_else(|| shape_err("Token", "secret", "str", &secret))?,
                    }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Token>() }

// -----------------------------------------------------------------------------
// AppConfig — a singleton

pub struct AppConfig {
    pub verbose: bool,
}

impl Entity for AppConfig {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "verbose" => Some(FieldValue::Bool(self.verbose)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match field {
            "verbose" => {
                self.verbose = value
                    .clone()
                    .into_bool()
                    .ok_or_else(|| shape_err("AppConfig", "verbose", "bool", &value))?;
                Ok(())
            }
            _ => Err(ConstructError::UnknownField {
                entity: "AppConfig",
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

impl TypedEntity for AppConfig {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "AppConfig",
                vec![
                    FieldDescriptor::new("verbose", TypeHint::Bool)
                        .with_default(|| FieldValue::Bool(false)),
                ],
                |mut args| {
                    Ok(EntityHandle::new(AppConfig {
                        verbose: args.flag("verbose", false)?,
                    }))
                },
            )
            .singleton()
        })
    }
}

inventory::submit! { EntityRegistration::of::<AppConfig>() }

// -----------------------------------------------------------------------------
// Attachment — union-typed fields

pub struct Attachment {
    pub item: Option<EntityHandle>,
    pub decoration: Option<EntityHandle>,
}

impl Entity for Attachment {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        let slot = match field {
            "item" => &self.item,
            "decoration" => &self.decoration,
            _ => return None,
        };
        Some(match slot {
            Some(handle) => FieldValue::Entity(handle.clone()),
            None => FieldValue::Null,
        })
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        let slot = match field {
            "item" => &mut self.item,
            "decoration" => &mut self.decoration,
            _ => {
                return Err(ConstructError::UnknownField {
                    entity: "Attachment",
                    field: field.into(),
                });
            }
        };
        *slot = match value {
            FieldValue::Null => None,
            FieldValue::Entity(handle) => Some(handle),
            other => return Err(shape_err("Attachment", "item", "entity", &other)),
        };
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TypedEntity for Attachment {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Attachment",
                vec![
                    FieldDescriptor::new(
                        "item",
                        TypeHint::optional(TypeHint::union(vec![
                            TypeHint::entity::<Point>(),
                            TypeHint::ForwardRef("Node"),
                        ])),
                    )
                    .with_default(|| FieldValue::Null),
                    FieldDescriptor::new(
                        "decoration",
                        TypeHint::optional(TypeHint::union(vec![
                            TypeHint::entity::<Shape>(),
                            TypeHint::Str,
                        ])),
                    )
                    .with_default(|| FieldValue::Null),
                ],
                |mut args| {
                    Ok(EntityHandle::new(Attachment {
                        item: args.entity("item")?,
                        decoration: args.entity("decoration")?,
                    }))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Attachment>() }

// -----------------------------------------------------------------------------
// Catalog — one of each container shape

pub struct Catalog {
    pub counts: Vec<(String, i64)>,
    pub scores: Vec<(i64, f64)>,
    pub labels: Vec<(String, String)>,
    pub tags: Vec<String>,
    pub pair: (i64, i64),
}

impl Entity for Catalog {
    fn info(&self) -> &'static EntityInfo {
        Self::entity_info()
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "counts" => Some(FieldValue::Map(
                self.counts
                    .iter()
                    .map(|(k, v)| (FieldValue::Str(k.clone()), FieldValue::Int(*v)))
                    .collect(),
            )),
            "scores" => Some(FieldValue::Map(
                self.scores
                    .iter()
                    .map(|(k, v)| (FieldValue::Int(*k), FieldValue::Float(*v)))
                    .collect(),
            )),
            "labels" => Some(FieldValue::MultiMap(
                self.labels
                    .iter()
                    .map(|(k, v)| (FieldValue::Str(k.clone()), FieldValue::Str(v.clone())))
                    .collect(),
            )),
            "tags" => Some(FieldValue::Set(
                self.tags.iter().map(|tag| FieldValue::Str(tag.clone())).collect(),
            )),
            "pair" => Some(FieldValue::Tuple(vec![
                FieldValue::Int(self.pair.0),
                FieldValue::Int(self.pair.1),
            ])),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError> {
        match (field, value) {
            ("counts", FieldValue::Map(pairs)) => {
                self.counts = pairs
                    .into_iter()
                    .map(|(k, v)| match (k, v) {
                        (FieldValue::Str(k), FieldValue::Int(v)) => Ok((k, v)),
                        (k, _) => Err(shape_err("Catalog", "counts", "map<str, int>", &k)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            ("scores", FieldValue::Map(pairs)) => {
                self.scores = pairs
                    .into_iter()
                    .map(|(k, v)| match (k, v.clone().into_float()) {
                        (FieldValue::Int(k), Some(v)) => Ok((k, v)),
                        (k, _) => Err(shape_err("Catalog", "scores", "map<int, float>", &k)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            ("labels", FieldValue::MultiMap(pairs)) => {
                self.labels = pairs
                    .into_iter()
                    .map(|(k, v)| match (k, v) {
                        (FieldValue::Str(k), FieldValue::Str(v)) => Ok((k, v)),
                        (k, _) => Err(shape_err("Catalog", "labels", "multimap<str, str>", &k)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            ("tags", FieldValue::Set(items)) => {
                self.tags = items
                    .into_iter()
                    .map(|item| {
                        item.clone()
                            .into_str()
                            .ok_or_else(|| shape_err("Catalog", "tags", "set<str>", &item))
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            ("pair", FieldValue::Tuple(items)) => {
                match items.as_slice() {
                    [FieldValue::Int(a), FieldValue::Int(b)] => {
                        self.pair = (*a, *b);
                        Ok(())
                    }
                    _ => Err(ConstructError::UnexpectedShape {
                        entity: "Catalog",
                        field: "pair",
                        expected: "tuple<int> of two",
                        found: "tuple".into(),
                    }),
                }
            }
            (name @ ("counts" | "scores" | "labels" | "tags" | "pair"), other) => Err(
                ConstructError::UnexpectedShape {
                    entity: "Catalog",
                    field: match name {
                        "counts" => "counts",
                        "scores" => "scores",
                        "labels" => "labels",
                        "tags" => "tags",
                        _ => "pair",
                    },
                    expected: "container",
                    found: other.kind().to_string(),
                },
            ),
            (unknown, _) => Err(ConstructError::UnknownField {
                entity: "Catalog",
                field: unknown.into(),
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

impl TypedEntity for Catalog {
    fn entity_info() -> &'static EntityInfo {
        static INFO: OnceLock<EntityInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            EntityInfo::new(
                "Catalog",
                vec![
                    FieldDescriptor::new("counts", TypeHint::map(TypeHint::Str, TypeHint::Int))
                        .with_default(|| FieldValue::Map(Vec::new())),
                    FieldDescriptor::new("scores", TypeHint::map(TypeHint::Int, TypeHint::Float))
                        .with_default(|| FieldValue::Map(Vec::new())),
                    FieldDescriptor::new(
                        "labels",
                        TypeHint::multimap(TypeHint::Str, TypeHint::Str),
                    )
                    .with_default(|| FieldValue::MultiMap(Vec::new())),
                    FieldDescriptor::new("tags", TypeHint::set(TypeHint::Str))
                        .with_default(|| FieldValue::Set(Vec::new())),
                    FieldDescriptor::new("pair", TypeHint::tuple(TypeHint::Int))
                        .with_default(|| {
                            FieldValue::Tuple(vec![FieldValue::Int(0), FieldValue::Int(0)])
                        }),
                ],
                |mut args| {
                    let mut catalog = Catalog {
                        counts: Vec::new(),
                        scores: Vec::new(),
                        labels: Vec::new(),
                        tags: Vec::new(),
                        pair: (0, 0),
                    };
                    for name in ["counts", "scores", "labels", "tags", "pair"] {
                        if let Some(value) = args.take(name) {
                            catalog.set(name, value)?;
                        }
                    }
                    Ok(EntityHandle::new(catalog))
                },
            )
        })
    }
}

inventory::submit! { EntityRegistration::of::<Catalog>() }
