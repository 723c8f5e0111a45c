use core::fmt;
use core::ptr;

use crate::entity::EntityHandle;
use crate::info::{EnumInfo, EntityInfo};

// -----------------------------------------------------------------------------
// FieldValue

/// The closed runtime value tree the engines traverse.
///
/// Every field an [`Entity`](crate::Entity) exposes is one of these shapes.
/// Containers own their elements; entities appear behind [`EntityHandle`]s so
/// that sharing and cycles stay visible to the encoder.
///
/// `Map` keeps unique keys in insertion order; `MultiMap` additionally keeps
/// duplicate keys, which is why both are pair lists rather than hash tables.
#[derive(Clone, Debug)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FieldValue>),
    Tuple(Vec<FieldValue>),
    Set(Vec<FieldValue>),
    Map(Vec<(FieldValue, FieldValue)>),
    MultiMap(Vec<(FieldValue, FieldValue)>),
    Enum(EnumValue),
    Entity(EntityHandle),
}

impl FieldValue {
    /// The runtime kind of this value, as seen by the compatibility checker.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::List(_) => ValueKind::List,
            Self::Tuple(_) => ValueKind::Tuple,
            Self::Set(_) => ValueKind::Set,
            Self::Map(_) => ValueKind::Map,
            Self::MultiMap(_) => ValueKind::MultiMap,
            Self::Enum(value) => ValueKind::Enum(value.info()),
            Self::Entity(handle) => ValueKind::Entity(handle.info()),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_int(self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts a float, widening an integer value.
    pub fn into_float(self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(value),
            Self::Int(value) => Some(value as f64),
            _ => None,
        }
    }

    pub fn into_str(self) -> Option<String> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_entity(self) -> Option<EntityHandle> {
        match self {
            Self::Entity(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_enum(self) -> Option<EnumValue> {
        match self {
            Self::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<FieldValue>> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b))
            | (Self::Tuple(a), Self::Tuple(b))
            | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Map(a), Self::Map(b)) | (Self::MultiMap(a), Self::MultiMap(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            // Identity, not structure: two distinct-but-equal entities are
            // different values to the encoder.
            (Self::Entity(a), Self::Entity(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<EnumValue> for FieldValue {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<EntityHandle> for FieldValue {
    fn from(handle: EntityHandle) -> Self {
        Self::Entity(handle)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}

// -----------------------------------------------------------------------------
// EnumValue

/// A runtime enum member: the declaring [`EnumInfo`] plus a member name.
///
/// Construction goes through [`EnumValue::new`], which canonicalizes the
/// member to the declaration's own string; an unknown member is rejected
/// rather than carried along.
#[derive(Clone, Copy, Debug)]
pub struct EnumValue {
    info: &'static EnumInfo,
    member: &'static str,
}

impl EnumValue {
    /// Looks up `member` in `info`, returning `None` when it is not declared.
    pub fn new(info: &'static EnumInfo, member: &str) -> Option<Self> {
        info.member(member).map(|member| Self { info, member })
    }

    #[inline]
    pub const fn info(&self) -> &'static EnumInfo {
        self.info
    }

    #[inline]
    pub const fn member(&self) -> &'static str {
        self.member
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.info, other.info) && self.member == other.member
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.info.name(), self.member)
    }
}

// -----------------------------------------------------------------------------
// ValueKind

/// The runtime "concrete type" of a [`FieldValue`].
///
/// This is what the compatibility checker matches declared hints against;
/// enum and entity kinds carry their descriptors so exactness and ancestry
/// can be checked.
#[derive(Clone, Copy, Debug)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Set,
    Map,
    MultiMap,
    Enum(&'static EnumInfo),
    Entity(&'static EntityInfo),
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Enum(a), Self::Enum(b)) => ptr::eq(*a, *b),
            (Self::Entity(a), Self::Entity(b)) => ptr::eq(*a, *b),
            (a, b) => core::mem::discriminant(a) == core::mem::discriminant(b),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.pad("null"),
            Self::Bool => f.pad("bool"),
            Self::Int => f.pad("int"),
            Self::Float => f.pad("float"),
            Self::Str => f.pad("str"),
            Self::List => f.pad("list"),
            Self::Tuple => f.pad("tuple"),
            Self::Set => f.pad("set"),
            Self::Map => f.pad("map"),
            Self::MultiMap => f.pad("multimap"),
            Self::Enum(info) => f.pad(info.name()),
            Self::Entity(info) => f.pad(info.tag()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
