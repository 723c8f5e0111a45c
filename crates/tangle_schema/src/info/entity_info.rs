use core::fmt;
use core::ptr;

use crate::entity::{EntityHandle, TypedEntity};
use crate::info::{EnumInfo, FieldDescriptor};
use crate::value::FieldValue;

// -----------------------------------------------------------------------------
// ConstructError

/// Errors raised while building an entity from decoded field values, or while
/// assigning a decoded value through [`Entity::set`](crate::Entity::set).
#[derive(Debug)]
pub enum ConstructError {
    /// A constructor argument with no default was absent.
    MissingArgument {
        entity: &'static str,
        field: &'static str,
    },
    /// An argument was present but had the wrong runtime shape.
    UnexpectedShape {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    /// A name that is not a field of the entity.
    UnknownField {
        entity: &'static str,
        field: String,
    },
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { entity, field } => {
                write!(f, "missing required argument `{field}` for `{entity}`")
            }
            Self::UnexpectedShape {
                entity,
                field,
                expected,
                found,
            } => write!(
                f,
                "argument `{field}` of `{entity}` expected {expected}, found {found}"
            ),
            Self::UnknownField { entity, field } => {
                write!(f, "`{entity}` has no field `{field}`")
            }
        }
    }
}

impl core::error::Error for ConstructError {}

// -----------------------------------------------------------------------------
// FieldArgs

/// The constructor-argument map assembled during the immediate decoding
/// phase: decoded field values keyed by field name, in declaration order.
///
/// Constructors drain it with the typed accessors, each of which falls back
/// to the given default when the argument is absent (deferred fields are
/// absent by design at construction time).
#[derive(Debug)]
pub struct FieldArgs {
    entity: &'static str,
    values: Vec<(&'static str, FieldValue)>,
}

impl FieldArgs {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            values: Vec::new(),
        }
    }

    /// The tag of the entity being constructed, for error reporting.
    #[inline]
    pub const fn tag(&self) -> &'static str {
        self.entity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| *n == name)
    }

    /// Inserts a decoded value, replacing any previous value for the name.
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Removes and returns the value for `name`, if present.
    pub fn take(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.values.iter().position(|(n, _)| *n == name)?;
        Some(self.values.remove(index).1)
    }

    /// Removes and returns the value for `name`, failing when absent.
    pub fn required(&mut self, name: &'static str) -> Result<FieldValue, ConstructError> {
        self.take(name).ok_or(ConstructError::MissingArgument {
            entity: self.entity,
            field: name,
        })
    }

    pub fn flag(&mut self, name: &'static str, default: bool) -> Result<bool, ConstructError> {
        match self.take(name) {
            None => Ok(default),
            Some(value) => value
                .clone()
                .into_bool()
                .ok_or_else(|| self.unexpected(name, "bool", &value)),
        }
    }

    pub fn int(&mut self, name: &'static str, default: i64) -> Result<i64, ConstructError> {
        match self.take(name) {
            None => Ok(default),
            Some(value) => value
                .clone()
                .into_int()
                .ok_or_else(|| self.unexpected(name, "int", &value)),
        }
    }

    pub fn float(&mut self, name: &'static str, default: f64) -> Result<f64, ConstructError> {
        match self.take(name) {
            None => Ok(default),
            Some(value) => value
                .clone()
                .into_float()
                .ok_or_else(|| self.unexpected(name, "float", &value)),
        }
    }

    pub fn text(&mut self, name: &'static str, default: &str) -> Result<String, ConstructError> {
        match self.take(name) {
            None => Ok(default.into()),
            Some(value) => value
                .clone()
                .into_str()
                .ok_or_else(|| self.unexpected(name, "str", &value)),
        }
    }

    /// An optional entity reference: absent and `Null` both become `None`.
    pub fn entity(&mut self, name: &'static str) -> Result<Option<EntityHandle>, ConstructError> {
        match self.take(name) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Entity(handle)) => Ok(Some(handle)),
            Some(other) => Err(self.unexpected(name, "entity", &other)),
        }
    }

    /// A list/tuple/set payload; absent becomes empty.
    pub fn items(&mut self, name: &'static str) -> Result<Vec<FieldValue>, ConstructError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(value) => value
                .clone()
                .into_list()
                .ok_or_else(|| self.unexpected(name, "list", &value)),
        }
    }

    /// An enum member of the given enumeration, by canonical name.
    pub fn choice(
        &mut self,
        name: &'static str,
        info: &'static EnumInfo,
        default: &'static str,
    ) -> Result<&'static str, ConstructError> {
        match self.take(name) {
            None => Ok(default),
            Some(FieldValue::Enum(value)) if ptr::eq(value.info(), info) => Ok(value.member()),
            Some(other) => Err(self.unexpected(name, info.name(), &other)),
        }
    }

    fn unexpected(
        &self,
        field: &'static str,
        expected: &'static str,
        found: &FieldValue,
    ) -> ConstructError {
        ConstructError::UnexpectedShape {
            entity: self.entity,
            field,
            expected,
            found: found.kind().to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// EntityInfo

/// The constructor entry of an [`EntityInfo`].
pub type ConstructFn = fn(FieldArgs) -> Result<EntityHandle, ConstructError>;

/// Registration-time description of one entity type: class tag, ordered
/// fields, hierarchy parent, constructor, and decoding affordances.
///
/// Descriptors are compared by address; each concrete type owns exactly one,
/// usually a `OnceLock` filled by [`TypedEntity::entity_info`].
pub struct EntityInfo {
    tag: &'static str,
    fields: Vec<FieldDescriptor>,
    parent: Option<EntityType>,
    construct: ConstructFn,
    singleton: bool,
    // Document keys tolerated without a matching field; lets documents
    // written before a field was removed keep loading quietly.
    ignored_fields: &'static [&'static str],
}

impl EntityInfo {
    pub fn new(tag: &'static str, fields: Vec<FieldDescriptor>, construct: ConstructFn) -> Self {
        Self {
            tag,
            fields,
            parent: None,
            construct,
            singleton: false,
            ignored_fields: &[],
        }
    }

    /// Links this type under a hierarchy parent; registration cascades the
    /// class tag into every ancestor's table.
    pub fn with_parent(mut self, parent: EntityType) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Marks the type as a singleton: it serializes as its tag alone and is
    /// reconstructed with an empty argument map.
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn with_ignored_fields(mut self, names: &'static [&'static str]) -> Self {
        self.ignored_fields = names;
        self
    }

    #[inline]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_by_serialized_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.serialized_name() == name)
    }

    #[inline]
    pub const fn parent(&self) -> Option<EntityType> {
        self.parent
    }

    #[inline]
    pub const fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn ignores_key(&self, key: &str) -> bool {
        self.ignored_fields.contains(&key)
    }

    /// Whether this type equals `ancestor` or sits below it in the declared
    /// hierarchy.
    pub fn descends_from(&self, ancestor: &EntityInfo) -> bool {
        let mut current = Some(self);
        while let Some(info) = current {
            if ptr::eq(info, ancestor) {
                return true;
            }
            current = info.parent.map(EntityType::info);
        }
        false
    }

    /// Builds an instance from the immediate-phase argument map.
    pub fn construct(&self, args: FieldArgs) -> Result<EntityHandle, ConstructError> {
        (self.construct)(args)
    }
}

impl fmt::Debug for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInfo")
            .field("tag", &self.tag)
            .field("fields", &self.fields)
            .field("parent", &self.parent)
            .field("singleton", &self.singleton)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// EntityType

/// A lazy reference to an [`EntityInfo`], usable in type hints before the
/// descriptor exists.
///
/// Holding `fn() -> &'static EntityInfo` instead of the reference itself is
/// what lets mutually recursive entity types describe each other: the
/// descriptor is only materialized when the hint is first consulted.
#[derive(Clone, Copy)]
pub struct EntityType {
    info: fn() -> &'static EntityInfo,
}

impl EntityType {
    #[inline]
    pub const fn new(info: fn() -> &'static EntityInfo) -> Self {
        Self { info }
    }

    #[inline]
    pub const fn of<T: TypedEntity>() -> Self {
        Self::new(T::entity_info)
    }

    #[inline]
    pub fn info(self) -> &'static EntityInfo {
        (self.info)()
    }

    #[inline]
    pub fn tag(self) -> &'static str {
        self.info().tag()
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.tag())
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.info(), other.info())
    }
}

// -----------------------------------------------------------------------------
// Tests
