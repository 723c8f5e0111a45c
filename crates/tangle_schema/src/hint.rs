use core::fmt;

use crate::entity::TypedEntity;
use crate::info::{EntityInfo, EntityType, EnumInfo};
use crate::registry::SubclassRegistry;

// -----------------------------------------------------------------------------
// TypeHint

/// A declared field type, as a closed tagged union.
///
/// Hints are built once at schema-registration time and then only read; the
/// compatibility checker and both engines dispatch on them instead of any
/// form of live type introspection. Compound hints nest:
///
/// ```
/// use tangle_schema::TypeHint;
///
/// // list[int | str]
/// let hint = TypeHint::list(TypeHint::union(vec![TypeHint::Int, TypeHint::Str]));
/// assert_eq!(hint.to_string(), "list<int | str>");
/// ```
///
/// `Entity` carries a lazy descriptor reference so mutually recursive types
/// can mention each other; `ForwardRef` defers to the global registry by
/// class tag for the cases where even a lazy reference would be circular to
/// write down.
#[derive(Clone, Debug)]
pub enum TypeHint {
    /// Matches anything. Fields hinted `Any` serialize on best effort and
    /// produce a diagnostic, mirroring an unannotated field.
    Any,
    /// Matches only the null value.
    Null,
    Bool,
    Int,
    Float,
    Str,
    Optional(Box<TypeHint>),
    Union(Vec<TypeHint>),
    List(Box<TypeHint>),
    Tuple(Box<TypeHint>),
    Set(Box<TypeHint>),
    Map(Box<TypeHint>, Box<TypeHint>),
    MultiMap(Box<TypeHint>, Box<TypeHint>),
    Enum(&'static EnumInfo),
    Entity(EntityType),
    TypeVar(TypeVar),
    ForwardRef(&'static str),
}

impl TypeHint {
    pub fn optional(inner: TypeHint) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn union(arms: Vec<TypeHint>) -> Self {
        Self::Union(arms)
    }

    pub fn list(element: TypeHint) -> Self {
        Self::List(Box::new(element))
    }

    pub fn tuple(element: TypeHint) -> Self {
        Self::Tuple(Box::new(element))
    }

    pub fn set(element: TypeHint) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map(key: TypeHint, value: TypeHint) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn multimap(key: TypeHint, value: TypeHint) -> Self {
        Self::MultiMap(Box::new(key), Box::new(value))
    }

    pub fn entity<T: TypedEntity>() -> Self {
        Self::Entity(EntityType::of::<T>())
    }

    pub const fn entity_of(ty: EntityType) -> Self {
        Self::Entity(ty)
    }

    /// The flattened alternatives of this hint: `Optional` and `Union`
    /// wrappers are unwrapped (with `Null` recorded for the optional arm),
    /// a bound `TypeVar` contributes its bound, a constrained one its
    /// constraints. Every other hint is its own single leaf.
    pub fn leaves(&self) -> Vec<&TypeHint> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a TypeHint>) {
        static NULL_LEAF: TypeHint = TypeHint::Null;

        match self {
            Self::Optional(inner) => {
                leaves.push(&NULL_LEAF);
                inner.collect_leaves(leaves);
            }
            Self::Union(arms) => {
                for arm in arms {
                    arm.collect_leaves(leaves);
                }
            }
            Self::TypeVar(var) => {
                if let Some(bound) = var.bound() {
                    bound.collect_leaves(leaves);
                } else if !var.constraints().is_empty() {
                    for constraint in var.constraints() {
                        constraint.collect_leaves(leaves);
                    }
                } else {
                    leaves.push(self);
                }
            }
            other => leaves.push(other),
        }
    }

    /// Whether a null value satisfies this hint.
    pub fn admits_null(&self) -> bool {
        match self {
            Self::Any | Self::Null | Self::Optional(_) => true,
            Self::Union(arms) => arms.iter().any(TypeHint::admits_null),
            Self::TypeVar(var) => match var.bound() {
                Some(bound) => bound.admits_null(),
                None if var.constraints().is_empty() => true,
                None => var.constraints().iter().any(TypeHint::admits_null),
            },
            _ => false,
        }
    }

    /// The entity descriptor this hint decodes into directly, if it names
    /// exactly one entity type (possibly wrapped in `Optional`). Union hints
    /// return `None`; their arms are probed individually against the class
    /// tag in the document.
    pub fn entity_target(&self) -> Option<&'static EntityInfo> {
        match self {
            Self::Entity(ty) => Some(ty.info()),
            Self::Optional(inner) => inner.entity_target(),
            Self::ForwardRef(tag) => SubclassRegistry::global().lookup_tag(tag),
            _ => None,
        }
    }

    /// The element hint of the first `List` alternative, if any.
    pub fn list_arm(&self) -> Option<&TypeHint> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::List(element) => Some(element.as_ref()),
            _ => None,
        })
    }

    /// The element hint of the first `Tuple` alternative, if any.
    pub fn tuple_arm(&self) -> Option<&TypeHint> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::Tuple(element) => Some(element.as_ref()),
            _ => None,
        })
    }

    /// The element hint of the first `Set` alternative, if any.
    pub fn set_arm(&self) -> Option<&TypeHint> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::Set(element) => Some(element.as_ref()),
            _ => None,
        })
    }

    /// Key and value hints of the first `Map` alternative, if any.
    pub fn map_arm(&self) -> Option<(&TypeHint, &TypeHint)> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::Map(key, value) => Some((key.as_ref(), value.as_ref())),
            _ => None,
        })
    }

    /// Key and value hints of the first `MultiMap` alternative, if any.
    pub fn multimap_arm(&self) -> Option<(&TypeHint, &TypeHint)> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::MultiMap(key, value) => Some((key.as_ref(), value.as_ref())),
            _ => None,
        })
    }

    /// The first enumeration alternative, if any.
    pub fn enum_arm(&self) -> Option<&'static EnumInfo> {
        self.leaves().into_iter().find_map(|leaf| match leaf {
            Self::Enum(info) => Some(*info),
            _ => None,
        })
    }

    /// Whether some alternative is exactly the given shape, with no numeric
    /// widening (used to decide when widening should kick in at all).
    pub fn has_exact_arm(&self, probe: fn(&TypeHint) -> bool) -> bool {
        self.leaves().into_iter().any(probe)
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.pad("any"),
            Self::Null => f.pad("null"),
            Self::Bool => f.pad("bool"),
            Self::Int => f.pad("int"),
            Self::Float => f.pad("float"),
            Self::Str => f.pad("str"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Union(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{arm}")?;
                }
                Ok(())
            }
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Tuple(element) => write!(f, "tuple<{element}>"),
            Self::Set(element) => write!(f, "set<{element}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::MultiMap(key, value) => write!(f, "multimap<{key}, {value}>"),
            Self::Enum(info) => f.pad(info.name()),
            Self::Entity(ty) => f.pad(ty.tag()),
            Self::TypeVar(var) => write!(f, "{var}"),
            Self::ForwardRef(tag) => f.pad(tag),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeVar

/// A type variable: unbound, upper-bounded, or constrained to a closed set
/// of alternatives.
#[derive(Clone, Debug)]
pub struct TypeVar {
    name: &'static str,
    bound: Option<Box<TypeHint>>,
    constraints: Vec<TypeHint>,
}

impl TypeVar {
    /// An unbound variable: matches any value.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bound: None,
            constraints: Vec::new(),
        }
    }

    /// An upper-bounded variable: matches what the bound matches.
    pub fn bounded(name: &'static str, bound: TypeHint) -> Self {
        Self {
            name,
            bound: Some(Box::new(bound)),
            constraints: Vec::new(),
        }
    }

    /// A constrained variable: matches when any one constraint matches.
    pub fn constrained(name: &'static str, constraints: Vec<TypeHint>) -> Self {
        Self {
            name,
            bound: None,
            constraints,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn bound(&self) -> Option<&TypeHint> {
        self.bound.as_deref()
    }

    #[inline]
    pub fn constraints(&self) -> &[TypeHint] {
        &self.constraints
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests
