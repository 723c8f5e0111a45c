//! Pure compatibility checks between declared [`TypeHint`]s and runtime
//! values.
//!
//! These functions never panic and never error: a combination they cannot
//! interpret (an unresolvable forward reference, say) is simply not a match.

use core::ptr;

use crate::hint::TypeHint;
use crate::registry::SubclassRegistry;
use crate::value::{FieldValue, ValueKind};

// -----------------------------------------------------------------------------
// Matching

/// Whether a value of the given concrete kind satisfies the declared hint.
///
/// - `Union` matches when any member matches; `Optional` matches null or the
///   inner hint.
/// - An unbound `TypeVar` matches anything; a bounded one matches what its
///   bound matches; a constrained one matches when some constraint does.
/// - `Any` always matches; `Null` matches only the null kind.
/// - Numeric widening: a `Float` hint accepts an `Int` kind, never the
///   reverse.
/// - Entity kinds match entity hints anywhere along the registered ancestry
///   chain; enums must be exactly the declared enumeration.
pub fn type_matches_hint(kind: ValueKind, hint: &TypeHint) -> bool {
    match hint {
        TypeHint::Any => true,
        TypeHint::Null => kind == ValueKind::Null,
        TypeHint::Bool => kind == ValueKind::Bool,
        TypeHint::Int => kind == ValueKind::Int,
        TypeHint::Float => matches!(kind, ValueKind::Float | ValueKind::Int),
        TypeHint::Str => kind == ValueKind::Str,
        TypeHint::Optional(inner) => kind == ValueKind::Null || type_matches_hint(kind, inner),
        TypeHint::Union(arms) => arms.iter().any(|arm| type_matches_hint(kind, arm)),
        TypeHint::List(_) => kind == ValueKind::List,
        TypeHint::Tuple(_) => kind == ValueKind::Tuple,
        TypeHint::Set(_) => kind == ValueKind::Set,
        TypeHint::Map(_, _) => kind == ValueKind::Map,
        TypeHint::MultiMap(_, _) => kind == ValueKind::MultiMap,
        TypeHint::Enum(info) => matches!(kind, ValueKind::Enum(e) if ptr::eq(e, *info)),
        TypeHint::Entity(ty) => {
            matches!(kind, ValueKind::Entity(info) if info.descends_from(ty.info()))
        }
        TypeHint::TypeVar(var) => match var.bound() {
            Some(bound) => type_matches_hint(kind, bound),
            None if var.constraints().is_empty() => true,
            None => var
                .constraints()
                .iter()
                .any(|constraint| type_matches_hint(kind, constraint)),
        },
        TypeHint::ForwardRef(tag) => match SubclassRegistry::global().lookup_tag(tag) {
            Some(target) => {
                matches!(kind, ValueKind::Entity(info) if info.descends_from(target))
            }
            None => false,
        },
    }
}

/// [`type_matches_hint`] viewed from the hint's side; kept as its own entry
/// point because call sites read better one way or the other.
#[inline]
pub fn hint_matches_type(hint: &TypeHint, kind: ValueKind) -> bool {
    type_matches_hint(kind, hint)
}

/// Whether a runtime value satisfies the declared hint.
///
/// Beyond the kind-level check this descends one structural level into
/// containers, validating elements against the declared element hints (and
/// so on recursively through nested containers).
pub fn value_matches_hint(value: &FieldValue, hint: &TypeHint) -> bool {
    if !type_matches_hint(value.kind(), hint) {
        return false;
    }
    match value {
        FieldValue::List(items) => elements_match(items, hint.list_arm()),
        FieldValue::Tuple(items) => elements_match(items, hint.tuple_arm()),
        FieldValue::Set(items) => elements_match(items, hint.set_arm()),
        FieldValue::Map(pairs) => pairs_match(pairs, hint.map_arm()),
        FieldValue::MultiMap(pairs) => pairs_match(pairs, hint.multimap_arm()),
        _ => true,
    }
}

fn elements_match(items: &[FieldValue], element: Option<&TypeHint>) -> bool {
    match element {
        Some(element) => items.iter().all(|item| value_matches_hint(item, element)),
        None => true,
    }
}

fn pairs_match(pairs: &[(FieldValue, FieldValue)], arm: Option<(&TypeHint, &TypeHint)>) -> bool {
    match arm {
        Some((key, value)) => pairs
            .iter()
            .all(|(k, v)| value_matches_hint(k, key) && value_matches_hint(v, value)),
        None => true,
    }
}

// -----------------------------------------------------------------------------
// Tests
