use core::any::Any;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;

use crate::info::{ConstructError, EntityInfo, EntityType};
use crate::value::FieldValue;

// -----------------------------------------------------------------------------
// Entity

/// The dynamic record interface the serialization engines consume.
///
/// An entity exposes its [`EntityInfo`] (the ordered field descriptors built
/// once at registration time) and dynamic, name-based access to its current
/// field values. The declarative layer that would normally generate these
/// implementations is out of scope for this crate; anything that implements
/// the three access methods participates in serialization.
///
/// Implementations are expected to be total over their own declared fields:
/// [`get`](Entity::get) returns `Some` for every name in
/// `self.info().fields()`, and [`set`](Entity::set) accepts a value for every
/// such name whose runtime shape fits the field.
pub trait Entity: Any {
    /// The descriptor shared by all instances of this concrete type.
    fn info(&self) -> &'static EntityInfo;

    /// Reads the current value of the named field.
    ///
    /// Returns `None` only for names that are not fields of this entity.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Overwrites the named field.
    ///
    /// Used for deferred-field population after construction; also the
    /// assignment primitive behind graph copies.
    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ConstructError>;

    /// Concrete-type access for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable concrete-type access for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// -----------------------------------------------------------------------------
// TypedEntity

/// Static companion to [`Entity`]: descriptor access without an instance.
///
/// Split from [`Entity`] so the latter stays object-safe.
pub trait TypedEntity: Entity {
    /// The descriptor for this type, built lazily on first access.
    fn entity_info() -> &'static EntityInfo;

    /// This type as a hint/registry target.
    fn entity_type() -> EntityType {
        EntityType::new(Self::entity_info)
    }
}

// -----------------------------------------------------------------------------
// EntityHandle

/// A shared, interior-mutable reference to an entity.
///
/// Handles are the engine's unit of object identity: two handles refer to
/// "the same object" exactly when [`ptr_eq`](EntityHandle::ptr_eq) holds, and
/// the encode memo keys on [`identity`](EntityHandle::identity) to decide
/// whether a value has already been emitted. Cloning a handle clones the
/// reference, never the entity.
///
/// # Examples
///
/// ```ignore
/// let p = EntityHandle::new(Point { x: 1, y: 2 });
/// let q = p.clone();
/// assert!(p.ptr_eq(&q));
/// assert_eq!(p.with::<Point, _>(|p| p.x), Some(1));
/// ```
#[derive(Clone)]
pub struct EntityHandle(Rc<RefCell<dyn Entity>>);

impl EntityHandle {
    /// Wraps a freshly constructed entity.
    pub fn new<T: Entity>(entity: T) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    /// Whether two handles refer to the same entity.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A stable identity key for this handle, valid while the handle lives.
    #[inline]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// The descriptor of the referenced entity.
    pub fn info(&self) -> &'static EntityInfo {
        self.0.borrow().info()
    }

    /// The class tag of the referenced entity.
    pub fn tag(&self) -> &'static str {
        self.info().tag()
    }

    /// Borrows the entity immutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity is currently borrowed mutably, as with
    /// [`RefCell::borrow`].
    pub fn borrow(&self) -> Ref<'_, dyn Entity> {
        self.0.borrow()
    }

    /// Borrows the entity mutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity is currently borrowed, as with
    /// [`RefCell::borrow_mut`].
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Entity> {
        self.0.borrow_mut()
    }

    /// Whether the referenced entity has concrete type `T`.
    pub fn is<T: Entity>(&self) -> bool {
        self.0.borrow().as_any().is::<T>()
    }

    /// Runs `f` against the concrete entity, if it has type `T`.
    pub fn with<T: Entity, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let entity = self.0.borrow();
        entity.as_any().downcast_ref::<T>().map(f)
    }

    /// Runs `f` against the concrete entity mutably, if it has type `T`.
    pub fn with_mut<T: Entity, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entity = self.0.borrow_mut();
        entity.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid recursing into fields: handles may sit on a cycle.
        match self.0.try_borrow() {
            Ok(entity) => write!(f, "EntityHandle({} @ {:#x})", entity.info().tag(), self.identity()),
            Err(_) => write!(f, "EntityHandle(<borrowed> @ {:#x})", self.identity()),
        }
    }
}

impl PartialEq for EntityHandle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: Entity> From<T> for EntityHandle {
    fn from(entity: T) -> Self {
        Self::new(entity)
    }
}

// -----------------------------------------------------------------------------
// Tests
