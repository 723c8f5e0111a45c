use crate::Document;
use crate::entity::Entity;
use crate::hint::TypeHint;
use crate::value::FieldValue;

// -----------------------------------------------------------------------------
// Hooks

/// Error type for user-supplied encode/decode hooks.
///
/// Hook failures propagate through the engines wrapped with the path at
/// which they occurred; they are never swallowed.
pub type HookError = Box<dyn core::error::Error + Send + Sync>;

/// Per-field encode override: turns the current value directly into its wire
/// form, bypassing the generic value serializer.
///
/// The owning instance is passed so a hook can consult sibling fields.
pub type EncodeHook = fn(&dyn Entity, &FieldValue) -> Result<Document, HookError>;

/// Per-field decode pre-transform: rewrites the wire form before the generic
/// value deserializer runs.
///
/// The owning instance is only available for deferred fields (it does not
/// exist yet while immediate fields are decoded), hence the `Option`.
pub type DecodeHook = fn(Option<&dyn Entity>, Document) -> Result<Document, HookError>;

/// Default factory for a field. Called whenever a fresh default value is
/// needed, so mutable containers never share state between instances.
pub type DefaultFn = fn() -> FieldValue;

// -----------------------------------------------------------------------------
// FieldMetadata

/// Optional per-field behavior, attached to a [`FieldDescriptor`] at
/// registration time.
///
/// Built with chained setters:
///
/// ```
/// use tangle_schema::info::FieldMetadata;
///
/// let meta = FieldMetadata::new()
///     .serialized_name("startPoint")
///     .defer_loading(true);
/// assert_eq!(meta.name_override(), Some("startPoint"));
/// assert!(meta.defers_loading());
/// ```
///
/// Setting `read_only` also derives the serialize flag (a read-only field is
/// serialized iff it is read-only) unless `serialize` was set explicitly.
#[derive(Clone, Copy, Debug)]
pub struct FieldMetadata {
    read_only: bool,
    serialize: Option<bool>,
    serialized_name: Option<&'static str>,
    defer_loading: bool,
    encode: Option<EncodeHook>,
    decode: Option<DecodeHook>,
    // Inert annotations for outer rendering layers; the engine carries them
    // without interpreting them.
    decorators: &'static [&'static str],
}

impl FieldMetadata {
    /// Metadata with every member unset.
    #[inline]
    pub const fn new() -> Self {
        Self {
            read_only: false,
            serialize: None,
            serialized_name: None,
            defer_loading: false,
            encode: None,
            decode: None,
            decorators: &[],
        }
    }

    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        if self.serialize.is_none() {
            self.serialize = Some(read_only);
        }
        self
    }

    pub const fn serialize(mut self, serialize: bool) -> Self {
        self.serialize = Some(serialize);
        self
    }

    pub const fn serialized_name(mut self, name: &'static str) -> Self {
        self.serialized_name = Some(name);
        self
    }

    pub const fn defer_loading(mut self, defer: bool) -> Self {
        self.defer_loading = defer;
        self
    }

    pub const fn encode_with(mut self, hook: EncodeHook) -> Self {
        self.encode = Some(hook);
        self
    }

    pub const fn decode_with(mut self, hook: DecodeHook) -> Self {
        self.decode = Some(hook);
        self
    }

    pub const fn decorators(mut self, decorators: &'static [&'static str]) -> Self {
        self.decorators = decorators;
        self
    }

    #[inline]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The explicit or derived serialize flag; `None` means "decide from
    /// constructor eligibility and the default value".
    #[inline]
    pub const fn serialize_override(&self) -> Option<bool> {
        self.serialize
    }

    #[inline]
    pub const fn name_override(&self) -> Option<&'static str> {
        self.serialized_name
    }

    #[inline]
    pub const fn defers_loading(&self) -> bool {
        self.defer_loading
    }

    #[inline]
    pub const fn encode_hook(&self) -> Option<EncodeHook> {
        self.encode
    }

    #[inline]
    pub const fn decode_hook(&self) -> Option<DecodeHook> {
        self.decode
    }

    #[inline]
    pub const fn decorator_tags(&self) -> &'static [&'static str] {
        self.decorators
    }
}

impl Default for FieldMetadata {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One declared field of an entity: name, declared type, default,
/// constructor eligibility and metadata.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    hint: TypeHint,
    default: Option<DefaultFn>,
    constructor: bool,
    metadata: FieldMetadata,
}

impl FieldDescriptor {
    /// A constructor-eligible field with no default and empty metadata.
    pub fn new(name: &'static str, hint: TypeHint) -> Self {
        Self {
            name,
            hint,
            default: None,
            constructor: true,
            metadata: FieldMetadata::new(),
        }
    }

    pub fn with_default(mut self, default: DefaultFn) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks whether the field is passed to the constructor. A field that is
    /// not always defers loading.
    pub fn constructor(mut self, constructor: bool) -> Self {
        self.constructor = constructor;
        self
    }

    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn hint(&self) -> &TypeHint {
        &self.hint
    }

    #[inline]
    pub const fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    #[inline]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A fresh copy of the default value, if one is declared.
    pub fn default_value(&self) -> Option<FieldValue> {
        self.default.map(|default| default())
    }

    #[inline]
    pub const fn is_constructor_arg(&self) -> bool {
        self.constructor
    }

    /// The key this field uses in wire documents.
    pub const fn serialized_name(&self) -> &'static str {
        match self.metadata.name_override() {
            Some(name) => name,
            None => self.name,
        }
    }

    /// Whether the field is populated after construction instead of through
    /// the constructor-argument map.
    pub const fn defers_loading(&self) -> bool {
        !self.constructor || self.metadata.defers_loading()
    }

    /// Whether a document missing this field is incomplete: constructor
    /// fields without a default that are not deferred must be present.
    pub const fn is_required(&self) -> bool {
        self.constructor && self.default.is_none() && !self.defers_loading()
    }

    /// The serialize predicate.
    ///
    /// A field is serialized when its flag says so explicitly, or when the
    /// flag is unset and the field is constructor-eligible; in both cases a
    /// field sitting at its declared default is skipped (pass `None` for
    /// `instance` to get the flag-only answer, e.g. on the decode side).
    pub fn should_serialize(&self, instance: Option<&dyn Entity>) -> bool {
        let flag = self.metadata.serialize_override();
        if flag == Some(true) || (flag.is_none() && self.constructor) {
            match (self.default, instance) {
                (Some(default), Some(entity)) => entity
                    .get(self.name)
                    .is_none_or(|current| current != default()),
                _ => true,
            }
        } else {
            false
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
