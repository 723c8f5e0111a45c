use core::fmt;

use tangle_schema::TypeHint;
use tangle_schema::info::{ConstructError, HookError};

use crate::path::DocPath;

// -----------------------------------------------------------------------------
// ErrorReason

/// What went wrong, structurally. The enclosing [`SerializationError`] adds
/// where.
#[derive(Debug)]
pub enum ErrorReason {
    /// A `@class` tag that does not resolve in the target root's registry.
    /// Carries the registered tags so the failure is diagnosable.
    UnknownClassTag {
        tag: String,
        root: &'static str,
        known: Vec<&'static str>,
    },
    /// An enum member name with no declaration.
    UnknownEnumMember {
        declared: &'static str,
        member: String,
    },
    /// Strict-mode check: the runtime enum type is not the declared one.
    EnumTypeMismatch {
        declared: String,
        found: &'static str,
    },
    /// A wire value whose shape does not satisfy the declared hint.
    TypeMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },
    /// A required immediate field absent from the document.
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// A `@ref` whose target path was never decoded.
    DanglingRef { target: DocPath },
    /// Constructor or field-assignment failure.
    Construct(ConstructError),
    /// An error escaping a user-supplied encode/decode hook.
    Hook(HookError),
    /// Malformed JSON on the way in, or an unrepresentable value (a
    /// non-finite float, say) on the way out.
    Json(serde_json::Error),
    Message(String),
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownClassTag { tag, root, known } => {
                write!(
                    f,
                    "unknown entity class tag `{tag}`: not registered under root `{root}` (known tags: "
                )?;
                if known.is_empty() {
                    f.write_str("none")?;
                }
                for (i, tag) in known.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(tag)?;
                }
                f.write_str(")")
            }
            Self::UnknownEnumMember { declared, member } => {
                write!(f, "`{member}` is not a member of `{declared}`")
            }
            Self::EnumTypeMismatch { declared, found } => write!(
                f,
                "enum type of value (`{found}`) is not the declared type of the serialized field (`{declared}`)"
            ),
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "invalid type for field `{field}`: required {expected}, found {found}"
            ),
            Self::MissingField { entity, field } => {
                write!(f, "document for `{entity}` is missing required field `{field}`")
            }
            Self::DanglingRef { target } => {
                write!(f, "@ref points at {target}, which holds no decoded value")
            }
            Self::Construct(err) => write!(f, "{err}"),
            Self::Hook(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Message(message) => f.write_str(message),
        }
    }
}

// -----------------------------------------------------------------------------
// SerializationError

/// Any failure raised by the engines: a structured reason plus the path at
/// which it arose and, when known, the declared type hint.
///
/// Errors are built with their path at the failure site and cross recursion
/// levels untouched, so a cause is wrapped exactly once and the textual form
/// locates it without a debugger:
///
/// ```text
/// `Purple` is not a member of `Color` | at path = ("drawing", 2, "fill") | type hint = Color
/// ```
#[derive(Debug)]
pub struct SerializationError {
    reason: ErrorReason,
    path: DocPath,
    hint: Option<String>,
}

impl SerializationError {
    pub fn new(reason: ErrorReason, path: DocPath) -> Self {
        Self {
            reason,
            path,
            hint: None,
        }
    }

    /// Attaches the declared hint the failing value was checked against.
    pub fn with_hint(mut self, hint: &TypeHint) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    #[inline]
    pub fn reason(&self) -> &ErrorReason {
        &self.reason
    }

    #[inline]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | at path = {}", self.reason, self.path)?;
        if let Some(hint) = &self.hint {
            write!(f, " | type hint = {hint}")?;
        }
        Ok(())
    }
}

impl core::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.reason {
            ErrorReason::Construct(err) => Some(err),
            ErrorReason::Hook(err) => Some(&**err),
            ErrorReason::Json(err) => Some(err),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
