//! The error model: field-scoped validation errors, ordered error batches,
//! and the structural failure taxonomy of a deserialize call.

use alloc::borrow::Cow;
use alloc::format;
use alloc::vec::Vec;
use core::{error, fmt};

use crate::node::NodeId;

/// Sentinel field path for errors that are not scoped to a real field:
/// shape errors at the root, parse failures, and the root-is-reference case.
pub const ROOT_FIELD: &str = "_root";

// -----------------------------------------------------------------------------
// FieldError

/// A single field-scoped validation error.
///
/// `field` is a dotted path from the root of the payload (`"friend.name"`);
/// errors raised before any field context exists use [`ROOT_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field.
    pub field: Cow<'static, str>,
    /// Human-readable description of the problem.
    pub message: Cow<'static, str>,
}

impl FieldError {
    /// Creates a field error for the given path.
    #[inline]
    pub fn new(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an error on the [`ROOT_FIELD`] sentinel path.
    #[inline]
    pub fn root(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ROOT_FIELD, message)
    }

    /// Re-scopes the error one level deeper: `name` becomes `parent.name`.
    ///
    /// A [`ROOT_FIELD`] path is replaced by `parent` outright, since the
    /// error now *is* scoped to that field.
    pub fn prefix(&mut self, parent: &str) {
        if self.field == ROOT_FIELD {
            self.field = Cow::Owned(parent.into());
        } else {
            self.field = Cow::Owned(format!("{parent}.{}", self.field));
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// -----------------------------------------------------------------------------
// FieldErrors

/// An ordered accumulator of [`FieldError`]s.
///
/// Per-node deserializers collect every error discovered at one validation
/// point and report them as a single batch, instead of stopping at the first.
/// The batch is raised at explicit drain points via [`check`](Self::check).
///
/// # Examples
///
/// ```
/// use gx_serde::error::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.missing("name");
/// errors.missing("age");
///
/// let failure = errors.check().unwrap_err();
/// let batch = failure.field_errors().unwrap();
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.iter().next().unwrap().field, "name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    /// Creates an empty accumulator.
    #[inline]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Appends an error for `field`.
    #[inline]
    pub fn push(
        &mut self,
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Appends an already constructed [`FieldError`].
    #[inline]
    pub fn push_error(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Records a statically-required field that is absent from the payload.
    #[inline]
    pub fn missing(&mut self, field: impl Into<Cow<'static, str>>) {
        self.push(field, "missing required field");
    }

    /// Records a payload key the target type does not know about.
    #[inline]
    pub fn unknown(&mut self, field: impl Into<Cow<'static, str>>) {
        self.push(field, "unknown field");
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Re-scopes every accumulated error under `parent`, see
    /// [`FieldError::prefix`].
    pub fn prefix(&mut self, parent: &str) {
        for error in &mut self.errors {
            error.prefix(parent);
        }
    }

    /// Drains the accumulator: `Ok(())` when empty, otherwise the whole
    /// batch as a [`DeserializeError::Invalid`], leaving `self` reusable.
    pub fn check(&mut self) -> Result<(), DeserializeError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DeserializeError::Invalid(core::mem::take(self)))
        }
    }

    /// Consuming variant of [`check`](Self::check).
    pub fn into_result(mut self) -> Result<(), DeserializeError> {
        self.check()
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.push_error(error);
        errors
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = alloc::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = core::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// DeserializeError

/// An enumeration of all failure outcomes of a deserialize call.
///
/// The distinction matters to callers: [`Invalid`](Self::Invalid) means the
/// payload had bad field values, while the reference variants mean the
/// payload was structurally broken. The two are never mixed into one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeserializeError {
    /// One or more field-scoped validation errors, in discovery order.
    Invalid(FieldErrors),
    /// A `__ref` id that was never registered by the time
    /// [`apply_patches`](crate::de::DeserializeContext::apply_patches) ran.
    DanglingRef {
        id: NodeId,
        field: Cow<'static, str>,
    },
    /// A `__ref` id that resolved to an instance of a different concrete
    /// type than the referencing field expects.
    MismatchedRef {
        id: NodeId,
        field: Cow<'static, str>,
        expected: &'static str,
    },
    /// A `__ref` marker whose id is not a non-negative integer.
    MalformedRef { field: Cow<'static, str> },
}

impl DeserializeError {
    /// A single-element batch on the [`ROOT_FIELD`] sentinel path.
    #[inline]
    pub fn root(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid(FieldError::root(message).into())
    }

    /// The validation batch, if this is an [`Invalid`](Self::Invalid) error.
    #[inline]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Whether the payload was structurally broken, as opposed to carrying
    /// bad field values.
    #[inline]
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// Re-scopes an [`Invalid`](Self::Invalid) batch under `parent`.
    ///
    /// A structural reference error still on the [`ROOT_FIELD`] sentinel
    /// adopts `parent` as its field (the nearest enclosing caller knows the
    /// field name the resolution site does not); anything already scoped to
    /// a real field passes through unchanged.
    pub fn prefix(self, parent: &str) -> Self {
        match self {
            Self::Invalid(mut errors) => {
                errors.prefix(parent);
                Self::Invalid(errors)
            }
            Self::MismatchedRef {
                id,
                field,
                expected,
            } if field == ROOT_FIELD => Self::MismatchedRef {
                id,
                field: Cow::Owned(parent.into()),
                expected,
            },
            Self::MalformedRef { field } if field == ROOT_FIELD => Self::MalformedRef {
                field: Cow::Owned(parent.into()),
            },
            other => other,
        }
    }
}

impl From<FieldErrors> for DeserializeError {
    #[inline]
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::DanglingRef { id, field } => {
                write!(f, "reference to `{id}` at `{field}` was never defined")
            }
            Self::MismatchedRef {
                id,
                field,
                expected,
            } => {
                write!(
                    f,
                    "reference to `{id}` at `{field}` resolved to a different type than `{expected}`"
                )
            }
            Self::MalformedRef { field } => {
                write!(
                    f,
                    "reference marker at `{field}` does not carry a non-negative integer id"
                )
            }
        }
    }
}

impl error::Error for DeserializeError {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn batch_preserves_order() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        errors.push("age", "must be positive");
        errors.unknown("color");

        let fields: Vec<_> = errors.iter().map(|error| error.field.as_ref()).collect();
        assert_eq!(fields, ["name", "age", "color"]);
    }

    #[test]
    fn check_drains_and_resets() {
        let mut errors = FieldErrors::new();
        assert!(errors.check().is_ok());

        errors.missing("id");
        let failure = errors.check().unwrap_err();
        assert_eq!(failure.field_errors().unwrap().len(), 1);

        // The accumulator is empty again and can keep collecting.
        assert!(errors.is_empty());
        assert!(errors.check().is_ok());
    }

    #[test]
    fn prefix_builds_dotted_paths() {
        let mut error = FieldError::new("name", "missing required field");
        error.prefix("friend");
        assert_eq!(error.field, "friend.name");

        let mut root = FieldError::root("expected an object");
        root.prefix("friend");
        assert_eq!(root.field, "friend");
    }

    #[test]
    fn prefix_skips_field_scoped_structural_errors() {
        let dangling = DeserializeError::DanglingRef {
            id: NodeId::new(7),
            field: Cow::Borrowed("first"),
        };
        assert_eq!(dangling.clone().prefix("outer"), dangling);
        assert!(dangling.is_structural());
        assert!(dangling.field_errors().is_none());
    }

    #[test]
    fn prefix_rescopes_root_reference_errors() {
        let mismatched = DeserializeError::MismatchedRef {
            id: NodeId::new(3),
            field: Cow::Borrowed(ROOT_FIELD),
            expected: "User",
        };
        assert!(matches!(
            mismatched.prefix("first"),
            DeserializeError::MismatchedRef { ref field, .. } if field == "first"
        ));

        let malformed = DeserializeError::MalformedRef {
            field: Cow::Borrowed(ROOT_FIELD),
        };
        assert!(matches!(
            malformed.prefix("first"),
            DeserializeError::MalformedRef { ref field } if field == "first"
        ));

        // Already scoped to a real field: no dotted chaining.
        let scoped = DeserializeError::MismatchedRef {
            id: NodeId::new(3),
            field: Cow::Borrowed("friend"),
            expected: "User",
        };
        assert_eq!(scoped.clone().prefix("first"), scoped);
    }

    #[test]
    fn display_shapes() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        errors.missing("age");
        let error = DeserializeError::from(errors);
        assert_eq!(
            error.to_string(),
            "name: missing required field; age: missing required field"
        );

        let dangling = DeserializeError::DanglingRef {
            id: NodeId::new(999),
            field: Cow::Borrowed("first"),
        };
        assert_eq!(
            dangling.to_string(),
            "reference to `999` at `first` was never defined"
        );
    }
}
