//! Field paths and field-level validation errors.
//!
//! Errors render the way the Kubernetes API server renders them, e.g.
//! `spec.network.loadBalancers: Required value: ...`, so that a denied
//! admission reads the same as a schema rejection.

use std::fmt;

/// One step in a field path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named field, e.g. `network`.
    Field(String),
    /// List index, e.g. `[0]`.
    Index(usize),
}

/// Location of a field inside an object, as an ordered list of segments.
///
/// The root path has no segments and renders as the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path starting at the named field.
    pub fn new(name: impl Into<String>) -> Self {
        Self::root().child(name)
    }

    /// Extend the path with a named field.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Extend the path with a list index.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Kind of a field error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldErrorKind {
    /// A mandatory value was omitted.
    Required,
    /// A value, or combination of values, is present but not acceptable.
    Invalid,
}

impl FieldErrorKind {
    /// Machine-readable reason, as used in Kubernetes status causes.
    pub fn reason(&self) -> &'static str {
        match self {
            FieldErrorKind::Required => "FieldValueRequired",
            FieldErrorKind::Invalid => "FieldValueInvalid",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Required => write!(f, "Required value"),
            FieldErrorKind::Invalid => write!(f, "Invalid value"),
        }
    }
}

/// A single validation failure at a specific field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: FieldPath,
    pub kind: FieldErrorKind,
    /// Offending value, only for `Invalid` errors.
    pub bad_value: Option<String>,
    /// Human-readable explanation.
    pub detail: String,
}

impl FieldError {
    /// A mandatory field was omitted.
    pub fn required(path: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            path,
            kind: FieldErrorKind::Required,
            bad_value: None,
            detail: detail.into(),
        }
    }

    /// A field holds an unacceptable value.
    pub fn invalid(path: FieldPath, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            path,
            kind: FieldErrorKind::Invalid,
            bad_value: Some(value.into()),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)?;
        if let Some(value) = &self.bad_value {
            write!(f, ": {:?}", value)?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered list of field errors.
pub type FieldErrorList = Vec<FieldError>;
