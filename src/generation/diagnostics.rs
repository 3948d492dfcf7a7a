//! Soft-degrade findings recorded while building the model

use serde::Serialize;
use std::fmt;

/// Kind of recoverable problem found in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Path item given as a `$ref`, which is not followed
    UnresolvedPath,
    /// Parameter reference that points nowhere
    UnresolvedParameter,
    UnsupportedAnyOf,
    /// Multi-branch `allOf` inside a property of an `allOf` merge
    NestedAllOf,
    /// Enum literal whose JSON type does not match the enum's type
    EnumValueMismatch,
    UnknownSchemaShape,
    /// Two different schemas asked for the same declaration name
    NameCollision,
    UnsupportedEnumKind,
    /// Header and cookie parameters
    UnsupportedParameterLocation,
    /// Path placeholder with no matching parameter declaration
    MissingPathParameter,
    /// `allOf` branch contributing no properties
    IgnoredAllOfBranch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnresolvedPath => "unresolved_path",
            DiagnosticKind::UnresolvedParameter => "unresolved_parameter",
            DiagnosticKind::UnsupportedAnyOf => "unsupported_any_of",
            DiagnosticKind::NestedAllOf => "nested_all_of",
            DiagnosticKind::EnumValueMismatch => "enum_value_mismatch",
            DiagnosticKind::UnknownSchemaShape => "unknown_schema_shape",
            DiagnosticKind::NameCollision => "name_collision",
            DiagnosticKind::UnsupportedEnumKind => "unsupported_enum_kind",
            DiagnosticKind::UnsupportedParameterLocation => "unsupported_parameter_location",
            DiagnosticKind::MissingPathParameter => "missing_path_parameter",
            DiagnosticKind::IgnoredAllOfBranch => "ignored_all_of_branch",
        };
        f.write_str(name)
    }
}

/// One recorded finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Declaration, operation or path the finding is about
    pub subject: String,
    pub message: String,
}

/// Collector threaded through resolution
///
/// Every entry is also emitted as a `tracing` warning when it is pushed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(
            kind = %diagnostic.kind,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, in recording order
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}
