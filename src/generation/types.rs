//! Intermediate representation produced by the generation core
//!
//! Everything here is built once per run and never mutated afterwards.
//! Renderers only read it.

use crate::infrastructure::openapi::{HttpMethod, Schema};
use crate::generation::diagnostics::Diagnostics;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Underlying scalar of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarKind {
    String,
    Integer,
    /// Integer declared with `format: int64`
    Int64,
    Float,
    Boolean,
}

impl ScalarKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Integer => "Integer",
            ScalarKind::Int64 => "Int64",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
        }
    }
}

/// Resolved reference to a type
///
/// `Named` is only a lookup key into the declaration registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarKind),
    Timestamp,
    Date,
    Time,
    Named(String),
    Array(Box<TypeRef>),
    /// String-keyed map
    Map(Box<TypeRef>),
    /// Opaque placeholder for shapes the generator does not model
    Any,
}

impl TypeRef {
    pub fn string() -> Self {
        TypeRef::Scalar(ScalarKind::String)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(item: TypeRef) -> Self {
        TypeRef::Array(Box::new(item))
    }

    pub fn map(value: TypeRef) -> Self {
        TypeRef::Map(Box::new(value))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// Element type for arrays, the type itself otherwise
    pub fn element(&self) -> &TypeRef {
        match self {
            TypeRef::Array(item) => item,
            other => other,
        }
    }

    /// Name of the declaration this reference points at, if any
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(kind) => write!(f, "{}", kind.label().to_lowercase()),
            TypeRef::Timestamp => write!(f, "timestamp"),
            TypeRef::Date => write!(f, "date"),
            TypeRef::Time => write!(f, "time"),
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::Array(item) => write!(f, "[{item}]"),
            TypeRef::Map(value) => write!(f, "{{string: {value}}}"),
            TypeRef::Any => write!(f, "any"),
        }
    }
}

/// A named declaration in the generated library
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Type(TypeDeclaration),
    Enum(EnumDeclaration),
    Sum(SumTypeDeclaration),
    QueryEncoder(QueryEncoderDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Type(decl) => &decl.name,
            Declaration::Enum(decl) => &decl.name,
            Declaration::Sum(decl) => &decl.name,
            Declaration::QueryEncoder(decl) => &decl.type_name,
        }
    }

    /// Whether values of this declaration are returned as errors
    pub fn is_error(&self) -> bool {
        match self {
            Declaration::Type(decl) => decl.is_error,
            Declaration::Sum(decl) => decl.is_error,
            Declaration::Enum(_) | Declaration::QueryEncoder(_) => false,
        }
    }

    pub(crate) fn mark_error(&mut self) {
        match self {
            Declaration::Type(decl) => decl.is_error = true,
            Declaration::Sum(decl) => decl.is_error = true,
            Declaration::Enum(_) | Declaration::QueryEncoder(_) => {}
        }
    }
}

/// Representation of a plain type declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "repr", content = "of", rename_all = "snake_case")]
pub enum TypeRepr {
    /// `type Name = Target` (scalar aliases, sequences, opaque values)
    Alias(TypeRef),
    Struct(Vec<StructField>),
    /// String-keyed map with the given value type
    Map(TypeRef),
    /// Undecoded payload bytes
    RawBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub repr: TypeRepr,
    pub documentation: Option<String>,
    pub is_error: bool,
    /// Schema the declaration was produced from
    #[serde(skip)]
    pub origin: Option<Schema>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, repr: TypeRepr) -> Self {
        Self {
            name: name.into(),
            repr,
            documentation: None,
            is_error: false,
            origin: None,
        }
    }

    pub fn fields(&self) -> &[StructField] {
        match &self.repr {
            TypeRepr::Struct(fields) => fields,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    /// Exported identifier
    pub name: String,
    pub type_ref: TypeRef,
    pub optional: bool,
    /// Property name on the wire
    pub serialization_key: String,
    pub documentation: Option<String>,
}

/// Literal value of an enum variant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    String(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::String(s) => write!(f, "{s}"),
            EnumLiteral::Integer(n) => write!(f, "{n}"),
            EnumLiteral::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumVariant {
    pub name: String,
    pub value: EnumLiteral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDeclaration {
    pub name: String,
    pub scalar: ScalarKind,
    /// Sorted by name
    pub variants: Vec<EnumVariant>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumVariant {
    /// Accessor label, unique within the sum type
    pub label: String,
    pub type_ref: TypeRef,
}

/// Tagged union over the branches of a `oneOf`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumTypeDeclaration {
    pub name: String,
    pub variants: Vec<SumVariant>,
    pub documentation: Option<String>,
    pub is_error: bool,
    /// Payloads are kept raw; decoding into a variant is left to the caller
    pub decode_unimplemented: bool,
}

/// How a query value is turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "via", rename_all = "snake_case")]
pub enum ValueFormat {
    Text,
    /// RFC 3339
    Timestamp,
    Date,
    Time,
    Integer,
    Boolean,
    Float,
    /// Named type converted to its underlying type first
    Cast(CastTarget),
}

/// Underlying type a named query value is converted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "scalar", rename_all = "snake_case")]
pub enum CastTarget {
    Scalar(ScalarKind),
    Timestamp,
    Date,
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryConversion {
    /// Query key
    pub key: String,
    /// Field of the params struct
    pub field: String,
    /// Arrays, including aliases of arrays, add one pair per element
    pub repeated: bool,
    /// Optional fields convert only when present
    pub required: bool,
    /// Type of each formatted value: the array item when repeated
    pub element: TypeRef,
    pub format: ValueFormat,
}

/// Companion routine turning a params struct into query pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEncoderDeclaration {
    pub type_name: String,
    pub conversions: Vec<QueryConversion>,
}

/// Segment of a path template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PathPart {
    Literal(String),
    /// Positional marker, holding the argument name
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTemplate {
    pub raw: String,
    pub parts: Vec<PathPart>,
}

impl PathTemplate {
    /// Render the template with every parameter replaced by `marker`
    pub fn expression(&self, marker: &str) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                PathPart::Literal(text) => text.as_str(),
                PathPart::Param(_) => marker,
            })
            .collect()
    }

    /// Argument names in placeholder order
    pub fn parameters(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                PathPart::Param(name) => Some(name.as_str()),
                PathPart::Literal(_) => None,
            })
            .collect()
    }
}

/// Method argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
}

/// Status of a response entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum StatusClass {
    Code(u16),
    /// `4XX` style range, holding the leading digit times 100
    Range(u16),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: StatusClass,
    /// Numeric sort key; `0` for `default`, which always sorts last
    pub sort_key: u16,
    pub is_error: bool,
    pub is_default: bool,
    /// Synthesized fallback for operations without a `default` response
    pub is_unexpected: bool,
    pub type_ref: Option<TypeRef>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub operation_id: String,
    pub name: String,
    pub http_method: HttpMethod,
    pub path: PathTemplate,
    pub path_params: Vec<Parameter>,
    pub query_params: Option<Parameter>,
    pub body: Option<Parameter>,
    pub has_body: bool,
    pub response_type: Option<TypeRef>,
    pub responses: Vec<Response>,
    pub documentation: Option<String>,
    pub deprecated: bool,
}

/// Declarations and methods emitted together, one per tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub tag: String,
    /// Proper-cased tag
    pub name: String,
    pub description: Option<String>,
    pub declarations: Vec<Declaration>,
    pub methods: Vec<Method>,
}

/// Complete output of a generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiModel {
    pub package: String,
    pub service: String,
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Sorted by name
    pub groupings: Vec<Grouping>,
    /// Declarations not owned by any grouping
    pub shared: Vec<Declaration>,
    pub grouping_names: Vec<String>,
}

impl ApiModel {
    pub fn grouping(&self, name: &str) -> Option<&Grouping> {
        self.groupings.iter().find(|g| g.name == name)
    }

    /// Look up a declaration by name across all groupings and the shared set
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.groupings
            .iter()
            .flat_map(|g| g.declarations.iter())
            .chain(self.shared.iter())
            .find(|d| d.name() == name)
    }
}

/// A generated file, path relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

/// Result of an orchestrated generation run
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub artifacts: Vec<Artifact>,
    pub model: ApiModel,
    pub diagnostics: Diagnostics,
}
