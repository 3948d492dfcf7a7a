//! OpenAPI document model consumed by the generation core
//!
//! Only the subset of OpenAPI 3.x the generator needs is modeled. Every map is
//! a `BTreeMap` so iteration order never depends on the input document.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
pub const RESPONSE_REF_PREFIX: &str = "#/components/responses/";
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
pub const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";

/// Media type used for request and response payloads
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Either a `$ref` to a component or the inlined item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

/// Root of a parsed OpenAPI document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDocument {
    pub openapi: String,
    pub info: ApiInfo,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Server definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

/// Tag metadata, used as the output grouping unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(default)]
    pub request_bodies: BTreeMap<String, RequestBody>,
}

/// HTTP methods supported by OpenAPI path items
///
/// Variants are declared in alphabetical order so the derived `Ord` matches
/// the order operations of one path are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_lowercase())
    }
}

/// A path item containing operations for different HTTP methods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

impl PathItem {
    /// Operations of this path, ordered by HTTP method
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        let mut operations: Vec<_> = [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Options, self.options.as_ref()),
            (HttpMethod::Head, self.head.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
        .collect();
        operations.sort_by_key(|(method, _)| *method);
        operations
    }
}

/// An API operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<Response>>,
    #[serde(default)]
    pub deprecated: bool,
    /// Every other key of the operation object; vendor extensions start with `x-`
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

impl Operation {
    /// Look up a vendor extension (`x-*`) by name
    pub fn extension(&self, name: &str) -> Option<&JsonValue> {
        if !name.starts_with("x-") {
            return None;
        }
        self.extensions.get(name)
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Schema>,
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

/// Response definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// Schema of the JSON payload, if the response declares one
    pub fn json_schema(&self) -> Option<&Schema> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
    }
}

/// Media type content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// Schema type can be a single type or an array of types (OpenAPI 3.1 nullable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// JSON Schema definition used in OpenAPI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Option<Box<Schema>>,
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<JsonValue>>,
    pub additional_properties: Option<AdditionalProperties>,
    pub all_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub nullable: Option<bool>,
    pub deprecated: Option<bool>,
}

/// Primitive `type` keyword values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Closed classification of a schema node
///
/// Produced by [`Schema::shape`]; consumers dispatch on it with an exhaustive
/// `match`, so a shape nobody handles is a compile error rather than a
/// silently skipped schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaShape<'a> {
    Reference(&'a str),
    Enum(&'a [JsonValue]),
    Primitive(PrimitiveType),
    Array(Option<&'a Schema>),
    Object,
    OneOf(&'a [Schema]),
    AnyOf(&'a [Schema]),
    AllOf(&'a [Schema]),
    Unknown,
}

impl Schema {
    /// First non-`null` entry of the `type` keyword
    pub fn primary_type(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => types
                .iter()
                .map(String::as_str)
                .find(|t| *t != "null"),
        }
    }

    /// Check if this schema accepts `null` (3.0 flag or 3.1 type array)
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// Whether the object allows keys beyond its fixed properties
    pub fn allows_additional_properties(&self) -> bool {
        match &self.additional_properties {
            Some(AdditionalProperties::Bool(allowed)) => *allowed,
            Some(AdditionalProperties::Schema(_)) => true,
            None => false,
        }
    }

    /// Schema of additional property values, when one is given
    pub fn additional_properties_schema(&self) -> Option<&Schema> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn is_enum(&self) -> bool {
        self.enum_values.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Classify the schema
    ///
    /// Priority: `$ref`, `enum`, the composition keywords, then `type`.
    /// Schemas without `type` that still carry `properties` or `items` are
    /// treated as objects or arrays.
    pub fn shape(&self) -> SchemaShape<'_> {
        if let Some(reference) = &self.reference {
            return SchemaShape::Reference(reference);
        }
        if let Some(values) = self.enum_values.as_deref().filter(|v| !v.is_empty()) {
            return SchemaShape::Enum(values);
        }
        if let Some(branches) = &self.one_of {
            return SchemaShape::OneOf(branches);
        }
        if let Some(branches) = &self.any_of {
            return SchemaShape::AnyOf(branches);
        }
        if let Some(branches) = &self.all_of {
            return SchemaShape::AllOf(branches);
        }

        match self.primary_type() {
            Some("string") => SchemaShape::Primitive(PrimitiveType::String),
            Some("integer") => SchemaShape::Primitive(PrimitiveType::Integer),
            Some("number") => SchemaShape::Primitive(PrimitiveType::Number),
            Some("boolean") => SchemaShape::Primitive(PrimitiveType::Boolean),
            Some("array") => SchemaShape::Array(self.items.as_deref()),
            Some("object") => SchemaShape::Object,
            Some(_) => SchemaShape::Unknown,
            None if self.properties.is_some() || self.additional_properties.is_some() => {
                SchemaShape::Object
            }
            None if self.items.is_some() => SchemaShape::Array(self.items.as_deref()),
            None => SchemaShape::Unknown,
        }
    }
}

impl ApiDocument {
    /// Resolve a `#/components/schemas/...` reference
    pub fn schema_by_ref(&self, reference: &str) -> Option<&Schema> {
        self.components
            .schemas
            .get(reference.strip_prefix(SCHEMA_REF_PREFIX)?)
    }

    /// Resolve a `#/components/responses/...` reference
    pub fn response_by_ref(&self, reference: &str) -> Option<&Response> {
        self.components
            .responses
            .get(reference.strip_prefix(RESPONSE_REF_PREFIX)?)
    }

    /// Resolve a `#/components/parameters/...` reference
    pub fn parameter_by_ref(&self, reference: &str) -> Option<&Parameter> {
        self.components
            .parameters
            .get(reference.strip_prefix(PARAMETER_REF_PREFIX)?)
    }

    /// Resolve a `#/components/requestBodies/...` reference
    pub fn request_body_by_ref(&self, reference: &str) -> Option<&RequestBody> {
        self.components
            .request_bodies
            .get(reference.strip_prefix(REQUEST_BODY_REF_PREFIX)?)
    }

    /// Resolve a parameter that may be a reference
    pub fn resolve_parameter<'a>(&'a self, parameter: &'a RefOr<Parameter>) -> Option<&'a Parameter> {
        match parameter {
            RefOr::Item(parameter) => Some(parameter),
            RefOr::Reference { reference } => self.parameter_by_ref(reference),
        }
    }

    /// Resolve a response that may be a reference
    pub fn resolve_response<'a>(&'a self, response: &'a RefOr<Response>) -> Option<&'a Response> {
        match response {
            RefOr::Item(response) => Some(response),
            RefOr::Reference { reference } => self.response_by_ref(reference),
        }
    }

    /// Resolve a request body that may be a reference
    pub fn resolve_request_body<'a>(
        &'a self,
        body: &'a RefOr<RequestBody>,
    ) -> Option<&'a RequestBody> {
        match body {
            RefOr::Item(body) => Some(body),
            RefOr::Reference { reference } => self.request_body_by_ref(reference),
        }
    }
}

/// Last segment of a JSON pointer reference (`#/components/schemas/Pet` -> `Pet`)
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: JsonValue) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_shape_enum_takes_priority_over_type() {
        let s = schema(json!({ "type": "string", "enum": ["a", "b"] }));
        assert!(matches!(s.shape(), SchemaShape::Enum(values) if values.len() == 2));
    }

    #[test]
    fn test_shape_reference() {
        let s = schema(json!({ "$ref": "#/components/schemas/Pet" }));
        assert_eq!(s.shape(), SchemaShape::Reference("#/components/schemas/Pet"));
    }

    #[test]
    fn test_shape_nullable_type_array() {
        let s = schema(json!({ "type": ["null", "integer"] }));
        assert_eq!(s.shape(), SchemaShape::Primitive(PrimitiveType::Integer));
        assert!(s.is_nullable());
    }

    #[test]
    fn test_shape_untyped_properties_is_object() {
        let s = schema(json!({ "properties": { "id": { "type": "string" } } }));
        assert_eq!(s.shape(), SchemaShape::Object);
    }

    #[test]
    fn test_shape_unknown() {
        assert_eq!(schema(json!({})).shape(), SchemaShape::Unknown);
        assert_eq!(schema(json!({ "type": "file" })).shape(), SchemaShape::Unknown);
    }

    #[test]
    fn test_additional_properties_variants() {
        let free_form = schema(json!({ "type": "object", "additionalProperties": true }));
        assert!(free_form.allows_additional_properties());
        assert!(free_form.additional_properties_schema().is_none());

        let typed = schema(json!({
            "type": "object",
            "additionalProperties": { "type": "integer" }
        }));
        assert!(typed.allows_additional_properties());
        assert!(typed.additional_properties_schema().is_some());

        let closed = schema(json!({ "type": "object", "additionalProperties": false }));
        assert!(!closed.allows_additional_properties());
    }

    #[test]
    fn test_path_item_operations_sorted() {
        let item: PathItem = serde_json::from_value(json!({
            "post": { "operationId": "create" },
            "get": { "operationId": "list" },
            "delete": { "operationId": "remove" }
        }))
        .unwrap();

        let methods: Vec<_> = item.operations().iter().map(|(m, _)| *m).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Delete, HttpMethod::Get, HttpMethod::Post]
        );
    }

    #[test]
    fn test_operation_extensions() {
        let op: Operation = serde_json::from_value(json!({
            "operationId": "listPets",
            "x-codegen": { "method_name": "list" },
            "security": []
        }))
        .unwrap();

        assert!(op.extension("x-codegen").is_some());
        assert!(op.extension("security").is_none());
    }

    #[test]
    fn test_ref_or_parameter() {
        let doc: ApiDocument = serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "T", "version": "1" },
            "components": {
                "parameters": {
                    "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                }
            }
        }))
        .unwrap();

        let by_ref: RefOr<Parameter> =
            serde_json::from_value(json!({ "$ref": "#/components/parameters/Limit" })).unwrap();
        let missing: RefOr<Parameter> =
            serde_json::from_value(json!({ "$ref": "#/components/parameters/Nope" })).unwrap();

        assert_eq!(doc.resolve_parameter(&by_ref).map(|p| p.name.as_str()), Some("limit"));
        assert!(doc.resolve_parameter(&missing).is_none());
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(ref_name("Pet"), "Pet");
    }
}
