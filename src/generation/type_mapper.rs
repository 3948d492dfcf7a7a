//! Schema to type reference mapping that never declares anything
//!
//! Used for positional path arguments and query struct fields, and by the
//! resolver for its scalar and reference cases.

use crate::generation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::generation::types::{ScalarKind, TypeRef};
use crate::generation::utils::{make_singular, to_identifier};
use crate::infrastructure::openapi::{ApiDocument, PrimitiveType, Schema, SchemaShape, ref_name};

/// Scalar type for a primitive `type`, specialized by `format`
pub fn scalar_type(primitive: PrimitiveType, format: Option<&str>) -> TypeRef {
    match primitive {
        PrimitiveType::String => match format {
            Some("date-time") => TypeRef::Timestamp,
            Some("date") => TypeRef::Date,
            Some("time") => TypeRef::Time,
            _ => TypeRef::Scalar(ScalarKind::String),
        },
        PrimitiveType::Integer => match format {
            Some("int64") => TypeRef::Scalar(ScalarKind::Int64),
            _ => TypeRef::Scalar(ScalarKind::Integer),
        },
        PrimitiveType::Number => TypeRef::Scalar(ScalarKind::Float),
        PrimitiveType::Boolean => TypeRef::Scalar(ScalarKind::Boolean),
    }
}

/// Declared name for a component schema
///
/// Names are escaped like field names, so `-Foo` and `Foo` stay distinct.
/// Enum components are declared under the singular form of their name.
pub fn component_type_name(name: &str, schema: Option<&Schema>) -> String {
    let name = to_identifier(name);
    match schema {
        Some(schema) if schema.is_enum() => make_singular(&name),
        _ => name,
    }
}

/// Type reference for a `$ref` to a component schema
///
/// A reference whose target is missing still yields the escaped name.
pub fn reference_type(document: &ApiDocument, reference: &str) -> TypeRef {
    TypeRef::Named(component_type_name(
        ref_name(reference),
        document.schema_by_ref(reference),
    ))
}

/// Maps schemas to type references without emitting declarations
pub struct TypeMapper<'a> {
    document: &'a ApiDocument,
}

impl<'a> TypeMapper<'a> {
    pub fn new(document: &'a ApiDocument) -> Self {
        Self { document }
    }

    /// Map `schema`; shapes that need a declaration of their own degrade to `Any`
    pub fn map(&self, schema: &Schema, subject: &str, diagnostics: &mut Diagnostics) -> TypeRef {
        match schema.shape() {
            SchemaShape::Reference(reference) => reference_type(self.document, reference),
            SchemaShape::Primitive(primitive) => scalar_type(primitive, schema.format.as_deref()),
            SchemaShape::Enum(_) => match inline_enum_primitive(schema) {
                Some(primitive) => scalar_type(primitive, schema.format.as_deref()),
                None => TypeRef::Any,
            },
            SchemaShape::Array(Some(items)) => TypeRef::array(self.map(items, subject, diagnostics)),
            SchemaShape::Array(None) => TypeRef::array(TypeRef::Any),
            SchemaShape::Object if !schema.has_properties() => {
                match schema.additional_properties_schema() {
                    Some(value) => TypeRef::map(self.map(value, subject, diagnostics)),
                    None => TypeRef::map(TypeRef::Any),
                }
            }
            SchemaShape::AllOf([single]) => self.map(single, subject, diagnostics),
            SchemaShape::Object | SchemaShape::OneOf(_) | SchemaShape::AllOf(_) => {
                diagnostics.push(
                    DiagnosticKind::UnknownSchemaShape,
                    subject,
                    "inline composite type is not supported here, using an opaque type",
                );
                TypeRef::Any
            }
            SchemaShape::AnyOf(_) => {
                diagnostics.push(
                    DiagnosticKind::UnsupportedAnyOf,
                    subject,
                    "anyOf is not supported, using an opaque type",
                );
                TypeRef::Any
            }
            SchemaShape::Unknown => {
                diagnostics.push(
                    DiagnosticKind::UnknownSchemaShape,
                    subject,
                    format!("unknown schema type {:?}, using an opaque type", schema.primary_type()),
                );
                TypeRef::Any
            }
        }
    }
}

/// Primitive kind of an inline enum, falling back to the kind of its first literal
pub(crate) fn inline_enum_primitive(schema: &Schema) -> Option<PrimitiveType> {
    match schema.primary_type() {
        Some("string") => Some(PrimitiveType::String),
        Some("integer") => Some(PrimitiveType::Integer),
        Some("number") => Some(PrimitiveType::Number),
        Some("boolean") => Some(PrimitiveType::Boolean),
        Some(_) => None,
        None => {
            let first = schema.enum_values.as_ref()?.first()?;
            if first.is_string() {
                Some(PrimitiveType::String)
            } else if first.is_i64() || first.is_u64() {
                Some(PrimitiveType::Integer)
            } else if first.is_number() {
                Some(PrimitiveType::Number)
            } else if first.is_boolean() {
                Some(PrimitiveType::Boolean)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> ApiDocument {
        serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "Shop", "version": "1.0.0" },
            "components": {
                "schemas": {
                    "Colors": { "type": "string", "enum": ["red", "green"] },
                    "pet_owner": { "type": "object" }
                }
            }
        }))
        .unwrap()
    }

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scalar_formats() {
        assert_eq!(scalar_type(PrimitiveType::String, Some("date-time")), TypeRef::Timestamp);
        assert_eq!(scalar_type(PrimitiveType::String, Some("date")), TypeRef::Date);
        assert_eq!(scalar_type(PrimitiveType::String, Some("time")), TypeRef::Time);
        assert_eq!(scalar_type(PrimitiveType::String, Some("uuid")), TypeRef::string());
        assert_eq!(
            scalar_type(PrimitiveType::Integer, Some("int64")),
            TypeRef::Scalar(ScalarKind::Int64)
        );
        assert_eq!(
            scalar_type(PrimitiveType::Integer, Some("int32")),
            TypeRef::Scalar(ScalarKind::Integer)
        );
        assert_eq!(scalar_type(PrimitiveType::Number, None), TypeRef::Scalar(ScalarKind::Float));
    }

    #[test]
    fn test_reference_to_enum_is_singular() {
        let doc = document();
        assert_eq!(
            reference_type(&doc, "#/components/schemas/Colors"),
            TypeRef::named("Color")
        );
        assert_eq!(
            reference_type(&doc, "#/components/schemas/pet_owner"),
            TypeRef::named("PetOwner")
        );
        assert_eq!(
            reference_type(&doc, "#/components/schemas/Missing"),
            TypeRef::named("Missing")
        );
    }

    #[test]
    fn test_component_names_are_escaped() {
        assert_eq!(component_type_name("3DSecure", None), "N3DSecure");
        assert_eq!(component_type_name("-Foo", None), "MinusFoo");
        assert_eq!(component_type_name("@Bar", None), "AtBar");
        assert_eq!(component_type_name("Foo", None), "Foo");

        let colors = schema(json!({ "type": "string", "enum": ["red"] }));
        assert_eq!(component_type_name("+colors", Some(&colors)), "PlusColor");
    }

    #[test]
    fn test_map_array_of_refs() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        let mut diagnostics = Diagnostics::new();

        let mapped = mapper.map(
            &schema(json!({ "type": "array", "items": { "$ref": "#/components/schemas/Colors" } })),
            "colors",
            &mut diagnostics,
        );

        assert_eq!(mapped, TypeRef::array(TypeRef::named("Color")));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_map_inline_enum_uses_scalar() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        let mut diagnostics = Diagnostics::new();

        let mapped = mapper.map(&schema(json!({ "enum": ["asc", "desc"] })), "order", &mut diagnostics);
        assert_eq!(mapped, TypeRef::string());
    }

    #[test]
    fn test_map_inline_object_degrades() {
        let doc = document();
        let mapper = TypeMapper::new(&doc);
        let mut diagnostics = Diagnostics::new();

        let mapped = mapper.map(
            &schema(json!({ "type": "object", "properties": { "a": { "type": "string" } } })),
            "filter",
            &mut diagnostics,
        );

        assert_eq!(mapped, TypeRef::Any);
        assert!(diagnostics.contains(DiagnosticKind::UnknownSchemaShape));
    }
}
