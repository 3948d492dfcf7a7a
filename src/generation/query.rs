//! Conversion plans for turning params structs into query strings

use crate::generation::registry::Registry;
use crate::generation::types::{
    CastTarget, QueryConversion, QueryEncoderDeclaration, ScalarKind, StructField, TypeRef,
    ValueFormat,
};

/// Type of each value a field contributes
///
/// Arrays, directly or through aliases, contribute their items; everything
/// else contributes the field type itself.
pub fn query_element(type_ref: &TypeRef, registry: &Registry) -> TypeRef {
    match registry.resolve_alias(type_ref) {
        TypeRef::Array(item) => *item,
        _ => type_ref.clone(),
    }
}

/// How values of `type_ref` (or of its elements, for arrays) become text
pub fn value_format(type_ref: &TypeRef, registry: &Registry) -> ValueFormat {
    let element = query_element(type_ref, registry);
    match &element {
        TypeRef::Scalar(ScalarKind::String) => ValueFormat::Text,
        TypeRef::Scalar(ScalarKind::Integer | ScalarKind::Int64) => ValueFormat::Integer,
        TypeRef::Scalar(ScalarKind::Float) => ValueFormat::Float,
        TypeRef::Scalar(ScalarKind::Boolean) => ValueFormat::Boolean,
        TypeRef::Timestamp => ValueFormat::Timestamp,
        TypeRef::Date => ValueFormat::Date,
        TypeRef::Time => ValueFormat::Time,
        TypeRef::Named(name) => match registry.resolve_alias(&element) {
            TypeRef::Scalar(kind) => ValueFormat::Cast(CastTarget::Scalar(kind)),
            TypeRef::Timestamp => ValueFormat::Cast(CastTarget::Timestamp),
            TypeRef::Date => ValueFormat::Cast(CastTarget::Date),
            TypeRef::Time => ValueFormat::Cast(CastTarget::Time),
            // enums, possibly behind aliases
            TypeRef::Named(_) => registry
                .underlying_scalar(name)
                .map_or(ValueFormat::Text, |kind| ValueFormat::Cast(CastTarget::Scalar(kind))),
            TypeRef::Array(_) | TypeRef::Map(_) | TypeRef::Any => ValueFormat::Text,
        },
        TypeRef::Array(_) | TypeRef::Map(_) | TypeRef::Any => ValueFormat::Text,
    }
}

/// One conversion per field, in field order
pub fn query_encoder(
    type_name: &str,
    fields: &[StructField],
    registry: &Registry,
) -> QueryEncoderDeclaration {
    let conversions = fields
        .iter()
        .map(|field| QueryConversion {
            key: field.serialization_key.clone(),
            field: field.name.clone(),
            repeated: registry.resolve_alias(&field.type_ref).is_array(),
            required: !field.optional,
            element: query_element(&field.type_ref, registry),
            format: value_format(&field.type_ref, registry),
        })
        .collect();

    QueryEncoderDeclaration {
        type_name: type_name.to_string(),
        conversions,
    }
}
