//! Composition rules: allOf merges, oneOf sum types, free-form maps, enums

use crate::generation::diagnostics::DiagnosticKind;
use crate::generation::resolver::{Position, Resolution, SchemaResolver, documentation, sorted_fields};
use crate::generation::type_mapper::inline_enum_primitive;
use crate::generation::types::{
    Declaration, EnumDeclaration, EnumLiteral, EnumVariant, ScalarKind, SumTypeDeclaration,
    SumVariant, TypeDeclaration, TypeRef, TypeRepr,
};
use crate::generation::utils::{NameSet, make_singular, split_reserved_prefix, to_proper_case};
use crate::infrastructure::openapi::{ApiDocument, PrimitiveType, Schema, SchemaShape};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};

impl SchemaResolver<'_> {
    /// Enum declared under the singular form of `desired_name`
    pub(crate) fn enumeration(
        &mut self,
        schema: &Schema,
        values: &[JsonValue],
        desired_name: &str,
    ) -> Resolution {
        let name = make_singular(desired_name);
        if !self.claim(&name, Some(schema)) {
            return Resolution::of(TypeRef::named(name));
        }

        let scalar = match inline_enum_primitive(schema) {
            Some(PrimitiveType::String) => ScalarKind::String,
            Some(PrimitiveType::Integer) if schema.format.as_deref() == Some("int64") => {
                ScalarKind::Int64
            }
            Some(PrimitiveType::Integer) => ScalarKind::Integer,
            Some(PrimitiveType::Number) => ScalarKind::Float,
            Some(PrimitiveType::Boolean) | None => {
                return self.unsupported_enum(schema, &name);
            }
        };

        let mut names = NameSet::new();
        let mut variants = Vec::with_capacity(values.len());
        for value in values {
            let Some(literal) = enum_literal(value, scalar) else {
                self.diagnostics.push(
                    DiagnosticKind::EnumValueMismatch,
                    &name,
                    format!(
                        "enum value {value} does not match type {}, skipping it",
                        scalar.label().to_lowercase()
                    ),
                );
                continue;
            };
            variants.push(EnumVariant {
                name: names.claim(&variant_name(&name, &literal)),
                value: literal,
            });
        }
        variants.sort_by(|a, b| a.name.cmp(&b.name));

        let declaration = Declaration::Enum(EnumDeclaration {
            name: name.clone(),
            scalar,
            variants,
            documentation: documentation(schema),
        });
        Resolution {
            type_ref: TypeRef::named(name),
            declarations: vec![self.finish(declaration)],
        }
    }

    /// Enums over booleans or untyped literals degrade to a plain alias
    fn unsupported_enum(&mut self, schema: &Schema, name: &str) -> Resolution {
        let target = match inline_enum_primitive(schema) {
            Some(PrimitiveType::Boolean) => TypeRef::Scalar(ScalarKind::Boolean),
            _ => TypeRef::Any,
        };
        self.diagnostics.push(
            DiagnosticKind::UnsupportedEnumKind,
            name,
            format!("enum of type {:?} is not supported, declaring an alias of {target}", schema.primary_type()),
        );

        let mut alias = TypeDeclaration::new(name, TypeRepr::Alias(target));
        alias.documentation = documentation(schema);
        alias.origin = Some(schema.clone());
        Resolution {
            type_ref: TypeRef::named(name),
            declarations: vec![self.finish(Declaration::Type(alias))],
        }
    }

    /// String-keyed map for objects that only declare additional properties
    pub(crate) fn free_form_map(&mut self, schema: &Schema, name: &str) -> Resolution {
        if !self.claim(name, Some(schema)) {
            return Resolution::of(TypeRef::named(name));
        }

        let (value, nested) = match schema.additional_properties_schema() {
            Some(value) if is_any_value(value) => (TypeRef::Any, Vec::new()),
            Some(value) => {
                let resolution = self.resolve_at(value, &format!("{name}Value"), Position::Nested);
                (resolution.type_ref, resolution.declarations)
            }
            None => (TypeRef::Any, Vec::new()),
        };

        let mut declaration = TypeDeclaration::new(name, TypeRepr::Map(value));
        declaration.documentation = documentation(schema);
        declaration.origin = Some(schema.clone());

        let mut declarations = vec![self.finish(Declaration::Type(declaration))];
        declarations.extend(nested);
        Resolution {
            type_ref: TypeRef::named(name),
            declarations,
        }
    }

    /// Sum type over the branches of a `oneOf`
    pub(crate) fn sum_type(&mut self, schema: &Schema, branches: &[Schema], name: &str) -> Resolution {
        if !self.claim(name, Some(schema)) {
            return Resolution::of(TypeRef::named(name));
        }

        let mut labels = NameSet::new();
        let mut variants = Vec::with_capacity(branches.len());
        let mut nested = Vec::new();
        for (index, branch) in branches.iter().enumerate() {
            let branch_name = format!("{name}Option{}", index + 1);
            let resolution = self.resolve_at(branch, &branch_name, Position::Nested);
            variants.push(SumVariant {
                label: labels.claim(&accessor_label(&resolution.type_ref)),
                type_ref: resolution.type_ref,
            });
            nested.extend(resolution.declarations);
        }

        let declaration = Declaration::Sum(SumTypeDeclaration {
            name: name.to_string(),
            variants,
            documentation: documentation(schema),
            is_error: false,
            decode_unimplemented: true,
        });

        let mut declarations = vec![self.finish(declaration)];
        declarations.extend(nested);
        Resolution {
            type_ref: TypeRef::named(name),
            declarations,
        }
    }

    /// Struct merging the properties of every `allOf` branch, left to right
    ///
    /// A property already contributed by an earlier branch is dropped from
    /// later ones. The schema's own properties act as the last branch.
    pub(crate) fn merge_all_of(&mut self, schema: &Schema, branches: &[Schema], name: &str) -> Resolution {
        if !self.claim(name, Some(schema)) {
            return Resolution::of(TypeRef::named(name));
        }

        let mut parts = Vec::new();
        let mut visited = HashSet::new();
        collect_branches(self.document, branches, &mut parts, &mut visited);
        if schema.has_properties() {
            parts.push(Branch::Own(schema));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut fields = Vec::new();
        let mut nested = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            let branch = match part {
                Branch::Own(branch) | Branch::Resolved(branch) => *branch,
                Branch::Unresolved(reference) => {
                    self.diagnostics.push(
                        DiagnosticKind::IgnoredAllOfBranch,
                        name,
                        format!("allOf branch {reference} does not resolve, ignoring it"),
                    );
                    continue;
                }
            };
            let Some(properties) = branch.properties.as_ref().filter(|p| !p.is_empty()) else {
                self.diagnostics.push(
                    DiagnosticKind::IgnoredAllOfBranch,
                    name,
                    format!("allOf branch {} has no properties, ignoring it", index + 1),
                );
                continue;
            };

            let fresh: BTreeMap<&String, &Schema> = properties
                .iter()
                .filter(|(key, _)| !seen.contains(key.as_str()))
                .collect();
            let (branch_fields, branch_nested) = self.struct_fields(
                fresh.iter().map(|(key, property)| (*key, *property)),
                |key| branch.required.iter().chain(schema.required.iter()).any(|r| r == key),
                name,
                Position::AllOfProperty,
            );
            seen.extend(fresh.keys().map(|key| key.as_str()));
            fields.extend(branch_fields);
            nested.extend(branch_nested);
        }

        let mut declaration = TypeDeclaration::new(name, TypeRepr::Struct(sorted_fields(fields)));
        declaration.documentation = documentation(schema);
        declaration.origin = Some(schema.clone());

        let mut declarations = vec![self.finish(Declaration::Type(declaration))];
        declarations.extend(nested);
        Resolution {
            type_ref: TypeRef::named(name),
            declarations,
        }
    }
}

/// One contributor to an `allOf` merge
enum Branch<'s> {
    Resolved(&'s Schema),
    /// The merged schema's own `properties`
    Own(&'s Schema),
    Unresolved(&'s str),
}

/// Flattens `allOf` branches, following `$ref`s and nested `allOf`s
///
/// Each referenced component is visited once, so reference cycles terminate.
fn collect_branches<'s>(
    document: &'s ApiDocument,
    branches: &'s [Schema],
    out: &mut Vec<Branch<'s>>,
    visited: &mut HashSet<&'s str>,
) {
    for branch in branches {
        let target = match branch.shape() {
            SchemaShape::Reference(reference) => {
                if !visited.insert(reference) {
                    continue;
                }
                match document.schema_by_ref(reference) {
                    Some(target) => target,
                    None => {
                        out.push(Branch::Unresolved(reference));
                        continue;
                    }
                }
            }
            _ => branch,
        };

        match &target.all_of {
            Some(inner) if target.reference.is_none() => {
                collect_branches(document, inner, out, visited);
                if target.has_properties() {
                    out.push(Branch::Resolved(target));
                }
            }
            _ => out.push(Branch::Resolved(target)),
        }
    }
}

/// Literal for `value` if it matches the enum's scalar
fn enum_literal(value: &JsonValue, scalar: ScalarKind) -> Option<EnumLiteral> {
    match scalar {
        ScalarKind::String => value.as_str().map(|s| EnumLiteral::String(s.to_string())),
        ScalarKind::Integer | ScalarKind::Int64 => value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|n| n.is_finite() && n.fract() == 0.0)
                    .map(|n| n as i64)
            })
            .map(EnumLiteral::Integer),
        ScalarKind::Float => value.as_f64().map(EnumLiteral::Float),
        ScalarKind::Boolean => None,
    }
}

/// `EnumName` + proper-cased literal, with reserved leading characters spelled out
fn variant_name(enum_name: &str, literal: &EnumLiteral) -> String {
    let text = literal.to_string();
    let (prefix, rest) = split_reserved_prefix(&text);
    let suffix = format!("{prefix}{}", to_proper_case(rest));
    if suffix.is_empty() {
        format!("{enum_name}Empty")
    } else {
        format!("{enum_name}{suffix}")
    }
}

/// Accessor label of a sum type variant, derived from its type
fn accessor_label(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Named(name) => name.clone(),
        TypeRef::Scalar(kind) => kind.label().to_string(),
        TypeRef::Timestamp => "Timestamp".to_string(),
        TypeRef::Date => "Date".to_string(),
        TypeRef::Time => "Time".to_string(),
        TypeRef::Array(item) => format!("{}List", accessor_label(item)),
        TypeRef::Map(_) => "Map".to_string(),
        TypeRef::Any => "Any".to_string(),
    }
}

/// Schema placing no constraint on its values (`{}` or only annotations)
fn is_any_value(schema: &Schema) -> bool {
    schema.reference.is_none()
        && schema.schema_type.is_none()
        && schema.properties.is_none()
        && schema.items.is_none()
        && schema.enum_values.is_none()
        && schema.additional_properties.is_none()
        && schema.all_of.is_none()
        && schema.one_of.is_none()
        && schema.any_of.is_none()
}
