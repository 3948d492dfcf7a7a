//! Recursive schema resolution into type references and declarations

use crate::generation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::generation::registry::{Claim, Registry};
use crate::generation::type_mapper::{reference_type, scalar_type};
use crate::generation::types::{Declaration, StructField, TypeDeclaration, TypeRef, TypeRepr};
use crate::generation::utils::{make_singular, to_identifier, unique_by};
use crate::infrastructure::openapi::{ApiDocument, Schema, SchemaShape};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of resolving one schema node
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub type_ref: TypeRef,
    /// Declarations created while resolving, parents before children
    pub declarations: Vec<Declaration>,
}

impl Resolution {
    pub fn of(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            declarations: Vec::new(),
        }
    }
}

/// Where a schema node sits, which changes how compositions are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// Top-level component schema
    Component,
    Nested,
    /// Direct property of an `allOf` merge
    AllOfProperty,
}

/// Walks schemas, producing type references and the declarations they need
///
/// Owns the name registry and the diagnostics collector for the whole run.
pub struct SchemaResolver<'a> {
    pub(super) document: &'a ApiDocument,
    pub(super) registry: Registry,
    pub(super) diagnostics: Diagnostics,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(document: &'a ApiDocument) -> Self {
        Self {
            document,
            registry: Registry::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn document(&self) -> &'a ApiDocument {
        self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Resolve a nested schema, naming any declaration it needs `desired_name`
    pub fn resolve(&mut self, schema: &Schema, desired_name: &str) -> Resolution {
        self.resolve_at(schema, desired_name, Position::Nested)
    }

    /// Declare a component schema under the name references to it use
    ///
    /// Shapes that do not declare a type of their own (scalars, arrays,
    /// references, opaque values) become aliases.
    pub fn declare_component(&mut self, name: &str, schema: &Schema) -> Vec<Declaration> {
        // enums are singularized when their declaration is resolved
        let name = to_identifier(name);
        match schema.shape() {
            SchemaShape::Enum(_)
            | SchemaShape::Object
            | SchemaShape::OneOf(_)
            | SchemaShape::AllOf(_) => {
                self.resolve_at(schema, &name, Position::Component)
                    .declarations
            }
            SchemaShape::Reference(_)
            | SchemaShape::Primitive(_)
            | SchemaShape::Array(_)
            | SchemaShape::AnyOf(_)
            | SchemaShape::Unknown => {
                if !self.claim(&name, Some(schema)) {
                    return Vec::new();
                }
                let inner = self.resolve_at(schema, &name, Position::Component);
                let mut alias = TypeDeclaration::new(&name, TypeRepr::Alias(inner.type_ref));
                alias.documentation = documentation(schema);
                alias.origin = Some(schema.clone());

                let mut declarations = vec![self.finish(Declaration::Type(alias))];
                declarations.extend(inner.declarations);
                declarations
            }
        }
    }

    /// Declare `name` as an alias of `target` unless it is already taken
    pub fn declare_alias(
        &mut self,
        name: &str,
        target: TypeRef,
        documentation: Option<String>,
    ) -> Option<Declaration> {
        if !self.claim(name, None) {
            return None;
        }
        let mut alias = TypeDeclaration::new(name, TypeRepr::Alias(target));
        alias.documentation = documentation;
        Some(self.finish(Declaration::Type(alias)))
    }

    /// Register a synthesized declaration, returning it when the name was free
    pub fn declare(&mut self, declaration: Declaration) -> Option<Declaration> {
        if !self.claim(declaration.name(), None) {
            return None;
        }
        Some(self.finish(declaration))
    }

    pub(crate) fn resolve_at(
        &mut self,
        schema: &Schema,
        desired_name: &str,
        position: Position,
    ) -> Resolution {
        match schema.shape() {
            SchemaShape::Reference(reference) => Resolution::of(reference_type(self.document, reference)),
            SchemaShape::Enum(values) => self.enumeration(schema, values, desired_name),
            SchemaShape::Primitive(primitive) => {
                Resolution::of(scalar_type(primitive, schema.format.as_deref()))
            }
            SchemaShape::Array(items) => {
                let Some(items) = items else {
                    return Resolution::of(TypeRef::array(TypeRef::Any));
                };
                let item_position = match position {
                    Position::AllOfProperty => Position::AllOfProperty,
                    Position::Component | Position::Nested => Position::Nested,
                };
                let inner = self.resolve_at(items, &make_singular(desired_name), item_position);
                Resolution {
                    type_ref: TypeRef::array(inner.type_ref),
                    declarations: inner.declarations,
                }
            }
            SchemaShape::Object => self.object(schema, desired_name),
            SchemaShape::OneOf(branches) => self.sum_type(schema, branches, desired_name),
            SchemaShape::AnyOf(_) => {
                self.diagnostics.push(
                    DiagnosticKind::UnsupportedAnyOf,
                    desired_name,
                    "anyOf is not supported, using an opaque type",
                );
                Resolution::of(TypeRef::Any)
            }
            SchemaShape::AllOf([single]) if position != Position::Component => {
                self.resolve_at(single, desired_name, position)
            }
            SchemaShape::AllOf(_) if position == Position::AllOfProperty => {
                self.diagnostics.push(
                    DiagnosticKind::NestedAllOf,
                    desired_name,
                    "allOf nested inside an allOf property is not supported, using an opaque type",
                );
                Resolution::of(TypeRef::Any)
            }
            SchemaShape::AllOf(branches) => self.merge_all_of(schema, branches, desired_name),
            SchemaShape::Unknown => {
                self.diagnostics.push(
                    DiagnosticKind::UnknownSchemaShape,
                    desired_name,
                    format!(
                        "unknown schema type {:?}, using an opaque type",
                        schema.primary_type()
                    ),
                );
                Resolution::of(TypeRef::Any)
            }
        }
    }

    /// Struct, or string-keyed map when the object only has additional properties
    fn object(&mut self, schema: &Schema, name: &str) -> Resolution {
        if !schema.has_properties() && schema.allows_additional_properties() {
            return self.free_form_map(schema, name);
        }

        if !self.claim(name, Some(schema)) {
            return Resolution::of(TypeRef::named(name));
        }

        let empty = BTreeMap::new();
        let properties = schema.properties.as_ref().unwrap_or(&empty);
        let (fields, nested) = self.struct_fields(
            properties.iter(),
            |key| schema.required.iter().any(|r| r == key),
            name,
            Position::Nested,
        );

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

    /// Fields for `properties`, in the order given, plus nested declarations
    ///
    /// Nested inline types are named after the parent and the property.
    pub(crate) fn struct_fields<'s>(
        &mut self,
        properties: impl Iterator<Item = (&'s String, &'s Schema)>,
        is_required: impl Fn(&str) -> bool,
        parent_name: &str,
        position: Position,
    ) -> (Vec<StructField>, Vec<Declaration>) {
        let mut fields = Vec::new();
        let mut declarations = Vec::new();

        for (key, property) in properties {
            let field_name = to_identifier(key);
            let nested_name = format!("{parent_name}{field_name}");
            let resolution = self.resolve_at(property, &nested_name, position);

            fields.push(StructField {
                name: field_name,
                type_ref: resolution.type_ref,
                optional: !is_required(key),
                serialization_key: key.clone(),
                documentation: documentation(property),
            });
            declarations.extend(resolution.declarations);
        }

        (fields, declarations)
    }

    /// Claim a declaration name; `false` means the caller must not emit it again
    pub(super) fn claim(&mut self, name: &str, origin: Option<&Schema>) -> bool {
        match self.registry.claim(name, origin) {
            Claim::Fresh => true,
            Claim::Existing => {
                debug!(name = %name, "Reusing existing declaration");
                false
            }
            Claim::Collision => {
                self.diagnostics.push(
                    DiagnosticKind::NameCollision,
                    name,
                    "a different schema already declared this name, keeping the first one",
                );
                false
            }
        }
    }

    pub(super) fn finish(&mut self, declaration: Declaration) -> Declaration {
        self.registry.record(&declaration);
        declaration
    }
}

/// Deduplicates by field name (first occurrence wins) and sorts by name
pub(crate) fn sorted_fields(fields: Vec<StructField>) -> Vec<StructField> {
    let mut fields = unique_by(fields, |f| f.name.clone());
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

pub(crate) fn documentation(schema: &Schema) -> Option<String> {
    schema
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
