//! Builds the complete [`ApiModel`] for a document in one forward pass
//!
//! Component schemas are resolved first, then every operation is mapped, and
//! finally declarations are distributed over the tag groupings.

use crate::generation::context::GenerationConfig;
use crate::generation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::generation::errors::GenerationError;
use crate::generation::operations::{MappedOperation, OperationMapper};
use crate::generation::resolver::SchemaResolver;
use crate::generation::types::{
    ApiModel, Declaration, Grouping, Method, TypeDeclaration, TypeRef, TypeRepr,
};
use crate::generation::utils::to_proper_case;
use crate::infrastructure::openapi::{
    ApiDocument, Operation, PathItem, RESPONSE_REF_PREFIX, RefOr, SCHEMA_REF_PREFIX, Schema,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Grouping used for operations without tags
pub const DEFAULT_TAG: &str = "default";

/// Model plus everything that degraded while building it
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub model: ApiModel,
    pub diagnostics: Diagnostics,
}

/// Operations and declarations collected for one tag
#[derive(Default)]
struct TagBucket {
    methods: Vec<Method>,
    body_types: Vec<Declaration>,
    param_types: Vec<Declaration>,
    response_types: Vec<Declaration>,
    /// Component schemas reached from the tag's operations
    schemas: BTreeSet<String>,
    /// Component responses used by the tag's operations, first use first
    responses: Vec<String>,
}

pub struct ModelBuilder<'a> {
    document: &'a ApiDocument,
    config: &'a GenerationConfig,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(document: &'a ApiDocument, config: &'a GenerationConfig) -> Self {
        Self { document, config }
    }

    pub fn build(&self) -> Result<GenerationOutput, GenerationError> {
        let document = self.document;
        let mut resolver = SchemaResolver::new(document);

        let helpers = date_time_helpers(&mut resolver);

        let mut components: BTreeMap<&str, Vec<Declaration>> = BTreeMap::new();
        for (name, schema) in &document.components.schemas {
            components.insert(name.as_str(), resolver.declare_component(name, schema));
        }

        let mut buckets: BTreeMap<String, TagBucket> = BTreeMap::new();
        let mut error_types: HashSet<String> = HashSet::new();
        for (path, item) in &document.paths {
            if let Some(reference) = &item.reference {
                resolver.diagnostics_mut().push(
                    DiagnosticKind::UnresolvedPath,
                    path,
                    format!("path item reference {reference} is not followed, skipping the path"),
                );
                continue;
            }

            for (http_method, operation) in item.operations() {
                let tag = operation
                    .tags
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TAG.to_string());
                let mapped = OperationMapper::new(&mut resolver).map(
                    http_method,
                    path,
                    operation,
                    &item.parameters,
                )?;

                let bucket = buckets.entry(tag).or_default();
                bucket
                    .schemas
                    .extend(operation_schema_refs(document, operation, item));
                error_types.extend(mapped.error_types.iter().cloned());
                absorb(bucket, mapped);
            }
        }

        let mut claimed_schemas: HashSet<&str> = HashSet::new();
        let mut claimed_responses: HashSet<String> = HashSet::new();
        let mut groupings = Vec::with_capacity(buckets.len());
        for (tag, bucket) in buckets {
            let mut declarations = Vec::new();
            for (name, component) in &mut components {
                if bucket.schemas.contains(*name) && claimed_schemas.insert(*name) {
                    declarations.append(component);
                }
            }
            declarations.extend(bucket.body_types);
            declarations.extend(bucket.param_types);
            declarations.extend(bucket.response_types);
            for name in &bucket.responses {
                if !claimed_responses.insert(name.clone()) {
                    continue;
                }
                if let Some(response) = document.components.responses.get(name) {
                    declarations
                        .extend(OperationMapper::new(&mut resolver).declare_response_component(name, response));
                }
            }

            let description = document
                .tags
                .iter()
                .find(|t| t.name == tag)
                .and_then(|t| t.description.clone());
            tracing::debug!(
                tag = %tag,
                declarations = declarations.len(),
                methods = bucket.methods.len(),
                "Built grouping"
            );
            groupings.push(Grouping {
                name: to_proper_case(&tag),
                tag,
                description,
                declarations,
                methods: bucket.methods,
            });
        }
        groupings.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.tag.cmp(&b.tag)));

        let mut shared = helpers;
        for (_, component) in components {
            shared.extend(component);
        }
        for (name, response) in &document.components.responses {
            if !claimed_responses.contains(name) {
                shared.extend(OperationMapper::new(&mut resolver).declare_response_component(name, response));
            }
        }

        mark_errors(&mut groupings, &mut shared, error_types);

        let grouping_names = groupings.iter().map(|g| g.name.clone()).collect();
        let diagnostics = resolver.into_diagnostics();
        tracing::info!(
            groupings = groupings.len(),
            shared = shared.len(),
            diagnostics = diagnostics.len(),
            "Built API model"
        );

        Ok(GenerationOutput {
            model: ApiModel {
                package: self.config.package_name.clone(),
                service: self.config.service_name.clone(),
                title: document.info.title.clone(),
                version: document.info.version.clone(),
                description: document.info.description.clone(),
                groupings,
                shared,
                grouping_names,
            },
            diagnostics,
        })
    }
}

fn absorb(bucket: &mut TagBucket, mapped: MappedOperation) {
    bucket.methods.push(mapped.method);
    bucket.body_types.extend(mapped.body_types);
    bucket.param_types.extend(mapped.param_types);
    bucket.response_types.extend(mapped.response_types);
    for name in mapped.response_refs {
        if !bucket.responses.contains(&name) {
            bucket.responses.push(name);
        }
    }
}

/// `Date` and `Time` helper declarations shared by every grouping
fn date_time_helpers(resolver: &mut SchemaResolver<'_>) -> Vec<Declaration> {
    [
        ("Date", TypeRef::Date, "Date is a calendar date without time, encoded as YYYY-MM-DD."),
        ("Time", TypeRef::Time, "Time is a time of day without date, encoded as HH:MM:SS."),
    ]
    .into_iter()
    .filter_map(|(name, target, doc)| {
        let mut helper = TypeDeclaration::new(name, TypeRepr::Alias(target));
        helper.documentation = Some(doc.to_string());
        resolver.declare(Declaration::Type(helper))
    })
    .collect()
}

/// Flag declarations returned by error responses, following alias chains
fn mark_errors(groupings: &mut [Grouping], shared: &mut [Declaration], mut errors: HashSet<String>) {
    let aliases: BTreeMap<String, String> = groupings
        .iter()
        .flat_map(|g| g.declarations.iter())
        .chain(shared.iter())
        .filter_map(|declaration| match declaration {
            Declaration::Type(TypeDeclaration {
                name,
                repr: TypeRepr::Alias(TypeRef::Named(target)),
                ..
            }) => Some((name.clone(), target.clone())),
            _ => None,
        })
        .collect();

    let mut pending: Vec<String> = errors.iter().cloned().collect();
    while let Some(name) = pending.pop() {
        if let Some(target) = aliases.get(&name) {
            if errors.insert(target.clone()) {
                pending.push(target.clone());
            }
        }
    }

    let declarations = groupings
        .iter_mut()
        .flat_map(|g| g.declarations.iter_mut())
        .chain(shared.iter_mut());
    for declaration in declarations {
        if errors.contains(declaration.name()) {
            declaration.mark_error();
        }
    }
}

/// Component schema names reached, directly or transitively, by an operation
fn operation_schema_refs(
    document: &ApiDocument,
    operation: &Operation,
    item: &PathItem,
) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();

    for parameter in operation.parameters.iter().chain(&item.parameters) {
        if let Some(schema) = document
            .resolve_parameter(parameter)
            .and_then(|p| p.schema.as_ref())
        {
            collect_schema_refs(document, schema, &mut refs);
        }
    }

    if let Some(body) = operation
        .request_body
        .as_ref()
        .and_then(|body| document.resolve_request_body(body))
    {
        for schema in body.content.values().filter_map(|m| m.schema.as_ref()) {
            collect_schema_refs(document, schema, &mut refs);
        }
    }

    for response in operation.responses.values() {
        if let RefOr::Reference { reference } = response {
            if !reference.starts_with(RESPONSE_REF_PREFIX) {
                continue;
            }
        }
        if let Some(response) = document.resolve_response(response) {
            for schema in response.content.values().filter_map(|m| m.schema.as_ref()) {
                collect_schema_refs(document, schema, &mut refs);
            }
        }
    }

    refs
}

fn collect_schema_refs(document: &ApiDocument, schema: &Schema, refs: &mut BTreeSet<String>) {
    if let Some(reference) = &schema.reference {
        if let Some(name) = reference.strip_prefix(SCHEMA_REF_PREFIX) {
            if refs.insert(name.to_string()) {
                if let Some(target) = document.components.schemas.get(name) {
                    collect_schema_refs(document, target, refs);
                }
            }
        }
        return;
    }

    let children = schema
        .items
        .as_deref()
        .into_iter()
        .chain(schema.properties.iter().flat_map(|p| p.values()))
        .chain(schema.additional_properties_schema())
        .chain(schema.all_of.iter().flatten())
        .chain(schema.one_of.iter().flatten())
        .chain(schema.any_of.iter().flatten());
    for child in children {
        collect_schema_refs(document, child, refs);
    }
}
