//! Mapping of path operations to client methods

use crate::generation::diagnostics::DiagnosticKind;
use crate::generation::errors::GenerationError;
use crate::generation::query::query_encoder;
use crate::generation::resolver::{Resolution, SchemaResolver, sorted_fields};
use crate::generation::type_mapper::{TypeMapper, reference_type};
use crate::generation::types::{
    Declaration, Method, Parameter, PathPart, PathTemplate, Response, StatusClass, StructField,
    TypeDeclaration, TypeRef, TypeRepr,
};
use crate::generation::utils::{to_camel_case, to_identifier, to_proper_case, to_snake_case};
use crate::infrastructure::openapi::{
    self, HttpMethod, JSON_MEDIA_TYPE, Operation, ParameterLocation, RefOr, Schema, SchemaShape,
    ref_name,
};
use once_cell::sync::Lazy;
use regex::Regex;

static PATH_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("path parameter pattern is valid"));

/// Vendor extension carrying generator overrides
const CODEGEN_EXTENSION: &str = "x-codegen";

/// A mapped operation together with the declarations it introduced
#[derive(Debug, Clone)]
pub struct MappedOperation {
    pub method: Method,
    pub body_types: Vec<Declaration>,
    pub param_types: Vec<Declaration>,
    /// Declarations for inline response schemas
    pub response_types: Vec<Declaration>,
    /// Names of `#/components/responses` entries the operation uses
    pub response_refs: Vec<String>,
    /// Declarations returned by error responses
    pub error_types: Vec<String>,
}

/// Response entry while mapping, before the primary success scan
struct MappedResponse {
    response: Response,
    has_json: bool,
}

/// Converts operations into [`Method`]s using the shared resolver
pub struct OperationMapper<'r, 'a> {
    resolver: &'r mut SchemaResolver<'a>,
}

impl<'r, 'a> OperationMapper<'r, 'a> {
    pub fn new(resolver: &'r mut SchemaResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Map one operation
    ///
    /// `path_parameters` are the parameters declared on the path item; the
    /// operation's own parameters override them by name and location.
    pub fn map(
        &mut self,
        http_method: HttpMethod,
        path: &str,
        operation: &Operation,
        path_parameters: &[RefOr<openapi::Parameter>],
    ) -> Result<MappedOperation, GenerationError> {
        let operation_id = operation
            .operation_id
            .clone()
            .unwrap_or_else(|| synthesize_operation_id(http_method, path));
        let operation_name = to_proper_case(&operation_id);
        let method_name = method_name_override(operation).unwrap_or_else(|| operation_name.clone());

        let parameters = self.merge_parameters(&operation_id, &operation.parameters, path_parameters);
        let template = path_template(path);
        let path_params = self.path_params(&operation_id, &template, &parameters);

        let (param_types, query_params) = self.query_params(&operation_id, &operation_name, &parameters);
        let (body_types, body) = self.request_body(&operation_name, operation);

        let mut response_types = Vec::new();
        let mut response_refs = Vec::new();
        let mut mapped = Vec::with_capacity(operation.responses.len() + 1);
        for (code, response) in &operation.responses {
            let (entry, declarations) =
                self.response(&operation_id, &operation_name, code, response, &mut response_refs)?;
            mapped.push(entry);
            response_types.extend(declarations);
        }

        mapped.sort_by_key(|entry| (entry.response.is_default, entry.response.sort_key));
        if !mapped.iter().any(|entry| entry.response.is_default) {
            mapped.push(MappedResponse {
                response: Response {
                    status: StatusClass::Default,
                    sort_key: 0,
                    is_error: false,
                    is_default: true,
                    is_unexpected: true,
                    type_ref: None,
                    description: String::new(),
                },
                has_json: false,
            });
        }

        let response_type = mapped
            .iter()
            .find(|entry| {
                !entry.response.is_default
                    && (200..300).contains(&entry.response.sort_key)
                    && entry.has_json
            })
            .and_then(|entry| entry.response.type_ref.clone());

        let responses: Vec<Response> = mapped.into_iter().map(|entry| entry.response).collect();
        let error_types = responses
            .iter()
            .filter(|r| r.is_error)
            .filter_map(|r| r.type_ref.as_ref()?.declared_name().map(str::to_string))
            .collect();

        tracing::debug!(
            id = %operation_id,
            method_name = %method_name,
            response_type = ?response_type.as_ref().map(ToString::to_string),
            "Mapped operation"
        );

        Ok(MappedOperation {
            method: Method {
                operation_id,
                name: method_name,
                http_method,
                path: template,
                path_params,
                query_params,
                body,
                has_body: operation.request_body.is_some(),
                response_type,
                responses,
                documentation: operation_documentation(operation),
                deprecated: operation.deprecated,
            },
            body_types,
            param_types,
            response_types,
            response_refs,
            error_types,
        })
    }

    /// Declarations for a `#/components/responses` entry, named `{Name}Response`
    pub fn declare_response_component(
        &mut self,
        name: &str,
        response: &openapi::Response,
    ) -> Vec<Declaration> {
        let type_name = response_component_type_name(name);
        let documentation = response
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        match response.json_schema() {
            Some(schema) => self.declare_named(&type_name, schema),
            None => {
                let repr = if response.content.is_empty() {
                    TypeRepr::Struct(Vec::new())
                } else {
                    TypeRepr::RawBytes
                };
                let mut declaration = TypeDeclaration::new(&type_name, repr);
                declaration.documentation = documentation;
                self.resolver
                    .declare(Declaration::Type(declaration))
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Operation parameters first, then path-level ones not overridden
    fn merge_parameters(
        &mut self,
        operation_id: &str,
        operation_parameters: &[RefOr<openapi::Parameter>],
        path_parameters: &[RefOr<openapi::Parameter>],
    ) -> Vec<openapi::Parameter> {
        let document = self.resolver.document();
        let mut merged: Vec<openapi::Parameter> = Vec::new();

        for parameter in operation_parameters.iter().chain(path_parameters) {
            let Some(resolved) = document.resolve_parameter(parameter) else {
                let reference = match parameter {
                    RefOr::Reference { reference } => reference.as_str(),
                    RefOr::Item(parameter) => parameter.name.as_str(),
                };
                self.resolver.diagnostics_mut().push(
                    DiagnosticKind::UnresolvedParameter,
                    operation_id,
                    format!("parameter {reference} does not resolve, skipping it"),
                );
                continue;
            };
            let overridden = merged
                .iter()
                .any(|p| p.name == resolved.name && p.location == resolved.location);
            if !overridden {
                merged.push(resolved.clone());
            }
        }

        merged
    }

    /// Positional arguments in placeholder order
    fn path_params(
        &mut self,
        operation_id: &str,
        template: &PathTemplate,
        parameters: &[openapi::Parameter],
    ) -> Vec<Parameter> {
        let mapper = TypeMapper::new(self.resolver.document());
        let mut params: Vec<Parameter> = Vec::new();

        for placeholder in PATH_PARAM_RE.captures_iter(&template.raw) {
            let raw_name = &placeholder[1];
            let name = to_camel_case(raw_name);
            if params.iter().any(|p| p.name == name) {
                continue;
            }

            let declared = parameters
                .iter()
                .find(|p| p.location == ParameterLocation::Path && p.name == raw_name);
            let type_ref = match declared {
                Some(parameter) => match &parameter.schema {
                    Some(schema) => mapper.map(schema, &name, self.resolver.diagnostics_mut()),
                    None => TypeRef::string(),
                },
                None => {
                    self.resolver.diagnostics_mut().push(
                        DiagnosticKind::MissingPathParameter,
                        operation_id,
                        format!("path placeholder {{{raw_name}}} has no parameter, typing it as string"),
                    );
                    TypeRef::string()
                }
            };
            params.push(Parameter { name, type_ref });
        }

        params
    }

    /// `{Operation}Params` struct and its query encoder
    fn query_params(
        &mut self,
        operation_id: &str,
        operation_name: &str,
        parameters: &[openapi::Parameter],
    ) -> (Vec<Declaration>, Option<Parameter>) {
        let mapper = TypeMapper::new(self.resolver.document());
        let mut fields = Vec::new();

        for parameter in parameters {
            match parameter.location {
                ParameterLocation::Path => {}
                ParameterLocation::Query => {
                    let field_name = to_identifier(&parameter.name);
                    let type_ref = match &parameter.schema {
                        Some(schema) => mapper.map(
                            schema,
                            &format!("{operation_name}Params.{field_name}"),
                            self.resolver.diagnostics_mut(),
                        ),
                        None => TypeRef::string(),
                    };
                    fields.push(StructField {
                        name: field_name,
                        type_ref,
                        optional: !parameter.required,
                        serialization_key: parameter.name.clone(),
                        documentation: parameter
                            .description
                            .as_deref()
                            .map(str::trim)
                            .filter(|d| !d.is_empty())
                            .map(str::to_string),
                    });
                }
                ParameterLocation::Header | ParameterLocation::Cookie => {
                    self.resolver.diagnostics_mut().push(
                        DiagnosticKind::UnsupportedParameterLocation,
                        operation_id,
                        format!(
                            "{} parameter {} is not supported, skipping it",
                            parameter.location, parameter.name
                        ),
                    );
                }
            }
        }

        if fields.is_empty() {
            return (Vec::new(), None);
        }

        let type_name = format!("{operation_name}Params");
        let fields = sorted_fields(fields);
        let encoder = query_encoder(&type_name, &fields, self.resolver.registry());

        let mut params = TypeDeclaration::new(&type_name, TypeRepr::Struct(fields));
        params.documentation = Some(format!("Query parameters for {operation_name}."));

        let mut declarations: Vec<Declaration> = self
            .resolver
            .declare(Declaration::Type(params))
            .into_iter()
            .collect();
        if !declarations.is_empty() {
            declarations.push(Declaration::QueryEncoder(encoder));
        }

        (
            declarations,
            Some(Parameter {
                name: "params".to_string(),
                type_ref: TypeRef::named(type_name),
            }),
        )
    }

    /// `{Operation}Body` for JSON request bodies
    fn request_body(
        &mut self,
        operation_name: &str,
        operation: &Operation,
    ) -> (Vec<Declaration>, Option<Parameter>) {
        let document = self.resolver.document();
        let schema = operation
            .request_body
            .as_ref()
            .and_then(|body| document.resolve_request_body(body))
            .and_then(|body| body.content.get(JSON_MEDIA_TYPE))
            .and_then(|media| media.schema.as_ref());
        let Some(schema) = schema else {
            return (Vec::new(), None);
        };

        let type_name = format!("{operation_name}Body");
        let declarations = self.declare_named(&type_name, schema);
        (
            declarations,
            Some(Parameter {
                name: "body".to_string(),
                type_ref: TypeRef::named(type_name),
            }),
        )
    }

    fn response(
        &mut self,
        operation_id: &str,
        operation_name: &str,
        code: &str,
        response: &RefOr<openapi::Response>,
        response_refs: &mut Vec<String>,
    ) -> Result<(MappedResponse, Vec<Declaration>), GenerationError> {
        let status = parse_status(code).ok_or_else(|| GenerationError::InvalidStatusCode {
            operation: operation_id.to_string(),
            code: code.to_string(),
        })?;
        let sort_key = match status {
            StatusClass::Code(n) | StatusClass::Range(n) => n,
            StatusClass::Default => 0,
        };

        let document = self.resolver.document();
        let resolved = document.resolve_response(response);
        let json_schema = resolved.and_then(openapi::Response::json_schema);

        let mut declarations = Vec::new();
        let type_ref = match response {
            RefOr::Reference { reference } => {
                let name = ref_name(reference).to_string();
                let type_name = response_component_type_name(&name);
                if !response_refs.contains(&name) {
                    response_refs.push(name);
                }
                Some(TypeRef::named(type_name))
            }
            RefOr::Item(_) => match json_schema {
                None => None,
                Some(schema) => match schema.shape() {
                    SchemaShape::Reference(reference) => Some(reference_type(document, reference)),
                    _ => {
                        let type_name = response_type_name(operation_name, code, schema);
                        declarations = self.declare_named(&type_name, schema);
                        Some(TypeRef::named(type_name))
                    }
                },
            },
        };

        let description = resolved
            .and_then(|r| r.description.as_deref())
            .map(str::trim)
            .unwrap_or(code)
            .to_string();

        Ok((
            MappedResponse {
                response: Response {
                    status,
                    sort_key,
                    is_error: !code.starts_with('2'),
                    is_default: status == StatusClass::Default,
                    is_unexpected: false,
                    type_ref,
                    description,
                },
                has_json: json_schema.is_some(),
            },
            declarations,
        ))
    }

    /// Declare `name` for `schema`, aliasing when the schema resolves to another type
    fn declare_named(&mut self, name: &str, schema: &Schema) -> Vec<Declaration> {
        let resolution = match schema.shape() {
            SchemaShape::Reference(reference) => {
                Resolution::of(reference_type(self.resolver.document(), reference))
            }
            SchemaShape::Enum(_)
            | SchemaShape::Object
            | SchemaShape::OneOf(_)
            | SchemaShape::AllOf(_) => self.resolver.resolve(schema, name),
            SchemaShape::Primitive(_)
            | SchemaShape::Array(_)
            | SchemaShape::AnyOf(_)
            | SchemaShape::Unknown => self.resolver.resolve(schema, &format!("{name}Items")),
        };

        if resolution.type_ref == TypeRef::named(name) {
            return resolution.declarations;
        }

        let documentation = crate::generation::resolver::documentation(schema);
        let mut declarations: Vec<Declaration> = self
            .resolver
            .declare_alias(name, resolution.type_ref, documentation)
            .into_iter()
            .collect();
        declarations.extend(resolution.declarations);
        declarations
    }
}

/// Split a raw path into literal text and positional markers
pub fn path_template(path: &str) -> PathTemplate {
    let mut parts = Vec::new();
    let mut last = 0;

    for placeholder in PATH_PARAM_RE.captures_iter(path) {
        let (Some(whole), Some(name)) = (placeholder.get(0), placeholder.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(PathPart::Literal(path[last..whole.start()].to_string()));
        }
        parts.push(PathPart::Param(to_camel_case(name.as_str())));
        last = whole.end();
    }
    if last < path.len() {
        parts.push(PathPart::Literal(path[last..].to_string()));
    }

    PathTemplate {
        raw: path.to_string(),
        parts,
    }
}

/// Parse a response key: `200`, `4XX` (case-insensitive) or `default`
pub fn parse_status(code: &str) -> Option<StatusClass> {
    if code == "default" {
        return Some(StatusClass::Default);
    }
    let upper = code.to_ascii_uppercase();
    if let Some(prefix) = upper.strip_suffix("XX") {
        let digit: u16 = prefix.parse().ok().filter(|d| (1..=5).contains(d))?;
        return (prefix.len() == 1).then_some(StatusClass::Range(digit * 100));
    }
    let value: u16 = code.parse().ok()?;
    (100..600).contains(&value).then_some(StatusClass::Code(value))
}

/// `get /users/{userId}` -> `get_users_user_id`
pub fn synthesize_operation_id(method: HttpMethod, path: &str) -> String {
    to_snake_case(&format!("{} {}", method.as_str().to_lowercase(), path))
}

/// Name from `x-codegen.method_name`, if present
fn method_name_override(operation: &Operation) -> Option<String> {
    operation
        .extension(CODEGEN_EXTENSION)?
        .get("method_name")?
        .as_str()
        .map(to_proper_case)
        .filter(|name| !name.is_empty())
}

fn response_component_type_name(name: &str) -> String {
    format!("{}Response", to_proper_case(name))
}

/// `{Operation}{Title}Response`, or `{Operation}{Code}Response` without a title
fn response_type_name(operation_name: &str, code: &str, schema: &Schema) -> String {
    match schema.title.as_deref().map(to_proper_case).filter(|t| !t.is_empty()) {
        Some(title) => format!("{operation_name}{title}Response"),
        None if code == "default" => format!("{operation_name}DefaultResponse"),
        None => format!("{operation_name}{}Response", code.to_ascii_uppercase()),
    }
}

fn operation_documentation(operation: &Operation) -> Option<String> {
    let parts: Vec<&str> = [operation.summary.as_deref(), operation.description.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}
