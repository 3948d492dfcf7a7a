//! Go-specific context builder for code generation
//!
//! Everything target-specific lives here: Go type spelling, identifier
//! escaping, import sets and the statements the templates paste verbatim.
//! The templates themselves only lay out files.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

use crate::generation::{
    ApiModel, CastTarget, ContextBuilder, Declaration, EnumDeclaration, EnumLiteral,
    GenerationContext, GenerationError, Grouping, Method, QueryConversion,
    QueryEncoderDeclaration, RenderContext, Response, ScalarKind, StatusClass, StructField,
    SumTypeDeclaration, TypeDeclaration, TypeRef, TypeRepr, ValueFormat,
    sanitizers::{comment_lines, single_line},
    utils::{to_camel_case, to_snake_case},
};
use crate::infrastructure::openapi::HttpMethod;

/// Go keywords plus the identifiers generated method bodies rely on
const GO_RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "nil", "true", "false", "ctx", "resp",
    "err", "s", "e", "out", "body", "params", "context", "http", "url", "time", "json", "fmt",
    "pathParam", "decodeJSON",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// One generated Go source file
#[derive(Debug, Clone, Serialize)]
pub struct GoFile {
    pub file_name: String,
    pub imports: Vec<&'static str>,
    pub declarations: Vec<GoDeclaration>,
    pub service: Option<GoService>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoService {
    pub name: String,
    pub type_name: String,
    pub doc_lines: Vec<String>,
    pub methods: Vec<GoMethod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoDeclaration {
    Struct {
        name: String,
        doc_lines: Vec<String>,
        fields: Vec<GoField>,
        error: Option<GoError>,
    },
    /// Defined type over another type: scalars, slices, maps, raw bytes
    Alias {
        name: String,
        doc_lines: Vec<String>,
        target: String,
        error: Option<GoError>,
    },
    Enum {
        name: String,
        doc_lines: Vec<String>,
        base: String,
        constants: Vec<GoConstant>,
    },
    Sum {
        name: String,
        doc_lines: Vec<String>,
        variants: Vec<GoField>,
        decode_unimplemented: bool,
        error: Option<GoError>,
    },
    /// `Date`/`Time` wrappers around `time.Time`
    CalendarHelper {
        name: String,
        doc_lines: Vec<String>,
        layout: String,
    },
    QueryEncoder {
        type_name: String,
        statements: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GoField {
    pub name: String,
    pub go_type: String,
    pub tag: String,
    pub doc_lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoConstant {
    pub name: String,
    pub value: String,
}

/// How the `Error()` method reports the value
#[derive(Debug, Clone, Serialize)]
pub struct GoError {
    /// Fixed message for payload-less errors, as a Go string literal
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoMethod {
    pub name: String,
    pub doc_lines: Vec<String>,
    /// Arguments after `ctx context.Context`, each with a leading `, `
    pub arguments: String,
    pub result: String,
    /// Prefix of every return statement before the error value
    pub zero: String,
    pub http_method: &'static str,
    pub path_expr: String,
    pub query_arg: String,
    pub body_arg: String,
    pub cases: Vec<GoCase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoCase {
    pub label: String,
    pub lines: Vec<String>,
}

#[derive(Default)]
struct Imports(BTreeSet<&'static str>);

impl Imports {
    fn add(&mut self, path: &'static str) {
        self.0.insert(path);
    }

    /// Record what a spelled-out Go type needs
    fn scan(&mut self, go_type: &str) {
        if go_type.contains("time.Time") {
            self.add("time");
        }
    }

    fn into_vec(self) -> Vec<&'static str> {
        self.0.into_iter().collect()
    }
}

/// Go-specific context builder
pub struct GoContextBuilder;

impl GoContextBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextBuilder for GoContextBuilder {
    async fn build(
        &self,
        model: &ApiModel,
        context: &GenerationContext,
    ) -> Result<RenderContext, GenerationError> {
        if GO_KEYWORDS.contains(&model.package.as_str()) {
            return Err(GenerationError::ValidationError(format!(
                "Package name '{}' is a Go keyword",
                model.package
            )));
        }

        let mut render_context = RenderContext::new();

        render_context.add_variable("package", json!(model.package));
        render_context.add_variable("module", json!(context.module_path));
        render_context.add_variable("service", json!(model.service));
        render_context.add_variable("title", json!(single_line(&model.title)));
        render_context.add_variable("version", json!(model.version));
        render_context.add_variable(
            "doc_lines",
            json!(model.description.as_deref().map(comment_lines).unwrap_or_default()),
        );
        let base_url = context
            .document
            .servers
            .first()
            .map(|server| server.url.trim_end_matches('/').to_string())
            .unwrap_or_default();
        render_context.add_variable("base_url", json!(go_string(&base_url)));
        render_context.add_variable(
            "user_agent",
            json!(go_string(&format!("{}-go/{}", model.package, model.version))),
        );

        let services: Vec<_> = model
            .groupings
            .iter()
            .map(|grouping| json!({ "name": grouping.name, "type_name": service_type_name(grouping) }))
            .collect();
        render_context.add_variable("services", json!(services));

        let mut files = Vec::with_capacity(model.groupings.len());
        for grouping in &model.groupings {
            files.push(grouping_file(grouping, model));
        }
        tracing::debug!(
            files = files.len(),
            shared = model.shared.len(),
            "Go context builder created grouping files"
        );
        render_context.add_variable("groupings", serde_json::to_value(files)?);
        render_context.add_variable("shared", serde_json::to_value(shared_file(model))?);

        for (key, value) in &context.variables {
            if !render_context.has_variable(key) {
                render_context.add_variable(key, value.clone());
            }
        }

        Ok(render_context)
    }
}

fn service_type_name(grouping: &Grouping) -> String {
    format!("{}Service", grouping.name)
}

fn grouping_file(grouping: &Grouping, model: &ApiModel) -> GoFile {
    let mut imports = Imports::default();
    let declarations = grouping
        .declarations
        .iter()
        .map(|declaration| go_declaration(declaration, model, &mut imports))
        .collect();

    if !grouping.methods.is_empty() {
        imports.add("context");
        imports.add("net/http");
    }
    let methods = grouping
        .methods
        .iter()
        .map(|method| go_method(method, model, &mut imports))
        .collect();

    let mut doc_lines = vec![format!(
        "{} groups the operations tagged {}.",
        service_type_name(grouping),
        grouping.tag
    )];
    if let Some(description) = &grouping.description {
        doc_lines.push(String::new());
        doc_lines.extend(comment_lines(description));
    }

    GoFile {
        // `_api` keeps tags like `test` or `linux` clear of Go's file suffix rules
        file_name: format!("{}_api.go", to_snake_case(&grouping.name)),
        imports: imports.into_vec(),
        declarations,
        service: Some(GoService {
            name: grouping.name.clone(),
            type_name: service_type_name(grouping),
            doc_lines,
            methods,
        }),
    }
}

fn shared_file(model: &ApiModel) -> GoFile {
    let mut imports = Imports::default();
    let declarations = model
        .shared
        .iter()
        .map(|declaration| go_declaration(declaration, model, &mut imports))
        .collect();

    GoFile {
        file_name: "types.go".to_string(),
        imports: imports.into_vec(),
        declarations,
        service: None,
    }
}

/// Go spelling of a type reference
pub fn go_type(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Scalar(kind) => scalar_type(*kind).to_string(),
        TypeRef::Timestamp => "time.Time".to_string(),
        TypeRef::Date => "Date".to_string(),
        TypeRef::Time => "Time".to_string(),
        TypeRef::Named(name) => name.clone(),
        TypeRef::Array(item) => format!("[]{}", go_type(item)),
        TypeRef::Map(value) => format!("map[string]{}", go_type(value)),
        TypeRef::Any => "any".to_string(),
    }
}

fn scalar_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "string",
        ScalarKind::Integer => "int",
        ScalarKind::Int64 => "int64",
        ScalarKind::Float => "float64",
        ScalarKind::Boolean => "bool",
    }
}

/// Types whose zero value is already `nil`
fn is_nilable(type_ref: &TypeRef) -> bool {
    matches!(type_ref, TypeRef::Array(_) | TypeRef::Map(_) | TypeRef::Any)
}

fn optional_type(type_ref: &TypeRef, optional: bool) -> String {
    if optional && !is_nilable(type_ref) {
        format!("*{}", go_type(type_ref))
    } else {
        go_type(type_ref)
    }
}

/// Escape an argument name that would clash with Go syntax or generated code
///
/// # Examples
/// ```
/// use sdkgen::infrastructure::generation::context_builders::go::sanitize_go_identifier;
///
/// assert_eq!(sanitize_go_identifier("type"), "type_");
/// assert_eq!(sanitize_go_identifier("user_id"), "userId");
/// assert_eq!(sanitize_go_identifier("2fa"), "p2fa");
/// ```
pub fn sanitize_go_identifier(name: &str) -> String {
    let name = to_camel_case(name);
    let name = match name.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' => name,
        _ => format!("p{name}"),
    };
    if GO_RESERVED.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Go interpreted string literal
fn go_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn struct_tag(key: &str, optional: bool) -> String {
    let value = if optional {
        format!("{key},omitempty")
    } else {
        key.to_string()
    };
    if value.contains(['`', '"', '\\']) {
        go_string(&format!("json:{}", go_string(&value)))
    } else {
        format!("`json:\"{value}\"`")
    }
}

fn doc_lines(name: &str, documentation: Option<&str>) -> Vec<String> {
    match documentation {
        Some(doc) => {
            let mut lines = comment_lines(doc);
            if let Some(first) = lines.first_mut() {
                if !first.starts_with(name) {
                    *first = format!("{name} {}", lower_first(first));
                }
            }
            lines
        }
        None => Vec::new(),
    }
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if chars.clone().next().is_some_and(char::is_lowercase) => {
            first.to_lowercase().chain(chars).collect()
        }
        Some(first) => std::iter::once(first).chain(chars).collect(),
        None => String::new(),
    }
}

/// A field called `Error` would clash with the `Error()` method
fn field_name(name: &str, is_error: bool) -> String {
    if is_error && name == "Error" {
        "Error_".to_string()
    } else {
        name.to_string()
    }
}

fn go_error(is_error: bool, payloadless: bool, message: &str, imports: &mut Imports) -> Option<GoError> {
    if !is_error {
        return None;
    }
    if payloadless {
        return Some(GoError {
            message: Some(go_string(message)),
        });
    }
    imports.add("fmt");
    Some(GoError { message: None })
}

fn go_declaration(declaration: &Declaration, model: &ApiModel, imports: &mut Imports) -> GoDeclaration {
    match declaration {
        Declaration::Type(decl) => type_declaration(decl, imports),
        Declaration::Enum(decl) => enum_declaration(decl),
        Declaration::Sum(decl) => sum_declaration(decl, imports),
        Declaration::QueryEncoder(decl) => query_encoder(decl, model, imports),
    }
}

fn type_declaration(decl: &TypeDeclaration, imports: &mut Imports) -> GoDeclaration {
    let name = decl.name.clone();
    let docs = doc_lines(&decl.name, decl.documentation.as_deref());

    let target = match &decl.repr {
        TypeRepr::Alias(TypeRef::Date) if decl.name == "Date" => {
            return calendar_helper(name, docs, "2006-01-02", imports);
        }
        TypeRepr::Alias(TypeRef::Time) if decl.name == "Time" => {
            return calendar_helper(name, docs, "15:04:05", imports);
        }
        TypeRepr::Struct(fields) => {
            let fields: Vec<GoField> = fields
                .iter()
                .map(|field| struct_field(field, decl.is_error, imports))
                .collect();
            let message = decl.documentation.as_deref().unwrap_or(&decl.name);
            let error = go_error(decl.is_error, fields.is_empty(), message, imports);
            return GoDeclaration::Struct {
                name,
                doc_lines: docs,
                fields,
                error,
            };
        }
        TypeRepr::Alias(target) => go_type(target),
        TypeRepr::Map(value) => format!("map[string]{}", go_type(value)),
        TypeRepr::RawBytes => "[]byte".to_string(),
    };
    imports.scan(&target);

    GoDeclaration::Alias {
        error: go_error(decl.is_error, false, &decl.name, imports),
        name,
        doc_lines: docs,
        target,
    }
}

fn calendar_helper(
    name: String,
    doc_lines: Vec<String>,
    layout: &str,
    imports: &mut Imports,
) -> GoDeclaration {
    imports.add("encoding/json");
    imports.add("time");
    GoDeclaration::CalendarHelper {
        name,
        doc_lines,
        layout: layout.to_string(),
    }
}

fn struct_field(field: &StructField, is_error: bool, imports: &mut Imports) -> GoField {
    let go_type = optional_type(&field.type_ref, field.optional);
    imports.scan(&go_type);
    GoField {
        name: field_name(&field.name, is_error),
        go_type,
        tag: struct_tag(&field.serialization_key, field.optional),
        doc_lines: field
            .documentation
            .as_deref()
            .map(comment_lines)
            .unwrap_or_default(),
    }
}

fn enum_declaration(decl: &EnumDeclaration) -> GoDeclaration {
    let constants = decl
        .variants
        .iter()
        .map(|variant| GoConstant {
            name: variant.name.clone(),
            value: match &variant.value {
                EnumLiteral::String(text) => go_string(text),
                EnumLiteral::Integer(n) => n.to_string(),
                EnumLiteral::Float(x) => x.to_string(),
            },
        })
        .collect();

    GoDeclaration::Enum {
        name: decl.name.clone(),
        doc_lines: doc_lines(&decl.name, decl.documentation.as_deref()),
        base: scalar_type(decl.scalar).to_string(),
        constants,
    }
}

fn sum_declaration(decl: &SumTypeDeclaration, imports: &mut Imports) -> GoDeclaration {
    imports.add("encoding/json");
    if decl.decode_unimplemented {
        imports.add("errors");
    }

    let variants = decl
        .variants
        .iter()
        .map(|variant| {
            let go_type = optional_type(&variant.type_ref, true);
            imports.scan(&go_type);
            GoField {
                name: field_name(&variant.label, decl.is_error),
                go_type,
                tag: "`json:\"-\"`".to_string(),
                doc_lines: Vec::new(),
            }
        })
        .collect();

    GoDeclaration::Sum {
        error: go_error(decl.is_error, false, &decl.name, imports),
        name: decl.name.clone(),
        doc_lines: doc_lines(&decl.name, decl.documentation.as_deref()),
        variants,
        decode_unimplemented: decl.decode_unimplemented,
    }
}

fn query_encoder(
    decl: &QueryEncoderDeclaration,
    model: &ApiModel,
    imports: &mut Imports,
) -> GoDeclaration {
    imports.add("net/url");

    let fields: &[StructField] = match model.declaration(&decl.type_name) {
        Some(Declaration::Type(params)) => params.fields(),
        _ => &[],
    };

    let statements = decl
        .conversions
        .iter()
        .filter_map(|conversion| {
            let field = fields.iter().find(|f| f.name == conversion.field)?;
            Some(query_statement(conversion, field, imports))
        })
        .collect();

    GoDeclaration::QueryEncoder {
        type_name: decl.type_name.clone(),
        statements,
    }
}

fn query_statement(
    conversion: &QueryConversion,
    field: &StructField,
    imports: &mut Imports,
) -> String {
    let key = go_string(&conversion.key);
    let access = format!("p.{}", conversion.field);
    let element = &conversion.element;

    if conversion.repeated {
        let value = format_value(&conversion.format, element, "v", imports);
        if conversion.required || is_nilable(&field.type_ref) {
            return format!("for _, v := range {access} {{\n\t\tq.Add({key}, {value})\n\t}}");
        }
        // Optional named slices are held behind a pointer
        return format!(
            "if {access} != nil {{\n\t\tfor _, v := range *{access} {{\n\t\t\tq.Add({key}, {value})\n\t\t}}\n\t}}"
        );
    }
    if conversion.required {
        let value = format_value(&conversion.format, element, &access, imports);
        return format!("q.Set({key}, {value})");
    }

    let target = if is_nilable(&field.type_ref) {
        access.clone()
    } else {
        format!("*{access}")
    };
    let value = format_value(&conversion.format, element, &target, imports);
    format!("if {access} != nil {{\n\t\tq.Set({key}, {value})\n\t}}")
}

/// Go expression turning `value` into query text
fn format_value(
    format: &ValueFormat,
    element: &TypeRef,
    value: &str,
    imports: &mut Imports,
) -> String {
    // Method calls on a dereference need parentheses
    let receiver = if value.starts_with('*') {
        format!("({value})")
    } else {
        value.to_string()
    };

    match format {
        ValueFormat::Text if *element == TypeRef::Scalar(ScalarKind::String) => value.to_string(),
        ValueFormat::Text => sprint(value, imports),
        ValueFormat::Integer if *element == TypeRef::Scalar(ScalarKind::Int64) => {
            imports.add("strconv");
            format!("strconv.FormatInt({value}, 10)")
        }
        ValueFormat::Integer => {
            imports.add("strconv");
            format!("strconv.Itoa({value})")
        }
        ValueFormat::Float => {
            imports.add("strconv");
            format!("strconv.FormatFloat({value}, 'f', -1, 64)")
        }
        ValueFormat::Boolean => {
            imports.add("strconv");
            format!("strconv.FormatBool({value})")
        }
        ValueFormat::Timestamp => {
            imports.add("time");
            format!("{receiver}.Format(time.RFC3339)")
        }
        ValueFormat::Date | ValueFormat::Time => format!("{receiver}.String()"),
        // Defined types do not inherit methods, so convert before formatting
        ValueFormat::Cast(CastTarget::Timestamp) => {
            imports.add("time");
            format!("time.Time({value}).Format(time.RFC3339)")
        }
        ValueFormat::Cast(CastTarget::Date) => format!("Date({value}).String()"),
        ValueFormat::Cast(CastTarget::Time) => format!("Time({value}).String()"),
        ValueFormat::Cast(CastTarget::Scalar(kind)) => match kind {
            ScalarKind::String => format!("string({value})"),
            ScalarKind::Integer => {
                imports.add("strconv");
                format!("strconv.Itoa(int({value}))")
            }
            ScalarKind::Int64 => {
                imports.add("strconv");
                format!("strconv.FormatInt(int64({value}), 10)")
            }
            ScalarKind::Float => {
                imports.add("strconv");
                format!("strconv.FormatFloat(float64({value}), 'f', -1, 64)")
            }
            ScalarKind::Boolean => {
                imports.add("strconv");
                format!("strconv.FormatBool(bool({value}))")
            }
        },
    }
}

fn sprint(value: &str, imports: &mut Imports) -> String {
    imports.add("fmt");
    format!("fmt.Sprint({value})")
}

fn http_method_constant(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Delete => "http.MethodDelete",
        HttpMethod::Get => "http.MethodGet",
        HttpMethod::Head => "http.MethodHead",
        HttpMethod::Options => "http.MethodOptions",
        HttpMethod::Patch => "http.MethodPatch",
        HttpMethod::Post => "http.MethodPost",
        HttpMethod::Put => "http.MethodPut",
        HttpMethod::Trace => "http.MethodTrace",
    }
}

fn go_method(method: &Method, model: &ApiModel, imports: &mut Imports) -> GoMethod {
    let mut arguments = String::new();
    for param in &method.path_params {
        let go_type = go_type(&param.type_ref);
        imports.scan(&go_type);
        arguments.push_str(&format!(", {} {go_type}", sanitize_go_identifier(&param.name)));
    }

    let query_arg = match &method.query_params {
        Some(params) => {
            arguments.push_str(&format!(", params *{}", go_type(&params.type_ref)));
            "params.Values()".to_string()
        }
        None => "nil".to_string(),
    };

    let body_arg = match (&method.body, method.has_body) {
        (Some(body), _) => {
            arguments.push_str(&format!(", body {}", go_type(&body.type_ref)));
            "body".to_string()
        }
        (None, true) => {
            arguments.push_str(", body []byte");
            "body".to_string()
        }
        (None, false) => "nil".to_string(),
    };

    let (result, zero) = match &method.response_type {
        Some(type_ref) => {
            let go_type = go_type(type_ref);
            imports.scan(&go_type);
            (format!("(*{go_type}, error)"), "nil, ".to_string())
        }
        None => ("error".to_string(), String::new()),
    };

    let path_expr = path_expression(method);

    let mut doc = vec![format!(
        "{} calls {} {}.",
        method.name,
        method.http_method.as_str(),
        method.path.raw
    )];
    if let Some(documentation) = &method.documentation {
        doc.push(String::new());
        doc.extend(comment_lines(documentation));
    }
    if method.deprecated {
        doc.push(String::new());
        doc.push("Deprecated: the API marks this operation as deprecated.".to_string());
    }

    let primary = method.responses.iter().position(|response| {
        !response.is_default
            && (200..300).contains(&response.sort_key)
            && response.type_ref.is_some()
            && response.type_ref == method.response_type
    });
    let cases = method
        .responses
        .iter()
        .enumerate()
        .map(|(index, response)| GoCase {
            label: case_label(response),
            lines: case_lines(response, Some(index) == primary, &zero, model),
        })
        .collect();

    GoMethod {
        name: method.name.clone(),
        doc_lines: doc,
        arguments,
        result,
        zero,
        http_method: http_method_constant(method.http_method),
        path_expr,
        query_arg,
        body_arg,
        cases,
    }
}

fn path_expression(method: &Method) -> String {
    use crate::generation::PathPart;

    let parts: Vec<String> = method
        .path
        .parts
        .iter()
        .map(|part| match part {
            PathPart::Literal(text) => go_string(text),
            PathPart::Param(name) => format!("pathParam({})", sanitize_go_identifier(name)),
        })
        .collect();
    if parts.is_empty() {
        go_string("/")
    } else {
        parts.join(" + ")
    }
}

fn case_label(response: &Response) -> String {
    match response.status {
        StatusClass::Code(code) => format!("case resp.StatusCode == {code}:"),
        StatusClass::Range(start) => format!(
            "case resp.StatusCode >= {start} && resp.StatusCode < {}:",
            start + 100
        ),
        StatusClass::Default => "default:".to_string(),
    }
}

fn case_lines(response: &Response, primary: bool, zero: &str, model: &ApiModel) -> Vec<String> {
    let api_error = format!("return {zero}&APIError{{StatusCode: resp.StatusCode, Body: resp.Body}}");

    if primary {
        let go_type = response.type_ref.as_ref().map(go_type).unwrap_or_default();
        return vec![
            format!("var out {go_type}"),
            "if err := decodeJSON(resp.Body, &out); err != nil {".to_string(),
            format!("\treturn {zero}err"),
            "}".to_string(),
            "return &out, nil".to_string(),
        ];
    }

    if response.is_unexpected {
        return vec![
            "if resp.StatusCode >= 200 && resp.StatusCode < 300 {".to_string(),
            format!("\treturn {zero}nil"),
            "}".to_string(),
            api_error,
        ];
    }

    if !response.is_error {
        return vec![format!("return {zero}nil")];
    }

    let error_declaration = response
        .type_ref
        .as_ref()
        .and_then(TypeRef::declared_name)
        .and_then(|name| model.declaration(name))
        .filter(|declaration| declaration.is_error());
    let Some(declaration) = error_declaration else {
        return vec![api_error];
    };

    let name = declaration.name();
    match declaration {
        Declaration::Type(TypeDeclaration {
            repr: TypeRepr::Struct(fields),
            ..
        }) if fields.is_empty() => vec![format!("return {zero}&{name}{{}}")],
        Declaration::Type(TypeDeclaration {
            repr: TypeRepr::RawBytes,
            ..
        }) => vec![
            format!("e := {name}(resp.Body)"),
            format!("return {zero}&e"),
        ],
        _ => vec![
            format!("var e {name}"),
            "if err := decodeJSON(resp.Body, &e); err != nil {".to_string(),
            format!("\treturn {zero}err"),
            "}".to_string(),
            format!("return {zero}&e"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationConfig, ModelBuilder};
    use crate::infrastructure::openapi::ApiDocument;

    fn build(document: serde_json::Value) -> (ApiModel, GenerationContext) {
        let document: ApiDocument = serde_json::from_value(document).unwrap();
        let config = GenerationConfig {
            package_name: "petstore".to_string(),
            service_name: "Petstore".to_string(),
        };
        let model = ModelBuilder::new(&document, &config).build().unwrap().model;
        (model, GenerationContext::new(config, document, "example.com/petstore"))
    }

    fn petstore() -> serde_json::Value {
        json!({
            "openapi": "3.0.3",
            "info": { "title": "Petstore", "version": "1.0.0" },
            "servers": [{ "url": "https://api.example.com/v1/" }],
            "paths": {
                "/pets/{petId}": {
                    "get": {
                        "operationId": "getPet",
                        "tags": ["pets"],
                        "parameters": [
                            { "name": "petId", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" } },
                            { "name": "fields", "in": "query", "schema": { "type": "array", "items": { "type": "string" } } },
                            { "name": "since", "in": "query", "schema": { "type": "string", "format": "date-time" } },
                            { "name": "status", "in": "query", "required": true, "schema": { "$ref": "#/components/schemas/Status" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                            },
                            "404": { "description": "missing" },
                            "default": {
                                "description": "error",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Problem" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "required": ["id"],
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "born": { "type": "string", "format": "date" }
                        }
                    },
                    "Problem": {
                        "type": "object",
                        "properties": { "error": { "type": "string" } }
                    },
                    "Status": { "type": "string", "enum": ["available", "sold"] }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_petstore_context() {
        let (model, context) = build(petstore());
        let render_context = GoContextBuilder::new().build(&model, &context).await.unwrap();
        let data = &render_context.data;

        assert_eq!(data["package"], "petstore");
        assert_eq!(data["base_url"], "\"https://api.example.com/v1\"");
        assert_eq!(data["services"][0]["type_name"], "PetsService");

        let file = &data["groupings"][0];
        assert_eq!(file["file_name"], "pets_api.go");
        assert_eq!(
            file["imports"],
            json!(["context", "fmt", "net/http", "net/url", "time"])
        );

        let method = &file["service"]["methods"][0];
        assert_eq!(method["name"], "GetPet");
        assert_eq!(method["arguments"], ", petId int64, params *GetPetParams");
        assert_eq!(method["result"], "(*Pet, error)");
        assert_eq!(method["path_expr"], "\"/pets/\" + pathParam(petId)");
        assert_eq!(method["query_arg"], "params.Values()");
        assert_eq!(method["body_arg"], "nil");

        let labels: Vec<_> = method["cases"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["label"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["case resp.StatusCode == 200:", "case resp.StatusCode == 404:", "default:"]
        );
        assert_eq!(
            method["cases"][1]["lines"][0],
            "return nil, &APIError{StatusCode: resp.StatusCode, Body: resp.Body}"
        );
        assert_eq!(method["cases"][2]["lines"][0], "var e Problem");
    }

    #[tokio::test]
    async fn test_declarations() {
        let (model, context) = build(petstore());
        let render_context = GoContextBuilder::new().build(&model, &context).await.unwrap();
        let declarations = render_context.data["groupings"][0]["declarations"]
            .as_array()
            .unwrap()
            .clone();

        let pet = declarations.iter().find(|d| d["name"] == "Pet").unwrap();
        assert_eq!(pet["kind"], "struct");
        assert_eq!(pet["fields"][0]["name"], "Born");
        assert_eq!(pet["fields"][0]["go_type"], "*Date");
        assert_eq!(pet["fields"][0]["tag"], "`json:\"born,omitempty\"`");
        assert_eq!(pet["fields"][1]["go_type"], "int64");
        assert!(pet["error"].is_null());

        let problem = declarations.iter().find(|d| d["name"] == "Problem").unwrap();
        assert_eq!(problem["fields"][0]["name"], "Error_");
        assert!(problem["error"]["message"].is_null());

        let status = declarations.iter().find(|d| d["name"] == "Status").unwrap();
        assert_eq!(status["kind"], "enum");
        assert_eq!(status["constants"][0]["name"], "StatusAvailable");
        assert_eq!(status["constants"][0]["value"], "\"available\"");

        let encoder = declarations
            .iter()
            .find(|d| d["kind"] == "query_encoder")
            .unwrap();
        assert_eq!(
            encoder["statements"],
            json!([
                "for _, v := range p.Fields {\n\t\tq.Add(\"fields\", v)\n\t}",
                "if p.Since != nil {\n\t\tq.Set(\"since\", (*p.Since).Format(time.RFC3339))\n\t}",
                "q.Set(\"status\", string(p.Status))"
            ])
        );

        let shared = render_context.data["shared"]["declarations"].as_array().unwrap();
        assert_eq!(shared[0]["kind"], "calendar_helper");
        assert_eq!(shared[0]["layout"], "2006-01-02");
        assert_eq!(
            render_context.data["shared"]["imports"],
            json!(["encoding/json", "time"])
        );
    }

    #[tokio::test]
    async fn test_aliased_query_parameters() {
        let (model, context) = build(json!({
            "openapi": "3.0.3",
            "info": { "title": "Events", "version": "1.0.0" },
            "paths": {
                "/events": {
                    "get": {
                        "operationId": "listEvents",
                        "tags": ["events"],
                        "parameters": [
                            { "name": "since", "in": "query", "required": true, "schema": { "$ref": "#/components/schemas/Since" } },
                            { "name": "tags", "in": "query", "schema": { "$ref": "#/components/schemas/Tags" } },
                            { "name": "day", "in": "query", "schema": { "$ref": "#/components/schemas/Day" } }
                        ],
                        "responses": { "204": { "description": "none" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Since": { "type": "string", "format": "date-time" },
                    "Tags": { "type": "array", "items": { "type": "string" } },
                    "Day": { "type": "string", "format": "date" }
                }
            }
        }));
        let render_context = GoContextBuilder::new().build(&model, &context).await.unwrap();
        let file = &render_context.data["groupings"][0];
        let encoder = file["declarations"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["kind"] == "query_encoder")
            .unwrap();

        assert_eq!(
            encoder["statements"],
            json!([
                "if p.Day != nil {\n\t\tq.Set(\"day\", Date(*p.Day).String())\n\t}",
                "q.Set(\"since\", time.Time(p.Since).Format(time.RFC3339))",
                "if p.Tags != nil {\n\t\tfor _, v := range *p.Tags {\n\t\t\tq.Add(\"tags\", v)\n\t\t}\n\t}"
            ])
        );
        assert!(file["imports"].as_array().unwrap().contains(&json!("time")));
    }

    #[tokio::test]
    async fn test_keyword_package_is_rejected() {
        let (mut model, context) = build(petstore());
        model.package = "type".to_string();
        let result = GoContextBuilder::new().build(&model, &context).await;
        assert!(matches!(result, Err(GenerationError::ValidationError(_))));
    }

    #[test]
    fn test_sanitize_go_identifier() {
        assert_eq!(sanitize_go_identifier("type"), "type_");
        assert_eq!(sanitize_go_identifier("ctx"), "ctx_");
        assert_eq!(sanitize_go_identifier("petId"), "petId");
    }

    #[test]
    fn test_go_types() {
        assert_eq!(go_type(&TypeRef::map(TypeRef::array(TypeRef::Timestamp))), "map[string][]time.Time");
        assert_eq!(optional_type(&TypeRef::named("Pet"), true), "*Pet");
        assert_eq!(optional_type(&TypeRef::array(TypeRef::string()), true), "[]string");
        assert_eq!(go_string("a \"b\"\n"), "\"a \\\"b\\\"\\n\"");
        assert_eq!(struct_tag("x\"y", false), "\"json:\\\"x\\\\\\\"y\\\"\"");
    }
}
