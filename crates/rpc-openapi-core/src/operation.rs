//! Per-procedure OpenAPI operation building.
//!
//! Mapping rules:
//!
//! | Procedure kind            | Method | Input carried as                                  |
//! |---------------------------|--------|---------------------------------------------------|
//! | `query`                   | GET    | query parameter `input`, JSON-encoded content     |
//! | `mutation`, `subscription`| POST   | `application/json` request body                   |
//!
//! The `200` response wraps the output in the RPC wire envelope
//! `{ result: { data: <output> } }`.

use serde_json::{Map, Value};

use crate::descriptor::{Dialect, TypeDescriptor};
use crate::document::{
    json_content, Method, Operation, Parameter, ParameterLocation, RequestBody, Response,
};
use crate::error::ConvertError;
use crate::input::reconcile_inputs;
use crate::json_schema::SchemaBackend;
use crate::router::{ProcedureDef, ProcedureKind};

/// Metadata keys copied from a procedure's `meta` onto its operation.
pub const ALLOWED_META_KEYS: [&str; 5] =
    ["tags", "summary", "description", "externalDocs", "deprecated"];

/// Name of the query parameter that carries a query's input.
pub const INPUT_PARAMETER: &str = "input";

/// Status code of the single documented response.
pub const SUCCESS_STATUS: &str = "200";

pub fn method_for(kind: ProcedureKind) -> Method {
    match kind {
        ProcedureKind::Query => Method::Get,
        ProcedureKind::Mutation | ProcedureKind::Subscription => Method::Post,
    }
}

/// `"/" + prefix segments + dotted name`, with empty prefix segments dropped.
pub fn operation_path(prefix: &str, name: &str) -> String {
    let mut path = String::new();
    for segment in prefix.split('/').filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }
    path.push('/');
    path.push_str(name);
    path
}

/// `[first segment]` for nested names, nothing for top-level procedures.
pub fn default_tags(name: &str) -> Vec<String> {
    match name.split_once('.') {
        Some((group, _)) => vec![group.to_string()],
        None => Vec::new(),
    }
}

/// JavaScript truthiness, which is what procedure metadata was written against.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Build the base operation for one procedure.
pub fn build_operation(
    name: &str,
    def: &ProcedureDef,
    backend: &SchemaBackend,
) -> Result<(Method, Operation), ConvertError> {
    let slot = format!("{name}.input");
    let input = reconcile_inputs(name, &def.inputs)?;
    let Some(input_kind) = input.classify() else {
        return Err(ConvertError::InvalidSchema {
            path: format!("{slot}#"),
            flags: input.shape_flags(),
        });
    };
    let input_required = !def.inputs.is_empty() && !input_kind.accepts_absent();
    let input_schema = backend
        .to_json_schema(&input)
        .map_err(|e| e.within(&slot))?;

    let mut operation = Operation {
        operation_id: name.to_string(),
        tags: default_tags(name),
        ..Operation::default()
    };
    if let Some(meta) = &def.meta {
        apply_meta(&mut operation, name, meta);
    }

    let response = build_response(name, def.output.as_ref(), backend)?;
    operation
        .responses
        .insert(SUCCESS_STATUS.to_string(), response);

    let method = method_for(def.kind);
    match method {
        Method::Get => operation.parameters.push(Parameter {
            name: INPUT_PARAMETER.to_string(),
            location: ParameterLocation::Query,
            required: input_required,
            content: json_content(input_schema),
        }),
        Method::Post => {
            operation.request_body = Some(RequestBody {
                required: input_required,
                content: json_content(input_schema),
            });
        }
    }

    Ok((method, operation))
}

fn build_response(
    name: &str,
    output: Option<&TypeDescriptor>,
    backend: &SchemaBackend,
) -> Result<Response, ConvertError> {
    let Some(output) = output else {
        return Ok(Response::default());
    };
    let slot = format!("{name}.output");
    let Some(dialect) = output.dialect().filter(|_| output.classify().is_some()) else {
        return Err(ConvertError::InvalidSchema {
            path: format!("{slot}#"),
            flags: output.shape_flags(),
        });
    };

    let envelope = wire_envelope(dialect, output);
    let schema = backend
        .to_json_schema(&envelope)
        .map_err(|e| e.within(&slot))?;

    Ok(Response {
        description: output.description().unwrap_or_default().to_string(),
        content: Some(json_content(schema)),
    })
}

/// `{ result: { data: <output> } }`, built in the output's own dialect.
fn wire_envelope(dialect: Dialect, output: &TypeDescriptor) -> TypeDescriptor {
    let mut data = Map::new();
    data.insert("data".to_string(), output.as_value().clone());
    let mut result = Map::new();
    result.insert(
        "result".to_string(),
        TypeDescriptor::object(dialect, data).into_value(),
    );
    TypeDescriptor::object(dialect, result)
}

/// Copy the allowed, truthy metadata fields onto the operation.
fn apply_meta(operation: &mut Operation, name: &str, meta: &Map<String, Value>) {
    for key in ALLOWED_META_KEYS {
        let Some(value) = meta.get(key).filter(|v| is_truthy(v)) else {
            continue;
        };
        match key {
            "tags" => match value.as_array() {
                Some(tags) => {
                    operation.tags = tags.iter().filter_map(|t| string_tag(name, t)).collect();
                }
                None => {
                    tracing::warn!(procedure = name, tags = %value, "ignoring non-array tags");
                }
            },
            "summary" => operation.summary = Some(text_of(value)),
            "description" => operation.description = Some(text_of(value)),
            "externalDocs" => operation.external_docs = Some(value.clone()),
            // Only truthy values reach here; `deprecated: false` is the
            // OpenAPI default and stays omitted.
            "deprecated" => operation.deprecated = Some(true),
            _ => {}
        }
    }
}

fn string_tag(procedure: &str, tag: &Value) -> Option<String> {
    let text = tag.as_str();
    if text.is_none() {
        tracing::warn!(procedure, tag = %tag, "dropping non-string tag");
    }
    text.map(str::to_string)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
