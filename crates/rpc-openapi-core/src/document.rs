//! OpenAPI document model.
//!
//! Only the subset of OpenAPI 3.0 this crate emits is modelled. Fields an
//! operation hook wants to add beyond it (security requirements, servers,
//! vendor extensions) go into [`Operation::extensions`], which is flattened
//! into the operation object on serialization.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version string written to every generated document.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Media type used for every request and response body.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type → content, in insertion order.
pub type Content = IndexMap<String, MediaType>;

/// Method → operation for a single path.
pub type PathItem = IndexMap<Method, Operation>;

/// A generated OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
}

impl Document {
    pub fn new(info: Info) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: IndexMap::new(),
        }
    }

    pub fn operation(&self, path: &str, method: Method) -> Option<&Operation> {
        self.paths.get(path)?.get(&method)
    }

    /// Every `(path, method, operation)` in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, Method, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.iter()
                .map(move |(method, operation)| (path.as_str(), *method, operation))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Additional operation fields, only ever set by an operation hook.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub content: Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub content: Content,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Value,
}

/// Single-entry `application/json` content map.
pub fn json_content(schema: Value) -> Content {
    let mut content = Content::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_operation_serializes_camel_case_and_skips_empty() {
        let op = Operation {
            operation_id: "users.get".to_string(),
            tags: vec!["users".to_string()],
            ..Operation::default()
        };

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            json!({ "operationId": "users.get", "tags": ["users"], "responses": {} })
        );
    }

    #[test]
    fn test_extensions_flatten_into_operation() {
        let mut op = Operation {
            operation_id: "secret".to_string(),
            ..Operation::default()
        };
        op.extensions
            .insert("security".to_string(), json!([{ "bearer": [] }]));

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["security"], json!([{ "bearer": [] }]));
    }

    #[test]
    fn test_method_keys_serialize_lowercase() {
        let mut doc = Document::new(Info::default());
        let mut item = PathItem::new();
        item.insert(Method::Post, Operation::default());
        doc.paths.insert("/x".to_string(), item);

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["paths"]["/x"].get("post").is_some());
        assert_eq!(value["openapi"], json!("3.0.0"));
    }

    #[test]
    fn test_operations_iterates_in_document_order() {
        let mut doc = Document::new(Info::default());
        for path in ["/b", "/a"] {
            let mut item = PathItem::new();
            item.insert(Method::Get, Operation::default());
            doc.paths.insert(path.to_string(), item);
        }
        let paths: Vec<&str> = doc.operations().map(|(p, _, _)| p).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }
}
