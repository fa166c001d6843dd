//! Generate OpenAPI 3 documents from RPC router descriptions.
//!
//! A router is a flattened map of dotted procedure names to procedure
//! definitions, each with input/output type descriptors produced by an
//! external schema library (in either of its two tagging dialects). The
//! generator maps every procedure to one REST-style operation:
//!
//! - queries become `GET <prefix>/<name>` with the input as a JSON-encoded
//!   `input` query parameter;
//! - mutations and subscriptions become `POST <prefix>/<name>` with a JSON
//!   request body;
//! - the `200` response describes the RPC envelope `{ result: { data } }`.
//!
//! ```
//! use rpc_openapi_core::{generate, GenerateOptions, Method, ProcedureDef, Router};
//! use serde_json::json;
//!
//! let router = Router::new().with_procedure(
//!     "hello",
//!     ProcedureDef::query()
//!         .input(json!({ "def": { "type": "object", "shape": {
//!             "name": { "def": { "type": "string" } }
//!         } } }))
//!         .output(json!({ "def": { "type": "string" } })),
//! );
//! let options = GenerateOptions {
//!     path_prefix: "/trpc".to_string(),
//!     ..GenerateOptions::default()
//! };
//!
//! let doc = generate(&router, &options).unwrap();
//! let op = doc.operation("/trpc/hello", Method::Get).unwrap();
//! assert_eq!(op.operation_id, "hello");
//! assert_eq!(op.parameters[0].name, "input");
//! ```

pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod generator;
pub mod input;
pub mod json_schema;
pub mod operation;
pub mod router;
mod schema_utils;

pub use config::GenerateOptions;
pub use descriptor::{classify, CanonicalKind, Dialect, ShapeFlags, TypeDescriptor};
pub use document::{Document, Info, Method, Operation};
pub use error::ConvertError;
pub use generator::{generate, Generator, OperationHook};
pub use input::reconcile_inputs;
pub use json_schema::{JsonSchemaConverter, LegacyConverter, NativeConverter, SchemaBackend};
pub use operation::operation_path;
pub use router::{ProcedureDef, ProcedureKind, Router};
