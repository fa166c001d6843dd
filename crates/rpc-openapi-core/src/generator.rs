//! Document assembly.
//!
//! Walks the router, builds one operation per procedure, runs the caller's
//! operation hook and folds the results into `paths[path][method]`.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::GenerateOptions;
use crate::document::{Document, Info, Operation};
use crate::error::ConvertError;
use crate::json_schema::SchemaBackend;
use crate::operation::{build_operation, operation_path};
use crate::router::Router;

/// Post-processing hook run on every built operation.
///
/// Receives the base operation and the procedure's *unfiltered* metadata
/// (empty when the procedure has none). Returning `Some` replaces the
/// operation; returning `None` keeps it.
pub type OperationHook =
    dyn Fn(&Operation, &Map<String, Value>) -> Option<Operation> + Send + Sync;

/// Reusable document generator.
///
/// Holds no per-call state, so one generator can be shared across threads.
#[derive(Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
    backend: SchemaBackend,
    hook: Option<Arc<OperationHook>>,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: SchemaBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_operation_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Operation, &Map<String, Value>) -> Option<Operation> + Send + Sync + 'static,
    {
        let hook: Arc<OperationHook> = Arc::new(hook);
        self.hook = Some(hook);
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate the document for `router`.
    ///
    /// Fails on the first procedure that cannot be converted; no partial
    /// document is returned.
    pub fn generate(&self, router: &Router) -> Result<Document, ConvertError> {
        let mut document = Document::new(Info {
            title: self.options.title.clone(),
            version: self.options.version.clone(),
        });
        let no_meta = Map::new();

        for (name, def) in router.procedures() {
            let (method, base) = build_operation(name, def, &self.backend)?;
            let path = operation_path(&self.options.path_prefix, name);

            let operation = match &self.hook {
                Some(hook) => {
                    let meta = def.meta.as_ref().unwrap_or(&no_meta);
                    hook(&base, meta).unwrap_or(base)
                }
                None => base,
            };

            // Names are unique and the path is the prefix plus the name, so
            // every procedure lands on its own path item.
            tracing::debug!(procedure = name, %method, %path, "built operation");
            document
                .paths
                .entry(path)
                .or_default()
                .insert(method, operation);
        }

        Ok(document)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .field("backend", &self.backend)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Generate a document with the default schema backend and no hook.
pub fn generate(router: &Router, options: &GenerateOptions) -> Result<Document, ConvertError> {
    Generator::new(options.clone()).generate(router)
}
