//! Type descriptor → JSON Schema conversion.
//!
//! Two converters are provided, mirroring the two generations of the schema
//! library:
//!
//! - [`NativeConverter`] emits draft 2020-12 and only understands
//!   modern-dialect descriptors. Kinds with no JSON representation (dates,
//!   bigints, maps, sets, transforms, ...) are rejected.
//! - [`LegacyConverter`] emits draft-07, understands both dialects and maps
//!   every kind to something, approximating where it has to.
//!
//! [`SchemaBackend`] holds whichever converters are available. The native
//! converter is tried first when present; any failure there is logged and the
//! legacy converter is used instead. Only a legacy failure propagates. The
//! `$schema` marker is stripped from the result either way, since the output
//! is embedded in an OpenAPI document.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::descriptor::{
    description_of, resolve, CanonicalKind, Dialect, Resolved, ShapeFlags, TypeDescriptor,
};
use crate::error::ConvertError;
use crate::schema_utils::build_path;

const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";
const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// A descriptor → JSON Schema conversion routine.
pub trait JsonSchemaConverter: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Convert a descriptor. The result may carry a `$schema` marker.
    fn convert(&self, descriptor: &TypeDescriptor) -> Result<Value, ConvertError>;
}

/// Draft 2020-12 converter for modern-dialect descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConverter;

/// Draft-07 converter that accepts both dialects.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyConverter;

impl JsonSchemaConverter for NativeConverter {
    fn name(&self) -> &'static str {
        "native"
    }

    fn convert(&self, descriptor: &TypeDescriptor) -> Result<Value, ConvertError> {
        let schema = Emitter::new(Flavor::Native).emit(descriptor.as_value(), "#")?;
        Ok(with_schema_marker(schema, DRAFT_2020_12))
    }
}

impl JsonSchemaConverter for LegacyConverter {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn convert(&self, descriptor: &TypeDescriptor) -> Result<Value, ConvertError> {
        let schema = Emitter::new(Flavor::Legacy).emit(descriptor.as_value(), "#")?;
        Ok(with_schema_marker(schema, DRAFT_07))
    }
}

// ---------------------------------------------------------------------------
// Backend (converter selection)
// ---------------------------------------------------------------------------

/// The converters available to a generator.
///
/// Which converters exist is fixed when the backend is built; whether the
/// native one is attempted is decided again on every call.
#[derive(Clone)]
pub struct SchemaBackend {
    native: Option<Arc<dyn JsonSchemaConverter>>,
    legacy: Arc<dyn JsonSchemaConverter>,
}

impl SchemaBackend {
    pub fn new(
        native: Option<Arc<dyn JsonSchemaConverter>>,
        legacy: Arc<dyn JsonSchemaConverter>,
    ) -> Self {
        Self { native, legacy }
    }

    /// A backend without a native converter.
    pub fn legacy_only() -> Self {
        Self::new(None, Arc::new(LegacyConverter))
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    /// Convert `descriptor`, preferring the native converter and falling back
    /// to the legacy one if it is absent or fails.
    pub fn to_json_schema(&self, descriptor: &TypeDescriptor) -> Result<Value, ConvertError> {
        if let Some(native) = &self.native {
            match native.convert(descriptor) {
                Ok(schema) => return Ok(strip_schema_marker(schema)),
                Err(err) => tracing::debug!(
                    converter = native.name(),
                    error = %err,
                    "preferred conversion failed, retrying with {}",
                    self.legacy.name()
                ),
            }
        }
        self.legacy.convert(descriptor).map(strip_schema_marker)
    }
}

impl Default for SchemaBackend {
    fn default() -> Self {
        let native: Arc<dyn JsonSchemaConverter> = Arc::new(NativeConverter);
        Self::new(Some(native), Arc::new(LegacyConverter))
    }
}

impl fmt::Debug for SchemaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBackend")
            .field("native", &self.native.as_ref().map(|c| c.name()))
            .field("legacy", &self.legacy.name())
            .finish()
    }
}

fn with_schema_marker(schema: Value, uri: &str) -> Value {
    match schema {
        Value::Object(obj) => {
            let mut out = Map::with_capacity(obj.len() + 1);
            out.insert("$schema".to_string(), Value::from(uri));
            out.extend(obj);
            Value::Object(out)
        }
        other => other,
    }
}

/// Remove the top-level `$schema` key.
pub fn strip_schema_marker(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    schema
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Native,
    Legacy,
}

struct Emitter {
    flavor: Flavor,
}

impl Emitter {
    fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    fn name(&self) -> &'static str {
        match self.flavor {
            Flavor::Native => "native",
            Flavor::Legacy => "legacy",
        }
    }

    fn emit(&self, node: &Value, path: &str) -> Result<Value, ConvertError> {
        let Some(resolved) = resolve(node) else {
            return Err(ConvertError::InvalidSchema {
                path: path.to_string(),
                flags: ShapeFlags::of(node),
            });
        };
        if self.flavor == Flavor::Native && resolved.dialect == Dialect::Legacy {
            return Err(ConvertError::DialectMismatch {
                converter: self.name(),
                path: path.to_string(),
            });
        }

        let mut schema = self.emit_kind(&resolved, path)?;
        if let (Some(text), Some(obj)) = (description_of(node), schema.as_object_mut()) {
            obj.insert("description".to_string(), Value::from(text));
        }
        Ok(schema)
    }

    fn emit_child(&self, r: &Resolved<'_>, key: &str, path: &str) -> Result<Value, ConvertError> {
        self.emit(r.field(key), &build_path(path, &[key]))
    }

    fn unsupported(&self, kind: CanonicalKind, path: &str) -> ConvertError {
        ConvertError::Unsupported {
            converter: self.name(),
            kind,
            path: path.to_string(),
        }
    }

    fn emit_kind(&self, r: &Resolved<'_>, path: &str) -> Result<Value, ConvertError> {
        use CanonicalKind as K;

        let legacy = self.flavor == Flavor::Legacy;
        let schema = match r.kind {
            K::String => json!({ "type": "string" }),
            K::Number if r.is_integer() => json!({ "type": "integer" }),
            K::Number => json!({ "type": "number" }),
            K::Boolean => json!({ "type": "boolean" }),
            K::Null => json!({ "type": "null" }),
            K::Any | K::Unknown => json!({}),
            K::Never => json!({ "not": {} }),

            K::Success => json!({ "type": "boolean" }),
            K::File => json!({ "type": "string", "format": "binary" }),
            K::TemplateLiteral => self.template_literal(r),

            K::NaN if legacy => json!({ "type": "number" }),
            K::Function | K::Custom | K::Other if legacy => json!({}),
            K::BigInt if legacy => json!({ "type": "integer", "format": "int64" }),
            K::Date if legacy => json!({ "type": "string", "format": "date-time" }),
            K::Undefined if legacy => json!({ "not": {} }),
            K::Void | K::Symbol if legacy => json!({}),
            K::BigInt
            | K::Date
            | K::Undefined
            | K::Void
            | K::Symbol
            | K::NaN
            | K::Function
            | K::Custom
            | K::Other => return Err(self.unsupported(r.kind, path)),

            K::Literal => self.literal(r),
            K::Enum | K::NativeEnum => self.enumeration(r),

            K::Array => {
                let (key, element) = r.element();
                let items = self.emit(element, &build_path(path, &[key]))?;
                json!({ "type": "array", "items": items })
            }
            K::Tuple => self.tuple(r, path)?,
            K::Object => self.object(r, path)?,
            K::Record => {
                let values = self.emit_child(r, "valueType", path)?;
                json!({ "type": "object", "additionalProperties": values })
            }
            K::Map if legacy => {
                let key = self.emit_child(r, "keyType", path)?;
                let value = self.emit_child(r, "valueType", path)?;
                json!({
                    "type": "array",
                    "items": {
                        "type": "array",
                        "items": [key, value],
                        "minItems": 2,
                        "maxItems": 2
                    }
                })
            }
            K::Set if legacy => {
                let items = self.emit_child(r, "valueType", path)?;
                json!({ "type": "array", "uniqueItems": true, "items": items })
            }
            K::Map | K::Set => return Err(self.unsupported(r.kind, path)),

            K::Union | K::DiscriminatedUnion => {
                json!({ "anyOf": self.emit_list(r, "options", path)? })
            }
            K::Intersection => {
                let left = self.emit_child(r, "left", path)?;
                let right = self.emit_child(r, "right", path)?;
                json!({ "allOf": [left, right] })
            }

            K::Nullable => {
                let (key, inner) = r.inner();
                let inner = self.emit(inner, &build_path(path, &[key]))?;
                self.nullable(inner)
            }
            K::Default => {
                let mut inner = self.emit_child(r, "innerType", path)?;
                let default = r.def.get("defaultValue");
                if let (Some(default), Some(obj)) = (default, inner.as_object_mut()) {
                    obj.insert("default".to_string(), default.clone());
                }
                inner
            }
            K::Effects | K::Promise if !legacy => return Err(self.unsupported(r.kind, path)),
            K::Lazy if r.def.get("schema").is_none() => json!({}),
            K::Optional
            | K::NonOptional
            | K::Readonly
            | K::Catch
            | K::Branded
            | K::Effects
            | K::Promise
            | K::Pipe
            | K::Lazy => {
                let (key, inner) = r.inner();
                self.emit(inner, &build_path(path, &[key]))?
            }
        };
        Ok(schema)
    }

    fn emit_list(
        &self,
        r: &Resolved<'_>,
        key: &str,
        path: &str,
    ) -> Result<Vec<Value>, ConvertError> {
        let Some(items) = r.def.get(key).and_then(Value::as_array) else {
            return Err(ConvertError::InvalidSchema {
                path: build_path(path, &[key]),
                flags: ShapeFlags::default(),
            });
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let index = i.to_string();
                self.emit(item, &build_path(path, &[key, index.as_str()]))
            })
            .collect()
    }

    fn object(&self, r: &Resolved<'_>, path: &str) -> Result<Value, ConvertError> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, field) in r.shape().into_iter().flatten() {
            let schema = self.emit(field, &build_path(path, &["shape", name.as_str()]))?;
            let optional = resolve(field).is_some_and(|f| f.kind.accepts_absent());
            if !optional {
                required.push(Value::from(name.as_str()));
            }
            properties.insert(name.clone(), schema);
        }

        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("object"));
        obj.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            obj.insert("required".to_string(), Value::Array(required));
        }
        obj.insert("additionalProperties".to_string(), json!(false));
        Ok(Value::Object(obj))
    }

    fn tuple(&self, r: &Resolved<'_>, path: &str) -> Result<Value, ConvertError> {
        let items = self.emit_list(r, "items", path)?;
        let len = items.len();
        let rest = match r.def.get("rest") {
            Some(rest) if !rest.is_null() => Some(self.emit(rest, &build_path(path, &["rest"]))?),
            _ => None,
        };

        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("array"));
        obj.insert("minItems".to_string(), json!(len));
        match self.flavor {
            Flavor::Native => {
                obj.insert("prefixItems".to_string(), Value::Array(items));
                obj.insert("items".to_string(), rest.unwrap_or(Value::Bool(false)));
            }
            Flavor::Legacy => {
                obj.insert("items".to_string(), Value::Array(items));
                match rest {
                    Some(rest) => {
                        obj.insert("additionalItems".to_string(), rest);
                    }
                    None => {
                        obj.insert("maxItems".to_string(), json!(len));
                    }
                }
            }
        }
        Ok(Value::Object(obj))
    }

    fn literal(&self, r: &Resolved<'_>) -> Value {
        let values = r.literal_values();
        match values.as_slice() {
            [single] => {
                let mut obj = Map::new();
                if let Some(ty) = json_type_of(single) {
                    obj.insert("type".to_string(), json!(ty));
                }
                obj.insert("const".to_string(), (*single).clone());
                Value::Object(obj)
            }
            many => json!({ "enum": many }),
        }
    }

    fn template_literal(&self, r: &Resolved<'_>) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("string"));
        if let Some(pattern) = r.def.get("pattern").and_then(Value::as_str) {
            obj.insert("pattern".to_string(), json!(pattern));
        }
        Value::Object(obj)
    }

    fn enumeration(&self, r: &Resolved<'_>) -> Value {
        let values = r.enum_values();
        let mut obj = Map::new();
        if let Some(ty) = uniform_type(&values) {
            obj.insert("type".to_string(), json!(ty));
        }
        obj.insert("enum".to_string(), json!(values));
        Value::Object(obj)
    }

    fn nullable(&self, inner: Value) -> Value {
        // Draft-07 tooling prefers `type: [t, "null"]` for bare primitives.
        if self.flavor == Flavor::Legacy {
            if let Some(obj) = inner.as_object() {
                if obj.len() == 1 {
                    if let Some(ty) = obj.get("type").and_then(Value::as_str) {
                        return json!({ "type": [ty, "null"] });
                    }
                }
            }
        }
        json!({ "anyOf": [inner, { "type": "null" }] })
    }
}

fn json_type_of(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::Bool(_) => Some("boolean"),
        Value::Null => Some("null"),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// JSON type shared by every enum value, widening integer to number.
fn uniform_type(values: &[&Value]) -> Option<&'static str> {
    let mut types = values.iter().filter_map(|v| json_type_of(v)).map(|t| match t {
        "integer" => "number",
        other => other,
    });
    let first = types.next()?;
    types.all(|t| t == first).then_some(first)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn modern(value: Value) -> TypeDescriptor {
        TypeDescriptor::new(value)
    }

    fn string_m() -> Value {
        json!({ "def": { "type": "string" } })
    }

    fn string_l() -> Value {
        json!({ "internalDef": { "typeName": "TypeString" } })
    }

    /// Counts calls and fails every one of them.
    struct FailingConverter(AtomicUsize);

    impl JsonSchemaConverter for FailingConverter {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn convert(&self, _: &TypeDescriptor) -> Result<Value, ConvertError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ConvertError::DialectMismatch {
                converter: "failing",
                path: "#".to_string(),
            })
        }
    }

    // ── Object / required ───────────────────────────────────────────────────

    #[test]
    fn test_object_required_and_optional() {
        let desc = modern(json!({
            "def": { "type": "object", "shape": {
                "name": string_m(),
                "nick": { "def": { "type": "optional", "innerType": string_m() } }
            } }
        }));

        let schema = SchemaBackend::default().to_json_schema(&desc).unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "nick": { "type": "string" }
                },
                "required": ["name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_empty_object_omits_required() {
        let schema = SchemaBackend::default()
            .to_json_schema(&TypeDescriptor::empty_object())
            .unwrap();
        assert_eq!(
            schema,
            json!({ "type": "object", "properties": {}, "additionalProperties": false })
        );
    }

    #[test]
    fn test_legacy_array_element_lives_at_type() {
        let desc = TypeDescriptor::new(json!({
            "internalDef": { "typeName": "TypeArray", "type": string_l() }
        }));
        let schema = LegacyConverter.convert(&desc).unwrap();
        assert_eq!(schema["items"], json!({ "type": "string" }));
        assert_eq!(schema["$schema"], json!(DRAFT_07));
    }

    #[test]
    fn test_descriptions_are_copied() {
        let desc = modern(json!({
            "description": "A greeting",
            "def": { "type": "string" }
        }));
        let schema = SchemaBackend::default().to_json_schema(&desc).unwrap();
        assert_eq!(schema, json!({ "type": "string", "description": "A greeting" }));
    }

    #[test]
    fn test_integer_markers_both_dialects() {
        let l = TypeDescriptor::new(json!({
            "internalDef": { "typeName": "TypeNumber", "checks": [{ "kind": "int" }] }
        }));
        let m = modern(json!({ "def": { "type": "number", "format": "safeint" } }));
        let backend = SchemaBackend::default();
        assert_eq!(backend.to_json_schema(&l).unwrap(), json!({ "type": "integer" }));
        assert_eq!(backend.to_json_schema(&m).unwrap(), json!({ "type": "integer" }));
    }

    // ── Unions, enums, literals ─────────────────────────────────────────────

    #[test]
    fn test_union_and_nullable() {
        let union = modern(json!({
            "def": { "type": "union", "options": [string_m(), { "def": { "type": "boolean" } }] }
        }));
        let nullable = TypeDescriptor::new(json!({
            "internalDef": { "typeName": "TypeNullable", "innerType": string_l() }
        }));
        let backend = SchemaBackend::default();

        assert_eq!(
            backend.to_json_schema(&union).unwrap(),
            json!({ "anyOf": [{ "type": "string" }, { "type": "boolean" }] })
        );
        // Legacy dialect → legacy converter → draft-07 type array.
        assert_eq!(
            backend.to_json_schema(&nullable).unwrap(),
            json!({ "type": ["string", "null"] })
        );
    }

    #[test]
    fn test_enum_and_literal_dialects() {
        let legacy_enum = TypeDescriptor::new(json!({
            "internalDef": { "typeName": "TypeEnum", "values": ["a", "b"] }
        }));
        let modern_enum = modern(json!({
            "def": { "type": "enum", "entries": { "a": "a", "b": "b" } }
        }));
        let legacy_lit = TypeDescriptor::new(json!({
            "internalDef": { "typeName": "TypeLiteral", "value": 3 }
        }));
        let modern_lit = modern(json!({ "def": { "type": "literal", "values": ["ok"] } }));
        let backend = SchemaBackend::default();

        let expected_enum = json!({ "type": "string", "enum": ["a", "b"] });
        assert_eq!(backend.to_json_schema(&legacy_enum).unwrap(), expected_enum);
        assert_eq!(backend.to_json_schema(&modern_enum).unwrap(), expected_enum);
        assert_eq!(
            backend.to_json_schema(&legacy_lit).unwrap(),
            json!({ "type": "integer", "const": 3 })
        );
        assert_eq!(
            backend.to_json_schema(&modern_lit).unwrap(),
            json!({ "type": "string", "const": "ok" })
        );
    }

    #[test]
    fn test_numeric_native_enum_keeps_only_values() {
        let desc = TypeDescriptor::new(json!({ "internalDef": {
            "typeName": "TypeNativeEnum",
            "values": { "A": 0, "B": 1, "0": "A", "1": "B" }
        } }));
        assert_eq!(
            SchemaBackend::default().to_json_schema(&desc).unwrap(),
            json!({ "type": "number", "enum": [0, 1] })
        );
    }

    // ── Newer library kinds ─────────────────────────────────────────────────

    #[test]
    fn test_legacy_converter_is_total_over_newer_kinds() {
        let cases = [
            ("custom", json!({})),
            ("function", json!({})),
            ("frobnicate", json!({})),
            ("nan", json!({ "type": "number" })),
            ("file", json!({ "type": "string", "format": "binary" })),
            ("success", json!({ "type": "boolean" })),
            ("template_literal", json!({ "type": "string" })),
        ];
        for (tag, expected) in cases {
            let desc = modern(json!({ "def": { "type": tag } }));
            let schema = strip_schema_marker(LegacyConverter.convert(&desc).unwrap());
            assert_eq!(schema, expected, "tag {tag}");
        }
    }

    #[test]
    fn test_native_rejects_unrepresentable_newer_kinds() {
        for tag in ["custom", "function", "nan", "frobnicate"] {
            let desc = modern(json!({ "def": { "type": tag } }));
            assert!(
                matches!(NativeConverter.convert(&desc), Err(ConvertError::Unsupported { .. })),
                "tag {tag}"
            );
        }
    }

    #[test]
    fn test_nonoptional_unwraps_and_is_required() {
        let desc = modern(json!({
            "def": { "type": "object", "shape": {
                "id": { "def": { "type": "nonoptional", "innerType": {
                    "def": { "type": "optional", "innerType": string_m() }
                } } }
            } }
        }));
        let schema = SchemaBackend::default().to_json_schema(&desc).unwrap();
        assert_eq!(schema["properties"]["id"], json!({ "type": "string" }));
        assert_eq!(schema["required"], json!(["id"]));
    }

    #[test]
    fn test_template_literal_carries_pattern() {
        let desc = modern(json!({
            "def": { "type": "template_literal", "pattern": "^id-\\d+$" }
        }));
        let schema = SchemaBackend::default().to_json_schema(&desc).unwrap();
        assert_eq!(schema, json!({ "type": "string", "pattern": "^id-\\d+$" }));
    }

    #[test]
    fn test_tuple_flavors() {
        let desc = modern(json!({
            "def": { "type": "tuple", "items": [string_m(), { "def": { "type": "number" } }] }
        }));
        let native = strip_schema_marker(NativeConverter.convert(&desc).unwrap());
        let legacy = strip_schema_marker(LegacyConverter.convert(&desc).unwrap());

        assert_eq!(native["prefixItems"].as_array().unwrap().len(), 2);
        assert_eq!(native["items"], json!(false));
        assert_eq!(legacy["items"].as_array().unwrap().len(), 2);
        assert_eq!(legacy["maxItems"], json!(2));
    }

    #[test]
    fn test_default_carries_value() {
        let desc = modern(json!({
            "def": { "type": "default", "innerType": string_m(), "defaultValue": "hi" }
        }));
        assert_eq!(
            SchemaBackend::default().to_json_schema(&desc).unwrap(),
            json!({ "type": "string", "default": "hi" })
        );
    }

    // ── Converter selection ─────────────────────────────────────────────────

    #[test]
    fn test_native_output_has_marker_stripped() {
        let raw = NativeConverter.convert(&modern(string_m())).unwrap();
        assert_eq!(raw["$schema"], json!(DRAFT_2020_12));

        let schema = SchemaBackend::default()
            .to_json_schema(&modern(string_m()))
            .unwrap();
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn test_native_rejects_legacy_dialect() {
        let err = NativeConverter
            .convert(&TypeDescriptor::new(string_l()))
            .unwrap_err();
        assert!(matches!(err, ConvertError::DialectMismatch { .. }));
    }

    #[test]
    fn test_native_failure_falls_back_to_legacy() {
        let date = modern(json!({ "def": { "type": "date" } }));
        assert!(matches!(
            NativeConverter.convert(&date),
            Err(ConvertError::Unsupported { kind: CanonicalKind::Date, .. })
        ));

        let schema = SchemaBackend::default().to_json_schema(&date).unwrap();
        assert_eq!(schema, json!({ "type": "string", "format": "date-time" }));
    }

    #[test]
    fn test_absent_native_uses_legacy_directly() {
        let backend = SchemaBackend::legacy_only();
        assert!(!backend.has_native());
        let schema = backend
            .to_json_schema(&TypeDescriptor::new(string_l()))
            .unwrap();
        assert_eq!(schema, json!({ "type": "string" }));
    }

    #[test]
    fn test_native_is_retried_on_every_call() {
        let failing = Arc::new(FailingConverter(AtomicUsize::new(0)));
        let native: Arc<dyn JsonSchemaConverter> = failing.clone();
        let backend = SchemaBackend::new(Some(native), Arc::new(LegacyConverter));

        for _ in 0..3 {
            backend.to_json_schema(&modern(string_m())).unwrap();
        }
        assert_eq!(failing.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_legacy_failure_propagates() {
        let not_a_schema = TypeDescriptor::new(json!({ "kind": "string" }));
        let err = SchemaBackend::default()
            .to_json_schema(&not_a_schema)
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSchema { ref path, .. } if path == "#"));
    }

    #[test]
    fn test_nested_invalid_schema_reports_pointer() {
        let desc = modern(json!({
            "def": { "type": "object", "shape": { "a/b": { "nope": true } } }
        }));
        let err = SchemaBackend::default().to_json_schema(&desc).unwrap_err();
        match err {
            ConvertError::InvalidSchema { path, .. } => assert_eq!(path, "#/shape/a~1b"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
