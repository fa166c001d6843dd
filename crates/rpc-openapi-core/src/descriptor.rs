//! Type descriptors and dialect classification.
//!
//! A [`TypeDescriptor`] is the introspectable JSON form of a schema produced by
//! the schema library that procedures declare their inputs and outputs with.
//! Two tagging dialects coexist in the wild:
//!
//! | Dialect  | Tag location                      | Example tag    |
//! |----------|-----------------------------------|----------------|
//! | Legacy   | `internalDef.typeName`            | `"TypeObject"` |
//! | Modern   | `internalDef.type` or `def.type`  | `"object"`     |
//!
//! [`classify`] is the only place that reads raw tag fields. Modern tags are
//! canonicalised to the legacy spelling (`Type` + capitalised name) and then
//! mapped onto the closed [`CanonicalKind`] enumeration, so everything
//! downstream matches on one vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const INTERNAL_DEF: &str = "internalDef";
pub(crate) const DEF: &str = "def";
const LEGACY_TAG: &str = "typeName";
const MODERN_TAG: &str = "type";
const LEGACY_PREFIX: &str = "Type";

static NULL: Value = Value::Null;

/// Tagging convention a descriptor was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Prefixed tags at `internalDef.typeName`.
    Legacy,
    /// Lowercase tags at `internalDef.type` or `def.type`.
    Modern,
}

/// Dialect-independent classification of a type descriptor.
///
/// Every descriptor that carries a string tag classifies to some kind;
/// unmapped tags land in [`CanonicalKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalKind {
    String,
    Number,
    NaN,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    Literal,
    TemplateLiteral,
    Enum,
    NativeEnum,
    File,
    Function,
    Custom,
    Array,
    Tuple,
    Object,
    Record,
    Map,
    Set,
    Union,
    DiscriminatedUnion,
    Intersection,
    Optional,
    NonOptional,
    Nullable,
    Default,
    Catch,
    Success,
    Readonly,
    Branded,
    Effects,
    Pipe,
    Lazy,
    Promise,
    /// Tagged, but with a tag that has no mapping here.
    Other,
}

impl CanonicalKind {
    /// Map a canonical (legacy-spelled) tag onto a kind.
    ///
    /// The name after the `Type` prefix is compared case-insensitively with
    /// underscores ignored, so the spellings canonicalised from modern tags
    /// (`TypeBigint`, `TypeNan`, `TypeTemplate_literal`) match the legacy
    /// ones (`TypeBigInt`, `TypeNaN`, `TypeTemplateLiteral`).
    ///
    /// Returns `None` for tags with no mapping; [`classify`] reports those as
    /// [`CanonicalKind::Other`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        let name: String = tag
            .strip_prefix(LEGACY_PREFIX)?
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let kind = match name.as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "nan" => Self::NaN,
            "bigint" => Self::BigInt,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "symbol" => Self::Symbol,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "void" => Self::Void,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "literal" => Self::Literal,
            "templateliteral" => Self::TemplateLiteral,
            "enum" => Self::Enum,
            "nativeenum" => Self::NativeEnum,
            "file" => Self::File,
            "function" => Self::Function,
            "custom" => Self::Custom,
            "array" => Self::Array,
            "tuple" => Self::Tuple,
            "object" => Self::Object,
            "record" => Self::Record,
            "map" => Self::Map,
            "set" => Self::Set,
            "union" => Self::Union,
            "discriminatedunion" => Self::DiscriminatedUnion,
            "intersection" => Self::Intersection,
            "optional" => Self::Optional,
            "nonoptional" => Self::NonOptional,
            "nullable" => Self::Nullable,
            "default" | "prefault" => Self::Default,
            "catch" => Self::Catch,
            "success" => Self::Success,
            "readonly" => Self::Readonly,
            "branded" => Self::Branded,
            "effects" | "transform" => Self::Effects,
            "pipeline" | "pipe" => Self::Pipe,
            "lazy" => Self::Lazy,
            "promise" => Self::Promise,
            _ => return None,
        };
        Some(kind)
    }

    /// The canonical (legacy) spelling of this kind's tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "TypeString",
            Self::Number => "TypeNumber",
            Self::NaN => "TypeNaN",
            Self::BigInt => "TypeBigInt",
            Self::Boolean => "TypeBoolean",
            Self::Date => "TypeDate",
            Self::Symbol => "TypeSymbol",
            Self::Null => "TypeNull",
            Self::Undefined => "TypeUndefined",
            Self::Void => "TypeVoid",
            Self::Any => "TypeAny",
            Self::Unknown => "TypeUnknown",
            Self::Never => "TypeNever",
            Self::Literal => "TypeLiteral",
            Self::TemplateLiteral => "TypeTemplateLiteral",
            Self::Enum => "TypeEnum",
            Self::NativeEnum => "TypeNativeEnum",
            Self::File => "TypeFile",
            Self::Function => "TypeFunction",
            Self::Custom => "TypeCustom",
            Self::Array => "TypeArray",
            Self::Tuple => "TypeTuple",
            Self::Object => "TypeObject",
            Self::Record => "TypeRecord",
            Self::Map => "TypeMap",
            Self::Set => "TypeSet",
            Self::Union => "TypeUnion",
            Self::DiscriminatedUnion => "TypeDiscriminatedUnion",
            Self::Intersection => "TypeIntersection",
            Self::Optional => "TypeOptional",
            Self::NonOptional => "TypeNonOptional",
            Self::Nullable => "TypeNullable",
            Self::Default => "TypeDefault",
            Self::Catch => "TypeCatch",
            Self::Success => "TypeSuccess",
            Self::Readonly => "TypeReadonly",
            Self::Branded => "TypeBranded",
            Self::Effects => "TypeEffects",
            Self::Pipe => "TypePipeline",
            Self::Lazy => "TypeLazy",
            Self::Promise => "TypePromise",
            Self::Other => "TypeOther",
        }
    }

    /// The modern-dialect spelling, used when this crate builds descriptors.
    pub fn modern_tag(self) -> String {
        match self {
            Self::Pipe => "pipe".to_string(),
            Self::Effects => "transform".to_string(),
            Self::TemplateLiteral => "template_literal".to_string(),
            other => other.tag()[LEGACY_PREFIX.len()..].to_ascii_lowercase(),
        }
    }

    /// Whether a value of this kind may be absent (not required as an object
    /// property or request input).
    pub fn accepts_absent(self) -> bool {
        matches!(
            self,
            Self::Optional
                | Self::Default
                | Self::Void
                | Self::Undefined
                | Self::Any
                | Self::Unknown
        )
    }

    /// Whether a descriptor of this kind can take part in an input shape-merge.
    pub fn is_mergeable(self) -> bool {
        matches!(self, Self::Object | Self::Void | Self::Optional)
    }
}

impl fmt::Display for CanonicalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Presence of each dialect's marker fields on a descriptor.
///
/// Carried by errors so a misclassified descriptor can be diagnosed without
/// dumping the whole value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFlags {
    pub internal_def: bool,
    pub internal_def_type_name: bool,
    pub internal_def_type: bool,
    pub def: bool,
    pub def_type: bool,
}

impl ShapeFlags {
    pub fn of(value: &Value) -> Self {
        let internal = value.get(INTERNAL_DEF);
        let def = value.get(DEF);
        Self {
            internal_def: internal.is_some(),
            internal_def_type_name: internal.is_some_and(|d| d.get(LEGACY_TAG).is_some()),
            internal_def_type: internal.is_some_and(|d| d.get(MODERN_TAG).is_some()),
            def: def.is_some(),
            def_type: def.is_some_and(|d| d.get(MODERN_TAG).is_some()),
        }
    }
}

impl fmt::Display for ShapeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yn = |b: bool| if b { "yes" } else { "no" };
        write!(
            f,
            "internalDef={} internalDef.typeName={} internalDef.type={} def={} def.type={}",
            yn(self.internal_def),
            yn(self.internal_def_type_name),
            yn(self.internal_def_type),
            yn(self.def),
            yn(self.def_type),
        )
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A descriptor whose tag was found and recognised.
///
/// `def` is the object that carried the tag; payload fields are read from it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved<'a> {
    pub kind: CanonicalKind,
    pub dialect: Dialect,
    pub container: &'static str,
    pub def: &'a Map<String, Value>,
}

/// Locate the first tag in priority order: `internalDef.typeName`, then
/// `internalDef.type`, then `def.type`. Only string values count as tags.
fn find_tag(value: &Value) -> Option<(String, Dialect, &'static str, &Map<String, Value>)> {
    let internal = value.get(INTERNAL_DEF).and_then(Value::as_object);

    if let Some(def) = internal {
        if let Some(tag) = def.get(LEGACY_TAG).and_then(Value::as_str) {
            return Some((tag.to_string(), Dialect::Legacy, INTERNAL_DEF, def));
        }
        if let Some(tag) = def.get(MODERN_TAG).and_then(Value::as_str) {
            return Some((canonicalize(tag), Dialect::Modern, INTERNAL_DEF, def));
        }
    }

    let def = value.get(DEF).and_then(Value::as_object)?;
    let tag = def.get(MODERN_TAG).and_then(Value::as_str)?;
    Some((canonicalize(tag), Dialect::Modern, DEF, def))
}

/// `object` → `TypeObject`.
fn canonicalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => format!("{LEGACY_PREFIX}{}{}", first.to_uppercase(), chars.as_str()),
        None => LEGACY_PREFIX.to_string(),
    }
}

pub(crate) fn resolve(value: &Value) -> Option<Resolved<'_>> {
    let (tag, dialect, container, def) = find_tag(value)?;
    let kind = CanonicalKind::from_tag(&tag).unwrap_or(CanonicalKind::Other);
    Some(Resolved {
        kind,
        dialect,
        container,
        def,
    })
}

/// Classify a raw descriptor value. `None` means "not a schema at all": no
/// string tag was found in either dialect.
pub fn classify(value: &Value) -> Option<CanonicalKind> {
    resolve(value).map(|r| r.kind)
}

/// Descriptive text: top-level `description`, else the def's `description`.
pub(crate) fn description_of(value: &Value) -> Option<&str> {
    if let Some(text) = value.get("description").and_then(Value::as_str) {
        return Some(text);
    }
    resolve(value)?.def.get("description").and_then(Value::as_str)
}

impl<'a> Resolved<'a> {
    /// Payload field, or `null` when missing (which then fails classification
    /// with a precise path instead of silently emitting nothing).
    pub fn field(&self, key: &str) -> &'a Value {
        self.def.get(key).unwrap_or(&NULL)
    }

    pub fn element(&self) -> (&'static str, &'a Value) {
        let key = match self.dialect {
            Dialect::Legacy => "type",
            Dialect::Modern => "element",
        };
        (key, self.field(key))
    }

    /// Wrapped descriptor of a single-child wrapper kind.
    pub fn inner(&self) -> (&'static str, &'a Value) {
        let key = match (self.dialect, self.kind) {
            (Dialect::Legacy, CanonicalKind::Promise | CanonicalKind::Branded) => "type",
            (_, CanonicalKind::Effects | CanonicalKind::Lazy) => "schema",
            (_, CanonicalKind::Pipe) => "in",
            _ => "innerType",
        };
        (key, self.field(key))
    }

    pub fn shape(&self) -> Option<&'a Map<String, Value>> {
        self.def.get("shape").and_then(Value::as_object)
    }

    pub fn literal_values(&self) -> Vec<&'a Value> {
        match self.dialect {
            Dialect::Legacy => self.def.get("value").into_iter().collect(),
            Dialect::Modern => self
                .def
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn enum_values(&self) -> Vec<&'a Value> {
        // Legacy enums list values; legacy native enums and modern enums map
        // names to values.
        let source = match self.dialect {
            Dialect::Legacy => self.def.get("values"),
            Dialect::Modern => self.def.get("entries"),
        };
        match source {
            Some(Value::Array(values)) => values.iter().collect(),
            Some(Value::Object(entries)) => entries
                .values()
                .filter(|value| !is_reverse_mapping(entries, value))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_integer(&self) -> bool {
        match self.dialect {
            Dialect::Legacy => self
                .def
                .get("checks")
                .and_then(Value::as_array)
                .is_some_and(|checks| {
                    checks
                        .iter()
                        .any(|c| c.get("kind").and_then(Value::as_str) == Some("int"))
                }),
            Dialect::Modern => matches!(
                self.def.get("format").and_then(Value::as_str),
                Some("safeint" | "int32" | "uint32" | "int64" | "uint64")
            ),
        }
    }
}

/// Numeric TypeScript enums also map each value back to its member name
/// (`{ "A": 0, "0": "A" }`). Such a name is a reverse entry when the member it
/// names holds a number.
fn is_reverse_mapping(entries: &Map<String, Value>, value: &Value) -> bool {
    value
        .as_str()
        .and_then(|name| entries.get(name))
        .is_some_and(Value::is_number)
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

/// An introspectable type descriptor in either dialect.
///
/// This crate never mutates a descriptor it was handed; operations that
/// produce a new shape ([`merge`](Self::merge), the constructors) return a
/// fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor(Value);

impl TypeDescriptor {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn classify(&self) -> Option<CanonicalKind> {
        classify(&self.0)
    }

    /// The descriptor's tag in canonical (legacy) spelling, mapped or not.
    pub fn tag(&self) -> Option<String> {
        find_tag(&self.0).map(|(tag, _, _, _)| tag)
    }

    pub fn dialect(&self) -> Option<Dialect> {
        find_tag(&self.0).map(|(_, dialect, _, _)| dialect)
    }

    pub fn shape_flags(&self) -> ShapeFlags {
        ShapeFlags::of(&self.0)
    }

    pub fn description(&self) -> Option<&str> {
        description_of(&self.0)
    }

    /// Build a descriptor of `kind` in `dialect` with the given payload fields.
    pub fn build(dialect: Dialect, kind: CanonicalKind, payload: Map<String, Value>) -> Self {
        let mut def = Map::new();
        let container = match dialect {
            Dialect::Legacy => {
                def.insert(LEGACY_TAG.to_string(), Value::from(kind.tag()));
                INTERNAL_DEF
            }
            Dialect::Modern => {
                def.insert(MODERN_TAG.to_string(), Value::from(kind.modern_tag()));
                DEF
            }
        };
        def.extend(payload);
        let mut value = Map::new();
        value.insert(container.to_string(), Value::Object(def));
        Self(Value::Object(value))
    }

    /// An object descriptor with the given property shape.
    pub fn object(dialect: Dialect, shape: Map<String, Value>) -> Self {
        let mut payload = Map::new();
        payload.insert("shape".to_string(), Value::Object(shape));
        Self::build(dialect, CanonicalKind::Object, payload)
    }

    /// An object descriptor with no properties.
    pub fn empty_object() -> Self {
        Self::object(Dialect::Modern, Map::new())
    }

    /// Wrap `inner` in an optional descriptor.
    pub fn optional(dialect: Dialect, inner: Value) -> Self {
        let mut payload = Map::new();
        payload.insert("innerType".to_string(), inner);
        Self::build(dialect, CanonicalKind::Optional, payload)
    }

    /// Shape-merge `other` into `self`; keys in `other` override keys in `self`.
    ///
    /// Object descriptors contribute their shape. An optional object contributes
    /// its shape with every field wrapped in optional. Void and optional
    /// non-objects contribute nothing. The result is an object in `self`'s
    /// dialect; when `self` is already an object its other def fields (and any
    /// top-level fields such as `description`) are kept.
    ///
    /// Callers are expected to have checked both sides with
    /// [`CanonicalKind::is_mergeable`].
    pub fn merge(&self, other: &TypeDescriptor) -> TypeDescriptor {
        let mut shape = shape_entries(&self.0);
        for (key, field) in shape_entries(&other.0) {
            shape.insert(key, field);
        }
        tracing::trace!(fields = shape.len(), "merged input shapes");

        match resolve(&self.0) {
            Some(r) if r.kind == CanonicalKind::Object => {
                let mut merged = self.0.clone();
                if let Some(def) = merged.get_mut(r.container).and_then(Value::as_object_mut) {
                    def.insert("shape".to_string(), Value::Object(shape));
                }
                TypeDescriptor(merged)
            }
            Some(r) => TypeDescriptor::object(r.dialect, shape),
            None => TypeDescriptor::object(Dialect::Modern, shape),
        }
    }
}

impl From<Value> for TypeDescriptor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Property shape a descriptor contributes to a merge.
fn shape_entries(value: &Value) -> Map<String, Value> {
    let Some(r) = resolve(value) else {
        return Map::new();
    };
    match r.kind {
        CanonicalKind::Object => r.shape().cloned().unwrap_or_default(),
        CanonicalKind::Optional => {
            let (_, inner) = r.inner();
            let Some(inner) = resolve(inner).filter(|i| i.kind == CanonicalKind::Object) else {
                return Map::new();
            };
            inner
                .shape()
                .into_iter()
                .flatten()
                .map(|(key, field)| {
                    let wrapped = if classify(field) == Some(CanonicalKind::Optional) {
                        field.clone()
                    } else {
                        TypeDescriptor::optional(inner.dialect, field.clone()).into_value()
                    };
                    (key.clone(), wrapped)
                })
                .collect()
        }
        _ => Map::new(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
