//! Procedure input reconciliation.
//!
//! A procedure may declare several inputs (one per chained `.input()` call).
//! The wire format carries a single JSON value, so the declared inputs are
//! collapsed into one effective descriptor before conversion.

use std::borrow::Cow;

use crate::descriptor::{CanonicalKind, TypeDescriptor};
use crate::error::ConvertError;

/// Collapse a procedure's declared inputs into one effective descriptor.
///
/// - No inputs: an empty object.
/// - First input is an array: returned as-is, later inputs are ignored.
/// - A single input: returned as-is.
/// - Otherwise every input must be an object, void or optional descriptor;
///   they are shape-merged left to right, later keys winning.
pub fn reconcile_inputs<'a>(
    procedure: &str,
    inputs: &'a [TypeDescriptor],
) -> Result<Cow<'a, TypeDescriptor>, ConvertError> {
    let Some((first, rest)) = inputs.split_first() else {
        return Ok(Cow::Owned(TypeDescriptor::empty_object()));
    };

    if first.classify() == Some(CanonicalKind::Array) || rest.is_empty() {
        return Ok(Cow::Borrowed(first));
    }

    ensure_mergeable(procedure, 0, first)?;
    let mut merged = first.clone();
    for (offset, input) in rest.iter().enumerate() {
        ensure_mergeable(procedure, offset + 1, input)?;
        merged = merged.merge(input);
    }
    Ok(Cow::Owned(merged))
}

fn ensure_mergeable(
    procedure: &str,
    index: usize,
    input: &TypeDescriptor,
) -> Result<(), ConvertError> {
    let kind = input.classify();
    if kind.is_some_and(CanonicalKind::is_mergeable) {
        return Ok(());
    }
    Err(ConvertError::InvalidInputShape {
        procedure: procedure.to_string(),
        index,
        kind,
        tag: input.tag(),
        flags: input.shape_flags(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ShapeFlags;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn object(shape: Value) -> TypeDescriptor {
        TypeDescriptor::new(json!({ "def": { "type": "object", "shape": shape } }))
    }

    fn string() -> Value {
        json!({ "def": { "type": "string" } })
    }

    fn number() -> Value {
        json!({ "def": { "type": "number" } })
    }

    #[test]
    fn test_no_inputs_yield_empty_object() {
        let input = reconcile_inputs("p", &[]).unwrap();
        assert_eq!(input.classify(), Some(CanonicalKind::Object));
        assert!(matches!(input, Cow::Owned(_)));
    }

    #[test]
    fn test_single_input_passes_through() {
        let inputs = vec![TypeDescriptor::new(string())];
        let input = reconcile_inputs("p", &inputs).unwrap();
        assert!(matches!(input, Cow::Borrowed(_)));
        assert_eq!(input.as_value(), &string());
    }

    #[test]
    fn test_array_first_input_is_never_merged() {
        let array = TypeDescriptor::new(json!({ "def": { "type": "array", "element": string() } }));
        let inputs = vec![array.clone(), object(json!({ "a": string() }))];

        let input = reconcile_inputs("p", &inputs).unwrap();
        assert_eq!(input.into_owned(), array);
    }

    #[test]
    fn test_disjoint_objects_union() {
        let inputs = vec![object(json!({ "a": string() })), object(json!({ "b": number() }))];
        let input = reconcile_inputs("p", &inputs).unwrap();

        let shape = input.as_value()["def"]["shape"].as_object().unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape["a"], string());
        assert_eq!(shape["b"], number());
    }

    #[test]
    fn test_overlapping_keys_take_later_definition() {
        let inputs = vec![
            object(json!({ "id": string(), "keep": string() })),
            object(json!({ "id": number() })),
        ];
        let input = reconcile_inputs("p", &inputs).unwrap();

        let shape = input.as_value()["def"]["shape"].as_object().unwrap();
        assert_eq!(shape["id"], number());
        assert_eq!(shape["keep"], string());
    }

    #[test]
    fn test_void_inputs_merge_to_object() {
        let inputs = vec![
            object(json!({ "a": string() })),
            TypeDescriptor::new(json!({ "internalDef": { "type": "void" } })),
        ];
        let input = reconcile_inputs("p", &inputs).unwrap();
        assert_eq!(input.classify(), Some(CanonicalKind::Object));
        assert_eq!(input.as_value()["def"]["shape"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_non_mergeable_later_input_is_rejected_with_flags() {
        let inputs = vec![
            object(json!({ "a": string() })),
            TypeDescriptor::new(json!({ "internalDef": { "typeName": "TypeString" } })),
        ];

        match reconcile_inputs("users.create", &inputs).unwrap_err() {
            ConvertError::InvalidInputShape {
                procedure,
                index,
                kind,
                tag,
                flags,
            } => {
                assert_eq!(procedure, "users.create");
                assert_eq!(index, 1);
                assert_eq!(kind, Some(CanonicalKind::String));
                assert_eq!(tag.as_deref(), Some("TypeString"));
                assert_eq!(
                    flags,
                    ShapeFlags {
                        internal_def: true,
                        internal_def_type_name: true,
                        ..ShapeFlags::default()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unclassifiable_input_reports_unknown_kind() {
        let inputs = vec![object(json!({})), TypeDescriptor::new(json!({ "shape": {} }))];
        let err = reconcile_inputs("p", &inputs).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInputShape { kind: None, .. }));
        assert!(err.to_string().contains("kind unknown"));
    }

    #[test]
    fn test_unmapped_input_reports_its_own_tag() {
        let inputs = vec![
            object(json!({})),
            TypeDescriptor::new(json!({ "def": { "type": "custom" } })),
            TypeDescriptor::new(json!({ "def": { "type": "frobnicate" } })),
        ];
        let err = reconcile_inputs("p", &inputs).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidInputShape { index: 1, kind: Some(CanonicalKind::Custom), .. }
        ));
        assert!(err.to_string().contains("kind TypeCustom"));

        let err = reconcile_inputs("p", &[object(json!({})), inputs[2].clone()]).unwrap_err();
        assert!(err.to_string().contains("kind TypeFrobnicate"));
    }
}
