//! Error types for document generation.

use thiserror::Error;

use crate::descriptor::{CanonicalKind, ShapeFlags};

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A merged procedure input is not an object, void or optional descriptor.
    ///
    /// `tag` is the descriptor's own tag (canonical spelling), kept even when
    /// it has no [`CanonicalKind`] mapping.
    #[error(
        "Invalid input shape for procedure `{procedure}` (input #{index}): kind {} ({flags})",
        .tag.as_deref().unwrap_or("unknown")
    )]
    InvalidInputShape {
        procedure: String,
        index: usize,
        kind: Option<CanonicalKind>,
        tag: Option<String>,
        flags: ShapeFlags,
    },

    /// A descriptor used as a schema carries no recognisable type tag.
    #[error("Invalid schema at {path}: not a type descriptor ({flags})")]
    InvalidSchema { path: String, flags: ShapeFlags },

    #[error("The {converter} converter cannot represent {kind} at {path}")]
    Unsupported {
        converter: &'static str,
        kind: CanonicalKind,
        path: String,
    },

    #[error("The {converter} converter does not accept legacy-dialect descriptors (at {path})")]
    DialectMismatch {
        converter: &'static str,
        path: String,
    },
}

impl ConvertError {
    /// Root descriptor-relative pointers (`#/shape/id`) at the procedure slot
    /// they were found in (`users.create.input#/shape/id`).
    pub(crate) fn within(self, slot: &str) -> Self {
        match self {
            Self::InvalidSchema { path, flags } => Self::InvalidSchema {
                path: format!("{slot}{path}"),
                flags,
            },
            Self::Unsupported {
                converter,
                kind,
                path,
            } => Self::Unsupported {
                converter,
                kind,
                path: format!("{slot}{path}"),
            },
            Self::DialectMismatch { converter, path } => Self::DialectMismatch {
                converter,
                path: format!("{slot}{path}"),
            },
            other => other,
        }
    }
}
