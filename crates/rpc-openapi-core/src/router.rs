//! Router description consumed by the generator.
//!
//! The RPC framework flattens nested routers into a single procedure map keyed
//! by dotted name (`users.profile.get`) before handing it over, so there is no
//! recursion here. The stable property path of a procedure is
//! `def.procedures.<name>.def`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::descriptor::TypeDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Router {
    pub def: RouterDef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterDef {
    #[serde(default)]
    pub procedures: IndexMap<String, Procedure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub def: ProcedureDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDef {
    #[serde(alias = "type")]
    pub kind: ProcedureKind,
    /// One descriptor per declared input, in declaration order.
    #[serde(default)]
    pub inputs: Vec<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a procedure under its dotted name.
    pub fn with_procedure(mut self, name: impl Into<String>, def: ProcedureDef) -> Self {
        self.def.procedures.insert(name.into(), Procedure { def });
        self
    }

    /// Every `(dotted name, definition)` pair in declaration order.
    pub fn procedures(&self) -> impl Iterator<Item = (&str, &ProcedureDef)> {
        self.def
            .procedures
            .iter()
            .map(|(name, procedure)| (name.as_str(), &procedure.def))
    }

    pub fn len(&self) -> usize {
        self.def.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.def.procedures.is_empty()
    }
}

impl ProcedureDef {
    pub fn new(kind: ProcedureKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            output: None,
            meta: None,
        }
    }

    pub fn query() -> Self {
        Self::new(ProcedureKind::Query)
    }

    pub fn mutation() -> Self {
        Self::new(ProcedureKind::Mutation)
    }

    pub fn subscription() -> Self {
        Self::new(ProcedureKind::Subscription)
    }

    /// Append an input descriptor (the framework allows chained inputs).
    pub fn input(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.inputs.push(descriptor.into());
        self
    }

    pub fn output(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.output = Some(descriptor.into());
        self
    }

    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}
