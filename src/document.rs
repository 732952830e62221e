//! JSON description of a pipeline.
//!
//! ```json
//! {
//!   "nodes": [
//!     {"id": "in", "op": "input", "args": ["in.mp4"]},
//!     {"id": "trim", "op": "trim", "inputs": ["in"], "kwargs": {"start_frame": 10}},
//!     {"id": "out", "op": "output", "inputs": ["trim"], "args": ["out.mp4"]}
//!   ],
//!   "outputs": ["out"]
//! }
//! ```
//!
//! Input references are `id`, `id:label` or `id:label:selector` (`in::a` selects the audio of
//! a node's default output). A node may only reference nodes declared before it.

use std::collections::HashMap;

use crate::{
    foundation::{
        error::{FfgraphError, FfgraphResult},
        value::{Kwargs, Value},
    },
    graph::{
        dag::Label,
        node::NodeRef,
        stream::{AnyStream, FilterableStream, OutputStream},
    },
    ops::registry::{OperatorCall, OperatorRegistry},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDocument {
    pub nodes: Vec<NodeSpec>,
    /// Ids of the terminal output nodes, in command-line order.
    pub outputs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: String,
    pub op: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Kwargs::is_empty")]
    pub kwargs: Kwargs,
}

/// Parsed `id[:label[:selector]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StreamRef<'a> {
    id: &'a str,
    label: Label,
    selector: Option<&'a str>,
}

impl<'a> StreamRef<'a> {
    fn parse(text: &'a str) -> FfgraphResult<Self> {
        let mut parts = text.splitn(3, ':');
        let id = parts.next().unwrap_or_default();
        if id.is_empty() {
            return Err(FfgraphError::validation(format!(
                "invalid stream reference {text:?}: missing node id"
            )));
        }
        let label = Label::parse(parts.next().unwrap_or_default());
        let selector = parts.next().filter(|s| !s.is_empty());
        Ok(Self {
            id,
            label,
            selector,
        })
    }
}

impl GraphDocument {
    pub fn from_json(text: &str) -> FfgraphResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| FfgraphError::serde(format!("invalid graph document: {e}")))
    }

    pub fn to_json(&self) -> FfgraphResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FfgraphError::serde(format!("failed to encode graph document: {e}")))
    }

    /// Build every node through `registry` and return the terminal streams.
    #[tracing::instrument(skip_all, fields(nodes = self.nodes.len()))]
    pub fn build(&self, registry: &OperatorRegistry) -> FfgraphResult<Vec<OutputStream>> {
        if self.outputs.is_empty() {
            return Err(FfgraphError::validation(
                "graph document lists no outputs",
            ));
        }

        let mut built = HashMap::<&str, NodeRef>::with_capacity(self.nodes.len());
        for spec in &self.nodes {
            if built.contains_key(spec.id.as_str()) {
                return Err(FfgraphError::validation(format!(
                    "duplicate node id '{}'",
                    spec.id
                )));
            }
            let inputs = spec
                .inputs
                .iter()
                .map(|r| resolve(&built, r))
                .collect::<FfgraphResult<Vec<_>>>()
                .map_err(|e| in_node(&spec.id, e))?;
            let call = OperatorCall::new(inputs, spec.args.clone(), spec.kwargs.clone());
            let node = registry
                .apply(&spec.op, &call)
                .map_err(|e| in_node(&spec.id, e))?;
            built.insert(spec.id.as_str(), node);
        }

        self.outputs
            .iter()
            .map(|r| resolve(&built, r)?.into_output())
            .collect()
    }
}

fn in_node(id: &str, e: FfgraphError) -> FfgraphError {
    match e {
        FfgraphError::Validation(msg) => FfgraphError::validation(format!("node '{id}': {msg}")),
        other => other,
    }
}

fn resolve(built: &HashMap<&str, NodeRef>, text: &str) -> FfgraphResult<AnyStream> {
    let r = StreamRef::parse(text)?;
    let node = built.get(r.id).cloned().ok_or_else(|| {
        FfgraphError::validation(format!(
            "unknown node id '{}' (nodes may only reference nodes declared before them)",
            r.id
        ))
    })?;
    let selector = r.selector.map(str::to_string);
    if node.kind().is_filterable() {
        Ok(FilterableStream::new(node, r.label, selector)?.into())
    } else if selector.is_some() {
        Err(FfgraphError::validation(format!(
            "stream reference {text:?}: output streams do not take selectors"
        )))
    } else {
        Ok(OutputStream::new(node, r.label)?.into())
    }
}

#[cfg(test)]
#[path = "../tests/unit/document.rs"]
mod tests;
