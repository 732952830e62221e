use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::foundation::value::{Kwargs, Value};
use crate::graph::dag::{DagEdge, DagNode, Label};
use crate::graph::stream::Stream;

/// Role of a node in the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Source (`-i`). Never has incoming edges.
    Input,
    /// One stage of the `-filter_complex` graph.
    Filter,
    /// Destination file/URL with its options.
    Output,
    /// Command-line global flags attached to an output stream.
    Global,
    /// Several outputs combined into one invocation.
    MergeOutputs,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Filter => "filter",
            Self::Output => "output",
            Self::Global => "global",
            Self::MergeOutputs => "merge_outputs",
        }
    }

    /// Nodes whose streams can feed filters and outputs.
    pub fn is_filterable(self) -> bool {
        matches!(self, Self::Input | Self::Filter)
    }

    /// Nodes whose streams represent finished outputs.
    pub fn is_output(self) -> bool {
        matches!(self, Self::Output | Self::Global | Self::MergeOutputs)
    }

    /// Whether a stream owned by an `upstream` node may be wired into a node of this kind.
    pub fn accepts(self, upstream: NodeKind) -> bool {
        match self {
            Self::Input => false,
            Self::Filter | Self::Output => upstream.is_filterable(),
            Self::Global | Self::MergeOutputs => upstream.is_output(),
        }
    }

    pub fn default_arity(self) -> Arity {
        match self {
            Self::Input => Arity::NONE,
            Self::Filter | Self::Global => Arity::exactly(1),
            Self::Output | Self::MergeOutputs => Arity::at_least(1),
        }
    }

    fn expected_inputs(self) -> &'static str {
        match self {
            Self::Input => "no",
            Self::Filter | Self::Output => "input or filter",
            Self::Global | Self::MergeOutputs => "output",
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Input => 0,
            Self::Filter => 1,
            Self::Output => 2,
            Self::Global => 3,
            Self::MergeOutputs => 4,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds on the number of incoming edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl Arity {
    pub const NONE: Self = Self {
        min: 0,
        max: Some(0),
    };

    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn check(self, got: usize) -> FfgraphResult<()> {
        if got < self.min {
            return Err(FfgraphError::validation(format!(
                "expected at least {} input stream(s); got {got}",
                self.min
            )));
        }
        if let Some(max) = self.max
            && got > max
        {
            return Err(FfgraphError::validation(format!(
                "expected at most {max} input stream(s); got {got}"
            )));
        }
        Ok(())
    }
}

/// Incoming edge of a node: local slot `label` reads `upstream`'s output `upstream_label`.
#[derive(Clone, Debug)]
pub struct IncomingEdge {
    pub label: Label,
    pub upstream: NodeRef,
    pub upstream_label: Label,
    pub selector: Option<String>,
}

/// Immutable graph vertex. Obtain one through the operator functions; share it via [`NodeRef`].
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    name: String,
    args: Vec<Value>,
    kwargs: Kwargs,
    incoming: Vec<IncomingEdge>,
    fingerprint: Fingerprint,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Operation name, e.g. `input`, `trim`, `output`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    /// Incoming edges in construction order.
    pub fn incoming(&self) -> &[IncomingEdge] {
        &self.incoming
    }

    /// Content digest over this node and everything upstream of it.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn short_hash(&self) -> String {
        self.fingerprint.short_hex()
    }

    /// `name(arg, key=value, ...)` with kwargs sorted, optionally followed by `<shorthash>`.
    pub fn long_repr(&self, include_hash: bool) -> String {
        let mut props = self.args.iter().map(Value::repr).collect::<Vec<_>>();
        props.extend(self.kwargs.iter().map(|(k, v)| format!("{k}={}", v.repr())));
        let mut out = format!("{}({})", self.name, props.join(", "));
        if include_hash {
            out.push_str(&format!(" <{}>", self.short_hash()));
        }
        out
    }

    /// Concise label: the file name for inputs/outputs, the operation name otherwise.
    pub fn short_repr(&self) -> String {
        match (self.kind, self.kwargs.get("filename")) {
            (NodeKind::Input | NodeKind::Output, Some(filename)) => {
                let filename = filename.to_string();
                Path::new(&filename)
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or(filename)
            }
            _ => self.name.clone(),
        }
    }
}

/// Shared handle to an immutable [`Node`].
///
/// Equality and hashing use the content fingerprint, so two graphs built independently with
/// the same shape and parameters compare equal and collapse to one node during compilation.
#[derive(Clone)]
pub struct NodeRef(Arc<Node>);

impl NodeRef {
    /// Validate and build a node. `inputs` are the local slot labels with the streams wired
    /// into them, in order.
    pub(crate) fn new(
        kind: NodeKind,
        name: impl Into<String>,
        inputs: Vec<(Label, Stream)>,
        args: Vec<Value>,
        kwargs: Kwargs,
        arity: Arity,
    ) -> FfgraphResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FfgraphError::validation("node name must be non-empty"));
        }
        arity
            .check(inputs.len())
            .map_err(|e| FfgraphError::validation(format!("{name}: {}", strip_prefix(&e))))?;

        if matches!(kind, NodeKind::Input | NodeKind::Output)
            && kwargs.get("filename").is_none_or(Value::is_null)
        {
            return Err(FfgraphError::validation(format!(
                "{name}: a filename must be provided"
            )));
        }

        let mut incoming = Vec::with_capacity(inputs.len());
        for (label, stream) in inputs {
            let upstream_kind = stream.node().kind();
            if !kind.accepts(upstream_kind) {
                return Err(FfgraphError::validation(format!(
                    "{name}: expected incoming stream(s) from {} node(s); got a stream from {} node {}",
                    kind.expected_inputs(),
                    upstream_kind,
                    stream.node().long_repr(false),
                )));
            }
            if incoming.iter().any(|e: &IncomingEdge| e.label == label) {
                return Err(FfgraphError::validation(format!(
                    "{name}: duplicate incoming label [{label}]"
                )));
            }
            incoming.push(IncomingEdge {
                label,
                upstream: stream.node().clone(),
                upstream_label: stream.label().clone(),
                selector: stream.selector().map(str::to_string),
            });
        }

        let fingerprint = fingerprint_node(kind, &name, &args, &kwargs, &incoming);
        Ok(Self(Arc::new(Node {
            kind,
            name,
            args,
            kwargs,
            incoming,
            fingerprint,
        })))
    }

    /// Build a new node equal to this one plus one more incoming edge at the next free index.
    /// The original node is left untouched.
    pub(crate) fn with_appended_input(&self, stream: Stream) -> FfgraphResult<Self> {
        let next = self
            .incoming
            .iter()
            .filter_map(|e| match e.label {
                Label::Index(i) => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        let mut inputs = self
            .incoming
            .iter()
            .map(|e| {
                (
                    e.label.clone(),
                    Stream::new(e.upstream.clone(), e.upstream_label.clone(), e.selector.clone()),
                )
            })
            .collect::<Vec<_>>();
        inputs.push((Label::Index(next), stream));
        Self::new(
            self.kind,
            self.name.clone(),
            inputs,
            self.args.clone(),
            self.kwargs.clone(),
            Arity::at_least(1),
        )
    }
}

fn strip_prefix(e: &FfgraphError) -> String {
    match e {
        FfgraphError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn fingerprint_node(
    kind: NodeKind,
    name: &str,
    args: &[Value],
    kwargs: &Kwargs,
    incoming: &[IncomingEdge],
) -> Fingerprint {
    let mut h = StableHasher::new();
    h.write_u8(kind.tag());
    h.write_str(name);
    h.write_u64(args.len() as u64);
    for a in args {
        h.write_value(a);
    }
    h.write_map(kwargs.iter());
    h.write_u64(incoming.len() as u64);
    for e in incoming {
        write_label(&mut h, &e.label);
        h.write_fingerprint(e.upstream.fingerprint());
        write_label(&mut h, &e.upstream_label);
        h.write_opt_str(e.selector.as_deref());
    }
    h.finish()
}

fn write_label(h: &mut StableHasher, label: &Label) {
    match label {
        Label::Default => h.write_u8(0),
        Label::Index(i) => {
            h.write_u8(1);
            h.write_u64(*i as u64);
        }
        Label::Name(s) => {
            h.write_u8(2);
            h.write_str(s);
        }
    }
}

impl Deref for NodeRef {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.fingerprint == other.0.fingerprint
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.fingerprint.hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.long_repr(true))
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.long_repr(true))
    }
}

impl DagNode for NodeRef {
    fn incoming_edges(&self) -> Vec<DagEdge<Self>> {
        self.incoming
            .iter()
            .map(|e| DagEdge {
                downstream_node: self.clone(),
                downstream_label: e.label.clone(),
                upstream_node: e.upstream.clone(),
                upstream_label: e.upstream_label.clone(),
                upstream_selector: e.selector.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/node.rs"]
mod tests;
