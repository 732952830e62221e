use std::fmt;

use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::graph::dag::Label;
use crate::graph::node::{NodeKind, NodeRef};

/// One outgoing label of a node, optionally narrowed by a stream selector (`a`, `v`, `0:v`...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stream {
    node: NodeRef,
    label: Label,
    selector: Option<String>,
}

impl Stream {
    pub(crate) fn new(node: NodeRef, label: Label, selector: Option<String>) -> Self {
        Self {
            node,
            label,
            selector,
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.node.long_repr(false), self.label)?;
        if let Some(sel) = &self.selector {
            write!(f, ":{sel}")?;
        }
        write!(f, "] <{}>", self.node.short_hash())
    }
}

/// Anything that wraps a [`Stream`]; accepted where the caller passes graph roots.
pub trait StreamHandle {
    fn as_stream(&self) -> &Stream;

    fn node(&self) -> &NodeRef {
        self.as_stream().node()
    }
}

impl StreamHandle for Stream {
    fn as_stream(&self) -> &Stream {
        self
    }
}

/// Stream leaving an input or filter node. Filters and outputs consume these.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterableStream(Stream);

impl FilterableStream {
    pub fn new(node: NodeRef, label: Label, selector: Option<String>) -> FfgraphResult<Self> {
        if !node.kind().is_filterable() {
            return Err(FfgraphError::validation(format!(
                "expected an input or filter node; got {} node {}",
                node.kind(),
                node.long_repr(false)
            )));
        }
        Ok(Self(Stream::new(node, label, selector)))
    }

    /// Default stream of a node already known to be filterable.
    pub(crate) fn of(node: NodeRef, label: Label) -> Self {
        debug_assert!(node.kind().is_filterable());
        Self(Stream::new(node, label, None))
    }

    pub fn node(&self) -> &NodeRef {
        self.0.node()
    }

    pub fn label(&self) -> &Label {
        self.0.label()
    }

    pub fn selector(&self) -> Option<&str> {
        self.0.selector()
    }

    pub fn into_stream(self) -> Stream {
        self.0
    }

    /// Same stream narrowed to `selector`, e.g. `a`, `v`, `0:a`. A stream carries at most one.
    pub fn select(&self, selector: impl Into<String>) -> FfgraphResult<Self> {
        let selector = selector.into();
        if selector.is_empty() {
            return Err(FfgraphError::validation("stream selector must be non-empty"));
        }
        if self.0.selector.is_some() {
            return Err(FfgraphError::validation(format!(
                "Stream already has a selector: {}",
                self.0
            )));
        }
        Ok(Self(Stream::new(
            self.0.node.clone(),
            self.0.label.clone(),
            Some(selector),
        )))
    }

    /// Audio component (`:a`).
    pub fn audio(&self) -> FfgraphResult<Self> {
        self.select("a")
    }

    /// Video component (`:v`).
    pub fn video(&self) -> FfgraphResult<Self> {
        self.select("v")
    }
}

impl StreamHandle for FilterableStream {
    fn as_stream(&self) -> &Stream {
        &self.0
    }
}

impl fmt::Display for FilterableStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stream leaving an output, global-args, or merge node. Only these can be compiled and run.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputStream(Stream);

impl OutputStream {
    pub fn new(node: NodeRef, label: Label) -> FfgraphResult<Self> {
        if !node.kind().is_output() {
            return Err(FfgraphError::validation(format!(
                "expected an output, global or merge_outputs node; got {} node {}",
                node.kind(),
                node.long_repr(false)
            )));
        }
        Ok(Self(Stream::new(node, label, None)))
    }

    pub(crate) fn of(node: NodeRef) -> Self {
        debug_assert!(node.kind().is_output());
        Self(Stream::new(node, Label::Default, None))
    }

    pub fn node(&self) -> &NodeRef {
        self.0.node()
    }

    pub fn into_stream(self) -> Stream {
        self.0
    }
}

impl StreamHandle for OutputStream {
    fn as_stream(&self) -> &Stream {
        &self.0
    }
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Either stream flavour, as produced by dynamically dispatched operators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyStream {
    Filterable(FilterableStream),
    Output(OutputStream),
}

impl AnyStream {
    /// Default stream of `node`, typed by the node's kind.
    pub fn of(node: NodeRef) -> Self {
        match node.kind() {
            NodeKind::Input | NodeKind::Filter => {
                Self::Filterable(FilterableStream::of(node, Label::Default))
            }
            NodeKind::Output | NodeKind::Global | NodeKind::MergeOutputs => {
                Self::Output(OutputStream::of(node))
            }
        }
    }

    pub fn into_filterable(self) -> FfgraphResult<FilterableStream> {
        match self {
            Self::Filterable(s) => Ok(s),
            Self::Output(s) => Err(FfgraphError::validation(format!(
                "expected a filterable stream; got output stream {s}"
            ))),
        }
    }

    pub fn into_output(self) -> FfgraphResult<OutputStream> {
        match self {
            Self::Output(s) => Ok(s),
            Self::Filterable(s) => Err(FfgraphError::validation(format!(
                "expected an output stream; got filterable stream {s}"
            ))),
        }
    }
}

impl StreamHandle for AnyStream {
    fn as_stream(&self) -> &Stream {
        match self {
            Self::Filterable(s) => s.as_stream(),
            Self::Output(s) => s.as_stream(),
        }
    }
}

impl From<FilterableStream> for AnyStream {
    fn from(s: FilterableStream) -> Self {
        Self::Filterable(s)
    }
}

impl From<OutputStream> for AnyStream {
    fn from(s: OutputStream) -> Self {
        Self::Output(s)
    }
}

impl fmt::Display for AnyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_stream().fmt(f)
    }
}

/// Handle to a filter node with several outgoing labels, such as `split`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultiOutput {
    node: NodeRef,
}

impl MultiOutput {
    pub(crate) fn new(node: NodeRef) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Output at `label`; numeric text becomes an index label.
    pub fn stream(&self, label: &str) -> FilterableStream {
        FilterableStream::of(self.node.clone(), Label::parse(label))
    }

    /// Output at numeric index `i`.
    pub fn index(&self, i: usize) -> FilterableStream {
        FilterableStream::of(self.node.clone(), Label::Index(i))
    }

    /// Output at `label` narrowed to `selector`.
    pub fn selected(&self, label: &str, selector: &str) -> FfgraphResult<FilterableStream> {
        self.stream(label).select(selector)
    }
}

/// Streams wired into a new node: a single stream, an ordered list, or explicit labels.
#[derive(Clone, Debug)]
pub enum StreamSpec {
    Single(FilterableStream),
    List(Vec<FilterableStream>),
    Labeled(Vec<(String, FilterableStream)>),
}

impl StreamSpec {
    /// Local slot labels paired with their streams. A lone stream uses the default slot; list
    /// entries are indexed from 0.
    pub(crate) fn into_inputs(self) -> Vec<(Label, Stream)> {
        match self {
            Self::Single(s) => vec![(Label::Default, s.into_stream())],
            Self::List(v) => v
                .into_iter()
                .enumerate()
                .map(|(i, s)| (Label::Index(i), s.into_stream()))
                .collect(),
            Self::Labeled(v) => v
                .into_iter()
                .map(|(l, s)| (Label::parse(&l), s.into_stream()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(v) => v.len(),
            Self::Labeled(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<FilterableStream> for StreamSpec {
    fn from(s: FilterableStream) -> Self {
        Self::Single(s)
    }
}

impl From<&FilterableStream> for StreamSpec {
    fn from(s: &FilterableStream) -> Self {
        Self::Single(s.clone())
    }
}

impl From<Vec<FilterableStream>> for StreamSpec {
    fn from(v: Vec<FilterableStream>) -> Self {
        Self::List(v)
    }
}

impl From<&[FilterableStream]> for StreamSpec {
    fn from(v: &[FilterableStream]) -> Self {
        Self::List(v.to_vec())
    }
}

impl<const N: usize> From<[FilterableStream; N]> for StreamSpec {
    fn from(v: [FilterableStream; N]) -> Self {
        Self::List(v.into())
    }
}

impl From<Vec<(String, FilterableStream)>> for StreamSpec {
    fn from(v: Vec<(String, FilterableStream)>) -> Self {
        Self::Labeled(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/stream.rs"]
mod tests;
