//! Generic DAG primitives.
//!
//! Nodes only know their incoming edges; the full structure is recovered by walking upstream
//! from the most-downstream nodes. An edge connects an upstream node's outgoing label to a
//! downstream node's incoming label:
//!
//! ```text
//!  _____               _____
//! |     |             |     |
//! |  A  >[foo]---[bar]>  B  |
//! |_____|             |_____|
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::foundation::error::{FfgraphError, FfgraphResult};

/// Label on either side of an edge.
///
/// `Default` is the implicit slot of single-input / single-output nodes. Ordering is
/// `Default < Index < Name`, which fixes the order outgoing edges are reported in.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum Label {
    #[default]
    Default,
    Index(usize),
    Name(String),
}

impl Label {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse a textual label: empty is `Default`, digits are `Index`, anything else is `Name`.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            Self::Default
        } else if let Ok(i) = s.parse::<usize>() {
            Self::Index(i)
        } else {
            Self::Name(s.to_string())
        }
    }
}

impl From<usize> for Label {
    fn from(v: usize) -> Self {
        Self::Index(v)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Self::Name(v.to_string())
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self {
        Self::Name(v)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => Ok(()),
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// A node that can be walked upstream. Equality and hashing must be content based and stable.
pub trait DagNode: Clone + Eq + Hash {
    /// Incoming edges in a fixed order; the order drives traversal and therefore output order.
    fn incoming_edges(&self) -> Vec<DagEdge<Self>>;
}

#[derive(Clone, Debug)]
pub struct DagEdge<N> {
    pub downstream_node: N,
    pub downstream_label: Label,
    pub upstream_node: N,
    pub upstream_label: Label,
    pub upstream_selector: Option<String>,
}

/// Downstream side of an edge, as seen from the upstream node.
#[derive(Clone, Debug)]
pub struct OutgoingEdge<N> {
    pub downstream_node: N,
    pub downstream_label: Label,
    pub downstream_selector: Option<String>,
}

/// Outgoing edges of one node grouped by the upstream label they leave from.
pub type OutgoingEdgeMap<N> = BTreeMap<Label, Vec<OutgoingEdge<N>>>;

/// Result of [`topo_sort`].
#[derive(Clone, Debug)]
pub struct SortedGraph<N: DagNode> {
    /// Every reachable node, upstream before downstream.
    pub nodes: Vec<N>,
    outgoing: HashMap<N, OutgoingEdgeMap<N>>,
}

impl<N: DagNode> SortedGraph<N> {
    pub fn outgoing_edge_map(&self, node: &N) -> Option<&OutgoingEdgeMap<N>> {
        self.outgoing.get(node)
    }

    /// Outgoing edges of `node` flattened in label order.
    pub fn outgoing_edges(&self, node: &N) -> Vec<DagEdge<N>> {
        let Some(map) = self.outgoing.get(node) else {
            return Vec::new();
        };
        map.iter()
            .flat_map(|(label, downstreams)| {
                downstreams.iter().map(move |d| DagEdge {
                    downstream_node: d.downstream_node.clone(),
                    downstream_label: d.downstream_label.clone(),
                    upstream_node: node.clone(),
                    upstream_label: label.clone(),
                    upstream_selector: d.downstream_selector.clone(),
                })
            })
            .collect()
    }
}

/// Depth-first post-order sort of everything upstream of `roots`.
///
/// Roots are visited in the order given and incoming edges in the order the node reports them,
/// so the result is deterministic. Revisiting a node that is still on the current DFS path
/// fails with [`FfgraphError::Structural`].
pub fn topo_sort<N: DagNode>(roots: &[N]) -> FfgraphResult<SortedGraph<N>> {
    let mut walk = TopoWalk {
        on_path: HashSet::new(),
        done: HashSet::new(),
        sorted: Vec::new(),
        outgoing: HashMap::new(),
    };
    for root in roots {
        walk.visit(root, None)?;
    }
    Ok(SortedGraph {
        nodes: walk.sorted,
        outgoing: walk.outgoing,
    })
}

struct TopoWalk<N> {
    on_path: HashSet<N>,
    done: HashSet<N>,
    sorted: Vec<N>,
    outgoing: HashMap<N, OutgoingEdgeMap<N>>,
}

impl<N: DagNode> TopoWalk<N> {
    fn visit(&mut self, node: &N, via: Option<(Label, OutgoingEdge<N>)>) -> FfgraphResult<()> {
        if self.on_path.contains(node) {
            return Err(FfgraphError::structural("graph is not a DAG"));
        }

        if let Some((upstream_label, edge)) = via {
            self.outgoing
                .entry(node.clone())
                .or_default()
                .entry(upstream_label)
                .or_default()
                .push(edge);
        }

        if self.done.contains(node) {
            return Ok(());
        }

        self.on_path.insert(node.clone());
        for edge in node.incoming_edges() {
            let down = OutgoingEdge {
                downstream_node: edge.downstream_node,
                downstream_label: edge.downstream_label,
                downstream_selector: edge.upstream_selector,
            };
            self.visit(&edge.upstream_node, Some((edge.upstream_label, down)))?;
        }
        self.on_path.remove(node);
        self.done.insert(node.clone());
        self.sorted.push(node.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/dag.rs"]
mod tests;
