use std::fmt::Write as _;
use std::path::Path;

use crate::{
    foundation::error::{FfgraphError, FfgraphResult},
    graph::{
        dag::topo_sort,
        node::{NodeKind, NodeRef},
        stream::StreamHandle,
    },
    run::process::{Pipes, RunningProcess},
};

/// Options for [`to_dot`], [`render_png`] and [`view`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotOpts {
    /// Include positional and keyword arguments in node labels.
    pub detail: bool,
    /// Label edges with `upstream_label(:selector) → downstream_label`.
    pub show_labels: bool,
    /// Graphviz executable used for rendering.
    pub dot_cmd: String,
}

impl Default for DotOpts {
    fn default() -> Self {
        Self {
            detail: false,
            show_labels: true,
            dot_cmd: "dot".to_string(),
        }
    }
}

impl DotOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detail(mut self, v: bool) -> Self {
        self.detail = v;
        self
    }

    pub fn show_labels(mut self, v: bool) -> Self {
        self.show_labels = v;
        self
    }

    pub fn dot_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.dot_cmd = cmd.into();
        self
    }
}

fn fill_color(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Input => Some("#99cc00"),
        NodeKind::Output => Some("#99ccff"),
        NodeKind::Filter => Some("#ffcc00"),
        NodeKind::Global | NodeKind::MergeOutputs => None,
    }
}

fn node_id(node: &NodeRef) -> String {
    format!("n{}", node.fingerprint().to_hex())
}

fn node_label(node: &NodeRef, detail: bool) -> String {
    let mut lines = vec![node.short_repr()];
    if detail {
        lines.extend(node.args().iter().map(|a| a.repr()));
        lines.extend(
            node.kwargs()
                .iter()
                .map(|(k, v)| format!("{k}={}", v.repr())),
        );
    }
    lines.join("\n")
}

fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Graphviz DOT text for everything upstream of `streams`, in topological order.
pub fn to_dot<S: StreamHandle>(streams: &[S], opts: &DotOpts) -> FfgraphResult<String> {
    let roots = streams
        .iter()
        .map(|s| s.node().clone())
        .collect::<Vec<_>>();
    let sorted = topo_sort(&roots)?;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "digraph ffgraph {{");
    let _ = writeln!(out, "  rankdir=LR;");
    for node in &sorted.nodes {
        let label = escape_dot_string(&node_label(node, opts.detail));
        let _ = match fill_color(node.kind()) {
            Some(color) => writeln!(
                out,
                "  {} [label=\"{label}\", shape=box, style=filled, fillcolor=\"{color}\"];",
                node_id(node)
            ),
            None => writeln!(out, "  {} [label=\"{label}\", shape=box];", node_id(node)),
        };
    }
    for node in &sorted.nodes {
        for edge in sorted.outgoing_edges(node) {
            let mut attrs = String::new();
            if opts.show_labels {
                let mut up = edge.upstream_label.to_string();
                if let Some(sel) = &edge.upstream_selector {
                    up.push(':');
                    up.push_str(sel);
                }
                let down = edge.downstream_label.to_string();
                let text = match (up.is_empty(), down.is_empty()) {
                    (false, false) => format!("{up} \u{2192} {down}"),
                    (false, true) => up,
                    (true, false) => down,
                    (true, true) => String::new(),
                };
                if !text.is_empty() {
                    attrs = format!(" [label=\"{}\"]", escape_dot_string(&text));
                }
            }
            let _ = writeln!(
                out,
                "  {} -> {}{attrs};",
                node_id(&edge.upstream_node),
                node_id(&edge.downstream_node)
            );
        }
    }
    out.push_str("}\n");
    Ok(out)
}

fn run_dot(dot: String, args: &[&str], opts: &DotOpts) -> FfgraphResult<Vec<u8>> {
    let mut cmdline = vec![opts.dot_cmd.clone()];
    cmdline.extend(args.iter().map(|a| a.to_string()));
    let pipes = Pipes {
        stdin: true,
        stdout: true,
        stderr: true,
    };
    let process = RunningProcess::spawn(&cmdline, pipes, None)?;
    let tool = process.tool().to_string();
    let out = process.communicate(Some(dot.as_bytes()))?.check(&tool)?;
    Ok(out.stdout)
}

/// PNG rendering of the graph (requires Graphviz).
pub fn render_png<S: StreamHandle>(streams: &[S], opts: &DotOpts) -> FfgraphResult<Vec<u8>> {
    run_dot(to_dot(streams, opts)?, &["-Tpng"], opts)
}

/// Render the graph as a PNG file at `path` (requires Graphviz).
pub fn view<S: StreamHandle>(streams: &[S], opts: &DotOpts, path: &Path) -> FfgraphResult<()> {
    let path = path
        .to_str()
        .ok_or_else(|| FfgraphError::validation("view: output path must be valid UTF-8"))?;
    run_dot(to_dot(streams, opts)?, &["-Tpng", "-o", path], opts)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/view/dot.rs"]
mod tests;
