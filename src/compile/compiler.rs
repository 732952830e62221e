use std::collections::HashMap;

use crate::{
    compile::args::{kwargs_to_cmd_line_args, video_size},
    foundation::{
        error::{FfgraphError, FfgraphResult},
        escape::{FILTER_ARG_CHARS, FILTER_SPEC_CHARS, escape_chars, escape_value},
        value::{Kwargs, Value},
    },
    graph::{
        dag::{DagEdge, DagNode, Label, SortedGraph, topo_sort},
        node::{NodeKind, NodeRef},
        stream::OutputStream,
    },
};

/// Executable prefix and overwrite policy for [`compile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOpts {
    /// Program (and leading arguments) placed before the generated arguments.
    pub cmd: Vec<String>,
    /// `Some(true)` appends `-y`, `Some(false)` appends `-n`, `None` appends nothing.
    pub overwrite_output: Option<bool>,
}

impl Default for CompileOpts {
    fn default() -> Self {
        Self {
            cmd: vec!["ffmpeg".to_string()],
            overwrite_output: None,
        }
    }
}

impl CompileOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cmd<I, S>(mut self, cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmd = cmd.into_iter().map(Into::into).collect();
        self
    }

    pub fn overwrite_output(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite_output = overwrite;
        self
    }
}

/// Argument vector (without the program name) equivalent to the graph behind `streams`.
#[tracing::instrument(skip(streams), fields(roots = streams.len()))]
pub fn get_args(
    streams: &[OutputStream],
    overwrite_output: Option<bool>,
) -> FfgraphResult<Vec<String>> {
    if streams.is_empty() {
        return Err(FfgraphError::compile("no output streams given"));
    }
    let roots = streams
        .iter()
        .map(|s| s.node().clone())
        .collect::<Vec<_>>();
    let sorted = topo_sort(&roots)?;

    let mut inputs = Vec::new();
    let mut filters = Vec::new();
    let mut outputs = Vec::new();
    let mut globals = Vec::new();
    for node in &sorted.nodes {
        match node.kind() {
            NodeKind::Input => inputs.push(node),
            NodeKind::Filter => filters.push(node),
            NodeKind::Output => outputs.push(node),
            NodeKind::Global => globals.push(node),
            NodeKind::MergeOutputs => {}
        }
    }

    let mut names = StreamNames::default();
    for (i, node) in inputs.iter().enumerate() {
        names.insert((*node).clone(), Label::Default, i.to_string());
    }
    names.allocate_filter_outputs(&filters, &sorted)?;

    let mut args = Vec::new();
    for node in &inputs {
        args.extend(input_args(node)?);
    }
    let filter_arg = filters
        .iter()
        .map(|node| filter_spec(node, &sorted, &names))
        .collect::<FfgraphResult<Vec<_>>>()?
        .join(";");
    if !filter_arg.is_empty() {
        args.push("-filter_complex".to_string());
        args.push(filter_arg);
    }
    for node in &outputs {
        args.extend(output_args(node, &names)?);
    }
    for node in &globals {
        args.extend(node.args().iter().map(Value::to_string));
    }
    match overwrite_output {
        Some(true) => args.push("-y".to_string()),
        Some(false) => args.push("-n".to_string()),
        None => {}
    }

    tracing::debug!(?args, "compiled ffmpeg arguments");
    Ok(args)
}

/// `opts.cmd` followed by [`get_args`].
pub fn compile(streams: &[OutputStream], opts: &CompileOpts) -> FfgraphResult<Vec<String>> {
    if opts.cmd.is_empty() {
        return Err(FfgraphError::validation("command must not be empty"));
    }
    let mut cmdline = opts.cmd.clone();
    cmdline.extend(get_args(streams, opts.overwrite_output)?);
    Ok(cmdline)
}

impl OutputStream {
    pub fn get_args(&self, overwrite_output: Option<bool>) -> FfgraphResult<Vec<String>> {
        get_args(std::slice::from_ref(self), overwrite_output)
    }

    pub fn compile(&self, opts: &CompileOpts) -> FfgraphResult<Vec<String>> {
        compile(std::slice::from_ref(self), opts)
    }
}

/// Names of every (node, outgoing label) pair referenced in the command line: input index for
/// inputs, `s0`, `s1`, ... for filter outputs.
#[derive(Default)]
struct StreamNames {
    names: HashMap<(NodeRef, Label), String>,
}

impl StreamNames {
    fn insert(&mut self, node: NodeRef, label: Label, name: String) {
        self.names.insert((node, label), name);
    }

    fn allocate_filter_outputs(
        &mut self,
        filters: &[&NodeRef],
        sorted: &SortedGraph<NodeRef>,
    ) -> FfgraphResult<()> {
        let mut next = 0usize;
        for node in filters {
            let Some(map) = sorted.outgoing_edge_map(node) else {
                continue;
            };
            for (label, downstreams) in map {
                if downstreams.len() > 1 {
                    return Err(FfgraphError::compile(format!(
                        "encountered {} with multiple outgoing edges with same upstream label [{label}]; a `split` filter is probably required",
                        node.long_repr(true)
                    )));
                }
                self.insert((*node).clone(), label.clone(), format!("s{next}"));
                next += 1;
            }
        }
        Ok(())
    }

    fn get(&self, node: &NodeRef, label: &Label) -> FfgraphResult<&str> {
        self.names
            .get(&(node.clone(), label.clone()))
            .map(String::as_str)
            .ok_or_else(|| {
                FfgraphError::compile(format!(
                    "stream [{label}] of {} is not produced by any input or filter",
                    node.long_repr(true)
                ))
            })
    }

    /// Reference to the upstream side of `edge`. In the final `-map` context, input streams
    /// are written without brackets.
    fn upstream_ref(&self, edge: &DagEdge<NodeRef>, final_arg: bool) -> FfgraphResult<String> {
        let name = self.get(&edge.upstream_node, &edge.upstream_label)?;
        let body = match &edge.upstream_selector {
            Some(sel) => format!("{name}:{sel}"),
            None => name.to_string(),
        };
        if final_arg && edge.upstream_node.kind() == NodeKind::Input {
            Ok(body)
        } else {
            Ok(format!("[{body}]"))
        }
    }
}

fn input_args(node: &NodeRef) -> FfgraphResult<Vec<String>> {
    if node.name() != "input" {
        return Err(FfgraphError::compile(format!(
            "unsupported input node: {}",
            node.long_repr(true)
        )));
    }
    let mut kwargs = node.kwargs().clone();
    let filename = take_filename(node, &mut kwargs)?;
    let mut args = Vec::new();
    if let Some(fmt) = kwargs.remove("format").filter(|v| !v.is_null()) {
        args.extend(["-f".to_string(), fmt.to_string()]);
    }
    if let Some(size) = kwargs.remove("video_size").filter(|v| !v.is_null()) {
        args.extend(["-video_size".to_string(), video_size(&size)]);
    }
    args.extend(kwargs_to_cmd_line_args(&kwargs));
    args.extend(["-i".to_string(), filename]);
    Ok(args)
}

fn output_args(node: &NodeRef, names: &StreamNames) -> FfgraphResult<Vec<String>> {
    if node.name() != "output" {
        return Err(FfgraphError::compile(format!(
            "unsupported output node: {}",
            node.long_repr(true)
        )));
    }
    let incoming = node.incoming_edges();
    if incoming.is_empty() {
        return Err(FfgraphError::compile(format!(
            "output node {} has no mapped streams",
            node.long_repr(true)
        )));
    }

    let mut args = Vec::new();
    for edge in &incoming {
        let stream = names.upstream_ref(edge, true)?;
        if stream != "0" || incoming.len() > 1 {
            args.extend(["-map".to_string(), stream]);
        }
    }

    let mut kwargs = node.kwargs().clone();
    let filename = take_filename(node, &mut kwargs)?;
    for (key, flag) in [
        ("format", "-f"),
        ("video_bitrate", "-b:v"),
        ("audio_bitrate", "-b:a"),
    ] {
        if let Some(v) = kwargs.remove(key).filter(|v| !v.is_null()) {
            args.extend([flag.to_string(), v.to_string()]);
        }
    }
    if let Some(size) = kwargs.remove("video_size").filter(|v| !v.is_null()) {
        args.extend(["-video_size".to_string(), video_size(&size)]);
    }
    args.extend(kwargs_to_cmd_line_args(&kwargs));
    args.push(filename);
    Ok(args)
}

fn take_filename(node: &NodeRef, kwargs: &mut Kwargs) -> FfgraphResult<String> {
    kwargs
        .remove("filename")
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .ok_or_else(|| {
            FfgraphError::compile(format!("{} has no filename", node.long_repr(true)))
        })
}

/// `[in...]name=params[out...]` for one filter node.
fn filter_spec(
    node: &NodeRef,
    sorted: &SortedGraph<NodeRef>,
    names: &StreamNames,
) -> FfgraphResult<String> {
    let outgoing = sorted.outgoing_edges(node);
    let mut spec = String::new();
    for edge in node.incoming_edges() {
        spec.push_str(&names.upstream_ref(&edge, false)?);
    }
    spec.push_str(&filter_body(node, outgoing.len()));
    for edge in &outgoing {
        spec.push('[');
        spec.push_str(names.get(&edge.upstream_node, &edge.upstream_label)?);
        spec.push(']');
    }
    Ok(spec)
}

/// Escaped `name=arg:arg:key=value` text. `split`/`asplit` take their output count from the
/// number of consumers.
fn filter_body(node: &NodeRef, outgoing_count: usize) -> String {
    let split_args;
    let args = if matches!(node.name(), "split" | "asplit") {
        split_args = [Value::from(outgoing_count)];
        &split_args[..]
    } else {
        node.args()
    };

    let mut params = args
        .iter()
        .map(|v| escape_value(v, FILTER_ARG_CHARS))
        .collect::<Vec<_>>();
    params.extend(node.kwargs().iter().filter(|(_, v)| !v.is_null()).map(|(k, v)| {
        format!(
            "{}={}",
            escape_chars(k, FILTER_ARG_CHARS),
            escape_value(v, FILTER_ARG_CHARS)
        )
    }));

    let mut body = escape_chars(node.name(), FILTER_ARG_CHARS);
    if !params.is_empty() {
        body.push('=');
        body.push_str(&params.join(":"));
    }
    escape_chars(&body, FILTER_SPEC_CHARS)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
