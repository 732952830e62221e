use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::foundation::value::{Kwargs, Value};
use crate::graph::dag::Label;
use crate::graph::node::{Arity, NodeKind, NodeRef};
use crate::graph::stream::{FilterableStream, OutputStream, StreamHandle};

/// Media source (`-i filename`). Remaining kwargs become input options, e.g. `ss`, `t`,
/// `format`/`f`, `video_size`.
pub fn input(filename: impl Into<String>, kwargs: Kwargs) -> FfgraphResult<FilterableStream> {
    let kwargs = with_filename("input", filename.into(), normalize_format("input", kwargs)?)?;
    let node = NodeRef::new(
        NodeKind::Input,
        "input",
        Vec::new(),
        Vec::new(),
        kwargs,
        Arity::NONE,
    )?;
    Ok(FilterableStream::of(node, Label::Default))
}

/// Output file/URL fed by one stream.
pub fn output(
    stream: &FilterableStream,
    filename: impl Into<String>,
    kwargs: Kwargs,
) -> FfgraphResult<OutputStream> {
    output_multi(std::slice::from_ref(stream), filename, kwargs)
}

/// Output file/URL fed by several streams, mapped in the given order.
pub fn output_multi(
    streams: &[FilterableStream],
    filename: impl Into<String>,
    kwargs: Kwargs,
) -> FfgraphResult<OutputStream> {
    let kwargs = with_filename("output", filename.into(), normalize_format("output", kwargs)?)?;
    let inputs = streams
        .iter()
        .enumerate()
        .map(|(i, s)| (Label::Index(i), s.as_stream().clone()))
        .collect();
    let node = NodeRef::new(
        NodeKind::Output,
        "output",
        inputs,
        Vec::new(),
        kwargs,
        NodeKind::Output.default_arity(),
    )?;
    Ok(OutputStream::of(node))
}

/// Combine several outputs into one invocation.
pub fn merge_outputs(streams: &[OutputStream]) -> FfgraphResult<OutputStream> {
    let inputs = streams
        .iter()
        .enumerate()
        .map(|(i, s)| (Label::Index(i), s.as_stream().clone()))
        .collect();
    let node = NodeRef::new(
        NodeKind::MergeOutputs,
        "merge_outputs",
        inputs,
        Vec::new(),
        Kwargs::new(),
        NodeKind::MergeOutputs.default_arity(),
    )?;
    Ok(OutputStream::of(node))
}

/// Overwrite output files without asking (`-y`).
pub fn overwrite_output(stream: &OutputStream) -> FfgraphResult<OutputStream> {
    global_node(stream, "overwrite_output", vec![Value::from("-y")])
}

/// Extra command-line arguments emitted verbatim after all outputs.
pub fn global_args<I, S>(stream: &OutputStream, args: I) -> FfgraphResult<OutputStream>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args = args
        .into_iter()
        .map(|a| Value::Str(a.into()))
        .collect::<Vec<_>>();
    if args.is_empty() {
        return Err(FfgraphError::validation(
            "global_args: at least one argument is required",
        ));
    }
    global_node(stream, "global_args", args)
}

fn global_node(stream: &OutputStream, name: &str, args: Vec<Value>) -> FfgraphResult<OutputStream> {
    let node = NodeRef::new(
        NodeKind::Global,
        name,
        vec![(Label::Default, stream.as_stream().clone())],
        args,
        Kwargs::new(),
        NodeKind::Global.default_arity(),
    )?;
    Ok(OutputStream::of(node))
}

fn normalize_format(op: &str, mut kwargs: Kwargs) -> FfgraphResult<Kwargs> {
    if let Some(fmt) = kwargs.remove("f") {
        if kwargs.contains_key("format") {
            return Err(FfgraphError::validation(format!(
                "{op}: can't specify both `format` and `f` kwargs"
            )));
        }
        kwargs.insert("format".to_string(), fmt);
    }
    Ok(kwargs)
}

fn with_filename(op: &str, filename: String, mut kwargs: Kwargs) -> FfgraphResult<Kwargs> {
    if kwargs.contains_key("filename") {
        return Err(FfgraphError::validation(format!(
            "{op}: filename given both positionally and as a kwarg"
        )));
    }
    kwargs.insert("filename".to_string(), Value::Str(filename));
    Ok(kwargs)
}

impl FilterableStream {
    /// Send this stream to `filename`.
    pub fn output(&self, filename: impl Into<String>, kwargs: Kwargs) -> FfgraphResult<OutputStream> {
        output(self, filename, kwargs)
    }
}

impl OutputStream {
    /// New output node with `stream` appended to this output's mapped streams.
    pub fn map(&self, stream: &FilterableStream) -> FfgraphResult<OutputStream> {
        let node = self.node();
        if node.kind() != NodeKind::Output {
            return Err(FfgraphError::validation(format!(
                "map: expected an output node; got {} node {}",
                node.kind(),
                node.long_repr(false)
            )));
        }
        let node = node.with_appended_input(stream.as_stream().clone())?;
        Ok(OutputStream::of(node))
    }

    pub fn overwrite_output(&self) -> FfgraphResult<OutputStream> {
        overwrite_output(self)
    }

    pub fn global_args<I, S>(&self, args: I) -> FfgraphResult<OutputStream>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        global_args(self, args)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/io.rs"]
mod tests;
