//! Operators addressable by name.
//!
//! The typed methods on [`FilterableStream`] / [`OutputStream`] are the primary API. The registry
//! exposes the same catalog behind string keys so graphs can be assembled from data (see
//! `GraphDocument`) and so callers can plug in their own constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::foundation::value::{Kwargs, Value};
use crate::graph::node::NodeRef;
use crate::graph::stream::{AnyStream, FilterableStream, OutputStream, StreamHandle, StreamSpec};
use crate::ops::{filters, io};

/// Arguments of one operator invocation.
#[derive(Clone, Debug, Default)]
pub struct OperatorCall {
    pub inputs: Vec<AnyStream>,
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
}

impl OperatorCall {
    pub fn new(inputs: Vec<AnyStream>, args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self {
            inputs,
            args,
            kwargs,
        }
    }

    pub fn filterable_inputs(&self, op: &str) -> FfgraphResult<Vec<FilterableStream>> {
        self.inputs
            .iter()
            .cloned()
            .map(|s| {
                s.into_filterable()
                    .map_err(|e| FfgraphError::validation(format!("{op}: {e}")))
            })
            .collect()
    }

    pub fn output_inputs(&self, op: &str) -> FfgraphResult<Vec<OutputStream>> {
        self.inputs
            .iter()
            .cloned()
            .map(|s| {
                s.into_output()
                    .map_err(|e| FfgraphError::validation(format!("{op}: {e}")))
            })
            .collect()
    }

    fn one_filterable(&self, op: &str) -> FfgraphResult<FilterableStream> {
        let mut inputs = self.filterable_inputs(op)?;
        if inputs.len() != 1 {
            return Err(FfgraphError::validation(format!(
                "{op}: expected exactly 1 input stream; got {}",
                inputs.len()
            )));
        }
        Ok(inputs.remove(0))
    }

    fn one_output(&self, op: &str) -> FfgraphResult<OutputStream> {
        let mut inputs = self.output_inputs(op)?;
        if inputs.len() != 1 {
            return Err(FfgraphError::validation(format!(
                "{op}: expected exactly 1 output stream; got {}",
                inputs.len()
            )));
        }
        Ok(inputs.remove(0))
    }

    fn arg(&self, op: &str, i: usize, what: &str) -> FfgraphResult<Value> {
        self.args.get(i).cloned().ok_or_else(|| {
            FfgraphError::validation(format!("{op}: missing positional argument {i} ({what})"))
        })
    }

    /// Positional argument `i` if present, otherwise the `key` kwarg (which is then consumed).
    fn arg_or_kwarg(&self, i: usize, key: &str, kwargs: &mut Kwargs) -> Option<Value> {
        match self.args.get(i) {
            Some(v) => Some(v.clone()),
            None => kwargs.remove(key),
        }
    }

    /// Reject calls carrying more than `max` positional arguments.
    pub fn expect_args(&self, op: &str, max: usize) -> FfgraphResult<()> {
        if self.args.len() > max {
            return Err(FfgraphError::validation(format!(
                "{op}: expected at most {max} positional argument(s); got {}",
                self.args.len()
            )));
        }
        Ok(())
    }
}

/// Constructor behind a registry entry.
pub type OperatorFn = Arc<dyn Fn(&OperatorCall) -> FfgraphResult<NodeRef> + Send + Sync>;

/// Name-keyed operator catalog.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    ops: BTreeMap<String, OperatorFn>,
}

impl OperatorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in operator.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register("input", op_input);
        reg.register("output", op_output);
        reg.register("merge_outputs", op_merge_outputs);
        reg.register("overwrite_output", op_overwrite_output);
        reg.register("global_args", op_global_args);
        reg.register("filter", op_filter);
        reg.register("filter_multi_output", op_filter);
        reg.register("setpts", op_setpts);
        reg.register("trim", |c: &OperatorCall| {
            c.expect_args("trim", 0)?;
            node_of(c.one_filterable("trim")?.trim(c.kwargs.clone())?)
        });
        reg.register("overlay", op_overlay);
        reg.register("hflip", |c: &OperatorCall| {
            c.expect_args("hflip", 0)?;
            node_of(c.one_filterable("hflip")?.hflip()?)
        });
        reg.register("vflip", |c: &OperatorCall| {
            c.expect_args("vflip", 0)?;
            node_of(c.one_filterable("vflip")?.vflip()?)
        });
        reg.register("crop", op_crop);
        reg.register("drawbox", op_drawbox);
        reg.register("drawtext", op_drawtext);
        reg.register("concat", |c: &OperatorCall| {
            c.expect_args("concat", 0)?;
            node_of(filters::concat(
                &c.filterable_inputs("concat")?,
                c.kwargs.clone(),
            )?)
        });
        reg.register("zoompan", |c: &OperatorCall| {
            c.expect_args("zoompan", 0)?;
            node_of(c.one_filterable("zoompan")?.zoompan(c.kwargs.clone())?)
        });
        reg.register("hue", |c: &OperatorCall| {
            c.expect_args("hue", 0)?;
            node_of(c.one_filterable("hue")?.hue(c.kwargs.clone())?)
        });
        reg.register("colorchannelmixer", |c: &OperatorCall| {
            c.expect_args("colorchannelmixer", 0)?;
            node_of(
                c.one_filterable("colorchannelmixer")?
                    .colorchannelmixer(c.kwargs.clone())?,
            )
        });
        reg.register("split", |c: &OperatorCall| {
            c.expect_args("split", 0)?;
            Ok(c.one_filterable("split")?.split()?.node().clone())
        });
        reg.register("asplit", |c: &OperatorCall| {
            c.expect_args("asplit", 0)?;
            Ok(c.one_filterable("asplit")?.asplit()?.node().clone())
        });
        reg
    }

    /// Add or replace an operator.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&OperatorCall) -> FfgraphResult<NodeRef> + Send + Sync + 'static,
    {
        self.ops.insert(name.into(), Arc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Run operator `name`. Unregistered names are treated as a generic filter of that name.
    pub fn apply(&self, name: &str, call: &OperatorCall) -> FfgraphResult<NodeRef> {
        match self.ops.get(name) {
            Some(op) => op(call),
            None => {
                tracing::debug!(operator = name, "no registered operator; using generic filter");
                generic_filter(name, call, call.args.clone())
            }
        }
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("ops", &self.ops.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn node_of(s: impl StreamHandle) -> FfgraphResult<NodeRef> {
    Ok(s.as_stream().node().clone())
}

fn spec_of(streams: Vec<FilterableStream>) -> StreamSpec {
    match <[FilterableStream; 1]>::try_from(streams) {
        Ok([one]) => StreamSpec::Single(one),
        Err(many) => StreamSpec::List(many),
    }
}

fn generic_filter(name: &str, call: &OperatorCall, args: Vec<Value>) -> FfgraphResult<NodeRef> {
    let spec = spec_of(call.filterable_inputs(name)?);
    let multi = filters::filter_multi_output(spec, name, args, call.kwargs.clone())?;
    Ok(multi.node().clone())
}

fn filename_and_kwargs(op: &str, call: &OperatorCall) -> FfgraphResult<(String, Kwargs)> {
    call.expect_args(op, 1)?;
    let mut kwargs = call.kwargs.clone();
    let filename = call
        .arg_or_kwarg(0, "filename", &mut kwargs)
        .filter(|v| !v.is_null())
        .ok_or_else(|| FfgraphError::validation(format!("{op}: a filename must be provided")))?;
    Ok((filename.to_string(), kwargs))
}

fn op_input(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    if !call.inputs.is_empty() {
        return Err(FfgraphError::validation(format!(
            "input: expected no input streams; got {}",
            call.inputs.len()
        )));
    }
    let (filename, kwargs) = filename_and_kwargs("input", call)?;
    node_of(io::input(filename, kwargs)?)
}

fn op_output(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    let (filename, kwargs) = filename_and_kwargs("output", call)?;
    node_of(io::output_multi(
        &call.filterable_inputs("output")?,
        filename,
        kwargs,
    )?)
}

fn op_merge_outputs(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("merge_outputs", 0)?;
    node_of(io::merge_outputs(&call.output_inputs("merge_outputs")?)?)
}

fn op_overwrite_output(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("overwrite_output", 0)?;
    node_of(call.one_output("overwrite_output")?.overwrite_output()?)
}

fn op_global_args(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    let args = call.args.iter().map(Value::to_string).collect::<Vec<_>>();
    node_of(call.one_output("global_args")?.global_args(args)?)
}

/// `filter` / `filter_multi_output`: positional argument 0 is the filter name.
fn op_filter(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    let name = call.arg("filter", 0, "filter name")?;
    let Some(name) = name.as_str() else {
        return Err(FfgraphError::validation(format!(
            "filter: filter name must be a string; got {}",
            name.repr()
        )));
    };
    generic_filter(name, call, call.args[1..].to_vec())
}

fn op_setpts(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("setpts", 1)?;
    let mut kwargs = call.kwargs.clone();
    let expr = call
        .arg_or_kwarg(0, "expr", &mut kwargs)
        .ok_or_else(|| FfgraphError::validation("setpts: missing expression"))?;
    node_of(call.one_filterable("setpts")?.setpts(&expr.to_string())?)
}

fn op_overlay(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("overlay", 0)?;
    let inputs = call.filterable_inputs("overlay")?;
    let [main, over] = <[FilterableStream; 2]>::try_from(inputs).map_err(|v| {
        FfgraphError::validation(format!(
            "overlay: expected exactly 2 input streams; got {}",
            v.len()
        ))
    })?;
    node_of(main.overlay(&over, call.kwargs.clone())?)
}

fn op_crop(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("crop", 4)?;
    let s = call.one_filterable("crop")?;
    node_of(s.crop(
        call.arg("crop", 0, "x")?,
        call.arg("crop", 1, "y")?,
        call.arg("crop", 2, "width")?,
        call.arg("crop", 3, "height")?,
        call.kwargs.clone(),
    )?)
}

fn op_drawbox(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("drawbox", 6)?;
    let s = call.one_filterable("drawbox")?;
    let mut kwargs = call.kwargs.clone();
    let thickness = call.arg_or_kwarg(5, "thickness", &mut kwargs);
    let color = call.arg("drawbox", 4, "color")?.to_string();
    node_of(s.drawbox(
        call.arg("drawbox", 0, "x")?,
        call.arg("drawbox", 1, "y")?,
        call.arg("drawbox", 2, "width")?,
        call.arg("drawbox", 3, "height")?,
        &color,
        thickness,
        kwargs,
    )?)
}

/// Positional order: text, x, y, escape_text.
fn op_drawtext(call: &OperatorCall) -> FfgraphResult<NodeRef> {
    call.expect_args("drawtext", 4)?;
    let s = call.one_filterable("drawtext")?;
    let mut kwargs = call.kwargs.clone();
    let text = call
        .arg_or_kwarg(0, "text", &mut kwargs)
        .map(|v| v.to_string());
    let x = call.arg_or_kwarg(1, "x", &mut kwargs).unwrap_or(Value::Int(0));
    let y = call.arg_or_kwarg(2, "y", &mut kwargs).unwrap_or(Value::Int(0));
    let escape_text = match call.arg_or_kwarg(3, "escape_text", &mut kwargs) {
        None => true,
        Some(Value::Bool(b)) => b,
        Some(other) => {
            return Err(FfgraphError::validation(format!(
                "drawtext: escape_text must be a boolean; got {}",
                other.repr()
            )));
        }
    };
    node_of(s.drawtext(text.as_deref(), x, y, escape_text, kwargs)?)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/registry.rs"]
mod tests;
