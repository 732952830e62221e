//! Filter operators.
//!
//! Every named filter is a thin wrapper over [`filter`] / [`filter_multi_output`] that fixes the
//! filter name, arranges positional arguments and limits the number of inputs. Anything not
//! covered here can be expressed with the generic operators.

use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::foundation::escape::{DRAWTEXT_TEXT_CHARS, escape_chars};
use crate::foundation::value::{Kwargs, Value};
use crate::graph::dag::Label;
use crate::graph::node::{Arity, NodeKind, NodeRef};
use crate::graph::stream::{FilterableStream, MultiOutput, StreamSpec};

fn filter_node(
    spec: StreamSpec,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
    arity: Arity,
) -> FfgraphResult<NodeRef> {
    NodeRef::new(
        NodeKind::Filter,
        name,
        spec.into_inputs(),
        args,
        kwargs,
        arity,
    )
}

fn single(
    spec: impl Into<StreamSpec>,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
    arity: Arity,
) -> FfgraphResult<FilterableStream> {
    let node = filter_node(spec.into(), name, args, kwargs, arity)?;
    Ok(FilterableStream::of(node, Label::Default))
}

/// Arbitrary filter with any number of inputs and one output.
///
/// ```
/// # use ffgraph::{input, kwargs, args};
/// let s = input("in.mp4", kwargs! {})?.filter("fps", args![], kwargs! { "fps" => 25, "round" => "up" })?;
/// # Ok::<(), ffgraph::FfgraphError>(())
/// ```
pub fn filter(
    spec: impl Into<StreamSpec>,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
) -> FfgraphResult<FilterableStream> {
    single(spec, name, args, kwargs, Arity::at_least(1))
}

/// Arbitrary filter whose outputs are picked through the returned [`MultiOutput`].
pub fn filter_multi_output(
    spec: impl Into<StreamSpec>,
    name: &str,
    args: Vec<Value>,
    kwargs: Kwargs,
) -> FfgraphResult<MultiOutput> {
    let node = filter_node(spec.into(), name, args, kwargs, Arity::at_least(1))?;
    Ok(MultiOutput::new(node))
}

/// Concatenate segments. `v`/`a` kwargs give the video/audio stream count per segment
/// (defaults 1 and 0); `n` is derived from the stream count.
pub fn concat(streams: &[FilterableStream], mut kwargs: Kwargs) -> FfgraphResult<FilterableStream> {
    let count_of = |key: &str, default: i64| -> FfgraphResult<i64> {
        match kwargs.get(key) {
            None => Ok(default),
            Some(v) => v.as_i64().filter(|n| *n >= 0).ok_or_else(|| {
                FfgraphError::validation(format!(
                    "concat: `{key}` must be a non-negative integer; got {}",
                    v.repr()
                ))
            }),
        }
    };
    let video = count_of("v", 1)?;
    let audio = count_of("a", 0)?;
    let per_segment = video.checked_add(audio).ok_or_else(|| {
        FfgraphError::validation(format!(
            "concat: stream counts per segment overflow (v={video}, a={audio})"
        ))
    })?;
    let total = streams.len() as i64;
    if per_segment == 0 || total % per_segment != 0 {
        return Err(FfgraphError::validation(format!(
            "concat: expected input streams to have length multiple of {per_segment} (v={video}, a={audio}); got {total}"
        )));
    }
    kwargs.insert("n".to_string(), Value::Int(total / per_segment));
    single(streams, "concat", Vec::new(), kwargs, Arity::at_least(1))
}

impl FilterableStream {
    pub fn filter(&self, name: &str, args: Vec<Value>, kwargs: Kwargs) -> FfgraphResult<Self> {
        filter(self, name, args, kwargs)
    }

    pub fn filter_multi_output(
        &self,
        name: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> FfgraphResult<MultiOutput> {
        filter_multi_output(self, name, args, kwargs)
    }

    /// Change the PTS of the input frames, e.g. `setpts("PTS-STARTPTS")`.
    pub fn setpts(&self, expr: &str) -> FfgraphResult<Self> {
        single(
            self,
            "setpts",
            vec![Value::from(expr)],
            Kwargs::new(),
            Arity::exactly(1),
        )
    }

    /// Keep a section of the input (`start`, `end`, `start_frame`, `end_frame`, `duration`...).
    pub fn trim(&self, kwargs: Kwargs) -> FfgraphResult<Self> {
        single(self, "trim", Vec::new(), kwargs, Arity::exactly(1))
    }

    /// Overlay `overlay` on top of this stream. `eof_action` defaults to `repeat`.
    pub fn overlay(&self, overlay: &FilterableStream, mut kwargs: Kwargs) -> FfgraphResult<Self> {
        kwargs
            .entry("eof_action".to_string())
            .or_insert_with(|| Value::from("repeat"));
        single(
            [self.clone(), overlay.clone()],
            "overlay",
            Vec::new(),
            kwargs,
            Arity::exactly(2),
        )
    }

    pub fn hflip(&self) -> FfgraphResult<Self> {
        single(self, "hflip", Vec::new(), Kwargs::new(), Arity::exactly(1))
    }

    pub fn vflip(&self) -> FfgraphResult<Self> {
        single(self, "vflip", Vec::new(), Kwargs::new(), Arity::exactly(1))
    }

    /// Crop to `width`x`height` at (`x`, `y`). Rendered as `crop=width:height:x:y`.
    pub fn crop(
        &self,
        x: impl Into<Value>,
        y: impl Into<Value>,
        width: impl Into<Value>,
        height: impl Into<Value>,
        kwargs: Kwargs,
    ) -> FfgraphResult<Self> {
        single(
            self,
            "crop",
            vec![width.into(), height.into(), x.into(), y.into()],
            kwargs,
            Arity::exactly(1),
        )
    }

    /// Draw a colored box. `thickness` maps to the `t` option.
    #[allow(clippy::too_many_arguments)]
    pub fn drawbox(
        &self,
        x: impl Into<Value>,
        y: impl Into<Value>,
        width: impl Into<Value>,
        height: impl Into<Value>,
        color: &str,
        thickness: Option<Value>,
        mut kwargs: Kwargs,
    ) -> FfgraphResult<Self> {
        if let Some(t) = thickness {
            kwargs.insert("t".to_string(), t);
        }
        single(
            self,
            "drawbox",
            vec![x.into(), y.into(), width.into(), height.into(), Value::from(color)],
            kwargs,
            Arity::exactly(1),
        )
    }

    /// Draw text. With `escape_text` the text is escaped for the drawtext expansion syntax.
    /// `x`/`y` are only passed when non-zero.
    pub fn drawtext(
        &self,
        text: Option<&str>,
        x: impl Into<Value>,
        y: impl Into<Value>,
        escape_text: bool,
        mut kwargs: Kwargs,
    ) -> FfgraphResult<Self> {
        if let Some(text) = text {
            let text = if escape_text {
                escape_chars(text, DRAWTEXT_TEXT_CHARS)
            } else {
                text.to_string()
            };
            kwargs.insert("text".to_string(), Value::Str(text));
        }
        for (key, v) in [("x", x.into()), ("y", y.into())] {
            if !v.is_zero() && !v.is_null() {
                kwargs.insert(key.to_string(), v);
            }
        }
        single(self, "drawtext", Vec::new(), kwargs, Arity::exactly(1))
    }

    /// Concatenate this stream followed by `others`.
    pub fn concat(&self, others: &[FilterableStream], kwargs: Kwargs) -> FfgraphResult<Self> {
        let mut streams = Vec::with_capacity(others.len() + 1);
        streams.push(self.clone());
        streams.extend_from_slice(others);
        concat(&streams, kwargs)
    }

    /// Zoom and pan (`zoom`, `x`, `y`, `d`, `s`, `fps`...).
    pub fn zoompan(&self, kwargs: Kwargs) -> FfgraphResult<Self> {
        single(self, "zoompan", Vec::new(), kwargs, Arity::exactly(1))
    }

    /// Hue and saturation (`h`, `s`, `H`, `b`).
    pub fn hue(&self, kwargs: Kwargs) -> FfgraphResult<Self> {
        single(self, "hue", Vec::new(), kwargs, Arity::exactly(1))
    }

    /// Remix color channels (`rr`, `rg`, ... `aa`).
    pub fn colorchannelmixer(&self, kwargs: Kwargs) -> FfgraphResult<Self> {
        single(
            self,
            "colorchannelmixer",
            Vec::new(),
            kwargs,
            Arity::exactly(1),
        )
    }

    /// Duplicate a video stream. The number of outputs is taken from how many are consumed.
    pub fn split(&self) -> FfgraphResult<MultiOutput> {
        let node = filter_node(
            self.into(),
            "split",
            Vec::new(),
            Kwargs::new(),
            Arity::exactly(1),
        )?;
        Ok(MultiOutput::new(node))
    }

    /// Audio counterpart of [`split`](Self::split).
    pub fn asplit(&self) -> FfgraphResult<MultiOutput> {
        let node = filter_node(
            self.into(),
            "asplit",
            Vec::new(),
            Kwargs::new(),
            Arity::exactly(1),
        )?;
        Ok(MultiOutput::new(node))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/filters.rs"]
mod tests;
