//! ffgraph builds ffmpeg command lines from a graph of immutable nodes.
//!
//! - Start from [`input`] and chain filters on the returned [`FilterableStream`]
//! - Finish with [`FilterableStream::output`], optionally [`merge_outputs`] / [`overwrite_output`]
//! - Turn the [`OutputStream`] into arguments with [`get_args`] / [`compile`], or launch it with
//!   [`run`] / [`run_async`]
//!
//! ```
//! use ffgraph::{input, kwargs};
//!
//! let args = input("in.mp4", kwargs! {})?
//!     .trim(kwargs! { "start_frame" => 10, "end_frame" => 20 })?
//!     .output("out.mp4", kwargs! {})?
//!     .get_args(None)?;
//! assert_eq!(
//!     args,
//!     [
//!         "-i",
//!         "in.mp4",
//!         "-filter_complex",
//!         "[0]trim=end_frame=20:start_frame=10[s0]",
//!         "-map",
//!         "[s0]",
//!         "out.mp4",
//!     ]
//! );
//! # Ok::<(), ffgraph::FfgraphError>(())
//! ```
#![forbid(unsafe_code)]

mod compile;
mod document;
mod foundation;
mod graph;
mod ops;
mod probe;
mod run;
mod view;

pub use crate::foundation::error::{FfgraphError, FfgraphResult};
pub use crate::foundation::escape::{
    DRAWTEXT_TEXT_CHARS, FILTER_ARG_CHARS, FILTER_SPEC_CHARS, escape_chars, escape_value,
};
pub use crate::foundation::hash::{Fingerprint, fingerprint_value};
pub use crate::foundation::value::{Kwargs, Value};

pub use crate::graph::dag::{
    DagEdge, DagNode, Label, OutgoingEdge, OutgoingEdgeMap, SortedGraph, topo_sort,
};
pub use crate::graph::node::{Arity, IncomingEdge, Node, NodeKind, NodeRef};
pub use crate::graph::stream::{
    AnyStream, FilterableStream, MultiOutput, OutputStream, Stream, StreamHandle, StreamSpec,
};

pub use crate::ops::filters::{concat, filter, filter_multi_output};
pub use crate::ops::io::{
    global_args, input, merge_outputs, output, output_multi, overwrite_output,
};
pub use crate::ops::registry::{OperatorCall, OperatorFn, OperatorRegistry};

pub use crate::compile::args::kwargs_to_cmd_line_args;
pub use crate::compile::compiler::{CompileOpts, compile, get_args};
pub use crate::document::{GraphDocument, NodeSpec};
pub use crate::probe::{ProbeData, ProbeOpts, probe, probe_cmdline};
pub use crate::run::process::{ProcessOutput, RunOpts, RunningProcess, run, run_async};
pub use crate::view::dot::{DotOpts, render_png, to_dot, view};
