use std::time::Duration;

/// Convenience result type used across ffgraph.
pub type FfgraphResult<T> = Result<T, FfgraphError>;

/// Top-level error taxonomy for graph construction, compilation and process execution.
#[derive(thiserror::Error, Debug)]
pub enum FfgraphError {
    /// Invalid operator input: wrong stream kind, arity, or conflicting parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// The node graph is not a DAG.
    #[error("graph error: {0}")]
    Structural(String),

    /// The graph is well-formed but cannot be expressed as a command line.
    #[error("compile error: {0}")]
    Compile(String),

    /// An external tool exited with a non-zero status.
    ///
    /// `stdout`/`stderr` hold whatever was captured; they are empty when the stream was not piped.
    #[error("{tool} error (see stderr output for detail)")]
    Process {
        /// Executable that failed (e.g. `ffmpeg`).
        tool: String,
        /// Exit code, if the process was not terminated by a signal.
        code: Option<i32>,
        /// Captured standard output.
        stdout: Vec<u8>,
        /// Captured standard error.
        stderr: Vec<u8>,
    },

    /// An external tool did not finish within the caller-supplied timeout and was killed.
    #[error("{tool} timed out after {after:?}")]
    Timeout {
        /// Executable that timed out.
        tool: String,
        /// Configured timeout.
        after: Duration,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FfgraphError {
    /// Build a [`FfgraphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FfgraphError::Structural`] value.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Build a [`FfgraphError::Compile`] value.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// Build a [`FfgraphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Captured stderr of a failed process, if any.
    pub fn stderr_output(&self) -> Option<&[u8]> {
        match self {
            Self::Process { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Captured stdout of a failed process, if any.
    pub fn stdout_output(&self) -> Option<&[u8]> {
        match self {
            Self::Process { stdout, .. } => Some(stdout),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
