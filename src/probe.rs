use std::time::Duration;

use crate::{
    compile::args::kwargs_to_cmd_line_args,
    foundation::{
        error::{FfgraphError, FfgraphResult},
        value::{Kwargs, Value},
    },
    run::process::{Pipes, RunningProcess},
};

/// Options for [`probe`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeOpts {
    /// Probe executable, default `ffprobe`.
    pub cmd: String,
    /// Extra flags, rendered like output kwargs (`-key value`, sorted).
    pub extra: Kwargs,
    pub timeout: Option<Duration>,
}

impl Default for ProbeOpts {
    fn default() -> Self {
        Self {
            cmd: "ffprobe".to_string(),
            extra: Kwargs::new(),
            timeout: None,
        }
    }
}

impl ProbeOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = cmd.into();
        self
    }

    /// Add `-key value` (or a bare `-key` for [`Value::Null`]).
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parsed `ffprobe -of json` document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProbeData {
    #[serde(default)]
    pub format: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub streams: Vec<serde_json::Value>,
    /// Any other top-level sections (`chapters`, `programs`...).
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl ProbeData {
    pub fn from_json(bytes: &[u8]) -> FfgraphResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| FfgraphError::serde(format!("ffprobe json parse failed: {e}")))
    }

    /// Streams whose `codec_type` equals `codec_type` (`video`, `audio`...).
    pub fn streams_of_type<'a>(
        &'a self,
        codec_type: &'a str,
    ) -> impl Iterator<Item = &'a serde_json::Value> + 'a {
        self.streams
            .iter()
            .filter(move |s| s.get("codec_type").and_then(|v| v.as_str()) == Some(codec_type))
    }

    /// Container duration in seconds, if reported.
    pub fn duration_secs(&self) -> Option<f64> {
        match self.format.get("duration")? {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// Full probe command line for `filename`.
pub fn probe_cmdline(filename: &str, opts: &ProbeOpts) -> Vec<String> {
    let mut cmdline = vec![
        opts.cmd.clone(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        "-of".to_string(),
        "json".to_string(),
    ];
    cmdline.extend(kwargs_to_cmd_line_args(&opts.extra));
    cmdline.push(filename.to_string());
    cmdline
}

/// Inspect `filename` with ffprobe.
#[tracing::instrument(skip(opts))]
pub fn probe(filename: &str, opts: &ProbeOpts) -> FfgraphResult<ProbeData> {
    let cmdline = probe_cmdline(filename, opts);
    let pipes = Pipes {
        stdin: false,
        stdout: true,
        stderr: true,
    };
    let process = RunningProcess::spawn(&cmdline, pipes, opts.timeout)?;
    let tool = process.tool().to_string();
    let out = process.communicate(None)?.check(&tool)?;
    ProbeData::from_json(&out.stdout)
}

#[cfg(test)]
#[path = "../tests/unit/probe.rs"]
mod tests;
