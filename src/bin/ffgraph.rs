use std::{
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ffgraph", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ffmpeg command line for a graph document.
    Compile(CompileArgs),
    /// Compile a graph document and run it (requires `ffmpeg` on PATH).
    Run(RunArgs),
    /// Print `ffprobe` JSON for a media file.
    Probe(ProbeArgs),
    /// Print Graphviz DOT text for a graph document, or render it to PNG.
    Dot(DotArgs),
}

#[derive(Args, Debug)]
struct GraphArg {
    /// Graph document JSON (`-` reads stdin).
    #[arg(long)]
    graph: PathBuf,
}

#[derive(Args, Debug)]
struct OverwriteArgs {
    /// Append `-y`.
    #[arg(long, conflicts_with = "no_overwrite")]
    overwrite: bool,

    /// Append `-n`.
    #[arg(long)]
    no_overwrite: bool,
}

impl OverwriteArgs {
    fn policy(&self) -> Option<bool> {
        match (self.overwrite, self.no_overwrite) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Parser, Debug)]
struct CompileArgs {
    #[command(flatten)]
    graph: GraphArg,

    /// Executable placed in front of the arguments.
    #[arg(long, default_value = "ffmpeg")]
    cmd: String,

    #[command(flatten)]
    overwrite: OverwriteArgs,

    /// Print a JSON array instead of a shell-quoted line.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    graph: GraphArg,

    #[arg(long, default_value = "ffmpeg")]
    cmd: String,

    #[command(flatten)]
    overwrite: OverwriteArgs,

    /// Capture ffmpeg output instead of passing it through.
    #[arg(long)]
    quiet: bool,

    /// Kill ffmpeg after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Media file or URL.
    file: String,

    #[arg(long, default_value = "ffprobe")]
    cmd: String,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Parser, Debug)]
struct DotArgs {
    #[command(flatten)]
    graph: GraphArg,

    /// Include node arguments in labels.
    #[arg(long)]
    detail: bool,

    /// Hide edge labels.
    #[arg(long)]
    no_labels: bool,

    /// Render a PNG at this path through Graphviz `dot` instead of printing DOT text.
    #[arg(long)]
    png: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Run(args) => cmd_run(args),
        Command::Probe(args) => cmd_probe(args),
        Command::Dot(args) => cmd_dot(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_graph(path: &Path) -> anyhow::Result<Vec<ffgraph::OutputStream>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read graph document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("read graph document '{}'", path.display()))?
    };
    let doc = ffgraph::GraphDocument::from_json(&text)?;
    let streams = doc
        .build(&ffgraph::OperatorRegistry::with_builtins())
        .with_context(|| format!("build graph '{}'", path.display()))?;
    Ok(streams)
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let streams = read_graph(&args.graph.graph)?;
    let opts = ffgraph::CompileOpts::new()
        .cmd([args.cmd])
        .overwrite_output(args.overwrite.policy());
    let cmdline = ffgraph::compile(&streams, &opts)?;

    if args.json {
        println!("{}", serde_json::to_string(&cmdline)?);
    } else {
        let line = cmdline
            .iter()
            .map(|a| shell_quote(a))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let streams = read_graph(&args.graph.graph)?;
    let opts = ffgraph::RunOpts::new()
        .cmd([args.cmd])
        .overwrite_output(args.overwrite.policy())
        .quiet(args.quiet)
        .timeout(args.timeout_secs.map(Duration::from_secs));

    match ffgraph::run(&streams, &opts, None) {
        Ok(_) => Ok(()),
        Err(e) => {
            if let Some(stderr) = e.stderr_output().filter(|s| !s.is_empty()) {
                std::io::stderr().write_all(stderr).ok();
            }
            Err(e.into())
        }
    }
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let opts = ffgraph::ProbeOpts::new()
        .cmd(args.cmd)
        .timeout(args.timeout_secs.map(Duration::from_secs));
    let data =
        ffgraph::probe(&args.file, &opts).with_context(|| format!("probe '{}'", args.file))?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_dot(args: DotArgs) -> anyhow::Result<()> {
    let streams = read_graph(&args.graph.graph)?;
    let opts = ffgraph::DotOpts::new()
        .detail(args.detail)
        .show_labels(!args.no_labels);

    match args.png {
        Some(path) => {
            ffgraph::view(&streams, &opts, &path)
                .with_context(|| format!("render '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{}", ffgraph::to_dot(&streams, &opts)?),
    }
    Ok(())
}
