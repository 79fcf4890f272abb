use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use texttool::{Delivery, Reply, TextTool, TextToolSettings};

#[derive(Parser, Debug)]
#[command(name = "texttool", version)]
struct Cli {
    /// Settings JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render text into a PNG, or a zip of PNGs for multi-segment modes.
    Generate(GenerateArgs),
    /// List registered font aliases.
    FontList,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Read the argument string from stdin instead of the command line.
    #[arg(long, default_value_t = false)]
    stdin: bool,

    /// Give up on a batch after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// `key:value` parameters followed by the text, e.g. `mode:word dpi:144 hello world`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match &cli.config {
        Some(path) => TextToolSettings::from_path(path)?,
        None => TextToolSettings::default(),
    };
    let tool = TextTool::new(settings)?;

    match cli.cmd {
        Command::Generate(args) => cmd_generate(&tool, args),
        Command::FontList => {
            println!("{}", tool.font_list());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_generate(tool: &TextTool, args: GenerateArgs) -> anyhow::Result<()> {
    let raw = if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read arguments from stdin")?;
        buf
    } else {
        args.args.join(" ")
    };

    let delivery = match tool.generate(&raw)? {
        Reply::Delivered(delivery) => delivery,
        Reply::Queued(ticket) => match args.timeout_ms {
            Some(ms) => ticket.wait_timeout(Duration::from_millis(ms))?,
            None => ticket.wait()?,
        },
        Reply::Text(text) => {
            println!("{text}");
            return Ok(());
        }
    };

    if let Delivery::Archive { failures, .. } = &delivery {
        for f in failures {
            eprintln!("segment {} ({:?}) failed: {}", f.index, f.text, f.error);
        }
    }

    let path = write_delivery(&args.out, &delivery)?;
    println!("{}", path.display());
    Ok(())
}

fn write_delivery(dir: &Path, delivery: &Delivery) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let path = dir.join(delivery.file_name());
    std::fs::write(&path, delivery.bytes())
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(path)
}
