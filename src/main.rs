//! dirkit - flatten, print and annotate directory trees.
//!
//! Usage:
//!   dirkit flatten <SOURCE> <DEST>   Copy every file into one folder
//!   dirkit tree <PATH>               Print a directory tree
//!   dirkit annotate <BASE>           Add `File: <path>` comments to sources
//!   dirkit run <TOOL> ...            Run a tool as a child and stream its output
//!   dirkit --help                    Show help

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use dirkit_core::{AnnotateConfig, CollisionPolicy, FlattenConfig, IgnoreSet, Settings, TreeConfig};
use dirkit_ops::{AnnotationOutcome, Annotator, Flattener, RenderOptions, render_tree};
use dirkit_runner::{OutputStream, RunEvent, RunOutcome, ToolRequest, command_line, spawn};

#[derive(Parser)]
#[command(
    name = "dirkit",
    version,
    about = "Flatten, print and annotate directory trees",
    long_about = "dirkit bundles three small directory tools.\n\n\
                  `flatten` copies every file of a tree into one folder, naming each copy \
                  after its original path. `tree` prints the folder structure. `annotate` \
                  keeps a `File: <relative path>` comment at the top of source files."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Settings file (defaults to <config dir>/dirkit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Tool(ToolCommand),

    /// Run a tool as a child process and stream its output
    Run {
        /// Add the common ignore folders (node_modules, .git, dist, ...)
        #[arg(long)]
        common_folders: bool,

        /// Add the common ignore extensions (.log, .tmp, .pyc, ...)
        #[arg(long)]
        common_extensions: bool,

        #[command(subcommand)]
        tool: ToolCommand,
    },
}

#[derive(Subcommand, Clone)]
enum ToolCommand {
    /// Copy every file of a tree into one folder with path-based names
    Flatten(FlattenArgs),

    /// Print a directory tree
    Tree(TreeArgs),

    /// Add or update `File: <relative path>` comments
    Annotate(AnnotateArgs),
}

#[derive(Args, Clone)]
struct FlattenArgs {
    /// Source directory
    source: PathBuf,

    /// Destination directory (created if missing)
    destination: PathBuf,

    /// Folder name(s) to ignore
    #[arg(long, num_args = 0..)]
    ignore: Vec<String>,

    /// File extension(s) to ignore (e.g. .png .ico)
    #[arg(long = "ignore-ext", num_args = 0..)]
    ignore_ext: Vec<String>,

    /// What to do when two files map to the same name
    #[arg(long, value_enum, default_value_t = CollisionArg::Overwrite)]
    on_collision: CollisionArg,

    /// Show what would be copied without copying
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Clone)]
struct TreeArgs {
    /// Base folder path to visualize
    path: PathBuf,

    /// Folder name(s) to ignore
    #[arg(long, num_args = 0..)]
    ignore: Vec<String>,

    /// File extension(s) to ignore (e.g. .log .tmp)
    #[arg(long = "ignore-ext", num_args = 0..)]
    ignore_ext: Vec<String>,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Clone)]
struct AnnotateArgs {
    /// Base folder to process
    base: PathBuf,

    /// Annotate a fresh `<base>_copy` instead of the original
    #[arg(long, alias = "makeCopy")]
    make_copy: bool,

    /// File extensions to process (default: .ts .tsx)
    #[arg(long, num_args = 0..)]
    extensions: Vec<String>,

    /// Folder names to ignore (default: node_modules public .git .husky .next)
    #[arg(long, num_args = 0..)]
    ignore: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollisionArg {
    Overwrite,
    Skip,
    Rename,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Skip => CollisionPolicy::Skip,
            CollisionArg::Rename => CollisionPolicy::AutoRename,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings = match &cli.config {
        Some(path) => Settings::load(path),
        None => Settings::load_default(),
    }
    .context("Failed to load settings")?;

    match cli.command {
        Command::Tool(ToolCommand::Flatten(args)) => run_flatten(args, &settings)?,
        Command::Tool(ToolCommand::Tree(args)) => run_tree(args, &settings)?,
        Command::Tool(ToolCommand::Annotate(args)) => run_annotate(args, &settings)?,
        Command::Run {
            common_folders,
            common_extensions,
            tool,
        } => return run_child(tool, common_folders, common_extensions, cli.config),
    }

    Ok(ExitCode::SUCCESS)
}

/// Log to stderr so stdout stays clean for trees and JSON.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}

/// Settings defaults plus command line values.
fn merged_ignore(defaults: &dirkit_core::ToolDefaults, folders: &[String], exts: &[String]) -> IgnoreSet {
    let mut ignore = defaults.ignore_set();
    ignore.extend(&IgnoreSet::from_lists(folders.iter().cloned(), exts));
    ignore
}

fn run_flatten(args: FlattenArgs, settings: &Settings) -> Result<()> {
    let config = FlattenConfig::builder()
        .source(args.source)
        .destination(args.destination)
        .ignore(merged_ignore(&settings.flatten, &args.ignore, &args.ignore_ext))
        .collision(CollisionPolicy::from(args.on_collision))
        .dry_run(args.dry_run)
        .build()
        .context("Invalid flatten options")?;

    let report = Flattener::new(config).run().context("Flatten failed")?;

    match args.format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {}", report.summary());
            for error in &report.errors {
                println!("   ! {error}");
            }
            println!(" Finished in {:.2}s", report.duration.as_secs_f64());
            println!("{}", "─".repeat(60));
            if report.dry_run {
                println!("Dry run completed, nothing was copied.");
            } else {
                println!("Copy operation completed successfully.");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn run_tree(args: TreeArgs, settings: &Settings) -> Result<()> {
    let config = TreeConfig::builder()
        .root(args.path)
        .ignore(merged_ignore(&settings.tree, &args.ignore, &args.ignore_ext))
        .build()
        .context("Invalid tree options")?;

    let tree = dirkit_scan::build_tree(&config)?;

    match args.format {
        OutputFormat::Text => {
            let options = RenderOptions {
                color: !args.no_color && std::io::stdout().is_terminal(),
            };
            print!("{}", render_tree(&tree, options));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
    }

    Ok(())
}

fn run_annotate(args: AnnotateArgs, settings: &Settings) -> Result<()> {
    let defaults = AnnotateConfig::new(&args.base);

    let ignore = merged_ignore(&settings.annotate, &args.ignore, &[]);
    let extensions: Vec<String> = settings
        .annotate
        .extensions
        .iter()
        .chain(&args.extensions)
        .cloned()
        .collect();

    let config = AnnotateConfig::builder()
        .base(args.base)
        .extensions(if extensions.is_empty() {
            defaults.extensions
        } else {
            extensions
        })
        .ignore(if ignore.is_empty() {
            defaults.ignore
        } else {
            ignore
        })
        .make_copy(args.make_copy)
        .build()
        .context("Invalid annotate options")?;

    let report = Annotator::new(config).run().context("Annotate failed")?;

    match args.format {
        OutputFormat::Text => {
            if let Some(original) = &report.copied_from {
                println!("Annotated copy {} of {}", report.root.display(), original.display());
            }
            let failed = report
                .files
                .iter()
                .filter(|f| matches!(f.outcome, AnnotationOutcome::Failed { .. }));
            for file in failed {
                println!("   ! {}", file.path.display());
            }
            println!("{}", report.summary());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Form parameters plus the flags a request does not carry.
fn tool_request(tool: ToolCommand) -> (ToolRequest, Vec<OsString>) {
    let mut extra: Vec<OsString> = Vec::new();

    let request = match tool {
        ToolCommand::Flatten(args) => {
            match args.on_collision {
                CollisionArg::Overwrite => {}
                CollisionArg::Skip => extra.extend(["--on-collision".into(), "skip".into()]),
                CollisionArg::Rename => extra.extend(["--on-collision".into(), "rename".into()]),
            }
            if args.dry_run {
                extra.push("--dry-run".into());
            }
            push_format(&mut extra, args.format);
            ToolRequest::Flatten {
                source: args.source,
                destination: args.destination,
                ignore: args.ignore,
                ignore_ext: args.ignore_ext,
            }
        }
        ToolCommand::Tree(args) => {
            if args.no_color {
                extra.push("--no-color".into());
            }
            push_format(&mut extra, args.format);
            ToolRequest::Tree {
                path: args.path,
                ignore: args.ignore,
                ignore_ext: args.ignore_ext,
            }
        }
        ToolCommand::Annotate(args) => {
            push_format(&mut extra, args.format);
            ToolRequest::Annotate {
                base: args.base,
                extensions: args.extensions,
                ignore: args.ignore,
                make_copy: args.make_copy,
            }
        }
    };

    (request, extra)
}

fn push_format(extra: &mut Vec<OsString>, format: OutputFormat) {
    if let OutputFormat::Json = format {
        extra.extend(["--format".into(), "json".into()]);
    }
}

/// Re-invoke this binary with the request and stream its output.
fn run_child(
    tool: ToolCommand,
    common_folders: bool,
    common_extensions: bool,
    config: Option<PathBuf>,
) -> Result<ExitCode> {
    let (mut request, extra) = tool_request(tool);
    if common_folders {
        request = request.with_common_folders();
    }
    if common_extensions {
        request = request.with_common_extensions();
    }
    request.validate()?;

    let program = std::env::current_exe().context("Cannot locate the dirkit binary")?;
    let mut args: Vec<OsString> = Vec::new();
    if let Some(config) = config {
        args.extend(["--config".into(), config.into_os_string()]);
    }
    args.extend(request.to_args());
    args.extend(extra);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let outcome = runtime.block_on(async {
        println!("Running command: {}", command_line(&program, &args));
        println!("{}", "-".repeat(50));

        let mut handle = match spawn(&program, &args) {
            Ok(handle) => handle,
            Err(e) => {
                return RunOutcome::Error {
                    message: e.to_string(),
                };
            }
        };

        let mut outcome = None;
        loop {
            tokio::select! {
                event = handle.recv() => match event {
                    Some(RunEvent::Output { stream: OutputStream::Stdout, line }) => println!("{line}"),
                    Some(RunEvent::Output { stream: OutputStream::Stderr, line }) => eprintln!("{line}"),
                    Some(RunEvent::Started { pid, at }) => {
                        tracing::debug!("Child {:?} started at {}", pid, at.format("%H:%M:%S"));
                    }
                    Some(RunEvent::Finished(o)) => outcome = Some(o),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => handle.cancel(),
            }
        }
        outcome.unwrap_or(RunOutcome::Error {
            message: "child exited without reporting a status".to_string(),
        })
    });

    print_outcome(&request, &outcome);
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcome(request: &ToolRequest, outcome: &RunOutcome) {
    let tool = request.kind();
    match outcome {
        RunOutcome::Success => {
            println!("\n{}", "=".repeat(50));
            println!("✅ {tool} completed successfully!");
        }
        RunOutcome::Cancelled => {
            println!("\n🛑 {tool} stopped by user.");
        }
        RunOutcome::Failed { code } => {
            println!("\n{}", "=".repeat(50));
            match code {
                Some(code) => println!("❌ {tool} completed with errors (return code: {code})"),
                None => println!("❌ {tool} was terminated by a signal"),
            }
            println!("\nTips for common issues:");
            println!("• Check that all file/folder paths exist");
            println!("• Ensure you have write permissions to the destination");
            println!("• Try using shorter paths or avoid special characters");
            println!("• For cloud-synced folders, try using a local folder first");
        }
        RunOutcome::Error { message } => {
            println!("\n❌ Error running {tool}: {message}");
            println!("\nThis might be due to:");
            println!("• A missing or moved dirkit binary");
            println!("• Invalid file paths");
            println!("• Permission issues");
        }
    }
}
