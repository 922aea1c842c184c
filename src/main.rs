use clap::{Parser, Subcommand};
use cutout::config::{self, CutoutConfig};
use cutout::imaging::Method;
use cutout::naming::{self, RenameOptions};
use cutout::{output, process, scan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Shared flag for commands that extract subjects.
#[derive(clap::Args, Clone)]
struct MethodArgs {
    /// Extraction method (overrides `method` in the config file)
    #[arg(long, value_enum)]
    method: Option<Method>,
}

#[derive(Parser)]
#[command(name = "cutout")]
#[command(about = "Make near-white backgrounds transparent and keep the subject")]
#[command(long_about = "\
Make near-white backgrounds transparent and keep the subject

Each image is scored pixel by pixel (whiteness, saturation, local texture,
distance from the content center, closeness to the canvas edge), the mask
is cleaned up with opening, closing and hole filling, and everything outside
it gets alpha 0. If the first pass keeps too little, a relaxed pass runs once.

Typical workflow:

  cats/
  ├── photo (1).png
  ├── photo (2).png
  └── photo (7).png

  cutout rename cats          # → cat_01.png, cat_02.png, cat_03.png
  cutout batch cats           # cut out every cat_*.png in place

Settings are read from cutout.toml in the batch directory, or --config FILE.
Run 'cutout gen-config' to generate a documented cutout.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: cutout.toml next to the input)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors and the final summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the subject of a single image
    Extract {
        /// Source image (PNG, JPEG, TIFF or WebP)
        input: PathBuf,
        /// Output PNG (default: overwrite the input, or <stem>.png next to it)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        method: MethodArgs,
    },
    /// Extract subjects from every matching image in a directory
    Batch {
        /// Directory to scan
        dir: PathBuf,
        /// File name glob (overrides `batch.pattern`)
        #[arg(long)]
        pattern: Option<String>,
        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
        /// Write results here instead of overwriting the inputs
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        method: MethodArgs,
        /// Write a JSON report of every file's outcome
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Rename `name (N).ext` files into a dense prefix_NN.ext sequence
    Rename {
        /// Directory holding the files
        dir: PathBuf,
        /// Target name prefix
        #[arg(long, default_value = "cat_")]
        prefix: String,
        /// Extension of the files to rename (and of the targets)
        #[arg(long, default_value = "png")]
        extension: String,
        /// File name that takes slot 01 regardless of numbering
        #[arg(long)]
        lead: Option<String>,
        /// Show the plan without renaming anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a stock cutout.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Extract {
            input,
            output,
            method,
        } => {
            let dir = parent_dir(&input);
            let config = resolve_config(cli.config.as_deref(), &dir, &method)?;
            let dest = output.unwrap_or_else(|| process::output_path(&input, None));
            let report = process::process(&input, &dest, &config)?;
            if !cli.quiet {
                output::print_extract_output(&input, &dest, &report);
            }
        }
        Command::Batch {
            dir,
            pattern,
            recursive,
            output_dir,
            method,
            report,
        } => {
            let config = resolve_config(cli.config.as_deref(), &dir, &method)?;
            init_thread_pool(&config.processing);

            let pattern = pattern.unwrap_or_else(|| config.batch.pattern.clone());
            let recursive = recursive || config.batch.recursive;
            let mut files = scan::scan(&dir, &pattern, recursive)?;
            if let Some(out) = &output_dir {
                // earlier results inside the scanned tree are not inputs
                files.retain(|f| !f.starts_with(out));
            }

            let quiet = cli.quiet;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if quiet {
                        continue;
                    }
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let batch = process::process_batch(&files, output_dir.as_deref(), &config, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            if let Some(path) = &report {
                process::write_report(&batch, path)?;
            }
            output::print_batch_summary(&batch);
            if !batch.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Rename {
            dir,
            prefix,
            extension,
            lead,
            dry_run,
        } => {
            let options = RenameOptions {
                prefix,
                extension,
                lead,
            };
            let steps = naming::plan_directory(&dir, &options)?;
            if !dry_run {
                naming::apply_renames(&steps)?;
            }
            output::print_rename_plan(&steps, !dry_run);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` count picks the level.
fn init_tracing(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `--config` if given, else `cutout.toml` in `dir`, then apply `--method`.
fn resolve_config(
    explicit: Option<&Path>,
    dir: &Path,
    method: &MethodArgs,
) -> Result<CutoutConfig, config::ConfigError> {
    let mut config = match explicit {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(dir)?,
    };
    if let Some(m) = method.method {
        config.method = m;
    }
    Ok(config)
}

/// Directory holding `path`, or `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
