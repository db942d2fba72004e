use clap::{Parser, Subcommand};
use coverpack::imaging::RustRasterizer;
use coverpack::process::{BatchLimits, BatchOrchestrator};
use coverpack::{archive, config, output, process, scan};
use log::LevelFilter;
use std::path::PathBuf;

/// Input paths shared by commands that read images.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files or directories (walked recursively, sorted by name)
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct PackArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print the final batch status as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("COVERPACK_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("COVERPACK_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "coverpack")]
#[command(about = "Batch cover-fit image resizer that packs results into a ZIP")]
#[command(long_about = "\
Batch cover-fit image resizer that packs results into a ZIP

Every input image is scaled to fill two fixed boxes, center-cropped, and
re-encoded as JPEG. Variants are grouped by the filename prefix before the
first underscore:

  001_front.png  ─┐
  001_back.png   ─┼─→  compress_16-Oktober-2026-14:03:27.zip
  badge.webp     ─┘     ├── 001/
                        │   ├── 001.jpg              (640x480)
                        │   └── 001_thumbnail.jpg    (480x320)
                        └── badge/
                            ├── badge.jpg
                            └── badge_thumbnail.jpg

Files sharing a prefix overwrite each other (last one wins); run
'coverpack check' to list collisions before packing.

Run 'coverpack gen-config' to generate a documented coverpack.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing coverpack.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Directory the archive is written to
    #[arg(long, default_value = ".", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). COVERPACK_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize every image and write the archive
    Pack(PackArgs),
    /// Show group keys, sizes, and collisions without writing anything
    Check(InputArgs),
    /// Print a stock coverpack.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Pack(args) => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config.processing);

            let scanned = scan::collect_sources(&args.input.paths)?;
            for path in &scanned.skipped {
                log::warn!("Skipping unsupported file {}", path.display());
            }

            let json = args.json;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if json {
                        continue;
                    }
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });

            let orchestrator = BatchOrchestrator::new(
                RustRasterizer::new(),
                config.variant_plan(),
                BatchLimits::from_config(&config),
            )
            .with_events(tx);
            let result = orchestrator.process_batch(scanned.sources);
            let status = orchestrator.status();
            // Closes the event channel so the printer drains and exits
            drop(orchestrator);
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let Some(outcome) = result? else {
                if json {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                } else {
                    println!("No supported images found");
                }
                return Ok(());
            };

            let bytes = outcome.archive.serialize()?;
            std::fs::create_dir_all(&cli.output)?;
            let archive_path = cli
                .output
                .join(archive::archive_filename(&chrono::Local::now()));
            std::fs::write(&archive_path, &bytes)?;
            log::info!("Wrote {}", archive_path.display());

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!();
                output::print_pack_summary(&outcome, &archive_path, bytes.len());
            }
        }
        Command::Check(args) => {
            config::load_config(&cli.config_dir)?;
            let scanned = scan::collect_sources(&args.paths)?;
            let report = process::check_batch(&RustRasterizer::new(), &scanned.sources);
            output::print_check_output(&report, &scanned.skipped);

            let undecodable = report.undecodable();
            if undecodable == 0 && report.collisions.is_empty() {
                println!("==> Ready to pack");
            } else {
                println!(
                    "==> {} undecodable, {} colliding keys",
                    undecodable,
                    report.collisions.len()
                );
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize `env_logger`: `-v` flags pick the level, `COVERPACK_LOG` wins when set.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(env_logger::Env::new().filter("COVERPACK_LOG"))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
