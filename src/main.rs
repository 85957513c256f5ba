use clap::{Parser, Subcommand};
use image_prep::imaging::RustBackend;
use image_prep::{config, output, process, report, scan};
use std::path::{Path, PathBuf};

/// Flags that override `[processing]` and `[output]` config values.
#[derive(clap::Args, Clone)]
struct ProcessingArgs {
    /// Image files or directories (directories are searched recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Longest edge of the output, in pixels
    #[arg(long)]
    target_size: Option<u32>,

    /// Initial JPEG quality, in (0, 1]
    #[arg(long)]
    quality: Option<f32>,

    /// Size budget per output file, in MiB
    #[arg(long)]
    max_size_mb: Option<f64>,

    /// Upscale sources below 1800px instead of rejecting them
    #[arg(long, overrides_with = "no_allow_upscaling")]
    allow_upscaling: bool,

    /// Reject sources below 1800px even if the config enables upscaling
    #[arg(long, overrides_with = "allow_upscaling")]
    no_allow_upscaling: bool,
}

impl ProcessingArgs {
    /// Only flags the user actually passed become overrides.
    fn overrides(&self) -> toml::Table {
        let mut processing = toml::Table::new();
        if let Some(size) = self.target_size {
            processing.insert("target_longest_side".into(), i64::from(size).into());
        }
        if let Some(q) = self.quality {
            processing.insert("initial_quality".into(), f64::from(q).into());
        }
        if let Some(mb) = self.max_size_mb {
            processing.insert("max_file_size_mb".into(), mb.into());
        }
        if self.allow_upscaling || self.no_allow_upscaling {
            processing.insert("allow_upscaling".into(), self.allow_upscaling.into());
        }

        let mut table = toml::Table::new();
        if !processing.is_empty() {
            table.insert("processing".into(), processing.into());
        }
        table
    }
}

#[derive(Parser)]
#[command(name = "image-prep")]
#[command(about = "Prepare photos for upload: resize, sharpen, and fit a JPEG size budget")]
#[command(long_about = "\
Prepare photos for upload: resize, sharpen, and fit a JPEG size budget

Each input is scaled so its longest side matches the target (2000px by
default), sharpened, and encoded as a baseline sRGB JPEG. Quality is lowered
step by step until the file fits the size budget (2 MiB by default).

Sources whose longest side is below 1800px are rejected unless
--allow-upscaling is given.

Output:

  processed/
  ├── dawn_processed.jpg
  ├── dusk_processed.jpg
  ├── manifest.json      # Machine-readable batch results
  └── report.html        # Side-by-side visual report

Settings come from image-prep.toml in the working directory (or --config),
with command-line flags taking precedence.

Run 'image-prep gen-config' to generate a documented image-prep.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./image-prep.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize and encode images into the output directory
    Process {
        #[command(flatten)]
        args: ProcessingArgs,

        /// Output directory
        #[arg(long, short, default_value = "processed")]
        output: PathBuf,

        /// Appended to each source stem in the output filename
        #[arg(long)]
        suffix: Option<String>,

        /// Skip writing report.html
        #[arg(long)]
        no_report: bool,
    },
    /// Show what would happen to each input without encoding anything
    Check {
        #[command(flatten)]
        args: ProcessingArgs,
    },
    /// Print a stock image-prep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            args,
            output: output_dir,
            suffix,
            no_report,
        } => {
            let mut overrides = args.overrides();
            let mut output_table = toml::Table::new();
            if let Some(suffix) = suffix {
                output_table.insert("suffix".into(), suffix.into());
            }
            if no_report {
                output_table.insert("report".into(), false.into());
            }
            if !output_table.is_empty() {
                overrides.insert("output".into(), output_table.into());
            }

            let prep_config = load_config(cli.config.as_deref(), overrides)?;
            let inputs = scan::collect_inputs(&args.inputs)?;
            let batch = process::Batch::new(prep_config.processing_settings(), inputs);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(&batch, &output_dir, Some(tx));
            printer.join().ok();
            let batch_report = result?;

            process::write_manifest(&batch_report, &output_dir)?;
            if prep_config.output.report {
                let path = report::write_report(&batch_report, &output_dir)?;
                println!("Report: {}", path.display());
            }
            output::print_batch_summary(&batch_report);
        }
        Command::Check { args } => {
            let prep_config = load_config(cli.config.as_deref(), args.overrides())?;
            let inputs = scan::collect_inputs(&args.inputs)?;
            let batch = process::Batch::new(prep_config.processing_settings(), inputs);
            let plans = process::plan_batch(&RustBackend::new(), &batch);
            output::print_plan_output(&plans);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the config file and layer command-line overrides on top.
fn load_config(
    explicit: Option<&Path>,
    overrides: toml::Table,
) -> Result<config::PrepConfig, config::ConfigError> {
    let overrides = (!overrides.is_empty()).then(|| toml::Value::Table(overrides));
    match explicit {
        Some(path) => config::load_config(path, true, overrides),
        None => config::load_config(Path::new(config::CONFIG_FILENAME), false, overrides),
    }
}
