use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use labelgate::inspect::{inspect_image, save_annotated};
use labelgate::logging::init_logging;
use labelgate::{AuditConfig, Auditor, YoloDetector};

#[derive(Parser)]
#[command(name = "labelgate")]
#[command(about = "Auto-label sharp, confidently detected images and route the rest to human review")]
struct Cli {
    /// TOML configuration file (command-line flags override it)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Audit every image in the source directory
    Run(RunArgs),
    /// Run both gates on a single image without writing anything
    Inspect(InspectArgs),
}

#[derive(Args)]
struct GateArgs {
    /// Path to the detector model (.rten)
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Minimum Laplacian variance for an image to count as sharp
    #[arg(long, value_name = "F")]
    blur_threshold: Option<f64>,

    /// Minimum confidence every detection needs for auto-acceptance
    #[arg(long, value_name = "F")]
    conf_auto_accept: Option<f32>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    gates: GateArgs,

    /// Directory of raw images
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Destination for auto-labeled images and labels
    #[arg(long, value_name = "DIR")]
    auto_dir: Option<PathBuf>,

    /// Destination for images that need human review
    #[arg(long, value_name = "DIR")]
    review_dir: Option<PathBuf>,

    /// Append confidences to label lines
    #[arg(long)]
    save_conf: bool,

    /// Write the batch report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Save Laplacian debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    #[command(flatten)]
    gates: GateArgs,

    /// Save a copy of the image with detection boxes drawn
    #[arg(long, value_name = "OUT")]
    annotate: Option<PathBuf>,
}

fn apply_gate_args(config: &mut AuditConfig, args: &GateArgs) {
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(t) = args.blur_threshold {
        config.blur_threshold = t;
    }
    if let Some(t) = args.conf_auto_accept {
        config.conf_auto_accept = t;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };

    match cli.command {
        Command::Run(args) => {
            apply_gate_args(&mut config, &args.gates);
            if let Some(dir) = args.source {
                config.source_dir = dir;
            }
            if let Some(dir) = args.auto_dir {
                config.auto_dir = dir;
            }
            if let Some(dir) = args.review_dir {
                config.review_dir = dir;
            }
            config.save_conf |= args.save_conf;
            config.validate()?;

            let detector = YoloDetector::load(&config.model_path, &config.detector)?;
            let mut auditor = Auditor::new(config, Box::new(detector))?;
            if let Some(debug_dir) = args.debug_out {
                auditor = auditor.with_debug(debug_dir)?;
            }

            let report = auditor.run()?;
            println!("\n{}", report);

            if let Some(path) = args.report {
                report.save_json(&path)?;
                println!("Report written to {}", path.display());
            }
        }
        Command::Inspect(args) => {
            apply_gate_args(&mut config, &args.gates);
            config.validate()?;

            let detector = YoloDetector::load(&config.model_path, &config.detector)?;
            let inspection = inspect_image(&args.image_path, &config, Box::new(detector))?;
            println!("{}", inspection);

            if let Some(out) = args.annotate {
                save_annotated(&args.image_path, &inspection, config.conf_auto_accept, &out)?;
                println!("Annotated image saved to {}", out.display());
            }
        }
    }

    Ok(())
}
