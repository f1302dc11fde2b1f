use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use mask::{
    ComponentFilterParams, HoleFillParams, MaskCollection, MaskOperation, MedianFilterParams,
    ResizeParams, TimeFrameIndex,
};
use mask_cli::{apply_operations, render_frame, ProcessingConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every operation listed in a TOML or JSON configuration file
    Process {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Apply a single operation to a mask collection
    Apply {
        /// Input mask collection (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Output mask collection (JSON)
        #[arg(short, long)]
        output: PathBuf,
        /// Operation name, e.g. "fill_holes" or "Apply Median Filter"
        #[arg(long)]
        operation: String,
        /// Median filter window size
        #[arg(long)]
        window_size: Option<i32>,
        /// Minimum connected component size in pixels
        #[arg(long)]
        threshold: Option<usize>,
        /// Target width for resizing
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Target height for resizing
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Keep empty masks as empty outputs
        #[arg(long, default_value_t = false)]
        preserve_empty: bool,
        /// Worker threads (defaults to all cores)
        #[arg(long)]
        threads: Option<usize>,
        /// Also write the equivalent configuration (.toml or .json) for `process`
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
    /// List available operations
    Operations {
        /// Also print the JSON schema of the operation parameters
        #[arg(long, default_value_t = false)]
        schema: bool,
    },
    /// Write the masks of one frame as a PNG image
    Render {
        /// Input mask collection (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Frame to render
        #[arg(short, long)]
        time: i64,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process { config } => process(&config)?,
        Commands::Apply {
            input,
            output,
            operation,
            window_size,
            threshold,
            width,
            height,
            preserve_empty,
            threads,
            save_config,
        } => {
            let operation = with_overrides(
                MaskOperation::from_name(&operation)?,
                window_size,
                threshold,
                width.zip(height),
            );
            let config = ProcessingConfig {
                input: input.display().to_string(),
                output: output.display().to_string(),
                preserve_empty_masks: preserve_empty,
                threads,
                operations: vec![operation],
            };
            if let Some(path) = save_config {
                config.to_file(&path)?;
                info!("Saved configuration to {:?}", path);
            }
            run(&config)?;
        }
        Commands::Operations { schema } => list_operations(schema)?,
        Commands::Render { input, time, output } => render(&input, time, &output)?,
    }

    Ok(())
}

fn process(config_path: &Path) -> Result<()> {
    let config = ProcessingConfig::from_file(config_path)?;
    info!("Loaded configuration from {:?}", config_path);
    if config.operations.is_empty() {
        warn!("Configuration lists no operations; the input will be copied unchanged");
    }
    run(&config)
}

fn run(config: &ProcessingConfig) -> Result<()> {
    let collection = MaskCollection::load_json(&config.input)?;
    info!(
        "Loaded {} masks across {} frames from {}",
        collection.total_mask_count(),
        collection.time_count(),
        config.input
    );

    let dispatcher = config.dispatcher();
    let output = apply_operations(
        &collection,
        &config.operations,
        &dispatcher,
        |index, operation, percent| {
            debug!("[{}] {}: {}%", index + 1, operation.display_name(), percent);
            if percent == 100 {
                info!("✅ {} finished", operation.display_name());
            }
        },
    );

    output.save_json(&config.output)?;
    info!(
        "Wrote {} masks across {} frames to {}",
        output.total_mask_count(),
        output.time_count(),
        config.output
    );
    Ok(())
}

/// Replace default parameters with values given on the command line
fn with_overrides(
    operation: MaskOperation,
    window_size: Option<i32>,
    threshold: Option<usize>,
    size: Option<(u32, u32)>,
) -> MaskOperation {
    match operation {
        MaskOperation::MedianFilter(params) => MaskOperation::MedianFilter(MedianFilterParams {
            window_size: window_size.unwrap_or(params.window_size),
        }),
        MaskOperation::RemoveSmallComponents(params) => {
            MaskOperation::RemoveSmallComponents(ComponentFilterParams {
                threshold: threshold.unwrap_or(params.threshold),
            })
        }
        MaskOperation::Resize(params) => {
            let (width, height) = size.unwrap_or((params.width, params.height));
            MaskOperation::Resize(ResizeParams { width, height })
        }
        MaskOperation::FillHoles(_) => MaskOperation::FillHoles(HoleFillParams {}),
    }
}

fn list_operations(schema: bool) -> Result<()> {
    for name in MaskOperation::command_names() {
        let operation = MaskOperation::from_name(name)?;
        println!("{}", operation_summary(&operation));
    }

    if schema {
        println!("{}", serde_json::to_string_pretty(&MaskOperation::schema())?);
    }
    Ok(())
}

fn operation_summary(operation: &MaskOperation) -> String {
    format!(
        "{:<24} {:<36} {}",
        operation.to_string(),
        operation.display_name(),
        operation.description()
    )
}

fn render(input: &Path, time: i64, output: &Path) -> Result<()> {
    let collection = MaskCollection::load_json(input)?;
    let image = render_frame(&collection, TimeFrameIndex(time))?;
    image
        .save(output)
        .map_err(|err| eyre!("Failed to write {:?}: {}", output, err))?;
    info!("Rendered frame {} to {:?}", time, output);
    Ok(())
}
