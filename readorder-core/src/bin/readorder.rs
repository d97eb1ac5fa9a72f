use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use snafu::ResultExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use readorder_core::analysis::annotation::Annotation;
use readorder_core::consts::*;
use readorder_core::error::{ImageReadSnafu, ReadorderError};
use readorder_core::inference::{GeometricConfig, GeometricOrdering};
use readorder_core::ocr::CommandOcr;
use readorder_core::pipeline::{convert, inspect_order};
use readorder_core::records::read_annotation_row;
use readorder_core::{ConvertConfigBuilder, RelateConfigBuilder, RelatePipeline};

#[derive(Parser)]
#[command(name = "readorder")]
#[command(about = "Reading order, box identifiers and relations for annotated page images")]
struct Cli {
    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one annotation row into box and label CSV files
    Convert(ConvertArgs),
    /// Order the boxes of a page image and write its relation graph
    Relate(RelateArgs),
    /// Print annotation labels in predicted reading order
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ConvertArgs {
    #[arg(short, long, default_value = DEFAULT_INPUT_CSV, help = "Annotation CSV")]
    input: PathBuf,

    #[arg(short, long, default_value = "0", help = "Data row to convert (0-based)")]
    row: usize,

    #[arg(long, default_value = DEFAULT_BOXES_CSV, help = "Output boxes CSV")]
    boxes: PathBuf,

    #[arg(long, default_value = DEFAULT_LABELS_CSV, help = "Output labels CSV")]
    labels: PathBuf,
}

#[derive(Args)]
struct RelateArgs {
    #[arg(long, default_value = DEFAULT_IMAGE, help = "Page image")]
    image: PathBuf,

    #[arg(long, default_value = DEFAULT_BOXES_CSV, help = "Boxes CSV (x1,y1,x2,y2)")]
    boxes: PathBuf,

    #[arg(long, help = "Labels CSV joined onto the ordered boxes")]
    labels: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUTPUT_IMAGE, help = "Annotated output image")]
    output_image: PathBuf,

    #[arg(long, default_value = DEFAULT_RELATIONS_JSON, help = "Output relations JSON")]
    relations: PathBuf,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "header,footer",
        help = "Labels whose boxes share one identifier"
    )]
    header_footer: Vec<String>,

    #[arg(long, help = "Font for rank and label text")]
    font: Option<PathBuf>,

    #[arg(long, help = "Run OCR on every box")]
    ocr: bool,

    #[arg(long, value_delimiter = ',', default_value = "hi,en", help = "OCR languages")]
    langs: Vec<String>,

    #[arg(long, help = "OCR program, overrides READORDER_OCR_BIN")]
    ocr_bin: Option<String>,

    #[arg(long, help = "Output OCR JSON")]
    ocr_output: Option<PathBuf>,

    #[arg(long, default_value = "0", help = "Extra attempts after a failed OCR call")]
    ocr_retries: usize,

    #[arg(long, help = "Keep OCR text as returned")]
    no_clean_text: bool,
}

#[derive(Args)]
struct InspectArgs {
    #[arg(short, long, default_value = DEFAULT_INPUT_CSV, help = "Annotation CSV")]
    input: PathBuf,

    #[arg(short, long, default_value = "0", help = "Data row to inspect (0-based)")]
    row: usize,

    #[arg(long, help = "Page image, defaults to the row's image_path")]
    image: Option<PathBuf>,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), Box<dyn Error>> {
    let config = ConvertConfigBuilder::default()
        .input_path(args.input)
        .row(args.row)
        .boxes_output(args.boxes)
        .labels_output(args.labels)
        .build()
        .map_err(ReadorderError::from)?;

    let annotation = convert(&config)?;
    info!("Converted {} boxes", annotation.boxes.len());
    Ok(())
}

fn run_relate(args: RelateArgs) -> Result<(), Box<dyn Error>> {
    let config = RelateConfigBuilder::default()
        .image_path(args.image)
        .boxes_path(args.boxes)
        .labels_path(args.labels)
        .output_image_path(args.output_image)
        .relations_path(args.relations)
        .header_footer_labels(args.header_footer)
        .font_path(args.font)
        .ocr(args.ocr)
        .ocr_languages(args.langs)
        .ocr_output_path(args.ocr_output)
        .auto_clean_text(!args.no_clean_text)
        .build()
        .map_err(ReadorderError::from)?;

    let ocr = match args.ocr_bin {
        Some(program) => CommandOcr::new(program),
        None => CommandOcr::from_env(),
    }
    .with_retries(args.ocr_retries);

    let model = GeometricOrdering::new(GeometricConfig::default());
    let mut pipeline = RelatePipeline::new(config, Box::new(model)).with_ocr(Box::new(ocr));
    let outcome = pipeline.run()?;

    info!(
        "Ordered {} boxes into {} relations",
        outcome.page.boxes.len(),
        outcome.relations.bboxes_relation_json.len()
    );
    for result in &outcome.ocr {
        info!("OCR result for box {}: {}", result.id, result.text.trim());
    }

    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), Box<dyn Error>> {
    let row = read_annotation_row(&args.input, args.row)?;
    let image_path = args
        .image
        .or_else(|| row.image_path.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE));

    let annotation = Annotation::parse(row.image_path, &row.annotation_bboxes)?;
    let image = image::open(&image_path).context(ImageReadSnafu {
        path: image_path.to_string_lossy(),
    })?;

    let mut model = GeometricOrdering::new(GeometricConfig::default());
    let labels = inspect_order(&annotation, &image, &mut model)?;

    info!("Labels in predicted order:");
    for (rank, label) in labels.iter().enumerate() {
        println!("{}\t{}", rank, label);
    }

    Ok(())
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Convert(args) => run_convert(args),
        Command::Relate(args) => run_relate(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
