//! cardscan CLI: identify cards in a single image or scan a frame sequence.

use cardscan::{
    build_database, run_scan_loop, CardCatalog, CardPipeline, DirectoryFrameSink, DisplayState,
    FingerprintParams, FrameLimit, FrameReport, FrameSink, ImageSequenceSource, JsonCatalog,
    LogInfoPanel, NoCatalog, NullFrameSink, ScanConfig, ScanDevices, ScanReport, StopSignal,
};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Recognize trading cards by perceptual fingerprint")]
#[command(version)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify every card in one image and print the detections as JSON.
    Identify(IdentifyArgs),

    /// Run the recognition loop over a directory of frames.
    Scan(ScanArgs),
}

#[derive(Debug, Clone, Args)]
struct IdentifyArgs {
    /// Directory of `<identifier>.<ext>` reference images.
    #[arg(long)]
    references: PathBuf,

    /// Image to scan.
    image: PathBuf,

    /// Fingerprint side length; fingerprints carry hash_size² bits.
    #[arg(long, default_value_t = 16)]
    hash_size: u32,

    /// Reject matches farther than this Hamming distance.
    #[arg(long)]
    max_distance: Option<u32>,

    /// JSON catalog with card metadata.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write the annotated image here.
    #[arg(long)]
    annotated: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    /// JSON scan configuration.
    #[arg(long)]
    config: PathBuf,

    /// Frame directory (overrides the config).
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Stop after this many frames, at least 1 (overrides the config).
    #[arg(long)]
    max_frames: Option<NonZeroUsize>,

    /// Report path (overrides the config).
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Identify(args) => run_identify(args),
        Commands::Scan(args) => run_scan(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = cardscan::core::level_from_verbosity(cli.verbose, cli.quiet);
    #[cfg(feature = "tracing")]
    {
        cardscan::init_tracing(cli.json_logs, level);
    }
    #[cfg(not(feature = "tracing"))]
    {
        if cli.json_logs {
            eprintln!("--json-logs needs the `tracing` feature; using plain logs");
        }
        let _ = cardscan::core::init_with_level(level);
    }
}

fn load_catalog(path: Option<&Path>) -> CliResult<Box<dyn CardCatalog>> {
    Ok(match path {
        Some(path) => Box::new(JsonCatalog::load_json(path)?),
        None => Box::new(NoCatalog),
    })
}

fn run_identify(args: IdentifyArgs) -> CliResult<()> {
    let params = FingerprintParams {
        hash_size: args.hash_size,
        ..FingerprintParams::default()
    };
    let db = build_database(&args.references, &params)?;
    let catalog = load_catalog(args.catalog.as_deref())?;
    let pipeline = CardPipeline::new(
        &db,
        catalog.as_ref(),
        cardscan::PipelineParams {
            max_distance: args.max_distance,
            ..Default::default()
        },
    )?;

    let mut frame = image::open(&args.image)?.to_rgb8();
    let started = Instant::now();
    let detections =
        pipeline.process_frame(&mut frame, &mut DisplayState::default(), &mut LogInfoPanel);
    let report = FrameReport::new(0, &detections, started.elapsed().as_secs_f64() * 1e3);

    if let Some(path) = &args.annotated {
        frame.save(path)?;
        log::info!("wrote annotated image to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_scan(args: ScanArgs) -> CliResult<()> {
    let mut cfg = ScanConfig::load_json(&args.config)?;
    if let Some(frames) = args.frames {
        cfg.frames = Some(frames);
    }
    if let Some(max_frames) = args.max_frames {
        cfg.max_frames = Some(max_frames);
    }
    if let Some(report) = args.report {
        cfg.report_path = Some(report);
    }

    let Some(frames_dir) = cfg.frames.clone() else {
        return Err("no frame directory: set `frames` in the config or pass --frames".into());
    };

    let db = build_database(&cfg.references, &cfg.fingerprint)?;
    let catalog = load_catalog(cfg.catalog.as_deref())?;
    let pipeline = CardPipeline::new(&db, catalog.as_ref(), cfg.pipeline.clone())?;

    let mut source = ImageSequenceSource::open(&frames_dir)?;
    let mut sink: Box<dyn FrameSink> = match &cfg.output_dir {
        Some(dir) => Box::new(DirectoryFrameSink::create(dir)?),
        None => Box::new(NullFrameSink),
    };
    let mut stop: Box<dyn StopSignal> = match cfg.max_frames {
        Some(n) => Box::new(FrameLimit::new(n)),
        None => Box::new(|| false),
    };
    let mut panel = LogInfoPanel;

    let summary = run_scan_loop(
        &pipeline,
        ScanDevices {
            source: &mut source,
            sink: sink.as_mut(),
            panel: &mut panel,
            stop: stop.as_mut(),
        },
        &mut DisplayState::default(),
        cfg.capture_retries,
    )?;

    let report = ScanReport {
        references: cfg.references.clone(),
        database_size: db.len(),
        hash_size: db.hash_size(),
        summary,
    };
    let report_path = cfg.report_path();
    report.write_json(&report_path)?;
    println!("wrote scan report to {}", report_path.display());
    Ok(())
}
