use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use layoutview_core::{
    AnalysisResult, BboxPolicy, DocumentImage, OverlayRenderer, Presentation, ResultShell, View,
    render::overlay::OverlayConfigBuilder,
};

#[derive(Parser)]
#[command(name = "layoutview")]
#[command(about = "Inspect and export document layout analysis results")]
struct Args {
    #[arg(help = "Analysis result JSON file path")]
    input: PathBuf,

    #[arg(short, long, help = "Source page image (PNG/JPEG)")]
    image: Option<PathBuf>,

    #[arg(short, long, default_value = "exports", help = "Output directory")]
    output: PathBuf,

    #[arg(long, help = "TrueType/OpenType font for label text instead of the bundled one")]
    font: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ViewArg::Structured, help = "View to print")]
    view: ViewArg,

    #[arg(long = "click", help = "Click a type row in the browser, repeatable")]
    clicks: Vec<String>,

    #[arg(long, help = "Draw inverted boxes normalized instead of failing")]
    normalize_boxes: bool,

    #[arg(long, help = "Only print the view, write no export files")]
    no_export: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Structured,
    Visualization,
    Raw,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Structured => View::Structured,
            ViewArg::Visualization => View::Visualization,
            ViewArg::Raw => View::Raw,
        }
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn build_renderer(args: &Args) -> anyhow::Result<OverlayRenderer> {
    let config = OverlayConfigBuilder::default()
        .bbox_policy(if args.normalize_boxes {
            BboxPolicy::Normalize
        } else {
            BboxPolicy::Reject
        })
        .build()?;
    let renderer = OverlayRenderer::new(config);
    match &args.font {
        Some(path) => Ok(renderer.with_font_bytes(read(path)?)?),
        None => Ok(renderer),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Input result: {}", args.input.display());
    if !args.input.exists() {
        bail!("input result not found: {}", args.input.display());
    }

    let mut shell = ResultShell::new(build_renderer(&args)?);
    let result = match AnalysisResult::from_path(&args.input) {
        Ok(result) => result,
        Err(err) => {
            shell.transport_failed(err.to_string());
            bail!("error processing document: {err}");
        }
    };
    let image = args
        .image
        .as_deref()
        .map(DocumentImage::from_path)
        .transpose()?;
    shell.install(result, image);

    for entity_type in &args.clicks {
        shell.click(entity_type);
    }

    shell.select(args.view.into());
    match shell.present() {
        Presentation::Empty => println!("No result loaded."),
        Presentation::Structured(_) => {
            if let (Some(browser), Some(session)) = (shell.browser(), shell.session()) {
                print!("{}", browser.render_text(&session.result));
            }
        }
        Presentation::Visualization(Ok(annotated)) => {
            println!(
                "Annotated page {}x{} (see {} in the output directory)",
                annotated.width(),
                annotated.height(),
                layoutview_core::consts::IMAGE_EXPORT_FILENAME
            );
        }
        Presentation::Visualization(Err(err)) => println!("Visualization unavailable: {err}"),
        Presentation::Raw(Ok(json)) => println!("{json}"),
        Presentation::Raw(Err(err)) => println!("Raw view unavailable: {err}"),
    }

    if args.no_export {
        return Ok(());
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for artifact in shell.export_all() {
        match artifact {
            Ok(artifact) => {
                artifact.write_to(&args.output)?;
            }
            Err(err) => warn!("export skipped: {err}"),
        }
    }

    info!("Export completed successfully!");
    Ok(())
}
