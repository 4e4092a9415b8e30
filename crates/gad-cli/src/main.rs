//! gad CLI - bridge general-arrangement drawings from a parameter file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use gad::{DrawingConfig, OutputFormat, Session, Viewport};

#[derive(Parser)]
#[command(name = "gad")]
#[command(about = "Parametric bridge general-arrangement drawing generator", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// DXF for CAD exchange
    Cad,
    /// SVG page layout
    Page,
    /// Both DXF and SVG
    Both,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Cad => OutputFormat::Cad,
            Format::Page => OutputFormat::Page,
            Format::Both => OutputFormat::Both,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the drawing
    Generate {
        /// Parameter file (.csv/.txt sheet, .toml or .json)
        input: PathBuf,
        /// Output path; the extension is set per format
        #[arg(short, long)]
        output: PathBuf,
        /// Which files to write
        #[arg(short, long, value_enum, default_value_t = Format::Both)]
        format: Format,
        /// Drawing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also print the primitive stream as JSON on stdout
        #[arg(long)]
        dump_primitives: bool,
    },
    /// Validate a parameter file without writing anything
    Check {
        /// Parameter file
        input: PathBuf,
        /// Drawing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render a PNG preview
    Preview {
        /// Parameter file
        input: PathBuf,
        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
        /// Zoom relative to the fitted view
        #[arg(long)]
        zoom: Option<f64>,
        /// Horizontal pan in pixels
        #[arg(long, allow_negative_numbers = true)]
        pan_x: Option<f64>,
        /// Vertical pan in pixels
        #[arg(long, allow_negative_numbers = true)]
        pan_y: Option<f64>,
        /// Drawing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write a sample parameter file (.csv, .toml or .json)
    Template {
        /// Where to write it
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            format,
            config,
            dump_primitives,
        } => {
            let session = open_session(&input, config.as_deref())?;
            if dump_primitives {
                println!("{}", session.primitives_json()?);
            }
            for path in session.generate(format.into(), &output)? {
                eprintln!("Wrote {}", path.display());
            }
        }
        Commands::Check { input, config } => {
            check(&input, config.as_deref())?;
        }
        Commands::Preview {
            input,
            output,
            zoom,
            pan_x,
            pan_y,
            config,
        } => {
            let session = open_session(&input, config.as_deref())?;
            let cfg = &session.config().preview;
            let mut viewport = Viewport::fit();
            viewport.zoom_by(zoom.unwrap_or(cfg.zoom));
            viewport.pan_by(pan_x.unwrap_or(cfg.pan_x), pan_y.unwrap_or(cfg.pan_y));
            session.preview(&output, Some(viewport))?;
            eprintln!("Wrote {}", output.display());
        }
        Commands::Template { path } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            gad::write_template(&path)?;
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_session(input: &Path, config: Option<&Path>) -> Result<Session> {
    let config = match config {
        Some(path) => {
            tracing::debug!("drawing config from {}", path.display());
            DrawingConfig::load(path)?
        }
        None => DrawingConfig::default(),
    };
    let session = Session::load(input, config)
        .with_context(|| format!("cannot draw {}", input.display()))?;
    Ok(session)
}

fn check(input: &Path, config: Option<&Path>) -> Result<()> {
    let session = open_session(input, config)?;
    let params = session.params();
    let spans = params.spans();

    println!("{}", input.display());
    println!(
        "  spans:     {} x {:.3} (overall {:.3})",
        spans.nspan, spans.span1, spans.lbridge
    );
    println!("  skew:      {:.3} deg", params.skew_degrees());
    println!("  samples:   {}", params.cross_section().len());

    let primitives = session.primitives()?;
    println!("  drawing:   {} primitives", primitives.len());

    let diagnostics = params.diagnostics();
    if diagnostics.is_empty() {
        println!("  no warnings");
    } else {
        for d in diagnostics {
            println!("  warning:   {d}");
        }
    }
    Ok(())
}
