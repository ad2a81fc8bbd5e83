use crate::config::{Config, ViewportStyle, load_config};
use crate::error::Error;
use crate::ir::{DuplicatePolicy, LegSelection, PlanSource, TubeSheet};
use crate::layout::{Viewport, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::reader::{read_plan, read_tubesheet};
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tsr", version, about = "Tubesheet diagram renderer")]
pub struct Args {
    /// Tubesheet table (x_label;y_label;cl_x;cl_y;hl_x;hl_y;tube_id) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Directory of inspection plan tables (ROW;COL;TUBE), applied in file name order
    #[arg(short = 'p', long = "plans")]
    pub plans: Option<PathBuf>,

    /// Which leg coordinates to draw
    #[arg(short = 'l', long = "leg", value_enum)]
    pub leg: Option<LegSelection>,

    /// Tube outer diameter
    #[arg(long = "tube-od")]
    pub tube_od: Option<f32>,

    #[arg(long = "margin-x")]
    pub margin_x: Option<f32>,

    #[arg(long = "margin-y")]
    pub margin_y: Option<f32>,

    /// Offset separating the cold and hot legs when both are drawn
    #[arg(long = "half-width")]
    pub half_width: Option<f32>,

    #[arg(long = "font-size")]
    pub font_size: Option<f32>,

    /// Explicit viewport as MIN_X,MIN_Y,WIDTH,HEIGHT
    #[arg(long = "viewport", value_parser = parse_viewport, allow_hyphen_values = true)]
    pub viewport: Option<Viewport>,

    #[arg(long = "viewport-style", value_enum)]
    pub viewport_style: Option<ViewportStyle>,

    /// Draw dashed guide lines through the origin
    #[arg(long = "guides")]
    pub guides: bool,

    /// Fail on duplicate tube ids and on plan rows naming unknown tubes
    #[arg(long = "strict")]
    pub strict: bool,

    /// Field separator of the input tables
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<char>,

    /// Also write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// PNG width in pixels
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    let mut config = load_config(args.config.as_deref()).context("failed to load config file")?;
    apply_overrides(&mut config, &args);

    let input = read_input(args.input.as_deref())?;
    let records = read_tubesheet(&input, config.input.delimiter)
        .with_context(|| format!("failed to read tubesheet {}", input_name(args.input.as_deref())))?;
    let policy = if config.layout.strict {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::Overwrite
    };
    let sheet = TubeSheet::from_records(records, policy)?;
    tracing::info!(tubes = sheet.len(), "loaded tubesheet");

    let plans = match args.plans.as_deref() {
        Some(dir) => load_plans(dir, config.input.delimiter)?,
        None => Vec::new(),
    };

    let model = compute_layout(&sheet, &plans, &config.theme, &config.layout)?;
    let svg = render_svg(&model, &config.theme, &config.layout);

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &model)?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let flag_level = if quiet {
        Some("error")
    } else {
        match verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    };
    let filter = match flag_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(leg) = args.leg {
        config.layout.leg = leg;
    }
    if let Some(tube_od) = args.tube_od {
        config.layout.tube_od = tube_od;
    }
    if let Some(margin_x) = args.margin_x {
        config.layout.margin_x = margin_x;
    }
    if let Some(margin_y) = args.margin_y {
        config.layout.margin_y = margin_y;
    }
    if let Some(half_width) = args.half_width {
        config.layout.channel_half_width = half_width;
    }
    if let Some(font_size) = args.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(viewport) = args.viewport {
        config.layout.viewport = Some(viewport);
    }
    if let Some(style) = args.viewport_style {
        config.layout.viewport_style = style;
    }
    if args.guides {
        config.layout.guide_lines = true;
    }
    if args.strict {
        config.layout.strict = true;
    }
    if let Some(delimiter) = args.delimiter {
        config.input.delimiter = delimiter;
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn input_name(path: Option<&Path>) -> String {
    match path {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_viewport(value: &str) -> std::result::Result<Viewport, String> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|err| format!("invalid viewport {value:?}: {err}"))?;
    let [min_x, min_y, width, height] = parts[..] else {
        return Err(format!(
            "invalid viewport {value:?}: expected MIN_X,MIN_Y,WIDTH,HEIGHT"
        ));
    };
    Viewport::new(min_x, min_y, width, height).map_err(|err| format!("{value:?}: {err}"))
}

/// Plan tables in `dir`, sorted by file name. Only `.csv` files are considered.
pub fn discover_plan_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to list plan directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads every plan table in `dir`. Tables without the plan columns are skipped.
pub fn load_plans(dir: &Path, delimiter: char) -> Result<Vec<PlanSource>> {
    let mut plans = Vec::new();
    for path in discover_plan_files(dir)? {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plan")
            .to_string();
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        match read_plan(&name, &contents, delimiter) {
            Ok(plan) => plans.push(plan),
            Err(err @ Error::MissingColumn { .. }) => {
                tracing::warn!(path = %path.display(), %err, "not a plan table, skipping");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read plan {}", path.display()));
            }
        }
    }
    Ok(plans)
}
