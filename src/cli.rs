use crate::config::{Config, load_config};
use crate::geometry::Orientation;
use crate::mounts::FrameShape;
use crate::render::{render_svg, settled_frame, write_output_svg};
use crate::store::{FileStorage, MemoryStorage, Preference, PreferenceStore, StorageBackend};
use crate::theme::{find_color, palette};
use crate::transition::{LightAnimator, LightFrame};
use crate::uid::UidGenerator;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neonr", version, about = "Neon tube light renderer (SVG/PNG)")]
pub struct Args {
    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// circle, horizontal or vertical
    #[arg(long = "orientation")]
    pub orientation: Option<String>,

    /// Tube stroke width in pixels
    #[arg(long = "stroke")]
    pub stroke: Option<f64>,

    /// Bolt the light onto a circle or rect glass card
    #[arg(long = "frame")]
    pub frame: Option<String>,

    /// Directory holding the persisted lights preference
    #[arg(long = "state-dir")]
    pub state_dir: Option<PathBuf>,

    /// Flip the lights
    #[arg(long = "toggle")]
    pub toggle: bool,

    /// Force the lights on or off
    #[arg(long = "lights", value_enum)]
    pub lights: Option<LightsArg>,

    /// Select the next palette color
    #[arg(long = "next")]
    pub next: bool,

    /// Select the previous palette color
    #[arg(long = "prev")]
    pub prev: bool,

    /// Select a palette color by name or hex
    #[arg(long = "color")]
    pub color: Option<String>,

    /// Render this many milliseconds into the on/off transition
    #[arg(long = "at-ms")]
    pub at_ms: Option<f64>,

    /// Print the palette and exit
    #[arg(long = "list-colors")]
    pub list_colors: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightsArg {
    On,
    Off,
}

impl Args {
    fn touches_color(&self) -> bool {
        self.next || self.prev || self.color.is_some() || self.state_dir.is_some()
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    if args.list_colors {
        for color in palette() {
            println!("{}  {}", color.hex, color.name);
        }
        return Ok(());
    }

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let (before, after) = match &args.state_dir {
        Some(dir) => drive_store(PreferenceStore::new(FileStorage::new(dir)), &args)?,
        None => drive_store(PreferenceStore::new(MemoryStorage::new()), &args)?,
    };
    if args.touches_color() {
        config.neon.color = after.light.hex.clone();
    }

    let frame = compute_frame(&config, before.lights_on, after.lights_on, args.at_ms);
    let uid = UidGenerator::default().next_uid();
    let svg = render_svg(&config, &frame, &uid);

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &std::path::Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &std::path::Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(value) = &args.orientation {
        config.neon.orientation = Orientation::parse(value)
            .ok_or_else(|| anyhow::anyhow!("Unknown orientation '{value}'"))?;
    }
    if let Some(stroke) = args.stroke {
        config.neon.stroke = stroke;
    }
    if let Some(value) = &args.frame {
        config.neon.frame.shape = FrameShape::parse(value)
            .ok_or_else(|| anyhow::anyhow!("Unknown frame shape '{value}'"))?;
        config.neon.frame.show = true;
    }
    Ok(())
}

/// Applies the preference flags in a fixed order: color pick, next, prev,
/// toggle, then an explicit on/off. Returns the state before and after.
fn drive_store<B: StorageBackend>(
    mut store: PreferenceStore<B>,
    args: &Args,
) -> Result<(Preference, Preference)> {
    let before = store.state().clone();
    if let Some(key) = &args.color {
        let color = find_color(store.palette(), key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown color '{key}' (see --list-colors)"))?;
        store.select_color(&color);
    }
    if args.next {
        store.next();
    }
    if args.prev {
        store.prev();
    }
    if args.toggle {
        store.toggle();
    }
    if let Some(lights) = args.lights {
        store.set(lights == LightsArg::On);
    }
    Ok((before, store.state().clone()))
}

fn compute_frame(config: &Config, was_on: bool, is_on: bool, at_ms: Option<f64>) -> LightFrame {
    match at_ms {
        Some(ms) => {
            let mut animator = LightAnimator::new(&config.neon, was_on);
            animator.set_lights(is_on);
            animator.advance(ms.max(0.0));
            animator.frame()
        }
        None => settled_frame(&config.neon, is_on),
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
