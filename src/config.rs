use crate::filters::{GlowPass, default_glow_passes};
use crate::geometry::Orientation;
use crate::mounts::{FrameCircle, FrameRect, FrameShape, MountStyle};
use crate::theme::{SteelTheme, find_color, is_hex_color, palette};
use crate::transition::Easing;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlowConfig {
    pub blend: String,
    pub passes: Vec<GlowPass>,
    pub width_boost: f64,
    pub spread: f64,
    pub core_opacity: f64,
    pub tube_opacity: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            blend: "screen".to_string(),
            passes: default_glow_passes(),
            width_boost: 10.0,
            spread: 2.0,
            core_opacity: 0.95,
            tube_opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffGlassConfig {
    pub glass_color: String,
    pub tint_color: String,
    pub tint_opacity: f64,
    pub shadow_blur: f64,
    pub shadow_opacity: f64,
    pub rim_opacity: f64,
    pub inner_rim_opacity: f64,
    pub glass_alpha: f64,
    pub noise_opacity: f64,
    pub tube_alpha: f64,
    pub spec_angle: f64,
    pub spec_arc: f64,
    pub spec_opacity: f64,
}

impl Default for OffGlassConfig {
    fn default() -> Self {
        Self {
            glass_color: "#a7adb4".to_string(),
            tint_color: "hsl(215 14% 74%)".to_string(),
            tint_opacity: 0.08,
            shadow_blur: 1.5,
            shadow_opacity: 0.7,
            rim_opacity: 0.26,
            inner_rim_opacity: 0.18,
            glass_alpha: 0.6,
            noise_opacity: 0.05,
            tube_alpha: 0.25,
            spec_angle: 0.0,
            spec_arc: 0.0,
            spec_opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    pub on_ms: f64,
    pub off_ms: f64,
    pub off_color_ms: f64,
    pub easing: Easing,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            on_ms: 260.0,
            off_ms: 220.0,
            off_color_ms: 0.0,
            easing: Easing::EaseInOut,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub show: bool,
    pub style: MountStyle,
    /// Circle tubes: explicit degrees, offset by `start_deg`.
    pub angles: Vec<f64>,
    /// Line tubes: explicit positions in `[0,1]` along the usable span.
    pub fractions: Vec<f64>,
    pub count: usize,
    pub start_deg: f64,
    pub line_pad_start: f64,
    pub line_pad_end: Option<f64>,
    pub inset: Option<f64>,
    pub head_radius: f64,
    pub band_span: Option<f64>,
    pub band_wrap: Option<f64>,
    pub band_corner: Option<f64>,
    pub steel_theme: SteelTheme,
    pub shine_opacity: f64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            show: true,
            style: MountStyle::Strap,
            angles: Vec::new(),
            fractions: Vec::new(),
            count: 6,
            start_deg: 0.0,
            line_pad_start: 0.0,
            line_pad_end: None,
            inset: None,
            head_radius: 6.0,
            band_span: Some(12.0),
            band_wrap: None,
            band_corner: None,
            steel_theme: SteelTheme::Dark,
            shine_opacity: 0.35,
        }
    }
}

/// Washers bolting a glass card around the light, placed on the card's box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub show: bool,
    pub shape: FrameShape,
    pub head_radius: f64,
    pub circle: FrameCircle,
    pub rect: FrameRect,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            show: false,
            shape: FrameShape::Circle,
            head_radius: 3.0,
            circle: FrameCircle::default(),
            rect: FrameRect::default(),
        }
    }
}

/// Everything that shapes one neon light.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeonConfig {
    pub orientation: Orientation,
    pub stroke: f64,
    pub color: String,
    pub glow: GlowConfig,
    pub off: OffGlassConfig,
    pub timing: TimingConfig,
    pub mounts: MountConfig,
    pub frame: FrameConfig,
}

impl Default for NeonConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Circle,
            stroke: 8.0,
            color: palette()[0].hex.clone(),
            glow: GlowConfig::default(),
            off: OffGlassConfig::default(),
            timing: TimingConfig::default(),
            mounts: MountConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 240.0,
            background: "#0b0d12".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub neon: NeonConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlowConfigFile {
    blend: Option<String>,
    passes: Option<Vec<GlowPass>>,
    width_boost: Option<f64>,
    spread: Option<f64>,
    core_opacity: Option<f64>,
    tube_opacity: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OffGlassConfigFile {
    glass_color: Option<String>,
    tint_color: Option<String>,
    tint_opacity: Option<f64>,
    shadow_blur: Option<f64>,
    shadow_opacity: Option<f64>,
    rim_opacity: Option<f64>,
    inner_rim_opacity: Option<f64>,
    glass_alpha: Option<f64>,
    noise_opacity: Option<f64>,
    tube_alpha: Option<f64>,
    spec_angle: Option<f64>,
    spec_arc: Option<f64>,
    spec_opacity: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimingConfigFile {
    on_ms: Option<f64>,
    off_ms: Option<f64>,
    off_color_ms: Option<f64>,
    easing: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MountConfigFile {
    show: Option<bool>,
    style: Option<MountStyle>,
    angles: Option<Vec<f64>>,
    fractions: Option<Vec<f64>>,
    count: Option<usize>,
    start_deg: Option<f64>,
    line_pad_start: Option<f64>,
    line_pad_end: Option<f64>,
    inset: Option<f64>,
    head_radius: Option<f64>,
    band_span: Option<f64>,
    band_wrap: Option<f64>,
    band_corner: Option<f64>,
    steel_theme: Option<SteelTheme>,
    shine_opacity: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameConfigFile {
    show: Option<bool>,
    shape: Option<String>,
    head_radius: Option<f64>,
    circle: Option<FrameCircle>,
    rect: Option<FrameRect>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    orientation: Option<String>,
    stroke: Option<f64>,
    color: Option<String>,
    glow: Option<GlowConfigFile>,
    off: Option<OffGlassConfigFile>,
    timing: Option<TimingConfigFile>,
    mounts: Option<MountConfigFile>,
    frame: Option<FrameConfigFile>,
    render: Option<RenderConfigFile>,
}

/// Accepts a palette name or a `#rrggbb` hex.
pub fn resolve_color(value: &str) -> Option<String> {
    if let Some(color) = find_color(palette(), value) {
        return Some(color.hex.clone());
    }
    is_hex_color(value).then(|| value.trim().to_ascii_lowercase())
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON/JSON5 config document over the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();
    let neon = &mut config.neon;

    if let Some(v) = parsed.orientation {
        neon.orientation = Orientation::parse(&v)
            .ok_or_else(|| anyhow::anyhow!("Unknown orientation: {v}"))?;
    }
    if let Some(v) = parsed.stroke {
        neon.stroke = v.max(0.0);
    }
    if let Some(v) = parsed.color {
        neon.color = resolve_color(&v).ok_or_else(|| anyhow::anyhow!("Unknown color: {v}"))?;
    }

    if let Some(glow) = parsed.glow {
        if let Some(v) = glow.blend {
            neon.glow.blend = v;
        }
        if let Some(v) = glow.passes {
            neon.glow.passes = v.into_iter().map(|p| GlowPass::new(p.blur, p.opacity)).collect();
        }
        if let Some(v) = glow.width_boost {
            neon.glow.width_boost = v;
        }
        if let Some(v) = glow.spread {
            neon.glow.spread = v.max(0.0);
        }
        if let Some(v) = glow.core_opacity {
            neon.glow.core_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = glow.tube_opacity {
            neon.glow.tube_opacity = v.clamp(0.0, 1.0);
        }
    }

    if let Some(off) = parsed.off {
        let cfg = &mut neon.off;
        if let Some(v) = off.glass_color {
            cfg.glass_color = v;
        }
        if let Some(v) = off.tint_color {
            cfg.tint_color = v;
        }
        if let Some(v) = off.tint_opacity {
            cfg.tint_opacity = v;
        }
        if let Some(v) = off.shadow_blur {
            cfg.shadow_blur = v;
        }
        if let Some(v) = off.shadow_opacity {
            cfg.shadow_opacity = v;
        }
        if let Some(v) = off.rim_opacity {
            cfg.rim_opacity = v;
        }
        if let Some(v) = off.inner_rim_opacity {
            cfg.inner_rim_opacity = v;
        }
        if let Some(v) = off.glass_alpha {
            cfg.glass_alpha = v;
        }
        if let Some(v) = off.noise_opacity {
            cfg.noise_opacity = v;
        }
        if let Some(v) = off.tube_alpha {
            cfg.tube_alpha = v;
        }
        if let Some(v) = off.spec_angle {
            cfg.spec_angle = v;
        }
        if let Some(v) = off.spec_arc {
            cfg.spec_arc = v.clamp(0.0, 1.0);
        }
        if let Some(v) = off.spec_opacity {
            cfg.spec_opacity = v;
        }
    }

    if let Some(timing) = parsed.timing {
        if let Some(v) = timing.on_ms {
            neon.timing.on_ms = v.max(0.0);
        }
        if let Some(v) = timing.off_ms {
            neon.timing.off_ms = v.max(0.0);
        }
        if let Some(v) = timing.off_color_ms {
            neon.timing.off_color_ms = v.max(0.0);
        }
        if let Some(v) = timing.easing {
            neon.timing.easing =
                Easing::parse(&v).ok_or_else(|| anyhow::anyhow!("Unknown easing: {v}"))?;
        }
    }

    if let Some(mounts) = parsed.mounts {
        let cfg = &mut neon.mounts;
        if let Some(v) = mounts.show {
            cfg.show = v;
        }
        if let Some(v) = mounts.style {
            cfg.style = v;
        }
        if let Some(v) = mounts.angles {
            cfg.angles = v;
        }
        if let Some(v) = mounts.fractions {
            cfg.fractions = v;
        }
        if let Some(v) = mounts.count {
            cfg.count = v;
        }
        if let Some(v) = mounts.start_deg {
            cfg.start_deg = v;
        }
        if let Some(v) = mounts.line_pad_start {
            cfg.line_pad_start = v;
        }
        if mounts.line_pad_end.is_some() {
            cfg.line_pad_end = mounts.line_pad_end;
        }
        if mounts.inset.is_some() {
            cfg.inset = mounts.inset;
        }
        if let Some(v) = mounts.head_radius {
            cfg.head_radius = v.max(0.0);
        }
        if mounts.band_span.is_some() {
            cfg.band_span = mounts.band_span;
        }
        if mounts.band_wrap.is_some() {
            cfg.band_wrap = mounts.band_wrap;
        }
        if mounts.band_corner.is_some() {
            cfg.band_corner = mounts.band_corner;
        }
        if let Some(v) = mounts.steel_theme {
            cfg.steel_theme = v;
        }
        if let Some(v) = mounts.shine_opacity {
            cfg.shine_opacity = v;
        }
    }

    if let Some(frame) = parsed.frame {
        let cfg = &mut neon.frame;
        cfg.show = frame.show.unwrap_or(true);
        if let Some(v) = frame.shape {
            cfg.shape =
                FrameShape::parse(&v).ok_or_else(|| anyhow::anyhow!("Unknown frame shape: {v}"))?;
        }
        if let Some(v) = frame.head_radius {
            cfg.head_radius = v.max(0.0);
        }
        if let Some(v) = frame.circle {
            cfg.circle = v;
        }
        if let Some(v) = frame.rect {
            cfg.rect = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    Ok(config)
}
