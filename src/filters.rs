//! Filter, mask and gradient parameters for a tube.
//!
//! Regions are expressed in user space and sized from the geometry, so a
//! blur never reaches the edge of its filter region and gets hard-clipped.

use serde::{Deserialize, Serialize};

use crate::config::NeonConfig;
use crate::geometry::{Axis, Geometry, quantize};
use crate::theme::SteelPaint;
use crate::uid::Uid;

/// Extra room on top of the blur and spread allowance.
const GLOW_MARGIN_PAD: f64 = 8.0;
/// Alpha gamma for halo passes; keeps a bright core falling off into a soft edge.
pub const GLOW_GAMMA: f64 = 0.85;
pub const CORE_GAMMA: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowPass {
    pub blur: f64,
    pub opacity: f64,
}

impl GlowPass {
    pub fn new(blur: f64, opacity: f64) -> Self {
        Self { blur, opacity }.sanitized()
    }

    fn sanitized(self) -> Self {
        let blur = if self.blur.is_finite() { self.blur.max(0.0) } else { 0.0 };
        let opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { blur, opacity }
    }
}

pub fn default_glow_passes() -> Vec<GlowPass> {
    vec![
        GlowPass::new(24.0, 0.65),
        GlowPass::new(64.0, 0.38),
        GlowPass::new(128.0, 0.18),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: quantize(x),
            y: quantize(y),
            width: quantize(width),
            height: quantize(height),
        }
    }

    /// The tube's own extent grown by `margin` on every side that matters.
    pub fn around(geometry: &Geometry, margin: f64) -> Self {
        match *geometry {
            Geometry::Circle { cx, cy, radius, .. } => Region::new(
                cx - radius - margin,
                cy - radius - margin,
                radius * 2.0 + margin * 2.0,
                radius * 2.0 + margin * 2.0,
            ),
            Geometry::Line {
                width,
                cy,
                axis: Axis::Horizontal,
                ..
            } => Region::new(-margin, cy - margin, width + margin * 2.0, margin * 2.0),
            Geometry::Line {
                height,
                cx,
                axis: Axis::Vertical,
                ..
            } => Region::new(cx - margin, -margin, margin * 2.0, height + margin * 2.0),
        }
    }
}

/// One halo pass: optional dilate, gaussian blur, gamma alpha transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlowFilter {
    pub id: String,
    pub region: Region,
    pub margin: f64,
    pub dilate: Option<f64>,
    pub blur: f64,
    pub opacity: f64,
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreBloom {
    pub id: String,
    pub region: Region,
    pub core_width: f64,
    pub blur: f64,
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffShadow {
    pub id: String,
    pub region: Region,
    pub blur: f64,
}

/// Black backdrop with a white stroke exactly as thick as the tube.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TubeMask {
    pub id: String,
    pub backdrop: Region,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
    pub opacity: f64,
}

impl GradientStop {
    fn new(offset: f64, color: &str, opacity: f64) -> Self {
        Self {
            offset: quantize(offset),
            color: color.to_string(),
            opacity: quantize(opacity),
        }
    }
}

/// Depth shading across the tube thickness for the unlit glass look.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GlassGradient {
    Radial {
        id: String,
        cx: f64,
        cy: f64,
        r: f64,
        stops: Vec<GradientStop>,
    },
    Linear {
        id: String,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stops: Vec<GradientStop>,
    },
}

impl GlassGradient {
    pub fn id(&self) -> &str {
        match self {
            GlassGradient::Radial { id, .. } | GlassGradient::Linear { id, .. } => id,
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        match self {
            GlassGradient::Radial { stops, .. } | GlassGradient::Linear { stops, .. } => stops,
        }
    }
}

/// Every def a light needs, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Defs {
    pub glow: Vec<GlowFilter>,
    pub core_bloom: CoreBloom,
    pub off_shadow: OffShadow,
    pub tube_mask: TubeMask,
    pub glass: GlassGradient,
    pub steel: SteelPaint,
}

pub fn glow_margin(blur: f64, spread: f64) -> f64 {
    quantize(blur * 4.0 + spread * 2.0 + GLOW_MARGIN_PAD)
}

pub fn build_glow_filters(
    uid: &Uid,
    geometry: &Geometry,
    passes: &[GlowPass],
    spread: f64,
) -> Vec<GlowFilter> {
    let spread = if spread.is_finite() { spread.max(0.0) } else { 0.0 };
    passes
        .iter()
        .map(|pass| pass.sanitized())
        .enumerate()
        .map(|(idx, pass)| {
            let margin = glow_margin(pass.blur, spread);
            GlowFilter {
                id: uid.id(&format!("bg_{idx}")),
                region: Region::around(geometry, margin),
                margin,
                dilate: (spread > 0.0).then_some(quantize(spread)),
                blur: quantize(pass.blur),
                opacity: quantize(pass.opacity),
                gamma: GLOW_GAMMA,
            }
        })
        .collect()
}

pub fn core_width(stroke: f64) -> f64 {
    quantize((stroke * 0.55).max(1.5))
}

pub fn build_core_bloom(uid: &Uid, geometry: &Geometry, stroke: f64) -> CoreBloom {
    let core = core_width(stroke);
    let margin = quantize(stroke.max(core) * 6.0);
    CoreBloom {
        id: uid.id("coreBloom"),
        region: Region::around(geometry, margin),
        core_width: core,
        blur: quantize((core * 0.35).max(1.2)),
        gamma: CORE_GAMMA,
    }
}

pub fn build_off_shadow(uid: &Uid, geometry: &Geometry, stroke: f64, blur: f64) -> OffShadow {
    let region = match *geometry {
        Geometry::Circle { .. } => Region::around(geometry, 10.0),
        Geometry::Line { width, height, .. } => {
            let pad = (stroke * 2.0).max(12.0);
            Region::new(-pad, -pad, width + pad * 2.0, height + pad * 2.0)
        }
    };
    OffShadow {
        id: uid.id("offShadow"),
        region,
        blur: quantize(blur.max(0.0)),
    }
}

pub fn build_tube_mask(uid: &Uid, geometry: &Geometry, stroke: f64) -> TubeMask {
    let backdrop = match *geometry {
        Geometry::Circle { width, height, .. } => Region::new(0.0, 0.0, width, height),
        Geometry::Line {
            width,
            height,
            cap_padding,
            ..
        } => Region::new(
            -cap_padding,
            -cap_padding,
            width + cap_padding * 2.0,
            height + cap_padding * 2.0,
        ),
    };
    TubeMask {
        id: uid.id("tubeMask"),
        backdrop,
        stroke_width: quantize(stroke.max(0.0)),
    }
}

pub fn build_glass_gradient(
    uid: &Uid,
    geometry: &Geometry,
    stroke: f64,
    glass_alpha: f64,
) -> GlassGradient {
    let id = uid.id("offGlassPaint");
    let half = stroke.max(0.0) / 2.0;
    match *geometry {
        Geometry::Circle { cx, cy, radius, .. } => {
            let outer = quantize(radius + half);
            let inner_t = if outer > 0.0 {
                ((radius - half) / outer).max(0.0)
            } else {
                0.8
            };
            let mid_t = inner_t + (1.0 - inner_t) * 0.45;
            GlassGradient::Radial {
                id,
                cx,
                cy,
                r: outer,
                stops: vec![
                    GradientStop::new(inner_t, "#000", 0.25 * glass_alpha),
                    GradientStop::new(mid_t, "#fff", 0.35 * glass_alpha),
                    GradientStop::new(1.0, "#fff", 0.15 * glass_alpha),
                ],
            }
        }
        Geometry::Line { cx, cy, axis, .. } => {
            let (x1, y1, x2, y2) = match axis {
                Axis::Horizontal => (0.0, cy - half, 0.0, cy + half),
                Axis::Vertical => (cx - half, 0.0, cx + half, 0.0),
            };
            GlassGradient::Linear {
                id,
                x1: quantize(x1),
                y1: quantize(y1),
                x2: quantize(x2),
                y2: quantize(y2),
                stops: vec![
                    GradientStop::new(0.0, "#000", 0.25 * glass_alpha),
                    GradientStop::new(0.5, "#fff", 0.35 * glass_alpha),
                    GradientStop::new(1.0, "#fff", 0.15 * glass_alpha),
                ],
            }
        }
    }
}

pub fn build_defs(uid: &Uid, geometry: &Geometry, config: &NeonConfig) -> Defs {
    let stroke = config.stroke;
    Defs {
        glow: build_glow_filters(uid, geometry, &config.glow.passes, config.glow.spread),
        core_bloom: build_core_bloom(uid, geometry, stroke),
        off_shadow: build_off_shadow(uid, geometry, stroke, config.off.shadow_blur),
        tube_mask: build_tube_mask(uid, geometry, stroke),
        glass: build_glass_gradient(uid, geometry, stroke, config.off.glass_alpha),
        steel: config.mounts.steel_theme.steel(),
    }
}
