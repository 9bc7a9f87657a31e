//! Anchor placement for tube hardware.
//!
//! Tube mode puts straps or washers along a resolved [`Geometry`]; frame mode
//! puts washers around the edge of a glass card. The output is positions and
//! orientations only. Paint is the renderer's business.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{FrameConfig, MountConfig};
use crate::geometry::{Axis, Geometry, MeasuredSize, quantize, to_rad};

/// Each end padding is capped so the usable span never drops below 2%.
pub const MAX_PAD_FRACTION: f64 = 0.49;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountStyle {
    /// Metal band wrapped across the tube with bolted flanges.
    #[default]
    Strap,
    /// Round bolt head sitting in a washer ring.
    Washer,
    /// Hex bolt head, no washer ring.
    Bolt,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MountAnchor {
    pub x: f64,
    pub y: f64,
    pub angle_deg: f64,
    pub index: usize,
}

impl MountAnchor {
    fn new(index: usize, x: f64, y: f64, angle_deg: f64) -> Self {
        Self {
            x: quantize(x),
            y: quantize(y),
            angle_deg: quantize(angle_deg),
            index,
        }
    }
}

/// Inset of a circle mount from the ring when none is configured.
pub fn auto_inset(style: MountStyle, head_radius: f64) -> f64 {
    match style {
        MountStyle::Strap => 0.0,
        MountStyle::Washer | MountStyle::Bolt => WasherSpec::new(head_radius).auto_inset,
    }
}

pub fn place_mounts(geometry: &Geometry, config: &MountConfig) -> Vec<MountAnchor> {
    match *geometry {
        Geometry::Circle {
            cx, cy, radius, ..
        } => {
            let inset = config
                .inset
                .unwrap_or_else(|| auto_inset(config.style, config.head_radius))
                .max(0.0);
            let ring = (radius - inset).max(0.0);
            circle_degrees(&config.angles, config.count, config.start_deg)
                .into_iter()
                .enumerate()
                .map(|(idx, deg)| {
                    let t = to_rad(deg);
                    MountAnchor::new(idx, cx + ring * t.cos(), cy + ring * t.sin(), deg + 180.0)
                })
                .collect()
        }
        Geometry::Line {
            cx,
            cy,
            x1,
            y1,
            x2,
            y2,
            length,
            axis,
            ..
        } => {
            let angle = match axis {
                Axis::Horizontal => 90.0,
                Axis::Vertical => 0.0,
            };
            let fractions = line_fractions(&config.fractions, config.count);
            if length <= 0.0 {
                return fractions
                    .iter()
                    .enumerate()
                    .map(|(idx, _)| MountAnchor::new(idx, cx, cy, angle))
                    .collect();
            }
            let pad_end = config.line_pad_end.unwrap_or(config.line_pad_start);
            let (start, usable) = padded_span(length, config.line_pad_start, pad_end);
            let (dx, dy) = (x2 - x1, y2 - y1);
            fractions
                .into_iter()
                .enumerate()
                .map(|(idx, t)| {
                    let t = quantize(start + t * usable);
                    MountAnchor::new(idx, x1 + dx * t, y1 + dy * t, angle)
                })
                .collect()
        }
    }
}

fn circle_degrees(angles: &[f64], count: usize, start_deg: f64) -> Vec<f64> {
    if !angles.is_empty() {
        return angles.iter().map(|a| a + start_deg).collect();
    }
    (0..count)
        .map(|i| start_deg + i as f64 * 360.0 / count as f64)
        .collect()
}

fn line_fractions(explicit: &[f64], count: usize) -> Vec<f64> {
    if !explicit.is_empty() {
        return explicit
            .iter()
            .map(|t| if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 })
            .collect();
    }
    match count {
        0 => Vec::new(),
        1 => vec![0.5],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

fn pad_fraction(pad_px: f64, length: f64) -> f64 {
    if !pad_px.is_finite() {
        return 0.0;
    }
    (pad_px / length.max(1.0)).clamp(0.0, MAX_PAD_FRACTION)
}

/// Start fraction and usable fraction of a line after end padding.
pub fn padded_span(length: f64, pad_start_px: f64, pad_end_px: f64) -> (f64, f64) {
    let start = pad_fraction(pad_start_px, length);
    let end = pad_fraction(pad_end_px, length);
    (start, (1.0 - start - end).max(0.0))
}

pub fn usable_span(length: f64, pad_start_px: f64, pad_end_px: f64) -> f64 {
    padded_span(length, pad_start_px, pad_end_px).1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameShape {
    #[default]
    Circle,
    Rect,
}

impl FrameShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "circle" | "round" => Some(FrameShape::Circle),
            "rect" | "rectangle" => Some(FrameShape::Rect),
            _ => None,
        }
    }
}

/// Washers around a round glass card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameCircle {
    pub count: usize,
    pub angles: Vec<f64>,
    pub start_deg: f64,
    pub inset: Option<f64>,
}

impl Default for FrameCircle {
    fn default() -> Self {
        Self {
            count: 6,
            angles: Vec::new(),
            start_deg: 60.0,
            inset: Some(3.0),
        }
    }
}

/// Snaps to a pixel center so 1px strokes stay crisp.
fn crisp(v: f64) -> f64 {
    v.floor() + 0.5
}

/// Washer anchors for the card described by `frame`, in card pixels.
pub fn place_frame(size: MeasuredSize, frame: &FrameConfig) -> Vec<MountAnchor> {
    match frame.shape {
        FrameShape::Circle => place_frame_circle(size, &frame.circle, frame.head_radius),
        FrameShape::Rect => place_frame_rect(size, &frame.rect),
    }
}

pub fn place_frame_circle(
    size: MeasuredSize,
    frame: &FrameCircle,
    head_radius: f64,
) -> Vec<MountAnchor> {
    let (w, h) = (size.width() as f64, size.height() as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let max_r = (w.min(h) / 2.0).max(0.0) - 1.0;
    let inset = frame
        .inset
        .unwrap_or_else(|| WasherSpec::new(head_radius).auto_inset)
        .max(0.0);
    let ring = (max_r - inset).max(0.0);
    circle_degrees(&frame.angles, frame.count, frame.start_deg)
        .into_iter()
        .enumerate()
        .map(|(idx, deg)| {
            let t = to_rad(deg);
            MountAnchor::new(
                idx,
                crisp(cx + ring * t.cos()),
                crisp(cy + ring * t.sin()),
                deg,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Washers on a rectangular glass card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FrameRect {
    Corners { inset: f64 },
    Sides { sides: Vec<Side>, stops: Vec<f64> },
}

impl Default for FrameRect {
    fn default() -> Self {
        FrameRect::Corners { inset: 14.0 }
    }
}

pub fn place_frame_rect(size: MeasuredSize, frame: &FrameRect) -> Vec<MountAnchor> {
    let (w, h) = (size.width() as f64, size.height() as f64);
    match frame {
        FrameRect::Corners { inset } => {
            let s = *inset;
            [(s, s), (w - s, s), (w - s, h - s), (s, h - s)]
                .into_iter()
                .enumerate()
                .map(|(idx, (x, y))| MountAnchor::new(idx, crisp(x), crisp(y), 0.0))
                .collect()
        }
        FrameRect::Sides { sides, stops } => sides
            .iter()
            .flat_map(|side| stops.iter().map(move |t| (*side, t.clamp(0.0, 1.0))))
            .enumerate()
            .map(|(idx, (side, t))| {
                let (x, y) = match side {
                    Side::Left => (0.0, t * h),
                    Side::Right => (w, t * h),
                    Side::Top => (t * w, 0.0),
                    Side::Bottom => (t * w, h),
                };
                MountAnchor::new(idx, x.round(), y.round(), 0.0)
            })
            .collect(),
    }
}

/// Dimensions of a strap drawn in anchor-local space, band centered on the
/// origin and running across the tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrapSpec {
    pub width: f64,
    pub span: f64,
    pub corner: f64,
    pub plate_width: f64,
    pub plate_height: f64,
    pub edge_len: f64,
    pub under_width: f64,
    pub bolt_head: f64,
    pub bevel_radius: f64,
}

impl StrapSpec {
    pub fn new(stroke: f64, span: Option<f64>, wrap: Option<f64>, corner: Option<f64>) -> Self {
        let span = span.unwrap_or_else(|| (stroke * 0.55).clamp(3.0, 8.0)).max(3.0);
        let wrap = wrap.unwrap_or_else(|| (stroke * 0.25).clamp(1.0, 4.0));
        let corner = corner.unwrap_or_else(|| (span * 0.25).min(1.6));
        let width = (stroke + wrap * 2.0).max(stroke + 2.0);
        let bolt_head = stroke * 0.25;
        Self {
            width,
            span,
            corner,
            plate_width: width / 2.3,
            plate_height: span - 1.6,
            edge_len: (stroke * 0.7).max(2.0),
            under_width: width * 1.75,
            bolt_head,
            bevel_radius: bolt_head * 0.6,
        }
    }

    /// Local x of the flange plate center on `side` (-1 or 1).
    pub fn flange_center(&self, side: f64) -> f64 {
        side * (self.width / 2.0 + self.plate_width / 2.0)
    }
}

/// Dimensions of a washer-and-bolt head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WasherSpec {
    pub head_radius: f64,
    pub washer_width: f64,
    pub ring_radius: f64,
    pub glint_radius: f64,
    pub glint_width: f64,
    pub auto_inset: f64,
}

impl WasherSpec {
    pub fn new(head_radius: f64) -> Self {
        let head = head_radius.max(0.0);
        let washer_width = (head * 0.85).max(1.6);
        Self {
            head_radius: head,
            washer_width,
            ring_radius: head + washer_width * 0.5 + 0.8,
            glint_radius: (head - 0.6).max(0.0),
            glint_width: (head * 0.18).max(0.8),
            auto_inset: head + washer_width * 0.5 + 2.0,
        }
    }

    /// SVG arc for the specular glint on the upper-left of the head.
    pub fn glint_path(&self, x: f64, y: f64) -> String {
        let a1 = to_rad(-130.0);
        let a2 = to_rad(-40.0);
        let r = self.glint_radius;
        let large = if (a2 - a1).abs() > PI { 1 } else { 0 };
        format!(
            "M {} {} A {} {} 0 {} 1 {} {}",
            quantize(x + r * a1.cos()),
            quantize(y + r * a1.sin()),
            quantize(r),
            quantize(r),
            large,
            quantize(x + r * a2.cos()),
            quantize(y + r * a2.sin()),
        )
    }
}

/// Six corners of a flat-topped hex bolt head.
pub fn hex_points(cx: f64, cy: f64, r: f64) -> Vec<(f64, f64)> {
    (0..6)
        .map(|i| {
            let a = PI / 3.0 * i as f64 + PI / 6.0;
            (quantize(cx + r * a.cos()), quantize(cy + r * a.sin()))
        })
        .collect()
}

/// Rectangle path with independent corner radii `[tl, tr, br, bl]`.
pub fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, radii: [f64; 4]) -> String {
    let limit = (w / 2.0).min(h / 2.0).max(0.0);
    let [tl, tr, br, bl] = radii.map(|r| r.clamp(0.0, limit));
    let n = quantize;
    let mut parts = vec![format!("M {} {}", n(x + tl), n(y)), format!("H {}", n(x + w - tr))];
    parts.push(if tr > 0.0 {
        format!("A {} {} 0 0 1 {} {}", n(tr), n(tr), n(x + w), n(y + tr))
    } else {
        format!("L {} {}", n(x + w), n(y))
    });
    parts.push(format!("V {}", n(y + h - br)));
    parts.push(if br > 0.0 {
        format!("A {} {} 0 0 1 {} {}", n(br), n(br), n(x + w - br), n(y + h))
    } else {
        format!("L {} {}", n(x + w), n(y + h))
    });
    parts.push(format!("H {}", n(x + bl)));
    parts.push(if bl > 0.0 {
        format!("A {} {} 0 0 1 {} {}", n(bl), n(bl), n(x), n(y + h - bl))
    } else {
        format!("L {} {}", n(x), n(y + h))
    });
    parts.push(format!("V {}", n(y + tl)));
    parts.push(if tl > 0.0 {
        format!("A {} {} 0 0 1 {} {}", n(tl), n(tl), n(x + tl), n(y))
    } else {
        format!("L {} {}", n(x), n(y))
    });
    parts.push("Z".to_string());
    parts.join(" ")
}
