//! Canonical tube geometry derived from a measured container.
//!
//! Everything here is a pure function of `(orientation, size, stroke)`. All
//! outputs go through [`quantize`] so that repeated resolves produce the same
//! numbers down to the last serialized digit.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Smallest radius used for the circumference so dash arrays never collapse.
pub const MIN_CIRCUMFERENCE_RADIUS: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Circle,
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "circle" | "ring" => Some(Orientation::Circle),
            "horizontal" | "h" => Some(Orientation::Horizontal),
            "vertical" | "v" => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Integer box size of an observed container, never below 1px per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSize")]
pub struct MeasuredSize {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawSize {
    width: u32,
    height: u32,
}

impl From<RawSize> for MeasuredSize {
    fn from(raw: RawSize) -> Self {
        Self::new(raw.width, raw.height)
    }
}

impl MeasuredSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rounds a raw layout measurement to whole pixels.
    pub fn from_layout(width: f64, height: f64) -> Self {
        fn px(v: f64) -> u32 {
            if !v.is_finite() || v <= 0.0 {
                return 1;
            }
            (v.round() as u32).max(1)
        }
        Self {
            width: px(width),
            height: px(height),
        }
    }
}

impl Default for MeasuredSize {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Resolved shape of a tube. Value object, recomputed on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    Circle {
        width: f64,
        height: f64,
        cx: f64,
        cy: f64,
        radius: f64,
        circumference: f64,
    },
    Line {
        width: f64,
        height: f64,
        cx: f64,
        cy: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        length: f64,
        axis: Axis,
        cap_padding: f64,
    },
}

impl Geometry {
    pub fn width(&self) -> f64 {
        match *self {
            Geometry::Circle { width, .. } | Geometry::Line { width, .. } => width,
        }
    }

    pub fn height(&self) -> f64 {
        match *self {
            Geometry::Circle { height, .. } | Geometry::Line { height, .. } => height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        match *self {
            Geometry::Circle { cx, cy, .. } | Geometry::Line { cx, cy, .. } => (cx, cy),
        }
    }

    /// Stroke length of the tube: circumference for rings, span for lines.
    pub fn extent(&self) -> f64 {
        match *self {
            Geometry::Circle { circumference, .. } => circumference,
            Geometry::Line { length, .. } => length,
        }
    }
}

/// Rounds to three decimals, halves toward positive infinity, and folds `-0`
/// into `0`.
pub fn quantize(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let q = (value * 1000.0 + 0.5).floor() / 1000.0;
    if q == 0.0 { 0.0 } else { q }
}

/// Formats a number for an SVG attribute using the quantized value.
pub fn fmt_num(value: f64) -> String {
    format!("{}", quantize(value))
}

pub fn to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Point at `deg` degrees on a circle of radius `r` around `(cx, cy)`.
pub fn polar(deg: f64, r: f64, cx: f64, cy: f64) -> (f64, f64) {
    let t = to_rad(deg);
    (quantize(cx + r * t.cos()), quantize(cy + r * t.sin()))
}

fn sanitize_stroke(stroke: f64) -> f64 {
    if stroke.is_finite() && stroke > 0.0 {
        stroke
    } else {
        0.0
    }
}

pub fn resolve_geometry(orientation: Orientation, size: MeasuredSize, stroke: f64) -> Geometry {
    let stroke = sanitize_stroke(stroke);
    let w = quantize(size.width() as f64);
    let h = quantize(size.height() as f64);
    let cx = quantize(w / 2.0);
    let cy = quantize(h / 2.0);

    let axis = match orientation {
        Orientation::Circle => {
            let radius = quantize((w.min(h) / 2.0 - stroke / 2.0).max(0.0));
            let circumference = quantize(2.0 * PI * radius.max(MIN_CIRCUMFERENCE_RADIUS));
            return Geometry::Circle {
                width: w,
                height: h,
                cx,
                cy,
                radius,
                circumference,
            };
        }
        Orientation::Horizontal => Axis::Horizontal,
        Orientation::Vertical => Axis::Vertical,
    };

    let cap = (stroke / 2.0).ceil() + 1.0;
    let (x1, y1, x2, y2) = match axis {
        Axis::Horizontal => (cap, cy, cap.max(w - cap), cy),
        Axis::Vertical => (cx, cap, cx, cap.max(h - cap)),
    };
    let length = match axis {
        Axis::Horizontal => x2 - x1,
        Axis::Vertical => y2 - y1,
    }
    .max(0.0);

    Geometry::Line {
        width: w,
        height: h,
        cx,
        cy,
        x1: quantize(x1),
        y1: quantize(y1),
        x2: quantize(x2),
        y2: quantize(y2),
        length: quantize(length),
        axis,
        cap_padding: quantize(cap),
    }
}
