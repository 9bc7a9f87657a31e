use crate::config::{Config, FrameConfig, MountConfig, NeonConfig, RenderConfig};
use crate::filters::{
    CoreBloom, Defs, GlassGradient, GlowFilter, GradientStop, OffShadow, Region, TubeMask,
    build_defs,
};
use crate::geometry::{Geometry, MeasuredSize, fmt_num as n, quantize, resolve_geometry};
use crate::mounts::{
    MountAnchor, MountStyle, StrapSpec, WasherSpec, hex_points, place_frame, place_mounts,
    rounded_rect_path,
};
use crate::store::Preference;
use crate::theme::SteelPaint;
use crate::transition::{LightAnimator, LightFrame};
use crate::uid::Uid;
use anyhow::Result;
use std::path::Path;

/// Peak opacity of the neon tint washed over lit hardware.
const MOUNT_TINT_OPACITY: f64 = 0.12;

/// Frame of a light resting in `lights_on` with no transition pending.
pub fn settled_frame(config: &NeonConfig, lights_on: bool) -> LightFrame {
    LightAnimator::new(config, lights_on).frame()
}

/// One-shot render request for hosts that only hold a config and a stored
/// preference.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub config: Config,
    pub preference: Option<Preference>,
    pub uid: Uid,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            config: Config::default(),
            preference: None,
            uid: Uid::new("gt_0"),
        }
    }
}

/// Settled render. A preference, when given, decides the color and whether
/// the light is on.
pub fn render_with_options(options: &RenderOptions) -> String {
    let mut config = options.config.clone();
    let lights_on = match &options.preference {
        Some(preference) => {
            config.neon.color = preference.light.hex.clone();
            preference.lights_on
        }
        None => true,
    };
    let frame = settled_frame(&config.neon, lights_on);
    render_svg(&config, &frame, &options.uid)
}

/// Full document: canvas from `config.render`, background, then the light.
pub fn render_svg(config: &Config, frame: &LightFrame, uid: &Uid) -> String {
    let size = MeasuredSize::from_layout(config.render.width, config.render.height);
    let (w, h) = (size.width(), size.height());
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
    ));
    if has_background(&config.render) {
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&config.render.background)
        ));
    }
    push_light(&mut svg, &config.neon, size, frame, uid);
    svg.push_str("</svg>");
    svg
}

/// Just the light, sized to `size`, for embedding over other content.
pub fn render_light(config: &NeonConfig, size: MeasuredSize, frame: &LightFrame, uid: &Uid) -> String {
    let (w, h) = (size.width(), size.height());
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"100%\" viewBox=\"0 0 {w} {h}\" preserveAspectRatio=\"none\" overflow=\"visible\">",
    ));
    push_light(&mut svg, config, size, frame, uid);
    svg.push_str("</svg>");
    svg
}

fn has_background(render: &RenderConfig) -> bool {
    let bg = render.background.trim();
    !bg.is_empty() && bg != "none" && bg != "transparent"
}

fn push_light(svg: &mut String, config: &NeonConfig, size: MeasuredSize, frame: &LightFrame, uid: &Uid) {
    let geometry = resolve_geometry(config.orientation, size, config.stroke);
    let defs = build_defs(uid, &geometry, config);

    svg.push_str("<defs>");
    push_defs(svg, &defs, &geometry, uid);
    svg.push_str("</defs>");

    push_off_glass(svg, config, &geometry, frame, uid);
    push_glow(svg, config, &geometry, &defs.glow, frame);
    push_tube(svg, config, &geometry, frame);
    push_core(svg, &geometry, &defs.core_bloom, frame);
    if config.mounts.show {
        let anchors = place_mounts(&geometry, &config.mounts);
        push_mounts(svg, config, &anchors, frame, uid);
    }
    if config.frame.show {
        let anchors = place_frame(size, &config.frame);
        push_frame_mounts(svg, &config.frame, &anchors, config.mounts.shine_opacity, uid);
    }
}

fn region_attrs(region: &Region) -> String {
    format!(
        "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        n(region.x),
        n(region.y),
        n(region.width),
        n(region.height)
    )
}

fn shape_stroke(geometry: &Geometry, attrs: &str) -> String {
    match *geometry {
        Geometry::Circle { cx, cy, radius, .. } => format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke-linecap=\"round\" {attrs}/>",
            n(cx),
            n(cy),
            n(radius)
        ),
        Geometry::Line { x1, y1, x2, y2, .. } => format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" fill=\"none\" stroke-linecap=\"round\" {attrs}/>",
            n(x1),
            n(y1),
            n(x2),
            n(y2)
        ),
    }
}

fn gamma_transfer(input: Option<&str>, exponent: f64) -> String {
    let input = input.map(|i| format!(" in=\"{i}\"")).unwrap_or_default();
    format!(
        "<feComponentTransfer{input}><feFuncA type=\"gamma\" amplitude=\"1\" exponent=\"{}\" offset=\"0\"/></feComponentTransfer>",
        n(exponent)
    )
}

fn push_glow_filter(svg: &mut String, filter: &GlowFilter) {
    svg.push_str(&format!(
        "<filter id=\"{}\" filterUnits=\"userSpaceOnUse\" {} color-interpolation-filters=\"sRGB\">",
        filter.id,
        region_attrs(&filter.region)
    ));
    let source = match filter.dilate {
        Some(radius) => {
            svg.push_str(&format!(
                "<feMorphology in=\"SourceGraphic\" operator=\"dilate\" radius=\"{}\" result=\"d\"/>",
                n(radius)
            ));
            "d"
        }
        None => "SourceGraphic",
    };
    svg.push_str(&format!(
        "<feGaussianBlur in=\"{source}\" stdDeviation=\"{}\" result=\"b\"/>",
        n(filter.blur)
    ));
    svg.push_str(&gamma_transfer(Some("b"), filter.gamma));
    svg.push_str("</filter>");
}

fn push_core_bloom(svg: &mut String, bloom: &CoreBloom) {
    svg.push_str(&format!(
        "<filter id=\"{}\" filterUnits=\"userSpaceOnUse\" {} color-interpolation-filters=\"sRGB\"><feGaussianBlur stdDeviation=\"{}\"/>{}</filter>",
        bloom.id,
        region_attrs(&bloom.region),
        n(bloom.blur),
        gamma_transfer(None, bloom.gamma)
    ));
}

fn push_off_shadow(svg: &mut String, shadow: &OffShadow) {
    svg.push_str(&format!(
        "<filter id=\"{}\" filterUnits=\"userSpaceOnUse\" {}><feGaussianBlur in=\"SourceGraphic\" stdDeviation=\"{}\"/></filter>",
        shadow.id,
        region_attrs(&shadow.region),
        n(shadow.blur)
    ));
}

fn push_tube_mask(svg: &mut String, mask: &TubeMask, geometry: &Geometry) {
    svg.push_str(&format!(
        "<mask id=\"{}\" maskUnits=\"userSpaceOnUse\"><rect {} fill=\"black\"/>{}</mask>",
        mask.id,
        region_attrs(&mask.backdrop),
        shape_stroke(
            geometry,
            &format!("stroke=\"white\" stroke-width=\"{}\"", n(mask.stroke_width))
        )
    ));
}

fn push_stops(svg: &mut String, stops: &[GradientStop]) {
    for stop in stops {
        svg.push_str(&format!(
            "<stop offset=\"{}%\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
            n(stop.offset * 100.0),
            stop.color,
            n(stop.opacity)
        ));
    }
}

fn push_glass(svg: &mut String, glass: &GlassGradient) {
    match glass {
        GlassGradient::Radial { id, cx, cy, r, stops } => {
            svg.push_str(&format!(
                "<radialGradient id=\"{id}\" cx=\"{}\" cy=\"{}\" r=\"{}\" gradientUnits=\"userSpaceOnUse\">",
                n(*cx),
                n(*cy),
                n(*r)
            ));
            push_stops(svg, stops);
            svg.push_str("</radialGradient>");
        }
        GlassGradient::Linear {
            id,
            x1,
            y1,
            x2,
            y2,
            stops,
        } => {
            svg.push_str(&format!(
                "<linearGradient id=\"{id}\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" gradientUnits=\"userSpaceOnUse\">",
                n(*x1),
                n(*y1),
                n(*x2),
                n(*y2)
            ));
            push_stops(svg, stops);
            svg.push_str("</linearGradient>");
        }
    }
}

fn push_hardware_paints(svg: &mut String, steel: &SteelPaint, uid: &Uid) {
    svg.push_str(&format!(
        "<radialGradient id=\"{}\" cx=\"50%\" cy=\"50%\" r=\"65%\"><stop offset=\"0\" stop-color=\"{hi}\"/><stop offset=\"0.6\" stop-color=\"{mid}\"/><stop offset=\"0.85\" stop-color=\"{lo}\"/><stop offset=\"1\" stop-color=\"{lo}\"/></radialGradient>",
        uid.id("washerSteel"),
        hi = steel.hi,
        mid = steel.mid,
        lo = steel.lo,
    ));
    svg.push_str(&format!(
        "<linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\" gradientTransform=\"rotate(35)\"><stop offset=\"0\" stop-color=\"{lo}\"/><stop offset=\"0.35\" stop-color=\"{hi}\"/><stop offset=\"0.65\" stop-color=\"{mid}\"/><stop offset=\"1\" stop-color=\"{lo}\"/></linearGradient>",
        uid.id("faceAxial"),
        hi = steel.hi,
        mid = steel.mid,
        lo = steel.lo,
    ));
    svg.push_str(&format!(
        "<radialGradient id=\"{}\" cx=\"50%\" cy=\"50%\" r=\"60%\"><stop offset=\"65%\" stop-color=\"#000\" stop-opacity=\"0\"/><stop offset=\"100%\" stop-color=\"#000\" stop-opacity=\"0.22\"/></radialGradient>",
        uid.id("edgeVignette")
    ));
    svg.push_str(&format!(
        "<linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"0\"><stop offset=\"0\" stop-color=\"#fff\" stop-opacity=\"0\"/><stop offset=\"0.5\" stop-color=\"#fff\" stop-opacity=\"0.65\"/><stop offset=\"1\" stop-color=\"#fff\" stop-opacity=\"0\"/></linearGradient>",
        uid.id("glint")
    ));
    svg.push_str(&format!(
        "<filter id=\"{}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"1.2\" result=\"b\"/><feOffset in=\"b\" dx=\"0\" dy=\"0.6\" result=\"o\"/><feComponentTransfer in=\"o\" result=\"ao\"><feFuncA type=\"linear\" slope=\"0.45\"/></feComponentTransfer><feMerge><feMergeNode in=\"ao\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
        uid.id("contactAO")
    ));
    svg.push_str(&format!(
        "<filter id=\"{}\" x=\"-70%\" y=\"-70%\" width=\"240%\" height=\"240%\" color-interpolation-filters=\"sRGB\"><feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"1.2\" result=\"b1\"/><feOffset in=\"b1\" dx=\"0\" dy=\"1\" result=\"o1\"/><feFlood flood-color=\"#000\" flood-opacity=\"0.82\" result=\"c1\"/><feComposite in=\"c1\" in2=\"o1\" operator=\"in\" result=\"s1\"/><feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"2.8\" result=\"b2\"/><feOffset in=\"b2\" dx=\"0\" dy=\"3.6\" result=\"o2\"/><feFlood flood-color=\"#000\" flood-opacity=\"0.18\" result=\"c2\"/><feComposite in=\"c2\" in2=\"o2\" operator=\"in\" result=\"s2\"/><feMerge><feMergeNode in=\"s1\"/><feMergeNode in=\"s2\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
        uid.id("elev")
    ));
    svg.push_str(&format!(
        "<linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"0\"><stop offset=\"0\" stop-color=\"#000\" stop-opacity=\"0.6\"/><stop offset=\"0.15\" stop-color=\"#000\" stop-opacity=\"0.25\"/><stop offset=\"0.5\" stop-color=\"#fff\" stop-opacity=\"0.85\"/><stop offset=\"0.85\" stop-color=\"#000\" stop-opacity=\"0.25\"/><stop offset=\"1\" stop-color=\"#000\" stop-opacity=\"0.6\"/></linearGradient>",
        uid.id("bandCross")
    ));
    for (suffix, top, bottom) in [("underEdge", "0", "0.55"), ("underEdgeFlip", "0.55", "0")] {
        svg.push_str(&format!(
            "<linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\"><stop offset=\"0\" stop-color=\"#000\" stop-opacity=\"{top}\"/><stop offset=\"1\" stop-color=\"#000\" stop-opacity=\"{bottom}\"/></linearGradient>",
            uid.id(suffix)
        ));
    }
    svg.push_str(&format!(
        "<filter id=\"{}\" x=\"-40%\" y=\"-40%\" width=\"180%\" height=\"180%\"><feGaussianBlur stdDeviation=\"1.4\"/></filter>",
        uid.id("bandAO")
    ));
}

fn push_defs(svg: &mut String, defs: &Defs, geometry: &Geometry, uid: &Uid) {
    for filter in &defs.glow {
        push_glow_filter(svg, filter);
    }
    push_core_bloom(svg, &defs.core_bloom);
    push_off_shadow(svg, &defs.off_shadow);
    svg.push_str(&format!(
        "<filter id=\"{}\"><feGaussianBlur stdDeviation=\"0.35\"/></filter>",
        uid.id("tintSoft")
    ));
    svg.push_str(&format!(
        "<filter id=\"{}\" x=\"0\" y=\"0\" width=\"100%\" height=\"100%\"><feTurbulence type=\"fractalNoise\" baseFrequency=\"0.9\" numOctaves=\"1\" seed=\"3\" stitchTiles=\"stitch\"/><feColorMatrix type=\"saturate\" values=\"0\"/></filter>",
        uid.id("grain")
    ));
    push_tube_mask(svg, &defs.tube_mask, geometry);
    push_glass(svg, &defs.glass);
    push_hardware_paints(svg, &defs.steel, uid);
}

fn push_off_glass(svg: &mut String, config: &NeonConfig, geometry: &Geometry, frame: &LightFrame, uid: &Uid) {
    let glass = frame.glass_opacity;
    if glass <= 0.0 {
        return;
    }
    let off = &config.off;
    let stroke = config.stroke.max(0.0);
    svg.push_str(&format!("<g class=\"off-glass\" opacity=\"{}\">", n(glass)));
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "stroke=\"#000\" stroke-opacity=\"{}\" stroke-width=\"{}\" filter=\"url(#{})\"",
            n(off.shadow_opacity),
            n(stroke + 3.0),
            uid.id("offShadow")
        ),
    ));
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "stroke=\"{}\" stroke-width=\"{}\"",
            uid.url("offGlassPaint"),
            n(stroke)
        ),
    ));
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\" filter=\"url(#{})\"",
            escape_xml(&off.tint_color),
            n(off.tint_opacity),
            n((stroke * 0.22).max(1.0)),
            uid.id("tintSoft")
        ),
    ));
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "stroke=\"#fff\" opacity=\"{}\" stroke-width=\"{}\"",
            n(off.rim_opacity),
            n((stroke * 0.42).min(1.4))
        ),
    ));
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "stroke=\"#000\" opacity=\"{}\" stroke-width=\"{}\"",
            n(off.inner_rim_opacity),
            n((stroke * 0.36).min(1.2))
        ),
    ));
    if let Geometry::Circle {
        cx,
        cy,
        circumference,
        ..
    } = *geometry
    {
        if off.spec_opacity > 0.0 {
            let arc = quantize(off.spec_arc.clamp(0.0, 1.0) * circumference);
            svg.push_str(&format!(
                "<g transform=\"rotate({} {} {})\">",
                n(off.spec_angle),
                n(cx),
                n(cy)
            ));
            for (scale, width, opacity) in [
                (1.0, (stroke * 0.6).min(1.8), off.spec_opacity),
                (0.55, (stroke * 0.42).min(1.2), off.spec_opacity * 0.55),
            ] {
                let len = arc * scale;
                svg.push_str(&shape_stroke(
                    geometry,
                    &format!(
                        "stroke=\"#fff\" stroke-opacity=\"{}\" stroke-width=\"{}\" stroke-dasharray=\"{} {}\"",
                        n(opacity),
                        n(width),
                        n(len),
                        n((circumference - len).max(0.0))
                    ),
                ));
            }
            svg.push_str("</g>");
        }
    }
    if off.noise_opacity > 0.0 {
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\" opacity=\"{}\" mask=\"{}\" filter=\"url(#{})\" style=\"mix-blend-mode:soft-light\"/>",
            n(geometry.width()),
            n(geometry.height()),
            n(off.noise_opacity),
            uid.url("tubeMask"),
            uid.id("grain")
        ));
    }
    svg.push_str("</g>");
}

fn push_glow(svg: &mut String, config: &NeonConfig, geometry: &Geometry, filters: &[GlowFilter], frame: &LightFrame) {
    if frame.halo_opacity <= 0.0 {
        return;
    }
    svg.push_str(&format!(
        "<g class=\"glow\" opacity=\"{}\" style=\"mix-blend-mode:{}\">",
        n(frame.halo_opacity),
        escape_xml(&config.glow.blend)
    ));
    let width = config.stroke.max(0.0) + config.glow.width_boost;
    for filter in filters {
        svg.push_str(&format!("<g opacity=\"{}\">", n(filter.opacity)));
        svg.push_str(&shape_stroke(
            geometry,
            &format!(
                "stroke=\"{}\" stroke-width=\"{}\" filter=\"url(#{})\"",
                escape_xml(&config.color),
                n(width),
                filter.id
            ),
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");
}

fn push_tube(svg: &mut String, config: &NeonConfig, geometry: &Geometry, frame: &LightFrame) {
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "class=\"tube\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\"",
            frame.tube_color,
            n(frame.tube_opacity),
            n(config.stroke.max(0.0))
        ),
    ));
}

fn push_core(svg: &mut String, geometry: &Geometry, bloom: &CoreBloom, frame: &LightFrame) {
    if frame.core_width <= 0.0 || frame.core_opacity <= 0.0 {
        return;
    }
    svg.push_str(&shape_stroke(
        geometry,
        &format!(
            "class=\"core\" stroke=\"#fff\" stroke-opacity=\"{}\" stroke-width=\"{}\" filter=\"url(#{})\"",
            n(frame.core_opacity),
            n(frame.core_width),
            bloom.id
        ),
    ));
}

fn push_mounts(svg: &mut String, config: &NeonConfig, anchors: &[MountAnchor], frame: &LightFrame, uid: &Uid) {
    if anchors.is_empty() {
        return;
    }
    let tint = MOUNT_TINT_OPACITY * frame.mount_tint;
    svg.push_str("<g class=\"mounts\">");
    for anchor in anchors {
        svg.push_str(&format!(
            "<g class=\"mount\" data-index=\"{}\" transform=\"translate({} {}) rotate({})\">",
            anchor.index,
            n(anchor.x),
            n(anchor.y),
            n(anchor.angle_deg)
        ));
        match config.mounts.style {
            MountStyle::Strap => push_strap(svg, config.stroke.max(0.0), &config.mounts, uid),
            MountStyle::Washer => push_washer(
                svg,
                config.mounts.head_radius,
                config.mounts.shine_opacity,
                uid,
            ),
            MountStyle::Bolt => push_bolt(svg, &config.mounts, uid),
        }
        if tint > 0.0 {
            push_mount_tint(svg, config, tint, uid);
        }
        svg.push_str("</g>");
    }
    svg.push_str("</g>");
}

fn push_strap(svg: &mut String, stroke: f64, mounts: &MountConfig, uid: &Uid) {
    let strap = StrapSpec::new(stroke, mounts.band_span, mounts.band_wrap, mounts.band_corner);
    let (w, h) = (strap.width, strap.span);

    for side in [-1.0, 1.0] {
        let cx = strap.flange_center(side);
        let x = cx - strap.plate_width / 2.0;
        let y = -strap.plate_height / 2.0;
        let c = strap.corner;
        let radii = if side < 0.0 { [c, 0.0, 0.0, c] } else { [0.0, c, c, 0.0] };
        let plate = rounded_rect_path(x, y, strap.plate_width, strap.plate_height, radii);
        svg.push_str(&format!("<path d=\"{plate}\" fill=\"{}\"/>", uid.url("faceAxial")));
        svg.push_str(&format!("<path d=\"{plate}\" fill=\"{}\"/>", uid.url("edgeVignette")));
        svg.push_str(&format!(
            "<path d=\"M {} {} L {} {}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" opacity=\"0.45\"/>",
            n(cx - strap.plate_width * 0.35),
            n(-strap.plate_height * 0.2),
            n(cx + strap.plate_width * 0.35),
            n(-strap.plate_height * 0.2),
            uid.url("glint"),
            n((strap.plate_height * 0.1).max(0.6))
        ));
        svg.push_str(&format!("<g filter=\"url(#{})\">", uid.id("elev")));
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\" stroke=\"rgba(0,0,0,0.25)\" stroke-width=\"{}\"/>",
            points_attr(&hex_points(cx, 0.0, strap.bolt_head)),
            uid.url("faceAxial"),
            n(strap.bolt_head * 0.1)
        ));
        svg.push_str(&format!(
            "<circle cx=\"{}\" cy=\"0\" r=\"{}\" fill=\"{}\" stroke=\"rgba(0,0,0,0.25)\" stroke-width=\"{}\"/>",
            n(cx),
            n(strap.bevel_radius),
            uid.url("edgeVignette"),
            n(strap.bevel_radius * 0.1)
        ));
        svg.push_str("</g>");
    }

    for (y, paint) in [(-h / 2.0 - strap.edge_len, "underEdge"), (h / 2.0, "underEdgeFlip")] {
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" mask=\"{}\" opacity=\"0.65\" filter=\"url(#{})\"/>",
            n(-strap.under_width / 2.0),
            n(y),
            n(strap.under_width),
            n(strap.edge_len),
            uid.url(paint),
            uid.url("tubeMask"),
            uid.id("bandAO")
        ));
    }

    let band = format!(
        "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{c}\" ry=\"{c}\"",
        n(-w / 2.0),
        n(-h / 2.0),
        n(w),
        n(h),
        c = n(strap.corner)
    );
    svg.push_str(&format!("<rect {band} fill=\"{}\"/>", uid.url("faceAxial")));
    svg.push_str(&format!("<rect {band} fill=\"{}\" opacity=\"0.9\"/>", uid.url("bandCross")));
    svg.push_str(&format!("<rect {band} fill=\"{}\" opacity=\"0.5\"/>", uid.url("edgeVignette")));
    svg.push_str(&format!(
        "<path d=\"M {} {} L {} {}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" opacity=\"{}\"/>",
        n(-w * 0.35),
        n(-h * 0.25),
        n(w * 0.35),
        n(-h * 0.25),
        uid.url("glint"),
        n((h * 0.12).max(0.6)),
        n(mounts.shine_opacity.clamp(0.0, 1.0))
    ));
}

/// Washers on the glass card. They sit flat, so only a translate.
fn push_frame_mounts(
    svg: &mut String,
    frame: &FrameConfig,
    anchors: &[MountAnchor],
    shine_opacity: f64,
    uid: &Uid,
) {
    if anchors.is_empty() {
        return;
    }
    svg.push_str("<g class=\"frame-mounts\">");
    for anchor in anchors {
        svg.push_str(&format!(
            "<g class=\"frame-mount\" data-index=\"{}\" transform=\"translate({} {})\">",
            anchor.index,
            n(anchor.x),
            n(anchor.y)
        ));
        push_washer(svg, frame.head_radius, shine_opacity, uid);
        svg.push_str("</g>");
    }
    svg.push_str("</g>");
}

fn push_washer(svg: &mut String, head_radius: f64, shine_opacity: f64, uid: &Uid) {
    let washer = WasherSpec::new(head_radius);
    svg.push_str(&format!("<g filter=\"url(#{})\">", uid.id("contactAO")));
    svg.push_str(&format!(
        "<circle cx=\"0\" cy=\"0\" r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
        n(washer.ring_radius),
        uid.url("washerSteel"),
        n(washer.washer_width)
    ));
    svg.push_str("</g>");
    svg.push_str(&format!("<g filter=\"url(#{})\">", uid.id("elev")));
    svg.push_str(&format!(
        "<circle cx=\"0\" cy=\"0\" r=\"{}\" fill=\"{}\"/>",
        n(washer.head_radius),
        uid.url("faceAxial")
    ));
    svg.push_str(&format!(
        "<circle cx=\"0\" cy=\"0\" r=\"{}\" fill=\"{}\"/>",
        n(washer.head_radius),
        uid.url("edgeVignette")
    ));
    svg.push_str("</g>");
    svg.push_str(&format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"#fff\" stroke-width=\"{}\" stroke-linecap=\"round\" opacity=\"{}\"/>",
        washer.glint_path(0.0, 0.0),
        n(washer.glint_width),
        n(shine_opacity.clamp(0.0, 1.0))
    ));
}

fn push_bolt(svg: &mut String, mounts: &MountConfig, uid: &Uid) {
    let head = mounts.head_radius.max(0.0);
    svg.push_str(&format!("<g filter=\"url(#{})\">", uid.id("elev")));
    svg.push_str(&format!(
        "<polygon points=\"{}\" fill=\"{}\" stroke=\"rgba(0,0,0,0.25)\" stroke-width=\"{}\"/>",
        points_attr(&hex_points(0.0, 0.0, head)),
        uid.url("faceAxial"),
        n((head * 0.1).max(0.3))
    ));
    svg.push_str(&format!(
        "<circle cx=\"0\" cy=\"0\" r=\"{}\" fill=\"{}\"/>",
        n(head * 0.6),
        uid.url("edgeVignette")
    ));
    svg.push_str("</g>");
}

fn push_mount_tint(svg: &mut String, config: &NeonConfig, opacity: f64, uid: &Uid) {
    let mounts = &config.mounts;
    let shape = match mounts.style {
        MountStyle::Strap => {
            let strap = StrapSpec::new(
                config.stroke.max(0.0),
                mounts.band_span,
                mounts.band_wrap,
                mounts.band_corner,
            );
            format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{c}\" ry=\"{c}\"",
                n(-strap.width / 2.0),
                n(-strap.span / 2.0),
                n(strap.width),
                n(strap.span),
                c = n(strap.corner)
            )
        }
        MountStyle::Washer => format!(
            "<circle cx=\"0\" cy=\"0\" r=\"{}\"",
            n(WasherSpec::new(mounts.head_radius).ring_radius)
        ),
        MountStyle::Bolt => format!("<circle cx=\"0\" cy=\"0\" r=\"{}\"", n(mounts.head_radius.max(0.0))),
    };
    svg.push_str(&format!(
        "{shape} class=\"mount-tint\" fill=\"{}\" opacity=\"{}\" style=\"mix-blend-mode:screen\" filter=\"url(#{})\"/>",
        escape_xml(&config.color),
        n(opacity),
        uid.id("tintSoft")
    ));
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", n(*x), n(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32)
        .unwrap_or(opt.default_size);

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
