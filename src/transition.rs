//! On/off light transitions.
//!
//! Every visual channel is its own [`Tween`]. Flipping the light retargets all
//! of them from wherever they currently are; nothing is queued. The host calls
//! [`LightAnimator::advance`] once per frame and paints [`LightAnimator::frame`].

use serde::{Deserialize, Serialize};

use crate::config::NeonConfig;
use crate::filters::core_width;
use crate::theme::Rgb;

/// Fade used for the neon tint over mount hardware.
pub const MOUNT_TINT_MS: f64 = 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
    EaseOut,
}

impl Easing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "linear" => Some(Easing::Linear),
            "easeInOut" | "ease-in-out" => Some(Easing::EaseInOut),
            "easeOut" | "ease-out" => Some(Easing::EaseOut),
            _ => None,
        }
    }

    /// Maps linear progress `t ∈ [0,1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
        }
    }
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let bez = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    let slope = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * a + 6.0 * inv * s * (b - a) + 3.0 * s * s * (1.0 - b)
    };

    let mut s = x;
    for _ in 0..8 {
        let err = bez(x1, x2, s) - x;
        if err.abs() < 1e-7 {
            return bez(y1, y2, s);
        }
        let d = slope(x1, x2, s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..40 {
        let v = bez(x1, x2, s);
        if (v - x).abs() < 1e-7 {
            break;
        }
        if v < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bez(y1, y2, s)
}

/// A single animated scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: Easing,
}

impl Tween {
    pub fn settled(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            duration_ms: 0.0,
            elapsed_ms: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn value(&self) -> f64 {
        if self.is_settled() {
            return self.to;
        }
        let progress = self.easing.apply(self.elapsed_ms / self.duration_ms);
        self.from + (self.to - self.from) * progress
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_settled(&self) -> bool {
        self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms
    }

    /// Starts a new leg from the current interpolated value.
    pub fn retarget(&mut self, to: f64, duration_ms: f64, easing: Easing) {
        self.from = self.value();
        self.to = to;
        self.duration_ms = if duration_ms.is_finite() {
            duration_ms.max(0.0)
        } else {
            0.0
        };
        self.elapsed_ms = 0.0;
        self.easing = easing;
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        }
    }

    /// Jumps to the end of the current leg.
    pub fn finish(&mut self) {
        self.from = self.to;
        self.elapsed_ms = self.duration_ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    On,
    Off,
}

impl From<bool> for LightState {
    fn from(on: bool) -> Self {
        if on { LightState::On } else { LightState::Off }
    }
}

/// Paint values for one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightFrame {
    pub halo_opacity: f64,
    pub color_mix: f64,
    pub tube_color: String,
    pub tube_opacity: f64,
    pub core_width: f64,
    pub core_opacity: f64,
    pub glass_opacity: f64,
    pub mount_tint: f64,
}

#[derive(Debug, Clone)]
pub struct LightAnimator {
    state: LightState,
    on_ms: f64,
    off_ms: f64,
    off_color_ms: f64,
    easing: Easing,
    neon: Rgb,
    glass: Rgb,
    tube_opacity: f64,
    off_tube_alpha: f64,
    core_width: f64,
    core_opacity: f64,
    halo: Tween,
    color: Tween,
    core: Tween,
    glass_layer: Tween,
    mount_tint: Tween,
}

const FALLBACK_NEON: Rgb = Rgb {
    r: 0xec,
    g: 0x4f,
    b: 0xb4,
};
const FALLBACK_GLASS: Rgb = Rgb {
    r: 0xa7,
    g: 0xad,
    b: 0xb4,
};

impl LightAnimator {
    /// Starts settled in `lights_on`.
    pub fn new(config: &NeonConfig, lights_on: bool) -> Self {
        let lit = if lights_on { 1.0 } else { 0.0 };
        Self {
            state: lights_on.into(),
            on_ms: config.timing.on_ms,
            off_ms: config.timing.off_ms,
            off_color_ms: config.timing.off_color_ms,
            easing: config.timing.easing,
            neon: Rgb::from_hex(&config.color).unwrap_or(FALLBACK_NEON),
            glass: Rgb::from_hex(&config.off.glass_color).unwrap_or(FALLBACK_GLASS),
            tube_opacity: config.glow.tube_opacity,
            off_tube_alpha: config.off.tube_alpha,
            core_width: core_width(config.stroke),
            core_opacity: config.glow.core_opacity,
            halo: Tween::settled(lit),
            color: Tween::settled(lit),
            core: Tween::settled(lit),
            glass_layer: Tween::settled(1.0 - lit),
            mount_tint: Tween::settled(lit),
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn set_color(&mut self, hex: &str) -> bool {
        match Rgb::from_hex(hex) {
            Some(rgb) => {
                self.neon = rgb;
                true
            }
            None => false,
        }
    }

    /// Retargets every channel toward `on`. Calling it with the current state
    /// is a no-op; an opposite call mid-flight reverses from the current values.
    pub fn set_lights(&mut self, on: bool) {
        let next = LightState::from(on);
        if next == self.state {
            return;
        }
        self.state = next;
        let lit = if on { 1.0 } else { 0.0 };
        let (fade_ms, color_ms) = if on {
            (self.on_ms, self.on_ms)
        } else {
            (self.off_ms, self.off_color_ms)
        };
        self.halo.retarget(lit, fade_ms, self.easing);
        self.core.retarget(lit, fade_ms, self.easing);
        self.glass_layer.retarget(1.0 - lit, fade_ms, self.easing);
        self.color.retarget(lit, color_ms, self.easing);
        self.mount_tint.retarget(lit, MOUNT_TINT_MS, Easing::EaseInOut);
    }

    pub fn toggle(&mut self) {
        self.set_lights(self.state == LightState::Off);
    }

    pub fn advance(&mut self, dt_ms: f64) {
        for tween in [
            &mut self.halo,
            &mut self.color,
            &mut self.core,
            &mut self.glass_layer,
            &mut self.mount_tint,
        ] {
            tween.advance(dt_ms);
        }
    }

    pub fn finish(&mut self) {
        for tween in [
            &mut self.halo,
            &mut self.color,
            &mut self.core,
            &mut self.glass_layer,
            &mut self.mount_tint,
        ] {
            tween.finish();
        }
    }

    pub fn is_settled(&self) -> bool {
        [
            &self.halo,
            &self.color,
            &self.core,
            &self.glass_layer,
            &self.mount_tint,
        ]
        .iter()
        .all(|t| t.is_settled())
    }

    pub fn frame(&self) -> LightFrame {
        let mix = self.color.value();
        let core = self.core.value();
        LightFrame {
            halo_opacity: self.halo.value(),
            color_mix: mix,
            tube_color: self.glass.mix(self.neon, mix).to_hex(),
            tube_opacity: self.off_tube_alpha + (self.tube_opacity - self.off_tube_alpha) * mix,
            core_width: self.core_width * core,
            core_opacity: self.core_opacity * core,
            glass_opacity: self.glass_layer.value(),
            mount_tint: self.mount_tint.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(on_ms: f64, off_ms: f64, off_color_ms: f64, easing: Easing) -> NeonConfig {
        let mut config = NeonConfig::default();
        config.timing.on_ms = on_ms;
        config.timing.off_ms = off_ms;
        config.timing.off_color_ms = off_color_ms;
        config.timing.easing = easing;
        config
    }

    #[test]
    fn easing_endpoints_and_shape() {
        for easing in [Easing::Linear, Easing::EaseInOut, Easing::EaseOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-4);
        assert!(Easing::EaseInOut.apply(0.2) < 0.2);
        assert!(Easing::EaseOut.apply(0.2) > 0.2);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = Easing::EaseOut.apply(i as f64 / 20.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn tween_runs_to_target() {
        let mut t = Tween::settled(0.0);
        t.retarget(10.0, 100.0, Easing::Linear);
        t.advance(25.0);
        assert!((t.value() - 2.5).abs() < 1e-9);
        t.advance(500.0);
        assert_eq!(t.value(), 10.0);
        assert!(t.is_settled());
    }

    #[test]
    fn zero_duration_snaps() {
        let mut t = Tween::settled(1.0);
        t.retarget(0.0, 0.0, Easing::EaseInOut);
        assert_eq!(t.value(), 0.0);
        assert!(t.is_settled());
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut t = Tween::settled(0.0);
        t.retarget(1.0, 100.0, Easing::Linear);
        t.advance(40.0);
        t.retarget(0.0, 100.0, Easing::Linear);
        assert!((t.value() - 0.4).abs() < 1e-9);
        t.advance(50.0);
        assert!((t.value() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn starts_settled() {
        let on = LightAnimator::new(&NeonConfig::default(), true);
        assert!(on.is_settled());
        let frame = on.frame();
        assert_eq!(frame.halo_opacity, 1.0);
        assert_eq!(frame.tube_color, "#ec4fb4");
        assert_eq!(frame.glass_opacity, 0.0);

        let off = LightAnimator::new(&NeonConfig::default(), false);
        let frame = off.frame();
        assert_eq!(frame.halo_opacity, 0.0);
        assert_eq!(frame.core_width, 0.0);
        assert_eq!(frame.tube_color, "#a7adb4");
        assert_eq!(frame.tube_opacity, 0.25);
    }

    #[test]
    fn off_color_snaps_while_halo_fades() {
        let mut anim = LightAnimator::new(&config(260.0, 220.0, 0.0, Easing::Linear), true);
        anim.set_lights(false);
        assert_eq!(anim.state(), LightState::Off);
        let frame = anim.frame();
        assert_eq!(frame.color_mix, 0.0);
        assert_eq!(frame.tube_color, "#a7adb4");
        assert_eq!(frame.halo_opacity, 1.0);
        anim.advance(110.0);
        assert!((anim.frame().halo_opacity - 0.5).abs() < 1e-9);
        anim.advance(110.0);
        assert_eq!(anim.frame().halo_opacity, 0.0);
        // mount tint keeps its own fade
        assert!(!anim.is_settled());
        anim.advance(MOUNT_TINT_MS);
        assert!(anim.is_settled());
    }

    #[test]
    fn off_color_can_outlast_fade() {
        let mut anim = LightAnimator::new(&config(100.0, 100.0, 400.0, Easing::Linear), true);
        anim.set_lights(false);
        anim.advance(100.0);
        let frame = anim.frame();
        assert_eq!(frame.halo_opacity, 0.0);
        assert!((frame.color_mix - 0.75).abs() < 1e-9);
        assert!(!anim.is_settled());
    }

    #[test]
    fn on_uses_on_ms_everywhere() {
        let mut anim = LightAnimator::new(&config(200.0, 50.0, 0.0, Easing::Linear), false);
        anim.set_lights(true);
        anim.advance(100.0);
        let frame = anim.frame();
        assert!((frame.halo_opacity - 0.5).abs() < 1e-9);
        assert!((frame.color_mix - 0.5).abs() < 1e-9);
        assert!((frame.glass_opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn toggle_mid_flight_reverses_without_jump() {
        let mut anim = LightAnimator::new(&config(100.0, 100.0, 100.0, Easing::Linear), false);
        anim.toggle();
        anim.advance(30.0);
        let before = anim.frame().halo_opacity;
        anim.toggle();
        assert_eq!(anim.state(), LightState::Off);
        assert!((anim.frame().halo_opacity - before).abs() < 1e-9);
        anim.advance(50.0);
        assert!(anim.frame().halo_opacity < before);
    }

    #[test]
    fn same_state_is_noop() {
        let mut anim = LightAnimator::new(&NeonConfig::default(), true);
        anim.set_lights(true);
        assert!(anim.is_settled());
    }

    #[test]
    fn set_color_rejects_bad_hex() {
        let mut anim = LightAnimator::new(&NeonConfig::default(), true);
        assert!(!anim.set_color("blue"));
        assert!(anim.set_color("#00a6ff"));
        assert_eq!(anim.frame().tube_color, "#00a6ff");
    }
}
