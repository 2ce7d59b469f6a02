//! Keyed continuous-time animation engine
//!
//! Each animation key ("scope|kind") owns an independent state record. Time
//! advances at most once per key per update pass, so the animation phase is a
//! function of pass count and speed only, never of how many windows happen to
//! share the key.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::color::{join_rgb, lerp_rgb, split_rgb};
use crate::constants::anim;

/// Closed set of supported animation curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationKind {
    #[default]
    None,
    Rainbow,
    Pulse,
    Fade,
    Breath,
    Tri,
    Sparkle,
    Steps,
}

impl AnimationKind {
    /// Config-file name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            AnimationKind::None => "none",
            AnimationKind::Rainbow => "rainbow",
            AnimationKind::Pulse => "pulse",
            AnimationKind::Fade => "fade",
            AnimationKind::Breath => "breath",
            AnimationKind::Tri => "tri",
            AnimationKind::Sparkle => "sparkle",
            AnimationKind::Steps => "steps",
        }
    }

    /// Parse a config-file name; unknown names degrade to `None` rather than
    /// failing the load.
    pub fn from_name(name: &str) -> AnimationKind {
        match name.trim().to_ascii_lowercase().as_str() {
            "rainbow" => AnimationKind::Rainbow,
            "pulse" => AnimationKind::Pulse,
            "fade" => AnimationKind::Fade,
            "breath" => AnimationKind::Breath,
            "tri" => AnimationKind::Tri,
            "sparkle" => AnimationKind::Sparkle,
            "steps" => AnimationKind::Steps,
            _ => AnimationKind::None,
        }
    }
}

impl Serialize for AnimationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AnimationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(AnimationKind::from_name(&name))
    }
}

/// Animation selection carried by a rule or by the global defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    #[serde(rename = "type", default)]
    pub kind: AnimationKind,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            kind: AnimationKind::None,
            speed: default_speed(),
        }
    }
}

/// Per-key animation state.
struct AnimState {
    time: f64,
    current: u32,
    last_pass: u64,
}

impl Default for AnimState {
    fn default() -> Self {
        Self {
            time: 0.0,
            current: anim::INITIAL_COLOR,
            // Pass ids start at 1, so a fresh state always advances first
            last_pass: 0,
        }
    }
}

/// Advance elapsed time once per pass. Returns whether this call was the
/// first for the given pass id.
fn advance(st: &mut AnimState, speed: f64, scale: f64, pass_id: u64) -> bool {
    if st.last_pass == pass_id {
        return false;
    }
    st.time += speed.max(anim::MIN_SPEED) * scale;
    st.last_pass = pass_id;
    true
}

fn triangle_wave(x: f64) -> f64 {
    let x = x.rem_euclid(2.0);
    1.0 - (x - 1.0).abs()
}

fn lighten(rgb: u32, amt: f64) -> u32 {
    lerp_rgb(Some(rgb), Some(0xFFFFFF), amt.clamp(0.0, 1.0))
}

fn darken(rgb: u32, amt: f64) -> u32 {
    lerp_rgb(Some(rgb), Some(0x000000), amt.clamp(0.0, 1.0))
}

/// Keyed animation state table. Owned by the orchestrator; entries are
/// created lazily and persist for the process lifetime (the key space is
/// bounded by configured rules x observed process names).
#[derive(Default)]
pub struct AnimationEngine {
    states: HashMap<String, AnimState>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the animation frame for `key` at the given pass.
    ///
    /// `start`/`end` are optional anchor colors (a rule's active/inactive
    /// colors); the engine substitutes red/blue when unset. Returns `None`
    /// only for [`AnimationKind::None`].
    pub fn color_for(
        &mut self,
        key: &str,
        kind: AnimationKind,
        speed: f64,
        start: Option<u32>,
        end: Option<u32>,
        pass_id: u64,
    ) -> Option<u32> {
        if kind == AnimationKind::None {
            return None;
        }
        let st = self.states.entry(key.to_string()).or_default();
        Some(match kind {
            AnimationKind::None => unreachable!(),
            AnimationKind::Rainbow => rainbow(st, speed, pass_id),
            AnimationKind::Pulse => pulse(st, speed, start, end, pass_id),
            AnimationKind::Fade => fade(st, speed, start, end, pass_id),
            AnimationKind::Breath => breath(st, speed, start, pass_id),
            AnimationKind::Tri => tri(st, speed, start, end, pass_id),
            AnimationKind::Sparkle => sparkle(st, speed, start, pass_id),
            AnimationKind::Steps => steps(st, speed, start, end, pass_id),
        })
    }
}

/// Walk the hue hexagon one channel at a time, stepping once per pass.
fn rainbow(st: &mut AnimState, speed: f64, pass_id: u64) -> u32 {
    if !advance(st, speed, 1.0, pass_id) {
        return st.current;
    }
    let step = ((speed * anim::RAINBOW_STEP_FACTOR) as i64).max(1);
    let (r, g, b) = split_rgb(st.current);
    let (mut r, mut g, mut b) = (r as i64, g as i64, b as i64);
    if r == 0xFF && g < 0xFF && b == 0x00 {
        g = (g + step).min(0xFF);
    } else if g == 0xFF && r > 0x00 && b == 0x00 {
        r = (r - step).max(0x00);
    } else if g == 0xFF && b < 0xFF && r == 0x00 {
        b = (b + step).min(0xFF);
    } else if b == 0xFF && g > 0x00 && r == 0x00 {
        g = (g - step).max(0x00);
    } else if b == 0xFF && r < 0xFF && g == 0x00 {
        r = (r + step).min(0xFF);
    } else if r == 0xFF && b > 0x00 && g == 0x00 {
        b = (b - step).max(0x00);
    } else {
        // Off the hexagon (e.g. after a speed change): restart at red
        (r, g, b) = (0xFF, 0x00, 0x00);
    }
    st.current = join_rgb(r as u32, g as u32, b as u32);
    st.current
}

fn pulse(st: &mut AnimState, speed: f64, a: Option<u32>, b: Option<u32>, pass_id: u64) -> u32 {
    advance(st, speed, 0.05, pass_id);
    let t = (st.time.sin() + 1.0) / 2.0;
    st.current = lerp_rgb(a, b, t);
    st.current
}

/// Same interpolation as pulse at a slower time scale.
fn fade(st: &mut AnimState, speed: f64, a: Option<u32>, b: Option<u32>, pass_id: u64) -> u32 {
    advance(st, speed, 0.02, pass_id);
    let t = (st.time.sin() + 1.0) / 2.0;
    st.current = lerp_rgb(a, b, t);
    st.current
}

fn breath(st: &mut AnimState, speed: f64, a: Option<u32>, pass_id: u64) -> u32 {
    advance(st, speed, 0.03, pass_id);
    let amp = 0.35 * (0.5 + 0.5 * st.time.sin());
    let base = a.unwrap_or(anim::START_FALLBACK);
    st.current = lighten(base, amp);
    st.current
}

fn tri(st: &mut AnimState, speed: f64, a: Option<u32>, b: Option<u32>, pass_id: u64) -> u32 {
    advance(st, speed, 0.06, pass_id);
    let t = triangle_wave(st.time);
    st.current = lerp_rgb(a, b, t);
    st.current
}

/// Blend a lightened and a darkened variant of the start color using two
/// out-of-phase sine jitter terms.
fn sparkle(st: &mut AnimState, speed: f64, a: Option<u32>, pass_id: u64) -> u32 {
    advance(st, speed, 0.05, pass_id);
    let base = a.unwrap_or(anim::START_FALLBACK);
    let w1 = 0.5 + 0.5 * (st.time * 1.7).sin();
    let w2 = 0.5 + 0.5 * (st.time * 2.3 + 1.234).sin();
    let jitter = w1 * 0.6 + w2 * 0.4;
    let up = lighten(base, 0.15 * jitter);
    let down = darken(base, 0.15 * (1.0 - jitter));
    st.current = lerp_rgb(Some(down), Some(up), 0.5);
    st.current
}

/// Pulse interpolation quantized to a few discrete levels.
fn steps(st: &mut AnimState, speed: f64, a: Option<u32>, b: Option<u32>, pass_id: u64) -> u32 {
    let levels = anim::STEPS_LEVELS.max(2) as f64;
    advance(st, speed, 0.04, pass_id);
    let t = (st.time.sin() + 1.0) * 0.5;
    let q = (t * (levels - 1.0)).round() / (levels - 1.0);
    st.current = lerp_rgb(a, b, q);
    st.current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_once_per_pass() {
        let mut st = AnimState::default();
        assert!(advance(&mut st, 1.0, 0.05, 1));
        let after_first = st.time;
        assert!(!advance(&mut st, 1.0, 0.05, 1));
        assert!(!advance(&mut st, 1.0, 0.05, 1));
        assert_eq!(st.time, after_first);
        assert!(advance(&mut st, 1.0, 0.05, 2));
        assert!(st.time > after_first);
    }

    #[test]
    fn test_speed_floor() {
        let mut st = AnimState::default();
        advance(&mut st, 0.0, 0.05, 1);
        assert!((st.time - 0.1 * 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_shared_key_reports_identical_color() {
        let mut engine = AnimationEngine::new();
        for pass in 1..=10u64 {
            let first = engine.color_for("code.exe|pulse", AnimationKind::Pulse, 1.0, None, None, pass);
            let second = engine.color_for("code.exe|pulse", AnimationKind::Pulse, 1.0, None, None, pass);
            assert_eq!(first, second);
        }
        // Exactly 10 advances despite 20 calls
        let st = engine.states.get("code.exe|pulse").unwrap();
        assert!((st.time - 10.0 * 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_none_kind_produces_nothing() {
        let mut engine = AnimationEngine::new();
        assert_eq!(engine.color_for("k|none", AnimationKind::None, 1.0, None, None, 1), None);
        assert!(engine.states.is_empty());
    }

    #[test]
    fn test_rainbow_steps_from_red() {
        let mut engine = AnimationEngine::new();
        let c1 = engine.color_for("GLOBAL|rainbow", AnimationKind::Rainbow, 1.0, None, None, 1);
        assert_eq!(c1, Some(0xFF0500));
        // Same pass: no further stepping
        let again = engine.color_for("GLOBAL|rainbow", AnimationKind::Rainbow, 1.0, None, None, 1);
        assert_eq!(again, Some(0xFF0500));
        let c2 = engine.color_for("GLOBAL|rainbow", AnimationKind::Rainbow, 1.0, None, None, 2);
        assert_eq!(c2, Some(0xFF0A00));
    }

    #[test]
    fn test_rainbow_wraps_through_phases() {
        let mut engine = AnimationEngine::new();
        // High speed saturates a channel per pass: R,G max -> R falls, etc.
        let c1 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 1);
        assert_eq!(c1, Some(0xFFFF00));
        let c2 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 2);
        assert_eq!(c2, Some(0x00FF00));
        let c3 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 3);
        assert_eq!(c3, Some(0x00FFFF));
        let c4 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 4);
        assert_eq!(c4, Some(0x0000FF));
        let c5 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 5);
        assert_eq!(c5, Some(0xFF00FF));
        let c6 = engine.color_for("k|rainbow", AnimationKind::Rainbow, 100.0, None, None, 6);
        assert_eq!(c6, Some(0xFF0000));
    }

    #[test]
    fn test_pulse_stays_between_anchors() {
        let mut engine = AnimationEngine::new();
        for pass in 1..=200u64 {
            let c = engine
                .color_for("k|pulse", AnimationKind::Pulse, 3.0, Some(0x202020), Some(0x808080), pass)
                .unwrap();
            let (r, g, b) = split_rgb(c);
            for ch in [r, g, b] {
                assert!((0x20..=0x80).contains(&ch), "channel {ch:#x} out of range");
            }
        }
    }

    #[test]
    fn test_breath_lightens_toward_white() {
        let mut engine = AnimationEngine::new();
        for pass in 1..=100u64 {
            let c = engine
                .color_for("k|breath", AnimationKind::Breath, 2.0, None, None, pass)
                .unwrap();
            let (r, g, b) = split_rgb(c);
            // Red stays saturated; green/blue rise together, capped by the
            // 0.35 amplitude
            assert_eq!(r, 0xFF);
            assert_eq!(g, b);
            assert!(g <= 89);
        }
    }

    #[test]
    fn test_sparkle_jitters_around_base() {
        let mut engine = AnimationEngine::new();
        for pass in 1..=100u64 {
            let c = engine
                .color_for("k|sparkle", AnimationKind::Sparkle, 1.0, None, None, pass)
                .unwrap();
            let (r, g, b) = split_rgb(c);
            assert_eq!(g, b);
            assert!(r > 200);
            assert!(g < 40);
        }
    }

    #[test]
    fn test_steps_quantizes_to_three_levels() {
        let mut engine = AnimationEngine::new();
        for pass in 1..=300u64 {
            let c = engine
                .color_for("k|steps", AnimationKind::Steps, 5.0, Some(0x000000), Some(0xFFFFFF), pass)
                .unwrap();
            assert!(
                [0x000000, 0x7F7F7F, 0xFFFFFF].contains(&c),
                "unexpected level {c:#08x}"
            );
        }
    }

    #[test]
    fn test_tri_hits_both_anchors() {
        let mut engine = AnimationEngine::new();
        let mut seen_low = false;
        let mut seen_high = false;
        for pass in 1..=500u64 {
            let c = engine
                .color_for("k|tri", AnimationKind::Tri, 1.0, Some(0x000000), Some(0xFF0000), pass)
                .unwrap();
            let (r, _, _) = split_rgb(c);
            if r < 0x10 {
                seen_low = true;
            }
            if r > 0xF0 {
                seen_high = true;
            }
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_independent_keys_do_not_interfere() {
        let mut engine = AnimationEngine::new();
        engine.color_for("a|pulse", AnimationKind::Pulse, 1.0, None, None, 1);
        engine.color_for("b|pulse", AnimationKind::Pulse, 9.0, None, None, 1);
        let a = engine.states.get("a|pulse").unwrap().time;
        let b = engine.states.get("b|pulse").unwrap().time;
        assert!((a - 0.05).abs() < 1e-12);
        assert!((b - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            AnimationKind::None,
            AnimationKind::Rainbow,
            AnimationKind::Pulse,
            AnimationKind::Fade,
            AnimationKind::Breath,
            AnimationKind::Tri,
            AnimationKind::Sparkle,
            AnimationKind::Steps,
        ] {
            assert_eq!(AnimationKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn test_unknown_kind_degrades_to_none() {
        assert_eq!(AnimationKind::from_name("wobble"), AnimationKind::None);
        assert_eq!(AnimationKind::from_name(""), AnimationKind::None);
        assert_eq!(AnimationKind::from_name("RAINBOW"), AnimationKind::Rainbow);
    }

    #[test]
    fn test_spec_deserializes_from_config_shape() {
        let spec: AnimationSpec = serde_json::from_str(r#"{"type": "rainbow", "speed": 2.0}"#).unwrap();
        assert_eq!(spec.kind, AnimationKind::Rainbow);
        assert_eq!(spec.speed, 2.0);

        let unknown: AnimationSpec = serde_json::from_str(r#"{"type": "wiggle"}"#).unwrap();
        assert_eq!(unknown.kind, AnimationKind::None);
        assert_eq!(unknown.speed, 1.0);

        let empty: AnimationSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AnimationSpec::default());
    }
}
