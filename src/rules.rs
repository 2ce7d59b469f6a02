//! Rule matching and color resolution
//!
//! A rule set is an ordered list with exactly one Global rule at the front
//! (enforced by the config layer). Matching scores Process rules above the
//! Global rule and prefers the longest `contains` among Process matches;
//! ties keep the earlier rule.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::animation::{AnimationKind, AnimationSpec};
use crate::color::ColorSpec;
use crate::constants::defaults;

/// Rule discriminant: the catch-all, or a substring match on the process
/// executable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    #[serde(alias = "global")]
    Global,
    #[serde(alias = "process")]
    Process,
}

/// A single border-coloring rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "match")]
    pub kind: RuleKind,
    /// Substring matched case-insensitively against the process executable
    /// name; always empty for the Global rule
    #[serde(default)]
    pub contains: String,
    #[serde(default)]
    pub active_border_color: String,
    #[serde(default)]
    pub inactive_border_color: String,
    #[serde(default)]
    pub animation: AnimationSpec,
}

impl Rule {
    /// The built-in Global rule used when a config carries none.
    pub fn global_default() -> Rule {
        Rule {
            kind: RuleKind::Global,
            contains: String::new(),
            active_border_color: defaults::GLOBAL_ACTIVE_COLOR.to_string(),
            inactive_border_color: defaults::GLOBAL_INACTIVE_COLOR.to_string(),
            animation: AnimationSpec::default(),
        }
    }

    /// A fresh Process rule for the given executable name.
    pub fn for_process(contains: &str, active: &str, inactive: &str) -> Rule {
        Rule {
            kind: RuleKind::Process,
            contains: contains.to_string(),
            active_border_color: active.to_string(),
            inactive_border_color: inactive.to_string(),
            animation: AnimationSpec::default(),
        }
    }

    fn matches(&self, ctx: &MatchContext) -> bool {
        match self.kind {
            RuleKind::Global => true,
            RuleKind::Process => {
                !self.contains.is_empty()
                    && ctx
                        .process_name
                        .to_ascii_lowercase()
                        .contains(&self.contains.to_ascii_lowercase())
            }
        }
    }

    /// Rank for tie-breaking: Process beats Global.
    fn score(&self) -> i32 {
        match self.kind {
            RuleKind::Process => 3,
            RuleKind::Global => 0,
        }
    }
}

/// Observable attributes of one window, as seen by the matcher.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub title: &'a str,
    pub class_name: &'a str,
    pub process_name: &'a str,
}

/// Select the best-matching rule for a window.
///
/// Among all matches the highest `(score, contains length)` wins, compared
/// lexicographically; the strict `>` keeps the earliest rule on ties.
/// Returns `None` only when no rule matches at all (no Global rule present).
pub fn select_rule<'r>(rules: &'r [Rule], ctx: &MatchContext) -> Option<&'r Rule> {
    let mut best: Option<&Rule> = None;
    let mut best_key = (-1i32, 0usize);
    for rule in rules {
        if !rule.matches(ctx) {
            continue;
        }
        let key = (rule.score(), rule.contains.len());
        if key > best_key {
            best_key = key;
            best = Some(rule);
        }
    }
    if let Some(rule) = best {
        trace!(
            title = ctx.title,
            class = ctx.class_name,
            process = ctx.process_name,
            kind = ?rule.kind,
            contains = %rule.contains,
            "rule selected"
        );
    }
    best
}

/// Outcome of color resolution for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedColoring {
    Static {
        active: ColorSpec,
        inactive: ColorSpec,
    },
    Animated {
        kind: AnimationKind,
        speed: f64,
    },
}

/// Decide what a matched rule (or its absence) means for a window.
///
/// A rule animation always wins over its static colors; a rule without one
/// falls back to the global default animation; with neither, static colors
/// apply, with `Invalid` silently replaced by `Default`.
pub fn resolve_coloring(rule: Option<&Rule>, global_defaults: &AnimationSpec) -> ResolvedColoring {
    let anim = match rule {
        Some(r) if r.animation.kind != AnimationKind::None => r.animation,
        _ => *global_defaults,
    };
    if anim.kind != AnimationKind::None {
        return ResolvedColoring::Animated {
            kind: anim.kind,
            speed: anim.speed,
        };
    }

    let Some(rule) = rule else {
        return ResolvedColoring::Static {
            active: ColorSpec::Default,
            inactive: ColorSpec::Default,
        };
    };
    ResolvedColoring::Static {
        active: parse_or_default(&rule.active_border_color),
        inactive: parse_or_default(&rule.inactive_border_color),
    }
}

fn parse_or_default(input: &str) -> ColorSpec {
    if input.is_empty() {
        return ColorSpec::Default;
    }
    match ColorSpec::parse(input) {
        ColorSpec::Invalid => ColorSpec::Default,
        spec => spec,
    }
}
