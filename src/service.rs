//! Per-tick update pass: enumerate, match, resolve, animate, write
//!
//! One `run_pass` call is one pass. The pass id gates animation time
//! advancement (at most once per key per pass) and the differential writer
//! keeps redundant native calls off the hot path. Any single window failing
//! never aborts the pass.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::animation::AnimationEngine;
use crate::color::{anchor_rgb, Colorref};
use crate::config::Config;
use crate::constants::anim;
use crate::desktop::{Desktop, WindowId};
use crate::proc_cache::ProcessNameCache;
use crate::rules::{resolve_coloring, select_rule, MatchContext, ResolvedColoring, RuleKind};

/// Skips native writes when the target value is unchanged from the last one
/// recorded for that window.
#[derive(Default)]
struct DifferentialWriter {
    last: HashMap<WindowId, Colorref>,
}

impl DifferentialWriter {
    /// Write `color` to `window` unless it is a sentinel or unchanged.
    /// Failures are logged and forgotten; the next pass retries naturally.
    fn set<D: Desktop>(&mut self, desktop: &mut D, window: WindowId, color: Colorref) {
        if color.is_sentinel() {
            return;
        }
        if self.last.get(&window) == Some(&color) {
            return;
        }
        match desktop.set_border_color(window, color) {
            Ok(()) => {
                self.last.insert(window, color);
            }
            Err(e) => debug!(window, error = %e, "border write failed, skipping window"),
        }
    }

    /// Drop records for windows that no longer exist.
    fn retain_windows(&mut self, live: &HashSet<WindowId>) {
        self.last.retain(|id, _| live.contains(id));
    }
}

/// The recoloring service: owns all per-window and per-animation state and
/// performs one update pass at a time against the injected desktop.
pub struct BorderService<D: Desktop> {
    desktop: D,
    animations: AnimationEngine,
    process_names: ProcessNameCache,
    writer: DifferentialWriter,
    pass_id: u64,
}

impl<D: Desktop> BorderService<D> {
    pub fn new(desktop: D) -> Self {
        Self {
            desktop,
            animations: AnimationEngine::new(),
            process_names: ProcessNameCache::default(),
            writer: DifferentialWriter::default(),
            pass_id: 0,
        }
    }

    pub fn desktop_mut(&mut self) -> &mut D {
        &mut self.desktop
    }

    /// Run one update pass over all visible windows.
    ///
    /// With `animated_only` set, windows that resolve to static coloring are
    /// skipped entirely; the animation-rate tick uses this to avoid doing
    /// full static work at frame rate.
    pub fn run_pass(&mut self, config: &Config, animated_only: bool) {
        self.pass_id += 1;
        let pass_id = self.pass_id;
        let Self {
            desktop,
            animations,
            process_names,
            writer,
            ..
        } = self;

        if !animated_only {
            process_names.evict_stale();
        }

        let windows = match desktop.list_windows() {
            Ok(windows) => windows,
            Err(e) => {
                warn!(error = %e, "window enumeration failed, skipping pass");
                return;
            }
        };
        let foreground = desktop.foreground_window().unwrap_or_else(|e| {
            debug!(error = %e, "foreground query failed, treating all windows as inactive");
            None
        });
        trace!(pass_id, windows = windows.len(), animated_only, "update pass");

        for win in &windows {
            if win.title.trim().is_empty() {
                continue;
            }
            let process_name = process_names.resolve(win.pid, |pid| desktop.process_name(pid));
            let ctx = MatchContext {
                title: &win.title,
                class_name: &win.class_name,
                process_name: &process_name,
            };
            let rule = select_rule(&config.window_rules, &ctx)
                .or_else(|| config.window_rules.iter().find(|r| r.kind == RuleKind::Global));

            match resolve_coloring(rule, &config.animation) {
                ResolvedColoring::Animated { kind, speed } => {
                    let is_global = rule.is_some_and(|r| r.kind == RuleKind::Global);
                    let scope = if is_global {
                        anim::GLOBAL_SCOPE
                    } else {
                        process_name.as_str()
                    };
                    let key = format!("{scope}|{}", kind.name());
                    let start = rule.and_then(|r| anchor_rgb(&r.active_border_color));
                    let end = rule.and_then(|r| anchor_rgb(&r.inactive_border_color));
                    if let Some(rgb) = animations.color_for(&key, kind, speed, start, end, pass_id)
                    {
                        writer.set(desktop, win.id, Colorref::from_rgb(rgb));
                    }
                }
                ResolvedColoring::Static { active, inactive } => {
                    if animated_only {
                        continue;
                    }
                    let spec = if foreground == Some(win.id) {
                        active
                    } else {
                        inactive
                    };
                    writer.set(desktop, win.id, spec.to_colorref());
                }
            }
        }

        // A full pass saw every live window, so anything else is gone
        if !animated_only {
            let live: HashSet<WindowId> = windows.iter().map(|w| w.id).collect();
            writer.retain_windows(&live);
        }
    }
}
