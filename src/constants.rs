//! Application-wide constants
//!
//! This module contains the magic numbers and string literals used throughout
//! the daemon, providing a single source of truth for constant values.

/// Update pass scheduling constants
pub mod timing {
    /// Interval between full (static + animated) update passes, in milliseconds
    pub const FULL_PASS_INTERVAL_MS: u64 = 120;

    /// Interval between animated-only update passes (~30 FPS), in milliseconds
    pub const ANIM_PASS_INTERVAL_MS: u64 = 33;
}

/// Process-name cache constants
pub mod cache {
    /// Age after which a pid -> name cache entry is evicted, in seconds
    pub const PROCESS_NAME_MAX_AGE_SECS: u64 = 60;
}

/// Animation engine constants
pub mod anim {
    /// Lower bound applied to the configured animation speed
    pub const MIN_SPEED: f64 = 0.1;

    /// Color a fresh animation state starts from (pure red)
    pub const INITIAL_COLOR: u32 = 0xFF0000;

    /// Fallback start anchor when a rule carries no usable active color
    pub const START_FALLBACK: u32 = 0xFF0000;

    /// Fallback end anchor when a rule carries no usable inactive color
    pub const END_FALLBACK: u32 = 0x0000FF;

    /// Scope marker used in animation keys for Global-rule animations
    pub const GLOBAL_SCOPE: &str = "GLOBAL";

    /// Multiplier turning speed into a per-pass rainbow channel step
    pub const RAINBOW_STEP_FACTOR: f64 = 5.0;

    /// Number of discrete levels used by the steps animation
    pub const STEPS_LEVELS: u32 = 3;
}

/// Default rule colors
pub mod defaults {
    /// Active border color of the built-in Global rule
    pub const GLOBAL_ACTIVE_COLOR: &str = "#c6a0f6";

    /// Inactive border color of the built-in Global rule
    pub const GLOBAL_INACTIVE_COLOR: &str = "#ffffff";

    /// Active border color for newly added Process rules
    pub const PROCESS_ACTIVE_COLOR: &str = "#FF0000";

    /// Inactive border color for newly added Process rules
    pub const PROCESS_INACTIVE_COLOR: &str = "#0000FF";
}

/// Config file location constants
pub mod config {
    /// Directory under the user config dir holding our files
    pub const APP_DIR: &str = "borderglow";

    /// Config file name
    pub const FILENAME: &str = "config.json";
}
