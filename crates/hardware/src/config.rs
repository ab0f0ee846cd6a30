//! Configuration structures for the GHB prefetcher.
//!
//! This module defines all configurable parameters of the predictor. It provides:
//! 1. **Defaults:** Baseline sizes, degree, and thresholds.
//! 2. **Structures:** The top-level [`GhbConfig`] and the nested heuristic [`TuningConfig`].
//! 3. **Clamping:** Out-of-range values are corrected at construction, never rejected.
//!
//! Configuration is supplied as JSON (`GhbConfig::from_json` / `GhbConfig::from_path`)
//! or built with `GhbConfig::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::addr::pow2_at_least_one;
use crate::common::error::ConfigError;

/// Default configuration constants for the prefetcher.
mod defaults {
    /// Number of accesses retained in the global history buffer.
    pub const HISTORY_SIZE: usize = 256;

    /// Maximum number of deltas reconstructed per correlation chain.
    pub const PATTERN_LENGTH: usize = 8;

    /// Nominal number of prefetches per triggering access.
    pub const DEGREE: usize = 4;

    /// Minimum confidence (percent) for a learned delta to be predicted.
    pub const CONFIDENCE_THRESHOLD: u32 = 50;

    /// Page size in bytes.
    pub const PAGE_BYTES: u64 = crate::common::constants::PAGE_SIZE;

    /// Largest stride magnitude treated as a sequential run.
    pub const STRIDE_LIMIT: i64 = 200;

    /// Largest stride magnitude eligible for amplification.
    pub const AMPLIFY_LIMIT: i64 = 300;

    /// Two deltas closer than this are considered the same stride.
    pub const STRIDE_TOLERANCE: i64 = 2;

    /// Minimum observations of a delta pair before it can predict.
    pub const MIN_PATTERN_TOTAL: u32 = 2;

    /// Extra prefetches granted on top of `degree` without table confidence.
    pub const BASELINE_DEGREE_BOOST: usize = 2;

    /// Sequential strides below this may cross a page.
    pub const CROSS_PAGE_STRIDE_LIMIT: i64 = 64;

    /// Any delta below this magnitude may cross a page.
    pub const CROSS_PAGE_DELTA_LIMIT: i64 = 32;

    /// Backward deltas below this magnitude may cross a page.
    pub const CROSS_PAGE_BACKWARD_LIMIT: i64 = 128;

    /// Largest accepted history buffer.
    pub const MAX_HISTORY_SIZE: usize = 1 << 20;

    /// Largest accepted nominal degree (and baseline boost).
    pub const MAX_DEGREE: usize = 256;

    /// Largest accepted degree scale, in tenths.
    pub const MAX_SCALE_TENTHS: usize = 160;
}

/// Root prefetcher configuration.
///
/// # Examples
///
/// ```
/// use ghb_core::config::GhbConfig;
///
/// let json = r#"{
///     "history_size": 512,
///     "degree": 2,
///     "use_pc": false,
///     "tuning": { "pattern_table_capacity": 4096 }
/// }"#;
///
/// let config = GhbConfig::from_json(json).unwrap();
/// assert_eq!(config.history_size, 512);
/// assert_eq!(config.pattern_length, 8);
/// assert_eq!(config.tuning.pattern_table_capacity, Some(4096));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GhbConfig {
    /// Global history buffer capacity (entries).
    #[serde(default = "GhbConfig::default_history_size")]
    pub history_size: usize,

    /// Maximum deltas reconstructed when walking a correlation chain.
    #[serde(default = "GhbConfig::default_pattern_length")]
    pub pattern_length: usize,

    /// Nominal prefetch degree.
    #[serde(default = "GhbConfig::default_degree")]
    pub degree: usize,

    /// Correlate by instruction pointer when the access carries one.
    #[serde(default = "GhbConfig::default_use_pc")]
    pub use_pc: bool,

    /// Base confidence threshold in percent (0-100).
    #[serde(default = "GhbConfig::default_confidence_threshold")]
    pub confidence_threshold: u32,

    /// Page size in bytes used for page correlation (power of two).
    #[serde(default = "GhbConfig::default_page_bytes")]
    pub page_bytes: u64,

    /// Heuristic aggressiveness knobs.
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl GhbConfig {
    fn default_history_size() -> usize {
        defaults::HISTORY_SIZE
    }

    fn default_pattern_length() -> usize {
        defaults::PATTERN_LENGTH
    }

    fn default_degree() -> usize {
        defaults::DEGREE
    }

    fn default_use_pc() -> bool {
        true
    }

    fn default_confidence_threshold() -> u32 {
        defaults::CONFIDENCE_THRESHOLD
    }

    fn default_page_bytes() -> u64 {
        defaults::PAGE_BYTES
    }

    /// Parses a configuration from JSON text and clamps it.
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.clamped())
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Returns a copy with every field forced into its legal range.
    ///
    /// Sizes and degree are at least 1 and bounded above, `pattern_length`
    /// never exceeds `history_size`, the threshold is at most 100, and the
    /// page size is rounded up to a power of two.
    #[must_use]
    pub fn clamped(self) -> Self {
        let history_size = self.history_size.clamp(1, defaults::MAX_HISTORY_SIZE);
        Self {
            history_size,
            pattern_length: self.pattern_length.clamp(1, history_size),
            degree: self.degree.clamp(1, defaults::MAX_DEGREE),
            use_pc: self.use_pc,
            confidence_threshold: self.confidence_threshold.min(100),
            page_bytes: pow2_at_least_one(self.page_bytes),
            tuning: self.tuning.clamped(),
        }
    }
}

impl Default for GhbConfig {
    fn default() -> Self {
        Self {
            history_size: defaults::HISTORY_SIZE,
            pattern_length: defaults::PATTERN_LENGTH,
            degree: defaults::DEGREE,
            use_pc: true,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            page_bytes: defaults::PAGE_BYTES,
            tuning: TuningConfig::default(),
        }
    }
}

/// One step of the adaptive confidence schedule.
///
/// A delta pair observed at least `min_total` times lowers the required
/// confidence to `max(floor, threshold - relax)`, never above the configured
/// threshold itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdStep {
    /// Minimum pair total for this step to apply.
    pub min_total: u32,
    /// Percentage points subtracted from the configured threshold.
    pub relax: u32,
    /// Lowest threshold this step may produce.
    pub floor: u32,
}

/// One tier of the confidence-driven prefetch degree.
///
/// Grants `degree * scale_tenths / 10`, optionally capped at
/// `degree + max_extra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DegreeTier {
    /// Minimum best confidence (percent) of the most recent pair.
    pub min_confidence: u32,
    /// Minimum total observations of the most recent pair.
    pub min_total: u32,
    /// Scale applied to the configured degree, in tenths (20 doubles it).
    pub scale_tenths: usize,
    /// Most prefetches this tier may add on top of the degree.
    #[serde(default)]
    pub max_extra: Option<usize>,
}

impl DegreeTier {
    /// Degree granted by this tier.
    pub fn apply(&self, degree: usize) -> usize {
        let scaled = degree.saturating_mul(self.scale_tenths) / 10;
        self.max_extra.map_or(scaled, |extra| scaled.min(degree.saturating_add(extra)))
    }
}

/// Heuristic aggressiveness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuningConfig {
    /// Largest stride magnitude treated as a sequential run.
    #[serde(default = "TuningConfig::default_stride_limit")]
    pub stride_limit: i64,

    /// Largest stride magnitude eligible for amplification.
    #[serde(default = "TuningConfig::default_amplify_limit")]
    pub amplify_limit: i64,

    /// Deltas within this distance count as the same stride.
    #[serde(default = "TuningConfig::default_stride_tolerance")]
    pub stride_tolerance: i64,

    /// Minimum observations of a delta pair before it may predict.
    #[serde(default = "TuningConfig::default_min_pattern_total")]
    pub min_pattern_total: u32,

    /// Extra prefetches on top of `degree` when no confidence tier applies.
    #[serde(default = "TuningConfig::default_baseline_degree_boost")]
    pub baseline_degree_boost: usize,

    /// Adaptive threshold schedule, checked from the highest `min_total` down.
    #[serde(default = "TuningConfig::default_threshold_steps")]
    pub threshold_steps: Vec<ThresholdStep>,

    /// Effective degree tiers, checked from the most demanding down.
    #[serde(default = "TuningConfig::default_degree_tiers")]
    pub degree_tiers: Vec<DegreeTier>,

    /// Sequential strides below this magnitude may cross a page.
    #[serde(default = "TuningConfig::default_cross_page_stride_limit")]
    pub cross_page_stride_limit: i64,

    /// Deltas below this magnitude may cross a page.
    #[serde(default = "TuningConfig::default_cross_page_delta_limit")]
    pub cross_page_delta_limit: i64,

    /// Backward deltas below this magnitude may cross a page.
    #[serde(default = "TuningConfig::default_cross_page_backward_limit")]
    pub cross_page_backward_limit: i64,

    /// Maximum pattern table rows; `None` lets the table grow without bound.
    #[serde(default)]
    pub pattern_table_capacity: Option<usize>,
}

impl TuningConfig {
    fn default_stride_limit() -> i64 {
        defaults::STRIDE_LIMIT
    }

    fn default_amplify_limit() -> i64 {
        defaults::AMPLIFY_LIMIT
    }

    fn default_stride_tolerance() -> i64 {
        defaults::STRIDE_TOLERANCE
    }

    fn default_min_pattern_total() -> u32 {
        defaults::MIN_PATTERN_TOTAL
    }

    fn default_baseline_degree_boost() -> usize {
        defaults::BASELINE_DEGREE_BOOST
    }

    fn default_threshold_steps() -> Vec<ThresholdStep> {
        [(50, 30, 25), (30, 22, 25), (12, 15, 28), (6, 10, 30), (3, 8, 32), (2, 5, 35)]
            .into_iter()
            .map(|(min_total, relax, floor)| ThresholdStep {
                min_total,
                relax,
                floor,
            })
            .collect()
    }

    fn default_degree_tiers() -> Vec<DegreeTier> {
        [
            (90, 20, 100, None),
            (85, 15, 80, None),
            (80, 10, 60, None),
            (70, 5, 40, None),
            (60, 3, 20, None),
            (50, 2, 20, None),
            (40, 0, 18, Some(4)),
            (30, 0, 15, Some(2)),
        ]
        .into_iter()
        .map(|(min_confidence, min_total, scale_tenths, max_extra)| DegreeTier {
            min_confidence,
            min_total,
            scale_tenths,
            max_extra,
        })
        .collect()
    }

    fn default_cross_page_stride_limit() -> i64 {
        defaults::CROSS_PAGE_STRIDE_LIMIT
    }

    fn default_cross_page_delta_limit() -> i64 {
        defaults::CROSS_PAGE_DELTA_LIMIT
    }

    fn default_cross_page_backward_limit() -> i64 {
        defaults::CROSS_PAGE_BACKWARD_LIMIT
    }

    /// Returns a copy with limits made non-negative, percentages capped at
    /// 100, degree scales between 1x and 16x, and both schedules sorted so
    /// the first matching entry is the most demanding one.
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut threshold_steps: Vec<ThresholdStep> = self
            .threshold_steps
            .into_iter()
            .map(|step| ThresholdStep {
                min_total: step.min_total,
                relax: step.relax.min(100),
                floor: step.floor.min(100),
            })
            .collect();
        threshold_steps.sort_by(|a, b| b.min_total.cmp(&a.min_total));

        let mut degree_tiers: Vec<DegreeTier> = self
            .degree_tiers
            .into_iter()
            .map(|tier| DegreeTier {
                min_confidence: tier.min_confidence.min(100),
                min_total: tier.min_total,
                scale_tenths: tier.scale_tenths.clamp(10, defaults::MAX_SCALE_TENTHS),
                max_extra: tier.max_extra.map(|extra| extra.min(defaults::MAX_DEGREE)),
            })
            .collect();
        degree_tiers.sort_by(|a, b| {
            b.min_confidence
                .cmp(&a.min_confidence)
                .then(b.min_total.cmp(&a.min_total))
        });

        Self {
            stride_limit: self.stride_limit.saturating_abs(),
            amplify_limit: self.amplify_limit.saturating_abs(),
            stride_tolerance: self.stride_tolerance.saturating_abs(),
            min_pattern_total: self.min_pattern_total.max(1),
            baseline_degree_boost: self.baseline_degree_boost.min(defaults::MAX_DEGREE),
            threshold_steps,
            degree_tiers,
            cross_page_stride_limit: self.cross_page_stride_limit.saturating_abs(),
            cross_page_delta_limit: self.cross_page_delta_limit.saturating_abs(),
            cross_page_backward_limit: self.cross_page_backward_limit.saturating_abs(),
            pattern_table_capacity: self.pattern_table_capacity,
        }
    }

    /// Relaxes `threshold` according to how often the pair was observed.
    ///
    /// The result never exceeds `threshold`.
    pub fn adaptive_threshold(&self, threshold: u32, total: u32) -> u32 {
        self.threshold_steps
            .iter()
            .find(|step| total >= step.min_total)
            .map_or(threshold, |step| {
                threshold.saturating_sub(step.relax).max(step.floor).min(threshold)
            })
    }

    /// Scales `degree` by the first tier the pair's confidence and total satisfy.
    pub fn effective_degree(&self, degree: usize, confidence: u32, total: u32) -> usize {
        let baseline = degree.saturating_add(self.baseline_degree_boost);
        self.degree_tiers
            .iter()
            .find(|tier| confidence >= tier.min_confidence && total >= tier.min_total)
            .map_or(baseline, |tier| tier.apply(degree).max(baseline))
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            stride_limit: defaults::STRIDE_LIMIT,
            amplify_limit: defaults::AMPLIFY_LIMIT,
            stride_tolerance: defaults::STRIDE_TOLERANCE,
            min_pattern_total: defaults::MIN_PATTERN_TOTAL,
            baseline_degree_boost: defaults::BASELINE_DEGREE_BOOST,
            threshold_steps: Self::default_threshold_steps(),
            degree_tiers: Self::default_degree_tiers(),
            cross_page_stride_limit: defaults::CROSS_PAGE_STRIDE_LIMIT,
            cross_page_delta_limit: defaults::CROSS_PAGE_DELTA_LIMIT,
            cross_page_backward_limit: defaults::CROSS_PAGE_BACKWARD_LIMIT,
            pattern_table_capacity: None,
        }
    }
}
