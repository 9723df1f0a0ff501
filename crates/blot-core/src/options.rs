//! Engine configuration.

use std::time::Duration;

/// Options controlling resolution, removal, and fallback behavior.
///
/// Provides sensible defaults for all settings; every tunable threshold
/// is configurable here.
#[derive(Debug, Clone)]
pub struct RedactOptions {
    /// Minimum fraction of vertical overlap for two character boxes to be
    /// clustered onto the same line (default: 0.5).
    pub vertical_overlap: f64,
    /// Padding around each merged line box, as a fraction of the region's
    /// font-size estimate (default: 0.15). Padding never crosses the
    /// midpoint gap to unrelated adjacent text.
    pub padding_factor: f64,
    /// Recognition results below this confidence are tagged low-confidence
    /// (default: 0.5). They are never dropped.
    pub low_confidence_threshold: f64,
    /// Minimum fraction of a primitive's area that must fall inside a
    /// region before the primitive is considered covered (default: 0.3).
    pub partial_overlap_threshold: f64,
    /// Deadline for each recognition or metadata-scrub call
    /// (default: `None` = no deadline). Exceeding it flags the affected
    /// region or page; it never aborts the run.
    pub op_timeout: Option<Duration>,
    /// Raster scale in pixels per point used for the recognition fallback
    /// (default: 300 DPI / 72).
    pub raster_scale: f64,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            vertical_overlap: 0.5,
            padding_factor: 0.15,
            low_confidence_threshold: 0.5,
            partial_overlap_threshold: 0.3,
            op_timeout: None,
            raster_scale: 300.0 / 72.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_contract() {
        let opts = RedactOptions::default();
        assert_eq!(opts.vertical_overlap, 0.5);
        assert_eq!(opts.low_confidence_threshold, 0.5);
        assert_eq!(opts.partial_overlap_threshold, 0.3);
        assert_eq!(opts.padding_factor, 0.15);
        assert!(opts.op_timeout.is_none());
        assert!((opts.raster_scale - 300.0 / 72.0).abs() < 1e-12);
    }

    #[test]
    fn options_are_cloneable() {
        let opts = RedactOptions {
            op_timeout: Some(Duration::from_secs(30)),
            ..RedactOptions::default()
        };
        let cloned = opts.clone();
        assert_eq!(cloned.op_timeout, Some(Duration::from_secs(30)));
    }
}
