//! Default parameters used when the caller does not supply their own.

/// Width, in samples, of the centered rolling-maximum window (one hour of 1-minute data).
pub const DEFAULT_WINDOW: usize = 61;

/// Spacing of the timestamps sampled by the `generate` command.
pub const DEFAULT_CADENCE_MINUTES: i64 = 60;

/// Minimum share of good samples for a station to count as available.
pub const DEFAULT_GOOD_PERCENT: f64 = 75.0;

/// Number of stations needed to span a triangle.
pub const MIN_STATIONS: usize = 3;

/// Slack on barycentric weights so points on a triangle edge count as inside.
pub const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

/// Histogram defaults, in nT.
pub const HISTOGRAM_MIN: f64 = 0.0;
pub const HISTOGRAM_MAX: f64 = 1000.0;
pub const HISTOGRAM_WIDTH: f64 = 25.0;

/// Upper bound on the number of histogram bins.
pub const MAX_HISTOGRAM_BINS: usize = 1_000_000;

/// North American magnetometers used for interpolation.
pub const STANDARD_STATIONS: [&str; 43] = [
    "M01", "M02", "M03", "M04", "M05", "M06", "M07", "M08", "M09", "M10", "M11", "GLN", "BOU",
    "DLR", "TUL", "CDP", "BSL", "TUC", "BRD", "TEO", "PIN", "C08", "C11", "C12", "T18", "T21",
    "T24", "T56", "T57", "SJG", "NEW", "VIC", "C10", "DSO", "T15", "OTT", "CLK", "PBQ", "CRP",
    "RAL", "FRD", "MSH", "T17",
];
