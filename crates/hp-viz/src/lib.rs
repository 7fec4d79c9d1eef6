//! # hp-viz
//!
//! Plot-ready numbers for histoplot.
//!
//! This crate does not draw anything. It derives axis ranges, validates
//! style configuration and emits plot-friendly artifacts (arrays instead of
//! nested objects) for an external renderer.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Axis-range derivation (linear, log, non-empty trimming).
pub mod range;

/// Plot presets (simple, data/MC, fraction, comparison).
pub mod presets;

/// Validated style configuration.
pub mod style;

/// Yields tables and significant-figure rounding.
pub mod yields;

pub use presets::{
    ComparisonOptions, DataMcOptions, FractionOptions, NamedPlottable, PadArtifact, PlotArtifact,
    SeriesArtifact, SeriesData, SeriesRole, SimpleOptions, comparison_artifact, data_mc_artifact,
    fraction_artifact, simple_artifact,
};
pub use range::{
    AxisBounds, RangeDeriver, RangeOutcome, RangePhase, RangeState, RangeWarning, log_y_range,
    non_empty_xrange,
};
pub use style::{AxisStyle, BasisStyle, HistoStyle, PadConfig, PadMargins};
pub use yields::{
    PdgRounder, RoundedMeasurement, SignificantFigureRounder, YieldRow, YieldsTable, yields_table,
};
