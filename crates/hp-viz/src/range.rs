//! Axis-range derivation for a plotting surface.
//!
//! A [`RangeDeriver`] accumulates y-extrema as series are registered and
//! turns them into axis bounds on demand. Once a custom range is set it is
//! frozen: later registrations no longer move it.

use hp_core::{Error, Result};
use hp_hist::{BinSeries, Plottable};
use serde::Serialize;

/// Default headroom on top of a linear y-axis (50% for the legend).
pub const DEFAULT_MARGIN: f64 = 1.5;

/// Fraction of the pad height kept free below the data on a log axis.
const LOG_BOTTOM_FRACTION: f64 = 0.02;

/// Lifecycle of a [`RangeState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePhase {
    /// Nothing registered and no custom range.
    Empty,
    /// Bounds widen with every registration.
    Accumulating,
    /// A custom y-range was set.
    Frozen,
}

/// Degenerate-range conditions. Reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeWarning {
    /// Log scale refused: some registered content is negative.
    NegativeContent {
        /// Smallest content seen.
        y_min: f64,
    },
    /// Log scale not applied: the maximum is not positive.
    NonPositiveMaximum {
        /// Largest content seen.
        y_max: f64,
    },
    /// Log scale not applied: no strictly positive content was seen.
    NoPositiveContent,
}

impl std::fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeContent { y_min } => {
                write!(f, "histogram has negative values (min {}), skipping log y", y_min)
            }
            Self::NonPositiveMaximum { y_max } => {
                write!(f, "histogram maximum is {}, cannot do log y", y_max)
            }
            Self::NoPositiveContent => {
                write!(f, "histogram has no positive values, cannot do log y")
            }
        }
    }
}

/// Range bookkeeping owned by a plotting surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeState {
    /// Smallest y value (or custom lower bound).
    pub y_min: f64,
    /// Largest y value (or custom upper bound).
    pub y_max: f64,
    /// Smallest strictly positive y value.
    pub y_min_positive: Option<f64>,
    /// Lower x bound.
    pub x_min: f64,
    /// Upper x bound.
    pub x_max: f64,
    /// Logarithmic y-axis.
    pub is_log: bool,
    /// y-range set explicitly.
    pub has_custom_y_range: bool,
    /// x-range set explicitly.
    pub has_custom_x_range: bool,
    /// Derive the y-range automatically.
    pub auto_y: bool,
    /// Some registered content was negative.
    pub has_negative_content: bool,
    n_registered: usize,
    x_initialized: bool,
}

impl Default for RangeState {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: 1.0,
            y_min_positive: None,
            x_min: 0.0,
            x_max: 1.0,
            is_log: false,
            has_custom_y_range: false,
            has_custom_x_range: false,
            auto_y: true,
            has_negative_content: false,
            n_registered: 0,
            x_initialized: false,
        }
    }
}

impl RangeState {
    /// Current phase.
    pub fn phase(&self) -> RangePhase {
        if self.has_custom_y_range {
            RangePhase::Frozen
        } else if self.n_registered == 0 {
            RangePhase::Empty
        } else {
            RangePhase::Accumulating
        }
    }

    /// Number of registered series.
    pub fn n_registered(&self) -> usize {
        self.n_registered
    }
}

/// Final y bounds plus the warning raised while computing them, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeOutcome {
    /// `(low, high)`.
    pub range: (f64, f64),
    /// Set when log scale was requested but could not be applied.
    pub warning: Option<RangeWarning>,
}

/// Everything a renderer needs to set up the axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    /// Lower x bound.
    pub x_min: f64,
    /// Upper x bound.
    pub x_max: f64,
    /// Lower y bound.
    pub y_min: f64,
    /// Upper y bound.
    pub y_max: f64,
    /// Draw the y-axis logarithmically.
    pub log_y: bool,
}

/// Log-scale y bounds placing the data in the lower `1/margin` of the pad.
///
/// `fPlot = 1/margin` is the fraction taken by the data, 2% stays free at
/// the bottom and the rest is left for the legend.
pub fn log_y_range(y_min_positive: f64, y_max: f64, margin: f64) -> (f64, f64) {
    let f_plot = 1.0 / margin;
    let f_bot = LOG_BOTTOM_FRACTION;
    let f_leg = 1.0 - f_plot - LOG_BOTTOM_FRACTION;
    let low = y_min_positive.powf((f_plot + f_bot) / f_plot) / y_max.powf(f_bot / f_plot);
    let high = y_max.powf((1.0 - f_bot) / f_plot) / y_min_positive.powf(f_leg / f_plot);
    (low, high)
}

/// Incrementally derives the axis ranges of one plotting surface.
#[derive(Debug, Clone, Default)]
pub struct RangeDeriver {
    state: RangeState,
}

impl RangeDeriver {
    /// Fresh deriver with automatic y-range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deriver that does not widen the y-axis automatically.
    pub fn without_auto_y() -> Self {
        let mut d = Self::default();
        d.state.auto_y = false;
        d
    }

    /// Current state.
    pub fn state(&self) -> &RangeState {
        &self.state
    }

    /// Widen the bounds to include `item`.
    ///
    /// The x-range comes from the first binned series unless a custom
    /// x-range is set. y-extrema are ignored once the y-range is frozen.
    pub fn register(&mut self, item: &Plottable) {
        let x_bounds = item.as_binned().map(|s| (s.x_min(), s.x_max()));
        self.absorb(item.minimum(), item.minimum_positive(), item.maximum(), x_bounds);
    }

    /// Register a binned series.
    pub fn register_series(&mut self, series: &BinSeries) {
        self.absorb(
            series.minimum(),
            series.minimum_positive(),
            series.maximum(),
            Some((series.x_min(), series.x_max())),
        );
    }

    fn absorb(&mut self, lo: f64, lo_pos: Option<f64>, hi: f64, x_bounds: Option<(f64, f64)>) {
        let first = self.state.n_registered == 0;
        self.state.n_registered += 1;

        if lo < 0.0 {
            self.state.has_negative_content = true;
        }

        if !self.state.has_custom_x_range
            && !self.state.x_initialized
            && let Some((x_min, x_max)) = x_bounds
        {
            self.state.x_min = x_min;
            self.state.x_max = x_max;
            self.state.x_initialized = true;
        }

        if self.state.has_custom_y_range {
            return;
        }

        if first {
            self.state.y_min = lo;
            self.state.y_min_positive = lo_pos;
            self.state.y_max = hi;
        } else {
            self.state.y_min = self.state.y_min.min(lo);
            self.state.y_max = self.state.y_max.max(hi);
            self.state.y_min_positive = match (self.state.y_min_positive, lo_pos) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
    }

    /// Freeze the y-range to `[low, high]`.
    pub fn set_y_range(&mut self, low: f64, high: f64) -> Result<()> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::Validation(format!("invalid y-range [{}, {}]", low, high)));
        }
        self.state.y_min = low;
        self.state.y_max = high;
        self.state.has_custom_y_range = true;
        Ok(())
    }

    /// Freeze the x-range to `[low, high]`.
    pub fn set_x_range(&mut self, low: f64, high: f64) -> Result<()> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::Validation(format!("invalid x-range [{}, {}]", low, high)));
        }
        self.state.x_min = low;
        self.state.x_max = high;
        self.state.has_custom_x_range = true;
        Ok(())
    }

    /// Switch the y-axis between log and linear.
    ///
    /// Log scale is refused when negative content was registered; the
    /// state is left unchanged and the warning returned.
    pub fn set_log_y(&mut self, on: bool) -> Option<RangeWarning> {
        if on
            && (self.state.has_negative_content || self.state.y_min < 0.0 || self.state.y_max < 0.0)
        {
            let w = RangeWarning::NegativeContent { y_min: self.state.y_min };
            log::warn!("{}", w);
            return Some(w);
        }
        self.state.is_log = on;
        None
    }

    /// Margin used by [`Self::y_range`]: 1 for custom or fixed ranges.
    pub fn default_margin(&self) -> f64 {
        if self.state.has_custom_y_range || !self.state.auto_y { 1.0 } else { DEFAULT_MARGIN }
    }

    /// y bounds with [`Self::default_margin`].
    pub fn y_range(&self) -> RangeOutcome {
        self.basis_y_range(self.default_margin())
    }

    /// y bounds for a given top margin.
    ///
    /// A custom y-range ignores `margin`. On a log axis that cannot be
    /// computed, or once negative content was registered, the linear bounds
    /// are returned together with a warning.
    pub fn basis_y_range(&self, margin: f64) -> RangeOutcome {
        let s = &self.state;
        let margin = if s.has_custom_y_range { 1.0 } else { margin };
        let linear = (s.y_min, s.y_max * margin);
        if !s.is_log {
            return RangeOutcome { range: linear, warning: None };
        }
        if s.has_negative_content {
            let w = RangeWarning::NegativeContent { y_min: s.y_min };
            log::warn!("{}", w);
            return RangeOutcome { range: linear, warning: Some(w) };
        }

        match s.y_min_positive {
            Some(y_min_positive) if s.y_max > 0.0 => {
                RangeOutcome { range: log_y_range(y_min_positive, s.y_max, margin), warning: None }
            }
            _ => {
                let w = if s.y_max <= 0.0 {
                    RangeWarning::NonPositiveMaximum { y_max: s.y_max }
                } else {
                    RangeWarning::NoPositiveContent
                };
                log::warn!("{}", w);
                RangeOutcome { range: linear, warning: Some(w) }
            }
        }
    }

    /// x bounds.
    pub fn basis_x_range(&self) -> (f64, f64) {
        (self.state.x_min, self.state.x_max)
    }

    /// Bounds for the renderer with the default margin.
    pub fn axis_bounds(&self) -> (AxisBounds, Option<RangeWarning>) {
        let y = self.y_range();
        let (x_min, x_max) = self.basis_x_range();
        let bounds = AxisBounds {
            x_min,
            x_max,
            y_min: y.range.0,
            y_max: y.range.1,
            log_y: self.state.is_log && y.warning.is_none(),
        };
        (bounds, y.warning)
    }

    /// Forget registered series and custom ranges; keep log and auto-y settings.
    pub fn reset(&mut self) {
        let RangeState { is_log, auto_y, .. } = self.state;
        self.state = RangeState { is_log, auto_y, ..RangeState::default() };
    }
}

/// x bounds enclosing every bin where either series is non-zero.
///
/// Leading and trailing bins that are exactly zero in both series are cut.
/// If no bin is non-zero, the full domain of `primary` is returned.
pub fn non_empty_xrange(primary: &BinSeries, secondary: &BinSeries) -> Result<(f64, f64)> {
    if !primary.same_bin_count(secondary) {
        return Err(Error::IncompatibleHistograms(format!(
            "non-empty range needs equal binning: {} vs {} bins",
            primary.n_bins(),
            secondary.n_bins()
        )));
    }
    let mut bounds: Option<(f64, f64)> = None;
    for i in 0..primary.n_bins() {
        if primary.content()[i] != 0.0 || secondary.content()[i] != 0.0 {
            let low = bounds.map_or(primary.bin_low_edge(i), |(lo, _)| lo);
            bounds = Some((low, primary.bin_high_edge(i)));
        }
    }
    Ok(bounds.unwrap_or((primary.x_min(), primary.x_max())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(content: &[f64]) -> BinSeries {
        let edges = (0..=content.len()).map(|i| i as f64).collect();
        BinSeries::new(edges, content.to_vec(), vec![0.0; content.len()]).unwrap()
    }

    #[test]
    fn test_register_widens() {
        let mut d = RangeDeriver::new();
        assert_eq!(d.state().phase(), RangePhase::Empty);
        d.register_series(&series(&[2.0, 5.0, 0.0]));
        d.register_series(&series(&[0.5, 9.0, 1.0]));
        let s = d.state();
        assert_eq!(s.phase(), RangePhase::Accumulating);
        assert_eq!((s.y_min, s.y_max), (0.0, 9.0));
        assert_eq!(s.y_min_positive, Some(0.5));
        assert_eq!(d.basis_x_range(), (0.0, 3.0));
    }

    #[test]
    fn test_x_range_from_first_binned() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[1.0, 1.0]));
        d.register_series(&series(&[1.0, 1.0, 1.0, 1.0]));
        assert_eq!(d.basis_x_range(), (0.0, 2.0));
    }

    #[test]
    fn test_linear_range_margin() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[1.0, 4.0]));
        let out = d.y_range();
        assert_eq!(out.range, (1.0, 6.0));
        assert!(out.warning.is_none());
    }

    #[test]
    fn test_custom_range_freezes() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[1.0, 4.0]));
        d.set_y_range(0.5, 2.0).unwrap();
        d.register_series(&series(&[100.0, -4.0]));
        assert_eq!(d.state().phase(), RangePhase::Frozen);
        assert_eq!(d.basis_y_range(1.5).range, (0.5, 2.0));
        assert!(d.set_y_range(2.0, 1.0).is_err());
    }

    #[test]
    fn test_log_range_formula() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[0.1, 1000.0]));
        assert!(d.set_log_y(true).is_none());
        let out = d.basis_y_range(1.5);
        let f_plot = 1.0 / 1.5;
        let f_leg = 1.0 - f_plot - 0.02;
        let lo = 0.1_f64.powf((f_plot + 0.02) / f_plot) / 1000.0_f64.powf(0.02 / f_plot);
        let hi = 1000.0_f64.powf(0.98 / f_plot) / 0.1_f64.powf(f_leg / f_plot);
        assert_relative_eq!(out.range.0, lo, max_relative = 1e-12);
        assert_relative_eq!(out.range.1, hi, max_relative = 1e-12);
        assert!(out.range.0 < 0.1 && out.range.1 > 1000.0);
    }

    #[test]
    fn test_log_margin_one_leaves_little_headroom() {
        let (lo, hi) = log_y_range(1.0, 100.0, 1.0);
        assert_relative_eq!(hi, 100.0_f64.powf(0.98), max_relative = 1e-12);
        assert_relative_eq!(lo, 1.0 / 100.0_f64.powf(0.02), max_relative = 1e-12);
    }

    #[test]
    fn test_log_refused_for_negative_content() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[-1.0, 4.0]));
        let w = d.set_log_y(true);
        assert!(matches!(w, Some(RangeWarning::NegativeContent { .. })));
        assert!(!d.state().is_log);
    }

    #[test]
    fn test_negative_content_after_log_falls_back_to_linear() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[1.0, 100.0]));
        assert!(d.set_log_y(true).is_none());
        d.register_series(&series(&[-5.0, 10.0]));
        let out = d.basis_y_range(1.5);
        assert_eq!(out.warning, Some(RangeWarning::NegativeContent { y_min: -5.0 }));
        assert_eq!(out.range, (-5.0, 150.0));
        let (bounds, warning) = d.axis_bounds();
        assert!(!bounds.log_y);
        assert!(matches!(warning, Some(RangeWarning::NegativeContent { .. })));
    }

    #[test]
    fn test_register_series_matches_binned_plottable() {
        let s = series(&[-2.0, 0.5, 7.0]);
        let mut by_series = RangeDeriver::new();
        by_series.register_series(&s);
        let mut by_item = RangeDeriver::new();
        by_item.register(&Plottable::from(s));
        assert_eq!(by_series.state(), by_item.state());
        assert_eq!(by_series.basis_x_range(), (0.0, 3.0));
        assert_eq!(by_series.state().y_min_positive, Some(0.5));
    }

    #[test]
    fn test_log_with_zero_maximum_warns_once() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[0.0, 0.0]));
        assert!(d.set_log_y(true).is_none());
        let before = d.state().clone();
        let out = d.basis_y_range(1.5);
        assert_eq!(out.warning, Some(RangeWarning::NonPositiveMaximum { y_max: 0.0 }));
        assert_eq!(out.range, (0.0, 0.0));
        assert_eq!(d.state(), &before);
        let (bounds, warning) = d.axis_bounds();
        assert!(!bounds.log_y);
        assert!(warning.is_some());
    }

    #[test]
    fn test_reset_keeps_log_setting() {
        let mut d = RangeDeriver::new();
        d.register_series(&series(&[1.0, 2.0]));
        d.set_log_y(true);
        d.set_x_range(0.5, 1.5).unwrap();
        d.reset();
        assert!(d.state().is_log);
        assert!(!d.state().has_custom_x_range);
        assert_eq!(d.state().phase(), RangePhase::Empty);
    }

    #[test]
    fn test_points_do_not_set_x() {
        let mut d = RangeDeriver::new();
        let p = hp_hist::PointSeries::new(vec![5.0, 6.0], vec![1.0, 2.0], vec![0.0, 0.0]).unwrap();
        d.register(&Plottable::from(p));
        assert_eq!(d.state().y_max, 2.0);
        d.register_series(&series(&[1.0, 3.0]));
        assert_eq!(d.basis_x_range(), (0.0, 2.0));
        assert_eq!(d.state().y_max, 3.0);
    }

    #[test]
    fn test_non_empty_xrange() {
        let mut a = vec![0.0; 10];
        let mut b = vec![0.0; 10];
        a[3] = 1.0;
        b[5] = 2.0;
        a[7] = 1.0;
        let r = non_empty_xrange(&series(&a), &series(&b)).unwrap();
        assert_eq!(r, (3.0, 8.0));
    }

    #[test]
    fn test_non_empty_xrange_with_gap_keeps_last() {
        let r = non_empty_xrange(&series(&[0.0, 1.0, 0.0, 1.0, 0.0]), &series(&[0.0; 5])).unwrap();
        assert_eq!(r, (1.0, 4.0));
    }

    #[test]
    fn test_non_empty_xrange_all_zero_is_full_domain() {
        let r = non_empty_xrange(&series(&[0.0; 4]), &series(&[0.0; 4])).unwrap();
        assert_eq!(r, (0.0, 4.0));
        assert!(non_empty_xrange(&series(&[0.0; 4]), &series(&[0.0; 3])).is_err());
    }
}
