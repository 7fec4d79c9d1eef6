//! The 1D bin series all histogram operations work on.

use hp_core::{Error, HistogramSource, Measurement, Result};
use serde::Serialize;

/// Under- or overflow bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Flow {
    /// Sum of weights outside the edge range.
    pub content: f64,
    /// One-standard-deviation error.
    pub error: f64,
}

impl Flow {
    /// Create a flow bin.
    pub fn new(content: f64, error: f64) -> Self {
        Self { content, error }
    }

    /// Add another flow, combining errors in quadrature.
    pub fn accumulate(&mut self, content: f64, error: f64) {
        self.content += content;
        self.error = self.error.hypot(error);
    }
}

/// Location of a value relative to the bin edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinIndex {
    /// Below the first edge.
    Underflow,
    /// Inside bin `i` (half-open `[lo, hi)`).
    Bin(usize),
    /// At or above the last edge.
    Overflow,
}

/// A 1D histogram: edges, contents, errors and under/overflow.
///
/// Invariants (checked on construction): at least one bin,
/// `content.len() == error.len() == edges.len() - 1`, finite strictly
/// increasing edges and non-negative errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSeries {
    edges: Vec<f64>,
    content: Vec<f64>,
    error: Vec<f64>,
    underflow: Flow,
    overflow: Flow,
    entries: f64,
    #[serde(skip)]
    extrema: Extrema,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Extrema {
    min: f64,
    min_positive: Option<f64>,
    max: f64,
}

impl Extrema {
    fn scan(content: &[f64]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut min_positive: Option<f64> = None;
        for &c in content {
            min = min.min(c);
            max = max.max(c);
            if c > 0.0 {
                min_positive = Some(min_positive.map_or(c, |m| m.min(c)));
            }
        }
        Self { min, min_positive, max }
    }
}

fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::Validation(format!(
            "a bin series needs at least 2 edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::Validation("bin edges must be finite".to_string()));
    }
    if let Some(w) = edges.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::Validation(format!(
            "bin edges must be strictly increasing (edge {} = {} >= edge {} = {})",
            w,
            edges[w],
            w + 1,
            edges[w + 1]
        )));
    }
    Ok(())
}

fn check_flow(which: &str, flow: Flow) -> Result<()> {
    if !(flow.error >= 0.0) {
        return Err(Error::Validation(format!("negative {} error {}", which, flow.error)));
    }
    Ok(())
}

impl BinSeries {
    /// Create a series without under/overflow.
    pub fn new(edges: Vec<f64>, content: Vec<f64>, error: Vec<f64>) -> Result<Self> {
        Self::with_flows(edges, content, error, Flow::default(), Flow::default())
    }

    /// Create a series with explicit under/overflow bins.
    pub fn with_flows(
        edges: Vec<f64>,
        content: Vec<f64>,
        error: Vec<f64>,
        underflow: Flow,
        overflow: Flow,
    ) -> Result<Self> {
        validate_edges(&edges)?;
        let n_bins = edges.len() - 1;
        if content.len() != n_bins || error.len() != n_bins {
            return Err(Error::Validation(format!(
                "expected {} contents and errors for {} edges, got {} and {}",
                n_bins,
                edges.len(),
                content.len(),
                error.len()
            )));
        }
        if let Some(i) = error.iter().position(|e| !(*e >= 0.0)) {
            return Err(Error::Validation(format!(
                "bin errors must be non-negative (bin {} has {})",
                i, error[i]
            )));
        }
        check_flow("underflow", underflow)?;
        check_flow("overflow", overflow)?;
        let entries = content.iter().sum::<f64>() + underflow.content + overflow.content;
        let extrema = Extrema::scan(&content);
        Ok(Self { edges, content, error, underflow, overflow, entries, extrema })
    }

    /// Empty series over the given edges.
    pub fn zeros(edges: Vec<f64>) -> Result<Self> {
        let n = edges.len().saturating_sub(1);
        Self::new(edges, vec![0.0; n], vec![0.0; n])
    }

    /// Series of (possibly weighted) counts with Poisson errors `sqrt(|n|)`.
    pub fn from_counts(edges: Vec<f64>, counts: Vec<f64>) -> Result<Self> {
        let error = counts.iter().map(|c| c.abs().sqrt()).collect();
        Self::new(edges, counts, error)
    }

    /// Copy a raw histogram into a validated series.
    pub fn from_source<S: HistogramSource + ?Sized>(source: &S) -> Result<Self> {
        let (uc, ue) = source.underflow();
        let (oc, oe) = source.overflow();
        Self::with_flows(
            source.edges().to_vec(),
            source.content().to_vec(),
            source.error().to_vec(),
            Flow::new(uc, ue),
            Flow::new(oc, oe),
        )
        .map(|s| s.with_entries(source.entries()))
    }

    /// Override the number of entries.
    pub fn with_entries(mut self, entries: f64) -> Self {
        self.entries = entries;
        self
    }

    /// Number of bins (excluding under/overflow).
    pub fn n_bins(&self) -> usize {
        self.content.len()
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin contents.
    pub fn content(&self) -> &[f64] {
        &self.content
    }

    /// Bin errors.
    pub fn error(&self) -> &[f64] {
        &self.error
    }

    /// Underflow bin.
    pub fn underflow(&self) -> Flow {
        self.underflow
    }

    /// Overflow bin.
    pub fn overflow(&self) -> Flow {
        self.overflow
    }

    /// Number of entries.
    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Lower edge of the first bin.
    pub fn x_min(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin.
    pub fn x_max(&self) -> f64 {
        self.edges[self.n_bins()]
    }

    /// Lower edge of bin `i`.
    pub fn bin_low_edge(&self, i: usize) -> f64 {
        self.edges[i]
    }

    /// Upper edge of bin `i`.
    pub fn bin_high_edge(&self, i: usize) -> f64 {
        self.edges[i + 1]
    }

    /// Width of bin `i`.
    pub fn bin_width(&self, i: usize) -> f64 {
        self.edges[i + 1] - self.edges[i]
    }

    /// Centre of bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        0.5 * (self.edges[i] + self.edges[i + 1])
    }

    /// Locate the bin containing `x`.
    pub fn find_bin(&self, x: f64) -> BinIndex {
        if x < self.x_min() {
            return BinIndex::Underflow;
        }
        if x >= self.x_max() {
            return BinIndex::Overflow;
        }
        let upper = self.edges.partition_point(|e| *e <= x);
        BinIndex::Bin(upper - 1)
    }

    /// Smallest bin content.
    pub fn minimum(&self) -> f64 {
        self.extrema.min
    }

    /// Smallest strictly positive bin content, if any.
    pub fn minimum_positive(&self) -> Option<f64> {
        self.extrema.min_positive
    }

    /// Largest bin content.
    pub fn maximum(&self) -> f64 {
        self.extrema.max
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.content.iter().sum()
    }

    /// Quadrature sum of in-range bin errors.
    pub fn integral_error(&self) -> f64 {
        self.error.iter().map(|e| e * e).sum::<f64>().sqrt()
    }

    /// Integral with its error.
    pub fn integral_measurement(&self) -> Measurement {
        Measurement::new(self.integral(), self.integral_error())
    }

    /// Sum of all contents including under/overflow.
    pub fn total_content(&self) -> f64 {
        self.integral() + self.underflow.content + self.overflow.content
    }

    /// Set content and error of bin `i`.
    ///
    /// Panics if `i` is out of range; a negative or NaN error is a
    /// validation error.
    pub fn set_bin(&mut self, i: usize, content: f64, error: f64) -> Result<()> {
        if !(error >= 0.0) {
            return Err(Error::Validation(format!("negative error {} for bin {}", error, i)));
        }
        self.content[i] = content;
        self.error[i] = error;
        self.refresh_extrema();
        Ok(())
    }

    /// Set the underflow bin; its error must be non-negative.
    pub fn set_underflow(&mut self, flow: Flow) -> Result<()> {
        check_flow("underflow", flow)?;
        self.underflow = flow;
        Ok(())
    }

    /// Set the overflow bin; its error must be non-negative.
    pub fn set_overflow(&mut self, flow: Flow) -> Result<()> {
        check_flow("overflow", flow)?;
        self.overflow = flow;
        Ok(())
    }

    /// Multiply contents and errors (flows included) by `factor`.
    pub fn scale(&mut self, factor: f64) {
        let abs = factor.abs();
        for (c, e) in self.content.iter_mut().zip(self.error.iter_mut()) {
            *c *= factor;
            *e *= abs;
        }
        self.underflow = Flow::new(self.underflow.content * factor, self.underflow.error * abs);
        self.overflow = Flow::new(self.overflow.content * factor, self.overflow.error * abs);
        self.refresh_extrema();
    }

    /// Divide each bin's content and error by its width.
    pub fn scale_by_width(&mut self) {
        for i in 0..self.n_bins() {
            let w = self.bin_width(i);
            self.content[i] /= w;
            self.error[i] /= w;
        }
        self.refresh_extrema();
    }

    /// Zero all contents, errors, flows and entries; edges are kept.
    pub fn reset(&mut self) {
        self.content.iter_mut().for_each(|c| *c = 0.0);
        self.error.iter_mut().for_each(|e| *e = 0.0);
        self.underflow = Flow::default();
        self.overflow = Flow::default();
        self.entries = 0.0;
        self.refresh_extrema();
    }

    /// Whether `other` has the same number of bins.
    pub fn same_bin_count(&self, other: &BinSeries) -> bool {
        self.n_bins() == other.n_bins()
    }

    pub(crate) fn add_to_bin(&mut self, i: usize, content: f64, error: f64) {
        self.content[i] += content;
        self.error[i] = self.error[i].hypot(error);
    }

    pub(crate) fn set_raw(&mut self, i: usize, content: f64, error: f64) {
        self.content[i] = content;
        self.error[i] = error;
    }

    pub(crate) fn set_flows(&mut self, underflow: Flow, overflow: Flow) {
        self.underflow = underflow;
        self.overflow = overflow;
    }

    pub(crate) fn add_entries(&mut self, entries: f64) {
        self.entries += entries;
    }

    pub(crate) fn refresh_extrema(&mut self) {
        self.extrema = Extrema::scan(&self.content);
    }
}

impl HistogramSource for BinSeries {
    fn edges(&self) -> &[f64] {
        &self.edges
    }

    fn content(&self) -> &[f64] {
        &self.content
    }

    fn error(&self) -> &[f64] {
        &self.error
    }

    fn underflow(&self) -> (f64, f64) {
        (self.underflow.content, self.underflow.error)
    }

    fn overflow(&self) -> (f64, f64) {
        (self.overflow.content, self.overflow.error)
    }

    fn entries(&self) -> f64 {
        self.entries
    }
}
