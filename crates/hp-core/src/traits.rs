//! Input contracts for histoplot
//!
//! Histograms enter the engine through [`HistogramSource`], so the numeric
//! core does not depend on where bins come from (a file reader, a filler,
//! or a hand-built series).

/// Read access to a raw 1D histogram.
///
/// Bins are indexed `0..n_bins()` and exclude under/overflow, which are
/// exposed separately as `(content, error)` pairs.
pub trait HistogramSource {
    /// Bin edges (length = n_bins + 1, strictly increasing).
    fn edges(&self) -> &[f64];

    /// Bin contents (length = n_bins).
    fn content(&self) -> &[f64];

    /// Bin errors, one standard deviation (length = n_bins).
    fn error(&self) -> &[f64];

    /// Underflow `(content, error)`.
    fn underflow(&self) -> (f64, f64);

    /// Overflow `(content, error)`.
    fn overflow(&self) -> (f64, f64);

    /// Number of filled entries.
    fn entries(&self) -> f64;

    /// Number of bins (excluding under/overflow).
    fn n_bins(&self) -> usize {
        self.content().len()
    }

    /// Centre of bin `i`.
    fn bin_center(&self, i: usize) -> f64 {
        let e = self.edges();
        0.5 * (e[i] + e[i + 1])
    }
}
