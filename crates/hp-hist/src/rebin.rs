//! Rebinning onto coarser edge sets.
//!
//! The target binning must be an exact coarsening of the source binning:
//! every target edge has to coincide with a source edge within 1/1000 of the
//! width of the matching source bin. Contents of merged bins are summed and
//! their errors combined in quadrature.

use hp_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::series::{BinIndex, BinSeries};

/// Relative tolerance used when comparing generated edges to the domain end.
const DOMAIN_EPSILON: f64 = 1e-9;

/// One segment of a segmented binning: `count` bins of width `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Number of bins in the segment.
    pub count: usize,
    /// Width of each bin.
    pub width: f64,
}

impl Segment {
    /// Create a segment.
    pub fn new(count: usize, width: f64) -> Self {
        Self { count, width }
    }
}

/// Requested target binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binning {
    /// Merge every `k` consecutive bins.
    Merge(usize),
    /// Explicit target edges.
    Edges(Vec<f64>),
    /// Edges generated from a start value and `(count, width)` segments.
    Segments {
        /// First edge.
        start: f64,
        /// Segments applied in order.
        segments: Vec<Segment>,
    },
}

/// Options applied after merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RebinOptions {
    /// Divide each resulting bin by its width.
    pub norm_by_width: bool,
}

/// Non-fatal conditions met while generating edges.
#[derive(Debug, Clone, PartialEq)]
pub enum RebinWarning {
    /// A generated edge passed the domain maximum and was dropped.
    EdgeBeyondDomain {
        /// Index of the segment that produced the edge.
        segment: usize,
        /// The dropped edge.
        edge: f64,
        /// Upper end of the source domain.
        domain_max: f64,
    },
}

impl std::fmt::Display for RebinWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EdgeBeyondDomain { segment, edge, domain_max } => write!(
                f,
                "segment {}: edge {} exceeds domain maximum {}, dropped",
                segment, edge, domain_max
            ),
        }
    }
}

/// Edges produced by [`segmented_edges`].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedEdges {
    /// Generated edges, closed at the domain maximum.
    pub edges: Vec<f64>,
    /// Edges that were dropped.
    pub warnings: Vec<RebinWarning>,
}

/// Result of [`rebin_with`]: the new series plus any non-fatal warnings.
#[derive(Debug, Clone)]
pub struct Rebinned {
    /// Rebinned series.
    pub series: BinSeries,
    /// Warnings raised while deriving the target edges.
    pub warnings: Vec<RebinWarning>,
}

/// Generate edges from `start` by appending `count` steps of `width` per segment.
///
/// An edge beyond `domain_max` is dropped (not clamped) together with the
/// rest of its segment, and reported once per segment. If the final edge is
/// still below `domain_max`, `domain_max` closes the list.
pub fn segmented_edges(
    start: f64,
    segments: &[Segment],
    domain_max: f64,
) -> Result<SegmentedEdges> {
    if !(start.is_finite() && domain_max.is_finite() && start < domain_max) {
        return Err(Error::Validation(format!(
            "segmented binning needs start < domain maximum (start={}, max={})",
            start, domain_max
        )));
    }
    let tol = DOMAIN_EPSILON * domain_max.abs().max(1.0);
    let mut edges = vec![start];
    let mut warnings = Vec::new();
    let mut last = start;

    for (idx, seg) in segments.iter().enumerate() {
        if !(seg.width.is_finite() && seg.width > 0.0) {
            return Err(Error::Validation(format!(
                "segment {} has non-positive width {}",
                idx, seg.width
            )));
        }
        for _ in 0..seg.count {
            let next = last + seg.width;
            if next > domain_max + tol {
                log::warn!(
                    "rebin segment {}: edge {} exceeds domain maximum {}, dropping it",
                    idx,
                    next,
                    domain_max
                );
                warnings.push(RebinWarning::EdgeBeyondDomain {
                    segment: idx,
                    edge: next,
                    domain_max,
                });
                break;
            }
            edges.push(next);
            last = next;
        }
    }

    if last < domain_max - tol {
        edges.push(domain_max);
    }
    Ok(SegmentedEdges { edges, warnings })
}

fn check_compatible(source: &BinSeries, target_edges: &[f64]) -> Result<()> {
    let old = source.edges();
    let n = source.n_bins();
    for &new_edge in target_edges {
        let found = old.iter().enumerate().any(|(o, &old_edge)| {
            let width = source.bin_width(o.min(n - 1));
            (old_edge - new_edge).abs() < width / 1000.0
        });
        if !found {
            return Err(Error::RebinIncompatible(format!(
                "edge {} does not match any edge of the source binning; new bins have to be \
                 combinations of the source bins",
                new_edge
            )));
        }
    }
    Ok(())
}

/// Rebin `source` onto `target_edges`.
///
/// Fails with [`Error::RebinIncompatible`] if any target edge has no
/// matching source edge. Source bins whose centre lies outside the target
/// range are routed to the target under/overflow.
pub fn rebin(source: &BinSeries, target_edges: &[f64]) -> Result<BinSeries> {
    if target_edges.len() < 2 {
        return Err(Error::Validation(format!(
            "target binning needs at least 2 edges, got {}",
            target_edges.len()
        )));
    }
    check_compatible(source, target_edges)?;

    let mut out = BinSeries::zeros(target_edges.to_vec())?;
    let mut underflow = source.underflow();
    let mut overflow = source.overflow();

    for i in 0..source.n_bins() {
        let content = source.content()[i];
        let error = source.error()[i];
        match out.find_bin(source.bin_center(i)) {
            BinIndex::Bin(j) => out.add_to_bin(j, content, error),
            BinIndex::Underflow => underflow.accumulate(content, error),
            BinIndex::Overflow => overflow.accumulate(content, error),
        }
    }

    out.set_flows(underflow, overflow);
    out.add_entries(source.entries());
    out.refresh_extrema();
    Ok(out)
}

/// Merge every `k` consecutive bins.
///
/// When the bin count is not a multiple of `k`, the trailing incomplete
/// group goes to the overflow.
pub fn merge_bins(source: &BinSeries, k: usize) -> Result<BinSeries> {
    if k == 0 {
        return Err(Error::Validation("cannot merge bins in groups of 0".to_string()));
    }
    let n_groups = source.n_bins() / k;
    if n_groups == 0 {
        return Err(Error::Validation(format!(
            "cannot merge {} bins in groups of {}",
            source.n_bins(),
            k
        )));
    }
    let edges: Vec<f64> = (0..=n_groups).map(|g| source.edges()[g * k]).collect();
    rebin(source, &edges)
}

/// Rebin with any [`Binning`] mode and apply `options`.
pub fn rebin_with(
    source: &BinSeries,
    binning: &Binning,
    options: &RebinOptions,
) -> Result<Rebinned> {
    let (mut series, warnings) = match binning {
        Binning::Merge(k) => (merge_bins(source, *k)?, Vec::new()),
        Binning::Edges(edges) => (rebin(source, edges)?, Vec::new()),
        Binning::Segments { start, segments } => {
            let generated = segmented_edges(*start, segments, source.x_max())?;
            (rebin(source, &generated.edges)?, generated.warnings)
        }
    };
    if options.norm_by_width {
        series.scale_by_width();
    }
    Ok(Rebinned { series, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Flow;
    use approx::assert_relative_eq;

    fn four_bins() -> BinSeries {
        BinSeries::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![10.0, 20.0, 30.0, 40.0],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_rebin_example() {
        let src = four_bins();
        let out = rebin(&src, &[0.0, 2.0, 4.0]).unwrap();
        assert_eq!(out.content(), &[30.0, 70.0]);
        assert_relative_eq!(out.error()[0], 5.0_f64.sqrt());
        assert_relative_eq!(out.error()[1], 25.0_f64.sqrt());
        // source untouched
        assert_eq!(src, four_bins());
    }

    #[test]
    fn test_rebin_rejects_unknown_edge() {
        let err = rebin(&four_bins(), &[0.0, 1.5, 4.0]).unwrap_err();
        assert!(matches!(err, Error::RebinIncompatible(_)));
    }

    #[test]
    fn test_rebin_tolerates_tiny_offsets() {
        let out = rebin(&four_bins(), &[0.0, 2.0 + 1e-4, 4.0]).unwrap();
        assert_eq!(out.content(), &[30.0, 70.0]);
    }

    #[test]
    fn test_rebin_narrower_range_feeds_flows() {
        let src = BinSeries::with_flows(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![10.0, 20.0, 30.0, 40.0],
            vec![3.0, 2.0, 3.0, 4.0],
            Flow::new(1.0, 4.0),
            Flow::new(2.0, 0.0),
        )
        .unwrap();
        let out = rebin(&src, &[1.0, 3.0]).unwrap();
        assert_eq!(out.content(), &[50.0]);
        assert_eq!(out.underflow().content, 11.0);
        assert_relative_eq!(out.underflow().error, 5.0);
        assert_eq!(out.overflow().content, 42.0);
        assert_relative_eq!(out.overflow().error, 4.0);
    }

    #[test]
    fn test_rebin_too_few_edges() {
        assert!(matches!(rebin(&four_bins(), &[0.0]), Err(Error::Validation(_))));
    }

    #[test]
    fn test_merge_bins_uneven_goes_to_overflow() {
        let src = BinSeries::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![0.0; 5],
        )
        .unwrap();
        let out = merge_bins(&src, 2).unwrap();
        assert_eq!(out.edges(), &[0.0, 2.0, 4.0]);
        assert_eq!(out.content(), &[3.0, 7.0]);
        assert_eq!(out.overflow().content, 5.0);
    }

    #[test]
    fn test_merge_bins_invalid_group() {
        assert!(merge_bins(&four_bins(), 0).is_err());
        assert!(merge_bins(&four_bins(), 5).is_err());
        assert_eq!(merge_bins(&four_bins(), 1).unwrap().content(), four_bins().content());
    }

    #[test]
    fn test_segmented_edges_closes_domain() {
        let segments = [Segment::new(2, 1.0), Segment::new(1, 2.0)];
        let out = segmented_edges(0.0, &segments, 10.0).unwrap();
        assert_eq!(out.edges, vec![0.0, 1.0, 2.0, 4.0, 10.0]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_segmented_edges_drops_overshoot() {
        let out = segmented_edges(0.0, &[Segment::new(3, 2.0), Segment::new(2, 1.5)], 5.0).unwrap();
        assert_eq!(out.edges, vec![0.0, 2.0, 4.0, 5.0]);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(
            out.warnings[0],
            RebinWarning::EdgeBeyondDomain { segment: 0, edge: 6.0, domain_max: 5.0 }
        );
    }

    #[test]
    fn test_segmented_edges_exact_end_not_duplicated() {
        let out = segmented_edges(0.0, &[Segment::new(10, 0.1)], 1.0).unwrap();
        assert_eq!(out.edges.len(), 11);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_rebin_with_segments_and_width_norm() {
        let src = four_bins();
        let binning = Binning::Segments { start: 0.0, segments: vec![Segment::new(1, 1.0)] };
        let out = rebin_with(&src, &binning, &RebinOptions { norm_by_width: true }).unwrap();
        assert_eq!(out.series.edges(), &[0.0, 1.0, 4.0]);
        assert_relative_eq!(out.series.content()[0], 10.0);
        assert_relative_eq!(out.series.content()[1], 30.0);
        assert_relative_eq!(out.series.error()[1], 29.0_f64.sqrt() / 3.0);
    }

    #[test]
    fn test_rebin_with_segment_off_grid_is_incompatible() {
        let binning = Binning::Segments { start: 0.0, segments: vec![Segment::new(1, 1.5)] };
        let err = rebin_with(&four_bins(), &binning, &RebinOptions::default()).unwrap_err();
        assert!(matches!(err, Error::RebinIncompatible(_)));
    }
}
