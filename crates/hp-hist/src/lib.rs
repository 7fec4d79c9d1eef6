//! # hp-hist
//!
//! Numeric 1D histogram engine for histoplot.
//!
//! [`BinSeries`] is the unit every operation works on. Rebinning and ratios
//! never mutate their source/denominator argument; callers clone before an
//! in-place divide when they need to keep the numerator.
//!
//! ## Example
//!
//! ```
//! use hp_hist::{BinSeries, get_ratio, rebin};
//!
//! let h = BinSeries::new(
//!     vec![0.0, 1.0, 2.0, 3.0, 4.0],
//!     vec![10.0, 20.0, 30.0, 40.0],
//!     vec![1.0, 1.0, 1.0, 1.0],
//! )
//! .unwrap();
//! let coarse = rebin(&h, &[0.0, 2.0, 4.0]).unwrap();
//! assert_eq!(coarse.content(), &[30.0, 70.0]);
//!
//! let band = get_ratio(&coarse, &coarse).unwrap();
//! assert_eq!(band.content(), &[1.0, 1.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod plottable;
pub mod ratio;
pub mod rebin;
pub mod series;
pub mod stack;

pub use plottable::{Plottable, PointSeries};
pub use ratio::{DivideErrors, divide, divide_ratio, get_ratio, ratio_plottable};
pub use rebin::{
    Binning, RebinOptions, RebinWarning, Rebinned, Segment, SegmentedEdges, merge_bins, rebin,
    rebin_with, segmented_edges,
};
pub use series::{BinIndex, BinSeries, Flow};
pub use stack::{NamedSeries, StackAccumulator, sum_series};
