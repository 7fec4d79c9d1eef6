//! Bin-wise division of two series.
//!
//! [`divide_ratio`] is the ratio-plot rule: only the numerator uncertainty
//! is propagated and a zero denominator yields a zero bin. [`divide`]
//! propagates both uncertainties, as used for fractions.

use hp_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::plottable::Plottable;
use crate::series::{BinSeries, Flow};

/// Error propagation for [`divide`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivideErrors {
    /// Independent numerator and denominator.
    #[default]
    Uncorrelated,
    /// Numerator is a subset of the denominator (efficiencies, fractions).
    Binomial,
}

fn check_bin_count(numerator: &BinSeries, denominator: &BinSeries) -> Result<()> {
    if !numerator.same_bin_count(denominator) {
        log::error!(
            "incompatible histograms: {} bins vs {} bins",
            numerator.n_bins(),
            denominator.n_bins()
        );
        return Err(Error::IncompatibleHistograms(format!(
            "numerator has {} bins, denominator has {}",
            numerator.n_bins(),
            denominator.n_bins()
        )));
    }
    Ok(())
}

fn ratio_bin(num: f64, num_err: f64, den: f64) -> (f64, f64) {
    if den != 0.0 { (num / den, num_err / den.abs()) } else { (0.0, 0.0) }
}

/// Divide `numerator` in place by `denominator`, ignoring the denominator error.
///
/// Bins with a zero denominator are set to content 0 and error 0. Only
/// in-range bins are divided; the numerator's under/overflow are kept.
pub fn divide_ratio(numerator: &mut BinSeries, denominator: &BinSeries) -> Result<()> {
    check_bin_count(numerator, denominator)?;
    for i in 0..numerator.n_bins() {
        let (c, e) =
            ratio_bin(numerator.content()[i], numerator.error()[i], denominator.content()[i]);
        numerator.set_raw(i, c, e);
    }
    numerator.refresh_extrema();
    Ok(())
}

/// Clone `a` and divide it by `b` with the ratio rule.
pub fn get_ratio(a: &BinSeries, b: &BinSeries) -> Result<BinSeries> {
    let mut out = a.clone();
    divide_ratio(&mut out, b)?;
    Ok(out)
}

/// Ratio of any plottable by a binned denominator.
///
/// Point series are converted to bins first.
pub fn ratio_plottable(a: &Plottable, b: &BinSeries) -> Result<BinSeries> {
    let bins = a.to_bin_series()?;
    get_ratio(&bins, b)
}

fn divide_bin(a: f64, ea: f64, d: f64, ed: f64, errors: DivideErrors) -> (f64, f64) {
    if d == 0.0 {
        return (0.0, 0.0);
    }
    let r = a / d;
    let var = match errors {
        DivideErrors::Uncorrelated => {
            let d2 = d * d;
            (ea * ea * d2 + ed * ed * a * a) / (d2 * d2)
        }
        DivideErrors::Binomial => ((1.0 - 2.0 * r) * ea * ea + r * r * ed * ed).abs() / (d * d),
    };
    (r, var.sqrt())
}

/// Divide `numerator` in place by `denominator`, propagating both errors.
pub fn divide(
    numerator: &mut BinSeries,
    denominator: &BinSeries,
    errors: DivideErrors,
) -> Result<()> {
    check_bin_count(numerator, denominator)?;
    for i in 0..numerator.n_bins() {
        let (c, e) = divide_bin(
            numerator.content()[i],
            numerator.error()[i],
            denominator.content()[i],
            denominator.error()[i],
            errors,
        );
        numerator.set_raw(i, c, e);
    }
    let (n_u, d_u) = (numerator.underflow(), denominator.underflow());
    let (uc, ue) = divide_bin(n_u.content, n_u.error, d_u.content, d_u.error, errors);
    let (n_o, d_o) = (numerator.overflow(), denominator.overflow());
    let (oc, oe) = divide_bin(n_o.content, n_o.error, d_o.content, d_o.error, errors);
    numerator.set_flows(Flow::new(uc, ue), Flow::new(oc, oe));
    numerator.refresh_extrema();
    Ok(())
}
