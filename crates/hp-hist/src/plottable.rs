//! Binned and point-based data behind one interface.

use hp_core::{Error, Result};
use serde::Serialize;

use crate::series::BinSeries;

/// Points `(x, y ± y_error)` with strictly increasing `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    y_error: Vec<f64>,
}

impl PointSeries {
    /// Create a point series. Needs at least two points.
    pub fn new(x: Vec<f64>, y: Vec<f64>, y_error: Vec<f64>) -> Result<Self> {
        if x.len() < 2 {
            return Err(Error::Validation(format!(
                "a point series needs at least 2 points, got {}",
                x.len()
            )));
        }
        if y.len() != x.len() || y_error.len() != x.len() {
            return Err(Error::Validation(format!(
                "point series length mismatch: x={}, y={}, y_error={}",
                x.len(),
                y.len(),
                y_error.len()
            )));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::Validation("point x values must be strictly increasing".into()));
        }
        if y_error.iter().any(|e| !(*e >= 0.0)) {
            return Err(Error::Validation("point errors must be non-negative".into()));
        }
        Ok(Self { x, y, y_error })
    }

    /// X positions.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Y values.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Y errors.
    pub fn y_error(&self) -> &[f64] {
        &self.y_error
    }

    /// Bins centred on the points, with edges halfway between neighbours.
    pub fn to_bin_series(&self) -> Result<BinSeries> {
        let n = self.x.len();
        let mut edges = Vec::with_capacity(n + 1);
        edges.push(self.x[0] - 0.5 * (self.x[1] - self.x[0]));
        for w in self.x.windows(2) {
            edges.push(0.5 * (w[0] + w[1]));
        }
        edges.push(self.x[n - 1] + 0.5 * (self.x[n - 1] - self.x[n - 2]));
        BinSeries::new(edges, self.y.clone(), self.y_error.clone())
    }
}

/// Anything that can be put on a pad.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plottable {
    /// Histogram-like data.
    Binned(BinSeries),
    /// Graph-like data.
    Points(PointSeries),
}

impl Plottable {
    /// Smallest y value.
    pub fn minimum(&self) -> f64 {
        match self {
            Self::Binned(s) => s.minimum(),
            Self::Points(p) => p.y.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    /// Smallest strictly positive y value.
    pub fn minimum_positive(&self) -> Option<f64> {
        match self {
            Self::Binned(s) => s.minimum_positive(),
            Self::Points(p) => {
                p.y.iter().copied().filter(|v| *v > 0.0).fold(None, |m: Option<f64>, v| {
                    Some(m.map_or(v, |m| m.min(v)))
                })
            }
        }
    }

    /// Largest y value.
    pub fn maximum(&self) -> f64 {
        match self {
            Self::Binned(s) => s.maximum(),
            Self::Points(p) => p.y.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Span of the x axis covered by the data.
    pub fn x_bounds(&self) -> (f64, f64) {
        match self {
            Self::Binned(s) => (s.x_min(), s.x_max()),
            Self::Points(p) => (p.x[0], p.x[p.x.len() - 1]),
        }
    }

    /// Binned view of the data.
    pub fn to_bin_series(&self) -> Result<BinSeries> {
        match self {
            Self::Binned(s) => Ok(s.clone()),
            Self::Points(p) => p.to_bin_series(),
        }
    }

    /// The underlying series when binned.
    pub fn as_binned(&self) -> Option<&BinSeries> {
        match self {
            Self::Binned(s) => Some(s),
            Self::Points(_) => None,
        }
    }
}

impl From<BinSeries> for Plottable {
    fn from(s: BinSeries) -> Self {
        Self::Binned(s)
    }
}

impl From<PointSeries> for Plottable {
    fn from(p: PointSeries) -> Self {
        Self::Points(p)
    }
}
