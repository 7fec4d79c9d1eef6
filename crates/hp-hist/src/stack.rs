//! Summing series into a stack.
//!
//! Series are collected first and folded on demand, so the total never
//! depends on in-place mutation of earlier entries.

use hp_core::{Error, Result};
use serde::Serialize;

use crate::series::BinSeries;

/// A series with a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    /// Display name (legend entry, yields row).
    pub name: String,
    /// The series.
    pub series: BinSeries,
}

impl NamedSeries {
    /// Attach a name to a series.
    pub fn new(name: impl Into<String>, series: BinSeries) -> Self {
        Self { name: name.into(), series }
    }
}

/// Collects series in registration order and sums them.
#[derive(Debug, Clone, Default)]
pub struct StackAccumulator {
    members: Vec<BinSeries>,
}

impl StackAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series. Its bin count must match the first registered one.
    pub fn add(&mut self, series: BinSeries) -> Result<()> {
        if let Some(first) = self.members.first()
            && !first.same_bin_count(&series)
        {
            return Err(Error::IncompatibleHistograms(format!(
                "stack member has {} bins, expected {}",
                series.n_bins(),
                first.n_bins()
            )));
        }
        self.members.push(series);
        Ok(())
    }

    /// Number of registered series.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registered series in registration (draw) order.
    pub fn members(&self) -> &[BinSeries] {
        &self.members
    }

    /// Sum of all registered series: contents add, variances add.
    pub fn total(&self) -> Result<BinSeries> {
        sum_series(&self.members)
    }

    /// Display layers: layer `i` is the sum of members `i..`.
    ///
    /// Layer 0 is the total. Drawing the layers in order with decreasing
    /// height gives the stacked look.
    pub fn cumulative(&self) -> Result<Vec<BinSeries>> {
        if self.members.is_empty() {
            return Err(Error::EmptyInput("cannot stack zero series".to_string()));
        }
        let mut layers: Vec<BinSeries> = Vec::with_capacity(self.members.len());
        for member in self.members.iter().rev() {
            let layer = match layers.last() {
                Some(above) => {
                    let mut l = member.clone();
                    add_into(&mut l, above);
                    l
                }
                None => member.clone(),
            };
            layers.push(layer);
        }
        layers.reverse();
        Ok(layers)
    }
}

fn add_into(acc: &mut BinSeries, other: &BinSeries) {
    for i in 0..acc.n_bins() {
        acc.add_to_bin(i, other.content()[i], other.error()[i]);
    }
    let mut u = acc.underflow();
    u.accumulate(other.underflow().content, other.underflow().error);
    let mut o = acc.overflow();
    o.accumulate(other.overflow().content, other.overflow().error);
    acc.set_flows(u, o);
    acc.add_entries(other.entries());
    acc.refresh_extrema();
}

/// Sum a list of series; the first one provides the edges.
pub fn sum_series(series: &[BinSeries]) -> Result<BinSeries> {
    let (first, rest) = series
        .split_first()
        .ok_or_else(|| Error::EmptyInput("cannot sum zero series".to_string()))?;
    let mut total = first.clone();
    for s in rest {
        if !total.same_bin_count(s) {
            return Err(Error::IncompatibleHistograms(format!(
                "cannot add {} bins to {} bins",
                s.n_bins(),
                total.n_bins()
            )));
        }
        add_into(&mut total, s);
    }
    Ok(total)
}
