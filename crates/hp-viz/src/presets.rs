//! Plot presets assembled into numbers-first artifacts.
//!
//! Each preset combines stacking, ratios and range derivation into a
//! serializable [`PlotArtifact`]; drawing it is left to a renderer.

use hp_core::{Error, Result};
use hp_hist::{
    BinSeries, DivideErrors, NamedSeries, Plottable, StackAccumulator, divide, get_ratio,
    sum_series,
};
use serde::Serialize;

use crate::range::{AxisBounds, RangeDeriver, RangeWarning, non_empty_xrange};
use crate::style::HistoStyle;

/// Default y-limits of ratio pads.
pub const DEFAULT_RATIO_LIMITS: (f64, f64) = (0.701, 1.299);

/// Top-level plot artifact.
#[derive(Debug, Clone, Serialize)]
pub struct PlotArtifact {
    /// Schema identifier, e.g. `histoplot_data_mc_v0`.
    pub schema_version: String,
    /// Producer information.
    pub meta: PlotMeta,
    /// Pads from top to bottom.
    pub pads: Vec<PadArtifact>,
    /// Non-fatal conditions met while building the plot.
    pub warnings: Vec<String>,
}

/// Producer information.
#[derive(Debug, Clone, Serialize)]
pub struct PlotMeta {
    /// Tool name.
    pub tool: String,
    /// Tool version.
    pub tool_version: String,
}

/// What a series represents on its pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    /// Plain histogram or graph.
    Histogram,
    /// Observed data.
    Data,
    /// Cumulative stack layer.
    Stack,
    /// Statistical uncertainty of the stack total.
    McStat,
    /// Overlaid (unstacked) shape.
    Shape,
    /// Relative statistical uncertainty band on a ratio pad.
    StatBand,
    /// Ratio of two series.
    Ratio,
    /// Fraction of a total.
    Fraction,
}

/// Numbers of one drawn series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesData {
    /// Histogram bins.
    Binned {
        /// Bin edges.
        edges: Vec<f64>,
        /// Bin contents.
        content: Vec<f64>,
        /// Bin errors.
        error: Vec<f64>,
    },
    /// Graph points.
    Points {
        /// x positions.
        x: Vec<f64>,
        /// y values.
        y: Vec<f64>,
        /// y errors.
        y_error: Vec<f64>,
    },
}

impl From<&BinSeries> for SeriesData {
    fn from(s: &BinSeries) -> Self {
        Self::Binned {
            edges: s.edges().to_vec(),
            content: s.content().to_vec(),
            error: s.error().to_vec(),
        }
    }
}

impl From<&Plottable> for SeriesData {
    fn from(p: &Plottable) -> Self {
        match p {
            Plottable::Binned(s) => s.into(),
            Plottable::Points(p) => Self::Points {
                x: p.x().to_vec(),
                y: p.y().to_vec(),
                y_error: p.y_error().to_vec(),
            },
        }
    }
}

/// One drawn series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesArtifact {
    /// Legend name.
    pub name: String,
    /// Role on the pad.
    pub role: SeriesRole,
    /// Drawing style.
    pub style: HistoStyle,
    /// Whether the series gets a legend entry.
    pub in_legend: bool,
    /// The numbers.
    #[serde(flatten)]
    pub data: SeriesData,
}

/// One pad: axis bounds and series in draw order.
#[derive(Debug, Clone, Serialize)]
pub struct PadArtifact {
    /// Pad name.
    pub name: String,
    /// x-axis title.
    pub x_title: String,
    /// y-axis title.
    pub y_title: String,
    /// Axis bounds.
    pub bounds: AxisBounds,
    /// Series in draw order.
    pub series: Vec<SeriesArtifact>,
}

/// A plottable with a name, for presets that accept graphs.
#[derive(Debug, Clone)]
pub struct NamedPlottable {
    /// Legend name.
    pub name: String,
    /// The data.
    pub item: Plottable,
}

impl NamedPlottable {
    /// Attach a name.
    pub fn new(name: impl Into<String>, item: impl Into<Plottable>) -> Self {
        Self { name: name.into(), item: item.into() }
    }
}

struct PadBuilder {
    name: String,
    x_title: String,
    y_title: String,
    ranges: RangeDeriver,
    series: Vec<SeriesArtifact>,
}

impl PadBuilder {
    fn new(name: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            name: name.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            ranges: RangeDeriver::new(),
            series: Vec::new(),
        }
    }

    fn add(&mut self, name: &str, role: SeriesRole, item: &Plottable, style: HistoStyle) {
        self.ranges.register(item);
        self.push(name, role, item.into(), style);
    }

    fn add_series(&mut self, name: &str, role: SeriesRole, s: &BinSeries, style: HistoStyle) {
        self.ranges.register_series(s);
        self.push(name, role, s.into(), style);
    }

    fn push(&mut self, name: &str, role: SeriesRole, data: SeriesData, style: HistoStyle) {
        self.series.push(SeriesArtifact {
            name: name.to_string(),
            role,
            style,
            in_legend: !matches!(role, SeriesRole::McStat),
            data,
        });
    }

    fn log_y(&mut self, on: bool, warnings: &mut Vec<RangeWarning>) {
        if let Some(w) = self.ranges.set_log_y(on) {
            warnings.push(w);
        }
    }

    fn finish(self, warnings: &mut Vec<RangeWarning>) -> PadArtifact {
        let (bounds, warning) = self.ranges.axis_bounds();
        warnings.extend(warning);
        PadArtifact {
            name: self.name,
            x_title: self.x_title,
            y_title: self.y_title,
            bounds,
            series: self.series,
        }
    }
}

fn artifact(kind: &str, pads: Vec<PadArtifact>, warnings: Vec<RangeWarning>) -> PlotArtifact {
    PlotArtifact {
        schema_version: format!("histoplot_{}_v0", kind),
        meta: PlotMeta {
            tool: "histoplot".to_string(),
            tool_version: hp_core::VERSION.to_string(),
        },
        pads,
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    }
}

fn check_same_bins(reference: &BinSeries, other: &BinSeries, what: &str) -> Result<()> {
    if !reference.same_bin_count(other) {
        return Err(Error::IncompatibleHistograms(format!(
            "{} has {} bins, expected {}",
            what,
            other.n_bins(),
            reference.n_bins()
        )));
    }
    Ok(())
}

/// Options of [`simple_artifact`].
#[derive(Debug, Clone)]
pub struct SimpleOptions {
    /// x-axis title.
    pub x_title: String,
    /// y-axis title.
    pub y_title: String,
    /// Logarithmic y-axis.
    pub log_y: bool,
    /// Fixed x-range.
    pub x_range: Option<(f64, f64)>,
    /// Fixed y-range.
    pub y_range: Option<(f64, f64)>,
    /// Widen the y-axis automatically.
    pub auto_y: bool,
}

impl Default for SimpleOptions {
    fn default() -> Self {
        Self {
            x_title: String::new(),
            y_title: "Events".to_string(),
            log_y: false,
            x_range: None,
            y_range: None,
            auto_y: true,
        }
    }
}

/// One pad with all items overlaid.
pub fn simple_artifact(items: &[NamedPlottable], options: &SimpleOptions) -> Result<PlotArtifact> {
    if items.is_empty() {
        log::error!("list of histograms is empty");
        return Err(Error::EmptyInput("simple plot needs at least one histogram".to_string()));
    }
    let mut warnings = Vec::new();
    let mut pad = PadBuilder::new("main", &options.x_title, &options.y_title);
    if !options.auto_y {
        pad.ranges = RangeDeriver::without_auto_y();
    }
    if let Some((lo, hi)) = options.x_range {
        pad.ranges.set_x_range(lo, hi)?;
    }
    if let Some((lo, hi)) = options.y_range {
        pad.ranges.set_y_range(lo, hi)?;
    }
    for it in items {
        pad.add(&it.name, SeriesRole::Histogram, &it.item, HistoStyle::default());
    }
    pad.log_y(options.log_y, &mut warnings);
    let main = pad.finish(&mut warnings);
    Ok(artifact("simple", vec![main], warnings))
}

/// Options of [`data_mc_artifact`].
#[derive(Debug, Clone)]
pub struct DataMcOptions {
    /// x-axis title (both pads).
    pub x_title: String,
    /// y-axis title of the main pad.
    pub y_title: String,
    /// y-axis title of the ratio pad.
    pub ratio_title: String,
    /// Fixed y-limits of the ratio pad; `None` derives them.
    pub ratio_limits: Option<(f64, f64)>,
    /// Trim leading/trailing bins empty in both data and MC.
    pub non_empty: bool,
    /// Fixed x-range; disables trimming.
    pub x_range: Option<(f64, f64)>,
    /// Logarithmic y-axis on the main pad.
    pub log_y: bool,
}

impl Default for DataMcOptions {
    fn default() -> Self {
        Self {
            x_title: String::new(),
            y_title: "Events".to_string(),
            ratio_title: "Ratio".to_string(),
            ratio_limits: Some(DEFAULT_RATIO_LIMITS),
            non_empty: true,
            x_range: None,
            log_y: false,
        }
    }
}

/// Data over stacked MC with a ratio pad.
///
/// Without shapes the ratio pad shows data/MC and the MC statistical band;
/// with shapes it shows MC/data, shapes/data and the data statistical band.
pub fn data_mc_artifact(
    data: &NamedSeries,
    mc: &[NamedSeries],
    shapes: &[NamedSeries],
    options: &DataMcOptions,
) -> Result<PlotArtifact> {
    if mc.is_empty() {
        log::error!("list of MC histograms is empty");
        return Err(Error::EmptyInput("data/MC plot needs at least one MC histogram".to_string()));
    }
    let mut acc = StackAccumulator::new();
    for m in mc {
        check_same_bins(&data.series, &m.series, &m.name)?;
        acc.add(m.series.clone())?;
    }
    for s in shapes {
        check_same_bins(&data.series, &s.series, &s.name)?;
    }
    let layers = acc.cumulative()?;
    let total = &layers[0];

    let mut warnings = Vec::new();
    let mut main = PadBuilder::new("main", &options.x_title, &options.y_title);
    let mut ratio = PadBuilder::new("ratio", &options.x_title, &options.ratio_title);
    if let Some((lo, hi)) = options.ratio_limits {
        ratio.ranges.set_y_range(lo, hi)?;
    }

    let fill = HistoStyle { draw_option: Some("hist".to_string()), ..Default::default() };
    for (m, layer) in mc.iter().zip(&layers) {
        main.add_series(&m.name, SeriesRole::Stack, layer, fill.clone());
    }
    main.add_series("Stack MC stat", SeriesRole::McStat, total, HistoStyle::error_band());
    for s in shapes {
        main.add_series(&s.name, SeriesRole::Shape, &s.series, HistoStyle::default());
    }
    let data_style = HistoStyle { draw_option: Some("ep".to_string()), ..Default::default() };
    main.add_series(&data.name, SeriesRole::Data, &data.series, data_style.clone());

    if shapes.is_empty() {
        let band = get_ratio(total, total)?;
        ratio.add_series("MC Stat. Unc.", SeriesRole::StatBand, &band, HistoStyle::error_band());
        let r = get_ratio(&data.series, total)?;
        ratio.add_series(&data.name, SeriesRole::Ratio, &r, data_style);
    } else {
        let band = get_ratio(&data.series, &data.series)?;
        ratio.add_series("Data Stat. Unc.", SeriesRole::StatBand, &band, HistoStyle::error_band());
        let r = get_ratio(total, &data.series)?;
        ratio.add_series("MC", SeriesRole::Ratio, &r, fill);
        for s in shapes {
            let r = get_ratio(&s.series, &data.series)?;
            ratio.add_series(&s.name, SeriesRole::Ratio, &r, HistoStyle::default());
        }
    }

    let x_range = match options.x_range {
        Some(r) => Some(r),
        None if options.non_empty => Some(non_empty_xrange(&data.series, total)?),
        None => None,
    };
    if let Some((lo, hi)) = x_range {
        main.ranges.set_x_range(lo, hi)?;
        ratio.ranges.set_x_range(lo, hi)?;
    }

    main.log_y(options.log_y, &mut warnings);
    let pads = vec![main.finish(&mut warnings), ratio.finish(&mut warnings)];
    Ok(artifact("data_mc", pads, warnings))
}

/// Options of [`fraction_artifact`].
#[derive(Debug, Clone)]
pub struct FractionOptions {
    /// x-axis title.
    pub x_title: String,
    /// y-axis title.
    pub y_title: String,
}

impl Default for FractionOptions {
    fn default() -> Self {
        Self { x_title: String::new(), y_title: "Fraction".to_string() }
    }
}

/// Each of `to_fraction` divided by the sum of `all`.
pub fn fraction_artifact(
    all: &[NamedSeries],
    to_fraction: &[NamedSeries],
    options: &FractionOptions,
) -> Result<PlotArtifact> {
    if all.is_empty() || to_fraction.is_empty() {
        log::error!("list of MC histograms is empty");
        return Err(Error::EmptyInput("fraction plot needs histograms in both lists".to_string()));
    }
    let members: Vec<BinSeries> = all.iter().map(|n| n.series.clone()).collect();
    let total = sum_series(&members)?;

    let mut warnings = Vec::new();
    let mut pad = PadBuilder::new("fraction", &options.x_title, &options.y_title);
    for h in to_fraction {
        let mut f = h.series.clone();
        divide(&mut f, &total, DivideErrors::Uncorrelated)?;
        pad.add_series(&h.name, SeriesRole::Fraction, &f, HistoStyle::default());
    }
    let main = pad.finish(&mut warnings);
    Ok(artifact("fraction", vec![main], warnings))
}

/// Options of [`comparison_artifact`].
#[derive(Debug, Clone)]
pub struct ComparisonOptions {
    /// x-axis title (both pads).
    pub x_title: String,
    /// y-axis title of the main pad.
    pub y_title: String,
    /// y-axis title of the ratio pad.
    pub ratio_title: String,
    /// Fixed y-limits of the ratio pad.
    pub ratio_limits: Option<(f64, f64)>,
    /// Trim leading/trailing empty bins of the reference.
    pub non_empty: bool,
    /// Logarithmic y-axis on the main pad.
    pub log_y: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            x_title: String::new(),
            y_title: "Events".to_string(),
            ratio_title: "Ratio".to_string(),
            ratio_limits: Some(DEFAULT_RATIO_LIMITS),
            non_empty: true,
            log_y: false,
        }
    }
}

/// Overlay of several series, each divided by the first in a ratio pad.
pub fn comparison_artifact(
    histos: &[NamedSeries],
    options: &ComparisonOptions,
) -> Result<PlotArtifact> {
    let (reference, others) = histos.split_first().ok_or_else(|| {
        log::error!("list of histograms is empty");
        Error::EmptyInput("comparison plot needs at least one histogram".to_string())
    })?;
    for h in others {
        check_same_bins(&reference.series, &h.series, &h.name)?;
    }

    let mut warnings = Vec::new();
    let mut main = PadBuilder::new("main", &options.x_title, &options.y_title);
    let mut ratio = PadBuilder::new("ratio", &options.x_title, &options.ratio_title);
    if let Some((lo, hi)) = options.ratio_limits {
        ratio.ranges.set_y_range(lo, hi)?;
    }
    if options.non_empty {
        let (lo, hi) = non_empty_xrange(&reference.series, &reference.series)?;
        main.ranges.set_x_range(lo, hi)?;
        ratio.ranges.set_x_range(lo, hi)?;
    }

    for h in histos {
        main.add_series(&h.name, SeriesRole::Histogram, &h.series, HistoStyle::default());
    }
    let band = get_ratio(&reference.series, &reference.series)?;
    ratio.add_series(
        &format!("{} Stat. Unc.", reference.name),
        SeriesRole::StatBand,
        &band,
        HistoStyle::error_band(),
    );
    for h in others {
        let r = get_ratio(&h.series, &reference.series)?;
        ratio.add_series(&h.name, SeriesRole::Ratio, &r, HistoStyle::default());
    }

    main.log_y(options.log_y, &mut warnings);
    let pads = vec![main.finish(&mut warnings), ratio.finish(&mut warnings)];
    Ok(artifact("comparison", pads, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn named(name: &str, content: &[f64]) -> NamedSeries {
        let edges = (0..=content.len()).map(|i| i as f64).collect();
        NamedSeries::new(name, BinSeries::from_counts(edges, content.to_vec()).unwrap())
    }

    fn binned(s: &SeriesArtifact) -> (&[f64], &[f64]) {
        match &s.data {
            SeriesData::Binned { content, error, .. } => (content.as_slice(), error.as_slice()),
            SeriesData::Points { .. } => panic!("expected binned data"),
        }
    }

    #[test]
    fn test_data_mc_stack_and_ratio() {
        let data = named("Data", &[0.0, 12.0, 20.0, 0.0]);
        let mc = [named("Top", &[0.0, 4.0, 10.0, 0.0]), named("EW", &[0.0, 2.0, 10.0, 0.0])];
        let art = data_mc_artifact(&data, &mc, &[], &DataMcOptions::default()).unwrap();
        assert_eq!(art.schema_version, "histoplot_data_mc_v0");
        let main = &art.pads[0];
        assert_eq!(binned(&main.series[0]).0, &[0.0, 6.0, 20.0, 0.0]);
        assert_eq!(binned(&main.series[1]).0, &[0.0, 2.0, 10.0, 0.0]);
        assert_eq!(main.series[2].role, SeriesRole::McStat);
        assert!(!main.series[2].in_legend);
        assert_eq!(main.series[3].role, SeriesRole::Data);

        let ratio = &art.pads[1];
        assert_eq!(ratio.series[0].name, "MC Stat. Unc.");
        assert_eq!(binned(&ratio.series[0]).0, &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(binned(&ratio.series[1]).0, &[0.0, 2.0, 1.0, 0.0]);
        assert_eq!((ratio.bounds.y_min, ratio.bounds.y_max), DEFAULT_RATIO_LIMITS);

        // trimmed to the filled bins 1..2
        assert_eq!((main.bounds.x_min, main.bounds.x_max), (1.0, 3.0));
        assert_eq!((ratio.bounds.x_min, ratio.bounds.x_max), (1.0, 3.0));
        assert_eq!(main.bounds.y_max, 30.0);
    }

    #[test]
    fn test_data_mc_with_shapes_inverts_ratio() {
        let data = named("Data", &[4.0, 8.0]);
        let mc = [named("Bkg", &[2.0, 16.0])];
        let shapes = [named("Signal", &[1.0, 2.0])];
        let art = data_mc_artifact(&data, &mc, &shapes, &DataMcOptions::default()).unwrap();
        let ratio = &art.pads[1];
        assert_eq!(ratio.series[0].name, "Data Stat. Unc.");
        let (c, e) = binned(&ratio.series[0]);
        assert_eq!(c, &[1.0, 1.0]);
        assert_relative_eq!(e[0], 0.5);
        assert_eq!(binned(&ratio.series[1]).0, &[0.5, 2.0]);
        assert_eq!(binned(&ratio.series[2]).0, &[0.25, 0.25]);
    }

    #[test]
    fn test_data_mc_requires_mc() {
        let data = named("Data", &[1.0]);
        let err = data_mc_artifact(&data, &[], &[], &DataMcOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_data_mc_bin_mismatch() {
        let data = named("Data", &[1.0, 2.0]);
        let err = data_mc_artifact(&data, &[named("Bkg", &[1.0])], &[], &DataMcOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleHistograms(_)));
    }

    #[test]
    fn test_data_mc_log_refused_with_negative_weights() {
        let data = named("Data", &[3.0, 4.0]);
        let mc = [NamedSeries::new(
            "Fakes",
            BinSeries::new(vec![0.0, 1.0, 2.0], vec![-1.0, 2.0], vec![1.0, 1.0]).unwrap(),
        )];
        let opts = DataMcOptions { log_y: true, ..Default::default() };
        let art = data_mc_artifact(&data, &mc, &[], &opts).unwrap();
        assert!(!art.pads[0].bounds.log_y);
        assert_eq!(art.warnings.len(), 1);
    }

    #[test]
    fn test_data_mc_log_axis() {
        let data = named("Data", &[10.0, 100.0]);
        let mc = [named("Bkg", &[10.0, 100.0])];
        let opts = DataMcOptions { log_y: true, non_empty: false, ..Default::default() };
        let art = data_mc_artifact(&data, &mc, &[], &opts).unwrap();
        let b = art.pads[0].bounds;
        assert!(b.log_y);
        assert!(b.y_min < 10.0 && b.y_max > 100.0);
        assert!(art.warnings.is_empty());
    }

    #[test]
    fn test_fraction() {
        let all = [named("A", &[1.0, 0.0]), named("B", &[3.0, 0.0])];
        let art = fraction_artifact(&all, &all[..1], &FractionOptions::default()).unwrap();
        let (c, _) = binned(&art.pads[0].series[0]);
        assert_eq!(c, &[0.25, 0.0]);
        assert!(fraction_artifact(&all, &[], &FractionOptions::default()).is_err());
    }

    #[test]
    fn test_comparison() {
        let histos = [named("Nominal", &[0.0, 4.0, 16.0]), named("Alt", &[0.0, 2.0, 20.0])];
        let art = comparison_artifact(&histos, &ComparisonOptions::default()).unwrap();
        let ratio = &art.pads[1];
        assert_eq!(ratio.series[0].name, "Nominal Stat. Unc.");
        assert_eq!(binned(&ratio.series[1]).0, &[0.0, 0.5, 1.25]);
        assert_eq!((art.pads[0].bounds.x_min, art.pads[0].bounds.x_max), (1.0, 3.0));
        assert!(comparison_artifact(&[], &ComparisonOptions::default()).is_err());
    }

    #[test]
    fn test_simple_accepts_points() {
        let p = hp_hist::PointSeries::new(vec![0.5, 1.5], vec![2.0, 3.0], vec![0.1, 0.1]).unwrap();
        let items = [
            NamedPlottable::new("hist", named("h", &[1.0, 5.0]).series),
            NamedPlottable::new("graph", p),
        ];
        let art = simple_artifact(&items, &SimpleOptions::default()).unwrap();
        let pad = &art.pads[0];
        assert!(matches!(pad.series[1].data, SeriesData::Points { .. }));
        assert_eq!((pad.bounds.y_min, pad.bounds.y_max), (1.0, 7.5));
        assert!(simple_artifact(&[], &SimpleOptions::default()).is_err());
    }

    #[test]
    fn test_artifact_serializes() {
        let data = named("Data", &[1.0, 2.0]);
        let mc = [named("Bkg", &[1.0, 2.0])];
        let art = data_mc_artifact(&data, &mc, &[], &DataMcOptions::default()).unwrap();
        let v = serde_json::to_value(&art).unwrap();
        assert_eq!(v["pads"][0]["series"][0]["kind"], "binned");
        assert_eq!(v["pads"][0]["series"][0]["role"], "stack");
        assert_eq!(v["meta"]["tool"], "histoplot");
    }
}
