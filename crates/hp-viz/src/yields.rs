//! Yields tables (numbers-first) and significant-figure rounding.

use hp_core::Measurement;
use hp_hist::NamedSeries;
use serde::Serialize;

/// Per-process summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldRow {
    /// Process name.
    pub process: String,
    /// Number of entries.
    pub entries: f64,
    /// Sum of in-range contents.
    pub integral: f64,
    /// Statistical error of the integral.
    pub integral_error: f64,
    /// Underflow content.
    pub underflow: f64,
    /// Overflow content.
    pub overflow: f64,
}

impl YieldRow {
    /// Summarize a named series.
    pub fn from_series(named: &NamedSeries) -> Self {
        let s = &named.series;
        Self {
            process: named.name.clone(),
            entries: s.entries(),
            integral: s.integral(),
            integral_error: s.integral_error(),
            underflow: s.underflow().content,
            overflow: s.overflow().content,
        }
    }

    /// Integral with its error, for rounding.
    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.integral, self.integral_error)
    }
}

/// Yields of data followed by the MC processes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldsTable {
    /// Rows; data first.
    pub rows: Vec<YieldRow>,
}

/// Build the yields table for `data` and `mc`.
pub fn yields_table(data: &NamedSeries, mc: &[NamedSeries]) -> YieldsTable {
    let mut rows = Vec::with_capacity(mc.len() + 1);
    rows.push(YieldRow::from_series(data));
    rows.extend(mc.iter().map(YieldRow::from_series));
    YieldsTable { rows }
}

/// Format like a float literal: integral values keep a trailing `.0`.
fn fmt_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

impl YieldsTable {
    /// Tab-separated plain-text table.
    pub fn to_text(&self) -> String {
        let mut out = String::from("Process\t\t\tN_Entries\t\tIntegral\t\tUnderflow\t\tOverflow\n");
        for r in &self.rows {
            out.push_str(&format!(
                "{}\t\t{}\t\t{}\t\t{}\t\t{}\n",
                r.process,
                fmt_number(r.entries),
                fmt_number(r.integral),
                fmt_number(r.underflow),
                fmt_number(r.overflow)
            ));
        }
        out
    }

    /// Standalone LaTeX document with the table.
    pub fn to_latex(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str("\\documentclass{article}\n\\usepackage{array}\n");
        out.push_str("\\usepackage{graphicx} % for \\resizebox\n\\begin{document}\n");
        out.push_str("\\begin{table}[htbp]\n\\centering\n");
        out.push_str(&format!("\\caption{{{}}}\n", title));
        out.push_str("\\resizebox{\\textwidth}{!}{%\n\\begin{tabular}{|c|c|c|c|c|}\n\\hline\n");
        out.push_str("Process & N\\_Entries & Integral & Underflow & Overflow\\\\\n\\hline\n");
        for r in &self.rows {
            out.push_str(&format!(
                "{}&{}&{}&{}&{}\\\\\n",
                escape_latex(&r.process),
                fmt_number(r.entries),
                fmt_number(r.integral),
                fmt_number(r.underflow),
                fmt_number(r.overflow)
            ));
        }
        out.push_str("\\hline\n\\end{tabular}%\n}");
        out.push_str(&format!("\\label{{tab:{}_yields_table}}\n", title));
        out.push_str("\\end{table}\n\\end{document}");
        out
    }

    /// Integrals rounded by `rounder`, one `(process, rounded)` pair per row.
    pub fn rounded<R: SignificantFigureRounder + ?Sized>(
        &self,
        rounder: &R,
    ) -> Vec<(String, RoundedMeasurement)> {
        self.rows.iter().map(|r| (r.process.clone(), rounder.round(r.measurement()))).collect()
    }
}

fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '_' | '&' | '%' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// A measurement formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundedMeasurement {
    /// Formatted value.
    pub value: String,
    /// Formatted uncertainty.
    pub uncertainty: String,
}

impl std::fmt::Display for RoundedMeasurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ± {}", self.value, self.uncertainty)
    }
}

/// Rounds `(value, uncertainty)` pairs for tables.
pub trait SignificantFigureRounder {
    /// Round one measurement.
    fn round(&self, m: Measurement) -> RoundedMeasurement;
}

/// Particle Data Group rounding convention.
///
/// The three leading digits of the uncertainty select the precision:
/// 100–354 keeps two significant digits, 355–949 keeps one, 950–999 is
/// rounded up to 1000 and keeps two. The value is rounded to the same
/// decimal place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdgRounder;

impl SignificantFigureRounder for PdgRounder {
    fn round(&self, m: Measurement) -> RoundedMeasurement {
        let unc = m.uncertainty;
        if !(unc.is_finite() && unc > 0.0) || !m.value.is_finite() {
            return RoundedMeasurement { value: m.value.to_string(), uncertainty: unc.to_string() };
        }
        let exp = unc.log10().floor() as i32;
        let leading = (unc / 10f64.powi(exp - 2)).round() as i64;
        // position (power of ten) of the last kept digit
        let last = match leading {
            ..=354 => exp - 1,
            _ => exp,
        };
        let scale = 10f64.powi(last);
        let decimals = if last < 0 { (-last) as usize } else { 0 };
        let unc_r = (unc / scale).round() * scale;
        let value_r = (m.value / scale).round() * scale;
        RoundedMeasurement {
            value: format!("{:.*}", decimals, value_r),
            uncertainty: format!("{:.*}", decimals, unc_r),
        }
    }
}
