//! Style configuration with fail-fast key validation.
//!
//! Every consumer has a fixed set of recognized option keys. Parsing
//! rejects unknown keys up front with [`Error::UnknownStyleOption`] instead
//! of silently ignoring them.

use hp_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn reject_unknown(consumer: &str, map: &Map<String, Value>, known: &[&str]) -> Result<()> {
    if let Some(key) = map.keys().find(|k| !known.contains(&k.as_str())) {
        log::error!("unknown {} option {}", consumer, key);
        return Err(Error::UnknownStyleOption { consumer: consumer.to_string(), key: key.clone() });
    }
    Ok(())
}

fn parse_object<T: DeserializeOwned>(
    consumer: &str,
    value: Value,
    known: &[&str],
) -> Result<T> {
    let Value::Object(map) = value else {
        return Err(Error::Validation(format!("{} style must be a JSON object", consumer)));
    };
    reject_unknown(consumer, &map, known)?;
    log::debug!("applying {} style ({} options)", consumer, map.len());
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Per-series drawing style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoStyle {
    /// Marker size.
    #[serde(default, rename = "markersize", skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<f64>,
    /// Fill style code.
    #[serde(default, rename = "fillstyle", skip_serializing_if = "Option::is_none")]
    pub fill_style: Option<i32>,
    /// Line style code.
    #[serde(default, rename = "linestyle", skip_serializing_if = "Option::is_none")]
    pub line_style: Option<i32>,
    /// Renderer draw option (e.g. `"hist"`, `"e2"`, `"ep"`).
    #[serde(default, rename = "drawoption", skip_serializing_if = "Option::is_none")]
    pub draw_option: Option<String>,
}

impl HistoStyle {
    const KEYS: &'static [&'static str] = &["markersize", "fillstyle", "linestyle", "drawoption"];

    /// Parse from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        parse_object("histo", value, Self::KEYS)
    }

    /// Parse from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(s)?)
    }

    /// Style of the statistical-uncertainty band in ratio pads.
    pub fn error_band() -> Self {
        Self {
            marker_size: Some(0.0),
            fill_style: Some(3154),
            line_style: None,
            draw_option: Some("e2".to_string()),
        }
    }

    /// Overlay `other` on `self`: options set in `other` win.
    pub fn merged(&self, other: &HistoStyle) -> HistoStyle {
        HistoStyle {
            marker_size: other.marker_size.or(self.marker_size),
            fill_style: other.fill_style.or(self.fill_style),
            line_style: other.line_style.or(self.line_style),
            draw_option: other.draw_option.clone().or_else(|| self.draw_option.clone()),
        }
    }
}

/// Pad margins as fractions of the pad size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PadMargins {
    /// Top margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_up: Option<f64>,
    /// Bottom margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_down: Option<f64>,
    /// Left margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<f64>,
    /// Right margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<f64>,
}

impl PadMargins {
    const KEYS: &'static [&'static str] =
        &["margin_up", "margin_down", "margin_left", "margin_right"];

    /// Parse from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        let m: Self = parse_object("pad margins", value, Self::KEYS)?;
        for v in [m.margin_up, m.margin_down, m.margin_left, m.margin_right].into_iter().flatten() {
            if !(0.0..1.0).contains(&v) {
                return Err(Error::Validation(format!("pad margin {} outside [0, 1)", v)));
            }
        }
        Ok(m)
    }
}

/// Style of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisStyle {
    /// Title offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_offset: Option<f64>,
    /// Title size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<f64>,
    /// Title font code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_font: Option<i32>,
    /// Label size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_size: Option<f64>,
    /// Label font code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_font: Option<i32>,
}

impl AxisStyle {
    fn set(&mut self, consumer: &str, key: &str, option: &str, value: &Value) -> Result<()> {
        let num = || {
            value.as_f64().ok_or_else(|| {
                Error::Validation(format!("{} option {} must be a number", consumer, key))
            })
        };
        let int = || {
            value.as_i64().and_then(|v| i32::try_from(v).ok()).ok_or_else(|| {
                Error::Validation(format!("{} option {} must be an integer", consumer, key))
            })
        };
        match option {
            "titleOffset" => self.title_offset = Some(num()?),
            "titleSize" => self.title_size = Some(num()?),
            "titleFont" => self.title_font = Some(int()?),
            "labelSize" => self.label_size = Some(num()?),
            "labelFont" => self.label_font = Some(int()?),
            _ => {
                return Err(Error::UnknownStyleOption {
                    consumer: consumer.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Axis styling of a pad's frame, parsed from flat `x_*`/`y_*`/`n_div` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BasisStyle {
    /// x-axis style.
    pub x: AxisStyle,
    /// y-axis style.
    pub y: AxisStyle,
    /// Primary and secondary tick divisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_div: Option<(i32, i32)>,
}

impl BasisStyle {
    /// Parse from a JSON object such as `{"x_titleOffset": 1.2, "n_div": [505, 1]}`.
    pub fn from_value(value: Value) -> Result<Self> {
        const CONSUMER: &str = "pad basis";
        let Value::Object(map) = value else {
            return Err(Error::Validation("pad basis style must be a JSON object".to_string()));
        };
        let mut out = Self::default();
        for (key, v) in &map {
            if let Some(opt) = key.strip_prefix("x_") {
                out.x.set(CONSUMER, key, opt, v)?;
            } else if let Some(opt) = key.strip_prefix("y_") {
                out.y.set(CONSUMER, key, opt, v)?;
            } else if key == "n_div" {
                let items = v.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                    Error::Validation("n_div option in wrong format, need two items".to_string())
                })?;
                let div = |i: usize| {
                    items[i].as_i64().and_then(|x| i32::try_from(x).ok()).ok_or_else(|| {
                        Error::Validation("n_div items must be integers".to_string())
                    })
                };
                out.n_div = Some((div(0)?, div(1)?));
            } else {
                log::error!("unknown {} option {}", CONSUMER, key);
                return Err(Error::UnknownStyleOption {
                    consumer: CONSUMER.to_string(),
                    key: key.clone(),
                });
            }
        }
        Ok(out)
    }
}

/// Configuration of one pad (`{"margins": {...}, "basis": {...}}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PadConfig {
    /// Margins.
    pub margins: PadMargins,
    /// Frame/axis style.
    pub basis: BasisStyle,
}

impl PadConfig {
    /// Parse from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(Error::Validation("pad config must be a JSON object".to_string()));
        };
        reject_unknown("pad", &map, &["margins", "basis"])?;
        let margins = match map.remove("margins") {
            Some(v) => PadMargins::from_value(v)?,
            None => PadMargins::default(),
        };
        let basis = match map.remove("basis") {
            Some(v) => BasisStyle::from_value(v)?,
            None => BasisStyle::default(),
        };
        Ok(Self { margins, basis })
    }

    /// Parse from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(s)?)
    }
}
