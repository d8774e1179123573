//! Divisional chart projection.
//!
//! The backend returns one chart object carrying the D9 and D10 charts as
//! sub-objects whose field names differ from the primary chart
//! (`d9_sign` instead of `sign_manual`, and so on). The chart renderer
//! understands only the primary shape, so a divisional view is built by
//! renaming those fields into a copy of the chart.

use std::borrow::Cow;

use serde_json::{json, Map, Value};

use crate::chart::{ChartResult, Division};

/// Ascendant substituted when a divisional sub-object carries none.
pub const PLACEHOLDER_ASCENDANT_SIGN: &str = "Aries";

/// How a [`ChartView`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSource {
    /// D1 requested; the view is the chart itself.
    Primary,
    /// Divisional data was present and fully projected.
    Divisional,
    /// Divisional planets were projected but the sub-object had no
    /// `_ascendant`, so a placeholder sign was used.
    PlaceholderAscendant,
    /// The requested division is missing from the chart; the view shows
    /// the primary chart instead.
    FallbackToPrimary,
}

impl ViewSource {
    /// True when the view does not faithfully show the requested division.
    pub fn is_substituted(&self) -> bool {
        matches!(self, Self::PlaceholderAscendant | Self::FallbackToPrimary)
    }
}

/// A chart-shaped object ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView<'a> {
    pub division: Division,
    pub source: ViewSource,
    pub chart: Cow<'a, ChartResult>,
}

impl ChartView<'_> {
    /// True when the view borrows the original chart unchanged.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.chart, Cow::Borrowed(_))
    }
}

/// Derive the view for `division` from a full chart result.
pub fn project(result: &ChartResult, division: Division) -> ChartView<'_> {
    let (Some(sub), Some(prefix)) = (result.divisional(division), division.field_prefix()) else {
        let source = if division == Division::D1 {
            ViewSource::Primary
        } else {
            tracing::warn!(
                division = %division,
                "Divisional data missing from chart, showing primary chart",
            );
            ViewSource::FallbackToPrimary
        };
        return ChartView {
            division,
            source,
            chart: Cow::Borrowed(result),
        };
    };

    let sign_key = format!("{prefix}_sign");
    let longitude_key = format!("{prefix}_longitude");

    let planets: Map<String, Value> = sub
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, data)| (name.clone(), rename_fields(data, &sign_key, &longitude_key)))
        .collect();

    let (ascendant, source) = match sub.get("_ascendant") {
        Some(asc) if !asc.is_null() => (asc.clone(), ViewSource::Divisional),
        _ => {
            tracing::warn!(
                division = %division,
                "Divisional ascendant missing, using placeholder sign",
            );
            (
                json!({ "sign": PLACEHOLDER_ASCENDANT_SIGN }),
                ViewSource::PlaceholderAscendant,
            )
        }
    };

    let chart = result
        .clone()
        .with_field("planets", Value::Object(planets))
        .with_field("ascendant", ascendant);

    ChartView {
        division,
        source,
        chart: Cow::Owned(chart),
    }
}

/// Copy a divisional planet entry, adding `sign_manual` and `degree`
/// taken from the division-specific field names.
fn rename_fields(data: &Value, sign_key: &str, longitude_key: &str) -> Value {
    let mut entry = data.as_object().cloned().unwrap_or_default();
    let sign = entry.get(sign_key).cloned().unwrap_or(Value::Null);
    let degree = entry.get(longitude_key).cloned().unwrap_or(Value::Null);
    entry.insert("sign_manual".to_string(), sign);
    entry.insert("degree".to_string(), degree);
    Value::Object(entry)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
