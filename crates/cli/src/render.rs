//! Plain-text rendering of charts and readings.

use serde_json::Value;

use jyotish_client::flow::EmptyReason;
use jyotish_client::messages::PlaceSuggestion;
use jyotish_core::chart::ChartResult;
use jyotish_core::identity::{Directory, Selection};
use jyotish_core::matching::MatchResult;
use jyotish_core::person::Person;
use jyotish_core::projection::{ChartView, ViewSource, PLACEHOLDER_ASCENDANT_SIGN};
use jyotish_core::readings::{
    self, DashaPeriod, PlanetRow, Yoga, YogaStatus, EMPTY_CELL, PLANET_ORDER,
};

/// Append `text` and a newline.
fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn cell(value: Option<&str>) -> &str {
    value.unwrap_or(EMPTY_CELL)
}

/// Why no chart is shown.
pub fn empty_state(reason: &EmptyReason) -> String {
    match reason {
        EmptyReason::UnknownSelection(s) => {
            format!("No person matches '{s}'. See `jyotish family list`.")
        }
        EmptyReason::IncompleteProfile => {
            "Birth details are incomplete. Complete them with `jyotish profile`.".to_string()
        }
    }
}

pub fn person(p: &Person) -> String {
    let mut out = String::new();
    line(&mut out, &p.name);
    if let Some(email) = &p.email {
        line(&mut out, format!("  Email:    {email}"));
    }
    line(
        &mut out,
        format!(
            "  Born:     {} {}",
            cell(p.date_of_birth.as_deref()),
            cell(p.time_of_birth.as_deref())
        ),
    );
    line(&mut out, format!("  Place:    {}", cell(p.location.as_deref())));
    line(&mut out, format!("  Timezone: {}", cell(p.timezone.as_deref())));
    if !p.is_chart_ready() {
        line(
            &mut out,
            format!("  Missing:  {}", p.missing_birth_fields().join(", ")),
        );
    }
    out
}

/// Dashboard summary of a primary chart.
pub fn dashboard(chart: &ChartResult) -> String {
    let mut out = String::new();
    line(&mut out, format!("Moon sign:   {}", cell(chart.moon_sign())));
    line(&mut out, format!("Ascendant:   {}", cell(chart.ascendant_sign())));
    line(&mut out, format!("Nakshatra:   {}", cell(chart.moon_nakshatra())));
    line(&mut out, format!("Dasha:       {}", readings::active_mahadasha(chart)));
    line(&mut out, format!("Gemstone:    {}", cell(chart.lucky_gemstone())));
    out
}

pub fn chart_view(view: &ChartView<'_>) -> String {
    let mut out = String::new();
    line(&mut out, view.division.label());
    match view.source {
        ViewSource::FallbackToPrimary => line(
            &mut out,
            format!("(no {} data in this chart, showing Lagna (D1))", view.division),
        ),
        ViewSource::PlaceholderAscendant => line(
            &mut out,
            format!(
                "(ascendant unavailable for {}, shown as {PLACEHOLDER_ASCENDANT_SIGN})",
                view.division
            ),
        ),
        ViewSource::Primary | ViewSource::Divisional => {}
    }
    line(&mut out, format!("Ascendant  {}", cell(view.chart.ascendant_sign())));

    let Some(planets) = view.chart.planets() else {
        return out;
    };
    for &name in PLANET_ORDER {
        let Some(data) = planets.get(name) else {
            continue;
        };
        let sign = data.get("sign_manual").and_then(Value::as_str);
        let degree = data
            .get("degree")
            .and_then(Value::as_f64)
            .map(|d| readings::format_dms(d.rem_euclid(30.0)));
        line(
            &mut out,
            format!(
                "{name:<10} {:<12} {}",
                cell(sign),
                degree.as_deref().unwrap_or(EMPTY_CELL)
            ),
        );
    }
    out
}

pub fn planet_table(rows: &[PlanetRow]) -> String {
    let mut out = String::new();
    line(
        &mut out,
        format!(
            "{:<10} {:<12} {:<9} {:<18} {:<5} {}",
            "Planet", "Sign", "Degree", "Nakshatra", "House", "Status"
        ),
    );
    for row in rows {
        line(
            &mut out,
            format!(
                "{:<10} {:<12} {:<9} {:<18} {:<5} {}",
                row.name,
                cell(row.sign.as_deref()),
                row.degree_dms(),
                cell(row.nakshatra.as_deref()),
                row.house,
                row.status
            ),
        );
    }
    out
}

pub fn dasha(timeline: &[DashaPeriod], current: Option<usize>) -> String {
    let mut out = String::new();
    if timeline.is_empty() {
        line(&mut out, "No dasha timeline in this chart.");
        return out;
    }
    for (i, period) in timeline.iter().enumerate() {
        let marker = if Some(i) == current { "*" } else { " " };
        let span = period.year_span().unwrap_or_else(|| EMPTY_CELL.to_string());
        line(&mut out, format!("{marker} {:<10} {span}", period.lord));
    }

    let Some(active) = current.and_then(|i| timeline.get(i)) else {
        return out;
    };
    if !active.antar_dashas.is_empty() {
        line(&mut out, format!("\n{} Mahadasha, antardashas:", active.lord));
        for antar in &active.antar_dashas {
            let marker = if antar.is_current { "*" } else { " " };
            let end = antar.end_label().unwrap_or_else(|| EMPTY_CELL.to_string());
            line(&mut out, format!("{marker} {:<10} ends {end}", antar.lord));
        }
    }
    out
}

fn yoga_status(status: &YogaStatus) -> &str {
    match status {
        YogaStatus::Strong => readings::YOGA_STATUS_STRONG,
        YogaStatus::Active => readings::YOGA_STATUS_ACTIVE,
        YogaStatus::Other(s) => s.as_str(),
    }
}

pub fn yogas(list: &[Yoga]) -> String {
    let mut out = String::new();
    if list.is_empty() {
        line(&mut out, "No yogas found.");
        return out;
    }
    for yoga in list {
        line(&mut out, format!("{} [{}]", yoga.name, yoga_status(&yoga.status)));
        if let Some(desc) = &yoga.description {
            line(&mut out, format!("  {desc}"));
        }
    }
    out
}

pub fn match_result(result: &MatchResult) -> String {
    let ak = &result.ashta_koota;
    let mut out = String::new();
    line(
        &mut out,
        format!(
            "Ashta Koota: {} / {} ({:.0}%) {}",
            ak.total,
            ak.max,
            ak.percentage(),
            ak.verdict
        ),
    );
    for koota in &ak.kootas {
        line(
            &mut out,
            format!("  {:<14} {} / {}", koota.koota, koota.score, koota.max),
        );
    }
    for (label, partner) in [("Boy", &result.boy), ("Girl", &result.girl)] {
        if let Some(p) = partner {
            line(
                &mut out,
                format!(
                    "{label}: Moon in {}, {}",
                    cell(p.moon_sign.as_deref()),
                    cell(p.nakshatra())
                ),
            );
        }
    }
    out
}

/// Everyone whose chart can be opened, with the `--person` value to use.
pub fn family(directory: &Directory) -> String {
    let mut out = String::new();
    let selections = std::iter::once(Selection::Me)
        .chain(directory.members.iter().map(|m| Selection::Member(m.id)));
    for selection in selections {
        let Some(label) = directory.label(selection) else {
            continue;
        };
        let relationship = match selection {
            Selection::Me => None,
            Selection::Member(id) => directory
                .members
                .iter()
                .find(|m| m.id == id)
                .and_then(|m| m.relationship.as_deref()),
        };
        let person = directory.resolve(selection);
        line(
            &mut out,
            format!(
                "{:<5} {:<20} {:<12} {} {}",
                selection.to_string(),
                label,
                cell(relationship),
                cell(person.and_then(|p| p.date_of_birth.as_deref())),
                cell(person.and_then(|p| p.location.as_deref()))
            ),
        );
    }
    if directory.members.is_empty() {
        line(&mut out, "No family members.");
    }
    out
}

pub fn places(list: &[PlaceSuggestion]) -> String {
    let mut out = String::new();
    for p in list {
        line(
            &mut out,
            format!("{:>9.4} {:>9.4}  {}", p.latitude, p.longitude, p.display_name),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use jyotish_core::chart::Division;
    use jyotish_core::person::FamilyMember;
    use jyotish_core::projection::project;

    use super::*;

    #[test]
    fn divisional_view_lists_renamed_signs() {
        let chart = ChartResult::from_value(json!({
            "ascendant": { "sign": "Leo" },
            "planets": { "Sun": { "sign_manual": "Aries" } },
            "d9": { "Sun": { "d9_sign": "Cancer", "d9_longitude": 95.5 } }
        }));

        let text = chart_view(&project(&chart, Division::D9));
        assert!(text.starts_with("Navamsa (D9)"));
        assert!(text.contains("shown as Aries"));
        assert!(text.contains("Cancer"));
        assert!(text.contains("05:30:00"));
    }

    #[test]
    fn fallback_view_is_marked() {
        let chart = ChartResult::from_value(json!({ "ascendant": { "sign": "Leo" } }));
        let text = chart_view(&project(&chart, Division::D10));
        assert!(text.contains("no D10 data"));
        assert!(text.contains("Ascendant  Leo"));
    }

    #[test]
    fn unknown_person_names_the_selection() {
        let text = empty_state(&EmptyReason::UnknownSelection(Selection::Member(42)));
        assert_eq!(text, "No person matches '42'. See `jyotish family list`.");
    }

    #[test]
    fn family_lists_account_holder_first() {
        let ravi: FamilyMember = serde_json::from_value(json!({
            "id": 3, "relationship": "brother", "name": "Ravi", "location": "Delhi"
        }))
        .unwrap();
        let asha = Person {
            name: "Asha".into(),
            date_of_birth: Some("1990-05-14".into()),
            ..Person::default()
        };
        let directory = Directory::new(Some(asha), vec![ravi]);

        let text = family(&directory);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("me    Asha (Result)"));
        assert!(lines[0].contains("1990-05-14"));
        assert!(lines[1].starts_with("3     Ravi "));
        assert!(lines[1].contains("brother"));
        assert!(lines[1].ends_with("- Delhi"));
    }

    #[test]
    fn dasha_marks_current_period() {
        let timeline = vec![
            DashaPeriod {
                lord: "Venus".into(),
                start_date: Some("1990-01-01".into()),
                end_date: Some("2010-01-01".into()),
                years: Some(20.0),
                is_current: false,
                antar_dashas: Vec::new(),
                pratyantar_dashas: Vec::new(),
            },
            DashaPeriod {
                lord: "Sun".into(),
                start_date: Some("2010-01-01".into()),
                end_date: Some("2016-01-01".into()),
                years: Some(6.0),
                is_current: true,
                antar_dashas: Vec::new(),
                pratyantar_dashas: Vec::new(),
            },
        ];
        let text = dasha(&timeline, Some(1));
        assert!(text.contains("* Sun        2010 - 2016"));
        assert!(text.contains("  Venus      1990 - 2010"));
    }
}
