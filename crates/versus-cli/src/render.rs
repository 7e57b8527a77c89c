//! Markdown rendering of a comparison report.

use std::fmt::{self, Write};

use versus_compare::report::{chart, corrections, gallery, table};
use versus_compare::ComparisonReport;

const WINNER_MARK: &str = " \u{2713}";

/// Renders `report` as a markdown document.
pub(crate) fn markdown(report: &ComparisonReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn write_report(out: &mut String, report: &ComparisonReport) -> fmt::Result {
    let names = report.item_names();

    writeln!(out, "# {}", names.join(" vs "))?;
    writeln!(out)?;
    writeln!(out, "**Generated**: {}", report.started_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "**Run**: {}", report.run_id)?;

    let corrected = corrections(report);
    if !corrected.is_empty() {
        writeln!(out)?;
        for item in corrected {
            writeln!(
                out,
                "> Auto-corrected: \"{}\" \u{2192} \"{}\"",
                item.original, item.corrected
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Comparison")?;
    writeln!(out)?;
    write_header(out, &names)?;
    for row in table(report) {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                let mark = if cell.is_winner { WINNER_MARK } else { "" };
                format!("{}{mark}", escape(cell.value))
            })
            .collect();
        writeln!(out, "| {} | {} |", escape(&row.metric.name), cells.join(" | "))?;
    }

    let described: Vec<_> = report
        .comparison
        .metrics
        .iter()
        .filter(|m| !m.description.is_empty() || !m.is_objective)
        .collect();
    if !described.is_empty() {
        writeln!(out)?;
        for metric in described {
            let kind = if metric.is_objective { "" } else { " _(subjective)_" };
            writeln!(out, "- **{}**: {}{kind}", metric.name, metric.description)?;
        }
    }

    if let Some(chart) = chart(report) {
        writeln!(out)?;
        writeln!(out, "## Scores (0-100)")?;
        writeln!(out)?;
        write_header(out, &names)?;
        for (index, label) in chart.labels.iter().enumerate() {
            let scores: Vec<String> = chart
                .series
                .iter()
                .map(|series| format!("{:.0}", series.scores[index]))
                .collect();
            writeln!(out, "| {} | {} |", escape(label), scores.join(" | "))?;
        }
    }

    if let Some(images) = gallery(report) {
        writeln!(out)?;
        writeln!(out, "## Images")?;
        writeln!(out)?;
        for (item, url) in images {
            writeln!(out, "- {item}: {url}")?;
        }
    }

    if !report.sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Sources")?;
        writeln!(out)?;
        for (index, source) in report.sources.iter().enumerate() {
            writeln!(out, "{}. [{}]({})", index + 1, source.title, source.url)?;
        }
    }

    if report.follow_up_searches > 0 {
        writeln!(out)?;
        writeln!(
            out,
            "_{} additional search(es) used to settle winners._",
            report.follow_up_searches
        )?;
    }
    Ok(())
}

fn write_header(out: &mut String, names: &[&str]) -> fmt::Result {
    let escaped: Vec<String> = names.iter().map(|n| escape(n)).collect();
    writeln!(out, "| Metric | {} |", escaped.join(" | "))?;
    writeln!(out, "|--------|{}", "------|".repeat(names.len()))
}

/// Keeps cell text from breaking the table.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;
    use versus_compare::{ComparisonData, Item, Source};

    use super::*;

    fn report(data: serde_json::Value) -> ComparisonReport {
        ComparisonReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            items: vec![
                Item {
                    original: "ihpone 15".into(),
                    corrected: "iPhone 15".into(),
                },
                Item {
                    original: "Galaxy S24".into(),
                    corrected: "Galaxy S24".into(),
                },
            ],
            comparison: ComparisonData::from_value(data).expect("valid comparison data"),
            sources: vec![Source {
                title: "Source 1 for iPhone 15".into(),
                url: "https://apple.example/iphone-15".into(),
                item: "iPhone 15".into(),
            }],
            images: BTreeMap::new(),
            follow_up_searches: 0,
        }
    }

    #[test]
    fn renders_table_with_winner_mark() {
        let out = markdown(&report(json!({
            "metrics": [{ "name": "Battery", "description": "Capacity.", "isObjective": true }],
            "comparison": {
                "iPhone 15": { "Battery": "3349mAh" },
                "Galaxy S24": { "Battery": "4000mAh" }
            },
            "winners": { "Battery": "Galaxy S24" }
        })))
        .expect("markdown renders");

        assert!(out.starts_with("# iPhone 15 vs Galaxy S24\n"));
        assert!(out.contains("| Metric | iPhone 15 | Galaxy S24 |"));
        assert!(out.contains("| Battery | 3349mAh | 4000mAh \u{2713} |"));
        assert!(out.contains("- **Battery**: Capacity."));
        assert!(out.contains("1. [Source 1 for iPhone 15](https://apple.example/iphone-15)"));
    }

    #[test]
    fn notes_corrections_and_missing_values() {
        let out = markdown(&report(json!({
            "metrics": ["Price"],
            "comparison": { "iPhone 15": { "Price": "$10" } }
        })))
        .expect("markdown renders");

        assert!(out.contains("> Auto-corrected: \"ihpone 15\" \u{2192} \"iPhone 15\""));
        assert!(!out.contains("\"Galaxy S24\" \u{2192}"));
        assert!(out.contains("| Price | $10 | N/A |"));
        assert!(!out.contains("## Scores"));
        assert!(!out.contains("## Images"));
    }

    #[test]
    fn renders_scores_when_chart_is_available() {
        let out = markdown(&report(json!({
            "metrics": ["Price", "Display", "Battery"],
            "comparison": {},
            "chartScores": { "Battery": { "iPhone 15": 61.6, "Galaxy S24": 90 } }
        })))
        .expect("markdown renders");

        assert!(out.contains("## Scores (0-100)"));
        assert!(out.contains("| Battery | 62 | 90 |"));
        assert!(out.contains("| Price | 50 | 50 |"));
    }

    #[test]
    fn escapes_pipes_in_cells() {
        assert_eq!(escape("a|b\nc"), "a\\|b c");
    }
}
