//! Terminal and JSON presentation of sessions, part lists and search hits

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use jig_api::{doc_page_link, AlertChannel, DocHit};
use jig_core::{
    action_required, AdequateWording, AvailabilityStatus, LaunchAssessment, PartRecord, RowTone,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::session::{NotificationState, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn tone(text: &str, status: &AvailabilityStatus) -> ColoredString {
    match RowTone::for_status(status) {
        RowTone::Critical => text.red().bold(),
        RowTone::Shortage => text.yellow(),
        RowTone::Surplus => text.blue(),
        RowTone::Plain => text.normal(),
    }
}

fn quantity(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Parts table with status and action columns, rows in the given order
pub fn parts_table(parts: &[PartRecord], wording: AdequateWording) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Part Number",
        "Unit Name",
        "Sale Order",
        "Required",
        "In Stock",
        "Status",
        "Action Required",
    ]);

    for part in parts {
        let status = &part.availability_status;
        table.add_row(vec![
            Cell::new(&part.part_number),
            Cell::new(&part.unit_name),
            Cell::new(&part.sale_order),
            Cell::new(quantity(part.required_quantity)),
            Cell::new(quantity(part.current_stock)),
            Cell::new(tone(status.as_str(), status)),
            Cell::new(tone(&action_required(part, wording), status)),
        ]);
    }
    table
}

/// Purchase recommendation table for one sale order
pub fn recommendation_table(parts: &[PartRecord]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Part Number",
        "Unit Name",
        "Required",
        "In Stock",
        "Status",
        "P-Factor",
        "Recommended Qty",
    ]);

    for part in parts {
        let status = &part.availability_status;
        let p_factor = part
            .p_factor
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&part.part_number),
            Cell::new(&part.unit_name),
            Cell::new(quantity(part.required_quantity)),
            Cell::new(quantity(part.current_stock)),
            Cell::new(tone(status.as_str(), status)),
            Cell::new(p_factor),
            Cell::new(quantity(part.recommended_quantity)),
        ]);
    }
    table
}

/// One-line launch status, e.g. `Launched: No (Shortage in SO: SO-1)`
pub fn launch_line(launch: &LaunchAssessment) -> String {
    if launch.is_launched {
        return format!("Launched: {}", "Yes".green().bold());
    }
    let detail = match launch.reason.as_deref() {
        Some(reason) if launch.reason_is_sale_order() => format!(" (Shortage in SO: {reason})"),
        Some(reason) => format!(" ({reason})"),
        None => String::new(),
    };
    format!("Launched: {}{detail}", "No".red().bold())
}

pub fn write_session<W: Write>(
    mut w: W,
    session: &Session,
    wording: AdequateWording,
) -> io::Result<()> {
    let summary = &session.summary;
    writeln!(w, "{}", "Tester Jig".blue().bold())?;
    writeln!(w, "Jig Number: {}", summary.tester_jig_number)?;
    writeln!(w, "Top Assy No: {}", or_na(&summary.top_assy_no))?;
    if summary.sale_orders.is_empty() {
        writeln!(w, "Sale Orders: {}", "none".dimmed())?;
    } else {
        writeln!(w, "Sale Orders: {}", summary.sale_orders.join(", "))?;
    }
    if let Some(incharge) = summary.official_incharge.as_deref() {
        writeln!(w, "Official Incharge: {incharge}")?;
    }
    writeln!(w, "{}", launch_line(&session.launch))?;
    writeln!(w)?;

    match session.parts.as_deref() {
        None => writeln!(
            w,
            "{}",
            "No parts data available for this jig.".yellow()
        )?,
        Some([]) => writeln!(w, "{}", "No parts found for this jig.".yellow())?,
        Some(parts) => {
            writeln!(w, "{}", parts_table(parts, wording))?;
            if session.shortage_count > 0 {
                writeln!(
                    w,
                    "{} {} part(s) short",
                    "Shortage detected:".red().bold(),
                    session.shortage_count
                )?;
            }
        }
    }
    Ok(())
}

/// Shortage view. With no shortages the full list is shown with a note.
pub fn write_shortages<W: Write>(
    mut w: W,
    all_parts: &[PartRecord],
    shortages: &[PartRecord],
    wording: AdequateWording,
) -> io::Result<()> {
    if all_parts.is_empty() {
        return writeln!(w, "{}", "No parts found for this jig.".yellow());
    }
    if shortages.is_empty() {
        writeln!(w, "{}", "All components are adequate.".green())?;
        return writeln!(w, "{}", parts_table(all_parts, wording));
    }
    writeln!(w, "{}", parts_table(shortages, wording))?;
    writeln!(w, "{} shortage(s)", shortages.len())
}

pub fn write_recommendations<W: Write>(
    mut w: W,
    groups: &BTreeMap<String, Vec<PartRecord>>,
) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(w, "{}", "No purchase recommendations.".yellow());
    }
    for (sale_order, parts) in groups {
        writeln!(w, "{} {}", "Sale Order:".blue().bold(), or_na(sale_order))?;
        writeln!(w, "{}", recommendation_table(parts))?;
    }
    Ok(())
}

pub fn write_doc_hits<W: Write>(mut w: W, base_url: &str, hits: &[DocHit]) -> io::Result<()> {
    if hits.is_empty() {
        return writeln!(w, "{}", "No matching documents found.".yellow());
    }
    for (idx, hit) in hits.iter().enumerate() {
        writeln!(w, "{}. {}", idx + 1, hit.title().green())?;
        writeln!(w, "   {}", hit.snippet_or_ellipsis().dimmed())?;
        writeln!(w, "   {}", doc_page_link(base_url, hit).cyan())?;
    }
    Ok(())
}

pub fn notification_line(channel: AlertChannel, state: &NotificationState) -> String {
    match state {
        NotificationState::Pending => format!("{channel} alert still pending"),
        NotificationState::Succeeded(message) => {
            format!("{} {message}", "Alert sent:".green())
        }
        NotificationState::Failed(error) => {
            format!("{} {error}", format!("{channel} alert failed:").red())
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Part plus its derived action text
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRow<'a> {
    #[serde(flatten)]
    pub part: &'a PartRecord,
    pub action_required: String,
}

pub fn part_rows(parts: &[PartRecord], wording: AdequateWording) -> Vec<PartRow<'_>> {
    parts
        .iter()
        .map(|part| PartRow {
            part,
            action_required: action_required(part, wording),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport<'a> {
    pub summary: &'a jig_core::JigSummary,
    pub launch: &'a LaunchAssessment,
    pub shortage_count: usize,
    pub parts: Option<Vec<PartRow<'a>>>,
}

impl<'a> SessionReport<'a> {
    pub fn new(session: &'a Session, wording: AdequateWording) -> Self {
        Self {
            summary: &session.summary,
            launch: &session.launch,
            shortage_count: session.shortage_count,
            parts: session.parts.as_deref().map(|p| part_rows(p, wording)),
        }
    }
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(mut w: W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jig_core::{assess_launch, JigSummary};

    fn plain() {
        colored::control::set_override(false);
    }

    fn part(
        part_number: &str,
        sale_order: &str,
        status: &str,
        required: i64,
        stock: i64,
    ) -> PartRecord {
        PartRecord {
            part_number: part_number.to_string(),
            unit_name: format!("Unit {part_number}"),
            sale_order: sale_order.to_string(),
            required_quantity: Some(required),
            current_stock: Some(stock),
            availability_status: AvailabilityStatus::parse(status),
            ..Default::default()
        }
    }

    fn session(parts: Option<Vec<PartRecord>>) -> Session {
        let launch = assess_launch(parts.as_deref());
        let shortage_count = parts
            .as_deref()
            .map(jig_core::count_shortages)
            .unwrap_or(0);
        Session {
            search_id: 1,
            summary: JigSummary {
                tester_jig_number: "TJ-1".to_string(),
                sale_orders: vec!["SO1".to_string(), "SO2".to_string()],
                ..Default::default()
            },
            parts,
            launch,
            shortage_count,
        }
    }

    fn render(session: &Session) -> String {
        let mut out = Vec::new();
        write_session(&mut out, session, AdequateWording::Nill).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_session_with_shortage() {
        plain();
        let out = render(&session(Some(jig_core::sorted_parts(&[
            part("P-3", "SO1", "Obsolete", 1, 1),
            part("P-1", "SO1", "Shortage", 10, 4),
            part("P-2", "SO2", "Adequate", 2, 2),
            part("P-4", "SO1", "Pending", 3, 3),
        ]))));

        assert!(out.contains("Jig Number: TJ-1"));
        assert!(out.contains("Top Assy No: N/A"));
        assert!(out.contains("Sale Orders: SO1, SO2"));
        assert!(out.contains("Launched: No (Shortage in SO: SO1)"));
        assert!(out.contains("Missing 6 units."));
        assert!(out.contains("NILL"));
        assert!(out.contains("Shortage detected: 1 part(s) short"));

        // Unrecognised status is shown verbatim after the known ones
        assert!(out.contains("Obsolete"));
        let row = |tag: &str| out.find(tag).unwrap();
        assert!(row("P-1") < row("P-4"));
        assert!(row("P-4") < row("Obsolete"));
        assert!(row("Obsolete") < row("P-2"));
    }

    #[test]
    fn test_missing_data_is_not_reported_as_shortage() {
        plain();
        let out = render(&session(None));
        assert!(out.contains("Launched: No (No Parts Data Found)"));
        assert!(out.contains("No parts data available for this jig."));
        assert!(!out.contains("Shortage"));

        let out = render(&session(Some(vec![])));
        assert!(out.contains("No parts found for this jig."));
    }

    #[test]
    fn test_shortage_view_falls_back_to_full_list() {
        plain();
        let parts = vec![part("P-1", "SO1", "Surplus", 1, 3)];
        let mut out = Vec::new();
        write_shortages(&mut out, &parts, &[], AdequateWording::Nill).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("All components are adequate."));
        assert!(out.contains("Surplus of 2 units."));
    }

    #[test]
    fn test_recommendations_grouped_by_sale_order() {
        plain();
        let mut p = part("P-1", "SO1", "Shortage", 10, 4);
        p.p_factor = Some(20.0);
        p.recommended_quantity = Some(8);
        let groups = jig_core::group_by_sale_order(&[p]);

        let mut out = Vec::new();
        write_recommendations(&mut out, &groups).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Sale Order: SO1"));
        assert!(out.contains("20%"));
        assert!(out.contains("8"));
    }

    #[test]
    fn test_doc_hits() {
        plain();
        let hits = vec![DocHit {
            filename: "TJ-1_manual.pdf".to_string(),
            page_num: "3".to_string(),
            snippet: None,
        }];
        let mut out = Vec::new();
        write_doc_hits(&mut out, "http://host:5001", &hits).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "1. TJ-1_manual.pdf (Page 3)\n   ...\n   http://host:5001/static/docs/TJ-1_manual.pdf#page=3\n"
        );
    }

    #[test]
    fn test_json_report() {
        let session = session(Some(vec![part("P-1", "SO1", "Critical Shortage", 3, 0)]));
        let value =
            serde_json::to_value(SessionReport::new(&session, AdequateWording::Nill)).unwrap();

        assert_eq!(value["launch"]["isLaunched"], serde_json::json!(false));
        assert_eq!(value["launch"]["reason"], "SO1");
        assert_eq!(value["shortageCount"], 1);
        assert_eq!(value["parts"][0]["partNumber"], "P-1");
        assert_eq!(value["parts"][0]["availabilityStatus"], "Critical Shortage");
        assert_eq!(
            value["parts"][0]["actionRequired"],
            "Immediate action: ZERO stock!"
        );
    }

    #[test]
    fn test_notification_line() {
        plain();
        assert_eq!(
            notification_line(
                AlertChannel::Telegram,
                &NotificationState::Succeeded("ok".to_string())
            ),
            "Alert sent: ok"
        );
        assert_eq!(
            notification_line(
                AlertChannel::Whatsapp,
                &NotificationState::Failed("down".to_string())
            ),
            "whatsapp alert failed: down"
        );
    }
}
