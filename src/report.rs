use std::fmt::Write;

use crate::models::{ContractRecord, ContractTable, StatusGroup, REPORT_COLUMNS, STATUS_COLUMNS};
use crate::status::StatusTier;

pub fn render_status_markdown(groups: &[StatusGroup]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Contract Status by Subscription Status");

    if groups.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No contracts with a subscription status.");
        return output;
    }

    for group in groups {
        let tier = StatusTier::classify(&group.status);
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## Subscription Status: {} [{}] ({} contracts)",
            group.status,
            tier.label(),
            group.records.len()
        );
        let _ = writeln!(output);
        write_markdown_table(
            &mut output,
            &STATUS_COLUMNS,
            group.records.iter().map(|r| r.status_cells().to_vec()),
        );
    }

    output
}

fn write_markdown_table<'a>(
    output: &mut String,
    columns: &[&str],
    rows: impl Iterator<Item = Vec<&'a str>>,
) {
    let _ = writeln!(output, "| {} |", columns.join(" | "));
    let _ = writeln!(
        output,
        "|{}",
        columns.iter().map(|_| " --- |").collect::<String>()
    );
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        let _ = writeln!(output, "| {} |", cells.join(" | "));
    }
}

/// On-screen status view: one colored banner per group followed by its table.
pub fn render_status_html(groups: &[StatusGroup]) -> String {
    let mut sections = String::new();

    for group in groups {
        let tier = StatusTier::classify(&group.status);
        let _ = writeln!(
            sections,
            r#"<div style="background-color:{}; padding: 8px; border-radius: 5px; margin-top: 10px; margin-bottom: 5px;">
    <h4 style="color:white; margin:0;">Subscription Status: {}</h4>
</div>"#,
            tier.color(),
            html_escape(&group.status)
        );
        sections.push_str(&html_table(
            &STATUS_COLUMNS,
            group.records.iter().map(|r| r.status_cells().to_vec()),
        ));
    }

    format!(
        r#"<html>
<body>
<h2>Contract Status by Subscription Status</h2>
{sections}</body>
</html>
"#
    )
}

/// The email body: upcoming renewals followed by expired contracts.
pub fn render_report_html(upcoming: &ContractTable, expired: &ContractTable) -> String {
    format!(
        r#"<html>
    <body>
        <h2>Upcoming Renewals</h2>
{upcoming}
        <br><br>
        <h2>Expired Contracts</h2>
{expired}
    </body>
</html>
"#,
        upcoming = report_table(upcoming),
        expired = report_table(expired),
    )
}

fn report_table(table: &ContractTable) -> String {
    html_table(
        &REPORT_COLUMNS,
        table.records.iter().map(|r| r.report_cells().to_vec()),
    )
}

fn html_table<'a>(columns: &[&str], rows: impl Iterator<Item = Vec<&'a str>>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, r#"<table border="1" class="dataframe">"#);
    let _ = writeln!(output, "  <thead>");
    let _ = writeln!(output, r#"    <tr style="text-align: right;">"#);
    for column in columns {
        let _ = writeln!(output, "      <th>{}</th>", html_escape(column));
    }
    let _ = writeln!(output, "    </tr>");
    let _ = writeln!(output, "  </thead>");
    let _ = writeln!(output, "  <tbody>");
    for row in rows {
        let _ = writeln!(output, "    <tr>");
        for cell in row {
            let _ = writeln!(output, "      <td>{}</td>", html_escape(cell));
        }
        let _ = writeln!(output, "    </tr>");
    }
    let _ = writeln!(output, "  </tbody>");
    let _ = writeln!(output, "</table>");

    output
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_json(records: &[ContractRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: &str) -> ContractRecord {
        ContractRecord {
            sold_to_name: name.to_string(),
            material_number: "M-100".to_string(),
            material_name: "Cobas Pro".to_string(),
            valid_from: "2026-01-01".to_string(),
            valid_until: "2026-05-01".to_string(),
            subscription_status: Some(status.to_string()),
        }
    }

    #[test]
    fn report_has_both_sections_in_order() {
        let upcoming: ContractTable = vec![record("Acme Labs", "Active")].into_iter().collect();
        let expired: ContractTable = vec![record("Beta Clinic", "Expired")].into_iter().collect();

        let html = render_report_html(&upcoming, &expired);
        let renewals_at = html.find("<h2>Upcoming Renewals</h2>").unwrap();
        let expired_at = html.find("<h2>Expired Contracts</h2>").unwrap();
        assert!(renewals_at < expired_at);
        assert!(html[renewals_at..expired_at].contains("<td>Acme Labs</td>"));
        assert!(html[expired_at..].contains("<td>Beta Clinic</td>"));
        assert_eq!(html.matches("<th>SOLDTO_NAME</th>").count(), 2);
        assert!(!html.contains("<th>Subscription Status</th>"));
    }

    #[test]
    fn empty_sets_still_render_header_rows() {
        let html = render_report_html(&ContractTable::default(), &ContractTable::default());
        assert_eq!(html.matches("<table").count(), 2);
        assert_eq!(html.matches("<th>Validuntil</th>").count(), 2);
        assert!(!html.contains("<td>"));
    }

    #[test]
    fn cells_are_escaped() {
        let upcoming: ContractTable = vec![record("<b>R&D</b>", "Active")].into_iter().collect();
        let html = render_report_html(&upcoming, &ContractTable::default());
        assert!(html.contains("<td>&lt;b&gt;R&amp;D&lt;/b&gt;</td>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let upcoming: ContractTable = vec![record("Acme", "Active")].into_iter().collect();
        let expired: ContractTable = vec![record("Beta", "Expired")].into_iter().collect();
        assert_eq!(
            render_report_html(&upcoming, &expired),
            render_report_html(&upcoming, &expired)
        );
    }

    #[test]
    fn status_markdown_lists_each_group() {
        let groups = vec![
            StatusGroup {
                status: "Active".to_string(),
                records: vec![record("Acme", "Active")],
            },
            StatusGroup {
                status: "EXPIRED".to_string(),
                records: vec![record("Be|ta", "EXPIRED")],
            },
        ];

        let markdown = render_status_markdown(&groups);
        assert!(markdown.contains("## Subscription Status: Active [healthy] (1 contracts)"));
        assert!(markdown.contains("## Subscription Status: EXPIRED [alert] (1 contracts)"));
        assert!(markdown.contains("| Subscription Status | SOLDTO_NAME |"));
        assert!(markdown.contains("Be\\|ta"));
    }

    #[test]
    fn status_markdown_without_groups() {
        let markdown = render_status_markdown(&[]);
        assert!(markdown.contains("No contracts with a subscription status."));
    }

    #[test]
    fn status_html_uses_tier_colors() {
        let groups = vec![
            StatusGroup {
                status: "Expired".to_string(),
                records: vec![record("Acme", "Expired")],
            },
            StatusGroup {
                status: "Pending".to_string(),
                records: vec![record("Beta", "Pending")],
            },
        ];

        let html = render_status_html(&groups);
        assert!(html.contains("background-color:#f44336"));
        assert!(html.contains("background-color:#2196F3"));
        assert!(html.contains("Subscription Status: Pending"));
    }

    #[test]
    fn json_uses_source_column_names() {
        let json = render_json(&[record("Acme", "Active")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["SOLDTO_NAME"], "Acme");
        assert_eq!(value[0]["Subscription Status"], "Active");
    }
}
