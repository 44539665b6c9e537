//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use fantasy_store::{DedupeReport, RecordId, Standings, StoreError, TeamPoints};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> String {
    if let Some(cli) = error.downcast_ref::<CliError>() {
        return cli.type_name();
    }
    if let Some(store) = error.downcast_ref::<StoreError>() {
        return store.kind().to_string();
    }
    "error".to_string()
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print a single record
pub fn print_record<T: Serialize>(record: &T, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": record
        }));
    } else {
        println!("{}", record_line(record));
    }
}

/// Print a record list under a heading
pub fn print_records<T: Serialize>(heading: &str, records: &[T], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": records
        }));
        return;
    }

    if records.is_empty() {
        println!("{}", format!("No {} found", heading.to_lowercase()).yellow());
        return;
    }

    println!("{}", format!("{}:", heading).bold());
    for record in records {
        println!("  {}", record_line(record));
    }
}

/// Print a mutation result with a confirmation line
pub fn print_saved<T: Serialize>(message: &str, record: &T, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "message": message,
            "data": record
        }));
    } else {
        println!("{} {}", "✓".green(), message);
        println!("  {}", record_line(record));
    }
}

/// Print success message
pub fn print_success(message: &str, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "message": message
        }));
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

/// Print a team's fantasy points
pub fn print_team_points(points: &TeamPoints, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": points
        }));
        return;
    }

    println!(
        "{} {}",
        format!("Team #{}", points.team_id).bold(),
        format!("{} pts", points.total).cyan()
    );
    for driver in &points.drivers {
        println!("  Driver #{:<4} {:>5}", driver.driver_id, driver.points);
    }
}

/// Print driver and team tables
pub fn print_standings(standings: &Standings, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": standings
        }));
        return;
    }

    println!("{}", "Drivers:".bold());
    for (rank, row) in standings.drivers.iter().enumerate() {
        println!(
            "  {:>2}. {} {}",
            rank + 1,
            standing_label(row.driver_id, row.name.as_deref()),
            format!("{} pts", row.points).cyan()
        );
    }
    println!("{}", "Teams:".bold());
    for (rank, row) in standings.teams.iter().enumerate() {
        println!(
            "  {:>2}. {} {}",
            rank + 1,
            standing_label(row.team_id, row.name.as_deref()),
            format!("{} pts", row.points).cyan()
        );
    }
}

fn standing_label(id: RecordId, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("#{} {}", id, name),
        None => format!("#{}", id),
    }
}

/// Print the outcome of cleaning several categories
pub fn print_dedupe_reports(reports: &[DedupeReport], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": reports
        }));
        return;
    }

    for report in reports {
        print_dedupe_summary(report);
    }
}

/// Print the outcome of a duplicate cleanup
pub fn print_dedupe_report(report: &DedupeReport, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "data": report
        }));
        return;
    }

    print_dedupe_summary(report);
}

fn print_dedupe_summary(report: &DedupeReport) {
    if !report.changed() {
        println!(
            "{} No duplicate {} results ({} scanned)",
            "✓".green(),
            report.category,
            report.scanned
        );
        return;
    }

    println!(
        "{} Removed {} duplicate {} results, kept {} of {}",
        "✓".green(),
        report.removed.len(),
        report.category,
        report.kept,
        report.scanned
    );
    for removed in &report.removed {
        println!(
            "  {} result #{} (race {}, driver {})",
            "-".red(),
            removed.id,
            removed.race_id,
            removed.driver_id
        );
    }
    if let Some(backup) = &report.backup {
        println!("  Backup: {}", backup.dimmed());
    }
}

/// One-line summary of a record: id, name, then remaining fields
fn record_line<T: Serialize>(record: &T) -> String {
    let mut fields = match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => return other.to_string(),
        Err(e) => return format!("<unprintable record: {}>", e),
    };

    let id = fields
        .remove("id")
        .map(|v| plain(&v))
        .unwrap_or_else(|| "?".to_string());
    let name = fields.remove("name").map(|v| plain(&v));

    let mut line = format!("#{}", id).bold().to_string();
    if let Some(name) = name {
        line.push(' ');
        line.push_str(&name);
    }
    let rest: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, plain(value)))
        .collect();
    if !rest.is_empty() {
        line.push_str(&format!(" {}", rest.join(" ").dimmed()));
    }
    line
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_leads_with_id_and_name() {
        colored::control::set_override(false);
        let record = json!({"id": 3, "name": "Oscar", "number": 81});

        assert_eq!(record_line(&record), "#3 Oscar number=81");
    }

    #[test]
    fn standing_label_falls_back_to_id() {
        assert_eq!(standing_label(RecordId::new(4), Some("Lando")), "#4 Lando");
        assert_eq!(standing_label(RecordId::new(9), None), "#9");
    }

    #[test]
    fn store_errors_report_their_kind() {
        let err = Error::new(StoreError::not_found("Race", RecordId::new(2)));
        assert_eq!(error_type_name(&err), "not_found");
        assert_eq!(error_type_name(&anyhow::anyhow!("boom")), "error");
    }
}
