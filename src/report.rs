//! Output formatting - plaintext and JSON.

use serde::Serialize;

/// Summary of everything a strip session removed or adjusted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StripReport {
    pub removed_types: Vec<String>,
    pub removed_references: Vec<String>,
    pub removed_resources: Vec<String>,
    pub adjusted_visibility: Vec<String>,
}

impl StripReport {
    pub fn has_changes(&self) -> bool {
        !self.removed_types.is_empty()
            || !self.removed_references.is_empty()
            || !self.removed_resources.is_empty()
            || !self.adjusted_visibility.is_empty()
    }

    pub fn removed_count(&self) -> usize {
        self.removed_types.len() + self.removed_references.len() + self.removed_resources.len()
    }
}

/// Prints a strip report in plain text format.
pub fn print_plain(report: &StripReport) {
    if !report.has_changes() {
        println!("Nothing removed.");
        return;
    }

    print_section("REMOVED TYPES", &report.removed_types);
    print_section("REMOVED REFERENCES", &report.removed_references);
    print_section("REMOVED RESOURCES", &report.removed_resources);
    print_section("MADE INTERNAL", &report.adjusted_visibility);
}

fn print_section(title: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    println!("{} ({}):", title, names.len());
    for name in names {
        println!("- {}", name);
    }
}

/// Prints a strip report in JSON format.
pub fn print_json(report: &StripReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{:?}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stats() {
        let report = StripReport {
            removed_types: vec!["Acme.Dead".into(), "Acme.Gone".into()],
            removed_references: vec!["System.Xml".into()],
            removed_resources: Vec::new(),
            adjusted_visibility: vec!["Acme.Widget".into()],
        };
        assert!(report.has_changes());
        assert_eq!(report.removed_count(), 3);
    }

    #[test]
    fn test_empty_report() {
        let report = StripReport::default();
        assert!(!report.has_changes());
        assert_eq!(report.removed_count(), 0);
    }
}
