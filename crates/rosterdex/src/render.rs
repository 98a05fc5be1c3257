//! Text and JSON rendering shared by the CLI commands

use crate::prelude::*;
use colored::Colorize;
use prettytable::row;
use rosterdex_core::detail::{DetailOutput, SiblingRef};
use rosterdex_core::listing::{end_marker, status_line, ListingMode, ListingOutput};
use rosterdex_core::record::CanonicalRecord;

/// Serialize any output as pretty JSON
pub fn format_json<T: serde::Serialize>(output: &T) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Numbered table of records
pub fn format_records_table(items: &[CanonicalRecord]) -> String {
    let mut table = new_table();
    table.set_titles(row!["#", "Name", "School", "Damage", "Birthday"]);

    for (idx, record) in items.iter().enumerate() {
        table.add_row(row![
            idx + 1,
            record.name,
            or_dash(&record.category),
            or_dash(&record.subtype),
            or_dash(&record.meta_text)
        ]);
    }

    table.to_string()
}

/// Convert a listing to formatted text with colors
pub fn format_listing_text(output: &ListingOutput) -> String {
    let mut result = String::new();

    let title = match output.mode {
        ListingMode::Paged => format!("SCHOOL: {}", output.context.to_uppercase()),
        ListingMode::Search => format!(
            "SEARCH: \"{}\"",
            output.query.as_deref().unwrap_or_default()
        ),
    };

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    result.push_str(&format!(
        "{} {} {}\n",
        "Sorted by".bright_white(),
        output.sort.to_string().bright_cyan(),
        output.direction.to_string().bright_cyan()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!("{}\n", status_line(output).bright_black()));

    if let Some(error) = &output.status.error {
        result.push_str(&format!("{} {}\n", "Error:".red().bold(), error.red()));
    }

    if output.items.is_empty() {
        result.push_str(&format!("\n{}\n", "Nothing to show.".yellow()));
    } else {
        result.push('\n');
        result.push_str(&format_records_table(&output.items));
    }

    if let Some(marker) = end_marker(output) {
        result.push_str(&format!("\n{}\n", marker.bright_black()));
    } else if output.mode == ListingMode::Paged && output.status.can_retry {
        result.push_str(&format!(
            "\n{} {}\n",
            "More available after page".bright_white(),
            output.status.current_page.to_string().bright_cyan().bold()
        ));
    }

    result
}

fn format_sibling(sibling: &SiblingRef) -> String {
    match &sibling.category {
        Some(category) => format!("{} ({})", sibling.name, category),
        None => sibling.name.clone(),
    }
}

/// Convert a detail payload to formatted text with colors
pub fn format_detail_text(detail: &DetailOutput) -> String {
    let record = &detail.record;
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", record.name.bright_magenta().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!("{}: {}\n", "School".green(), or_dash(&record.category)));
    result.push_str(&format!(
        "{}: {}\n",
        "Damage".green(),
        or_dash(&record.subtype).bold()
    ));
    if !record.meta_text.is_empty() {
        result.push_str(&format!("{}: {}\n", "Birthday".green(), record.meta_text));
    }
    if !record.image_url.is_empty() {
        result.push_str(&format!(
            "{}: {}\n",
            "Portrait".green(),
            record.image_url.cyan().underline()
        ));
    }
    if !record.category_image_url.is_empty() {
        result.push_str(&format!(
            "{}: {}\n",
            "School emblem".green(),
            record.category_image_url.cyan().underline()
        ));
    }

    let neighbors = &detail.neighbors;
    if neighbors.prev.is_some() || neighbors.next.is_some() {
        result.push_str(&format!("\n{}\n", "NAVIGATION".bright_yellow().bold()));
        if let Some(prev) = &neighbors.prev {
            result.push_str(&format!(
                "  {} {}\n",
                "<".bright_yellow(),
                format_sibling(prev)
            ));
        }
        if let Some(next) = &neighbors.next {
            result.push_str(&format!(
                "  {} {}\n",
                ">".bright_yellow(),
                format_sibling(next)
            ));
        }
    }

    result
}

/// Command line that opens `sibling` in the detail view
pub fn show_command(sibling: &SiblingRef) -> String {
    let name = shell_quote(&sibling.name);
    match &sibling.category {
        Some(category) => format!("rosterdex show {name} --category {}", shell_quote(category)),
        None => format!("rosterdex show {name}"),
    }
}

fn shell_quote(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterdex_core::detail::Neighbors;
    use rosterdex_core::listing::{build_listing, ListingOptions};
    use rosterdex_core::page::{FilterContext, PageResult};
    use rosterdex_core::reconciler::ReconciliationState;
    use rosterdex_core::search::SearchState;

    fn make_record(name: &str, category: &str, subtype: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: name.to_lowercase(),
            name: name.to_string(),
            category: category.to_string(),
            subtype: subtype.to_string(),
            ..CanonicalRecord::default()
        }
    }

    fn listing(total: u64) -> ListingOutput {
        let (state, ticket) =
            ReconciliationState::activate(FilterContext::Category("Gehenna".into()), 2, 1);
        let page = PageResult::category(
            vec![
                make_record("Hina", "Gehenna", "Explosive"),
                make_record("Aru", "Gehenna", "Explosive"),
            ],
            1,
            2,
            Some(total),
        );
        let state = state.complete(&ticket, Ok(page));
        build_listing(&state, &SearchState::default(), &ListingOptions::default())
    }

    #[test]
    fn test_records_table_contains_rows() {
        let table = format_records_table(&[make_record("Aru", "", "Explosive")]);

        assert!(table.contains("Name"));
        assert!(table.contains("Aru"));
        assert!(table.contains("Explosive"));
        assert!(table.contains('-'));
    }

    #[test]
    fn test_listing_text() {
        let text = format_listing_text(&listing(9));

        assert!(text.contains("SCHOOL: GEHENNA"));
        assert!(text.contains("2 / 9"));
        assert!(text.contains("Aru"));
        assert!(text.contains("Hina"));
        assert!(text.contains("More available after page"));
        assert!(!text.contains("No more."));
    }

    #[test]
    fn test_listing_json_structure() {
        let json = format_json(&listing(9)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["mode"], "paged");
        assert_eq!(parsed["context"], "Gehenna");
        assert_eq!(parsed["items"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["status"]["has_more"], true);
        assert!(parsed.get("query").is_none());
    }

    #[test]
    fn test_detail_text_with_navigation() {
        let detail = DetailOutput {
            record: CanonicalRecord {
                meta_text: "February 19".to_string(),
                ..make_record("Hina", "Gehenna", "Explosive")
            },
            neighbors: Neighbors {
                index: Some(1),
                prev: Some(SiblingRef {
                    name: "Aru".into(),
                    category: Some("Gehenna".into()),
                }),
                next: None,
            },
        };

        let text = format_detail_text(&detail);

        assert!(text.contains("Hina"));
        assert!(text.contains("Birthday"));
        assert!(text.contains("February 19"));
        assert!(text.contains("NAVIGATION"));
        assert!(text.contains("Aru (Gehenna)"));
        assert!(!text.contains("Portrait"));
    }

    #[test]
    fn test_detail_text_without_navigation() {
        let detail = DetailOutput {
            record: make_record("Arona", "", ""),
            neighbors: Neighbors::default(),
        };

        let text = format_detail_text(&detail);

        assert!(!text.contains("NAVIGATION"));
        assert!(!text.contains("Birthday"));
    }

    #[test]
    fn test_show_command_quotes_spaces() {
        let sibling = SiblingRef {
            name: "Cherino".into(),
            category: Some("Red Winter".into()),
        };
        assert_eq!(
            show_command(&sibling),
            "rosterdex show Cherino --category \"Red Winter\""
        );
    }
}
