use crate::api::{HttpRecordSource, RecordSource};
use crate::prelude::{println, *};
use crate::render::{format_json, format_listing_text};
use rosterdex_core::listing::{build_listing, ListingOptions, ListingOutput};
use rosterdex_core::page::{FilterContext, SEARCH_PER_PAGE};
use rosterdex_core::reconciler::ReconciliationState;
use rosterdex_core::search::{SearchState, MIN_QUERY_LEN};
use rosterdex_core::sort::{SortDirection, SortKey};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct SearchOptions {
    /// Name (or part of it) to search for
    #[clap(env = "ROSTERDEX_QUERY")]
    pub query: String,

    /// Sort key: name, school, damage
    #[arg(short, long, default_value = "name")]
    pub sort: SortKey,

    /// Sort direction: asc, desc
    #[arg(short, long, default_value = "asc")]
    pub dir: SortDirection,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run one name search and shape the results as a search-mode listing
pub async fn search_data_from<S: RecordSource + ?Sized>(
    source: &S,
    query: &str,
    options: ListingOptions,
) -> Result<ListingOutput> {
    let (search, ticket) = SearchState::default().update_query(query);
    let Some(ticket) = ticket else {
        return Err(Error::InvalidInput(format!(
            "search query must have at least {MIN_QUERY_LEN} characters, got {query:?}"
        ))
        .into());
    };

    log::debug!("searching for {:?}", ticket.query);
    let outcome = source.fetch_by_name(&ticket.query).await;
    let search = search.complete(&ticket, outcome);

    if let Some(err) = search.error() {
        return Err(Error::Network(err.to_string()).into());
    }

    let idle = ReconciliationState::idle(FilterContext::All, SEARCH_PER_PAGE, 0);
    Ok(build_listing(&idle, &search, &options))
}

/// Search the directory API by name
pub async fn search_data(
    query: &str,
    options: ListingOptions,
    global: &crate::Global,
) -> Result<ListingOutput> {
    let source = HttpRecordSource::new(&global.api_config()?)?;
    search_data_from(&source, query, options).await
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Searching for {:?}...", options.query);
    }

    let spinner = crate::list::new_spinner()?;
    spinner.set_message(format!("Searching for {}...", options.query));
    let listing_options = ListingOptions {
        sort: options.sort,
        direction: options.dir,
        filter: None,
    };
    let result = search_data(&options.query, listing_options, &global).await;
    spinner.finish_and_clear();
    let output = result?;

    if options.json {
        println!("{}", format_json(&output)?);
    } else {
        println!("{}", format_listing_text(&output));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use rosterdex_core::listing::ListingMode;
    use rosterdex_core::record::CanonicalRecord;

    fn record(name: &str, category: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: format!("{category}-{name}"),
            name: name.to_string(),
            category: category.to_string(),
            ..CanonicalRecord::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_returns_sorted_results() {
        let source = FakeSource::default().named_records(
            "Shi",
            vec![record("Shiroko", "Abydos"), record("Shizuko", "Hyakkiyako")],
        );
        let options = ListingOptions {
            sort: SortKey::Category,
            direction: SortDirection::Asc,
            filter: None,
        };

        let output = search_data_from(&source, " Shi ", options).await.unwrap();

        assert_eq!(output.mode, ListingMode::Search);
        assert_eq!(output.query.as_deref(), Some("Shi"));
        assert_eq!(output.items[0].name, "Shiroko");
        assert_eq!(output.items[1].name, "Shizuko");
        assert_eq!(source.calls(), vec!["name:Shi"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_is_rejected_without_fetch() {
        let source = FakeSource::default();

        let err = search_data_from(&source, "a", ListingOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("at least 2 characters"));
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_matches_is_empty_listing() {
        let source = FakeSource::default();

        let output = search_data_from(&source, "Zzz", ListingOptions::default())
            .await
            .unwrap();

        assert!(output.items.is_empty());
        assert_eq!(output.status.shown, 0);
    }
}
