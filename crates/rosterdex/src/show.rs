use crate::api::{HttpRecordSource, RecordSource};
use crate::prelude::{println, *};
use crate::render::{format_detail_text, format_json, show_command};
use colored::Colorize;
use rosterdex_core::detail::{build_detail, DetailOutput, SiblingRef};
use rosterdex_core::page::{FilterContext, PageRequest, GALLERY_PER_PAGE};
use rosterdex_core::sort::{sort_records, SortDirection, SortKey};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ShowOptions {
    /// Exact name of the record to show
    #[clap(env = "ROSTERDEX_NAME")]
    pub name: String,

    /// Prefer the record from this school when several share the name
    #[arg(short, long)]
    pub category: Option<String>,

    /// List context for previous/next navigation: a school or "All"
    #[arg(long = "context-category")]
    pub context: Option<String>,

    /// Sort key of the navigation context: name, school, damage
    #[arg(short, long, default_value = "name")]
    pub sort: SortKey,

    /// Sort direction of the navigation context: asc, desc
    #[arg(short, long, default_value = "asc")]
    pub dir: SortDirection,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parameters for a detail lookup
#[derive(Debug, Clone)]
pub struct ShowParams {
    pub name: String,
    pub category: Option<String>,
    /// List the record was opened from; its first page supplies the neighbours.
    pub context: Option<FilterContext>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl From<&ShowOptions> for ShowParams {
    fn from(options: &ShowOptions) -> Self {
        Self {
            name: options.name.clone(),
            category: options.category.clone(),
            context: options.context.as_deref().map(FilterContext::from_label),
            sort: options.sort,
            direction: options.dir,
        }
    }
}

/// Ordered navigation entries for the first page of `context`.
///
/// Navigation is optional: a failed context fetch only drops prev/next.
async fn context_siblings<S: RecordSource + ?Sized>(
    source: &S,
    context: FilterContext,
    sort: SortKey,
    direction: SortDirection,
) -> Vec<SiblingRef> {
    let request = PageRequest {
        context,
        page: 1,
        per_page: GALLERY_PER_PAGE,
    };
    match source.fetch(&request).await {
        Ok(page) => sort_records(&page.items, sort, direction)
            .iter()
            .map(SiblingRef::from)
            .collect(),
        Err(err) => {
            log::warn!("navigation context {} unavailable: {err}", request.context);
            Vec::new()
        }
    }
}

/// Look up one record by name and attach its list neighbours
pub async fn show_data_from<S: RecordSource + ?Sized>(
    source: &S,
    params: ShowParams,
) -> Result<DetailOutput> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("name must not be empty".to_string()).into());
    }

    let candidates = source
        .fetch_by_name(name)
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    let siblings = match params.context {
        Some(context) => context_siblings(source, context, params.sort, params.direction).await,
        None => Vec::new(),
    };

    build_detail(&candidates, params.category.as_deref(), &siblings)
        .ok_or_else(|| Error::NotFound(name.to_string()).into())
}

/// Look up one record on the directory API
pub async fn show_data(params: ShowParams, global: &crate::Global) -> Result<DetailOutput> {
    let source = HttpRecordSource::new(&global.api_config()?)?;
    show_data_from(&source, params).await
}

pub async fn run(options: ShowOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Looking up {:?}...", options.name);
    }

    let output = match show_data(ShowParams::from(&options), &global).await {
        Err(err) if matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))) => {
            if options.json {
                println!("null");
            } else {
                println!("{}", "Not found.".yellow());
            }
            return Err(err);
        }
        result => result?,
    };

    if options.json {
        println!("{}", format_json(&output)?);
        return Ok(());
    }

    println!("{}", format_detail_text(&output));
    if global.verbose {
        for sibling in [&output.neighbors.prev, &output.neighbors.next]
            .into_iter()
            .flatten()
        {
            println!("  {}", show_command(sibling).bright_black());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use rosterdex_core::detail::Neighbors;
    use rosterdex_core::error::FetchError;
    use rosterdex_core::record::CanonicalRecord;

    fn record(name: &str, category: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: format!("{category}-{name}"),
            name: name.to_string(),
            category: category.to_string(),
            ..CanonicalRecord::default()
        }
    }

    fn params(name: &str, category: Option<&str>, context: Option<FilterContext>) -> ShowParams {
        ShowParams {
            name: name.to_string(),
            category: category.map(str::to_string),
            context,
            sort: SortKey::Name,
            direction: SortDirection::Asc,
        }
    }

    fn shiroko_source() -> FakeSource {
        FakeSource::default()
            .named_records(
                "Shiroko",
                vec![record("Shiroko", "Abydos"), record("Shiroko", "Red Winter")],
            )
            .page(Some("Abydos"), 1, &["Shiroko", "Hoshino", "Serika"])
    }

    #[tokio::test(start_paused = true)]
    async fn test_picks_matching_category() {
        let source = shiroko_source();

        let detail = show_data_from(&source, params("Shiroko", Some("red winter"), None))
            .await
            .unwrap();

        assert_eq!(detail.record.category, "Red Winter");
        assert_eq!(detail.neighbors.index, None);
        assert_eq!(source.calls(), vec!["name:Shiroko"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_neighbors_follow_sorted_context() {
        let source = shiroko_source();
        let context = Some(FilterContext::Category("Abydos".into()));

        let detail = show_data_from(&source, params("Shiroko", Some("Abydos"), context))
            .await
            .unwrap();

        // Sorted by name: Hoshino, Serika, Shiroko
        assert_eq!(detail.neighbors.index, Some(2));
        assert_eq!(detail.neighbors.prev.unwrap().name, "Serika");
        assert!(detail.neighbors.next.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_context_drops_navigation_only() {
        let source = shiroko_source().failing(
            None,
            1,
            FetchError::Transport("connection reset".into()),
        );

        let detail = show_data_from(&source, params("Shiroko", None, Some(FilterContext::All)))
            .await
            .unwrap();

        assert_eq!(detail.record.category, "Abydos");
        assert_eq!(detail.neighbors, Neighbors::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_name_is_not_found() {
        let source = FakeSource::default();

        let err = show_data_from(&source, params("Nobody", None, None))
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_name_is_invalid() {
        let source = FakeSource::default();

        let err = show_data_from(&source, params("  ", None, None))
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidInput(_))));
        assert!(source.calls().is_empty());
    }
}
