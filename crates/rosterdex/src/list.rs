use crate::api::{HttpRecordSource, RecordSource};
use crate::prelude::{println, *};
use crate::render::{format_json, format_listing_text};
use crate::session::BrowseSession;
use indicatif::{ProgressBar, ProgressStyle};
use rosterdex_core::listing::{ListingOptions, ListingOutput};
use rosterdex_core::page::{FilterContext, SEARCH_PER_PAGE};
use rosterdex_core::reconciler::Phase;
use rosterdex_core::sort::{SortDirection, SortKey};
use std::sync::Arc;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// School to list, or "All"
    #[arg(short, long, env = "ROSTERDEX_CATEGORY", default_value = "All")]
    pub category: String,

    /// Number of pages to load
    #[arg(short, long, default_value = "1")]
    pub pages: u32,

    /// Records per page
    #[arg(long, default_value_t = SEARCH_PER_PAGE)]
    pub per_page: u32,

    /// Sort key: name, school, damage
    #[arg(short, long, default_value = "name")]
    pub sort: SortKey,

    /// Sort direction: asc, desc
    #[arg(short, long, default_value = "asc")]
    pub dir: SortDirection,

    /// Only show records whose name, school or damage type contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parameters for a paged listing
#[derive(Debug, Clone)]
pub struct ListParams {
    pub context: FilterContext,
    pub pages: u32,
    pub per_page: u32,
    pub options: ListingOptions,
}

impl From<&ListOptions> for ListParams {
    fn from(options: &ListOptions) -> Self {
        Self {
            context: FilterContext::from_label(&options.category),
            pages: options.pages,
            per_page: options.per_page,
            options: ListingOptions {
                sort: options.sort,
                direction: options.dir,
                filter: options.filter.clone(),
            },
        }
    }
}

/// Helper to set spinner message if spinner is present
fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

pub fn new_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Load up to `params.pages` pages of a context through a browse session.
///
/// Stops early when pagination ends or a page fails; the failure is reported
/// in the listing status and the records loaded so far are kept.
pub async fn list_data_from<S: RecordSource + 'static>(
    source: Arc<S>,
    params: ListParams,
    spinner: Option<&ProgressBar>,
) -> ListingOutput {
    let ListParams {
        context,
        pages,
        per_page,
        options,
    } = params;

    set_spinner_msg(spinner, format!("Loading {context}..."));
    let mut session = BrowseSession::start(source, context, per_page.max(1));
    session.set_sort(options.sort, options.direction);
    session.set_filter(options.filter);
    session.settle().await;

    for page in 2..=pages {
        if session.state().error().is_some() || !session.load_more() {
            break;
        }
        set_spinner_msg(spinner, format!("Loading page {page}..."));
        session.settle().await;
    }

    session.listing()
}

/// Fetch a paged listing from the directory API
pub async fn list_data(
    params: ListParams,
    global: &crate::Global,
    spinner: Option<&ProgressBar>,
) -> Result<ListingOutput> {
    let source = HttpRecordSource::new(&global.api_config()?)?;
    Ok(list_data_from(Arc::new(source), params, spinner).await)
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!(
            "Listing {} page(s) of {}...",
            options.pages, options.category
        );
    }

    let spinner = new_spinner()?;
    let output = list_data(ListParams::from(&options), &global, Some(&spinner)).await?;
    spinner.finish_and_clear();

    if options.json {
        println!("{}", format_json(&output)?);
    } else {
        println!("{}", format_listing_text(&output));
    }

    if output.status.phase == Phase::Errored {
        let message = output.status.error.unwrap_or_default();
        return Err(Error::Network(message).into());
    }

    Ok(())
}
