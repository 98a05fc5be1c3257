use crate::list::{list_data, ListParams};
use crate::prelude::{eprintln, *};
use crate::search::search_data;
use crate::show::{show_data, ShowParams};
use rosterdex_core::listing::ListingOptions;
use rosterdex_core::page::{FilterContext, SEARCH_PER_PAGE};
use rosterdex_core::sort::{SortDirection, SortKey};
use serde::Deserialize;

use super::{to_value, CallToolResult, Content, JsonRpcError};

fn parse_arguments<T: serde::de::DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or(serde_json::json!({})))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))
}

fn parse_sort(
    sort: Option<&str>,
    dir: Option<&str>,
) -> Result<(SortKey, SortDirection), JsonRpcError> {
    let key = match sort {
        Some(raw) => raw
            .parse::<SortKey>()
            .map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid arguments: {e}"))
            })?,
        None => SortKey::default(),
    };
    let direction = match dir {
        Some(raw) => raw
            .parse::<SortDirection>()
            .map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid arguments: {e}"))
            })?,
        None => SortDirection::default(),
    };
    Ok((key, direction))
}

fn execution_error(e: color_eyre::eyre::Report) -> JsonRpcError {
    JsonRpcError::internal(format!("Tool execution error: {e}"))
}

/// Wrap a payload as pretty JSON text content
fn text_result<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(payload)
        .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

    to_value(CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterListArgs {
    category: Option<String>,
    pages: Option<u32>,
    per_page: Option<u32>,
    sort: Option<String>,
    dir: Option<String>,
    filter: Option<String>,
}

fn list_params(arguments: Option<serde_json::Value>) -> Result<ListParams, JsonRpcError> {
    let args: RosterListArgs = parse_arguments(arguments)?;
    let (sort, direction) = parse_sort(args.sort.as_deref(), args.dir.as_deref())?;

    Ok(ListParams {
        context: args
            .category
            .as_deref()
            .map(FilterContext::from_label)
            .unwrap_or_default(),
        pages: args.pages.unwrap_or(1).max(1),
        per_page: args.per_page.unwrap_or(SEARCH_PER_PAGE).max(1),
        options: ListingOptions {
            sort,
            direction,
            filter: args.filter.filter(|f| !f.trim().is_empty()),
        },
    })
}

pub async fn handle_roster_list(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params = list_params(arguments)?;

    if global.verbose {
        eprintln!(
            "Calling roster_list: category={}, pages={}",
            params.context, params.pages
        );
    }

    let listing = list_data(params, global, None)
        .await
        .map_err(execution_error)?;
    text_result(&listing)
}

#[derive(Debug, Deserialize)]
struct RosterSearchArgs {
    query: String,
    sort: Option<String>,
    dir: Option<String>,
}

pub async fn handle_roster_search(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: RosterSearchArgs = parse_arguments(arguments)?;
    let (sort, direction) = parse_sort(args.sort.as_deref(), args.dir.as_deref())?;

    if global.verbose {
        eprintln!("Calling roster_search: query={}", args.query);
    }

    let options = ListingOptions {
        sort,
        direction,
        filter: None,
    };
    let listing = search_data(&args.query, options, global)
        .await
        .map_err(execution_error)?;
    text_result(&listing)
}

#[derive(Debug, Deserialize)]
struct RosterShowArgs {
    name: String,
    category: Option<String>,
    context: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
}

fn show_params(arguments: Option<serde_json::Value>) -> Result<ShowParams, JsonRpcError> {
    let args: RosterShowArgs = parse_arguments(arguments)?;
    let (sort, direction) = parse_sort(args.sort.as_deref(), args.dir.as_deref())?;

    Ok(ShowParams {
        name: args.name,
        category: args.category,
        context: args.context.as_deref().map(FilterContext::from_label),
        sort,
        direction,
    })
}

pub async fn handle_roster_show(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params = show_params(arguments)?;

    if global.verbose {
        eprintln!("Calling roster_show: name={}", params.name);
    }

    match show_data(params, global).await {
        Ok(detail) => text_result(&detail),
        Err(err) if matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))) => {
            to_value(CallToolResult {
                content: vec![Content::Text {
                    text: "Not found.".to_string(),
                }],
                is_error: Some(true),
            })
        }
        Err(err) => Err(execution_error(err)),
    }
}
