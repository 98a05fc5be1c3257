//! Interactive browse session driven by line commands.
//!
//! Each line maps to one of the user triggers of the gallery: scrolling to the
//! bottom (`more`), picking a school, typing in the search box, changing the
//! sort, retrying a failed load and opening a record.
//!
//! Commands never wait for the fetches they trigger. Input lines and fetch
//! completions are served from one loop, so a new query supersedes a pending
//! debounced search and a school switch abandons an in-flight page.

use crate::api::{HttpRecordSource, RecordSource};
use crate::prelude::{println, *};
use crate::render::{format_detail_text, format_listing_text};
use crate::session::BrowseSession;
use colored::Colorize;
use rosterdex_core::detail::{build_detail, DetailOutput, SiblingRef};
use rosterdex_core::page::{FilterContext, GALLERY_PER_PAGE};
use rosterdex_core::sort::{SortDirection, SortKey};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct BrowseOptions {
    /// School to start in, or "All"
    #[arg(short, long, env = "ROSTERDEX_CATEGORY", default_value = "All")]
    pub category: String,

    /// Records per page
    #[arg(long, default_value_t = GALLERY_PER_PAGE)]
    pub per_page: u32,
}

const HELP: &str = "\
Commands:
  more                   load the next page (also: empty line)
  category <school|all>  switch the school filter
  query [text]           search by name; no text clears the search
  filter [text]          filter the shown list; no text clears the filter
  sort <key> [asc|desc]  sort by name, school or damage
  show <n>               open the n-th record of the list
  prev | next            move through the list from an open record
  list                   back to the list
  retry                  retry the last failed load
  help                   this text
  quit                   leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    More,
    Category(FilterContext),
    Query(String),
    Filter(Option<String>),
    Sort(SortKey, SortDirection),
    Show(usize),
    Prev,
    Next,
    List,
    Retry,
    Help,
    Quit,
}

/// Parse one input line
pub fn parse_command(line: &str) -> std::result::Result<BrowseCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" | "more" | "m" => BrowseCommand::More,
        "category" | "school" | "c" => {
            if rest.is_empty() {
                return Err("category needs a school name or \"all\"".to_string());
            }
            BrowseCommand::Category(FilterContext::from_label(rest))
        }
        "query" | "q" | "search" => BrowseCommand::Query(rest.to_string()),
        "filter" | "f" => BrowseCommand::Filter((!rest.is_empty()).then(|| rest.to_string())),
        "sort" | "s" => {
            let mut parts = rest.split_whitespace();
            let key = parts
                .next()
                .ok_or_else(|| "sort needs a key: name, school, damage".to_string())?
                .parse::<SortKey>()?;
            let direction = match parts.next() {
                Some(dir) => dir.parse::<SortDirection>()?,
                None => SortDirection::Asc,
            };
            BrowseCommand::Sort(key, direction)
        }
        "show" | "open" => {
            let index = rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("show needs a list position, got {rest:?}"))?;
            BrowseCommand::Show(index)
        }
        "prev" | "p" => BrowseCommand::Prev,
        "next" | "n" => BrowseCommand::Next,
        "list" | "l" | "back" => BrowseCommand::List,
        "retry" | "r" => BrowseCommand::Retry,
        "help" | "h" | "?" => BrowseCommand::Help,
        "quit" | "exit" => BrowseCommand::Quit,
        other => return Err(format!("Unknown command: {other}. Type \"help\" for the list.")),
    };
    Ok(command)
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Render(String),
    Quit,
}

/// A browse session plus the record currently opened from it.
pub struct Browser<S: RecordSource + 'static> {
    source: Arc<S>,
    session: BrowseSession<S>,
    detail: Option<DetailOutput>,
}

impl<S: RecordSource + 'static> Browser<S> {
    /// Start on `context` and wait for its first page.
    pub async fn start(source: Arc<S>, context: FilterContext, per_page: u32) -> Self {
        let session = BrowseSession::start(source.clone(), context, per_page.max(1));
        let mut browser = Self {
            source,
            session,
            detail: None,
        };
        browser.session.settle().await;
        browser
    }

    #[cfg(test)]
    pub fn session(&self) -> &BrowseSession<S> {
        &self.session
    }

    #[cfg(test)]
    pub fn detail(&self) -> Option<&DetailOutput> {
        self.detail.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Wait for outstanding loads of the current view.
    pub async fn settle(&mut self) {
        self.session.settle().await;
    }

    /// Apply the next fetch completion and return the refreshed list view.
    ///
    /// Nothing is returned for a stale completion or while a record is open.
    pub async fn next_update(&mut self) -> Option<String> {
        let changed = self.session.next_event().await;
        (changed && self.detail.is_none()).then(|| self.render())
    }

    pub fn render(&self) -> String {
        match &self.detail {
            Some(detail) => format_detail_text(detail),
            None => format_listing_text(&self.session.listing()),
        }
    }

    fn siblings(&self) -> Vec<SiblingRef> {
        self.session
            .listing()
            .items
            .iter()
            .map(SiblingRef::from)
            .collect()
    }

    /// Open `target` in the detail view, with neighbours from the shown list.
    async fn open(&mut self, target: SiblingRef) -> Result<()> {
        let candidates = self
            .source
            .fetch_by_name(&target.name)
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        self.detail = build_detail(&candidates, target.category.as_deref(), &self.siblings());
        if self.detail.is_none() {
            return Err(Error::NotFound(target.name).into());
        }
        Ok(())
    }

    /// Open the previous or next record of the open one.
    async fn step_to(
        &mut self,
        pick: fn(&DetailOutput) -> &Option<SiblingRef>,
    ) -> Result<Step> {
        let Some(detail) = &self.detail else {
            return Err(Error::InvalidInput("open a record first".to_string()).into());
        };
        match pick(detail).clone() {
            Some(target) => {
                self.open(target).await?;
                Ok(Step::Render(self.render()))
            }
            None => Ok(Step::Render("Nothing further in this list.".to_string())),
        }
    }

    pub async fn execute(&mut self, command: BrowseCommand) -> Result<Step> {
        match command {
            BrowseCommand::Quit => return Ok(Step::Quit),
            BrowseCommand::Help => return Ok(Step::Render(HELP.to_string())),
            BrowseCommand::More => {
                self.detail = None;
                if !self.session.load_more() {
                    log::debug!("no next page to load");
                }
            }
            BrowseCommand::Category(context) => {
                self.detail = None;
                self.session.select_context(context);
            }
            BrowseCommand::Query(text) => {
                self.detail = None;
                self.session.set_query(&text);
            }
            BrowseCommand::Filter(filter) => {
                self.detail = None;
                self.session.set_filter(filter);
            }
            BrowseCommand::Sort(key, direction) => self.session.set_sort(key, direction),
            BrowseCommand::Retry => {
                self.detail = None;
                self.session.retry();
            }
            BrowseCommand::List => self.detail = None,
            BrowseCommand::Show(position) => {
                let listing = self.session.listing();
                let record = position
                    .checked_sub(1)
                    .and_then(|index| listing.items.get(index))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!("no record at position {position}"))
                    })?;
                self.open(SiblingRef::from(record)).await?;
            }
            BrowseCommand::Prev => return self.step_to(|detail| &detail.neighbors.prev).await,
            BrowseCommand::Next => return self.step_to(|detail| &detail.neighbors.next).await,
        }

        Ok(Step::Render(self.render()))
    }
}

/// Serve commands from `reader` and fetch completions until `quit` or EOF.
///
/// At EOF the loads still outstanding are awaited and the final view written.
pub async fn drive<S, R, W>(browser: &mut Browser<S>, reader: R, out: &mut W) -> Result<()>
where
    S: RecordSource + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read a command from stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        writeln!(out, "{}", message.red())?;
                        continue;
                    }
                };
                match browser.execute(command).await {
                    Ok(Step::Render(text)) => writeln!(out, "{text}")?,
                    Ok(Step::Quit) => return Ok(()),
                    Err(err) => writeln!(out, "{} {}", "Error:".red().bold(), err)?,
                }
            }
            update = browser.next_update(), if browser.is_busy() => {
                if let Some(text) = update {
                    writeln!(out, "{text}")?;
                }
            }
        }
    }

    if browser.is_busy() {
        browser.settle().await;
        writeln!(out, "{}", browser.render())?;
    }
    Ok(())
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let source = Arc::new(HttpRecordSource::new(&global.api_config()?)?);
    let context = FilterContext::from_label(&options.category);

    if global.verbose {
        println!("Browsing {context}, {} per page", options.per_page);
    }

    let spinner = crate::list::new_spinner()?;
    spinner.set_message(format!("Loading {context}..."));
    let mut browser = Browser::start(source, context, options.per_page).await;
    spinner.finish_and_clear();

    println!("{}", browser.render());
    println!("{}", "Type \"help\" for commands.".bright_black());

    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    drive(&mut browser, reader, &mut anstream::stdout()).await
}
