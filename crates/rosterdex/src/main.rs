use crate::prelude::*;
use clap::Parser;

mod api;
mod browse;
mod config;
mod debounce;
mod error;
mod list;
mod mcp;
mod prelude;
mod render;
mod search;
mod session;
mod show;
#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse, search and sort a remote character directory"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the directory API (overrides ROSTERDEX_API_BASE)
    #[clap(long, global = true)]
    api_base: Option<String>,

    /// Per-request timeout in seconds (overrides ROSTERDEX_TIMEOUT_SECS)
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "ROSTERDEX_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Resolve the API configuration from the environment plus CLI overrides.
    pub fn api_config(&self) -> Result<config::ApiConfig> {
        let config = config::ApiConfig::from_env()?;
        Ok(config.with_overrides(self.api_base.clone(), self.timeout))
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List records page by page, optionally scoped to a school
    List(crate::list::ListOptions),

    /// Search records by name on the server
    Search(crate::search::SearchOptions),

    /// Show one record with previous/next navigation
    Show(crate::show::ShowOptions),

    /// Interactive browse session driven by commands on stdin
    Browse(crate::browse::BrowseOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::List(options) => crate::list::run(options, app.global).await,
        SubCommands::Search(options) => crate::search::run(options, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
