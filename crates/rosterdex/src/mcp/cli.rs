#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Expose the directory as Model Context Protocol tools")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Serve MCP over stdin/stdout, one JSON-RPC message per line
    #[clap(name = "stdio")]
    Stdio,

    /// Serve MCP over HTTP with an SSE endpoint
    #[clap(name = "sse")]
    Sse(SseOptions),
}

#[derive(Debug, clap::Args)]
pub struct SseOptions {
    /// Port to listen on
    #[arg(short, long, env = "ROSTERDEX_MCP_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "ROSTERDEX_MCP_HOST", default_value = "127.0.0.1")]
    pub host: String,
}
