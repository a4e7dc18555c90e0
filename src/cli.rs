use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Timeout for narrative generation calls, in seconds
    #[arg(long, default_value_t = 10)]
    pub llm_timeout_secs: u64,

    /// Timeout for history store calls, in seconds
    #[arg(long, default_value_t = 10)]
    pub store_timeout_secs: u64,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
