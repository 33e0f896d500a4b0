use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "serp-walker")]
#[command(about = "Resumable multi-page search results scraper")]
#[command(version)]
pub struct Args {
    /// Search keyword. Omit to resume a workflow persisted in the session.
    pub keyword: Option<String>,

    /// Maximum number of results pages to walk
    #[arg(short, long, default_value_t = 10)]
    pub max_pages: u32,

    /// URL of the WebDriver server
    #[arg(long, default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Path to a JSON configuration file (overrides the other flags)
    #[arg(long)]
    pub config: Option<String>,
}
