use clap::Parser;
use serp_walker::config::WorkflowConfig;
use serp_walker::{Workflow, session};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match WorkflowConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config from {}: {}", path, e);
                return;
            }
        },
        None => {
            let mut config = WorkflowConfig::default();
            config.max_pages = args.max_pages;
            config.webdriver_url = args.webdriver_url.clone();
            config
        }
    };

    let Some(client) = session::connect(&config.webdriver_url).await else {
        return;
    };

    let workflow = match &args.keyword {
        Some(keyword) => {
            ::log::info!("Starting workflow for keyword: {}", keyword);
            Workflow::new(keyword.clone())
        }
        None => {
            ::log::info!("No keyword supplied; attempting to resume");
            Workflow::resume()
        }
    };

    let start_time = std::time::Instant::now();
    let results = match workflow.with_config(config).run(&client).await {
        Ok(results) => results,
        Err(e) => {
            ::log::error!("Workflow failed: {}", e);
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Workflow complete - {} results in {:.2} seconds",
        results.len(),
        start_time.elapsed().as_secs_f64()
    );

    // One JSON object per line so downstream tools can stream them
    for record in &results {
        match serde_json::to_string(record) {
            Ok(line) => println!("{}", line),
            Err(e) => ::log::error!("Failed to serialize result: {}", e),
        }
    }

    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }
}
