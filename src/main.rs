use std::sync::Arc;

use anyhow::Result;

mod assistant;
mod catalog;
mod config;
mod prompt;
mod session;
mod setup;
mod workflow;

use assistant::{AssistantApi, HttpAssistantApi};
use config::Config;
use workflow::WorkflowManager;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("A minimal config.yml looks like:");
            eprintln!();
            eprintln!("  output_folder: output");
            eprintln!("  persona: wit");
            eprintln!("  assistant:");
            eprintln!("    api_key: sk-...");
            std::process::exit(1);
        }
    };
    config.ensure_directories()?;

    let api = match HttpAssistantApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("Get a key at https://platform.openai.com/api-keys and put it in");
            eprintln!("config.yml under assistant.api_key, or export OPENAI_API_KEY.");
            std::process::exit(1);
        }
    };
    let api: Arc<dyn AssistantApi> = Arc::new(api);

    setup::run_setup(&mut config, api.as_ref()).await?;

    let mut manager = WorkflowManager::new(config, api)?;
    manager.run().await
}
