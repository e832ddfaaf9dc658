use anyhow::{anyhow, Result};
use inquire::{Select, Text};

use crate::assistant::AssistantApi;
use crate::config::Config;
use crate::prompt;

/// Interactive first-run provisioning: makes sure a remote assistant exists
/// and is recorded in config.yml before any generation is attempted.
pub async fn run_setup(config: &mut Config, api: &dyn AssistantApi) -> Result<()> {
    if let Some(assistant_id) = config.resolve_assistant_id() {
        match api.get_assistant(&assistant_id).await {
            Ok(info) => {
                log::info!(
                    "Using assistant {} ({}, model {})",
                    info.id,
                    info.name.as_deref().unwrap_or("unnamed"),
                    info.model
                );
                let persona = config.resolve_persona()?;
                let expected_name = format!("Storyloom - {}", persona.display_name());
                if info.name.as_deref() != Some(expected_name.as_str()) {
                    // Persona changed in config.yml since the assistant was
                    // provisioned; push the new instructions.
                    refresh_instructions(config, api).await?;
                    println!("Assistant instructions refreshed for {}.", persona.display_name());
                }
                return Ok(());
            }
            Err(e) => {
                println!(
                    "Could not retrieve assistant '{}': {}. Let's set up a new one.",
                    assistant_id, e
                );
            }
        }
    }

    println!("No storyteller assistant is configured yet.");
    let create_option = "Create a new assistant";
    let existing_option = "Enter an existing assistant id";
    let choice = Select::new(
        "How would you like to set one up?",
        vec![create_option, existing_option],
    )
    .prompt()?;

    let assistant_id = if choice == create_option {
        let persona = config.resolve_persona()?;
        println!(
            "Creating assistant hosted by {} ({})...",
            persona.display_name(),
            persona.epithet()
        );
        let id = api
            .create_assistant(
                &format!("Storyloom - {}", persona.display_name()),
                &prompt::system_prompt(persona),
                &config.assistant.model,
            )
            .await?;
        println!("Assistant created: {}", id);
        id
    } else {
        let id = Text::new("Assistant id:").prompt()?;
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(anyhow!("Assistant id must not be empty"));
        }
        api.get_assistant(&id).await?;
        id
    };

    config.assistant.assistant_id = Some(assistant_id);
    config.save()?;
    println!("Configuration saved.");
    Ok(())
}

/// Pushes the current persona's system prompt to an existing assistant.
/// Used after switching personas in config.yml.
pub async fn refresh_instructions(config: &Config, api: &dyn AssistantApi) -> Result<()> {
    let assistant_id = config
        .resolve_assistant_id()
        .ok_or_else(|| anyhow!("No assistant id configured"))?;
    let persona = config.resolve_persona()?;
    api.update_assistant(
        &assistant_id,
        Some(&format!("Storyloom - {}", persona.display_name())),
        Some(&prompt::system_prompt(persona)),
    )
    .await?;
    log::info!("Updated instructions for {}", assistant_id);
    Ok(())
}
