use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use inquire::{Confirm, Select, Text};

use crate::assistant::{AssistantApi, Conversation, GenerationError, ImageRequest};
use crate::catalog::{
    AbsurdityLevel, AdventureSetting, ComicStyle, Genre, LiteraryForm, Persona, StoryLength,
    VisualStyle, WorkflowMode,
};
use crate::config::Config;
use crate::prompt;
use crate::session::{
    AdventureSession, ChatRole, ChatSession, ComicSession, DirectSession, GuidedSession,
    ModeState, SerialSession, VisualSession,
};

/// Interactive front-end: owns the session conversation and drives one mode
/// at a time. Mode-local state lives only for the duration of a mode visit.
pub struct WorkflowManager {
    config: Config,
    api: Arc<dyn AssistantApi>,
    conversation: Conversation,
    persona: Persona,
}

/// What the user picked from a post-generation action menu.
enum Action {
    Regenerate,
    StartOver,
    Save,
    Back,
}

impl WorkflowManager {
    pub fn new(config: Config, api: Arc<dyn AssistantApi>) -> Result<Self> {
        let persona = config.resolve_persona()?;
        let assistant_id = config
            .resolve_assistant_id()
            .context("No assistant id configured. Run the setup flow first.")?;
        let conversation = Conversation::new(api.clone(), assistant_id, &config)
            .with_primer(prompt::thread_primer(persona));
        Ok(Self {
            config,
            api,
            conversation,
            persona,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!(
            "\nWelcome to Storyloom! Your host today is {}, {}.",
            self.persona.display_name(),
            self.persona.epithet()
        );

        loop {
            let quit = "Quit";
            let mut options: Vec<String> = WorkflowMode::ALL
                .iter()
                .map(|m| format!("{} - {}", m.display_name(), m.description()))
                .collect();
            options.push(quit.to_string());

            let selection = Select::new("\nWhat shall we make?", options.clone()).prompt()?;
            let Some(index) = options.iter().position(|o| *o == selection) else {
                continue;
            };
            if index >= WorkflowMode::ALL.len() {
                println!("Until next time!");
                return Ok(());
            }

            let mode = WorkflowMode::ALL[index];
            // Entering a mode always starts from fresh mode-local state.
            match ModeState::enter(mode) {
                ModeState::Guided(session) => self.run_guided(session).await?,
                ModeState::Direct(session) => self.run_direct(session).await?,
                ModeState::Serial(session) => self.run_serial(session).await?,
                ModeState::Visual(session) => self.run_visual(session).await?,
                ModeState::Comic(session) => self.run_comic(session).await?,
                ModeState::Adventure(session) => self.run_adventure(session).await?,
                ModeState::Chat(session) => self.run_chat(session).await?,
            }
        }
    }

    // --- Guided wizard ---

    async fn run_guided(&mut self, mut session: GuidedSession) -> Result<()> {
        session.begin()?;

        let form = select_from(
            "Step 1 - choose your literary style:",
            &LiteraryForm::ALL,
            |f| {
                format!(
                    "{} - {} ({} words)",
                    f.display_name(),
                    f.description(),
                    f.prompt_count()
                )
            },
        )?;
        session.select_style(form)?;

        let picked = select_from("Step 2 - pick your genre:", &Genre::ALL, |g| {
            format!(
                "[{}] {} - {}",
                g.group().display_name(),
                g.display_name(),
                g.description()
            )
        })?;
        let genre = picked.resolve_wild_card();
        if picked == Genre::WildCard {
            println!("Wild Card! You're getting: {}", genre.display_name());
        }
        session.select_genre(genre)?;

        let absurdity = select_from(
            "Step 3 - how weird do you want this to get?",
            &AbsurdityLevel::ALL,
            |l| format!("{} ({}/5) - {}", l.display_name(), l.level(), l.description()),
        )?;
        session.select_absurdity(absurdity)?;

        println!("\nStep 4 - word collection. I need {} words.", session.total_words());
        while let Some(slot) = session.next_slot() {
            let input = Text::new(&format!(
                "Word {} of {} - give me a {}:",
                session.word_index() + 1,
                session.total_words(),
                slot.label()
            ))
            .with_help_message(&format!("Examples: {}", slot.example()))
            .prompt()?;
            if let Err(e) = session.submit_word(&input) {
                println!("{}", e);
            }
        }

        println!("\nAll words collected! Your ingredients:");
        for tagged in prompt::labelled_words(session.collected_words()) {
            println!("  {}", tagged);
        }

        if !Confirm::new("Generate your story?")
            .with_default(true)
            .prompt()?
        {
            return Ok(());
        }
        session.advance_to_generation()?;

        loop {
            let Some(spec) = session.story_spec() else {
                return Ok(());
            };
            let Some(story) = self.generate("Weaving your story...", &prompt::story_prompt(&spec)).await
            else {
                if !self.ask_retry()? {
                    return Ok(());
                }
                continue;
            };
            session.story_displayed()?;
            println!(
                "\n=== Your {} ===\n\n{}\n",
                spec.form.display_name(),
                story
            );

            match self.action_menu("Generate another", "New story")? {
                Action::Regenerate => session.regenerate()?,
                Action::StartOver => {
                    session.reset();
                    self.reset_conversation().await;
                    return Ok(());
                }
                Action::Save => {
                    self.save_and_report("story.txt", &story)?;
                    return Ok(());
                }
                Action::Back => return Ok(()),
            }
        }
    }

    // --- Create Direct ---

    async fn run_direct(&mut self, mut session: DirectSession) -> Result<()> {
        loop {
            let topic = Text::new("Your story idea:")
                .with_help_message(
                    "Example: A detective who can only solve crimes by cooking the perfect meal",
                )
                .prompt()?;
            match session.set_topic(&topic) {
                Ok(()) => break,
                Err(e) => println!("{}", e),
            }
        }

        let any = "Any".to_string();
        let mut genre_options = vec![any.clone()];
        genre_options.extend(Genre::ALL.iter().map(|g| g.display_name().to_string()));
        let genre_pick = Select::new("Choose a genre (optional):", genre_options.clone()).prompt()?;
        session.genre = genre_options
            .iter()
            .position(|o| *o == genre_pick)
            .filter(|i| *i > 0)
            .map(|i| Genre::ALL[i - 1].resolve_wild_card());

        session.length = select_from("Story length:", &StoryLength::ALL, |l| {
            l.display_name().to_string()
        })?;

        loop {
            let request = prompt::direct_prompt(&session.topic, session.genre, session.length);
            let Some(story) = self.generate("Crafting your story...", &request).await else {
                if !self.ask_retry()? {
                    return Ok(());
                }
                continue;
            };
            session.displayed();
            println!("\n=== Your Story ===\n\n{}\n", story);

            match self.action_menu("Regenerate", "New story")? {
                Action::Regenerate => session.regenerate(),
                Action::StartOver => {
                    session.reset();
                    self.reset_conversation().await;
                    return Box::pin(self.run_direct(session)).await;
                }
                Action::Save => {
                    self.save_and_report("story.txt", &story)?;
                    return Ok(());
                }
                Action::Back => return Ok(()),
            }
        }
    }

    // --- Serial ---

    async fn run_serial(&mut self, mut session: SerialSession) -> Result<()> {
        loop {
            let premise = Text::new("Story premise:")
                .with_help_message(
                    "Setting, main character, and central conflict. Example: in a world where \
                     dreams are currency, a young dream-thief must steal the most valuable dream \
                     ever seen",
                )
                .prompt()?;
            let episodes = Select::new("Number of episodes:", vec!["2", "3", "4", "5"]).prompt()?;
            let total: usize = episodes.parse().unwrap_or(SerialSession::MIN_EPISODES);
            match session.begin(&premise, total) {
                Ok(()) => break,
                Err(e) => println!("{}", e),
            }
        }

        while session.has_more() {
            let number = session.next_episode_number();
            let banner = format!(
                "Writing Episode {} of {}...",
                number, session.total_episodes
            );
            let request = prompt::episode_prompt(&session);
            let Some(episode) = self.generate(&banner, &request).await else {
                if !self.ask_retry()? {
                    return Ok(());
                }
                continue;
            };
            println!(
                "\n=== Episode {} of {} ===\n\n{}\n",
                number, session.total_episodes, episode
            );
            session.push_episode(episode);

            if session.has_more() {
                let next = format!("Write Episode {}", session.next_episode_number());
                let rewrite = "Rewrite that episode";
                let save = "Save the story so far";
                let back = "Back to menu";
                loop {
                    let choice = Select::new(
                        "What next?",
                        vec![next.as_str(), rewrite, save, back],
                    )
                    .prompt()?;
                    if choice == next {
                        break;
                    } else if choice == rewrite {
                        session.pop_episode();
                        break;
                    } else if choice == save {
                        let compiled = session.compiled();
                        self.save_and_report("serial.txt", &compiled)?;
                    } else {
                        return Ok(());
                    }
                }
            }
        }

        println!("The serial is complete!");
        if Confirm::new("Save the full serial?")
            .with_default(true)
            .prompt()?
        {
            let compiled = session.compiled();
            self.save_and_report("serial.txt", &compiled)?;
        }
        Ok(())
    }

    // --- Scene Painter ---

    async fn run_visual(&mut self, mut session: VisualSession) -> Result<()> {
        loop {
            let story = Text::new("Your story:")
                .with_help_message("Paste a story or write a quick scene")
                .prompt()?;
            let style = select_from("Visual style:", &VisualStyle::ALL, |s| {
                s.display_name().to_string()
            })?;
            let scenes =
                Select::new("Number of scenes:", vec!["1", "2", "3", "4", "5", "6"]).prompt()?;
            let scenes: usize = scenes.parse().unwrap_or(3);
            match session.begin(&story, style, scenes) {
                Ok(()) => break,
                Err(e) => println!("{}", e),
            }
        }

        loop {
            let request = prompt::visual_prompt(&session);
            let Some(result) = self
                .generate("Sketching your visual prompts...", &request)
                .await
            else {
                if !self.ask_retry()? {
                    return Ok(());
                }
                continue;
            };
            println!("\n=== Your Visual Prompts ===\n\n{}\n", result);

            let regenerate = "Regenerate";
            let render = "Render an image from a prompt";
            let save = "Save the prompts";
            let back = "Back to menu";
            loop {
                let choice =
                    Select::new("What next?", vec![regenerate, render, save, back]).prompt()?;
                if choice == regenerate {
                    break;
                } else if choice == render {
                    self.render_image().await?;
                } else if choice == save {
                    self.save_and_report("visual_prompts.txt", &result)?;
                } else {
                    return Ok(());
                }
            }
        }
    }

    /// One-shot image generation; stateless, no polling.
    async fn render_image(&self) -> Result<()> {
        let image_prompt = Text::new("Image prompt:")
            .with_help_message("Paste one of the generated prompts, or write your own")
            .prompt()?;
        if image_prompt.trim().is_empty() {
            println!("Nothing to render.");
            return Ok(());
        }
        let size = Select::new("Size:", vec!["1024x1024", "1792x1024", "1024x1792"]).prompt()?;
        let style = Select::new("Style:", vec!["vivid", "natural"]).prompt()?;
        let quality = Select::new("Quality:", vec!["standard", "hd"]).prompt()?;

        let spinner = start_spinner("Rendering your image...");
        let result = self
            .api
            .generate_image(&ImageRequest {
                prompt: image_prompt.trim().to_string(),
                size: size.to_string(),
                style: style.to_string(),
                quality: quality.to_string(),
            })
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(image) => {
                println!("\nImage ready: {}", image.url);
                if let Some(revised) = image.revised_prompt {
                    println!("Revised prompt: {}", revised);
                }
            }
            Err(e) => {
                log::warn!("Image generation failed: {}", e);
                println!("Image generation failed: {}", e);
            }
        }
        Ok(())
    }

    // --- Comic Forge ---

    async fn run_comic(&mut self, mut session: ComicSession) -> Result<()> {
        loop {
            let concept = Text::new("Comic concept:")
                .with_help_message(
                    "Example: a superhero whose only power is making perfect toast",
                )
                .prompt()?;
            let panels = Select::new("Number of panels:", vec!["3", "4", "5", "6"]).prompt()?;
            let panels: usize = panels.parse().unwrap_or(4);
            let style = select_from("Comic style:", &ComicStyle::ALL, |s| {
                s.display_name().to_string()
            })?;
            match session.begin(&concept, panels, style) {
                Ok(()) => break,
                Err(e) => println!("{}", e),
            }
        }

        loop {
            let request = prompt::comic_prompt(&session);
            let Some(script) = self.generate("Inking your comic...", &request).await else {
                if !self.ask_retry()? {
                    return Ok(());
                }
                continue;
            };
            println!("\n=== Your Comic Script ===\n\n{}\n", script);

            match self.action_menu("Regenerate", "New comic")? {
                Action::Regenerate => {}
                Action::StartOver => {
                    self.reset_conversation().await;
                    return Box::pin(self.run_comic(ComicSession::new())).await;
                }
                Action::Save => {
                    self.save_and_report("comic_script.txt", &script)?;
                    return Ok(());
                }
                Action::Back => return Ok(()),
            }
        }
    }

    // --- Adventure ---

    async fn run_adventure(&mut self, mut session: AdventureSession) -> Result<()> {
        let setting = select_from("Choose your setting:", &AdventureSetting::ALL, |s| {
            format!("{} - {}", s.display_name(), s.description())
        })?;
        session.begin(setting);

        let request = prompt::adventure_opening(setting);
        let Some(opening) = self.generate("The story unfolds...", &request).await else {
            return Ok(());
        };
        println!("\n{}\n", opening);
        session.push_beat(opening);

        'adventure: loop {
            let choice = Text::new("Your choice:")
                .with_help_message(
                    "Enter 1, 2, 3, or describe your own action. Type /done to stop",
                )
                .prompt()?;
            if choice.trim() == "/done" {
                break;
            }
            if let Err(e) = session.push_choice(&choice) {
                println!("{}", e);
                continue;
            }

            let last_choice = session.last_choice().unwrap_or_default().to_string();
            loop {
                let request =
                    prompt::adventure_continuation(session.recent_history(), &last_choice);
                match self.generate("The story unfolds...", &request).await {
                    Some(beat) => {
                        println!("\n{}\n", beat);
                        session.push_beat(beat);
                        break;
                    }
                    None if self.ask_retry()? => continue,
                    None => break 'adventure,
                }
            }
        }

        if !session.history().is_empty()
            && Confirm::new("Save the adventure transcript?")
                .with_default(false)
                .prompt()?
        {
            let transcript = session.transcript();
            self.save_and_report("adventure.txt", &transcript)?;
        }
        Ok(())
    }

    // --- Free chat ---

    async fn run_chat(&mut self, mut session: ChatSession) -> Result<()> {
        println!(
            "\nChatting with {}. An empty message returns to the menu.",
            self.persona.display_name()
        );
        loop {
            let input = Text::new("You:").prompt()?;
            if input.trim().is_empty() {
                break;
            }
            session.record(ChatRole::User, input.trim().to_string());
            let Some(reply) = self.generate("Thinking...", input.trim()).await else {
                continue;
            };
            println!("\n{}: {}\n", self.persona.display_name(), reply);
            session.record(ChatRole::Host, reply);
        }

        if !session.transcript().is_empty()
            && Confirm::new("Save the chat transcript?")
                .with_default(false)
                .prompt()?
        {
            let rendered = session.rendered();
            self.save_and_report("chat.txt", &rendered)?;
        }
        Ok(())
    }

    // --- Shared plumbing ---

    /// Sends one prompt and blocks behind a spinner. Remote failures are
    /// reported to the user and swallowed; the caller decides whether to
    /// retry. Nothing here retries automatically.
    async fn generate(&mut self, banner: &str, request: &str) -> Option<String> {
        let spinner = start_spinner(banner);
        let result = self.conversation.send(request).await;
        spinner.finish_and_clear();
        match result {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("Generation failed: {}", e);
                println!("\n{}", friendly_error(&e));
                None
            }
        }
    }

    fn ask_retry(&self) -> Result<bool> {
        Ok(Confirm::new("Try again?").with_default(true).prompt()?)
    }

    fn action_menu(&self, regenerate_label: &str, start_over_label: &str) -> Result<Action> {
        let save = "Save to a file";
        let back = "Back to menu";
        let options = vec![regenerate_label, start_over_label, save, back];
        let choice = Select::new("What next?", options.clone()).prompt()?;
        let action = match options.iter().position(|o| *o == choice) {
            Some(0) => Action::Regenerate,
            Some(1) => Action::StartOver,
            Some(2) => Action::Save,
            _ => Action::Back,
        };
        Ok(action)
    }

    /// Fresh thread, so the next story does not inherit this one's context.
    async fn reset_conversation(&mut self) {
        match self.conversation.reset().await {
            Ok(id) => log::info!("Conversation reset, new thread {}", id),
            Err(e) => {
                // The stale handle is already dropped; a new thread will be
                // created lazily on the next send.
                log::warn!("Conversation reset failed: {}", e);
            }
        }
    }

    fn save_and_report(&self, filename: &str, text: &str) -> Result<()> {
        let path = save_text(&self.config.output_folder, filename, text)?;
        println!("Saved to {}", path.display());
        Ok(())
    }
}

/// Picks one item from a static catalog by rendering each entry to a line.
fn select_from<T: Copy>(
    message: &str,
    items: &[T],
    render: impl Fn(&T) -> String,
) -> Result<T> {
    let options: Vec<String> = items.iter().map(|item| render(item)).collect();
    let selection = Select::new(message, options.clone()).prompt()?;
    let index = options
        .iter()
        .position(|o| *o == selection)
        .unwrap_or_default();
    Ok(items[index])
}

fn start_spinner(banner: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(banner.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Remote failures become displayed text, never a crash.
fn friendly_error(error: &GenerationError) -> String {
    match error {
        GenerationError::RunFailed(reason) => {
            format!("I encountered an issue: {}. Let's try that again!", reason)
        }
        GenerationError::EmptyReply => {
            "I couldn't come up with a response. Please try again.".to_string()
        }
        GenerationError::UnexpectedStatus(status) => {
            format!("Unexpected status: {}. Please try again.", status)
        }
        GenerationError::Timeout(after) => format!(
            "The storyteller took longer than {:?} to answer. Please try again.",
            after
        ),
        GenerationError::Transport(e) => {
            format!("Something went wrong talking to the storyteller: {}", e)
        }
    }
}

pub fn save_text(output_folder: &str, filename: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_folder)
        .with_context(|| format!("Failed to create output folder {}", output_folder))?;
    let path = Path::new(output_folder).join(filename);
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_text_writes_under_output_folder() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path().join("stories");
        let folder = folder.to_string_lossy().to_string();
        let path = save_text(&folder, "story.txt", "Once upon a loom...")?;
        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read_to_string(&path)?, "Once upon a loom...");
        Ok(())
    }

    #[test]
    fn test_friendly_error_carries_provider_message() {
        let message = friendly_error(&GenerationError::RunFailed(
            "rate limit exceeded".to_string(),
        ));
        assert!(message.contains("rate limit exceeded"));
        let message = friendly_error(&GenerationError::UnexpectedStatus(
            crate::assistant::RunStatus::Expired,
        ));
        assert!(message.contains("expired"));
    }
}
