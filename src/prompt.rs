use crate::catalog::{AdventureSetting, Genre, Persona, PromptSlot, StoryLength, VisualStyle};
use crate::session::{ComicSession, HistoryEntry, SerialSession, StorySpec, VisualSession};

// Prompt assembly. Every function here is pure and deterministic: the same
// selections always produce the same instruction string, and nothing touches
// the network.

/// How much of each prior episode is quoted back when generating the next one.
const EPISODE_SUMMARY_CHARS: usize = 200;

/// System prompt installed on the remote assistant, flavored by the host
/// persona.
pub fn system_prompt(persona: Persona) -> String {
    format!(
        "STORYLOOM MASTER SYSTEM PROMPT\n\
         \n\
         0. SYSTEM IDENTITY & SCOPE\n\
         You are {name}, {epithet}, operating exclusively within the Storyloom platform.\n\
         Your role is to host, guide, and generate interactive creative experiences \
         (stories, prompts, images, and remixes) while enforcing platform rules, \
         safety standards, flow order, and user ownership.\n\
         You are not an author. You are a host, guide, and facilitator of user creativity.\n\
         \n\
         PERSONA TRAITS:\n\
         - Tone: {tone}\n\
         - Style: {tags}\n\
         - Description: {description}\n\
         \n\
         1. GUIDED WORKFLOW\n\
         When asked for a story, the request will name a literary form, a genre, an \
         absurdity level, and a set of user-provided words. The story MUST clearly read \
         as the selected genre, match the absurdity level, use the literary form's \
         structure, and incorporate ALL user-provided words naturally.\n\
         \n\
         2. SAFETY & USER AGENCY\n\
         - All content must be age-appropriate.\n\
         - Never claim authorship; the user is the creator.\n\
         - Guide and suggest, never override.\n\
         \n\
         3. RESPONSE FORMAT\n\
         - Keep responses conversational and engaging.\n\
         - Use light markup (bold, lists) only where it helps.",
        name = persona.display_name(),
        epithet = persona.epithet(),
        tone = persona.tone(),
        tags = persona.style_tags().join(", "),
        description = persona.description(),
    )
}

/// Primer sent as the first message on a fresh thread, asking the assistant
/// to acknowledge the system context before any story request.
pub fn thread_primer(persona: Persona) -> String {
    format!(
        "[SYSTEM CONTEXT]\n{}\n\nPlease acknowledge you understand and are ready to \
         generate stories.",
        system_prompt(persona)
    )
}

/// Each collected word tagged with its round-robin category label.
pub fn labelled_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| format!("{}: {}", PromptSlot::for_index(i).label(), word))
        .collect()
}

/// Guided-wizard story request. Callers must supply complete selections;
/// the session only yields a `StorySpec` once every stage is done.
pub fn story_prompt(spec: &StorySpec) -> String {
    let form = spec.form.display_name();
    let genre = spec.genre.display_name();
    let absurdity = spec.absurdity.display_name();
    format!(
        "Generate a {form} story in the {genre} genre.\n\
         \n\
         **Absurdity Level:** {absurdity} ({level} of 5: {level_desc})\n\
         \n\
         **Words to incorporate:**\n{words}\n\
         \n\
         Remember to:\n\
         1. Use the {form} literary form structure\n\
         2. Make it clearly read as {genre}\n\
         3. Match the {absurdity} absurdity level\n\
         4. Naturally incorporate ALL the provided words\n\
         5. Be creative, engaging, and entertaining!",
        form = form,
        genre = genre,
        absurdity = absurdity,
        level = spec.absurdity.level(),
        level_desc = spec.absurdity.description(),
        words = labelled_words(&spec.words).join("\n"),
    )
}

/// Free-form creation request.
pub fn direct_prompt(topic: &str, genre: Option<Genre>, length: StoryLength) -> String {
    let genre_text = match genre {
        Some(g) => format!(" in the {} genre", g.display_name()),
        None => String::new(),
    };
    format!(
        "Create a story based on this concept{genre_text}:\n\
         \n\
         **Concept:** {topic}\n\
         \n\
         **Length:** {length}\n\
         \n\
         Write an engaging, creative story that brings this idea to life. \
         Be vivid, entertaining, and surprising!",
        genre_text = genre_text,
        topic = topic,
        length = length.display_name(),
    )
}

fn truncated_summary(text: &str) -> String {
    if text.chars().count() <= EPISODE_SUMMARY_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(EPISODE_SUMMARY_CHARS).collect();
        format!("{}...", head)
    }
}

/// Request for the next episode of a serial. The opening episode introduces
/// the conflict, middle episodes raise the stakes and end on a hook, and the
/// final episode resolves the conflict. Episode N embeds a truncated summary
/// of every prior episode plus the original premise.
pub fn episode_prompt(serial: &SerialSession) -> String {
    let number = serial.next_episode_number();
    let total = serial.total_episodes;
    let premise = &serial.premise;

    let previous_context = if serial.episodes().is_empty() {
        String::new()
    } else {
        let summaries = serial
            .episodes()
            .iter()
            .enumerate()
            .map(|(i, ep)| format!("Episode {}: {}", i + 1, truncated_summary(ep)))
            .collect::<Vec<_>>()
            .join("\n---\n");
        format!("\n\nPrevious episodes summary:\n{}", summaries)
    };

    if number == 1 {
        format!(
            "Create Episode 1 of a {total}-part story series.\n\
             \n\
             **Premise:** {premise}\n\
             \n\
             Write an engaging opening episode that:\n\
             - Introduces the main character(s) and setting\n\
             - Establishes the central conflict\n\
             - Ends with a hook that makes readers want more\n\
             \n\
             Keep it around 300-400 words. End with \"TO BE CONTINUED...\"",
        )
    } else if number == total {
        format!(
            "Create the FINAL Episode ({number}) of a {total}-part story series.\n\
             \n\
             **Original Premise:** {premise}{previous_context}\n\
             \n\
             Write a satisfying conclusion that:\n\
             - Resolves the main conflict\n\
             - Provides character growth and payoff\n\
             - Delivers a memorable ending\n\
             \n\
             Keep it around 400-500 words.",
        )
    } else {
        format!(
            "Create Episode {number} of a {total}-part story series.\n\
             \n\
             **Original Premise:** {premise}{previous_context}\n\
             \n\
             Write this middle episode so that it:\n\
             - Continues the story naturally\n\
             - Raises the stakes or introduces complications\n\
             - Ends with a cliffhanger or hook\n\
             \n\
             Keep it around 300-400 words. End with \"TO BE CONTINUED...\"",
        )
    }
}

/// Extracts image-generation prompts for key scenes of a story.
pub fn visual_prompt(session: &VisualSession) -> String {
    format!(
        "Analyze this story and create {scenes} detailed image generation prompts \
         for key visual moments.\n\
         \n\
         **Story:**\n{story}\n\
         \n\
         **Visual Style:** {style}\n\
         \n\
         For each scene, provide:\n\
         1. **Scene Title:** A short descriptive title\n\
         2. **Image Prompt:** A detailed prompt suitable for an image generator \
         (include composition, lighting, mood, style details)\n\
         3. **Caption:** A short caption for the scene\n\
         \n\
         Format each as a clear, numbered panel. Make prompts vivid and specific!",
        scenes = session.scenes,
        story = session.story,
        style = session.style.display_name(),
    )
}

/// Panel-by-panel comic script request.
pub fn comic_prompt(session: &ComicSession) -> String {
    format!(
        "Create a {panels}-panel comic story in {style} style.\n\
         \n\
         **Concept:** {concept}\n\
         \n\
         For each panel, provide:\n\
         1. **Panel Number**\n\
         2. **Visual Description:** What we see (characters, setting, action, expressions)\n\
         3. **Dialogue/Caption:** Speech bubbles or narrative captions\n\
         4. **Panel Notes:** Composition, camera angle, mood\n\
         \n\
         Make it dynamic, expressive, and tell a complete mini-story with a \
         satisfying ending or punchline!",
        panels = session.panels,
        style = session.style.display_name(),
        concept = session.concept,
    )
}

const ADVENTURE_CHOICE_FORMAT: &str = "Format:\n\
    [Story paragraphs]\n\
    \n\
    What do you do?\n\
    1. [First choice]\n\
    2. [Second choice]\n\
    3. [Third choice]";

/// Opening beat of an interactive adventure.
pub fn adventure_opening(setting: AdventureSetting) -> String {
    format!(
        "Start an interactive adventure story in this setting: {name} - {description}\n\
         \n\
         Write an engaging opening scene (2-3 paragraphs) that:\n\
         - Sets the atmosphere and introduces the protagonist\n\
         - Creates immediate intrigue or tension\n\
         - Ends with exactly 3 numbered choices for what the player does next\n\
         \n\
         {format}",
        name = setting.display_name(),
        description = setting.description(),
        format = ADVENTURE_CHOICE_FORMAT,
    )
}

/// Continuation beat built from the trailing history window plus the latest
/// player choice.
pub fn adventure_continuation(history: &[HistoryEntry], last_choice: &str) -> String {
    let context = history
        .iter()
        .map(|entry| match entry {
            HistoryEntry::Beat(text) => format!("Story: {}", text),
            HistoryEntry::Choice(text) => format!("Player chose: {}", text),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Continue the interactive adventure:\n\
         \n\
         Previous context:\n{context}\n\
         \n\
         The player chose: {last_choice}\n\
         \n\
         Write the next scene (2-3 paragraphs) that:\n\
         - Responds meaningfully to their choice\n\
         - Advances the story with new developments\n\
         - Ends with exactly 3 numbered choices\n\
         \n\
         {format}",
        context = context,
        last_choice = last_choice,
        format = ADVENTURE_CHOICE_FORMAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AbsurdityLevel, ComicStyle, LiteraryForm};

    fn haiku_spec() -> StorySpec {
        StorySpec {
            form: LiteraryForm::Haiku,
            genre: Genre::Fantasy,
            absurdity: AbsurdityLevel::Spicy,
            words: vec!["moon".to_string(), "cat".to_string(), "silence".to_string()],
        }
    }

    #[test]
    fn test_story_prompt_tags_words_with_categories() {
        let prompt = story_prompt(&haiku_spec());
        assert!(prompt.contains("Noun: moon"));
        assert!(prompt.contains("Verb: cat"));
        assert!(prompt.contains("Adjective: silence"));
        assert!(prompt.contains("Haiku"));
        assert!(prompt.contains("Fantasy"));
        assert!(prompt.contains("Spicy"));
    }

    #[test]
    fn test_story_prompt_is_deterministic() {
        let spec = haiku_spec();
        assert_eq!(story_prompt(&spec), story_prompt(&spec));
    }

    #[test]
    fn test_labelled_words_cycle_past_catalog_length() {
        let words: Vec<String> = (0..11).map(|i| format!("w{}", i)).collect();
        let labelled = labelled_words(&words);
        assert_eq!(labelled[0], "Noun: w0");
        assert_eq!(labelled[10], "Noun: w10");
        assert_eq!(labelled[9], "Exclamation: w9");
    }

    #[test]
    fn test_direct_prompt_with_and_without_genre() {
        let with = direct_prompt("a detective who cooks", Some(Genre::Mystery), StoryLength::Short);
        assert!(with.contains("in the Mystery genre"));
        assert!(with.contains("about 100 words"));
        let without = direct_prompt("a detective who cooks", None, StoryLength::Long);
        assert!(!without.contains("genre:"));
        assert!(without.contains("a detective who cooks"));
    }

    #[test]
    fn test_episode_prompt_templates() {
        let mut serial = SerialSession::new();
        serial.begin("dream thief saves sister", 3).unwrap();

        let opening = episode_prompt(&serial);
        assert!(opening.contains("Episode 1 of a 3-part"));
        assert!(opening.contains("TO BE CONTINUED"));

        serial.push_episode("Episode one text.".to_string());
        let middle = episode_prompt(&serial);
        assert!(middle.contains("Create Episode 2"));
        assert!(middle.contains("Raises the stakes"));
        assert!(middle.contains("cliffhanger"));

        serial.push_episode("Episode two text.".to_string());
        let last = episode_prompt(&serial);
        assert!(last.contains("FINAL Episode (3)"));
        assert!(last.contains("Resolves the main conflict"));
        assert!(!last.contains("TO BE CONTINUED"));
        // Final prompt embeds summaries of both prior episodes and the premise.
        assert!(last.contains("Episode 1: Episode one text."));
        assert!(last.contains("Episode 2: Episode two text."));
        assert!(last.contains("dream thief saves sister"));
    }

    #[test]
    fn test_episode_summaries_are_truncated() {
        let mut serial = SerialSession::new();
        serial.begin("premise", 3).unwrap();
        serial.push_episode("x".repeat(500));
        let prompt = episode_prompt(&serial);
        let summary = format!("Episode 1: {}...", "x".repeat(200));
        assert!(prompt.contains(&summary));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_visual_prompt_contents() {
        let mut session = VisualSession::new();
        session
            .begin("A frog ascends the throne.", VisualStyle::Noir, 4)
            .unwrap();
        let prompt = visual_prompt(&session);
        assert!(prompt.contains("create 4 detailed image generation prompts"));
        assert!(prompt.contains("Dark/Noir"));
        assert!(prompt.contains("A frog ascends the throne."));
    }

    #[test]
    fn test_comic_prompt_contents() {
        let mut session = ComicSession::new();
        session
            .begin("toast-powered superhero", 5, ComicStyle::NewspaperStrip)
            .unwrap();
        let prompt = comic_prompt(&session);
        assert!(prompt.contains("5-panel comic"));
        assert!(prompt.contains("Newspaper Strip"));
        assert!(prompt.contains("toast-powered superhero"));
    }

    #[test]
    fn test_adventure_prompts() {
        let opening = adventure_opening(AdventureSetting::CyberpunkCity);
        assert!(opening.contains("Cyberpunk City"));
        assert!(opening.contains("exactly 3 numbered choices"));

        let history = vec![
            HistoryEntry::Beat("You wake in a neon alley.".to_string()),
            HistoryEntry::Choice("run".to_string()),
        ];
        let next = adventure_continuation(&history, "run");
        assert!(next.contains("Story: You wake in a neon alley."));
        assert!(next.contains("Player chose: run"));
        assert!(next.contains("The player chose: run"));
    }

    #[test]
    fn test_system_prompt_carries_persona() {
        let prompt = system_prompt(Persona::Herald);
        assert!(prompt.contains("Herald"));
        assert!(prompt.contains("The Noble Narrator"));
        assert!(prompt.contains("noble, dramatic, earnest"));
        let primer = thread_primer(Persona::Herald);
        assert!(primer.starts_with("[SYSTEM CONTEXT]"));
        assert!(primer.contains("ready to"));
    }
}
