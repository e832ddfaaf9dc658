use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

// Static catalogs for the selection wizard. Every catalog is a closed enum
// with its metadata attached, so an unknown key is a compile error instead of
// a runtime lookup failure.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteraryForm {
    Vignettes,
    Limericks,
    Ballads,
    FlashFiction,
    Microfiction,
    Haiku,
    Listicle,
    WildCard,
}

impl LiteraryForm {
    pub const ALL: [LiteraryForm; 8] = [
        LiteraryForm::Vignettes,
        LiteraryForm::Limericks,
        LiteraryForm::Ballads,
        LiteraryForm::FlashFiction,
        LiteraryForm::Microfiction,
        LiteraryForm::Haiku,
        LiteraryForm::Listicle,
        LiteraryForm::WildCard,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LiteraryForm::Vignettes => "Vignettes",
            LiteraryForm::Limericks => "Limericks",
            LiteraryForm::Ballads => "Ballads",
            LiteraryForm::FlashFiction => "Flash Fiction",
            LiteraryForm::Microfiction => "Microfiction",
            LiteraryForm::Haiku => "Haiku",
            LiteraryForm::Listicle => "Listicle",
            LiteraryForm::WildCard => "Wild Card",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LiteraryForm::Vignettes => "Short, evocative scenes or moments",
            LiteraryForm::Limericks => "Humorous five-line poems with AABBA rhyme",
            LiteraryForm::Ballads => "Narrative poems or songs telling a story",
            LiteraryForm::FlashFiction => "Very short stories with complete narratives",
            LiteraryForm::Microfiction => "Ultra-short fiction, often under 100 words",
            LiteraryForm::Haiku => "Traditional 5-7-5 syllable poems",
            LiteraryForm::Listicle => "Humorous or surreal top-N lists",
            LiteraryForm::WildCard => "Anything goes - surprise me!",
        }
    }

    /// How many fill-in words this form collects.
    pub fn prompt_count(&self) -> usize {
        match self {
            LiteraryForm::Vignettes => 6,
            LiteraryForm::Limericks => 5,
            LiteraryForm::Ballads => 8,
            LiteraryForm::FlashFiction => 7,
            LiteraryForm::Microfiction => 4,
            LiteraryForm::Haiku => 3,
            LiteraryForm::Listicle => 6,
            LiteraryForm::WildCard => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreGroup {
    Core,
    Flexible,
    Signature,
}

impl GenreGroup {
    pub fn display_name(&self) -> &'static str {
        match self {
            GenreGroup::Core => "Core Genres",
            GenreGroup::Flexible => "Flexible Genres",
            GenreGroup::Signature => "Signature Genres",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    Adventure,
    Comedy,
    Drama,
    Fantasy,
    Historical,
    Horror,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    Absurdist,
    Satire,
    SliceOfLife,
    Surreal,
    Parody,
    Clockpunk,
    Intergalactic,
    CourtroomChaos,
    EpicQuest,
    WildCard,
}

impl Genre {
    pub const ALL: [Genre; 20] = [
        Genre::Adventure,
        Genre::Comedy,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Historical,
        Genre::Horror,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::Absurdist,
        Genre::Satire,
        Genre::SliceOfLife,
        Genre::Surreal,
        Genre::Parody,
        Genre::Clockpunk,
        Genre::Intergalactic,
        Genre::CourtroomChaos,
        Genre::EpicQuest,
        Genre::WildCard,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Genre::Adventure => "Adventure",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Historical => "Historical",
            Genre::Horror => "Horror",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Science Fiction",
            Genre::Thriller => "Thriller",
            Genre::Absurdist => "Absurdist",
            Genre::Satire => "Satire",
            Genre::SliceOfLife => "Slice of Life",
            Genre::Surreal => "Surreal",
            Genre::Parody => "Parody",
            Genre::Clockpunk => "Clockpunk",
            Genre::Intergalactic => "Intergalactic",
            Genre::CourtroomChaos => "Courtroom Chaos",
            Genre::EpicQuest => "Epic Quest",
            Genre::WildCard => "Wild Card Genre",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Genre::Adventure => "Exploration, danger, quests, and journey-based action",
            Genre::Comedy => "Stories designed to amuse through humor and exaggeration",
            Genre::Drama => "Realistic or heightened emotional conflicts",
            Genre::Fantasy => "Magical worlds, mythical beings, and alternate realities",
            Genre::Historical => "Fiction rooted in recognizable historical settings",
            Genre::Horror => "Evokes fear or dread through supernatural or psychological twists",
            Genre::Mystery => "Solving crimes, decoding clues, and uncovering secrets",
            Genre::Romance => "Stories centered on emotional and romantic connections",
            Genre::SciFi => "Advanced technology, space, and speculative futures",
            Genre::Thriller => "High-stakes, fast-paced tension with danger and survival",
            Genre::Absurdist => "Highlights the irrational and surreal, meaninglessness made funny",
            Genre::Satire => "Uses irony and exaggeration to critique real-world ideas",
            Genre::SliceOfLife => "Ordinary experiences, introspection, and quiet truths",
            Genre::Surreal => "Dream logic, symbolic imagery, and subconscious storytelling",
            Genre::Parody => "Imitates another genre or story type for humor",
            Genre::Clockpunk => "Retro-futurism powered by gears, brass, and improbable machines",
            Genre::Intergalactic => "Cosmic tales of star-sailors and alien fashion",
            Genre::CourtroomChaos => "Rogue judges, talking evidence, surprise juries",
            Genre::EpicQuest => "World-altering missions and chosen-one energy",
            Genre::WildCard => "Could be anything: ballad, telegram, prophecy, menu",
        }
    }

    pub fn group(&self) -> GenreGroup {
        match self {
            Genre::Adventure
            | Genre::Comedy
            | Genre::Drama
            | Genre::Fantasy
            | Genre::Historical
            | Genre::Horror
            | Genre::Mystery
            | Genre::Romance
            | Genre::SciFi
            | Genre::Thriller => GenreGroup::Core,
            Genre::Absurdist
            | Genre::Satire
            | Genre::SliceOfLife
            | Genre::Surreal
            | Genre::Parody => GenreGroup::Flexible,
            Genre::Clockpunk
            | Genre::Intergalactic
            | Genre::CourtroomChaos
            | Genre::EpicQuest
            | Genre::WildCard => GenreGroup::Signature,
        }
    }

    /// Wild Card resolves to a random concrete genre so the prompt always
    /// names something specific.
    pub fn resolve_wild_card(self) -> Genre {
        if self != Genre::WildCard {
            return self;
        }
        let concrete: Vec<Genre> = Genre::ALL
            .into_iter()
            .filter(|g| *g != Genre::WildCard)
            .collect();
        *concrete
            .choose(&mut rand::rng())
            .unwrap_or(&Genre::Comedy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbsurdityLevel {
    Mild,
    Moderate,
    Spicy,
    Chaotic,
    Pandemonium,
}

impl AbsurdityLevel {
    pub const ALL: [AbsurdityLevel; 5] = [
        AbsurdityLevel::Mild,
        AbsurdityLevel::Moderate,
        AbsurdityLevel::Spicy,
        AbsurdityLevel::Chaotic,
        AbsurdityLevel::Pandemonium,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AbsurdityLevel::Mild => "Mild",
            AbsurdityLevel::Moderate => "Moderate",
            AbsurdityLevel::Spicy => "Spicy",
            AbsurdityLevel::Chaotic => "Chaotic",
            AbsurdityLevel::Pandemonium => "Pandemonium",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AbsurdityLevel::Mild => "Mostly grounded with subtle quirks",
            AbsurdityLevel::Moderate => "Quirky but recognizable reality",
            AbsurdityLevel::Spicy => "Playful chaos with bent rules",
            AbsurdityLevel::Chaotic => "Gleeful nonsense, logic optional",
            AbsurdityLevel::Pandemonium => "Full cartoon logic, reality has left the chat",
        }
    }

    /// Ordinal 1 (grounded) through 5 (unhinged).
    pub fn level(&self) -> u8 {
        match self {
            AbsurdityLevel::Mild => 1,
            AbsurdityLevel::Moderate => 2,
            AbsurdityLevel::Spicy => 3,
            AbsurdityLevel::Chaotic => 4,
            AbsurdityLevel::Pandemonium => 5,
        }
    }
}

/// Host personas overlayed on the remote assistant's system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    Wit,
    Herald,
    Lark,
    Glitch,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Wit,
        Persona::Herald,
        Persona::Lark,
        Persona::Glitch,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::Wit => "Wit",
            Persona::Herald => "Herald",
            Persona::Lark => "Lark",
            Persona::Glitch => "Glitch",
        }
    }

    pub fn epithet(&self) -> &'static str {
        match self {
            Persona::Wit => "The Sharp-Tongued Story Instigator",
            Persona::Herald => "The Noble Narrator",
            Persona::Lark => "The Gentle Guide",
            Persona::Glitch => "The Glitch in the Story",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Persona::Wit => "Witty, observant, slyly self-aware. Delights in irony and meta-humor.",
            Persona::Herald => {
                "Grand, theatrical, and heroically earnest. Treats every tale as an epic."
            }
            Persona::Lark => {
                "Warm, encouraging, and softly playful. Perfect for younger audiences."
            }
            Persona::Glitch => {
                "Unpredictable, chaotic, delightfully broken. Embraces the unexpected."
            }
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            Persona::Wit => "Crisp, articulate, and rhythmically punchy",
            Persona::Herald => "Dramatic, sweeping, chivalric",
            Persona::Lark => "Supportive, gentle, whimsical",
            Persona::Glitch => "Erratic, surprising, glitchy",
        }
    }

    pub fn style_tags(&self) -> &'static [&'static str] {
        match self {
            Persona::Wit => &["sarcastic", "clever", "meta-aware"],
            Persona::Herald => &["noble", "dramatic", "earnest"],
            Persona::Lark => &["kind", "supportive", "whimsical"],
            Persona::Glitch => &["chaotic", "random", "broken"],
        }
    }

    pub fn from_key(key: &str) -> Option<Persona> {
        match key.to_ascii_lowercase().as_str() {
            "wit" => Some(Persona::Wit),
            "herald" => Some(Persona::Herald),
            "lark" => Some(Persona::Lark),
            "glitch" => Some(Persona::Glitch),
            _ => None,
        }
    }
}

/// Word categories consumed round-robin during word collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSlot {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Place,
    Emotion,
    Food,
    Animal,
    Occupation,
    Exclamation,
}

impl PromptSlot {
    pub const ALL: [PromptSlot; 10] = [
        PromptSlot::Noun,
        PromptSlot::Verb,
        PromptSlot::Adjective,
        PromptSlot::Adverb,
        PromptSlot::Place,
        PromptSlot::Emotion,
        PromptSlot::Food,
        PromptSlot::Animal,
        PromptSlot::Occupation,
        PromptSlot::Exclamation,
    ];

    /// Category for the i-th collected word (0-indexed). The catalog cycles,
    /// so word 10 reuses the category of word 0.
    pub fn for_index(index: usize) -> PromptSlot {
        PromptSlot::ALL[index % PromptSlot::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromptSlot::Noun => "Noun",
            PromptSlot::Verb => "Verb",
            PromptSlot::Adjective => "Adjective",
            PromptSlot::Adverb => "Adverb",
            PromptSlot::Place => "Place",
            PromptSlot::Emotion => "Emotion",
            PromptSlot::Food => "Food",
            PromptSlot::Animal => "Animal",
            PromptSlot::Occupation => "Occupation",
            PromptSlot::Exclamation => "Exclamation",
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            PromptSlot::Noun => "elephant, spaceship, toaster",
            PromptSlot::Verb => "dance, explode, whisper",
            PromptSlot::Adjective => "sparkly, grumpy, enormous",
            PromptSlot::Adverb => "slowly, dramatically, secretly",
            PromptSlot::Place => "library, volcano, Mars",
            PromptSlot::Emotion => "joy, confusion, mild panic",
            PromptSlot::Food => "tacos, cheesecake, pickle",
            PromptSlot::Animal => "penguin, dragon, capybara",
            PromptSlot::Occupation => "astronaut, baker, ninja",
            PromptSlot::Exclamation => "Yikes!, Hooray!, Oh dear!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    Guided,
    Direct,
    Serial,
    Visual,
    Comic,
    Adventure,
    Chat,
}

impl WorkflowMode {
    pub const ALL: [WorkflowMode; 7] = [
        WorkflowMode::Guided,
        WorkflowMode::Direct,
        WorkflowMode::Serial,
        WorkflowMode::Visual,
        WorkflowMode::Comic,
        WorkflowMode::Adventure,
        WorkflowMode::Chat,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowMode::Guided => "Story Wizard",
            WorkflowMode::Direct => "Create Direct",
            WorkflowMode::Serial => "Serial",
            WorkflowMode::Visual => "Scene Painter",
            WorkflowMode::Comic => "Comic Forge",
            WorkflowMode::Adventure => "Adventure",
            WorkflowMode::Chat => "Free Chat",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WorkflowMode::Guided => "Guided fill-in-the-blanks story creation",
            WorkflowMode::Direct => "Free-form story creation with guidance",
            WorkflowMode::Serial => "Multi-part episodic storytelling",
            WorkflowMode::Visual => "Turn a story into image-generation prompts",
            WorkflowMode::Comic => "Panel-by-panel comic script generation",
            WorkflowMode::Adventure => "Interactive choose-your-own adventure",
            WorkflowMode::Chat => "Free-form chat with your host",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryLength {
    Short,
    Medium,
    Long,
}

impl StoryLength {
    pub const ALL: [StoryLength; 3] = [
        StoryLength::Short,
        StoryLength::Medium,
        StoryLength::Long,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            StoryLength::Short => "Short (about 100 words)",
            StoryLength::Medium => "Medium (about 300 words)",
            StoryLength::Long => "Long (500+ words)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualStyle {
    Cartoon,
    Cinematic,
    Anime,
    Watercolor,
    Noir,
    Whimsical,
}

impl VisualStyle {
    pub const ALL: [VisualStyle; 6] = [
        VisualStyle::Cartoon,
        VisualStyle::Cinematic,
        VisualStyle::Anime,
        VisualStyle::Watercolor,
        VisualStyle::Noir,
        VisualStyle::Whimsical,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            VisualStyle::Cartoon => "Comic/Cartoon",
            VisualStyle::Cinematic => "Cinematic/Realistic",
            VisualStyle::Anime => "Anime/Manga",
            VisualStyle::Watercolor => "Watercolor/Artistic",
            VisualStyle::Noir => "Dark/Noir",
            VisualStyle::Whimsical => "Whimsical/Fantasy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComicStyle {
    ClassicSuperhero,
    Manga,
    Indie,
    NewspaperStrip,
    GraphicNovel,
}

impl ComicStyle {
    pub const ALL: [ComicStyle; 5] = [
        ComicStyle::ClassicSuperhero,
        ComicStyle::Manga,
        ComicStyle::Indie,
        ComicStyle::NewspaperStrip,
        ComicStyle::GraphicNovel,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ComicStyle::ClassicSuperhero => "Classic Superhero",
            ComicStyle::Manga => "Manga/Anime",
            ComicStyle::Indie => "Indie/Alternative",
            ComicStyle::NewspaperStrip => "Newspaper Strip",
            ComicStyle::GraphicNovel => "Graphic Novel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdventureSetting {
    FantasyKingdom,
    SpaceStation,
    MysteryMansion,
    TropicalIsland,
    CyberpunkCity,
}

impl AdventureSetting {
    pub const ALL: [AdventureSetting; 5] = [
        AdventureSetting::FantasyKingdom,
        AdventureSetting::SpaceStation,
        AdventureSetting::MysteryMansion,
        AdventureSetting::TropicalIsland,
        AdventureSetting::CyberpunkCity,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AdventureSetting::FantasyKingdom => "Fantasy Kingdom",
            AdventureSetting::SpaceStation => "Space Station",
            AdventureSetting::MysteryMansion => "Mystery Mansion",
            AdventureSetting::TropicalIsland => "Tropical Island",
            AdventureSetting::CyberpunkCity => "Cyberpunk City",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdventureSetting::FantasyKingdom => {
                "A magical realm with dragons, wizards, and ancient prophecies"
            }
            AdventureSetting::SpaceStation => {
                "A futuristic space station at the edge of known space"
            }
            AdventureSetting::MysteryMansion => {
                "A spooky Victorian mansion with secrets in every room"
            }
            AdventureSetting::TropicalIsland => {
                "A mysterious island with hidden treasures and strange inhabitants"
            }
            AdventureSetting::CyberpunkCity => {
                "A neon-lit metropolis where technology and humanity blur"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_counts() {
        assert_eq!(LiteraryForm::Haiku.prompt_count(), 3);
        assert_eq!(LiteraryForm::Ballads.prompt_count(), 8);
        assert_eq!(LiteraryForm::Microfiction.prompt_count(), 4);
        for form in LiteraryForm::ALL {
            assert!(form.prompt_count() >= 3 && form.prompt_count() <= 8);
        }
    }

    #[test]
    fn test_slot_catalog_cycles() {
        assert_eq!(PromptSlot::for_index(0), PromptSlot::Noun);
        assert_eq!(PromptSlot::for_index(1), PromptSlot::Verb);
        assert_eq!(PromptSlot::for_index(9), PromptSlot::Exclamation);
        // Word 10 reuses the category of word 0.
        assert_eq!(PromptSlot::for_index(10), PromptSlot::for_index(0));
        assert_eq!(PromptSlot::for_index(21), PromptSlot::Verb);
    }

    #[test]
    fn test_absurdity_ordinals() {
        let levels: Vec<u8> = AbsurdityLevel::ALL.iter().map(|l| l.level()).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_genre_groups_cover_all() {
        let core = Genre::ALL.iter().filter(|g| g.group() == GenreGroup::Core);
        assert_eq!(core.count(), 10);
        let flexible = Genre::ALL
            .iter()
            .filter(|g| g.group() == GenreGroup::Flexible);
        assert_eq!(flexible.count(), 5);
    }

    #[test]
    fn test_wild_card_resolves_to_concrete_genre() {
        for _ in 0..20 {
            assert_ne!(Genre::WildCard.resolve_wild_card(), Genre::WildCard);
        }
        assert_eq!(Genre::Horror.resolve_wild_card(), Genre::Horror);
    }

    #[test]
    fn test_persona_from_key() {
        assert_eq!(Persona::from_key("wit"), Some(Persona::Wit));
        assert_eq!(Persona::from_key("GLITCH"), Some(Persona::Glitch));
        assert_eq!(Persona::from_key("nobody"), None);
    }
}
