use thiserror::Error;

use crate::catalog::{
    AbsurdityLevel, AdventureSetting, ComicStyle, Genre, LiteraryForm, PromptSlot, StoryLength,
    VisualStyle, WorkflowMode,
};

// Session state for every workflow mode. Pure data and transition rules;
// nothing in this module performs I/O.

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("that action is not available in the {0:?} stage")]
    WrongStage(WizardStage),
    #[error("please enter a word")]
    EmptyInput,
    #[error("all {0} words are already collected")]
    WordsComplete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStage {
    Welcome,
    StyleSelect,
    GenreSelect,
    AbsurditySelect,
    WordCollection,
    StoryReady,
    StoryDisplayed,
}

/// The selections a completed wizard hands to the prompt assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySpec {
    pub form: LiteraryForm,
    pub genre: Genre,
    pub absurdity: AbsurdityLevel,
    pub words: Vec<String>,
}

/// Guided wizard: a strictly forward progression through the selection
/// stages, plus "reset" from anywhere and "regenerate" from the displayed
/// story back to ready.
#[derive(Debug, Clone)]
pub struct GuidedSession {
    stage: WizardStage,
    literary_form: Option<LiteraryForm>,
    genre: Option<Genre>,
    absurdity: Option<AbsurdityLevel>,
    collected_words: Vec<String>,
    word_index: usize,
    total_words: usize,
}

impl Default for GuidedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidedSession {
    pub fn new() -> Self {
        Self {
            stage: WizardStage::Welcome,
            literary_form: None,
            genre: None,
            absurdity: None,
            collected_words: Vec::new(),
            word_index: 0,
            total_words: 0,
        }
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.stage != WizardStage::Welcome {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.stage = WizardStage::StyleSelect;
        Ok(())
    }

    pub fn select_style(&mut self, form: LiteraryForm) -> Result<(), SessionError> {
        if self.stage != WizardStage::StyleSelect {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.literary_form = Some(form);
        self.total_words = form.prompt_count();
        self.word_index = 0;
        self.collected_words.clear();
        self.stage = WizardStage::GenreSelect;
        Ok(())
    }

    pub fn select_genre(&mut self, genre: Genre) -> Result<(), SessionError> {
        if self.stage != WizardStage::GenreSelect {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.genre = Some(genre);
        self.stage = WizardStage::AbsurditySelect;
        Ok(())
    }

    pub fn select_absurdity(&mut self, level: AbsurdityLevel) -> Result<(), SessionError> {
        if self.stage != WizardStage::AbsurditySelect {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.absurdity = Some(level);
        self.stage = WizardStage::WordCollection;
        Ok(())
    }

    /// Appends a trimmed word. Whitespace-only input is rejected without any
    /// state change. The wizard stays in WordCollection even once the final
    /// word lands; advancing to generation is a separate, explicit step.
    pub fn submit_word(&mut self, text: &str) -> Result<(), SessionError> {
        if self.stage != WizardStage::WordCollection {
            return Err(SessionError::WrongStage(self.stage));
        }
        if self.word_index >= self.total_words {
            return Err(SessionError::WordsComplete(self.total_words));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.collected_words.push(trimmed.to_string());
        self.word_index += 1;
        Ok(())
    }

    pub fn words_complete(&self) -> bool {
        self.stage == WizardStage::WordCollection && self.word_index == self.total_words
    }

    /// Category slot for the next word to collect, or None once all words
    /// are in.
    pub fn next_slot(&self) -> Option<PromptSlot> {
        if self.stage == WizardStage::WordCollection && self.word_index < self.total_words {
            Some(PromptSlot::for_index(self.word_index))
        } else {
            None
        }
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn collected_words(&self) -> &[String] {
        &self.collected_words
    }

    pub fn literary_form(&self) -> Option<LiteraryForm> {
        self.literary_form
    }

    pub fn genre(&self) -> Option<Genre> {
        self.genre
    }

    pub fn absurdity(&self) -> Option<AbsurdityLevel> {
        self.absurdity
    }

    pub fn advance_to_generation(&mut self) -> Result<(), SessionError> {
        if !self.words_complete() {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.stage = WizardStage::StoryReady;
        Ok(())
    }

    pub fn story_displayed(&mut self) -> Result<(), SessionError> {
        if self.stage != WizardStage::StoryReady {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.stage = WizardStage::StoryDisplayed;
        Ok(())
    }

    /// Keeps selections and words, allows a fresh generation call.
    pub fn regenerate(&mut self) -> Result<(), SessionError> {
        if self.stage != WizardStage::StoryDisplayed {
            return Err(SessionError::WrongStage(self.stage));
        }
        self.stage = WizardStage::StoryReady;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Complete selections for the assembler, only once every required
    /// choice and word is present.
    pub fn story_spec(&self) -> Option<StorySpec> {
        if !matches!(
            self.stage,
            WizardStage::StoryReady | WizardStage::StoryDisplayed
        ) {
            return None;
        }
        Some(StorySpec {
            form: self.literary_form?,
            genre: self.genre?,
            absurdity: self.absurdity?,
            words: self.collected_words.clone(),
        })
    }
}

// --- Create Direct ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectStage {
    Topic,
    Ready,
    Displayed,
}

#[derive(Debug, Clone)]
pub struct DirectSession {
    pub stage: DirectStage,
    pub topic: String,
    pub genre: Option<Genre>,
    pub length: StoryLength,
}

impl DirectSession {
    pub fn new() -> Self {
        Self {
            stage: DirectStage::Topic,
            topic: String::new(),
            genre: None,
            length: StoryLength::Medium,
        }
    }

    pub fn set_topic(&mut self, topic: &str) -> Result<(), SessionError> {
        let trimmed = topic.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.topic = trimmed.to_string();
        self.stage = DirectStage::Ready;
        Ok(())
    }

    pub fn displayed(&mut self) {
        self.stage = DirectStage::Displayed;
    }

    pub fn regenerate(&mut self) {
        self.stage = DirectStage::Ready;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// --- Serial (episodic) ---

#[derive(Debug, Clone)]
pub struct SerialSession {
    pub premise: String,
    pub total_episodes: usize,
    episodes: Vec<String>,
}

impl Default for SerialSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialSession {
    pub const MIN_EPISODES: usize = 2;
    pub const MAX_EPISODES: usize = 5;

    pub fn new() -> Self {
        Self {
            premise: String::new(),
            total_episodes: Self::MIN_EPISODES,
            episodes: Vec::new(),
        }
    }

    pub fn begin(&mut self, premise: &str, total_episodes: usize) -> Result<(), SessionError> {
        let trimmed = premise.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.premise = trimmed.to_string();
        self.total_episodes = total_episodes.clamp(Self::MIN_EPISODES, Self::MAX_EPISODES);
        self.episodes.clear();
        Ok(())
    }

    pub fn started(&self) -> bool {
        !self.premise.is_empty()
    }

    /// 1-based number of the episode to generate next.
    pub fn next_episode_number(&self) -> usize {
        self.episodes.len() + 1
    }

    pub fn next_is_final(&self) -> bool {
        self.next_episode_number() == self.total_episodes
    }

    pub fn has_more(&self) -> bool {
        self.episodes.len() < self.total_episodes
    }

    pub fn push_episode(&mut self, text: String) {
        self.episodes.push(text);
    }

    /// Drops the newest episode so it can be regenerated.
    pub fn pop_episode(&mut self) -> Option<String> {
        self.episodes.pop()
    }

    pub fn episodes(&self) -> &[String] {
        &self.episodes
    }

    /// The whole serial as one downloadable document.
    pub fn compiled(&self) -> String {
        self.episodes
            .iter()
            .enumerate()
            .map(|(i, ep)| format!("# Episode {}\n\n{}", i + 1, ep))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

// --- Scene Painter (visual prompts) ---

#[derive(Debug, Clone)]
pub struct VisualSession {
    pub story: String,
    pub style: VisualStyle,
    pub scenes: usize,
}

impl Default for VisualSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualSession {
    pub const MIN_SCENES: usize = 1;
    pub const MAX_SCENES: usize = 6;

    pub fn new() -> Self {
        Self {
            story: String::new(),
            style: VisualStyle::Cinematic,
            scenes: 3,
        }
    }

    pub fn begin(
        &mut self,
        story: &str,
        style: VisualStyle,
        scenes: usize,
    ) -> Result<(), SessionError> {
        let trimmed = story.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.story = trimmed.to_string();
        self.style = style;
        self.scenes = scenes.clamp(Self::MIN_SCENES, Self::MAX_SCENES);
        Ok(())
    }
}

// --- Comic Forge ---

#[derive(Debug, Clone)]
pub struct ComicSession {
    pub concept: String,
    pub panels: usize,
    pub style: ComicStyle,
}

impl Default for ComicSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ComicSession {
    pub const MIN_PANELS: usize = 3;
    pub const MAX_PANELS: usize = 6;

    pub fn new() -> Self {
        Self {
            concept: String::new(),
            panels: 4,
            style: ComicStyle::ClassicSuperhero,
        }
    }

    pub fn begin(
        &mut self,
        concept: &str,
        panels: usize,
        style: ComicStyle,
    ) -> Result<(), SessionError> {
        let trimmed = concept.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.concept = trimmed.to_string();
        self.panels = panels.clamp(Self::MIN_PANELS, Self::MAX_PANELS);
        self.style = style;
        Ok(())
    }
}

// --- Adventure ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Beat(String),
    Choice(String),
}

/// Interactive adventure: an append-only history of alternating story beats
/// and player choices. Entries are never mutated or removed once appended;
/// only a full reset clears the history.
#[derive(Debug, Clone, Default)]
pub struct AdventureSession {
    setting: Option<AdventureSetting>,
    history: Vec<HistoryEntry>,
}

impl AdventureSession {
    /// How many trailing history entries feed each continuation prompt.
    pub const CONTEXT_WINDOW: usize = 6;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, setting: AdventureSetting) {
        self.setting = Some(setting);
        self.history.clear();
    }

    pub fn setting(&self) -> Option<AdventureSetting> {
        self.setting
    }

    pub fn push_beat(&mut self, text: String) {
        self.history.push(HistoryEntry::Beat(text));
    }

    pub fn push_choice(&mut self, text: &str) -> Result<(), SessionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.history.push(HistoryEntry::Choice(trimmed.to_string()));
        Ok(())
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn recent_history(&self) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(Self::CONTEXT_WINDOW);
        &self.history[start..]
    }

    pub fn last_choice(&self) -> Option<&str> {
        self.history.iter().rev().find_map(|e| match e {
            HistoryEntry::Choice(c) => Some(c.as_str()),
            HistoryEntry::Beat(_) => None,
        })
    }

    /// Transcript of the whole run for saving.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(|e| match e {
                HistoryEntry::Beat(t) => t.clone(),
                HistoryEntry::Choice(c) => format!("> {}", c),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// --- Free chat ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Host,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Vec<(ChatRole, String)>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, role: ChatRole, text: String) {
        self.transcript.push((role, text));
    }

    pub fn transcript(&self) -> &[(ChatRole, String)] {
        &self.transcript
    }

    pub fn rendered(&self) -> String {
        self.transcript
            .iter()
            .map(|(role, text)| match role {
                ChatRole::User => format!("You: {}", text),
                ChatRole::Host => format!("Host: {}", text),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Mode-local state, built fully at mode entry and discarded on mode switch.
#[derive(Debug, Clone)]
pub enum ModeState {
    Guided(GuidedSession),
    Direct(DirectSession),
    Serial(SerialSession),
    Visual(VisualSession),
    Comic(ComicSession),
    Adventure(AdventureSession),
    Chat(ChatSession),
}

impl ModeState {
    pub fn enter(mode: WorkflowMode) -> Self {
        match mode {
            WorkflowMode::Guided => ModeState::Guided(GuidedSession::new()),
            WorkflowMode::Direct => ModeState::Direct(DirectSession::new()),
            WorkflowMode::Serial => ModeState::Serial(SerialSession::new()),
            WorkflowMode::Visual => ModeState::Visual(VisualSession::new()),
            WorkflowMode::Comic => ModeState::Comic(ComicSession::new()),
            WorkflowMode::Adventure => ModeState::Adventure(AdventureSession::new()),
            WorkflowMode::Chat => ModeState::Chat(ChatSession::new()),
        }
    }

    pub fn mode(&self) -> WorkflowMode {
        match self {
            ModeState::Guided(_) => WorkflowMode::Guided,
            ModeState::Direct(_) => WorkflowMode::Direct,
            ModeState::Serial(_) => WorkflowMode::Serial,
            ModeState::Visual(_) => WorkflowMode::Visual,
            ModeState::Comic(_) => WorkflowMode::Comic,
            ModeState::Adventure(_) => WorkflowMode::Adventure,
            ModeState::Chat(_) => WorkflowMode::Chat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard_at_word_collection(form: LiteraryForm) -> GuidedSession {
        let mut s = GuidedSession::new();
        s.begin().unwrap();
        s.select_style(form).unwrap();
        s.select_genre(Genre::Fantasy).unwrap();
        s.select_absurdity(AbsurdityLevel::Spicy).unwrap();
        s
    }

    #[test]
    fn test_select_style_sets_word_budget() {
        for form in LiteraryForm::ALL {
            let mut s = GuidedSession::new();
            s.begin().unwrap();
            s.select_style(form).unwrap();
            assert_eq!(s.total_words(), form.prompt_count());
            assert_eq!(s.word_index(), 0);
        }
    }

    #[test]
    fn test_word_count_invariant_holds_after_each_submit() {
        let mut s = wizard_at_word_collection(LiteraryForm::Vignettes);
        for i in 0..6 {
            s.submit_word(&format!("word{}", i)).unwrap();
            assert_eq!(s.collected_words().len(), s.word_index());
        }
        assert!(s.words_complete());
    }

    #[test]
    fn test_whitespace_word_rejected_without_state_change() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        s.submit_word("moon").unwrap();
        let before = s.word_index();
        assert_eq!(s.submit_word("   "), Err(SessionError::EmptyInput));
        assert_eq!(s.submit_word(""), Err(SessionError::EmptyInput));
        assert_eq!(s.word_index(), before);
        assert_eq!(s.collected_words().len(), before);
    }

    #[test]
    fn test_words_are_trimmed() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        s.submit_word("  moon  ").unwrap();
        assert_eq!(s.collected_words(), ["moon"]);
    }

    #[test]
    fn test_extra_word_rejected_once_complete() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        for w in ["moon", "cat", "silence"] {
            s.submit_word(w).unwrap();
        }
        assert_eq!(s.submit_word("extra"), Err(SessionError::WordsComplete(3)));
        assert_eq!(s.word_index(), 3);
    }

    #[test]
    fn test_haiku_completion_scenario() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        assert_eq!(s.total_words(), 3);
        for w in ["moon", "cat", "silence"] {
            s.submit_word(w).unwrap();
        }
        assert!(s.words_complete());
        assert_eq!(s.next_slot(), None);
        s.advance_to_generation().unwrap();
        assert_eq!(s.stage(), WizardStage::StoryReady);
        let spec = s.story_spec().unwrap();
        assert_eq!(spec.words, vec!["moon", "cat", "silence"]);
    }

    #[test]
    fn test_next_slot_follows_catalog_order() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        assert_eq!(s.next_slot(), Some(PromptSlot::Noun));
        s.submit_word("moon").unwrap();
        assert_eq!(s.next_slot(), Some(PromptSlot::Verb));
        s.submit_word("cat").unwrap();
        assert_eq!(s.next_slot(), Some(PromptSlot::Adjective));
    }

    #[test]
    fn test_operations_rejected_in_wrong_stage() {
        let mut s = GuidedSession::new();
        assert!(matches!(
            s.select_style(LiteraryForm::Haiku),
            Err(SessionError::WrongStage(WizardStage::Welcome))
        ));
        assert!(matches!(
            s.submit_word("moon"),
            Err(SessionError::WrongStage(WizardStage::Welcome))
        ));
        s.begin().unwrap();
        assert!(matches!(
            s.select_genre(Genre::Horror),
            Err(SessionError::WrongStage(WizardStage::StyleSelect))
        ));
    }

    #[test]
    fn test_advance_requires_all_words() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        s.submit_word("moon").unwrap();
        assert!(s.advance_to_generation().is_err());
        assert!(s.story_spec().is_none());
    }

    #[test]
    fn test_regenerate_keeps_selections() {
        let mut s = wizard_at_word_collection(LiteraryForm::Haiku);
        for w in ["moon", "cat", "silence"] {
            s.submit_word(w).unwrap();
        }
        s.advance_to_generation().unwrap();
        s.story_displayed().unwrap();
        s.regenerate().unwrap();
        assert_eq!(s.stage(), WizardStage::StoryReady);
        assert_eq!(s.collected_words().len(), 3);
        assert_eq!(s.literary_form(), Some(LiteraryForm::Haiku));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = wizard_at_word_collection(LiteraryForm::Ballads);
        s.submit_word("storm").unwrap();
        s.reset();
        assert_eq!(s.stage(), WizardStage::Welcome);
        assert_eq!(s.word_index(), 0);
        assert!(s.collected_words().is_empty());
        assert_eq!(s.literary_form(), None);
        assert_eq!(s.genre(), None);
        assert_eq!(s.absurdity(), None);
    }

    #[test]
    fn test_direct_session_rejects_blank_topic() {
        let mut s = DirectSession::new();
        assert_eq!(s.set_topic("  \n "), Err(SessionError::EmptyInput));
        assert_eq!(s.stage, DirectStage::Topic);
        s.set_topic("a detective who cooks").unwrap();
        assert_eq!(s.stage, DirectStage::Ready);
    }

    #[test]
    fn test_serial_session_counts_and_finale() {
        let mut s = SerialSession::new();
        s.begin("dream thief", 3).unwrap();
        assert_eq!(s.next_episode_number(), 1);
        assert!(!s.next_is_final());
        s.push_episode("ep1".to_string());
        s.push_episode("ep2".to_string());
        assert_eq!(s.next_episode_number(), 3);
        assert!(s.next_is_final());
        s.push_episode("ep3".to_string());
        assert!(!s.has_more());
        assert!(s.compiled().contains("# Episode 2"));
    }

    #[test]
    fn test_serial_episode_count_clamped() {
        let mut s = SerialSession::new();
        s.begin("premise", 99).unwrap();
        assert_eq!(s.total_episodes, SerialSession::MAX_EPISODES);
        s.begin("premise", 0).unwrap();
        assert_eq!(s.total_episodes, SerialSession::MIN_EPISODES);
        assert!(s.begin("  ", 3).is_err());
    }

    #[test]
    fn test_adventure_history_is_append_only_window() {
        let mut s = AdventureSession::new();
        s.begin(AdventureSetting::SpaceStation);
        for i in 0..5 {
            s.push_beat(format!("beat{}", i));
            s.push_choice(&format!("choice{}", i)).unwrap();
        }
        assert_eq!(s.history().len(), 10);
        let recent = s.recent_history();
        assert_eq!(recent.len(), AdventureSession::CONTEXT_WINDOW);
        assert_eq!(recent[0], HistoryEntry::Beat("beat2".to_string()));
        assert_eq!(s.last_choice(), Some("choice4"));
    }

    #[test]
    fn test_adventure_rejects_blank_choice() {
        let mut s = AdventureSession::new();
        s.begin(AdventureSetting::MysteryMansion);
        s.push_beat("opening".to_string());
        assert_eq!(s.push_choice("  "), Err(SessionError::EmptyInput));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_mode_state_enters_fresh_per_mode() {
        for mode in WorkflowMode::ALL {
            let state = ModeState::enter(mode);
            assert_eq!(state.mode(), mode);
        }
        match ModeState::enter(WorkflowMode::Guided) {
            ModeState::Guided(s) => assert_eq!(s.stage(), WizardStage::Welcome),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_chat_transcript_rendering() {
        let mut s = ChatSession::new();
        s.record(ChatRole::User, "hello".to_string());
        s.record(ChatRole::Host, "well met".to_string());
        let rendered = s.rendered();
        assert!(rendered.contains("You: hello"));
        assert!(rendered.contains("Host: well met"));
    }
}
