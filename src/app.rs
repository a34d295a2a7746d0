use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::warn;
use vidspark_core::request::{GOALS, MOODS, PEOPLE};
use vidspark_core::{
    Action, Config, HttpBackend, IdeaBackend, IdeaForm, Language, Notice, Outcome, Platform,
    Session, Theme,
};

use crate::tui::{AppEvent, BackendResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Form,
    Result,
    Refine,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Form => FocusPane::Result,
            FocusPane::Result => FocusPane::Refine,
            FocusPane::Refine => FocusPane::Form,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Business,
    Platform,
    Mood,
    Goal,
    People,
    Language,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Business,
        FormField::Platform,
        FormField::Mood,
        FormField::Goal,
        FormField::People,
        FormField::Language,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Business => "Business",
            FormField::Platform => "Platform",
            FormField::Mood => "Video feeling",
            FormField::Goal => "Goal",
            FormField::People => "People in video",
            FormField::Language => "Language",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextInput {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub theme: Theme,

    // Form state
    pub form_field: FormField,
    pub business_input: TextInput,
    pub platform: Platform,
    pub mood: &'static str,
    pub goal: &'static str,
    pub people: &'static str,
    pub language: Language,

    // Refinement input
    pub refine_input: TextInput,

    // Result view
    pub result_scroll: u16,
    pub result_area: Option<Rect>,

    // Popup notice (errors, upsell, confirmations)
    pub notice: Option<Notice>,
    // Transient footer message ("Copied!")
    pub flash: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Requests
    pub session: Session,
    pub backend: HttpBackend,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        config: &Config,
        backend: HttpBackend,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Form,
            theme: config.theme,

            form_field: FormField::Business,
            business_input: TextInput::default(),
            platform: config.default_platform,
            mood: MOODS[0],
            goal: GOALS[0],
            people: PEOPLE[0],
            language: config.default_language,

            refine_input: TextInput::default(),

            result_scroll: 0,
            result_area: None,

            notice: None,
            flash: None,

            animation_frame: 0,

            session: Session::new(),
            backend,
            events,
        }
    }

    pub fn form(&self) -> IdeaForm {
        IdeaForm {
            business_type: self.business_input.value.clone(),
            platform: self.platform,
            mood: self.mood.to_string(),
            goal: self.goal.to_string(),
            people: self.people.to_string(),
            language: self.language,
        }
    }

    /// Value shown for a selector field.
    pub fn field_value(&self, field: FormField) -> &str {
        match field {
            FormField::Business => &self.business_input.value,
            FormField::Platform => self.platform.display_name(),
            FormField::Mood => self.mood,
            FormField::Goal => self.goal,
            FormField::People => self.people,
            FormField::Language => self.language.display_name(),
        }
    }

    /// Step the selected form field's option.
    pub fn cycle_field(&mut self, forward: bool) {
        match self.form_field {
            FormField::Business => {}
            FormField::Platform => {
                self.platform = cycle(&Platform::all(), self.platform, forward)
            }
            FormField::Mood => self.mood = cycle(MOODS, self.mood, forward),
            FormField::Goal => self.goal = cycle(GOALS, self.goal, forward),
            FormField::People => self.people = cycle(PEOPLE, self.people, forward),
            FormField::Language => {
                self.language = cycle(&Language::all(), self.language, forward)
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = Config::save_theme(self.theme) {
            warn!(error = %e, "could not persist theme");
        }
    }

    pub fn start_generate(&mut self) {
        match self.session.begin_generate(&self.form()) {
            Ok(request) => {
                self.refine_input.clear();
                let backend = self.backend.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let result = backend.generate(&request).await;
                    let _ = tx.send(AppEvent::Response(BackendResponse::Generation(
                        Action::Generate,
                        result,
                    )));
                });
            }
            Err(notice) => self.notice = Some(notice),
        }
    }

    pub fn start_refine(&mut self) {
        match self.session.begin_refine(&self.form(), &self.refine_input.value) {
            Ok(Some(request)) => {
                let backend = self.backend.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let result = backend.generate(&request).await;
                    let _ = tx.send(AppEvent::Response(BackendResponse::Generation(
                        Action::Refine,
                        result,
                    )));
                });
            }
            Ok(None) => {}
            Err(notice) => self.notice = Some(notice),
        }
    }

    pub fn start_subscribe(&mut self) {
        match self.session.begin_subscribe() {
            Ok(()) => {
                let backend = self.backend.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let result = backend.subscribe().await;
                    let _ = tx.send(AppEvent::Response(BackendResponse::Subscribe(result)));
                });
            }
            Err(notice) => self.notice = Some(notice),
        }
    }

    /// Fetch the entitlement status once, at startup.
    pub fn start_status_fetch(&self) {
        let backend = self.backend.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = backend.status().await;
            let _ = tx.send(AppEvent::Response(BackendResponse::Status(result)));
        });
    }

    pub fn apply_response(&mut self, response: BackendResponse) {
        let outcome = match response {
            BackendResponse::Generation(action, result) => {
                if action == Action::Refine {
                    self.refine_input.clear();
                }
                self.session.complete_generation(action, result)
            }
            BackendResponse::Subscribe(result) => self.session.complete_subscribe(result),
            BackendResponse::Status(result) => {
                self.session.apply_status(result);
                Outcome::Ignored
            }
        };

        match outcome {
            Outcome::Idea(_) => {
                self.result_scroll = 0;
                self.focus = FocusPane::Result;
                self.input_mode = InputMode::Normal;
            }
            Outcome::Notice(notice) => self.notice = Some(notice),
            Outcome::Ignored => {}
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.busy_action().is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.result_scroll = self.result_scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
    }

    /// The input receiving keystrokes in editing mode, if any.
    pub fn active_input(&mut self) -> Option<&mut TextInput> {
        match (self.focus, self.form_field) {
            (FocusPane::Form, FormField::Business) => Some(&mut self.business_input),
            (FocusPane::Refine, _) => Some(&mut self.refine_input),
            _ => None,
        }
    }
}
