//! Application state and core logic

use crate::platform;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dynamic_popup::completion::{Completion, CompletionSink};
use dynamic_popup::config::{PopupConfig, Settings};
use dynamic_popup::state::{
    Field, FieldType, FormState, StateChange, SubmissionPhase, SubmitOutcome,
};
use std::sync::{Arc, Mutex};

/// Status line text when Esc is pressed on a blocking form
pub const BLOCKING_MESSAGE: &str = "This form must be submitted";

/// What keyboard input currently goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Field(String),
    Submit,
    Cancel,
}

/// Main application struct
pub struct App {
    /// The live form
    pub form: FormState,
    /// Receives the answers or the dismissal
    pub sink: CompletionSink,
    pub focus: Focus,
    /// Highlighted option within the focused choice field
    pub option_cursor: usize,
    /// Transient message shown in the status bar
    pub status_message: Option<String>,
    pub show_hints: bool,
    /// Notifications from the form, drained after every key
    changes: Arc<Mutex<Vec<StateChange>>>,
    quit: bool,
}

impl App {
    /// Create a new App instance for one popup
    pub fn new(config: &PopupConfig, settings: &Settings) -> Result<Self> {
        let mut form = FormState::from_config(config)?;
        for diagnostic in form.diagnostics() {
            tracing::warn!("{diagnostic}");
        }

        let changes = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::clone(&changes);
        form.subscribe(move |change| {
            if let Ok(mut pending) = queue.lock() {
                pending.push(change.clone());
            }
        });

        let mut app = Self {
            form,
            sink: CompletionSink::new(settings.output_path.clone()),
            focus: Focus::Submit,
            option_cursor: 0,
            status_message: None,
            show_hints: settings.show_hints(),
            changes,
            quit: false,
        };
        if let Some(first) = app.focus_order().into_iter().next() {
            app.focus = first;
        }
        app.reset_option_cursor();
        Ok(app)
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Leave without submitting or dismissing (Ctrl+C)
    pub fn abort(&mut self) {
        tracing::info!(form = self.form.form_id(), "aborted");
        self.quit = true;
    }

    /// How the form ended, if it did
    pub fn take_completion(&mut self) -> Option<Completion> {
        self.sink.take_outcome()
    }

    /// Visible fields, then the footer buttons, in tab order
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order: Vec<Focus> = self
            .form
            .visible_fields()
            .map(|f| Focus::Field(f.id().to_string()))
            .collect();
        order.push(Focus::Submit);
        if !self.form.is_blocking() {
            order.push(Focus::Cancel);
        }
        order
    }

    pub fn focused_field(&self) -> Option<&Field> {
        match &self.focus {
            Focus::Field(id) => self.form.field(id),
            _ => None,
        }
    }

    pub fn is_focused(&self, id: &str) -> bool {
        matches!(&self.focus, Focus::Field(focused) if focused == id)
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let len = order.len();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus = order[next].clone();
        self.reset_option_cursor();
    }

    /// Put the option cursor on the picked option, or the first one
    fn reset_option_cursor(&mut self) {
        let cursor = self
            .focused_field()
            .and_then(|field| {
                let picked = self.form.value(field.id())?.as_text();
                field.options.iter().position(|o| o.value() == picked)
            })
            .unwrap_or(0);
        self.option_cursor = cursor;
    }

    /// Handle key events
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Error dialog is modal
        if self.form.submission_error().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.form.clear_submission_error();
            }
            return Ok(());
        }
        if matches!(
            self.form.phase(),
            SubmissionPhase::Submitting | SubmissionPhase::Closed
        ) {
            return Ok(());
        }

        self.status_message = None;

        match key.code {
            KeyCode::Char('s') if platform::is_submit_modifier(key.modifiers) => {
                self.submit().await
            }
            KeyCode::Esc => self.dismiss(),
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            _ => match self.focus.clone() {
                Focus::Field(id) => self.handle_field_key(&id, key)?,
                Focus::Submit if key.code == KeyCode::Enter => self.submit().await,
                Focus::Cancel if key.code == KeyCode::Enter => self.dismiss(),
                _ => {}
            },
        }

        self.apply_changes();
        Ok(())
    }

    fn handle_field_key(&mut self, id: &str, key: KeyEvent) -> Result<()> {
        let Some(field) = self.form.field(id) else {
            return Ok(());
        };
        let field_type = field.field_type;
        let option_count = field.options.len();

        if field_type.is_text() {
            let mut text = self
                .form
                .value(id)
                .map(|v| v.as_text().to_string())
                .unwrap_or_default();
            match key.code {
                KeyCode::Char(c)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    text.push(c)
                }
                KeyCode::Backspace => {
                    if text.pop().is_none() {
                        return Ok(());
                    }
                }
                KeyCode::Enter if field_type == FieldType::TextArea => text.push('\n'),
                KeyCode::Enter => {
                    self.move_focus(true);
                    return Ok(());
                }
                _ => return Ok(()),
            }
            self.form.set_text(id, text)?;
            return Ok(());
        }

        match key.code {
            KeyCode::Left => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Right if self.option_cursor + 1 < option_count => self.option_cursor += 1,
            KeyCode::Char(' ') | KeyCode::Enter => self.choose_option(id)?,
            _ => {}
        }
        Ok(())
    }

    /// Select (radio, dropdown) or toggle (checkbox) the option under the cursor
    fn choose_option(&mut self, id: &str) -> Result<()> {
        let Some(value) = self
            .form
            .field(id)
            .and_then(|f| f.options.get(self.option_cursor))
            .map(|o| o.value().to_string())
        else {
            return Ok(());
        };
        if self.form.field_type(id) == Some(FieldType::Checkbox) {
            self.form.toggle_option(id, &value)?;
        } else {
            self.form.select_option(id, &value)?;
        }
        Ok(())
    }

    async fn submit(&mut self) {
        let outcome = self.form.submit(&mut self.sink).await;
        let message = outcome.error().map(|err| err.user_message());
        match outcome {
            SubmitOutcome::Invalid { first_invalid } => {
                self.focus = Focus::Field(first_invalid);
                self.reset_option_cursor();
                self.status_message = message;
            }
            SubmitOutcome::Failed(err) => tracing::debug!("submit failed: {err}"),
            SubmitOutcome::Submitted | SubmitOutcome::Ignored => {}
        }
    }

    fn dismiss(&mut self) {
        if !self.form.dismiss(&mut self.sink) {
            self.status_message = Some(BLOCKING_MESSAGE.to_string());
        }
    }

    /// Drain form notifications: quit once closed, and keep focus on
    /// something the user can see
    fn apply_changes(&mut self) {
        let changes: Vec<StateChange> = match self.changes.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };
        if changes
            .iter()
            .any(|c| c.phase == Some(SubmissionPhase::Closed))
        {
            self.quit = true;
        }
        if changes.iter().any(|c| !c.visibility.is_empty()) {
            self.repair_focus();
        }
    }

    /// Move focus off a field that was just hidden, to the next visible
    /// field after it or the Submit button
    fn repair_focus(&mut self) {
        let Focus::Field(id) = &self.focus else {
            return;
        };
        if self.form.is_visible(id) {
            return;
        }
        let next = self
            .form
            .fields()
            .skip_while(|f| f.id() != id.as_str())
            .skip(1)
            .find(|f| self.form.is_visible(f.id()))
            .map(|f| Focus::Field(f.id().to_string()))
            .unwrap_or(Focus::Submit);
        self.focus = next;
        self.reset_option_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamic_popup::error::REQUIRED_FIELDS_MESSAGE;
    use dynamic_popup::state::FieldValue;
    use std::path::PathBuf;

    const SURVEY: &str = r#"# Feedback

:::dc<radiobutton id="liked" label="Did you like it?" required>
  <option id="yes">Yes</option>
  <option id="no">No</option>
</radiobutton>dc:::

:::dc<textarea id="why" label="Why not?" depends-on="liked" when-value="no" required-when-visible="true" />dc:::

:::dc<checkbox id="areas" label="Areas">
  <option id="speed">Speed</option>
  <option id="docs">Docs</option>
</checkbox>dc:::

:::dc<textfield id="name" label="Name" />dc:::
"#;

    fn config(markdown: &str, is_blocking: bool) -> PopupConfig {
        PopupConfig {
            id: "survey".to_string(),
            title: "Survey".to_string(),
            markdown_content: markdown.to_string(),
            is_blocking,
            show_once: false,
        }
    }

    fn app(is_blocking: bool) -> App {
        App::new(&config(SURVEY, is_blocking), &Settings::default()).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, code: KeyCode) {
        app.handle_key(key(code)).await.unwrap();
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    mod focus {
        use super::*;

        #[test]
        fn test_starts_on_first_visible_field() {
            let app = app(false);
            assert_eq!(app.focus, Focus::Field("liked".to_string()));
            assert!(app.is_focused("liked"));
        }

        #[test]
        fn test_focus_order_skips_hidden_fields() {
            let app = app(false);
            assert_eq!(
                app.focus_order(),
                vec![
                    Focus::Field("liked".to_string()),
                    Focus::Field("areas".to_string()),
                    Focus::Field("name".to_string()),
                    Focus::Submit,
                    Focus::Cancel,
                ]
            );
        }

        #[test]
        fn test_blocking_form_has_no_cancel_button() {
            let app = app(true);
            assert!(!app.focus_order().contains(&Focus::Cancel));
        }

        #[tokio::test]
        async fn test_tab_and_back_tab_wrap() {
            let mut app = app(false);
            press(&mut app, KeyCode::BackTab).await;
            assert_eq!(app.focus, Focus::Cancel);
            press(&mut app, KeyCode::Tab).await;
            assert_eq!(app.focus, Focus::Field("liked".to_string()));
            press(&mut app, KeyCode::Down).await;
            assert_eq!(app.focus, Focus::Field("areas".to_string()));
            press(&mut app, KeyCode::Up).await;
            assert_eq!(app.focus, Focus::Field("liked".to_string()));
        }

        #[tokio::test]
        async fn test_revealed_field_joins_focus_order() {
            let mut app = app(false);
            press(&mut app, KeyCode::Right).await;
            press(&mut app, KeyCode::Char(' ')).await;
            assert_eq!(app.form.value("liked"), Some(&FieldValue::Text("no".to_string())));

            press(&mut app, KeyCode::Tab).await;
            assert_eq!(app.focus, Focus::Field("why".to_string()));
        }

        #[test]
        fn test_hidden_focused_field_moves_focus_forward() {
            let mut app = app(false);
            app.form.select_option("liked", "no").unwrap();
            app.apply_changes();
            app.focus = Focus::Field("why".to_string());

            app.form.select_option("liked", "yes").unwrap();
            app.apply_changes();
            assert_eq!(app.focus, Focus::Field("areas".to_string()));
        }
    }

    mod editing {
        use super::*;

        #[tokio::test]
        async fn test_typing_into_text_field() {
            let mut app = app(false);
            app.focus = Focus::Field("name".to_string());
            type_text(&mut app, "Adx").await;
            press(&mut app, KeyCode::Backspace).await;
            type_text(&mut app, "a").await;
            assert_eq!(app.form.value("name"), Some(&FieldValue::Text("Ada".to_string())));
        }

        #[tokio::test]
        async fn test_enter_in_text_field_moves_on() {
            let mut app = app(false);
            app.focus = Focus::Field("name".to_string());
            press(&mut app, KeyCode::Enter).await;
            assert_eq!(app.focus, Focus::Submit);
        }

        #[tokio::test]
        async fn test_enter_in_text_area_adds_newline() {
            let mut app = app(false);
            app.form.select_option("liked", "no").unwrap();
            app.focus = Focus::Field("why".to_string());
            type_text(&mut app, "a").await;
            press(&mut app, KeyCode::Enter).await;
            type_text(&mut app, "b").await;
            assert_eq!(app.form.value("why"), Some(&FieldValue::Text("a\nb".to_string())));
        }

        #[tokio::test]
        async fn test_checkbox_toggles_under_cursor() {
            let mut app = app(false);
            app.focus = Focus::Field("areas".to_string());
            press(&mut app, KeyCode::Char(' ')).await;
            press(&mut app, KeyCode::Right).await;
            press(&mut app, KeyCode::Right).await;
            assert_eq!(app.option_cursor, 1);
            press(&mut app, KeyCode::Char(' ')).await;
            assert_eq!(
                app.form.value("areas"),
                Some(&FieldValue::Selection(vec!["speed".to_string(), "docs".to_string()]))
            );

            press(&mut app, KeyCode::Left).await;
            press(&mut app, KeyCode::Enter).await;
            assert_eq!(
                app.form.value("areas"),
                Some(&FieldValue::Selection(vec!["docs".to_string()]))
            );
        }

        #[tokio::test]
        async fn test_option_cursor_follows_selection_on_focus() {
            let mut app = app(false);
            app.form.select_option("liked", "no").unwrap();
            app.focus = Focus::Field("name".to_string());
            press(&mut app, KeyCode::Up).await;
            press(&mut app, KeyCode::Up).await;
            press(&mut app, KeyCode::Up).await;
            assert_eq!(app.focus, Focus::Field("liked".to_string()));
            assert_eq!(app.option_cursor, 1);
        }
    }

    mod submitting {
        use super::*;
        use dynamic_popup::state::SubmissionPayload;

        fn submitted(app: &mut App) -> SubmissionPayload {
            match app.take_completion() {
                Some(Completion::Submitted(payload)) => payload,
                other => panic!("expected a submission, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_invalid_submit_focuses_first_invalid() {
            let mut app = app(false);
            app.focus = Focus::Field("name".to_string());
            app.handle_key(ctrl_s()).await.unwrap();

            assert_eq!(app.focus, Focus::Field("liked".to_string()));
            assert_eq!(app.status_message.as_deref(), Some(REQUIRED_FIELDS_MESSAGE));
            assert!(app.form.has_error("liked"));
            assert!(!app.should_quit());
        }

        #[tokio::test]
        async fn test_revealed_required_field_blocks_submit() {
            let mut app = app(false);
            app.form.select_option("liked", "no").unwrap();
            app.handle_key(ctrl_s()).await.unwrap();
            assert_eq!(app.focus, Focus::Field("why".to_string()));

            type_text(&mut app, "slow").await;
            assert!(!app.form.has_error("why"));
            app.handle_key(ctrl_s()).await.unwrap();

            assert!(app.should_quit());
            let payload = submitted(&mut app);
            assert_eq!(payload.values.get("why"), Some(&Some("slow".to_string())));
            assert_eq!(payload.values.get("liked"), Some(&Some("no".to_string())));
        }

        #[tokio::test]
        async fn test_enter_on_submit_button() {
            let mut app = app(false);
            press(&mut app, KeyCode::Char(' ')).await;
            app.focus = Focus::Submit;
            press(&mut app, KeyCode::Enter).await;

            assert!(app.should_quit());
            let payload = submitted(&mut app);
            assert_eq!(payload.form_id, "survey");
            assert_eq!(payload.values.get("areas"), Some(&Some(String::new())));
            assert_eq!(payload.values.get("why"), Some(&Some(String::new())));
        }

        #[tokio::test]
        async fn test_failed_submit_shows_error_until_dismissed() {
            let settings = Settings {
                output_path: Some(PathBuf::from("/proc/definitely/not/writable.json")),
                ..Settings::default()
            };
            let mut app = App::new(&config(SURVEY, false), &settings).unwrap();
            app.form.select_option("liked", "yes").unwrap();
            app.handle_key(ctrl_s()).await.unwrap();

            assert!(!app.should_quit());
            assert!(app.form.submission_error().is_some());

            // The dialog swallows other keys
            press(&mut app, KeyCode::Tab).await;
            assert_eq!(app.focus, Focus::Field("liked".to_string()));

            press(&mut app, KeyCode::Enter).await;
            assert!(app.form.submission_error().is_none());
            assert_eq!(app.form.phase(), SubmissionPhase::Idle);
        }
    }

    mod dismissing {
        use super::*;

        #[tokio::test]
        async fn test_esc_dismisses_non_blocking_form() {
            let mut app = app(false);
            press(&mut app, KeyCode::Esc).await;
            assert!(app.should_quit());
            assert_eq!(app.take_completion(), Some(Completion::Dismissed));
        }

        #[tokio::test]
        async fn test_cancel_button_dismisses() {
            let mut app = app(false);
            app.focus = Focus::Cancel;
            press(&mut app, KeyCode::Enter).await;
            assert!(app.should_quit());
        }

        #[tokio::test]
        async fn test_esc_refused_on_blocking_form() {
            let mut app = app(true);
            press(&mut app, KeyCode::Esc).await;
            assert!(!app.should_quit());
            assert_eq!(app.status_message.as_deref(), Some(BLOCKING_MESSAGE));
            assert!(app.take_completion().is_none());
        }

        #[tokio::test]
        async fn test_keys_ignored_once_closed() {
            let mut app = app(false);
            press(&mut app, KeyCode::Esc).await;
            press(&mut app, KeyCode::Tab).await;
            assert_eq!(app.focus, Focus::Field("liked".to_string()));
            assert_eq!(app.form.phase(), SubmissionPhase::Closed);
        }

        #[test]
        fn test_abort_quits_without_outcome() {
            let mut app = app(true);
            app.abort();
            assert!(app.should_quit());
            assert!(app.take_completion().is_none());
        }
    }
}
