use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::form::{ContactForm, FormField};

/// Text input bound to one field of the contact form.
#[derive(Default)]
pub struct FieldEditor {
    target: Option<FormField>,
    input: Input,
}

impl FieldEditor {
    pub fn start(&mut self, form: &ContactForm, field: FormField) {
        self.target = Some(field);
        self.input = Input::new(form.value(field).to_string());
    }

    pub fn cancel(&mut self) {
        self.target = None;
        self.input.reset();
    }

    pub fn target(&self) -> Option<FormField> {
        self.target
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Write the edited text back into `form`.
    pub fn commit(&self, form: &mut ContactForm) {
        if let Some(field) = self.target {
            form.set_value(field, self.input.value());
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        self.input.handle_event(&Event::Key(key)).is_some()
    }
}

/// Labelled single-line input used by the account prompts.
pub struct PromptField {
    pub label: &'static str,
    pub masked: bool,
    pub input: Input,
}

impl PromptField {
    pub fn new(label: &'static str, masked: bool, initial: &str) -> Self {
        Self {
            label,
            masked,
            input: Input::new(initial.to_string()),
        }
    }

    /// Text as drawn on screen.
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.input.value().chars().count())
        } else {
            self.input.value().to_string()
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        self.input.handle_event(&Event::Key(key)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editor_commits_into_form() {
        let mut form = ContactForm::new();
        form.first_name = "Ан".into();
        let mut editor = FieldEditor::default();
        editor.start(&form, FormField::FirstName);
        assert!(editor.handle_key_event(key(KeyCode::Char('н'))));
        assert!(editor.handle_key_event(key(KeyCode::Char('а'))));
        editor.commit(&mut form);
        assert_eq!(form.first_name, "Анна");
        assert_eq!(editor.target(), Some(FormField::FirstName));

        editor.cancel();
        assert!(editor.target().is_none());
        assert_eq!(editor.value(), "");
    }

    #[test]
    fn test_masked_prompt_display() {
        let mut field = PromptField::new("Пароль", true, "");
        field.handle_key_event(key(KeyCode::Char('a')));
        field.handle_key_event(key(KeyCode::Char('b')));
        assert_eq!(field.display(), "**");
        assert_eq!(field.input.value(), "ab");
        assert_eq!(PromptField::new("Ім'я", false, "ivan").display(), "ivan");
    }
}
