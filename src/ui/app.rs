use std::io::stdout;
use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use tui_widgets::popup::PopupState;

use crate::account::{validate_username, AccountAction, AccountOutcome, AvatarGallery, PasswordChange};
use crate::admin::DbOutcome;
use crate::api::worker::{Outcome, Request, Worker};
use crate::api::DbAction;
use crate::config::{Config, UiColors};
use crate::footer::{FooterHandle, Severity};
use crate::form::{ContactForm, FormField};
use crate::model::{ContactId, UserProfile};
use crate::view::birthdays::BirthdayEntry;
use crate::view::controller::{ContactOutcome, ContactRequest, ContactView, ViewEvent};
use crate::view::state::ViewMode;
use crate::view::tiles::{info_lines, Tile};

use super::draw;
use super::edit::{FieldEditor, PromptField};
use super::panes::{wrap_index, Focus, Screen, DB_MENU};

#[derive(Debug, Clone)]
pub struct ConfirmModal {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

/// Action to perform when confirm modal is accepted
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteContact(ContactId),
    Db(DbAction),
    ResetPassword,
    DeleteAvatar(i64),
}

/// Read-only popup, used for contact information.
#[derive(Debug, Clone)]
pub struct InfoModal {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DbMenu {
    pub selected: usize,
}

/// Create/edit form state
pub struct FormModal {
    pub form: ContactForm,
    pub focus: usize,
    pub editor: FieldEditor,
    pub error: Option<String>,
    pub saving: bool,
}

impl FormModal {
    fn new(form: ContactForm) -> Self {
        let mut modal = Self {
            form,
            focus: 0,
            editor: FieldEditor::default(),
            error: None,
            saving: false,
        };
        modal.focus_field(0);
        modal
    }

    pub fn focused_field(&self) -> Option<FormField> {
        self.form.fields().get(self.focus).copied()
    }

    fn focus_field(&mut self, index: usize) {
        self.editor.commit(&mut self.form);
        let fields = self.form.fields();
        self.focus = index.min(fields.len().saturating_sub(1));
        match fields.get(self.focus) {
            Some(field) => self.editor.start(&self.form, *field),
            None => self.editor.cancel(),
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.form.fields().len();
        self.focus_field(wrap_index(self.focus, delta, len));
    }

    fn focused_phone(&self) -> Option<usize> {
        match self.focused_field() {
            Some(FormField::Phone(idx)) => Some(idx),
            _ => None,
        }
    }

    fn add_phone(&mut self) {
        self.editor.commit(&mut self.form);
        self.form.add_phone();
        let last = self.form.phones.len() - 1;
        let index = self
            .form
            .fields()
            .iter()
            .position(|field| *field == FormField::Phone(last))
            .unwrap_or(self.focus);
        self.focus_field(index);
    }

    fn remove_phone(&mut self) {
        self.editor.commit(&mut self.form);
        let idx = self
            .focused_phone()
            .unwrap_or_else(|| self.form.phones.len().saturating_sub(1));
        self.form.remove_phone(idx);
        self.focus_field(self.focus);
    }

    fn cycle_label(&mut self) {
        if let Some(idx) = self.focused_phone() {
            if let Some(row) = self.form.phones.get_mut(idx) {
                row.cycle_label();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Username,
    Password,
    AvatarPath,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Username => "Змінити ім'я користувача",
            PromptKind::Password => "Змінити пароль",
            PromptKind::AvatarPath => "Завантажити аватар",
        }
    }
}

/// Small input dialog for account settings
pub struct PromptModal {
    pub kind: PromptKind,
    pub fields: Vec<PromptField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl PromptModal {
    fn new(kind: PromptKind, current_username: &str) -> Self {
        let fields = match kind {
            PromptKind::Username => {
                vec![PromptField::new("Нове ім'я", false, current_username)]
            }
            PromptKind::Password => vec![
                PromptField::new("Поточний пароль", true, ""),
                PromptField::new("Новий пароль", true, ""),
                PromptField::new("Підтвердження", true, ""),
            ],
            PromptKind::AvatarPath => vec![PromptField::new("Шлях до файлу", false, "")],
        };
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.input.value())
            .unwrap_or("")
    }
}

/// Help modal state with scroll support
#[derive(Debug, Clone)]
pub struct HelpModal {
    pub scroll: usize,
    pub total_lines: usize,
    /// Viewport height (set during rendering)
    pub viewport_height: usize,
}

impl HelpModal {
    pub fn new(total_lines: usize) -> Self {
        Self {
            scroll: 0,
            total_lines,
            viewport_height: 10,
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll = (self.scroll + lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll + self.viewport_height < self.total_lines
    }
}

/// A section in the help modal (e.g., "Global", "List")
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

/// A single help entry (action name + key bindings)
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

#[derive(Debug, Default)]
pub struct AccountPane {
    pub profile: Option<UserProfile>,
    pub gallery: AvatarGallery,
    pub loaded: bool,
}

pub struct App<'a> {
    config: &'a Config,
    worker: Worker,
    footer: FooterHandle,
    pub view: ContactView,
    pub screen: Screen,
    pub focus: Focus,
    /// Tile index, or birthday entry index in birthday mode
    pub selected: usize,
    pub search_input: Input,
    pub account: AccountPane,
    pub form: Option<FormModal>,
    /// Form kept between openings so the birthday attempt counter survives
    draft: ContactForm,
    pub prompt: Option<PromptModal>,
    pub confirm_modal: Option<ConfirmModal>,
    pub info_modal: Option<InfoModal>,
    pub alert: Option<String>,
    pub db_menu: Option<DbMenu>,
    pub help_modal: Option<HelpModal>,
    // Popup state for modal dialog (tui-widgets popup)
    pub modal_popup: PopupState,
    pub pending: usize,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, worker: Worker, footer: FooterHandle) -> Self {
        let view = ContactView::new(
            config.default_view,
            config.page_limit,
            Box::new(footer.clone()),
        );
        Self {
            config,
            worker,
            footer,
            view,
            screen: Screen::Contacts,
            focus: Focus::Tiles,
            selected: 0,
            search_input: Input::default(),
            account: AccountPane::default(),
            form: None,
            draft: ContactForm::new(),
            prompt: None,
            confirm_modal: None,
            info_modal: None,
            alert: None,
            db_menu: None,
            help_modal: None,
            modal_popup: PopupState::default(),
            pending: 0,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let requests = self.view.start();
        self.dispatch(requests);

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            self.drain_outcomes();
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        info!("leaving terminal ui");
        Ok(())
    }

    // =========================================================================
    // Worker plumbing
    // =========================================================================

    fn submit(&mut self, request: Request) {
        if self.worker.submit(request) {
            self.pending += 1;
        } else {
            warn!("api worker is gone; request dropped");
            self.footer
                .borrow_mut()
                .append("Фоновий обробник запитів недоступний", Severity::Error);
        }
    }

    fn dispatch(&mut self, requests: Vec<ContactRequest>) {
        for request in requests {
            self.submit(Request::Contacts(request));
        }
    }

    fn drain_outcomes(&mut self) {
        while let Some(outcome) = self.worker.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.handle_outcome(outcome);
        }
    }

    pub fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Contacts(outcome) => self.apply_contacts(outcome),
            Outcome::Db(outcome) => self.apply_db(outcome),
            Outcome::Account(outcome) => self.apply_account(outcome),
        }
    }

    fn apply_contacts(&mut self, outcome: ContactOutcome) {
        let reaction = self.view.apply(outcome);
        self.dispatch(reaction.requests);

        match reaction.event {
            Some(ViewEvent::InfoReady(contact)) => {
                self.modal_popup = PopupState::default();
                self.info_modal = Some(InfoModal {
                    title: format!(" {} ", contact.full_name().trim()),
                    lines: info_lines(&contact),
                });
            }
            Some(ViewEvent::EditReady(form)) => self.open_form(form),
            Some(ViewEvent::Saved) => {
                if let Some(modal) = self.form.take() {
                    self.draft = modal.form;
                }
                self.draft.reset();
                self.search_input.reset();
                self.selected = 0;
            }
            Some(ViewEvent::Deleted(id)) => {
                debug!(id = %id, "contact removed from view");
                self.selected = 0;
            }
            None => {}
        }

        if let Some(alert) = self.view.take_alert() {
            if let Some(modal) = self.form.as_mut() {
                modal.saving = false;
            }
            self.show_alert(alert);
        }
        self.clamp_selection();
    }

    fn apply_db(&mut self, outcome: DbOutcome) {
        {
            let mut footer = self.footer.borrow_mut();
            for note in outcome.notes {
                footer.append_note(note);
            }
        }
        if outcome.refresh_contacts {
            self.search_input.reset();
            self.selected = 0;
            let requests = self.view.reset();
            self.dispatch(requests);
        }
    }

    fn apply_account(&mut self, outcome: AccountOutcome) {
        {
            let mut footer = self.footer.borrow_mut();
            for note in outcome.notes {
                footer.append_note(note);
            }
        }
        if let Some(profile) = outcome.profile {
            self.account.profile = Some(profile);
        }
        if let Some(avatars) = outcome.avatars {
            self.account.gallery.replace(avatars);
        }
        self.account.loaded = true;
        if let Some(alert) = outcome.alert {
            self.show_alert(alert);
        }
    }

    // =========================================================================
    // Accessors used by the renderer
    // =========================================================================

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn footer(&self) -> &FooterHandle {
        &self.footer
    }

    pub fn tiles(&self) -> Vec<Tile> {
        self.view.tiles()
    }

    pub fn birthday_entries(&self) -> Vec<BirthdayEntry> {
        self.view.birthdays().entries()
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0 || self.view.is_loading()
    }

    fn item_count(&self) -> usize {
        if self.view.state().birthday_mode {
            self.birthday_entries().len()
        } else {
            self.view.contacts().len()
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.item_count();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn selected_contact_id(&self) -> Option<ContactId> {
        if self.view.state().birthday_mode {
            self.birthday_entries()
                .get(self.selected)
                .map(|entry| entry.id.clone())
        } else {
            self.view
                .contacts()
                .get(self.selected)
                .map(|contact| contact.id.clone())
        }
    }

    fn show_alert(&mut self, text: String) {
        self.modal_popup = PopupState::default();
        self.alert = Some(text);
    }

    fn open_form(&mut self, form: ContactForm) {
        self.modal_popup = PopupState::default();
        self.form = Some(FormModal::new(form));
    }

    // =========================================================================
    // Key routing
    // =========================================================================

    /// Returns true when the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return true;
        }

        if self.help_modal.is_some() {
            self.handle_help_modal_key(key);
            return false;
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alert = None;
            }
            return false;
        }

        if self.confirm_modal.is_some() {
            self.handle_confirm_modal_key(key);
            return false;
        }

        if self.info_modal.is_some() {
            let config = self.config;
            let modal = &config.keys.modal;
            if key_matches_any(&key, &modal.cancel) || key_matches_any(&key, &modal.confirm) {
                self.info_modal = None;
            }
            return false;
        }

        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return false;
        }

        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }

        if self.db_menu.is_some() {
            self.handle_db_menu_key(key);
            return false;
        }

        if self.screen == Screen::Contacts && self.focus == Focus::Search {
            self.handle_search_key(key);
            return false;
        }

        if let Some(quit) = self.handle_global_key(&key) {
            return quit;
        }

        match self.screen {
            Screen::Contacts => self.handle_list_key(key),
            Screen::Account => self.handle_account_key(key),
        }
        false
    }

    /// `Some(quit)` when a global binding matched.
    fn handle_global_key(&mut self, key: &KeyEvent) -> Option<bool> {
        let config = self.config;
        let global = &config.keys.global;

        if key_matches_any(key, &global.quit) {
            return Some(true);
        }
        if key_matches_any(key, &global.help) {
            self.show_help();
            return Some(false);
        }
        if key_matches_any(key, &global.footer) {
            self.footer.borrow_mut().toggle_expanded();
            return Some(false);
        }
        if key_matches_any(key, &global.db_menu) {
            self.modal_popup = PopupState::default();
            self.db_menu = Some(DbMenu::default());
            return Some(false);
        }
        if key_matches_any(key, &global.account) {
            self.screen = self.screen.toggled();
            if self.screen == Screen::Account {
                self.load_account();
            }
            return Some(false);
        }
        None
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.list;
        let birthday_mode = self.view.state().birthday_mode;

        if key_matches_any(&key, &keys.next) {
            let len = self.item_count();
            self.selected = wrap_index(self.selected, 1, len);
        } else if key_matches_any(&key, &keys.prev) {
            let len = self.item_count();
            self.selected = wrap_index(self.selected, -1, len);
        } else if key_matches_any(&key, &keys.search) {
            self.focus = Focus::Search;
        } else if key_matches_any(&key, &keys.collapse) {
            if birthday_mode {
                self.exit_birthdays();
            } else {
                self.view.collapse();
            }
        } else if key_matches_any(&key, &keys.birthdays) {
            if birthday_mode {
                self.exit_birthdays();
            } else {
                self.selected = 0;
                let requests = self.view.enter_birthday_mode();
                self.dispatch(requests);
            }
        } else if key_matches_any(&key, &keys.info)
            || (birthday_mode && key_matches_any(&key, &keys.expand))
        {
            if let Some(id) = self.selected_contact_id() {
                let requests = self.view.open_info(&id);
                self.dispatch(requests);
            }
        } else if key_matches_any(&key, &keys.create) {
            let mut form = mem::take(&mut self.draft);
            form.reset();
            self.open_form(form);
        } else if key_matches_any(&key, &keys.refresh) {
            let requests = self.view.refresh();
            self.dispatch(requests);
        } else if key_matches_any(&key, &keys.reset) {
            self.search_input.reset();
            self.selected = 0;
            let requests = self.view.reset();
            self.dispatch(requests);
        } else if key_matches_any(&key, &keys.sort) {
            let requests = self.view.toggle_sort();
            self.dispatch(requests);
        } else if let Some(mode) = self.mode_for_key(&key) {
            let requests = self.view.set_view_mode(mode);
            self.dispatch(requests);
        } else if birthday_mode {
            // the remaining actions work on tiles only
        } else if key_matches_any(&key, &keys.expand) {
            if let Some(id) = self.selected_contact_id() {
                let requests = self.view.toggle_expand(&id);
                self.dispatch(requests);
            }
        } else if key_matches_any(&key, &keys.edit) {
            if let Some(id) = self.selected_contact_id() {
                let requests = self.view.edit(&id);
                self.dispatch(requests);
            }
        } else if key_matches_any(&key, &keys.delete) {
            self.confirm_delete_contact();
        }
    }

    fn mode_for_key(&self, key: &KeyEvent) -> Option<ViewMode> {
        let keys = &self.config.keys.list;
        let bindings = [
            (&keys.view_initials, ViewMode::Initials),
            (&keys.view_named, ViewMode::Named),
            (&keys.view_detailed, ViewMode::Detailed),
            (&keys.view_expanded, ViewMode::Expanded),
        ];
        bindings
            .into_iter()
            .find(|(binding, _)| key_matches_any(key, binding))
            .map(|(_, mode)| mode)
    }

    fn exit_birthdays(&mut self) {
        self.selected = 0;
        let requests = self.view.exit_birthday_mode();
        self.dispatch(requests);
    }

    fn confirm_delete_contact(&mut self) {
        let Some(contact) = self.view.contacts().get(self.selected) else {
            return;
        };
        let message = format!(
            "Видалити контакт {} (ID: {})?",
            contact.full_name().trim(),
            contact.id
        );
        let id = contact.id.clone();
        self.modal_popup = PopupState::default();
        self.confirm_modal = Some(ConfirmModal {
            title: " Видалення ".to_string(),
            message,
            action: ConfirmAction::DeleteContact(id),
        });
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
                self.focus = Focus::Tiles;
            }
            _ => {
                if self.search_input.handle_event(&Event::Key(key)).is_some() {
                    self.selected = 0;
                    let text = self.search_input.value().to_string();
                    let requests = self.view.set_search_text(&text);
                    self.dispatch(requests);
                }
            }
        }
    }

    fn handle_confirm_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.confirm_modal.take() else {
            return;
        };

        let config = self.config;
        let modal_keys = &config.keys.modal;

        if key_matches_any(&key, &modal_keys.cancel) {
            return;
        }

        if key_matches_any(&key, &modal_keys.confirm) {
            match modal.action {
                ConfirmAction::DeleteContact(id) => {
                    let requests = self.view.delete(&id);
                    self.dispatch(requests);
                }
                ConfirmAction::Db(action) => self.submit(Request::Db(action)),
                ConfirmAction::ResetPassword => {
                    self.submit(Request::Account(AccountAction::ResetPassword))
                }
                ConfirmAction::DeleteAvatar(id) => {
                    self.submit(Request::Account(AccountAction::DeleteAvatar(id)))
                }
            }
            return;
        }

        // Put the modal back if key wasn't handled
        self.confirm_modal = Some(modal);
    }

    fn handle_db_menu_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let modal_keys = &config.keys.modal;
        let Some(menu) = self.db_menu.as_mut() else {
            return;
        };

        if key_matches_any(&key, &modal_keys.cancel) {
            self.db_menu = None;
        } else if key_matches_any(&key, &modal_keys.next) {
            menu.selected = wrap_index(menu.selected, 1, DB_MENU.len());
        } else if key_matches_any(&key, &modal_keys.prev) {
            menu.selected = wrap_index(menu.selected, -1, DB_MENU.len());
        } else if key_matches_any(&key, &modal_keys.confirm) {
            let action = DB_MENU[menu.selected.min(DB_MENU.len() - 1)];
            self.db_menu = None;
            if action.needs_confirmation() {
                self.modal_popup = PopupState::default();
                self.confirm_modal = Some(ConfirmModal {
                    title: format!(" {} ", action.label()),
                    message: format!("{}? Цю дію не можна скасувати.", action.label()),
                    action: ConfirmAction::Db(action),
                });
            } else {
                self.submit(Request::Db(action));
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.form;
        let Some(modal) = self.form.as_mut() else {
            return;
        };

        if key_matches_any(&key, &keys.cancel) {
            if let Some(mut modal) = self.form.take() {
                modal.editor.commit(&mut modal.form);
                self.draft = modal.form;
            }
            return;
        }
        if modal.saving {
            return;
        }

        if key_matches_any(&key, &keys.submit) {
            modal.editor.commit(&mut modal.form);
            match modal.form.submit() {
                Ok(submission) => {
                    modal.error = None;
                    modal.saving = true;
                    // the birthday rule may have filled the field in
                    let focus = modal.focus;
                    modal.focus_field(focus);
                    let requests = self.view.save(submission);
                    self.dispatch(requests);
                }
                Err(err) => {
                    modal.error = Some(err.to_string());
                    let focus = modal.focus;
                    modal.focus_field(focus);
                }
            }
        } else if key_matches_any(&key, &keys.next) {
            modal.move_focus(1);
        } else if key_matches_any(&key, &keys.prev) {
            modal.move_focus(-1);
        } else if key_matches_any(&key, &keys.add_phone) {
            modal.add_phone();
        } else if key_matches_any(&key, &keys.remove_phone) {
            modal.remove_phone();
        } else if key_matches_any(&key, &keys.cycle_label) {
            modal.cycle_label();
        } else if modal.editor.handle_key_event(key) {
            modal.error = None;
        }
    }

    // =========================================================================
    // Account screen
    // =========================================================================

    fn load_account(&mut self) {
        self.submit(Request::Account(AccountAction::LoadProfile));
        self.submit(Request::Account(AccountAction::LoadAvatars));
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let username = self
            .account
            .profile
            .as_ref()
            .map(|profile| profile.username.clone())
            .unwrap_or_default();
        self.modal_popup = PopupState::default();
        self.prompt = Some(PromptModal::new(kind, &username));
    }

    fn handle_account_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.account;

        if key_matches_any(&key, &keys.back) {
            self.screen = Screen::Contacts;
        } else if key_matches_any(&key, &keys.next) {
            self.account.gallery.select_next();
        } else if key_matches_any(&key, &keys.prev) {
            self.account.gallery.select_prev();
        } else if key_matches_any(&key, &keys.username) {
            self.open_prompt(PromptKind::Username);
        } else if key_matches_any(&key, &keys.password) {
            self.open_prompt(PromptKind::Password);
        } else if key_matches_any(&key, &keys.upload) {
            self.open_prompt(PromptKind::AvatarPath);
        } else if key_matches_any(&key, &keys.reset_password) {
            self.modal_popup = PopupState::default();
            self.confirm_modal = Some(ConfirmModal {
                title: " Скидання пароля ".to_string(),
                message: "Надіслати посилання для скидання пароля на вашу пошту?".to_string(),
                action: ConfirmAction::ResetPassword,
            });
        } else if key_matches_any(&key, &keys.set_main) {
            if let Some(avatar) = self.account.gallery.selected() {
                let id = avatar.id;
                self.submit(Request::Account(AccountAction::SetMainAvatar(id)));
            }
        } else if key_matches_any(&key, &keys.delete_avatar) {
            if let Some(avatar) = self.account.gallery.selected() {
                let id = avatar.id;
                self.modal_popup = PopupState::default();
                self.confirm_modal = Some(ConfirmModal {
                    title: " Видалення аватара ".to_string(),
                    message: format!("Видалити аватар #{id}?"),
                    action: ConfirmAction::DeleteAvatar(id),
                });
            }
        } else if key_matches_any(&key, &keys.refresh) {
            self.load_account();
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
            }
            KeyCode::Tab | KeyCode::Down => {
                prompt.focus = wrap_index(prompt.focus, 1, prompt.fields.len());
            }
            KeyCode::BackTab | KeyCode::Up => {
                prompt.focus = wrap_index(prompt.focus, -1, prompt.fields.len());
            }
            KeyCode::Enter => match prompt_action(prompt) {
                Ok(action) => {
                    self.prompt = None;
                    self.submit(Request::Account(action));
                }
                Err(message) => prompt.error = Some(message),
            },
            _ => {
                let focus = prompt.focus;
                if let Some(field) = prompt.fields.get_mut(focus) {
                    if field.handle_key_event(key) {
                        prompt.error = None;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        help_sections(&self.config.keys)
    }

    pub fn show_help(&mut self) {
        let total_lines = self
            .help_entries()
            .iter()
            .map(|section| section.entries.len() + 2)
            .sum();
        self.modal_popup = PopupState::default();
        self.help_modal = Some(HelpModal::new(total_lines));
    }

    fn handle_help_modal_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            self.help_modal = None;
            return;
        }

        let Some(modal) = self.help_modal.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => modal.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => modal.scroll_up(1),
            KeyCode::PageDown => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_down(page);
            }
            KeyCode::PageUp => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_up(page);
            }
            _ => {}
        }
    }
}

/// Validate a prompt and turn it into the account action it stands for.
fn prompt_action(prompt: &PromptModal) -> Result<AccountAction, String> {
    match prompt.kind {
        PromptKind::Username => validate_username(prompt.value(0))
            .map(AccountAction::UpdateUsername)
            .map_err(|err| err.to_string()),
        PromptKind::Password => {
            let change = PasswordChange {
                current: prompt.value(0).to_string(),
                new: prompt.value(1).to_string(),
                confirm: prompt.value(2).to_string(),
            };
            change.validate().map_err(|err| err.to_string())?;
            Ok(AccountAction::UpdatePassword {
                current: change.current,
                new: change.new,
            })
        }
        PromptKind::AvatarPath => {
            let raw = prompt.value(0).trim();
            if raw.is_empty() {
                return Err("Вкажіть шлях до файлу".to_string());
            }
            let path = PathBuf::from(raw);
            if !path.is_file() {
                return Err(format!("Файл не знайдено: {raw}"));
            }
            Ok(AccountAction::UploadAvatar(path))
        }
    }
}

fn entry(action: &'static str, keys: &[String]) -> HelpEntry {
    HelpEntry {
        action,
        keys: keys.join(", "),
    }
}

fn help_sections(keys: &crate::config::Keys) -> Vec<HelpSection> {
    let g = &keys.global;
    let l = &keys.list;
    let f = &keys.form;
    let m = &keys.modal;
    let a = &keys.account;
    vec![
        HelpSection {
            title: "Загальні",
            entries: vec![
                entry("Вихід", &g.quit),
                entry("Довідка", &g.help),
                entry("Журнал", &g.footer),
                entry("База даних", &g.db_menu),
                entry("Користувач", &g.account),
            ],
        },
        HelpSection {
            title: "Контакти",
            entries: vec![
                entry("Наступний", &l.next),
                entry("Попередній", &l.prev),
                entry("Пошук", &l.search),
                entry("Розгорнути", &l.expand),
                entry("Згорнути", &l.collapse),
                entry("Інформація", &l.info),
                entry("Редагувати", &l.edit),
                entry("Видалити", &l.delete),
                entry("Створити", &l.create),
                entry("Сортування", &l.sort),
                entry("Дні народження", &l.birthdays),
                entry("Оновити", &l.refresh),
                entry("Скинути", &l.reset),
                entry("Вид: Міні", &l.view_initials),
                entry("Вид: Імена", &l.view_named),
                entry("Вид: Список", &l.view_detailed),
                entry("Вид: Картки", &l.view_expanded),
            ],
        },
        HelpSection {
            title: "Форма",
            entries: vec![
                entry("Зберегти", &f.submit),
                entry("Скасувати", &f.cancel),
                entry("Наступне поле", &f.next),
                entry("Попереднє поле", &f.prev),
                entry("Додати телефон", &f.add_phone),
                entry("Видалити телефон", &f.remove_phone),
                entry("Тип телефону", &f.cycle_label),
            ],
        },
        HelpSection {
            title: "Діалоги",
            entries: vec![
                entry("Підтвердити", &m.confirm),
                entry("Скасувати", &m.cancel),
                entry("Наступний", &m.next),
                entry("Попередній", &m.prev),
            ],
        },
        HelpSection {
            title: "Користувач",
            entries: vec![
                entry("Назад", &a.back),
                entry("Змінити ім'я", &a.username),
                entry("Змінити пароль", &a.password),
                entry("Скинути пароль", &a.reset_password),
                entry("Завантажити аватар", &a.upload),
                entry("Основний аватар", &a.set_main),
                entry("Видалити аватар", &a.delete_avatar),
                entry("Наступний аватар", &a.next),
                entry("Попередній аватар", &a.prev),
                entry("Оновити", &a.refresh),
            ],
        },
    ]
}

/// Check if the key event matches any of the bindings in the list
pub fn key_matches_any(event: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|b| key_matches_single(event, b))
}

/// Check if the key event matches a single binding string
pub fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Disallow Ctrl/Alt/Super modifiers (we don't support them)
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name if name.len() > 1 && name.starts_with('f') => name[1..]
            .parse::<u8>()
            .map(|n| (1..=12).contains(&n) && event.code == KeyCode::F(n))
            .unwrap_or(false),
        // Single character - case-sensitive (m != M, since M requires Shift)
        _ => {
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}
