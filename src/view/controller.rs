//! Contact view controller.
//!
//! `ContactView` owns the view state and the last server data. Every
//! transition returns the backend requests to run; the caller executes them
//! (on the worker thread or inline) and feeds the outcomes back through
//! `apply`. Outcomes carrying a superseded token are dropped.

use tracing::{debug, warn};

use crate::api::{ApiResult, Backend, BirthdayWindow, ContactQuery};
use crate::error::ApiError;
use crate::footer::{Notifier, Severity};
use crate::form::{ContactForm, SaveTarget, Submission};
use crate::model::{Contact, ContactId};
use crate::view::birthdays::BirthdayView;
use crate::view::sequence::{QueryKey, RequestSeq, Token};
use crate::view::state::{SortDirection, ViewMode, ViewState};
use crate::view::tiles::{render_list, Tile};

pub const LIST_FAILED: &str = "Помилка завантаження контактів";
pub const DETAIL_FAILED: &str = "Помилка завантаження контакту";
pub const SAVE_FAILED: &str = "Помилка збереження контакту";
pub const DELETE_FAILED: &str = "Помилка видалення";
pub const DELETE_NETWORK_FAILED: &str = "Помилка мережі";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactRequest {
    List { token: Token, query: ContactQuery },
    /// Full record for the individually expanded tile.
    Detail { token: Token, id: ContactId },
    /// Full record for the information popup.
    Info { token: Token, id: ContactId },
    EditLoad { id: ContactId },
    Birthdays { token: Token },
    Save(Submission),
    Delete(ContactId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    List {
        token: Token,
        result: ApiResult<Vec<Contact>>,
    },
    Detail {
        token: Token,
        result: ApiResult<Contact>,
    },
    Info {
        token: Token,
        result: ApiResult<Contact>,
    },
    EditLoad {
        id: ContactId,
        result: ApiResult<Contact>,
    },
    Birthdays {
        token: Token,
        upcoming: ApiResult<Vec<Contact>>,
        later: Option<ApiResult<Vec<Contact>>>,
    },
    Saved(ApiResult<Contact>),
    Deleted {
        id: ContactId,
        result: ApiResult<()>,
    },
}

/// Run one request against the backend.
pub fn perform(backend: &dyn Backend, request: ContactRequest) -> ContactOutcome {
    match request {
        ContactRequest::List { token, query } => ContactOutcome::List {
            token,
            result: backend.list_contacts(&query),
        },
        ContactRequest::Detail { token, id } => ContactOutcome::Detail {
            token,
            result: backend.contact(&id),
        },
        ContactRequest::Info { token, id } => ContactOutcome::Info {
            token,
            result: backend.contact(&id),
        },
        ContactRequest::EditLoad { id } => {
            let result = backend.contact(&id);
            ContactOutcome::EditLoad { id, result }
        }
        ContactRequest::Birthdays { token } => {
            let upcoming = backend.birthdays(BirthdayWindow::Next7Days);
            let later = upcoming
                .is_ok()
                .then(|| backend.birthdays(BirthdayWindow::Next12Months));
            ContactOutcome::Birthdays {
                token,
                upcoming,
                later,
            }
        }
        ContactRequest::Save(submission) => ContactOutcome::Saved(match &submission.target {
            SaveTarget::Create => backend.create_contact(&submission.payload),
            SaveTarget::Update(id) => backend.update_contact(id, &submission.payload),
        }),
        ContactRequest::Delete(id) => {
            let result = backend.delete_contact(&id);
            ContactOutcome::Deleted { id, result }
        }
    }
}

/// Something the surrounding UI has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    InfoReady(Contact),
    EditReady(ContactForm),
    Saved,
    Deleted(ContactId),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    pub requests: Vec<ContactRequest>,
    pub event: Option<ViewEvent>,
}

impl Reaction {
    fn none() -> Self {
        Self::default()
    }

    fn event(event: ViewEvent) -> Self {
        Self {
            requests: Vec::new(),
            event: Some(event),
        }
    }
}

pub struct ContactView {
    state: ViewState,
    cache: Vec<Contact>,
    detail: Option<Contact>,
    birthdays: BirthdayView,
    api_link: String,
    limit: u32,
    seq: RequestSeq,
    list_pending: bool,
    notifier: Box<dyn Notifier>,
    alert: Option<String>,
}

impl ContactView {
    pub fn new(default_mode: ViewMode, limit: u32, notifier: Box<dyn Notifier>) -> Self {
        let state = ViewState::with_mode(default_mode);
        let api_link = ContactQuery::new(&state.search, state.sort, limit).api_link();
        Self {
            state,
            cache: Vec::new(),
            detail: None,
            birthdays: BirthdayView::default(),
            api_link,
            limit,
            seq: RequestSeq::default(),
            list_pending: false,
            notifier,
            alert: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.cache
    }

    pub fn birthdays(&self) -> &BirthdayView {
        &self.birthdays
    }

    pub fn api_link(&self) -> &str {
        &self.api_link
    }

    pub fn is_loading(&self) -> bool {
        self.list_pending
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn tiles(&self) -> Vec<Tile> {
        render_list(&self.state, &self.cache, self.detail.as_ref())
    }

    fn query(&self) -> ContactQuery {
        ContactQuery::new(&self.state.search, self.state.sort, self.limit)
    }

    fn fetch_list(&mut self) -> Vec<ContactRequest> {
        let query = self.query();
        self.api_link = query.api_link();
        self.list_pending = true;
        let token = self.seq.issue(QueryKey::List);
        debug!(seq = token.seq, link = %self.api_link, "fetching contacts");
        vec![ContactRequest::List { token, query }]
    }

    fn clear_expanded(&mut self) {
        self.state.expanded = None;
        self.detail = None;
        self.seq.invalidate(QueryKey::Detail);
    }

    /// Initial load.
    pub fn start(&mut self) -> Vec<ContactRequest> {
        self.fetch_list()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Vec<ContactRequest> {
        self.state.mode = mode;
        if self.state.birthday_mode {
            return Vec::new();
        }
        self.clear_expanded();
        self.fetch_list()
    }

    pub fn set_sort_direction(&mut self, sort: SortDirection) -> Vec<ContactRequest> {
        self.state.sort = sort;
        if self.state.birthday_mode {
            return Vec::new();
        }
        self.clear_expanded();
        self.fetch_list()
    }

    pub fn toggle_sort(&mut self) -> Vec<ContactRequest> {
        self.set_sort_direction(self.state.sort.toggled())
    }

    /// Searching always switches to the detailed list and leaves birthday mode.
    pub fn set_search_text(&mut self, text: &str) -> Vec<ContactRequest> {
        self.state.mode = ViewMode::Detailed;
        self.state.birthday_mode = false;
        self.seq.invalidate(QueryKey::Birthdays);
        self.state.search = text.trim().to_string();
        self.fetch_list()
    }

    pub fn toggle_expand(&mut self, id: &ContactId) -> Vec<ContactRequest> {
        if self.state.mode == ViewMode::Expanded || self.state.birthday_mode {
            return Vec::new();
        }
        if self.state.expanded.as_ref() == Some(id) {
            self.clear_expanded();
            return Vec::new();
        }
        self.state.expanded = Some(id.clone());
        self.detail = None;
        let token = self.seq.issue(QueryKey::Detail);
        vec![ContactRequest::Detail {
            token,
            id: id.clone(),
        }]
    }

    /// Selection moved off every tile.
    pub fn collapse(&mut self) {
        if !self.state.birthday_mode {
            self.clear_expanded();
        }
    }

    pub fn enter_birthday_mode(&mut self) -> Vec<ContactRequest> {
        self.state.birthday_mode = true;
        self.clear_expanded();
        self.birthdays = BirthdayView::Loading;
        self.api_link = BirthdayWindow::Next7Days.path().to_string();
        let token = self.seq.issue(QueryKey::Birthdays);
        vec![ContactRequest::Birthdays { token }]
    }

    /// Back to the tile list with the search, sort and mode that were active.
    pub fn exit_birthday_mode(&mut self) -> Vec<ContactRequest> {
        if !self.state.birthday_mode {
            return Vec::new();
        }
        self.state.birthday_mode = false;
        self.seq.invalidate(QueryKey::Birthdays);
        self.clear_expanded();
        self.fetch_list()
    }

    pub fn open_info(&mut self, id: &ContactId) -> Vec<ContactRequest> {
        self.api_link = format!("/contacts/{id}");
        let token = self.seq.issue(QueryKey::Info);
        vec![ContactRequest::Info {
            token,
            id: id.clone(),
        }]
    }

    pub fn edit(&mut self, id: &ContactId) -> Vec<ContactRequest> {
        vec![ContactRequest::EditLoad { id: id.clone() }]
    }

    pub fn delete(&mut self, id: &ContactId) -> Vec<ContactRequest> {
        vec![ContactRequest::Delete(id.clone())]
    }

    pub fn save(&mut self, submission: Submission) -> Vec<ContactRequest> {
        vec![ContactRequest::Save(submission)]
    }

    /// Re-fetch whatever is on screen.
    pub fn refresh(&mut self) -> Vec<ContactRequest> {
        if self.state.birthday_mode {
            self.enter_birthday_mode()
        } else {
            self.fetch_list()
        }
    }

    /// Clear search, ascending sort, mode 2, no birthday mode, then fetch.
    pub fn reset(&mut self) -> Vec<ContactRequest> {
        self.state.search.clear();
        self.state.sort = SortDirection::Asc;
        self.state.mode = ViewMode::Named;
        self.state.birthday_mode = false;
        self.seq.invalidate(QueryKey::Birthdays);
        self.clear_expanded();
        self.fetch_list()
    }

    fn raise(&mut self, text: String) {
        warn!(alert = %text, "contact view alert");
        self.alert = Some(text);
    }

    fn stale(&self, token: Token) -> bool {
        let stale = !self.seq.is_current(token);
        if stale {
            debug!(key = ?token.key, seq = token.seq, "discarding stale response");
        }
        stale
    }

    pub fn apply(&mut self, outcome: ContactOutcome) -> Reaction {
        match outcome {
            ContactOutcome::List { token, result } => {
                if self.stale(token) {
                    return Reaction::none();
                }
                self.list_pending = false;
                match result {
                    Ok(contacts) => {
                        debug!(count = contacts.len(), "contacts loaded");
                        self.cache = contacts;
                    }
                    Err(err) => {
                        let text = err.alert_text(LIST_FAILED);
                        self.notifier.notify(&text, Severity::Error);
                    }
                }
                Reaction::none()
            }
            ContactOutcome::Detail { token, result } => {
                if self.stale(token) {
                    return Reaction::none();
                }
                match result {
                    Ok(contact) => self.detail = Some(contact),
                    Err(err) => self.raise(err.alert_text(DETAIL_FAILED)),
                }
                Reaction::none()
            }
            ContactOutcome::Info { token, result } => {
                if self.stale(token) {
                    return Reaction::none();
                }
                match result {
                    Ok(contact) => Reaction::event(ViewEvent::InfoReady(contact)),
                    Err(err) => {
                        self.raise(err.alert_text(DETAIL_FAILED));
                        Reaction::none()
                    }
                }
            }
            ContactOutcome::EditLoad { id, result } => match result {
                Ok(contact) => Reaction::event(ViewEvent::EditReady(ContactForm::for_contact(
                    &contact,
                ))),
                Err(err) => {
                    warn!(id = %id, error = %err, "failed to load contact for editing");
                    self.raise(err.alert_text(DETAIL_FAILED));
                    Reaction::none()
                }
            },
            ContactOutcome::Birthdays {
                token,
                upcoming,
                later,
            } => {
                if self.stale(token) {
                    return Reaction::none();
                }
                self.birthdays = BirthdayView::from_results(upcoming, later);
                Reaction::none()
            }
            ContactOutcome::Saved(result) => match result {
                Ok(contact) => {
                    self.notifier
                        .notify(&format!("Контакт збережено: {}", contact.full_name().trim()), Severity::Success);
                    Reaction {
                        requests: self.reset(),
                        event: Some(ViewEvent::Saved),
                    }
                }
                Err(err) => {
                    self.raise(err.alert_text(SAVE_FAILED));
                    Reaction::none()
                }
            },
            ContactOutcome::Deleted { id, result } => match result {
                Ok(()) => {
                    self.notifier
                        .notify(&format!("Контакт {id} видалено"), Severity::Success);
                    Reaction {
                        requests: self.reset(),
                        event: Some(ViewEvent::Deleted(id)),
                    }
                }
                Err(ApiError::Network(_)) => {
                    self.raise(DELETE_NETWORK_FAILED.to_string());
                    Reaction::none()
                }
                Err(err) => {
                    warn!(id = %id, error = %err, "delete failed");
                    self.raise(DELETE_FAILED.to_string());
                    Reaction::none()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{contact, Call, ScriptedBackend};
    use crate::footer::{FooterHandle, FooterLog};
    use crate::form::PhoneRow;
    use crate::model::PhoneNumber;
    use crate::view::tiles::TileBody;

    fn view() -> (ContactView, FooterHandle) {
        let footer = FooterHandle::new(FooterLog::in_memory(5, 15));
        let view = ContactView::new(ViewMode::Named, 100, Box::new(footer.clone()));
        (view, footer)
    }

    /// Run requests to completion, following up on any chained requests.
    fn drive(
        view: &mut ContactView,
        backend: &ScriptedBackend,
        requests: Vec<ContactRequest>,
    ) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        let mut queue = requests;
        while !queue.is_empty() {
            let request = queue.remove(0);
            let reaction = view.apply(perform(backend, request));
            queue.extend(reaction.requests);
            events.extend(reaction.event);
        }
        events
    }

    fn names(view: &ContactView) -> Vec<String> {
        view.contacts()
            .iter()
            .map(|c| c.first_name().to_string())
            .collect()
    }

    fn two() -> ScriptedBackend {
        ScriptedBackend::with_contacts(vec![
            contact("2", "Борис", "Шевченко"),
            contact("1", "Анна", "Коваль"),
        ])
    }

    #[test]
    fn test_sort_toggle_reverses_server_order() {
        let backend = two();
        let (mut view, _) = view();
        let start = view.start();
        drive(&mut view, &backend, start);
        assert_eq!(names(&view), vec!["Анна", "Борис"]);
        assert_eq!(view.api_link(), "/contacts?sort=asc");

        let requests = view.toggle_sort();
        drive(&mut view, &backend, requests);
        assert_eq!(names(&view), vec!["Борис", "Анна"]);
        assert_eq!(view.api_link(), "/contacts?sort=desc");
    }

    #[test]
    fn test_toggle_expand_twice_collapses() {
        let backend = two();
        let (mut view, _) = view();
        let start = view.start();
        drive(&mut view, &backend, start);

        let id = ContactId::from("1");
        let requests = view.toggle_expand(&id);
        assert_eq!(requests.len(), 1);
        drive(&mut view, &backend, requests);
        assert_eq!(view.state().expanded, Some(id.clone()));
        assert!(view.tiles().iter().any(|tile| tile.id == id && tile.is_full()));

        assert!(view.toggle_expand(&id).is_empty());
        assert_eq!(view.state().expanded, None);
        assert!(view.tiles().iter().all(|tile| !tile.is_full()));
    }

    #[test]
    fn test_expand_ignored_in_mode_four_and_birthday_mode() {
        let (mut view, _) = view();
        view.set_view_mode(ViewMode::Expanded);
        assert!(view.toggle_expand(&ContactId::from("1")).is_empty());
        assert_eq!(view.state().expanded, None);

        view.set_view_mode(ViewMode::Named);
        view.enter_birthday_mode();
        assert!(view.toggle_expand(&ContactId::from("1")).is_empty());
    }

    #[test]
    fn test_set_view_mode_clears_expanded_unless_in_birthday_mode() {
        let (mut view, _) = view();
        view.toggle_expand(&ContactId::from("1"));
        let requests = view.set_view_mode(ViewMode::Initials);
        assert_eq!(requests.len(), 1);
        assert_eq!(view.state().expanded, None);

        view.enter_birthday_mode();
        assert!(view.set_view_mode(ViewMode::Detailed).is_empty());
        assert_eq!(view.state().mode, ViewMode::Detailed);
    }

    #[test]
    fn test_birthday_round_trip_restores_state() {
        let backend = two();
        let (mut view, _) = view();
        let requests = view.set_search_text("  ан ");
        drive(&mut view, &backend, requests);
        let requests = view.toggle_sort();
        drive(&mut view, &backend, requests);
        let before = view.state().clone();

        let requests = view.enter_birthday_mode();
        assert_eq!(view.api_link(), "/contacts/birthdays/next7days");
        drive(&mut view, &backend, requests);
        assert!(view.tiles().is_empty());
        assert!(matches!(view.birthdays(), BirthdayView::Loaded { .. }));
        assert!(view.toggle_sort().is_empty());
        view.toggle_sort();

        let requests = view.exit_birthday_mode();
        drive(&mut view, &backend, requests);
        assert_eq!(view.state(), &before);
        assert_eq!(view.api_link(), "/contacts?search=%D0%B0%D0%BD&sort=desc");
    }

    #[test]
    fn test_search_forces_detailed_mode_and_trims() {
        let backend = two();
        let (mut view, _) = view();
        view.enter_birthday_mode();
        let requests = view.set_search_text("  Анна ");
        assert_eq!(view.state().mode, ViewMode::Detailed);
        assert!(!view.state().birthday_mode);
        drive(&mut view, &backend, requests);
        assert_eq!(names(&view), vec!["Анна"]);
        assert!(backend.calls().iter().any(|call| matches!(
            call,
            Call::List(query) if query.search == "Анна"
        )));
    }

    #[test]
    fn test_stale_list_response_is_discarded() {
        let backend = two();
        let (mut view, _) = view();
        let slow = view.start();
        let fast = view.set_search_text("Борис");

        drive(&mut view, &backend, fast);
        assert_eq!(names(&view), vec!["Борис"]);

        drive(&mut view, &backend, slow);
        assert_eq!(names(&view), vec!["Борис"]);
        assert!(!view.is_loading());
    }

    #[test]
    fn test_stale_birthday_response_after_exit_is_ignored() {
        let backend = two();
        let (mut view, _) = view();
        let pending = view.enter_birthday_mode();
        view.exit_birthday_mode();
        drive(&mut view, &backend, pending);
        assert_eq!(view.birthdays(), &BirthdayView::Loading);
    }

    #[test]
    fn test_failed_list_keeps_cache_and_notifies() {
        let backend = two();
        let (mut view, footer) = view();
        let start = view.start();
        drive(&mut view, &backend, start);

        backend.fail_next(ApiError::Network("refused".into()));
        let requests = view.refresh();
        drive(&mut view, &backend, requests);
        assert_eq!(names(&view), vec!["Анна", "Борис"]);
        let log = footer.borrow();
        assert_eq!(log.visible()[0].severity, Severity::Error);
        assert!(log.visible()[0].msg.starts_with("Помилка мережі"));
    }

    #[test]
    fn test_failed_delete_leaves_list_and_alerts() {
        let backend = two();
        let (mut view, _) = view();
        let start = view.start();
        drive(&mut view, &backend, start);
        let before = view.tiles();

        backend.fail_next(ApiError::Status {
            status: 500,
            detail: None,
        });
        let requests = view.delete(&ContactId::from("1"));
        let events = drive(&mut view, &backend, requests);
        assert!(events.is_empty());
        assert_eq!(view.tiles(), before);
        assert_eq!(view.take_alert().as_deref(), Some(DELETE_FAILED));
        assert_eq!(view.take_alert(), None);

        backend.fail_next(ApiError::Network("down".into()));
        let requests = view.delete(&ContactId::from("1"));
        drive(&mut view, &backend, requests);
        assert_eq!(view.take_alert().as_deref(), Some(DELETE_NETWORK_FAILED));
    }

    #[test]
    fn test_successful_delete_resets_and_refetches() {
        let backend = two();
        let (mut view, _) = view();
        let requests = view.set_search_text("Анна");
        drive(&mut view, &backend, requests);

        let requests = view.delete(&ContactId::from("1"));
        let events = drive(&mut view, &backend, requests);
        assert_eq!(events, vec![ViewEvent::Deleted(ContactId::from("1"))]);
        assert_eq!(view.state().mode, ViewMode::Named);
        assert_eq!(view.state().search, "");
        assert!(matches!(backend.calls().last(), Some(Call::List(_))));
    }

    #[test]
    fn test_create_form_posts_phone_rows() {
        let backend = two();
        let (mut view, _) = view();
        let mut form = ContactForm::new();
        form.first_name = "Віра".into();
        form.email = "vira@example.com".into();
        form.birthday = "1999-09-09".into();
        form.phones = vec![PhoneRow::new("123", "Мобільний")];

        let submission = form.submit().unwrap();
        let requests = view.save(submission);
        let events = drive(&mut view, &backend, requests);
        assert_eq!(events, vec![ViewEvent::Saved]);

        let posted = backend
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::Create(payload) => Some(payload),
                _ => None,
            })
            .unwrap();
        assert_eq!(posted.phone_numbers, vec![PhoneNumber::new("123", "Мобільний")]);
    }

    #[test]
    fn test_save_validation_error_becomes_alert() {
        let backend = two();
        let (mut view, _) = view();
        backend.fail_next(ApiError::from_body(
            422,
            r#"{"detail": [{"loc": ["body", "email"], "msg": "invalid"}]}"#,
        ));
        let mut form = ContactForm::for_contact(&contact("1", "Анна", "Коваль"));
        form.email = "a@b".into();
        form.birthday = "1990-01-01".into();
        form.phones[0].number = "12".into();
        let requests = view.save(form.submit().unwrap());
        assert!(matches!(&requests[0], ContactRequest::Save(s) if s.target == SaveTarget::Update(ContactId::from("1"))));
        drive(&mut view, &backend, requests);
        assert_eq!(view.take_alert().as_deref(), Some("invalid [body.email]"));
    }

    #[test]
    fn test_info_and_edit_events() {
        let backend = two();
        let (mut view, _) = view();
        let requests = view.open_info(&ContactId::from("2"));
        assert_eq!(view.api_link(), "/contacts/2");
        let events = drive(&mut view, &backend, requests);
        assert!(matches!(&events[0], ViewEvent::InfoReady(c) if c.first_name() == "Борис"));

        let requests = view.edit(&ContactId::from("2"));
        let events = drive(&mut view, &backend, requests);
        assert!(matches!(&events[0], ViewEvent::EditReady(form) if form.first_name == "Борис"));

        let requests = view.open_info(&ContactId::from("404"));
        let events = drive(&mut view, &backend, requests);
        assert!(events.is_empty());
        assert_eq!(view.take_alert().as_deref(), Some("Contact not found"));
    }

    #[test]
    fn test_info_and_expand_do_not_cancel_each_other() {
        let backend = two();
        let (mut view, _) = view();
        let start = view.start();
        drive(&mut view, &backend, start);

        let expand = view.toggle_expand(&ContactId::from("1"));
        let info = view.open_info(&ContactId::from("2"));
        drive(&mut view, &backend, expand);
        let events = drive(&mut view, &backend, info);
        assert_eq!(view.state().expanded, Some(ContactId::from("1")));
        assert_eq!(
            view.detail.as_ref().map(|c| c.id.clone()),
            Some(ContactId::from("1"))
        );
        assert!(matches!(&events[0], ViewEvent::InfoReady(c) if c.first_name() == "Борис"));

        let info = view.open_info(&ContactId::from("1"));
        view.collapse();
        let expand = view.toggle_expand(&ContactId::from("2"));
        let events = drive(&mut view, &backend, info);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ViewEvent::InfoReady(c) if c.first_name() == "Анна"));
        drive(&mut view, &backend, expand);
        assert_eq!(
            view.detail.as_ref().map(|c| c.id.clone()),
            Some(ContactId::from("2"))
        );
    }

    #[test]
    fn test_failed_detail_falls_back_to_summary_card() {
        let backend = two();
        let (mut view, _) = view();
        let start = view.start();
        drive(&mut view, &backend, start);

        backend.fail_next(ApiError::Network("down".into()));
        let requests = view.toggle_expand(&ContactId::from("1"));
        drive(&mut view, &backend, requests);
        assert!(view.take_alert().is_some());
        let tile = view
            .tiles()
            .into_iter()
            .find(|tile| tile.id == ContactId::from("1"))
            .unwrap();
        let TileBody::Full(card) = tile.body else {
            panic!("expected full card");
        };
        assert_eq!(card.name, "Анна Коваль");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut view, _) = view();
        view.set_search_text("x");
        view.toggle_sort();
        view.enter_birthday_mode();
        let requests = view.reset();
        assert_eq!(requests.len(), 1);
        let state = view.state();
        assert_eq!(state.mode, ViewMode::Named);
        assert_eq!(state.sort, SortDirection::Asc);
        assert!(state.search.is_empty());
        assert!(!state.birthday_mode);
    }
}
