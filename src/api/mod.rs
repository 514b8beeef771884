//! Contacts backend abstraction.
//!
//! This module provides:
//! - `Backend` trait for the REST operations the client consumes
//! - `HttpBackend`, the reqwest implementation
//! - the background `Worker` that runs backend calls off the UI thread

pub mod http;
pub mod worker;

use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ApiError;
use crate::model::{
    Avatar, Contact, ContactId, ContactPayload, DbReply, UserProfile,
};
use crate::view::state::SortDirection;

pub use http::HttpBackend;

pub type ApiResult<T> = Result<T, ApiError>;

/// Query parameters of a list fetch. Filtering and ordering happen server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    pub search: String,
    pub sort: SortDirection,
    pub limit: u32,
}

impl ContactQuery {
    pub fn new(search: &str, sort: SortDirection, limit: u32) -> Self {
        Self {
            search: search.trim().to_string(),
            sort,
            limit,
        }
    }

    /// `search` is left out when empty.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        params.push(("sort", self.sort.as_str().to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }

    /// Path shown to the user as the equivalent API call.
    pub fn api_link(&self) -> String {
        if self.search.is_empty() {
            format!("/contacts?sort={}", self.sort)
        } else {
            format!(
                "/contacts?search={}&sort={}",
                encode_uri_component(&self.search),
                self.sort
            )
        }
    }
}

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthdayWindow {
    Next7Days,
    Next12Months,
}

impl BirthdayWindow {
    pub fn path(self) -> &'static str {
        match self {
            BirthdayWindow::Next7Days => "/contacts/birthdays/next7days",
            BirthdayWindow::Next12Months => "/contacts/birthdays/next12months",
        }
    }
}

/// Number of fake contacts generated when none is given.
pub const DEFAULT_FAKE_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbAction {
    CreateDb,
    Init,
    DropDb,
    FillFake(u32),
    Clear,
    CheckState,
}

impl DbAction {
    pub fn path(self) -> String {
        match self {
            DbAction::CreateDb => "/db/create-db".to_string(),
            DbAction::Init => "/db/init".to_string(),
            DbAction::DropDb => "/db/drop-db".to_string(),
            DbAction::FillFake(count) => format!("/db/fill-fake?n={count}"),
            DbAction::Clear => "/db/clear".to_string(),
            DbAction::CheckState => "/db/check-state".to_string(),
        }
    }

    pub fn is_query(self) -> bool {
        matches!(self, DbAction::CheckState)
    }

    pub fn needs_confirmation(self) -> bool {
        matches!(self, DbAction::DropDb | DbAction::Clear)
    }

    pub fn label(self) -> &'static str {
        match self {
            DbAction::CreateDb => "Створити базу",
            DbAction::Init => "Ініціалізувати таблиці",
            DbAction::DropDb => "Видалити базу",
            DbAction::FillFake(_) => "Заповнити тестовими контактами",
            DbAction::Clear => "Очистити контакти",
            DbAction::CheckState => "Перевірити стан",
        }
    }
}

/// REST operations consumed by the client. Implementations must be movable
/// onto the worker thread.
pub trait Backend: Send {
    fn list_contacts(&self, query: &ContactQuery) -> ApiResult<Vec<Contact>>;

    fn contact(&self, id: &ContactId) -> ApiResult<Contact>;

    fn create_contact(&self, payload: &ContactPayload) -> ApiResult<Contact>;

    fn update_contact(&self, id: &ContactId, payload: &ContactPayload) -> ApiResult<Contact>;

    fn delete_contact(&self, id: &ContactId) -> ApiResult<()>;

    fn birthdays(&self, window: BirthdayWindow) -> ApiResult<Vec<Contact>>;

    fn db_action(&self, action: DbAction) -> ApiResult<DbReply>;

    fn current_user(&self) -> ApiResult<UserProfile>;

    fn update_username(&self, username: &str) -> ApiResult<()>;

    fn update_password(&self, current: &str, new: &str) -> ApiResult<()>;

    fn request_password_reset(&self) -> ApiResult<()>;

    fn avatars(&self) -> ApiResult<Vec<Avatar>>;

    fn upload_avatar(&self, path: &Path) -> ApiResult<()>;

    fn set_main_avatar(&self, id: i64) -> ApiResult<()>;

    fn delete_avatar(&self, id: i64) -> ApiResult<()>;
}
