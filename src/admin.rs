//! Database maintenance flows.
//!
//! Each action turns backend replies into footer notes. Notes are collected
//! rather than written directly so the flow can run on the worker thread.

use tracing::info;

use crate::api::{Backend, DbAction};
use crate::error::ApiError;
use crate::footer::FooterNote;
use crate::model::{DbReply, DbStatus};

pub const READY: &str = "База і таблиці готові!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOutcome {
    pub action: DbAction,
    pub notes: Vec<FooterNote>,
    /// The contact list should be reset and fetched again.
    pub refresh_contacts: bool,
}

impl DbOutcome {
    fn new(action: DbAction) -> Self {
        Self {
            action,
            notes: Vec::new(),
            refresh_contacts: false,
        }
    }
}

fn context(action: DbAction) -> &'static str {
    match action {
        DbAction::CreateDb => "при створенні бази",
        DbAction::Init => "при ініціалізації бази",
        DbAction::DropDb => "при видаленні бази",
        DbAction::FillFake(_) => "при додаванні контактів",
        DbAction::Clear => "при видаленні контактів",
        DbAction::CheckState => "при перевірці стану бази",
    }
}

/// Auth failures and the rest are worded differently.
pub fn failure_note(action: DbAction, err: &ApiError) -> FooterNote {
    if err.is_auth() {
        FooterNote::error(format!("Помилка авторизації {}", context(action)))
    } else {
        FooterNote::error(format!("Помилка {}: {}", context(action), err))
    }
}

/// Footer note for a `/db/check-state` reply.
pub fn check_state_note(reply: &DbReply) -> FooterNote {
    match reply.status {
        DbStatus::NoDb => FooterNote::error(reply.message_or("Бази даних не існує")),
        DbStatus::NoTables => FooterNote::warn(reply.message_or("Таблиці не створені")),
        DbStatus::NoContacts => FooterNote::warn(reply.message_or("Контактів немає")),
        DbStatus::Ok => FooterNote::success(format!(
            "Контактів у базі: {}",
            reply.count.unwrap_or(0)
        )),
        DbStatus::Noenv => FooterNote::error(reply.message_or("Не налаштоване оточення бази")),
        other => FooterNote::info(reply.message_or(other.as_str())),
    }
}

fn check_state(backend: &dyn Backend, outcome: &mut DbOutcome) {
    match backend.db_action(DbAction::CheckState) {
        Ok(reply) => outcome.notes.push(check_state_note(&reply)),
        Err(err) => outcome.notes.push(failure_note(DbAction::CheckState, &err)),
    }
}

fn is_ready(status: DbStatus) -> bool {
    matches!(status, DbStatus::Created | DbStatus::Exists)
}

fn create(backend: &dyn Backend, outcome: &mut DbOutcome) {
    outcome.notes.push(FooterNote::info("Створення бази..."));
    let reply = match backend.db_action(DbAction::CreateDb) {
        Ok(reply) => reply,
        Err(err) => {
            outcome.notes.push(failure_note(DbAction::CreateDb, &err));
            return;
        }
    };

    match reply.status {
        status if is_ready(status) => {
            outcome
                .notes
                .push(FooterNote::success(reply.message_or(status.as_str())));
            match backend.db_action(DbAction::Init) {
                Ok(init) if is_ready(init.status) => {
                    outcome.notes.push(FooterNote::success(READY));
                    outcome.refresh_contacts = true;
                }
                Ok(_) => outcome
                    .notes
                    .push(FooterNote::error("Помилка ініціалізації таблиць")),
                Err(err) => outcome.notes.push(failure_note(DbAction::Init, &err)),
            }
        }
        DbStatus::Noenv => outcome
            .notes
            .push(FooterNote::error(reply.message_or("Не налаштоване оточення бази"))),
        _ => outcome
            .notes
            .push(FooterNote::error(reply.message_or("Помилка створення бази"))),
    }
}

fn drop_db(backend: &dyn Backend, outcome: &mut DbOutcome) {
    outcome.notes.push(FooterNote::info("Видалення бази..."));
    match backend.db_action(DbAction::DropDb) {
        Ok(reply) if reply.status == DbStatus::Dropped => {
            outcome
                .notes
                .push(FooterNote::success(reply.message_or("Базу видалено")));
            outcome.refresh_contacts = true;
        }
        Ok(reply) => outcome
            .notes
            .push(FooterNote::error(reply.message_or("Помилка видалення бази"))),
        Err(err) => outcome.notes.push(failure_note(DbAction::DropDb, &err)),
    }
}

fn simple(backend: &dyn Backend, action: DbAction, success: &str, outcome: &mut DbOutcome) {
    match backend.db_action(action) {
        Ok(_) => {
            outcome.notes.push(FooterNote::success(success));
            outcome.refresh_contacts = true;
        }
        Err(err) => outcome.notes.push(failure_note(action, &err)),
    }
}

/// Run a maintenance action. Create, drop and clear re-check the database
/// state afterwards.
pub fn run(backend: &dyn Backend, action: DbAction) -> DbOutcome {
    info!(action = ?action, "database action");
    let mut outcome = DbOutcome::new(action);
    match action {
        DbAction::CreateDb => create(backend, &mut outcome),
        DbAction::Init => simple(backend, action, "База успішно ініціалізована", &mut outcome),
        DbAction::DropDb => drop_db(backend, &mut outcome),
        DbAction::FillFake(_) => simple(backend, action, "Контакти успішно додано", &mut outcome),
        DbAction::Clear => simple(backend, action, "Контакти успішно видалено", &mut outcome),
        DbAction::CheckState => {}
    }
    if matches!(
        action,
        DbAction::CreateDb | DbAction::DropDb | DbAction::Clear | DbAction::CheckState
    ) {
        check_state(backend, &mut outcome);
    }
    outcome
}
