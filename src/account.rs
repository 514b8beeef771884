//! Current user settings: username, password and avatars.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::Backend;
use crate::footer::FooterNote;
use crate::model::{Avatar, UserProfile};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Ім'я користувача не може бути порожнім")]
    UsernameEmpty,
    #[error("Всі поля повинні бути заповнені")]
    PasswordFieldsMissing,
    #[error("Новий пароль і підтвердження не співпадають")]
    PasswordMismatch,
    #[error("Новий пароль повинен містити не менше 6 символів")]
    PasswordTooShort,
}

pub fn validate_username(raw: &str) -> Result<String, AccountError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AccountError::UsernameEmpty);
    }
    Ok(username.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.current.is_empty() || self.new.is_empty() || self.confirm.is_empty() {
            return Err(AccountError::PasswordFieldsMissing);
        }
        if self.new != self.confirm {
            return Err(AccountError::PasswordMismatch);
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAction {
    LoadProfile,
    UpdateUsername(String),
    UpdatePassword { current: String, new: String },
    ResetPassword,
    LoadAvatars,
    UploadAvatar(PathBuf),
    SetMainAvatar(i64),
    DeleteAvatar(i64),
}

/// Result of an account action. `profile` and `avatars` are set when the
/// action (re)loaded them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountOutcome {
    pub notes: Vec<FooterNote>,
    pub alert: Option<String>,
    pub profile: Option<UserProfile>,
    pub avatars: Option<Vec<Avatar>>,
}

fn load_avatars(backend: &dyn Backend, outcome: &mut AccountOutcome) {
    match backend.avatars() {
        Ok(avatars) => outcome.avatars = Some(avatars),
        Err(err) => {
            warn!(error = %err, "failed to load avatars");
            outcome
                .notes
                .push(FooterNote::error("Помилка завантаження аватарів"));
        }
    }
}

pub fn run(backend: &dyn Backend, action: AccountAction) -> AccountOutcome {
    let mut outcome = AccountOutcome::default();
    match action {
        AccountAction::LoadProfile => match backend.current_user() {
            Ok(profile) => outcome.profile = Some(profile),
            Err(err) => {
                warn!(error = %err, "failed to load current user");
                outcome.alert = Some(err.alert_text("Помилка при завантаженні налаштувань користувача"));
            }
        },
        AccountAction::UpdateUsername(username) => match backend.update_username(&username) {
            Ok(()) => {
                info!(username = %username, "username updated");
                outcome
                    .notes
                    .push(FooterNote::success("Ім'я користувача успішно оновлено"));
                if let Ok(profile) = backend.current_user() {
                    outcome.profile = Some(profile);
                }
            }
            Err(err) => {
                warn!(error = %err, "username update failed");
                outcome.alert = Some("Помилка при оновленні імені користувача".to_string());
            }
        },
        AccountAction::UpdatePassword { current, new } => {
            match backend.update_password(&current, &new) {
                Ok(()) => outcome
                    .notes
                    .push(FooterNote::success("Пароль успішно змінено")),
                Err(err) => {
                    warn!(error = %err, "password change failed");
                    outcome.alert = Some(
                        "Помилка при зміні пароля. Можливо, поточний пароль введено невірно."
                            .to_string(),
                    );
                }
            }
        }
        AccountAction::ResetPassword => match backend.request_password_reset() {
            Ok(()) => outcome.notes.push(FooterNote::success(
                "Посилання для скидання пароля відправлено на вашу електронну пошту",
            )),
            Err(err) => {
                warn!(error = %err, "password reset request failed");
                outcome.alert = Some("Помилка при запиті на скидання пароля".to_string());
            }
        },
        AccountAction::LoadAvatars => load_avatars(backend, &mut outcome),
        AccountAction::UploadAvatar(path) => {
            match backend.upload_avatar(&path) {
                Ok(()) => outcome
                    .notes
                    .push(FooterNote::success("Аватар успішно завантажено")),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "avatar upload failed");
                    outcome
                        .notes
                        .push(FooterNote::error("Помилка завантаження аватара"));
                }
            }
            load_avatars(backend, &mut outcome);
        }
        AccountAction::SetMainAvatar(id) => {
            match backend.set_main_avatar(id) {
                Ok(()) => outcome
                    .notes
                    .push(FooterNote::success("Аватар встановлено як основний")),
                Err(_) => outcome
                    .notes
                    .push(FooterNote::error("Помилка встановлення основного аватара")),
            }
            load_avatars(backend, &mut outcome);
        }
        AccountAction::DeleteAvatar(id) => {
            match backend.delete_avatar(id) {
                Ok(()) => outcome
                    .notes
                    .push(FooterNote::success("Аватар успішно видалено")),
                Err(_) => outcome
                    .notes
                    .push(FooterNote::error("Помилка видалення аватара")),
            }
            load_avatars(backend, &mut outcome);
        }
    }
    outcome
}

/// Avatar list with a cursor.
#[derive(Debug, Clone, Default)]
pub struct AvatarGallery {
    avatars: Vec<Avatar>,
    selected: usize,
}

impl AvatarGallery {
    /// Replace the list, keeping the cursor on the same avatar when it survives.
    pub fn replace(&mut self, avatars: Vec<Avatar>) {
        let current = self.selected().map(|avatar| avatar.id);
        self.avatars = avatars;
        self.selected = current
            .and_then(|id| self.avatars.iter().position(|avatar| avatar.id == id))
            .unwrap_or(0);
    }

    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Avatar> {
        self.avatars.get(self.selected)
    }

    pub fn main(&self) -> Option<&Avatar> {
        self.avatars.iter().find(|avatar| avatar.is_main)
    }

    pub fn select_next(&mut self) {
        if !self.avatars.is_empty() {
            self.selected = (self.selected + 1) % self.avatars.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.avatars.is_empty() {
            self.selected = (self.selected + self.avatars.len() - 1) % self.avatars.len();
        }
    }
}
