//! Create/edit form for a single contact.

use thiserror::Error;

use crate::model::{parse_date, Contact, ContactId, ContactPayload, PhoneNumber, DEFAULT_PHONE_LABEL};

pub const PHONE_LABELS: [&str; 4] = ["Мобільний", "Домашній", "Робочий", "Інший"];

/// Filled in when the birthday is left empty on the final attempt.
pub const DEFAULT_BIRTHDAY: &str = "2022-11-06";
/// Empty-birthday submissions allowed before the default is filled in.
pub const BIRTHDAY_ATTEMPTS: u8 = 3;

const PHONE_MIN: usize = 2;
const PHONE_MAX: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Вкажіть дату народження!")]
    BirthdayMissing,
    #[error("Дата народження має бути у форматі РРРР-ММ-ДД")]
    BirthdayInvalid,
    #[error("Вкажіть ім'я")]
    FirstNameMissing,
    #[error("Вкажіть коректний email")]
    EmailInvalid,
    #[error("Телефон #{0}: це поле обовʼязкове")]
    PhoneMissing(usize),
    #[error("Телефон #{0}: від 2 до 32 символів")]
    PhoneLength(usize),
    #[error("Телефон #{0}: тільки цифри, +, -, (, ), пробіли")]
    PhoneChars(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRow {
    pub number: String,
    pub label: String,
}

impl Default for PhoneRow {
    fn default() -> Self {
        Self {
            number: String::new(),
            label: DEFAULT_PHONE_LABEL.to_string(),
        }
    }
}

impl PhoneRow {
    pub fn new(number: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            label: label.into(),
        }
    }

    /// Advance to the next known label; unknown labels restart the cycle.
    pub fn cycle_label(&mut self) {
        let next = PHONE_LABELS
            .iter()
            .position(|label| *label == self.label)
            .map(|idx| (idx + 1) % PHONE_LABELS.len())
            .unwrap_or(0);
        self.label = PHONE_LABELS[next].to_string();
    }

    fn validate(&self, position: usize) -> Result<(), FormError> {
        let number = self.number.trim();
        if number.is_empty() {
            return Err(FormError::PhoneMissing(position));
        }
        let len = number.chars().count();
        if !(PHONE_MIN..=PHONE_MAX).contains(&len) {
            return Err(FormError::PhoneLength(position));
        }
        let allowed = |ch: char| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')');
        if !number.chars().all(allowed) {
            return Err(FormError::PhoneChars(position));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveTarget {
    #[default]
    Create,
    Update(ContactId),
}

/// A validated form ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SaveTarget,
    pub payload: ContactPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Birthday,
    Phone(usize),
    Groups,
    ExtraInfo,
}

impl FormField {
    pub fn label(self) -> String {
        match self {
            FormField::FirstName => "Ім'я".to_string(),
            FormField::LastName => "Прізвище".to_string(),
            FormField::Email => "Email".to_string(),
            FormField::Birthday => "Дата народження".to_string(),
            FormField::Phone(idx) => format!("Телефон #{}", idx + 1),
            FormField::Groups => "Групи".to_string(),
            FormField::ExtraInfo => "Додатково".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub target: SaveTarget,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: String,
    pub phones: Vec<PhoneRow>,
    /// Comma separated group names.
    pub groups: String,
    pub extra_info: String,
    birthday_attempts: u8,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            target: SaveTarget::Create,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            birthday: String::new(),
            phones: vec![PhoneRow::default()],
            groups: String::new(),
            extra_info: String::new(),
            birthday_attempts: 0,
        }
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled for editing `contact`.
    pub fn for_contact(contact: &Contact) -> Self {
        let mut phones: Vec<PhoneRow> = contact
            .phone_numbers
            .iter()
            .map(|phone| {
                PhoneRow::new(
                    phone.number.clone(),
                    phone
                        .label
                        .clone()
                        .filter(|label| !label.is_empty())
                        .unwrap_or_else(|| DEFAULT_PHONE_LABEL.to_string()),
                )
            })
            .collect();
        if phones.is_empty() {
            phones.push(PhoneRow::default());
        }

        Self {
            target: SaveTarget::Update(contact.id.clone()),
            first_name: contact.first_name().to_string(),
            last_name: contact.last_name().to_string(),
            email: contact.email().to_string(),
            birthday: contact.birthday().chars().take(10).collect(),
            phones,
            groups: contact
                .groups
                .iter()
                .map(|group| group.name())
                .collect::<Vec<_>>()
                .join(", "),
            extra_info: contact.extra_info().to_string(),
            birthday_attempts: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.target {
            SaveTarget::Create => "Створити контакт",
            SaveTarget::Update(_) => "Редагувати контакт",
        }
    }

    pub fn birthday_attempts(&self) -> u8 {
        self.birthday_attempts
    }

    /// Clear every field and return to create mode. The birthday attempt
    /// counter is kept.
    pub fn reset(&mut self) {
        let attempts = self.birthday_attempts;
        *self = Self::default();
        self.birthday_attempts = attempts;
    }

    pub fn add_phone(&mut self) {
        self.phones.push(PhoneRow::default());
    }

    pub fn remove_phone(&mut self, idx: usize) {
        if idx < self.phones.len() {
            self.phones.remove(idx);
        }
    }

    /// Editable fields in focus order.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::FirstName,
            FormField::LastName,
            FormField::Email,
            FormField::Birthday,
        ];
        fields.extend((0..self.phones.len()).map(FormField::Phone));
        fields.push(FormField::Groups);
        fields.push(FormField::ExtraInfo);
        fields
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Birthday => &self.birthday,
            FormField::Phone(idx) => self
                .phones
                .get(idx)
                .map(|row| row.number.as_str())
                .unwrap_or(""),
            FormField::Groups => &self.groups,
            FormField::ExtraInfo => &self.extra_info,
        }
    }

    pub fn set_value(&mut self, field: FormField, value: &str) {
        let value = value.to_string();
        match field {
            FormField::FirstName => self.first_name = value,
            FormField::LastName => self.last_name = value,
            FormField::Email => self.email = value,
            FormField::Birthday => self.birthday = value,
            FormField::Phone(idx) => {
                if let Some(row) = self.phones.get_mut(idx) {
                    row.number = value;
                }
            }
            FormField::Groups => self.groups = value,
            FormField::ExtraInfo => self.extra_info = value,
        }
    }

    /// Apply the birthday attempt rule, validate, and build the request body.
    pub fn submit(&mut self) -> Result<Submission, FormError> {
        if self.birthday.trim().is_empty() {
            self.birthday_attempts += 1;
            if self.birthday_attempts < BIRTHDAY_ATTEMPTS {
                return Err(FormError::BirthdayMissing);
            }
            self.birthday = DEFAULT_BIRTHDAY.to_string();
            self.birthday_attempts = 0;
        } else {
            self.birthday_attempts = 0;
        }

        if self.first_name.trim().is_empty() {
            return Err(FormError::FirstNameMissing);
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(FormError::EmailInvalid);
        }
        let birthday = self.birthday.trim();
        if birthday.len() != 10 || parse_date(birthday).is_none() {
            return Err(FormError::BirthdayInvalid);
        }
        for (idx, row) in self.phones.iter().enumerate() {
            row.validate(idx + 1)?;
        }

        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Ok(Submission {
            target: self.target.clone(),
            payload: ContactPayload {
                first_name: self.first_name.trim().to_string(),
                last_name: optional(&self.last_name),
                email: email.to_string(),
                birthday: birthday.to_string(),
                phone_numbers: self
                    .phones
                    .iter()
                    .filter(|row| !row.number.trim().is_empty())
                    .map(|row| PhoneNumber::new(row.number.trim(), row.label.clone()))
                    .collect(),
                extra_info: optional(&self.extra_info),
                groups: self
                    .groups
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupRef;

    fn filled() -> ContactForm {
        let mut form = ContactForm::new();
        form.first_name = "Анна".into();
        form.email = "anna@example.com".into();
        form.birthday = "1990-05-17".into();
        form.phones[0] = PhoneRow::new("123", "Мобільний");
        form
    }

    #[test]
    fn test_fresh_form_has_one_empty_row() {
        let form = ContactForm::new();
        assert_eq!(form.phones, vec![PhoneRow::default()]);
        assert_eq!(form.target, SaveTarget::Create);
    }

    #[test]
    fn test_submit_builds_post_body_with_phone_rows() {
        let mut form = filled();
        let submission = form.submit().unwrap();
        assert_eq!(submission.target, SaveTarget::Create);
        assert_eq!(
            submission.payload.phone_numbers,
            vec![PhoneNumber::new("123", "Мобільний")]
        );
        assert_eq!(submission.payload.last_name, None);
        assert!(submission.payload.groups.is_empty());
    }

    #[test]
    fn test_birthday_autofills_on_third_empty_attempt() {
        let mut form = filled();
        form.birthday.clear();
        assert_eq!(form.submit(), Err(FormError::BirthdayMissing));
        assert_eq!(form.submit(), Err(FormError::BirthdayMissing));
        let submission = form.submit().unwrap();
        assert_eq!(submission.payload.birthday, DEFAULT_BIRTHDAY);
        assert_eq!(form.birthday_attempts(), 0);
    }

    #[test]
    fn test_birthday_present_resets_counter() {
        let mut form = filled();
        form.birthday.clear();
        assert!(form.submit().is_err());
        assert_eq!(form.birthday_attempts(), 1);
        form.birthday = "2000-01-01".into();
        form.submit().unwrap();
        assert_eq!(form.birthday_attempts(), 0);
    }

    #[test]
    fn test_reset_keeps_attempt_counter() {
        let mut form = filled();
        form.birthday.clear();
        assert!(form.submit().is_err());
        form.reset();
        assert_eq!(form.first_name, "");
        assert_eq!(form.birthday_attempts(), 1);
    }

    #[test]
    fn test_field_validation() {
        let mut form = filled();
        form.first_name = "  ".into();
        assert_eq!(form.submit(), Err(FormError::FirstNameMissing));

        let mut form = filled();
        form.email = "nope".into();
        assert_eq!(form.submit(), Err(FormError::EmailInvalid));

        let mut form = filled();
        form.birthday = "17.05.1990".into();
        assert_eq!(form.submit(), Err(FormError::BirthdayInvalid));
    }

    #[test]
    fn test_phone_row_rules() {
        let mut form = filled();
        form.add_phone();
        assert_eq!(form.submit(), Err(FormError::PhoneMissing(2)));

        form.phones[1].number = "1".into();
        assert_eq!(form.submit(), Err(FormError::PhoneLength(2)));

        form.phones[1].number = "x".repeat(33);
        assert_eq!(form.submit(), Err(FormError::PhoneLength(2)));

        form.phones[1].number = "12ab".into();
        assert_eq!(form.submit(), Err(FormError::PhoneChars(2)));

        form.phones[1].number = "+38 (050) 123-45".into();
        assert_eq!(form.submit().unwrap().payload.phone_numbers.len(), 2);

        form.remove_phone(0);
        form.remove_phone(0);
        assert!(form.submit().unwrap().payload.phone_numbers.is_empty());
    }

    #[test]
    fn test_cycle_label() {
        let mut row = PhoneRow::default();
        row.cycle_label();
        assert_eq!(row.label, "Домашній");
        row.label = "Інший".into();
        row.cycle_label();
        assert_eq!(row.label, "Мобільний");
        row.label = "custom".into();
        row.cycle_label();
        assert_eq!(row.label, "Мобільний");
    }

    #[test]
    fn test_for_contact_prefills_edit() {
        let contact = Contact {
            id: ContactId::from("5"),
            first_name: Some("Борис".into()),
            birthday: Some("1985-01-20T00:00:00".into()),
            phone_numbers: vec![PhoneNumber {
                number: "777".into(),
                label: None,
            }],
            groups: vec![GroupRef::Plain("Робота".into()), GroupRef::Plain("Друзі".into())],
            ..Contact::default()
        };
        let form = ContactForm::for_contact(&contact);
        assert_eq!(form.target, SaveTarget::Update(ContactId::from("5")));
        assert_eq!(form.birthday, "1985-01-20");
        assert_eq!(form.phones, vec![PhoneRow::new("777", "Мобільний")]);
        assert_eq!(form.groups, "Робота, Друзі");
        assert_eq!(form.title(), "Редагувати контакт");

        let empty = ContactForm::for_contact(&Contact::default());
        assert_eq!(empty.phones.len(), 1);
    }

    #[test]
    fn test_fields_follow_phone_rows() {
        let mut form = ContactForm::new();
        form.add_phone();
        let fields = form.fields();
        assert!(fields.contains(&FormField::Phone(1)));
        form.set_value(FormField::Phone(1), "555");
        assert_eq!(form.value(FormField::Phone(1)), "555");
        assert_eq!(form.value(FormField::Phone(9)), "");
    }
}
