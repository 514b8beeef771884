//! Wire types exchanged with the contacts backend.
//!
//! The backend is loose about shapes: ids arrive as integers, phone entries
//! may be bare strings, lists may be `null`. Decoding here absorbs those
//! variations so the rest of the client only sees one form.

use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

/// Label used for phone numbers that arrive without one.
pub const DEFAULT_PHONE_LABEL: &str = "Мобільний";

/// Opaque contact identifier. Only ever compared and formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContactId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ContactId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ContactId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Int(i64),
            Text(String),
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Int(value) => Self(value.to_string()),
            Helper::Text(value) => Self(value),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumber {
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PhoneNumber {
    pub fn new(number: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            label: Some(label.into()),
        }
    }

    /// `number (label)` as shown on full cards.
    pub fn display(&self) -> String {
        format!("{} ({})", self.number, self.label.as_deref().unwrap_or(""))
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Text(String),
            Entry {
                #[serde(default)]
                number: Option<String>,
                #[serde(default)]
                label: Option<String>,
                #[serde(default, rename = "type")]
                kind: Option<String>,
            },
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Text(number) => PhoneNumber {
                number,
                label: Some(DEFAULT_PHONE_LABEL.to_string()),
            },
            Helper::Entry {
                number,
                label,
                kind,
            } => PhoneNumber {
                number: number.unwrap_or_default(),
                label: label.filter(|value| !value.is_empty()).or(kind),
            },
        })
    }
}

/// Group membership; the backend sends either `{id, name}` objects or names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GroupRef {
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
    },
    Plain(String),
}

impl GroupRef {
    pub fn name(&self) -> &str {
        match self {
            GroupRef::Named { name, .. } => name,
            GroupRef::Plain(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default, deserialize_with = "phone_list")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "group_list")]
    pub groups: Vec<GroupRef>,
    #[serde(default)]
    pub extra_info: Option<String>,
}

impl Contact {
    pub fn first_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or("")
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_deref().unwrap_or("")
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn birthday(&self) -> &str {
        self.birthday.as_deref().unwrap_or("")
    }

    pub fn extra_info(&self) -> &str {
        self.extra_info.as_deref().unwrap_or("")
    }

    /// `first last`, with a trailing space when the last name is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
    }

    /// Birthday as a calendar date. Time suffixes are ignored.
    pub fn birthday_date(&self) -> Option<Date> {
        parse_date(self.birthday.as_deref()?)
    }
}

/// Parse the `YYYY-MM-DD` prefix of a date or datetime string.
pub fn parse_date(raw: &str) -> Option<Date> {
    let prefix = raw.trim().get(..10)?;
    Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok()
}

fn phone_list<'de, D>(deserializer: D) -> Result<Vec<PhoneNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        List(Vec<PhoneNumber>),
        Joined(String),
    }

    Ok(match Option::<Helper>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Helper::List(list)) => list,
        Some(Helper::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|number| !number.is_empty())
            .map(|number| PhoneNumber::new(number, DEFAULT_PHONE_LABEL))
            .collect(),
    })
}

fn group_list<'de, D>(deserializer: D) -> Result<Vec<GroupRef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        List(Vec<GroupRef>),
        Joined(String),
    }

    Ok(match Option::<Helper>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Helper::List(list)) => list,
        Some(Helper::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| GroupRef::Plain(name.to_string()))
            .collect(),
    })
}

/// Body of `POST /contacts/` and `PUT /contacts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub birthday: String,
    pub phone_numbers: Vec<PhoneNumber>,
    pub extra_info: Option<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Avatar {
    pub id: i64,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_main: bool,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Helper>::deserialize(deserializer)? {
        None => false,
        Some(Helper::Bool(value)) => value,
        Some(Helper::Int(value)) => value != 0,
    })
}

/// `status` field of the database maintenance endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbStatus {
    Ok,
    Created,
    Exists,
    Dropped,
    NoDb,
    NoTables,
    NoContacts,
    Noenv,
    Empty,
    Fail,
    NotFound,
    Error,
    #[serde(other)]
    Unknown,
}

impl DbStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DbStatus::Ok => "ok",
            DbStatus::Created => "created",
            DbStatus::Exists => "exists",
            DbStatus::Dropped => "dropped",
            DbStatus::NoDb => "no_db",
            DbStatus::NoTables => "no_tables",
            DbStatus::NoContacts => "no_contacts",
            DbStatus::Noenv => "noenv",
            DbStatus::Empty => "empty",
            DbStatus::Fail => "fail",
            DbStatus::NotFound => "not_found",
            DbStatus::Error => "error",
            DbStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbReply {
    pub status: DbStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl DbReply {
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_with_integer_id_and_full_fields() {
        let raw = r#"{
            "id": 42,
            "first_name": "Анна",
            "last_name": "Коваль",
            "email": "anna@example.com",
            "birthday": "1990-05-17",
            "phone_numbers": [{"id": 1, "number": "+380 50 123", "label": "Робочий"}],
            "groups": [{"id": 3, "name": "Друзі"}],
            "extra_info": "note"
        }"#;
        let contact: Contact = serde_json::from_str(raw).unwrap();
        assert_eq!(contact.id.as_str(), "42");
        assert_eq!(contact.full_name(), "Анна Коваль");
        assert_eq!(contact.phone_numbers[0].display(), "+380 50 123 (Робочий)");
        assert_eq!(contact.groups[0].name(), "Друзі");
        assert_eq!(
            contact.birthday_date(),
            Some(time::macros::date!(1990 - 05 - 17))
        );
    }

    #[test]
    fn test_contact_tolerates_missing_and_null_fields() {
        let contact: Contact =
            serde_json::from_str(r#"{"id": "7", "phone_numbers": null, "groups": null}"#).unwrap();
        assert_eq!(contact.first_name(), "");
        assert_eq!(contact.last_name(), "");
        assert!(contact.phone_numbers.is_empty());
        assert!(contact.groups.is_empty());
        assert_eq!(contact.birthday_date(), None);
    }

    #[test]
    fn test_phone_entries_in_loose_shapes() {
        let contact: Contact = serde_json::from_str(
            r#"{"id": 1, "phone_numbers": ["123", {"number": "456", "type": "home"}, {"number": "789", "label": ""}]}"#,
        )
        .unwrap();
        assert_eq!(contact.phone_numbers[0].label.as_deref(), Some(DEFAULT_PHONE_LABEL));
        assert_eq!(contact.phone_numbers[1].label.as_deref(), Some("home"));
        assert_eq!(contact.phone_numbers[2].label, None);
        assert_eq!(contact.phone_numbers[2].display(), "789 ()");
    }

    #[test]
    fn test_comma_joined_lists() {
        let contact: Contact = serde_json::from_str(
            r#"{"id": 1, "phone_numbers": "111, 222,", "groups": "Сім'я, Робота"}"#,
        )
        .unwrap();
        assert_eq!(contact.phone_numbers.len(), 2);
        assert_eq!(contact.phone_numbers[1].number, "222");
        assert_eq!(contact.groups[1].name(), "Робота");
    }

    #[test]
    fn test_birthday_with_time_suffix() {
        assert_eq!(
            parse_date("2001-12-31T00:00:00"),
            Some(time::macros::date!(2001 - 12 - 31))
        );
        assert_eq!(parse_date("31.12.2001"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_db_reply_statuses() {
        let reply: DbReply =
            serde_json::from_str(r#"{"status": "no_contacts", "message": "порожньо"}"#).unwrap();
        assert_eq!(reply.status, DbStatus::NoContacts);
        assert_eq!(reply.message_or("x"), "порожньо");

        let reply: DbReply = serde_json::from_str(r#"{"status": "ok", "count": 12}"#).unwrap();
        assert_eq!(reply.count, Some(12));
        assert_eq!(reply.message_or("fallback"), "fallback");

        let reply: DbReply = serde_json::from_str(r#"{"status": "noenv"}"#).unwrap();
        assert_eq!(reply.status, DbStatus::Noenv);

        let reply: DbReply = serde_json::from_str(r#"{"status": "weird"}"#).unwrap();
        assert_eq!(reply.status, DbStatus::Unknown);
    }

    #[test]
    fn test_avatar_main_flag_as_int_or_bool() {
        let avatars: Vec<Avatar> = serde_json::from_str(
            r#"[{"id": 1, "file_path": "/a.png", "is_main": 1}, {"id": 2, "is_main": false}, {"id": 3}]"#,
        )
        .unwrap();
        assert!(avatars[0].is_main);
        assert!(!avatars[1].is_main);
        assert!(!avatars[2].is_main);
    }

    #[test]
    fn test_payload_serializes_phone_entries() {
        let payload = ContactPayload {
            first_name: "Борис".into(),
            last_name: None,
            email: "b@example.com".into(),
            birthday: "2000-01-01".into(),
            phone_numbers: vec![PhoneNumber::new("123", "Мобільний")],
            extra_info: None,
            groups: vec![],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["phone_numbers"],
            serde_json::json!([{"number": "123", "label": "Мобільний"}])
        );
        assert!(json["last_name"].is_null());
    }
}
