use crate::error::ApiError;
use crate::model::{Contact, ContactId};

pub const UPCOMING_HEADING: &str = "Найближчі 7 днів Дні Народження будуть у:";
pub const LATER_HEADING: &str = "Наступні найближчі Дні Народження:";
pub const NO_UPCOMING: &str = "контактів не знайдено";
pub const NO_LATER: &str = "немає контактів";
pub const UPCOMING_FAILED: &str = "Помилка завантаження найближчих Днів Народження";
pub const LATER_FAILED: &str = "Помилка завантаження наступних Днів Народження";
pub const LOADING: &str = "Завантаження...";

const MONTHS: [&str; 12] = [
    "січень", "лютий", "березень", "квітень", "травень", "червень", "липень", "серпень",
    "вересень", "жовтень", "листопад", "грудень",
];

pub fn month_name(month: time::Month) -> &'static str {
    MONTHS[u8::from(month) as usize - 1]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayEntry {
    pub id: ContactId,
    pub text: String,
}

impl BirthdayEntry {
    /// `first last (birthday)`
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            id: contact.id.clone(),
            text: format!("{} ({})", contact.full_name(), contact.birthday()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    pub month: &'static str,
    pub entries: Vec<BirthdayEntry>,
}

/// Months in order of first appearance. Contacts without a parseable
/// birthday are skipped.
pub fn group_by_month(contacts: &[Contact]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for contact in contacts {
        let Some(date) = contact.birthday_date() else {
            continue;
        };
        let month = month_name(date.month());
        let entry = BirthdayEntry::from_contact(contact);
        match groups.iter_mut().find(|group| group.month == month) {
            Some(group) => group.entries.push(entry),
            None => groups.push(MonthGroup {
                month,
                entries: vec![entry],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Later {
    /// The server returned no contacts at all.
    Empty,
    Months(Vec<MonthGroup>),
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BirthdayView {
    #[default]
    Loading,
    UpcomingFailed,
    Loaded {
        upcoming: Vec<BirthdayEntry>,
        later: Later,
    },
}

impl BirthdayView {
    /// The twelve-month window is only consulted once the seven-day one
    /// succeeded.
    pub fn from_results(
        upcoming: Result<Vec<Contact>, ApiError>,
        later: Option<Result<Vec<Contact>, ApiError>>,
    ) -> Self {
        let Ok(upcoming) = upcoming else {
            return BirthdayView::UpcomingFailed;
        };
        let later = match later {
            Some(Ok(contacts)) if contacts.is_empty() => Later::Empty,
            Some(Ok(contacts)) => Later::Months(group_by_month(&contacts)),
            _ => Later::Failed,
        };
        BirthdayView::Loaded {
            upcoming: upcoming.iter().map(BirthdayEntry::from_contact).collect(),
            later,
        }
    }

    pub fn lines(&self) -> Vec<BirthdayLine> {
        match self {
            BirthdayView::Loading => vec![BirthdayLine::Notice(LOADING.to_string())],
            BirthdayView::UpcomingFailed => vec![BirthdayLine::Error(UPCOMING_FAILED.to_string())],
            BirthdayView::Loaded { upcoming, later } => {
                let mut lines = vec![BirthdayLine::Heading(UPCOMING_HEADING.to_string())];
                if upcoming.is_empty() {
                    lines.push(BirthdayLine::Notice(NO_UPCOMING.to_string()));
                } else {
                    lines.extend(upcoming.iter().cloned().map(BirthdayLine::Entry));
                }
                lines.push(BirthdayLine::Separator);
                lines.push(BirthdayLine::Heading(LATER_HEADING.to_string()));
                match later {
                    Later::Failed => lines.push(BirthdayLine::Error(LATER_FAILED.to_string())),
                    Later::Empty => lines.push(BirthdayLine::Notice(NO_LATER.to_string())),
                    Later::Months(groups) => {
                        for group in groups {
                            lines.push(BirthdayLine::Heading(format!("{}:", group.month)));
                            lines.extend(group.entries.iter().cloned().map(BirthdayLine::Entry));
                        }
                    }
                }
                lines
            }
        }
    }

    /// Contacts that can be opened, in display order.
    pub fn entries(&self) -> Vec<BirthdayEntry> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                BirthdayLine::Entry(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayLine {
    Heading(String),
    Entry(BirthdayEntry),
    Notice(String),
    Error(String),
    Separator,
}

impl BirthdayLine {
    pub fn text(&self) -> String {
        match self {
            BirthdayLine::Heading(text) | BirthdayLine::Notice(text) | BirthdayLine::Error(text) => {
                text.clone()
            }
            BirthdayLine::Entry(entry) => format!("  {} [інфо]", entry.text),
            BirthdayLine::Separator => "-".repeat(24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn born(id: &str, first: &str, birthday: Option<&str>) -> Contact {
        Contact {
            id: ContactId::from(id),
            first_name: Some(first.into()),
            birthday: birthday.map(str::to_string),
            ..Contact::default()
        }
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let contacts = vec![
            born("1", "A", Some("1990-11-03")),
            born("2", "B", Some("1985-01-20")),
            born("3", "C", None),
            born("4", "D", Some("2001-11-28")),
        ];
        let groups = group_by_month(&contacts);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].month, "листопад");
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[1].month, "січень");
        assert_eq!(groups[1].entries[0].text, "B  (1985-01-20)");
    }

    #[test]
    fn test_empty_windows_render_notices() {
        let view = BirthdayView::from_results(Ok(vec![]), Some(Ok(vec![])));
        let texts: Vec<_> = view.lines().iter().map(BirthdayLine::text).collect();
        assert_eq!(texts[0], UPCOMING_HEADING);
        assert_eq!(texts[1], NO_UPCOMING);
        assert_eq!(texts[3], LATER_HEADING);
        assert_eq!(texts[4], NO_LATER);
        assert!(view.entries().is_empty());
    }

    #[test]
    fn test_later_contacts_without_birthdays_render_nothing() {
        let view = BirthdayView::from_results(
            Ok(vec![]),
            Some(Ok(vec![born("7", "Без", None)])),
        );
        let texts: Vec<_> = view.lines().iter().map(BirthdayLine::text).collect();
        assert_eq!(texts.last().map(String::as_str), Some(LATER_HEADING));
        assert!(!texts.iter().any(|text| text == NO_LATER));
    }

    #[test]
    fn test_failures_render_inline_errors() {
        let failed = BirthdayView::from_results(Err(ApiError::Network("down".into())), None);
        assert_eq!(failed, BirthdayView::UpcomingFailed);
        assert_eq!(failed.lines()[0].text(), UPCOMING_FAILED);

        let partial = BirthdayView::from_results(
            Ok(vec![born("1", "A", Some("1990-05-01"))]),
            Some(Err(ApiError::Network("down".into()))),
        );
        let lines = partial.lines();
        assert_eq!(lines.last().unwrap().text(), LATER_FAILED);
        assert_eq!(partial.entries().len(), 1);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(time::Month::January), "січень");
        assert_eq!(month_name(time::Month::December), "грудень");
    }
}
