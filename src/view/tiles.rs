//! Pure tile rendering: `(state, cache, detail)` in, tiles out.

use crate::model::{Contact, ContactId};
use crate::view::state::{ViewMode, ViewState};

const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAction {
    Info,
    Edit,
    Delete,
}

impl TileAction {
    pub const ALL: [TileAction; 3] = [TileAction::Info, TileAction::Edit, TileAction::Delete];

    pub fn label(self) -> &'static str {
        match self {
            TileAction::Info => "Інформація",
            TileAction::Edit => "Редагувати",
            TileAction::Delete => "Видалити",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullCard {
    pub name: String,
    pub birthday: String,
    pub email: String,
    pub phones: String,
    pub groups: String,
    pub extra_info: String,
    pub id_line: String,
    pub actions: [TileAction; 3],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileBody {
    Mini,
    Named {
        first: String,
        last: String,
    },
    Summary {
        name: String,
        birthday: String,
        email: String,
        phone: String,
    },
    Full(FullCard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: ContactId,
    pub initials: String,
    /// Hover text: `first last`.
    pub title: String,
    /// First character of the first name, drives the avatar colour.
    pub color_seed: Option<char>,
    pub body: TileBody,
}

impl Tile {
    pub fn is_full(&self) -> bool {
        matches!(self.body, TileBody::Full(_))
    }

    /// Plain text rendition, one line per visible field.
    pub fn text_lines(&self) -> Vec<String> {
        match &self.body {
            TileBody::Mini => vec![format!("[{}]", self.initials)],
            TileBody::Named { first, last } => {
                vec![format!("[{}]", self.initials), first.clone(), last.clone()]
            }
            TileBody::Summary {
                name,
                birthday,
                email,
                phone,
            } => vec![format!(
                "[{}] {} | {} | {} | {}",
                self.initials, name, birthday, email, phone
            )],
            TileBody::Full(card) => {
                let mut lines = vec![format!("[{}] {}", self.initials, card.name)];
                lines.extend(card_lines(card));
                lines
            }
        }
    }
}

fn card_lines(card: &FullCard) -> Vec<String> {
    vec![
        format!("Дата народження: {}", card.birthday),
        format!("Email: {}", card.email),
        format!("Телефони: {}", card.phones),
        format!("Групи: {}", card.groups),
        format!("Додатково: {}", card.extra_info),
        card.id_line.clone(),
        card.actions
            .iter()
            .map(|action| format!("[{}]", action.label()))
            .collect::<Vec<_>>()
            .join(" "),
    ]
}

/// Upper-cased first letters of first and last name; `?` stands in for a
/// missing first name.
pub fn initials(contact: &Contact) -> String {
    let mut out = String::new();
    match contact.first_name().chars().next() {
        Some(first) => out.extend(first.to_uppercase()),
        None => out.push('?'),
    }
    if let Some(last) = contact.last_name().chars().next() {
        out.extend(last.to_uppercase());
    }
    out
}

/// Palette slot for a seed character: code point modulo palette length,
/// slot 0 without a seed.
pub fn palette_pick(seed: Option<char>, len: usize) -> usize {
    match (seed, len) {
        (_, 0) => 0,
        (None, _) => 0,
        (Some(ch), len) => ch as usize % len,
    }
}

fn or_missing(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

fn joined_or_missing(values: Vec<String>) -> String {
    if values.is_empty() {
        MISSING.to_string()
    } else {
        values.join(", ")
    }
}

fn full_card(contact: &Contact) -> FullCard {
    FullCard {
        name: contact.full_name(),
        birthday: contact.birthday().to_string(),
        email: contact.email().to_string(),
        phones: joined_or_missing(contact.phone_numbers.iter().map(|p| p.display()).collect()),
        groups: joined_or_missing(
            contact
                .groups
                .iter()
                .map(|group| group.name().to_string())
                .collect(),
        ),
        extra_info: contact.extra_info().to_string(),
        id_line: format!("ID: {}", contact.id),
        actions: TileAction::ALL,
    }
}

fn tile(contact: &Contact, body: TileBody) -> Tile {
    Tile {
        id: contact.id.clone(),
        initials: initials(contact),
        title: contact.full_name(),
        color_seed: contact.first_name().chars().next(),
        body,
    }
}

/// Summary tile for the density of `mode`. Mode 4 yields the full card.
pub fn contact_tile(contact: &Contact, mode: ViewMode) -> Tile {
    let body = match mode {
        ViewMode::Initials => TileBody::Mini,
        ViewMode::Named => TileBody::Named {
            first: contact.first_name().to_string(),
            last: contact.last_name().to_string(),
        },
        ViewMode::Detailed => TileBody::Summary {
            name: contact.full_name(),
            birthday: contact.birthday().to_string(),
            email: contact.email().to_string(),
            phone: contact
                .phone_numbers
                .first()
                .map(|phone| or_missing(&phone.number))
                .unwrap_or_else(|| MISSING.to_string()),
        },
        ViewMode::Expanded => TileBody::Full(full_card(contact)),
    };
    tile(contact, body)
}

pub fn full_tile(contact: &Contact) -> Tile {
    tile(contact, TileBody::Full(full_card(contact)))
}

/// One tile per cached contact, in server order. Expanded tiles prefer the
/// fetched detail record when it belongs to the same contact. Nothing is
/// rendered in birthday mode.
pub fn render_list(state: &ViewState, cache: &[Contact], detail: Option<&Contact>) -> Vec<Tile> {
    if state.birthday_mode {
        return Vec::new();
    }

    cache
        .iter()
        .map(|contact| {
            if state.is_expanded(&contact.id) {
                let source = detail
                    .filter(|full| full.id == contact.id)
                    .unwrap_or(contact);
                full_tile(source)
            } else {
                contact_tile(contact, state.mode)
            }
        })
        .collect()
}

/// Lines of the contact information popup.
pub fn info_lines(contact: &Contact) -> Vec<String> {
    let card = full_card(contact);
    let mut lines = vec![card.name.clone()];
    lines.extend(card_lines(&card).into_iter().take(6));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupRef, PhoneNumber};

    fn anna() -> Contact {
        Contact {
            id: ContactId::from("1"),
            first_name: Some("анна".into()),
            last_name: Some("коваль".into()),
            email: Some("anna@example.com".into()),
            birthday: Some("1990-05-17".into()),
            phone_numbers: vec![
                PhoneNumber::new("111", "Мобільний"),
                PhoneNumber::new("222", "Робочий"),
            ],
            groups: vec![
                GroupRef::Named {
                    name: "Друзі".into(),
                    id: Some(1),
                },
                GroupRef::Plain("Сім'я".into()),
            ],
            extra_info: Some("note".into()),
        }
    }

    fn bare(id: &str) -> Contact {
        Contact {
            id: ContactId::from(id),
            ..Contact::default()
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials(&anna()), "АК");
        assert_eq!(initials(&bare("2")), "?");
        let mut first_only = bare("3");
        first_only.first_name = Some("борис".into());
        assert_eq!(initials(&first_only), "Б");
    }

    #[test]
    fn test_missing_fields_use_fallbacks_in_every_summary_mode() {
        let contact = bare("9");
        for mode in [ViewMode::Initials, ViewMode::Named, ViewMode::Detailed] {
            let tile = contact_tile(&contact, mode);
            assert_eq!(tile.initials, "?");
            assert_eq!(tile.title, " ");
            match tile.body {
                TileBody::Mini => {}
                TileBody::Named { first, last } => {
                    assert_eq!(first, "");
                    assert_eq!(last, "");
                }
                TileBody::Summary { phone, .. } => assert_eq!(phone, "-"),
                TileBody::Full(_) => panic!("summary mode rendered a full card"),
            }
        }
        let card = full_tile(&contact);
        let TileBody::Full(card) = card.body else {
            panic!("expected full card");
        };
        assert_eq!(card.phones, "-");
        assert_eq!(card.groups, "-");
        assert_eq!(card.id_line, "ID: 9");
    }

    #[test]
    fn test_summary_uses_first_phone() {
        let tile = contact_tile(&anna(), ViewMode::Detailed);
        assert_eq!(
            tile.body,
            TileBody::Summary {
                name: "анна коваль".into(),
                birthday: "1990-05-17".into(),
                email: "anna@example.com".into(),
                phone: "111".into(),
            }
        );
    }

    #[test]
    fn test_full_card_joins_lists() {
        let TileBody::Full(card) = full_tile(&anna()).body else {
            panic!("expected full card");
        };
        assert_eq!(card.phones, "111 (Мобільний), 222 (Робочий)");
        assert_eq!(card.groups, "Друзі, Сім'я");
        assert_eq!(card.actions, TileAction::ALL);
    }

    #[test]
    fn test_render_list_expands_single_id_or_all() {
        let cache = vec![anna(), bare("2")];
        let mut state = ViewState::default();
        state.expanded = Some(ContactId::from("2"));
        let tiles = render_list(&state, &cache, None);
        assert!(!tiles[0].is_full());
        assert!(tiles[1].is_full());

        state.mode = ViewMode::Expanded;
        state.expanded = None;
        assert!(render_list(&state, &cache, None).iter().all(Tile::is_full));

        state.birthday_mode = true;
        assert!(render_list(&state, &cache, None).is_empty());
    }

    #[test]
    fn test_render_list_prefers_matching_detail() {
        let mut summary = anna();
        summary.phone_numbers.clear();
        let cache = vec![summary];
        let mut state = ViewState::default();
        state.expanded = Some(ContactId::from("1"));

        let detail = anna();
        let tiles = render_list(&state, &cache, Some(&detail));
        let TileBody::Full(card) = &tiles[0].body else {
            panic!("expected full card");
        };
        assert!(card.phones.starts_with("111"));

        let other = bare("5");
        let tiles = render_list(&state, &cache, Some(&other));
        let TileBody::Full(card) = &tiles[0].body else {
            panic!("expected full card");
        };
        assert_eq!(card.phones, "-");
    }

    #[test]
    fn test_palette_pick() {
        assert_eq!(palette_pick(None, 7), 0);
        assert_eq!(palette_pick(Some('A'), 7), 65 % 7);
        assert_eq!(palette_pick(Some('А'), 7), 0x410 % 7);
        assert_eq!(palette_pick(Some('x'), 0), 0);
    }

    #[test]
    fn test_text_lines() {
        let lines = contact_tile(&anna(), ViewMode::Named).text_lines();
        assert_eq!(lines, vec!["[АК]", "анна", "коваль"]);
        let lines = full_tile(&anna()).text_lines();
        assert_eq!(lines.last().unwrap(), "[Інформація] [Редагувати] [Видалити]");
        assert!(lines.contains(&"ID: 1".to_string()));
    }
}
