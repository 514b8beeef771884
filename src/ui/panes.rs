use crate::api::{DbAction, DEFAULT_FAKE_COUNT};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Tile list or birthday view
    #[default]
    Contacts,
    /// Current user and avatars
    Account,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Contacts => "КОНТАКТИ",
            Screen::Account => "КОРИСТУВАЧ",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Screen::Contacts => Screen::Account,
            Screen::Account => Screen::Contacts,
        }
    }
}

/// Where typed characters go on the contacts screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tiles,
    Search,
}

/// Entries of the database menu, in display order.
pub const DB_MENU: [DbAction; 6] = [
    DbAction::CreateDb,
    DbAction::Init,
    DbAction::FillFake(DEFAULT_FAKE_COUNT),
    DbAction::CheckState,
    DbAction::Clear,
    DbAction::DropDb,
];

/// Move a cursor by `delta` within `len` items, wrapping at both ends.
pub fn wrap_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (current as isize + delta).rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 3), 2);
        assert_eq!(wrap_index(2, 1, 3), 0);
        assert_eq!(wrap_index(1, 1, 3), 2);
        assert_eq!(wrap_index(5, 1, 0), 0);
    }

    #[test]
    fn test_screen_toggle() {
        assert_eq!(Screen::default().toggled(), Screen::Account);
        assert_eq!(Screen::Account.toggled(), Screen::Contacts);
    }

    #[test]
    fn test_destructive_entries_are_last() {
        assert!(DB_MENU[..4].iter().all(|action| !action.needs_confirmation()));
        assert!(DB_MENU[4..].iter().all(|action| action.needs_confirmation()));
    }
}
