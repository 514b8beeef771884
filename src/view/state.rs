use std::fmt;

use serde::Deserialize;

use crate::model::ContactId;

/// Tile density of the contact list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Avatar initials only.
    Initials,
    /// Initials with first and last name lines.
    #[default]
    Named,
    /// One summary row per contact.
    Detailed,
    /// Every tile shows the full card.
    Expanded,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Initials,
        ViewMode::Named,
        ViewMode::Detailed,
        ViewMode::Expanded,
    ];

    pub fn number(self) -> u8 {
        match self {
            ViewMode::Initials => 1,
            ViewMode::Named => 2,
            ViewMode::Detailed => 3,
            ViewMode::Expanded => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(ViewMode::Initials),
            2 => Some(ViewMode::Named),
            3 => Some(ViewMode::Detailed),
            4 => Some(ViewMode::Expanded),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Initials => "Міні",
            ViewMode::Named => "Імена",
            ViewMode::Detailed => "Список",
            ViewMode::Expanded => "Картки",
        }
    }
}

impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let number = u8::deserialize(deserializer)?;
        ViewMode::from_number(number).ok_or_else(|| {
            serde::de::Error::custom(format!("view mode must be 1..4, got {number}"))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the list region depends on besides server data.
///
/// Fields are only changed through `ContactView`'s transition methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    pub sort: SortDirection,
    pub search: String,
    pub expanded: Option<ContactId>,
    pub birthday_mode: bool,
}

impl ViewState {
    pub fn with_mode(mode: ViewMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether the tile for `id` renders as a full card.
    pub fn is_expanded(&self, id: &ContactId) -> bool {
        self.mode == ViewMode::Expanded || self.expanded.as_ref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_numbers_round_trip() {
        for mode in ViewMode::ALL {
            assert_eq!(ViewMode::from_number(mode.number()), Some(mode));
        }
        assert_eq!(ViewMode::from_number(0), None);
        assert_eq!(ViewMode::from_number(5), None);
        assert_eq!(ViewMode::default(), ViewMode::Named);
    }

    #[test]
    fn test_view_mode_from_toml_number() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: ViewMode,
        }
        let wrapper: Wrapper = toml::from_str("mode = 3").unwrap();
        assert_eq!(wrapper.mode, ViewMode::Detailed);
        assert!(toml::from_str::<Wrapper>("mode = 9").is_err());
    }

    #[test]
    fn test_sort_toggle() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled().as_str(), "asc");
    }

    #[test]
    fn test_mode_four_expands_everything() {
        let mut state = ViewState::with_mode(ViewMode::Expanded);
        assert!(state.is_expanded(&ContactId::from("1")));
        state.mode = ViewMode::Detailed;
        assert!(!state.is_expanded(&ContactId::from("1")));
        state.expanded = Some(ContactId::from("1"));
        assert!(state.is_expanded(&ContactId::from("1")));
        assert!(!state.is_expanded(&ContactId::from("2")));
    }
}
