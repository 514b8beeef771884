//! Footer message log.
//!
//! Every user-visible outcome (database actions, account changes, background
//! notices) is appended here and persisted as a JSON array so it survives
//! restarts.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

pub const DEFAULT_COLLAPSED: usize = 5;
pub const DEFAULT_EXPANDED: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterEntry {
    pub msg: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Unix milliseconds.
    pub ts: i64,
}

impl FooterEntry {
    pub fn new(msg: impl Into<String>, severity: Severity) -> Self {
        let ts = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        Self {
            msg: msg.into(),
            severity,
            ts,
        }
    }

    /// `HH:MM:SS` in UTC; empty when the stamp is out of range.
    pub fn time_label(&self) -> String {
        OffsetDateTime::from_unix_timestamp_nanos(self.ts as i128 * 1_000_000)
            .ok()
            .and_then(|moment| {
                moment
                    .format(format_description!("[hour]:[minute]:[second]"))
                    .ok()
            })
            .unwrap_or_default()
    }
}

/// A message waiting to be appended, produced by flows that run off the UI
/// thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterNote {
    pub message: String,
    pub severity: Severity,
}

impl FooterNote {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warn)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

#[derive(Debug)]
pub struct FooterLog {
    path: Option<PathBuf>,
    entries: Vec<FooterEntry>,
    collapsed: usize,
    expanded_limit: usize,
    expanded: bool,
}

impl FooterLog {
    /// Load the log stored at `path`. A missing file is an empty log; a
    /// corrupt one is replaced on the next append.
    pub fn open(path: &Path, collapsed: usize, expanded_limit: usize) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "discarding unreadable footer log");
                Vec::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read footer log {}", path.display()))
            }
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
            collapsed,
            expanded_limit,
            expanded: false,
        })
    }

    pub fn in_memory(collapsed: usize, expanded_limit: usize) -> Self {
        Self {
            path: None,
            entries: Vec::new(),
            collapsed,
            expanded_limit,
            expanded: false,
        }
    }

    pub fn append(&mut self, msg: impl Into<String>, severity: Severity) {
        let entry = FooterEntry::new(msg, severity);
        tracing::info!(severity = severity.as_str(), message = %entry.msg, "footer");
        self.entries.push(entry);
        if let Err(err) = self.persist() {
            tracing::warn!(error = %format!("{err:#}"), "failed to persist footer log");
        }
    }

    pub fn append_note(&mut self, note: FooterNote) {
        self.append(note.message, note.severity);
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string(&self.entries)?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        if self.expanded {
            self.expanded_limit
        } else {
            self.collapsed
        }
    }

    /// Newest first, capped by the current display window.
    pub fn visible(&self) -> Vec<&FooterEntry> {
        self.entries.iter().rev().take(self.limit()).collect()
    }

    pub fn can_expand(&self) -> bool {
        self.entries.len() > self.collapsed
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded && self.can_expand();
    }

    pub fn toggle_expanded(&mut self) {
        self.set_expanded(!self.expanded);
    }
}

/// Where user-facing messages go.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Shared handle so the view controller and the UI write to one log.
#[derive(Debug, Clone)]
pub struct FooterHandle(Rc<RefCell<FooterLog>>);

impl FooterHandle {
    pub fn new(log: FooterLog) -> Self {
        Self(Rc::new(RefCell::new(log)))
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, FooterLog> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, FooterLog> {
        self.0.borrow_mut()
    }
}

impl Notifier for FooterHandle {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.0.borrow_mut().append(message, severity);
    }
}
