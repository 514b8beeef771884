use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

use crate::auth::Credentials;
use crate::footer::{DEFAULT_COLLAPSED, DEFAULT_EXPANDED};
use crate::view::state::ViewMode;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "kontakty";
const FOOTER_LOG_FILE: &str = "footer_log.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub page_limit: u32,
    pub default_view: ViewMode,
    pub request_timeout: Duration,
    pub auth: AuthConfig,
    pub footer: FooterConfig,
    pub logging: LoggingConfig,
    pub keys: Keys,
    pub ui: UiConfig,
    /// Unknown keys found while loading. Reported once logging is up.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        Credentials::from_parts(self.auth.token.as_deref(), self.auth.cookie.as_deref())
    }

    pub fn footer_log_path(&self) -> PathBuf {
        self.data_dir.join(FOOTER_LOG_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
    /// Raw cookie string, e.g. `access_token=...; other=...`.
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct FooterConfig {
    pub collapsed: usize,
    pub expanded: usize,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_prefix: String,
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
    pub avatar_palette: Vec<RgbColor>,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub header_fg: RgbColor,
    pub link_fg: RgbColor,
    pub avatar_fg: RgbColor,
    pub info: RgbColor,
    pub success: RgbColor,
    pub warn: RgbColor,
    pub error: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone)]
pub struct Keys {
    /// Work on every screen unless a modal or the form is open
    pub global: GlobalKeys,
    /// Contact list
    pub list: ListKeys,
    /// Confirmations, menus and popups
    pub modal: ModalKeys,
    /// Create/edit form
    pub form: FormKeys,
    /// Account screen
    pub account: AccountKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub footer: Vec<String>,
    pub db_menu: Vec<String>,
    pub account: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub search: Vec<String>,
    pub expand: Vec<String>,
    pub collapse: Vec<String>,
    pub info: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
    pub create: Vec<String>,
    pub sort: Vec<String>,
    pub birthdays: Vec<String>,
    pub refresh: Vec<String>,
    pub reset: Vec<String>,
    pub view_initials: Vec<String>,
    pub view_named: Vec<String>,
    pub view_detailed: Vec<String>,
    pub view_expanded: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModalKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FormKeys {
    pub cancel: Vec<String>,
    pub submit: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub add_phone: Vec<String>,
    pub remove_phone: Vec<String>,
    pub cycle_label: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AccountKeys {
    pub back: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub username: Vec<String>,
    pub password: Vec<String>,
    pub reset_password: Vec<String>,
    pub upload: Vec<String>,
    pub set_main: Vec<String>,
    pub delete_avatar: Vec<String>,
    pub refresh: Vec<String>,
}

// =============================================================================
// Default implementations
// =============================================================================

fn keys(bindings: &[&str]) -> Vec<String> {
    bindings.iter().map(|key| key.to_string()).collect()
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            global: GlobalKeys::default(),
            list: ListKeys::default(),
            modal: ModalKeys::default(),
            form: FormKeys::default(),
            account: AccountKeys::default(),
        }
    }
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: keys(&["q"]),
            help: keys(&["F1", "?"]),
            footer: keys(&["F2"]),
            db_menu: keys(&["D"]),
            account: keys(&["U"]),
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            next: keys(&["j", "Down"]),
            prev: keys(&["k", "Up"]),
            search: keys(&["/"]),
            expand: keys(&["Enter", "Space"]),
            collapse: keys(&["Escape"]),
            info: keys(&["i"]),
            edit: keys(&["e"]),
            delete: keys(&["x"]),
            create: keys(&["n"]),
            sort: keys(&["s"]),
            birthdays: keys(&["b"]),
            refresh: keys(&["r"]),
            reset: keys(&["R"]),
            view_initials: keys(&["1"]),
            view_named: keys(&["2"]),
            view_detailed: keys(&["3"]),
            view_expanded: keys(&["4"]),
        }
    }
}

impl Default for ModalKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Escape", "n"]),
            confirm: keys(&["Enter", "y"]),
            next: keys(&["j", "Down", "Tab"]),
            prev: keys(&["k", "Up", "Backtab"]),
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Escape"]),
            submit: keys(&["Enter"]),
            next: keys(&["Tab", "Down"]),
            prev: keys(&["Backtab", "Up"]),
            add_phone: keys(&["F3"]),
            remove_phone: keys(&["F4"]),
            cycle_label: keys(&["F5"]),
        }
    }
}

impl Default for AccountKeys {
    fn default() -> Self {
        Self {
            back: keys(&["Escape"]),
            next: keys(&["j", "Down"]),
            prev: keys(&["k", "Up"]),
            username: keys(&["u"]),
            password: keys(&["p"]),
            reset_password: keys(&["P"]),
            upload: keys(&["a"]),
            set_main: keys(&["m"]),
            delete_avatar: keys(&["x"]),
            refresh: keys(&["r"]),
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

/// Overlay the bindings present in `table` on top of `defaults`.
fn overlay(
    table: &HashMap<String, KeyBinding>,
    action: &str,
    defaults: Vec<String>,
) -> Vec<String> {
    table
        .get(action)
        .cloned()
        .map(KeyBinding::into_vec)
        .unwrap_or(defaults)
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: HashMap<String, KeyBinding>,
    list: HashMap<String, KeyBinding>,
    modal: HashMap<String, KeyBinding>,
    form: HashMap<String, KeyBinding>,
    account: HashMap<String, KeyBinding>,
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        let d = Keys::default();
        let g = &file.global;
        let l = &file.list;
        let m = &file.modal;
        let f = &file.form;
        let a = &file.account;
        Self {
            global: GlobalKeys {
                quit: overlay(g, "quit", d.global.quit),
                help: overlay(g, "help", d.global.help),
                footer: overlay(g, "footer", d.global.footer),
                db_menu: overlay(g, "db_menu", d.global.db_menu),
                account: overlay(g, "account", d.global.account),
            },
            list: ListKeys {
                next: overlay(l, "next", d.list.next),
                prev: overlay(l, "prev", d.list.prev),
                search: overlay(l, "search", d.list.search),
                expand: overlay(l, "expand", d.list.expand),
                collapse: overlay(l, "collapse", d.list.collapse),
                info: overlay(l, "info", d.list.info),
                edit: overlay(l, "edit", d.list.edit),
                delete: overlay(l, "delete", d.list.delete),
                create: overlay(l, "create", d.list.create),
                sort: overlay(l, "sort", d.list.sort),
                birthdays: overlay(l, "birthdays", d.list.birthdays),
                refresh: overlay(l, "refresh", d.list.refresh),
                reset: overlay(l, "reset", d.list.reset),
                view_initials: overlay(l, "view_initials", d.list.view_initials),
                view_named: overlay(l, "view_named", d.list.view_named),
                view_detailed: overlay(l, "view_detailed", d.list.view_detailed),
                view_expanded: overlay(l, "view_expanded", d.list.view_expanded),
            },
            modal: ModalKeys {
                cancel: overlay(m, "cancel", d.modal.cancel),
                confirm: overlay(m, "confirm", d.modal.confirm),
                next: overlay(m, "next", d.modal.next),
                prev: overlay(m, "prev", d.modal.prev),
            },
            form: FormKeys {
                cancel: overlay(f, "cancel", d.form.cancel),
                submit: overlay(f, "submit", d.form.submit),
                next: overlay(f, "next", d.form.next),
                prev: overlay(f, "prev", d.form.prev),
                add_phone: overlay(f, "add_phone", d.form.add_phone),
                remove_phone: overlay(f, "remove_phone", d.form.remove_phone),
                cycle_label: overlay(f, "cycle_label", d.form.cycle_label),
            },
            account: AccountKeys {
                back: overlay(a, "back", d.account.back),
                next: overlay(a, "next", d.account.next),
                prev: overlay(a, "prev", d.account.prev),
                username: overlay(a, "username", d.account.username),
                password: overlay(a, "password", d.account.password),
                reset_password: overlay(a, "reset_password", d.account.reset_password),
                upload: overlay(a, "upload", d.account.upload),
                set_main: overlay(a, "set_main", d.account.set_main),
                delete_avatar: overlay(a, "delete_avatar", d.account.delete_avatar),
                refresh: overlay(a, "refresh", d.account.refresh),
            },
        }
    }
}

const GLOBAL_ACTIONS: &[&str] = &["quit", "help", "footer", "db_menu", "account"];
const LIST_ACTIONS: &[&str] = &[
    "next",
    "prev",
    "search",
    "expand",
    "collapse",
    "info",
    "edit",
    "delete",
    "create",
    "sort",
    "birthdays",
    "refresh",
    "reset",
    "view_initials",
    "view_named",
    "view_detailed",
    "view_expanded",
];
const MODAL_ACTIONS: &[&str] = &["cancel", "confirm", "next", "prev"];
const FORM_ACTIONS: &[&str] = &[
    "cancel",
    "submit",
    "next",
    "prev",
    "add_phone",
    "remove_phone",
    "cycle_label",
];
const ACCOUNT_ACTIONS: &[&str] = &[
    "back",
    "next",
    "prev",
    "username",
    "password",
    "reset_password",
    "upload",
    "set_main",
    "delete_avatar",
    "refresh",
];

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'M' means Shift+m, different from 'm').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        match trimmed.to_ascii_lowercase().as_str() {
            "esc" => "escape".to_string(),
            "shift+tab" => "backtab".to_string(),
            other => other.to_string(),
        }
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings for collisions within each context
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    check_context_collisions(
        &[
            ("quit", &keys.global.quit),
            ("help", &keys.global.help),
            ("footer", &keys.global.footer),
            ("db_menu", &keys.global.db_menu),
            ("account", &keys.global.account),
        ],
        "global",
    )?;

    let list = &keys.list;
    check_context_collisions(
        &[
            ("next", &list.next),
            ("prev", &list.prev),
            ("search", &list.search),
            ("expand", &list.expand),
            ("collapse", &list.collapse),
            ("info", &list.info),
            ("edit", &list.edit),
            ("delete", &list.delete),
            ("create", &list.create),
            ("sort", &list.sort),
            ("birthdays", &list.birthdays),
            ("refresh", &list.refresh),
            ("reset", &list.reset),
            ("view_initials", &list.view_initials),
            ("view_named", &list.view_named),
            ("view_detailed", &list.view_detailed),
            ("view_expanded", &list.view_expanded),
        ],
        "list",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.modal.cancel),
            ("confirm", &keys.modal.confirm),
            ("next", &keys.modal.next),
            ("prev", &keys.modal.prev),
        ],
        "modal",
    )?;

    let form = &keys.form;
    check_context_collisions(
        &[
            ("cancel", &form.cancel),
            ("submit", &form.submit),
            ("next", &form.next),
            ("prev", &form.prev),
            ("add_phone", &form.add_phone),
            ("remove_phone", &form.remove_phone),
            ("cycle_label", &form.cycle_label),
        ],
        "form",
    )?;

    let account = &keys.account;
    check_context_collisions(
        &[
            ("back", &account.back),
            ("next", &account.next),
            ("prev", &account.prev),
            ("username", &account.username),
            ("password", &account.password),
            ("reset_password", &account.reset_password),
            ("upload", &account.upload),
            ("set_main", &account.set_main),
            ("delete_avatar", &account.delete_avatar),
            ("refresh", &account.refresh),
        ],
        "account",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
    page_limit: u32,
    default_view: ViewMode,
    request_timeout_secs: u64,
    auth: AuthFile,
    footer: FooterFile,
    logging: LoggingFile,
    keys: KeysFile,
    ui: UiFile,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: None,
            page_limit: 100,
            default_view: ViewMode::Named,
            request_timeout_secs: 15,
            auth: AuthFile::default(),
            footer: FooterFile::default(),
            logging: LoggingFile::default(),
            keys: KeysFile::default(),
            ui: UiFile::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AuthFile {
    token: Option<String>,
    cookie: Option<String>,
    cookie_file: Option<PathBuf>,
}

impl AuthFile {
    fn into_config(self) -> Result<AuthConfig> {
        let from_file = match &self.cookie_file {
            Some(path) => {
                let path = expand_tilde(path);
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read cookie file {}", path.display()))?;
                Some(raw.trim().to_string())
            }
            None => None,
        };
        Ok(AuthConfig {
            token: self.token,
            cookie: self.cookie.or(from_file),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FooterFile {
    collapsed: usize,
    expanded: usize,
}

impl Default for FooterFile {
    fn default() -> Self {
        Self {
            collapsed: DEFAULT_COLLAPSED,
            expanded: DEFAULT_EXPANDED,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LoggingFile {
    level: String,
    file_prefix: String,
}

impl Default for LoggingFile {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_prefix: "kontakty.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
    avatar_palette: Vec<RgbColor>,
}

impl Default for UiFile {
    fn default() -> Self {
        Self {
            colors: UiColorsFile::default(),
            avatar_palette: default_avatar_palette(),
        }
    }
}

fn default_avatar_palette() -> Vec<RgbColor> {
    vec![
        RgbColor::new(0x3e, 0x3a, 0x5e),
        RgbColor::new(0x4b, 0x3f, 0x72),
        RgbColor::new(0x5c, 0x52, 0x70),
        RgbColor::new(0x36, 0x4f, 0x6b),
        RgbColor::new(0x3b, 0x3f, 0x58),
        RgbColor::new(0x6a, 0x67, 0xce),
        RgbColor::new(0x00, 0xc9, 0xa7),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    header_fg: RgbColor,
    link_fg: RgbColor,
    avatar_fg: RgbColor,
    info: RgbColor,
    success: RgbColor,
    warn: RgbColor,
    error: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(0x6a, 0x67, 0xce),
            selection_bg: RgbColor::new(0x6a, 0x67, 0xce),
            selection_fg: RgbColor::new(0, 0, 0),
            header_fg: RgbColor::new(0x00, 0xc9, 0xa7),
            link_fg: RgbColor::new(0x8a, 0xb4, 0xf8),
            avatar_fg: RgbColor::new(255, 255, 255),
            info: RgbColor::new(0xb0, 0xb0, 0xb0),
            success: RgbColor::new(0x00, 0xc9, 0xa7),
            warn: RgbColor::new(255, 165, 0),
            error: RgbColor::new(0xff, 0x55, 0x55),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let c = file.colors;
        let avatar_palette = if file.avatar_palette.is_empty() {
            default_avatar_palette()
        } else {
            file.avatar_palette
        };
        Self {
            colors: UiColors {
                border: c.border,
                selection_bg: c.selection_bg,
                selection_fg: c.selection_fg,
                header_fg: c.header_fg,
                link_fg: c.link_fg,
                avatar_fg: c.avatar_fg,
                info: c.info,
                success: c.success,
                warn: c.warn,
                error: c.error,
            },
            avatar_palette,
        }
    }
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    let dir = base.config_dir().join(APP_NAME);
    Ok(dir)
}

fn default_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.data_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration from `explicit` or the default location.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => expand_tilde(path),
        None => config_path()?,
    };
    if !path.exists() {
        bail!(
            "configuration file not found at {}. Create it with at least `base_url = \"http://localhost:8000\"`.",
            path.display()
        );
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    parse(&raw, path)
}

fn parse(raw: &str, path: PathBuf) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    let warnings = unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let base_url = cfg_file
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
        .ok_or_else(|| anyhow!("`base_url` must be specified in configuration"))?;

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        bail!("`base_url` must start with http:// or https://, got `{}`", base_url);
    }

    if cfg_file.page_limit == 0 {
        bail!("`page_limit` must be greater than zero");
    }

    let footer = FooterConfig {
        collapsed: cfg_file.footer.collapsed,
        expanded: cfg_file.footer.expanded,
    };
    if footer.collapsed == 0 || footer.expanded < footer.collapsed {
        bail!(
            "[footer] needs 0 < collapsed <= expanded, got {} and {}",
            footer.collapsed,
            footer.expanded
        );
    }

    let data_dir = match cfg_file.data_dir {
        Some(dir) => expand_tilde(&dir),
        None => default_data_dir()?,
    };

    let keys: Keys = cfg_file.keys.into();

    // Validate key bindings for collisions
    validate_key_bindings(&keys)?;

    let auth = cfg_file
        .auth
        .into_config()
        .context("failed to parse auth configuration")?;

    Ok(Config {
        config_path: path,
        base_url,
        data_dir,
        page_limit: cfg_file.page_limit,
        default_view: cfg_file.default_view,
        request_timeout: Duration::from_secs(cfg_file.request_timeout_secs.max(1)),
        auth,
        footer,
        logging: LoggingConfig {
            level: cfg_file.logging.level,
            file_prefix: cfg_file.logging.file_prefix,
        },
        keys,
        ui: cfg_file.ui.into(),
        warnings,
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    unknown_in(
        value,
        "",
        &[
            "base_url",
            "data_dir",
            "page_limit",
            "default_view",
            "request_timeout_secs",
            "auth",
            "footer",
            "logging",
            "keys",
            "ui",
        ],
        &mut warnings,
    );

    if let Some(v) = table.get("auth") {
        unknown_in(v, "auth", &["token", "cookie", "cookie_file"], &mut warnings);
    }
    if let Some(v) = table.get("footer") {
        unknown_in(v, "footer", &["collapsed", "expanded"], &mut warnings);
    }
    if let Some(v) = table.get("logging") {
        unknown_in(v, "logging", &["level", "file_prefix"], &mut warnings);
    }
    if let Some(keys_val) = table.get("keys") {
        unknown_in(
            keys_val,
            "keys",
            &["global", "list", "modal", "form", "account"],
            &mut warnings,
        );
        let contexts: [(&str, &[&str]); 5] = [
            ("global", GLOBAL_ACTIONS),
            ("list", LIST_ACTIONS),
            ("modal", MODAL_ACTIONS),
            ("form", FORM_ACTIONS),
            ("account", ACCOUNT_ACTIONS),
        ];
        for (context, known) in contexts {
            if let Some(v) = keys_val.get(context) {
                unknown_in(v, &format!("keys.{context}"), known, &mut warnings);
            }
        }
    }
    if let Some(ui_val) = table.get("ui") {
        unknown_in(ui_val, "ui", &["colors", "avatar_palette"], &mut warnings);
        if let Some(v) = ui_val.get("colors") {
            unknown_in(
                v,
                "ui.colors",
                &[
                    "border",
                    "selection_bg",
                    "selection_fg",
                    "header_fg",
                    "link_fg",
                    "avatar_fg",
                    "info",
                    "success",
                    "warn",
                    "error",
                ],
                &mut warnings,
            );
        }
    }

    warnings
}

fn unknown_in(value: &toml::Value, context: &str, known: &[&str], out: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known_set: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if !known_set.contains(key.as_str()) {
            if context.is_empty() {
                out.push(format!("unknown configuration key `{key}`"));
            } else {
                out.push(format!("unknown {context}.* entry `{key}`"));
            }
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
            Hex(String),
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
            Helper::Hex(raw) => {
                let color = RgbColor::from_hex(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid hex colour `{raw}`"))
                })?;
                (color.r, color.g, color.b)
            }
        };

        Ok(RgbColor { r, g, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse_str(raw: &str) -> Result<Config> {
        parse(raw, PathBuf::from("/tmp/kontakty-test.toml"))
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse_str("base_url = \"http://localhost:8000/\"\ndata_dir = \"/tmp/k\"").unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cfg.page_limit, 100);
        assert_eq!(cfg.default_view, ViewMode::Named);
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert_eq!(cfg.footer.collapsed, 5);
        assert_eq!(cfg.footer.expanded, 15);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.ui.avatar_palette.len(), 7);
        assert_eq!(cfg.keys.form.add_phone, vec!["F3"]);
        assert_eq!(cfg.footer_log_path(), PathBuf::from("/tmp/k/footer_log.json"));
        assert!(cfg.warnings.is_empty());
        assert!(cfg.credentials().is_anonymous());
    }

    #[test]
    fn test_base_url_is_required() {
        let err = parse_str("page_limit = 10").unwrap_err();
        assert!(err.to_string().contains("base_url"));
        let err = parse_str("base_url = \"localhost\"").unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(parse_str("base_url = \"http://x\"\npage_limit = 0").is_err());
        assert!(parse_str("base_url = \"http://x\"\ndefault_view = 7").is_err());
        assert!(parse_str("base_url = \"http://x\"\n[footer]\ncollapsed = 10\nexpanded = 5").is_err());
    }

    #[test]
    fn test_unknown_keys_are_warnings() {
        let cfg = parse_str(
            "base_url = \"http://x\"\nbogus = 1\n[keys.list]\nfly = \"f\"\n[ui.colors]\nsparkle = [1, 2, 3]",
        )
        .unwrap();
        assert_eq!(
            cfg.warnings,
            vec![
                "unknown configuration key `bogus`".to_string(),
                "unknown keys.list.* entry `fly`".to_string(),
                "unknown ui.colors.* entry `sparkle`".to_string(),
            ]
        );
    }

    #[test]
    fn test_key_overrides_single_and_multiple() {
        let cfg = parse_str(
            "base_url = \"http://x\"\n[keys.global]\nquit = \"Q\"\n[keys.list]\nsort = [\"s\", \"o\"]",
        )
        .unwrap();
        assert_eq!(cfg.keys.global.quit, vec!["Q"]);
        assert_eq!(cfg.keys.list.sort, vec!["s", "o"]);
        assert_eq!(cfg.keys.list.next, vec!["j", "Down"]);
    }

    #[test]
    fn test_key_collision_within_context_fails() {
        let err = parse_str("base_url = \"http://x\"\n[keys.list]\nsort = \"j\"").unwrap_err();
        assert!(err.to_string().contains("collision in [keys.list]"));

        let err =
            parse_str("base_url = \"http://x\"\n[keys.modal]\ncancel = \"esc\"\nconfirm = \"Escape\"")
                .unwrap_err();
        assert!(err.to_string().contains("[keys.modal]"));
    }

    #[test]
    fn test_default_bindings_have_no_collisions() {
        validate_key_bindings(&Keys::default()).unwrap();
    }

    #[test]
    fn test_colours_accept_array_map_and_hex() {
        let cfg = parse_str(
            "base_url = \"http://x\"\n[ui]\navatar_palette = [\"#3e3a5e\", [1, 2, 3], { r = 4, g = 5, b = 6 }]\n[ui.colors]\nborder = \"00c9a7\"",
        )
        .unwrap();
        assert_eq!(
            cfg.ui.avatar_palette,
            vec![
                RgbColor::new(0x3e, 0x3a, 0x5e),
                RgbColor::new(1, 2, 3),
                RgbColor::new(4, 5, 6)
            ]
        );
        assert_eq!(cfg.ui.colors.border, RgbColor::new(0, 0xc9, 0xa7));
        assert!(parse_str("base_url = \"http://x\"\n[ui.colors]\nborder = \"#zzzzzz\"").is_err());
    }

    #[test]
    fn test_auth_cookie_file() {
        let dir = tempdir().unwrap();
        let cookie = dir.path().join("cookie.txt");
        fs::write(&cookie, "access_token=abc; theme=dark\n").unwrap();
        let raw = format!(
            "base_url = \"http://x\"\n[auth]\ncookie_file = \"{}\"",
            cookie.display()
        );
        let cfg = parse_str(&raw).unwrap();
        let creds = cfg.credentials();
        assert_eq!(creds.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(creds.cookie.as_deref(), Some("access_token=abc; theme=dark"));

        let missing = "base_url = \"http://x\"\n[auth]\ncookie_file = \"/nonexistent/cookie\"";
        assert!(parse_str(missing).is_err());
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = home::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/x")), home.join("x"));
        }
        assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
