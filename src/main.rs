mod account;
mod admin;
mod api;
mod auth;
mod config;
mod error;
mod footer;
mod form;
mod logging;
mod model;
mod ui;
mod view;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use api::{Backend, BirthdayWindow, ContactQuery, DbAction, HttpBackend, DEFAULT_FAKE_COUNT};
use config::Config;
use footer::{FooterHandle, FooterLog};
use model::ContactId;
use view::birthdays::BirthdayView;
use view::controller::{DETAIL_FAILED, LIST_FAILED};
use view::state::{SortDirection, ViewMode};
use view::tiles::{contact_tile, full_tile};

#[derive(Parser, Debug)]
#[command(name = "kontakty", version, about = "Terminal client for a contacts REST API")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "KONTAKTY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch contacts and print them as tiles
    List(ListArgs),
    /// Print the full card of one contact
    Show {
        id: String,
    },
    /// Print upcoming birthdays grouped by month
    Birthdays,
    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommand),
    /// Print the current user
    Me,
    /// Print the footer message log, newest first
    Log {
        /// Show the expanded window instead of the collapsed one
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Substring filter, matched by the server
    #[arg(long)]
    search: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Tile density, 1 (initials) to 4 (full cards)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    mode: Option<u8>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum DbCommand {
    /// Create the database and its tables
    Create,
    /// Create the tables
    Init,
    /// Drop the database
    Drop {
        #[arg(long)]
        yes: bool,
    },
    /// Insert fake contacts
    Fill {
        #[arg(long, default_value_t = DEFAULT_FAKE_COUNT)]
        n: u32,
    },
    /// Delete every contact
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Report the database state
    Check,
}

impl DbCommand {
    fn action(self) -> DbAction {
        match self {
            DbCommand::Create => DbAction::CreateDb,
            DbCommand::Init => DbAction::Init,
            DbCommand::Drop { .. } => DbAction::DropDb,
            DbCommand::Fill { n } => DbAction::FillFake(n),
            DbCommand::Clear { .. } => DbAction::Clear,
            DbCommand::Check => DbAction::CheckState,
        }
    }

    fn confirmed(self) -> bool {
        match self {
            DbCommand::Drop { yes } | DbCommand::Clear { yes } => yes,
            _ => true,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let _log_guard = logging::init(&config)?;

    for warning in &config.warnings {
        warn!(config = %config.config_path.display(), "{warning}");
    }
    info!(config = %config.config_path.display(), "configuration loaded");

    match cli.command {
        None => run_tui(&config),
        Some(Command::Log { all }) => print_log(&config, all),
        Some(Command::List(args)) => print_list(&connect(&config)?, &config, args),
        Some(Command::Show { id }) => print_contact(&connect(&config)?, &id),
        Some(Command::Birthdays) => print_birthdays(&connect(&config)?),
        Some(Command::Db(db)) => run_db(&connect(&config)?, &config, db),
        Some(Command::Me) => print_me(&connect(&config)?),
    }
}

fn connect(config: &Config) -> Result<HttpBackend> {
    HttpBackend::new(&config.base_url, config.credentials(), config.request_timeout)
        .context("failed to set up HTTP client")
}

fn open_footer(config: &Config) -> Result<FooterLog> {
    FooterLog::open(
        &config.footer_log_path(),
        config.footer.collapsed,
        config.footer.expanded,
    )
}

fn run_tui(config: &Config) -> Result<()> {
    let footer = FooterHandle::new(open_footer(config)?);
    let backend = connect(config)?;
    let worker = api::worker::Worker::spawn(Box::new(backend))?;
    let mut app = ui::app::App::new(config, worker, footer);
    app.run()
}

fn print_list(backend: &dyn Backend, config: &Config, args: ListArgs) -> Result<()> {
    let search = args.search.unwrap_or_default();
    let mode = match args.mode.and_then(ViewMode::from_number) {
        Some(mode) => mode,
        // searching switches to the detailed list
        None if !search.trim().is_empty() => ViewMode::Detailed,
        None => config.default_view,
    };
    let sort = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    let query = ContactQuery::new(&search, sort, config.page_limit);
    info!(link = %query.api_link(), "listing contacts");
    let contacts = backend
        .list_contacts(&query)
        .map_err(|err| anyhow!(err.alert_text(LIST_FAILED)))?;

    if contacts.is_empty() {
        println!("контактів не знайдено");
        return Ok(());
    }

    for contact in &contacts {
        let tile = contact_tile(contact, mode);
        if tile.is_full() {
            for line in tile.text_lines() {
                println!("{line}");
            }
            println!();
        } else {
            println!("{}", tile.text_lines().join(" "));
        }
    }
    Ok(())
}

fn print_contact(backend: &dyn Backend, id: &str) -> Result<()> {
    let contact = backend
        .contact(&ContactId::new(id))
        .map_err(|err| anyhow!(err.alert_text(DETAIL_FAILED)))?;
    for line in full_tile(&contact).text_lines() {
        println!("{line}");
    }
    Ok(())
}

fn print_birthdays(backend: &dyn Backend) -> Result<()> {
    let upcoming = backend.birthdays(BirthdayWindow::Next7Days);
    let later = upcoming
        .is_ok()
        .then(|| backend.birthdays(BirthdayWindow::Next12Months));
    for line in BirthdayView::from_results(upcoming, later).lines() {
        println!("{}", line.text());
    }
    Ok(())
}

fn run_db(backend: &dyn Backend, config: &Config, command: DbCommand) -> Result<()> {
    let action = command.action();
    if !command.confirmed() {
        bail!("`{}` is destructive; pass --yes to confirm", action.label());
    }

    let mut log = open_footer(config)?;
    let outcome = admin::run(backend, action);
    for note in outcome.notes {
        println!("[{}] {}", note.severity.as_str(), note.message);
        log.append_note(note);
    }
    Ok(())
}

fn print_me(backend: &dyn Backend) -> Result<()> {
    let outcome = account::run(backend, account::AccountAction::LoadProfile);
    if let Some(alert) = outcome.alert {
        bail!(alert);
    }
    let Some(profile) = outcome.profile else {
        bail!("server returned no profile");
    };
    println!("Ім'я користувача: {}", profile.username);
    println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
    println!("Роль: {}", profile.role.as_deref().unwrap_or("-"));
    if let Some(id) = profile.id {
        println!("ID: {id}");
    }
    Ok(())
}

fn print_log(config: &Config, all: bool) -> Result<()> {
    let mut log = open_footer(config)?;
    log.set_expanded(all);
    if log.is_empty() {
        println!("Журнал порожній");
        return Ok(());
    }
    for entry in log.visible() {
        println!(
            "{} [{}] {}",
            entry.time_label(),
            entry.severity.as_str(),
            entry.msg
        );
    }
    Ok(())
}
