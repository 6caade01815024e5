use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pocketpilot_assistant::{Assistant, Session};
use pocketpilot_core::{Collaborators, format_plain_amount, goal_category_label, month_label};
use pocketpilot_store::JsonStore;
use std::sync::Arc;
use tracing::info;

mod chat;
mod config;
mod logging;
mod state;

use config::Config;
use logging::LogTarget;

#[derive(Parser, Debug)]
#[command(name = "pocketpilot", version, about = "PocketPilot budgeting assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the assistant (full-screen unless --plain)
    Chat {
        /// Read lines from stdin instead of drawing a terminal UI
        #[arg(long)]
        plain: bool,
    },

    /// Send a single message and print the reply
    Say {
        /// Message text, e.g. `add expense 45 groceries`
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List recent expenses, optionally filtered ("groceries", "2024-06-12")
    Expenses {
        filter: Vec<String>,

        /// Limit number of rows printed (default: 20)
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Write CSV to stdout instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Spend, income and category totals for one month
    Summary {
        /// Month as YYYY-MM (default: this month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Month-by-month spending history
    History,

    /// Goals with this month's progress
    Goals {
        /// Month as YYYY-MM to measure progress against (default: this month)
        #[arg(long)]
        month: Option<String>,

        /// Delete the goal with this id instead of listing
        #[arg(long)]
        delete: Option<String>,
    },

    /// Manage ~/.pocketpilot/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Chat { plain } => {
            let cfg = config::load_config()?;
            let target = if plain {
                LogTarget::Stderr
            } else {
                LogTarget::File(state::logs_dir()?.join("pocketpilot.log"))
            };
            logging::init(&cfg.chat.log_level, target)?;
            let session = build_session(&cfg)?;
            if plain {
                chat::run_plain(session).await?;
            } else {
                chat::run_chat(session).await?;
            }
        }

        Command::Say { text } => {
            let cfg = config::load_config()?;
            logging::init(&cfg.chat.log_level, LogTarget::Stderr)?;
            say(build_session(&cfg)?, &text.join(" ")).await?;
        }

        Command::Expenses { filter, limit, csv } => {
            let cfg = config::load_config()?;
            logging::init(&cfg.chat.log_level, LogTarget::Stderr)?;
            let session = build_session(&cfg)?;
            list_expenses(&session, &filter.join(" "), limit, csv).await?;
        }

        Command::Summary { month } => {
            let cfg = config::load_config()?;
            logging::init(&cfg.chat.log_level, LogTarget::Stderr)?;
            print_summary(&build_session(&cfg)?, month.as_deref()).await?;
        }

        Command::History => {
            let cfg = config::load_config()?;
            logging::init(&cfg.chat.log_level, LogTarget::Stderr)?;
            print_history(&build_session(&cfg)?).await?;
        }

        Command::Goals { month, delete } => {
            let cfg = config::load_config()?;
            logging::init(&cfg.chat.log_level, LogTarget::Stderr)?;
            let session = build_session(&cfg)?;
            match delete {
                Some(id) => {
                    session.assistant().delete_goal(session.user(), &id).await?;
                    println!("Deleted goal {id}.");
                }
                None => print_goals(&session, month.as_deref()).await?,
            }
        }
    }

    Ok(())
}

fn build_session(cfg: &Config) -> Result<Session> {
    let path = cfg.store_path()?;
    let store = Arc::new(JsonStore::open(&path)?);
    let assistant = Assistant::with_settings(Collaborators::shared(store), cfg.assistant_settings()?);
    info!(store = %path.display(), user = %cfg.user(), "session ready");
    Ok(Session::new(assistant, cfg.user()))
}

async fn say(mut session: Session, text: &str) -> Result<()> {
    let turn = session.submit(text).await;
    if let Some(err) = turn.error {
        bail!(err);
    }
    for message in &turn.messages {
        println!("{message}");
    }
    if session.active_flow().is_some() {
        println!("(continue in `pocketpilot chat` to finish this step-by-step)");
    }
    Ok(())
}

async fn list_expenses(session: &Session, filter: &str, limit: usize, csv: bool) -> Result<()> {
    let filters = session.assistant().resolve_filters(filter);
    let found = session.assistant().lookup(session.user(), &filters).await?;
    let rows: Vec<_> = found.matches.into_iter().take(limit).collect();

    if csv {
        let mut w = csv::Writer::from_writer(std::io::stdout());
        w.write_record(["id", "date", "amount", "total", "category", "note"])?;
        for row in &rows {
            let e = &row.expense;
            w.write_record([
                e.id.clone(),
                row.date_iso.clone(),
                format_plain_amount(e.amount),
                format_plain_amount(e.total()),
                row.category_label().to_string(),
                e.note.clone().unwrap_or_default(),
            ])?;
        }
        w.flush().context("write csv")?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("No expenses found{}.", filters.describe());
        return Ok(());
    }
    println!("Expenses{}:", filters.describe());
    for (i, row) in rows.iter().enumerate() {
        println!("{:>3}. {:<12} {}", i + 1, row.display_date, row.summary);
    }
    Ok(())
}

async fn print_summary(session: &Session, month: Option<&str>) -> Result<()> {
    let assistant = session.assistant();
    let summary = assistant.monthly_summary(session.user(), month).await?;

    println!("{}", month_label(&summary.month));
    println!("  income     {}", assistant.money(summary.monthly_income));
    println!("  spent      {}", assistant.money(summary.total_spent));
    println!("  remaining  {}", assistant.money(summary.remaining_budget));
    println!(
        "  {} {}",
        summary.transactions,
        if summary.transactions == 1 { "transaction" } else { "transactions" }
    );
    for entry in &summary.by_category {
        println!(
            "  {:<16} {:>12} {:>5.1}%",
            entry.label(),
            assistant.money(entry.total),
            summary.share_of(entry) * 100.0
        );
    }
    Ok(())
}

async fn print_history(session: &Session) -> Result<()> {
    let assistant = session.assistant();
    let history = assistant.history(session.user()).await?;
    if history.months.is_empty() {
        println!("No previous months yet. Start logging expenses.");
        return Ok(());
    }

    let totals = &history.totals;
    println!(
        "{} month(s), average spend {}, lifetime {}",
        totals.months,
        assistant.money(totals.average_spent),
        assistant.money(totals.lifetime_spent)
    );
    if let Some(best) = &totals.best_cushion {
        println!("Best cushion: {}", month_label(best));
    }
    for month in &history.months {
        println!(
            "  {:<16} spent {:>12}  remaining {:>12}  ({} tx)",
            month_label(&month.month),
            assistant.money(month.total_spent),
            assistant.money(month.remaining_budget),
            month.transactions
        );
    }
    Ok(())
}

async fn print_goals(session: &Session, month: Option<&str>) -> Result<()> {
    let assistant = session.assistant();
    let overview = assistant.goal_overview(session.user(), month).await?;
    if overview.is_empty() {
        println!("No goals yet. Try `pocketpilot say add goal vacation 1200`.");
        return Ok(());
    }

    let mut heading = None;
    for progress in &overview {
        let section = if progress.completed { "Completed goals" } else { "Active goals" };
        if heading != Some(section) {
            println!("{section}:");
            heading = Some(section);
        }
        let remaining = if progress.completed {
            "goal reached".to_string()
        } else {
            format!("{} remaining", assistant.money(progress.remaining))
        };
        println!(
            "  {} {} ({}) {} of {}, {}",
            progress.goal.id,
            progress.goal.title,
            goal_category_label(&progress.goal),
            assistant.money(progress.spent),
            assistant.money(progress.goal.target_amount),
            remaining
        );
    }
    Ok(())
}
