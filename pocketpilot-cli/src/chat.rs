use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pocketpilot_assistant::{FlowKind, GREETING, Session};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::state::chat_dir;

#[derive(Clone, Debug)]
struct Msg {
    role: Role,
    content: String,
}

#[derive(Clone, Copy, Debug)]
enum Role {
    User,
    Assistant,
    System,
}

/// Daily transcript under ~/.pocketpilot/chat/YYYY-MM-DD.md
pub struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    pub fn open_today() -> Result<Self> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        Ok(Self {
            path: chat_dir()?.join(format!("{today}.md")),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn append_system(&mut self, msg: &str) -> Result<()> {
        self.append("system", msg)
    }

    fn append_user(&mut self, msg: &str) -> Result<()> {
        self.append("user", msg)
    }

    fn append_assistant(&mut self, msg: &str) -> Result<()> {
        self.append("assistant", msg)
    }

    fn append(&mut self, role: &str, msg: &str) -> Result<()> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Utc::now().to_rfc3339(),
            role,
            msg.replace('\n', " / ")
        )?;
        Ok(())
    }
}

const HELP: &str = "Commands:\n\
- /1 .. /9 send the matching quick reply\n\
- /expense /income /goal start a guided flow\n\
- /edit /delete change or remove a recent expense\n\
- /status show where the transcript is saved\n\
- /help\n\
Say \"cancel\" to stop a flow, \"bye\" to leave.";

#[derive(Debug, Clone, PartialEq)]
enum SlashAction {
    /// Submit this text as if typed
    Send(String),
    Start(FlowKind),
    Reply(String),
}

fn handle_slash(input: &str, suggestions: &[String], log_path: &str) -> Option<SlashAction> {
    let s = input.trim();
    let command = s.strip_prefix('/')?;

    if let Ok(n) = command.parse::<usize>() {
        return Some(match n.checked_sub(1).and_then(|i| suggestions.get(i)) {
            Some(text) => SlashAction::Send(text.clone()),
            None => SlashAction::Reply(format!("There is no quick reply #{n} right now.")),
        });
    }

    Some(match command.to_lowercase().as_str() {
        "expense" => SlashAction::Start(FlowKind::Expense),
        "income" => SlashAction::Start(FlowKind::Income),
        "goal" => SlashAction::Start(FlowKind::Goal),
        "edit" | "update" => SlashAction::Start(FlowKind::UpdateExpense),
        "delete" => SlashAction::Start(FlowKind::DeleteExpense),
        "help" => SlashAction::Reply(HELP.to_string()),
        "status" => SlashAction::Reply(format!("Transcript: {log_path}")),
        _ => SlashAction::Reply("Unknown command. Try /help".to_string()),
    })
}

/// One processed line: what to echo as the user's words, and the replies.
struct Exchange {
    said: String,
    replies: Vec<String>,
    closed: bool,
}

async fn respond(session: &mut Session, log: &mut ChatLog, line: &str) -> Result<Exchange> {
    let log_path = log.path().display().to_string();
    let exchange = match handle_slash(line, &session.suggestions(), &log_path) {
        Some(SlashAction::Reply(text)) => Exchange {
            said: line.to_string(),
            replies: vec![text],
            closed: false,
        },
        Some(SlashAction::Start(kind)) => Exchange {
            said: line.to_string(),
            replies: session.start_flow(kind),
            closed: false,
        },
        Some(SlashAction::Send(text)) => {
            let turn = session.submit(&text).await;
            Exchange {
                said: text,
                replies: turn.messages,
                closed: turn.closed,
            }
        }
        None => {
            let turn = session.submit(line).await;
            Exchange {
                said: line.to_string(),
                replies: turn.messages,
                closed: turn.closed,
            }
        }
    };

    log.append_user(&exchange.said)?;
    for reply in &exchange.replies {
        log.append_assistant(reply)?;
    }
    Ok(exchange)
}

fn numbered(suggestions: &[String]) -> String {
    suggestions
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, s)| format!("/{} {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("   ")
}

/// Line-oriented chat over stdin/stdout.
pub async fn run_plain(mut session: Session) -> Result<()> {
    let mut log = ChatLog::open_today()?;
    log.append_system("session_start")?;
    info!(user = %session.user(), "plain chat started");

    println!("pocketpilot: {GREETING}");
    println!("  {}", numbered(&session.suggestions()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let exchange = respond(&mut session, &mut log, line.trim()).await?;
        for reply in &exchange.replies {
            println!("pocketpilot: {reply}");
        }
        if exchange.closed {
            break;
        }
        println!("  {}", numbered(&session.suggestions()));
    }

    log.append_system("session_end")?;
    Ok(())
}

/// Full-screen chat.
pub async fn run_chat(session: Session) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, session).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut session: Session,
) -> Result<()> {
    let mut messages: Vec<Msg> = vec![Msg {
        role: Role::Assistant,
        content: GREETING.to_string(),
    }];
    let mut input = String::new();
    let mut show_help = false;
    let mut closing = false;

    let mut log = ChatLog::open_today()?;
    log.append_system("session_start")?;
    info!(user = %session.user(), "chat started");

    loop {
        let quick = numbered(&session.suggestions());
        let flow = session
            .active_flow()
            .map(|k| format!("flow: {k}"))
            .unwrap_or_else(|| "idle".to_string());

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Min(5),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(f.area());

            let header = Paragraph::new(Text::from(vec![
                Line::from(Span::styled(
                    "PocketPilot",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{flow}  |  Enter=send, Esc=quit, ?=help (empty input)"),
                    Style::default().fg(Color::Gray),
                )),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            let mut lines: Vec<Line> = Vec::new();
            if show_help {
                for l in HELP.lines() {
                    lines.push(Line::from(Span::styled(
                        l.to_string(),
                        Style::default().fg(Color::Gray),
                    )));
                }
                lines.push(Line::raw(""));
            }
            for m in &messages {
                let (tag, color) = match m.role {
                    Role::User => ("you", Color::Cyan),
                    Role::Assistant => ("pocketpilot", Color::Magenta),
                    Role::System => ("system", Color::Gray),
                };
                for (i, part) in m.content.lines().enumerate() {
                    let prefix = if i == 0 { format!("{tag}: ") } else { " ".repeat(tag.len() + 2) };
                    lines.push(Line::from(vec![
                        Span::styled(prefix, Style::default().fg(color)),
                        Span::raw(part.to_string()),
                    ]));
                }
            }

            // Keep the newest lines in view.
            let visible = chunks[1].height.saturating_sub(2) as usize;
            let scroll = lines.len().saturating_sub(visible) as u16;
            let history = Paragraph::new(Text::from(lines))
                .block(Block::default().borders(Borders::ALL).title("conversation"))
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0));
            f.render_widget(history, chunks[1]);

            let quick_widget = Paragraph::new(quick.as_str())
                .block(Block::default().borders(Borders::ALL).title("quick replies"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(quick_widget, chunks[2]);

            let input_widget = Paragraph::new(input.as_str())
                .block(Block::default().borders(Borders::ALL).title("message"))
                .style(Style::default().fg(Color::White));
            f.render_widget(input_widget, chunks[3]);
        })?;

        if closing {
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            break;
        }

        if !event::poll(std::time::Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Char('?') if input.is_empty() => show_help = !show_help,
            KeyCode::Enter => {
                let line = input.trim().to_string();
                input.clear();
                if line.is_empty() {
                    continue;
                }
                let exchange = respond(&mut session, &mut log, &line).await?;
                messages.push(Msg {
                    role: Role::User,
                    content: exchange.said,
                });
                messages.extend(exchange.replies.into_iter().map(|content| Msg {
                    role: Role::Assistant,
                    content,
                }));
                if exchange.closed {
                    messages.push(Msg {
                        role: Role::System,
                        content: "closing".to_string(),
                    });
                    closing = true;
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    log.append_system("session_end")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> Vec<String> {
        vec!["Yes".to_string(), "No".to_string()]
    }

    #[test]
    fn test_numbered_quick_replies() {
        assert_eq!(handle_slash("/2", &quick(), "log"), Some(SlashAction::Send("No".to_string())));
        assert!(matches!(handle_slash("/3", &quick(), "log"), Some(SlashAction::Reply(_))));
        assert!(matches!(handle_slash("/0", &quick(), "log"), Some(SlashAction::Reply(_))));
    }

    #[test]
    fn test_quick_actions() {
        assert_eq!(
            handle_slash("/expense", &quick(), "log"),
            Some(SlashAction::Start(FlowKind::Expense))
        );
        assert_eq!(
            handle_slash("/Edit", &quick(), "log"),
            Some(SlashAction::Start(FlowKind::UpdateExpense))
        );
        assert_eq!(
            handle_slash("/delete", &quick(), "log"),
            Some(SlashAction::Start(FlowKind::DeleteExpense))
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(handle_slash("add expense 5 coffee", &quick(), "log"), None);
        assert_eq!(
            handle_slash("/status", &quick(), "/tmp/x.md"),
            Some(SlashAction::Reply("Transcript: /tmp/x.md".to_string()))
        );
    }

    #[test]
    fn test_numbered_rendering() {
        assert_eq!(numbered(&quick()), "/1 Yes   /2 No");
    }
}
