//! Interactive terminal front end — login, registration, and the chat loop.
//!
//! The sidebar actions of a point-and-click UI map to slash commands here:
//! `/new`, `/resume`, `/clear`, `/history`, `/load`, `/detail`, `/deepsearch`,
//! `/filter`, `/export`, `/csv`, `/logout`, `/quit`.

use crate::config::Config;
use crate::providers::{self, Provider};
use crate::session::types::{CategoryFilter, DetailLevel, Role, TableRow, Theme, Turn};
use crate::session::{SendOutcome, Session, export};
use crate::store::{AuthError, Database};
use anyhow::{Context, Result};
use console::{Style, style};
use dialoguer::{Input, Password, Select};
use std::fs;
use std::path::PathBuf;

const SAMPLE_QUESTIONS: [&str; 3] = [
    "What are eco-friendly fabrics?",
    "Suggest sustainable brands for casual wear",
    "How to care for organic cotton clothes?",
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    New,
    Resume,
    Clear,
    History,
    Load(usize),
    Detail(DetailLevel),
    DeepSearch,
    Filter(CategoryFilter),
    ExportChat(Option<PathBuf>),
    ExportCsv(Option<PathBuf>),
    Logout,
    Quit,
}

/// Parse a slash command. `None` means ordinary chat input; `Some(Err(_))`
/// carries a usage message for a malformed command.
pub fn parse_command(line: &str) -> Option<std::result::Result<Command, String>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let command = match head {
        "/help" => Ok(Command::Help),
        "/new" => Ok(Command::New),
        "/resume" => Ok(Command::Resume),
        "/clear" => Ok(Command::Clear),
        "/history" => Ok(Command::History),
        "/load" => arg
            .and_then(|a| a.parse::<usize>().ok())
            .map(Command::Load)
            .ok_or_else(|| "Usage: /load <number> (see /history)".to_string()),
        "/detail" => arg
            .and_then(DetailLevel::from_name)
            .map(Command::Detail)
            .ok_or_else(|| "Usage: /detail <brief|standard|detailed>".to_string()),
        "/deepsearch" => Ok(Command::DeepSearch),
        "/filter" => arg
            .and_then(CategoryFilter::from_name)
            .map(Command::Filter)
            .ok_or_else(|| {
                format!("Usage: /filter <{}>", CategoryFilter::NAMES.join("|"))
            }),
        "/export" => Ok(Command::ExportChat(arg.map(PathBuf::from))),
        "/csv" => Ok(Command::ExportCsv(arg.map(PathBuf::from))),
        "/logout" => Ok(Command::Logout),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {other}. Try /help.")),
    };
    Some(command)
}

/// Top-level interactive entry: loop between the login menu and chat until
/// the user quits.
pub async fn run(config: &Config) -> Result<()> {
    let db = Database::open(&config.db_path())?;
    let provider = providers::create_provider(config.provider_name(), config.api_key.as_deref())?;

    loop {
        let Some(username) = login_menu(&db)? else {
            return Ok(());
        };
        let mut session = Session::begin(&db, &username, config.model_name(), config.detail_level)?;
        render_conversation(&session, config.theme);
        println!("{}", style("Try these questions:").bold());
        for question in SAMPLE_QUESTIONS {
            println!("  {} {question}", style("•").green());
        }
        println!("{}", style("Type /help for commands.").dim());

        let back_to_login = chat_loop(&db, provider.as_ref(), &mut session, config.theme).await?;
        if !back_to_login {
            return Ok(());
        }
        println!("You have logged out. Please log in to continue! 🌿");
    }
}

/// Register a user from interactive prompts. Also backs the `register`
/// subcommand.
pub fn register_prompt(db: &Database) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .context("reading username")?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords don't match.")
        .interact()
        .context("reading password")?;

    match db.register(&username, &password) {
        Ok(()) => println!("{}", style("Registered successfully!").green()),
        Err(e @ (AuthError::InvalidUsername | AuthError::WeakPassword | AuthError::DuplicateUser)) => {
            println!("{}", style(e).red());
        }
        Err(e) => return Err(e).context("registration failed"),
    }
    Ok(())
}

/// Show the login/register menu until a user authenticates or quits.
/// Returns the authenticated username, or `None` on quit.
fn login_menu(db: &Database) -> Result<Option<String>> {
    loop {
        let choice = Select::new()
            .with_prompt("Verdant 🌱")
            .items(&["Login", "Register", "Quit"])
            .default(0)
            .interact()
            .context("reading menu choice")?;

        match choice {
            0 => {
                let username: String = Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .context("reading username")?;
                let password = Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("reading password")?;
                if db.authenticate(&username, &password)? {
                    println!("{}", style("Logged in successfully!").green());
                    return Ok(Some(username));
                }
                // Deliberately the same message for unknown users and wrong
                // passwords.
                println!("{}", style("Invalid username or password.").red());
            }
            1 => register_prompt(db)?,
            _ => return Ok(None),
        }
    }
}

/// The chat loop. Returns `Ok(true)` on logout (back to the login menu) and
/// `Ok(false)` on quit.
async fn chat_loop(
    db: &Database,
    provider: &dyn Provider,
    session: &mut Session,
    theme: Theme,
) -> Result<bool> {
    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
            .context("reading chat input")?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = parse_command(&line) else {
            println!("{}", style("Thinking... ⏳").dim());
            let before = session.turns().len();
            let outcome = session.send(db, provider, line.trim()).await;
            for turn in appended_replies(session.turns(), before) {
                render_turn(turn, session.filter, theme);
            }
            if outcome != SendOutcome::Replied {
                println!(
                    "{}",
                    style("The reply above was not saved to history.").dim()
                );
            }
            continue;
        };

        let command = match command {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", style(usage).yellow());
                continue;
            }
        };

        match command {
            Command::Help => print_help(),
            Command::New => {
                session.new_chat(db)?;
                render_conversation(session, theme);
            }
            Command::Resume => {
                if session.resume(db)? {
                    render_conversation(session, theme);
                } else {
                    println!("Nothing to resume.");
                }
            }
            Command::Clear => {
                session.clear(db)?;
                render_conversation(session, theme);
            }
            Command::History => {
                let snapshots = db.list_snapshots(session.username())?;
                if snapshots.is_empty() {
                    println!("No saved chats yet.");
                }
                for (i, meta) in snapshots.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, meta.label());
                }
            }
            Command::Load(index) => {
                let snapshots = db.list_snapshots(session.username())?;
                match index.checked_sub(1).and_then(|i| snapshots.get(i)) {
                    Some(meta) => {
                        let turns = db
                            .load_snapshot(&meta.id)
                            .with_context(|| format!("loading snapshot {}", meta.id))?;
                        session.restore_snapshot(turns);
                        render_conversation(session, theme);
                    }
                    None => println!("No chat #{index}; see /history."),
                }
            }
            Command::Detail(level) => {
                session.detail_level = level;
                println!("Response detail set to {level}.");
            }
            Command::DeepSearch => {
                session.deep_search = !session.deep_search;
                println!(
                    "DeepSearch mode {} 🔍",
                    if session.deep_search { "enabled" } else { "disabled" }
                );
            }
            Command::Filter(filter) => {
                session.filter = filter;
                println!("Table filter set to {filter}.");
            }
            Command::ExportChat(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from("chat_history.md"));
                let markdown = export::markdown_transcript(session.turns());
                fs::write(&path, markdown)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Chat exported to {} 📜", path.display());
            }
            Command::ExportCsv(path) => match session.last_table() {
                Some(rows) => {
                    let path = path.unwrap_or_else(|| PathBuf::from("recommendations.csv"));
                    fs::write(&path, export::table_csv(rows))
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Recommendations saved to {} 📥", path.display());
                }
                None => println!("No recommendations table to export yet."),
            },
            Command::Logout => return Ok(true),
            Command::Quit => return Ok(false),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /new               start a new chat (current one becomes resumable)");
    println!("  /resume            resume the backed-up chat");
    println!("  /clear             clear the current chat");
    println!("  /history           list saved chats");
    println!("  /load <n>          load a saved chat");
    println!("  /detail <level>    brief, standard, or detailed replies");
    println!("  /deepsearch        toggle the web-trends instruction");
    println!("  /filter <cat>      filter tables: {}", CategoryFilter::NAMES.join(", "));
    println!("  /export [path]     export the chat as markdown");
    println!("  /csv [path]        export the latest recommendations as CSV");
    println!("  /logout            back to the login menu");
    println!("  /quit              exit");
}

/// Turns appended by the last send, minus the echoed user turn. A
/// persistence failure appends both the real reply and an apology turn;
/// both must render.
fn appended_replies(turns: &[Turn], before: usize) -> &[Turn] {
    &turns[(before + 1).min(turns.len())..]
}

fn render_conversation(session: &Session, theme: Theme) {
    for turn in session.turns() {
        render_turn(turn, session.filter, theme);
    }
}

fn render_turn(turn: &Turn, filter: CategoryFilter, theme: Theme) {
    println!();
    println!("{}", role_style(turn.role, theme).apply_to(turn.role.title()));
    if let Some(rows) = turn.table.as_deref() {
        render_table(rows, filter);
    }
    if !turn.content.trim().is_empty() {
        println!("{}", turn.content);
    }
    println!("{}", style(turn.short_timestamp()).dim());
}

fn render_table(rows: &[TableRow], filter: CategoryFilter) {
    let visible: Vec<&TableRow> = rows.iter().filter(|r| filter.matches(r)).collect();
    if visible.is_empty() {
        return;
    }
    for row in visible {
        println!(
            "  {} {} — {} ({})",
            style("▸").green(),
            style(&row.category).bold(),
            row.recommendation,
            style(&row.impact).italic()
        );
    }
}

fn role_style(role: Role, theme: Theme) -> Style {
    let base = match role {
        Role::Assistant => Style::new().green(),
        Role::User => Style::new().cyan(),
        Role::System => Style::new().dim(),
    };
    match theme {
        Theme::Light => base.bold(),
        Theme::Dark => base.bright().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_input_is_not_a_command() {
        assert_eq!(parse_command("what are eco fabrics?"), None);
        assert_eq!(parse_command("  hello  "), None);
    }

    #[test]
    fn bare_commands_parse() {
        assert_eq!(parse_command("/new"), Some(Ok(Command::New)));
        assert_eq!(parse_command("/resume"), Some(Ok(Command::Resume)));
        assert_eq!(parse_command("/quit"), Some(Ok(Command::Quit)));
        assert_eq!(parse_command("/exit"), Some(Ok(Command::Quit)));
        assert_eq!(parse_command(" /logout "), Some(Ok(Command::Logout)));
    }

    #[test]
    fn load_requires_a_number() {
        assert_eq!(parse_command("/load 3"), Some(Ok(Command::Load(3))));
        assert!(matches!(parse_command("/load"), Some(Err(_))));
        assert!(matches!(parse_command("/load abc"), Some(Err(_))));
    }

    #[test]
    fn detail_parses_levels() {
        assert_eq!(
            parse_command("/detail brief"),
            Some(Ok(Command::Detail(DetailLevel::Brief)))
        );
        assert_eq!(
            parse_command("/detail Detailed"),
            Some(Ok(Command::Detail(DetailLevel::Detailed)))
        );
        assert!(matches!(parse_command("/detail huge"), Some(Err(_))));
    }

    #[test]
    fn filter_parses_categories() {
        assert_eq!(
            parse_command("/filter care"),
            Some(Ok(Command::Filter(CategoryFilter::Care)))
        );
        assert!(matches!(parse_command("/filter shoes"), Some(Err(_))));
    }

    #[test]
    fn export_paths_are_optional() {
        assert_eq!(parse_command("/export"), Some(Ok(Command::ExportChat(None))));
        assert_eq!(
            parse_command("/export out.md"),
            Some(Ok(Command::ExportChat(Some(PathBuf::from("out.md")))))
        );
        assert_eq!(
            parse_command("/csv rows.csv"),
            Some(Ok(Command::ExportCsv(Some(PathBuf::from("rows.csv")))))
        );
    }

    #[test]
    fn successful_turn_renders_only_the_assistant_reply() {
        let turns = vec![
            Turn::new(Role::User, "hello"),
            Turn::new(Role::Assistant, "hi there"),
        ];
        let shown = appended_replies(&turns, 0);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].content, "hi there");
    }

    #[test]
    fn persistence_failure_renders_reply_and_apology() {
        use crate::session::UNEXPECTED_FAILURE_REPLY;
        let turns = vec![
            Turn::new(Role::Assistant, "Welcome!"),
            Turn::new(Role::User, "eco fabrics?"),
            Turn::new(Role::Assistant, "Here are some ideas 🌿"),
            Turn::new(Role::Assistant, UNEXPECTED_FAILURE_REPLY),
        ];
        let shown = appended_replies(&turns, 1);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].content, "Here are some ideas 🌿");
        assert_eq!(shown[1].content, UNEXPECTED_FAILURE_REPLY);
    }

    #[test]
    fn unknown_commands_get_a_hint() {
        match parse_command("/frobnicate") {
            Some(Err(msg)) => assert!(msg.contains("/help")),
            other => panic!("expected error, got {other:?}"),
        }
    }
}
