use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, UserParams};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "sample_app_admin")]
#[command(about = "Admin utilities for the sample app (bootstrap and promote users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./sample_app.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, prompting for the password.
    Create(UserCreateArgs),
    /// Grant admin rights to an existing user.
    Promote(UserPromoteArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct UserPromoteArgs {
    #[arg(long)]
    email: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Read a line without echoing it, printing `*` per character.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Returns `(password, confirmation)`; the engine validates the pair.
fn prompt_password_twice() -> Result<(String, String), Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        if password.is_empty() {
            notice("Password can't be blank.")?;
            continue;
        }
        let confirmation = prompt_password("Confirm password: ")?;
        return Ok((password, confirmation));
    }

    Err("too many attempts".into())
}

async fn connect_engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let engine = connect_engine(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let (password, confirmation) = prompt_password_twice()?;
            let params = UserParams::new(&args.name, &args.email, &password, &confirmation);

            match engine.create_user_with_role(&params, args.admin).await {
                Ok(user) => {
                    let role = if user.admin { "admin" } else { "user" };
                    println!("created {role}: {} <{}> ({})", user.name, user.email, user.id);
                }
                Err(EngineError::Validation(errors)) => {
                    for message in errors.full_messages() {
                        eprintln!("{message}");
                    }
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::Promote(args),
        }) => {
            let Some(user) = engine.find_user_by_email(&args.email).await? else {
                eprintln!("user not found: {}", args.email);
                std::process::exit(1);
            };
            let user = engine.set_admin(user.id, true).await?;
            println!("promoted: {} <{}>", user.name, user.email);
        }
    }

    Ok(())
}
