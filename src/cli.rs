//! Command line: the terminal UI by default, plus a few one-shot commands
//! for scripting.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

use crate::api::{ApiClient, AuthService, ProjectService, TaskService};
use crate::config::{default_config_path, Config};
use crate::error::SessionError;
use crate::helpers::{format_date_long, is_overdue, priority_level_text};
use crate::project::{Project, ProjectId};
use crate::session::{AuthContext, FileSessionStore};
use crate::task::Task;
use crate::ui::{self, App};
use crate::user::User;

pub type CliResult = Result<(), Box<dyn Error>>;

pub fn command() -> Command {
    Command::new("taskdeck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal client for the task manager API")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use instead of the default location"),
        )
        .subcommand(Command::new("init").about("Write a default config file"))
        .subcommand(Command::new("whoami").about("Show the logged-in user"))
        .subcommand(Command::new("logout").about("Forget the saved session"))
        .subcommand(Command::new("projects").about("List your projects"))
        .subcommand(
            Command::new("tasks").about("List a project's tasks").arg(
                Arg::new("project-id")
                    .required(true)
                    .value_parser(value_parser!(ProjectId))
                    .help("Project id"),
            ),
        )
        .subcommand(Command::new("top").about("List your top-priority tasks"))
}

pub fn config_arg(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>("config").cloned()
}

/// `init` runs before any config is read.
pub fn init(matches: &ArgMatches) -> CliResult {
    let path = match config_arg(matches) {
        Some(path) => path,
        None => default_config_path()?,
    };
    if Config::init(&path)? {
        println!("Wrote default config to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

fn session(config: &Config) -> Result<AuthContext<FileSessionStore>, SessionError> {
    let path = config.session_path().ok_or(SessionError::NoDataDir)?;
    Ok(AuthContext::init(FileSessionStore::new(path)))
}

fn client(config: &Config, ctx: &AuthContext<FileSessionStore>) -> Result<ApiClient, Box<dyn Error>> {
    let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    api.use_token(ctx.token());
    Ok(api)
}

fn require_user(ctx: &AuthContext<FileSessionStore>) -> Result<User, Box<dyn Error>> {
    ctx.user()
        .cloned()
        .ok_or_else(|| "not logged in; run `taskdeck` and log in first".into())
}

pub async fn run(matches: &ArgMatches, config: Config) -> CliResult {
    let mut ctx = session(&config)?;
    match matches.subcommand() {
        None => {
            let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
            let app = App::new(api, ctx, config.flash_delay());
            ui::run(app).await?;
        }
        Some(("whoami", _)) => match ctx.user() {
            Some(user) => println!("{} <{}>", user.display_name(), user.email),
            None => println!("Not logged in"),
        },
        Some(("logout", _)) => {
            ctx.logout();
            println!("Logged out");
        }
        Some(("projects", _)) => {
            let user = require_user(&ctx)?;
            let projects = client(&config, &ctx)?.list_projects(user.id).await?;
            if projects.is_empty() {
                println!("No projects yet.");
            }
            for project in &projects {
                println!("{}", project_line(project));
            }
        }
        Some(("tasks", sub)) => {
            let user = require_user(&ctx)?;
            let id = sub
                .get_one::<ProjectId>("project-id")
                .copied()
                .ok_or("missing project id")?;
            let tasks = client(&config, &ctx)?.project_tasks(id, user.id).await?;
            if tasks.is_empty() {
                println!("No tasks found in this project.");
            }
            for task in tasks {
                println!("{}", task_line(&task.with_default_priority()));
            }
        }
        Some(("top", _)) => {
            let user = require_user(&ctx)?;
            let tasks = client(&config, &ctx)?.top_priority(user.id).await?;
            for task in tasks {
                println!("{}", task_line(&task.with_default_priority()));
            }
        }
        Some((other, _)) => return Err(format!("unknown command {other}").into()),
    }
    Ok(())
}

pub fn project_line(project: &Project) -> String {
    match project.date_range() {
        Some(dates) => format!("#{} {}  ({dates})", project.id, project.title),
        None => format!("#{} {}", project.id, project.title),
    }
}

pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "#{} [{}] {}  P{} {}  due {}",
        task.id,
        task.status.label(),
        task.title,
        task.effective_priority(),
        priority_level_text(task.priority),
        format_date_long(task.due_date.as_deref()),
    );
    if is_overdue(task.due_date.as_deref(), task.status) {
        line.push_str("  OVERDUE");
    }
    line
}
