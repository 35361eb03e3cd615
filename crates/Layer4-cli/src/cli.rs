//! Subcommand handlers

use clap::Subcommand;
use std::process::ExitCode;
use vector_task::{SessionId, TaskError, TaskManager};

/// Exit code for a busy key; the caller should retry later
const EXIT_BUSY: u8 = 2;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch a task for a session
    Store {
        /// Task name (e.g. cpuflamegraph) or item number
        task: String,

        /// Client session id
        #[arg(short, long)]
        session: u32,

        /// Worker argument, digits only
        #[arg(short, long)]
        arg: Option<String>,

        /// Container name forwarded to the worker
        #[arg(long)]
        container: Option<String>,
    },
    /// Print the current status of a task for a session
    Fetch {
        /// Task name (e.g. cpuflamegraph) or item number
        task: String,

        /// Client session id
        #[arg(short, long)]
        session: u32,
    },
    /// List known task types
    List,
    /// Remove every status record left under the working directory
    Reset,
}

pub fn run(manager: &TaskManager, command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Store {
            task,
            session,
            arg,
            container,
        } => {
            let task = resolve_task(manager, &task)?;
            store(manager, &task, session, arg.as_deref(), container.as_deref())
        }
        Command::Fetch { task, session } => {
            let task = resolve_task(manager, &task)?;
            fetch(manager, &task, session)
        }
        Command::List => list(manager),
        Command::Reset => reset(manager),
    }
}

/// Accept a task name or its item number
fn resolve_task(manager: &TaskManager, task: &str) -> anyhow::Result<String> {
    match task.parse::<u32>() {
        Ok(item) => Ok(manager.registry().lookup_item(item)?.name().to_string()),
        Err(_) => Ok(task.to_string()),
    }
}

/// Launch a task
fn store(
    manager: &TaskManager,
    task: &str,
    session: u32,
    argument: Option<&str>,
    container: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let session = SessionId::from(session);
    if let Some(tag) = container {
        manager.bind_namespace(session, tag);
    }

    match manager.store(task, session, argument) {
        Ok(accepted) => {
            if accepted.superseded {
                println!("{} restarted for session {}", accepted.task, accepted.session);
            } else {
                println!("{} started for session {}", accepted.task, accepted.session);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ TaskError::Busy { .. }) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(EXIT_BUSY))
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the current status
fn fetch(manager: &TaskManager, task: &str, session: u32) -> anyhow::Result<ExitCode> {
    let status = manager.fetch(task, SessionId::from(session))?;
    println!("{}", status);
    Ok(ExitCode::SUCCESS)
}

/// Print the task catalog
fn list(manager: &TaskManager) -> anyhow::Result<ExitCode> {
    println!("{:<6} {:<24} {:<5} {}", "ITEM", "TASK", "ARG", "DESCRIPTION");
    println!("{}", "-".repeat(72));

    for def in manager.registry().iter() {
        println!(
            "{:<6} {:<24} {:<5} {}",
            def.task.item(),
            def.name(),
            if def.takes_argument { "yes" } else { "-" },
            def.description
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Remove stale status records. The only command that sweeps.
fn reset(manager: &TaskManager) -> anyhow::Result<ExitCode> {
    let removed = manager.clear_stale();
    println!(
        "Removed {} status record(s) from {}",
        removed,
        manager.status_store().root().display()
    );
    Ok(ExitCode::SUCCESS)
}
