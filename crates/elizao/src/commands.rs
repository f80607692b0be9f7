//! Command handlers for CLI subcommands.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use elizao_agent::{build_model, Capabilities};
use elizao_core::{Settings, StatePaths};
use elizao_memory::MemoryJournal;
use elizao_models::{AgentRole, LeadRecord, Task};
use elizao_orchestrator::{Orchestrator, RoutingTable};
use elizao_persistence::{JsonRecordStore, Persistence};

use crate::cli::{Commands, LeadCommands};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, state_dir: &Path) -> Result<()> {
    let paths = StatePaths::new(state_dir);

    match command {
        Commands::Paths => cmd_paths(&paths),
        Commands::Route { task_type } => cmd_route(&Settings::from_env()?, &task_type),
        Commands::Run { interval, tasks } => block_on(cmd_run(
            &paths,
            &Settings::from_env()?,
            interval,
            tasks.as_deref(),
        )),
        Commands::Exec {
            task_type,
            description,
            payload,
            priority,
        } => {
            let task = Task::new(task_type, description)
                .with_priority(priority)
                .with_payload(parse_payload(payload.as_deref())?);
            block_on(cmd_exec(&paths, &Settings::from_env()?, task))
        }
        Commands::Lead { action } => match action {
            LeadCommands::Add {
                chat_title,
                contact,
                company,
                email,
                phone,
                source,
                notes,
                status,
                next_follow_up,
            } => {
                let mut lead = LeadRecord::new(chat_title, contact)
                    .with_status(status)
                    .with_notes(notes);
                lead.company = company;
                lead.email = email;
                lead.phone = phone;
                lead.source = source;
                if let Some(date) = next_follow_up {
                    lead = lead.with_next_follow_up(date);
                }
                block_on(cmd_lead_add(&paths, lead))
            }
        },
        Commands::Agents => block_on(cmd_agents(&paths, &Settings::from_env()?)),
        Commands::Check => block_on(cmd_check(&Settings::from_env()?)),
    }
}

/// Runs an async command on a fresh runtime.
fn block_on<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(future)
}

/// Reads a JSON array of tasks.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let tasks: Vec<Task> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid task file {}: {}", path.display(), e))?;
    Ok(tasks)
}

/// Parses a payload argument; absent means an empty object.
pub fn parse_payload(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value =
        serde_json::from_str(raw).map_err(|e| format!("Invalid payload JSON: {}", e))?;
    if !value.is_object() {
        return Err("Payload must be a JSON object".into());
    }
    Ok(value)
}

fn routing_table(settings: &Settings) -> RoutingTable {
    if settings.strict_routing {
        RoutingTable::strict()
    } else {
        RoutingTable::default()
    }
}

fn capabilities(paths: &StatePaths, settings: &Settings) -> Capabilities {
    let store = Arc::new(JsonRecordStore::new(paths.data_dir()));
    match build_model(&settings.model) {
        Ok(model) => Capabilities::new(model, store),
        Err(e) => {
            warn!(backend = %settings.model.backend, error = %e, "Model backend unavailable");
            Capabilities::without_model(e, store)
        }
    }
}

fn build_orchestrator(paths: &StatePaths, settings: &Settings) -> Result<Orchestrator> {
    paths.ensure_all()?;
    Ok(Orchestrator::from_capabilities(
        &capabilities(paths, settings),
        routing_table(settings),
        Some(MemoryJournal::new(paths.memory_dir())),
    ))
}

async fn cmd_run(
    paths: &StatePaths,
    settings: &Settings,
    interval: Option<u64>,
    tasks: Option<&Path>,
) -> Result<()> {
    let orchestrator = build_orchestrator(paths, settings)?;

    if let Some(path) = tasks {
        let tasks = load_tasks(path)?;
        info!(count = tasks.len(), file = %path.display(), "Enqueuing tasks");
        for task in tasks {
            orchestrator.add_task(task)?;
        }
    }

    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(settings.cycle_interval);

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    });

    println!(
        "Running with agents [{}], cycle every {}s. Press Ctrl-C to stop.",
        orchestrator
            .registered_roles()
            .iter()
            .map(|r| r.agent_id())
            .collect::<Vec<_>>()
            .join(", "),
        interval.as_secs()
    );
    orchestrator.run_until(interval, rx).await;

    let pending = orchestrator.take_pending()?;
    if !pending.is_empty() {
        warn!(count = pending.len(), "Tasks left unprocessed at shutdown");
    }
    Ok(())
}

async fn cmd_exec(paths: &StatePaths, settings: &Settings, task: Task) -> Result<()> {
    let orchestrator = build_orchestrator(paths, settings)?;
    let outcome = orchestrator.execute(task).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.success {
        Ok(())
    } else {
        Err(format!(
            "Task {} failed: {}",
            outcome.task_id,
            outcome.error.as_deref().unwrap_or("unknown error")
        )
        .into())
    }
}

fn cmd_route(settings: &Settings, task_type: &str) -> Result<()> {
    let role = routing_table(settings).route(task_type)?;
    println!("{} -> {} ({})", task_type, role.agent_id(), role);
    Ok(())
}

async fn cmd_lead_add(paths: &StatePaths, lead: LeadRecord) -> Result<()> {
    paths.ensure_all()?;
    let store = JsonRecordStore::new(paths.data_dir());
    let title = lead.chat_title.clone();
    store.append_lead(lead).await?;
    println!("Added lead '{}'", title);
    Ok(())
}

async fn cmd_agents(paths: &StatePaths, settings: &Settings) -> Result<()> {
    let orchestrator = build_orchestrator(paths, settings)?;
    let summaries = orchestrator.agent_summaries().await;

    println!("{:<16} {:<10} {:<10} {:>8}", "AGENT", "ROLE", "STATE", "ACTIONS");
    for summary in &summaries {
        println!(
            "{:<16} {:<10} {:<10} {:>8}",
            summary.id,
            summary.role.to_string(),
            summary.state.to_string(),
            summary.actions_recorded
        );
        for (name, value) in &summary.metrics {
            println!("    {} = {}", name, value);
        }
    }

    for role in AgentRole::ALL {
        if !summaries.iter().any(|s| s.role == role) {
            println!(
                "{:<16} {:<10} not registered",
                role.agent_id(),
                role.to_string()
            );
        }
    }
    Ok(())
}

async fn cmd_check(settings: &Settings) -> Result<()> {
    let model = build_model(&settings.model)?;
    model.check().await?;
    println!(
        "{} backend at {} is reachable (model: {})",
        settings.model.backend,
        settings.model.base_url,
        model.model_name()
    );
    Ok(())
}

fn cmd_paths(paths: &StatePaths) -> Result<()> {
    println!("state:  {}", paths.root().display());
    println!("data:   {}", paths.data_dir().display());
    println!("memory: {}", paths.memory_dir().display());
    println!("logs:   {}", paths.logs_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_tasks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[
                {"type": "business_analysis", "description": "Weekly review",
                 "data": {"chat_title": "Acme", "messages": []}},
                {"id": "t-2", "type": "lead_followup", "priority": 3,
                 "created_at": "2025-01-01T12:00:00.123456"}
            ]"#,
        )
        .unwrap();

        let tasks = load_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_type, "business_analysis");
        assert_eq!(tasks[0].payload["chat_title"], "Acme");
        assert_eq!(tasks[1].id.as_str(), "t-2");
        assert_eq!(tasks[1].priority, 3);
    }

    #[test]
    fn test_load_tasks_rejects_non_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"type": "lead_followup"}"#).unwrap();

        let err = load_tasks(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid task file"));
    }

    #[test]
    fn test_load_tasks_missing_file() {
        let err = load_tasks(Path::new("/nonexistent/elizao/tasks.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(None).unwrap(), serde_json::json!({}));
        assert_eq!(
            parse_payload(Some(r#"{"messages": ["hi"]}"#)).unwrap(),
            serde_json::json!({"messages": ["hi"]})
        );
        assert!(parse_payload(Some("[1, 2]")).is_err());
        assert!(parse_payload(Some("{not json")).is_err());
    }

    #[test]
    fn test_lead_add_writes_record() {
        let dir = tempdir().unwrap();
        let command = Commands::Lead {
            action: LeadCommands::Add {
                chat_title: "Acme group".into(),
                contact: "Jane".into(),
                company: "Acme".into(),
                email: String::new(),
                phone: String::new(),
                source: "telegram".into(),
                notes: "asked for a proposal".into(),
                status: "Contacted".into(),
                next_follow_up: None,
            },
        };

        execute(command, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("data").join("leads.json")).unwrap();
        let leads: Vec<LeadRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].chat_title, "Acme group");
        assert_eq!(leads[0].status, "Contacted");
        assert_eq!(leads[0].company, "Acme");
    }

    #[test]
    fn test_exec_rejects_non_object_payload() {
        let dir = tempdir().unwrap();
        let command = Commands::Exec {
            task_type: "lead_followup".into(),
            description: String::new(),
            payload: Some("[1, 2]".into()),
            priority: 0,
        };

        let err = execute(command, dir.path()).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
        assert!(!dir.path().join("memory").exists());
    }

    #[test]
    fn test_paths_command() {
        let dir = tempdir().unwrap();
        assert!(execute(Commands::Paths, dir.path()).is_ok());
    }
}
