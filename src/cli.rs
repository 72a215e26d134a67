//! One-shot commands. Unlike the task screen these report failures through
//! the exit status.

use std::path::Path;

use anyhow::{Context, Result};

use crate::client::TaskClient;
use crate::models::{Draft, Task, TaskStatus};
use crate::settings::Settings;

pub async fn list(client: &TaskClient, json: bool) -> Result<()> {
    let tasks = client
        .list_tasks()
        .await
        .context("failed to fetch tasks")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print!("{}", format_table(&tasks));
    }
    Ok(())
}

pub async fn add(client: &TaskClient, title: String, due_date: String) -> Result<()> {
    let new_task = Draft { title, due_date }.validate()?;
    let status = client.create_task(&new_task).await?;
    if !status.is_success() {
        anyhow::bail!("service rejected the task ({status})");
    }
    println!(
        "Added \"{}\" due {} ({})",
        new_task.title,
        new_task.due_date_string(),
        TaskStatus::NotStarted
    );
    Ok(())
}

pub async fn set_status(client: &TaskClient, task_id: &str, status: TaskStatus) -> Result<()> {
    let answer = client.update_status(task_id, status).await?;
    if !answer.is_success() {
        anyhow::bail!("service rejected the update of {task_id} ({answer})");
    }
    println!("{task_id} → {status}");
    Ok(())
}

/// Stores Notion credentials in `<dir>/.notion-tasks/setting.json`, keeping
/// any other saved values.
pub fn init(dir: &Path, token: String, database_id: String) -> Result<()> {
    let mut settings = Settings::load_in(dir);
    settings.notion_token = Some(token);
    settings.database_id = Some(database_id);
    settings
        .save_to(dir)
        .with_context(|| format!("failed to write {}", Settings::path_in(dir).display()))?;
    println!("Wrote {}", Settings::path_in(dir).display());
    Ok(())
}

fn format_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let id_width = tasks.iter().map(|t| t.id.len()).max().unwrap_or(0).max(2);
    let mut out = format!("{:<id_width$}  {:<11}  {:<10}  TITLE\n", "ID", "STATUS", "DUE");
    for task in tasks {
        out.push_str(&format!(
            "{:<id_width$}  {:<11}  {:<10}  {}\n",
            task.id,
            task.status.as_str(),
            task.due_date,
            task.title
        ));
    }
    out
}
