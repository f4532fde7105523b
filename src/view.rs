use std::fmt::Write;

use crate::controller::{Field, Level, Notification, OutputView};
use crate::tasks::Task;


const COLUMNS: [(&str, usize); 6] = [
    ("ID", 36),
    ("Name", 20),
    ("Owner", 12),
    ("Command", 30),
    ("Executions", 10),
    ("", 10),
];


pub fn render_tasks(tasks: &[Task], running: Option<&str>) -> String {
    if tasks.is_empty() {
        return "No tasks\n".to_string();
    }

    let mut out = String::new();
    let header: Vec<&str> = COLUMNS.iter().map(|(title, _)| *title).collect();
    push_row(&mut out, &header);

    for task in tasks {
        let id = task.id.as_deref().unwrap_or("-");
        let executions = task.task_executions.len().to_string();
        let marker = match (running, task.id.as_deref()) {
            (Some(running), Some(id)) if running == id => "running…",
            _ => "",
        };
        push_row(
            &mut out,
            &[id, &task.name, &task.owner, &task.command, &executions, marker],
        );
    }

    out
}


fn push_row(out: &mut String, cells: &[&str]) {
    let line: Vec<String> = cells.iter()
        .zip(COLUMNS.iter())
        .map(|(cell, (_, width))| format!("{:<w$}", truncate(cell, *width), w = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}


fn truncate(text: &str, width: usize) -> String {
    // Commands may span lines; the table is one row per task.
    let text = text.replace('\n', " ");
    if text.chars().count() <= width {
        return text;
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}


pub fn render_output(view: &OutputView) -> String {
    let mut out = String::new();
    let started = view.started.map(|t| t.to_rfc3339());
    let ended = view.ended.map(|t| t.to_rfc3339());
    let _ = writeln!(out, "Start: {}", started.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "End: {}", ended.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Output:");
    out.push_str(&view.text);
    if !view.text.ends_with('\n') {
        out.push('\n');
    }
    out
}


pub fn render_notification(notification: &Notification) -> String {
    match notification.level {
        Level::Success => format!("ok: {}", notification.message),
        Level::Error => format!("error: {}", notification.message),
    }
}


pub fn render_invalid(fields: &[Field]) -> String {
    fields.iter()
        .map(|field| match field {
            Field::Name => "name is required",
            Field::Owner => "owner is required",
            Field::Command => "command is required",
        })
        .collect::<Vec<_>>()
        .join("\n")
}
