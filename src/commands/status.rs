use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::libs::state::Mode;
use crate::msg_print;
use anyhow::Result;
use chrono::{DateTime, Local};
use prettytable::{row, Table};

// Renders a snapshot of the session: identity, published status, derived
// activity mode, the running task's live elapsed time and today's records.
pub async fn cmd() -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    let user = coordinator.session_user()?;
    let machine = coordinator.machine();
    let mode = machine.mode_of(&user.id)?;
    let today = Local::now().format("%Y-%m-%d").to_string();

    msg_print!(Message::StatusHeader(user.fullname.clone()), true);

    let mut table = Table::new();
    table.add_row(row!["User", user.fullname]);
    table.add_row(row!["Role", format!("{:?}", user.role)]);
    table.add_row(row!["Status", format!("{:?}", user.online_status)]);
    table.add_row(row!["Mode", mode.to_string()]);
    table.add_row(row!["Last seen", format_last_seen(user.last_seen)]);

    if let Mode::Working(task_id) = &mode {
        let elapsed = coordinator.current_elapsed(task_id)?;
        table.add_row(row!["Elapsed", format!("{}s", elapsed.num_seconds())]);
    }

    let breaks = machine.breaks().for_date(&user.id, &today)?;
    let break_ms: i64 = breaks.iter().filter_map(|brk| brk.duration_ms).sum();
    table.add_row(row!["Breaks today", format!("{} ({}s)", breaks.len(), break_ms / 1000)]);

    let outages = machine.interruptions().power_logs_for(&user.id, &today)?;
    let outage_ms: i64 = outages.iter().map(|log| log.duration_ms).sum();
    table.add_row(row!["Outages today", format!("{} ({}s)", outages.len(), outage_ms / 1000)]);

    table.printstd();

    let tasks = machine.tasks().for_user_on(&user.id, &today)?;
    if !tasks.is_empty() {
        let now_ms = Local::now().timestamp_millis();
        let mut task_table = Table::new();
        task_table.add_row(row!["Task", "Status", "Elapsed"]);
        for task in tasks {
            task_table.add_row(row![
                task.description,
                format!("{:?}", task.status),
                format!("{}s", task.current_elapsed_ms(now_ms) / 1000),
            ]);
        }
        task_table.printstd();
    }

    Ok(())
}

fn format_last_seen(last_seen: Option<i64>) -> String {
    last_seen
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}
