//! Board rendering for the terminal.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use trellis_kanban::types::TaskStatus;
use trellis_kanban::Board;

/// Render the board as a table, column by column in display order.
pub fn board_table(board: &Board) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Column", "#", "Task", "Assignee", "Due", "Id"]);

    for status in TaskStatus::ALL {
        for (index, task) in board.column(status).iter().enumerate() {
            table.add_row(vec![
                status.label().to_string(),
                index.to_string(),
                task.task.name.clone(),
                task.assignee.name.clone(),
                task.task.due_date.format("%Y-%m-%d").to_string(),
                task.task.id.to_string(),
            ]);
        }
    }

    table
}

/// One-line column counts, e.g. `Backlog 2 · Todo 1 · ...`
pub fn column_summary(board: &Board) -> String {
    TaskStatus::ALL
        .iter()
        .map(|status| format!("{} {}", status.label(), board.column(*status).len()))
        .collect::<Vec<_>>()
        .join(" · ")
}
