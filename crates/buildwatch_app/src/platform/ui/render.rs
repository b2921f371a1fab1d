use std::fmt::Write;

use buildwatch_core::{
    DashboardView, DashboardViewModel, InventoryStatus, NodeState, SaveOutcome, SelectionSource,
    TreeRowView,
};
use chrono::{DateTime, Local};

const INDENT: &str = "    ";

pub(crate) fn render_tree(view: &DashboardViewModel, now: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Builds ({}) ==", now.format("%H:%M:%S"));
    let _ = writeln!(out, "{}", status_line(view));

    if !view.search_term.trim().is_empty() && !view.search_has_matches {
        let _ = writeln!(out, "no builds match \"{}\"", view.search_term.trim());
        return out;
    }
    if !view.search_term.trim().is_empty() {
        let _ = writeln!(out, "search: \"{}\"", view.search_term.trim());
    }

    for row in &view.rows {
        match row {
            TreeRowView::Node {
                depth,
                name,
                state,
                expanded,
                build_count,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "{}{} {} {} ({})",
                    INDENT.repeat(*depth),
                    marker(*state),
                    if *expanded { "v" } else { ">" },
                    name,
                    build_count
                );
            }
            TreeRowView::Build {
                depth,
                id,
                name,
                selected,
                status,
            } => {
                let _ = writeln!(
                    out,
                    "{}{} {} [{}] <{}>",
                    INDENT.repeat(*depth),
                    if *selected { "[x]" } else { "[ ]" },
                    name,
                    id,
                    status
                );
            }
        }
    }
    out
}

pub(crate) fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    if view.columns.is_empty() {
        let _ = writeln!(out, "No builds selected.");
        return out;
    }
    let _ = writeln!(
        out,
        "running {} | success {} | failure {} | unknown {}",
        view.totals.running, view.totals.success, view.totals.failure, view.totals.unknown
    );
    for column in &view.columns {
        let _ = writeln!(out, "## {} ({})", column.title, column.build_count);
        for group in &column.groups {
            let _ = writeln!(out, "{INDENT}{}", group.title);
            for build in &group.builds {
                let _ = writeln!(
                    out,
                    "{INDENT}{INDENT}{:<8} {}",
                    build.display_status().to_string(),
                    build.display_name
                );
            }
        }
    }
    out
}

fn status_line(view: &DashboardViewModel) -> String {
    let inventory = match &view.inventory {
        InventoryStatus::Loading => "loading".to_string(),
        InventoryStatus::Ready => "ready".to_string(),
        InventoryStatus::Degraded { reason } => format!("stale ({reason})"),
    };
    let mut line = format!(
        "inventory: {} | selected {} of {}",
        inventory, view.summary.resolvable, view.summary.total_builds
    );
    if !view.summary.orphaned.is_empty() {
        let _ = write!(line, " (+{} unknown)", view.summary.orphaned.len());
    }
    if let Some(source) = view.selection_source {
        let source = match source {
            SelectionSource::Remote => "server",
            SelectionSource::LocalCache => "local cache",
            SelectionSource::Empty => "none",
            SelectionSource::Unavailable => "nowhere (server unreachable)",
        };
        let _ = write!(line, " | restored from {source}");
    }
    match &view.last_save {
        Some(SaveOutcome::Saved) => line.push_str(" | saved"),
        Some(SaveOutcome::FellBackToCache { reason }) => {
            let _ = write!(line, " | saved locally only ({reason})");
        }
        None => {}
    }
    line
}

fn marker(state: NodeState) -> &'static str {
    match state {
        NodeState::All => "[x]",
        NodeState::Partial => "[-]",
        NodeState::None => "[ ]",
    }
}
