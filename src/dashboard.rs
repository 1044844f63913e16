//! Plain-text rendering of each view, fed from the stores' current state.

use std::fmt::Write;

use crate::core::balance::{Category, MAX_BALANCE, average};
use crate::core::goal::Goal;
use crate::core::milestone::{Milestone, progress_percent};
use crate::core::mood::MoodEntry;
use crate::core::note::Note;
use crate::core::priority::format_score;
use crate::core::project::Project;
use crate::core::todo::TodoGroup;

fn check(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn render_milestones(out: &mut String, milestones: &[Milestone]) {
    for m in milestones {
        let _ = writeln!(out, "    {} {}", check(m.completed), m.name);
    }
}

fn render_notes(out: &mut String, indent: &str, notes: &[Note]) {
    for n in notes {
        let _ = writeln!(
            out,
            "{}- {} ({})",
            indent,
            n.text,
            n.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn render_projects(projects: &[Project]) -> String {
    let mut out = String::from("Projects\n");
    if projects.is_empty() {
        out.push_str("  (none)\n");
    }
    for p in projects {
        let _ = writeln!(
            out,
            "  {} [{}] {:.0}%{}",
            p.name,
            p.status,
            progress_percent(&p.milestones),
            if p.image.is_some() { " (image)" } else { "" }
        );
        render_milestones(&mut out, &p.milestones);
        render_notes(&mut out, "    ", &p.notes);
    }
    out
}

pub fn render_goals(goals: &[Goal]) -> String {
    let mut out = String::from("Goals\n");
    if goals.is_empty() {
        out.push_str("  (none)\n");
    }
    for g in goals {
        let _ = writeln!(
            out,
            "  {} due {} [{}] score {} {:.0}%",
            g.name,
            g.deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            g.status,
            format_score(g.score()),
            progress_percent(&g.milestones)
        );
        let p = &g.priority;
        let _ = writeln!(
            out,
            "    importance {} urgency {} effort {} impact {}",
            p.importance, p.urgency, p.effort, p.impact
        );
        render_milestones(&mut out, &g.milestones);
        render_notes(&mut out, "    ", &g.notes);
    }
    out
}

pub fn render_mood(entries: &[MoodEntry]) -> String {
    let mut out = String::from("Mood\n");
    if entries.is_empty() {
        out.push_str("  (none)\n");
    }
    for e in entries {
        let _ = writeln!(
            out,
            "  {} {} {}",
            e.mood.emoji(),
            e.mood.label(),
            e.created_at.format("%Y-%m-%d %H:%M")
        );
        render_notes(&mut out, "    ", &e.notes);
    }
    out
}

pub fn render_balance(categories: &[Category]) -> String {
    let mut out = String::from("Life balance\n");
    for c in categories {
        let filled = usize::from(c.value);
        let _ = writeln!(
            out,
            "  {:<16} {}{} {}/{}",
            c.name,
            "#".repeat(filled),
            ".".repeat(usize::from(MAX_BALANCE).saturating_sub(filled)),
            c.value,
            MAX_BALANCE
        );
    }
    match average(categories) {
        Some(avg) => {
            let _ = writeln!(out, "  average {:.1}", avg);
        }
        None => out.push_str("  (none)\n"),
    }
    out
}

pub fn render_todos(groups: &[TodoGroup]) -> String {
    let mut out = String::from("To-dos\n");
    if groups.is_empty() {
        out.push_str("  (none)\n");
    }
    for g in groups {
        let _ = writeln!(out, "  {} ({}/{})", g.title, g.completed_count(), g.todos.len());
        for t in &g.todos {
            let _ = writeln!(out, "    {} {}", check(t.completed), t.text);
            render_notes(&mut out, "      ", &t.notes);
        }
    }
    out
}
