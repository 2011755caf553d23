//! Plain-text rendering of agenda views for the terminal.

use std::fmt::Write as _;

use client_core::{
    import::ImportReport,
    views::{AgendaRow, ItemDetailView, SlideItemList, SpeakerRow},
};
use shared::{domain::SpeakerStatus, protocol::ItemTypeChoice};

const INDENT: &str = "  ";

pub fn agenda_rows(rows: &[AgendaRow], projected: bool) -> String {
    let mut out = String::new();
    for row in rows {
        let title = row.title.as_deref().unwrap_or("(unknown item)");
        let marker = if row.closed { " [closed]" } else { "" };
        let _ = writeln!(
            out,
            "{}{:>4}  {title}{marker}",
            INDENT.repeat(row.depth),
            row.id.0
        );
    }
    if projected {
        out.push_str("(agenda is on the projector)\n");
    }
    out
}

fn speaker_line(row: &SpeakerRow) -> String {
    let status = match row.status {
        SpeakerStatus::Waiting => "waiting",
        SpeakerStatus::Speaking => "speaking",
        SpeakerStatus::Finished => "finished",
    };
    format!("{:>4}  {} ({status})", row.speaker_id.0, row.name)
}

pub fn item_detail(view: &ItemDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", view.item.id.0, view.item.title);
    if let Some(text) = view.item.text.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "{text}");
    }
    if let Some(duration) = &view.item.duration {
        let _ = writeln!(out, "duration: {duration}");
    }
    let tags: Vec<&str> = view.item_tags().iter().map(|t| t.name.as_str()).collect();
    if !tags.is_empty() {
        let _ = writeln!(out, "tags: {}", tags.join(", "));
    }
    let list_state = if view.item.speaker_list_closed {
        "closed"
    } else {
        "open"
    };
    let _ = writeln!(out, "list of speakers ({list_state}):");
    if view.speakers.is_empty() {
        out.push_str(INDENT);
        out.push_str("(empty)\n");
    }
    for row in &view.speakers {
        let _ = writeln!(out, "{INDENT}{}", speaker_line(row));
    }
    out
}

pub fn type_choices(choices: &[ItemTypeChoice]) -> String {
    choices
        .iter()
        .map(|c| format!("{:>4}  {}\n", c.value, c.display_name))
        .collect()
}

pub fn slide_item_list(slide: &SlideItemList) -> String {
    slide
        .titles()
        .into_iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {title}\n", i + 1))
        .collect()
}

pub fn import_report(report: &ImportReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(id) => {
                let _ = writeln!(out, "ok    {:>4}  {}", id.0, outcome.title);
            }
            Err(detail) => {
                let _ = writeln!(out, "fail  {:>4}  {}: {detail}", "-", outcome.title);
            }
        }
    }
    let _ = writeln!(
        out,
        "{} of {} imported",
        report.succeeded(),
        report.outcomes.len()
    );
    out
}
