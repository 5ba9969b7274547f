#![deny(clippy::all, clippy::pedantic)]

use std::io::Write;

use noticeboard::application::board::BoardView;
use noticeboard_api_types::format_date;
use serde::Serialize;

use crate::client::CliError;
use crate::io::to_output_error;

const TITLE_WIDTH: usize = 48;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(to_output_error)?;
    println!("{out}");
    Ok(())
}

/// Compact table used by `posts browse`.
pub fn render_board(view: &BoardView, out: &mut impl Write) -> std::io::Result<()> {
    let mut flags = Vec::new();
    if view.has_prev {
        flags.push("p: prev");
    }
    if view.has_next {
        flags.push("n: next");
    }
    writeln!(out, "-- Page {} [{}] --", view.page, flags.join(", "))?;

    if view.items.is_empty() {
        writeln!(out, "(no posts)")?;
    }
    for post in &view.items {
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            format!("  #{}", post.tags.join(" #"))
        };
        writeln!(
            out,
            "{}  {:<6}  {}  ({}){}",
            format_date(post.created_at.date()),
            post.category.as_str(),
            truncate(&post.title, TITLE_WIDTH),
            post.id,
            tags
        )?;
    }
    out.flush()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
