//! Interactive pager for `posts browse`.
//!
//! Reads one command per line and redraws the page after every step.

#![deny(clippy::all, clippy::pedantic)]

use std::io::Write;

use noticeboard::application::board::BoardService;
use noticeboard::application::error::AppError;
use noticeboard_api_types::{Category, SortField, SortOrder, parse_date};
use time::Date;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::client::CliError;
use crate::io::to_output_error;
use crate::print::render_board;

const HELP: &str = "commands: n next | p prev | . reload | /TEXT search (/ clears) \
| c CAT|- category | s FIELD ORDER sort | d FROM TO|- dates | r first page | q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Search(Option<String>),
    Category(Option<Category>),
    Sort(SortField, SortOrder),
    Dates(Option<Date>, Option<Date>),
    /// Fetch the current page again.
    Reload,
    /// Back to page 1 with the same filters.
    Reset,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        let text = text.trim();
        return Ok(BrowseCommand::Search(
            (!text.is_empty()).then(|| text.to_string()),
        ));
    }

    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(BrowseCommand::Help);
    };
    let rest: Vec<&str> = parts.collect();

    match (head, rest.as_slice()) {
        ("n", []) => Ok(BrowseCommand::Next),
        ("p", []) => Ok(BrowseCommand::Prev),
        (".", []) => Ok(BrowseCommand::Reload),
        ("r", []) => Ok(BrowseCommand::Reset),
        ("q", []) => Ok(BrowseCommand::Quit),
        ("h" | "?", []) => Ok(BrowseCommand::Help),
        ("c", ["-"]) => Ok(BrowseCommand::Category(None)),
        ("c", [raw]) => raw
            .parse::<Category>()
            .map(|category| BrowseCommand::Category(Some(category)))
            .map_err(|err| err.to_string()),
        ("s", [field, order]) => {
            let field = field.parse::<SortField>().map_err(|err| err.to_string())?;
            let order = order.parse::<SortOrder>().map_err(|err| err.to_string())?;
            Ok(BrowseCommand::Sort(field, order))
        }
        ("d", ["-"]) => Ok(BrowseCommand::Dates(None, None)),
        ("d", [from, to]) => {
            let from = parse_date(from).map_err(|err| format!("invalid date `{from}`: {err}"))?;
            let to = parse_date(to).map_err(|err| format!("invalid date `{to}`: {err}"))?;
            if from > to {
                return Err("start date must not be after end date".into());
            }
            Ok(BrowseCommand::Dates(Some(from), Some(to)))
        }
        _ => Err(format!("unrecognized command `{line}`")),
    }
}

pub async fn run_stdio(board: &BoardService) -> Result<(), CliError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run(board, stdin, &mut stdout).await
}

/// Drive the board from `input` until `q` or end of input.
///
/// Transient failures are reported inline so the session can continue;
/// an expired session ends it.
pub async fn run<R, W>(board: &BoardService, input: R, out: &mut W) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match board.refresh().await {
        Ok(view) => render_board(&view, out).map_err(to_output_error)?,
        Err(err) => report(err, out)?,
    }
    writeln!(out, "{HELP}").map_err(to_output_error)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.map_err(to_output_error)? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}").map_err(to_output_error)?;
                continue;
            }
        };

        let outcome = match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                writeln!(out, "{HELP}").map_err(to_output_error)?;
                continue;
            }
            BrowseCommand::Next => board
                .next_page()
                .await
                .map(|view| view.ok_or("already on the last page")),
            BrowseCommand::Prev => board
                .prev_page()
                .await
                .map(|view| view.ok_or("already on the first page")),
            BrowseCommand::Search(text) => board.search(text.as_deref()).await.map(Ok),
            BrowseCommand::Category(category) => board.filter_category(category).await.map(Ok),
            BrowseCommand::Sort(field, order) => board.sort(field, order).await.map(Ok),
            BrowseCommand::Dates(from, to) => board.date_range(from, to).await.map(Ok),
            BrowseCommand::Reload => board.refresh().await.map(Ok),
            BrowseCommand::Reset => board.reset().await.map(Ok),
        };

        match outcome {
            Ok(Ok(view)) => render_board(&view, out).map_err(to_output_error)?,
            Ok(Err(notice)) => writeln!(out, "{notice}").map_err(to_output_error)?,
            Err(err) => report(err, out)?,
        }
    }
    Ok(())
}

fn report(err: AppError, out: &mut impl Write) -> Result<(), CliError> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    let suffix = if err.is_retryable() {
        " (enter . to retry)"
    } else {
        ""
    };
    writeln!(out, "error: {err}{suffix}").map_err(to_output_error)?;
    Ok(())
}
