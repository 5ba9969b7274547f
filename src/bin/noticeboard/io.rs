#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use noticeboard::domain::validation::split_tag_list;
use noticeboard_api_types::{PostListQuery, parse_date};
use time::Date;

use crate::args::ListFilters;
use crate::client::CliError;

const MAX_PAGE_SIZE: u32 = 100;

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::InputFile {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(path) = file {
        read_file(&path)
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(CliError::InvalidInput(
            "either --body or --body-file is required".into(),
        ))
    }
}

pub fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, CliError> {
    match file {
        Some(path) => read_file(&path).map(Some),
        None => Ok(val),
    }
}

/// Password from `--password-file`, else from the environment.
pub fn read_password(file: Option<PathBuf>, env: Option<String>) -> Result<String, CliError> {
    let password = match file {
        Some(path) => read_file(&path)?.trim_end_matches(['\r', '\n']).to_string(),
        None => env.ok_or_else(|| {
            CliError::InvalidInput(
                "password is required (use --password-file or NOTICEBOARD_PASSWORD)".into(),
            )
        })?,
    };
    Ok(password)
}

pub fn parse_date_opt(val: Option<&str>) -> Result<Option<Date>, CliError> {
    val.map(|raw| {
        parse_date(raw)
            .map_err(|e| CliError::InvalidInput(format!("invalid date `{raw}`: {e}")))
    })
    .transpose()
}

pub fn parse_tags_opt(val: Option<&str>) -> Option<Vec<String>> {
    val.map(split_tag_list)
}

/// Build a listing query from command-line filters.
pub fn query_from_filters(
    filters: ListFilters,
    cursor: Option<String>,
    default_limit: u32,
) -> Result<PostListQuery, CliError> {
    let limit = filters.limit.unwrap_or(default_limit);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(CliError::InvalidInput(format!(
            "--limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let from = parse_date_opt(filters.from.as_deref())?;
    let to = parse_date_opt(filters.to.as_deref())?;
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(CliError::InvalidInput(
            "--from must not be after --to".into(),
        ));
    }

    Ok(PostListQuery {
        search: filters
            .search
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        category: filters.category.map(Into::into),
        from,
        to,
        sort: filters.sort.into(),
        order: filters.order.into(),
        cursor: cursor.filter(|value| !value.is_empty()),
        limit,
    })
}

pub fn to_output_error(err: impl std::fmt::Display) -> CliError {
    CliError::Output(err.to_string())
}
