#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use noticeboard::application::posts::PostDraft;
use noticeboard_api_types::PostUpdateRequest;

use crate::args::{CategoryArg, PostsCmd};
use crate::client::{CliError, Ctx};
use crate::handlers::browse;
use crate::io::{parse_tags_opt, query_from_filters, read_opt_value, read_value};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List { filters, cursor } => {
            let query = query_from_filters(filters, cursor, ctx.page_size())?;
            let view = ctx.board(query).refresh().await?;
            print_json(&view)
        }
        PostsCmd::Browse { filters } => {
            let query = query_from_filters(filters, None, ctx.page_size())?;
            browse::run_stdio(&ctx.board(query)).await
        }
        PostsCmd::Get { id } => print_json(&ctx.posts().get(&id).await?),
        PostsCmd::Create {
            title,
            body,
            body_file,
            category,
            tags,
        } => create(ctx, title, body, body_file, category, tags).await,
        PostsCmd::Update {
            id,
            title,
            body,
            body_file,
            category,
            tags,
        } => {
            let patch = PostUpdateRequest {
                title,
                body: read_opt_value(body, body_file)?,
                category: category.map(Into::into),
                tags: parse_tags_opt(tags.as_deref()),
            };
            print_json(&ctx.posts().update(&id, patch).await?)
        }
        PostsCmd::Delete { id } => print_json(&ctx.posts().delete(&id).await?),
    }
}

async fn create(
    ctx: &Ctx,
    title: String,
    body: Option<String>,
    body_file: Option<PathBuf>,
    category: CategoryArg,
    tags: Option<String>,
) -> Result<(), CliError> {
    let draft = PostDraft {
        title,
        body: read_value(body, body_file)?,
        category: category.into(),
        tags: parse_tags_opt(tags.as_deref()).unwrap_or_default(),
    };
    let post = ctx.posts().create(draft).await?;
    print_json(&post)
}
