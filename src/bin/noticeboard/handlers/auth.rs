#![deny(clippy::all, clippy::pedantic)]

use serde_json::json;

use crate::args::LoginArgs;
use crate::client::{CliError, Ctx};
use crate::io::read_password;
use crate::print::print_json;

pub async fn login(ctx: &Ctx, args: LoginArgs) -> Result<(), CliError> {
    let password = read_password(args.password_file, args.password_env)?;
    let user = ctx.auth().login(&args.email, &password).await?;
    print_json(&user)
}

pub fn logout(ctx: &Ctx) -> Result<(), CliError> {
    let was_logged_in = ctx.auth().logout()?;
    print_json(&json!({ "logged_out": was_logged_in }))
}

pub fn whoami(ctx: &Ctx) -> Result<(), CliError> {
    match ctx.auth().whoami() {
        Some(user) => print_json(&user),
        None => Err(CliError::InvalidInput("not logged in".into())),
    }
}

pub async fn health(ctx: &Ctx) -> Result<(), CliError> {
    let status = ctx.auth().health().await?;
    print_json(&status)
}
