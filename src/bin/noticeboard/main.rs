//! noticeboard: command-line client for the notice board API.
//! Browsing, post management, admin tools and chart data over one shared session.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use clap::Parser;
use noticeboard::config;
use noticeboard::infra::telemetry;

use args::{Cli, Commands};
use client::{CliError, Ctx};
use handlers::{admin, auth, charts, posts};

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load(cli.config_file.as_deref(), &cli.overrides)?;
    telemetry::init(&settings.logging)?;
    let ctx = Ctx::new(settings)?;
    dispatch(&ctx, cli.command).await
}

pub(crate) async fn dispatch(ctx: &Ctx, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login(args) => auth::login(ctx, args).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Whoami => auth::whoami(ctx),
        Commands::Health => auth::health(ctx).await,
        Commands::Posts(cmd) => posts::handle(ctx, cmd.action).await,
        Commands::Admin(cmd) => admin::handle(ctx, cmd.action).await,
        Commands::Charts(cmd) => charts::handle(ctx, cmd.action).await,
    }
}

fn report_error(err: &CliError) {
    eprintln!("error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}
