#![deny(clippy::all, clippy::pedantic)]

use crate::args::ChartsCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: ChartsCmd) -> Result<(), CliError> {
    let charts = ctx.charts();
    match cmd {
        ChartsCmd::TopBrands => print_json(&charts.top_brands().await?),
        ChartsCmd::MoodTrend => print_json(&charts.mood_trend().await?),
        ChartsCmd::Coffee => print_json(&charts.coffee_consumption().await?),
    }
}
