//! Me command - show the signed-in user and balances

use anyhow::{bail, Result};
use colored::Colorize;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let spinner = output::spinner("Loading");
    let result = ctx.auth_service.refresh().await;
    spinner.finish_and_clear();
    result?;

    let Some(user) = ctx.auth_service.user() else {
        bail!("Not signed in. Run `retention login` first");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!("{}", user.name.bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Email", &user.email]);
    table.add_row(vec!["Pending", &format!("{} points", user.formatted_pending_balance())]);
    table.add_row(vec!["Available", &format!("{} points", user.formatted_available_balance())]);
    println!("{}", table);

    Ok(())
}
