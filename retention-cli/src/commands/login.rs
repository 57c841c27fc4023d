//! Login command - print the OAuth entry point

use anyhow::Result;
use colored::Colorize;

use super::get_context;

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let url = ctx.config.login_url()?;

    println!("{}", "Sign in with Google".bold());
    println!();
    println!("  {}", url.as_str().underline());
    println!();
    println!("After signing in, pass the page you land on to {}", "retention auth".cyan());

    Ok(())
}
