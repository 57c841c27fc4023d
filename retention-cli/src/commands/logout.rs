//! Logout command - forget the stored session token

use anyhow::Result;
use retention_core::adapters::token_store::FileTokenStore;
use retention_core::ports::TokenStore;

use super::get_data_dir;
use crate::output;

pub fn run() -> Result<()> {
    let tokens = FileTokenStore::new(&get_data_dir()?);

    if tokens.load()?.is_none() {
        output::info("Not signed in");
        return Ok(());
    }

    tokens.clear()?;
    output::success("Signed out");
    Ok(())
}
