//! Keygen command - Prints a fresh vault key for `VAULT_KEY`.

use crate::errors::AppResult;
use crate::vault::Vault;

pub fn execute() -> AppResult<()> {
    println!("{}", Vault::generate_key());
    Ok(())
}
