//! Tokens command - Remember-me token maintenance.

use std::sync::Arc;

use crate::cli::args::{TokensAction, TokensArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};
use crate::vault::Vault;

/// Execute the tokens command
pub async fn execute(args: TokensArgs, config: Config) -> AppResult<()> {
    let vault = Vault::from_base64(config.vault_key())?;
    let db = Arc::new(Database::connect(&config).await?);
    let services = Services::from_connection(db.get_connection(), &config, vault);

    match args.action {
        TokensAction::Purge => {
            let purged = services.auth().purge_expired_tokens().await?;
            println!("purged {} expired remember tokens", purged);
        }
    }

    Ok(())
}
