//! Hash-password command - prints a hash suitable for the users table

use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::user::create_password_hasher;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Plaintext password to hash
    pub password: String,
}

/// Hash the password with the configured scheme and print it
pub async fn run(args: HashArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let hasher = create_password_hasher(config.auth.password_scheme, config.auth.bcrypt_cost)?;

    let hash = tokio::task::spawn_blocking(move || hasher.hash(&args.password)).await??;
    println!("{}", hash);

    Ok(())
}
