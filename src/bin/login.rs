//! One-time interactive login for the user (identity) session.
//!
//! Run this once, or again when the session expires. It asks for the phone
//! number, the login code and, when two-step verification is on, the
//! password, then writes the session file that `telerelay` reuses.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use grammers_client::SignInError;
use tracing_subscriber::EnvFilter;

use telerelay::config::Config;
use telerelay::source::telegram::{connect_client, save_session};

fn prompt(message: &str) -> Result<String> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config_path = std::env::var("TELERELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.validate_api_credentials()?;

    let session_file = &config.telegram.session_file;

    println!("=== Telegram user login ===");
    println!("Sign in with your phone number and the code Telegram sends you.");
    println!("This is only needed once, or after the session expires.\n");

    let client = connect_client(&config.telegram).await?;

    if client
        .is_authorized()
        .await
        .context("Failed to check session authorization")?
    {
        println!("Already signed in ({}).", session_file.display());
        return Ok(());
    }

    let phone = prompt("Phone number (international format, e.g. +8210...): ")?;
    let token = client
        .request_login_code(&phone)
        .await
        .context("Failed to request login code")?;
    let code = prompt("Login code: ")?;

    match client.sign_in(&token, &code).await {
        Ok(_) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token.hint().unwrap_or("none").to_string();
            let password = prompt(&format!("Two-step verification password (hint: {}): ", hint))?;
            client
                .check_password(password_token, password.trim())
                .await
                .context("Two-step verification failed")?;
        }
        Err(e) => return Err(e).context("Sign-in failed"),
    }

    save_session(&client, session_file)?;

    println!("\nSigned in. Session saved to {}.", session_file.display());
    println!("You can now run `telerelay scan` or `telerelay monitor`.");
    Ok(())
}
