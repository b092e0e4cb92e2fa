use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt as _, util::SubscriberInitExt};
use unatrack_core::{ClientConfig, CredentialCipher, Credentials, scrape_account};

#[derive(Parser, Debug)]
#[command(
    name = "unatrack",
    about = "Collects course activities and due dates from the UNAERP portal.",
    version
)]
struct Options {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawls one account and prints the result as JSON.
    Scrape {
        /// The student registration number (RA).
        #[arg(long)]
        ra: String,

        /// The portal password.
        #[arg(long, env = "UNAERP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Encrypts a password with the key derived from SECRET_KEY.
    Encrypt { password: String },
    /// Decrypts a stored password token with the key derived from SECRET_KEY.
    Decrypt { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let options = Options::parse();

    match options.command {
        Command::Scrape {
            ra,
            password,
            pretty,
        } => {
            let config = ClientConfig::from_env().context("Failed to read portal configuration")?;
            let result = scrape_account(&config, &Credentials::new(ra, password)).await;

            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");

            if !result.success {
                anyhow::bail!(
                    "Scrape failed: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Command::Encrypt { password } => {
            let cipher = CredentialCipher::from_env()?;
            println!("{}", cipher.encrypt(&password));
        }
        Command::Decrypt { token } => {
            let cipher = CredentialCipher::from_env()?;
            let password = cipher
                .decrypt(&token)
                .context("The token does not match SECRET_KEY")?;
            println!("{password}");
        }
    }

    Ok(())
}

fn setup_tracing() {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry().with(stderr_log).init();
}
