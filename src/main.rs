use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use taskio_client::{ApiClient, ClientConfig, ClientError, FileStorage, RequestOptions, SessionState};

const DEFAULT_STORAGE_PATH: &str = ".taskio/session.json";

#[derive(Parser, Debug)]
#[command(name = "taskio", about = "task.io API client")]
struct Cli {
    #[arg(long, env = "TASKIO_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TASKIO_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        email: String,
        #[arg(long, env = "TASKIO_PASSWORD")]
        password: String,
    },
    /// Revoke the refresh cookie and clear the stored session.
    Logout,
    /// Print the identity behind the stored access token.
    Whoami,
    /// Send an authenticated request and print the response body.
    Request {
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long, help = "JSON request body")]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    // clap already read the same env vars; flags win.
    if let Some(base_url) = cli.base_url {
        config.set_base_url(&base_url)?;
    }
    let storage_path = cli
        .storage_path
        .or(config.storage_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

    let storage = Arc::new(FileStorage::open(storage_path)?);
    let mut session = SessionState::hydrate(storage)?;
    let client = ApiClient::for_session(&config, &session)?;

    match cli.command {
        Command::Login { email, password } => {
            let user = client.login(&mut session, &email, &password).await?;
            println!("logged in as {} {} <{}>", user.name, user.surname, user.email);
        }
        Command::Logout => {
            let message = client.logout(&mut session).await?;
            println!("{message}");
        }
        Command::Whoami => {
            let user = client.me(&session).await?;
            println!("{} {} <{}> ({})", user.name, user.surname, user.email, user.user_id);
        }
        Command::Request { path, method, data } => {
            run_request(&client, &mut session, &path, &method, data.as_deref()).await?;
        }
    }
    Ok(())
}

async fn run_request(
    client: &ApiClient,
    session: &mut SessionState,
    path: &str,
    method: &str,
    data: Option<&str>,
) -> Result<(), ClientError> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| ClientError::Config(format!("invalid method '{method}': {e}")))?;
    let mut options = RequestOptions::new(method);
    if let Some(raw) = data {
        let body: Value = serde_json::from_str(raw)?;
        options = options.json(&body)?;
    }

    let response = client.fetch(session, path, options).await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "request returned error status");
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
