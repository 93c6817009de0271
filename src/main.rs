use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use fintrack::app::{App, AppError};
use fintrack::auth::{AuthError, LoginMethod, Navigator, Route, Toaster, User};
use fintrack::config::{BuildMode, ClientConfig, ConfigError};
use fintrack::net::ApiError;
use fintrack::services::auth::{self as auth_api, Credentials, Registration};
use fintrack::services::ledger::{LedgerKind, LedgerService};

const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "fintrack", about = "Personal finance tracker client")]
struct Cli {
    /// Overrides `FINTRACK_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `FINTRACK_DATA_DIR`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Development build semantics (overrides `FINTRACK_ENV`).
    #[arg(long, default_value_t = false)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    Logout,
    Whoami,
    /// Show stored login state and what session inference concludes.
    Status,
    Ledger(LedgerCommand),
}

#[derive(Args, Debug)]
struct LedgerCommand {
    /// earnings, savings, spending, lending, or borrowing
    kind: LedgerKind,

    #[command(subcommand)]
    command: LedgerSubcommand,
}

#[derive(Subcommand, Debug)]
enum LedgerSubcommand {
    List,
    Get {
        id: String,
    },
    Add {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
    Total,
}

/// Terminal stand-in for the router and toast UI.
struct TerminalShell;

impl Navigator for TerminalShell {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = route.path(), "navigate");
        match route {
            Route::Login => eprintln!("Run `fintrack login` to sign in."),
        }
    }
}

impl Toaster for TerminalShell {
    fn show(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fintrack=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let shell = Arc::new(TerminalShell);
    let app = App::bootstrap(config, shell.clone(), shell).await?;

    match cli.command {
        Command::Login { username, password } => run_login(&app, username, password).await,
        Command::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = Registration { username, email, password, first_name, last_name };
            run_register(&app, registration).await
        }
        Command::Logout => {
            app.auth.logout(Some(LOGGED_OUT_MESSAGE)).await;
            Ok(())
        }
        Command::Whoami => print_json(&json!({ "user": app.auth.user() })),
        Command::Status => run_status(&app),
        Command::Ledger(ledger) => run_ledger(&app, ledger).await,
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if cli.dev {
        config.mode = BuildMode::Development;
    }
    Ok(config)
}

async fn run_login(app: &App, username: String, password: String) -> Result<(), CliError> {
    let credentials = Credentials { username, password };
    let user = auth_api::login(&app.client, &credentials)
        .await?
        .unwrap_or_else(|| User::new(credentials.username.clone()));
    app.auth.login(LoginMethod::Password, Some(user))?;
    print_json(&json!({ "user": app.auth.user() }))
}

async fn run_register(app: &App, registration: Registration) -> Result<(), CliError> {
    auth_api::register(&app.client, &registration).await?;

    let credentials = Credentials { username: registration.username.clone(), password: registration.password.clone() };
    let user = auth_api::login(&app.client, &credentials)
        .await?
        .unwrap_or_else(|| {
            let mut user = User::new(registration.username.clone());
            user.email = Some(registration.email.clone());
            user.first_name.clone_from(&registration.first_name);
            user.last_name.clone_from(&registration.last_name);
            user
        });
    app.auth.login(LoginMethod::Registration, Some(user))?;
    print_json(&json!({ "user": app.auth.user() }))
}

fn run_status(app: &App) -> Result<(), CliError> {
    let evidence = app.inference.evidence();
    print_json(&json!({
        "apiUrl": app.config.api_url,
        "mode": format!("{:?}", app.config.mode).to_lowercase(),
        "loggedIn": app.auth.is_authenticated(),
        "user": app.auth.user().map(|u| u.display_name()),
        "inferredAuthenticated": evidence.is_authenticated(),
        "evidence": format!("{evidence:?}"),
    }))
}

async fn run_ledger(app: &App, ledger: LedgerCommand) -> Result<(), CliError> {
    let service = LedgerService::new(&app.client, ledger.kind);
    let result = match ledger.command {
        LedgerSubcommand::List => Value::Array(service.list().await?),
        LedgerSubcommand::Get { id } => service.get(&id).await?,
        LedgerSubcommand::Add { data } => service.create(serde_json::from_str(&data)?).await?,
        LedgerSubcommand::Update { id, data } => service.update(&id, serde_json::from_str(&data)?).await?,
        LedgerSubcommand::Delete { id } => service.delete(&id).await?,
        LedgerSubcommand::Total => json!({ "ledger": ledger.kind.as_str(), "total": service.total().await? }),
    };
    print_json(&result)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
