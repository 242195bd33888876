use clap::{Parser, Subcommand};

use namecard::cli::{OutputMode, Session};
use namecard::types::RegisterRequest;
use namecard::NamecardError;

#[derive(Parser)]
#[command(name = "namecard", version, about = "Manage digital business cards from the command line")]
struct Cli {
    /// Profile to use (defaults to the config's defaultProfile)
    #[arg(long, global = true, env = "NAMECARD_PROFILE")]
    profile: Option<String>,

    /// Config file to load before the default locations
    #[arg(long, global = true, env = "NAMECARD_CONFIG")]
    config: Option<String>,

    /// JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session for this profile
    Login {
        /// User name, or e-mail with --email
        user: String,

        /// Password
        #[arg(long, short = 'p', env = "NAMECARD_PASSWORD", hide_env_values = true)]
        password: String,

        /// Treat <USER> as an e-mail address
        #[arg(long)]
        email: bool,
    },

    /// Create a new account
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        user_name: String,

        #[arg(long)]
        full_name: String,

        #[arg(long, env = "NAMECARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session and remove stored credentials
    Logout,

    /// Show the logged-in user's profile
    Whoami,

    /// Show local session state without contacting the server
    Status,

    /// List your cards
    Cards,

    /// Manage a single card
    Card {
        #[command(subcommand)]
        action: CardAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CardAction {
    /// Show one of your cards
    Show { id: String },

    /// Create a card from key:value fields
    Create {
        /// Fields such as card_type:Modern job:Engineer social:github|https://github.com/me|gh
        fields: Vec<String>,
    },

    /// Update a card; fields not given keep their values
    Update {
        id: String,
        fields: Vec<String>,
    },

    /// Show a user's public cards
    Public { username: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display merged profiles with source annotations
    Show,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("NAMECARD_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = OutputMode::from_flag(cli.json);

    if let Err(e) = run(cli, mode).await {
        namecard::cli::output::print_error(&e, mode);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<(), NamecardError> {
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => namecard::cli::config_cmd::run_config_show(config, mode),
        },
        Commands::Status => namecard::cli::auth::run_status(&Session::open(config, profile)?, mode),
        Commands::Login {
            user,
            password,
            email,
        } => {
            let session = Session::open(config, profile)?;
            namecard::cli::auth::run_login(&session, &user, &password, email, mode).await
        }
        Commands::Register {
            email,
            user_name,
            full_name,
            password,
        } => {
            let session = Session::open(config, profile)?;
            let request = RegisterRequest {
                email,
                user_name,
                full_name,
                password,
                ..RegisterRequest::default()
            };
            namecard::cli::auth::run_register(&session, request, mode).await
        }
        Commands::Logout => namecard::cli::auth::run_logout(&Session::open(config, profile)?, mode).await,
        Commands::Whoami => namecard::cli::auth::run_whoami(&Session::open(config, profile)?, mode).await,
        Commands::Cards => namecard::cli::card::run_list(&Session::open(config, profile)?, mode).await,
        Commands::Card { action } => {
            let session = Session::open(config, profile)?;
            match action {
                CardAction::Show { id } => namecard::cli::card::run_show(&session, &id, mode).await,
                CardAction::Create { fields } => {
                    namecard::cli::card::run_create(&session, &fields, mode).await
                }
                CardAction::Update { id, fields } => {
                    namecard::cli::card::run_update(&session, &id, &fields, mode).await
                }
                CardAction::Public { username } => {
                    namecard::cli::card::run_public(&session, &username, mode).await
                }
            }
        }
    }
}
