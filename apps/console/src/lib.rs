//! # Mehfil Console Library
//!
//! Application shell around the storefront logic: configuration, tracing,
//! the command layer, and the `mehfil` command line.
//!
//! ## Module Organization
//! ```text
//! mehfil_console/
//! ├── lib.rs          ◄─── You are here (CLI parsing & dispatch)
//! ├── config.rs       ◄─── AppConfig: defaults → mehfil.toml → MEHFIL_* env
//! ├── state.rs        ◄─── AppState: repositories + pricing table
//! ├── commands/
//! │   ├── quote.rs         ◄─── Catering quotes
//! │   ├── order.rs         ◄─── Checkout and admin order changes
//! │   ├── subscription.rs  ◄─── Subscription lifecycle and due lists
//! │   └── account.rs       ◄─── Signup, login, admin accounts
//! └── error.rs        ◄─── ApiError + Outcome { success, data, error }
//! ```
//!
//! ## Output
//! Every command prints one `Outcome` as pretty JSON on stdout; logs go to
//! stderr. The process exits non-zero when the outcome is a failure.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mehfil_db::{MemoryStore, RecordStore};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::subscription::SubscriptionFilter;
use config::AppConfig;
use error::{ApiError, Outcome};
use state::AppState;

/// Default tracing directive when neither `RUST_LOG` nor `log_filter` is set.
const DEFAULT_LOG_FILTER: &str = "info,mehfil=debug,sqlx=warn";

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "mehfil")]
#[command(author, version, about = "Cafe Mehfil admin console")]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "MEHFIL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Price a catering request (JSON form; the default form if omitted)
    Quote { file: Option<PathBuf> },
    /// List orders, newest first
    Orders {
        #[arg(long = "user", value_name = "ID")]
        user_id: Option<String>,
    },
    /// Set an order's status (pending, confirmed, preparing, shipped, delivered, cancelled)
    OrderStatus { id: String, status: String },
    /// Set an order's payment status (pending, awaiting_confirmation, confirmed, failed)
    PaymentStatus { id: String, status: String },
    /// List subscriptions
    Subscriptions {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Record a subscription payment now
    ProcessPayment { id: String },
    /// Cancel a subscription
    CancelSubscription {
        id: String,
        /// Free-text reason, kept on the record
        reason: Vec<String>,
    },
    /// List accounts
    Users,
    /// Create the default admin account if none exists
    InitAdmin { password: String },
    /// Print the effective configuration
    Config,
}

/// At most one subscription filter; none lists everything.
#[derive(Debug, Clone, PartialEq, Default, Args)]
#[group(multiple = false)]
pub struct FilterArgs {
    /// Active and due now or earlier
    #[arg(long)]
    pub due: bool,
    /// Active and due within the next week
    #[arg(long)]
    pub upcoming: bool,
    /// Active and past due
    #[arg(long)]
    pub overdue: bool,
    /// One customer's subscriptions
    #[arg(long = "user", value_name = "ID")]
    pub user_id: Option<String>,
}

impl From<FilterArgs> for SubscriptionFilter {
    fn from(args: FilterArgs) -> Self {
        match args {
            FilterArgs { due: true, .. } => SubscriptionFilter::Due,
            FilterArgs { upcoming: true, .. } => SubscriptionFilter::Upcoming,
            FilterArgs { overdue: true, .. } => SubscriptionFilter::Overdue,
            FilterArgs {
                user_id: Some(user_id),
                ..
            } => SubscriptionFilter::User(user_id),
            _ => SubscriptionFilter::All,
        }
    }
}

// =============================================================================
// Startup
// =============================================================================

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mehfil=trace` - Show trace for mehfil crates only
/// - Otherwise the `log_filter` config key, else `info,mehfil=debug,sqlx=warn`
pub fn init_tracing(log_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter.unwrap_or(DEFAULT_LOG_FILTER)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one invocation. Returns whether the printed outcome was a success.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration (defaults → file → environment) ───────────────► │
/// │  2. Initialize logging ───────────────────────────────────────────────► │
/// │  3. Open database (skipped for `quote` and `config`) ─────────────────► │
/// │  4. Run the command, print its Outcome as JSON ───────────────────────► │
/// │  5. Close the database ───────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<bool, ApiError> {
    let config = AppConfig::load(cli.config)?;
    init_tracing(config.log_filter.as_deref());
    info!(order_transitions = %config.order_transitions, "Configuration loaded");

    let outcome = match cli.command {
        Command::Config => {
            println!("{}", config.to_toml()?);
            return Ok(true);
        }
        // Quotes never touch stored records.
        Command::Quote { .. } => {
            let state = AppState::with_store(MemoryStore::new(), &config);
            execute(&state, cli.command).await
        }
        command => {
            let state = AppState::open(&config).await?;
            let outcome = execute(&state, command).await;
            state.repos().store().close().await;
            outcome
        }
    };

    let outcome = Outcome::from(outcome);
    let rendered = serde_json::to_string_pretty(&outcome)
        .map_err(|e| ApiError::internal(format!("Failed to render output: {}", e)))?;
    println!("{}", rendered);

    Ok(outcome.success)
}

/// Runs a command against `state` and returns its data as JSON.
pub async fn execute<S: RecordStore>(
    state: &AppState<S>,
    command: Command,
) -> Result<serde_json::Value, ApiError> {
    use commands::{account, order, quote, subscription};

    match command {
        Command::Quote { file } => {
            let body = match file {
                Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                    ApiError::validation(format!("Cannot read {}: {}", path.display(), e))
                })?,
                None => String::new(),
            };
            to_json(quote::catering_quote_from_json(state, &body)?)
        }
        Command::Orders { user_id } => to_json(order::list_orders(state, user_id.as_deref()).await?),
        Command::OrderStatus { id, status } => {
            to_json(order::update_order_status(state, &id, &status).await?)
        }
        Command::PaymentStatus { id, status } => {
            to_json(order::update_payment_status(state, &id, &status).await?)
        }
        Command::Subscriptions { filter } => {
            let filter = SubscriptionFilter::from(filter);
            to_json(subscription::subscription_table(state, &filter).await?)
        }
        Command::ProcessPayment { id } => {
            to_json(subscription::process_subscription_payment(state, &id).await?)
        }
        Command::CancelSubscription { id, reason } => {
            let reason = (!reason.is_empty()).then(|| reason.join(" "));
            to_json(subscription::cancel_subscription(state, &id, reason).await?)
        }
        Command::Users => to_json(account::list_users(state).await?),
        Command::InitAdmin { password } => {
            to_json(account::ensure_default_admin(state, &password).await?)
        }
        Command::Config => Err(ApiError::internal("not a data command")),
    }
}

fn to_json<T: Serialize>(data: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(data)
        .map_err(|e| ApiError::internal(format!("Failed to render output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("mehfil").chain(line.split_whitespace()))
    }

    #[test]
    fn test_parse_commands() {
        let cli = parse("--config ./mehfil.toml orders --user u-7").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("./mehfil.toml")));
        assert_eq!(
            cli.command,
            Command::Orders {
                user_id: Some("u-7".into())
            }
        );

        let cli = parse("subscriptions --upcoming").unwrap();
        let Command::Subscriptions { filter } = cli.command else {
            panic!("expected the subscriptions command");
        };
        assert_eq!(SubscriptionFilter::from(filter), SubscriptionFilter::Upcoming);

        let cli = parse("subscriptions --user u-3 -c other.toml").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        let Command::Subscriptions { filter } = cli.command else {
            panic!("expected the subscriptions command");
        };
        assert_eq!(SubscriptionFilter::from(filter), SubscriptionFilter::User("u-3".into()));

        let cli = parse("cancel-subscription s-1 moving to Lahore").unwrap();
        assert_eq!(
            cli.command,
            Command::CancelSubscription {
                id: "s-1".into(),
                reason: vec!["moving".into(), "to".into(), "Lahore".into()]
            }
        );

        assert_eq!(parse("quote").unwrap().command, Command::Quote { file: None });
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse("order-status o-1").is_err());
        assert!(parse("refund o-1").is_err());
        assert!(parse("orders --config").is_err());
        assert!(parse("subscriptions --due --overdue").is_err());
    }

    #[tokio::test]
    async fn test_execute_against_memory_store() {
        let state = AppState::with_store(MemoryStore::new(), &AppConfig::default());

        let quote = execute(&state, Command::Quote { file: None }).await.unwrap();
        assert_eq!(quote["total"], 20000);
        assert_eq!(quote["cupsNeeded"], 50);

        let admin = execute(
            &state,
            Command::InitAdmin {
                password: "admin123".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(admin["role"], "admin");
        assert!(admin.get("passwordHash").is_none());

        let err = execute(&state, Command::ProcessPayment { id: "s-404".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let listed = execute(&state, Command::Orders { user_id: None }).await.unwrap();
        assert_eq!(listed, serde_json::json!([]));

        let due = execute(
            &state,
            Command::Subscriptions {
                filter: FilterArgs {
                    due: true,
                    ..FilterArgs::default()
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(due, serde_json::json!([]));
    }
}
