//! Vitrine CLI - Browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show a product with its variants and price range
//! vitrine product show linen-shirt
//!
//! # Resolve a variant from option choices
//! vitrine product resolve linen-shirt --size M --color White
//!
//! # Add two units of variant 42 to the cart
//! vitrine cart add 42 -q 2
//!
//! # Apply a coupon, then place the order
//! vitrine cart coupon SAVE10
//! vitrine cart checkout --payment card
//! ```
//!
//! # Commands
//!
//! - `product` - Show, list and resolve catalog products
//! - `cart` - Inspect and change the cart, check out
//!
//! Set `VITRINE_LOG_FORMAT=json` for JSON log lines on stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Show a product, its variants and price range
    Show {
        /// Product slug
        slug: String,
    },
    /// List products
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Resolve a variant from option choices
    Resolve {
        /// Product slug
        slug: String,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        measurement: Option<Decimal>,

        #[arg(long)]
        age: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a variant to the cart
    Add {
        /// Variant ID
        variant: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set the quantity of a cart item
    Set {
        /// Cart item ID
        item: String,

        /// New quantity (at least 1)
        quantity: i64,
    },
    /// Remove a cart item
    Remove {
        /// Cart item ID
        item: String,
    },
    /// Apply or remove a coupon
    Coupon {
        /// Coupon code
        #[arg(required_unless_present = "remove", conflicts_with = "remove")]
        code: Option<String>,

        /// Remove the applied coupon
        #[arg(long)]
        remove: bool,
    },
    /// Apply or remove wallet credit
    Wallet {
        /// Remove applied wallet credit
        #[arg(long)]
        remove: bool,
    },
    /// Place the order
    Checkout {
        /// Payment method (e.g. `card`, `cod`)
        #[arg(short, long)]
        payment: String,

        /// Note for the order
        #[arg(short, long)]
        note: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_storefront=info,vitrine_cli=info".into());

    // JSON lines for log shippers, text otherwise
    let is_json = std::env::var("VITRINE_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = result {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Product { action } => match action {
            ProductAction::Show { slug } => commands::product::show(&state, &slug).await?,
            ProductAction::List { page } => commands::product::list(&state, page).await?,
            ProductAction::Resolve {
                slug,
                size,
                color,
                measurement,
                age,
            } => {
                let choices = commands::product::Choices {
                    size,
                    color,
                    measurement,
                    age,
                };
                commands::product::resolve(&state, &slug, choices).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state).await?,
            CartAction::Add { variant, quantity } => {
                commands::cart::add(&state, &variant, quantity).await?;
            }
            CartAction::Set { item, quantity } => {
                commands::cart::set_quantity(&state, &item, quantity).await?;
            }
            CartAction::Remove { item } => commands::cart::remove(&state, &item).await?,
            CartAction::Coupon { code, remove } => {
                commands::cart::coupon(&state, code.as_deref().filter(|_| !remove)).await?;
            }
            CartAction::Wallet { remove } => commands::cart::wallet(&state, remove).await?,
            CartAction::Checkout { payment, note } => {
                commands::cart::checkout(&state, payment, note).await?;
            }
        },
    }
    Ok(())
}
