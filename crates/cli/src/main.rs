//! Mystery Sack CLI - Catalog browsing and scripted checkout.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered
//! ms-cli catalog list -s sack -p 0-500
//!
//! # Show one product
//! ms-cli catalog show 1
//!
//! # Sign in and place an order
//! ms-cli checkout -e user@example.com -P user -i 1 --delivery pickup
//! ```
//!
//! # Commands
//!
//! - `catalog list` - List products with search, category and price filters
//! - `catalog show` - Show a product's details
//! - `checkout` - Run a full checkout session against the in-memory store
//!
//! All commands accept `--catalog <FILE>` to replace the built-in products
//! with a YAML catalog.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mystery_sack_core::ProductId;
use mystery_sack_storefront::StorefrontConfig;
use mystery_sack_storefront::models::{DeliveryMethod, PaymentMethod};

mod commands;

#[derive(Parser)]
#[command(name = "ms-cli")]
#[command(author, version, about = "Mystery Sack storefront CLI")]
struct Cli {
    /// YAML catalog to load instead of the built-in products
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Sign in, fill the cart and place an order
    Checkout {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short = 'P', long)]
        password: String,

        /// Product to add, as `ID` or `ID:Name=Option,...` (repeatable)
        #[arg(short, long = "item", required = true, value_parser = commands::checkout::parse_item)]
        items: Vec<commands::checkout::ItemArg>,

        /// Recipient name (defaults to the profile name)
        #[arg(long)]
        name: Option<String>,

        /// Recipient phone number (defaults to the profile number)
        #[arg(long)]
        phone: Option<String>,

        /// Delivery address (defaults to the profile address)
        #[arg(long)]
        address: Option<String>,

        /// Delivery method (`pickup`, `cod`, `meetup`)
        #[arg(long, default_value = "pickup")]
        delivery: DeliveryMethod,

        /// Payment method (`gcash`, `paymaya`, `unionbank`)
        #[arg(long, default_value = "gcash")]
        payment: PaymentMethod,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Case-insensitive text to find in names and descriptions
        #[arg(short, long)]
        search: Option<String>,

        /// Category ID, or `all`
        #[arg(short, long)]
        category: Option<String>,

        /// Price range (`all`, `0-500`, `500-1000`, `1000-2000`, `2000+`)
        #[arg(short, long)]
        price_range: Option<String>,
    },
    /// Show a product
    Show {
        /// Product ID
        id: ProductId,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.expose_secret(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn main() {
    let cli = Cli::parse();

    // Configuration is loaded first so Sentry can start before tracing
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mystery_sack_storefront=info,ms_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = config
        .map_err(Into::into)
        .and_then(|config| run(cli, &config));

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = commands::catalog::load_database(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                search,
                category,
                price_range,
            } => commands::catalog::list(&db, config, search, category, price_range.as_deref())?,
            CatalogAction::Show { id } => commands::catalog::show(&db, config, id)?,
        },
        Commands::Checkout {
            email,
            password,
            items,
            name,
            phone,
            address,
            delivery,
            payment,
        } => {
            let request = commands::checkout::CheckoutRequest {
                email,
                password: SecretString::from(password),
                items,
                name,
                phone_number: phone,
                address,
                delivery_method: delivery,
                payment_method: payment,
            };
            commands::checkout::run(&mut db, config, request)?;
        }
    }
    Ok(())
}
