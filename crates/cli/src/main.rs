//! ZeeCloths cart CLI - Inspect and edit a locally persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the session cart
//! zee-cart show
//!
//! # Add two medium black tees
//! zee-cart add --id P1 --name "Oversized Tee" --price 100 -s M -c Black -q 2
//!
//! # Set line item 0 to three units (0 or below removes it)
//! zee-cart update 0 3
//!
//! # Work on a signed-in user's cart
//! zee-cart --user 42 show
//!
//! # Submit the cart as an order request
//! zee-cart checkout --address "12 MG Road, Pune" --out order.json
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add a product
//! - `remove` - Remove a line item
//! - `update` - Set a line item's quantity
//! - `clear` - Empty the cart
//! - `checkout` - Write the order request and clear the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeecloths_cart::CheckoutDetails;
use zeecloths_core::{Price, Product, UserId, Variant};

mod commands;
mod config;
mod error;

use commands::Session;
use config::CliConfig;
use error::CliError;

#[derive(Parser)]
#[command(name = "zee-cart")]
#[command(author, version, about = "ZeeCloths cart tools")]
struct Cli {
    /// Directory holding cart records (overrides `ZEECLOTHS_CART_DIR`)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Use this user's cart instead of the session cart (overrides `ZEECLOTHS_USER_ID`)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show {
        /// Print the stored JSON record instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a product to the cart
    Add(AddArgs),
    /// Remove the line item at INDEX
    Remove {
        index: usize,
    },
    /// Set the quantity of the line item at INDEX (0 or below removes it)
    Update {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every line item
    Clear,
    /// Write the order request and clear the cart
    Checkout(CheckoutArgs),
}

#[derive(Args)]
struct AddArgs {
    /// Product ID
    #[arg(long)]
    id: String,

    /// Product name
    #[arg(long)]
    name: String,

    /// Unit price
    #[arg(long)]
    price: Price,

    /// Product image URL
    #[arg(long)]
    image: Option<String>,

    /// Size variant
    #[arg(short, long)]
    size: Option<String>,

    /// Color variant
    #[arg(short, long)]
    color: Option<String>,

    /// Number of units to add
    #[arg(short, long, default_value = "1")]
    quantity: NonZeroU32,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Shipping address for the order
    #[arg(long)]
    address: Option<String>,

    /// Payment method
    #[arg(long, default_value = zeecloths_cart::checkout::DEFAULT_PAYMENT_METHOD)]
    payment_method: String,

    /// Write the order request to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the order request without clearing the cart
    #[arg(long)]
    keep: bool,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
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

fn main() {
    let cli = Cli::parse();

    // Load configuration first so Sentry can be initialized before tracing
    let config = CliConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so command output on stdout stays machine-readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zeecloths_cart=info,zeecloths_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = config
        .map_err(CliError::from)
        .and_then(|config| run(cli, &config));

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // Flush pending Sentry events before exiting
        drop(sentry_guard);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &CliConfig) -> Result<(), CliError> {
    let user_id = cli.user.map(UserId::new).or_else(|| config.user_id.clone());
    let dir = cli.dir.unwrap_or_else(|| config.cart_dir.clone());
    let mut session = Session::open(dir, user_id.as_ref(), config.currency)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Show { json } => commands::cart::show(&session, json, &mut out)?,
        Commands::Add(args) => {
            let mut product = Product::new(args.id, args.name, args.price);
            product.image_url = args.image;
            let variant = Variant {
                size: args.size,
                color: args.color,
            };
            commands::cart::add(&mut session, &product, variant, args.quantity, &mut out)?;
        }
        Commands::Remove { index } => commands::cart::remove(&mut session, index, &mut out)?,
        Commands::Update { index, quantity } => {
            commands::cart::update(&mut session, index, quantity, &mut out)?;
        }
        Commands::Clear => commands::cart::clear(&mut session, &mut out)?,
        Commands::Checkout(args) => {
            let details = CheckoutDetails {
                user_id,
                shipping_address: args.address,
                payment_method: args.payment_method,
            };
            commands::checkout::run(&mut session, details, args.out.as_deref(), args.keep, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["zee-cart", "update", "0", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Update { index: 0, quantity: -1 }));
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let result = Cli::try_parse_from([
            "zee-cart", "add", "--id", "P1", "--name", "Tee", "--price", "100", "-q", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_rejects_negative_price() {
        let result = Cli::try_parse_from([
            "zee-cart", "add", "--id", "P1", "--name", "Tee", "--price", "-5",
        ]);
        assert!(result.is_err());
    }
}
