//! PetShop CLI - Command line storefront client.
//!
//! Commands:
//! - `petshop auth` - Store, show or forget credentials
//! - `petshop cart` - Show and edit the cart
//! - `petshop address` - Manage delivery addresses
//! - `petshop shipping-fee` - Quote a shipping fee
//! - `petshop checkout` - Place an order
//! - `petshop config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use petshop_commerce::CommerceError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{AddressArgs, AuthArgs, CartArgs, CheckoutArgs, ConfigArgs, ShippingFeeArgs};

/// Log filter variable.
const LOG_ENV: &str = "PETSHOP_LOG";

/// Filter used by `--verbose` when `PETSHOP_LOG` is unset.
const VERBOSE_FILTER: &str =
    "warn,petshop_cli=debug,petshop_commerce=debug,petshop_auth=debug,petshop_client=debug,petshop_data=debug";

/// PetShop CLI - Shop the PetShop storefront from the terminal
#[derive(Parser)]
#[command(name = "petshop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out, show the signed-in customer
    Auth(AuthArgs),

    /// Show and edit the cart
    Cart(CartArgs),

    /// Manage delivery addresses
    Address(AddressArgs),

    /// Quote the shipping fee for a city or saved address
    ShippingFee(ShippingFeeArgs),

    /// Check out selected cart items
    Checkout(CheckoutArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { "warn" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Auth(args) => commands::auth::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Address(args) => commands::address::run(args, &ctx).await,
        Commands::ShippingFee(args) => commands::shipping::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        if let Some(hint) = e
            .downcast_ref::<CommerceError>()
            .and_then(|ce| output::error_hint(ce.kind()))
        {
            ctx.output.info(hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
