//! CLI command implementations.

pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod shipping;

use clap::{Args, Subcommand};

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Store an access token issued by the storefront.
    LoginToken {
        /// Customer id the token belongs to.
        #[arg(short, long)]
        user: String,

        /// Access token (prompted for when omitted).
        #[arg(long, env = "PETSHOP_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Refresh token.
        #[arg(long, env = "PETSHOP_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,
    },
    /// Forget stored credentials.
    Logout,
    /// Show who is signed in.
    Whoami,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add a product variant.
    Add {
        /// Product variant id.
        variant: String,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Change the quantity of a line item.
    Update {
        /// Line item id.
        item: String,

        /// New quantity (at least 1).
        quantity: i64,
    },
    /// Remove a line item.
    Remove {
        /// Line item id.
        item: String,
    },
    /// Remove every line item.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the address command.
#[derive(Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub command: AddressCommand,
}

#[derive(Subcommand)]
pub enum AddressCommand {
    /// List saved addresses.
    List,
    /// Save a new address.
    Add(AddressFields),
    /// Replace a saved address.
    Update {
        /// Address id.
        id: String,

        #[command(flatten)]
        fields: AddressFields,
    },
    /// Delete a saved address.
    Delete {
        /// Address id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Address fields.
#[derive(Args)]
pub struct AddressFields {
    /// Recipient name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub street: String,

    #[arg(long, default_value = "")]
    pub ward: String,

    #[arg(long, default_value = "")]
    pub district: String,

    #[arg(long)]
    pub city: String,

    /// Make this the default address.
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the shipping-fee command.
#[derive(Args)]
pub struct ShippingFeeArgs {
    /// Destination city.
    #[arg(long, conflicts_with = "address")]
    pub city: Option<String>,

    /// Number of units to ship.
    #[arg(long, conflicts_with = "items")]
    pub units: Option<u64>,

    /// Saved address id to ship to.
    #[arg(long)]
    pub address: Option<String>,

    /// Cart line items to ship (all when omitted with --address).
    #[arg(long, value_delimiter = ',')]
    pub items: Vec<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Line items to check out.
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    pub items: Vec<String>,

    /// Check out every line item.
    #[arg(long)]
    pub all: bool,

    /// Delivery address id (default address when omitted).
    #[arg(long)]
    pub address: Option<String>,

    /// Payment method: cod or online.
    #[arg(short, long, default_value = "cod")]
    pub payment: String,

    /// Note for the seller.
    #[arg(short, long)]
    pub note: Option<String>,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// API root to write into the file.
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,

        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
