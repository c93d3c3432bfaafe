//! Teeshop CLI - Terminal front end for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! teeshop products --category Premium --sort price-low-high
//!
//! # Fill the cart and place an order
//! teeshop cart add tshirt-001 --size M --color Black --quantity 2
//! teeshop checkout
//!
//! # Saved products, past orders and reviews
//! teeshop wishlist add tshirt-003
//! teeshop orders
//! teeshop review tshirt-001 --rating 5 --comment "Great fit"
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Browse the catalog (no backend needed)
//! - `cart` - Show and edit the cart kept on this device
//! - `checkout` - Turn the cart into an order
//! - `wishlist` - Show and edit saved products
//! - `orders` - Order history
//! - `review` / `reviews` - Submit and read product reviews
//! - `profile` - Show the profile or change the display name
//!
//! Configuration is read from the environment; see
//! [`teeshop_storefront::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teeshop_core::{PriceRange, ProductId, SortOrder};
use teeshop_storefront::backend::RemoteError;
use teeshop_storefront::config::{ConfigError, StorefrontConfig};
use teeshop_storefront::{StoreError, Storefront};

mod commands;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not create backend client: {0}")]
    Client(#[from] RemoteError),

    #[error("{}", .0.user_message())]
    Store(#[from] StoreError),

    #[error("no product with ID {0}")]
    UnknownProduct(ProductId),

    #[error("{0}")]
    InvalidOption(String),
}

#[derive(Parser)]
#[command(name = "teeshop")]
#[command(author, version, about = "Teeshop storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only featured products
        #[arg(long, group = "rail")]
        featured: bool,

        /// Only best sellers
        #[arg(long, group = "rail")]
        best_sellers: bool,

        /// Only new arrivals
        #[arg(long, group = "rail")]
        new_arrivals: bool,

        /// Category to include (repeatable)
        #[arg(long)]
        category: Vec<String>,

        /// Color to include (repeatable)
        #[arg(long)]
        color: Vec<String>,

        /// Size to include (repeatable)
        #[arg(long)]
        size: Vec<String>,

        /// Price band to include (repeatable)
        #[arg(long, value_enum)]
        price: Vec<PriceBand>,

        /// Sort order (`featured`, `price-low-high`, `price-high-low`, `newest`)
        #[arg(long, default_value = "featured")]
        sort: SortOrder,
    },
    /// Show one product
    Product {
        /// Product ID (e.g. `tshirt-001`)
        id: ProductId,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order for everything in the cart
    Checkout,
    /// Show or edit saved products
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },
    /// List past orders
    Orders,
    /// Review a product
    Review {
        /// Product ID
        id: ProductId,

        /// Stars, 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Show the reviews of a product
    Reviews {
        /// Product ID
        id: ProductId,
    },
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(short, long)]
        size: Option<String>,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        id: ProductId,

        #[arg(short, long, default_value = "")]
        size: String,

        #[arg(short, long, default_value = "")]
        color: String,
    },
    /// Change the quantity of a line (0 or less removes it)
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        #[arg(short, long, default_value = "")]
        size: String,

        #[arg(short, long, default_value = "")]
        color: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add { id: ProductId },
    /// Forget a saved product
    Remove { id: ProductId },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Change the display name
    SetName { name: String },
}

/// Price bands offered by `products --price`.
#[derive(Clone, Copy, ValueEnum)]
enum PriceBand {
    #[value(name = "under-25")]
    Under25,
    #[value(name = "25-50")]
    From25To50,
    #[value(name = "50-100")]
    From50To100,
    #[value(name = "over-100")]
    Over100,
}

impl PriceBand {
    const fn range(self) -> PriceRange {
        let [under_25, from_25, from_50, over_100] = PriceRange::STANDARD;
        match self {
            Self::Under25 => under_25,
            Self::From25To50 => from_25,
            Self::From50To100 => from_50,
            Self::Over100 => over_100,
        }
    }
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Catalog commands work without configuration
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "teeshop_storefront=info,teeshop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        if let CliError::Store(store_error) = &e {
            store_error.report("cli");
        } else {
            tracing::error!("Command failed: {e}");
        }
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Result<StorefrontConfig, ConfigError>) -> Result<(), CliError> {
    let command = match cli.command {
        Commands::Products {
            featured,
            best_sellers,
            new_arrivals,
            category,
            color,
            size,
            price,
            sort,
        } => {
            let rail = if featured {
                Some(commands::catalog::Rail::Featured)
            } else if best_sellers {
                Some(commands::catalog::Rail::BestSellers)
            } else if new_arrivals {
                Some(commands::catalog::Rail::NewArrivals)
            } else {
                None
            };
            let filter = teeshop_core::ProductFilter {
                categories: category,
                colors: color,
                sizes: size,
                price_ranges: price.into_iter().map(PriceBand::range).collect(),
            };
            commands::catalog::products(rail, &filter, sort);
            return Ok(());
        }
        Commands::Product { id } => return commands::catalog::product(&id),
        other => other,
    };

    let storefront = Storefront::from_config(&config?)?;

    match command {
        Commands::Products { .. } | Commands::Product { .. } => {}
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add {
                id,
                quantity,
                size,
                color,
            } => commands::cart::add(
                &storefront,
                &id,
                quantity,
                size.as_deref(),
                color.as_deref(),
            )?,
            CartAction::Remove { id, size, color } => {
                storefront.cart().remove_line(&id, &size, &color);
                commands::cart::show(&storefront);
            }
            CartAction::Set {
                id,
                quantity,
                size,
                color,
            } => {
                storefront.cart().set_quantity(&id, &size, &color, quantity);
                commands::cart::show(&storefront);
            }
            CartAction::Clear => {
                storefront.cart().clear();
                commands::cart::show(&storefront);
            }
        },
        Commands::Checkout => commands::cart::checkout(&storefront).await?,
        Commands::Wishlist { action } => match action.unwrap_or(WishlistAction::Show) {
            WishlistAction::Show => commands::account::wishlist(&storefront).await?,
            WishlistAction::Add { id } => {
                commands::catalog::require(&storefront, &id)?;
                storefront.wishlist().add(&id).await?;
                commands::account::wishlist(&storefront).await?;
            }
            WishlistAction::Remove { id } => {
                storefront.wishlist().remove(&id).await?;
                commands::account::wishlist(&storefront).await?;
            }
        },
        Commands::Orders => commands::account::orders(&storefront).await?,
        Commands::Review {
            id,
            rating,
            comment,
        } => commands::reviews::submit(&storefront, &id, rating, comment.as_deref()).await?,
        Commands::Reviews { id } => commands::reviews::list(&storefront, &id).await?,
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => commands::account::profile(&storefront).await?,
            ProfileAction::SetName { name } => {
                storefront.profiles().update_full_name(&name).await?;
                commands::account::profile(&storefront).await?;
            }
        },
    }
    Ok(())
}
