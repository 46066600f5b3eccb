mod checkout;
mod cli;
mod config;
mod render;
mod shop;

use std::io::{self, Write};

use anyhow::Result;
use bakery::{CartStore, CheckoutView, MemoryCartStore};
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use shop::{Flow, ShopSession};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bakery=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Catalog { category, search } => {
            let catalog = settings.catalog()?;
            match search {
                Some(query) => {
                    let results = catalog.search(&query);
                    let entries = results.ordered().filter(|entry| entry.in_category(category));
                    render::catalog_listing(&mut stdout, entries, Some(&results))?;
                }
                None => {
                    writeln!(stdout, "{}", category.title())?;
                    render::catalog_listing(
                        &mut stdout,
                        catalog.filter_by_category(category),
                        None,
                    )?;
                }
            }
        }
        Commands::Show { name } => {
            let catalog = settings.catalog()?;
            let name = name.join(" ");
            match catalog.find_by_name(&name) {
                Some(entry) => render::entry_detail(
                    &mut stdout,
                    &catalog,
                    entry,
                    entry.default_size_index(),
                    1,
                )?,
                None => writeln!(stdout, "No cake named \"{name}\".")?,
            }
        }
        Commands::Shop => {
            let catalog = settings.catalog()?;
            let store = open_store(&settings);
            let mut session = ShopSession::new(&catalog, store.as_ref(), settings.pricing());
            if session.run(io::stdin().lock(), &mut stdout)? == Flow::Checkout {
                info!(items = session.cart().item_count(), "cart handed to checkout");
            }
        }
        Commands::Checkout { form, print_form } => {
            if print_form {
                write!(stdout, "{}", checkout::blank_form()?)?;
                return Ok(());
            }
            let form = form.as_deref().map(checkout::read_form).transpose()?;
            let store = open_store(&settings);
            let view = CheckoutView::load(store.as_ref(), settings.pricing())
                .with_submit_delay(settings.submit_delay());
            checkout::run(&mut stdout, view, store.as_ref(), form, checkout::today()).await?;
        }
        Commands::ConfigPath => {
            let path = Settings::config_path()?;
            if !path.exists() {
                Settings::save_default(&path)?;
            }
            writeln!(stdout, "{}", path.display())?;
        }
    }

    Ok(())
}

/// The configured cart file, or a throwaway in-memory store when no config
/// directory is available.
fn open_store(settings: &Settings) -> Box<dyn CartStore> {
    match settings.cart_store() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "no cart file available, cart will not be saved");
            Box::new(MemoryCartStore::new())
        }
    }
}
