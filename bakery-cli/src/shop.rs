use std::io::{BufRead, Write};

use anyhow::Result;
use bakery::{Cart, CartStore, Catalog, CatalogEntry, Category, PricingPolicy, VariantResolution};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::render;

/// One line typed at the `shop>` prompt.
#[derive(Debug, Parser)]
#[command(name = "shop", no_binary_name = true, disable_help_flag = true)]
struct ShopLine {
    #[command(subcommand)]
    command: ShopCommand,
}

#[derive(Debug, Subcommand)]
enum ShopCommand {
    /// List cakes, optionally in one category
    List {
        #[arg(default_value = "all")]
        category: Category,
    },
    /// List cakes with matches first
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Open a cake by name or list number
    Open {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Pick a size of the open cake
    Size { number: usize },
    /// Set the quantity for the open cake
    Qty { quantity: u32 },
    /// Add the open cake to the cart
    Add,
    /// Add one of a cake at its default size
    Quick {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Increase a cart line by one
    Inc { line: usize },
    /// Decrease a cart line by one, removing it at zero
    Dec { line: usize },
    /// Empty the cart
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Show the cart and totals
    Cart,
    /// Save the cart and leave for checkout
    Checkout,
    /// Leave without checking out
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    Checkout,
}

/// The cake currently opened, with the size and quantity picked so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenEntry {
    name: String,
    size_index: usize,
    quantity: u32,
}

pub struct ShopSession<'a> {
    catalog: &'a Catalog,
    store: &'a dyn CartStore,
    pricing: PricingPolicy,
    cart: Cart,
    open: Option<OpenEntry>,
}

impl<'a> ShopSession<'a> {
    pub fn new(catalog: &'a Catalog, store: &'a dyn CartStore, pricing: PricingPolicy) -> Self {
        Self {
            catalog,
            store,
            pricing,
            cart: Cart::restore(store),
            open: None,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn run(&mut self, mut input: impl BufRead, out: &mut impl Write) -> Result<Flow> {
        writeln!(
            out,
            "{} cakes in the catalog, {} item(s) in your cart. Type `help` for commands.",
            self.catalog.len(),
            self.cart.item_count()
        )?;

        let mut line = String::new();
        loop {
            write!(out, "shop> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(Flow::Quit);
            }
            let flow = self.handle_line(&line, out)?;
            if flow != Flow::Continue {
                return Ok(flow);
            }
        }
    }

    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let Some(words) = shlex::split(line) else {
            writeln!(out, "Unbalanced quotes.")?;
            return Ok(Flow::Continue);
        };
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        let command = match ShopLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };

        self.dispatch(command, out)
    }

    fn dispatch(&mut self, command: ShopCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            ShopCommand::List { category } => {
                writeln!(out, "{}", category.title())?;
                render::catalog_listing(out, self.catalog.filter_by_category(category), None)?;
            }
            ShopCommand::Search { query } => {
                let results = self.catalog.search(&query.join(" "));
                render::catalog_listing(out, results.ordered(), Some(&results))?;
            }
            ShopCommand::Open { name } => match self.lookup(&name.join(" ")) {
                Some(entry) => {
                    self.open = Some(OpenEntry {
                        name: entry.name.clone(),
                        size_index: entry.default_size_index(),
                        quantity: 1,
                    });
                    self.show_open(out)?;
                }
                None => writeln!(out, "No cake named \"{}\".", name.join(" "))?,
            },
            ShopCommand::Size { number } => self.pick_size(number, out)?,
            ShopCommand::Qty { quantity } => match self.open.as_mut() {
                Some(open) => {
                    open.quantity = quantity.max(1);
                    self.show_open(out)?;
                }
                None => writeln!(out, "Open a cake first.")?,
            },
            ShopCommand::Add => self.add_open(out)?,
            ShopCommand::Quick { name } => match self.lookup(&name.join(" ")) {
                Some(entry) => {
                    let name = entry.name.clone();
                    self.cart.quick_add(self.catalog, &name);
                    writeln!(out, "Added {name}. Cart: {} item(s).", self.cart.item_count())?;
                }
                None => writeln!(out, "No cake named \"{}\".", name.join(" "))?,
            },
            ShopCommand::Inc { line } => {
                if let Some(index) = line.checked_sub(1) {
                    self.cart.increment_item(index);
                }
                self.show_cart(out)?;
            }
            ShopCommand::Dec { line } => {
                if let Some(index) = line.checked_sub(1) {
                    self.cart.decrement_item(index);
                }
                self.show_cart(out)?;
            }
            ShopCommand::Clear { yes } => {
                if self.cart.is_empty() {
                    writeln!(out, "Your cart is already empty.")?;
                } else if yes {
                    self.cart.remove_all();
                    writeln!(out, "Cart cleared.")?;
                } else {
                    writeln!(
                        out,
                        "Remove all {} item(s)? Run `clear --yes` to confirm.",
                        self.cart.item_count()
                    )?;
                }
            }
            ShopCommand::Cart => self.show_cart(out)?,
            ShopCommand::Checkout => {
                self.save();
                writeln!(out, "Cart saved. Run `bakery checkout` to place your order.")?;
                return Ok(Flow::Checkout);
            }
            ShopCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Exact name, or a 1-based position in the full catalog listing.
    fn lookup(&self, name: &str) -> Option<&'a CatalogEntry> {
        let catalog = self.catalog;
        catalog.find_by_name(name).or_else(|| {
            name.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| catalog.entries().get(index))
        })
    }

    fn open_entry(&self) -> Option<(&'a CatalogEntry, &OpenEntry)> {
        let catalog = self.catalog;
        let open = self.open.as_ref()?;
        let entry = catalog.find_by_name(&open.name)?;
        Some((entry, open))
    }

    fn show_open(&self, out: &mut impl Write) -> Result<()> {
        if let Some((entry, open)) = self.open_entry() {
            render::entry_detail(out, self.catalog, entry, open.size_index, open.quantity)?;
        }
        Ok(())
    }

    fn pick_size(&mut self, number: usize, out: &mut impl Write) -> Result<()> {
        let Some((entry, _)) = self.open_entry() else {
            writeln!(out, "Open a cake first.")?;
            return Ok(());
        };

        let resolution = match number.checked_sub(1) {
            Some(index) => self.catalog.resolve_variant(entry, index),
            None => VariantResolution::Inert,
        };
        match resolution {
            VariantResolution::Selected { index, .. } => {
                if let Some(open) = self.open.as_mut() {
                    open.size_index = index;
                }
            }
            VariantResolution::Navigate { target } => {
                writeln!(out, "Switching to {}.", target.name)?;
                self.open = Some(OpenEntry {
                    name: target.name.clone(),
                    size_index: target.default_size_index(),
                    quantity: 1,
                });
            }
            VariantResolution::Inert => {
                writeln!(out, "That size is not available.")?;
                return Ok(());
            }
        }
        self.show_open(out)
    }

    fn add_open(&mut self, out: &mut impl Write) -> Result<()> {
        let Some((entry, open)) = self.open_entry() else {
            writeln!(out, "Open a cake first.")?;
            return Ok(());
        };

        let (size_index, quantity) = (open.size_index, open.quantity);
        let before = self.cart.item_count();
        self.cart.add_item(entry, size_index, quantity);
        if self.cart.item_count() == before {
            writeln!(out, "That size is not available.")?;
            return Ok(());
        }
        self.open = None;

        writeln!(out, "Added {} x {}.", quantity, entry.name)?;
        self.show_cart(out)
    }

    fn show_cart(&self, out: &mut impl Write) -> Result<()> {
        render::cart_items(out, self.cart.items())?;
        if !self.cart.is_empty() {
            render::totals(out, &self.cart.compute_totals(&self.pricing))?;
        }
        Ok(())
    }

    /// The cart is handed to checkout only here; browsing never writes it.
    fn save(&self) {
        if let Err(e) = self.cart.persist(self.store) {
            warn!(error = %e, "cart not saved, continuing without persistence");
        }
    }
}
