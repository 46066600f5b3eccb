use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use bakery::{Catalog, FileCartStore, Money, PricingPolicy, DEFAULT_SUBMIT_DELAY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub pricing: PricingSettings,
    pub checkout: CheckoutSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    pub tax_rate: Decimal,
    pub delivery_fee: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Simulated payment processing time.
    pub submit_delay_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Where the cart is kept between `shop` and `checkout`. Defaults to the
    /// config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// A TOML catalog to use instead of the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let pricing = PricingPolicy::default();
        Self {
            pricing: PricingSettings {
                tax_rate: pricing.tax_rate,
                delivery_fee: pricing.delivery_fee,
            },
            checkout: CheckoutSettings {
                submit_delay_ms: DEFAULT_SUBMIT_DELAY.as_millis() as u64,
            },
            store: StoreSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl Settings {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("bakery"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Defaults, then `config.toml` in the config directory, then `BAKERY_*`
    /// environment variables.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("pricing.tax_rate", defaults.pricing.tax_rate.to_string())?
            .set_default(
                "pricing.delivery_fee",
                defaults.pricing.delivery_fee.amount().to_string(),
            )?
            .set_default(
                "checkout.submit_delay_ms",
                defaults.checkout.submit_delay_ms as i64,
            )?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("BAKERY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config at {}", path.display()))?;

        settings
            .try_deserialize::<Self>()
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Write the default config, creating parent directories as needed.
    pub fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    pub fn pricing(&self) -> PricingPolicy {
        PricingPolicy {
            tax_rate: self.pricing.tax_rate,
            delivery_fee: self.pricing.delivery_fee,
        }
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.checkout.submit_delay_ms)
    }

    pub fn cart_path(&self) -> Result<PathBuf> {
        match &self.store.cart_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("cart.json")),
        }
    }

    pub fn cart_store(&self) -> Result<FileCartStore> {
        Ok(FileCartStore::new(self.cart_path()?))
    }

    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog.path {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("Failed to load catalog at {}", path.display())),
            None => Catalog::bakery().context("Built-in catalog is invalid"),
        }
    }
}
