use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Storefront navigation categories.
///
/// `All` is implicit: every entry belongs to it whether or not it is listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    All,
    New,
    Gluten,
    Best,
    Birthday,
    Anniversary,
    Graduation,
}

impl Category {
    pub fn title(&self) -> &'static str {
        match self {
            Category::All => "Cakes",
            Category::New => "New & Seasonal",
            Category::Gluten => "Gluten-Free",
            Category::Best => "Best Sellers",
            Category::Birthday => "Birthday",
            Category::Anniversary => "Anniversary",
            Category::Graduation => "Graduation",
        }
    }
}
