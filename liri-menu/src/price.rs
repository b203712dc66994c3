//! Price formatting
//!
//! Amounts render with exactly two decimals and a decimal comma (`7.5` →
//! `"7,50"`). A declared amount of zero means "currently unavailable", not
//! "free": single and glass/bottle amounts of zero render as a blank cell,
//! and any zero in a variant list turns the whole string into `"unavailable"`.
//! A missing price never hides an item; the caller renders a blank cell.

use crate::model::{MenuItemRecord, PriceVariant};
use crate::section::Template;
use tracing::warn;

/// Shown when any variant is marked unavailable
pub const UNAVAILABLE: &str = "unavailable";

/// Shown for a variant-priced item with no variants
pub const NO_VARIANTS: &str = "Price not available";

/// The price fields a template consumes
#[derive(Debug, Clone, PartialEq)]
pub enum PriceShape<'a> {
    Single(Option<f64>),
    GlassBottle {
        glass: Option<f64>,
        bottle: Option<f64>,
    },
    Variants(&'a [PriceVariant]),
}

impl<'a> PriceShape<'a> {
    /// Price fields of `record` as consumed by `template`
    pub fn of(record: &'a MenuItemRecord, template: Template) -> Self {
        match template {
            Template::Wine => PriceShape::GlassBottle {
                glass: record.glass_price,
                bottle: record.bottle_price,
            },
            Template::SpiritVariant => {
                PriceShape::Variants(record.variants.as_deref().unwrap_or(&[]))
            }
            _ => PriceShape::Single(record.price),
        }
    }
}

/// Two decimals with a decimal comma
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount).replace('.', ",")
}

/// Negative and non-finite amounts are dropped with a warning
fn is_valid(amount: f64) -> bool {
    let valid = amount.is_finite() && amount >= 0.0;
    if !valid {
        warn!(amount, "Ignoring invalid price amount");
    }
    valid
}

/// Amount suitable for display, or `None` for absent, zero or invalid values
fn displayable(amount: Option<f64>) -> Option<f64> {
    let amount = amount?;
    if !is_valid(amount) || amount == 0.0 {
        return None;
    }
    Some(amount)
}

/// Display string for a price shape
pub fn format(shape: &PriceShape<'_>) -> String {
    match shape {
        PriceShape::Single(amount) => displayable(*amount).map(format_amount).unwrap_or_default(),
        PriceShape::GlassBottle { glass, bottle } => {
            match (displayable(*glass), displayable(*bottle)) {
                (Some(g), Some(b)) => format!("{} / {}", format_amount(g), format_amount(b)),
                (Some(only), None) | (None, Some(only)) => format_amount(only),
                (None, None) => String::new(),
            }
        }
        PriceShape::Variants(variants) => format_variants(variants),
    }
}

fn format_variants(variants: &[PriceVariant]) -> String {
    let mut amounts: Vec<f64> = variants
        .iter()
        .filter_map(|v| v.price)
        .filter(|p| is_valid(*p))
        .collect();

    if amounts.is_empty() {
        return NO_VARIANTS.to_string();
    }
    if amounts.iter().any(|p| *p == 0.0) {
        return UNAVAILABLE.to_string();
    }

    amounts.sort_by(f64::total_cmp);
    amounts
        .into_iter()
        .map(format_amount)
        .collect::<Vec<_>>()
        .join(" / ")
}
