//! Menu sections and their rendering templates
//!
//! A section is developer-authored configuration: which record type to
//! query, where it mounts in the host page, and which template shapes
//! its items. Bucketed templates carry a fixed, ordered category table.

use liri_common::config::{FilterEntry, SectionEntry, TomlConfig};
use liri_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering/field-shape strategy for a section's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    Simple,
    TaggedCocktail,
    CategorizedCocktail,
    Wine,
    Beer,
    SpiritVariant,
}

/// Record field that carries a bucketed template's raw category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Category,
    SubCategory,
    BeerType,
}

/// How a bucket's items are wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketLayout {
    /// `accordion-content` grid with spacers (cocktails, spirits)
    Accordion,
    /// `menu-section-wrapper` grid (wine, beer)
    Grid,
}

/// A canonical sub-category of a bucketed template
#[derive(Debug, PartialEq, Eq)]
pub struct Bucket {
    pub key: &'static str,
    pub label: &'static str,
}

/// Fixed category table of a bucketed template
#[derive(Debug, PartialEq, Eq)]
pub struct BucketScheme {
    pub field: CategoryField,
    pub buckets: &'static [Bucket],
    /// Bucket container attribute is `<mount_prefix><key>`
    pub mount_prefix: &'static str,
    /// Tokens skipped when picking a key's significant word
    pub generic_words: &'static [&'static str],
    /// Sort items alphabetically by title within a bucket
    pub alphabetical: bool,
    pub layout: BucketLayout,
}

impl BucketScheme {
    pub fn bucket(&self, key: &str) -> Option<&'static Bucket> {
        self.buckets.iter().find(|b| b.key == key)
    }
}

const COCKTAIL_BUCKETS: &[Bucket] = &[
    Bucket { key: "classics", label: "Classics" },
    Bucket { key: "g-and-t", label: "G&T" },
    Bucket { key: "spritz", label: "Spritz" },
    Bucket { key: "tropical-touch", label: "Tropical Touch" },
];

const WINE_BUCKETS: &[Bucket] = &[
    Bucket { key: "sparkling-wine", label: "Sparkling Wine" },
    Bucket { key: "white-wine", label: "White Wine" },
    Bucket { key: "rose-wine", label: "Rosé Wine" },
    Bucket { key: "red-wine", label: "Red Wine" },
];

const BEER_BUCKETS: &[Bucket] = &[
    Bucket { key: "local", label: "Greek Microbreweries" },
    Bucket { key: "imported", label: "Imported Beers" },
];

const SPIRIT_BUCKETS: &[Bucket] = &[
    Bucket { key: "vodka", label: "Vodka" },
    Bucket { key: "gin", label: "Gin" },
    Bucket { key: "tequila", label: "Tequila" },
    Bucket { key: "mezcal", label: "Mezcal" },
    Bucket { key: "rum", label: "Rum" },
    Bucket { key: "spiced-rum", label: "Spiced Rum" },
    Bucket { key: "irish-whiskey", label: "Irish Whiskey" },
    Bucket { key: "scotch-whiskey", label: "Scotch Whiskey" },
    Bucket { key: "bourbon-rye", label: "Bourbon & Rye" },
    Bucket { key: "cognac", label: "Cognac" },
    Bucket { key: "liqueur", label: "Liqueur" },
    Bucket { key: "bitters", label: "Bitters" },
    Bucket { key: "greek-spirits", label: "Greek Spirits" },
];

static COCKTAIL_SCHEME: BucketScheme = BucketScheme {
    field: CategoryField::Category,
    buckets: COCKTAIL_BUCKETS,
    mount_prefix: "data-liri-",
    generic_words: &[],
    alphabetical: false,
    layout: BucketLayout::Accordion,
};

static WINE_SCHEME: BucketScheme = BucketScheme {
    field: CategoryField::SubCategory,
    buckets: WINE_BUCKETS,
    mount_prefix: "data-liri-",
    generic_words: &["wine"],
    alphabetical: false,
    layout: BucketLayout::Grid,
};

static BEER_SCHEME: BucketScheme = BucketScheme {
    field: CategoryField::BeerType,
    buckets: BEER_BUCKETS,
    mount_prefix: "data-liri-beer-",
    generic_words: &["beer"],
    alphabetical: false,
    layout: BucketLayout::Grid,
};

static SPIRIT_SCHEME: BucketScheme = BucketScheme {
    field: CategoryField::SubCategory,
    buckets: SPIRIT_BUCKETS,
    mount_prefix: "data-liri-spirit-",
    generic_words: &[],
    alphabetical: true,
    layout: BucketLayout::Accordion,
};

impl Template {
    /// Bucket table, for templates that group items by category
    pub fn bucket_scheme(self) -> Option<&'static BucketScheme> {
        match self {
            Template::Simple | Template::TaggedCocktail => None,
            Template::CategorizedCocktail => Some(&COCKTAIL_SCHEME),
            Template::Wine => Some(&WINE_SCHEME),
            Template::Beer => Some(&BEER_SCHEME),
            Template::SpiritVariant => Some(&SPIRIT_SCHEME),
        }
    }

    /// Fields projected by the catalog query
    pub fn projection(self) -> &'static [&'static str] {
        match self {
            Template::Simple => &["_id", "title", "price"],
            Template::TaggedCocktail => &[
                "_id",
                "title",
                "price",
                "description",
                "cocktailTags[]->{ name }",
                "isNew",
            ],
            Template::CategorizedCocktail => &["_id", "title", "price", "description", "category"],
            Template::Wine => &[
                "_id",
                "title",
                "description",
                "grapeVarieties",
                "subCategory",
                "glassPrice",
                "bottlePrice",
            ],
            Template::Beer => &["_id", "title", "price", "description", "beerType", "size"],
            Template::SpiritVariant => &[
                "_id",
                "title",
                "description",
                "subCategory",
                "variants[] { _key, size, price }",
                "orderRank",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Simple => "simple",
            Template::TaggedCocktail => "tagged-cocktail",
            Template::CategorizedCocktail => "categorized-cocktail",
            Template::Wine => "wine",
            Template::Beer => "beer",
            Template::SpiritVariant => "spirit-variant",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = Error;

    /// Accepts the kebab-case names plus the legacy script names
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "simple" | "standard" => Ok(Template::Simple),
            "tagged-cocktail" | "cocktail" => Ok(Template::TaggedCocktail),
            "categorized-cocktail" | "regularCocktail" => Ok(Template::CategorizedCocktail),
            "wine" => Ok(Template::Wine),
            "beer" => Ok(Template::Beer),
            "spirit-variant" | "spirit" => Ok(Template::SpiritVariant),
            other => Err(Error::Config(format!("unknown template '{}'", other))),
        }
    }
}

/// Boolean field constraint on a section's records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub field: String,
    pub equals: bool,
}

impl FilterPredicate {
    /// GROQ clause appended to the type constraint
    pub fn clause(&self) -> String {
        format!("{} == {}", self.field, self.equals)
    }
}

impl From<&FilterEntry> for FilterPredicate {
    fn from(entry: &FilterEntry) -> Self {
        Self {
            field: entry.field.trim().to_string(),
            equals: entry.equals,
        }
    }
}

/// One logical menu category with its own mount point and template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionConfig {
    pub name: String,
    /// Mount attribute on the host page, e.g. `data-liri-coffee`
    pub mount: String,
    pub record_type: String,
    pub template: Template,
    pub filter: Option<FilterPredicate>,
    pub default_bucket: Option<&'static Bucket>,
}

impl SectionConfig {
    pub fn new(name: &str, mount: &str, record_type: &str, template: Template) -> Self {
        Self {
            name: name.to_string(),
            mount: normalize_mount(mount),
            record_type: record_type.to_string(),
            template,
            filter: None,
            default_bucket: None,
        }
    }

    pub fn with_filter(mut self, field: &str, equals: bool) -> Self {
        self.filter = Some(FilterPredicate {
            field: field.to_string(),
            equals,
        });
        self
    }

    /// Set the fallback bucket for unclassifiable records
    pub fn with_default_bucket(mut self, key: &str) -> Result<Self> {
        let scheme = self.template.bucket_scheme().ok_or_else(|| {
            Error::Config(format!(
                "section '{}' uses template '{}', which has no buckets",
                self.name, self.template
            ))
        })?;
        let bucket = scheme.bucket(key).ok_or_else(|| {
            Error::Config(format!(
                "section '{}': default bucket '{}' is not a {} bucket",
                self.name, key, self.template
            ))
        })?;
        self.default_bucket = Some(bucket);
        Ok(self)
    }

    /// Build from a config-file entry
    pub fn from_entry(entry: &SectionEntry) -> Result<Self> {
        let template: Template = entry.template.parse()?;
        let mut section = SectionConfig::new(&entry.name, &entry.mount, &entry.record_type, template);
        section.filter = entry.filter.as_ref().map(FilterPredicate::from);
        match &entry.default_bucket {
            Some(key) => section.with_default_bucket(key),
            None => Ok(section),
        }
    }

    /// `[data-liri-coffee]` form, for diagnostics
    pub fn selector(&self) -> String {
        format!("[{}]", self.mount)
    }

    /// Container attribute for one of this section's buckets
    pub fn bucket_mount(&self, bucket: &Bucket) -> String {
        let prefix = self
            .template
            .bucket_scheme()
            .map(|s| s.mount_prefix)
            .unwrap_or("data-liri-");
        format!("{}{}", prefix, bucket.key)
    }

    /// Cache key: the record type, plus the filter signature when filtered
    pub fn cache_key(&self) -> String {
        match &self.filter {
            Some(filter) => format!("{}?{}={}", self.record_type, filter.field, filter.equals),
            None => self.record_type.clone(),
        }
    }

    /// Whether `name` designates this section (display name or mount suffix)
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name)
            || self
                .mount
                .strip_prefix("data-liri-")
                .map(|slug| slug.eq_ignore_ascii_case(name))
                .unwrap_or(false)
    }
}

/// Accept either `data-liri-x` or `[data-liri-x]`
fn normalize_mount(mount: &str) -> String {
    mount
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string()
}

/// The restaurant site's section table
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("coffee", "data-liri-coffee", "coffeeItem", Template::Simple),
        SectionConfig::new("tea", "data-liri-tea", "teaItem", Template::Simple),
        SectionConfig::new("soft drinks", "data-liri-softdrinks", "softDrinkItem", Template::Simple),
        SectionConfig::new(
            "sparkling water",
            "data-liri-sparklingwater",
            "sparklingWaterItem",
            Template::Simple,
        ),
        SectionConfig::new("juices", "data-liri-juices", "juiceItem", Template::Simple),
        SectionConfig::new(
            "signature cocktails",
            "data-liri-cocktails",
            "signatureCocktailItem",
            Template::TaggedCocktail,
        ),
        SectionConfig::new(
            "regular cocktails",
            "data-liri-regular-cocktails",
            "regularCocktailItem",
            Template::CategorizedCocktail,
        ),
        SectionConfig::new("wine", "data-liri-wine", "wineItem", Template::Wine),
        SectionConfig::new("beer", "data-liri-beer", "beerItem", Template::Beer),
        SectionConfig::new("spirits", "data-liri-spirits", "spiritItem", Template::SpiritVariant),
    ]
}

/// Sections from the config file, or the built-in table when none are configured
pub fn sections_from_config(config: &TomlConfig) -> Result<Vec<SectionConfig>> {
    match &config.sections {
        Some(entries) => entries.iter().map(SectionConfig::from_entry).collect(),
        None => Ok(default_sections()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_legacy_names() {
        assert_eq!("standard".parse::<Template>().unwrap(), Template::Simple);
        assert_eq!("cocktail".parse::<Template>().unwrap(), Template::TaggedCocktail);
        assert_eq!(
            "regularCocktail".parse::<Template>().unwrap(),
            Template::CategorizedCocktail
        );
        assert_eq!("spirit".parse::<Template>().unwrap(), Template::SpiritVariant);
        assert!("carousel".parse::<Template>().is_err());
    }

    #[test]
    fn test_bucket_mounts_follow_prefix() {
        let sections = default_sections();
        let wine = sections.iter().find(|s| s.name == "wine").unwrap();
        let beer = sections.iter().find(|s| s.name == "beer").unwrap();
        let spirits = sections.iter().find(|s| s.name == "spirits").unwrap();

        assert_eq!(wine.bucket_mount(&WINE_BUCKETS[3]), "data-liri-red-wine");
        assert_eq!(beer.bucket_mount(&BEER_BUCKETS[0]), "data-liri-beer-local");
        assert_eq!(spirits.bucket_mount(&SPIRIT_BUCKETS[8]), "data-liri-spirit-bourbon-rye");
    }

    #[test]
    fn test_wine_bucket_order() {
        let keys: Vec<_> = Template::Wine
            .bucket_scheme()
            .unwrap()
            .buckets
            .iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys, vec!["sparkling-wine", "white-wine", "rose-wine", "red-wine"]);
    }

    #[test]
    fn test_cache_key_carries_filter() {
        let plain = SectionConfig::new("juices", "data-liri-juices", "juiceItem", Template::Simple);
        assert_eq!(plain.cache_key(), "juiceItem");
        let filtered = plain.with_filter("isAlcoholFree", true);
        assert_eq!(filtered.cache_key(), "juiceItem?isAlcoholFree=true");
    }

    #[test]
    fn test_default_bucket_validation() {
        let beer = SectionConfig::new("beer", "data-liri-beer", "beerItem", Template::Beer);
        let ok = beer.clone().with_default_bucket("imported").unwrap();
        assert_eq!(ok.default_bucket.map(|b| b.key), Some("imported"));
        assert!(beer.with_default_bucket("stout").is_err());

        let coffee = SectionConfig::new("coffee", "data-liri-coffee", "coffeeItem", Template::Simple);
        assert!(coffee.with_default_bucket("local").is_err());
    }

    #[test]
    fn test_mount_accepts_selector_form() {
        let section = SectionConfig::new("tea", "[data-liri-tea]", "teaItem", Template::Simple);
        assert_eq!(section.mount, "data-liri-tea");
        assert_eq!(section.selector(), "[data-liri-tea]");
    }

    #[test]
    fn test_matches_name() {
        let section = SectionConfig::new(
            "soft drinks",
            "data-liri-softdrinks",
            "softDrinkItem",
            Template::Simple,
        );
        assert!(section.matches_name("Soft Drinks"));
        assert!(section.matches_name("softdrinks"));
        assert!(!section.matches_name("juices"));
    }

    #[test]
    fn test_from_entry() {
        let entry = SectionEntry {
            name: "beer".to_string(),
            mount: "data-liri-beer".to_string(),
            record_type: "beerItem".to_string(),
            template: "beer".to_string(),
            filter: Some(FilterEntry {
                field: "isAlcoholFree".to_string(),
                equals: false,
            }),
            default_bucket: Some("imported".to_string()),
        };
        let section = SectionConfig::from_entry(&entry).unwrap();
        assert_eq!(section.template, Template::Beer);
        assert_eq!(section.filter.as_ref().unwrap().clause(), "isAlcoholFree == false");
        assert_eq!(section.default_bucket.unwrap().label, "Imported Beers");
    }

    #[test]
    fn test_sections_from_config_default_table() {
        let sections = sections_from_config(&TomlConfig::default()).unwrap();
        assert_eq!(sections.len(), 10);
        assert_eq!(sections[0].name, "coffee");
    }
}
