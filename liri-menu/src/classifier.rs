//! Category classification
//!
//! Maps a record's free-text category onto one of a template's canonical
//! buckets. Raw values arrive in inconsistent forms ("Red Wine",
//! "red_wine", "RED-WINE", "Rosé", "bourbon & rye"), so both sides are
//! normalized before comparison:
//!
//! 1. exact match of the normalized forms
//! 2. the most specific substring match: a whole key inside the value, then
//!    a key's significant word, then a short value inside a word; ties go
//!    to the earlier bucket
//! 3. the section's default bucket, if one is configured
//!
//! Anything still unmatched is excluded from output with a diagnostic.
//! Classification never fails the section.

use crate::model::MenuItemRecord;
use crate::section::{Bucket, BucketScheme, CategoryField, SectionConfig};
use tracing::warn;

/// Shortest word that takes part in substring matching
const MIN_MATCH_LEN: usize = 3;

/// Outcome of classifying one raw category value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Exact(&'static Bucket),
    Partial(&'static Bucket),
    Defaulted(&'static Bucket),
    Unmatched,
}

impl Classification {
    pub fn bucket(self) -> Option<&'static Bucket> {
        match self {
            Classification::Exact(b) | Classification::Partial(b) | Classification::Defaulted(b) => {
                Some(b)
            }
            Classification::Unmatched => None,
        }
    }
}

/// Canonical comparison form of a category string
///
/// Lower-cases, folds common Latin diacritics, spells `&` as "and" and
/// collapses every run of separators (space, hyphen, underscore, other
/// punctuation) into a single hyphen.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch == '&' {
            if !out.is_empty() {
                out.push('-');
            }
            out.push_str("and");
            pending_separator = true;
            continue;
        }

        let ch = fold_diacritic(ch);
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    out
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// First token of a normalized key that is not one of the scheme's generic words
fn significant_word<'a>(normalized_key: &'a str, generic_words: &[&str]) -> &'a str {
    normalized_key
        .split('-')
        .find(|token| !token.is_empty() && !generic_words.contains(token))
        .unwrap_or(normalized_key)
}

/// How specifically a raw value matched a bucket; compared by tier, then length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchStrength {
    tier: u8,
    len: usize,
}

/// Substring match of a normalized raw value against one bucket
///
/// The whole key appearing in the value beats its significant word
/// appearing, which beats a short value appearing inside the word.
fn match_strength(normalized: &str, bucket: &Bucket, generic_words: &[&str]) -> Option<MatchStrength> {
    let key = normalize(bucket.key);
    if normalized.contains(key.as_str()) {
        return Some(MatchStrength { tier: 2, len: key.len() });
    }

    let mut word = significant_word(&key, generic_words);
    // Single letters ("g" of g-and-t) would match almost anything
    if word.chars().count() < MIN_MATCH_LEN {
        word = key.as_str();
    }
    if normalized.contains(word) {
        return Some(MatchStrength { tier: 1, len: word.len() });
    }
    if normalized.chars().count() >= MIN_MATCH_LEN && word.contains(normalized) {
        return Some(MatchStrength { tier: 0, len: normalized.len() });
    }
    None
}

/// Classify a raw category value against a bucket table
pub fn classify(
    raw: Option<&str>,
    scheme: &'static BucketScheme,
    default_bucket: Option<&'static Bucket>,
) -> Classification {
    let normalized = raw.map(normalize).unwrap_or_default();

    if !normalized.is_empty() {
        if let Some(bucket) = scheme
            .buckets
            .iter()
            .find(|b| normalize(b.key) == normalized)
        {
            return Classification::Exact(bucket);
        }

        let mut best: Option<(MatchStrength, &'static Bucket)> = None;
        for bucket in scheme.buckets {
            let Some(strength) = match_strength(&normalized, bucket, scheme.generic_words) else {
                continue;
            };
            if best.map_or(true, |(current, _)| strength > current) {
                best = Some((strength, bucket));
            }
        }
        if let Some((_, bucket)) = best {
            return Classification::Partial(bucket);
        }
    }

    match default_bucket {
        Some(bucket) => Classification::Defaulted(bucket),
        None => Classification::Unmatched,
    }
}

/// Raw category value of a record for the given field
pub fn raw_category(record: &MenuItemRecord, field: CategoryField) -> Option<&str> {
    match field {
        CategoryField::Category => record.category.as_deref(),
        CategoryField::SubCategory => record.sub_category.as_deref(),
        CategoryField::BeerType => record.beer_type.as_deref(),
    }
}

/// Items grouped under one bucket, in display order
#[derive(Debug, Clone)]
pub struct BucketGroup {
    pub bucket: &'static Bucket,
    pub records: Vec<MenuItemRecord>,
}

/// Group a section's records into its buckets, in canonical bucket order
///
/// Records keep their source order within a bucket unless the scheme sorts
/// alphabetically, in which case a stable sort on the display title is used.
/// Unclassifiable records are dropped with a warning.
pub fn group_by_bucket(
    records: Vec<MenuItemRecord>,
    section: &SectionConfig,
    language: &str,
) -> Vec<BucketGroup> {
    let Some(scheme) = section.template.bucket_scheme() else {
        return Vec::new();
    };

    let mut groups: Vec<BucketGroup> = scheme
        .buckets
        .iter()
        .map(|bucket| BucketGroup {
            bucket,
            records: Vec::new(),
        })
        .collect();

    for record in records {
        let raw = raw_category(&record, scheme.field);
        match classify(raw, scheme, section.default_bucket) {
            Classification::Unmatched => {
                warn!(
                    section = %section.name,
                    item_id = %record.id,
                    category = ?raw,
                    "Record has an unknown category, excluding it"
                );
            }
            classification => {
                if let Classification::Defaulted(bucket) = classification {
                    warn!(
                        section = %section.name,
                        item_id = %record.id,
                        category = ?raw,
                        bucket = bucket.key,
                        "Record has an unknown category, using default bucket"
                    );
                }
                if let Some(bucket) = classification.bucket() {
                    if let Some(group) = groups.iter_mut().find(|g| g.bucket.key == bucket.key) {
                        group.records.push(record);
                    }
                }
            }
        }
    }

    if scheme.alphabetical {
        for group in &mut groups {
            group.records.sort_by_cached_key(|r| {
                r.display_title(language)
                    .map(str::to_lowercase)
                    .unwrap_or_default()
            });
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Template;
    use serde_json::json;

    fn wine() -> &'static BucketScheme {
        Template::Wine.bucket_scheme().unwrap()
    }

    fn spirits() -> &'static BucketScheme {
        Template::SpiritVariant.bucket_scheme().unwrap()
    }

    #[test]
    fn test_normalize_separators_and_case() {
        assert_eq!(normalize("Red Wine"), "red-wine");
        assert_eq!(normalize("red_wine"), "red-wine");
        assert_eq!(normalize("RED-WINE"), "red-wine");
        assert_eq!(normalize("  red  --  wine "), "red-wine");
    }

    #[test]
    fn test_normalize_ampersand_and_diacritics() {
        assert_eq!(normalize("G&T"), "g-and-t");
        assert_eq!(normalize("bourbon & rye"), "bourbon-and-rye");
        assert_eq!(normalize("Rosé"), "rose");
    }

    #[test]
    fn test_variants_classify_identically() {
        for raw in ["Red Wine", "red_wine", "RED-WINE", "red-wine"] {
            let result = classify(Some(raw), wine(), None);
            assert_eq!(result, Classification::Exact(wine().bucket("red-wine").unwrap()), "{raw}");
        }
    }

    #[test]
    fn test_substring_match_on_significant_word() {
        let result = classify(Some("Rosé"), wine(), None);
        assert_eq!(result, Classification::Partial(wine().bucket("rose-wine").unwrap()));
    }

    #[test]
    fn test_white_wine_with_space() {
        let result = classify(Some("white wine"), wine(), None);
        assert_eq!(result.bucket().map(|b| b.key), Some("white-wine"));
    }

    #[test]
    fn test_spirit_schema_values_map_to_keys() {
        assert_eq!(classify(Some("spiced rum"), spirits(), None).bucket().map(|b| b.key), Some("spiced-rum"));
        assert_eq!(
            classify(Some("bourbon & rye"), spirits(), None).bucket().map(|b| b.key),
            Some("bourbon-rye")
        );
        assert_eq!(
            classify(Some("greek spirits"), spirits(), None).bucket().map(|b| b.key),
            Some("greek-spirits")
        );
    }

    #[test]
    fn test_longer_key_wins_over_generic_one() {
        let result = classify(Some("Spiced Rum Reserve"), spirits(), None);
        assert_eq!(result, Classification::Partial(spirits().bucket("spiced-rum").unwrap()));

        let result = classify(Some("Aged Rum"), spirits(), None);
        assert_eq!(result.bucket().map(|b| b.key), Some("rum"));

        let result = classify(Some("Single Malt Scotch Whiskey"), spirits(), None);
        assert_eq!(result.bucket().map(|b| b.key), Some("scotch-whiskey"));
    }

    #[test]
    fn test_short_raw_value_contained_in_key() {
        let cocktails = Template::CategorizedCocktail.bucket_scheme().unwrap();
        let result = classify(Some("classic"), cocktails, None);
        assert_eq!(result.bucket().map(|b| b.key), Some("classics"));
    }

    #[test]
    fn test_single_letter_word_needs_full_key() {
        let cocktails = Template::CategorizedCocktail.bucket_scheme().unwrap();
        assert_eq!(classify(Some("margaritas"), cocktails, None), Classification::Unmatched);
        assert_eq!(classify(Some("G & T"), cocktails, None).bucket().map(|b| b.key), Some("g-and-t"));
    }

    #[test]
    fn test_unmatched_without_default() {
        assert_eq!(classify(Some("orange wine"), wine(), None), Classification::Unmatched);
        assert_eq!(classify(None, wine(), None), Classification::Unmatched);
        assert_eq!(classify(Some("   "), wine(), None), Classification::Unmatched);
    }

    #[test]
    fn test_unmatched_with_default() {
        let default = wine().bucket("white-wine");
        let result = classify(Some("orange wine"), wine(), default);
        assert_eq!(result, Classification::Defaulted(default.unwrap()));
    }

    #[test]
    fn test_group_drops_unknown_and_keeps_order() {
        let section = SectionConfig::new("wine", "data-liri-wine", "wineItem", Template::Wine);
        let records: Vec<MenuItemRecord> = vec![
            json!({"_id": "1", "title": {"en": "Agiorgitiko"}, "subCategory": "red-wine"}),
            json!({"_id": "2", "title": {"en": "Assyrtiko"}, "subCategory": "white wine"}),
            json!({"_id": "3", "title": {"en": "Mystery"}, "subCategory": "orange"}),
            json!({"_id": "4", "title": {"en": "Xinomavro"}, "subCategory": "Red Wine"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        let groups = group_by_bucket(records, &section, "en");
        let keys: Vec<_> = groups.iter().map(|g| g.bucket.key).collect();
        assert_eq!(keys, vec!["sparkling-wine", "white-wine", "rose-wine", "red-wine"]);

        let red: Vec<_> = groups[3].records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(red, vec!["1", "4"]);
        assert_eq!(groups[1].records.len(), 1);
        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_spirits_sorted_alphabetically_stable() {
        let section = SectionConfig::new("spirits", "data-liri-spirits", "spiritItem", Template::SpiritVariant);
        let records: Vec<MenuItemRecord> = vec![
            json!({"_id": "1", "title": {"en": "Tanqueray"}, "subCategory": "gin"}),
            json!({"_id": "2", "title": {"en": "bombay"}, "subCategory": "gin"}),
            json!({"_id": "3", "title": {"en": "Hendrick's"}, "subCategory": "gin"}),
            json!({"_id": "4", "title": {"en": "Bombay"}, "subCategory": "gin"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        let groups = group_by_bucket(records, &section, "en");
        let gin = groups.iter().find(|g| g.bucket.key == "gin").unwrap();
        let ids: Vec<_> = gin.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "3", "1"]);
    }
}
