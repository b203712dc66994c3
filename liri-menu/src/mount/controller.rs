//! Mount controller
//!
//! Drives one render cycle over a host page: validates the mount contract,
//! puts every present section into `Loading`, then loads all sections
//! concurrently (cache lookup, fetch on miss, cache put on success) and
//! writes each result into the page as it completes. A failure in one
//! section never reaches its siblings.

use super::{MountHost, MountState};
use crate::cache::CacheStore;
use crate::catalog::{parse_records, CatalogClient, CatalogError, CatalogSource};
use crate::classifier::normalize;
use crate::model::MenuItemRecord;
use crate::render::{render_section, RenderedBucket, RenderedSection};
use crate::section::SectionConfig;
use futures::stream::{FuturesUnordered, StreamExt};
use liri_common::config::TomlConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to one section during a render cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Mount point absent from the page
    Skipped,
    Content { from_cache: bool },
    Empty { from_cache: bool },
    Error(String),
}

/// A page attribute that looks like a section mount with the wrong spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisnamedMount {
    pub section: String,
    pub expected: String,
    pub found: String,
}

/// Result of validating the page against the section table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountValidation {
    /// Names of sections whose mount point is absent
    pub missing: Vec<String>,
    pub misnamed: Vec<MisnamedMount>,
}

/// Summary of one render cycle
#[derive(Debug, Clone, Default)]
pub struct MountReport {
    pub validation: MountValidation,
    /// Per-section outcome, in section table order
    pub sections: Vec<(String, SectionOutcome)>,
}

impl MountReport {
    pub fn outcome(&self, name: &str) -> Option<&SectionOutcome> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn failed(&self) -> usize {
        self.sections
            .iter()
            .filter(|(_, o)| matches!(o, SectionOutcome::Error(_)))
            .count()
    }
}

/// Check that every section's mount point exists on the page
///
/// Missing mount points are reported once each; an attribute that matches
/// a missing mount after case and separator normalization is reported as
/// misnamed. Nothing is corrected.
pub fn validate_mounts<H: MountHost + ?Sized>(host: &H, sections: &[SectionConfig]) -> MountValidation {
    let present = host.mount_attributes();
    let mut validation = MountValidation::default();

    for section in sections {
        if host.contains(&section.mount) {
            continue;
        }
        warn!(
            section = %section.name,
            mount = %section.selector(),
            "Mount point not found, skipping section"
        );
        validation.missing.push(section.name.clone());

        let expected = normalize(&section.mount);
        if let Some(found) = present.iter().find(|a| normalize(a) == expected) {
            warn!(
                section = %section.name,
                expected = %section.mount,
                found = %found,
                "Mount attribute looks misnamed"
            );
            validation.misnamed.push(MisnamedMount {
                section: section.name.clone(),
                expected: section.mount.clone(),
                found: found.clone(),
            });
        }
    }

    validation
}

struct LoadedSection {
    records: Vec<MenuItemRecord>,
    from_cache: bool,
}

/// Loads sections into a host page
#[derive(Clone)]
pub struct MountController {
    source: Arc<dyn CatalogSource>,
    cache: Arc<CacheStore>,
    language: String,
}

impl MountController {
    pub fn new(source: Arc<dyn CatalogSource>, cache: Arc<CacheStore>, language: &str) -> Self {
        Self {
            source,
            cache,
            language: language.to_string(),
        }
    }

    /// HTTP catalog client and cache backend as configured
    pub fn from_config(config: &TomlConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::new(&config.catalog)?;
        let cache = CacheStore::from_config(&config.cache);
        Ok(Self::new(Arc::new(client), Arc::new(cache), &config.language))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Run one render cycle over `sections`
    pub async fn initialize<H: MountHost>(&self, host: &mut H, sections: &[SectionConfig]) -> MountReport {
        let validation = validate_mounts(&*host, sections);
        let active: Vec<&SectionConfig> = sections.iter().filter(|s| host.contains(&s.mount)).collect();

        info!(
            sections = active.len(),
            skipped = validation.missing.len(),
            "Starting render cycle"
        );

        for section in &active {
            self.enter_loading(host, section);
        }

        let mut pending: FuturesUnordered<_> = active
            .iter()
            .map(|&section| async move { (section, self.load_section(section).await) })
            .collect();

        let mut completed = Vec::with_capacity(active.len());
        while let Some((section, result)) = pending.next().await {
            let outcome = self.apply(host, section, result);
            completed.push((section.name.clone(), outcome));
        }

        let outcomes = sections
            .iter()
            .map(|section| {
                let outcome = completed
                    .iter()
                    .position(|(name, _)| *name == section.name)
                    .map(|i| completed.swap_remove(i).1)
                    .unwrap_or(SectionOutcome::Skipped);
                (section.name.clone(), outcome)
            })
            .collect();

        MountReport {
            validation,
            sections: outcomes,
        }
    }

    fn enter_loading<H: MountHost>(&self, host: &mut H, section: &SectionConfig) {
        host.set_state(&section.mount, MountState::loading(&section.name));
        for (attribute, bucket) in existing_buckets(&*host, section) {
            host.set_state(&attribute, MountState::loading(bucket));
        }
    }

    /// Cache lookup, then fetch on miss; the cache is written only after the payload parses
    async fn load_section(&self, section: &SectionConfig) -> Result<LoadedSection, CatalogError> {
        let key = section.cache_key();

        if let Some(payload) = self.cache.get(&key) {
            match parse_records(&payload) {
                Ok(records) => {
                    debug!(section = %section.name, records = records.len(), "Using cached payload");
                    return Ok(LoadedSection {
                        records,
                        from_cache: true,
                    });
                }
                Err(e) => warn!(section = %section.name, error = %e, "Cached payload unusable, refetching"),
            }
        }

        let payload = self.source.fetch(section).await?;
        let records = parse_records(&payload)?;
        self.cache.put(&key, &payload);
        debug!(section = %section.name, records = records.len(), "Fetched section");

        Ok(LoadedSection {
            records,
            from_cache: false,
        })
    }

    fn apply<H: MountHost>(
        &self,
        host: &mut H,
        section: &SectionConfig,
        result: Result<LoadedSection, CatalogError>,
    ) -> SectionOutcome {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(section = %section.name, record_type = %section.record_type, error = %e, "Failed to load section");
                host.set_state(&section.mount, MountState::error(&section.name));
                for (attribute, bucket) in existing_buckets(&*host, section) {
                    host.set_state(&attribute, MountState::error(bucket));
                }
                return SectionOutcome::Error(e.to_string());
            }
        };
        let from_cache = loaded.from_cache;

        match render_section(section, loaded.records, &self.language) {
            RenderedSection::Empty => {
                info!(section = %section.name, "No items to show");
                host.set_state(&section.mount, MountState::empty(&section.name));
                for (attribute, bucket) in existing_buckets(&*host, section) {
                    host.set_state(&attribute, MountState::empty(bucket));
                }
                SectionOutcome::Empty { from_cache }
            }
            RenderedSection::Flat(node) => {
                host.set_state(&section.mount, MountState::Content(node));
                info!(section = %section.name, from_cache, "Rendered section");
                SectionOutcome::Content { from_cache }
            }
            RenderedSection::Bucketed(buckets) => {
                self.apply_buckets(host, section, buckets);
                info!(section = %section.name, from_cache, "Rendered section");
                SectionOutcome::Content { from_cache }
            }
        }
    }

    /// Write each bucket into its own container
    ///
    /// When the page has none of the section's bucket containers, one is
    /// synthesized per non-empty bucket and passes through Loading before
    /// its content. Otherwise missing containers are
    /// skipped with a warning and existing ones show content or empty.
    fn apply_buckets<H: MountHost>(&self, host: &mut H, section: &SectionConfig, buckets: Vec<RenderedBucket>) {
        let synthesize = !buckets
            .iter()
            .any(|b| host.contains(&section.bucket_mount(b.bucket)));

        host.set_state(&section.mount, MountState::Delegated);

        for RenderedBucket { bucket, content } in buckets {
            let attribute = section.bucket_mount(bucket);

            if synthesize {
                if let Some(node) = content {
                    host.synthesize(&section.mount, &attribute, bucket.label);
                    host.set_state(&attribute, MountState::loading(bucket.label));
                    host.set_state(&attribute, MountState::Content(node));
                }
                continue;
            }

            if !host.contains(&attribute) {
                warn!(
                    section = %section.name,
                    bucket = bucket.key,
                    mount = %attribute,
                    "Bucket container not found, skipping bucket"
                );
                continue;
            }

            match content {
                Some(node) => host.set_state(&attribute, MountState::Content(node)),
                None => host.set_state(&attribute, MountState::empty(bucket.label)),
            }
        }
    }
}

/// Bucket containers of `section` already present on the page
fn existing_buckets<H: MountHost + ?Sized>(host: &H, section: &SectionConfig) -> Vec<(String, &'static str)> {
    section
        .template
        .bucket_scheme()
        .map(|scheme| {
            scheme
                .buckets
                .iter()
                .map(|b| (section.bucket_mount(b), b.label))
                .filter(|(attribute, _)| host.contains(attribute))
                .collect()
        })
        .unwrap_or_default()
}
