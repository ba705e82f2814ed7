//! Update check.
//!
//! Single pass: fetch the descriptor through the cache (one week, no retry,
//! only descriptors that parse are stored),
//! compare revisions and, for an outdated release build, ask the surface to
//! show the update notice. Every failure ends the check quietly.

use crate::cache::{Cache, ONE_WEEK};
use crate::environment::RuntimeProperties;
use crate::metrics::StartupMetrics;
use crate::models::{BuildRevision, UpdateInfo};
use crate::services::surface::InteractiveSurface;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Cache key of the update descriptor
pub const UPDATE_CACHE_KEY: &str = "update.url";

/// Where the descriptor document comes from
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches descriptors over HTTP with the process user agent and timeouts
#[derive(Debug, Clone)]
pub struct HttpDescriptorSource {
    properties: RuntimeProperties,
}

impl HttpDescriptorSource {
    pub fn new(properties: RuntimeProperties) -> Self {
        Self { properties }
    }
}

impl DescriptorSource for HttpDescriptorSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.properties.user_agent)
            .connect_timeout(self.properties.connect_timeout)
            .timeout(self.properties.read_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let body = client
            .get(url)
            .send()
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?
            .text()
            .context("Failed to read update descriptor")?;

        Ok(body)
    }
}

/// Result of one update check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Notice scheduled for this remote revision
    Notified(u32),
    UpToDate,
    DevelopmentBuild,
    /// Descriptor could not be fetched or parsed
    Unavailable,
}

pub struct UpdateCheck {
    source: Arc<dyn DescriptorSource>,
    cache: Cache,
    url: String,
    revision: BuildRevision,
}

impl UpdateCheck {
    pub fn new(
        source: Arc<dyn DescriptorSource>,
        cache: Cache,
        url: impl Into<String>,
        revision: BuildRevision,
    ) -> Self {
        Self {
            source,
            cache,
            url: url.into(),
            revision,
        }
    }

    pub fn run(
        &self,
        surface: &dyn InteractiveSurface,
        metrics: &StartupMetrics,
    ) -> Result<UpdateOutcome> {
        metrics.record_update_check();

        if !self.revision.is_release() {
            tracing::debug!("Development build, skipping update check");
            return Ok(UpdateOutcome::DevelopmentBuild);
        }

        // Only a descriptor that parses is worth caching for a week
        let fetch = || -> Result<String> {
            let body = self.source.fetch(&self.url)?;
            UpdateInfo::parse(&body)?;
            Ok(body)
        };

        let body = match self.cache.text(UPDATE_CACHE_KEY, ONE_WEEK, 0, fetch) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Update check skipped: {}", e);
                return Ok(UpdateOutcome::Unavailable);
            }
        };

        let info = match UpdateInfo::parse(&body) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!("Update check skipped: {}", e);
                return Ok(UpdateOutcome::Unavailable);
            }
        };

        if !self.revision.is_outdated_by(info.revision) {
            tracing::debug!(
                "Up to date: r{} (latest r{})",
                self.revision.current,
                info.revision
            );
            return Ok(UpdateOutcome::UpToDate);
        }

        tracing::info!("Update available: {} (r{})", info.title, info.revision);
        let latest = info.revision;
        surface.show_update_notice(info)?;
        metrics.record_notification();

        Ok(UpdateOutcome::Notified(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::services::surface::MockInteractiveSurface;
    use anyhow::anyhow;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    const DESCRIPTOR: &str =
        "<update><revision>42</revision><title>reelname 4.9</title></update>";

    fn cache() -> (Cache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (CacheManager::new(root).cache("web-xml"), temp_dir)
    }

    #[test]
    fn test_fetches_when_not_cached() {
        let (cache, _temp_dir) = cache();
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .withf(|url| url.ends_with("example.org/update.xml"))
            .times(1)
            .returning(|_| Ok(DESCRIPTOR.to_string()));

        let mut surface = MockInteractiveSurface::new();
        surface
            .expect_show_update_notice()
            .withf(|info| info.revision == 42)
            .times(1)
            .returning(|_| Ok(()));

        let check = UpdateCheck::new(
            Arc::new(source),
            cache.clone(),
            "https://example.org/update.xml",
            BuildRevision::new(40, 0),
        );
        let metrics = StartupMetrics::new();

        assert_eq!(
            check.run(&surface, &metrics).unwrap(),
            UpdateOutcome::Notified(42)
        );
        assert_eq!(cache.get(UPDATE_CACHE_KEY, ONE_WEEK).as_deref(), Some(DESCRIPTOR));
        assert_eq!(metrics.notifications_scheduled(), 1);
    }

    #[test]
    fn test_malformed_descriptor_is_quiet() {
        let (cache, _temp_dir) = cache();
        cache.put(UPDATE_CACHE_KEY, "<update><title>").unwrap();

        let mut source = MockDescriptorSource::new();
        source.expect_fetch().never();
        let mut surface = MockInteractiveSurface::new();
        surface.expect_show_update_notice().never();

        let check = UpdateCheck::new(Arc::new(source), cache, "unused", BuildRevision::new(40, 0));
        assert_eq!(
            check.run(&surface, &StartupMetrics::new()).unwrap(),
            UpdateOutcome::Unavailable
        );
    }

    #[test]
    fn test_malformed_fetch_is_not_cached() {
        let (cache, _temp_dir) = cache();
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok("<html>captive portal</html>".to_string()));
        let mut surface = MockInteractiveSurface::new();
        surface.expect_show_update_notice().never();

        let check = UpdateCheck::new(
            Arc::new(source),
            cache.clone(),
            "unused",
            BuildRevision::new(40, 0),
        );
        assert_eq!(
            check.run(&surface, &StartupMetrics::new()).unwrap(),
            UpdateOutcome::Unavailable
        );
        assert_eq!(cache.get(UPDATE_CACHE_KEY, ONE_WEEK), None);
    }

    #[test]
    fn test_fetch_error_is_quiet() {
        let (cache, _temp_dir) = cache();
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Err(anyhow!("dns failure")));
        let mut surface = MockInteractiveSurface::new();
        surface.expect_show_update_notice().never();

        let check = UpdateCheck::new(Arc::new(source), cache, "unused", BuildRevision::new(40, 0));
        assert_eq!(
            check.run(&surface, &StartupMetrics::new()).unwrap(),
            UpdateOutcome::Unavailable
        );
    }
}
