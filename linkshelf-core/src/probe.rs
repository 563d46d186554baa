//! Link accessibility pass.
//!
//! Each link gets one HEAD request. Any HTTP response, whatever its status,
//! marks the link accessible; a transport failure or timeout marks it not
//! accessible. Results are cached with a timestamp and the pass only
//! re-runs once the retention window has elapsed.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::prefs::PreferenceStore;
use crate::tree::LinkTree;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

pub trait LinkProber {
    fn probe(&self, url: &str) -> bool;
}

pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CoreError::HttpClient(err.to_string()))?;
        Ok(Self { client })
    }
}

impl LinkProber for HttpProber {
    fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(response) => {
                debug!(url, status = %response.status(), "probe answered");
                true
            }
            Err(err) => {
                debug!(url, %err, "probe failed");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub checked: usize,
    pub accessible: usize,
}

/// Probes every link in order (a folder's links before its sub-folders)
/// and records the outcome on the link.
pub fn annotate<P: LinkProber + ?Sized>(tree: &mut LinkTree, prober: &P) -> AnnotationSummary {
    let mut summary = AnnotationSummary::default();
    tree.for_each_link_mut(|link| {
        let ok = prober.probe(&link.url);
        link.accessible = Some(ok);
        summary.checked += 1;
        if ok {
            summary.accessible += 1;
        }
    });
    info!(
        checked = summary.checked,
        accessible = summary.accessible,
        "accessibility pass finished"
    );
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSchedule {
    retention_ms: u64,
}

impl CheckSchedule {
    pub fn from_days(days: u32) -> Self {
        Self {
            retention_ms: u64::from(days) * DAY_MS,
        }
    }

    /// Due when there is no previous pass or it is older than the window.
    pub fn is_due(&self, last_check: Option<u64>, now: u64) -> bool {
        match last_check {
            None => true,
            Some(last) => now.saturating_sub(last) > self.retention_ms,
        }
    }
}

impl Default for CheckSchedule {
    fn default() -> Self {
        Self::from_days(30)
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// What to show first and whether to start a probe pass over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub tree: LinkTree,
    pub probe: bool,
}

pub fn plan_startup(
    prefs: &PreferenceStore,
    fetched: LinkTree,
    schedule: &CheckSchedule,
    now: u64,
    enabled: bool,
) -> Startup {
    if !enabled {
        return Startup {
            tree: fetched,
            probe: false,
        };
    }

    let cached = prefs.cached_tree();
    if let Some(cached) = cached {
        if !schedule.is_due(prefs.last_accessibility_check(), now) {
            debug!("accessibility cache is fresh");
            return Startup {
                tree: cached,
                probe: false,
            };
        }
        if fetched.is_empty() {
            debug!("no fresh data; showing stale accessibility cache");
            return Startup {
                tree: cached,
                probe: false,
            };
        }
    }

    let probe = fetched.link_count() > 0;
    Startup {
        tree: fetched,
        probe,
    }
}
