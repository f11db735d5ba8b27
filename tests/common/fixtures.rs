use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use trackerblocker_application::ports::{TdsDownload, TrackerDataSource};
use trackerblocker_domain::DomainError;

pub const FIXTURE_TDS: &str = r#"{
    "trackers": {
        "ads.tracker.test": {
            "domain": "ads.tracker.test",
            "owner": {"name": "Tracker Inc", "displayName": "Tracker"},
            "prevalence": 0.2,
            "default": "block",
            "rules": [{"rule": "ads\\.tracker\\.test\\/collect", "exceptions": {"domains": ["partner.test"]}}]
        },
        "cdn.social.test": {
            "domain": "cdn.social.test",
            "owner": {"name": "Social Ltd"},
            "default": "ignore",
            "rules": [{"rule": "cdn\\.social\\.test\\/pixel\\.js"}]
        }
    },
    "entities": {
        "Tracker Inc": {"domains": ["tracker.test"], "prevalence": 0.2},
        "Social Ltd": {"domains": ["social.test"], "prevalence": 0.1}
    },
    "domains": {"tracker.test": "Tracker Inc", "social.test": "Social Ltd"},
    "cnames": {}
}"#;

/// Serves [`FIXTURE_TDS`] under a fixed ETag and honours `If-None-Match`.
///
/// Every answer takes 200ms so the initial load settles before the
/// download lands.
pub struct StubTdsSource {
    etag: Mutex<Option<String>>,
    calls: AtomicU64,
}

impl StubTdsSource {
    pub fn serving(etag: &str) -> Self {
        Self {
            etag: Mutex::new(Some(etag.to_string())),
            calls: AtomicU64::new(0),
        }
    }

    /// Every request fails, as if offline.
    pub fn offline() -> Self {
        Self {
            etag: Mutex::new(None),
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackerDataSource for StubTdsSource {
    async fn download_latest(&self, etag: Option<&str>) -> Result<TdsDownload, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        let current = self.etag.lock().unwrap().clone();
        match current {
            None => Err(DomainError::Download("offline".to_string())),
            Some(current) if Some(current.as_str()) == etag => Ok(TdsDownload::not_modified()),
            Some(current) => Ok(TdsDownload {
                data: Some(Bytes::from_static(FIXTURE_TDS.as_bytes())),
                etag: Some(current),
            }),
        }
    }
}
