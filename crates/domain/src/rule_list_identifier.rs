use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// ETag placeholder used when the tracker data comes from the bundled file.
pub const LOCAL_FILE_ETAG: &str = "local_file";

/// Cache key of a compiled rule list.
///
/// Two identifiers built from the same ETag and the same set of whitelisted
/// domains always produce the same [`value`](Self::value), whatever order the
/// domains were supplied in. The value is the key under which the rule store
/// registers the compiled list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleListIdentifier {
    pub etag: Option<String>,
    /// Sorted, deduplicated whitelist snapshot.
    pub domains: Vec<String>,
}

impl RuleListIdentifier {
    pub fn new<I, S>(etag: Option<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains: BTreeSet<String> = domains.into_iter().map(Into::into).collect();
        Self {
            etag,
            domains: domains.into_iter().collect(),
        }
    }

    /// `<etag or local_file>_<base64 of the sorted domains>`.
    pub fn value(&self) -> String {
        let sorted: BTreeSet<&str> = self.domains.iter().map(String::as_str).collect();
        let joined = sorted.into_iter().collect::<Vec<_>>().join("\n");
        let etag = self.etag.as_deref().unwrap_or(LOCAL_FILE_ETAG);
        format!("{}_{}", etag, STANDARD.encode(joined.as_bytes()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl fmt::Display for RuleListIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}
