use md5::{Digest, Md5};
use pagewatch_core::{Fingerprint, FINGERPRINT_LEN};

use crate::extract::{normalize, Region};
use crate::PageSnapshot;

/// Result of fingerprinting one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDigest {
    Fingerprint {
        fingerprint: Fingerprint,
        region: Region,
    },
    /// Nothing was fetched, or the page had no content.
    Empty,
}

impl ContentDigest {
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            ContentDigest::Fingerprint { fingerprint, .. } => Some(*fingerprint),
            ContentDigest::Empty => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContentFingerprinter;

impl ContentFingerprinter {
    pub fn fingerprint(&self, snapshot: Option<&PageSnapshot>) -> ContentDigest {
        let Some(snapshot) = snapshot else {
            return ContentDigest::Empty;
        };
        if snapshot.text.trim().is_empty() {
            return ContentDigest::Empty;
        }
        let normalized = normalize(&snapshot.text);
        ContentDigest::Fingerprint {
            fingerprint: digest_text(&normalized.text),
            region: normalized.region,
        }
    }
}

/// MD5 of the UTF-8 bytes. Change detection only; not an integrity check.
pub fn digest_text(text: &str) -> Fingerprint {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; FINGERPRINT_LEN];
    bytes.copy_from_slice(&digest);
    Fingerprint::from_bytes(bytes)
}
