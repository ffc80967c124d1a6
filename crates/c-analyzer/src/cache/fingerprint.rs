use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content identity of a file at parse time.
///
/// Content-hashed rather than timestamped, so two edits within the same
/// second still invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub len: u64,
    pub sha256: String,
}

impl Fingerprint {
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self {
            len: content.len() as u64,
            sha256: format!("{:x}", hasher.finalize()),
        }
    }
}
