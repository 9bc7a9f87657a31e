use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out instance ids. Each rendered light captures one [`Uid`] when it
/// is created and derives every filter/gradient/mask id from it.
#[derive(Debug)]
pub struct UidGenerator {
    prefix: String,
    next: AtomicU64,
}

impl UidGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::seeded(prefix, 0)
    }

    pub fn seeded(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: sanitize(&prefix.into()),
            next: AtomicU64::new(seed),
        }
    }

    pub fn next_uid(&self) -> Uid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Uid(format!("{}{}", self.prefix, n))
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new("gt_")
    }
}

/// Stable id root for one light instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid(String);

impl Uid {
    pub fn new(raw: &str) -> Self {
        Uid(sanitize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{uid}_{suffix}`, the form every def id takes.
    pub fn id(&self, suffix: &str) -> String {
        format!("{}_{}", self.0, suffix)
    }

    pub fn url(&self, suffix: &str) -> String {
        format!("url(#{})", self.id(suffix))
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
