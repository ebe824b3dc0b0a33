//! Pagination clamping.

/// Default and maximum page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

/// A clamped page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

impl PageLimits {
    /// Clamp a requested window.
    ///
    /// A `limit` that is unset or outside `(0, max_limit]` becomes
    /// `default_limit`; a negative or unset `offset` becomes 0.
    #[must_use]
    pub fn clamp(&self, limit: Option<i64>, offset: Option<i64>) -> Page {
        let limit = limit
            .and_then(|l| u32::try_from(l).ok())
            .filter(|l| (1..=self.max_limit).contains(l))
            .unwrap_or(self.default_limit);
        let offset = offset.and_then(|o| u64::try_from(o).ok()).unwrap_or(0);
        Page { limit, offset }
    }
}
