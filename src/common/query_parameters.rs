use std::fmt::{Display, Formatter};

/// Ordering direction for listing operations, rendered directly into the
/// ORDER BY clause of hand-built queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOrder {
    Asc,
    Desc,
}

impl Display for DbOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

/// Page metadata computed for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Compute the page metadata for a listing of `total` records, paged by
    /// `page_size` (1-based `page`). Out-of-range inputs are clamped rather
    /// than rejected.
    #[must_use]
    pub fn new(page: i64, page_size: i64, total: i64) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = total.max(0);
        // `i64::div_ceil` is still unstable (int_roundings); inputs are clamped
        // above to `total >= 0` and `page_size >= 1`, so this idiom is equivalent.
        let total_pages = (total + page_size - 1) / page_size;
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total > 0,
        }
    }

    /// Offset of the first record of the page
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
