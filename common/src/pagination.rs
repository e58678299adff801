//! Abstractions for page-number pagination.
//!
//! Pages are numbered from `1`. A page is a window of `limit` items starting
//! at `(page - 1) * limit`. Windows past the end of a result set are valid and
//! simply empty.

use std::ops::Range;

/// Arguments selecting a single page of a result set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Number of the requested page, starting from `1`.
    page: u32,

    /// Maximum number of items on a page.
    limit: u32,
}

impl Arguments {
    /// Default number of items on a page.
    pub const DEFAULT_LIMIT: u32 = 12;

    /// Maximum number of items on a page.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates new [`Arguments`].
    ///
    /// [`None`] is returned if `page` is zero, or `limit` is zero or exceeds
    /// [`Arguments::MAX_LIMIT`].
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Option<Self> {
        (page > 0 && (1..=Self::MAX_LIMIT).contains(&limit))
            .then_some(Self { page, limit })
    }

    /// Returns the requested page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the requested page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the range of item indices covered by the requested page.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let limit = self.limit as usize;
        let start = (self.page as usize - 1).saturating_mul(limit);
        start..start.saturating_add(limit)
    }

    /// Splits the requested page over a source which itself is served in
    /// fixed chunks of `size` items (e.g. pages of a remote API).
    ///
    /// Returned [`Chunk`]s are ordered and cover the requested page exactly.
    ///
    /// # Panics
    ///
    /// If `size` is zero.
    #[must_use]
    pub fn chunks(&self, size: usize) -> Vec<Chunk> {
        assert!(size > 0, "chunk size must be positive");

        let Range { start, end } = self.range();
        (start / size..=(end - 1) / size)
            .map(|n| {
                let offset = n * size;
                Chunk {
                    number: u32::try_from(n + 1).unwrap_or(u32::MAX),
                    within: start.max(offset) - offset
                        ..end.min(offset + size) - offset,
                }
            })
            .collect()
    }
}

/// Part of a page which resides in a single source chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    /// Number of the chunk, starting from `1`.
    pub number: u32,

    /// Range of item indices inside the chunk.
    pub within: Range<usize>,
}

/// A page of items along with the totals of the whole result set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// Total number of items in the whole result set.
    pub total_results: u32,

    /// Total number of pages in the whole result set.
    pub total_pages: u32,

    /// Number of this [`Page`].
    pub current_page: u32,

    /// Requested size of a page.
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of the provided `items` selected by the
    /// `args` from a result set of `total_results` items.
    #[must_use]
    pub fn new(args: Arguments, total_results: u32, items: Vec<T>) -> Self {
        Self {
            items,
            total_results,
            total_pages: total_pages(total_results, args.limit),
            current_page: args.page,
            per_page: args.limit,
        }
    }

    /// Indicates whether there is a page after this one.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Indicates whether there is a page before this one.
    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Maps the items of this [`Page`], keeping the totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_results: self.total_results,
            total_pages: self.total_pages,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }
}

/// Calculates the number of pages of `limit` items needed to hold `total`
/// items.
#[must_use]
pub fn total_pages(total: u32, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}
