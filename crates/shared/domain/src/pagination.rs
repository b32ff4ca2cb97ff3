//! Page window arithmetic and paged results.

use serde::{Deserialize, Serialize};

use crate::policy::RequestContext;

/// Parse a requested page. Only a positive run of ASCII digits is a page;
/// everything else is page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    match raw {
        Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<u64>().ok().filter(|p| *p > 0).unwrap_or(1)
        }
        _ => 1,
    }
}

/// `max(1, ceil(total / page_size))`
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// The slice of rows one page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

impl PageWindow {
    /// Clamp the requested page against the counted rows. A missing count
    /// is treated as zero rows. Out-of-range pages resolve to page 1.
    pub fn resolve(total: Option<u64>, requested_page: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let total_results = total.unwrap_or(0);
        let total_pages = total_pages(total_results, page_size);
        let page = if (1..=total_pages).contains(&requested_page) {
            requested_page
        } else {
            1
        };

        Self {
            page,
            page_size,
            total_pages,
            total_results,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn into_result<T>(self, rows: Vec<T>) -> PageResult<T> {
        PageResult {
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_results: self.total_results,
            rows,
        }
    }
}

/// One bounded page of rows plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(
    feature = "openapi",
    aliases(
        BugPage = PageResult<crate::Bug>,
        ProjectPage = PageResult<crate::Project>,
        UserPage = PageResult<crate::User>,
        TagPage = PageResult<crate::Tag>,
        BookmarkPage = PageResult<crate::Bookmark>
    )
)]
pub struct PageResult<T> {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_results: u64,
    pub rows: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_results: self.total_results,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}

/// Rows per page for one listing; administrators see larger pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageSizes {
    pub user: u64,
    pub admin: u64,
}

impl PageSizes {
    pub const fn uniform(size: u64) -> Self {
        Self {
            user: size,
            admin: size,
        }
    }

    pub fn for_context(&self, ctx: &RequestContext) -> u64 {
        if ctx.is_admin() {
            self.admin
        } else {
            self.user
        }
    }
}
