//! Page size and page resolution, plus the `Paginator` holding one page of rows.

/// Page size: the request value when it is a positive integer, capped at `max`, else the
/// configured one. `None` means the table is not paginated.
pub fn resolve_rows_number(
    requested: Option<&str>,
    configured: Option<u32>,
    max: Option<u32>,
) -> Option<u32> {
    match requested.map(str::trim).and_then(|raw| raw.parse::<u32>().ok()) {
        Some(rows) if rows > 0 => Some(max.map_or(rows, |max| rows.min(max.max(1)))),
        _ => configured,
    }
}

/// Number of pages needed for `total` rows, at least one.
pub fn last_page(total: u64, per_page: Option<u32>) -> u32 {
    match per_page {
        Some(per_page) if per_page > 0 && total > 0 => {
            total.div_ceil(per_page as u64).min(u32::MAX as u64) as u32
        }
        _ => 1,
    }
}

/// 1-indexed page, falling back to the first one on anything that is not a positive integer.
pub fn resolve_page(requested: Option<&str>) -> u32 {
    requested
        .map(str::trim)
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

const LINKS_AROUND_CURRENT: u32 = 2;

/// LIMIT/OFFSET pair applied to the table query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    pub fn new(per_page: u32, page: u32) -> Self {
        PageWindow {
            limit: per_page as u64,
            offset: (page.saturating_sub(1) as u64) * per_page as u64,
        }
    }
}

/// A navigation entry rendered in the table footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub page: Option<u32>,
    pub active: bool,
}

impl PageLink {
    pub fn is_disabled(&self) -> bool {
        self.page.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Paginator<M> {
    items: Vec<M>,
    total: u64,
    per_page: Option<u32>,
    current_page: u32,
}

impl<M> Paginator<M> {
    pub fn new(items: Vec<M>, total: u64, per_page: Option<u32>, current_page: u32) -> Self {
        Paginator {
            items,
            total,
            per_page,
            current_page: current_page.clamp(1, last_page(total, per_page)),
        }
    }

    pub fn items(&self) -> &[M] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        last_page(self.total, self.per_page)
    }

    pub fn window(&self) -> Option<PageWindow> {
        self.per_page
            .map(|per_page| PageWindow::new(per_page, self.current_page))
    }

    /// 1-indexed position of the first displayed row.
    pub fn first_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.window().map(|w| w.offset).unwrap_or(0) + 1)
    }

    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first + self.items.len() as u64 - 1)
    }

    pub fn has_pages(&self) -> bool {
        self.last_page() > 1
    }

    /// Previous, the first page, the pages around the current one, the last page, next.
    /// Skipped ranges show as a disabled `…`. Empty when everything fits on one page.
    pub fn links(&self) -> Vec<PageLink> {
        if !self.has_pages() {
            return Vec::new();
        }
        let last = self.last_page();
        let current = self.current_page;
        let from = current.saturating_sub(LINKS_AROUND_CURRENT).max(1);
        let to = current.saturating_add(LINKS_AROUND_CURRENT).min(last);

        let mut pages = vec![1];
        pages.extend(from.max(2)..=to);
        if *pages.last().unwrap_or(&1) != last {
            pages.push(last);
        }

        let mut links = Vec::with_capacity(pages.len() + 4);
        links.push(PageLink {
            label: "«".to_string(),
            page: (current > 1).then(|| current - 1),
            active: false,
        });
        let mut previous = 0;
        for page in pages {
            if page - previous == 2 {
                links.push(number_link(previous + 1, current));
            } else if page - previous > 2 {
                links.push(PageLink {
                    label: "…".to_string(),
                    page: None,
                    active: false,
                });
            }
            links.push(number_link(page, current));
            previous = page;
        }
        links.push(PageLink {
            label: "»".to_string(),
            page: (current < last).then(|| current + 1),
            active: false,
        });
        links
    }
}

fn number_link(page: u32, current: u32) -> PageLink {
    PageLink {
        label: page.to_string(),
        page: Some(page),
        active: page == current,
    }
}
