use crate::services::AdminContext;
use crate::view_state::{SortOrder, ViewState};
use serde::Serialize;

pub const MAX_PAGE_SIZE: usize = 100;

/// Controls of the pager and the sortable name column.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PaginationEvent {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub sort: Option<SortOrder>,
}

impl PaginationEvent {
    pub fn from_context(ctx: &AdminContext) -> Option<Self> {
        let page = ctx
            .param("page")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|page| *page >= 1);
        let page_size = ctx
            .param("page_size")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size));
        let sort = ctx.param("sort").as_deref().and_then(SortOrder::parse);

        let event = Self {
            page,
            page_size,
            sort,
        };
        (event != Self::default()).then_some(event)
    }
}

/// Applies a pager event to the stored view. Returns whether the state changed.
pub fn handle_event(state: &mut ViewState, event: PaginationEvent) -> bool {
    let before = *state;
    if let Some(sort) = event.sort {
        state.sort = sort;
    }
    if let Some(page_size) = event.page_size {
        if page_size != state.page_size {
            state.page_size = page_size;
            state.page = 1;
        }
    }
    if let Some(page) = event.page {
        if event.page_size.is_none() || state.page_size == before.page_size {
            state.page = page;
        }
    }
    *state != before
}

/// Visible slice of the filtered list, in 1-based row positions.
#[derive(Clone, Copy, Debug, Serialize, Eq, PartialEq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub first_row: usize,
    pub last_row: usize,
}

impl PageWindow {
    /// Pages past the end are clamped to the last page.
    pub fn compute(state: &ViewState, total_rows: usize) -> Self {
        let page_size = state.page_size.max(1);
        let total_pages = total_rows.div_ceil(page_size).max(1);
        let page = state.page.clamp(1, total_pages);
        let first_row = (page - 1) * page_size + 1;
        let last_row = (page * page_size).min(total_rows);
        Self {
            page,
            page_size,
            total_rows,
            total_pages,
            first_row,
            last_row,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
