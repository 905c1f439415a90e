// Per-dimension paging state machine

/// Why a dimension stopped paging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The board reported the current page as the last one
    LastPage,
    /// The page had no item container
    NoItems,
    /// `max_pages` reached before any terminal signal
    PageCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionState {
    Paging { page: u32 },
    Done(DoneReason),
}

impl DimensionState {
    pub fn start() -> Self {
        DimensionState::Paging { page: 1 }
    }

    /// Transition after a page was processed
    pub fn after_page(page: u32, is_last_page: bool, max_pages: u32) -> Self {
        if is_last_page {
            DimensionState::Done(DoneReason::LastPage)
        } else if page >= max_pages {
            DimensionState::Done(DoneReason::PageCeiling)
        } else {
            DimensionState::Paging { page: page + 1 }
        }
    }
}
