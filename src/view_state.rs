use crate::services::{AccountId, CategoryError, ServiceResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, Default, Serialize, Eq, PartialEq, Hash)]
pub enum ViewFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 3] = [ViewFilter::Active, ViewFilter::Inactive, ViewFilter::All];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ViewFilter::Active),
            "inactive" => Some(ViewFilter::Inactive),
            "all" => Some(ViewFilter::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewFilter::Active => "Active",
            ViewFilter::Inactive => "Inactive",
            ViewFilter::All => "All",
        }
    }

    pub fn admits(&self, active: bool) -> bool {
        match self {
            ViewFilter::Active => active,
            ViewFilter::Inactive => !active,
            ViewFilter::All => true,
        }
    }

    /// Whether the backend listing needs inactive rows for this filter.
    pub fn needs_inactive(&self) -> bool {
        !matches!(self, ViewFilter::Active)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "name_asc" | "name" => Some(SortOrder::NameAsc),
            "name_desc" => Some(SortOrder::NameDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::NameAsc => SortOrder::NameDesc,
            SortOrder::NameDesc => SortOrder::NameAsc,
        }
    }
}

/// Per-account list settings that survive between requests.
#[derive(Clone, Copy, Debug, Serialize, Eq, PartialEq)]
pub struct ViewState {
    pub filter: ViewFilter,
    pub page: usize,
    pub page_size: usize,
    pub sort: SortOrder,
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            filter: ViewFilter::default(),
            page: 1,
            page_size: page_size.max(1),
            sort: SortOrder::default(),
        }
    }

    /// Applies an explicit `show` value. Switching to a different filter sends
    /// the list back to its first page; unknown values are ignored.
    pub fn apply_show(&mut self, show: Option<&str>) -> bool {
        let Some(filter) = show.and_then(ViewFilter::parse) else {
            return false;
        };
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.page = 1;
        true
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(20)
    }
}

pub trait ViewStateStore {
    fn load(&self, account_id: AccountId) -> ServiceResult<Option<ViewState>>;
    fn save(&self, account_id: AccountId, state: ViewState) -> ServiceResult<()>;
}

#[derive(Clone, Default)]
pub struct InMemoryViewStateStore {
    states: Arc<Mutex<HashMap<AccountId, ViewState>>>,
}

impl ViewStateStore for InMemoryViewStateStore {
    fn load(&self, account_id: AccountId) -> ServiceResult<Option<ViewState>> {
        let states = self
            .states
            .lock()
            .map_err(|_| CategoryError::Internal("view state store poisoned".into()))?;
        Ok(states.get(&account_id).copied())
    }

    fn save(&self, account_id: AccountId, state: ViewState) -> ServiceResult<()> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| CategoryError::Internal("view state store poisoned".into()))?;
        states.insert(account_id, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_change_resets_page() {
        let mut state = ViewState::default();
        state.page = 4;
        assert!(state.apply_show(Some("All")));
        assert_eq!(state.filter, ViewFilter::All);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn same_filter_keeps_page() {
        let mut state = ViewState::default();
        state.page = 4;
        assert!(!state.apply_show(Some("Active")));
        assert_eq!(state.page, 4);
    }

    #[test]
    fn unknown_filter_is_ignored() {
        let mut state = ViewState::default();
        state.page = 2;
        assert!(!state.apply_show(Some("Archived")));
        assert!(!state.apply_show(None));
        assert_eq!(state.filter, ViewFilter::Active);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn filter_admits_rows() {
        assert!(ViewFilter::Active.admits(true));
        assert!(!ViewFilter::Active.admits(false));
        assert!(ViewFilter::Inactive.admits(false));
        assert!(!ViewFilter::Inactive.admits(true));
        assert!(ViewFilter::All.admits(false));
    }

    #[test]
    fn store_is_keyed_by_account() {
        let store = InMemoryViewStateStore::default();
        let mut state = ViewState::default();
        state.filter = ViewFilter::Inactive;
        store.save(1, state).unwrap();
        assert_eq!(store.load(1).unwrap(), Some(state));
        assert_eq!(store.load(2).unwrap(), None);
    }
}
