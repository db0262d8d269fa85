use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::warn;

pub type ServiceResult<T> = Result<T, CategoryError>;

pub type AccountId = i64;
pub type CategoryId = i64;

/// Longest category name the page accepts.
pub const MAX_NAME_LEN: usize = 200;
/// Number of categories an account may have active at the same time.
pub const MAX_ACTIVE_CATEGORIES: usize = 100;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("backend returned {status}{}", detail_suffix(.detail))]
    Backend {
        status: BackendStatus,
        detail: Option<String>,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl CategoryError {
    pub fn backend(status: BackendStatus) -> Self {
        CategoryError::Backend {
            status,
            detail: None,
        }
    }

    /// Status reported by the backend, or `Unavailable` for errors that never reached it.
    pub fn status(&self) -> BackendStatus {
        match self {
            CategoryError::Backend { status, .. } => *status,
            _ => BackendStatus::Unavailable,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

/// Result codes of the category backend.
#[derive(Clone, Copy, Debug, Serialize, Eq, PartialEq)]
pub enum BackendStatus {
    Ok,
    InvalidName,
    DuplicateName,
    NotFound,
    ActiveLimitReached,
    Unavailable,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            BackendStatus::Ok => "OK",
            BackendStatus::InvalidName => "InvalidName",
            BackendStatus::DuplicateName => "DuplicateName",
            BackendStatus::NotFound => "NotFound",
            BackendStatus::ActiveLimitReached => "ActiveLimitReached",
            BackendStatus::Unavailable => "Unavailable",
        };
        f.write_str(code)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DataBag {
    inner: HashMap<String, Value>,
}

impl DataBag {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.inner.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .and_then(|value| value.as_str().map(|s| s.to_string()))
    }

    /// Looks up a language string, falling back to the key itself.
    pub fn text(&self, key: &str) -> String {
        self.string(key).unwrap_or_else(|| key.to_string())
    }
}

/// Raw request variables as they arrive from a query string or form body.
///
/// Keys ending in `[]` are collected into lists, everything else keeps the
/// last value seen.
#[derive(Clone, Debug, Default)]
pub struct RequestVars {
    data: DataBag,
}

impl RequestVars {
    pub fn new() -> Self {
        Self {
            data: DataBag::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut vars = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            match key.strip_suffix("[]") {
                Some(list_key) => vars.push(list_key, value),
                None => vars.set(key, value.into()),
            }
        }
        vars
    }

    /// True when the key is present with a value other than empty, `0` or `false`.
    pub fn bool(&self, key: &str) -> bool {
        match self.data.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_i64().unwrap_or(0) != 0,
            Some(Value::String(text)) => {
                let text = text.trim();
                !text.is_empty() && text != "0" && !text.eq_ignore_ascii_case("false")
            }
            Some(Value::Array(items)) => !items.is_empty(),
            _ => false,
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.data.string(key)
    }

    /// Values of a repeated (`name[]`) field.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.data.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let mut items = self.list(key);
        items.push(value.into());
        self.data.set(key, items);
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.data.set(key, value);
    }
}

#[derive(Clone, Debug)]
pub struct AccountInfo {
    pub id: AccountId,
    pub name: String,
    pub language: String,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::from("Advertiser"),
            language: String::from("en_US"),
        }
    }
}

/// Everything one request to the category page carries.
#[derive(Clone, Debug, Default)]
pub struct AdminContext {
    pub scripturl: String,
    pub account: AccountInfo,
    pub txt: DataBag,
    pub request: RequestVars,
    pub post_vars: RequestVars,
}

impl AdminContext {
    pub fn for_account(account_id: AccountId) -> Self {
        let mut ctx = Self::default();
        ctx.account.id = account_id;
        ctx.scripturl = "/categories".into();
        ctx
    }

    /// Looks a key up in the query string first, then in the form body.
    pub fn param(&self, key: &str) -> Option<String> {
        self.request
            .string(key)
            .or_else(|| self.post_vars.string(key))
    }
}

#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct ReportingCategory {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub action: String,
    pub account_id: AccountId,
    pub details: Value,
    pub logged_at: DateTime<Utc>,
}

/// The backend that owns category storage.
pub trait CategoryService {
    fn create_category(&self, account_id: AccountId, name: &str)
        -> ServiceResult<ReportingCategory>;
    fn delete_categories(&self, account_id: AccountId, ids: &[CategoryId]) -> ServiceResult<()>;
    fn set_categories_active(
        &self,
        account_id: AccountId,
        ids: &[CategoryId],
        active: bool,
    ) -> ServiceResult<()>;
    fn list_categories(
        &self,
        account_id: AccountId,
        include_inactive: bool,
    ) -> ServiceResult<Vec<ReportingCategory>>;
    fn log_action(&self, action: &str, account_id: AccountId, details: &Value)
        -> ServiceResult<()>;
    fn action_log(&self) -> ServiceResult<Vec<ActionLogEntry>>;
}

#[derive(Default)]
struct InMemoryState {
    categories: HashMap<AccountId, Vec<ReportingCategory>>,
    next_category_id: CategoryId,
    action_log: Vec<ActionLogEntry>,
    next_log_id: i64,
    offline: bool,
}

impl InMemoryState {
    fn account(&mut self, account_id: AccountId) -> &mut Vec<ReportingCategory> {
        self.categories.entry(account_id).or_default()
    }
}

/// Category backend kept in process memory.
#[derive(Clone, Default)]
pub struct InMemoryService {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryService {
    pub fn new_with_sample() -> Self {
        let service = Self::default();
        for (name, active) in [
            ("Homepage", true),
            ("Sports", true),
            ("finance", true),
            ("Holiday 2025", false),
        ] {
            let seeded = service.create_category(1, name).and_then(|category| {
                if active {
                    Ok(())
                } else {
                    service.set_categories_active(1, &[category.id], false)
                }
            });
            if let Err(err) = seeded {
                warn!(name, error = %err, "failed to seed sample category");
            }
        }
        service
    }

    /// Makes every subsequent backend call fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, InMemoryState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| CategoryError::Internal("category store poisoned".into()))?;
        if state.offline {
            return Err(CategoryError::backend(BackendStatus::Unavailable));
        }
        Ok(state)
    }
}

fn ensure_known(rows: &[ReportingCategory], ids: &[CategoryId]) -> ServiceResult<()> {
    match ids.iter().find(|id| !rows.iter().any(|row| row.id == **id)) {
        Some(missing) => Err(CategoryError::Backend {
            status: BackendStatus::NotFound,
            detail: Some(format!("category {missing}")),
        }),
        None => Ok(()),
    }
}

impl CategoryService for InMemoryService {
    fn create_category(
        &self,
        account_id: AccountId,
        name: &str,
    ) -> ServiceResult<ReportingCategory> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(CategoryError::backend(BackendStatus::InvalidName));
        }

        let mut state = self.lock()?;
        state.next_category_id += 1;
        let id = state.next_category_id;
        let rows = state.account(account_id);
        if rows
            .iter()
            .any(|row| row.name.to_lowercase() == name.to_lowercase())
        {
            return Err(CategoryError::Backend {
                status: BackendStatus::DuplicateName,
                detail: Some(name.to_string()),
            });
        }
        if rows.iter().filter(|row| row.active).count() >= MAX_ACTIVE_CATEGORIES {
            return Err(CategoryError::backend(BackendStatus::ActiveLimitReached));
        }

        let category = ReportingCategory {
            id,
            name: name.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        rows.push(category.clone());
        Ok(category)
    }

    fn delete_categories(&self, account_id: AccountId, ids: &[CategoryId]) -> ServiceResult<()> {
        let mut state = self.lock()?;
        let rows = state.account(account_id);
        ensure_known(rows, ids)?;
        rows.retain(|row| !ids.contains(&row.id));
        Ok(())
    }

    fn set_categories_active(
        &self,
        account_id: AccountId,
        ids: &[CategoryId],
        active: bool,
    ) -> ServiceResult<()> {
        let mut state = self.lock()?;
        let rows = state.account(account_id);
        ensure_known(rows, ids)?;
        if active {
            let after = rows
                .iter()
                .filter(|row| row.active || ids.contains(&row.id))
                .count();
            if after > MAX_ACTIVE_CATEGORIES {
                return Err(CategoryError::backend(BackendStatus::ActiveLimitReached));
            }
        }
        for row in rows.iter_mut().filter(|row| ids.contains(&row.id)) {
            row.active = active;
        }
        Ok(())
    }

    fn list_categories(
        &self,
        account_id: AccountId,
        include_inactive: bool,
    ) -> ServiceResult<Vec<ReportingCategory>> {
        let state = self.lock()?;
        Ok(state
            .categories
            .get(&account_id)
            .map(|rows| {
                rows.iter()
                    .filter(|row| include_inactive || row.active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn log_action(
        &self,
        action: &str,
        account_id: AccountId,
        details: &Value,
    ) -> ServiceResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CategoryError::Internal("category store poisoned".into()))?;
        state.next_log_id += 1;
        let entry = ActionLogEntry {
            id: state.next_log_id,
            action: action.to_string(),
            account_id,
            details: details.clone(),
            logged_at: Utc::now(),
        };
        state.action_log.push(entry);
        Ok(())
    }

    fn action_log(&self) -> ServiceResult<Vec<ActionLogEntry>> {
        let state = self
            .state
            .lock()
            .map_err(|_| CategoryError::Internal("category store poisoned".into()))?;
        Ok(state.action_log.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_vars_collect_repeated_keys() {
        let vars = RequestVars::from_pairs([
            ("active_category_id[]", "3"),
            ("active_category_id[]", "7"),
            ("action", "category_delete"),
        ]);
        assert_eq!(vars.list("active_category_id"), vec!["3", "7"]);
        assert_eq!(vars.string("action").as_deref(), Some("category_delete"));
        assert!(vars.list("inactive_category_id").is_empty());
    }

    #[test]
    fn request_vars_bool_reads_form_values() {
        let vars = RequestVars::from_pairs([("activate", "1"), ("deactivate", "0"), ("x", "")]);
        assert!(vars.bool("activate"));
        assert!(!vars.bool("deactivate"));
        assert!(!vars.bool("x"));
        assert!(!vars.bool("missing"));
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let service = InMemoryService::default();
        service.create_category(5, "Travel").unwrap();
        let err = service.create_category(5, "travel").unwrap_err();
        assert_eq!(err.status(), BackendStatus::DuplicateName);
        // other accounts are unaffected
        assert!(service.create_category(6, "travel").is_ok());
    }

    #[test]
    fn sample_data_has_one_inactive_category() {
        let service = InMemoryService::new_with_sample();
        let rows = service.list_categories(1, true).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().filter(|row| !row.active).count(), 1);
    }

    #[test]
    fn backend_detail_is_part_of_the_message() {
        let service = InMemoryService::default();
        service.create_category(5, "Travel").unwrap();
        let err = service.create_category(5, "TRAVEL").unwrap_err();
        assert_eq!(err.to_string(), "backend returned DuplicateName (TRAVEL)");

        let err = service.delete_categories(5, &[404]).unwrap_err();
        assert_eq!(err.to_string(), "backend returned NotFound (category 404)");

        let err = CategoryError::backend(BackendStatus::Unavailable);
        assert_eq!(err.to_string(), "backend returned Unavailable");
    }

    #[test]
    fn active_limit_is_enforced() {
        let service = InMemoryService::default();
        for n in 0..MAX_ACTIVE_CATEGORIES {
            service.create_category(1, &format!("cat {n}")).unwrap();
        }
        let err = service.create_category(1, "one too many").unwrap_err();
        assert_eq!(err.status(), BackendStatus::ActiveLimitReached);
    }

    #[test]
    fn bulk_updates_are_all_or_nothing() {
        let service = InMemoryService::default();
        let a = service.create_category(1, "A").unwrap();
        let err = service.delete_categories(1, &[a.id, 999]).unwrap_err();
        assert_eq!(err.status(), BackendStatus::NotFound);
        assert_eq!(service.list_categories(1, true).unwrap().len(), 1);
    }

    #[test]
    fn list_can_exclude_inactive() {
        let service = InMemoryService::new_with_sample();
        assert_eq!(service.list_categories(1, true).unwrap().len(), 4);
        assert_eq!(service.list_categories(1, false).unwrap().len(), 3);
    }

    #[test]
    fn offline_backend_reports_unavailable() {
        let service = InMemoryService::new_with_sample();
        service.set_offline(true);
        let err = service.list_categories(1, true).unwrap_err();
        assert_eq!(err.status(), BackendStatus::Unavailable);
    }
}
