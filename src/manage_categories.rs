use crate::category_request::{
    CategoryAction, CreateForm, NameProblem, Selection, StatusButton, POPUP_STATUS_FIELD,
};
use crate::errors::{backend_error_message, ActionVerb};
use crate::language::{apply_language, sprintf};
use crate::logging::log_action;
use crate::pagination::{handle_event, PageWindow};
use crate::services::{
    AdminContext, CategoryId, CategoryService, ReportingCategory, ServiceResult,
    MAX_ACTIVE_CATEGORIES, MAX_NAME_LEN,
};
use crate::view_state::{SortOrder, ViewFilter, ViewState, ViewStateStore};
use serde_json::json;
use std::cmp::Ordering;
use tracing::{debug, error, warn};

/// Everything the category template needs to draw one page.
#[derive(Clone, Debug)]
pub struct CategoryPage {
    pub filter: ViewFilter,
    pub sort: SortOrder,
    pub status: Option<String>,
    pub create_form: CreateForm,
    pub rows: Vec<ReportingCategory>,
    pub window: PageWindow,
    pub rename_target: Option<ReportingCategory>,
    pub active_count: usize,
    pub active_limit: usize,
}

#[derive(Debug, Default)]
struct Outcome {
    status: Option<String>,
    create_form: CreateForm,
    rename_id: Option<CategoryId>,
}

impl Outcome {
    fn status(message: String) -> Self {
        Self {
            status: Some(message),
            ..Self::default()
        }
    }
}

pub struct CategoryController<S: CategoryService, V: ViewStateStore> {
    service: S,
    views: V,
    default_page_size: usize,
}

impl<S: CategoryService, V: ViewStateStore> CategoryController<S, V> {
    pub fn new(service: S, views: V) -> Self {
        Self {
            service,
            views,
            default_page_size: ViewState::default().page_size,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Performs at most one change for the request, then builds the list view.
    pub fn handle(&self, ctx: &mut AdminContext) -> ServiceResult<CategoryPage> {
        apply_language(ctx, "ManageCategories");

        let account_id = ctx.account.id;
        let mut view = self
            .views
            .load(account_id)?
            .unwrap_or_else(|| ViewState::with_page_size(self.default_page_size));

        let action = CategoryAction::from_context(ctx);
        debug!(account_id, action = action.name(), "dispatching category request");
        let mut outcome = match action {
            CategoryAction::Paginate(event) => {
                let changed = handle_event(&mut view, event);
                debug!(account_id, changed, "pager event handled");
                Outcome::default()
            }
            CategoryAction::Create(form) => self.create(ctx, form),
            CategoryAction::Rename(selection) => self.rename(ctx, &selection),
            CategoryAction::Delete(selection) => self.delete(ctx, &selection),
            CategoryAction::SetStatus { selection, button } => {
                self.set_status(ctx, &selection, button)
            }
            CategoryAction::View => Outcome::default(),
        };
        if outcome.status.is_none() {
            outcome.status = ctx
                .request
                .string(POPUP_STATUS_FIELD)
                .filter(|message| !message.trim().is_empty());
        }

        if view.apply_show(ctx.param("show").as_deref()) {
            debug!(account_id, filter = view.filter.as_str(), "view filter changed");
        }
        self.views.save(account_id, view)?;

        Ok(self.load_list(ctx, &view, outcome))
    }

    fn create(&self, ctx: &AdminContext, mut form: CreateForm) -> Outcome {
        let name = match form.validate() {
            Ok(name) => name,
            Err(problem) => {
                form.error = Some(match problem {
                    NameProblem::Missing => ctx.txt.text("category_name_required"),
                    NameProblem::TooLong => sprintf(
                        &ctx.txt.text("category_name_too_long"),
                        &[MAX_NAME_LEN.to_string().as_str()],
                    ),
                });
                return Outcome {
                    create_form: form,
                    ..Outcome::default()
                };
            }
        };

        match self.service.create_category(ctx.account.id, &name) {
            Ok(category) => {
                let details = json!({"id": category.id, "name": category.name});
                self.audit(ctx, "create_category", details);
                Outcome::default()
            }
            Err(err) => {
                warn!(account_id = ctx.account.id, error = %err, "category create failed");
                form.error = Some(backend_error_message(&ctx.txt, &err, ActionVerb::Creating));
                Outcome {
                    create_form: form,
                    ..Outcome::default()
                }
            }
        }
    }

    fn rename(&self, ctx: &AdminContext, selection: &Selection) -> Outcome {
        let ids = selection.union();
        match ids.as_slice() {
            [] => Outcome::status(ctx.txt.text("select_category_to_rename")),
            [id] => Outcome {
                rename_id: Some(*id),
                ..Outcome::default()
            },
            _ => Outcome::status(ctx.txt.text("select_only_one_to_rename")),
        }
    }

    fn delete(&self, ctx: &AdminContext, selection: &Selection) -> Outcome {
        let ids = selection.union();
        if ids.is_empty() {
            return Outcome::status(ctx.txt.text("select_category_to_delete"));
        }

        match self.service.delete_categories(ctx.account.id, &ids) {
            Ok(()) => {
                self.audit(ctx, "delete_categories", json!({"ids": ids}));
                Outcome::default()
            }
            Err(err) => {
                warn!(account_id = ctx.account.id, error = %err, "category delete failed");
                Outcome::status(backend_error_message(&ctx.txt, &err, ActionVerb::Deleting))
            }
        }
    }

    fn set_status(
        &self,
        ctx: &AdminContext,
        selection: &Selection,
        button: Option<StatusButton>,
    ) -> Outcome {
        let has_active = !selection.active.is_empty();
        let has_inactive = !selection.inactive.is_empty();
        let activate = button == Some(StatusButton::Activate);
        // Mixed selections go through as one batch; only "activate" turns them on.
        let (ids, active) = match button {
            _ if has_active && has_inactive => (selection.union(), activate),
            Some(StatusButton::Deactivate) if has_active => (selection.active.clone(), false),
            Some(StatusButton::Activate) if has_inactive => (selection.inactive.clone(), true),
            _ if has_active || activate => {
                return Outcome::status(ctx.txt.text("select_inactive_to_activate"));
            }
            _ => return Outcome::status(ctx.txt.text("select_active_to_deactivate")),
        };

        match self
            .service
            .set_categories_active(ctx.account.id, &ids, active)
        {
            Ok(()) => {
                self.audit(
                    ctx,
                    "set_categories_active",
                    json!({"ids": ids, "active": active}),
                );
                Outcome::default()
            }
            Err(err) => {
                warn!(
                    account_id = ctx.account.id,
                    active,
                    error = %err,
                    "category status change failed"
                );
                Outcome::status(backend_error_message(
                    &ctx.txt,
                    &err,
                    ActionVerb::for_status(active),
                ))
            }
        }
    }

    fn audit(&self, ctx: &AdminContext, action: &str, details: serde_json::Value) {
        if let Err(err) = log_action(&self.service, ctx, action, details) {
            error!(account_id = ctx.account.id, action, error = %err, "failed to record action");
        }
    }

    fn load_list(&self, ctx: &AdminContext, view: &ViewState, outcome: Outcome) -> CategoryPage {
        let Outcome {
            mut status,
            create_form,
            rename_id,
        } = outcome;

        let include_inactive = view.filter.needs_inactive() || rename_id.is_some();
        let categories = match self
            .service
            .list_categories(ctx.account.id, include_inactive)
        {
            Ok(categories) => categories,
            Err(err) => {
                error!(account_id = ctx.account.id, error = %err, "failed to load categories");
                status.get_or_insert_with(|| ctx.txt.text("error_loading_categories"));
                Vec::new()
            }
        };

        let rename_target = rename_id.and_then(|id| {
            let found = categories.iter().find(|category| category.id == id).cloned();
            if found.is_none() {
                status.get_or_insert_with(|| ctx.txt.text("select_category_to_rename"));
            }
            found
        });
        let active_count = categories.iter().filter(|category| category.active).count();

        let mut visible: Vec<ReportingCategory> = categories
            .into_iter()
            .filter(|category| view.filter.admits(category.active))
            .collect();
        sort_categories(&mut visible, view.sort);

        let window = PageWindow::compute(view, visible.len());
        let rows = visible
            .into_iter()
            .skip(window.first_row - 1)
            .take((window.last_row + 1).saturating_sub(window.first_row))
            .collect();

        CategoryPage {
            filter: view.filter,
            sort: view.sort,
            status,
            create_form,
            rows,
            window,
            rename_target,
            active_count,
            active_limit: MAX_ACTIVE_CATEGORIES,
        }
    }
}

/// Case-insensitive by name, ties broken by id so the order is stable.
pub fn sort_categories(categories: &mut [ReportingCategory], order: SortOrder) {
    categories.sort_by(|a, b| {
        let by_name = compare_names(&a.name, &b.name).then(a.id.cmp(&b.id));
        match order {
            SortOrder::NameAsc => by_name,
            SortOrder::NameDesc => by_name.reverse(),
        }
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryService, RequestVars};
    use crate::view_state::InMemoryViewStateStore;

    type Controller = CategoryController<InMemoryService, InMemoryViewStateStore>;

    fn controller() -> (InMemoryService, InMemoryViewStateStore, Controller) {
        let service = InMemoryService::default();
        let views = InMemoryViewStateStore::default();
        let controller = CategoryController::new(service.clone(), views.clone());
        (service, views, controller)
    }

    fn post(pairs: &[(&str, &str)]) -> AdminContext {
        let mut ctx = AdminContext::for_account(1);
        ctx.post_vars = RequestVars::from_pairs(pairs.iter().copied());
        ctx
    }

    #[test]
    fn create_clears_form_on_success() {
        let (service, _, controller) = controller();
        let page = controller
            .handle(&mut post(&[("create_category", "1"), ("category_name", "Travel")]))
            .unwrap();
        assert_eq!(page.create_form, CreateForm::default());
        assert!(page.status.is_none());
        assert_eq!(page.rows.len(), 1);
        assert_eq!(service.action_log().unwrap()[0].action, "create_category");
    }

    #[test]
    fn invalid_name_never_reaches_backend() {
        let (service, _, controller) = controller();
        let page = controller
            .handle(&mut post(&[("create_category", "1"), ("category_name", "  ")]))
            .unwrap();
        assert_eq!(
            page.create_form.error.as_deref(),
            Some("Please enter a category name.")
        );
        assert!(service.list_categories(1, true).unwrap().is_empty());
        assert!(service.action_log().unwrap().is_empty());
    }

    #[test]
    fn rename_with_one_selection_opens_popup() {
        let (service, _, controller) = controller();
        let category = service.create_category(1, "Travel").unwrap();
        service.set_categories_active(1, &[category.id], false).unwrap();
        let id = category.id.to_string();
        let page = controller
            .handle(&mut post(&[
                ("action", "category_edit"),
                ("inactive_category_id[]", id.as_str()),
            ]))
            .unwrap();
        assert!(page.status.is_none());
        assert_eq!(page.rename_target.map(|c| c.name).as_deref(), Some("Travel"));
    }

    #[test]
    fn activate_union_when_both_groups_selected() {
        let (service, _, controller) = controller();
        let a = service.create_category(1, "A").unwrap();
        let b = service.create_category(1, "B").unwrap();
        service.set_categories_active(1, &[b.id], false).unwrap();
        let (a_id, b_id) = (a.id.to_string(), b.id.to_string());
        let page = controller
            .handle(&mut post(&[
                ("active_category_id[]", a_id.as_str()),
                ("inactive_category_id[]", b_id.as_str()),
                ("activate", "1"),
            ]))
            .unwrap();
        assert!(page.status.is_none());
        assert!(service
            .list_categories(1, true)
            .unwrap()
            .iter()
            .all(|c| c.active));
    }

    #[test]
    fn activate_with_only_active_selected_is_rejected() {
        let (service, _, controller) = controller();
        let a = service.create_category(1, "A").unwrap();
        let id = a.id.to_string();
        let page = controller
            .handle(&mut post(&[("active_category_id[]", id.as_str()), ("activate", "1")]))
            .unwrap();
        assert_eq!(
            page.status.as_deref(),
            Some("Please select at least one inactive category to activate.")
        );
    }

    #[test]
    fn status_change_failure_uses_verb() {
        let (service, _, controller) = controller();
        let page = controller
            .handle(&mut post(&[("active_category_id[]", "77"), ("deactivate", "1")]))
            .unwrap();
        let status = page.status.unwrap();
        assert!(status.contains("error deactivating"), "{status}");
        assert!(service.action_log().unwrap().is_empty());
    }

    #[test]
    fn backend_outage_is_reported_as_status() {
        let (service, _, controller) = controller();
        service.set_offline(true);
        let mut ctx = AdminContext::for_account(1);
        let page = controller.handle(&mut ctx).unwrap();
        assert_eq!(
            page.status.as_deref(),
            Some("There was an error loading your categories.")
        );
        assert!(page.rows.is_empty());
    }

    #[test]
    fn pager_event_skips_actions_and_persists() {
        let (service, views, controller) = controller();
        for n in 0..30 {
            service.create_category(1, &format!("c{n:02}")).unwrap();
        }
        let mut ctx = post(&[("action", "category_delete"), ("active_category_id[]", "1")]);
        ctx.request.set("page", "2");
        let page = controller.handle(&mut ctx).unwrap();
        assert_eq!(page.window.page, 2);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].name, "c20");
        assert_eq!(service.list_categories(1, true).unwrap().len(), 30);
        assert_eq!(views.load(1).unwrap().map(|v| v.page), Some(2));
    }

    #[test]
    fn popup_result_is_shown_until_an_action_replaces_it() {
        let (service, _, controller) = controller();
        service.create_category(1, "Travel").unwrap();

        let mut ctx = AdminContext::for_account(1);
        ctx.request.set(POPUP_STATUS_FIELD, "Category renamed.");
        let page = controller.handle(&mut ctx).unwrap();
        assert_eq!(page.status.as_deref(), Some("Category renamed."));

        let mut ctx = post(&[("action", "category_delete")]);
        ctx.request.set(POPUP_STATUS_FIELD, "Category renamed.");
        let page = controller.handle(&mut ctx).unwrap();
        assert_eq!(
            page.status.as_deref(),
            Some("Please select at least one category to delete.")
        );

        let mut ctx = AdminContext::for_account(1);
        ctx.request.set(POPUP_STATUS_FIELD, " ");
        assert!(controller.handle(&mut ctx).unwrap().status.is_none());
    }

    #[test]
    fn descending_sort() {
        let mut rows = vec![
            ReportingCategory {
                id: 1,
                name: "apple".into(),
                active: true,
                created_at: chrono::Utc::now(),
            },
            ReportingCategory {
                id: 2,
                name: "Banana".into(),
                active: true,
                created_at: chrono::Utc::now(),
            },
        ];
        sort_categories(&mut rows, SortOrder::NameDesc);
        assert_eq!(rows[0].name, "Banana");
    }

    #[test]
    fn duplicate_create_keeps_name_and_error() {
        let (service, _, controller) = controller();
        service.create_category(1, "Travel").unwrap();
        let page = controller
            .handle(&mut post(&[("create_category", "1"), ("category_name", "TRAVEL")]))
            .unwrap();
        assert_eq!(page.create_form.name, "TRAVEL");
        let error = page.create_form.error.unwrap();
        assert!(error.contains("already exists"), "{error}");
    }
}
