use crate::pagination::PaginationEvent;
use crate::services::{AdminContext, CategoryId, MAX_NAME_LEN};

pub const ACTIVE_IDS_FIELD: &str = "active_category_id";
pub const INACTIVE_IDS_FIELD: &str = "inactive_category_id";
/// Query field the rename and delete popups use to hand their result back.
pub const POPUP_STATUS_FIELD: &str = "edit_reporting_category_form";

/// Ids checked in the two checkbox groups of the list form.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    pub active: Vec<CategoryId>,
    pub inactive: Vec<CategoryId>,
}

impl Selection {
    pub fn from_context(ctx: &AdminContext) -> Self {
        Self {
            active: parse_ids(ctx.post_vars.list(ACTIVE_IDS_FIELD)),
            inactive: parse_ids(ctx.post_vars.list(INACTIVE_IDS_FIELD)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    pub fn len(&self) -> usize {
        self.union().len()
    }

    /// Both groups merged, without duplicates, in submission order.
    pub fn union(&self) -> Vec<CategoryId> {
        let mut ids = Vec::with_capacity(self.active.len() + self.inactive.len());
        for id in self.active.iter().chain(self.inactive.iter()) {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

fn parse_ids(values: Vec<String>) -> Vec<CategoryId> {
    let mut ids = Vec::new();
    for value in values {
        if let Ok(id) = value.trim().parse::<CategoryId>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusButton {
    Activate,
    Deactivate,
}

/// The new-category form, redisplayed with its value and error on failure.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateForm {
    pub name: String,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameProblem {
    Missing,
    TooLong,
}

impl CreateForm {
    pub fn validate(&self) -> Result<String, NameProblem> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(NameProblem::Missing);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(NameProblem::TooLong);
        }
        Ok(name.to_string())
    }
}

/// What a request to the category page asks for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CategoryAction {
    Paginate(PaginationEvent),
    Create(CreateForm),
    Rename(Selection),
    Delete(Selection),
    SetStatus {
        selection: Selection,
        button: Option<StatusButton>,
    },
    View,
}

impl CategoryAction {
    /// Classifies a request. The first matching branch wins.
    pub fn from_context(ctx: &AdminContext) -> Self {
        if let Some(event) = PaginationEvent::from_context(ctx) {
            return CategoryAction::Paginate(event);
        }

        let post = &ctx.post_vars;
        if post.bool("create_category") {
            return CategoryAction::Create(CreateForm {
                name: post.string("category_name").unwrap_or_default(),
                error: None,
            });
        }

        let selection = Selection::from_context(ctx);
        match post.string("action").as_deref() {
            Some("category_edit") => return CategoryAction::Rename(selection),
            Some("category_delete") => return CategoryAction::Delete(selection),
            _ => {}
        }

        let button = if post.bool("activate") {
            Some(StatusButton::Activate)
        } else if post.bool("deactivate") {
            Some(StatusButton::Deactivate)
        } else {
            None
        };
        if button.is_some() || !selection.is_empty() {
            return CategoryAction::SetStatus { selection, button };
        }

        CategoryAction::View
    }

    pub fn name(&self) -> &'static str {
        match self {
            CategoryAction::Paginate(_) => "paginate",
            CategoryAction::Create(_) => "create",
            CategoryAction::Rename(_) => "rename",
            CategoryAction::Delete(_) => "delete",
            CategoryAction::SetStatus { .. } => "set_status",
            CategoryAction::View => "view",
        }
    }
}
