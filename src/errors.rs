use crate::language::sprintf;
use crate::services::{BackendStatus, CategoryError, DataBag, MAX_ACTIVE_CATEGORIES};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionVerb {
    Creating,
    Deleting,
    Activating,
    Deactivating,
}

impl ActionVerb {
    pub fn for_status(active: bool) -> Self {
        if active {
            ActionVerb::Activating
        } else {
            ActionVerb::Deactivating
        }
    }

    fn key(&self) -> &'static str {
        match self {
            ActionVerb::Creating => "verb_creating",
            ActionVerb::Deleting => "verb_deleting",
            ActionVerb::Activating => "verb_activating",
            ActionVerb::Deactivating => "verb_deactivating",
        }
    }
}

/// Turns a failed backend call into the status line shown above the list.
pub fn backend_error_message(txt: &DataBag, error: &CategoryError, verb: ActionVerb) -> String {
    let reason = match error.status() {
        BackendStatus::InvalidName => txt.text("reason_invalid_name"),
        BackendStatus::DuplicateName => txt.text("reason_duplicate_name"),
        BackendStatus::NotFound => txt.text("reason_not_found"),
        BackendStatus::ActiveLimitReached => sprintf(
            &txt.text("reason_active_limit"),
            &[MAX_ACTIVE_CATEGORIES.to_string().as_str()],
        ),
        BackendStatus::Ok | BackendStatus::Unavailable => txt.text("reason_unavailable"),
    };
    let template = match verb {
        ActionVerb::Creating => txt.text("error_single_category"),
        _ => txt.text("error_selected_categories"),
    };
    sprintf(&template, &[txt.text(verb.key()).as_str(), reason.as_str()])
}
