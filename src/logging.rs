use crate::services::{AdminContext, CategoryService, ServiceResult};
use tracing::info;

pub fn log_action<S: CategoryService>(
    service: &S,
    ctx: &AdminContext,
    action: &str,
    details: serde_json::Value,
) -> ServiceResult<()> {
    info!(
        account_id = ctx.account.id,
        account = %ctx.account.name,
        action,
        %details,
        "category action"
    );
    service.log_action(action, ctx.account.id, &details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryService;
    use serde_json::json;

    #[test]
    fn actions_reach_the_service_log() {
        let service = InMemoryService::default();
        let ctx = AdminContext::for_account(42);
        log_action(&service, &ctx, "delete_categories", json!({"ids": [1, 2]})).unwrap();
        let log = service.action_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].account_id, 42);
        assert_eq!(log[0].details["ids"][1], 2);
    }
}
