use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension,
};

use crate::app::AppState;
use crate::context::{BypassReason, TenantContext};
use crate::database::TenantAwareRepository;
use crate::error::BusinessError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Project;

use super::projects::ListQuery;

/// GET /api/admin/projects - every organization's projects.
///
/// Super-admin only. Runs inside an audited bypass scope, so the request
/// ends with a bypass summary in the logs.
pub async fn list_all_projects(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Project>> {
    let user_id = context.user_id()?;
    if !context.is_super_admin_user() {
        return Err(BusinessError::insufficient_permissions(
            "Cross-organization listing requires a platform administrator",
        ));
    }

    let repository = TenantAwareRepository::new(Arc::clone(&context), state.projects.clone());
    let reason = BypassReason::new(
        "ADMIN_LIST_PROJECTS",
        format!("cross-organization project listing by {}", user_id),
    );

    let projects = context
        .run_without_isolation(reason, || repository.find_many(query.into_args()))
        .await?;
    Ok(ApiResponse::success(projects))
}
