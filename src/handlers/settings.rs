use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::context::TenantContext;
use crate::database::{CreateOptions, RecordData, TenantAwareRepository};
use crate::error::BusinessError;
use crate::filter::FindManyArgs;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::SystemSetting;

/// GET /api/settings - global model, readable by any authenticated caller
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
) -> ApiResult<Vec<SystemSetting>> {
    // Global data, but still not for anonymous callers
    context.user_id()?;

    let repository = TenantAwareRepository::new(context, state.settings.clone());
    let settings = repository.find_many(FindManyArgs::default()).await?;
    Ok(ApiResponse::success(settings))
}

/// POST /api/settings - super-admin only
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Json(data): Json<RecordData>,
) -> ApiResult<SystemSetting> {
    context.user_id()?;
    if !context.is_super_admin_user() {
        return Err(BusinessError::insufficient_permissions(
            "Only platform administrators can change system settings",
        ));
    }

    let repository = TenantAwareRepository::new(context, state.settings.clone());
    let setting = repository.create(data, CreateOptions::default()).await?;
    Ok(ApiResponse::created(setting))
}
