use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::context::TenantContext;
use crate::database::{CreateOptions, InMemoryDelegate, MutationOptions, RecordData, TenantAwareRepository};
use crate::error::BusinessError;
use crate::filter::{tenant, FilterOrder, FindManyArgs, ORGANIZATION_RELATION_FIELD};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Project;

type ProjectRepository = TenantAwareRepository<Project, InMemoryDelegate<Project>>;

fn repository(state: &AppState, context: Arc<TenantContext>) -> ProjectRepository {
    TenantAwareRepository::from_config(context, state.projects.clone(), &state.tenancy)
}

/// Clients never pick the record id or wire the organization relation.
///
/// With orgId injection on, the repository overwrites any `orgId` sent;
/// with it off, an `orgId` naming another organization is rejected.
fn client_payload(
    state: &AppState,
    context: &TenantContext,
    mut data: RecordData,
) -> Result<RecordData, BusinessError> {
    data.remove("id");
    data.remove(ORGANIZATION_RELATION_FIELD);

    if !state.tenancy.auto_inject_org_id {
        let organization_id = context.organization_id()?;
        if tenant::conflicting_org_id(&data, &organization_id).is_some() {
            return Err(BusinessError::forbidden(
                "Project cannot be created in another organization",
            ));
        }
    }
    Ok(data)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// e.g. "name desc, createdAt"
    pub order: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub name: Option<String>,
}

impl ListQuery {
    pub fn into_args(self) -> FindManyArgs {
        let mut args = FindManyArgs::default();
        if let Some(name) = self.name {
            args.where_clause.insert("name".to_string(), json!(name));
        }
        if let Some(order) = self.order {
            args.order_by = FilterOrder::parse_order_string(&order);
        }
        args.skip = self.skip;
        args.take = self.take;
        args
    }
}

/// GET /api/projects
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Project>> {
    let projects = repository(&state, context).find_many(query.into_args()).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/count
pub async fn count(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<serde_json::Value> {
    let args = query.into_args();
    let count = repository(&state, context).count(args.where_clause).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// GET /api/projects/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let project = repository(&state, context).find_by_id_or_throw(&id).await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Json(data): Json<RecordData>,
) -> ApiResult<Project> {
    let options = CreateOptions {
        auto_inject_org_id: state.tenancy.auto_inject_org_id,
    };
    let data = client_payload(&state, &context, data)?;
    let project = repository(&state, context).create(data, options).await?;
    Ok(ApiResponse::created(project))
}

/// POST /api/projects/batch
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Json(items): Json<Vec<RecordData>>,
) -> ApiResult<Vec<Project>> {
    let items = items
        .into_iter()
        .map(|data| client_payload(&state, &context, data))
        .collect::<Result<Vec<_>, _>>()?;
    let projects = repository(&state, context).create_many(items).await?;
    Ok(ApiResponse::created(projects))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Path(id): Path<String>,
    Json(data): Json<RecordData>,
) -> ApiResult<Project> {
    let project = repository(&state, context)
        .update(&id, data, MutationOptions::default())
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<Arc<TenantContext>>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let project = repository(&state, context)
        .delete(&id, MutationOptions::default())
        .await?;
    Ok(ApiResponse::success(project))
}
