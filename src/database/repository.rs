use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use crate::config::TenancyConfig;
use crate::context::{BypassReason, TenantContext};
use crate::database::delegate::{PersistenceDelegate, RecordData};
use crate::error::{BusinessCode, BusinessError};
use crate::filter::{tenant, Filter, FindManyArgs, ORGANIZATION_RELATION_FIELD, ORG_ID_FIELD};
use crate::models::TenantAwareModel;

/// Per-call options for [`TenantAwareRepository::create`]
#[derive(Debug, Clone, Copy)]
pub struct CreateOptions {
    pub auto_inject_org_id: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            auto_inject_org_id: true,
        }
    }
}

/// Per-call options for update and delete
#[derive(Debug, Clone, Copy)]
pub struct MutationOptions {
    /// Load the record through the tenant filter before mutating it.
    /// Only disable when ownership was already verified upstream.
    pub verify_ownership: bool,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self {
            verify_ownership: true,
        }
    }
}

/// Data access wrapper that scopes every query to the caller's organization.
///
/// Reads merge `orgId` into the filter and re-check ownership of whatever
/// comes back; writes inject `orgId` into create payloads and verify
/// ownership before update/delete. Deviation is only possible inside a
/// bypass scope on the context, which is always audited.
pub struct TenantAwareRepository<M, D> {
    context: Arc<TenantContext>,
    delegate: D,
    reject_caller_org_id: bool,
    _phantom: PhantomData<fn() -> M>,
}

impl<M, D> TenantAwareRepository<M, D>
where
    M: TenantAwareModel,
    D: PersistenceDelegate<M>,
{
    pub fn new(context: Arc<TenantContext>, delegate: D) -> Self {
        Self {
            context,
            delegate,
            reject_caller_org_id: false,
            _phantom: PhantomData,
        }
    }

    pub fn from_config(context: Arc<TenantContext>, delegate: D, config: &TenancyConfig) -> Self {
        Self::new(context, delegate).reject_caller_org_id(config.reject_caller_org_id)
    }

    /// Fail with FORBIDDEN when a caller filter names a different `orgId`,
    /// instead of silently overwriting it
    pub fn reject_caller_org_id(mut self, reject: bool) -> Self {
        self.reject_caller_org_id = reject;
        self
    }

    pub fn model_name(&self) -> &'static str {
        M::MODEL_NAME
    }

    pub fn has_tenant_field(&self) -> bool {
        M::HAS_TENANT_FIELD
    }

    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    fn is_scoped(&self) -> bool {
        self.has_tenant_field() && !self.context.is_bypass_enabled()
    }

    /// Merge the tenant predicate into `where_clause`.
    ///
    /// Returned unchanged inside a bypass scope or for global models.
    pub fn apply_tenant_filter(&self, where_clause: Filter) -> Result<Filter, BusinessError> {
        if !self.is_scoped() {
            return Ok(where_clause);
        }

        let organization_id = self.context.organization_id()?;
        if let Some(requested) = tenant::conflicting_org_id(&where_clause, &organization_id) {
            if self.reject_caller_org_id {
                return Err(BusinessError::forbidden(format!(
                    "Filter on {} targets another organization",
                    self.model_name()
                )));
            }
            tracing::warn!(
                model = self.model_name(),
                requested = %requested,
                org_id = %organization_id,
                "Caller-supplied orgId overwritten by tenant filter"
            );
        }

        Ok(tenant::with_org_id(where_clause, &organization_id))
    }

    fn verify_record(&self, record: &M) -> Result<(), BusinessError> {
        if !self.has_tenant_field() {
            return Ok(());
        }
        self.context
            .check_ownership(record.org_id(), self.model_name(), BusinessCode::Forbidden)
    }

    fn id_filter(id: &str) -> Filter {
        let mut filter = Filter::new();
        filter.insert("id".to_string(), Value::String(id.to_string()));
        filter
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<M>, BusinessError> {
        let record = if self.is_scoped() {
            let filter = self.apply_tenant_filter(Self::id_filter(id))?;
            self.delegate.find_first(&filter).await?
        } else {
            self.delegate.find_unique(id).await?
        };

        if let Some(record) = &record {
            self.verify_record(record)?;
        }
        Ok(record)
    }

    /// Like `find_by_id`, but a missing record is an error. The message is the
    /// same whether the record does not exist or belongs to another tenant.
    pub async fn find_by_id_or_throw(&self, id: &str) -> Result<M, BusinessError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            BusinessError::not_found(format!(
                "{} does not exist or is not accessible",
                self.model_name()
            ))
        })
    }

    pub async fn find_first(&self, where_clause: Filter) -> Result<Option<M>, BusinessError> {
        let filter = self.apply_tenant_filter(where_clause)?;
        let record = self.delegate.find_first(&filter).await?;

        if let Some(record) = &record {
            self.verify_record(record)?;
        }
        Ok(record)
    }

    pub async fn find_many(&self, mut args: FindManyArgs) -> Result<Vec<M>, BusinessError> {
        args.where_clause = self.apply_tenant_filter(std::mem::take(&mut args.where_clause))?;
        Ok(self.delegate.find_many(&args).await?)
    }

    pub async fn count(&self, where_clause: Filter) -> Result<u64, BusinessError> {
        let filter = self.apply_tenant_filter(where_clause)?;
        Ok(self.delegate.count(&filter).await?)
    }

    pub async fn exists(&self, where_clause: Filter) -> Result<bool, BusinessError> {
        Ok(self.count(where_clause).await? > 0)
    }

    /// Add `orgId` unless the payload already wires a nested `organization` relation
    fn inject_org_id(&self, mut data: RecordData, organization_id: &str) -> RecordData {
        if !data.contains_key(ORGANIZATION_RELATION_FIELD) {
            data.insert(
                ORG_ID_FIELD.to_string(),
                Value::String(organization_id.to_string()),
            );
        }
        data
    }

    pub async fn create(
        &self,
        data: RecordData,
        options: CreateOptions,
    ) -> Result<M, BusinessError> {
        let data = if options.auto_inject_org_id && self.has_tenant_field() {
            let organization_id = self.context.organization_id()?;
            self.inject_org_id(data, &organization_id)
        } else {
            data
        };

        let record = self.delegate.create(data).await?;
        tracing::debug!(
            model = self.model_name(),
            id = record.id(),
            org_id = record.org_id().unwrap_or("-"),
            "Resource created"
        );
        Ok(record)
    }

    // An update must not move a record into another organization
    fn check_update_payload(&self, data: &RecordData) -> Result<(), BusinessError> {
        if !self.is_scoped() {
            return Ok(());
        }
        let organization_id = self.context.organization_id()?;
        if tenant::conflicting_org_id(data, &organization_id).is_some() {
            return Err(BusinessError::forbidden(format!(
                "{} cannot be moved to another organization",
                self.model_name()
            )));
        }
        Ok(())
    }

    pub async fn update(
        &self,
        id: &str,
        data: RecordData,
        options: MutationOptions,
    ) -> Result<M, BusinessError> {
        if options.verify_ownership {
            self.find_by_id_or_throw(id).await?;
        }
        self.check_update_payload(&data)?;

        let record = self.delegate.update(id, data).await?;
        tracing::debug!(
            model = self.model_name(),
            id,
            org_id = record.org_id().unwrap_or("-"),
            "Resource updated"
        );
        Ok(record)
    }

    pub async fn delete(&self, id: &str, options: MutationOptions) -> Result<M, BusinessError> {
        if options.verify_ownership {
            self.find_by_id_or_throw(id).await?;
        }

        let record = self.delegate.delete(id).await?;
        tracing::debug!(
            model = self.model_name(),
            id,
            org_id = record.org_id().unwrap_or("-"),
            "Resource deleted"
        );
        Ok(record)
    }

    /// Create every item concurrently inside an audited bypass scope.
    ///
    /// Not atomic: all creates run to completion and the first failure is
    /// returned, but items that succeeded stay written. Wrap the call in a
    /// transaction at the storage layer if all-or-nothing is required.
    pub async fn create_many(&self, items: Vec<RecordData>) -> Result<Vec<M>, BusinessError> {
        let reason = BypassReason::new(
            "BATCH_CREATE",
            format!("batch create {}", self.model_name()),
        )
        .system();

        self.context
            .run_without_isolation(reason, || async move {
                let payloads = if self.has_tenant_field() {
                    let organization_id = self.context.organization_id()?;
                    items
                        .into_iter()
                        .map(|data| self.inject_org_id(data, &organization_id))
                        .collect()
                } else {
                    items
                };

                let creates = payloads.into_iter().map(|data| self.delegate.create(data));
                let results = join_all(creates).await;
                let records = results
                    .into_iter()
                    .collect::<Result<Vec<M>, _>>()
                    .map_err(BusinessError::from)?;

                tracing::debug!(
                    model = self.model_name(),
                    count = records.len(),
                    "Resources created in batch"
                );
                Ok::<_, BusinessError>(records)
            })
            .await
    }
}
