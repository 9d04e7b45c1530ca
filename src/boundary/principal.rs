use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrincipalOrganization {
    pub id: Option<String>,
}

/// Authenticated caller as handed over by the authentication layer.
///
/// Fields are optional because the boundary has to cope with partial
/// identities; see [`Principal::identity`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    pub id: Option<String>,
    pub organization: Option<PrincipalOrganization>,
}

/// A principal carrying both a user id and an organization id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<'a> {
    pub user_id: &'a str,
    pub organization_id: &'a str,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            id: Some(user_id.into()),
            organization: Some(PrincipalOrganization {
                id: Some(organization_id.into()),
            }),
        }
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization.as_ref()?.id.as_deref()
    }

    /// Both ids, if present and non-empty
    pub fn identity(&self) -> Option<Identity<'_>> {
        let user_id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let organization_id = self.organization_id().filter(|id| !id.is_empty())?;
        Some(Identity {
            user_id,
            organization_id,
        })
    }
}
