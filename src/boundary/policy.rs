use std::collections::HashSet;

use super::principal::Identity;

/// Decides whether a route skips tenant context population entirely.
/// Supplied by the routing layer.
pub trait RouteExemption: Send + Sync {
    fn is_exempt(&self, route: &str) -> bool;
}

impl<F> RouteExemption for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_exempt(&self, route: &str) -> bool {
        self(route)
    }
}

/// Fixed set of public routes, matched exactly or by `/*` prefix
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl PublicRoutes {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut public = Self::default();
        for route in routes {
            let route = route.into();
            match route.strip_suffix("/*") {
                Some(prefix) => public.prefixes.push(format!("{}/", prefix)),
                None => {
                    public.exact.insert(route);
                }
            }
        }
        public
    }
}

impl RouteExemption for PublicRoutes {
    fn is_exempt(&self, route: &str) -> bool {
        self.exact.contains(route) || self.prefixes.iter().any(|p| route.starts_with(p.as_str()))
    }
}

/// Decides whether a validated principal is a platform super-admin
pub trait SuperAdminPolicy: Send + Sync {
    fn is_super_admin(&self, identity: &Identity<'_>) -> bool;
}

/// Default policy: nobody is a super-admin
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuperAdmins;

impl SuperAdminPolicy for NoSuperAdmins {
    fn is_super_admin(&self, _identity: &Identity<'_>) -> bool {
        false
    }
}

/// Super-admins listed by user id, typically from configuration
#[derive(Debug, Clone, Default)]
pub struct ConfiguredSuperAdmins {
    user_ids: HashSet<String>,
}

impl ConfiguredSuperAdmins {
    pub fn new<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_ids: user_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl SuperAdminPolicy for ConfiguredSuperAdmins {
    fn is_super_admin(&self, identity: &Identity<'_>) -> bool {
        self.user_ids.contains(identity.user_id)
    }
}
