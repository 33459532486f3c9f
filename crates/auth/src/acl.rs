use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use thiserror::Error;

use annostack_core::{ContainerId, UserId};

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user {user} lacks '{permission}' on {container}")]
    Denied {
        user: UserId,
        container: ContainerId,
        permission: Permission,
    },
}

/// Access-control check consulted before every entity-service operation.
pub trait AccessPolicy: Send + Sync {
    fn check(
        &self,
        principal: &Principal,
        container: ContainerId,
        permission: &Permission,
    ) -> Result<(), AuthzError>;
}

/// Container ACL kept in process memory.
///
/// Admin principals (by role or by registration with [`InMemoryAcl::add_admin`])
/// pass every check. Everybody else needs an explicit grant on the container.
#[derive(Debug, Default)]
pub struct InMemoryAcl {
    admins: RwLock<HashSet<UserId>>,
    grants: RwLock<HashMap<(ContainerId, UserId), HashSet<Permission>>>,
}

impl InMemoryAcl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin(&self, user: UserId) {
        if let Ok(mut admins) = self.admins.write() {
            admins.insert(user);
        }
    }

    pub fn grant(&self, container: impl Into<ContainerId>, user: UserId, permission: Permission) {
        if let Ok(mut grants) = self.grants.write() {
            grants
                .entry((container.into(), user))
                .or_default()
                .insert(permission);
        }
    }

    pub fn revoke(&self, container: impl Into<ContainerId>, user: UserId, permission: &Permission) {
        if let Ok(mut grants) = self.grants.write() {
            if let Some(set) = grants.get_mut(&(container.into(), user)) {
                set.remove(permission);
            }
        }
    }

    fn is_admin(&self, principal: &Principal) -> bool {
        principal.is_admin()
            || self
                .admins
                .read()
                .map(|a| a.contains(&principal.user_id))
                .unwrap_or(false)
    }
}

impl AccessPolicy for InMemoryAcl {
    fn check(
        &self,
        principal: &Principal,
        container: ContainerId,
        permission: &Permission,
    ) -> Result<(), AuthzError> {
        if self.is_admin(principal) {
            return Ok(());
        }

        let allowed = self
            .grants
            .read()
            .map(|g| {
                g.get(&(container, principal.user_id))
                    .is_some_and(|set| set.iter().any(|p| p.grants(permission)))
            })
            .unwrap_or(false);

        if allowed {
            Ok(())
        } else {
            tracing::debug!(user = %principal.user_id, %container, %permission, "access denied");
            Err(AuthzError::Denied {
                user: principal.user_id,
                container,
                permission: permission.clone(),
            })
        }
    }
}

/// Policy that allows everything. Useful for single-user tools and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn check(&self, _: &Principal, _: ContainerId, _: &Permission) -> Result<(), AuthzError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn grants_are_per_container_and_user() {
        let acl = InMemoryAcl::new();
        let alice = Principal::new(UserId::new(), vec![Role::USER]);
        let c1 = ContainerId::new();
        let c2 = ContainerId::new();
        acl.grant(c1, alice.user_id, Permission::WRITE);

        assert!(acl.check(&alice, c1, &Permission::WRITE).is_ok());
        assert!(acl.check(&alice, c1, &Permission::DELETE).is_err());
        assert!(acl.check(&alice, c2, &Permission::WRITE).is_err());
    }

    #[test]
    fn admin_grant_implies_other_levels() {
        let acl = InMemoryAcl::new();
        let bob = Principal::new(UserId::new(), vec![]);
        let c = ContainerId::new();
        acl.grant(c, bob.user_id, Permission::ADMIN);
        assert!(acl.check(&bob, c, &Permission::DELETE).is_ok());

        acl.revoke(c, bob.user_id, &Permission::ADMIN);
        assert!(acl.check(&bob, c, &Permission::READ).is_err());
    }

    #[test]
    fn admins_bypass_acl() {
        let acl = InMemoryAcl::new();
        let root = Principal::new(UserId::new(), vec![Role::ADMIN]);
        assert!(acl.check(&root, ContainerId::new(), &Permission::DELETE).is_ok());

        let registered = Principal::new(UserId::new(), vec![]);
        acl.add_admin(registered.user_id);
        assert!(acl.check(&registered, ContainerId::new(), &Permission::DELETE).is_ok());
    }
}
