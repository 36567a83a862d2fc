//! Ownership policy shared by resource services.
//!
//! A mutation on an owned resource (a review, a user's own record) is
//! permitted to the owner and to admins, nobody else. The check runs after
//! the resource has been loaded, so a missing resource surfaces as not-found
//! rather than as a denial.

use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;

/// Authenticated identity attached to a request by the access-control
/// middleware and passed explicitly through the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityContext {
    pub id: UserId,
    pub role: Role,
}

impl IdentityContext {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Whether `actor` may mutate a resource owned by `owner_id`.
pub fn can_mutate(actor: &IdentityContext, owner_id: &UserId) -> bool {
    actor.id == *owner_id || actor.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_mutate() {
        let owner = UserId::new();
        let actor = IdentityContext::new(owner, Role::NormalUser);

        assert!(can_mutate(&actor, &owner));
    }

    #[test]
    fn test_non_owner_cannot_mutate() {
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);

        assert!(!can_mutate(&actor, &UserId::new()));
    }

    #[test]
    fn test_admin_can_mutate_regardless_of_ownership() {
        let actor = IdentityContext::new(UserId::new(), Role::Admin);

        assert!(can_mutate(&actor, &UserId::new()));
    }
}
