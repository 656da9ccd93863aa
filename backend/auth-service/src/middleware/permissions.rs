/// Authorization gates
///
/// [`RoleGate`] authorizes by role membership. [`OwnershipGate`] lets
/// privileged roles through and otherwise falls back to comparing the
/// resource's owner with the caller. Both are stateless and fail closed.
use actix_web::HttpRequest;

use crate::db::ResourceLookup;
use crate::error::{AuthError, Result};
use crate::models::{Identity, OwnedResource, Role};

/// Source of named path parameters for the ownership gate.
pub trait PathParams {
    fn param(&self, name: &str) -> Option<&str>;
}

impl PathParams for HttpRequest {
    fn param(&self, name: &str) -> Option<&str> {
        self.match_info().get(name)
    }
}

// =====================================================================
// Role Gate
// =====================================================================

#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn permit(&self, user: &Identity) -> bool {
        self.allowed.contains(&user.role)
    }

    /// [`permit`](Self::permit) as a `Result` for use with `?` in handlers.
    pub fn check(&self, user: &Identity) -> Result<()> {
        if self.permit(user) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = user.id,
                role = %user.role,
                "Role gate denied request"
            );
            Err(AuthError::InsufficientRole)
        }
    }
}

// =====================================================================
// Ownership Gate
// =====================================================================

#[derive(Debug, Clone, Copy)]
pub struct OwnershipGate {
    roles: RoleGate,
    id_param: &'static str,
}

impl OwnershipGate {
    /// `id_param` names the path parameter holding the resource id.
    pub const fn new(allowed: &'static [Role], id_param: &'static str) -> Self {
        Self {
            roles: RoleGate::new(allowed),
            id_param,
        }
    }

    /// Decide whether `user` may act on the resource addressed by `request`.
    ///
    /// Order of checks:
    /// 1. a permitted role passes without a lookup
    /// 2. a missing or non-numeric id denies
    /// 3. a resource that does not exist passes, so the handler can answer 404
    /// 4. an existing resource passes only for its owner
    ///
    /// Lookup errors are logged and deny.
    pub async fn permit<P, L>(&self, request: &P, user: &Identity, lookup: &L) -> bool
    where
        P: PathParams + ?Sized,
        L: ResourceLookup + ?Sized,
    {
        if self.roles.permit(user) {
            return true;
        }

        let Some(id) = request
            .param(self.id_param)
            .and_then(|raw| raw.parse::<i32>().ok())
        else {
            tracing::debug!(param = self.id_param, "Ownership gate found no usable id");
            return false;
        };

        match lookup.get_single(user, id).await {
            Ok(None) => true,
            Ok(Some(resource)) => resource.owner_id() == user.id,
            Err(e) => {
                tracing::warn!(resource_id = id, "Ownership lookup failed: {}", e);
                false
            }
        }
    }

    /// [`permit`](Self::permit) as a `Result` for use with `?` in handlers.
    pub async fn check<P, L>(&self, request: &P, user: &Identity, lookup: &L) -> Result<()>
    where
        P: PathParams + ?Sized,
        L: ResourceLookup + ?Sized,
    {
        if self.permit(request, user, lookup).await {
            Ok(())
        } else {
            tracing::debug!(user_id = user.id, "Ownership gate denied request");
            Err(AuthError::InsufficientRole)
        }
    }
}
