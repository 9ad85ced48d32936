/*!
 * # Permissions Module
 *
 * Permission strings are derived from the flags of a user's access level
 * when a token is issued. Route groups require one permission each.
 */

use crate::entities::access_level;

/// Common permission string constants for compile-time safety
pub mod consts {
    /// Granted by the `sys_admin` flag; implies every other permission.
    pub const ADMIN_SYSTEM: &str = "admin:system";
    pub const USERS_MANAGE: &str = "users:manage";
    pub const STOCK_MANAGE: &str = "stock:manage";
    pub const ORDERS_MANAGE: &str = "orders:manage";
    pub const REPORTS_READ: &str = "reports:read";
    pub const DASHBOARD_READ: &str = "dashboard:read";
}

/// Permission strings granted by an access level.
pub fn permissions_for(level: &access_level::Model) -> Vec<String> {
    let flags = [
        (level.sys_admin, consts::ADMIN_SYSTEM),
        (level.user_mgr, consts::USERS_MANAGE),
        (level.stock_mgr, consts::STOCK_MANAGE),
        (level.order_mgr, consts::ORDERS_MANAGE),
        (level.report, consts::REPORTS_READ),
        (level.dashboard, consts::DASHBOARD_READ),
    ];
    flags
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, permission)| permission.to_string())
        .collect()
}

/// Check if a permission is implied by another permission
pub fn is_permission_implied(user_perm: &str, required_perm: &str) -> bool {
    if user_perm == required_perm || user_perm == consts::ADMIN_SYSTEM || user_perm == "*" {
        return true;
    }

    // resource:* covers every action on the resource
    match (user_perm.split_once(':'), required_perm.split_once(':')) {
        (Some((user_resource, "*")), Some((required_resource, _))) => {
            user_resource == required_resource
        }
        _ => false,
    }
}
