use dispatchdesk_application::{RouteRequirementTable, RouteRequirements};

/// Declares the authorization requirements of every API operation.
///
/// Operations are keyed by `"METHOD /path/template"` using the router's path
/// templates. Operations missing from the table are unguarded.
pub fn route_requirement_table() -> RouteRequirementTable {
    RouteRequirementTable::new()
        .declare("GET /health", RouteRequirements::none())
        .declare("GET /api/me/permissions", RouteRequirements::none())
        .declare(
            "GET /api/security/permission-catalog",
            RouteRequirements::permissions(["settings.roles"]),
        )
        .declare(
            "GET /api/security/roles",
            RouteRequirements::permissions(["settings.roles"]),
        )
        .declare(
            "POST /api/security/roles",
            RouteRequirements::permissions(["settings.roles.create"]),
        )
        .declare(
            "GET /api/security/roles/{role_id}",
            RouteRequirements::permissions(["settings.roles"]),
        )
        .declare(
            "PUT /api/security/roles/{role_id}",
            RouteRequirements::permissions(["settings.roles.edit"]),
        )
        .declare(
            "DELETE /api/security/roles/{role_id}",
            RouteRequirements::permissions(["settings.roles.delete"]),
        )
        .declare(
            "PUT /api/security/roles/{role_id}/permissions",
            RouteRequirements::permissions(["settings.roles.edit"]),
        )
        .declare(
            "PUT /api/security/users/{user_id}/role",
            RouteRequirements::permissions(["settings.users.changeRole"]).with_roles(["ADMIN"]),
        )
        .declare(
            "POST /api/security/permission-cache/invalidate",
            RouteRequirements::roles(["ADMIN"]),
        )
}
