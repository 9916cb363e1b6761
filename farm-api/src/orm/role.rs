use diesel::prelude::*;

use crate::models::{Role, RoleKind};
use crate::schema::roles;

/// Roles are seeded by the first migration, so a missing row is a broken
/// database rather than a user error.
pub fn get_role_by_kind(conn: &mut SqliteConnection, kind: RoleKind) -> QueryResult<Role> {
    roles::table.filter(roles::name.eq(kind)).first(conn)
}

pub fn get_role(conn: &mut SqliteConnection, role_id: i32) -> QueryResult<Option<Role>> {
    roles::table.find(role_id).first(conn).optional()
}

pub fn list_roles(conn: &mut SqliteConnection) -> QueryResult<Vec<Role>> {
    roles::table.order(roles::id.asc()).load(conn)
}
