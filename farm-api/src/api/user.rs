//! User management endpoints.
//!
//! Every lookup goes through the accessible-users resolver: a caller sees
//! themselves plus the users below them in the creation hierarchy, and any
//! other id answers 404.
//!
//! # Creation rules
//!
//! | creator       | may create              | default when no role given |
//! |---------------|-------------------------|----------------------------|
//! | Global Admin  | any role                | required                   |
//! | owner         | owner, manager          | required                   |
//! | manager       | field officer, owner    | field officer              |
//! | field officer | farmer                  | farmer                     |
//!
//! The new user joins the creator's industry. A Global Admin may name an
//! industry instead, and must when they have none.

use diesel::prelude::*;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth_guards::{AuthenticatedUser, OwnerUser};
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{
    Booking, Farm, Industry, InventoryItemWithStatus, OrderWithItems, Plot, RoleKind, Stock, Task,
    UserChanges, UserInput, UserResponse, Vendor,
};
use crate::orm::DbConn;
use crate::orm::industry::get_industry;
use crate::orm::login::{hash_password, verify_password};
use crate::orm::role::get_role_by_kind;
use crate::orm::user::{
    count_by_role, delete_user, get_user, insert_user, list_users_with_role, to_response,
    to_responses, update_user,
};
use crate::orm::{booking, farm, inventory, order, plot, stock, task, vendor};
use crate::tenancy::{AccessibleUsers, Actor, TenantScope, get_accessible_users};
use crate::validation::{FieldErrors, normalize_phone, require_non_blank};

const PHONE_FORMAT: &str = "Phone number must be exactly 10 digits (or 12 digits with +91).";

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
    /// Role name in any common spelling, e.g. `Field Officer`.
    pub role: Option<String>,
    pub role_id: Option<i32>,
    pub industry_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HierarchySummary {
    /// `global_admin`, a role name, or `unknown`.
    pub role: String,
    pub owners: i64,
    pub managers: i64,
    pub field_officers: i64,
    pub farmers: i64,
    pub total_users: i64,
}

/// Everything recorded under one industry.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct IndustryData {
    pub industry: Industry,
    pub owners: Vec<UserResponse>,
    pub managers: Vec<UserResponse>,
    pub field_officers: Vec<UserResponse>,
    pub farmers: Vec<UserResponse>,
    pub plots: Vec<Plot>,
    pub farms: Vec<Farm>,
    pub tasks: Vec<Task>,
    pub bookings: Vec<Booking>,
    pub inventory_items: Vec<InventoryItemWithStatus>,
    pub stock: Vec<Stock>,
    pub vendors: Vec<Vendor>,
    pub orders: Vec<OrderWithItems>,
}

/// Roles `creator` may hand out.
pub fn creatable_roles(creator: &Actor) -> &'static [RoleKind] {
    if creator.is_superuser {
        return &RoleKind::ALL;
    }
    match creator.role {
        Some(RoleKind::Owner) => &[RoleKind::Owner, RoleKind::Manager],
        Some(RoleKind::Manager) => &[RoleKind::FieldOfficer, RoleKind::Owner],
        Some(RoleKind::FieldOfficer) => &[RoleKind::Farmer],
        Some(RoleKind::Farmer) | None => &[],
    }
}

fn default_role(creator: &Actor) -> Option<RoleKind> {
    match creator.role {
        _ if creator.is_superuser => None,
        Some(RoleKind::Manager) => Some(RoleKind::FieldOfficer),
        Some(RoleKind::FieldOfficer) => Some(RoleKind::Farmer),
        _ => None,
    }
}

/// Role named by the request, by name or by seeded id.
fn requested_role(
    conn: &mut SqliteConnection,
    request: &CreateUserRequest,
) -> ApiResult<Option<RoleKind>> {
    if let Some(name) = request.role.as_deref().filter(|n| !n.trim().is_empty()) {
        return RoleKind::from_loose(name)
            .map(Some)
            .ok_or_else(|| ApiError::invalid("role", format!("Unknown role '{}'.", name)));
    }
    let Some(role_id) = request.role_id else {
        return Ok(None);
    };
    crate::orm::role::get_role(conn, role_id)?
        .and_then(|r| r.kind())
        .map(Some)
        .ok_or_else(|| ApiError::invalid("role_id", format!("Role with ID {} does not exist.", role_id)))
}

/// Fills in the derived parts of a new user and checks the creation rules.
fn build_user_input(
    conn: &mut SqliteConnection,
    creator: &Actor,
    request: CreateUserRequest,
) -> ApiResult<UserInput> {
    let allowed = creatable_roles(creator);
    if allowed.is_empty() {
        return Err(ApiError::forbidden("You do not have permission to create users."));
    }

    let role = match requested_role(conn, &request)?.or_else(|| default_role(creator)) {
        Some(role) => role,
        None => {
            return Err(ApiError::invalid(
                "role_id",
                "This field is required. Please specify the role for the user you want to create.",
            ));
        }
    };
    if !allowed.contains(&role) {
        return Err(ApiError::forbidden(format!(
            "You cannot create users with the {} role.",
            role.display_name()
        )));
    }

    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "password", &request.password);

    let phone_number = match request.phone_number.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match normalize_phone(raw) {
            Some(phone) => Some(phone),
            None => {
                errors.add("phone_number", PHONE_FORMAT);
                None
            }
        },
    };

    let industry_id = if creator.is_superuser {
        request.industry_id.or(creator.industry_id)
    } else {
        creator.industry_id
    };
    match industry_id {
        None => errors.add(
            "industry_id",
            "Industry is required. The creator has no industry to inherit.",
        ),
        Some(id) if get_industry(conn, id)?.is_none() => {
            errors.add("industry_id", format!("Industry with ID {} does not exist.", id))
        }
        Some(_) => {}
    }

    let username = match request.username.map(|u| u.trim().to_string()) {
        Some(username) if !username.is_empty() => username,
        _ => match (&phone_number, request.email.split('@').next()) {
            (Some(phone), _) => format!("user_{}", phone),
            (None, Some(local)) if !local.is_empty() => local.to_string(),
            _ => {
                errors.add("username", "Provide a username, phone number or email.");
                String::new()
            }
        },
    };

    errors.into_result()?;

    let role_row = get_role_by_kind(conn, role)?;
    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

    Ok(UserInput {
        username,
        phone_number,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        password_hash,
        role_id: Some(role_row.id),
        industry_id,
        created_by: Some(creator.id),
        is_superuser: false,
    })
}

fn can_view(conn: &mut SqliteConnection, actor: &Actor, user_id: i32) -> QueryResult<bool> {
    if user_id == actor.id {
        return Ok(true);
    }
    Ok(AccessibleUsers::resolve(conn, actor)?.contains(user_id))
}

/// List Users endpoint.
///
/// - **URL:** `/api/users?role=<role>&industry_id=<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Returns the users the caller may access. `role` accepts `Field Officer`,
/// `field_officer` and `fieldofficer` alike.
#[get("/users?<role>&<industry_id>")]
pub async fn list_users(
    auth: AuthenticatedUser,
    db: DbConn,
    role: Option<String>,
    industry_id: Option<i32>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let role = match role.as_deref() {
        None | Some("") => None,
        Some(name) => Some(
            RoleKind::from_loose(name)
                .ok_or_else(|| ApiError::invalid("role", format!("Unknown role '{}'.", name)))?,
        ),
    };
    let actor = auth.actor();

    db.run(move |conn| -> ApiResult<_> {
        let mut users = get_accessible_users(conn, &actor)?;
        if let Some(industry_id) = industry_id {
            users.retain(|u| u.industry_id == Some(industry_id));
        }
        let mut responses = to_responses(conn, &users)?;
        if let Some(role) = role {
            responses.retain(|u| u.role.as_ref().and_then(|r| r.kind()) == Some(role));
        }
        Ok(Json(responses))
    })
    .await
}

/// Create User endpoint.
///
/// - **URL:** `/api/users`
/// - **Method:** `POST`
/// - **Authentication:** Required (Global Admin, owner, manager or field officer)
///
/// ```json
/// {"phone_number": "9876543210", "password": "secret", "first_name": "Asha", "role": "farmer"}
/// ```
#[post("/users", data = "<request>")]
pub async fn create_user(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<CreateUserRequest>,
) -> ApiResult<status::Created<Json<UserResponse>>> {
    let creator = auth.actor();
    let request = request.into_inner();

    let created = db
        .run(move |conn| -> ApiResult<UserResponse> {
            conn.transaction(|conn| {
                let input = build_user_input(conn, &creator, request)?;
                let user = insert_user(conn, input)?;
                Ok(to_response(conn, &user)?)
            })
        })
        .await?;

    info!(
        "User {} created user {} ({:?})",
        auth.user.id,
        created.id,
        created.role.as_ref().map(|r| r.name.as_str())
    );
    let location = format!("/api/users/{}", created.id);
    Ok(status::Created::new(location).body(Json(created)))
}

#[get("/users/me")]
pub async fn get_me(auth: AuthenticatedUser, db: DbConn) -> ApiResult<Json<UserResponse>> {
    let user = auth.user;
    Ok(Json(db.run(move |conn| to_response(conn, &user)).await?))
}

#[post("/users/me/password", data = "<request>")]
pub async fn change_password(
    auth: AuthenticatedUser,
    db: DbConn,
    request: LoggedJson<ChangePasswordRequest>,
) -> ApiResult<Json<crate::api::login::DetailResponse>> {
    let request = request.into_inner();
    if !verify_password(&request.old_password, &auth.user.password_hash) {
        return Err(ApiError::invalid("old_password", "Wrong password."));
    }
    let mut errors = FieldErrors::new();
    require_non_blank(&mut errors, "new_password", &request.new_password);
    errors.into_result()?;

    let password_hash = hash_password(&request.new_password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;
    let user_id = auth.user.id;
    db.run(move |conn| {
        update_user(
            conn,
            user_id,
            UserChanges {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
    })
    .await?;

    Ok(Json(crate::api::login::DetailResponse {
        detail: "Password changed.".to_string(),
    }))
}

#[get("/users/<user_id>")]
pub async fn get_user_by_id(
    auth: AuthenticatedUser,
    db: DbConn,
    user_id: i32,
) -> ApiResult<Json<UserResponse>> {
    let actor = auth.actor();
    db.run(move |conn| -> ApiResult<_> {
        if !can_view(conn, &actor, user_id)? {
            return Err(ApiError::not_found("User"));
        }
        let user = get_user(conn, user_id)?.ok_or_else(|| ApiError::not_found("User"))?;
        Ok(Json(to_response(conn, &user)?))
    })
    .await
}

#[put("/users/<user_id>", data = "<request>")]
pub async fn update_user_by_id(
    auth: AuthenticatedUser,
    db: DbConn,
    user_id: i32,
    request: LoggedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let actor = auth.actor();
    let request = request.into_inner();

    let mut errors = FieldErrors::new();
    let phone_number = match request.phone_number.as_deref() {
        None => None,
        Some(raw) => {
            let normalized = normalize_phone(raw);
            if normalized.is_none() {
                errors.add("phone_number", PHONE_FORMAT);
            }
            normalized
        }
    };
    if let Some(username) = &request.username {
        require_non_blank(&mut errors, "username", username);
    }
    if request.is_active.is_some() && user_id == actor.id {
        errors.add("is_active", "You cannot change your own active status.");
    }
    errors.into_result()?;

    let changes = UserChanges {
        username: request.username,
        phone_number,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        is_active: request.is_active,
        ..Default::default()
    };

    db.run(move |conn| -> ApiResult<_> {
        if !can_view(conn, &actor, user_id)? || get_user(conn, user_id)?.is_none() {
            return Err(ApiError::not_found("User"));
        }
        let user = update_user(conn, user_id, changes)?;
        Ok(Json(to_response(conn, &user)?))
    })
    .await
}

/// Delete User endpoint.
///
/// Callers may delete users below them in the hierarchy, never themselves.
#[delete("/users/<user_id>")]
pub async fn delete_user_by_id(
    auth: AuthenticatedUser,
    db: DbConn,
    user_id: i32,
) -> ApiResult<status::NoContent> {
    let actor = auth.actor();
    if user_id == actor.id {
        return Err(ApiError::forbidden("You cannot delete your own account."));
    }
    db.run(move |conn| -> ApiResult<_> {
        if !AccessibleUsers::resolve(conn, &actor)?.contains(user_id) {
            return Err(ApiError::not_found("User"));
        }
        match delete_user(conn, user_id)? {
            0 => Err(ApiError::not_found("User")),
            _ => Ok(status::NoContent),
        }
    })
    .await
}

/// Head counts of the users below the caller.
#[get("/users/hierarchy-summary")]
pub async fn hierarchy_summary(
    auth: AuthenticatedUser,
    db: DbConn,
) -> ApiResult<Json<HierarchySummary>> {
    let actor = auth.actor();
    let role = if actor.is_superuser {
        "global_admin".to_string()
    } else {
        actor.role.map_or_else(|| "unknown".to_string(), |r| r.to_string())
    };

    db.run(move |conn| -> ApiResult<_> {
        let visible: Vec<i32> = get_accessible_users(conn, &actor)?
            .into_iter()
            .filter(|u| u.id != actor.id)
            .map(|u| u.id)
            .collect();
        let counts = count_by_role(conn, &visible)?;
        let count = |kind: RoleKind| counts.get(&kind).copied().unwrap_or(0);
        Ok(Json(HierarchySummary {
            role,
            owners: count(RoleKind::Owner),
            managers: count(RoleKind::Manager),
            field_officers: count(RoleKind::FieldOfficer),
            farmers: count(RoleKind::Farmer),
            total_users: visible.len() as i64,
        }))
    })
    .await
}

/// Industry dashboard.
///
/// - **URL:** `/api/users/industry-data?industry_id=<id>`
/// - **Method:** `GET`
/// - **Authorization:** Global Admin (any industry) or owner (own industry)
#[get("/users/industry-data?<industry_id>")]
pub async fn industry_data(
    auth: OwnerUser,
    db: DbConn,
    industry_id: Option<i32>,
) -> ApiResult<Json<IndustryData>> {
    let Some(industry_id) = industry_id else {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "industry_id query parameter is required",
        ));
    };
    let actor = auth.actor();

    db.run(move |conn| -> ApiResult<_> {
        let industry = get_industry(conn, industry_id)?.ok_or_else(|| ApiError::not_found("Industry"))?;
        if !actor.is_superuser && actor.industry_id != Some(industry_id) {
            return Err(ApiError::forbidden(
                "You can only access data for your own industry.",
            ));
        }

        let mut by_role = |kind| -> QueryResult<Vec<UserResponse>> {
            let users = list_users_with_role(conn, industry_id, kind)?;
            to_responses(conn, &users)
        };
        let owners = by_role(RoleKind::Owner)?;
        let managers = by_role(RoleKind::Manager)?;
        let field_officers = by_role(RoleKind::FieldOfficer)?;
        let farmers = by_role(RoleKind::Farmer)?;

        let scope = TenantScope::Industry(industry_id);
        Ok(Json(IndustryData {
            industry,
            owners,
            managers,
            field_officers,
            farmers,
            plots: plot::list_plots(conn, &scope)?,
            farms: farm::list_farms(conn, &scope)?,
            tasks: task::list_tasks(conn, &scope)?,
            bookings: booking::list_bookings(conn, &scope, None)?,
            inventory_items: inventory::list_items(conn, &scope, None)?
                .into_iter()
                .map(InventoryItemWithStatus::from)
                .collect(),
            stock: stock::list_stock(conn, &scope, None)?,
            vendors: vendor::list_vendors(conn, &scope)?,
            orders: order::list_orders(conn, &scope, None)?,
        }))
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        list_users,
        create_user,
        get_me,
        change_password,
        get_user_by_id,
        update_user_by_id,
        delete_user_by_id,
        hierarchy_summary,
        industry_data
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{TenantFixture, setup_test_db};

    fn request(role: Option<&str>, phone: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            password: "secret".to_string(),
            phone_number: phone.map(str::to_string),
            role: role.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn creation_matrix() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let admin = f.actor(&mut conn, f.superadmin.id);
        let owner = f.actor(&mut conn, f.owner_a.id);
        let manager = f.actor(&mut conn, f.manager_a1.id);
        let officer = f.actor(&mut conn, f.fo_a1.id);
        let farmer = f.actor(&mut conn, f.farmer_a1.id);

        assert_eq!(creatable_roles(&admin).len(), 4);
        assert!(creatable_roles(&owner).contains(&RoleKind::Manager));
        assert!(!creatable_roles(&owner).contains(&RoleKind::Farmer));
        assert_eq!(creatable_roles(&officer), &[RoleKind::Farmer]);
        assert!(creatable_roles(&farmer).is_empty());

        assert_eq!(default_role(&manager), Some(RoleKind::FieldOfficer));
        assert_eq!(default_role(&officer), Some(RoleKind::Farmer));
        assert_eq!(default_role(&owner), None);
    }

    #[test]
    fn field_officer_creates_a_farmer_in_their_industry() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let officer = f.actor(&mut conn, f.fo_a1.id);

        let input = build_user_input(&mut conn, &officer, request(None, Some("+91 98765 43210"))).unwrap();
        assert_eq!(input.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(input.username, "user_9876543210");
        assert_eq!(input.industry_id, Some(f.industry_a.id));
        assert_eq!(input.created_by, Some(f.fo_a1.id));
        let farmer_role = get_role_by_kind(&mut conn, RoleKind::Farmer).unwrap();
        assert_eq!(input.role_id, Some(farmer_role.id));
    }

    #[test]
    fn creation_rules_are_enforced() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let officer = f.actor(&mut conn, f.fo_a1.id);
        let farmer = f.actor(&mut conn, f.farmer_a1.id);
        let owner = f.actor(&mut conn, f.owner_a.id);
        let admin = f.actor(&mut conn, f.superadmin.id);

        let err = build_user_input(&mut conn, &officer, request(Some("manager"), None)).unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");

        let err = build_user_input(&mut conn, &farmer, request(Some("farmer"), None)).unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");

        let err = build_user_input(&mut conn, &owner, request(None, None)).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = build_user_input(&mut conn, &officer, request(None, Some("12345"))).unwrap_err();
        assert_eq!(err.to_json()["errors"]["phone_number"][0], PHONE_FORMAT);

        // A Global Admin without an industry must name one.
        let err = build_user_input(&mut conn, &admin, request(Some("owner"), Some("9123456789"))).unwrap_err();
        assert!(err.to_json()["errors"]["industry_id"].is_array());

        let input = build_user_input(
            &mut conn,
            &admin,
            CreateUserRequest {
                industry_id: Some(f.industry_b.id),
                ..request(Some("Owner"), Some("9123456789"))
            },
        )
        .unwrap();
        assert_eq!(input.industry_id, Some(f.industry_b.id));
    }
}
