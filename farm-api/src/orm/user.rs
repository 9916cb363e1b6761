use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{
    IndustrySummary, NewUser, Role, RoleKind, User, UserChanges, UserInput, UserResponse,
};
use crate::orm::last_insert_rowid;
use crate::schema::{conversations, industries, messages, revoked_tokens, roles, users};

pub fn insert_user(conn: &mut SqliteConnection, input: UserInput) -> QueryResult<User> {
    let now = Utc::now().naive_utc();
    let new_user = NewUser {
        username: input.username,
        phone_number: input.phone_number,
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash: input.password_hash,
        role_id: input.role_id,
        industry_id: input.industry_id,
        created_by: input.created_by,
        is_superuser: input.is_superuser,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    users::table.find(id).first(conn)
}

pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table.find(user_id).first(conn).optional()
}

pub fn get_user_by_phone(conn: &mut SqliteConnection, phone: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::phone_number.eq(phone))
        .first(conn)
        .optional()
}

pub fn get_user_by_username(conn: &mut SqliteConnection, username: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::username.eq(username))
        .first(conn)
        .optional()
}

/// A user together with their role row, if any.
pub fn get_user_with_role(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> QueryResult<Option<(User, Option<Role>)>> {
    users::table
        .left_join(roles::table)
        .filter(users::id.eq(user_id))
        .select((users::all_columns, roles::all_columns.nullable()))
        .first(conn)
        .optional()
}

pub fn list_all_users(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
    users::table.order(users::id.asc()).load(conn)
}

/// Resolves role and industry for each user, preserving order.
pub fn to_responses(conn: &mut SqliteConnection, users: &[User]) -> QueryResult<Vec<UserResponse>> {
    let roles: HashMap<i32, Role> = roles::table
        .load::<Role>(conn)?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let industry_ids: Vec<i32> = users.iter().filter_map(|u| u.industry_id).collect();
    let industries: HashMap<i32, IndustrySummary> = industries::table
        .filter(industries::id.eq_any(industry_ids))
        .load::<crate::models::Industry>(conn)?
        .iter()
        .map(|i| (i.id, IndustrySummary::from(i)))
        .collect();

    Ok(users
        .iter()
        .map(|u| {
            UserResponse::new(
                u,
                u.role_id.and_then(|id| roles.get(&id).cloned()),
                u.industry_id.and_then(|id| industries.get(&id).cloned()),
            )
        })
        .collect())
}

pub fn to_response(conn: &mut SqliteConnection, user: &User) -> QueryResult<UserResponse> {
    let mut responses = to_responses(conn, std::slice::from_ref(user))?;
    responses.pop().ok_or(diesel::result::Error::NotFound)
}

pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i32,
    mut changes: UserChanges,
) -> QueryResult<User> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(users::table.find(user_id))
        .set(&changes)
        .execute(conn)?;
    users::table.find(user_id).first(conn)
}

/// Users holding `role` in one industry, by id.
pub fn list_users_with_role(
    conn: &mut SqliteConnection,
    industry_id: i32,
    role: RoleKind,
) -> QueryResult<Vec<User>> {
    users::table
        .inner_join(roles::table)
        .filter(users::industry_id.eq(industry_id))
        .filter(roles::name.eq(role))
        .select(users::all_columns)
        .order(users::id.asc())
        .load(conn)
}

/// Records the user created stay in place with `created_by` cleared.
/// Removes the user with their conversations and revoked tokens. Records
/// they created or were assigned keep existing with the reference cleared.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let conversation_ids: Vec<i32> = conversations::table
            .filter(
                conversations::participant1_id
                    .eq(user_id)
                    .or(conversations::participant2_id.eq(user_id)),
            )
            .select(conversations::id)
            .load(conn)?;
        diesel::delete(
            messages::table.filter(
                messages::conversation_id
                    .eq_any(conversation_ids.clone())
                    .or(messages::sender_id.eq(user_id)),
            ),
        )
        .execute(conn)?;
        diesel::delete(conversations::table.filter(conversations::id.eq_any(conversation_ids)))
            .execute(conn)?;
        diesel::delete(revoked_tokens::table.filter(revoked_tokens::user_id.eq(user_id)))
            .execute(conn)?;

        clear_references!(
            conn,
            user_id,
            users::created_by,
            plots::farmer_id,
            plots::created_by,
            farms::farm_owner_id,
            farms::created_by,
            tasks::assigned_to,
            tasks::created_by,
            bookings::approved_by,
            bookings::created_by,
            inventory_items::created_by,
            stocks::created_by,
            vendors::created_by,
            orders::created_by,
        );
        diesel::delete(users::table.find(user_id)).execute(conn)
    })
}

/// Number of users holding each role among `user_ids`.
pub fn count_by_role(
    conn: &mut SqliteConnection,
    user_ids: &[i32],
) -> QueryResult<HashMap<RoleKind, i64>> {
    let names: Vec<String> = users::table
        .inner_join(roles::table)
        .filter(users::id.eq_any(user_ids.to_vec()))
        .select(roles::name)
        .load(conn)?;

    let mut counts = HashMap::new();
    for kind in names.iter().filter_map(|n| n.parse::<RoleKind>().ok()) {
        *counts.entry(kind).or_insert(0) += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlotInput;
    use crate::orm::logout::{is_revoked, revoke_token};
    use crate::orm::messaging::{find_conversation, send_message};
    use crate::orm::plot::{get_plot, insert_plot};
    use crate::orm::testing::{TenantFixture, setup_plain_test_db};
    use crate::tenancy::TenantScope;
    use crate::orm::role::get_role_by_kind;
    use crate::orm::testing::setup_test_db;

    fn input(username: &str, phone: Option<&str>) -> UserInput {
        UserInput {
            username: username.to_string(),
            phone_number: phone.map(str::to_string),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: None,
            industry_id: None,
            created_by: None,
            is_superuser: false,
        }
    }

    #[test]
    fn test_insert_user() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, input("ravi", Some("9876543210"))).unwrap();
        assert_eq!(user.username, "ravi");
        assert!(user.is_active);
        assert!(!user.is_superuser);

        let by_phone = get_user_by_phone(&mut conn, "9876543210").unwrap();
        assert_eq!(by_phone.map(|u| u.id), Some(user.id));
    }

    #[test]
    fn phone_numbers_are_unique() {
        let mut conn = setup_test_db();
        insert_user(&mut conn, input("first", Some("9876543210"))).unwrap();
        assert!(insert_user(&mut conn, input("second", Some("9876543210"))).is_err());
        // Users without a phone number do not collide.
        insert_user(&mut conn, input("third", None)).unwrap();
        insert_user(&mut conn, input("fourth", None)).unwrap();
    }

    #[test]
    fn user_with_role_and_response() {
        let mut conn = setup_test_db();
        let role = get_role_by_kind(&mut conn, RoleKind::Farmer).unwrap();
        let user = insert_user(
            &mut conn,
            UserInput {
                role_id: Some(role.id),
                ..input("asha", None)
            },
        )
        .unwrap();

        let (loaded, loaded_role) = get_user_with_role(&mut conn, user.id).unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded_role.and_then(|r| r.kind()), Some(RoleKind::Farmer));

        let response = to_response(&mut conn, &user).unwrap();
        assert_eq!(response.role.map(|r| r.name), Some("farmer".to_string()));
        assert!(response.industry.is_none());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn update_and_delete_user() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, input("meera", None)).unwrap();
        let updated = update_user(
            &mut conn,
            user.id,
            UserChanges {
                first_name: Some("Meera".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.first_name, "Meera");
        assert!(!updated.is_active);

        assert_eq!(delete_user(&mut conn, user.id).unwrap(), 1);
        assert!(get_user(&mut conn, user.id).unwrap().is_none());
    }

    #[test]
    fn delete_cleans_up_after_the_user() {
        let mut conn = setup_plain_test_db();
        let f = TenantFixture::create(&mut conn);
        let officer = f.actor(&mut conn, f.fo_a1.id);
        let plot = insert_plot(
            &mut conn,
            PlotInput {
                gat_number: "44".to_string(),
                plot_number: String::new(),
                village: String::new(),
                taluka: String::new(),
                district: String::new(),
                state: String::new(),
                country: "India".to_string(),
                pin_code: String::new(),
                latitude: None,
                longitude: None,
                boundary: None,
                farmer_id: Some(f.farmer_a1.id),
            },
            officer.stamp(None),
        )
        .unwrap();
        send_message(&mut conn, f.fo_a1.id, f.farmer_a1.id, "Water the field".to_string())
            .unwrap();
        send_message(&mut conn, f.manager_a1.id, f.farmer_a2.id, "Hello".to_string()).unwrap();
        let expiry = (Utc::now() + chrono::Duration::days(1)).naive_utc();
        revoke_token(&mut conn, "gone-jti", f.fo_a1.id, expiry).unwrap();

        assert_eq!(delete_user(&mut conn, f.fo_a1.id).unwrap(), 1);

        assert!(get_user(&mut conn, f.fo_a1.id).unwrap().is_none());
        assert_eq!(get_user(&mut conn, f.farmer_a1.id).unwrap().unwrap().created_by, None);
        assert!(find_conversation(&mut conn, f.fo_a1.id, f.farmer_a1.id).unwrap().is_none());
        assert!(find_conversation(&mut conn, f.manager_a1.id, f.farmer_a2.id).unwrap().is_some());
        assert_eq!(messages::table.count().get_result::<i64>(&mut conn).unwrap(), 1);
        assert!(!is_revoked(&mut conn, "gone-jti").unwrap());

        let plot = get_plot(&mut conn, plot.id, &TenantScope::Unrestricted).unwrap().unwrap();
        assert_eq!(plot.created_by, None);
        assert_eq!(plot.farmer_id, Some(f.farmer_a1.id));
    }
}
