//! Test support: in-memory databases, a seeded tenant fixture and a
//! ready-to-launch Rocket instance.

use std::sync::Mutex;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use uuid::Uuid;

use super::db::{DbConn, DbRunner, run_pending_migrations, set_foreign_keys};
use crate::admin_init_fairing::{SUPERADMIN_USERNAME, admin_init_fairing};
use crate::models::{Industry, IndustryInput, RoleKind, User, UserInput};
use crate::orm::industry::{get_industry_by_name, insert_industry};
use crate::orm::login::hash_password;
use crate::orm::role::get_role_by_kind;
use crate::orm::user::{get_user_by_username, get_user_with_role, insert_user};
use crate::tenancy::Actor;

/// Password of every fixture user except the superadmin.
pub const TEST_PASSWORD: &str = "password123";

/// Login phone numbers of the fixture users.
pub mod phones {
    pub const SUPERADMIN: &str = "9999999999";
    pub const OWNER_A: &str = "9000000001";
    pub const MANAGER_A1: &str = "9000000002";
    pub const MANAGER_A2: &str = "9000000003";
    pub const FO_A1: &str = "9000000004";
    pub const FO_A2: &str = "9000000005";
    pub const FARMER_A1: &str = "9000000006";
    pub const FARMER_A2: &str = "9000000007";
    pub const OWNER_B: &str = "9000000008";
    pub const MANAGER_B: &str = "9000000009";
    pub const DRIFTER: &str = "9000000010";
    pub const INACTIVE: &str = "9000000011";
}

/// Two industries and a complete creation hierarchy in industry A.
///
/// ```text
/// industry A: owner_a
///             manager_a1 -> fo_a1 -> farmer_a1, inactive
///             manager_a2 -> fo_a2 -> farmer_a2
/// industry B: owner_b -> manager_b
/// no industry: drifter (farmer)
/// ```
///
/// Users are created in field order so their ids ascend.
#[derive(Debug, Clone)]
pub struct TenantFixture {
    pub industry_a: Industry,
    pub industry_b: Industry,
    pub superadmin: User,
    pub owner_a: User,
    pub manager_a1: User,
    pub manager_a2: User,
    pub fo_a1: User,
    pub fo_a2: User,
    pub farmer_a1: User,
    pub farmer_a2: User,
    pub owner_b: User,
    pub manager_b: User,
    pub drifter: User,
    pub inactive: User,
}

impl TenantFixture {
    pub fn create(conn: &mut SqliteConnection) -> Self {
        Self::try_create(conn).expect("create tenant fixture")
    }

    pub fn try_create(conn: &mut SqliteConnection) -> QueryResult<Self> {
        let industry_a = find_or_create_industry(conn, "Green Valley Farms")?;
        let industry_b = find_or_create_industry(conn, "Sunrise Agro")?;

        let superadmin = match get_user_by_username(conn, SUPERADMIN_USERNAME)? {
            Some(user) => user,
            None => {
                let admin_hash = hash_password("admin").expect("hash admin password");
                insert_user(
                    conn,
                    UserInput {
                        is_superuser: true,
                        ..user_input(SUPERADMIN_USERNAME, phones::SUPERADMIN, &admin_hash)
                    },
                )?
            }
        };

        let hash = hash_password(TEST_PASSWORD).expect("hash test password");
        let make = |conn: &mut SqliteConnection,
                        username: &str,
                        phone: &str,
                        role: RoleKind,
                        industry: Option<&Industry>,
                        creator: Option<&User>|
         -> QueryResult<User> {
            let role = get_role_by_kind(conn, role)?;
            insert_user(
                conn,
                UserInput {
                    role_id: Some(role.id),
                    industry_id: industry.map(|i| i.id),
                    created_by: creator.map(|u| u.id),
                    ..user_input(username, phone, &hash)
                },
            )
        };

        let a = Some(&industry_a);
        let b = Some(&industry_b);
        let owner_a = make(conn, "owner_a", phones::OWNER_A, RoleKind::Owner, a, None)?;
        let manager_a1 = make(conn, "manager_a1", phones::MANAGER_A1, RoleKind::Manager, a, Some(&owner_a))?;
        let manager_a2 = make(conn, "manager_a2", phones::MANAGER_A2, RoleKind::Manager, a, Some(&owner_a))?;
        let fo_a1 = make(conn, "fo_a1", phones::FO_A1, RoleKind::FieldOfficer, a, Some(&manager_a1))?;
        let fo_a2 = make(conn, "fo_a2", phones::FO_A2, RoleKind::FieldOfficer, a, Some(&manager_a2))?;
        let farmer_a1 = make(conn, "farmer_a1", phones::FARMER_A1, RoleKind::Farmer, a, Some(&fo_a1))?;
        let farmer_a2 = make(conn, "farmer_a2", phones::FARMER_A2, RoleKind::Farmer, a, Some(&fo_a2))?;
        let owner_b = make(conn, "owner_b", phones::OWNER_B, RoleKind::Owner, b, None)?;
        let manager_b = make(conn, "manager_b", phones::MANAGER_B, RoleKind::Manager, b, Some(&owner_b))?;
        let drifter = make(conn, "drifter", phones::DRIFTER, RoleKind::Farmer, None, None)?;
        let inactive = make(conn, "inactive", phones::INACTIVE, RoleKind::Farmer, a, Some(&fo_a1))?;

        use crate::schema::users;
        diesel::update(users::table.find(inactive.id))
            .set(users::is_active.eq(false))
            .execute(conn)?;
        let inactive = users::table.find(inactive.id).first(conn)?;

        Ok(TenantFixture {
            industry_a,
            industry_b,
            superadmin,
            owner_a,
            manager_a1,
            manager_a2,
            fo_a1,
            fo_a2,
            farmer_a1,
            farmer_a2,
            owner_b,
            manager_b,
            drifter,
            inactive,
        })
    }

    /// The scoping identity of a fixture user, role loaded from the database.
    pub fn actor(&self, conn: &mut SqliteConnection, user_id: i32) -> Actor {
        let (user, role) = get_user_with_role(conn, user_id)
            .expect("load fixture user")
            .expect("fixture user exists");
        Actor::new(&user, role.as_ref())
    }

    pub fn everyone(&self) -> Vec<User> {
        vec![
            self.superadmin.clone(),
            self.owner_a.clone(),
            self.manager_a1.clone(),
            self.manager_a2.clone(),
            self.fo_a1.clone(),
            self.fo_a2.clone(),
            self.farmer_a1.clone(),
            self.farmer_a2.clone(),
            self.owner_b.clone(),
            self.manager_b.clone(),
            self.drifter.clone(),
            self.inactive.clone(),
        ]
    }
}

fn user_input(username: &str, phone: &str, password_hash: &str) -> UserInput {
    UserInput {
        username: username.to_string(),
        phone_number: Some(phone.to_string()),
        email: format!("{}@example.com", username),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: password_hash.to_string(),
        role_id: None,
        industry_id: None,
        created_by: None,
        is_superuser: false,
    }
}

fn find_or_create_industry(conn: &mut SqliteConnection, name: &str) -> QueryResult<Industry> {
    match get_industry_by_name(conn, name)? {
        Some(industry) => Ok(industry),
        None => insert_industry(
            conn,
            IndustryInput {
                name: name.to_string(),
                description: None,
            },
        ),
    }
}

/// Trades durability for speed. Tests only.
fn set_sqlite_test_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test pragmas");
        conn.run(set_sqlite_test_pragmas)
            .await
            .expect("set test pragmas");
        rocket
    })
}

/// Seeds [`TenantFixture`] into the Rocket database.
fn test_data_init_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Data Initialization", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test data initialization");
        conn.run(|c| match TenantFixture::try_create(c) {
            Ok(_) => info!("[test-data-init] Tenant fixture created"),
            Err(e) => error!("[test-data-init] Failed to create tenant fixture: {:?}", e),
        })
        .await;
        rocket
    })
}

/// A Rocket instance on a fresh shared in-memory database, migrated and
/// seeded with [`TenantFixture`], with every API route mounted.
pub fn test_rocket() -> Rocket<Build> {
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge(("auth.jwt_secret", "integration-test-secret"))
        .merge(("log_level", "critical"));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(crate::config::auth_config_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing());

    crate::register_catchers(crate::mount_api_routes(rocket))
}

/// A migrated in-memory database with foreign keys enforced.
pub fn setup_test_db() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("enable foreign keys");
    run_pending_migrations(&mut conn).expect("run migrations");
    conn
}

/// A migrated in-memory database that leaves SQLite's foreign key
/// enforcement off, as on a freshly pooled connection.
pub fn setup_plain_test_db() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    run_pending_migrations(&mut conn).expect("run migrations");
    conn
}

/// Lets async ORM helpers written against [`DbRunner`] run on a plain test
/// connection.
pub struct FakeDbConn<'a>(Mutex<&'a mut SqliteConnection>);

impl<'a> FakeDbConn<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        FakeDbConn(Mutex::new(conn))
    }
}

impl DbRunner for FakeDbConn<'_> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let result = {
            let mut guard = self.0.lock().expect("test connection lock");
            f(&mut **guard)
        };
        std::future::ready(result)
    }
}

pub fn setup_test_dbconn(conn: &mut SqliteConnection) -> FakeDbConn<'_> {
    FakeDbConn::new(conn)
}
