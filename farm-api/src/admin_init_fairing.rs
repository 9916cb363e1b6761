use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::fairing::AdHoc;

use crate::models::{User, UserInput};
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::user::{get_user_by_username, insert_user};
use crate::validation::normalize_phone;

pub const SUPERADMIN_USERNAME: &str = "superadmin";

/// Creates the Global Admin account on first start.
///
/// The login phone and password come from FARM_DEFAULT_PHONE and
/// FARM_DEFAULT_PASSWORD. An existing `superadmin` account is left untouched.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        dotenv().ok();

        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("[admin-init] ERROR: Could not get DB connection.");
            return Err(rocket);
        };

        let phone = get_admin_phone();
        let password = get_admin_password();
        match conn
            .run(move |c| create_admin_user_if_needed(c, &phone, &password))
            .await
        {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: Admin user creation failed: {}", e);
                Err(rocket)
            }
        }
    })
}

fn get_admin_phone() -> String {
    let raw = std::env::var("FARM_DEFAULT_PHONE").unwrap_or_else(|_| "9999999999".to_string());
    match normalize_phone(&raw) {
        Some(phone) => phone,
        None => {
            warn!("[admin-init] FARM_DEFAULT_PHONE '{}' is not a 10-digit number; using it as is", raw);
            raw
        }
    }
}

fn get_admin_password() -> String {
    std::env::var("FARM_DEFAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string())
}

fn create_admin_user_if_needed(
    c: &mut SqliteConnection,
    phone: &str,
    password: &str,
) -> Result<(), String> {
    if let Some(existing) = get_user_by_username(c, SUPERADMIN_USERNAME).map_err(|e| e.to_string())? {
        info!("[admin-init] Admin user '{}' already exists (id {})", existing.username, existing.id);
        return Ok(());
    }

    let password_hash = hash_password(password).map_err(|e| e.to_string())?;
    let user: User = insert_user(
        c,
        UserInput {
            username: SUPERADMIN_USERNAME.to_string(),
            phone_number: Some(phone.to_string()),
            email: String::new(),
            first_name: "Global".to_string(),
            last_name: "Admin".to_string(),
            password_hash,
            role_id: None,
            industry_id: None,
            created_by: None,
            is_superuser: true,
        },
    )
    .map_err(|e| e.to_string())?;

    info!("[admin-init] Created admin user '{}' with phone {}", user.username, phone);
    Ok(())
}
