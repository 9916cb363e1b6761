use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use farm_api::models::{RoleKind, User, UserChanges, UserInput};
use farm_api::orm::login::hash_password;
use farm_api::orm::role::get_role_by_kind;
use farm_api::orm::user::{
    delete_user, get_user_by_phone, get_user_by_username, get_user_with_role, insert_user,
    list_all_users, update_user,
};
use farm_api::validation::normalize_phone;

use super::utils::{CliResult, confirm, matcher, prompt_for_password, resolve_industry};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Add a new user")]
    Add {
        #[arg(long, help = "Phone number (10 digits, +91 prefix allowed)")]
        phone: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(short, long, help = "Role: owner, manager, fieldofficer or farmer")]
        role: Option<String>,
        #[arg(short, long, help = "Industry ID or name")]
        industry: Option<String>,
        #[arg(long, help = "Create a Global Admin with no role or industry")]
        superuser: bool,
        #[arg(short, long, help = "Username (defaults to the phone number)")]
        username: Option<String>,
        #[arg(long, default_value = "", help = "First name")]
        first_name: String,
        #[arg(long, default_value = "", help = "Last name")]
        last_name: String,
        #[arg(long, default_value = "", help = "Email address")]
        email: String,
    },
    #[command(about = "Change user password")]
    ChangePassword {
        #[arg(long, help = "Phone number")]
        phone: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List users, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against username and phone (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Allow a user to log in again")]
    Activate {
        #[arg(long, help = "Phone number")]
        phone: String,
    },
    #[command(about = "Block a user from logging in")]
    Deactivate {
        #[arg(long, help = "Phone number")]
        phone: String,
    },
    #[command(about = "Remove users matching search term")]
    Rm {
        #[arg(
            help = "Search term to match users for removal (regex by default, use -F for fixed string)"
        )]
        search_term: String,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

/// Everything `user add` needs, with the password already in hand.
pub struct NewAccount {
    pub phone: String,
    pub password: String,
    pub role: Option<String>,
    pub industry: Option<String>,
    pub superuser: bool,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> CliResult<()> {
    match action {
        UserAction::Add {
            phone,
            password,
            role,
            industry,
            superuser,
            username,
            first_name,
            last_name,
            email,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_for_password()?,
            };
            let account = NewAccount {
                phone,
                password,
                role,
                industry,
                superuser,
                username,
                first_name,
                last_name,
                email,
            };
            let user = user_add_impl(conn, account)?;
            println!("Created user '{}' with ID {}", user.username, user.id);
        }
        UserAction::ChangePassword { phone, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_for_password()?,
            };
            let user = user_change_password_impl(conn, &phone, &password)?;
            println!("Password updated for '{}'", user.username);
        }
        UserAction::Ls { search_term, fixed_string } => {
            let users = user_ls_impl(conn, search_term.as_deref(), fixed_string)?;
            if users.is_empty() {
                println!("No users found.");
            }
            for user in users {
                println!("{}", describe_user(conn, &user)?);
            }
        }
        UserAction::Activate { phone } => {
            let user = user_set_active_impl(conn, &phone, true)?;
            println!("Activated '{}'", user.username);
        }
        UserAction::Deactivate { phone } => {
            let user = user_set_active_impl(conn, &phone, false)?;
            println!("Deactivated '{}'", user.username);
        }
        UserAction::Rm { search_term, fixed_string, yes } => {
            let matches = user_ls_impl(conn, Some(&search_term), fixed_string)?;
            if matches.is_empty() {
                println!("No users match '{}'.", search_term);
                return Ok(());
            }
            println!("Users to remove:");
            for user in &matches {
                println!("  {}", describe_user(conn, user)?);
            }
            if !yes && !confirm("Remove these users?")? {
                println!("Aborted.");
                return Ok(());
            }
            let removed = user_rm_impl(conn, &matches)?;
            println!("Removed {} user{}.", removed, if removed == 1 { "" } else { "s" });
        }
    }
    Ok(())
}

fn describe_user(conn: &mut SqliteConnection, user: &User) -> CliResult<String> {
    let role = match get_user_with_role(conn, user.id)? {
        Some((_, Some(role))) => role.name,
        _ if user.is_superuser => "global_admin".to_string(),
        _ => "-".to_string(),
    };
    Ok(format!(
        "{}\t{}\t{}\t{}\tindustry={}\t{}",
        user.id,
        user.username,
        user.phone_number.as_deref().unwrap_or("-"),
        role,
        user.industry_id.map_or("-".to_string(), |id| id.to_string()),
        if user.is_active { "active" } else { "inactive" }
    ))
}

fn find_by_phone(conn: &mut SqliteConnection, raw_phone: &str) -> CliResult<User> {
    let phone = normalize_phone(raw_phone)
        .ok_or_else(|| format!("'{}' is not a valid phone number", raw_phone))?;
    get_user_by_phone(conn, &phone)?
        .ok_or_else(|| format!("No user with phone {}", phone).into())
}

pub fn user_add_impl(conn: &mut SqliteConnection, account: NewAccount) -> CliResult<User> {
    let phone = normalize_phone(&account.phone)
        .ok_or_else(|| format!("'{}' is not a valid phone number", account.phone))?;
    if get_user_by_phone(conn, &phone)?.is_some() {
        return Err(format!("A user with phone {} already exists", phone).into());
    }
    if account.password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    let (role_id, industry_id) = if account.superuser {
        if account.role.is_some() || account.industry.is_some() {
            return Err("A superuser has no role or industry".into());
        }
        (None, None)
    } else {
        let role_name = account.role.as_deref().ok_or("--role is required")?;
        let kind = RoleKind::from_loose(role_name)
            .ok_or_else(|| format!("Unknown role '{}'", role_name))?;
        let industry = account.industry.as_deref().ok_or("--industry is required")?;
        let industry = resolve_industry(conn, industry)?;
        (Some(get_role_by_kind(conn, kind)?.id), Some(industry.id))
    };

    let username = match account.username.map(|u| u.trim().to_string()) {
        Some(u) if !u.is_empty() => u,
        _ => phone.clone(),
    };
    if get_user_by_username(conn, &username)?.is_some() {
        return Err(format!("Username '{}' is taken", username).into());
    }

    let password_hash =
        hash_password(&account.password).map_err(|e| format!("Failed to hash password: {}", e))?;

    Ok(insert_user(
        conn,
        UserInput {
            username,
            phone_number: Some(phone),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash,
            role_id,
            industry_id,
            created_by: None,
            is_superuser: account.superuser,
        },
    )?)
}

pub fn user_change_password_impl(
    conn: &mut SqliteConnection,
    phone: &str,
    password: &str,
) -> CliResult<User> {
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }
    let user = find_by_phone(conn, phone)?;
    let password_hash =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e))?;
    let changes = UserChanges { password_hash: Some(password_hash), ..Default::default() };
    Ok(update_user(conn, user.id, changes)?)
}

pub fn user_set_active_impl(
    conn: &mut SqliteConnection,
    phone: &str,
    active: bool,
) -> CliResult<User> {
    let user = find_by_phone(conn, phone)?;
    let changes = UserChanges { is_active: Some(active), ..Default::default() };
    Ok(update_user(conn, user.id, changes)?)
}

pub fn user_ls_impl(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> CliResult<Vec<User>> {
    let is_match = matcher(search_term, fixed_string)?;
    Ok(list_all_users(conn)?
        .into_iter()
        .filter(|user| {
            is_match(&user.username) || user.phone_number.as_deref().is_some_and(|phone| is_match(phone))
        })
        .collect())
}

pub fn user_rm_impl(conn: &mut SqliteConnection, users: &[User]) -> CliResult<usize> {
    let mut removed = 0;
    for user in users {
        removed += delete_user(conn, user.id)?;
    }
    Ok(removed)
}
