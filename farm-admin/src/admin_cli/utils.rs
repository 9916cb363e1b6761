use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use farm_api::{
    models::Industry,
    orm::{
        industry::{get_industry, get_industry_by_name, list_industries},
        run_pending_migrations, set_foreign_keys,
    },
};
use regex::Regex;
use std::io::{self, Write};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Opens the database named on the command line, or DATABASE_URL, enables
/// foreign keys and brings its schema up to date.
pub fn establish_connection(database_url: Option<String>) -> CliResult<SqliteConnection> {
    dotenv().ok();
    let database_url = match database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set or passed with --database-url")?,
    };
    let mut conn = SqliteConnection::establish(&database_url)?;
    set_foreign_keys(&mut conn)?;
    run_pending_migrations(&mut conn).map_err(|e| e.to_string())?;
    Ok(conn)
}

/// Builds a matcher for `ls`/`rm` search terms. `None` matches everything.
pub fn matcher(
    search_term: Option<&str>,
    fixed_string: bool,
) -> CliResult<Box<dyn Fn(&str) -> bool>> {
    match search_term {
        None => Ok(Box::new(|_: &str| true)),
        Some(term) if fixed_string => {
            let term = term.to_string();
            Ok(Box::new(move |value: &str| value.contains(&term)))
        }
        Some(term) => {
            let regex = Regex::new(term)?;
            Ok(Box::new(move |value: &str| regex.is_match(value)))
        }
    }
}

/// Asks a yes/no question on stdin; anything but y/yes is a no.
pub fn confirm(question: &str) -> CliResult<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

pub fn prompt_for_password() -> CliResult<String> {
    let password = rpassword::prompt_password("Enter password: ")?;
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        return Err("Passwords do not match".into());
    }
    Ok(password)
}

/// Resolves an industry by id, or by name without regard to case.
pub fn resolve_industry(conn: &mut SqliteConnection, identifier: &str) -> CliResult<Industry> {
    if let Ok(id) = identifier.parse::<i32>() {
        return get_industry(conn, id)?
            .ok_or_else(|| format!("Industry with ID {} does not exist", id).into());
    }
    if let Some(industry) = get_industry_by_name(conn, identifier)? {
        return Ok(industry);
    }
    let wanted = identifier.to_lowercase();
    list_industries(conn)?
        .into_iter()
        .find(|i| i.name.to_lowercase() == wanted)
        .ok_or_else(|| format!("Industry with name '{}' does not exist", identifier).into())
}

#[cfg(test)]
pub fn test_connection() -> SqliteConnection {
    establish_connection(Some(":memory:".to_string())).expect("in-memory database")
}
