use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use farm_api::models::{Industry, IndustryChanges, IndustryInput};
use farm_api::orm::industry::{
    delete_industry, get_industry_by_name, insert_industry, list_industries, update_industry,
};

use super::utils::{CliResult, confirm, matcher, resolve_industry};

#[derive(Subcommand)]
pub enum IndustryAction {
    #[command(about = "List industries, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Add a new industry")]
    Add {
        #[arg(short, long, help = "Industry name")]
        name: String,
        #[arg(short, long, help = "Industry description")]
        description: Option<String>,
    },
    #[command(about = "Rename an industry or change its description")]
    Edit {
        #[arg(help = "Industry ID or name")]
        industry: String,
        #[arg(short, long, help = "New name")]
        name: Option<String>,
        #[arg(short, long, help = "New description")]
        description: Option<String>,
    },
    #[command(about = "Remove industries matching search term")]
    Rm {
        #[arg(
            help = "Search term to match industries for removal (regex by default, use -F for fixed string)"
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

pub fn handle_industry_command_with_conn(
    conn: &mut SqliteConnection,
    action: IndustryAction,
) -> CliResult<()> {
    match action {
        IndustryAction::Ls { search_term, fixed_string } => {
            let industries = list_industries_impl(conn, search_term.as_deref(), fixed_string)?;
            if industries.is_empty() {
                println!("No industries found.");
            }
            for industry in industries {
                println!(
                    "{}\t{}\t{}",
                    industry.id,
                    industry.name,
                    industry.description.as_deref().unwrap_or("")
                );
            }
        }
        IndustryAction::Add { name, description } => {
            let industry = add_industry_impl(conn, &name, description)?;
            println!("Created industry '{}' with ID {}", industry.name, industry.id);
        }
        IndustryAction::Edit { industry, name, description } => {
            let industry = edit_industry_impl(conn, &industry, name, description)?;
            println!("Updated industry {} ('{}')", industry.id, industry.name);
        }
        IndustryAction::Rm { search_term, fixed_string, yes } => {
            let matches = list_industries_impl(conn, Some(&search_term), fixed_string)?;
            if matches.is_empty() {
                println!("No industries match '{}'.", search_term);
                return Ok(());
            }
            println!("Industries to remove:");
            for industry in &matches {
                println!("  {}\t{}", industry.id, industry.name);
            }
            if !yes && !confirm("Remove these industries? Their records will be detached.")? {
                println!("Aborted.");
                return Ok(());
            }
            let removed = remove_industries_impl(conn, &matches)?;
            println!("Removed {} industr{}.", removed, if removed == 1 { "y" } else { "ies" });
        }
    }
    Ok(())
}

pub fn list_industries_impl(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> CliResult<Vec<Industry>> {
    let is_match = matcher(search_term, fixed_string)?;
    Ok(list_industries(conn)?
        .into_iter()
        .filter(|industry| is_match(&industry.name))
        .collect())
}

pub fn add_industry_impl(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<String>,
) -> CliResult<Industry> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Industry name cannot be empty".into());
    }
    if get_industry_by_name(conn, name)?.is_some() {
        return Err(format!("Industry '{}' already exists", name).into());
    }
    Ok(insert_industry(conn, IndustryInput { name: name.to_string(), description })?)
}

pub fn edit_industry_impl(
    conn: &mut SqliteConnection,
    identifier: &str,
    name: Option<String>,
    description: Option<String>,
) -> CliResult<Industry> {
    let industry = resolve_industry(conn, identifier)?;
    let name = name.map(|n| n.trim().to_string());
    if let Some(new_name) = &name {
        if new_name.is_empty() {
            return Err("Industry name cannot be empty".into());
        }
        if let Some(other) = get_industry_by_name(conn, new_name)? {
            if other.id != industry.id {
                return Err(format!("Industry '{}' already exists", new_name).into());
            }
        }
    }
    let changes = IndustryChanges { name, description, ..Default::default() };
    Ok(update_industry(conn, industry.id, changes)?)
}

pub fn remove_industries_impl(
    conn: &mut SqliteConnection,
    industries: &[Industry],
) -> CliResult<usize> {
    let mut removed = 0;
    for industry in industries {
        removed += delete_industry(conn, industry.id)?;
    }
    Ok(removed)
}
