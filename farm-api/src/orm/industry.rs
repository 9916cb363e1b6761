use chrono::Utc;
use diesel::prelude::*;

use crate::models::{Industry, IndustryChanges, IndustryInput, NewIndustry};
use crate::orm::last_insert_rowid;
use crate::schema::industries;

pub fn insert_industry(conn: &mut SqliteConnection, input: IndustryInput) -> QueryResult<Industry> {
    let now = Utc::now().naive_utc();
    let new_industry = NewIndustry {
        name: input.name,
        description: input.description,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(industries::table)
        .values(&new_industry)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    industries::table.find(id).first(conn)
}

pub fn get_industry(conn: &mut SqliteConnection, industry_id: i32) -> QueryResult<Option<Industry>> {
    industries::table.find(industry_id).first(conn).optional()
}

/// Case-sensitive lookup.
pub fn get_industry_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Industry>> {
    industries::table
        .filter(industries::name.eq(name))
        .first(conn)
        .optional()
}

pub fn list_industries(conn: &mut SqliteConnection) -> QueryResult<Vec<Industry>> {
    industries::table.order(industries::name.asc()).load(conn)
}

pub fn update_industry(
    conn: &mut SqliteConnection,
    industry_id: i32,
    mut changes: IndustryChanges,
) -> QueryResult<Industry> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(industries::table.find(industry_id))
        .set(&changes)
        .execute(conn)?;
    industries::table.find(industry_id).first(conn)
}

/// Records in the industry keep existing with `industry_id` cleared, so
/// former members resolve to an empty scope.
pub fn delete_industry(conn: &mut SqliteConnection, industry_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        clear_references!(
            conn,
            industry_id,
            users::industry_id,
            plots::industry_id,
            farms::industry_id,
            tasks::industry_id,
            bookings::industry_id,
            inventory_items::industry_id,
            stocks::industry_id,
            vendors::industry_id,
            orders::industry_id,
        );
        diesel::delete(industries::table.find(industry_id)).execute(conn)
    })
}
