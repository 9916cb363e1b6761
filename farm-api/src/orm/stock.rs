use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewStock, Stock, StockChanges, StockInput, StockItemType};
use crate::orm::last_insert_rowid;
use crate::schema::stocks;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_stock(
    conn: &mut SqliteConnection,
    input: StockInput,
    stamp: RecordStamp,
) -> QueryResult<Stock> {
    let now = Utc::now().naive_utc();
    let new_stock = NewStock {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(stocks::table)
        .values(&new_stock)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    stocks::table.find(id).first(conn)
}

pub fn list_stock(
    conn: &mut SqliteConnection,
    scope: &TenantScope,
    item_type: Option<StockItemType>,
) -> QueryResult<Vec<Stock>> {
    let Some(mut query) = scoped_query!(scope, stocks) else {
        return Ok(Vec::new());
    };
    if let Some(item_type) = item_type {
        query = query.filter(stocks::item_type.eq(item_type));
    }
    query.order(stocks::id.asc()).load(conn)
}

pub fn get_stock(
    conn: &mut SqliteConnection,
    stock_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Stock>> {
    let stock: Option<Stock> = stocks::table.find(stock_id).first(conn).optional()?;
    Ok(stock.filter(|s| scope.permits(s)))
}

pub fn update_stock(
    conn: &mut SqliteConnection,
    stock_id: i32,
    mut changes: StockChanges,
) -> QueryResult<Stock> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(stocks::table.find(stock_id))
        .set(&changes)
        .execute(conn)?;
    stocks::table.find(stock_id).first(conn)
}

pub fn delete_stock(conn: &mut SqliteConnection, stock_id: i32) -> QueryResult<usize> {
    diesel::delete(stocks::table.find(stock_id)).execute(conn)
}
