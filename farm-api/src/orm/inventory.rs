use chrono::Utc;
use diesel::prelude::*;

use crate::models::{InventoryItem, InventoryItemChanges, InventoryItemInput, NewInventoryItem};
use crate::orm::last_insert_rowid;
use crate::schema::inventory_items;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_item(
    conn: &mut SqliteConnection,
    input: InventoryItemInput,
    stamp: RecordStamp,
) -> QueryResult<InventoryItem> {
    let now = Utc::now().naive_utc();
    let new_item = NewInventoryItem {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(inventory_items::table)
        .values(&new_item)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    inventory_items::table.find(id).first(conn)
}

/// Visible items ordered by name, optionally narrowed to one category.
pub fn list_items(
    conn: &mut SqliteConnection,
    scope: &TenantScope,
    category: Option<&str>,
) -> QueryResult<Vec<InventoryItem>> {
    let Some(mut query) = scoped_query!(scope, inventory_items) else {
        return Ok(Vec::new());
    };
    if let Some(category) = category {
        query = query.filter(inventory_items::category.eq(category.to_string()));
    }
    query
        .order((inventory_items::item_name.asc(), inventory_items::id.asc()))
        .load(conn)
}

/// Items at or below their reorder level.
pub fn list_low_stock(
    conn: &mut SqliteConnection,
    scope: &TenantScope,
) -> QueryResult<Vec<InventoryItem>> {
    let Some(query) = scoped_query!(scope, inventory_items) else {
        return Ok(Vec::new());
    };
    query
        .filter(inventory_items::quantity.le(inventory_items::reorder_level))
        .order(inventory_items::quantity.asc())
        .load(conn)
}

pub fn get_item(
    conn: &mut SqliteConnection,
    item_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<InventoryItem>> {
    let item: Option<InventoryItem> = inventory_items::table.find(item_id).first(conn).optional()?;
    Ok(item.filter(|i| scope.permits(i)))
}

pub fn update_item(
    conn: &mut SqliteConnection,
    item_id: i32,
    mut changes: InventoryItemChanges,
) -> QueryResult<InventoryItem> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(inventory_items::table.find(item_id))
        .set(&changes)
        .execute(conn)?;
    inventory_items::table.find(item_id).first(conn)
}

pub fn delete_item(conn: &mut SqliteConnection, item_id: i32) -> QueryResult<usize> {
    diesel::delete(inventory_items::table.find(item_id)).execute(conn)
}
