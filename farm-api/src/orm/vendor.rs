use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewVendor, Vendor, VendorChanges, VendorInput};
use crate::orm::last_insert_rowid;
use crate::schema::{order_items, orders, vendors};
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_vendor(
    conn: &mut SqliteConnection,
    input: VendorInput,
    stamp: RecordStamp,
) -> QueryResult<Vendor> {
    let now = Utc::now().naive_utc();
    let new_vendor = NewVendor {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(vendors::table)
        .values(&new_vendor)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    vendors::table.find(id).first(conn)
}

/// Visible vendors ordered by name.
pub fn list_vendors(conn: &mut SqliteConnection, scope: &TenantScope) -> QueryResult<Vec<Vendor>> {
    let Some(query) = scoped_query!(scope, vendors) else {
        return Ok(Vec::new());
    };
    query
        .order((vendors::vendor_name.asc(), vendors::id.asc()))
        .load(conn)
}

pub fn get_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Vendor>> {
    let vendor: Option<Vendor> = vendors::table.find(vendor_id).first(conn).optional()?;
    Ok(vendor.filter(|v| scope.permits(v)))
}

pub fn update_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i32,
    mut changes: VendorChanges,
) -> QueryResult<Vendor> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(vendors::table.find(vendor_id))
        .set(&changes)
        .execute(conn)?;
    vendors::table.find(vendor_id).first(conn)
}

/// Removes the vendor along with its orders and their items.
pub fn delete_vendor(conn: &mut SqliteConnection, vendor_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let order_ids: Vec<i32> = orders::table
            .filter(orders::vendor_id.eq(vendor_id))
            .select(orders::id)
            .load(conn)?;
        diesel::delete(order_items::table.filter(order_items::order_id.eq_any(order_ids.clone())))
            .execute(conn)?;
        diesel::delete(orders::table.filter(orders::id.eq_any(order_ids))).execute(conn)?;
        diesel::delete(vendors::table.find(vendor_id)).execute(conn)
    })
}
