use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{
    NewOrder, NewOrderItem, Order, OrderChanges, OrderInput, OrderItem, OrderWithItems, Vendor,
};
use crate::orm::last_insert_rowid;
use crate::schema::{order_items, orders, vendors};
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

/// Inserts an order and its items in one transaction.
pub fn insert_order(
    conn: &mut SqliteConnection,
    input: OrderInput,
    stamp: RecordStamp,
) -> QueryResult<OrderWithItems> {
    conn.transaction(|conn| {
        let now = Utc::now().naive_utc();
        let new_order = NewOrder {
            vendor_id: input.vendor_id,
            invoice_number: input.invoice_number,
            invoice_date: input.invoice_date,
            state: input.state,
            industry_id: stamp.industry_id,
            created_by: stamp.created_by,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(orders::table)
            .values(&new_order)
            .execute(conn)?;
        let order_id = last_insert_rowid(conn)?;

        let items: Vec<NewOrderItem> = input
            .items
            .into_iter()
            .map(|item| NewOrderItem {
                order_id,
                input: item,
            })
            .collect();
        if !items.is_empty() {
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;
        }

        let order: Order = orders::table.find(order_id).first(conn)?;
        with_items(conn, vec![order])?
            .pop()
            .ok_or(diesel::result::Error::NotFound)
    })
}

/// Attaches vendor names and items to each order, preserving order.
fn with_items(conn: &mut SqliteConnection, orders: Vec<Order>) -> QueryResult<Vec<OrderWithItems>> {
    let vendor_ids: Vec<i32> = orders.iter().map(|o| o.vendor_id).collect();
    let names: HashMap<i32, String> = vendors::table
        .filter(vendors::id.eq_any(vendor_ids))
        .load::<Vendor>(conn)?
        .into_iter()
        .map(|v| (v.id, v.vendor_name))
        .collect();

    let items = OrderItem::belonging_to(&orders)
        .order(order_items::id.asc())
        .load::<OrderItem>(conn)?
        .grouped_by(&orders);

    Ok(orders
        .into_iter()
        .zip(items)
        .map(|(order, items)| OrderWithItems {
            vendor_name: names.get(&order.vendor_id).cloned().unwrap_or_default(),
            order,
            items,
        })
        .collect())
}

/// Visible orders, newest invoice first, optionally for one vendor.
pub fn list_orders(
    conn: &mut SqliteConnection,
    scope: &TenantScope,
    vendor_id: Option<i32>,
) -> QueryResult<Vec<OrderWithItems>> {
    let Some(mut query) = scoped_query!(scope, orders) else {
        return Ok(Vec::new());
    };
    if let Some(vendor_id) = vendor_id {
        query = query.filter(orders::vendor_id.eq(vendor_id));
    }
    let found: Vec<Order> = query
        .order((orders::invoice_date.desc(), orders::id.desc()))
        .load(conn)?;
    with_items(conn, found)
}

pub fn get_order(
    conn: &mut SqliteConnection,
    order_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<OrderWithItems>> {
    let order: Option<Order> = orders::table.find(order_id).first(conn).optional()?;
    match order.filter(|o| scope.permits(o)) {
        Some(order) => Ok(with_items(conn, vec![order])?.pop()),
        None => Ok(None),
    }
}

pub fn update_order(
    conn: &mut SqliteConnection,
    order_id: i32,
    mut changes: OrderChanges,
) -> QueryResult<OrderWithItems> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(orders::table.find(order_id))
        .set(&changes)
        .execute(conn)?;
    let order: Order = orders::table.find(order_id).first(conn)?;
    with_items(conn, vec![order])?
        .pop()
        .ok_or(diesel::result::Error::NotFound)
}

pub fn delete_order(conn: &mut SqliteConnection, order_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        diesel::delete(order_items::table.filter(order_items::order_id.eq(order_id)))
            .execute(conn)?;
        diesel::delete(orders::table.find(order_id)).execute(conn)
    })
}
