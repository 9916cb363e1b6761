use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{order_items, orders, vendors};
use crate::tenancy::OwnedEntity;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = vendors)]
#[ts(export)]
pub struct Vendor {
    pub id: i32,
    pub vendor_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub gstin_number: Option<String>,
    pub state: Option<String>,
    pub city: String,
    pub address: String,
    pub rating: Option<i32>,
    pub notes: String,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Vendor {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = vendors)]
#[ts(export)]
pub struct VendorInput {
    pub vendor_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub gstin_number: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    pub rating: Option<i32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = vendors)]
pub struct NewVendor {
    #[diesel(embed)]
    pub input: VendorInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = vendors)]
#[ts(export)]
pub struct VendorChanges {
    pub vendor_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gstin_number: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

/// An accounting order placed with a vendor.
#[derive(Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(belongs_to(Vendor))]
#[diesel(table_name = orders)]
#[ts(export)]
pub struct Order {
    pub id: i32,
    pub vendor_id: i32,
    pub invoice_number: String,
    #[ts(type = "string")]
    pub invoice_date: NaiveDate,
    pub state: String,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Order {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }
}

#[derive(Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
#[ts(export)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub item_name: String,
    pub year_of_make: Option<String>,
    pub estimate_cost: Option<f64>,
    pub remark: String,
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = order_items)]
#[ts(export)]
pub struct OrderItemInput {
    pub item_name: String,
    pub year_of_make: Option<String>,
    pub estimate_cost: Option<f64>,
    #[serde(default)]
    pub remark: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    #[diesel(embed)]
    pub input: OrderItemInput,
}

/// Request body for creating an order together with its items.
#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct OrderInput {
    pub vendor_id: i32,
    pub invoice_number: String,
    #[ts(type = "string")]
    pub invoice_date: NaiveDate,
    pub state: String,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub vendor_id: i32,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub state: String,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = orders)]
#[ts(export)]
pub struct OrderChanges {
    pub invoice_number: Option<String>,
    #[ts(type = "string | null")]
    pub invoice_date: Option<NaiveDate>,
    pub state: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub vendor_name: String,
    pub items: Vec<OrderItem>,
}
