use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{inventory_items, stocks};
use crate::tenancy::OwnedEntity;
use crate::text_enum;

text_enum! {
    /// Derived from quantity against the reorder level, never stored.
    pub enum StockLevel {
        OutOfStock => "out_of_stock",
        LowStock => "low_stock",
        InStock => "in_stock",
    }
}

text_enum! {
    pub enum StockItemType {
        Logistic => "logistic",
        Equipment => "equipment",
        Tools => "tools",
        Materials => "materials",
        Supplies => "supplies",
        Other => "other",
    }
}

text_enum! {
    pub enum StockStatus {
        Working => "working",
        Maintenance => "maintenance",
        Retired => "retired",
        Damaged => "damaged",
        Available => "available",
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = inventory_items)]
#[ts(export)]
pub struct InventoryItem {
    pub id: i32,
    pub item_name: String,
    pub description: String,
    pub quantity: i32,
    pub unit: String,
    pub category: String,
    pub reorder_level: i32,
    #[ts(type = "string | null")]
    pub purchase_date: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub expiry_date: Option<NaiveDate>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl InventoryItem {
    pub fn level(&self) -> StockLevel {
        if self.quantity <= 0 {
            StockLevel::OutOfStock
        } else if self.quantity <= self.reorder_level {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }
}

impl OwnedEntity for InventoryItem {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }
}

/// An inventory item with its derived stock level, as listed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItemWithStatus {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockLevel,
}

impl From<InventoryItem> for InventoryItemWithStatus {
    fn from(item: InventoryItem) -> Self {
        let status = item.level();
        InventoryItemWithStatus { item, status }
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = inventory_items)]
#[ts(export)]
pub struct InventoryItemInput {
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub reorder_level: i32,
    #[ts(type = "string | null")]
    pub purchase_date: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub expiry_date: Option<NaiveDate>,
}

fn default_unit() -> String {
    "units".to_string()
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Insertable, Debug)]
#[diesel(table_name = inventory_items)]
pub struct NewInventoryItem {
    #[diesel(embed)]
    pub input: InventoryItemInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = inventory_items)]
#[ts(export)]
pub struct InventoryItemChanges {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub reorder_level: Option<i32>,
    #[ts(type = "string | null")]
    pub purchase_date: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Durable equipment and logistics assets.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = stocks)]
#[ts(export)]
pub struct Stock {
    pub id: i32,
    pub item_name: String,
    pub item_type: StockItemType,
    pub make: String,
    pub year_of_make: Option<String>,
    pub estimate_cost: Option<f64>,
    pub status: StockStatus,
    pub remark: String,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Stock {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = stocks)]
#[ts(export)]
pub struct StockInput {
    pub item_name: String,
    #[serde(default = "default_item_type")]
    pub item_type: StockItemType,
    #[serde(default)]
    pub make: String,
    pub year_of_make: Option<String>,
    pub estimate_cost: Option<f64>,
    #[serde(default = "default_stock_status")]
    pub status: StockStatus,
    #[serde(default)]
    pub remark: String,
}

fn default_item_type() -> StockItemType {
    StockItemType::Logistic
}

fn default_stock_status() -> StockStatus {
    StockStatus::Working
}

#[derive(Insertable, Debug)]
#[diesel(table_name = stocks)]
pub struct NewStock {
    #[diesel(embed)]
    pub input: StockInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = stocks)]
#[ts(export)]
pub struct StockChanges {
    pub item_name: Option<String>,
    pub item_type: Option<StockItemType>,
    pub make: Option<String>,
    pub year_of_make: Option<String>,
    pub estimate_cost: Option<f64>,
    pub status: Option<StockStatus>,
    pub remark: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}
