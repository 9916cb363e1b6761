use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::bookings;
use crate::tenancy::OwnedEntity;
use crate::text_enum;

text_enum! {
    pub enum BookingStatus {
        Available => "available",
        Book => "book",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum BookingType {
        Meeting => "meeting",
        Field => "field",
        Maintenance => "maintenance",
        Training => "training",
        Other => "other",
    }
}

/// A reservation of an item or slot over `[start_date, end_date)`.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = bookings)]
#[ts(export)]
pub struct Booking {
    pub id: i32,
    pub title: Option<String>,
    pub item_name: String,
    pub description: String,
    pub booking_type: Option<BookingType>,
    pub status: BookingStatus,
    #[ts(type = "string")]
    pub start_date: NaiveDateTime,
    #[ts(type = "string")]
    pub end_date: NaiveDateTime,
    pub approved_by: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Booking {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = bookings)]
#[ts(export)]
pub struct BookingInput {
    pub title: Option<String>,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    pub booking_type: Option<BookingType>,
    #[serde(default = "default_status")]
    pub status: BookingStatus,
    #[ts(type = "string")]
    pub start_date: NaiveDateTime,
    #[ts(type = "string")]
    pub end_date: NaiveDateTime,
}

fn default_status() -> BookingStatus {
    BookingStatus::Available
}

#[derive(Insertable, Debug)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    #[diesel(embed)]
    pub input: BookingInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = bookings)]
#[ts(export)]
pub struct BookingChanges {
    pub title: Option<String>,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub booking_type: Option<BookingType>,
    pub status: Option<BookingStatus>,
    #[ts(type = "string | null")]
    pub start_date: Option<NaiveDateTime>,
    #[ts(type = "string | null")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(skip)]
    #[ts(skip)]
    pub approved_by: Option<i32>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}
