use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::farms;
use crate::tenancy::OwnedEntity;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = farms)]
#[ts(export)]
pub struct Farm {
    pub id: i32,
    pub farm_uid: String,
    pub address: String,
    pub area_size: f64,
    pub crop_type: Option<String>,
    #[ts(type = "string | null")]
    pub plantation_date: Option<NaiveDate>,
    pub plot_id: Option<i32>,
    pub farm_owner_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Farm {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }

    fn owning_user(&self) -> Option<i32> {
        self.farm_owner_id
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = farms)]
#[ts(export)]
pub struct FarmInput {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub area_size: f64,
    pub crop_type: Option<String>,
    #[ts(type = "string | null")]
    pub plantation_date: Option<NaiveDate>,
    pub plot_id: Option<i32>,
    pub farm_owner_id: Option<i32>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = farms)]
pub struct NewFarm {
    pub farm_uid: String,
    #[diesel(embed)]
    pub input: FarmInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = farms)]
#[ts(export)]
pub struct FarmChanges {
    pub address: Option<String>,
    pub area_size: Option<f64>,
    pub crop_type: Option<String>,
    #[ts(type = "string | null")]
    pub plantation_date: Option<NaiveDate>,
    pub plot_id: Option<i32>,
    pub farm_owner_id: Option<i32>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}
