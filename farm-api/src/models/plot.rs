use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::plots;
use crate::tenancy::OwnedEntity;

/// A surveyed land parcel. `boundary` holds GeoJSON text.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = plots)]
#[ts(export)]
pub struct Plot {
    pub id: i32,
    pub gat_number: String,
    pub plot_number: String,
    pub village: String,
    pub taluka: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub boundary: Option<String>,
    pub farmer_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl OwnedEntity for Plot {
    fn industry_id(&self) -> Option<i32> {
        self.industry_id
    }

    fn created_by(&self) -> Option<i32> {
        self.created_by
    }

    fn owning_user(&self) -> Option<i32> {
        self.farmer_id
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize, TS)]
#[diesel(table_name = plots)]
#[ts(export)]
pub struct PlotInput {
    pub gat_number: String,
    #[serde(default)]
    pub plot_number: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub taluka: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub pin_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub boundary: Option<String>,
    pub farmer_id: Option<i32>,
}

fn default_country() -> String {
    "India".to_string()
}

#[derive(Insertable, Debug)]
#[diesel(table_name = plots)]
pub struct NewPlot {
    #[diesel(embed)]
    pub input: PlotInput,
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = plots)]
#[ts(export)]
pub struct PlotChanges {
    pub gat_number: Option<String>,
    pub plot_number: Option<String>,
    pub village: Option<String>,
    pub taluka: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pin_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub boundary: Option<String>,
    pub farmer_id: Option<i32>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}
