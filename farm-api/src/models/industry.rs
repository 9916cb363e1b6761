use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::industries;

/// A tenant. Every business record optionally belongs to one.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = industries)]
#[ts(export)]
pub struct Industry {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = industries)]
pub struct NewIndustry {
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Debug, Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct IndustryInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(AsChangeset, Debug, Default, Deserialize, Serialize, TS)]
#[diesel(table_name = industries)]
#[ts(export)]
pub struct IndustryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

/// The compact form embedded in user payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IndustrySummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Industry> for IndustrySummary {
    fn from(industry: &Industry) -> Self {
        IndustrySummary {
            id: industry.id,
            name: industry.name.clone(),
            description: industry.description.clone(),
        }
    }
}
