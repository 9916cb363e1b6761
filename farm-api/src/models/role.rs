use diesel::{Identifiable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::roles;
use crate::text_enum;

text_enum! {
    /// The four tenant roles, highest first.
    pub enum RoleKind {
        Owner => "owner",
        Manager => "manager",
        FieldOfficer => "fieldofficer",
        Farmer => "farmer",
    }
}

impl RoleKind {
    /// Parses the spellings clients use for a role filter, e.g.
    /// `Field Officer`, `field_officer` and `fieldofficer`.
    pub fn from_loose(value: &str) -> Option<RoleKind> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        normalized.parse().ok()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoleKind::Owner => "Owner",
            RoleKind::Manager => "Manager",
            RoleKind::FieldOfficer => "Field Officer",
            RoleKind::Farmer => "Farmer",
        }
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = roles)]
#[ts(export)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub display_name: String,
}

impl Role {
    /// `None` for role rows created outside the seeded four.
    pub fn kind(&self) -> Option<RoleKind> {
        self.name.parse().ok()
    }
}
