use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{Farm, FarmChanges, FarmInput, NewFarm};
use crate::orm::last_insert_rowid;
use crate::schema::farms;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

/// Inserts a farm under a freshly generated `farm_uid`.
pub fn insert_farm(
    conn: &mut SqliteConnection,
    input: FarmInput,
    stamp: RecordStamp,
) -> QueryResult<Farm> {
    let now = Utc::now().naive_utc();
    let new_farm = NewFarm {
        farm_uid: Uuid::new_v4().to_string(),
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(farms::table)
        .values(&new_farm)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    farms::table.find(id).first(conn)
}

pub fn list_farms(conn: &mut SqliteConnection, scope: &TenantScope) -> QueryResult<Vec<Farm>> {
    let Some(query) = scoped_query!(scope, farms, farm_owner_id) else {
        return Ok(Vec::new());
    };
    query.order(farms::id.asc()).load(conn)
}

pub fn get_farm(
    conn: &mut SqliteConnection,
    farm_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Farm>> {
    let farm: Option<Farm> = farms::table.find(farm_id).first(conn).optional()?;
    Ok(farm.filter(|f| scope.permits(f)))
}

pub fn update_farm(
    conn: &mut SqliteConnection,
    farm_id: i32,
    mut changes: FarmChanges,
) -> QueryResult<Farm> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(farms::table.find(farm_id))
        .set(&changes)
        .execute(conn)?;
    farms::table.find(farm_id).first(conn)
}

pub fn delete_farm(conn: &mut SqliteConnection, farm_id: i32) -> QueryResult<usize> {
    diesel::delete(farms::table.find(farm_id)).execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{TenantFixture, setup_test_db};

    fn input(owner: Option<i32>) -> FarmInput {
        FarmInput {
            address: "Near the canal".to_string(),
            area_size: 2.5,
            crop_type: Some("sugarcane".to_string()),
            plantation_date: None,
            plot_id: None,
            farm_owner_id: owner,
        }
    }

    #[test]
    fn farm_uids_are_generated_and_distinct() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let officer = f.actor(&mut conn, f.fo_a1.id);

        let first = insert_farm(&mut conn, input(None), officer.stamp(None)).unwrap();
        let second = insert_farm(&mut conn, input(None), officer.stamp(None)).unwrap();
        assert_ne!(first.farm_uid, second.farm_uid);
        assert_eq!(first.industry_id, Some(f.industry_a.id));
    }

    #[test]
    fn farmer_sees_farms_they_own() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let owner = f.actor(&mut conn, f.owner_a.id);
        let farm = insert_farm(&mut conn, input(Some(f.farmer_a1.id)), owner.stamp(None)).unwrap();
        insert_farm(&mut conn, input(None), owner.stamp(None)).unwrap();

        let farmer = f.actor(&mut conn, f.farmer_a1.id);
        let scope = TenantScope::resolve(&mut conn, &farmer).unwrap();
        let visible = list_farms(&mut conn, &scope).unwrap();
        assert_eq!(visible.iter().map(|x| x.id).collect::<Vec<_>>(), vec![farm.id]);
        assert!(get_farm(&mut conn, farm.id, &scope).unwrap().is_some());

        let other = f.actor(&mut conn, f.farmer_a2.id);
        let other_scope = TenantScope::resolve(&mut conn, &other).unwrap();
        assert!(get_farm(&mut conn, farm.id, &other_scope).unwrap().is_none());
    }
}
