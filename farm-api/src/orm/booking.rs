use chrono::Utc;
use diesel::prelude::*;

use crate::models::{Booking, BookingChanges, BookingInput, BookingStatus, NewBooking};
use crate::orm::last_insert_rowid;
use crate::schema::bookings;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_booking(
    conn: &mut SqliteConnection,
    input: BookingInput,
    stamp: RecordStamp,
) -> QueryResult<Booking> {
    let now = Utc::now().naive_utc();
    let new_booking = NewBooking {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(bookings::table)
        .values(&new_booking)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    bookings::table.find(id).first(conn)
}

/// Visible bookings, newest first, optionally narrowed to one status.
pub fn list_bookings(
    conn: &mut SqliteConnection,
    scope: &TenantScope,
    status: Option<BookingStatus>,
) -> QueryResult<Vec<Booking>> {
    let Some(mut query) = scoped_query!(scope, bookings) else {
        return Ok(Vec::new());
    };
    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status));
    }
    query
        .order((bookings::created_at.desc(), bookings::id.desc()))
        .load(conn)
}

pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Booking>> {
    let booking: Option<Booking> = bookings::table.find(booking_id).first(conn).optional()?;
    Ok(booking.filter(|b| scope.permits(b)))
}

pub fn update_booking(
    conn: &mut SqliteConnection,
    booking_id: i32,
    mut changes: BookingChanges,
) -> QueryResult<Booking> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(bookings::table.find(booking_id))
        .set(&changes)
        .execute(conn)?;
    bookings::table.find(booking_id).first(conn)
}

/// Approves or rejects a booking, recording who decided.
pub fn decide_booking(
    conn: &mut SqliteConnection,
    booking_id: i32,
    status: BookingStatus,
    decided_by: i32,
) -> QueryResult<Booking> {
    update_booking(
        conn,
        booking_id,
        BookingChanges {
            status: Some(status),
            approved_by: Some(decided_by),
            ..Default::default()
        },
    )
}

pub fn delete_booking(conn: &mut SqliteConnection, booking_id: i32) -> QueryResult<usize> {
    diesel::delete(bookings::table.find(booking_id)).execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{TenantFixture, setup_test_db};
    use chrono::NaiveDate;

    fn input() -> BookingInput {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        BookingInput {
            title: None,
            item_name: "Tractor".to_string(),
            description: String::new(),
            booking_type: None,
            status: BookingStatus::Pending,
            start_date: day.and_hms_opt(9, 0, 0).unwrap(),
            end_date: day.and_hms_opt(17, 0, 0).unwrap(),
        }
    }

    #[test]
    fn booking_takes_the_creator_industry() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let farmer = f.actor(&mut conn, f.farmer_a1.id);

        let booking = insert_booking(&mut conn, input(), farmer.stamp(None)).unwrap();
        assert_eq!(booking.industry_id, Some(f.industry_a.id));
        assert_eq!(booking.created_by, Some(f.farmer_a1.id));
    }

    #[test]
    fn decision_records_the_approver() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);
        let farmer = f.actor(&mut conn, f.farmer_a1.id);
        let booking = insert_booking(&mut conn, input(), farmer.stamp(None)).unwrap();

        let approved =
            decide_booking(&mut conn, booking.id, BookingStatus::Approved, f.manager_a1.id).unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert_eq!(approved.approved_by, Some(f.manager_a1.id));

        let scope = TenantScope::Industry(f.industry_a.id);
        let pending = list_bookings(&mut conn, &scope, Some(BookingStatus::Pending)).unwrap();
        assert!(pending.is_empty());
    }
}
