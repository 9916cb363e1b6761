use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

/// Nulls every `table::column` holding `value`. Deletes use it in place of
/// `ON DELETE SET NULL`, which SQLite only honors on connections that
/// enabled foreign keys.
macro_rules! clear_references {
    ($conn:expr, $value:expr, $($table:ident::$column:ident),+ $(,)?) => {
        $(
            diesel::update(
                crate::schema::$table::table.filter(crate::schema::$table::$column.eq($value)),
            )
            .set(crate::schema::$table::$column.eq(None::<i32>))
            .execute($conn)?;
        )+
    };
}

pub mod booking;
mod db;
pub mod farm;
pub mod industry;
pub mod inventory;
pub mod login;
pub mod logout;
pub mod messaging;
pub mod order;
pub mod plot;
pub mod role;
pub mod stock;
pub mod task;
#[cfg(any(test, feature = "test-staging"))]
pub mod testing;
pub mod user;
pub mod vendor;

pub use db::*;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Id of the row most recently inserted on this connection.
pub(crate) fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    let row = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?;
    Ok(row.last_insert_rowid as i32)
}
