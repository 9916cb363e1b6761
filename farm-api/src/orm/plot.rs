use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewPlot, Plot, PlotChanges, PlotInput};
use crate::orm::last_insert_rowid;
use crate::schema::plots;
use crate::scoped_query;
use crate::tenancy::{RecordStamp, TenantScope};

pub fn insert_plot(
    conn: &mut SqliteConnection,
    input: PlotInput,
    stamp: RecordStamp,
) -> QueryResult<Plot> {
    let now = Utc::now().naive_utc();
    let new_plot = NewPlot {
        input,
        industry_id: stamp.industry_id,
        created_by: stamp.created_by,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(plots::table)
        .values(&new_plot)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    plots::table.find(id).first(conn)
}

/// Plots visible under `scope`, oldest first.
pub fn list_plots(conn: &mut SqliteConnection, scope: &TenantScope) -> QueryResult<Vec<Plot>> {
    let Some(query) = scoped_query!(scope, plots, farmer_id) else {
        return Ok(Vec::new());
    };
    query.order(plots::id.asc()).load(conn)
}

/// `None` when the plot does not exist or lies outside `scope`.
pub fn get_plot(
    conn: &mut SqliteConnection,
    plot_id: i32,
    scope: &TenantScope,
) -> QueryResult<Option<Plot>> {
    let plot: Option<Plot> = plots::table.find(plot_id).first(conn).optional()?;
    Ok(plot.filter(|p| scope.permits(p)))
}

pub fn update_plot(
    conn: &mut SqliteConnection,
    plot_id: i32,
    mut changes: PlotChanges,
) -> QueryResult<Plot> {
    changes.updated_at = Some(Utc::now().naive_utc());
    diesel::update(plots::table.find(plot_id))
        .set(&changes)
        .execute(conn)?;
    plots::table.find(plot_id).first(conn)
}

/// Farms on the plot are kept and detached.
pub fn delete_plot(conn: &mut SqliteConnection, plot_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        clear_references!(conn, plot_id, farms::plot_id);
        diesel::delete(plots::table.find(plot_id)).execute(conn)
    })
}
