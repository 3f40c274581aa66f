use super::core::ResourceRepository;
use crate::domain::resource::{Booking, DateRange};
use crate::domain::types::{BookingStatus, ResourceKind};
use crate::repository::error::RepositoryResult;
use crate::repository::row_codec::{
    format_date, format_ts, parse_date, parse_enum, parse_opt_ts, parse_ts,
};
use rusqlite::{params, Connection};

const BOOKING_COLUMNS: &str = "booking_id, resource_kind, resource_id, center_id, batch_id, \
    start_date, end_date, status, locked_by, locked_at, released_by, released_at";

// ==========================================
// Booking log queries
// ==========================================
impl ResourceRepository {
    /// All bookings of one resource, newest first
    ///
    /// # Arguments
    /// - `limit`: maximum rows returned
    pub fn booking_history(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM booking WHERE resource_kind = ?1 AND resource_id = ?2 \
             ORDER BY locked_at DESC, rowid DESC LIMIT ?3",
            BOOKING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![kind.to_db_str(), resource_id, limit as i64],
                map_booking_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Active bookings of one resource
    pub fn active_bookings(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;
        load_active_bookings(&conn, kind, resource_id)
    }
}

pub(super) fn load_active_bookings(
    conn: &Connection,
    kind: ResourceKind,
    resource_id: &str,
) -> RepositoryResult<Vec<Booking>> {
    let sql = format!(
        "SELECT {} FROM booking WHERE resource_kind = ?1 AND resource_id = ?2 \
         AND status = 'active' ORDER BY locked_at, rowid",
        BOOKING_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![kind.to_db_str(), resource_id], map_booking_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(super) fn insert_booking(conn: &Connection, booking: &Booking) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO booking (
            booking_id, resource_kind, resource_id, center_id, batch_id,
            start_date, end_date, status, locked_by, locked_at, released_by, released_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            booking.booking_id,
            booking.resource_kind.to_db_str(),
            booking.resource_id,
            booking.center_id,
            booking.batch_id,
            booking.date_range.map(|r| format_date(&r.start)),
            booking.date_range.map(|r| format_date(&r.end)),
            booking.status.to_db_str(),
            booking.locked_by,
            format_ts(&booking.locked_at),
            booking.released_by,
            booking.released_at.as_ref().map(format_ts),
        ],
    )?;
    Ok(())
}

fn map_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let kind: String = row.get(1)?;
    let start: Option<String> = row.get(5)?;
    let end: Option<String> = row.get(6)?;
    let status: String = row.get(7)?;
    let locked_at: String = row.get(9)?;

    let date_range = match (start, end) {
        (Some(s), Some(e)) => Some(DateRange {
            start: parse_date(5, &s)?,
            end: parse_date(6, &e)?,
        }),
        _ => None,
    };

    Ok(Booking {
        booking_id: row.get(0)?,
        resource_kind: parse_enum(1, &kind, ResourceKind::from_db_str)?,
        resource_id: row.get(2)?,
        center_id: row.get(3)?,
        batch_id: row.get(4)?,
        date_range,
        status: parse_enum(7, &status, BookingStatus::from_db_str)?,
        locked_by: row.get(8)?,
        locked_at: parse_ts(9, &locked_at)?,
        released_by: row.get(10)?,
        released_at: parse_opt_ts(11, row.get(11)?)?,
    })
}
