//! `SQLite`-backed address store.
//!
//! Each operation is a single parameterized statement against the
//! `addresses` table; `SQLite`'s per-statement atomicity is the only
//! isolation. The connection lives behind a mutex so every exit path
//! releases it via the guard.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::{Address, StoreError};

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// The sole owner of the `addresses` table.
pub struct AddressStore {
    conn: Mutex<Connection>,
}

impl AddressStore {
    /// Open (or create) the database file and bootstrap the schema.
    ///
    /// Called once at startup, before the listener binds; handlers assume
    /// the table exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// In-memory store. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert a new record and return the assigned id.
    ///
    /// Ids are monotonically increasing and never reused after a delete
    /// (AUTOINCREMENT).
    pub fn create(&self, address: &str, latitude: f64, longitude: f64) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO addresses (address, latitude, longitude) VALUES (?1, ?2, ?3)",
            params![address, latitude, longitude],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Full-replace the record matching `id`.
    ///
    /// Returns the affected-row count: 0 means no row matched. Callers that
    /// want silent-success semantics simply ignore the count.
    pub fn update(
        &self,
        id: i64,
        address: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE addresses SET address = ?1, latitude = ?2, longitude = ?3 WHERE id = ?4",
            params![address, latitude, longitude, id],
        )?;
        Ok(affected)
    }

    /// Delete the record matching `id`. Same miss semantics as [`update`].
    ///
    /// [`update`]: AddressStore::update
    pub fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM addresses WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    /// Every record, ascending by id. No pagination.
    pub fn list_all(&self) -> Result<Vec<Address>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, address, latitude, longitude FROM addresses ORDER BY id")?;
        let rows = stmt.query_map([], row_to_address)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    /// Records within `distance` of the given point, by squared-Euclidean
    /// threshold in raw coordinate degrees.
    ///
    /// This is a flat-plane approximation over latitude/longitude treated as
    /// Cartesian coordinates, not a geodesic distance: the filter is
    /// `(lat - ?)² + (lon - ?)² <= distance²`, equality included, with
    /// `distance` in degrees. Accuracy degrades away from the equator and at
    /// large distances.
    pub fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        distance: f64,
    ) -> Result<Vec<Address>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, address, latitude, longitude FROM addresses \
             WHERE (latitude - ?1) * (latitude - ?1) + (longitude - ?2) * (longitude - ?2) \
                   <= ?3 * ?3 \
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![latitude, longitude, distance], row_to_address)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }
}

/// Create-table-if-absent bootstrap. Coordinates stay nullable in the
/// schema; the HTTP layer guarantees presence on every write path.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL,
            latitude REAL,
            longitude REAL
        )",
        [],
    )?;
    Ok(())
}

fn row_to_address(row: &rusqlite::Row<'_>) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(0)?,
        address: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AddressStore {
        AddressStore::open_in_memory().expect("in-memory store")
    }

    #[test]
    fn test_create_then_list_round_trip() {
        let store = store();
        let id = store.create("1 Main St", 1.0, 2.0).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].address, "1 Main St");
        assert_eq!(all[0].latitude, 1.0);
        assert_eq!(all[0].longitude, 2.0);
    }

    #[test]
    fn test_update_is_full_replace() {
        let store = store();
        let id = store.create("A", 1.0, 2.0).unwrap();

        let affected = store.update(id, "B", 3.0, 4.0).unwrap();
        assert_eq!(affected, 1);

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].address, "B");
        assert_eq!(all[0].latitude, 3.0);
        assert_eq!(all[0].longitude, 4.0);
    }

    #[test]
    fn test_update_on_absent_id_is_a_counted_noop() {
        let store = store();
        store.create("A", 1.0, 2.0).unwrap();

        let affected = store.update(9999, "B", 3.0, 4.0).unwrap();
        assert_eq!(affected, 0);

        // Existing record untouched
        let all = store.list_all().unwrap();
        assert_eq!(all[0].address, "A");
        assert_eq!(all[0].latitude, 1.0);
    }

    #[test]
    fn test_delete_on_absent_id_is_a_counted_noop() {
        let store = store();
        store.create("A", 1.0, 2.0).unwrap();

        let affected = store.delete(9999).unwrap();
        assert_eq!(affected, 0);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_record() {
        let store = store();
        let id = store.create("A", 1.0, 2.0).unwrap();

        let affected = store.delete(id).unwrap();
        assert_eq!(affected, 1);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_never_reused_after_delete() {
        let store = store();
        let first = store.create("A", 1.0, 2.0).unwrap();
        store.delete(first).unwrap();

        let second = store.create("B", 3.0, 4.0).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_list_follows_insertion_order() {
        let store = store();
        store.create("A", 0.0, 0.0).unwrap();
        store.create("B", 0.0, 0.0).unwrap();
        store.create("C", 0.0, 0.0).unwrap();

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|a| a.address)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_list_empty_store() {
        assert!(store().list_all().unwrap().is_empty());
    }

    #[test]
    fn test_nearby_filters_by_squared_threshold() {
        let store = store();
        store.create("origin", 0.0, 0.0).unwrap();
        store.create("three", 0.0, 3.0).unwrap();
        store.create("five", 0.0, 5.0).unwrap();

        let hits = store.find_nearby(0.0, 0.0, 4.0).unwrap();
        let names: Vec<&str> = hits.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(names, vec!["origin", "three"]);
    }

    #[test]
    fn test_nearby_boundary_is_inclusive() {
        let store = store();
        store.create("origin", 0.0, 0.0).unwrap();
        store.create("three", 0.0, 3.0).unwrap();

        // 3² <= 3² holds, so the boundary record is included
        let hits = store.find_nearby(0.0, 0.0, 3.0).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_nearby_no_matches_yields_empty() {
        let store = store();
        store.create("far", 50.0, 50.0).unwrap();

        assert!(store.find_nearby(0.0, 0.0, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_nearby_uses_both_axes() {
        let store = store();
        store.create("diagonal", 3.0, 4.0).unwrap();

        // 3² + 4² = 25, exactly on a distance-5 boundary
        assert_eq!(store.find_nearby(0.0, 0.0, 5.0).unwrap().len(), 1);
        assert!(store.find_nearby(0.0, 0.0, 4.9).unwrap().is_empty());
    }

    #[test]
    fn test_reads_are_repeatable() {
        let store = store();
        store.create("A", 1.0, 1.0).unwrap();

        let first = store.find_nearby(0.0, 0.0, 10.0).unwrap();
        let second = store.find_nearby(0.0, 0.0, 10.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_all().unwrap(), store.list_all().unwrap());
    }

    #[test]
    fn test_zero_coordinates_are_storable() {
        let store = store();
        let id = store.create("null island", 0.0, 0.0).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].latitude, 0.0);
        assert_eq!(all[0].longitude, 0.0);
    }
}
