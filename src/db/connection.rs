use rusqlite::{Connection, OpenFlags};
use std::cell::RefCell;
use std::path::PathBuf;

use crate::errors::TrendError;

// Thread-local connection slot, tagged with the file it was opened on.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = RefCell::new(None);
}

/// Read-only handle on a listings snapshot file.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open (or reuse) the per-thread connection and run `f(conn)`.
    /// A slot opened on a different file is replaced.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, TrendError>
    where
        F: FnOnce(&Connection) -> Result<T, TrendError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();

                let stale = match slot.as_ref() {
                    Some((open_path, _)) => open_path != &self.path,
                    None => true,
                };
                if stale {
                    let conn = Connection::open_with_flags(
                        &self.path,
                        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                    )
                    .map_err(|e| {
                        TrendError::DbError(format!(
                            "Open DB failed ({}): {e}",
                            self.path.display()
                        ))
                    })?;
                    *slot = Some((self.path.clone(), conn));
                }

                match slot.as_ref() {
                    Some((_, conn)) => f(conn),
                    None => Err(TrendError::DbError("connection slot empty".into())),
                }
            })
            .map_err(|_| TrendError::DbError("thread-local connection unavailable".into()))?
    }

    /// Drop this thread's cached connection so the file can be replaced.
    pub fn close(&self) {
        let _ = DB_CONN.try_with(|cell| {
            let mut slot = cell.borrow_mut();
            if matches!(slot.as_ref(), Some((p, _)) if p == &self.path) {
                *slot = None;
            }
        });
    }
}
