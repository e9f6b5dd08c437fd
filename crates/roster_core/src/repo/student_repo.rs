//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide async CRUD and listing APIs over the `students` table.
//! - Keep SQL and transaction details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation obtains the shared connection first; an open failure
//!   is returned unchanged.
//! - Every operation runs in its own transaction and returns exactly once.
//! - Business-key lookups go through `idx_students_registration`.
//! - Uniqueness is left to the index; `create` never pre-checks.

use crate::db::migrations::{REGISTRATION_INDEX, STUDENTS_TABLE};
use crate::db::ConnectionManager;
use crate::error::{StoreError, StoreResult};
use crate::model::student::Student;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::sync::Arc;
use std::time::Instant;

const STUDENT_COLUMNS: &str = "registration, national_id, name, email, phone";

/// Repository interface for student records.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Looks a record up by business key. Absence is `Ok(None)`.
    async fn find_by_registration(&self, registration: &str) -> StoreResult<Option<Student>>;
    /// All records, ascending by registration.
    async fn list_ordered_by_registration(&self) -> StoreResult<Vec<Student>>;
    /// All records in the order they were created.
    async fn list_in_insertion_order(&self) -> StoreResult<Vec<Student>>;
    async fn create(&self, student: &Student) -> StoreResult<()>;
    /// Replaces the stored profile of an existing record.
    async fn update(&self, student: &Student) -> StoreResult<()>;
    async fn delete(&self, student: &Student) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}

/// SQLite-backed student repository.
///
/// Cheap to clone; clones share the same [`ConnectionManager`].
#[derive(Debug, Clone)]
pub struct SqliteStudentRepository {
    manager: Arc<ConnectionManager>,
}

impl SqliteStudentRepository {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Repository over the process-wide [`ConnectionManager::shared`].
    pub fn shared() -> Self {
        Self::new(ConnectionManager::shared())
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Runs `work` against the shared connection on the blocking pool.
    async fn run<T, F>(&self, op: &'static str, work: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = self.manager.obtain_connection().await?;
        let started_at = Instant::now();

        let joined = tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Db("connection mutex poisoned".to_string()))?;
            work(&mut guard)
        })
        .await;
        let result = match joined {
            Ok(result) => result,
            Err(join_err) => Err(StoreError::Db(format!("store task failed: {join_err}"))),
        };

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => debug!("event=student_{op} module=repo status=ok duration_ms={duration_ms}"),
            Err(err @ StoreError::NotFound { .. }) => warn!(
                "event=student_{op} module=repo status=error duration_ms={} error_code={}",
                duration_ms,
                err.code()
            ),
            Err(err) => error!(
                "event=student_{op} module=repo status=error duration_ms={} error_code={} error={}",
                duration_ms,
                err.code(),
                err
            ),
        }
        result
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepository {
    async fn find_by_registration(&self, registration: &str) -> StoreResult<Option<Student>> {
        let registration = registration.trim().to_string();
        debug!("event=student_find module=repo status=start registration={registration}");
        self.run("find", move |conn| find_student(conn, &registration))
            .await
    }

    async fn list_ordered_by_registration(&self) -> StoreResult<Vec<Student>> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM {STUDENTS_TABLE} INDEXED BY {REGISTRATION_INDEX}
             ORDER BY registration ASC;"
        );
        self.run("list_by_registration", move |conn| list_students(conn, &sql))
            .await
    }

    async fn list_in_insertion_order(&self) -> StoreResult<Vec<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM {STUDENTS_TABLE} ORDER BY id ASC;");
        self.run("list_by_insertion", move |conn| list_students(conn, &sql))
            .await
    }

    async fn create(&self, student: &Student) -> StoreResult<()> {
        let student = student.clone();
        self.run("create", move |conn| insert_student(conn, &student))
            .await?;
        info!("event=student_create module=repo status=ok");
        Ok(())
    }

    async fn update(&self, student: &Student) -> StoreResult<()> {
        let student = student.clone();
        self.run("update", move |conn| {
            let tx = begin(conn, TransactionBehavior::Immediate)?;
            let id = seek_registration(&tx, student.registration())?;
            let mut stmt = tx
                .prepare(&format!(
                    "UPDATE {STUDENTS_TABLE}
                     SET national_id = ?1, name = ?2, email = ?3, phone = ?4
                     WHERE id = ?5;"
                ))
                .map_err(setup_error)?;
            stmt.execute(params![
                student.national_id(),
                student.name(),
                student.email(),
                student.phone(),
                id,
            ])
            .map_err(db_error)?;
            drop(stmt);
            tx.commit().map_err(db_error)
        })
        .await?;
        info!("event=student_update module=repo status=ok");
        Ok(())
    }

    async fn delete(&self, student: &Student) -> StoreResult<()> {
        let registration = student.registration().to_string();
        self.run("delete", move |conn| {
            let tx = begin(conn, TransactionBehavior::Immediate)?;
            let id = seek_registration(&tx, &registration)?;
            tx.execute(&format!("DELETE FROM {STUDENTS_TABLE} WHERE id = ?1;"), [id])
                .map_err(db_error)?;
            tx.commit().map_err(db_error)
        })
        .await?;
        info!("event=student_delete module=repo status=ok");
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        self.run("count", |conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT COUNT(*) FROM {STUDENTS_TABLE};"))
                .map_err(setup_error)?;
            let total: i64 = stmt.query_row([], |row| row.get(0)).map_err(db_error)?;
            u64::try_from(total)
                .map_err(|_| StoreError::InvalidData(format!("negative row count `{total}`")))
        })
        .await
    }
}

fn begin(conn: &mut Connection, behavior: TransactionBehavior) -> StoreResult<Transaction<'_>> {
    conn.transaction_with_behavior(behavior)
        .map_err(setup_error)
}

fn find_student(conn: &mut Connection, registration: &str) -> StoreResult<Option<Student>> {
    let tx = begin(conn, TransactionBehavior::Deferred)?;
    let found = {
        let mut stmt = tx
            .prepare(&format!(
                "SELECT {STUDENT_COLUMNS} FROM {STUDENTS_TABLE} INDEXED BY {REGISTRATION_INDEX}
                 WHERE registration = ?1;"
            ))
            .map_err(setup_error)?;
        let mut rows = stmt.query([registration]).map_err(db_error)?;
        match rows.next().map_err(db_error)? {
            Some(row) => Some(parse_student_row(row)?),
            None => None,
        }
    };
    tx.commit().map_err(db_error)?;
    Ok(found)
}

fn list_students(conn: &mut Connection, sql: &str) -> StoreResult<Vec<Student>> {
    let tx = begin(conn, TransactionBehavior::Deferred)?;
    let students = {
        let mut stmt = tx.prepare(sql).map_err(setup_error)?;
        let mut rows = stmt.query([]).map_err(db_error)?;
        let mut students = Vec::new();
        while let Some(row) = rows.next().map_err(db_error)? {
            students.push(parse_student_row(row)?);
        }
        students
    };
    tx.commit().map_err(db_error)?;
    Ok(students)
}

fn insert_student(conn: &mut Connection, student: &Student) -> StoreResult<()> {
    let tx = begin(conn, TransactionBehavior::Immediate)?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {STUDENTS_TABLE} ({STUDENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5);"
            ))
            .map_err(setup_error)?;
        let inserted = stmt.execute(params![
            student.registration(),
            student.national_id(),
            student.name(),
            student.email(),
            student.phone(),
        ]);
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(StoreError::Duplicate {
                    registration: student.registration().to_string(),
                });
            }
            Err(err) => return Err(db_error(err)),
        }
    }
    tx.commit().map_err(db_error)
}

/// Positions on the row holding `registration` and returns its row id.
///
/// A hit whose stored key differs from the requested one is treated as a
/// miss, so callers always get a definite `NotFound`.
fn seek_registration(tx: &Transaction<'_>, registration: &str) -> StoreResult<i64> {
    let mut stmt = tx
        .prepare(&format!(
            "SELECT id, registration FROM {STUDENTS_TABLE} INDEXED BY {REGISTRATION_INDEX}
             WHERE registration = ?1;"
        ))
        .map_err(setup_error)?;
    let hit = stmt
        .query_row([registration], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .optional()
        .map_err(db_error)?;

    match hit {
        Some((id, stored)) if stored == registration => Ok(id),
        _ => Err(StoreError::NotFound {
            registration: registration.to_string(),
        }),
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    let student = Student::new(
        row.get::<_, String>("registration").map_err(db_error)?,
        row.get::<_, String>("national_id").map_err(db_error)?,
        row.get::<_, String>("name").map_err(db_error)?,
        row.get::<_, String>("email").map_err(db_error)?,
        row.get::<_, String>("phone").map_err(db_error)?,
    )?;
    Ok(student)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn setup_error(err: rusqlite::Error) -> StoreError {
    StoreError::TransactionSetup(err.to_string())
}

fn db_error(err: rusqlite::Error) -> StoreError {
    StoreError::Db(err.to_string())
}
