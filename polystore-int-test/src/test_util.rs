use polystore::database::{SqlColumn, SqlColumnType};
use polystore::errors::{ErrorKind, PolyError, PolyResult};
use polystore::{Database, DatabaseConfig};
use polystore_docstore_adapter::DocumentStoreDatabase;
use polystore_sql_adapter::SqliteDatabase;
use std::backtrace::Backtrace;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use std::{env, fs};

/// Runs a test between a `before` that builds its context and an `after`
/// that tears it down. `after` runs even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> PolyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> PolyResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> PolyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx.clone());
                    Err((
                        format!("Test failed on {}: {:?}", ctx.backend(), e),
                        backtrace.to_string(),
                    ))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", message), String::new())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Took {:?}", start_time.elapsed());
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", error);
}

/// Runs the same test once per backend.
pub fn run_on_all_backends<T>(test: T)
where
    T: Fn(TestContext) -> PolyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    run_test(create_sqlite_context, &test, cleanup);
    run_test(create_docstore_context, &test, cleanup);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    DocumentStore,
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::DocumentStore => write!(f, "document store"),
        }
    }
}

#[derive(Clone)]
pub struct TestContext {
    backend: Backend,
    path: Option<String>,
    db: Database,
}

impl TestContext {
    pub fn new(backend: Backend, path: Option<String>, db: Database) -> Self {
        Self { backend, path, db }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }
}

pub fn random_path() -> PolyResult<String> {
    let file = format!("polystore-{}.db", uuid::Uuid::new_v4());
    env::temp_dir()
        .join(file)
        .to_str()
        .map(|path| path.to_string())
        .ok_or_else(|| PolyError::new("Temp path is not valid UTF-8", ErrorKind::InternalError))
}

/// A connected SQLite database in a fresh temp file.
pub fn create_sqlite_context() -> PolyResult<TestContext> {
    let path = random_path()?;
    let config = DatabaseConfig::default().with_file(&path);
    let db = Database::new(SqliteDatabase::new(), config);
    db.connect()?;
    Ok(TestContext::new(Backend::Sqlite, Some(path), db))
}

/// A connected in-memory document store.
pub fn create_docstore_context() -> PolyResult<TestContext> {
    let config = DatabaseConfig::default().with_database("polystore_test");
    let db = Database::new(DocumentStoreDatabase::in_memory(), config);
    db.connect()?;
    Ok(TestContext::new(Backend::DocumentStore, None, db))
}

pub fn cleanup(ctx: TestContext) -> PolyResult<()> {
    let db = ctx.db();
    if db.is_connected() {
        if let Err(e) = db.disconnect() {
            eprintln!("Warning: Failed to disconnect database: {:?}", e);
        }
    }

    if let Some(path) = ctx.path() {
        match fs::remove_file(path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => eprintln!("Warning: Failed to remove test database {}: {:?}", path, e),
        }
    }
    Ok(())
}

/// Creates the `players` table used by most tests.
pub fn create_players_table(db: &Database) -> PolyResult<()> {
    db.create_table_if_not_exists(
        "players",
        &[
            SqlColumn::new("uuid", SqlColumnType::Varchar).with_param("36"),
            SqlColumn::new("name", SqlColumnType::Varchar).with_param("64"),
            SqlColumn::new("coins", SqlColumnType::BigInt),
            SqlColumn::new("level", SqlColumnType::Int),
            SqlColumn::new("online", SqlColumnType::Boolean),
            SqlColumn::new("stats", SqlColumnType::Text),
        ],
    )
}
