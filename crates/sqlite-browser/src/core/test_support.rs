use rusqlite::Connection;
use tempfile::TempDir;

/// `users` (5 rows, mixed text columns) and `measurements` (numeric only) in a temp file.
pub fn fixture_db() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fixture.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email VARCHAR,
            age INTEGER
        );
        INSERT INTO users (id, name, email, age) VALUES
            (1, 'alice', 'alice@example.com', 30),
            (2, 'bob', 'bob@example.com', 25),
            (3, 'carol', NULL, 41),
            (4, 'dave', 'dave@sample.org', 35),
            (5, 'erin', 'erin@example.com', NULL);
        CREATE TABLE measurements (
            id INTEGER PRIMARY KEY,
            reading REAL,
            sensor INTEGER
        );
        INSERT INTO measurements (reading, sensor) VALUES (1.5, 1), (2.5, 2), (3.5, 1);",
    )
    .unwrap();
    (dir, conn)
}

/// A table of `n` numbered rows, for paging tests.
pub fn numbered_db(n: u64) -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("numbers.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE numbers (n INTEGER PRIMARY KEY, label TEXT);")
        .unwrap();
    for i in 1..=n {
        conn.execute(
            "INSERT INTO numbers (n, label) VALUES (?1, ?2)",
            rusqlite::params![i as i64, format!("row {i}")],
        )
        .unwrap();
    }
    (dir, conn)
}
