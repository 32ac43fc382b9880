/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` so table DDL can be built with
/// `const_format::concatcp!` at compile time.
///
/// This trait contains no I/O — it purely describes table structure.
/// Actual queries live in each domain crate's repository trait (see
/// `rbp-auth::AuthRepository`, `rbp-records::RecordsRepository`).
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
    /// Returns `TRUNCATE TABLE` statement for clearing data.
    fn truncates() -> &'static str;
}
