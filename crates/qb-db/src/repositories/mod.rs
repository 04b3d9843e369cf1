// All repository functions are generic over `E: Executor<'e, Database = Sqlite>`
// so they accept both a `&SqlitePool` (direct query) and a `&mut Transaction` (atomic operations).
// Bulk inserts take a connection because they issue one statement per row.

pub mod bank;
pub mod question;
pub mod record;
