use stitchline_sql::SqlStore;

use crate::service::ProductionError;

/// SQL DDL statements to initialize the production database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for filtering and uniqueness. Every
/// table carries a `factory` column; business keys are unique per
/// factory, not globally.
///
/// `bundle_history` has no `id` — it is an append-only log ordered by
/// the autoincrement `seq`.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS machines (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        code TEXT,
        machine_type TEXT,
        production_line TEXT,
        status TEXT,
        created_at TEXT,
        updated_at TEXT,
        UNIQUE(factory, code)
    )",
    "CREATE TABLE IF NOT EXISTS workers (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        code TEXT,
        designation TEXT,
        production_line TEXT,
        active INTEGER,
        created_at TEXT,
        updated_at TEXT,
        UNIQUE(factory, code)
    )",
    "CREATE TABLE IF NOT EXISTS instructions (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        operation TEXT,
        machine_type TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS checkpoints (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        name TEXT,
        cp_type TEXT,
        is_production_entry INTEGER,
        is_production_exit INTEGER,
        created_at TEXT,
        updated_at TEXT,
        UNIQUE(factory, name)
    )",
    "CREATE TABLE IF NOT EXISTS workorders (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        work_order_no TEXT,
        style_no TEXT,
        garment_type TEXT,
        production_line TEXT,
        created_at TEXT,
        updated_at TEXT,
        UNIQUE(factory, work_order_no)
    )",
    "CREATE TABLE IF NOT EXISTS qrcodes (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        work_order_id TEXT,
        status TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS bundle_history (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        qr_code_id TEXT,
        work_order_id TEXT,
        check_point_name TEXT,
        status TEXT,
        recorded_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS qc_reports (
        id TEXT PRIMARY KEY,
        factory TEXT NOT NULL,
        data TEXT NOT NULL,
        qr_code_id TEXT,
        work_order_id TEXT,
        created_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_qr_factory_status ON qrcodes(factory, status)",
    "CREATE INDEX IF NOT EXISTS idx_qr_workorder ON qrcodes(work_order_id)",
    "CREATE INDEX IF NOT EXISTS idx_hist_code ON bundle_history(qr_code_id)",
    "CREATE INDEX IF NOT EXISTS idx_hist_factory ON bundle_history(factory)",
    "CREATE INDEX IF NOT EXISTS idx_cp_factory ON checkpoints(factory)",
    "CREATE INDEX IF NOT EXISTS idx_wo_factory ON workorders(factory)",
    "CREATE INDEX IF NOT EXISTS idx_machine_line ON machines(production_line)",
    "CREATE INDEX IF NOT EXISTS idx_worker_line ON workers(production_line)",
    "CREATE INDEX IF NOT EXISTS idx_qc_code ON qc_reports(qr_code_id)",
];

pub fn init_schema(sql: &dyn SqlStore) -> Result<(), ProductionError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ProductionError::Store(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
