//! Event store database schema.

use kaartmiddag_core::error::DomainError;
use sqlx::PgPool;

/// Channel on which every change to the events table is announced.
pub const CHANGE_CHANNEL: &str = "events_changed";

/// SQL to create the events table and its change trigger.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS events (
    id          UUID PRIMARY KEY,
    document    JSONB NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_events_updated_at
    ON events (updated_at DESC);

CREATE OR REPLACE FUNCTION notify_events_changed() RETURNS trigger AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        PERFORM pg_notify('events_changed', OLD.id::text);
    ELSE
        PERFORM pg_notify('events_changed', NEW.id::text);
    END IF;
    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

DROP TRIGGER IF EXISTS events_changed ON events;

CREATE TRIGGER events_changed
    AFTER INSERT OR UPDATE OR DELETE ON events
    FOR EACH ROW EXECUTE FUNCTION notify_events_changed();
";

/// Creates the schema if it does not exist yet. Safe to run on every start.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if any statement fails.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::raw_sql(CREATE_EVENTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("schema migration failed: {e}")))?;
    Ok(())
}
