//! Error text for tokio-postgres and pool failures.
//!
//! `tokio_postgres::Error` displays a server-side failure as just `db error`.
//! The helpers here pull the server's own report out of it so the caller sees
//! what actually went wrong.

use deadpool_postgres::PoolError;

use crate::error::NlsqlError;

/// `SEVERITY: message (SQLSTATE code)` for server errors, followed by any
/// detail and hint. Client-side errors get their immediate cause appended.
pub(crate) fn pg_message(err: &tokio_postgres::Error) -> String {
    let Some(db) = err.as_db_error() else {
        return match std::error::Error::source(err) {
            Some(cause) => format!("{}: {}", err, cause),
            None => err.to_string(),
        };
    };

    let mut msg = format!(
        "{}: {} (SQLSTATE {})",
        db.severity(),
        db.message(),
        db.code().code()
    );
    if let Some(detail) = db.detail() {
        msg.push_str("\nDETAIL: ");
        msg.push_str(detail);
    }
    if let Some(hint) = db.hint() {
        msg.push_str("\nHINT: ");
        msg.push_str(hint);
    }
    msg
}

pub(crate) fn pool_message(err: &PoolError) -> String {
    match err {
        PoolError::Backend(e) => pg_message(e),
        other => other.to_string(),
    }
}

/// Query failure carrying the driver error as its source.
pub(crate) fn query_error(err: tokio_postgres::Error) -> NlsqlError {
    NlsqlError::query(pg_message(&err)).with_source(err)
}
