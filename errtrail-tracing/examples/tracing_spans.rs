//! Span annotations and logging of handled errors.
//!
//! If you currently use `tracing_subscriber::fmt::init()`, this shows how to
//! expand that setup to add `TrailLayer`.

use errtrail::{TrailError, result_ext::ResultExt};
use errtrail_tracing::{LogExt, SpanExt, TrailLayer};
use tracing::instrument;
use tracing_subscriber::{Registry, layer::SubscriberExt};

#[derive(Debug, thiserror::Error)]
#[error("database query failed")]
struct DatabaseError;

#[instrument(fields(table))]
fn query_database(_table: &str) -> Result<String, TrailError> {
    Err(DatabaseError).annotate()
}

#[instrument(fields(user_id))]
fn check_user_permission(_user_id: u64) -> Result<(), TrailError> {
    query_database("users").annotate_span()?;
    Ok(())
}

fn main() {
    let subscriber = Registry::default()
        .with(TrailLayer)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");

    match check_user_permission(42) {
        Ok(()) => println!("allowed"),
        Err(error) => println!("{error:#}"),
    }

    // Handled here instead of returned: annotated and logged.
    let _ = check_user_permission(7).log_warn();
}
