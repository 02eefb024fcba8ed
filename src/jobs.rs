use tokio_schedule::{every, Job};

use crate::prelude::*;

pub async fn init(state: SharedAppState) {
    let tz = state.config.app.tz;

    let state_ = state.clone();
    tokio::spawn(
        every(1)
            .hour()
            .at(0, 0)
            .in_timezone(&tz)
            .perform(move || sweep_expired_sessions(state_.clone())),
    );
}

/// Expired sessions are already rejected by validation; this just keeps
/// the table from growing without bound.
async fn sweep_expired_sessions(state: SharedAppState) {
    let ttl = state.config.admin.session_ttl();
    let _ = Session::delete_expired(&state.db, Utc::now(), ttl).await;
}
