//! Domain operations over the store.
//!
//! Every function here runs as exactly one store transaction and enforces
//! ownership itself; callers only supply the authenticated subject id.

pub mod comments;
pub mod entries;
pub mod history;
pub mod users;

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Current time at the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The `updated_at` for a row last touched at `previous`. Always strictly later
/// than `previous`, even if the clock has not moved on.
pub(crate) fn bump(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now > floor { now } else { floor }
}
