//! Movie night records

pub mod attendee;
pub mod extdata;
pub mod movie;
pub mod night;
pub mod user;

pub use attendee::{title_case, Attendee, AttendeeName, Oligarchs};
pub use extdata::ExtData;
pub use movie::{Movie, MovieOverride};
pub use night::Night;
pub use user::User;

use crate::db::Store;
use crate::Result;
use chrono::{Local, NaiveDateTime};

/// Format of stored local timestamps (`update_time`, `last_update`, logins)
pub const NOW_FIELD_FMT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current local time in [`NOW_FIELD_FMT`]
pub fn now_field() -> String {
    Local::now().format(NOW_FIELD_FMT).to_string()
}

/// Parse a timestamp written by [`now_field`]
pub fn parse_now_field(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Create the tables for every record type
pub async fn ensure_tables<S: Store>(store: &S) -> Result<()> {
    store.ensure_table::<Movie>().await?;
    store.ensure_table::<MovieOverride>().await?;
    store.ensure_table::<Night>().await?;
    store.ensure_table::<Attendee>().await?;
    store.ensure_table::<User>().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_field_round_trip() {
        let stamp = now_field();
        assert!(parse_now_field(&stamp).is_some(), "{}", stamp);
        assert!(parse_now_field("yesterday").is_none());
    }
}
