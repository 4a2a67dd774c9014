use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::ports::Clock;

/// Wall-clock time source used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
