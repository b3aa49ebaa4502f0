use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ledger_testing_core::scenario::DynError;

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> Result<u64, DynError> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| format!("system clock is before the unix epoch: {err}"))?;
    Ok(since_epoch.as_secs())
}

/// Staking window in unix seconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StakeWindow {
    pub start: u64,
    pub end: u64,
}

impl StakeWindow {
    /// Window opening `delay` after `now` and lasting `period`.
    pub fn starting_at(now: u64, delay: Duration, period: Duration) -> Result<Self, DynError> {
        let start = now
            .checked_add(delay.as_secs())
            .ok_or("stake start time overflows")?;
        let end = start
            .checked_add(period.as_secs())
            .ok_or("stake end time overflows")?;
        if end <= start {
            return Err("staking period must be at least one second".into());
        }
        Ok(Self { start, end })
    }

    /// Window opening `delay` from now.
    pub fn from_now(delay: Duration, period: Duration) -> Result<Self, DynError> {
        Self::starting_at(unix_now()?, delay, period)
    }
}
