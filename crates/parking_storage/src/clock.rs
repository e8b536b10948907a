#![forbid(unsafe_code)]

use parking_contracts::BookingTimestamp;

/// Source of booking timestamps. Read only while the registry guard is held.
pub trait Clock: Send + Sync {
    fn now(&self) -> BookingTimestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> BookingTimestamp {
        BookingTimestamp::now()
    }
}
