#![forbid(unsafe_code)]

pub mod clock;
pub mod registry;

pub use clock::{Clock, SystemClock};
pub use registry::{
    ParkingRegistry, RegistryConfig, SlotTableError, StorageError, DEFAULT_SLOT_IDS,
};
