#![forbid(unsafe_code)]

pub mod booking;
pub mod common;
pub mod slot;

pub use booking::{BookingAction, BookingEvent, RegistryStatistics};
pub use common::{BookingTimestamp, ContractViolation, Validate};
pub use slot::{SlotId, SlotOccupancy, SlotView, VehicleId};
