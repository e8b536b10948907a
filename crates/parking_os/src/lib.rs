#![forbid(unsafe_code)]

pub mod error;
pub mod service;

pub use error::ParkingError;
pub use service::{
    BookingReceipt, ParkingService, ParkingServiceConfig, ParkingStatus, ReleaseReceipt,
};
