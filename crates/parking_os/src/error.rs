#![forbid(unsafe_code)]

use parking_contracts::{SlotId, VehicleId};
use parking_storage::StorageError;

/// User-facing rejection of a parking request. Every variant is an input
/// problem answered synchronously; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParkingError {
    #[error("{message}")]
    MissingField { message: &'static str },
    #[error("Invalid Vehicle ID '{vehicle_id}': use 2-16 letters or digits, optionally separated by single '-' or ' '")]
    InvalidVehicleFormat { vehicle_id: String },
    #[error("Slot '{slot_id}' does not exist")]
    SlotNotFound { slot_id: String },
    #[error("Slot '{slot_id}' is already occupied")]
    SlotOccupied { slot_id: SlotId },
    #[error("Vehicle '{vehicle_id}' is already parked in slot '{existing_slot_id}'")]
    VehicleAlreadyParked {
        vehicle_id: VehicleId,
        existing_slot_id: SlotId,
    },
    #[error("Slot '{slot_id}' is already available")]
    SlotAlreadyFree { slot_id: SlotId },
}

impl ParkingError {
    pub const MISSING_BOOK_FIELDS: &'static str = "Missing slot_id or vehicle_id";
    pub const MISSING_RELEASE_FIELDS: &'static str = "Missing slot_id";
    pub const EMPTY_VEHICLE_ID: &'static str = "Vehicle ID cannot be empty";

    pub fn http_status(&self) -> u16 {
        match self {
            ParkingError::MissingField { .. } | ParkingError::InvalidVehicleFormat { .. } => 400,
            ParkingError::SlotNotFound { .. } => 404,
            ParkingError::SlotOccupied { .. }
            | ParkingError::VehicleAlreadyParked { .. }
            | ParkingError::SlotAlreadyFree { .. } => 409,
        }
    }
}

impl From<StorageError> for ParkingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownSlot { slot_id } => ParkingError::SlotNotFound {
                slot_id: slot_id.to_string(),
            },
            StorageError::SlotOccupied { slot_id, .. } => ParkingError::SlotOccupied { slot_id },
            StorageError::SlotAlreadyFree { slot_id } => ParkingError::SlotAlreadyFree { slot_id },
            StorageError::VehicleAlreadyParked {
                vehicle_id,
                slot_id,
            } => ParkingError::VehicleAlreadyParked {
                vehicle_id,
                existing_slot_id: slot_id,
            },
        }
    }
}
