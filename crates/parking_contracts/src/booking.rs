#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{BookingTimestamp, SlotId, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Book,
    Release,
}

impl BookingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingAction::Book => "book",
            BookingAction::Release => "release",
        }
    }
}

/// Append-only audit record of one successful book or release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub action: BookingAction,
    pub slot_id: SlotId,
    pub vehicle_id: VehicleId,
    pub timestamp: BookingTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStatistics {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
}
