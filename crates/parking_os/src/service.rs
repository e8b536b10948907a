#![forbid(unsafe_code)]

use std::sync::Arc;

use parking_contracts::{
    BookingEvent, BookingTimestamp, RegistryStatistics, SlotId, SlotView, VehicleId,
};
use parking_storage::ParkingRegistry;
use tracing::{debug, info, warn};

use crate::error::ParkingError;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkingServiceConfig {
    pub history_default_limit: usize,
}

impl ParkingServiceConfig {
    pub fn mvp_v1() -> Self {
        Self {
            history_default_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Default for ParkingServiceConfig {
    fn default() -> Self {
        Self::mvp_v1()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub slot_id: SlotId,
    pub vehicle_id: VehicleId,
    pub booked_at: BookingTimestamp,
}

impl BookingReceipt {
    pub fn message(&self) -> String {
        format!(
            "Slot '{}' successfully booked for vehicle '{}'",
            self.slot_id, self.vehicle_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReceipt {
    pub slot_id: SlotId,
    pub vehicle_id: VehicleId,
}

impl ReleaseReceipt {
    pub fn message(&self) -> String {
        format!("Slot '{}' has been released", self.slot_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingStatus {
    pub slots: Vec<SlotView>,
    pub statistics: RegistryStatistics,
}

/// Validates raw caller input and drives the registry.
///
/// The pre-checks give precise rejections without touching state; the
/// registry repeats them atomically, so a request that loses a race still
/// gets the same error taxonomy.
#[derive(Clone)]
pub struct ParkingService {
    registry: Arc<ParkingRegistry>,
    config: ParkingServiceConfig,
}

impl ParkingService {
    pub fn new(registry: Arc<ParkingRegistry>, config: ParkingServiceConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ParkingRegistry {
        &self.registry
    }

    pub fn config(&self) -> ParkingServiceConfig {
        self.config
    }

    pub fn parking_status(&self) -> ParkingStatus {
        let slots: Vec<SlotView> = self.registry.list_slots().into_values().collect();
        let total = slots.len();
        let available = slots.iter().filter(|s| s.is_free()).count();
        ParkingStatus {
            slots,
            statistics: RegistryStatistics {
                total,
                available,
                occupied: total - available,
            },
        }
    }

    pub fn book_slot(
        &self,
        slot_id: Option<&str>,
        vehicle_id: Option<&str>,
    ) -> Result<BookingReceipt, ParkingError> {
        let (raw_slot, raw_vehicle) = match (non_empty(slot_id), non_empty(vehicle_id)) {
            (Some(s), Some(v)) => (s, v),
            _ => {
                return reject(ParkingError::MissingField {
                    message: ParkingError::MISSING_BOOK_FIELDS,
                })
            }
        };

        let trimmed_vehicle = raw_vehicle.trim();
        if trimmed_vehicle.is_empty() {
            return reject(ParkingError::MissingField {
                message: ParkingError::EMPTY_VEHICLE_ID,
            });
        }
        let vehicle_id = match VehicleId::new(trimmed_vehicle) {
            Ok(v) => v,
            Err(_) => {
                return reject(ParkingError::InvalidVehicleFormat {
                    vehicle_id: trimmed_vehicle.to_string(),
                })
            }
        };
        let slot_id = self.known_slot(raw_slot)?;

        if !self.registry.is_available(&slot_id) {
            return reject(ParkingError::SlotOccupied { slot_id });
        }
        if let Some(existing_slot_id) = self.registry.find_slot_for_vehicle(&vehicle_id) {
            return reject(ParkingError::VehicleAlreadyParked {
                vehicle_id,
                existing_slot_id,
            });
        }

        match self.registry.book(&slot_id, &vehicle_id) {
            Ok(booked_at) => {
                info!(slot_id = %slot_id, vehicle_id = %vehicle_id, %booked_at, "slot booked");
                Ok(BookingReceipt {
                    slot_id,
                    vehicle_id,
                    booked_at,
                })
            }
            Err(err) => {
                warn!(error = %err, "booking lost a concurrent race");
                Err(err.into())
            }
        }
    }

    pub fn release_slot(&self, slot_id: Option<&str>) -> Result<ReleaseReceipt, ParkingError> {
        let Some(raw_slot) = non_empty(slot_id) else {
            return reject(ParkingError::MissingField {
                message: ParkingError::MISSING_RELEASE_FIELDS,
            });
        };
        let slot_id = self.known_slot(raw_slot)?;

        if self.registry.is_available(&slot_id) {
            return reject(ParkingError::SlotAlreadyFree { slot_id });
        }

        match self.registry.release(&slot_id) {
            Ok(vehicle_id) => {
                info!(slot_id = %slot_id, vehicle_id = %vehicle_id, "slot released");
                Ok(ReleaseReceipt {
                    slot_id,
                    vehicle_id,
                })
            }
            Err(err) => {
                warn!(error = %err, "release lost a concurrent race");
                Err(err.into())
            }
        }
    }

    /// Newest `limit` events in chronological order; the configured default
    /// applies when no limit is given.
    pub fn booking_history(&self, limit: Option<usize>) -> Vec<BookingEvent> {
        self.registry
            .history(Some(limit.unwrap_or(self.config.history_default_limit)))
    }

    pub fn available_slots(&self) -> Vec<SlotId> {
        self.registry.available_slot_ids()
    }

    fn known_slot(&self, raw: &str) -> Result<SlotId, ParkingError> {
        match SlotId::normalize(raw) {
            Ok(slot_id) if self.registry.slot_exists(&slot_id) => Ok(slot_id),
            _ => reject(ParkingError::SlotNotFound {
                slot_id: raw.trim().to_ascii_uppercase(),
            }),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn reject<T>(err: ParkingError) -> Result<T, ParkingError> {
    debug!(status = err.http_status(), reason = %err, "parking request rejected");
    Err(err)
}
