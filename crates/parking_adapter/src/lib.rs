#![forbid(unsafe_code)]

use std::sync::Arc;

use parking_contracts::{BookingEvent, SlotId, SlotView};
use parking_os::{ParkingError, ParkingService};
use parking_storage::ParkingRegistry;

pub mod config;
pub mod http;

pub use config::{AdapterConfig, AdapterConfigError};

pub const HEALTH_MESSAGE: &str = "Smart Parking System API is running";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const INVALID_LIMIT_MESSAGE: &str = "limit must be a non-negative integer";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotStatusRow {
    pub slot_id: String,
    pub status: String,
    pub vehicle_id: Option<String>,
    pub booked_at: Option<String>,
}

impl From<&SlotView> for SlotStatusRow {
    fn from(view: &SlotView) -> Self {
        let status = if view.is_free() { "available" } else { "occupied" };
        Self {
            slot_id: view.slot_id.to_string(),
            status: status.to_string(),
            vehicle_id: view.occupant().map(ToString::to_string),
            booked_at: view.since().map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParkingStatusResponse {
    pub success: bool,
    pub slots: Vec<SlotStatusRow>,
    pub available_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookSlotRequest {
    pub slot_id: Option<String>,
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookSlotResponse {
    pub success: bool,
    pub message: String,
    pub slot_id: String,
    pub vehicle_id: String,
    pub booked_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReleaseSlotRequest {
    pub slot_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReleaseSlotResponse {
    pub success: bool,
    pub message: String,
    pub slot_id: String,
    pub vehicle_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<BookingEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailableSlotsResponse {
    pub success: bool,
    pub available_slots: Vec<SlotId>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// A rejected request: HTTP status plus the `{success:false,message}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRejection {
    pub status: u16,
    pub body: ErrorResponse,
}

impl AdapterRejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                message: message.into(),
            },
        }
    }
}

impl From<ParkingError> for AdapterRejection {
    fn from(err: ParkingError) -> Self {
        Self::new(err.http_status(), err.to_string())
    }
}

/// Shapes service results into the JSON payloads served under `/api`.
#[derive(Clone)]
pub struct ParkingAdapterRuntime {
    service: ParkingService,
}

impl ParkingAdapterRuntime {
    pub fn new(service: ParkingService) -> Self {
        Self { service }
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self, AdapterConfigError> {
        let registry = ParkingRegistry::new(config.registry.clone())?;
        Ok(Self::new(ParkingService::new(
            Arc::new(registry),
            config.service,
        )))
    }

    pub fn service(&self) -> &ParkingService {
        &self.service
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            success: true,
            message: HEALTH_MESSAGE.to_string(),
        }
    }

    pub fn parking_status(&self) -> ParkingStatusResponse {
        let status = self.service.parking_status();
        ParkingStatusResponse {
            success: true,
            slots: status.slots.iter().map(SlotStatusRow::from).collect(),
            available_count: status.statistics.available,
            total_count: status.statistics.total,
        }
    }

    pub fn book_slot(
        &self,
        request: BookSlotRequest,
    ) -> Result<BookSlotResponse, AdapterRejection> {
        let receipt = self
            .service
            .book_slot(request.slot_id.as_deref(), request.vehicle_id.as_deref())?;
        Ok(BookSlotResponse {
            success: true,
            message: receipt.message(),
            slot_id: receipt.slot_id.to_string(),
            vehicle_id: receipt.vehicle_id.to_string(),
            booked_at: receipt.booked_at.to_rfc3339(),
        })
    }

    pub fn release_slot(
        &self,
        request: ReleaseSlotRequest,
    ) -> Result<ReleaseSlotResponse, AdapterRejection> {
        let receipt = self.service.release_slot(request.slot_id.as_deref())?;
        Ok(ReleaseSlotResponse {
            success: true,
            message: receipt.message(),
            slot_id: receipt.slot_id.to_string(),
            vehicle_id: receipt.vehicle_id.to_string(),
        })
    }

    pub fn booking_history(&self, limit: Option<usize>) -> HistoryResponse {
        HistoryResponse {
            success: true,
            history: self.service.booking_history(limit),
        }
    }

    pub fn available_slots(&self) -> AvailableSlotsResponse {
        let available_slots = self.service.available_slots();
        AvailableSlotsResponse {
            success: true,
            count: available_slots.len(),
            available_slots,
        }
    }
}
