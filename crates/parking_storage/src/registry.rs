#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use parking_contracts::{
    BookingAction, BookingEvent, BookingTimestamp, RegistryStatistics, SlotId, SlotOccupancy,
    SlotView, VehicleId,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_SLOT_IDS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];

/// Broken caller contract on a mutating registry call. The service layer
/// pre-checks every one of these, so seeing one means a concurrent request
/// won the race or the caller skipped validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("slot {slot_id} is not in the registry")]
    UnknownSlot { slot_id: SlotId },
    #[error("slot {slot_id} is occupied by {occupant}")]
    SlotOccupied { slot_id: SlotId, occupant: VehicleId },
    #[error("slot {slot_id} is already free")]
    SlotAlreadyFree { slot_id: SlotId },
    #[error("vehicle {vehicle_id} already occupies slot {slot_id}")]
    VehicleAlreadyParked {
        vehicle_id: VehicleId,
        slot_id: SlotId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot table: {reason}")]
pub struct SlotTableError {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub slot_ids: Vec<SlotId>,
    /// `None` keeps every event; `Some(n)` drops the oldest once `n` is exceeded.
    pub history_max_entries: Option<usize>,
}

impl RegistryConfig {
    pub fn mvp_v1() -> Self {
        Self {
            slot_ids: DEFAULT_SLOT_IDS
                .iter()
                .filter_map(|id| SlotId::new(*id).ok())
                .collect(),
            history_max_entries: None,
        }
    }

    pub fn with_slot_ids<I, S>(ids: I) -> Result<Self, SlotTableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slot_ids = Vec::new();
        for raw in ids {
            let id = SlotId::normalize(raw.as_ref()).map_err(|v| SlotTableError {
                reason: format!("'{}' {v}", raw.as_ref()),
            })?;
            slot_ids.push(id);
        }
        Ok(Self {
            slot_ids,
            history_max_entries: None,
        })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::mvp_v1()
    }
}

#[derive(Debug)]
struct RegistryState {
    slots: BTreeMap<SlotId, SlotOccupancy>,
    history: VecDeque<BookingEvent>,
}

impl RegistryState {
    fn occupant_slot(&self, vehicle_id: &VehicleId) -> Option<&SlotId> {
        self.slots.iter().find_map(|(slot_id, occupancy)| match occupancy {
            SlotOccupancy::Occupied { vehicle_id: v, .. } if v == vehicle_id => Some(slot_id),
            _ => None,
        })
    }
}

/// Authoritative in-memory slot table plus its booking log.
///
/// One guard covers both so a book or release commits its slot write and its
/// history append together, and every observer sees some total order of
/// whole operations.
pub struct ParkingRegistry {
    state: Mutex<RegistryState>,
    history_max_entries: Option<usize>,
    clock: Box<dyn Clock>,
}

impl ParkingRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self, SlotTableError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: RegistryConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, SlotTableError> {
        if config.slot_ids.is_empty() {
            return Err(SlotTableError {
                reason: "at least one slot is required".to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        for id in &config.slot_ids {
            if !seen.insert(id.clone()) {
                return Err(SlotTableError {
                    reason: format!("duplicate slot '{id}'"),
                });
            }
        }
        let slots = seen
            .into_iter()
            .map(|id| (id, SlotOccupancy::Free))
            .collect();
        Ok(Self {
            state: Mutex::new(RegistryState {
                slots,
                history: VecDeque::new(),
            }),
            history_max_entries: config.history_max_entries,
            clock,
        })
    }

    /// Snapshot of every slot in slot-id order.
    pub fn list_slots(&self) -> BTreeMap<SlotId, SlotView> {
        let state = self.state.lock();
        state
            .slots
            .iter()
            .map(|(id, occupancy)| {
                (
                    id.clone(),
                    SlotView {
                        slot_id: id.clone(),
                        occupancy: occupancy.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn get_slot(&self, slot_id: &SlotId) -> Option<SlotView> {
        let state = self.state.lock();
        state.slots.get(slot_id).map(|occupancy| SlotView {
            slot_id: slot_id.clone(),
            occupancy: occupancy.clone(),
        })
    }

    pub fn slot_exists(&self, slot_id: &SlotId) -> bool {
        self.state.lock().slots.contains_key(slot_id)
    }

    /// False for unknown slots as well as occupied ones.
    pub fn is_available(&self, slot_id: &SlotId) -> bool {
        matches!(
            self.state.lock().slots.get(slot_id),
            Some(SlotOccupancy::Free)
        )
    }

    pub fn find_slot_for_vehicle(&self, vehicle_id: &VehicleId) -> Option<SlotId> {
        self.state.lock().occupant_slot(vehicle_id).cloned()
    }

    /// Parks `vehicle_id` in `slot_id` and returns the booking time.
    ///
    /// Existence, vacancy and vehicle uniqueness are re-checked under the same
    /// guard as the write; a failed check leaves state and history untouched.
    pub fn book(
        &self,
        slot_id: &SlotId,
        vehicle_id: &VehicleId,
    ) -> Result<BookingTimestamp, StorageError> {
        let mut state = self.state.lock();
        match state.slots.get(slot_id) {
            None => {
                return Err(StorageError::UnknownSlot {
                    slot_id: slot_id.clone(),
                })
            }
            Some(SlotOccupancy::Occupied { vehicle_id: v, .. }) => {
                return Err(StorageError::SlotOccupied {
                    slot_id: slot_id.clone(),
                    occupant: v.clone(),
                })
            }
            Some(SlotOccupancy::Free) => {}
        }
        if let Some(existing) = state.occupant_slot(vehicle_id) {
            return Err(StorageError::VehicleAlreadyParked {
                vehicle_id: vehicle_id.clone(),
                slot_id: existing.clone(),
            });
        }

        let now = self.clock.now();
        state.slots.insert(
            slot_id.clone(),
            SlotOccupancy::Occupied {
                vehicle_id: vehicle_id.clone(),
                since: now,
            },
        );
        self.append_event(
            &mut state,
            BookingEvent {
                action: BookingAction::Book,
                slot_id: slot_id.clone(),
                vehicle_id: vehicle_id.clone(),
                timestamp: now,
            },
        );
        Ok(now)
    }

    /// Frees `slot_id` and returns the vehicle that held it.
    pub fn release(&self, slot_id: &SlotId) -> Result<VehicleId, StorageError> {
        let mut state = self.state.lock();
        let vehicle_id = match state.slots.get(slot_id) {
            None => {
                return Err(StorageError::UnknownSlot {
                    slot_id: slot_id.clone(),
                })
            }
            Some(SlotOccupancy::Free) => {
                return Err(StorageError::SlotAlreadyFree {
                    slot_id: slot_id.clone(),
                })
            }
            Some(SlotOccupancy::Occupied { vehicle_id, .. }) => vehicle_id.clone(),
        };

        let now = self.clock.now();
        state.slots.insert(slot_id.clone(), SlotOccupancy::Free);
        self.append_event(
            &mut state,
            BookingEvent {
                action: BookingAction::Release,
                slot_id: slot_id.clone(),
                vehicle_id: vehicle_id.clone(),
                timestamp: now,
            },
        );
        Ok(vehicle_id)
    }

    pub fn statistics(&self) -> RegistryStatistics {
        let state = self.state.lock();
        let total = state.slots.len();
        let available = state
            .slots
            .values()
            .filter(|o| matches!(o, SlotOccupancy::Free))
            .count();
        RegistryStatistics {
            total,
            available,
            occupied: total - available,
        }
    }

    pub fn available_slot_ids(&self) -> Vec<SlotId> {
        let state = self.state.lock();
        state
            .slots
            .iter()
            .filter(|(_, o)| matches!(o, SlotOccupancy::Free))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Chronological copy of the log; with `limit`, only the newest `limit` entries.
    pub fn history(&self, limit: Option<usize>) -> Vec<BookingEvent> {
        let state = self.state.lock();
        let skip = match limit {
            Some(n) => state.history.len().saturating_sub(n),
            None => 0,
        };
        state.history.iter().skip(skip).cloned().collect()
    }

    fn append_event(&self, state: &mut RegistryState, event: BookingEvent) {
        state.history.push_back(event);
        if let Some(max) = self.history_max_entries {
            while state.history.len() > max {
                if let Some(evicted) = state.history.pop_front() {
                    debug!(
                        slot_id = %evicted.slot_id,
                        action = evicted.action.as_str(),
                        "history retention evicted oldest event"
                    );
                }
            }
        }
    }
}
