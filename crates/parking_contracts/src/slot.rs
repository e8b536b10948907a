#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BookingTimestamp, ContractViolation, Validate};

pub const SLOT_ID_MAX_LEN: usize = 16;
pub const VEHICLE_ID_MIN_ALNUM: usize = 2;
pub const VEHICLE_ID_MAX_ALNUM: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId(String);

impl SlotId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    /// Trims and upper-cases caller input before validating, so `" a1 "` names `A1`.
    pub fn normalize(raw: &str) -> Result<Self, ContractViolation> {
        Self::new(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for SlotId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "slot_id",
                reason: "must not be empty",
            });
        }
        if self.0.len() > SLOT_ID_MAX_LEN {
            return Err(ContractViolation::InvalidValue {
                field: "slot_id",
                reason: "too long",
            });
        }
        if !self.0.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ContractViolation::InvalidValue {
                field: "slot_id",
                reason: "must be ASCII alphanumeric",
            });
        }
        Ok(())
    }
}

impl TryFrom<String> for SlotId {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlotId> for String {
    fn from(value: SlotId) -> Self {
        value.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plate-like vehicle identifier: letters and digits in groups separated by a
/// single `-` or space. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    pub fn normalize(raw: &str) -> Result<Self, ContractViolation> {
        Self::new(raw.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for VehicleId {
    fn validate(&self) -> Result<(), ContractViolation> {
        let bytes = self.0.as_bytes();
        if bytes.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "vehicle_id",
                reason: "must not be empty",
            });
        }
        let is_sep = |b: u8| b == b'-' || b == b' ';
        if !bytes.iter().all(|&b| b.is_ascii_alphanumeric() || is_sep(b)) {
            return Err(ContractViolation::InvalidValue {
                field: "vehicle_id",
                reason: "must contain only letters, digits, '-' or ' '",
            });
        }
        if is_sep(bytes[0]) || is_sep(bytes[bytes.len() - 1]) {
            return Err(ContractViolation::InvalidValue {
                field: "vehicle_id",
                reason: "must start and end with a letter or digit",
            });
        }
        if bytes.windows(2).any(|w| is_sep(w[0]) && is_sep(w[1])) {
            return Err(ContractViolation::InvalidValue {
                field: "vehicle_id",
                reason: "separators must not repeat",
            });
        }
        let alnum = bytes.iter().filter(|b| b.is_ascii_alphanumeric()).count();
        if !(VEHICLE_ID_MIN_ALNUM..=VEHICLE_ID_MAX_ALNUM).contains(&alnum) {
            return Err(ContractViolation::InvalidValue {
                field: "vehicle_id",
                reason: "must hold 2-16 letters or digits",
            });
        }
        Ok(())
    }
}

impl TryFrom<String> for VehicleId {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VehicleId> for String {
    fn from(value: VehicleId) -> Self {
        value.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOccupancy {
    Free,
    Occupied {
        vehicle_id: VehicleId,
        since: BookingTimestamp,
    },
}

/// Point-in-time copy of one slot. Never aliases registry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub slot_id: SlotId,
    pub occupancy: SlotOccupancy,
}

impl SlotView {
    pub fn free(slot_id: SlotId) -> Self {
        Self {
            slot_id,
            occupancy: SlotOccupancy::Free,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.occupancy, SlotOccupancy::Free)
    }

    pub fn occupant(&self) -> Option<&VehicleId> {
        match &self.occupancy {
            SlotOccupancy::Free => None,
            SlotOccupancy::Occupied { vehicle_id, .. } => Some(vehicle_id),
        }
    }

    pub fn since(&self) -> Option<BookingTimestamp> {
        match &self.occupancy {
            SlotOccupancy::Free => None,
            SlotOccupancy::Occupied { since, .. } => Some(*since),
        }
    }
}
