//! Unified error type for domain operations
//!
//! Every state transform returns `Result<_, DomainError>` so callers can
//! distinguish "actor missing" from "rule violation" without string matching.

use thiserror::Error;

/// Unified error type for snapshot transforms
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity not found (actor, catalog entry, pending transfer)
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Requester is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Inventory or equipment index is out of range
    #[error("Invalid slot index {index} (len {len})")]
    InvalidSlot { index: usize, len: usize },

    /// Item has no uses remaining
    #[error("No uses left for item {0}")]
    UsesExhausted(String),

    /// Actor cannot pay a skill's SP cost
    #[error("Insufficient SP: have {have}, need {need}")]
    InsufficientSp { have: u32, need: u32 },

    /// Item cannot be equipped
    #[error("Item {0} is not equippable")]
    NotEquippable(String),

    /// Destination grid cell is already occupied
    #[error("Cell ({x}, {y}) is occupied")]
    CellOccupied { x: u8, y: u8 },

    /// No free cell left on the combat grid
    #[error("Combat grid is full")]
    GridFull,
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid slot error
    pub fn invalid_slot(index: usize, len: usize) -> Self {
        Self::InvalidSlot { index, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Character", "123e4567-e89b-12d3-a456-426614174000");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Character"));
        assert!(err.to_string().contains("123e4567"));
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("combat is not active");
        assert_eq!(
            err.to_string(),
            "Constraint violation: combat is not active"
        );
    }

    #[test]
    fn test_insufficient_sp_error() {
        let err = DomainError::InsufficientSp { have: 2, need: 5 };
        assert_eq!(err.to_string(), "Insufficient SP: have 2, need 5");
    }
}
