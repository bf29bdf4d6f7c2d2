//! Transfer negotiation request types

use serde::{Deserialize, Serialize};

use tableforge_domain::{ActorKey, TransferId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferRequest {
    /// Offer the whole inventory slot at `slot_index` to another actor
    Offer {
        from: ActorKey,
        to: ActorKey,
        slot_index: usize,
    },
    /// Recipient's answer to a pending offer
    Respond {
        transfer_id: TransferId,
        accept: bool,
    },
    /// Sender withdraws a pending offer
    Cancel {
        transfer_id: TransferId,
    },
}
