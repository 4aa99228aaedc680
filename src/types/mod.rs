mod listing;

pub use listing::*;

use alloy::primitives::TxHash;

/// ID of a marketplace listing, assigned by the contract at creation.
pub type ListingId = u64;

/// Instant in chain history the state/event is up to date with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }
}

/// Marketplace events from a specific block.
#[derive(Debug)]
pub struct BlockEvents<T> {
    instant: StateInstant,
    events: Vec<T>,
}

impl<T> BlockEvents<T> {
    pub(crate) fn new(instant: StateInstant, events: Vec<T>) -> Self {
        Self { instant, events }
    }

    /// Instant the events produced at.
    pub fn instant(&self) -> StateInstant {
        self.instant
    }

    pub fn events(&self) -> &[T] {
        &self.events
    }
}

/// Event along with transaction context.
#[derive(Debug)]
pub struct EventContext<T> {
    pub(crate) tx_hash: TxHash,
    pub(crate) log_index: u64,
    pub(crate) event: T,
}

impl<T> EventContext<T> {
    pub(crate) fn new(tx_hash: TxHash, log_index: u64, event: T) -> Self {
        Self {
            tx_hash,
            log_index,
            event,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    pub fn event(&self) -> &T {
        &self.event
    }
}
