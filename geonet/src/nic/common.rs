//! Useful base types for implementing a nic.
use crate::layer::{Error, Result};
use crate::time::Instant;

use super::{Handle, Info};

/// A handle representation allowing to set a flag for queueing a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnqueueFlag {
    flag: FlagState,
    info: PacketInfo,
}

/// Packet metadata that is simply copied for each buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketInfo {
    /// The time at which the buffer was handed out.
    pub timestamp: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlagState {
    NotPossible,
    SetTrue(bool),
}

impl EnqueueFlag {
    /// A handle whose `queue` always fails.
    pub fn not_possible(info: PacketInfo) -> Self {
        EnqueueFlag {
            flag: FlagState::NotPossible,
            info,
        }
    }

    /// A handle that records whether `queue` was called.
    pub fn set_true(info: PacketInfo) -> Self {
        EnqueueFlag {
            flag: FlagState::SetTrue(false),
            info,
        }
    }

    /// Whether the packet was queued.
    pub fn was_sent(&self) -> bool {
        match self.flag {
            FlagState::NotPossible => false,
            FlagState::SetTrue(b) => b,
        }
    }
}

impl Handle for EnqueueFlag {
    fn queue(&mut self) -> Result<()> {
        match &mut self.flag {
            FlagState::NotPossible => Err(Error::Illegal),
            FlagState::SetTrue(b) => {
                *b = true;
                Ok(())
            },
        }
    }

    fn info(&self) -> &dyn Info {
        &self.info
    }
}

impl Info for PacketInfo {
    fn timestamp(&self) -> Instant {
        self.timestamp
    }
}
