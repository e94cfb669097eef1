//! APU register address decoding
//!
//! ```text
//! $4000-$4003: Pulse 1
//! $4004-$4007: Pulse 2
//! $4008-$400B: Triangle
//! $400C-$400F: Noise
//! $4010-$4013: DMC
//! $4015:       Status (channel enables / channel state)
//! $4017:       Frame sequencer control
//! ```
//!
//! $4014 (OAM DMA) and $4016 (controller strobe) share the block but belong
//! to other devices, so they decode to nothing.

use super::constants::APU_REGISTER_BASE;

/// One of the five sound channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Pulse1,
    Pulse2,
    Triangle,
    Noise,
    Dmc,
}

impl ChannelId {
    /// All channels in register order
    pub const ALL: [ChannelId; 5] = [
        ChannelId::Pulse1,
        ChannelId::Pulse2,
        ChannelId::Triangle,
        ChannelId::Noise,
        ChannelId::Dmc,
    ];

    /// Bit of this channel in the status register
    pub fn status_bit(self) -> u8 {
        1 << self as u8
    }
}

/// APU register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// One of the 4 registers of a channel (index 0-3)
    Channel(ChannelId, u8),
    /// $4015
    Status,
    /// $4017
    FrameCounter,
}

impl Register {
    /// Decode a CPU address
    pub fn from_address(addr: u16) -> Option<Self> {
        match addr {
            0x4000..=0x4013 => {
                let offset = addr - APU_REGISTER_BASE;
                let channel = ChannelId::ALL[(offset / 4) as usize];
                Some(Register::Channel(channel, (offset % 4) as u8))
            }
            0x4015 => Some(Register::Status),
            0x4017 => Some(Register::FrameCounter),
            _ => None,
        }
    }

    /// CPU address of this register
    pub fn address(self) -> u16 {
        match self {
            Register::Channel(channel, index) => {
                APU_REGISTER_BASE + (channel as u16) * 4 + (index & 0x03) as u16
            }
            Register::Status => 0x4015,
            Register::FrameCounter => 0x4017,
        }
    }
}
