//! Out-of-band teleport signal sent to the destination backend.
//!
//! Encoding, on channel [`SIGNAL_CHANNEL`]:
//! - moved player name: `u16` big-endian byte length, then modified UTF-8
//! - anchor player name: same layout
//!
//! Modified UTF-8 is the `DataOutput.writeUTF` flavour backend listeners
//! read: U+0000 is written as `C0 80` and characters outside the BMP as two
//! three-byte surrogate sequences.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Plugin channel the signal is sent on.
pub const SIGNAL_CHANNEL: ChannelId = ChannelId::new("servertp", "tp");

/// Namespaced plugin channel identifier, displayed as `namespace:name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    /// Owning namespace.
    pub namespace: &'static str,
    /// Channel name within the namespace.
    pub name: &'static str,
}

impl ChannelId {
    /// Build an identifier.
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self { namespace, name }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// A string encodes to more bytes than a `u16` length can describe.
    #[error("encoded string is {len} bytes, limit is 65535")]
    TooLong {
        /// Encoded length.
        len: usize,
    },
    /// Payload ended early.
    #[error("payload truncated: need {need} bytes, got {got}")]
    Truncated {
        /// Bytes required to continue.
        need: usize,
        /// Bytes remaining.
        got: usize,
    },
    /// Bytes are not valid modified UTF-8.
    #[error("invalid modified UTF-8")]
    InvalidEncoding,
}

/// `(moved player, anchor player)` pair delivered to the destination backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportSignal {
    /// Player being teleported.
    pub player: String,
    /// Player whose location the teleported player should be placed at.
    pub target: String,
}

impl TeleportSignal {
    /// Build a signal.
    pub fn new(player: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            target: target.into(),
        }
    }

    /// Encode both names in field order.
    pub fn encode(&self) -> Result<Bytes, SignalError> {
        let mut out = BytesMut::with_capacity(4 + self.player.len() + self.target.len());
        write_utf(&mut out, &self.player)?;
        write_utf(&mut out, &self.target)?;
        Ok(out.freeze())
    }

    /// Decode a payload; bytes after the second string are ignored.
    pub fn decode(mut payload: impl Buf) -> Result<Self, SignalError> {
        let player = read_utf(&mut payload)?;
        let target = read_utf(&mut payload)?;
        Ok(Self { player, target })
    }
}

fn write_utf(out: &mut BytesMut, value: &str) -> Result<(), SignalError> {
    let mut encoded = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => encoded.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                encoded.push(0xc0 | (unit >> 6) as u8);
                encoded.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                encoded.push(0xe0 | (unit >> 12) as u8);
                encoded.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                encoded.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }

    let len = u16::try_from(encoded.len()).map_err(|_| SignalError::TooLong {
        len: encoded.len(),
    })?;
    out.put_u16(len);
    out.put_slice(&encoded);
    Ok(())
}

fn read_utf(payload: &mut impl Buf) -> Result<String, SignalError> {
    if payload.remaining() < 2 {
        return Err(SignalError::Truncated {
            need: 2,
            got: payload.remaining(),
        });
    }
    let len = payload.get_u16() as usize;
    if payload.remaining() < len {
        return Err(SignalError::Truncated {
            need: len,
            got: payload.remaining(),
        });
    }
    let bytes = payload.copy_to_bytes(len);

    let mut units = Vec::with_capacity(len);
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = match b {
            0x00..=0x7f => (b as u16, 1),
            0xc0..=0xdf => {
                let b1 = continuation(&bytes, i + 1)?;
                ((((b & 0x1f) as u16) << 6) | b1, 2)
            }
            0xe0..=0xef => {
                let b1 = continuation(&bytes, i + 1)?;
                let b2 = continuation(&bytes, i + 2)?;
                ((((b & 0x0f) as u16) << 12) | (b1 << 6) | b2, 3)
            }
            _ => return Err(SignalError::InvalidEncoding),
        };
        units.push(unit);
        i += width;
    }

    String::from_utf16(&units).map_err(|_| SignalError::InvalidEncoding)
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16, SignalError> {
    match bytes.get(index) {
        Some(b) if b & 0xc0 == 0x80 => Ok((b & 0x3f) as u16),
        _ => Err(SignalError::InvalidEncoding),
    }
}
