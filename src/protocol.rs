//! Command framing.
//!
//! Every write is a frame: an optional command byte, an optional explicit
//! length byte, then the payload. For compact registers (below 61) the
//! command byte is `register << 2` and short payloads (1–3 bytes) fold their
//! length into the two low bits; empty or longer payloads carry a length
//! byte instead. Control commands (61 and up) are sent verbatim with no
//! length information, except [`CMD_CONTINUE`] which sends no command byte.
//!
//! On I2C a frame is further split into packets of at most
//! [`I2C_PACKET_LIMIT`] bytes. The header always travels in the first packet.

use core::ops::Range;

use crate::registers::{CMD_CONTINUE, COMPACT_LIMIT, I2C_PACKET_LIMIT};

/// Command and length bytes that precede a payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    /// Command byte, or `None` for a continuation frame.
    pub command: Option<u8>,
    /// Explicit length byte, present only for compact registers whose
    /// payload length does not fit in two bits.
    pub length: Option<u8>,
}

impl Header {
    /// Encode the header for a write of `len` bytes to `register`.
    ///
    /// # Example
    /// ```
    /// use buzzkill_driver::protocol::Header;
    ///
    /// let folded = Header::encode(10, 2);
    /// assert_eq!(folded.command, Some(42));
    /// assert_eq!(folded.length, None);
    ///
    /// let explicit = Header::encode(10, 0);
    /// assert_eq!(explicit.command, Some(40));
    /// assert_eq!(explicit.length, Some(0));
    /// ```
    pub const fn encode(register: u8, len: u8) -> Self {
        if register < COMPACT_LIMIT {
            let command = register << 2;
            if len > 0 && len < 4 {
                Self {
                    command: Some(command | len),
                    length: None,
                }
            } else {
                Self {
                    command: Some(command),
                    length: Some(len),
                }
            }
        } else if register == CMD_CONTINUE {
            Self {
                command: None,
                length: None,
            }
        } else {
            Self {
                command: Some(register),
                length: None,
            }
        }
    }

    /// Header bytes in wire order.
    pub fn bytes(&self) -> heapless::Vec<u8, 2> {
        let mut out = heapless::Vec::new();
        // Capacity 2 always fits both optional bytes.
        if let Some(command) = self.command {
            let _ = out.push(command);
        }
        if let Some(length) = self.length {
            let _ = out.push(length);
        }
        out
    }

    /// Payload bytes that fit in the first I2C packet alongside this header.
    ///
    /// One byte of the 32-byte budget is reserved for the command byte and
    /// one more for an explicit length byte.
    pub const fn first_packet_budget(&self) -> usize {
        if self.length.is_some() {
            I2C_PACKET_LIMIT - 2
        } else {
            I2C_PACKET_LIMIT - 1
        }
    }
}

/// One I2C write of a chunked frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Whether the frame header leads this packet.
    pub with_header: bool,
    /// Slice of the payload carried by this packet.
    pub payload: Range<usize>,
    /// The final packet closes the transmission; earlier ones are
    /// continuations.
    ///
    /// Informational only: [`I2cInterface`](crate::I2cInterface) sends
    /// every packet as its own write, so a STOP follows each one.
    pub last: bool,
}

/// Iterator over the packets of a frame. Created by [`packets`].
#[derive(Debug, Clone)]
pub struct Packets {
    budget: usize,
    offset: usize,
    len: usize,
    first: bool,
    done: bool,
}

/// Split a frame with `header` and a `payload_len`-byte payload into
/// I2C packets.
///
/// The first packet carries the header and up to 30 or 31 payload bytes;
/// later packets carry up to 32. An empty payload still yields one packet
/// holding just the header.
pub fn packets(header: &Header, payload_len: usize) -> Packets {
    Packets {
        budget: header.first_packet_budget(),
        offset: 0,
        len: payload_len,
        first: true,
        done: false,
    }
}

impl Iterator for Packets {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        if self.done {
            return None;
        }
        let remaining = self.len - self.offset;
        let count = remaining.min(self.budget);
        let packet = Packet {
            with_header: self.first,
            payload: self.offset..self.offset + count,
            last: count == remaining,
        };
        self.offset += count;
        self.first = false;
        self.budget = I2C_PACKET_LIMIT;
        self.done = packet.last;
        Some(packet)
    }
}
