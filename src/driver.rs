//! Low-level frame writer.
//!
//! Turns `(register, payload)` writes into encoded frames and hands them to
//! the selected [`Interface`]. No validation or shadow bookkeeping happens
//! here; that is the job of [`BuzzKill`](crate::BuzzKill).
//!
//! This module is crate-private.

use crate::error::BuzzKillError;
use crate::interface::Interface;
use crate::protocol::Header;

/// Owns the transport and encodes every write into a frame.
pub(crate) struct WireDriver<IF> {
    interface: IF,
}

impl<IF> WireDriver<IF>
where
    IF: Interface,
{
    pub fn new(interface: IF) -> Self {
        Self { interface }
    }

    pub fn release(self) -> IF {
        self.interface
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Write `payload` to a compact register or control command.
    ///
    /// Payloads longer than 255 bytes cannot be framed and are rejected
    /// before anything is sent.
    pub async fn write(
        &mut self,
        register: u8,
        payload: &[u8],
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let len = u8::try_from(payload.len()).map_err(|_| BuzzKillError::InvalidArgument)?;
        let header = Header::encode(register, len);

        #[cfg(feature = "defmt")]
        defmt::trace!("frame: register {} -> {}, {} payload bytes", register, header, len);

        self.interface.send(header, payload).await?;
        Ok(())
    }

    /// Send the bus-specific wake signal.
    pub async fn wake(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.interface.wake().await?;
        Ok(())
    }

    pub fn set_address(&mut self, address: u8) {
        self.interface.set_address(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::SpiInterface;
    use crate::mock::{MockError, SpiLog};
    use embassy_futures::block_on;

    fn driver() -> WireDriver<SpiInterface<SpiLog>> {
        WireDriver::new(SpiInterface::new(SpiLog::default()))
    }

    #[test]
    fn folded_write() {
        let mut d = driver();
        block_on(d.write(10, &[0xAA, 0xBB])).unwrap();
        assert_eq!(d.release().release().wire(), [vec![42, 0xAA, 0xBB]]);
    }

    #[test]
    fn explicit_length_write() {
        let mut d = driver();
        block_on(d.write(10, &[])).unwrap();
        block_on(d.write(0, &[1, 2, 3, 4])).unwrap();
        assert_eq!(
            d.release().release().wire(),
            [vec![40, 0], vec![0, 4, 1, 2, 3, 4]]
        );
    }

    #[test]
    fn control_command_write() {
        let mut d = driver();
        block_on(d.write(249, &[7; 128])).unwrap();
        let wire = d.release().release().wire();
        assert_eq!(wire[0].len(), 129);
        assert_eq!(wire[0][0], 249);
    }

    #[test]
    fn oversized_payload_is_rejected_without_traffic() {
        let mut d = driver();
        let result = block_on(d.write(60, &[0; 256]));
        assert_eq!(result, Err(BuzzKillError::InvalidArgument));
        assert!(d.release().release().transactions.is_empty());
    }

    #[test]
    fn bus_error_propagates() {
        let mut d = WireDriver::new(SpiInterface::new(SpiLog {
            fail: true,
            ..Default::default()
        }));
        assert_eq!(
            block_on(d.write(48, &[0])),
            Err(BuzzKillError::Interface(MockError))
        );
    }
}
