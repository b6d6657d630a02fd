//! Bus back ends.
//!
//! The board listens on either SPI or I2C. [`Interface`] is the seam between
//! the framing logic and the bus: it receives a [`Header`] plus payload and
//! emits them however its bus requires.
//!
//! - [`SpiInterface`] sends each frame as one `SpiDevice` transaction, so
//!   chip select stays asserted from the command byte to the last payload
//!   byte.
//! - [`I2cInterface`] splits frames into packets of at most 32 bytes.
//! - [`NoInterface`] is the state before a bus is chosen. It accepts every
//!   frame and sends nothing.

use core::convert::Infallible;

use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::protocol::{packets, Header};
use crate::registers::{I2C_PACKET_LIMIT, WAKE_BYTE};

/// Length of the chip select pulse that wakes the board over SPI.
const WAKE_PULSE_NS: u32 = 1_000_000;

/// A transport that can carry BuzzKill frames.
#[allow(async_fn_in_trait)]
pub trait Interface {
    /// Bus error type.
    type Error;

    /// Emit one frame. `payload` is at most 255 bytes.
    async fn send(&mut self, header: Header, payload: &[u8]) -> Result<(), Self::Error>;

    /// Send the out-of-band wake signal.
    async fn wake(&mut self) -> Result<(), Self::Error>;

    /// Follow a device address change. Buses without addressing ignore it.
    fn set_address(&mut self, _address: u8) {}
}

// ---------------------------------------------------------------------------
// No bus selected
// ---------------------------------------------------------------------------

/// Placeholder transport used until `begin_spi` or `begin_i2c` is called.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterface;

impl Interface for NoInterface {
    type Error = Infallible;

    async fn send(&mut self, _header: Header, _payload: &[u8]) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wake(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SPI
// ---------------------------------------------------------------------------

/// SPI transport.
///
/// The `SpiDevice` owns chip select and bus configuration; configure it for
/// mode 0, MSB first, at [`SPI_FREQUENCY_HZ`](crate::SPI_FREQUENCY_HZ).
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Borrow the SPI device.
    pub fn device(&self) -> &SPI {
        &self.spi
    }

    pub fn device_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Give back the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    async fn send(&mut self, header: Header, payload: &[u8]) -> Result<(), SPI::Error> {
        let header = header.bytes();
        self.spi
            .transaction(&mut [Operation::Write(header.as_slice()), Operation::Write(payload)])
            .await
    }

    /// Hold chip select low for 1 ms without clocking any data.
    async fn wake(&mut self) -> Result<(), SPI::Error> {
        self.spi
            .transaction(&mut [Operation::DelayNs(WAKE_PULSE_NS)])
            .await
    }
}

// ---------------------------------------------------------------------------
// I2C
// ---------------------------------------------------------------------------

/// I2C transport.
///
/// Frames longer than one packet are sent as consecutive writes to the
/// same address. The header always shares the first packet with the start
/// of the payload and is never split.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access)
    /// * `address`: 7-bit device address (factory default 0x0A)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Current 7-bit device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn device(&self) -> &I2C {
        &self.i2c
    }

    pub fn device_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Give back the I2C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    async fn send(&mut self, header: Header, payload: &[u8]) -> Result<(), I2C::Error> {
        let header_bytes = header.bytes();

        for packet in packets(&header, payload.len()) {
            let mut buf: heapless::Vec<u8, I2C_PACKET_LIMIT> = heapless::Vec::new();
            if packet.with_header {
                // Header plus first chunk is bounded by the packet budget.
                let _ = buf.extend_from_slice(&header_bytes);
            }
            let _ = buf.extend_from_slice(&payload[packet.payload.clone()]);

            #[cfg(feature = "defmt")]
            defmt::trace!(
                "i2c packet: {} bytes to {=u8:#x}, last={}",
                buf.len(),
                self.address,
                packet.last
            );

            self.i2c.write(self.address, buf.as_slice()).await?;
        }

        Ok(())
    }

    async fn wake(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[WAKE_BYTE]).await
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{I2cLog, SpiEvent, SpiLog};
    use embassy_futures::block_on;

    // ── SPI ──────────────────────────────────────────────────────────

    #[test]
    fn spi_frame_is_one_transaction() {
        let mut spi = SpiInterface::new(SpiLog::default());
        block_on(spi.send(Header::encode(32, 4), &[1, 2, 3, 4])).unwrap();

        let log = spi.release();
        assert_eq!(
            log.transactions,
            [vec![SpiEvent::Write(vec![128, 4]), SpiEvent::Write(vec![1, 2, 3, 4])]]
        );
        assert_eq!(log.wire(), [vec![128, 4, 1, 2, 3, 4]]);
    }

    #[test]
    fn spi_continuation_has_only_payload() {
        let mut spi = SpiInterface::new(SpiLog::default());
        block_on(spi.send(Header::encode(255, 2), &[9, 8])).unwrap();
        assert_eq!(spi.release().wire(), [vec![9, 8]]);
    }

    #[test]
    fn spi_wake_is_select_pulse() {
        let mut spi = SpiInterface::new(SpiLog::default());
        block_on(spi.wake()).unwrap();
        assert_eq!(
            spi.release().transactions,
            [vec![SpiEvent::Delay(1_000_000)]]
        );
    }

    // ── I2C ──────────────────────────────────────────────────────────

    #[test]
    fn i2c_short_frame_is_one_write() {
        let mut i2c = I2cInterface::new(I2cLog::default(), 0x0A);
        block_on(i2c.send(Header::encode(48, 1), &[0xF3])).unwrap();
        assert_eq!(i2c.release().writes, [(0x0A, vec![193, 0xF3])]);
    }

    #[test]
    fn i2c_zero_length_frame() {
        let mut i2c = I2cInterface::new(I2cLog::default(), 0x0A);
        block_on(i2c.send(Header::encode(50, 0), &[])).unwrap();
        assert_eq!(i2c.release().writes, [(0x0A, vec![200, 0])]);
    }

    #[test]
    fn i2c_long_frame_is_chunked() {
        let payload: Vec<u8> = (0..100u8).collect();
        let mut i2c = I2cInterface::new(I2cLog::default(), 0x0A);
        block_on(i2c.send(Header::encode(60, 100), &payload)).unwrap();

        let writes = i2c.release().writes;
        let lens: Vec<usize> = writes.iter().map(|(_, bytes)| bytes.len()).collect();
        // 2 header bytes + 30, then 32, 32, 6
        assert_eq!(lens, [32, 32, 32, 6]);
        assert_eq!(&writes[0].1[..3], &[240, 100, 0]);

        let joined: Vec<u8> = writes.iter().flat_map(|(_, b)| b.iter().copied()).collect();
        assert_eq!(&joined[2..], payload.as_slice());
    }

    #[test]
    fn i2c_wake_and_readdress() {
        let mut i2c = I2cInterface::new(I2cLog::default(), 0x0A);
        block_on(i2c.wake()).unwrap();
        i2c.set_address(0x20);
        block_on(i2c.send(Header::encode(246, 0), &[])).unwrap();
        assert_eq!(i2c.address(), 0x20);
        assert_eq!(
            i2c.release().writes,
            [(0x0A, vec![0xFF]), (0x20, vec![246])]
        );
    }
}
