//! Recording bus implementations for host tests.

use embedded_hal_async::i2c::{self, I2c, SevenBitAddress};
use embedded_hal_async::spi::{self, SpiDevice};

/// Error produced by a mock bus set to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl i2c::Error for MockError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl spi::Error for MockError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// SPI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiEvent {
    Write(Vec<u8>),
    Delay(u32),
}

/// Records every `SpiDevice` transaction. Each inner `Vec` is one
/// chip-select window.
#[derive(Debug, Default)]
pub struct SpiLog {
    pub transactions: Vec<Vec<SpiEvent>>,
    pub fail: bool,
}

impl SpiLog {
    /// Bytes clocked out per transaction.
    pub fn wire(&self) -> Vec<Vec<u8>> {
        self.transactions
            .iter()
            .map(|events| {
                events
                    .iter()
                    .flat_map(|event| match event {
                        SpiEvent::Write(bytes) => bytes.clone(),
                        SpiEvent::Delay(_) => Vec::new(),
                    })
                    .collect()
            })
            .collect()
    }
}

impl spi::ErrorType for SpiLog {
    type Error = MockError;
}

impl SpiDevice for SpiLog {
    async fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        let mut events = Vec::new();
        for op in operations.iter() {
            match op {
                spi::Operation::Write(bytes) => events.push(SpiEvent::Write(bytes.to_vec())),
                spi::Operation::DelayNs(ns) => events.push(SpiEvent::Delay(*ns)),
                _ => panic!("driver never reads from the board"),
            }
        }
        self.transactions.push(events);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// I2C
// ---------------------------------------------------------------------------

/// Records every I2C write as `(address, bytes)`.
#[derive(Debug, Default)]
pub struct I2cLog {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail: bool,
}

impl i2c::ErrorType for I2cLog {
    type Error = MockError;
}

impl I2c<SevenBitAddress> for I2cLog {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        for op in operations.iter() {
            match op {
                i2c::Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                i2c::Operation::Read(_) => panic!("driver never reads from the board"),
            }
        }
        Ok(())
    }
}
