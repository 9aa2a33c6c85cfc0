//! UART serial communication abstractions
//!
//! The display link is serviced from a single cooperative loop, so the receive
//! side never blocks: a read returns `None` when nothing is waiting.

use embedded_hal::delay::DelayNs;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write a single byte to the UART
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write a buffer byte by byte
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is waiting
    ///
    /// Returns `Ok(None)` immediately when the receive buffer is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Transmitter that waits a fixed number of microseconds after every byte
///
/// Some display MCUs drop bytes when the host transmits back to back. The
/// pacing is a parameter so host tests can run with zero delay.
pub struct PacedTx<T, D> {
    inner: T,
    delay: D,
    pacing_us: u32,
}

impl<T, D> PacedTx<T, D> {
    /// Wrap a port with a per-byte pacing delay
    pub fn new(inner: T, delay: D, pacing_us: u32) -> Self {
        Self {
            inner,
            delay,
            pacing_us,
        }
    }

    /// Current per-byte delay in microseconds
    pub fn pacing_us(&self) -> u32 {
        self.pacing_us
    }

    /// Borrow the wrapped port
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped port (used for the receive side)
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Release the wrapped port and delay
    pub fn into_parts(self) -> (T, D) {
        (self.inner, self.delay)
    }
}

impl<T: UartTx, D: DelayNs> UartTx for PacedTx<T, D> {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.inner.write_byte(byte)?;
        if self.pacing_us > 0 {
            self.delay.delay_us(self.pacing_us);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

/// Delay provider that returns immediately
///
/// Useful on hosts and in tests where no pacing is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Adapter exposing any `embedded-io` serial port through the UART traits
pub struct IoUart<T>(pub T);

impl<T: embedded_io::Write> UartTx for IoUart<T> {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.0.write_all(&[byte])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

impl<T: embedded_io::Read + embedded_io::ReadReady> UartRx for IoUart<T> {
    type Error = T::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.0.read_ready()? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.0.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Recorder {
        bytes: [u8; 16],
        len: usize,
    }

    impl UartTx for Recorder {
        type Error = Infallible;

        fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.bytes[self.len] = byte;
            self.len += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_us: u32,
        calls: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += ns / 1000;
            self.calls += 1;
        }

        fn delay_us(&mut self, us: u32) {
            self.total_us += us;
            self.calls += 1;
        }
    }

    #[test]
    fn test_paced_tx_delays_after_every_byte() {
        let tx = Recorder { bytes: [0; 16], len: 0 };
        let mut paced = PacedTx::new(tx, CountingDelay::default(), 3);
        paced.write_all(&[0x5A, 0xA5, 0x03]).unwrap();

        let (tx, delay) = paced.into_parts();
        assert_eq!(&tx.bytes[..tx.len], &[0x5A, 0xA5, 0x03]);
        assert_eq!(delay.calls, 3);
        assert_eq!(delay.total_us, 9);
    }

    #[test]
    fn test_zero_pacing_skips_delay() {
        let tx = Recorder { bytes: [0; 16], len: 0 };
        let mut paced = PacedTx::new(tx, CountingDelay::default(), 0);
        paced.write_all(&[1, 2, 3, 4]).unwrap();

        let (tx, delay) = paced.into_parts();
        assert_eq!(tx.len, 4);
        assert_eq!(delay.calls, 0);
    }

    struct Scripted<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl embedded_io::ErrorType for Scripted<'_> {
        type Error = Infallible;
    }

    impl embedded_io::Read for Scripted<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    impl embedded_io::ReadReady for Scripted<'_> {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.pos < self.data.len())
        }
    }

    #[test]
    fn test_io_uart_reads_until_empty() {
        let mut uart = IoUart(Scripted {
            data: &[0x5A, 0xA5],
            pos: 0,
        });
        assert_eq!(uart.read_byte().unwrap(), Some(0x5A));
        assert_eq!(uart.read_byte().unwrap(), Some(0xA5));
        assert_eq!(uart.read_byte().unwrap(), None);
    }
}
