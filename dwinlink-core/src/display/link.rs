//! Outbound side of the display link
//!
//! Wraps the paced UART and turns values and page switches into frames.
//! Send failures are counted and logged; the protocol has no retry and the
//! panel re-sends on the next interaction or update tick.

use embedded_hal::delay::DelayNs;

use dwinlink_hal::{PacedTx, Uart, UartTx};
use dwinlink_protocol::{FrameError, PanelMessage, Value, MAX_FRAME_SIZE};
use dwinlink_protocol::address::ICON_PRINT_STATUS_ADDR;

use crate::config::Language;

use super::pages::{Page, StatusIcon};

/// Errors from sending to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The UART rejected a byte
    Transport(E),
    /// The message could not be framed
    Frame(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

/// Display connection
pub struct DisplayLink<U, D> {
    tx: PacedTx<U, D>,
    language: Language,
    tx_errors: u32,
}

impl<U: Uart, D: DelayNs> DisplayLink<U, D> {
    /// Wrap a display UART with per-byte pacing
    pub fn new(port: U, delay: D, pacing_us: u32) -> Self {
        Self {
            tx: PacedTx::new(port, delay, pacing_us),
            language: Language::default(),
            tx_errors: 0,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Number of messages that failed to send
    pub fn tx_errors(&self) -> u32 {
        self.tx_errors
    }

    /// Receive side of the port
    pub fn port_mut(&mut self) -> &mut U {
        self.tx.inner_mut()
    }

    pub fn port(&self) -> &U {
        self.tx.inner()
    }

    /// Send one message
    pub fn try_send(
        &mut self,
        message: PanelMessage<'_>,
    ) -> Result<(), LinkError<<U as UartTx>::Error>> {
        let frame = message.to_frame()?;
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer)?;
        self.tx
            .write_all(&buffer[..len])
            .map_err(LinkError::Transport)?;
        Ok(())
    }

    /// Send one message, counting failures instead of returning them
    pub fn send(&mut self, message: PanelMessage<'_>) {
        if self.try_send(message).is_err() {
            self.tx_errors = self.tx_errors.wrapping_add(1);
            warn!("display send failed");
        }
    }

    pub fn write(&mut self, address: u16, value: Value<'_>) {
        self.send(PanelMessage::Write { address, value });
    }

    /// Unsigned value, split into two words above 0xFFFF
    pub fn number(&mut self, address: u16, n: u32) {
        self.write(address, Value::number(n));
    }

    /// Signed value, negative numbers as 16-bit two's complement
    pub fn signed(&mut self, address: u16, n: i32) {
        let value = if n > 0xFFFF {
            Value::number(n as u32)
        } else {
            Value::signed(n)
        };
        self.write(address, value);
    }

    /// Text variable; empty strings are not sent
    pub fn text(&mut self, address: u16, text: &str) {
        if text.is_empty() {
            return;
        }
        self.write(address, Value::Str(text));
    }

    /// Zero `count` consecutive word variables
    pub fn clear_words(&mut self, address: u16, count: u16) {
        for offset in 0..count {
            self.write(address.wrapping_add(offset), Value::Word(0));
        }
    }

    pub fn page(&mut self, page: Page) {
        debug!("page {:?}", page);
        self.send(PanelMessage::Page(page.number(self.language)));
    }

    pub fn status_icon(&mut self, icon: StatusIcon) {
        let index = icon.index(self.language);
        self.write(ICON_PRINT_STATUS_ADDR, Value::Word(u16::from(index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LoopbackUart;
    use dwinlink_hal::NoDelay;

    fn link() -> DisplayLink<LoopbackUart, NoDelay> {
        DisplayLink::new(LoopbackUart::default(), NoDelay, 0)
    }

    #[test]
    fn test_number_encoding() {
        let mut link = link();
        link.number(0x1036, 215);
        assert_eq!(
            link.port().sent(),
            &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x36, 0x00, 0xD7]
        );
    }

    #[test]
    fn test_signed_negative() {
        let mut link = link();
        link.signed(0x1026, -150);
        assert_eq!(&link.port().sent()[6..], &(-150i16 as u16).to_be_bytes());
    }

    #[test]
    fn test_empty_text_not_sent() {
        let mut link = link();
        link.text(0x2000, "");
        assert!(link.port().sent().is_empty());
    }

    #[test]
    fn test_page_uses_language() {
        let mut link = link();
        link.set_language(Language::Chinese);
        link.page(Page::Paused);
        assert_eq!(
            link.port().sent(),
            &[0x5A, 0xA5, 0x07, 0x82, 0x00, 0x84, 0x5A, 0x01, 0x00, 12]
        );
    }

    #[test]
    fn test_status_icon_english_offset() {
        let mut link = link();
        link.status_icon(StatusIcon::Heating);
        assert_eq!(&link.port().sent()[4..], &[0x10, 0x14, 0x00, 11]);
    }

    #[test]
    fn test_clear_words() {
        let mut link = link();
        link.clear_words(0x2000, 3);
        assert_eq!(link.port().sent().len(), 3 * 8);
    }

    #[test]
    fn test_send_errors_counted() {
        let mut link = link();
        link.port_mut().fail_writes = true;
        link.number(0x1000, 1);
        assert_eq!(link.tx_errors(), 1);
    }
}
