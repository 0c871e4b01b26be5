// parkgate/src/transport/traits.rs

use crate::config::PortConfig;
use crate::Result;

/// Transport trait abstracts the byte channel away from the reader
/// session. Reads are non-blocking: `read_available` returns whatever has
/// arrived since the last call, possibly nothing.
pub trait Transport {
    /// Open the channel with the given line parameters
    fn open(&mut self, config: &PortConfig) -> Result<()>;

    /// Close the channel. Closing a closed channel is a no-op.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Write raw bytes to the reader
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Drain bytes received so far
    fn read_available(&mut self) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, config: &PortConfig) -> Result<()> {
        (**self).open(config)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        (**self).read_available()
    }
}
