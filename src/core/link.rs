use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug)]
pub enum Error {
    /// Indicates a generic IO error.
    IO(std::io::Error),
    /// Indicates a miscellaneous error with a message.
    Unknown(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A low level interface for sending frames out of named interfaces.
///
/// The link is shared by every thread delivering frames to the router as well
/// as the sweeper, so implementations must be safe to call concurrently.
/// Sending may block.
pub trait Link: Send + Sync {
    /// Sends a complete Ethernet frame out of the named interface.
    fn send(&self, buffer: &[u8], interface: &str) -> Result<()>;
}

/// A Link which records every frame sent instead of transmitting it.
///
/// Useful for simulations and for observing the router in tests.
#[derive(Debug, Default)]
pub struct Capture {
    frames: Mutex<VecDeque<(String, Vec<u8>)>>,
}

impl Capture {
    pub fn new() -> Capture {
        Capture {
            frames: Mutex::new(VecDeque::new()),
        }
    }

    /// Removes and returns every frame sent so far, oldest first, paired with
    /// the interface it was sent out of.
    pub fn drain(&self) -> Vec<(String, Vec<u8>)> {
        let mut frames = match self.frames.lock() {
            Ok(frames) => frames,
            Err(err) => err.into_inner(),
        };
        frames.drain(..).collect()
    }
}

impl Link for Capture {
    fn send(&self, buffer: &[u8], interface: &str) -> Result<()> {
        let mut frames = match self.frames.lock() {
            Ok(frames) => frames,
            Err(err) => err.into_inner(),
        };
        frames.push_back((interface.to_string(), buffer.to_vec()));
        Ok(())
    }
}

impl<L: Link + ?Sized> Link for std::sync::Arc<L> {
    fn send(&self, buffer: &[u8], interface: &str) -> Result<()> {
        (**self).send(buffer, interface)
    }
}
