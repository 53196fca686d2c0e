use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// A duplex byte stream to an XBee radio. Implements Read + Write.
///
/// The stream is opened by the caller and handed in. Every backend can be
/// cloned so that one handle feeds the background reader while the other
/// carries outbound frames.
pub struct XbeeStream {
    inner: StreamInner,
}

enum StreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(feature = "serial")]
    Serial(Box<dyn serialport::SerialPort>),
}

impl Read for XbeeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            StreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.read(buf),
            #[cfg(feature = "serial")]
            StreamInner::Serial(port) => port.read(buf),
        }
    }
}

impl Write for XbeeStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            StreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.write(buf),
            #[cfg(feature = "serial")]
            StreamInner::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            StreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.flush(),
            #[cfg(feature = "serial")]
            StreamInner::Serial(port) => port.flush(),
        }
    }
}

impl XbeeStream {
    /// Wrap a connected TCP stream, typically a serial-to-network bridge.
    pub fn from_tcp(stream: TcpStream) -> Self {
        // Frames are small; don't let Nagle hold a request back.
        if let Err(err) = stream.set_nodelay(true) {
            debug!(%err, "could not disable Nagle on radio bridge socket");
        }
        Self {
            inner: StreamInner::Tcp(stream),
        }
    }

    /// Wrap a connected Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: StreamInner::Unix(stream),
        }
    }

    /// Wrap an opened serial port.
    #[cfg(feature = "serial")]
    pub fn from_serial(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            inner: StreamInner::Serial(port),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Serial ports are left untouched; see `set_serial_timeout`.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            StreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(feature = "serial")]
            StreamInner::Serial(_) => Ok(()),
        }
    }

    /// Set write timeout on the underlying stream. Serial ports are left untouched.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            StreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(feature = "serial")]
            StreamInner::Serial(_) => Ok(()),
        }
    }

    /// Set the port timeout on a serial stream. Other backends ignore this.
    ///
    /// The serial driver keeps one timeout per handle for both directions.
    #[cfg(feature = "serial")]
    pub fn set_serial_timeout(&mut self, timeout: Duration) -> Result<()> {
        if let StreamInner::Serial(port) = &mut self.inner {
            port.set_timeout(timeout)?;
        }
        Ok(())
    }

    /// Try to clone this stream (creates a new handle to the same device).
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            StreamInner::Tcp(stream) => StreamInner::Tcp(stream.try_clone()?),
            #[cfg(unix)]
            StreamInner::Unix(stream) => StreamInner::Unix(stream.try_clone()?),
            #[cfg(feature = "serial")]
            StreamInner::Serial(port) => StreamInner::Serial(port.try_clone()?),
        };
        Ok(Self { inner })
    }

    /// Shut the stream down in both directions.
    ///
    /// Socket backends unblock any reader parked in `read`. A serial port
    /// cannot be interrupted that way; its reader notices on the next
    /// timeout tick instead.
    pub fn shutdown(&self) -> Result<()> {
        let result = match &self.inner {
            StreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            StreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(feature = "serial")]
            StreamInner::Serial(_) => Ok(()),
        };
        match result {
            Ok(()) => Ok(()),
            // Already closed by the other side.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Short name of the backend, for logs.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            StreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            StreamInner::Unix(_) => "unix",
            #[cfg(feature = "serial")]
            StreamInner::Serial(_) => "serial",
        }
    }
}

impl std::fmt::Debug for XbeeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("XbeeStream");
        s.field("type", &self.kind());
        #[cfg(feature = "serial")]
        if let StreamInner::Serial(port) = &self.inner {
            s.field("port", &port.name());
        }
        s.finish()
    }
}
