//! # Serial TTY Transport
//!
//! This module provides communication with scales and label printers over
//! serial character devices: USB-serial adapters (`/dev/ttyUSB*`,
//! `/dev/ttyACM*`), on-board UARTs (`/dev/ttyS*`), Bluetooth SPP bindings
//! (`/dev/rfcomm*`) and macOS call-out devices (`/dev/cu.*`).
//!
//! ## TTY Configuration
//!
//! The device is opened with `O_NOCTTY` and put in raw mode so bytes pass
//! through unmodified:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity), receiver enabled
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//! - **Baud rate**: input and output speed set to the requested rate
//!
//! ## Read Timeout
//!
//! `VMIN = 0, VTIME = 1`: a read returns after 100 ms without data. The
//! transport keeps waiting internally, so callers still see "wait for at
//! least one byte", but an abandoned read finishes within 100 ms and the
//! device can be closed promptly after a disconnect.
//!
//! ## Device Permissions (Linux)
//!
//! ```bash
//! # Serial devices belong to the dialout group
//! $ sudo usermod -aG dialout $USER
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{BaudRate, PortInfo, PortProvider, Transport};
use crate::error::{Result, TarazuError};

/// Device name prefixes considered serial ports, with a description.
const PORT_PREFIXES: &[(&str, &str)] = &[
    ("ttyUSB", "USB serial"),
    ("ttyACM", "USB CDC-ACM"),
    ("ttyS", "UART"),
    ("rfcomm", "Bluetooth RFCOMM"),
    ("cu.", "Call-out device"),
];

/// Opens TTY devices under `/dev`.
#[derive(Debug, Clone, Default)]
pub struct SerialProvider;

#[async_trait]
impl PortProvider for SerialProvider {
    fn available(&self) -> bool {
        cfg!(unix)
    }

    async fn list_ports(&self) -> Result<Vec<PortInfo>> {
        if !self.available() {
            return Err(TarazuError::TransportUnavailable(
                "serial devices are only supported on Unix".to_string(),
            ));
        }
        scan_ports(Path::new("/dev"))
    }

    async fn open(&self, endpoint: &str, baud: BaudRate) -> Result<Box<dyn Transport>> {
        if !self.available() {
            return Err(TarazuError::TransportUnavailable(
                "serial devices are only supported on Unix".to_string(),
            ));
        }
        let transport = SerialTransport::open(endpoint, baud).await?;
        Ok(Box::new(transport))
    }
}

/// List serial devices in `dir`, sorted by path.
pub fn scan_ports(dir: &Path) -> Result<Vec<PortInfo>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        TarazuError::TransportUnavailable(format!("Cannot list {}: {}", dir.display(), e))
    })?;

    let mut ports: Vec<PortInfo> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            PORT_PREFIXES
                .iter()
                .find(|(prefix, _)| name.starts_with(prefix))
                .map(|(_, kind)| PortInfo {
                    path: dir.join(&name).display().to_string(),
                    kind: kind.to_string(),
                })
        })
        .collect();
    ports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(ports)
}

/// # Serial Transport
///
/// A raw-mode TTY opened for reading and writing.
///
/// ## Example
///
/// ```no_run
/// use tarazu::transport::{BaudRate, SerialTransport, Transport};
///
/// # async fn example() -> tarazu::error::Result<()> {
/// let mut printer = SerialTransport::open("/dev/ttyUSB0", BaudRate::default()).await?;
/// printer.write_all(b"SIZE 100 mm,80 mm\nCLS\nPRINT 1\n").await?;
/// printer.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SerialTransport {
    endpoint: String,
    file: Option<File>,
}

impl SerialTransport {
    /// Open and configure a TTY device.
    ///
    /// ## Errors
    ///
    /// Returns [`TarazuError::OpenFailed`] if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - TTY configuration fails
    pub async fn open(endpoint: &str, baud: BaudRate) -> Result<Self> {
        let path = endpoint.to_string();
        let std_file = tokio::task::spawn_blocking(move || open_raw(&path, baud))
            .await
            .map_err(|e| TarazuError::OpenFailed {
                endpoint: endpoint.to_string(),
                reason: format!("open task failed: {}", e),
            })??;

        tracing::debug!(endpoint, baud = baud.get(), "serial device configured");

        Ok(Self {
            endpoint: endpoint.to_string(),
            file: Some(File::from_std(std_file)),
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port is closed"))
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.file()?.read(buf).await?;
            if n > 0 {
                return Ok(n);
            }
            // VTIME expired with no data. An unplugged adapter looks the same,
            // so check the device node is still there.
            if !tokio::fs::try_exists(&self.endpoint).await.unwrap_or(false) {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    format!("{} was removed", self.endpoint),
                ));
            }
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self.file()?;
        file.write_all(data).await?;
        file.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush().await,
            None => Ok(()),
        }
    }
}

fn open_raw(path: &str, baud: BaudRate) -> Result<std::fs::File> {
    let open_failed = |reason: String| TarazuError::OpenFailed {
        endpoint: path.to_string(),
        reason,
    };

    let mut options = OpenOptions::new();
    options.read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOCTTY);
    }
    let file = options.open(path).map_err(|e| open_failed(e.to_string()))?;

    configure_tty_raw(&file, baud).map_err(|e| open_failed(e.to_string()))?;
    Ok(file)
}

#[cfg(unix)]
fn speed_for(baud: BaudRate) -> libc::speed_t {
    match baud.get() {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        19200 => libc::B19200,
        38400 => libc::B38400,
        115200 => libc::B115200,
        _ => libc::B9600,
    }
}

/// Configure a TTY for raw 8N1 at `baud`.
///
/// ## What Gets Disabled
///
/// - **Input flags**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL, IXON, IXOFF, IXANY
/// - **Output flags**: OPOST
/// - **Local flags**: ECHO, ECHONL, ICANON, ISIG, IEXTEN
/// - **Control flags**: CSIZE, PARENB (then CS8 | CLOCAL | CREAD is set)
#[cfg(unix)]
fn configure_tty_raw(file: &std::fs::File, baud: BaudRate) -> io::Result<()> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;

    let speed = speed_for(baud);
    if unsafe { libc::cfsetispeed(&mut termios, speed) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::cfsetospeed(&mut termios, speed) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &std::fs::File, _baud: BaudRate) -> io::Result<()> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
