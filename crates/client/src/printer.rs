//! Receipt output: thermal printer transports and the HTML print fallback.
//!
//! The BLE printer is reached through its serial binding (`/dev/rfcomm0`
//! after `rfcomm bind`) or a raw TCP port. Bytes are written and the
//! connection closed; printers send nothing back worth reading.

use std::path::{Path, PathBuf};

use engine::{Receipt, escpos, html};
use tokio::{fs, io::AsyncWriteExt, net::TcpStream, process::Command};

use crate::error::PrinterError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrinterTarget {
    /// Serial device node, e.g. `/dev/rfcomm0`.
    Device(PathBuf),
    /// `host:port` of a raw printer port, usually 9100.
    Tcp(String),
}

impl PrinterTarget {
    pub fn describe(&self) -> String {
        match self {
            Self::Device(path) => path.display().to_string(),
            Self::Tcp(address) => format!("tcp://{address}"),
        }
    }

    pub async fn send(&self, bytes: &[u8]) -> Result<(), PrinterError> {
        let target = self.describe();
        match self {
            Self::Device(path) => {
                let mut device = fs::OpenOptions::new()
                    .write(true)
                    .open(path)
                    .await
                    .map_err(|source| PrinterError::Connect { target, source })?;
                device.write_all(bytes).await.map_err(PrinterError::Write)?;
                device.flush().await.map_err(PrinterError::Write)?;
            }
            Self::Tcp(address) => {
                let mut stream = TcpStream::connect(address)
                    .await
                    .map_err(|source| PrinterError::Connect { target, source })?;
                stream.write_all(bytes).await.map_err(PrinterError::Write)?;
                stream.shutdown().await.map_err(PrinterError::Write)?;
            }
        }
        tracing::info!(target = %self.describe(), bytes = bytes.len(), "receipt sent to printer");
        Ok(())
    }
}

/// Writes the HTML receipt to disk and hands it to a browser.
#[derive(Clone, Debug)]
pub struct HtmlPrinter {
    pub dir: PathBuf,
    /// Command run with the file path as its only argument. Empty skips it.
    pub opener: String,
}

impl HtmlPrinter {
    pub fn file_for(&self, payment_id: &str) -> PathBuf {
        let safe: String = payment_id
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("receipt-{safe}.html"))
    }

    pub async fn print(&self, payment_id: &str, document: &str) -> Result<PathBuf, PrinterError> {
        let path = self.file_for(payment_id);
        let save = |source| PrinterError::Save {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).await.map_err(save)?;
        fs::write(&path, document).await.map_err(save)?;
        tracing::info!(path = %path.display(), "receipt saved");

        self.open(&path)?;
        Ok(path)
    }

    /// Spawns the opener without waiting for it.
    fn open(&self, path: &Path) -> Result<(), PrinterError> {
        let mut parts = self.opener.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };
        Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .map_err(|source| PrinterError::Open {
                opener: self.opener.clone(),
                source,
            })?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum Printer {
    Thermal(PrinterTarget),
    Html(HtmlPrinter),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintOutcome {
    Sent { target: String, bytes: usize },
    Saved(PathBuf),
}

impl Printer {
    pub async fn print(&self, receipt: &Receipt) -> Result<PrintOutcome, PrinterError> {
        match self {
            Self::Thermal(target) => {
                let bytes = escpos::encode(receipt);
                target.send(&bytes).await?;
                Ok(PrintOutcome::Sent {
                    target: target.describe(),
                    bytes: bytes.len(),
                })
            }
            Self::Html(printer) => {
                let document = html::render(receipt);
                printer
                    .print(&receipt.payment_id, &document)
                    .await
                    .map(PrintOutcome::Saved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        let printer = HtmlPrinter {
            dir: PathBuf::from("/tmp/receipts"),
            opener: String::new(),
        };
        assert_eq!(
            printer.file_for("../ab c"),
            PathBuf::from("/tmp/receipts/receipt-___ab_c.html")
        );
    }

    #[test]
    fn targets_describe_themselves() {
        assert_eq!(
            PrinterTarget::Device(PathBuf::from("/dev/rfcomm0")).describe(),
            "/dev/rfcomm0"
        );
        assert_eq!(
            PrinterTarget::Tcp("10.0.0.7:9100".to_string()).describe(),
            "tcp://10.0.0.7:9100"
        );
    }
}
