//! Serial port backend
//!
//! Ports are opened on first use (8N1, no flow control) and stay open
//! until the backend is dropped. A port that fails with an I/O error is
//! closed so the next command reopens it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio_serial::{SerialPortBuilderExt, SerialPortType, SerialStream};

use super::{Backend, ResultRecord, ResultStore};
use crate::common::config::SerialConfig;
use crate::common::{Error, Result};

/// Backend talking to real serial devices
pub struct SerialBackend {
    settings: SerialConfig,
    ports: Mutex<HashMap<String, BufReader<SerialStream>>>,
    store: ResultStore,
}

impl SerialBackend {
    pub fn new(settings: SerialConfig, store: ResultStore) -> Self {
        Self {
            settings,
            ports: Mutex::new(HashMap::new()),
            store,
        }
    }

    fn open(&self, port_name: &str) -> Result<BufReader<SerialStream>> {
        tracing::debug!(port = port_name, baud = self.settings.baud_rate, "Opening serial port");
        let stream = tokio_serial::new(port_name, self.settings.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| Error::serial_open(port_name, e))?;
        Ok(BufReader::new(stream))
    }

    fn port<'a>(
        &self,
        ports: &'a mut HashMap<String, BufReader<SerialStream>>,
        port_name: &str,
    ) -> Result<&'a mut BufReader<SerialStream>> {
        match ports.entry(port_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(self.open(port_name)?)),
        }
    }
}

#[async_trait]
impl Backend for SerialBackend {
    async fn write_to_port(&self, port_name: &str, data: &str) -> Result<()> {
        let mut ports = self.ports.lock().await;
        let port = self.port(&mut ports, port_name)?;

        tracing::trace!(port = port_name, data = %data.escape_default(), "Writing");
        let written = async {
            port.get_mut().write_all(data.as_bytes()).await?;
            port.get_mut().flush().await
        }
        .await;

        if let Err(e) = written {
            ports.remove(port_name);
            return Err(Error::serial_io(port_name, e));
        }
        Ok(())
    }

    async fn read_device_status(&self, port_name: &str) -> Result<String> {
        let mut ports = self.ports.lock().await;
        let port = self.port(&mut ports, port_name)?;

        let mut line = String::new();
        let timeout = self.settings.read_timeout();
        match tokio::time::timeout(timeout, port.read_line(&mut line)).await {
            Err(_) => Err(Error::ReadTimeout {
                port: port_name.to_string(),
                timeout_ms: self.settings.read_timeout_ms,
            }),
            Ok(Err(e)) => {
                ports.remove(port_name);
                Err(Error::serial_io(port_name, e))
            }
            Ok(Ok(0)) => {
                ports.remove(port_name);
                Err(Error::PortClosed(port_name.to_string()))
            }
            Ok(Ok(_)) => {
                let status = line.trim_end_matches(['\r', '\n']).to_string();
                tracing::trace!(port = port_name, status = %status.escape_default(), "Read");
                Ok(status)
            }
        }
    }

    async fn save_results(&self, results: &[ResultRecord]) -> Result<String> {
        self.store
            .save(results)
            .map(|path| path.display().to_string())
    }
}

/// A serial port visible on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: String,
}

/// List the serial ports the OS reports
pub fn list_ports() -> Result<Vec<PortSummary>> {
    let ports =
        tokio_serial::available_ports().map_err(|e| Error::PortEnumeration(e.to_string()))?;
    Ok(ports
        .into_iter()
        .map(|p| PortSummary {
            kind: describe_port_type(&p.port_type),
            name: p.port_name,
        })
        .collect())
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(info) => {
            let mut kind = format!("USB {:04x}:{:04x}", info.vid, info.pid);
            if let Some(product) = &info.product {
                kind.push(' ');
                kind.push_str(product);
            }
            kind
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}
