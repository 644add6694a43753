//! Serial port transport.
//!
//! The FDC+ runs at 403.2K baud, 8N1.  The second choice is 460.8K, which is about
//! 3.5% fast but usually works.  230.4K is available on almost any port and is within
//! 2% of the controller's rate, but runs at 80%-90% of real disk speed.

use std::io::{self,Read,Write};
use std::time::{Duration,Instant};
use log::{info,debug};
use serialport::{DataBits,FlowControl,Parity,SerialPort,SerialPortType,StopBits};
use super::{Transport,remaining};

pub const BAUD_RATES: [u32;3] = [230_400,403_200,460_800];
pub const DEFAULT_BAUD: u32 = 403_200;

// serial driver timeouts of zero mean "forever" on some platforms
const MIN_WAIT: Duration = Duration::from_millis(1);

pub struct SerialTransport {
    name: String,
    baud: u32,
    port: Option<Box<dyn SerialPort>>
}

impl SerialTransport {
    /// Open the port 8N1 without flow control, and assert DTR and RTS.
    pub fn open(name: &str,baud: u32) -> Result<Self,serialport::Error> {
        let mut port = serialport::new(name,baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(10))
            .open()?;
        port.write_data_terminal_ready(true)?;
        port.write_request_to_send(true)?;
        info!("opened {} at {} baud",name,baud);
        Ok(Self {
            name: name.to_string(),
            baud,
            port: Some(port)
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn baud(&self) -> u32 {
        self.baud
    }
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            info!("closed {}",self.name);
        }
    }
    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected,"serial port is closed"))
    }
}

impl Transport for SerialTransport {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }
    fn read(&mut self,max_len: usize,deadline: Instant) -> io::Result<Vec<u8>> {
        let port = self.port()?;
        if max_len == 0 {
            return Ok(Vec::new());
        }
        port.set_timeout(remaining(deadline).max(MIN_WAIT)).map_err(io::Error::from)?;
        let mut buf = vec![0;max_len];
        match port.read(&mut buf) {
            Ok(count) => {
                buf.truncate(count);
                Ok(buf)
            },
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Vec::new()),
            Err(e) => Err(e)
        }
    }
    fn write(&mut self,dat: &[u8],deadline: Instant) -> io::Result<usize> {
        let port = self.port()?;
        let mut done = 0;
        while done < dat.len() {
            let wait = remaining(deadline);
            if wait.is_zero() {
                break;
            }
            port.set_timeout(wait.max(MIN_WAIT)).map_err(io::Error::from)?;
            match port.write(&dat[done..]) {
                Ok(0) => break,
                Ok(count) => done += count,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
        port.flush()?;
        Ok(done)
    }
    fn bytes_available(&mut self) -> io::Result<usize> {
        let port = self.port()?;
        Ok(port.bytes_to_read().map_err(io::Error::from)? as usize)
    }
}

/// Names of serial ports on this host, with a short description of each.
pub fn list_ports() -> Result<Vec<(String,String)>,serialport::Error> {
    let mut ans = Vec::new();
    for info in serialport::available_ports()? {
        let desc = match info.port_type {
            SerialPortType::UsbPort(usb) => match usb.product {
                Some(product) => format!("USB {}",product),
                None => format!("USB {:04x}:{:04x}",usb.vid,usb.pid)
            },
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::Unknown => "unknown".to_string()
        };
        debug!("found port {} ({})",info.port_name,desc);
        ans.push((info.port_name,desc));
    }
    Ok(ans)
}
