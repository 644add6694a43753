use crate::transport::serial::{list_ports,BAUD_RATES,DEFAULT_BAUD};
use crate::STDRESULT;

pub fn ports() -> STDRESULT {
    let ports = list_ports()?;
    if ports.is_empty() {
        eprintln!("no serial ports were found");
        return Ok(());
    }
    for (name,desc) in ports {
        println!("{:20} {}",name,desc);
    }
    let rates: Vec<String> = BAUD_RATES.iter().map(|b| b.to_string()).collect();
    eprintln!("baud rates: {} (default {})",rates.join(", "),DEFAULT_BAUD);
    Ok(())
}
