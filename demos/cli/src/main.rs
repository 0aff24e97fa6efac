//! Exercises `atcell` against a real modem over a serial port: `init`,
//! `device_info`, `network_attach`, and `sms_send` from the command line.
//! This binary is a thin consumer of the public API; it carries no engine
//! logic of its own.

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atcell::prelude::*;

struct SerialLink {
    port: Mutex<Box<dyn serialport::SerialPort>>,
}

impl Link for SerialLink {
    fn send(&self, bytes: &[u8]) -> usize {
        let mut port = self.port.lock().expect("serial port lock poisoned");
        port.write(bytes).unwrap_or(0)
    }
}

fn spawn_reader(port: Box<dyn serialport::SerialPort>, engine: Arc<Engine>) {
    std::thread::Builder::new()
        .name("atcell-cli-reader".into())
        .spawn(move || {
            let mut port = port;
            let mut buf = [0u8; 256];
            loop {
                match port.read(&mut buf) {
                    Ok(0) => continue,
                    Ok(n) => {
                        let _ = engine.push_input(&buf[..n]);
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                    Err(_) => return,
                }
            }
        })
        .expect("failed to spawn serial reader thread");
}

fn usage() -> ! {
    eprintln!(
        "usage: atcell-cli <serial-port> <baud> info\n       atcell-cli <serial-port> <baud> attach <apn> <user> <pass>\n       atcell-cli <serial-port> <baud> sms <number> <text>"
    );
    std::process::exit(2);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        usage();
    }
    let device = &args[1];
    let baud: u32 = args[2].parse().unwrap_or_else(|_| usage());
    let command = args[3].as_str();

    let write_port = serialport::new(device, baud)
        .timeout(Duration::from_millis(500))
        .open()
        .expect("failed to open serial port");
    let read_port = write_port.try_clone().expect("failed to clone serial port handle");

    let link: Arc<dyn Link> = Arc::new(SerialLink { port: Mutex::new(write_port) });
    let engine = Arc::new(
        Engine::init(Config::default(), link, Box::new(Sim800)).expect("failed to initialize engine"),
    );
    spawn_reader(read_port, engine.clone());

    match command {
        "info" => match engine.device_info() {
            Ok((manufacturer, model, revision, serial)) => {
                println!("manufacturer: {manufacturer}\nmodel: {model}\nrevision: {revision}\nserial: {serial}");
            }
            Err(e) => eprintln!("device_info failed: {e}"),
        },
        "attach" => {
            if args.len() < 7 {
                usage();
            }
            match engine.network_attach(&args[4], &args[5], &args[6]) {
                Ok(ip) => println!("attached, ip: {ip}"),
                Err(e) => eprintln!("network_attach failed: {e}"),
            }
        }
        "sms" => {
            if args.len() < 6 {
                usage();
            }
            match engine.sms_enable().and_then(|_| engine.sms_send(&args[4], &args[5])) {
                Ok(pos) => println!("sent, mem index: {pos}"),
                Err(e) => eprintln!("sms_send failed: {e}"),
            }
        }
        _ => usage(),
    }
}
