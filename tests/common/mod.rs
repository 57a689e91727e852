#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Once};
use std::time::Duration;

use routewire::message::{
    setup, AppFactory, MessageController, Registration, Transport, MESSAGE_LABEL,
};
use routewire::mux::Mux;

static INIT: Once = Once::new();

/// Give coroutines enough stack for tests.
pub fn init_runtime() {
    INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
    });
}

/// Build the message service routing table around the given transport.
pub fn message_mux(transport: Arc<dyn Transport>) -> Arc<Mux> {
    setup(
        Arc::new(AppFactory::new("test", Arc::clone(&transport))),
        vec![Registration::new(
            Box::new(MessageController { transport }),
            MESSAGE_LABEL,
        )],
    )
}

/// Reserve an ephemeral port by binding and immediately releasing it.
pub fn free_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

pub fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.write_all(req.as_bytes()).expect("write request");
    stream
        .set_read_timeout(Some(Duration::from_millis(100)))
        .expect("set timeout");
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Split a raw HTTP/1.1 response into its status code and body.
pub fn parse_response(resp: &str) -> (u16, String) {
    let mut parts = resp.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("");
    let mut status = 0;
    for line in headers.lines() {
        if line.starts_with("HTTP/1.1") {
            status = line
                .split_whitespace()
                .nth(1)
                .unwrap_or("0")
                .parse()
                .expect("status code");
        }
    }
    (status, body.to_string())
}
