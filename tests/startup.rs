//! Startup-contract checks against the real server binary.

use std::net::{TcpListener, TcpStream};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn server_command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_georisk-server"));
    command
        .env_remove("PORT")
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

#[test]
fn missing_port_exits_nonzero() {
    let status = server_command().status().unwrap();
    assert!(!status.success());
}

#[test]
fn garbage_port_exits_nonzero() {
    let status = server_command().env("PORT", "eight-oh-eight").status().unwrap();
    assert!(!status.success());

    let status = server_command().env("PORT", "0").status().unwrap();
    assert!(!status.success());
}

#[test]
fn injected_port_produces_a_listener() {
    // Reserve a port, free it, hand it to the server.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut child = server_command()
        .env("PORT", port.to_string())
        .env("GEORISK_SERVER__BIND", "127.0.0.1")
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut connected = false;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            panic!("server exited early with {status}");
        }
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            connected = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    child.kill().unwrap();
    let _ = child.wait();
    assert!(connected, "no listener on 127.0.0.1:{port} within 20s");
}
