// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 msgbus contributors

#![allow(clippy::uninlined_format_args)] // Example readability

//! Loopback pub/sub example.
//!
//! Demonstrates:
//! - Opening a client on the process-wide loopback transport
//! - Publishing on a topic and draining the queue
//! - Capacity-limited receive reporting an overflow
//! - Release and use-after-release
//!
//! Run with `RUST_LOG=msgbus=debug cargo run --example loopback` to see the
//! library's lifecycle logging.

use msgbus::logging::{self, LogLevel};
use msgbus::{Client, Config, Error, Received};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_from_env(LogLevel::Info)?;
    println!("=== msgbus Loopback Example ===\n");

    let config = Config::default()
        .with_segment_name("loopback-example")
        .with_max_queue_size(16);
    let client = Client::connect(config)?;
    println!("[OK] Client open on segment '{}'", client.config().segment_name);

    for i in 1..=3 {
        let payload = format!("scan-{}", i);
        let accepted = client.send("alerts", payload.as_bytes())?;
        println!("[OK] Sent {} -> accepted={}", payload, accepted);
    }

    loop {
        match client.receive(64, 256)? {
            Received::Message(msg) => println!(
                "[<-] {}: {}",
                msg.topic(),
                String::from_utf8_lossy(msg.payload())
            ),
            Received::NoMessage => {
                println!("[OK] Queue drained");
                break;
            }
            Received::Error(e) => {
                println!("[!!] Receive fault: {}", e);
                break;
            }
        }
    }

    // A payload buffer smaller than the message is reported, not truncated.
    client.send("alerts", &[0u8; 32])?;
    if let Received::Error(e) = client.receive(64, 8)? {
        println!("[OK] Small buffer rejected: {} (code {})", e, e.code());
    }
    if let Received::Message(msg) = client.receive(64, 64)? {
        println!("[OK] Retried with room: {} bytes", msg.len());
    }

    client.release();
    println!("[OK] Released ({})", client.state());

    match client.send("alerts", b"late") {
        Err(Error::UseAfterRelease) => println!("[OK] Send after release refused"),
        other => println!("[!!] Unexpected: {:?}", other),
    }

    println!("\n=== Example complete ===");
    Ok(())
}
