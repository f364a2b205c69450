//! Demonstrates the shared logger.
//!
//! Run with: cargo run -p vm-logging --example facade_demo
//! Set LOG_FORMAT=pretty or LOG_LEVEL=debug to change the output.

use std::io;

use vm_logging::Config;

fn main() {
    vm_logging::info!("logged through the bootstrap handle");

    vm_logging::initialize(Config::from_env().with_caller(true));

    vm_logging::debug!("only visible with LOG_LEVEL=debug");
    vm_logging::info!("got %d items in %.2fs", 5, 0.25);
    vm_logging::info!("user event", "user", "alice", "action", "login");

    let docker = vm_logging::get_logger("docker");
    docker.warn("container is slow to start", &vm_logging::args!["seconds", 12]);

    let err = io::Error::new(io::ErrorKind::ConnectionRefused, "daemon not running");
    vm_logging::error!(Some(&err), "provider unavailable", "provider", "docker");
    println!("formatted: {}", vm_logging::format_error(Some(&err)));

    // Third-party crates logging through `log` share the same output.
    log::info!(target: "vm_provider", "forwarded from the log crate");
}
