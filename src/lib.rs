// lib.rs - discoveryx
// Purpose: Sequential ProjectDiscovery recon pipeline (subfinder → dnsx → naabu →
//          httpx → katana + nuclei) plus tool install/update management

pub mod cli;
pub mod config;
pub mod discover;
pub mod installer;
pub mod inventory;
pub mod logger;
pub mod runner;
pub mod tools;
pub mod updater;

#[cfg(test)]
mod test_support;
