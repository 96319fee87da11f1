//! Inbound adapters: CSV request scripts and the driver that replays them.

pub mod csv;
pub mod driver;
