//! Domain layer: enrollment state, catalog view, checkout sessions and
//! lesson progress, plus the ports the application layer drives.

pub mod checkout;
pub mod course;
pub mod ids;
pub mod money;
pub mod ports;
pub mod progress;
pub mod user;
