//! Application layer containing the enrollment and progress orchestration.
//!
//! `EnrollmentCoordinator` decides between the free and paid enrollment paths
//! and reconciles hosted checkouts with the user store. `ProgressTracker`
//! keeps per-course lesson completion. Both receive their stores and the
//! payment gateway as boxed ports, so tests can swap in fakes.

pub mod enrollment;
pub mod progress;
