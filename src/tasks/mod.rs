//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stale Sweep: Reclaims expired and outdated records at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
