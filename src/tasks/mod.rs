//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is open.
//!
//! # Tasks
//! - Vacuum: Evicts expired items and deletes their files at the configured interval

mod vacuum;

pub use vacuum::VacuumHandle;

pub(crate) use vacuum::spawn_vacuum_task;
