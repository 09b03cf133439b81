//! Business logic services.
//!
//! - [`ReservationGuard`]: per-content in-flight reservations
//! - [`SaveOrchestrator`]: reserve, check, persist, release
//! - [`create_backend`]: backend selection from configuration

mod backend_factory;
mod reservation;
mod save;

pub use backend_factory::create_backend;
pub use reservation::{Reservation, ReservationGuard};
pub use save::SaveOrchestrator;
