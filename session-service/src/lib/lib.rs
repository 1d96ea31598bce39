//! Session service: password login, credential rotation and the session guard
//! in front of every protected route.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::session;
pub use domain::user;
pub use outbound::repositories;
