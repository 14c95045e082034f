pub mod controller;
pub mod coordinator;
pub mod orientation;
pub mod selector;
pub(crate) mod shared;

pub use shared::SessionDiagnostics;
