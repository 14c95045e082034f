pub mod gesture;
pub mod mediator;
