pub mod bootstrap;
pub mod router;

pub use router::create_router;
