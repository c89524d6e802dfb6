pub mod extractor;
pub mod jwt;
pub mod state;
pub mod test_utils;

pub use jwt::{TokenError, TokenService};
pub use state::AppState;
