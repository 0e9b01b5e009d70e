pub mod config;
pub mod error;
pub mod metrics;
pub mod origin;
pub mod routes;
pub mod state;

pub use config::CheckoutConfig;
pub use error::CheckoutError;
pub use origin::{CorsDecision, OriginGate};
pub use state::AppState;
