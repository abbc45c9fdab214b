//! Business logic and upstream provider clients.

pub mod assistant;
pub mod auth;
pub mod payments;
pub mod video;

pub use assistant::AssistantClient;
pub use auth::{AuthError, AuthService};
pub use payments::GatewayClient;
pub use video::VideoClient;
