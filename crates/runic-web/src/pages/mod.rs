//! Page Components

mod agent;
mod home;
mod vault;

pub use agent::AgentPage;
pub use home::HomePage;
pub use vault::VaultPage;
