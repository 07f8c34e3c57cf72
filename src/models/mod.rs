pub mod app_state;
pub mod event;
pub mod game_state;
pub mod messages;
pub mod socket;

// Re-export important types
pub use app_state::*;
pub use event::*;
pub use game_state::*;
pub use messages::*;
pub use socket::*;
