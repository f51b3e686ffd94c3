// Handlers module - HTTP endpoints

mod chat;
mod feedback;
mod interactions;
mod status;

pub use chat::handle_chat;
pub use feedback::handle_feedback;
pub use interactions::handle_interactions;
pub use status::{health_check, service_status};
