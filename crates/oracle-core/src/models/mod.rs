pub mod analysis;
pub mod chat;
