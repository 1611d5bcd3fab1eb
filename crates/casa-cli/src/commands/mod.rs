pub mod chat;
pub mod history;
pub mod image;
pub mod render;
pub mod search;
