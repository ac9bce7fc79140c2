//! DisasterAI core: message routing, prompt specialization, scene
//! assessment and the model gateway seam.

pub mod attachments;
pub mod brain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod service;
pub mod session;
pub mod text_extract;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use error::AppError;
pub use service::{ChatService, SceneReport};
