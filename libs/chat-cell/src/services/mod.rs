pub mod chat;
pub mod relay;

pub use chat::ChatService;
pub use relay::ChatRelay;
