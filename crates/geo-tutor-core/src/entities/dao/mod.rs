pub mod chat;
pub mod topic;

pub use chat::ChatExchange;
pub use topic::{NewTopic, TopicRecord};
