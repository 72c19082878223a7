//! geo-tutor-core – everything behind the HTTP surface.
//!
//! - [`entities`]: SQLite-backed chat log and topic catalog.
//! - [`llm`]: OpenAI-compatible chat-completion client.
//! - [`tutor`]: the question-answering service tying the two together.
//! - [`seed`]: the fixed topic list loaded into an empty catalog.

pub mod entities;
pub mod error;
pub mod llm;
pub mod seed;
pub mod tutor;
pub mod types;

pub use error::TutorError;
pub use tutor::{AskQuestion, SeedOutcome, Tutor, TutorSettings};
pub use types::{Difficulty, UserId};
