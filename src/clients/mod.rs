pub mod gemini_client;
pub mod generative_model;

pub use gemini_client::GeminiClient;
pub use generative_model::{
    GenerateContentRequest, GenerationConfig, GenerativeModel, InlineData, Part, Turn,
};
