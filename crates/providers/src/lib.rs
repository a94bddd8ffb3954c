pub mod openai_compatible;
pub mod prompt;
pub mod session;
pub mod traits;

pub use openai_compatible::OpenAIProvider;
pub use prompt::{format_spanish_date, replace_date_placeholders, resolve_prompt};
pub use session::{compose_chat_messages, ChatRequest, SessionConfig};
pub use traits::{LLMProvider, Message, ProviderError};
