pub mod factory;
pub mod gemini;
pub mod openai;

pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
