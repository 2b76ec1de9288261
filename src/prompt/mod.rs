mod engine;
mod template;

pub use engine::TeraEngine;
pub use template::{PROMPT_TEMPLATE, PromptTemplate};
