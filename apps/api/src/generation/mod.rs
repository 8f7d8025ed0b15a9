// Generation tasks: resume feedback, cover letter, interview questions.
// All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;

#[cfg(test)]
pub mod testing;
