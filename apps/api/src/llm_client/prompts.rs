// Cross-cutting prompt fragments shared by every generation task.
// Task-specific templates live in generation/prompts.rs.

/// Appended to every system prompt whose task expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Shared input block. Replace `{resume}` and `{job_description}` before sending.
pub const RESUME_AND_JD_BLOCK: &str = r#"**Resume**:
{resume}

**Job Description**:
{job_description}"#;

/// Fills the shared resume/job-description block.
pub fn resume_and_jd(resume: &str, job_description: &str) -> String {
    RESUME_AND_JD_BLOCK
        .replace("{resume}", resume)
        .replace("{job_description}", job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_and_jd_fills_both_placeholders() {
        let block = resume_and_jd("Rust engineer, 6 years", "Senior SRE at Acme");
        assert!(block.contains("Rust engineer, 6 years"));
        assert!(block.contains("Senior SRE at Acme"));
        assert!(!block.contains("{resume}"));
        assert!(!block.contains("{job_description}"));
    }
}
