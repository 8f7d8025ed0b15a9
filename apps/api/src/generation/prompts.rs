// Prompt constants for the three generation tasks.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for resume feedback. JSON-only output is appended at call time.
pub const RESUME_FEEDBACK_SYSTEM: &str =
    "You are a resume analysis assistant and an expert in job matching.";

/// Resume feedback prompt. Replace `{inputs}` before sending.
pub const RESUME_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Given the following resume and job description, provide an in-depth evaluation of how the resume can be refined to better match the job description.

Your analysis should include:
- Specific sections of the resume that align well with the job description.
- Missing skills, experiences, or qualifications that are crucial.
- Irrelevant sections that should be removed.
- Suggestions for enhancing particular projects or experiences.

The job description summary must fit in one clear paragraph and include:
- Required skills and technologies
- Preferred skills (if mentioned)
- Key responsibilities (in brief)
- Years of experience required
- Salary details (if mentioned)
- Any unique attributes about the company or role

Return a JSON object with this EXACT schema:
{
  "companyName": "Company Name Here",
  "position": "Position Here",
  "location": "Location Here",
  "jobDescription": "Brief summary of the job description",
  "resumeFeedback": "Detailed and actionable feedback"
}

{inputs}"#;

/// System prompt for cover letters.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert cover letter writer.";

/// Cover letter prompt. Replace `{inputs}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Create a personalized and polished cover letter tailored to the job description and the applicant's resume.

Requirements:
- Start with "Dear Hiring Manager,".
- Open by introducing the applicant, expressing interest in the position, and naming the company.
- Highlight the applicant's education and how it aligns with the job.
- In the body, highlight key skills, achievements, and experiences with specific examples from the resume.
- Close with enthusiasm for the opportunity and willingness to discuss the role further.
- Use simple, clear, natural language in 3-4 short paragraphs.
- Include relevant keywords from the job description naturally.

Return a JSON object with this EXACT schema:
{
  "companyName": "Company Name Here",
  "position": "Position Here",
  "coverLetterBody": "Dear Hiring Manager, ..."
}

{inputs}"#;

/// System prompt for interview questions.
pub const INTERVIEW_QUESTIONS_SYSTEM: &str = "You are an expert interview question generator.";

/// Interview questions prompt.
/// Replace: {num_questions}, {question_type}, {inputs}
pub const INTERVIEW_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Given the job description and the user's resume, generate {num_questions} {question_type} interview questions that could be asked for this position.

Requirements:
- Each question must include a detailed model answer that demonstrates how to answer it effectively.
- Include only the requested question type: "{question_type}".

Return a JSON object with this EXACT schema:
{
  "interviewQuestions": [
    {"type": "{question_type}", "question": "Example question here", "answer": "Example answer here"}
  ]
}

{inputs}"#;
