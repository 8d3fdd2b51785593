// Prompt constants for single-resume quality review.

use crate::llm_client::prompts::{truncate_chars, EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM};

/// Resume text beyond this many characters is not sent for review.
pub const MAX_REVIEW_CHARS: usize = 5_000;

pub const RESUME_REVIEW_ROLE: &str =
    "You are an expert resume reviewer giving the structured assessment an experienced HR screener would.";

/// Placeholders: `{evidence_instruction}`, `{resume_text}`.
pub const RESUME_REVIEW_PROMPT_TEMPLATE: &str = r#"Review the resume below section by section.

1. Content Quality: measurable impact statements, grammar, ATS readability.
2. Resume Structure: presence and clarity of education, experience and contact information.
3. ATS Essentials: format suitability, design, a professional email address, working hyperlinks.

Score each section from 0 to 100 and give one overall score from 0 to 100.
For each section, mark every sub-point true or false, and write a recruiter-style review of 4-5 lines.
Finish with an overall review of 5-6 lines covering strengths, weaknesses and concrete improvements.

{evidence_instruction}

Return a JSON object with this EXACT schema:
{
  "candidate_name": "Full name, or null if not stated",
  "scores": {
    "content_quality": 0,
    "resume_structure": 0,
    "ats_essentials": 0,
    "overall_score": 0
  },
  "subpoints": {
    "content_quality": {"impact_statements": false, "grammar": false, "ats_readability": false},
    "resume_structure": {"education": false, "experience": false, "contact_info": false},
    "ats_essentials": {"format": false, "design": false, "email": false, "hyperlinks": false}
  },
  "suggestions": {
    "content_quality": "",
    "resume_structure": "",
    "ats_essentials": "",
    "overall": ""
  }
}

### Resume:
{resume_text}"#;

pub fn resume_review_system() -> String {
    format!("{RESUME_REVIEW_ROLE} {JSON_ONLY_SYSTEM}")
}

pub fn build_resume_review_prompt(resume_text: &str) -> String {
    RESUME_REVIEW_PROMPT_TEMPLATE
        .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION)
        .replace("{resume_text}", truncate_chars(resume_text, MAX_REVIEW_CHARS))
}
