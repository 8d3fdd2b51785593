// All LLM prompt constants for criterion scoring.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{truncate_chars, EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::ranking::models::CriterionWeights;

/// Resume text beyond this many characters is not sent to the model.
pub const MAX_RESUME_CHARS: usize = 12_000;

/// Role framing for criterion scoring. `JSON_ONLY_SYSTEM` is appended at build time.
pub const CRITERION_SCORING_ROLE: &str =
    "You are an expert technical recruiter evaluating one candidate resume against a job description.";

/// Scoring prompt template. Placeholders: `{evidence_instruction}`, `{technical_keywords}`,
/// `{soft_skill_keywords}`, `{weight_guidance}`, `{jd_text}`, `{resume_text}`.
pub const CRITERION_SCORING_PROMPT_TEMPLATE: &str = r#"Evaluate the resume against the job description on five independent criteria.
Score each criterion from 0 to 100, where 100 means the resume fully satisfies what the job description asks for on that criterion.

Criteria:
- skills: coverage and depth of the technical and soft skills the role needs
- experience: relevance, seniority and duration of work experience
- education: relevance and level of degrees, courses and certifications
- projects: relevance and substance of personal, academic or professional projects
- achievements: measurable outcomes, awards and recognitions

Additionally, score every listed technical and soft skill from 0.0 to 1.0 based on the strength of evidence for it.

{evidence_instruction}

Return a JSON object with this EXACT schema:
{
  "candidate_name": "Full name, or null if not stated",
  "scores": {
    "skills": 0,
    "experience": 0,
    "education": 0,
    "projects": 0,
    "achievements": 0
  },
  "tech_skills_scores": {"skill": 0.0},
  "soft_skills_scores": {"skill": 0.0},
  "analysis": "Two or three sentences on strengths, weaknesses and score reasoning."
}

### Technical Skills to Evaluate:
{technical_keywords}

### Soft Skills to Evaluate:
{soft_skill_keywords}

{weight_guidance}

### Job Description:
{jd_text}

### Resume:
{resume_text}"#;

pub fn criterion_scoring_system() -> String {
    format!("{CRITERION_SCORING_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Tells the model which sections the caller cares about. The weights never scale the returned
/// sub-scores; weighting happens in the combiner.
pub fn weight_guidance(weights: &CriterionWeights) -> String {
    let active: Vec<String> = weights
        .active()
        .map(|(criterion, weight)| format!("- {}: {weight}", criterion.as_str()))
        .collect();

    if active.is_empty() {
        return "### Section Emphasis:\nUse balanced attention across all resume sections.".to_string();
    }
    format!(
        "### Section Emphasis:\nThe recruiter weights these sections (higher = more important). \
        Scrutinise them carefully, but still score every criterion on its own merits:\n{}",
        active.join("\n")
    )
}

pub fn build_criterion_scoring_prompt(
    job_description: &str,
    resume_text: &str,
    technical_keywords: &[String],
    soft_skill_keywords: &[String],
    weights: &CriterionWeights,
) -> String {
    CRITERION_SCORING_PROMPT_TEMPLATE
        .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION)
        .replace("{technical_keywords}", &keyword_line(technical_keywords))
        .replace("{soft_skill_keywords}", &keyword_line(soft_skill_keywords))
        .replace("{weight_guidance}", &weight_guidance(weights))
        .replace("{jd_text}", job_description.trim())
        // Resume last: its content must not be re-scanned for placeholders.
        .replace("{resume_text}", truncate_chars(resume_text, MAX_RESUME_CHARS))
}

fn keyword_line(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "None".to_string()
    } else {
        keywords.join(", ")
    }
}
