//! KeywordCriterionScorer — pure-Rust heuristic backend. Fast, deterministic, no network call.
//!
//! Algorithm (each criterion 0–100):
//! - skills: share of requested keywords found as whole terms (technical 0.7 / soft 0.3 when
//!   both lists are given); with no keywords, share of distinct JD terms found in the resume
//! - experience: experience heading + claimed years + distinct calendar years mentioned
//! - education: education heading + distinct degree / institution markers
//! - projects: projects heading + repository links + JD keywords mentioned
//! - achievements: achievements heading + quantified lines (digits with %, $, x, etc.)

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::ranking::models::{CriterionScores, ScoreCard};
use crate::ranking::scoring::{CriterionScorer, ScoringError, ScoringInput};

const EXPERIENCE_HEADINGS: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "employment",
    "work history",
];
const EDUCATION_HEADINGS: &[&str] = &["education", "academic background", "qualifications"];
const PROJECT_HEADINGS: &[&str] = &["projects", "personal projects", "academic projects"];
const ACHIEVEMENT_HEADINGS: &[&str] = &[
    "achievements",
    "awards",
    "honors",
    "honours",
    "accomplishments",
    "certifications",
];

const DEGREE_MARKERS: &[&str] = &[
    "bachelor",
    "master",
    "phd",
    "ph.d",
    "doctorate",
    "b.tech",
    "m.tech",
    "b.sc",
    "m.sc",
    "b.e",
    "mba",
    "degree",
    "university",
    "college",
    "institute",
];

const REPOSITORY_MARKERS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// JD words too common to signal anything.
const STOPWORDS: &[&str] = &[
    "with", "that", "this", "will", "have", "from", "your", "you", "our", "are", "and", "the",
    "for", "who", "what", "team", "work", "role", "about", "they", "their", "into", "must",
    "able", "strong", "years", "year", "experience", "including", "such", "other", "also",
];

const TECHNICAL_SHARE: f64 = 0.7;

pub struct KeywordCriterionScorer;

#[async_trait]
impl CriterionScorer for KeywordCriterionScorer {
    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreCard, ScoringError> {
        Ok(score_resume(input))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

/// Synchronous core of the keyword scorer.
pub fn score_resume(input: &ScoringInput<'_>) -> ScoreCard {
    let resume = input.resume_text.to_lowercase();
    let lines: Vec<&str> = resume.lines().map(str::trim).collect();

    let technical_keyword_scores = keyword_presence(&resume, input.technical_keywords);
    let soft_skill_keyword_scores = keyword_presence(&resume, input.soft_skill_keywords);

    let skills = skills_score(
        &resume,
        input.job_description,
        &technical_keyword_scores,
        &soft_skill_keyword_scores,
    );
    let experience = experience_score(&resume, &lines);
    let education = education_score(&resume, &lines);
    let projects = projects_score(&resume, &lines, input.technical_keywords);
    let achievements = achievements_score(&lines);

    ScoreCard {
        scores: CriterionScores::complete(skills, experience, education, projects, achievements),
        candidate_name: None,
        analysis: None,
        technical_keyword_scores,
        soft_skill_keyword_scores,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-criterion scoring
// ────────────────────────────────────────────────────────────────────────────

fn skills_score(
    resume: &str,
    job_description: &str,
    technical: &BTreeMap<String, f64>,
    soft: &BTreeMap<String, f64>,
) -> f64 {
    let coverage = match (coverage(technical), coverage(soft)) {
        (Some(t), Some(s)) => TECHNICAL_SHARE * t + (1.0 - TECHNICAL_SHARE) * s,
        (Some(t), None) => t,
        (None, Some(s)) => s,
        (None, None) => jd_term_overlap(resume, job_description),
    };
    round_score(coverage * 100.0)
}

fn experience_score(resume: &str, lines: &[&str]) -> f64 {
    let heading = if has_heading(lines, EXPERIENCE_HEADINGS) { 40.0 } else { 0.0 };
    let claimed_years = max_claimed_years(resume).min(8) as f64 * 5.0;
    let calendar_years = (distinct_calendar_years(resume).min(5) as f64) * 4.0;
    round_score(heading + claimed_years + calendar_years)
}

fn education_score(resume: &str, lines: &[&str]) -> f64 {
    let heading = if has_heading(lines, EDUCATION_HEADINGS) { 40.0 } else { 0.0 };
    let markers = DEGREE_MARKERS
        .iter()
        .filter(|m| contains_term(resume, m))
        .count();
    round_score(heading + (markers.min(4) as f64) * 15.0)
}

fn projects_score(resume: &str, lines: &[&str], technical_keywords: &[String]) -> f64 {
    let heading = if has_heading(lines, PROJECT_HEADINGS) { 50.0 } else { 0.0 };
    let repositories = if REPOSITORY_MARKERS.iter().any(|m| resume.contains(m)) {
        15.0
    } else {
        0.0
    };
    let keywords = technical_keywords
        .iter()
        .filter(|k| contains_term(resume, k))
        .count();
    round_score(heading + repositories + (keywords.min(7) as f64) * 5.0)
}

fn achievements_score(lines: &[&str]) -> f64 {
    let heading = if has_heading(lines, ACHIEVEMENT_HEADINGS) { 40.0 } else { 0.0 };
    let quantified = lines.iter().filter(|l| is_quantified(l)).count();
    round_score(heading + (quantified.min(6) as f64) * 10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Text helpers
// ────────────────────────────────────────────────────────────────────────────

fn keyword_presence(resume: &str, keywords: &[String]) -> BTreeMap<String, f64> {
    keywords
        .iter()
        .map(|k| {
            let found = contains_term(resume, k);
            (k.clone(), if found { 1.0 } else { 0.0 })
        })
        .collect()
}

fn coverage(presence: &BTreeMap<String, f64>) -> Option<f64> {
    if presence.is_empty() {
        return None;
    }
    Some(presence.values().sum::<f64>() / presence.len() as f64)
}

fn jd_term_overlap(resume: &str, job_description: &str) -> f64 {
    let jd = job_description.to_lowercase();
    let terms: BTreeSet<&str> = jd
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .collect();
    if terms.is_empty() {
        return 0.0;
    }
    let found = terms.iter().filter(|t| contains_term(resume, t)).count();
    found as f64 / terms.len() as f64
}

/// Whole-term, case-sensitive match: the characters around the match must not be alphanumeric,
/// so "go" does not match "google" and "c" does not match "react".
/// Callers pass lowercased text and terms.
fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// A line that is just a section heading ("Experience", "WORK HISTORY:", "## Projects").
fn has_heading(lines: &[&str], headings: &[&str]) -> bool {
    lines.iter().any(|line| {
        let cleaned = line
            .trim_matches(|c: char| !c.is_alphanumeric())
            .trim();
        headings.iter().any(|h| cleaned == *h)
    })
}

fn years_regex() -> &'static Regex {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    YEARS.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})\+?\s*(?:years?|yrs?)\b").expect("years pattern is a valid regex")
    })
}

fn calendar_year_regex() -> &'static Regex {
    static CALENDAR: OnceLock<Regex> = OnceLock::new();
    CALENDAR.get_or_init(|| {
        Regex::new(r"\b(?:19[89]\d|20[0-4]\d)\b").expect("calendar year pattern is a valid regex")
    })
}

fn max_claimed_years(resume: &str) -> u32 {
    years_regex()
        .captures_iter(resume)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

fn distinct_calendar_years(resume: &str) -> usize {
    calendar_year_regex()
        .find_iter(resume)
        .map(|m| m.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Quantified impact: a digit alongside %, currency, a multiplier, or a magnitude word.
fn is_quantified(line: &str) -> bool {
    let has_digit = line.chars().any(|c| c.is_ascii_digit());
    if !has_digit {
        return false;
    }
    line.contains('%')
        || line.contains('$')
        || line.contains('€')
        || line.contains('£')
        || line.contains("x faster")
        || line.contains("x improvement")
        || line.contains("x reduction")
        || ["users", "customers", "requests", "revenue", "latency", "reduced", "increased"]
            .iter()
            .any(|w| line.contains(w))
}

fn round_score(value: f64) -> f64 {
    (value.clamp(CriterionScores::MIN, CriterionScores::MAX) * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::models::CriterionWeights;

    const STRONG_RESUME: &str = "Jane Doe\njane@example.com\n\
        Experience\n\
        Senior Backend Engineer, Acme (2019 - 2024)\n\
        8+ years building distributed systems in Rust and Go\n\
        Reduced p99 latency by 40% for 2M users\n\
        Education\n\
        B.Sc Computer Science, State University, 2015\n\
        Projects\n\
        tokio-ring: io_uring runtime — github.com/jane/tokio-ring\n\
        Achievements\n\
        Won 1st place at RustConf hackathon 2022\n\
        Cut infra cost by $120k per year";

    fn input<'a>(
        resume: &'a str,
        jd: &'a str,
        technical: &'a [String],
        soft: &'a [String],
        weights: &'a CriterionWeights,
    ) -> ScoringInput<'a> {
        ScoringInput {
            resume_text: resume,
            job_description: jd,
            technical_keywords: technical,
            soft_skill_keywords: soft,
            weights,
        }
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("rust and go developer", "go"));
        assert!(!contains_term("worked at google", "go"));
        assert!(!contains_term("react native", "c"));
        assert!(contains_term("c++ and c#", "c++"));
        assert!(contains_term("node.js, python", "node.js"));
        assert!(!contains_term("anything", "   "));
    }

    #[test]
    fn test_strong_resume_scores_all_criteria() {
        let technical = keywords(&["rust", "go", "kubernetes"]);
        let soft = keywords(&["leadership"]);
        let weights = CriterionWeights::default();
        let card = score_resume(&input(
            STRONG_RESUME,
            "Senior Rust engineer",
            &technical,
            &soft,
            &weights,
        ));
        let s = &card.scores;

        // technical 2/3, soft 0/1 → 0.7 * 0.667 = 46.7
        assert_eq!(s.skills, Some(46.7));
        assert!(s.experience.unwrap() >= 80.0, "{:?}", s.experience);
        assert!(s.education.unwrap() >= 70.0, "{:?}", s.education);
        assert!(s.projects.unwrap() >= 75.0, "{:?}", s.projects);
        assert!(s.achievements.unwrap() >= 60.0, "{:?}", s.achievements);
        assert_eq!(card.technical_keyword_scores["kubernetes"], 0.0);
        assert_eq!(card.technical_keyword_scores["rust"], 1.0);
    }

    #[test]
    fn test_sparse_resume_scores_low() {
        let weights = CriterionWeights::default();
        let card = score_resume(&input(
            "John Smith\nI like computers.",
            "Senior Rust engineer",
            &[],
            &[],
            &weights,
        ));
        let s = &card.scores;
        assert_eq!(s.experience, Some(0.0));
        assert_eq!(s.education, Some(0.0));
        assert_eq!(s.projects, Some(0.0));
        assert_eq!(s.achievements, Some(0.0));
    }

    #[test]
    fn test_no_keywords_falls_back_to_jd_overlap() {
        let weights = CriterionWeights::default();
        // JD terms: senior, rust, engineer, kafka → resume has rust + kafka
        let card = score_resume(&input(
            "Rust and Kafka specialist",
            "Senior Rust engineer with Kafka",
            &[],
            &[],
            &weights,
        ));
        assert_eq!(card.scores.skills, Some(50.0));
    }

    #[test]
    fn test_scores_always_within_range_and_complete() {
        let technical = keywords(&["rust"]);
        let weights = CriterionWeights::default();
        let noisy = "Experience\n".repeat(50) + &"100% 200% 300% $5 users\n".repeat(50);
        let card = score_resume(&input(&noisy, "rust", &technical, &[], &weights));
        assert_eq!(card.scores.out_of_range(), None);
        for criterion in crate::ranking::models::Criterion::ALL {
            assert!(card.scores.get(criterion).is_some());
        }
    }

    #[test]
    fn test_heading_detection_ignores_decoration() {
        assert!(has_heading(&["## projects:"], PROJECT_HEADINGS));
        assert!(has_heading(&["— work history —"], EXPERIENCE_HEADINGS));
        assert!(!has_heading(&["my experience with rust"], EXPERIENCE_HEADINGS));
    }

    #[test]
    fn test_claimed_years_takes_maximum() {
        assert_eq!(max_claimed_years("3 years of go, 7+ yrs of rust"), 7);
        assert_eq!(max_claimed_years("no tenure stated"), 0);
    }

    #[test]
    fn test_claimed_years_ignore_tail_of_calendar_year() {
        assert_eq!(max_claimed_years("rust since 2019 years ago"), 0);
        assert_eq!(max_claimed_years("joined in 1995yrs later left"), 0);
        assert_eq!(max_claimed_years("since 2019, 5 years on kafka"), 5);
    }

    #[test]
    fn test_quantified_lines() {
        assert!(is_quantified("reduced latency by 40%"));
        assert!(is_quantified("served 2m users"));
        assert!(!is_quantified("improved performance significantly"));
        assert!(!is_quantified("won 1st place"));
    }

    #[tokio::test]
    async fn test_scorer_is_deterministic() {
        let technical = keywords(&["rust", "go"]);
        let weights = CriterionWeights::default();
        let scoring_input = input(STRONG_RESUME, "Rust engineer", &technical, &[], &weights);
        let first = KeywordCriterionScorer.score(&scoring_input).await.unwrap();
        let second = KeywordCriterionScorer.score(&scoring_input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(KeywordCriterionScorer.backend(), "keyword");
    }
}
