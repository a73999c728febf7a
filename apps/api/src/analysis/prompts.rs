// All LLM prompt constants for the analysis pipeline.
// Templates carry `{resume_text}` and `{job_description}` placeholders,
// filled verbatim before sending — no escaping, no length limits here.

use std::str::FromStr;

use thiserror::Error;

/// System prompt for every analysis session.
pub const ANALYSIS_SYSTEM: &str = "You are a professional resume reviewer and an expert \
    in making resumes ATS-friendly. Ground every observation in the resume and job \
    description you are given, and answer in plain prose without markdown code fences.";

/// Single-prompt review — critique, missing skills, tone, formatting, and a
/// rating in one answer.
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"You are a professional resume reviewer. Analyze the resume text below
and provide suggestions, missing skills, tone, formatting improvements,
and a rating out of 10 based on the job description.

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// First prompt of the extended pipeline — review plus an ATS assessment.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are a professional resume reviewer and expert in making resumes ATS-friendly.
Analyze the resume text below and provide:

1. Suggestions for improvement
2. Missing skills or keywords based on the job description
3. Tone and formatting improvements
4. Rating out of 10
5. Whether the resume is ATS-friendly or not

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// Second prompt of the extended pipeline — the rewritten resume.
pub const OPTIMIZED_RESUME_PROMPT_TEMPLATE: &str = r#"Please rewrite the following resume to make it highly optimized and ATS-friendly.
Keep it professional and relevant to the job description.

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// Third prompt of the extended pipeline — the cover letter. Relies on the
/// session already having seen the resume in the earlier turns.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a job-specific cover letter based on the following resume and job description.

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// Which prompt pipeline the deployment runs. Selected once at startup via
/// the `PROMPT_SET` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSet {
    /// One prompt: feedback only.
    Minimal,
    /// Three prompts: feedback, optimized resume, cover letter.
    Extended,
}

#[derive(Debug, Error)]
#[error("unknown prompt set '{0}' (expected 'minimal' or 'extended')")]
pub struct ParsePromptSetError(String);

impl FromStr for PromptSet {
    type Err = ParsePromptSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(PromptSet::Minimal),
            "extended" => Ok(PromptSet::Extended),
            other => Err(ParsePromptSetError(other.to_string())),
        }
    }
}

/// Named slot an individual prompt's answer lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Feedback,
    OptimizedResume,
    CoverLetter,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub slot: Slot,
    pub text: String,
}

/// Builds the ordered prompt list for one analysis.
pub fn build_prompts(set: PromptSet, resume_text: &str, job_description: &str) -> Vec<Prompt> {
    let fill = |template: &str| {
        template
            .replace("{resume_text}", resume_text)
            .replace("{job_description}", job_description)
    };

    match set {
        PromptSet::Minimal => vec![Prompt {
            slot: Slot::Feedback,
            text: fill(REVIEW_PROMPT_TEMPLATE),
        }],
        PromptSet::Extended => vec![
            Prompt {
                slot: Slot::Feedback,
                text: fill(FEEDBACK_PROMPT_TEMPLATE),
            },
            Prompt {
                slot: Slot::OptimizedResume,
                text: fill(OPTIMIZED_RESUME_PROMPT_TEMPLATE),
            },
            Prompt {
                slot: Slot::CoverLetter,
                text: fill(COVER_LETTER_PROMPT_TEMPLATE),
            },
        ],
    }
}
