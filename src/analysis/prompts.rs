// src/analysis/prompts.rs
use crate::job_board::JobListing;

pub const SYSTEM_PROMPT: &str = r#"You are an expert ATS system and career advisor analyzing job descriptions and resumes.
You must respond ONLY with a valid JSON object in the exact format shown below:
{
    "match_score": <number between 0-100>,
    "score_breakdown": {
        "skills": <number between 0-100>,
        "experience": <number between 0-100>,
        "role": <number between 0-100>,
        "education": <number between 0-100>
    },
    "german_required": <"Yes" or "No">,
    "key_matches": <array of strings>,
    "missing_skills": <array of strings>,
    "recommendation": <string>
}
Do not include any other text or explanation outside the JSON object."#;

/// User prompt for one listing: title, resume, description and the
/// scoring rules.
pub fn fit_prompt(listing: &JobListing, resume: &str) -> String {
    format!(
        r#"JOB TITLE: {title}
COMPANY: {company}

RESUME:
{resume}

JOB DESCRIPTION:
{description}

Analyze based on:
1. Skills Match (30%): Technical and soft skills alignment
2. Experience Relevance (30%): Years and type of experience
3. Role Alignment (25%): Job responsibility match
4. Education/Qualifications (15%): Required qualifications match

Report each of the four as a 0-100 sub-score in "score_breakdown" and the
weighted total as "match_score".

German Language:
- "Yes" only if German explicitly required
- "No" if preferred/optional/not mentioned
- "No" if job is in German but doesn't specify requirement

Respond ONLY with a JSON object matching the format specified in the system prompt.
Do not include any text before or after the JSON object."#,
        title = listing.title,
        company = listing.company,
        resume = resume.trim(),
        description = listing.description,
    )
}
