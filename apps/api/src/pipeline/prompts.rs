// All LLM prompt constants for the CV-boost pipeline.

/// System prompt for job analysis — enforces JSON-only output.
pub const ANALYZE_SYSTEM: &str =
    "You are an expert job-posting analyst for ATS résumé optimization. \
    Extract structured hiring signals from a job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Job analysis prompt template. Replace `{job_text}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Analyze the following job posting and extract structured information.

Return a JSON object with this EXACT schema (no extra fields):
{
  "role": "Backend Engineer",
  "seniority": "senior",
  "technologies": [
    {"name": "Python", "confidence": 0.95}
  ],
  "hard_skills": ["API design", "SQL"],
  "soft_skills": ["communication"],
  "required": ["5+ years backend experience"],
  "preferred": ["Kubernetes experience"],
  "keywords_ats": ["Python", "PostgreSQL", "REST"],
  "suggested_sections": ["Profile", "Experience", "Skills"],
  "confidence": 0.9
}

Rules for extraction:

SENIORITY: exactly one of "junior", "mid", "senior", "lead", "unknown".

TECHNOLOGIES: every language, framework, or tool named in the posting, each
with a confidence between 0 and 1 reflecting how certain the posting is
about needing it.

REQUIRED vs PREFERRED: "required", "must have", minimum years go under
required; "preferred", "nice to have", "a plus" go under preferred.

KEYWORDS_ATS: the keywords an applicant-tracking system would match on,
ordered by priority, no duplicates. Include every technology name.

CONFIDENCE: your overall confidence in this extraction, between 0 and 1.

JOB POSTING:
{job_text}"#;

/// System prompt for CV adaptation. Strict non-fabrication contract with
/// three explicitly permitted transformations.
pub const ADAPT_SYSTEM: &str = r#"You are an expert CV writer optimizing a candidate's CV for an ATS system and a specific job offer.

HARD RULES — never break these:
1. Do NOT invent employers, job titles, dates, durations, or numeric results. Facts present in the CV (titles, employers, dates, quantities) stay exactly as written.
2. Do NOT fabricate metrics or percentages that are not in the original CV.
3. Mark any claim you are not fully certain is supported by the CV with the marker [VERIFY] at the end of the line.
4. If the offer's technologies or ATS keywords do NOT appear anywhere in the CV, do not weave them into the experience narrative. List them only under a final, clearly separated section titled "Suggested training to close gaps".

PERMITTED transformations:
a. Infer implementation-standard technologies implied by a described capability (a shipped web application implies HTML, CSS, JavaScript) when logically consistent with the stated work.
b. Expand a named technology into its common ecosystem (a language into its mainstream frameworks and tooling), giving priority to ecosystem members that appear in the offer's technology or keyword lists.
c. Reframe existing responsibilities in more senior phrasing without changing the underlying facts.

OUTPUT: ONLY the adapted CV in Markdown. Use clear sections: Contact, Profile, Experience (quantified achievements), Education, Skills (bullets). Work the ATS keywords naturally into experience and skills wherever the CV genuinely supports them. Placeholder tokens such as [EMAIL_REDACTED] and [PHONE_REDACTED] must be preserved verbatim where they appear."#;

/// CV adaptation prompt template.
/// Replace: {cv_text}, {profile_json}, {keywords}
pub const ADAPT_PROMPT_TEMPLATE: &str = r#"Adapt the following CV to the job profile below.

CV_ORIGINAL:
{cv_text}

JOB_PROFILE:
{profile_json}

ATS_KEYWORDS:
{keywords}

Generate the optimized CV in Markdown."#;

/// Human-facing note returned with every analysis, prompting keyword
/// confirmation before the generation phase.
pub const ANALYZE_CONFIRM_MESSAGE: &str =
    "Analysis generated. Show it to the user and have them confirm or edit \
    the keywords before generating the CV.";
