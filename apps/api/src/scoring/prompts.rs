// Scoring prompt templates.

pub const SCORE_SYSTEM: &str = "\
You are an experienced recruiter and applicant-tracking-system (ATS) reviewer. \
You score résumés honestly and consistently. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const SCORE_PROMPT: &str = r#"Evaluate the following document as a résumé (CV).

DOCUMENT:
{cv_text}

If the document is NOT a résumé (for example an invoice, an essay, a photo caption,
or random text), return exactly:
{"isCv": false, "message": "<one sentence explaining why this is not a CV>"}

Otherwise return exactly this structure:
{
  "isCv": true,
  "overallScore": 0-100,
  "atsCompatibility": 0-100,
  "keywordMatch": 0-100,
  "readability": 0-100,
  "sections": [
    {"name": "summary", "score": 0-100, "status": "excellent" | "good" | "needs_improvement" | "poor", "feedback": "string"},
    {"name": "work_experience", "score": 0-100, "status": "...", "feedback": "string"},
    {"name": "education", "score": 0-100, "status": "...", "feedback": "string"},
    {"name": "skills", "score": 0-100, "status": "...", "feedback": "string"}
  ],
  "suggestions": ["string"]
}

RULES:
1. Always return all four sections, even when the document has no content for one of them.
2. A section with no content (marked "(none)" or simply absent) scores at most 20 with status "poor",
   and its feedback says what to add.
3. Scores are integers. Status follows the score: 85+ excellent, 70-84 good, 40-69 needs_improvement, below 40 poor.
4. Give 3 to 6 concrete, actionable suggestions, most important first.
5. {language_instruction}
6. Return ONLY the JSON object, without code fences."#;
