// Prompt constants for field generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for all field generation. Enforces JSON-only output.
pub const GENERATION_SYSTEM: &str = "You are an expert résumé writer who helps job seekers \
    describe their experience clearly and truthfully. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace `{job_title}`, `{skills}`, `{experience}` and `{language_instruction}`.
pub const SUMMARY_PROMPT: &str = r#"Write a professional summary for a résumé.

TARGET ROLE: {job_title}
SKILLS: {skills}
WORK EXPERIENCE:
{experience}

Return a JSON object with this EXACT schema:
{"summary": "string"}

RULES:
1. Two to four sentences, written in first person without the word "I".
2. Mention only skills and experience listed above. Do not invent employers, numbers or degrees.
3. {language_instruction}"#;

/// Replace `{job_title}`, `{company}`, `{description}` and `{language_instruction}`.
pub const WORK_EXPERIENCE_PROMPT: &str = r#"Improve the description of one position on a résumé.

JOB TITLE: {job_title}
COMPANY: {company}
CURRENT DESCRIPTION:
{description}

Return a JSON object with this EXACT schema:
{"description": "string", "achievements": ["string"]}

RULES:
1. "description" is one or two sentences about the scope of the role.
2. "achievements" has 3 to 5 bullet points, each starting with an action verb, one line each.
3. Stay faithful to the current description. When it is empty, write plausible duties for the
   job title without inventing metrics.
4. {language_instruction}"#;
