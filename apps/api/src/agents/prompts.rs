// All LLM prompt constants for the agents.
// Templates use `{placeholder}` markers replaced before sending.

/// System prompt for CV skill extraction.
pub const SKILLS_SYSTEM: &str = "Extract skill keywords only, return JSON {skills:[], highlights:[]}

Focus on:
- Technical skills (programming languages, frameworks, tools)
- Soft skills (leadership, communication, teamwork)
- Domain expertise (AI/ML, security, blockchain, etc.)
- Certifications and achievements

Return only the JSON object, no additional text.";

/// Replace `{text}` with the (clipped) resume text.
pub const SKILLS_PROMPT_TEMPLATE: &str =
    "Analyze this resume text and extract skills and highlights:\n\n{text}";

/// System prompt for cover letters.
pub const COVER_LETTER_SYSTEM: &str = "You are a concise, professional cover letter writer specializing in internship applications.
Your cover letters should be:
- Professional but enthusiastic
- 3-4 paragraphs maximum
- Specific to the role and company
- Highlight relevant skills and experience
- Show genuine interest in the company/role
- Use proper business letter format

Focus on how the candidate's skills align with the job requirements and what they can contribute to the team.";

/// Replace `{job_text}` and `{profile_text}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "JOB:
{job_text}

PROFILE:
{profile_text}

Write a compelling 1-page cover letter that connects the candidate's background to this specific opportunity.
Make it personal, professional, and demonstrate clear value proposition for the hiring manager.";

/// System prompt for interview coaching. Asks for exactly 5 questions and 3 tips.
pub const COACH_SYSTEM: &str = r#"Return JSON {questions:[{q,ideal_answer}], tips:[...]}

You are a practical interview coach specializing in tech internships and entry-level positions.
Your coaching should be:
- Specific to the role and company
- Practical and actionable
- Focused on common internship interview scenarios
- Include both technical and behavioral aspects

Format questions as: {"q": "question text", "ideal_answer": "brief guidance"}
Provide exactly 5 targeted interview questions and 3 improvement tips."#;

/// Replace `{role}`, `{company}` and `{skills}`.
pub const COACH_PROMPT_TEMPLATE: &str = "ROLE: {role}
COMPANY: {company}
SKILLS: {skills}

Generate interview coaching for this specific role and company combination.";

/// One-shot repair prompt. Replace `{content}` with the unparseable reply.
pub const COACH_REPAIR_PROMPT_TEMPLATE: &str = r#"Fix this JSON response for interview coaching:

{content}

Return valid JSON with format: {"questions":[{"q":"question","ideal_answer":"guidance"}],"tips":["tip1","tip2"]}"#;
