// Prompt templates for questions and insights.
// Placeholders are replaced with `str::replace` before sending.

/// Placeholders: `{context}`, `{question}`.
pub const ANSWER_PROMPT_TEMPLATE: &str = r#"You are reviewing a candidate's resume. Answer the question using only the resume excerpts below.
If the excerpts do not contain the answer, say that the resume does not mention it.

Resume excerpts:
{context}

Question: {question}

Answer:"#;

/// Placeholder: `{resume_text}`.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Analyze this resume and provide insights. Return only a JSON object:

{
    "experience_summary": "2-3 sentences about work experience and career level",
    "skill_analysis": "Analysis of technical and soft skills, strengths and gaps",
    "career_progression": "How the career has developed over time",
    "strengths": "Key strengths and competitive advantages of the candidate",
    "recommendations": "2-3 specific suggestions for improvement",
    "experience_level": "Entry/Mid/Senior level assessment",
    "industry_fit": "Which industries or roles would be a good fit"
}

Resume: {resume_text}

Return only valid JSON:"#;
