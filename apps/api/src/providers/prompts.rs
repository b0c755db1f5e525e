// Prompt templates for the resume providers.
// Replace `{resume_text}`, `{schema}` and `{missing_fields}` before sending.

/// OpenAI-compatible chat prompt. Asks for the flat record shape.
pub const OPENAI_PARSE_PROMPT_TEMPLATE: &str = r#"You are an expert resume analyzer. Carefully read the resume below section by section (Education, Experience, Projects, Skills, Certifications) and include every entry, even when a section has several.

Return a JSON object with this schema:
{schema}

{missing_fields}

Resume text:
{resume_text}"#;

/// Gemini prompt. Same flat shape as OpenAI.
pub const GEMINI_PARSE_PROMPT_TEMPLATE: &str = r#"Extract the following information from this resume and return it as a JSON object:

{schema}

Resume text:
{resume_text}

{missing_fields}"#;

/// HuggingFace text-generation models do not follow JSON instructions, so the
/// prompt asks for plain text and the adapter mines the answer locally.
pub const HUGGINGFACE_PARSE_PROMPT_TEMPLATE: &str = r#"Extract key information from this resume:

Resume: {resume_text}

Please extract:
- Name
- Email
- Phone
- Skills
- Education
- Experience

Format as simple text."#;

/// Local models get a richer nested shape; `normalize` flattens it.
pub const OLLAMA_PARSE_PROMPT_TEMPLATE: &str = r#"You are an expert resume parser. Extract the following information from this resume and return ONLY a valid JSON object:

{
    "personal_info": {
        "name": "Full name",
        "email": "email@example.com",
        "phone": "phone number",
        "location": "city, state/country",
        "linkedin": "LinkedIn URL if mentioned",
        "github": "GitHub URL if mentioned"
    },
    "summary": "Professional summary in 2-3 sentences",
    "experience": [
        {
            "company": "Company name",
            "position": "Job title",
            "duration": "Start - End dates",
            "responsibilities": ["Key responsibility 1", "Key responsibility 2"],
            "achievements": ["Achievement 1", "Achievement 2"]
        }
    ],
    "education": [
        {
            "institution": "School/University name",
            "degree": "Degree type and field",
            "year": "Graduation year",
            "gpa": "GPA if mentioned"
        }
    ],
    "skills": {
        "technical": ["Technical skill 1", "Technical skill 2"],
        "soft": ["Soft skill 1", "Soft skill 2"],
        "languages": ["Programming language 1", "Programming language 2"],
        "tools": ["Tool 1", "Tool 2"]
    },
    "projects": [
        {
            "name": "Project name",
            "description": "Brief description",
            "technologies": ["Tech 1", "Tech 2"],
            "url": "Project URL if mentioned"
        }
    ],
    "certifications": ["Certification 1", "Certification 2"]
}

Resume text:
{resume_text}

Return only the JSON object, no additional text or formatting:"#;
