// Shared prompt fragments.
// Each module that calls a model keeps its own prompts.rs alongside it;
// this file holds the pieces several of them embed.

/// System instruction for providers that accept one.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise resume data extractor. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// The flat record shape requested from remote providers.
pub const RESUME_JSON_SCHEMA: &str = r#"{
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "phone number",
    "summary": "Professional summary in 2-3 sentences",
    "education": [
        {"degree": "Degree Name", "institution": "University/College", "year": "Graduation Year", "gpa": "GPA if mentioned"}
    ],
    "experience": [
        {"company": "Company Name", "role": "Job Title", "duration": "Start - End Date", "description": "Key responsibilities"}
    ],
    "skills": ["skill1", "skill2", "skill3"],
    "projects": [
        {"name": "Project Name", "description": "Project Description", "technologies": ["Tech 1", "Tech 2"]}
    ],
    "certifications": ["certification1", "certification2"]
}"#;

/// Appended to every extraction prompt.
pub const MISSING_FIELDS_INSTRUCTION: &str =
    "Only use information explicitly present in the resume. \
    If information is not found, use null or an empty array. Return only valid JSON.";
