// Task instruction templates for the crew.
// Placeholders are filled with `str::replace` by the builders in tasks.rs.

/// Job analysis instruction. Replace: {company_name}, {job_url}, {job_text}
pub const JOB_ANALYSIS_TEMPLATE: &str = r#"Analyze the job posting at {job_url} for {company_name} and extract:

1. Job title and level
2. Required skills (technical and soft skills)
3. Required qualifications and experience
4. Preferred qualifications
5. Key responsibilities
6. Company culture indicators
7. Salary range (if mentioned)
8. Benefits and perks

Provide a comprehensive analysis that can be used for resume optimization.

JOB POSTING TEXT:
{job_text}"#;

pub const JOB_ANALYSIS_EXPECTED_OUTPUT: &str = r#"A detailed JSON analysis containing:
- job_title: string
- required_skills: list of strings
- preferred_skills: list of strings
- required_experience: string
- key_responsibilities: list of strings
- company_culture: string
- salary_range: string (if available)
- benefits: list of strings"#;

/// Resume optimization instruction. Replace: {company_name}, {resume_source}, {resume_text}
pub const RESUME_OPTIMIZATION_TEMPLATE: &str = r#"Based on the job analysis for {company_name}, analyze the candidate's resume from {resume_source} and:

1. Calculate a match score (0-100) for:
   - Technical skills match
   - Experience relevance
   - Education requirements
   - Overall fit

2. Identify gaps between resume and job requirements

3. Provide specific optimization suggestions:
   - Keywords to add
   - Experience descriptions to improve
   - Skills to highlight
   - Format improvements for ATS

4. Suggest specific action items to improve the resume

Use the job analysis results provided below.

RESUME TEXT:
{resume_text}"#;

pub const RESUME_OPTIMIZATION_EXPECTED_OUTPUT: &str = r#"A comprehensive optimization report in JSON containing:
- match_scores: object with technical_skills, experience_relevance, education_requirements, overall_fit (numbers 0-100)
- skill_gaps: list of missing skills
- optimization_suggestions: list of specific improvements
- action_items: prioritized list of changes to make
- ats_optimization: list of specific ATS improvements"#;

/// Company research instruction. Replace: {company_name}
pub const COMPANY_RESEARCH_TEMPLATE: &str = r#"Research {company_name} and provide comprehensive insights for interview preparation:

1. Company overview and mission
2. Company culture and values
3. Recent news and developments
4. Interview process and tips
5. Common interview questions
6. Company challenges and opportunities
7. Industry position and competitors
8. Growth and career opportunities

Focus on information that would be useful for interview preparation."#;

pub const COMPANY_RESEARCH_EXPECTED_OUTPUT: &str = r#"A detailed company research report in JSON containing:
- company_overview: string
- culture_values: list of strings
- recent_news: list of strings
- interview_tips: list of strings
- common_questions: list of strings
- challenges_opportunities: list of strings
- industry_position: string
- career_growth: string"#;
