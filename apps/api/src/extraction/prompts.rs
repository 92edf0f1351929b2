// Candidate extraction prompt.
//
// Placeholders: {today} (YYYY-MM-DD) and {resume_text}.

pub const CANDIDATE_EXTRACTION_PROMPT: &str = r#"<task>Extract the applicant's profile from a resume.</task>

<context>
Today's date: {today}
The following text was read from a resume PDF. Its first line is the file path.
{resume_text}
</context>

<instructions>
1. Read the resume and extract the applicant's details.
2. Fields: name, age, phone, email, highest education level, list of universities attended, major, skills, years of work experience, native region, list of expected cities, expected monthly salary, list of previous employers, blog URL, GitHub URL, and the position applied for.
3. Return only the requested fields, nothing else.
4. education is the highest degree only, one of: bachelor, master, doctorate.
5. skills include but are not limited to: java, python, c, llm applications, llm fine-tuning. Write English skill names in lowercase.
6. phone is an 11-digit number, returned as a JSON number, not a string.
7. jobPosition is the position the resume explicitly applies for. If none is stated, infer the most likely one. It must be one of: frontend, backend, operations, embedded, algorithm.
8. Use the current date to derive age and years of experience when only dates are given.
9. Do not wrap the output in markdown.
</instructions>

<output_format>
{"name":"xx","age":1,"phone":13323313233,"email":"11@qq.com","education":"xx","universities":["xx","xx"],"major":"xx","skills":["x1","x2"],"years":1,"native":"xx","expectCities":["xx","xx"],"expectSalary":10000,"companies":["xx","xx"],"blog":"xx","github":"xx","jobPosition":"xx"}
</output_format>"#;

pub fn candidate_extraction_prompt(today: &str, resume_text: &str) -> String {
    CANDIDATE_EXTRACTION_PROMPT
        .replace("{today}", today)
        .replace("{resume_text}", resume_text)
}
