// Prompt assembly shared by every backend.
// Task-specific instruction wording lives in analysis::tasks.

use crate::models::analysis::AnalysisRequest;

/// Concatenates job description, document text and instruction, in that
/// order. A non-default target language appends a `Respond in ...` line.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = format!(
        "Job Description:\n{}\n\nResume:\n{}\n\nTask:\n{}",
        request.job_description(),
        request.document_text(),
        request.instruction().text,
    );

    let language = request.target_language();
    if !language.is_default() {
        prompt.push_str(&format!("\nRespond in {}.", language.display_name()));
    }

    prompt
}
