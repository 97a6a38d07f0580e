// Résumé scoring: one model round trip per request, for a builder draft,
// a stored résumé, or an uploaded PDF/DOCX file.

pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod report;
pub mod scorer;
