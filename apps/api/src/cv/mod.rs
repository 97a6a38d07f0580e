// Résumé documents: storage, the builder save workflow, read/delete policy,
// plain-text rendering for scoring, and export to downloadable documents.

pub mod access;
pub mod builder;
pub mod export;
pub mod handlers;
pub mod render_text;
pub mod store;
