//! Deterministic plain-text rendering of a résumé, used as model input.
//!
//! Section order is fixed: header, summary, work experience, education,
//! skills. Empty sections still print their heading so the model sees the gap.

use crate::models::cv::{CvContent, Education, WorkExperience};

const NONE: &str = "(none)";

/// "start - end", "start - Present", or whatever part is known.
pub fn period(start: &str, end: Option<&str>, is_current: bool, present: &str) -> String {
    let end = if is_current { Some(present) } else { end };
    match (start.is_empty(), end) {
        (false, Some(end)) => format!("{start} - {end}"),
        (false, None) => start.to_string(),
        (true, Some(end)) => end.to_string(),
        (true, None) => String::new(),
    }
}

/// Contact fields that are filled in, in a fixed order.
pub fn contact_parts(cv: &CvContent) -> Vec<&str> {
    [&cv.email, &cv.phone, &cv.address, &cv.linkedin, &cv.website]
        .into_iter()
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn render_plain_text(cv: &CvContent) -> String {
    let mut out = String::new();

    let name = cv.full_name();
    out.push_str(&format!("NAME: {}\n", if name.is_empty() { NONE } else { name.as_str() }));
    if !cv.job_title.is_empty() {
        out.push_str(&format!("TITLE: {}\n", cv.job_title));
    }
    let contact = contact_parts(cv);
    if !contact.is_empty() {
        out.push_str(&format!("CONTACT: {}\n", contact.join(" | ")));
    }

    out.push_str("\nSUMMARY\n");
    if cv.summary.is_empty() {
        out.push_str(NONE);
        out.push('\n');
    } else {
        out.push_str(&cv.summary);
        out.push('\n');
    }

    out.push_str("\nWORK EXPERIENCE\n");
    if cv.work_experiences.is_empty() {
        out.push_str(NONE);
        out.push('\n');
    }
    for exp in &cv.work_experiences {
        render_experience(&mut out, exp);
    }

    out.push_str("\nEDUCATION\n");
    if cv.educations.is_empty() {
        out.push_str(NONE);
        out.push('\n');
    }
    for edu in &cv.educations {
        render_education(&mut out, edu);
    }

    out.push_str("\nSKILLS\n");
    if cv.skills.is_empty() {
        out.push_str(NONE);
    } else {
        out.push_str(&cv.skills.join(", "));
    }
    out.push('\n');

    out
}

fn render_experience(out: &mut String, exp: &WorkExperience) {
    let mut line = format!("- {}", exp.job_title);
    if !exp.company.is_empty() {
        line.push_str(&format!(" at {}", exp.company));
    }
    if !exp.location.is_empty() {
        line.push_str(&format!(", {}", exp.location));
    }
    let dates = period(&exp.start_date, exp.end_date.as_deref(), exp.is_current, "Present");
    if !dates.is_empty() {
        line.push_str(&format!(" ({dates})"));
    }
    out.push_str(&line);
    out.push('\n');
    if !exp.description.is_empty() {
        out.push_str(&format!("  {}\n", exp.description));
    }
    for achievement in &exp.achievements {
        out.push_str(&format!("  * {achievement}\n"));
    }
}

fn render_education(out: &mut String, edu: &Education) {
    let mut line = format!("- {}", edu.degree);
    if !edu.institution.is_empty() {
        line.push_str(&format!(", {}", edu.institution));
    }
    if !edu.location.is_empty() {
        line.push_str(&format!(", {}", edu.location));
    }
    let dates = period(&edu.start_date, edu.end_date.as_deref(), edu.is_current, "Present");
    if !dates.is_empty() {
        line.push_str(&format!(" ({dates})"));
    }
    if let Some(gpa) = &edu.gpa {
        line.push_str(&format!(" GPA: {gpa}"));
    }
    out.push_str(&line);
    out.push('\n');
}
