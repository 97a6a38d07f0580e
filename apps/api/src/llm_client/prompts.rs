// Shared prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

use crate::models::cv::Language;

/// Instruction telling the model which language free text must be written in.
pub fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Id => "Write every free-text value in Bahasa Indonesia.",
        Language::En => "Write every free-text value in English.",
    }
}

/// Fills `{name}` placeholders in a prompt template in one left-to-right pass.
///
/// Substituted values are never rescanned, so user text that happens to
/// contain `{name}` stays as written. Braces that do not enclose a known
/// key (JSON examples in the template) are copied through.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });
        match known {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_all_placeholders() {
        let out = fill("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill(
            "{language_instruction}\n\nCV:\n{cv_text}",
            &[
                ("cv_text", "Ana Putri {language_instruction}"),
                ("language_instruction", "Write in English."),
            ],
        );
        assert_eq!(out, "Write in English.\n\nCV:\nAna Putri {language_instruction}");
    }

    #[test]
    fn test_fill_keeps_json_braces() {
        let out = fill(r#"Reply {"isCv": false} for {name}"#, &[("name", "Ana")]);
        assert_eq!(out, r#"Reply {"isCv": false} for Ana"#);
    }

    #[test]
    fn test_language_instruction_differs() {
        assert_ne!(
            language_instruction(Language::Id),
            language_instruction(Language::En)
        );
    }
}
