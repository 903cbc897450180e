use serde::{Deserialize, Serialize};

//
// ─── FORMULAS ──────────────────────────────────────────────────────────────────
//

/// A formula as returned by the content generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub name: String,
    /// Textbook LaTeX, possibly wrapped in math delimiters.
    pub latex: String,
    /// Plain-text rendering as a student would hand-write it (e.g. `nPr = n! / (n-r)!`).
    pub original_script: String,
    pub explanation: String,
    #[serde(default)]
    pub variable_definitions: Vec<String>,
}

const LATEX_OPENERS: [&str; 4] = ["$$", "\\[", "\\(", "`"];
const LATEX_CLOSERS: [&str; 4] = ["$$", "\\]", "\\)", "`"];

impl Formula {
    /// LaTeX with one leading and one trailing math delimiter removed.
    #[must_use]
    pub fn clean_latex(&self) -> &str {
        let mut latex = self.latex.as_str();
        if let Some(rest) = LATEX_OPENERS.iter().find_map(|open| latex.strip_prefix(open)) {
            latex = rest;
        }
        if let Some(rest) = LATEX_CLOSERS.iter().find_map(|close| latex.strip_suffix(close)) {
            latex = rest;
        }
        latex.trim()
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub tips: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedQuestion {
    pub question: String,
    pub solution: String,
}

//
// ─── STUDY CONTENT ─────────────────────────────────────────────────────────────
//

/// Generated study material attached to a single study item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyContent {
    pub notes: String,
    pub hinglish_notes: String,
    pub last_minute_notes: Vec<String>,
    pub tips: Vec<String>,
    pub formulas: Vec<Formula>,
    pub solved_question: SolvedQuestion,
    pub practice_questions: Vec<PracticeQuestion>,
    pub youtube_query: String,
}

impl StudyContent {
    /// Returns a copy with `questions` appended after the existing practice questions.
    #[must_use]
    pub fn with_more_questions(&self, questions: &[PracticeQuestion]) -> Self {
        let mut next = self.clone();
        next.practice_questions.extend_from_slice(questions);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(latex: &str) -> Formula {
        Formula {
            name: "Permutations".into(),
            latex: latex.into(),
            original_script: "nPr = n! / (n-r)!".into(),
            explanation: "Counts ordered arrangements.".into(),
            variable_definitions: vec!["n: items".into(), "r: chosen".into()],
        }
    }

    #[test]
    fn clean_latex_strips_display_delimiters() {
        assert_eq!(formula("$$\\frac{n!}{(n-r)!}$$").clean_latex(), "\\frac{n!}{(n-r)!}");
        assert_eq!(formula("\\[ x^2 \\]").clean_latex(), "x^2");
        assert_eq!(formula("\\(a+b\\)").clean_latex(), "a+b");
        assert_eq!(formula("`E[X]`").clean_latex(), "E[X]");
    }

    #[test]
    fn clean_latex_leaves_plain_latex_alone() {
        assert_eq!(formula("  \\sigma^2 ").clean_latex(), "\\sigma^2");
    }

    #[test]
    fn formula_uses_camel_case_fields() {
        let json = serde_json::to_value(formula("x")).unwrap();
        assert!(json.get("originalScript").is_some());
        assert!(json.get("variableDefinitions").is_some());
    }

    #[test]
    fn formula_tolerates_missing_variable_definitions() {
        let parsed: Formula = serde_json::from_str(
            r#"{"name":"Mean","latex":"\\mu","originalScript":"mu","explanation":"Average."}"#,
        )
        .unwrap();
        assert!(parsed.variable_definitions.is_empty());
    }
}
