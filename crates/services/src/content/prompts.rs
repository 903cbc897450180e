//! Prompts and response schemas sent with each request.

use serde_json::{Value, json};

pub(super) fn study_content_prompt(title: &str, category: &str) -> String {
    format!(
        r#"Topic: "{title}" ({category}).
Provide a study guide with:
1. "notes": Concise technical notes.
2. "hinglishNotes": A conversational breakdown in Hinglish.
3. "lastMinuteNotes": 7-10 "Single Point" high-impact facts.
4. "tips": Specific exam shortcuts.
5. "formulas": Strictly standard academic LaTeX.
   - "latex": Standard textbook LaTeX (e.g., \frac{{n!}}{{(n-r)!}}).
   - "originalScript": The "original written way", a plain text representation that looks like a student's manual note (e.g., nPr = n! / (n-r)!).
   - "explanation": Exactly 1-sentence on what it measures.
   - "variableDefinitions": Define every symbol and index.
6. "solvedQuestion": One high-quality solved GATE-style example.
7. "practiceQuestions": 10 unique problems.
8. "youtubeQuery": Optimal search string."#
    )
}

pub(super) fn formula_prompt(name: &str) -> String {
    format!(
        r#"Mathematical formula for "{name}". Provide both standard LaTeX and a "originalScript" (plain text/handwritten style). Define all variables. 1-sentence explanation."#
    )
}

pub(super) fn practice_prompt(title: &str, category: &str, count: usize) -> String {
    format!(r#"Generate {count} additional unique practice questions for "{title}" ({category})."#)
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

pub(super) fn formula_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": string(),
            "latex": string(),
            "originalScript": string(),
            "explanation": string(),
            "variableDefinitions": string_array(),
        },
        "required": ["name", "latex", "originalScript", "explanation", "variableDefinitions"],
    })
}

fn practice_question_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question": string(),
            "answer": string(),
            "explanation": string(),
            "tips": string(),
        },
        "required": ["question", "answer", "explanation", "tips"],
    })
}

pub(super) fn practice_questions_schema() -> Value {
    json!({ "type": "ARRAY", "items": practice_question_schema() })
}

pub(super) fn study_content_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "notes": string(),
            "hinglishNotes": string(),
            "lastMinuteNotes": string_array(),
            "tips": string_array(),
            "formulas": { "type": "ARRAY", "items": formula_schema() },
            "solvedQuestion": {
                "type": "OBJECT",
                "properties": {
                    "question": string(),
                    "solution": string(),
                },
                "required": ["question", "solution"],
            },
            "practiceQuestions": practice_questions_schema(),
            "youtubeQuery": string(),
        },
        "required": [
            "notes",
            "hinglishNotes",
            "lastMinuteNotes",
            "tips",
            "formulas",
            "solvedQuestion",
            "practiceQuestions",
            "youtubeQuery",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_prompt_names_topic_and_latex_example() {
        let prompt = study_content_prompt("Bayes Theorem", "Phase 1: Probability & Stats");
        assert!(prompt.starts_with("Topic: \"Bayes Theorem\" (Phase 1: Probability & Stats)."));
        assert!(prompt.contains(r"\frac{n!}{(n-r)!}"));
    }

    #[test]
    fn practice_prompt_carries_count() {
        assert!(practice_prompt("Joins", "Phase 6: Databases", 5).contains("Generate 5 additional"));
    }

    #[test]
    fn study_schema_requires_every_field() {
        let schema = study_content_schema();
        assert_eq!(schema["required"].as_array().map(Vec::len), Some(8));
        assert_eq!(schema["properties"]["formulas"]["items"]["type"], "OBJECT");
        assert_eq!(practice_questions_schema()["type"], "ARRAY");
    }
}
