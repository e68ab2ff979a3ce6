// src/quiz/prompt.rs

use crate::llm::ChatMessage;

/// Worked example embedded in the preamble. Its shape is the output contract.
pub const EXAMPLE_QUIZ: &str = r#"{
  "questions": [
    {
      "question": "What is the capital of California?",
      "options": ["Sacramento", "Los Angeles", "San Francisco", "San Diego"],
      "answer": "Sacramento"
    },
    {
      "question": "What is the capital of France?",
      "options": ["Berlin", "Paris", "Rome", "Madrid"],
      "answer": "Paris"
    }
  ]
}"#;

/// Fixed instructions sent ahead of every topic.
pub fn preamble() -> String {
    format!(
        "You are a quiz writer. You create questions and answers for multiple-choice quizzes structured in JSON.\n\
         Each question should have four options for answers.\n\
         Exactly one of the four answer options should be correct.\n\
         \n\
         The response should be formatted as JSON with a question, a list of options, and a correct answer.\n\
         The answer must be copied exactly from one of the options.\n\
         Do not include any output after \"Final Answer:\" other than the quiz JSON. \
         Do not generate code, explanations, or markdown code blocks.\n\
         The response must be a single valid JSON object that begins with {{ and ends with }}.\n\
         This is an example response of a quiz with two questions on the topic of 'capitals':\n\
         Final Answer:{}",
        EXAMPLE_QUIZ
    )
}

/// The per-request line appended after the preamble.
pub fn request_line(topic: &str, question_count: usize) -> String {
    format!(
        "Create a quiz with {} questions and the topic {}.",
        count_in_words(question_count),
        topic.trim()
    )
}

/// Builds the full prompt for one generation call.
pub fn build_messages(topic: &str, question_count: usize) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(preamble()),
        ChatMessage::user(request_line(topic, question_count)),
    ]
}

fn count_in_words(n: usize) -> String {
    const WORDS: [&str; 10] = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    match n {
        1..=10 => WORDS[n - 1].to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_request_line_spells_out_count() {
        assert_eq!(
            request_line("  volcanoes ", 5),
            "Create a quiz with five questions and the topic volcanoes."
        );
        assert_eq!(
            request_line("rust", 12),
            "Create a quiz with 12 questions and the topic rust."
        );
    }

    #[test]
    fn test_build_messages_puts_preamble_first() {
        let messages = build_messages("jazz", 5);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("four options"));
        assert!(messages[0].content.contains("Final Answer:{"));
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.ends_with("the topic jazz."));
    }

    #[test]
    fn test_example_quiz_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(EXAMPLE_QUIZ).unwrap();
        assert_eq!(value["questions"].as_array().map(Vec::len), Some(2));
    }
}
