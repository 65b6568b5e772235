// prompts.rs

pub fn suggestion_prompt(about_me: &str, context: &str) -> String {
    format!(
        "About the user:
{}

Context from a news article:
{}

Generate a tailored answer to the user's question using the context and the user's information.
First reason step by step about how the context applies to the user's situation, then on the
final line give a justified answer to the user's question within 100 tokens.

Do not tell me what you're doing, do not explain that you're reasoning step by step, and do not
restate the question.",
        about_me, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_both_inputs() {
        let prompt = suggestion_prompt("I am 30 and hold TSLA. Should I sell?", "Tesla beat earnings.");

        assert!(prompt.contains("I am 30 and hold TSLA. Should I sell?"));
        assert!(prompt.contains("Tesla beat earnings."));
        assert!(prompt.contains("100 tokens"));
    }
}
