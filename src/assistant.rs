/// Canned help-desk replies, first matching keyword group wins.
pub fn reply(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|word| text.contains(word));

    if has(&["hello", "hi"]) {
        "Hello! I am the EduTrack assistant. How can I help you today?"
    } else if has(&["risk", "predict"]) {
        concat!(
            "To get a risk prediction, go to Predict Risk and submit your details. ",
            "I can help guide you through the form."
        )
    } else if has(&["counsel"]) {
        concat!(
            "If you need counseling, you can schedule a session from the student dashboard ",
            "or contact your counselor."
        )
    } else if has(&["thank"]) {
        "You're welcome, glad I could help!"
    } else {
        "I'm here to help. Please describe your question and I'll do my best to assist."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greets() {
        assert!(reply("Hello there").starts_with("Hello!"));
    }

    #[test]
    fn keyword_order_matters() {
        // "this" contains "hi", so the greeting wins over the risk keyword
        assert!(reply("is this about risk?").starts_with("Hello!"));
        assert!(reply("How do I PREDICT my score").starts_with("To get a risk prediction"));
        assert!(reply("need counseling").starts_with("If you need counseling"));
        assert!(reply("thanks!").starts_with("You're welcome"));
        assert!(reply("what now").starts_with("I'm here to help"));
    }
}
