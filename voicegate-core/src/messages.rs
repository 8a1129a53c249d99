// User-facing strings. The validation responses are surfaced verbatim to the user,
// so changing any of them changes observable behavior.

pub const PIN_ACCEPTED: &str = "Please choose the language";
pub const PIN_REJECTED: &str = "PIN is incorrect. Try again";
pub const LANGUAGE_ACCEPTED: &str = "Now I will connect to the interpreter";
pub const LANGUAGE_REJECTED: &str = "Please choose another language";

pub const NO_PIN_FOUND: &str =
    "I couldn't find a PIN number in your input. Please say something like 'My PIN is 1234'.";
pub const NO_LANGUAGE_FOUND: &str =
    "I couldn't find a language name in your input. Please say something like 'I choose Spanish'.";

pub const GENERATION_FAILED: &str = "Error processing your input. Please try again.";
pub const CAPTURE_FAILED: &str =
    "Sorry, I could not understand your speech. Please try again or type your input.";
pub const INPUT_IGNORED: &str = "Verification is already complete. Input ignored.";

pub const GREETING: &str = "Please speak your pin code";

pub const STATUS_READY: &str = "Ready to verify";
pub const STATUS_COMPLETE: &str = "Verification complete!";
pub const STATUS_PROCESSING_PIN: &str = "Processing PIN...";
pub const STATUS_PROCESSING_LANGUAGE: &str = "Processing language...";

pub fn echo_user_input(input: &str) -> String {
    format!("You said: \"{input}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_quotes_input() {
        assert_eq!(echo_user_input("My pin is 7979"), "You said: \"My pin is 7979\"");
    }
}
