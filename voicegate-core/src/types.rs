use serde::{Deserialize, Serialize};

/// Step in the linear verification flow.
///
/// Stages only move forward: `PinVerification -> LanguageVerification -> Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerificationStage {
    #[default]
    PinVerification,
    LanguageVerification,
    Complete,
}

impl VerificationStage {
    /// Stage reached after a successful validation in this stage.
    pub fn next(self) -> Self {
        match self {
            Self::PinVerification => Self::LanguageVerification,
            Self::LanguageVerification | Self::Complete => Self::Complete,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Complete
    }

    /// Stable label for logs and UI; not derived from `Debug`.
    pub fn label(self) -> &'static str {
        match self {
            Self::PinVerification => "pin_verification",
            Self::LanguageVerification => "language_verification",
            Self::Complete => "complete",
        }
    }

    pub fn info(self) -> StageInfo {
        match self {
            Self::PinVerification => StageInfo {
                title: "PIN Verification",
                expected_action: "Speak a 4-digit PIN",
                input_placeholder: "Type your PIN or say it...",
                accepts_input: true,
            },
            Self::LanguageVerification => StageInfo {
                title: "Language Verification",
                expected_action: "Say \"Spanish\"",
                input_placeholder: "Type language name or say it...",
                accepts_input: true,
            },
            Self::Complete => StageInfo {
                title: "Complete",
                expected_action: "Access granted",
                input_placeholder: "Verification complete!",
                accepts_input: false,
            },
        }
    }
}

/// Display hints an I/O shell shows for the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageInfo {
    pub title: &'static str,
    pub expected_action: &'static str,
    pub input_placeholder: &'static str,
    pub accepts_input: bool,
}
