//! Diagnosis result and voice-guidance language tables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Problem, solution and treatment plan shown to the farmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub problem: String,
    pub solution: String,
    pub plan: String,
}

impl DiagnosisResult {
    /// The leaf blight diagnosis returned for every analyzed image
    pub fn leaf_blight() -> Self {
        Self {
            problem: "Leaf Blight Disease".to_string(),
            solution: "Spray neem oil twice a week".to_string(),
            plan: "Continue treatment for 7 days".to_string(),
        }
    }
}

/// Languages offered for voice assistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Telugu,
    Hindi,
}

/// The three sentences spoken for a diagnosis in one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceText {
    pub problem: &'static str,
    pub solution: &'static str,
    pub plan: &'static str,
}

const ENGLISH_TEXT: VoiceText = VoiceText {
    problem: "The disease detected is leaf blight disease.",
    solution: "Spray neem oil twice a week.",
    plan: "Continue the treatment for seven days.",
};

const TELUGU_TEXT: VoiceText = VoiceText {
    problem: "పంటలో లీఫ్ బ్లైట్ వ్యాధి గుర్తించబడింది.",
    solution: "వారానికి రెండుసార్లు నేమ్ ఆయిల్ పిచికారీ చేయండి.",
    plan: "ఏడు రోజుల పాటు చికిత్స కొనసాగించండి.",
};

const HINDI_TEXT: VoiceText = VoiceText {
    problem: "फसल में लीफ ब्लाइट रोग पाया गया है।",
    solution: "सप्ताह में दो बार नीम तेल का छिड़काव करें।",
    plan: "सात दिनों तक उपचार जारी रखें।",
};

impl Language {
    /// All supported languages, in the order they are offered
    pub const ALL: [Language; 3] = [Language::English, Language::Telugu, Language::Hindi];

    /// Label shown in the language picker and submitted by the form
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Telugu => "Telugu",
            Language::Hindi => "Hindi",
        }
    }

    /// Speech-synthesis locale code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
            Language::Hindi => "hi",
        }
    }

    pub fn voice_text(self) -> VoiceText {
        match self {
            Language::English => ENGLISH_TEXT,
            Language::Telugu => TELUGU_TEXT,
            Language::Hindi => HINDI_TEXT,
        }
    }

    /// Problem, solution and plan joined by single spaces
    pub fn voice_message(self) -> String {
        let text = self.voice_text();
        format!("{} {} {}", text.problem, text.solution, text.plan)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.label().eq_ignore_ascii_case(s.trim()) || lang.code() == s.trim())
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unsupported language: {}", s)))
    }
}
