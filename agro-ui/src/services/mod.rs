//! Leaf analysis, voice guidance and certificate services

pub mod analyzer;
pub mod certificate;
pub mod voice;

pub use analyzer::{FixedDiagnosisAnalyzer, ImageSource, LeafAnalyzer, LeafImage};
pub use certificate::{Certificate, CertificateGenerator};
pub use voice::{SpeechSynthesizer, VoiceClip, VoiceError, VoiceRenderer};
