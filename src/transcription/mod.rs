//! # Transcription Hand-off
//!
//! Turns an inspected audio buffer into the request parameters the external
//! speech-to-text service needs. The service call itself lives outside this
//! crate; this module only decides what to ask for.

pub mod plan;

pub use plan::{plan_recognition, RecognitionAttempt, RecognitionPlan, SpeechEncoding};
