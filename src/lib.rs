//! # Voice Intake Backend
//!
//! Identifies uploaded or recorded audio by its bytes (WAV, OGG or WEBM),
//! extracts WAV playback parameters, and plans the request configurations for
//! an external speech-to-text service.
//!
//! ## Modules:
//! - **audio**: pure container sniffing and WAV header parsing
//! - **transcription**: recognition attempt planning from an inspected buffer
//! - **config**: TOML files + environment variables
//! - **state**: shared configuration and metrics
//! - **health**: health and metrics endpoints
//! - **middleware**: request logging and metrics collection
//! - **handlers**: HTTP request handlers for the API
//! - **error**: application error type and HTTP error responses
//!
//! ## Example
//! ```
//! use voice_intake_backend::audio::{detect_format, parse_wav_header, ContainerFormat};
//!
//! let mut wav = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
//! wav.extend_from_slice(&16u32.to_le_bytes());
//! wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
//! wav.extend_from_slice(&1u16.to_le_bytes()); // mono
//! wav.extend_from_slice(&16000u32.to_le_bytes());
//! wav.extend_from_slice(&32000u32.to_le_bytes());
//! wav.extend_from_slice(&2u16.to_le_bytes());
//! wav.extend_from_slice(&16u16.to_le_bytes());
//! wav.extend_from_slice(b"data");
//! wav.extend_from_slice(&0u32.to_le_bytes());
//!
//! assert_eq!(detect_format(&wav), ContainerFormat::Wav);
//! let info = parse_wav_header(&wav).unwrap();
//! assert_eq!(info.playback_hint().sample_rate_hz, 16000);
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod state;
pub mod transcription;
