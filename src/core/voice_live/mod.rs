//! Azure Voice Live speech helpers: synthesis, voice listing and SSML.

pub mod client;
pub mod ssml;

pub use client::{SynthesisOptions, VoiceLiveClient, VoiceLiveError, VoiceLiveResult};
pub use ssml::{EmphasisLevel, SsmlOptions, emphasis, escape_xml, generate_ssml, pause, phoneme};
