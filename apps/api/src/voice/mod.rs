//! Voice Bridge: recorded question → transcript, assistant reply → speech.
//! Both directions are optional and gated by the session's voice-mode flag.

pub mod capture;
pub mod handlers;
pub mod playback;

pub use playback::AudioCache;
