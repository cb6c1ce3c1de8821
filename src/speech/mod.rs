pub mod queue;
pub mod voice;

pub use queue::{Utterance, UtteranceQueue, UtteranceStatus};
pub use voice::{EspeakVoice, SpeechOutcome, SynthesisVoice};
