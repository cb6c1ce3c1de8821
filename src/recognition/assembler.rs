use super::stream::TranscriptFragment;

/// Pure reducer over the fragment sequence.
///
/// Final fragments accumulate into `confirmed` in arrival order; each
/// non-final fragment replaces `partial` wholesale, and any final fragment
/// clears it. No I/O, no clocks — the same fragment sequence always yields
/// the same transcript.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAssembler {
    confirmed: String,
    partial: String,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one fragment into the transcript view.
    pub fn apply(&mut self, fragment: &TranscriptFragment) {
        if fragment.is_final {
            self.confirmed.push_str(&fragment.text);
            self.partial.clear();
        } else {
            self.partial.clear();
            self.partial.push_str(&fragment.text);
        }
    }

    /// Everything ever confirmed, in arrival order.
    pub fn confirmed(&self) -> &str {
        &self.confirmed
    }

    /// The latest interim result since the last final fragment.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn snapshot(&self) -> (String, String) {
        (self.confirmed.clone(), self.partial.clone())
    }

    pub fn reset(&mut self) {
        self.confirmed.clear();
        self.partial.clear();
    }
}
