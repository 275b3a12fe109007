//! Conversation glue.
//!
//! The language model is prompted to open every reply with an emotion tag,
//! `[happy] Hi there!`, and may switch mid-reply:
//! `[surprised] Oh! [curious] What is that?`. This module splits replies
//! into tagged segments, feeds the chosen emotions back into the engine and
//! renders the engine's state into the next prompt.

use kibo_core::expression::VoiceModulation;
use kibo_core::{EmotionDimension, EmotionEngine, ValidationError};
use tracing::{debug, warn};

use crate::config::ConversationConfig;

/// A run of reply text spoken under one emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The tag that opened this run; `None` for text before the first tag.
    pub emotion: Option<EmotionDimension>,
    /// The text, trimmed, with whitespace runs collapsed.
    pub text: String,
}

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LlmReply {
    segments: Vec<Segment>,
}

impl LlmReply {
    /// Split `reply` on `[emotion]` tags.
    ///
    /// Bracketed runs of letters are tags; anything else in brackets is
    /// kept as text. A bracketed word that names no emotion (a stage
    /// direction such as `[laughs]`, or an off-list mood) is dropped from
    /// the spoken text and leaves the current segment open.
    #[must_use]
    pub fn parse(reply: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = Segment {
            emotion: None,
            text: String::new(),
        };
        let mut rest = reply;

        while let Some(open) = rest.find('[') {
            let (before, from_open) = rest.split_at(open);
            current.text.push_str(before);

            let tag = from_open[1..]
                .find(']')
                .map(|close| &from_open[1..=close])
                .filter(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphabetic()));

            match tag {
                Some(label) => {
                    match label.parse::<EmotionDimension>() {
                        Ok(emotion) => {
                            let next = Segment {
                                emotion: Some(emotion),
                                text: String::new(),
                            };
                            push_segment(&mut segments, std::mem::replace(&mut current, next));
                        }
                        Err(_) => warn!(tag = label, "Ignoring unknown reply tag"),
                    }
                    rest = &from_open[label.len() + 2..];
                }
                None => {
                    current.text.push('[');
                    rest = &from_open[1..];
                }
            }
        }
        current.text.push_str(rest);
        push_segment(&mut segments, current);

        Self { segments }
    }

    /// Tagged and untagged runs, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The emotions the reply was tagged with, in order.
    #[must_use]
    pub fn emotions(&self) -> Vec<EmotionDimension> {
        self.segments.iter().filter_map(|s| s.emotion).collect()
    }

    /// The reply with tags removed, ready for speech.
    #[must_use]
    pub fn spoken_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Keep tagged segments even if empty (the emotion still counts); drop empty
/// untagged ones. Whitespace runs collapse to one space.
fn push_segment(segments: &mut Vec<Segment>, mut segment: Segment) {
    segment.text = segment.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if segment.emotion.is_some() || !segment.text.is_empty() {
        segments.push(segment);
    }
}

/// Feed a parsed reply back into the engine.
///
/// Every reply counts as a voice interaction. A single tag then sets that
/// emotion outright at `tag_intensity`; several tags are applied as a
/// sequence so the last one ends strongest.
///
/// # Errors
/// Returns the engine's [`ValidationError`] if the configured intensity is
/// out of range.
pub fn apply_reply(
    engine: &EmotionEngine,
    reply: &LlmReply,
    config: &ConversationConfig,
) -> Result<(), ValidationError> {
    engine.on_voice_interaction();
    let emotions = reply.emotions();
    match emotions.as_slice() {
        [] => {}
        [single] => engine.on_llm_emotion(*single, config.tag_intensity)?,
        many => engine.on_emotion_sequence(many)?,
    }
    debug!(?emotions, reading = %engine.get_emotion(), "Reply applied");
    Ok(())
}

/// One-line summary of the engine state for the model's context.
#[must_use]
pub fn prompt_context(engine: &EmotionEngine) -> String {
    let snapshot = engine.snapshot();
    format!(
        "Current emotion: {}. Energy: {:.2}",
        snapshot.label, snapshot.energy
    )
}

/// Fill `{emotion}` and `{energy}` in a personality prompt template.
#[must_use]
pub fn render_prompt(template: &str, engine: &EmotionEngine) -> String {
    let snapshot = engine.snapshot();
    template
        .replace("{emotion}", snapshot.label.as_str())
        .replace("{energy}", &format!("{:.2}", snapshot.energy))
}

/// Voice modulation for the current dominant emotion, scaled by its intensity.
#[must_use]
pub fn current_voice(engine: &EmotionEngine) -> VoiceModulation {
    let reading = engine.get_emotion();
    VoiceModulation::for_emotion(reading.label).scaled(reading.intensity)
}
