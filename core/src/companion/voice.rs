//! Piggy's voice: text-to-speech over ElevenLabs, cancellable playback,
//! and the speech-to-text capability check.

use super::CompanionError;
use crate::config::CompanionConfig;
use serde_json::json;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

const SERVICE: &str = "elevenlabs";

pub const VOICE_INPUT_UNSUPPORTED: &str =
    "Voice input isn't available here. Try typing your question to Piggy instead!";

/// Strip markdown markers and `:emoji_codes:` so they are not read aloud.
pub fn clean_for_speech(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '~' | '`'))
        .collect();

    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(stripped.len());
    let mut rest = stripped.as_str();
    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let word_len = after.find(|c: char| !is_word(c)).unwrap_or(after.len());
        if word_len > 0 && after[word_len..].starts_with(':') {
            rest = &after[word_len + 1..];
        } else {
            out.push(':');
            rest = after;
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

// ── Synthesis ──────────────────────────────────────────────────

pub trait SpeechSynthesizer {
    /// Encoded audio for `text`.
    fn synthesize(&self, text: &str)
        -> impl Future<Output = Result<Vec<u8>, CompanionError>> + Send;
}

pub struct ElevenLabsClient {
    http:   reqwest::Client,
    config: CompanionConfig,
}

impl ElevenLabsClient {
    pub fn new(config: CompanionConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    fn key(&self) -> Result<&str, CompanionError> {
        self.config
            .elevenlabs_api_key
            .as_deref()
            .ok_or(CompanionError::MissingApiKey { service: SERVICE })
    }

    fn base(&self) -> &str {
        self.config.elevenlabs_base_url.trim_end_matches('/')
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        json!({
            "text": text,
            "model_id": self.config.tts_model,
            "voice_settings": {
                "stability":         0.5,
                "similarity_boost":  0.75,
                "style":             0.3,
                "use_speaker_boost": true,
            },
        })
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CompanionError> {
        let key = self.key()?;
        let response = self
            .http
            .post(format!("{}/text-to-speech/{}", self.base(), self.config.voice_id))
            .header("xi-api-key", key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&self.request_body(&clean_for_speech(text)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompanionError::Status { service: SERVICE, status: status.as_u16(), body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// ── Playback ───────────────────────────────────────────────────

/// Where synthesized audio goes. Resolves when the clip has finished.
pub trait AudioSink: Send + 'static {
    fn play(&mut self, audio: Vec<u8>)
        -> impl Future<Output = Result<(), CompanionError>> + Send;
}

/// Discards audio. Used when no output device is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    async fn play(&mut self, audio: Vec<u8>) -> Result<(), CompanionError> {
        log::debug!("discarding {} bytes of audio", audio.len());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Finished,
    Stopped,
    Failed(String),
}

/// One spoken reply in flight. Dropping it stops playback.
pub struct Playback {
    task: JoinHandle<()>,
    stop: Option<oneshot::Sender<()>>,
    done: oneshot::Receiver<VoiceOutcome>,
}

impl Playback {
    pub fn start<S, A>(synth: Arc<S>, mut sink: A, text: String) -> Self
    where
        S: SpeechSynthesizer + Send + Sync + 'static,
        A: AudioSink,
    {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let speak = async {
                let audio = synth.synthesize(&text).await?;
                sink.play(audio).await
            };
            let outcome = tokio::select! {
                _ = stop_rx => VoiceOutcome::Stopped,
                result = speak => match result {
                    Ok(()) => VoiceOutcome::Finished,
                    Err(err) => {
                        log::warn!("voice playback failed: {err}");
                        VoiceOutcome::Failed(err.to_string())
                    }
                },
            };
            let _ = done_tx.send(outcome);
        });

        Self { task, stop: Some(stop_tx), done: done_rx }
    }

    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for playback to end one way or another.
    pub async fn wait(self) -> VoiceOutcome {
        let Self { task: _task, stop: _stop, done } = self;
        done.await.unwrap_or(VoiceOutcome::Stopped)
    }
}

/// At most one clip plays at a time; speaking again stops the previous one.
pub struct Voice<S, A> {
    synth:   Arc<S>,
    sink:    A,
    current: Option<Playback>,
}

impl<S, A> Voice<S, A>
where
    S: SpeechSynthesizer + Send + Sync + 'static,
    A: AudioSink + Clone,
{
    pub fn new(synth: S, sink: A) -> Self {
        Self { synth: Arc::new(synth), sink, current: None }
    }

    /// Start speaking `text`. Returns false if nothing speakable remains.
    pub fn speak(&mut self, text: &str) -> bool {
        self.stop();
        if clean_for_speech(text).is_empty() {
            return false;
        }
        self.current = Some(Playback::start(
            Arc::clone(&self.synth),
            self.sink.clone(),
            text.to_string(),
        ));
        true
    }

    pub fn stop(&mut self) {
        if let Some(mut playback) = self.current.take() {
            playback.stop();
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.current.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Hand over the clip in flight, e.g. to await its outcome.
    pub fn take_playback(&mut self) -> Option<Playback> {
        self.current.take()
    }
}

// ── Speech-to-text ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Supported,
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Partial(String),
    Final(String),
}

pub trait SpeechRecognizer {
    fn capability(&self) -> Capability;

    /// Begin capturing. Only called when `capability` is Supported.
    fn listen(&mut self) -> Result<mpsc::Receiver<Transcript>, CompanionError>;
}

/// The recognizer for hosts without speech input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl SpeechRecognizer for NoRecognizer {
    fn capability(&self) -> Capability {
        Capability::Unsupported(VOICE_INPUT_UNSUPPORTED.to_string())
    }

    fn listen(&mut self) -> Result<mpsc::Receiver<Transcript>, CompanionError> {
        Err(CompanionError::Unsupported(VOICE_INPUT_UNSUPPORTED.to_string()))
    }
}

pub struct Listener<R> {
    recognizer: R,
}

impl<R: SpeechRecognizer> Listener<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    pub fn capability(&self) -> Capability {
        self.recognizer.capability()
    }

    pub fn start(&mut self) -> Result<mpsc::Receiver<Transcript>, CompanionError> {
        match self.recognizer.capability() {
            Capability::Supported => self.recognizer.listen(),
            Capability::Unsupported(reason) => Err(CompanionError::Unsupported(reason)),
        }
    }
}

/// Drain transcripts until the recognizer settles on a final one.
pub async fn final_transcript(mut rx: mpsc::Receiver<Transcript>) -> Option<String> {
    while let Some(transcript) = rx.recv().await {
        if let Transcript::Final(text) = transcript {
            return Some(text);
        }
    }
    None
}
