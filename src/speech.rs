//! Text-to-speech playback seam.
//!
//! Controllers only ever say "speak this, in this locale" or "stop". The
//! [`SystemSpeech`] adapter drives an installed command-line synthesizer;
//! shells with their own engine implement [`SpeechEngine`] directly.

use crate::error::{ClientError, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Text plus the BCP 47 locale it should be spoken in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub locale: &'static str,
}

/// A speech synthesizer with at most one utterance in flight.
pub trait SpeechEngine: Send + Sync {
    /// Start speaking. Does not wait for playback to finish.
    fn speak(&self, utterance: Utterance) -> Result<()>;
    /// Stop any in-flight utterance. No-op when idle.
    fn cancel(&self);
}

/// Engine that says nothing.
#[derive(Debug, Default)]
pub struct NullSpeech;

impl SpeechEngine for NullSpeech {
    fn speak(&self, _utterance: Utterance) -> Result<()> {
        Ok(())
    }

    fn cancel(&self) {}
}

/// Synthesizer programs we know how to drive, in lookup order.
const KNOWN_PROGRAMS: [&str; 3] = ["espeak-ng", "espeak", "say"];

/// Speaks by spawning a system synthesizer (`espeak-ng`, `espeak`, `say`).
#[derive(Debug)]
pub struct SystemSpeech {
    program: PathBuf,
    current: Mutex<Option<CancellationToken>>,
}

impl SystemSpeech {
    /// Locate a synthesizer. `preferred` is looked up on `PATH` when given,
    /// otherwise the known programs are tried in order.
    #[must_use]
    pub fn detect(preferred: Option<&str>) -> Option<Self> {
        let candidates: Vec<&str> = match preferred {
            Some(program) => vec![program],
            None => KNOWN_PROGRAMS.to_vec(),
        };
        candidates.into_iter().find_map(|name| {
            let program = which::which(name).ok()?;
            tracing::info!(program = %program.display(), "using system speech synthesizer");
            Some(Self {
                program,
                current: Mutex::new(None),
            })
        })
    }

    fn is_say(&self) -> bool {
        self.program
            .file_name()
            .is_some_and(|name| name == "say")
    }

    fn args(&self, utterance: &Utterance) -> Vec<String> {
        if self.is_say() {
            match say_voice(utterance.locale) {
                Some(voice) => vec!["-v".to_owned(), voice.to_owned(), utterance.text.clone()],
                // Unknown locale: `say` falls back to the system voice.
                None => vec![utterance.text.clone()],
            }
        } else {
            let voice = utterance
                .locale
                .split('-')
                .next()
                .unwrap_or("en")
                .to_owned();
            vec!["-v".to_owned(), voice, "--".to_owned(), utterance.text.clone()]
        }
    }
}

/// Stock macOS voice for a UI locale.
fn say_voice(locale: &str) -> Option<&'static str> {
    match locale {
        "en-US" => Some("Samantha"),
        "ar-SA" => Some("Maged"),
        "fr-FR" => Some("Thomas"),
        _ => None,
    }
}

impl SpeechEngine for SystemSpeech {
    fn speak(&self, utterance: Utterance) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ClientError::Speech(format!("no async runtime for playback: {e}")))?;

        self.cancel();
        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(self.args(&utterance))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);
        let mut child = command.spawn()?;
        let locale = utterance.locale;

        handle.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    if let Err(e) = child.kill().await {
                        tracing::debug!(error = %e, "speech process already exited");
                    }
                }
                status = child.wait() => match status {
                    Ok(status) if !status.success() => {
                        tracing::warn!(%status, locale, "speech synthesizer exited with failure");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "failed waiting on speech synthesizer"),
                },
            }
        });
        Ok(())
    }

    fn cancel(&self) {
        if let Some(token) = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            token.cancel();
        }
    }
}
