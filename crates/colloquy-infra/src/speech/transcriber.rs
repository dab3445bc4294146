//! Speech-to-text via an external engine binary.
//!
//! The engine consumes a 16kHz mono PCM wav file, so uploaded audio is
//! first converted with ffmpeg. Both ffmpeg and the engine run as
//! subprocesses; the engine invocation is bounded by a wall-clock budget.
//! All working files live inside a [`tempfile::TempDir`], which drop
//! reclaims on every exit path -- success, failure, or timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use colloquy_types::config::SpeechConfig;
use colloquy_types::error::SpeechError;

/// Sample rate the speech engine expects.
const ENGINE_SAMPLE_RATE_HZ: u32 = 16_000;

/// Runs the external speech-to-text engine over uploaded audio.
pub struct SpeechTranscriber {
    binary: PathBuf,
    model_path: PathBuf,
    timeout: Duration,
}

impl SpeechTranscriber {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            model_path: PathBuf::from(&config.model_path),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Whether the engine binary is present. Used by handlers to answer
    /// 503 before accepting work.
    pub fn is_available(&self) -> bool {
        binary_resolves(&self.binary)
    }

    /// Transcribe arbitrary uploaded audio to text.
    ///
    /// Converts to 16kHz mono wav, feeds the engine, and returns trimmed
    /// stdout. The engine run is bounded by the configured timeout.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::NoAudio);
        }
        if !self.is_available() {
            return Err(SpeechError::EngineUnavailable(format!(
                "binary '{}' not found",
                self.binary.display()
            )));
        }

        let workdir = tempfile::tempdir()
            .map_err(|e| SpeechError::Failed(format!("workdir creation failed: {e}")))?;
        let input_path = workdir.path().join("input.audio");
        let wav_path = workdir.path().join("input.wav");

        tokio::fs::write(&input_path, audio)
            .await
            .map_err(|e| SpeechError::Failed(format!("write failed: {e}")))?;

        self.convert_to_wav(&input_path, &wav_path).await?;
        let text = self.run_engine(&wav_path).await?;

        debug!(chars = text.len(), "Transcription complete");
        Ok(text)
    }

    /// Convert uploaded audio to the 16kHz mono PCM wav the engine expects.
    async fn convert_to_wav(&self, input: &Path, output: &Path) -> Result<(), SpeechError> {
        let result = Command::new("ffmpeg")
            .arg("-i")
            .arg(input)
            .args(["-ar", &ENGINE_SAMPLE_RATE_HZ.to_string()])
            .args(["-ac", "1"])
            .args(["-f", "wav"])
            .arg("-y")
            .arg(output)
            .output()
            .await;

        let output_result = match result {
            Ok(output_result) => output_result,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SpeechError::EngineUnavailable(
                    "ffmpeg not found".to_string(),
                ));
            }
            Err(e) => return Err(SpeechError::Conversion(format!("ffmpeg spawn failed: {e}"))),
        };

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            warn!(status = ?output_result.status.code(), "ffmpeg conversion failed");
            return Err(SpeechError::Conversion(format!(
                "ffmpeg exited with {:?}: {}",
                output_result.status.code(),
                last_line(&stderr)
            )));
        }
        Ok(())
    }

    /// Run the engine over the converted wav, bounded by the timeout budget.
    async fn run_engine(&self, wav: &Path) -> Result<String, SpeechError> {
        let mut command = Command::new(&self.binary);
        if !self.model_path.as_os_str().is_empty() {
            command.arg("-m").arg(&self.model_path);
        }
        command
            .arg("-f")
            .arg(wav)
            .args(["--no-timestamps", "--no-prints"])
            .kill_on_drop(true);

        let run = async {
            command
                .output()
                .await
                .map_err(|e| SpeechError::Failed(format!("engine spawn failed: {e}")))
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| SpeechError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Failed(format!(
                "engine exited with {:?}: {}",
                output.status.code(),
                last_line(&stderr)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Whether a configured binary can be invoked: an absolute/relative path
/// must exist, a bare name must resolve through PATH.
fn binary_resolves(binary: &Path) -> bool {
    if binary.components().count() > 1 {
        return binary.exists();
    }
    let Ok(path_var) = std::env::var("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| dir.join(binary).exists())
}

fn last_line(s: &str) -> &str {
    s.lines().last().unwrap_or_default()
}
