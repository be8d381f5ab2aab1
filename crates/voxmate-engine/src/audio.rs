//! Audio playback via an external player process.
//!
//! The backend returns audio as URLs (often paths relative to the base
//! URL); playback is delegated to a configurable player command. The
//! player is an explicit owned resource: at most one child is active,
//! starting a new one stops the previous one, and the child is killed on
//! drop.

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::debug;

/// Errors starting or controlling the player.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no audio player configured")]
    NoPlayerConfigured,

    #[error("failed to start audio player: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Owns the single active playback process.
pub struct AudioPlayer {
    player_argv: Vec<String>,
    base_url: String,
    active: Option<Child>,
}

impl AudioPlayer {
    /// Create a player that launches `player_argv` with the audio URL
    /// appended, resolving relative URLs against `base_url`.
    pub fn new(player_argv: Vec<String>, base_url: impl Into<String>) -> Self {
        Self {
            player_argv,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            active: None,
        }
    }

    /// Resolve an audio URL: absolute URLs pass through, relative paths
    /// are joined to the backend base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            format!("{}/{url}", self.base_url)
        }
    }

    /// Start playing `url`, stopping any active playback first.
    pub fn play(&mut self, url: &str) -> Result<(), PlayerError> {
        let Some((program, args)) = self.player_argv.split_first() else {
            return Err(PlayerError::NoPlayerConfigured);
        };

        self.stop();

        let resolved = self.resolve_url(url);
        debug!(url = %resolved, player = %program, "Starting audio playback");

        let child = Command::new(program)
            .args(args)
            .arg(&resolved)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(PlayerError::Spawn)?;

        self.active = Some(child);
        Ok(())
    }

    /// Stop the active playback, if any.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.active.take() {
            let _ = child.start_kill();
        }
    }

    /// Whether playback is still running. Reaps a finished child.
    pub fn is_playing(&mut self) -> bool {
        match self.active.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(_)) | Err(_) => {
                    self.active = None;
                    false
                }
                Ok(None) => true,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let player = AudioPlayer::new(vec![], "http://127.0.0.1:8000/");
        assert_eq!(
            player.resolve_url("/audio/1.mp3"),
            "http://127.0.0.1:8000/audio/1.mp3"
        );
        assert_eq!(
            player.resolve_url("audio/2.mp3"),
            "http://127.0.0.1:8000/audio/2.mp3"
        );
        assert_eq!(
            player.resolve_url("https://cdn.example.com/x.mp3"),
            "https://cdn.example.com/x.mp3"
        );
    }

    #[test]
    fn test_play_without_player_is_an_error() {
        let mut player = AudioPlayer::new(vec![], "http://127.0.0.1:8000");
        assert!(matches!(
            player.play("/audio/1.mp3"),
            Err(PlayerError::NoPlayerConfigured)
        ));
    }

    #[tokio::test]
    async fn test_at_most_one_active_playback() {
        // Use a process that exits on its own so the test does not hang.
        let mut player = AudioPlayer::new(vec!["true".to_string()], "http://127.0.0.1:8000");

        player.play("/audio/1.mp3").unwrap();
        player.play("/audio/2.mp3").unwrap();

        // Only one child is tracked; once it exits, playback reports idle.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!player.is_playing());

        player.stop();
        assert!(!player.is_playing());
    }
}
