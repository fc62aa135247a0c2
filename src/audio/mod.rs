//! Sound effects, gated until the player first interacts with the window.

pub mod output;

use std::path::PathBuf;

use thiserror::Error;

/// Default loudness applied to every effect.
pub const EFFECT_VOLUME: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    CellHoverEnter,
    CellHoverExit,
    CellPress,
    Reset,
    RoundWon,
}

impl SoundEffect {
    pub const COUNT: usize = 5;

    pub const ALL: [SoundEffect; Self::COUNT] = [
        SoundEffect::CellHoverEnter,
        SoundEffect::CellHoverExit,
        SoundEffect::CellPress,
        SoundEffect::Reset,
        SoundEffect::RoundWon,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::CellHoverEnter => "CellZoomIn.mp3",
            SoundEffect::CellHoverExit => "CellZoomOut.mp3",
            SoundEffect::CellPress => "CellPress.mp3",
            SoundEffect::Reset => "NewRstButton.mp3",
            SoundEffect::RoundWon => "GameWin.mp3",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("audio device configuration error: {0}")]
    Config(String),
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("no sound loaded for {0:?}")]
    MissingAsset(SoundEffect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub asset_dir: PathBuf,
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets/mp3"),
            volume: EFFECT_VOLUME,
        }
    }
}

impl AudioSettings {
    /// Default settings, with the asset directory taken from `TATETI_ASSETS` when set.
    pub fn from_env() -> Self {
        Self::from_asset_dir(std::env::var_os("TATETI_ASSETS").map(PathBuf::from))
    }

    fn from_asset_dir(asset_dir: Option<PathBuf>) -> Self {
        let mut settings = Self::default();
        if let Some(dir) = asset_dir.filter(|d| !d.as_os_str().is_empty()) {
            settings.asset_dir = dir;
        }
        settings
    }

    pub fn asset_path(&self, effect: SoundEffect) -> PathBuf {
        self.asset_dir.join(effect.file_name())
    }
}

/// Something that can actually make noise.
pub trait SoundSink {
    /// Starts `effect` from the beginning, cutting off any earlier play of the same effect.
    fn play(&mut self, effect: SoundEffect) -> Result<(), AudioError>;

    /// Starts and immediately stops `effect`, leaving it rewound.
    fn prime(&mut self, effect: SoundEffect) -> Result<(), AudioError>;
}

impl<S: SoundSink + ?Sized> SoundSink for Box<S> {
    fn play(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        (**self).play(effect)
    }

    fn prime(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        (**self).prime(effect)
    }
}

/// Used when no output device could be opened.
#[derive(Debug, Default)]
pub struct MutedSink;

impl SoundSink for MutedSink {
    fn play(&mut self, _effect: SoundEffect) -> Result<(), AudioError> {
        Ok(())
    }

    fn prime(&mut self, _effect: SoundEffect) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Fire-and-forget front end to a [`SoundSink`].
///
/// Requests made before [`SoundBoard::unlock`] never reach the sink. Playback failures are
/// logged and dropped so they can never interrupt the game.
pub struct SoundBoard<S> {
    sink: S,
    unlocked: bool,
}

impl<S: SoundSink> SoundBoard<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            unlocked: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Enables playback. Returns `false` if it was already enabled.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        for effect in SoundEffect::ALL {
            if let Err(err) = self.sink.prime(effect) {
                tracing::debug!(effect = ?effect, "failed to prime sound: {err}");
            }
        }
        self.unlocked = true;
        tracing::info!("audio enabled");
        true
    }

    pub fn request(&mut self, effect: SoundEffect) {
        if !self.unlocked {
            tracing::debug!(effect = ?effect, "audio not enabled yet; click anywhere to enable sound");
            return;
        }
        if let Err(err) = self.sink.play(effect) {
            tracing::warn!(effect = ?effect, "failed to play sound: {err}");
        }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[test]
    fn test_requests_before_unlock_are_dropped() {
        let mut board = SoundBoard::new(RecordingSink::default());
        board.request(SoundEffect::CellPress);
        board.request(SoundEffect::RoundWon);
        assert!(board.sink().played.is_empty());
        assert!(!board.is_unlocked());
    }

    #[test]
    fn test_requests_after_unlock_reach_sink() {
        let mut board = SoundBoard::new(RecordingSink::default());
        assert!(board.unlock());
        board.request(SoundEffect::CellPress);
        board.request(SoundEffect::CellPress);
        assert_eq!(
            board.sink().played,
            vec![SoundEffect::CellPress, SoundEffect::CellPress]
        );
    }

    #[test]
    fn test_unlock_primes_every_effect_once() {
        let mut board = SoundBoard::new(RecordingSink::default());
        assert!(board.unlock());
        assert!(!board.unlock());
        assert!(!board.unlock());
        assert_eq!(board.sink().primed, SoundEffect::ALL.to_vec());
        assert!(board.sink().played.is_empty());
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut board = SoundBoard::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        assert!(board.unlock());
        board.request(SoundEffect::Reset);
        assert!(board.is_unlocked());
        assert_eq!(board.sink().played, vec![SoundEffect::Reset]);
    }

    #[test]
    fn test_asset_paths() {
        let settings = AudioSettings::default();
        assert_eq!(
            settings.asset_path(SoundEffect::RoundWon),
            PathBuf::from("assets/mp3/GameWin.mp3")
        );
        assert_eq!(settings.volume, EFFECT_VOLUME);
    }

    #[test]
    fn test_asset_dir_override() {
        let settings = AudioSettings::from_asset_dir(Some(PathBuf::from("/srv/sounds")));
        assert_eq!(
            settings.asset_path(SoundEffect::CellHoverEnter),
            PathBuf::from("/srv/sounds/CellZoomIn.mp3")
        );
        assert_eq!(
            AudioSettings::from_asset_dir(Some(PathBuf::new())),
            AudioSettings::default()
        );
    }

    #[test]
    fn test_slots_are_distinct() {
        let mut slots: Vec<usize> = SoundEffect::ALL.iter().map(|e| e.slot()).collect();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    }
}
