//! Player controls
//!
//! User actions against the active account. Each action is checked against
//! the current disallows first; a disallowed action fails locally without
//! touching the network. Everything else goes through the shared client, so
//! refresh-and-retry, toasts and suppression apply unchanged.

use spotify_modal_client::{Disallows, PlayerAction, RepeatMode};
use tracing::debug;

use crate::config::ControlsConfig;
use crate::context::SyncContext;
use crate::error::{ControlError, ControlResult};
use crate::store::PlaybackState;

/// Next repeat mode for the repeat button, honoring which repeat toggles
/// the remote currently allows.
///
/// Returns `None` when neither repeat toggle is allowed.
pub fn next_repeat_mode(current: RepeatMode, disallows: &Disallows) -> Option<RepeatMode> {
    use RepeatMode::{Context, Off, Track};

    let next = match (
        disallows.toggling_repeat_context,
        disallows.toggling_repeat_track,
    ) {
        (true, true) => return None,
        (true, false) => match current {
            Off => Track,
            Context | Track => Off,
        },
        (false, true) => match current {
            Off => Context,
            Context | Track => Off,
        },
        (false, false) => match current {
            Off => Context,
            Context => Track,
            Track => Off,
        },
    };

    Some(next)
}

/// What "previous" does at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousAction {
    /// Seek back to the start of the current track
    Restart,
    /// Skip to the previous track
    Skip,
}

/// Decide what "previous" does at `progress_ms` into the current track
pub fn previous_action(
    config: &ControlsConfig,
    state: &PlaybackState,
    progress_ms: u64,
) -> PreviousAction {
    let past_threshold =
        progress_ms as f64 >= config.skip_previous_reset_threshold * state.duration_ms as f64;

    if config.skip_previous_resets_progress
        && past_threshold
        && !state.is_disallowed(PlayerAction::Seeking)
    {
        PreviousAction::Restart
    } else {
        PreviousAction::Skip
    }
}

/// Player actions targeting whichever account is active at call time
#[derive(Debug, Clone)]
pub struct PlayerControls {
    ctx: SyncContext,
    config: ControlsConfig,
}

impl PlayerControls {
    pub fn new(ctx: SyncContext, config: ControlsConfig) -> Self {
        Self { ctx, config }
    }

    /// Active account id, empty when none (the client then reports
    /// `NoAccount`)
    fn account(&self) -> String {
        self.ctx.registry().get_active().unwrap_or_default()
    }

    fn ensure_allowed(state: &PlaybackState, action: PlayerAction) -> ControlResult<()> {
        if state.is_disallowed(action) {
            debug!(%action, "action disallowed, not sending");
            return Err(ControlError::Disallowed(action));
        }
        Ok(())
    }

    pub async fn set_playing(&self, playing: bool) -> ControlResult<()> {
        let action = if playing {
            PlayerAction::Resuming
        } else {
            PlayerAction::Pausing
        };
        Self::ensure_allowed(&self.ctx.store().get_state(), action)?;

        Ok(self.ctx.client().set_playing(&self.account(), playing).await?)
    }

    pub async fn toggle_playing(&self) -> ControlResult<()> {
        let playing = self.ctx.store().get_state().is_playing;
        self.set_playing(!playing).await
    }

    pub async fn set_repeat(&self, mode: RepeatMode) -> ControlResult<()> {
        let state = self.ctx.store().get_state();
        match mode {
            RepeatMode::Context => {
                Self::ensure_allowed(&state, PlayerAction::TogglingRepeatContext)?
            }
            RepeatMode::Track => {
                Self::ensure_allowed(&state, PlayerAction::TogglingRepeatTrack)?
            }
            RepeatMode::Off => {
                if next_repeat_mode(state.repeat_mode, &state.disallows).is_none() {
                    return Err(ControlError::Disallowed(PlayerAction::TogglingRepeatContext));
                }
            }
        }

        Ok(self.ctx.client().set_repeat(&self.account(), mode).await?)
    }

    /// Advance the repeat mode one step; returns the mode requested
    pub async fn cycle_repeat(&self) -> ControlResult<RepeatMode> {
        let state = self.ctx.store().get_state();
        let next = next_repeat_mode(state.repeat_mode, &state.disallows)
            .ok_or(ControlError::Disallowed(PlayerAction::TogglingRepeatContext))?;

        self.ctx.client().set_repeat(&self.account(), next).await?;
        Ok(next)
    }

    pub async fn set_shuffle(&self, shuffle: bool) -> ControlResult<()> {
        Self::ensure_allowed(&self.ctx.store().get_state(), PlayerAction::TogglingShuffle)?;

        Ok(self.ctx.client().set_shuffle(&self.account(), shuffle).await?)
    }

    pub async fn toggle_shuffle(&self) -> ControlResult<()> {
        let shuffle = self.ctx.store().get_state().shuffle;
        self.set_shuffle(!shuffle).await
    }

    pub async fn seek(&self, position_ms: u64) -> ControlResult<()> {
        Self::ensure_allowed(&self.ctx.store().get_state(), PlayerAction::Seeking)?;

        Ok(self.ctx.client().seek(&self.account(), position_ms).await?)
    }

    /// Set the volume; `percent` is rounded and clamped to 0..=100
    pub async fn set_volume(&self, percent: f64) -> ControlResult<()> {
        let percent = if percent.is_nan() {
            0
        } else {
            percent.round().clamp(0.0, 100.0) as u8
        };

        Ok(self.ctx.client().set_volume(&self.account(), percent).await?)
    }

    pub async fn skip_next(&self) -> ControlResult<()> {
        Self::ensure_allowed(&self.ctx.store().get_state(), PlayerAction::SkippingNext)?;

        Ok(self.ctx.client().skip(&self.account(), true).await?)
    }

    /// "Previous" at `progress_ms`: restarts the track when far enough in,
    /// otherwise skips back
    pub async fn skip_previous(&self, progress_ms: u64) -> ControlResult<PreviousAction> {
        let state = self.ctx.store().get_state();

        match previous_action(&self.config, &state, progress_ms) {
            PreviousAction::Restart => {
                self.ctx.client().seek(&self.account(), 0).await?;
                Ok(PreviousAction::Restart)
            }
            PreviousAction::Skip => {
                Self::ensure_allowed(&state, PlayerAction::SkippingPrev)?;
                self.ctx.client().skip(&self.account(), false).await?;
                Ok(PreviousAction::Skip)
            }
        }
    }
}
