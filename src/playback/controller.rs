use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Transport state of the narration player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Whether the media is playing.
    pub is_playing: bool,
    /// Whether output is muted. Independent of `is_playing`.
    pub is_muted: bool,
    /// Last reported position, never past `total_duration`.
    pub current_position: Duration,
    /// Media length, once known.
    pub total_duration: Option<Duration>,
}

impl PlaybackState {
    /// Fraction of the media played, in `[0, 1]`. Zero while the length is unknown or zero.
    pub fn progress(&self) -> f64 {
        match self.total_duration {
            Some(total) if !total.is_zero() => {
                (self.current_position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Notifications coming from a media element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    /// Length became available, in seconds. May be non-finite for streams.
    MetadataLoaded(f64),
    /// Playback position moved, in seconds.
    TimeUpdate(f64),
    /// Playback reached the end of the media.
    Ended,
}

/// The element actually producing sound.
pub trait MediaElement: Send {
    /// Start or resume playback.
    fn play(&mut self);
    /// Pause playback.
    fn pause(&mut self);
    /// Mute or unmute output.
    fn set_muted(&mut self, muted: bool);
}

type Listener = Arc<Mutex<dyn FnMut(&MediaEvent) + Send>>;

/// Fan-out of [`MediaEvent`]s to registered listeners.
#[derive(Clone, Default)]
pub struct MediaEvents {
    listeners: Arc<Mutex<Vec<(u64, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for MediaEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl MediaEvents {
    /// A hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered until the returned guard is dropped.
    pub fn subscribe(&self, listener: impl FnMut(&MediaEvent) + Send + 'static) -> ListenerGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(Mutex::new(listener));
        lock(&self.listeners).push((id, listener));
        ListenerGuard {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Deliver `event` to every registered listener.
    ///
    /// The registry is not locked while listeners run, so a listener may emit, subscribe or drop
    /// its guard.
    pub fn emit(&self, event: MediaEvent) {
        let snapshot: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            let mut callback = lock(&listener);
            (*callback)(&event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

/// Keeps a listener registered. Dropping it removes the listener.
#[must_use = "dropping the guard removes the listener immediately"]
pub struct ListenerGuard {
    id: u64,
    listeners: Arc<Mutex<Vec<(u64, Listener)>>>,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        lock(&self.listeners).retain(|(id, _)| *id != self.id);
    }
}

/// Play/pause/mute transport over a [`MediaElement`].
///
/// Element events update the state once the controller is attached to a [`MediaEvents`] hub.
pub struct PlaybackController {
    element: Box<dyn MediaElement>,
    state: Arc<Mutex<PlaybackState>>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// A paused, unmuted controller for `element`.
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self {
            element,
            state: Arc::new(Mutex::new(PlaybackState::default())),
        }
    }

    /// Follow `events`. Drop the guard when the view goes away.
    pub fn attach(&self, events: &MediaEvents) -> ListenerGuard {
        let state = Arc::clone(&self.state);
        events.subscribe(move |event| apply(&mut lock(&state), *event))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PlaybackState {
        lock(&self.state).clone()
    }

    /// Play when paused, pause when playing.
    ///
    /// The element is driven after the state lock is released; it may report events
    /// synchronously.
    pub fn toggle(&mut self) {
        let playing = {
            let mut state = lock(&self.state);
            state.is_playing = !state.is_playing;
            state.is_playing
        };
        tracing::debug!(playing, "playback toggled");
        if playing {
            self.element.play();
        } else {
            self.element.pause();
        }
    }

    /// Flip the mute flag. Play state is untouched.
    pub fn toggle_mute(&mut self) {
        let muted = {
            let mut state = lock(&self.state);
            state.is_muted = !state.is_muted;
            state.is_muted
        };
        self.element.set_muted(muted);
    }

    /// Fraction played, see [`PlaybackState::progress`].
    pub fn progress(&self) -> f64 {
        lock(&self.state).progress()
    }
}

fn apply(state: &mut PlaybackState, event: MediaEvent) {
    match event {
        MediaEvent::MetadataLoaded(secs) => {
            state.total_duration = secs_to_duration(secs);
            if let Some(total) = state.total_duration {
                state.current_position = state.current_position.min(total);
            }
        }
        MediaEvent::TimeUpdate(secs) => {
            let pos = secs_to_duration(secs).unwrap_or(Duration::ZERO);
            state.current_position = match state.total_duration {
                Some(total) => pos.min(total),
                None => pos,
            };
        }
        MediaEvent::Ended => {
            state.is_playing = false;
        }
    }
}

fn secs_to_duration(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

/// Render `d` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
