//! KeyInjector: turns `KeyCode`s and strings into timed press/release sequences.
//!
//! The injector sits at the application layer and delegates the actual OS
//! calls to a [`KeyEmitter`] implementation from the infrastructure layer.
//! It owns everything that is *not* platform specific:
//!
//! - timing (`before` → press → `down` → release → `after`),
//! - optional random jitter on every pause,
//! - the platform startup delay,
//! - character lookup through a caller-supplied [`KeyCodeMap`],
//! - error accumulation for unmapped characters (stubborn / noisy modes),
//! - stopping a long `type_string` when an interrupt flag is raised,
//! - serialization of all entry points through one mutex.
//!
//! # Why a mutex if the collector is single-threaded? (for beginners)
//!
//! The OS keeps one global "which keys are held" state per session.  If two
//! callers interleaved press and release calls, a modifier pressed by one
//! could still be down while the other types, producing wrong characters.
//! Every public method therefore takes the emitter lock for its whole
//! press/release sequence, so at most one sequence is in flight.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread;
use std::time::Duration;

use keycode_core::{KeyCode, KeyCodeMap};
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Error type for key injection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The platform backend rejected or failed an event.
    #[error("platform error: {0}")]
    Platform(String),
    /// The key code cannot be represented by the platform backend.
    #[error("key code {0} is out of range for this backend")]
    InvalidKeyCode(u32),
    /// A character had no entry in the keymap.
    #[error("key mapping not found: {0:?}")]
    UnmappedCharacter(char),
    /// The interrupt flag was raised before the text was fully typed.
    #[error("typing interrupted")]
    Interrupted,
}

/// All errors collected during one [`KeyInjector::type_string`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_errors(.errors))]
pub struct TypeError {
    pub errors: Vec<InjectionError>,
}

fn join_errors(errors: &[InjectionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keys with a fixed meaning that the platform backend resolves itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Tab,
    Enter,
    Backspace,
}

/// Platform key event boundary.
///
/// `press` holds the key's modifiers and then the key; `release` lets go of
/// the key and then its modifiers.  Each OS provides an implementation in the
/// infrastructure layer.
#[cfg_attr(test, mockall::automock)]
pub trait KeyEmitter {
    /// Presses the modifiers of `key`, then `key` itself.
    fn press(&mut self, key: &KeyCode) -> Result<(), InjectionError>;

    /// Releases `key`, then its modifiers.
    fn release(&mut self, key: &KeyCode) -> Result<(), InjectionError>;

    /// Presses a named key without modifiers.
    fn press_named(&mut self, key: NamedKey) -> Result<(), InjectionError>;

    /// Releases a named key.
    fn release_named(&mut self, key: NamedKey) -> Result<(), InjectionError>;

    /// Releases every key this emitter may still be holding.
    fn release_all(&mut self) -> Result<(), InjectionError>;
}

impl<E: KeyEmitter + ?Sized> KeyEmitter for Box<E> {
    fn press(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        (**self).press(key)
    }

    fn release(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        (**self).release(key)
    }

    fn press_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        (**self).press_named(key)
    }

    fn release_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        (**self).release_named(key)
    }

    fn release_all(&mut self) -> Result<(), InjectionError> {
        (**self).release_all()
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Returns the delay the OS needs before the first synthetic key is accepted.
///
/// Freshly created virtual input devices on Linux are ignored for roughly two
/// seconds; other platforms accept events immediately.
pub fn platform_startup_delay() -> Option<Duration> {
    if cfg!(target_os = "linux") {
        Some(Duration::from_secs(2))
    } else {
        None
    }
}

/// Injector settings.
///
/// | Field           | Default                    |
/// |-----------------|----------------------------|
/// | `before`        | 0 ms                       |
/// | `down`          | 40 ms                      |
/// | `after`         | 10 ms                      |
/// | `stubborn`      | `false`                    |
/// | `noisy`         | `false`                    |
/// | `random`        | `false`                    |
/// | `startup_delay` | 2 s on Linux, none elsewhere |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectorConfig {
    /// Pause before each key press.
    pub before: Duration,
    /// How long each key is held down.
    pub down: Duration,
    /// Pause after each key release.
    pub after: Duration,
    /// Keep typing past unmapped characters instead of stopping at the first.
    pub stubborn: bool,
    /// Surface every error as soon as it happens.
    pub noisy: bool,
    /// Jitter every pause uniformly within ±50%.
    pub random: bool,
    /// Blocking sleep performed once when the injector is created.
    pub startup_delay: Option<Duration>,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            before: Duration::ZERO,
            down: Duration::from_millis(40),
            after: Duration::from_millis(10),
            stubborn: false,
            noisy: false,
            random: false,
            startup_delay: platform_startup_delay(),
        }
    }
}

impl InjectorConfig {
    /// Timing used while typing discovery rounds: short holds, longer gaps
    /// so that repeated characters stay distinguishable on screen.  The
    /// `[injector]` config section defaults to these values.
    pub fn for_discovery() -> Self {
        Self {
            down: Duration::from_millis(15),
            after: Duration::from_millis(50),
            ..Self::default()
        }
    }

    /// No pauses and no startup delay.
    pub fn immediate() -> Self {
        Self {
            before: Duration::ZERO,
            down: Duration::ZERO,
            after: Duration::ZERO,
            startup_delay: None,
            ..Self::default()
        }
    }
}

/// Scales `base` by a uniform factor in `[0.5, 1.5]`.
pub fn jittered<R: Rng + ?Sized>(base: Duration, rng: &mut R) -> Duration {
    let nanos = u64::try_from(base.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    let low = nanos / 2;
    let high = nanos.saturating_add(nanos / 2);
    Duration::from_nanos(rng.gen_range(low..=high))
}

// ── Injector ──────────────────────────────────────────────────────────────────

/// Serialized, timed key injection over a [`KeyEmitter`].
pub struct KeyInjector<E> {
    emitter: Mutex<E>,
    config: InjectorConfig,
    observer: Option<UnboundedSender<InjectionError>>,
    interrupted: Option<Arc<AtomicBool>>,
}

impl<E: KeyEmitter> KeyInjector<E> {
    /// Creates an injector, sleeping for the configured startup delay.
    pub fn new(emitter: E, config: InjectorConfig) -> Self {
        if let Some(delay) = config.startup_delay.filter(|d| !d.is_zero()) {
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            info!(delay_ms, "waiting for the OS to accept synthetic input");
            thread::sleep(delay);
        }
        Self {
            emitter: Mutex::new(emitter),
            config,
            observer: None,
            interrupted: None,
        }
    }

    /// Forwards every error to `observer` as it happens (noisy mode only).
    pub fn with_observer(mut self, observer: UnboundedSender<InjectionError>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Makes `type_string` stop before the next character once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    /// Consumes the injector and returns the emitter.
    pub fn into_emitter(self) -> E {
        self.emitter
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Presses and releases one key code with the configured timing.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] if the platform backend fails.
    pub fn inject(&self, key: KeyCode) -> Result<(), InjectionError> {
        let mut emitter = self.lock();
        self.tap(&mut *emitter, &key).map_err(|e| self.reported(e))
    }

    /// Presses Escape.  All other keys are released first.
    pub fn escape(&self) -> Result<(), InjectionError> {
        self.only(NamedKey::Escape)
    }

    /// Presses Tab.  All other keys are released first.
    pub fn tab(&self) -> Result<(), InjectionError> {
        self.only(NamedKey::Tab)
    }

    /// Presses Enter.  All other keys are released first.
    pub fn enter(&self) -> Result<(), InjectionError> {
        self.only(NamedKey::Enter)
    }

    /// Presses Backspace.  All other keys are released first.
    pub fn backspace(&self) -> Result<(), InjectionError> {
        self.only(NamedKey::Backspace)
    }

    /// Taps `key` in isolation: release everything, tap, release everything.
    pub fn only(&self, key: NamedKey) -> Result<(), InjectionError> {
        let mut emitter = self.lock();
        self.tap_alone(&mut *emitter, key)
            .map_err(|e| self.reported(e))
    }

    /// Types `text` using `keymap` to translate each character.
    ///
    /// Characters missing from `keymap` are recorded as
    /// [`InjectionError::UnmappedCharacter`].  Without stubborn mode typing
    /// stops at the first one; with it every mapped character is still typed.
    /// A platform failure always stops typing, and so does a raised
    /// interrupt flag (recorded as [`InjectionError::Interrupted`]).
    ///
    /// # Errors
    ///
    /// Returns [`TypeError`] holding every error collected during this call.
    pub fn type_string(&self, text: &str, keymap: &KeyCodeMap) -> Result<(), TypeError> {
        let mut errors = Vec::new();
        let mut emitter = self.lock();

        for ch in text.chars() {
            if self.is_interrupted() {
                let err = InjectionError::Interrupted;
                self.report(&err);
                errors.push(err);
                break;
            }
            let Some(key) = keymap.get(ch) else {
                let err = InjectionError::UnmappedCharacter(ch);
                self.report(&err);
                errors.push(err);
                if self.config.stubborn {
                    continue;
                }
                break;
            };
            if let Err(err) = self.tap(&mut *emitter, &key) {
                self.report(&err);
                errors.push(err);
                break;
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TypeError { errors })
        }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn lock(&self) -> MutexGuard<'_, E> {
        self.emitter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tap(&self, emitter: &mut E, key: &KeyCode) -> Result<(), InjectionError> {
        self.pause(self.config.before);
        emitter.press(key)?;
        self.pause(self.config.down);
        emitter.release(key)?;
        self.pause(self.config.after);
        Ok(())
    }

    fn tap_alone(&self, emitter: &mut E, key: NamedKey) -> Result<(), InjectionError> {
        emitter.release_all()?;
        self.pause(self.config.before);
        emitter.press_named(key)?;
        self.pause(self.config.down);
        emitter.release_named(key)?;
        self.pause(self.config.after);
        emitter.release_all()
    }

    fn pause(&self, base: Duration) {
        if base.is_zero() {
            return;
        }
        let wait = if self.config.random {
            jittered(base, &mut rand::thread_rng())
        } else {
            base
        };
        thread::sleep(wait);
    }

    fn reported(&self, err: InjectionError) -> InjectionError {
        self.report(&err);
        err
    }

    fn report(&self, err: &InjectionError) {
        if !self.config.noisy {
            debug!(error = %err, "injection error");
            return;
        }
        warn!(error = %err, "injection error");
        if let Some(observer) = &self.observer {
            // A dropped receiver only means nobody is listening any more.
            let _ = observer.send(err.clone());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use mockall::{predicate::eq, Sequence};
    use rand::rngs::mock::StepRng;

    use crate::infrastructure::key_emitter::mock::{EmittedKey, RecordingKeyEmitter};

    fn keymap() -> KeyCodeMap {
        [
            ('a', KeyCode::simple(30)),
            ('b', KeyCode::simple(48)),
            ('c', KeyCode::simple(46)),
            ('A', KeyCode::shifted(30)),
        ]
        .into_iter()
        .collect()
    }

    fn expect_tap(mock: &mut MockKeyEmitter, seq: &mut Sequence, key: KeyCode) {
        mock.expect_press()
            .with(eq(key))
            .times(1)
            .in_sequence(seq)
            .returning(|_| Ok(()));
        mock.expect_release()
            .with(eq(key))
            .times(1)
            .in_sequence(seq)
            .returning(|_| Ok(()));
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_timings() {
        let cfg = InjectorConfig::default();
        assert_eq!(cfg.before, Duration::ZERO);
        assert_eq!(cfg.down, Duration::from_millis(40));
        assert_eq!(cfg.after, Duration::from_millis(10));
        assert!(!cfg.stubborn && !cfg.noisy && !cfg.random);
        assert_eq!(cfg.startup_delay, platform_startup_delay());
    }

    #[test]
    fn test_discovery_config_timings() {
        let cfg = InjectorConfig::for_discovery();
        assert_eq!(cfg.down, Duration::from_millis(15));
        assert_eq!(cfg.after, Duration::from_millis(50));
    }

    #[test]
    fn test_jitter_stays_within_half_and_one_and_a_half() {
        let base = Duration::from_millis(100);
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let d = jittered(base, &mut rng);
            assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(150), "{d:?}");
        }
    }

    #[test]
    fn test_jitter_of_zero_is_zero() {
        let mut rng = StepRng::new(7, 11);
        assert_eq!(jittered(Duration::ZERO, &mut rng), Duration::ZERO);
    }

    // ── inject ────────────────────────────────────────────────────────────────

    #[test]
    fn test_inject_presses_then_releases() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        expect_tap(&mut mock, &mut seq, KeyCode::shifted(30));
        let injector = KeyInjector::new(mock, InjectorConfig::immediate());

        // Act / Assert (expectations verified on drop)
        injector.inject(KeyCode::shifted(30)).unwrap();
    }

    #[test]
    fn test_inject_propagates_platform_failure_without_release() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        mock.expect_press()
            .returning(|_| Err(InjectionError::Platform("device gone".into())));
        mock.expect_release().never();
        let injector = KeyInjector::new(mock, InjectorConfig::immediate());

        // Act
        let result = injector.inject(KeyCode::simple(1));

        // Assert
        assert_eq!(result, Err(InjectionError::Platform("device gone".into())));
    }

    // ── Named keys ────────────────────────────────────────────────────────────

    #[test]
    fn test_enter_clears_held_keys_before_and_after() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        mock.expect_release_all().times(1).in_sequence(&mut seq).returning(|| Ok(()));
        mock.expect_press_named()
            .with(eq(NamedKey::Enter))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_release_named()
            .with(eq(NamedKey::Enter))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_release_all().times(1).in_sequence(&mut seq).returning(|| Ok(()));
        let injector = KeyInjector::new(mock, InjectorConfig::immediate());

        // Act
        injector.enter().unwrap();
    }

    // ── type_string ───────────────────────────────────────────────────────────

    #[test]
    fn test_type_string_types_every_mapped_character_in_order() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        for key in [KeyCode::shifted(30), KeyCode::simple(48), KeyCode::simple(46)] {
            expect_tap(&mut mock, &mut seq, key);
        }
        let injector = KeyInjector::new(mock, InjectorConfig::immediate());

        // Act / Assert
        assert_eq!(injector.type_string("Abc", &keymap()), Ok(()));
    }

    #[test]
    fn test_type_string_not_stubborn_stops_at_unmapped_character() {
        // Arrange: "a?b" – 'a' is typed, '?' is unmapped, 'b' must not be typed.
        let mut mock = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        expect_tap(&mut mock, &mut seq, KeyCode::simple(30));
        let injector = KeyInjector::new(mock, InjectorConfig::immediate());

        // Act
        let err = injector.type_string("a?b", &keymap()).unwrap_err();

        // Assert
        assert_eq!(err.errors, vec![InjectionError::UnmappedCharacter('?')]);
    }

    #[test]
    fn test_type_string_stubborn_types_past_unmapped_character() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        expect_tap(&mut mock, &mut seq, KeyCode::simple(30));
        expect_tap(&mut mock, &mut seq, KeyCode::simple(48));
        let config = InjectorConfig {
            stubborn: true,
            ..InjectorConfig::immediate()
        };
        let injector = KeyInjector::new(mock, config);

        // Act
        let err = injector.type_string("a?b", &keymap()).unwrap_err();

        // Assert
        assert_eq!(err.errors, vec![InjectionError::UnmappedCharacter('?')]);
    }

    #[test]
    fn test_type_string_stops_on_platform_failure() {
        // Arrange
        let mut mock = MockKeyEmitter::new();
        mock.expect_press()
            .times(1)
            .returning(|_| Err(InjectionError::Platform("boom".into())));
        let config = InjectorConfig {
            stubborn: true,
            ..InjectorConfig::immediate()
        };
        let injector = KeyInjector::new(mock, config);

        // Act
        let err = injector.type_string("abc", &keymap()).unwrap_err();

        // Assert
        assert_eq!(err.errors, vec![InjectionError::Platform("boom".into())]);
    }

    #[test]
    fn test_noisy_mode_sends_errors_to_observer() {
        // Arrange
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let config = InjectorConfig {
            noisy: true,
            stubborn: true,
            ..InjectorConfig::immediate()
        };
        let mut mock = MockKeyEmitter::new();
        mock.expect_press().returning(|_| Ok(()));
        mock.expect_release().returning(|_| Ok(()));
        let injector = KeyInjector::new(mock, config).with_observer(tx);

        // Act
        let _ = injector.type_string("x1a", &keymap());

        // Assert
        assert_eq!(rx.try_recv(), Ok(InjectionError::UnmappedCharacter('x')));
        assert_eq!(rx.try_recv(), Ok(InjectionError::UnmappedCharacter('1')));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_quiet_mode_does_not_send_to_observer() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let injector = KeyInjector::new(MockKeyEmitter::new(), InjectorConfig::immediate())
            .with_observer(tx);

        let _ = injector.type_string("?", &keymap());

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_raised_interrupt_stops_typing_before_next_character() {
        // Arrange: the emitter raises the flag while the first key is down.
        let flag = Arc::new(AtomicBool::new(false));
        let raise = Arc::clone(&flag);
        let mut mock = MockKeyEmitter::new();
        mock.expect_press().times(1).returning(move |_| {
            raise.store(true, Ordering::SeqCst);
            Ok(())
        });
        mock.expect_release().times(1).returning(|_| Ok(()));
        let config = InjectorConfig {
            stubborn: true,
            ..InjectorConfig::immediate()
        };
        let injector = KeyInjector::new(mock, config).with_interrupt(flag);

        // Act
        let err = injector.type_string("abc", &keymap()).unwrap_err();

        // Assert
        assert_eq!(err.errors, vec![InjectionError::Interrupted]);
    }

    #[test]
    fn test_flag_raised_up_front_types_nothing() {
        let injector = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate())
            .with_interrupt(Arc::new(AtomicBool::new(true)));

        let err = injector.type_string("ab", &keymap()).unwrap_err();

        assert_eq!(err.errors, vec![InjectionError::Interrupted]);
        assert!(injector.into_emitter().events().is_empty());
    }

    // ── Locking and timing ────────────────────────────────────────────────────

    #[test]
    fn test_concurrent_type_string_calls_never_interleave() {
        // Arrange: a short hold gives the other thread a chance to cut in.
        let config = InjectorConfig {
            down: Duration::from_millis(2),
            ..InjectorConfig::immediate()
        };
        let injector = KeyInjector::new(RecordingKeyEmitter::new(), config);
        let map = keymap();

        // Act
        std::thread::scope(|s| {
            s.spawn(|| injector.type_string("aaaa", &map).unwrap());
            s.spawn(|| injector.type_string("bbbb", &map).unwrap());
        });

        // Assert: eight down/up pairs, grouped by call.
        let events = injector.into_emitter().events().to_vec();
        assert_eq!(events.len(), 16);
        let codes: Vec<u32> = events
            .iter()
            .map(|e| match e {
                EmittedKey::Down(k) | EmittedKey::Up(k) => k.code(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        let (first, second) = codes.split_at(8);
        assert!(first.iter().all(|&c| c == first[0]), "{codes:?}");
        assert!(second.iter().all(|&c| c == second[0]), "{codes:?}");
        assert_ne!(first[0], second[0]);
        for pair in events.chunks(2) {
            assert!(matches!(pair, [EmittedKey::Down(d), EmittedKey::Up(u)] if d == u));
        }
    }

    #[test]
    fn test_new_sleeps_for_startup_delay() {
        let config = InjectorConfig {
            startup_delay: Some(Duration::from_millis(50)),
            ..InjectorConfig::immediate()
        };

        let started = Instant::now();
        let _injector = KeyInjector::new(RecordingKeyEmitter::new(), config);

        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_before_pause_is_applied_per_key() {
        // Arrange
        let config = InjectorConfig {
            before: Duration::from_millis(20),
            ..InjectorConfig::immediate()
        };
        let injector = KeyInjector::new(RecordingKeyEmitter::new(), config);

        // Act
        let started = Instant::now();
        injector.type_string("ab", &keymap()).unwrap();

        // Assert
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_type_error_display_joins_errors() {
        let err = TypeError {
            errors: vec![
                InjectionError::UnmappedCharacter('x'),
                InjectionError::UnmappedCharacter('y'),
            ],
        };
        assert_eq!(
            err.to_string(),
            "key mapping not found: 'x'\nkey mapping not found: 'y'"
        );
    }
}
