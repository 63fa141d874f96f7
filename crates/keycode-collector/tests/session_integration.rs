//! End-to-end tests: terminal prompter → session → recording emitter →
//! mapping output, and typing with the emitted mapping.

use std::io::Cursor;
use std::sync::{atomic::AtomicBool, Arc};

use keycode_collector::application::collect_session::{
    CollectSessionUseCase, SessionDefaults, SessionError,
};
use keycode_collector::application::discover_keycode::{DiscoverKeyCodeUseCase, DiscoveryConfig};
use keycode_collector::application::inject_keys::{
    InjectionError, InjectorConfig, KeyInjector, NamedKey,
};
use keycode_collector::application::prompts::PromptError;
use keycode_collector::infrastructure::key_emitter::mock::{EmittedKey, RecordingKeyEmitter};
use keycode_collector::infrastructure::output::MappingOutput;
use keycode_collector::infrastructure::prompt::TerminalPrompter;
use keycode_core::{KeyCode, KeyCodeMap};

/// Runs a whole session over `script` and returns the emitted JSON, the
/// session result, and the emitter.
fn run_session(script: &str) -> (String, Result<(), SessionError>, RecordingKeyEmitter) {
    let mut stdout = Vec::new();
    let injector = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate());
    let result = {
        let mut output = MappingOutput::new(&mut stdout);
        let session = CollectSessionUseCase::new(
            DiscoverKeyCodeUseCase::new(&injector, DiscoveryConfig::immediate()),
            SessionDefaults::default(),
        );
        let mut prompter = TerminalPrompter::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            Arc::new(AtomicBool::new(false)),
        );
        session.run(&mut prompter, output.mapping_mut())
    };
    (
        String::from_utf8(stdout).unwrap(),
        result,
        injector.into_emitter(),
    )
}

#[test]
fn test_two_discoveries_are_emitted_as_json() {
    // Arrange: 'a' is code 1 in [0,4), 'A' is code 1 with Shift in [0,1].
    let script = "\
y\n0\n3\nn\nn\nn\nn\n\
y\n1\ny\n2\n\
a\n\
\n0\n1\ny\n\n\n\n\
y\n2\n\
A\n\
n\n";

    // Act
    let (json, result, _) = run_session(script);

    // Assert
    result.unwrap();
    let mapping = KeyCodeMap::from_json(&json).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.get('a'), Some(KeyCode::simple(1)));
    assert_eq!(mapping.get('A'), Some(KeyCode::shifted(1)));
}

#[test]
fn test_mapping_is_emitted_when_input_ends_mid_session() {
    // Arrange: one discovery, then EOF in the middle of the next range prompt.
    let script = "y\n9\n9\nn\nn\nn\nn\nq\ny\n4\n";

    // Act
    let (json, result, emitter) = run_session(script);

    // Assert
    assert!(matches!(
        result,
        Err(SessionError::Configure(PromptError::Cancelled))
    ));
    let mapping = KeyCodeMap::from_json(&json).unwrap();
    assert_eq!(mapping.get('q'), Some(KeyCode::simple(9)));
    assert!(emitter.events().is_empty());
}

#[test]
fn test_immediate_stop_emits_empty_object() {
    let (json, result, _) = run_session("n\n");
    result.unwrap();
    assert_eq!(json.trim(), "{}");
}

#[test]
fn test_redo_of_a_character_overwrites_previous_entry() {
    // Both discoveries are single-code ranges, so no typing rounds happen.
    let script = "\n5\n5\n\n\n\n\nx\n\n6\n6\n\n\n\n\nx\nn\n";

    let (json, result, _) = run_session(script);

    result.unwrap();
    let mapping = KeyCodeMap::from_json(&json).unwrap();
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get('x'), Some(KeyCode::simple(6)));
}

#[test]
fn test_emitted_mapping_drives_typing() {
    // Arrange
    let keymap: KeyCodeMap = [
        ('h', KeyCode::simple(35)),
        ('i', KeyCode::simple(23)),
        ('!', KeyCode::shifted(2)),
    ]
    .into_iter()
    .collect();
    let json = keymap.to_json_pretty().unwrap();
    let restored = KeyCodeMap::from_json(&json).unwrap();
    let injector = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate());

    // Act
    injector.type_string("hi!", &restored).unwrap();

    // Assert
    assert_eq!(
        injector.into_emitter().pressed(),
        vec![KeyCode::simple(35), KeyCode::simple(23), KeyCode::shifted(2)]
    );
}

#[test]
fn test_stubborn_and_plain_typing_with_one_unmapped_character() {
    // Arrange
    let keymap: KeyCodeMap = [('a', KeyCode::simple(1)), ('b', KeyCode::simple(2))]
        .into_iter()
        .collect();
    let plain = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate());
    let stubborn = KeyInjector::new(
        RecordingKeyEmitter::new(),
        InjectorConfig {
            stubborn: true,
            ..InjectorConfig::immediate()
        },
    );

    // Act
    let plain_err = plain.type_string("a#b", &keymap).unwrap_err();
    let stubborn_err = stubborn.type_string("a#b", &keymap).unwrap_err();

    // Assert
    assert_eq!(plain_err.errors, vec![InjectionError::UnmappedCharacter('#')]);
    assert_eq!(stubborn_err.errors, vec![InjectionError::UnmappedCharacter('#')]);
    assert_eq!(plain.into_emitter().pressed(), vec![KeyCode::simple(1)]);
    assert_eq!(
        stubborn.into_emitter().pressed(),
        vec![KeyCode::simple(1), KeyCode::simple(2)]
    );
}

#[test]
fn test_named_keys_release_everything_around_the_tap() {
    let injector = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate());

    injector.backspace().unwrap();

    assert_eq!(
        injector.into_emitter().events(),
        [
            EmittedKey::ReleaseAll,
            EmittedKey::NamedDown(NamedKey::Backspace),
            EmittedKey::NamedUp(NamedKey::Backspace),
            EmittedKey::ReleaseAll,
        ]
    );
}
