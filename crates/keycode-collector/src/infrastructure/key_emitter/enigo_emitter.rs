//! Real OS key injection through the `enigo` crate.
//!
//! `enigo` wraps `SendInput` on Windows, XTest / libei on Linux and
//! `CGEventPost` on macOS.  Key codes are passed through untouched with
//! [`Keyboard::raw`], which takes the platform's native 16-bit code; this
//! is exactly the number a discovery session finds.
//!
//! Modifiers are pressed Super → Ctrl → Alt → Shift before the key and
//! released in the reverse order after it.
//!
//! Only compiled with the `enigo` cargo feature.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use keycode_core::KeyCode;
use tracing::debug;

use crate::application::inject_keys::{InjectionError, KeyEmitter, NamedKey};

const ALL_MODIFIERS: [Key; 4] = [Key::Shift, Key::Alt, Key::Control, Key::Meta];

pub struct EnigoKeyEmitter {
    enigo: Enigo,
}

impl EnigoKeyEmitter {
    /// Connects to the platform input backend.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Platform`] if no display or input
    /// permission is available.
    pub fn new() -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default()).map_err(platform)?;
        debug!("enigo key emitter ready");
        Ok(Self { enigo })
    }

    fn modifiers(key: &KeyCode) -> Vec<Key> {
        [
            (key.has_super(), Key::Meta),
            (key.has_ctrl(), Key::Control),
            (key.has_alt(), Key::Alt),
            (key.has_shift(), Key::Shift),
        ]
        .into_iter()
        .filter_map(|(held, k)| held.then_some(k))
        .collect()
    }
}

fn platform(err: impl std::fmt::Display) -> InjectionError {
    InjectionError::Platform(err.to_string())
}

fn raw_code(key: &KeyCode) -> Result<u16, InjectionError> {
    u16::try_from(key.code()).map_err(|_| InjectionError::InvalidKeyCode(key.code()))
}

fn named(key: NamedKey) -> Key {
    match key {
        NamedKey::Escape => Key::Escape,
        NamedKey::Tab => Key::Tab,
        NamedKey::Enter => Key::Return,
        NamedKey::Backspace => Key::Backspace,
    }
}

impl KeyEmitter for EnigoKeyEmitter {
    fn press(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        let code = raw_code(key)?;
        for modifier in Self::modifiers(key) {
            self.enigo.key(modifier, Direction::Press).map_err(platform)?;
        }
        self.enigo.raw(code, Direction::Press).map_err(platform)
    }

    fn release(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        let code = raw_code(key)?;
        self.enigo.raw(code, Direction::Release).map_err(platform)?;
        for modifier in Self::modifiers(key).into_iter().rev() {
            self.enigo.key(modifier, Direction::Release).map_err(platform)?;
        }
        Ok(())
    }

    fn press_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        self.enigo.key(named(key), Direction::Press).map_err(platform)
    }

    fn release_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        self.enigo.key(named(key), Direction::Release).map_err(platform)
    }

    fn release_all(&mut self) -> Result<(), InjectionError> {
        for modifier in ALL_MODIFIERS {
            self.enigo.key(modifier, Direction::Release).map_err(platform)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_follow_press_order() {
        let key = KeyCode::alt_shifted(4).with_super(true).with_ctrl(true);
        assert_eq!(
            EnigoKeyEmitter::modifiers(&key),
            vec![Key::Meta, Key::Control, Key::Alt, Key::Shift]
        );
        assert!(EnigoKeyEmitter::modifiers(&KeyCode::simple(4)).is_empty());
    }

    #[test]
    fn test_raw_code_rejects_codes_wider_than_16_bits() {
        assert_eq!(raw_code(&KeyCode::simple(65535)), Ok(65535));
        assert_eq!(
            raw_code(&KeyCode::simple(65536)),
            Err(InjectionError::InvalidKeyCode(65536))
        );
    }
}
