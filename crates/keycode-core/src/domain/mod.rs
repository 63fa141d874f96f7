//! Domain entities for keycode discovery.
//!
//! Pure values and rules with no OS, terminal, or timing dependencies:
//!
//! - [`keycode`] – the immutable `KeyCode` value (code + modifier flags).
//! - [`candidates`] – range generation over a modifier template and the
//!   halving rule applied each bisection round.
//! - [`mapping`] – the character → `KeyCode` accumulator and its JSON form.
//!
//! Everything here can be unit-tested on any platform without a display or
//! an operator.

pub mod candidates;
pub mod keycode;
pub mod mapping;
