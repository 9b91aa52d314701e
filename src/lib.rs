//! CrossInput -- cross-platform keyboard/mouse capture and injection.
//!
//! One `Engine` per process. `init()` starts a background listener for
//! physical input and opens the platform's injection channel; after that any
//! thread may ask `is_key_pressed` or synthesize key and pointer events.
//!
//! ```no_run
//! use crossinput::{Engine, Key};
//!
//! let engine = Engine::default();
//! engine.init()?;
//! if engine.is_key_pressed(Key::LSHIFT) {
//!     engine.tap_key(Key::A)?;
//! }
//! engine.move_mouse(10, 0)?;
//! engine.cleanup();
//! # Ok::<(), crossinput::EngineError>(())
//! ```

pub mod config;
mod engine;
pub mod key;
pub mod platform;
pub mod state;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineError, EngineStatus};
pub use key::{key_name, Key};
pub use platform::{KeyState, PlatformError};
