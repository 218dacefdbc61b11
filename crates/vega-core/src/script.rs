//! Script sources for step 2 of the wizard.

/// Blurb returned by [`PlaceholderScript`].
pub const PLACEHOLDER_SCRIPT: &str = "Vega, the brightest star in the constellation Lyra, \
is located about 25 light-years from Earth. It is a young, bluish-white star, hotter and more \
massive than the Sun. Vega has been key in star brightness studies and serves as an important \
reference point for astronomers and future space exploration.";

/// Produces a script the user can accept instead of typing one.
pub trait ScriptSource: Send + Sync {
    /// Return a script. Implementations must not block on I/O.
    fn generate_script(&self) -> String;
}

/// Returns the same fixed script on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderScript;

impl ScriptSource for PlaceholderScript {
    fn generate_script(&self) -> String {
        PLACEHOLDER_SCRIPT.to_owned()
    }
}
