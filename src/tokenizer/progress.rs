// src/tokenizer/progress.rs

// With the "progressbar" feature the real indicatif types are used; otherwise
// these no-op stand-ins keep the trainer code free of cfg branches.

#[cfg(feature = "progressbar")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progressbar"))]
mod noop {
    use std::borrow::Cow;

    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_length: u64) -> Self {
            Self {}
        }

        pub fn set_length(&self, _length: u64) {}
        pub fn set_message(&self, _message: impl Into<Cow<'static, str>>) {}
        pub fn finish(&self) {}
        pub fn set_style(&self, _style: ProgressStyle) {}
        pub fn set_position(&self, _pos: u64) {}
    }

    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_bar() -> Self {
            Self {}
        }

        pub fn template(self, _template: &str) -> Result<Self, String> {
            Ok(self)
        }
    }
}

#[cfg(not(feature = "progressbar"))]
pub use noop::{ProgressBar, ProgressStyle};
