use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper for credentials (the gateway signing key, primarily) that redacts the value in `Debug` and `Display`
/// output, so that configuration structs can be logged without leaking secrets.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// The revealed value with surrounding whitespace removed. Signing keys are routinely pasted into env files with
    /// a trailing newline; every signature operation must use the trimmed key.
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
