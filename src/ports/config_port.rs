//! Configuration lookup port.
//!
//! An absent key is never an error here; callers apply their own defaults.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Trimmed value, or `None` when the key is absent or blank.
    fn get_trimmed(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
