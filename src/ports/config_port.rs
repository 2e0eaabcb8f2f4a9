//! Configuration access port.

/// Sectioned key/value configuration.
///
/// Typed getters return `Ok(None)` when the key is absent and `Err` with a
/// description when a value is present but does not parse, so callers can
/// apply defaults without masking typos.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;

    /// Keys present in `section`, sorted. Empty when the section is absent.
    fn section_keys(&self, section: &str) -> Vec<String>;
}
