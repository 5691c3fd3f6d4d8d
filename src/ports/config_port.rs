//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// A `sep`-separated value split into trimmed, non-empty items.
    /// `None` when the key is absent.
    fn get_list(&self, section: &str, key: &str, sep: char) -> Option<Vec<String>> {
        self.get_string(section, key).map(|raw| {
            raw.split(sep)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
