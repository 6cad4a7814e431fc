use serde::{Deserialize, Serialize};
use tracing::Level;

/// Ordered table mapping a level ordinal to its display name.
///
/// The renderer receives this table at construction and looks up
/// `names[event.level()]` for every `%p` piece. The default table follows
/// `tracing` severity order, most severe first:
///
/// | ordinal | name  |
/// |---------|-------|
/// | 0       | ERROR |
/// | 1       | WARN  |
/// | 2       | INFO  |
/// | 3       | DEBUG |
/// | 4       | TRACE |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelNames {
    names: Vec<String>,
}

impl LevelNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LevelNames { names: names.into_iter().map(Into::into).collect() }
    }

    pub fn name(&self, ordinal: usize) -> Option<&str> {
        self.names.get(ordinal).map(String::as_str)
    }

    /// Ordinal of the first entry matching `name`, ignoring ASCII case.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Ordinal for a `tracing` level, matched by its name (`"ERROR"`,
    /// `"WARN"`, ...).
    pub fn ordinal_of_level(&self, level: Level) -> Option<usize> {
        self.ordinal_of(level.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for LevelNames {
    fn default() -> Self {
        LevelNames::new(["ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Level::ERROR, 0)]
    #[case(Level::WARN, 1)]
    #[case(Level::INFO, 2)]
    #[case(Level::DEBUG, 3)]
    #[case(Level::TRACE, 4)]
    fn default_table_follows_tracing_severity(#[case] level: Level, #[case] ordinal: usize) {
        let names = LevelNames::default();
        assert_eq!(names.ordinal_of_level(level), Some(ordinal));
        assert_eq!(names.name(ordinal), Some(level.as_str()));
    }

    #[test]
    fn custom_table_lookup() {
        let names = LevelNames::new(["fatal", "error", "warn", "info", "debug", "trace"]);
        assert_eq!(names.len(), 6);
        assert_eq!(names.ordinal_of("INFO"), Some(3));
        assert_eq!(names.ordinal_of_level(Level::ERROR), Some(1));
        assert_eq!(names.name(0), Some("fatal"));
        assert_eq!(names.name(6), None);
        assert_eq!(names.ordinal_of("notice"), None);
    }

    #[test]
    fn deserializes_from_a_plain_list() {
        let names: LevelNames = serde_json::from_str(r#"["LOW", "HIGH"]"#).unwrap();
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["LOW", "HIGH"]);
        assert_eq!(serde_json::to_string(&names).unwrap(), r#"["LOW","HIGH"]"#);
    }
}
