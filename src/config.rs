use crate::event::LogEvent;
use crate::layout::{compile, LayoutResult, Template};
use crate::level::LevelNames;
use crate::render::{Renderer, DEFAULT_UNKNOWN_LEVEL};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Layout used when a configuration does not name one.
pub const DEFAULT_PATTERN: &str = "%d{%Y-%m-%d %H:%M:%S%.3f} %p %c - %m";

/// Serializable description of a [`Layout`].
///
/// Meant to be embedded in an application's own configuration; every field
/// has a default, so `{}` is a valid configuration.
///
/// **Fields**
/// - `pattern`: layout string, see [`compile`] for the grammar.
/// - `levels`: level-name table indexed by level ordinal.
/// - `unknown_level`: name printed for ordinals outside `levels`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub pattern: String,
    pub levels: LevelNames,
    pub unknown_level: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            levels: LevelNames::default(),
            unknown_level: DEFAULT_UNKNOWN_LEVEL.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), ..Self::default() }
    }

    /// Compile the pattern and build the renderer.
    ///
    /// **Returns**
    /// - `Ok(Layout)` ready to render events.
    /// - `Err(CompileError)` if `pattern` is not a valid layout.
    pub fn build(&self) -> LayoutResult<Layout> {
        let renderer =
            Renderer::new(self.levels.clone()).with_unknown_level(self.unknown_level.clone());
        Layout::new(&self.pattern, renderer)
    }
}

/// A compiled [`Template`] together with the [`Renderer`] that renders it.
///
/// Cloning is cheap; the template is shared.
#[derive(Clone, Debug)]
pub struct Layout {
    template: Arc<Template>,
    renderer: Renderer,
}

impl Layout {
    pub fn new(pattern: &str, renderer: Renderer) -> LayoutResult<Self> {
        let template = compile(pattern)?;
        Ok(Self::from_template(template, renderer))
    }

    pub fn from_template(template: Template, renderer: Renderer) -> Self {
        Self { template: Arc::new(template), renderer }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn render<E: LogEvent + ?Sized>(&self, event: &E) -> String {
        self.renderer.render(event, &self.template)
    }

    pub fn render_into<E: LogEvent + ?Sized>(&self, event: &E, out: &mut String) {
        self.renderer.render_into(event, &self.template, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogRecord;
    use crate::layout::CompileError;
    use chrono::{TimeZone, Utc};
    use similar_asserts::assert_eq;

    fn event(level: usize) -> LogRecord {
        LogRecord {
            logger_name: "app.http".to_string(),
            timestamp: Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap(),
            level,
            payload: "request served".to_string(),
        }
    }

    #[test]
    fn default_config_renders_default_pattern() {
        let layout = LayoutConfig::default().build().unwrap();
        assert_eq!(layout.render(&event(2)), "2023-12-31 23:59:58.000 INFO app.http - request served");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{ "pattern": "%p|%m" }"#).unwrap();
        assert_eq!(config.levels, LevelNames::default());
        assert_eq!(config.unknown_level, "UNKNOWN");

        let config: LayoutConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn custom_levels_and_unknown_name_reach_the_renderer() {
        let config: LayoutConfig = serde_json::from_str(
            r#"{ "pattern": "<%p> %m", "levels": ["SEVERE", "WARNING"], "unknown_level": "OTHER" }"#,
        )
        .unwrap();
        let layout = config.build().unwrap();
        assert_eq!(layout.render(&event(1)), "<WARNING> request served");
        assert_eq!(layout.render(&event(2)), "<OTHER> request served");
    }

    #[test]
    fn invalid_pattern_fails_at_build() {
        let err = LayoutConfig::with_pattern("%c %z").build().unwrap_err();
        assert_eq!(err, CompileError::UnknownIdentifier { identifier: 'z', offset: 4 });
    }

    #[test]
    fn clones_share_the_template() {
        let layout = LayoutConfig::with_pattern("%c").build().unwrap();
        let copy = layout.clone();
        assert!(std::ptr::eq(layout.template(), copy.template()));

        let mut out = String::new();
        copy.render_into(&event(0), &mut out);
        assert_eq!(out, "app.http");
    }
}
