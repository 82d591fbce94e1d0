//! Endpoint configuration.
//!
//! `*Config` structs are what callers supply: every field optional, loadable
//! from JSON. `*Settings` are the merged, fully-typed values an endpoint runs
//! with.

use std::fmt;
use std::rc::Rc;

use pymprims_wire::{SizeValue, DEFAULT_PARENT_URL_PARAM, WILDCARD_ORIGIN};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix of declarative configuration attributes.
pub const ATTRIBUTE_PREFIX: &str = "data-pym-";

/// Default scroll throttle window in milliseconds.
pub const DEFAULT_SCROLL_WAIT_MS: u64 = 100;

/// Caller-supplied parent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentConfig {
    /// Origin pattern inbound messages must end with. `*` accepts any origin.
    pub xdomain: Option<String>,
    /// Frame `title` attribute.
    pub title: Option<String>,
    /// Frame `name` attribute.
    pub name: Option<String>,
    /// Frame `id` attribute. Skipped if the id is already taken.
    pub id: Option<String>,
    /// Frame `sandbox` attribute.
    pub sandbox: Option<String>,
    /// Set the `allowfullscreen` attribute.
    pub allowfullscreen: Option<bool>,
    /// Name of the query parameter carrying the parent URL.
    #[serde(rename = "parenturlparam")]
    pub parent_url_param: Option<String>,
    /// Value of the parent URL parameter. Defaults to the current document URL.
    #[serde(rename = "parenturlvalue")]
    pub parent_url_value: Option<String>,
    /// Append `parentTitle` and the parent URL parameter to the frame URL.
    #[serde(rename = "optionalparams")]
    pub optional_params: Option<bool>,
    /// Report viewport and frame position on scroll.
    #[serde(rename = "trackscroll")]
    pub track_scroll: Option<bool>,
    /// Scroll report throttle window in milliseconds.
    #[serde(rename = "scrollwait")]
    pub scroll_wait: Option<u64>,
}

impl ParentConfig {
    /// Parse a JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a configuration from declarative `data-pym-*` attributes.
    ///
    /// Boolean attributes are true unless their value is exactly `"false"`.
    /// Numeric attributes that do not parse are ignored. Unknown attributes are
    /// ignored.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (name, value) in attributes {
            let Some(key) = name.strip_prefix(ATTRIBUTE_PREFIX) else {
                continue;
            };
            let text = || Some(value.to_string());
            let flag = || Some(value != "false");
            match key {
                "xdomain" => config.xdomain = text(),
                "title" => config.title = text(),
                "name" => config.name = text(),
                "id" => config.id = text(),
                "sandbox" => config.sandbox = text(),
                "parenturlparam" => config.parent_url_param = text(),
                "parenturlvalue" => config.parent_url_value = text(),
                "allowfullscreen" => config.allowfullscreen = flag(),
                "optionalparams" => config.optional_params = flag(),
                "trackscroll" => config.track_scroll = flag(),
                "scrollwait" => {
                    if let Some(wait) = parse_attribute_number(value) {
                        config.scroll_wait = Some(wait);
                    }
                }
                _ => tracing::trace!(attribute = name, "ignoring unknown attribute"),
            }
        }
        config
    }
}

/// Read a numeric attribute like `Number(value)`, clamped to whole milliseconds.
fn parse_attribute_number(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    let number = if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().ok()?
    };
    number.is_finite().then(|| number.max(0.0) as u64)
}

/// Merged parent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentSettings {
    pub xdomain: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub sandbox: Option<String>,
    pub allowfullscreen: bool,
    pub parent_url_param: String,
    pub parent_url_value: String,
    pub optional_params: bool,
    pub track_scroll: bool,
    pub scroll_wait: u64,
}

impl ParentSettings {
    /// Merge `config` over the defaults. `current_url` backs `parent_url_value`.
    pub fn resolve(config: ParentConfig, current_url: &str) -> Self {
        Self {
            xdomain: config.xdomain.unwrap_or_else(|| WILDCARD_ORIGIN.to_string()),
            title: config.title,
            name: config.name,
            id: config.id,
            sandbox: config.sandbox,
            allowfullscreen: config.allowfullscreen.unwrap_or(false),
            parent_url_param: config
                .parent_url_param
                .unwrap_or_else(|| DEFAULT_PARENT_URL_PARAM.to_string()),
            parent_url_value: config
                .parent_url_value
                .unwrap_or_else(|| current_url.to_string()),
            optional_params: config.optional_params.unwrap_or(true),
            track_scroll: config.track_scroll.unwrap_or(false),
            scroll_wait: config.scroll_wait.unwrap_or(DEFAULT_SCROLL_WAIT_MS),
        }
    }
}

/// Called with the parent width at boot and on every width change.
pub type RenderCallback = Rc<dyn Fn(SizeValue)>;

/// Called with the class applied by the embedding check.
pub type EmbeddedStatusCallback = Rc<dyn Fn(&str)>;

/// Caller-supplied child configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChildConfig {
    /// Origin pattern inbound messages must end with. `*` accepts any origin.
    pub xdomain: Option<String>,
    /// Height polling interval in milliseconds. Zero disables polling.
    pub polling: Option<u64>,
    /// Channel id used when the frame URL has no `childId` parameter.
    pub id: Option<String>,
    /// Name of the query parameter carrying the parent URL.
    #[serde(rename = "parenturlparam")]
    pub parent_url_param: Option<String>,
    #[serde(skip)]
    pub render_callback: Option<RenderCallback>,
    #[serde(skip)]
    pub on_marked_embedded_status: Option<EmbeddedStatusCallback>,
}

impl ChildConfig {
    /// Parse a JSON configuration object. Callbacks are left unset.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the render callback.
    pub fn with_render_callback(mut self, callback: impl Fn(SizeValue) + 'static) -> Self {
        self.render_callback = Some(Rc::new(callback));
        self
    }

    /// Set the embedded-status callback.
    pub fn with_embedded_status_callback(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_marked_embedded_status = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for ChildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildConfig")
            .field("xdomain", &self.xdomain)
            .field("polling", &self.polling)
            .field("id", &self.id)
            .field("parent_url_param", &self.parent_url_param)
            .field("render_callback", &self.render_callback.is_some())
            .field(
                "on_marked_embedded_status",
                &self.on_marked_embedded_status.is_some(),
            )
            .finish()
    }
}

/// Merged child settings.
#[derive(Clone)]
pub struct ChildSettings {
    pub xdomain: String,
    pub polling: u64,
    pub id: Option<String>,
    pub parent_url_param: String,
    pub render_callback: Option<RenderCallback>,
    pub on_marked_embedded_status: Option<EmbeddedStatusCallback>,
}

impl From<ChildConfig> for ChildSettings {
    fn from(config: ChildConfig) -> Self {
        Self {
            xdomain: config.xdomain.unwrap_or_else(|| WILDCARD_ORIGIN.to_string()),
            polling: config.polling.unwrap_or(0),
            id: config.id,
            parent_url_param: config
                .parent_url_param
                .unwrap_or_else(|| DEFAULT_PARENT_URL_PARAM.to_string()),
            render_callback: config.render_callback,
            on_marked_embedded_status: config.on_marked_embedded_status,
        }
    }
}

impl fmt::Debug for ChildSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSettings")
            .field("xdomain", &self.xdomain)
            .field("polling", &self.polling)
            .field("id", &self.id)
            .field("parent_url_param", &self.parent_url_param)
            .field("render_callback", &self.render_callback.is_some())
            .field(
                "on_marked_embedded_status",
                &self.on_marked_embedded_status.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_defaults() {
        let settings = ParentSettings::resolve(ParentConfig::default(), "https://a.example/p");
        assert_eq!(settings.xdomain, "*");
        assert_eq!(settings.parent_url_param, "parentUrl");
        assert_eq!(settings.parent_url_value, "https://a.example/p");
        assert!(settings.optional_params);
        assert!(!settings.track_scroll);
        assert!(!settings.allowfullscreen);
        assert_eq!(settings.scroll_wait, 100);
        assert_eq!(settings.title, None);
    }

    #[test]
    fn parent_config_from_json_uses_attribute_names() {
        let config = ParentConfig::from_json(
            r#"{"xdomain":"\\.example\\.com","trackscroll":true,"scrollwait":250,"parenturlparam":"src","extra":1}"#,
        )
        .expect("config should parse");
        assert_eq!(config.xdomain.as_deref(), Some("\\.example\\.com"));
        assert_eq!(config.track_scroll, Some(true));
        assert_eq!(config.scroll_wait, Some(250));
        assert_eq!(config.parent_url_param.as_deref(), Some("src"));
        assert_eq!(config.optional_params, None);
    }

    #[test]
    fn parent_config_rejects_wrong_types() {
        assert!(ParentConfig::from_json(r#"{"trackscroll":"yes"}"#).is_err());
    }

    #[test]
    fn attributes_are_typed() {
        let config = ParentConfig::from_attributes([
            ("data-pym-src", "child.html"),
            ("data-pym-title", "Chart"),
            ("data-pym-trackscroll", ""),
            ("data-pym-optionalparams", "false"),
            ("data-pym-allowfullscreen", "no"),
            ("data-pym-scrollwait", " 40 "),
            ("class", "embed"),
        ]);
        assert_eq!(config.title.as_deref(), Some("Chart"));
        assert_eq!(config.track_scroll, Some(true));
        assert_eq!(config.optional_params, Some(false));
        assert_eq!(config.allowfullscreen, Some(true));
        assert_eq!(config.scroll_wait, Some(40));
        assert_eq!(config.xdomain, None);
    }

    #[test]
    fn non_numeric_scrollwait_is_ignored() {
        let config = ParentConfig::from_attributes([("data-pym-scrollwait", "fast")]);
        assert_eq!(config.scroll_wait, None);
        let config = ParentConfig::from_attributes([("data-pym-scrollwait", "")]);
        assert_eq!(config.scroll_wait, Some(0));
        let config = ParentConfig::from_attributes([("data-pym-scrollwait", "-5")]);
        assert_eq!(config.scroll_wait, Some(0));
    }

    #[test]
    fn child_defaults_and_debug() {
        let settings = ChildSettings::from(ChildConfig::default().with_render_callback(|_| {}));
        assert_eq!(settings.xdomain, "*");
        assert_eq!(settings.polling, 0);
        assert_eq!(settings.parent_url_param, "parentUrl");
        let debug = format!("{settings:?}");
        assert!(debug.contains("render_callback: true"));
        assert!(debug.contains("on_marked_embedded_status: false"));
    }

    #[test]
    fn child_config_from_json() {
        let config = ChildConfig::from_json(r#"{"polling":500,"id":"fallback"}"#)
            .expect("config should parse");
        assert_eq!(config.polling, Some(500));
        assert_eq!(config.id.as_deref(), Some("fallback"));
        assert!(config.render_callback.is_none());
    }
}
