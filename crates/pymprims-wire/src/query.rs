//! Query-string helpers for the frame URL.
//!
//! The parent passes the channel id and initial sizing to the child through
//! query parameters on the frame `src`; the child reads them back from its own
//! location.

use std::fmt::Write;

/// Query parameter carrying the container width at construction time.
pub const INITIAL_WIDTH_PARAM: &str = "initialWidth";

/// Query parameter carrying the channel id.
pub const CHILD_ID_PARAM: &str = "childId";

/// Query parameter carrying the parent document title.
pub const PARENT_TITLE_PARAM: &str = "parentTitle";

/// Default name of the query parameter carrying the parent URL.
pub const DEFAULT_PARENT_URL_PARAM: &str = "parentUrl";

/// Optional parent metadata appended to the frame URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentParams {
    /// Parent document title.
    pub title: String,
    /// Name of the parent URL parameter.
    pub url_param: String,
    /// Value of the parent URL parameter.
    pub url_value: String,
}

/// Inputs for the frame `src` a parent builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSrc {
    /// Configured base URL, possibly with a query and a fragment.
    pub base_url: String,
    /// Container width in pixels.
    pub initial_width: i64,
    /// Channel id.
    pub child_id: String,
    /// Parent metadata, when optional parameters are enabled.
    pub parent: Option<ParentParams>,
}

/// Build the frame `src`.
///
/// A fragment on the base URL is moved after the appended parameters.
pub fn build_frame_src(src: &FrameSrc) -> String {
    let (base, fragment) = match src.base_url.find('#') {
        Some(idx) => src.base_url.split_at(idx),
        None => (src.base_url.as_str(), ""),
    };

    let mut url = String::with_capacity(base.len() + fragment.len() + 64);
    url.push_str(base);
    url.push(if base.contains('?') { '&' } else { '?' });

    let _ = write!(
        url,
        "{INITIAL_WIDTH_PARAM}={}&{CHILD_ID_PARAM}={}",
        src.initial_width, src.child_id
    );

    if let Some(parent) = &src.parent {
        let _ = write!(
            url,
            "&{PARENT_TITLE_PARAM}={}&{}={}",
            encode_uri_component(&parent.title),
            parent.url_param,
            encode_uri_component(&parent.url_value)
        );
    }

    url.push_str(fragment);
    url
}

/// Look up a query parameter in a `location.search` string.
///
/// Returns the first occurrence, with `+` read as a space and percent escapes
/// decoded. Malformed escapes are left as they are.
pub fn parameter_by_name(search: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=");

    for (idx, c) in search.char_indices() {
        if c != '?' && c != '&' {
            continue;
        }
        let rest = &search[idx + 1..];
        let Some(value) = rest.strip_prefix(&needle) else {
            continue;
        };
        let end = value.find(['&', '#']).unwrap_or(value.len());
        return Some(decode_uri_component(&value[..end].replace('+', " ")));
    }

    None
}

/// Percent-encode everything except the characters `encodeURIComponent` keeps.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

fn decode_uri_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let hex = input
                .get(idx + 1..idx + 3)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            match hex {
                Some(byte) => {
                    decoded.push(byte);
                    idx += 3;
                    continue;
                }
                None => return input.to_string(),
            }
        }
        decoded.push(bytes[idx]);
        idx += 1;
    }

    String::from_utf8(decoded).unwrap_or_else(|_| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(base_url: &str, parent: Option<ParentParams>) -> FrameSrc {
        FrameSrc {
            base_url: base_url.to_string(),
            initial_width: 800,
            child_id: "example".to_string(),
            parent,
        }
    }

    fn parent_params() -> ParentParams {
        ParentParams {
            title: "News & Notes".to_string(),
            url_param: DEFAULT_PARENT_URL_PARAM.to_string(),
            url_value: "https://host.example/story?id=1".to_string(),
        }
    }

    #[test]
    fn appends_required_params() {
        assert_eq!(
            build_frame_src(&src("child.html", None)),
            "child.html?initialWidth=800&childId=example"
        );
    }

    #[test]
    fn extends_existing_query() {
        assert_eq!(
            build_frame_src(&src("child.html?mode=dark", None)),
            "child.html?mode=dark&initialWidth=800&childId=example"
        );
    }

    #[test]
    fn preserves_fragment_after_params() {
        assert_eq!(
            build_frame_src(&src("child.html?a=1#section-2", Some(parent_params()))),
            "child.html?a=1&initialWidth=800&childId=example\
             &parentTitle=News%20%26%20Notes\
             &parentUrl=https%3A%2F%2Fhost.example%2Fstory%3Fid%3D1#section-2"
        );
    }

    #[test]
    fn custom_parent_url_param() {
        let mut params = parent_params();
        params.url_param = "origin".to_string();
        let url = build_frame_src(&src("c.html", Some(params)));
        assert!(url.contains("&origin=https%3A%2F%2F"));
        assert!(!url.contains("parentUrl="));
    }

    #[test]
    fn reads_parameters_from_search() {
        let search = "?initialWidth=640&childId=graphic-1&parentTitle=News%20%26%20Notes";
        assert_eq!(parameter_by_name(search, "initialWidth").as_deref(), Some("640"));
        assert_eq!(parameter_by_name(search, "childId").as_deref(), Some("graphic-1"));
        assert_eq!(
            parameter_by_name(search, "parentTitle").as_deref(),
            Some("News & Notes")
        );
        assert_eq!(parameter_by_name(search, "missing"), None);
    }

    #[test]
    fn parameter_names_must_follow_a_separator() {
        assert_eq!(parameter_by_name("?xchildId=1", "childId"), None);
        assert_eq!(parameter_by_name("?a=1&childId=2", "childId").as_deref(), Some("2"));
    }

    #[test]
    fn plus_reads_as_space_and_bad_escapes_are_kept() {
        assert_eq!(parameter_by_name("?t=a+b", "t").as_deref(), Some("a b"));
        assert_eq!(parameter_by_name("?t=100%", "t").as_deref(), Some("100%"));
        assert_eq!(parameter_by_name("?t=", "t").as_deref(), Some(""));
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_uri_component("a b&c/d"), "a%20b%26c%2Fd");
        assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn encode_then_parse_returns_original_title() {
        let title = "Élection 2024: results & maps";
        let search = format!("?parentTitle={}", encode_uri_component(title));
        assert_eq!(parameter_by_name(&search, "parentTitle").as_deref(), Some(title));
    }
}
