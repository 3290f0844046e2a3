//! Request classification.
//!
//! Every inbound request maps to exactly one [`RequestKind`], decided once at
//! entry. Checks run in a fixed order: preflight, method, `target`, `types`,
//! static.

use axum::http::{Method, Uri};

use crate::routing::QueryParams;

/// What the server will do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `OPTIONS`, any path.
    Preflight,
    /// Anything other than GET, HEAD or OPTIONS.
    MethodNotAllowed(Method),
    /// Non-empty `target` parameter.
    Audio { target: String },
    /// `types` parameter present.
    Api { params: QueryParams },
    /// Everything else, served from the static root.
    Static { path: String },
}

impl RequestKind {
    pub fn classify(method: &Method, uri: &Uri) -> Self {
        if method == Method::OPTIONS {
            return RequestKind::Preflight;
        }
        if method != Method::GET && method != Method::HEAD {
            return RequestKind::MethodNotAllowed(method.clone());
        }

        let params = QueryParams::parse(uri.query());
        if let Some(target) = params.non_empty("target") {
            return RequestKind::Audio {
                target: target.to_string(),
            };
        }
        if params.contains("types") {
            return RequestKind::Api { params };
        }

        RequestKind::Static {
            path: uri.path().to_string(),
        }
    }

    /// Metric and log label.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Preflight => "preflight",
            RequestKind::MethodNotAllowed(_) => "rejected",
            RequestKind::Audio { .. } => "audio",
            RequestKind::Api { .. } => "api",
            RequestKind::Static { .. } => "static",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(method: Method, uri: &str) -> RequestKind {
        RequestKind::classify(&method, &uri.parse().unwrap())
    }

    #[test]
    fn test_preflight_any_path() {
        assert_eq!(classify(Method::OPTIONS, "/"), RequestKind::Preflight);
        assert_eq!(
            classify(Method::OPTIONS, "/anything?target=http://kuwo.cn/a"),
            RequestKind::Preflight
        );
    }

    #[test]
    fn test_method_not_allowed() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert_eq!(
                classify(method.clone(), "/?types=search"),
                RequestKind::MethodNotAllowed(method)
            );
        }
    }

    #[test]
    fn test_target_wins_over_types() {
        let kind = classify(
            Method::GET,
            "/?types=url&target=http%3A%2F%2Fsycdn.kuwo.cn%2Fa.mp3",
        );
        assert_eq!(
            kind,
            RequestKind::Audio {
                target: "http://sycdn.kuwo.cn/a.mp3".into()
            }
        );
    }

    #[test]
    fn test_head_relays_like_get() {
        assert_eq!(
            classify(Method::HEAD, "/?target=http://kuwo.cn/a.mp3").label(),
            "audio"
        );
    }

    #[test]
    fn test_empty_target_falls_through() {
        assert_eq!(classify(Method::GET, "/?target=").label(), "static");
        assert_eq!(classify(Method::GET, "/?target=&types=search").label(), "api");
    }

    #[test]
    fn test_api_on_types_presence() {
        match classify(Method::GET, "/api?types=search&source=netease&name=a+b") {
            RequestKind::Api { params } => {
                assert_eq!(params.get("types"), Some("search"));
                assert_eq!(params.get("name"), Some("a b"));
            }
            other => panic!("expected api, got {other:?}"),
        }
        assert_eq!(classify(Method::GET, "/?types=").label(), "api");
    }

    #[test]
    fn test_static_fallback() {
        assert_eq!(
            classify(Method::GET, "/script.js?v=3"),
            RequestKind::Static {
                path: "/script.js".into()
            }
        );
        assert_eq!(
            classify(Method::GET, "/?source=netease&id=1"),
            RequestKind::Static { path: "/".into() }
        );
    }
}
