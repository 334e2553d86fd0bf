//! Development reverse proxy.
//!
//! Requests whose path matches a [`ProxyRule`] are replayed against the
//! rule's target with the same method, path, query, headers and body. The
//! upstream response body is streamed back as it arrives.

use std::sync::Arc;

use futures::TryStreamExt;
use poem::{
    handler,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    web::Data,
    Body, EndpointExt, Request, Response,
};
use tracing::{error, info};

pub const DEFAULT_TARGET: &str = "http://localhost:8080";

/// Headers that only make sense for a single connection.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|x| x.eq_ignore_ascii_case(name))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProxyRule {
    pub pattern: String,
    pub target: String,
    pub change_origin: bool,
    /// Prefix replacement applied to the path before forwarding.
    pub rewrite: Option<(String, String)>,
}

impl ProxyRule {
    pub fn new(pattern: &str, target: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
            change_origin: true,
            rewrite: None,
        }
    }

    pub fn with_rewrite(mut self, from: &str, to: &str) -> Self {
        self.rewrite = Some((from.to_string(), to.to_string()));
        self
    }

    /// `/prefix/*` matches anything below `/prefix`, any other pattern
    /// matches paths starting with it.
    pub fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix("/*") {
            Some(prefix) => path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/')),
            None => path.starts_with(self.pattern.as_str()),
        }
    }

    pub fn rewrite_path(&self, path: &str) -> String {
        match &self.rewrite {
            Some((from, to)) => match path.strip_prefix(from.as_str()) {
                Some(rest) => format!("{}{}", to, rest),
                None => path.to_string(),
            },
            None => path.to_string(),
        }
    }

    /// `host[:port]` of the target, used for the rewritten `Host` header.
    pub fn target_authority(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.target).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProxyTable {
    pub rules: Vec<ProxyRule>,
}

impl Default for ProxyTable {
    fn default() -> Self {
        Self::default_rules(DEFAULT_TARGET)
    }
}

impl ProxyTable {
    pub fn default_rules(target: &str) -> Self {
        Self {
            rules: vec![
                ProxyRule::new("/api", target).with_rewrite("/api", "/api"),
                ProxyRule::new("/api/*", target),
                ProxyRule::new("/auth/*", target),
            ],
        }
    }

    /// First matching rule wins.
    pub fn find(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|x| x.matches(path))
    }
}

pub struct DevProxy {
    pub table: ProxyTable,
    pub client: reqwest::Client,
}

impl DevProxy {
    pub fn new(table: ProxyTable) -> Self {
        Self {
            table,
            client: reqwest::Client::new(),
        }
    }

    async fn forward(
        &self,
        rule: &ProxyRule,
        req: &Request,
        body: Body,
    ) -> anyhow::Result<Response> {
        let path = rule.rewrite_path(req.uri().path());
        let url = match req.uri().query() {
            Some(query) => format!("{}{}?{}", rule.target.trim_end_matches('/'), path, query),
            None => format!("{}{}", rule.target.trim_end_matches('/'), path),
        };
        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())?;

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in req.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if name.as_str() == "host" && rule.change_origin {
                continue;
            }
            headers.append(
                reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes())?,
                reqwest::header::HeaderValue::from_bytes(value.as_bytes())?,
            );
        }
        if rule.change_origin {
            if let Some(authority) = rule.target_authority() {
                headers.insert(
                    reqwest::header::HOST,
                    reqwest::header::HeaderValue::from_str(&authority)?,
                );
            }
        }

        let body = body.into_vec().await?;
        let upstream = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let mut resp =
            Response::builder().status(StatusCode::from_u16(upstream.status().as_u16())?);
        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) || name.as_str() == "content-length" {
                continue;
            }
            resp = resp.header(
                HeaderName::from_bytes(name.as_str().as_bytes())?,
                HeaderValue::from_bytes(value.as_bytes())?,
            );
        }
        let stream = upstream.bytes_stream().map_err(std::io::Error::other);
        Ok(resp.body(Body::from_bytes_stream(stream)))
    }
}

#[handler]
pub async fn proxy_handler(req: &Request, body: Body, proxy: Data<&Arc<DevProxy>>) -> Response {
    let path = req.uri().path();
    let Some(rule) = proxy.table.find(path) else {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(format!("no proxy rule for {}", path));
    };
    match proxy.forward(rule, req, body).await {
        Ok(resp) => {
            info!(
                method = %req.method(),
                path,
                upstream = %rule.target,
                status = %resp.status(),
                "proxied"
            );
            resp
        }
        Err(err) => {
            error!(method = %req.method(), path, upstream = %rule.target, "{}", err);
            Response::builder()
                .status(StatusCode::BAD_GATEWAY)
                .body(format!("Proxy error: {}", err))
        }
    }
}

pub fn init_proxy_route(
    proxy: Arc<DevProxy>,
) -> CorsEndpoint<AddDataEndpoint<proxy_handler, Arc<DevProxy>>> {
    proxy_handler.with(AddData::new(proxy)).with(Cors::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use poem::{http::StatusCode, test::TestClient};

    use super::*;

    #[test]
    fn test_rule_matching() {
        let table = ProxyTable::default();
        assert_eq!(table.find("/api").map(|x| x.pattern.as_str()), Some("/api"));
        assert_eq!(
            table.find("/api/job/").map(|x| x.pattern.as_str()),
            Some("/api")
        );
        assert_eq!(
            table.find("/auth/login").map(|x| x.pattern.as_str()),
            Some("/auth/*")
        );
        assert!(table.find("/auth").is_none());
        assert!(table.find("/public/job/").is_none());
        assert!(table.find("/").is_none());
    }

    #[test]
    fn test_wildcard_rule() {
        let rule = ProxyRule::new("/api/*", DEFAULT_TARGET);
        assert!(rule.matches("/api/employee/"));
        assert!(rule.matches("/api/a/b/c"));
        assert!(!rule.matches("/api"));
        assert!(!rule.matches("/apis/x"));
    }

    #[test]
    fn test_rewrite_is_noop_for_api() {
        let table = ProxyTable::default();
        let rule = table.find("/api/user/").unwrap();
        assert_eq!(rule.rewrite_path("/api/user/"), "/api/user/");
        assert_eq!(
            ProxyRule::new("/v1", DEFAULT_TARGET)
                .with_rewrite("/v1", "/api")
                .rewrite_path("/v1/job"),
            "/api/job"
        );
    }

    #[test]
    fn test_target_authority() {
        let rule = ProxyRule::new("/api", DEFAULT_TARGET);
        assert_eq!(rule.target_authority(), Some("localhost:8080".to_string()));
        let rule = ProxyRule::new("/api", "http://backend");
        assert_eq!(rule.target_authority(), Some("backend".to_string()));
    }

    #[test]
    fn test_default_targets() {
        let table = ProxyTable::default();
        assert_eq!(table.rules.len(), 3);
        assert!(table
            .rules
            .iter()
            .all(|x| x.target == "http://localhost:8080" && x.change_origin));
    }

    #[tokio::test]
    async fn test_forward_keeps_path_query_and_body() {
        // Given
        let mut server = mockito::Server::new_async().await;
        let target = server.url();
        let authority = target.trim_start_matches("http://").to_string();
        let mock = server
            .mock("POST", "/api/job/")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .match_header("host", authority.as_str())
            .match_header("authorization", "Bearer abc")
            .match_body(r#"{"title":"Teller"}"#)
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"1"}"#)
            .create_async()
            .await;
        let proxy = Arc::new(DevProxy::new(ProxyTable::default_rules(&target)));
        let cli = TestClient::new(init_proxy_route(proxy));

        // When
        let resp = cli
            .post("/api/job/?page=2")
            .header("authorization", "Bearer abc")
            .header("content-type", "application/json")
            .body(r#"{"title":"Teller"}"#)
            .send()
            .await;

        // Expect
        resp.assert_status(StatusCode::CREATED);
        resp.assert_text(r#"{"id":"1"}"#).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_auth_and_unmatched() {
        // Given
        let mut server = mockito::Server::new_async().await;
        let target = server.url();
        let mock = server
            .mock("POST", "/auth/login")
            .with_status(400)
            .with_body("Invalid credentials")
            .create_async()
            .await;
        let proxy = Arc::new(DevProxy::new(ProxyTable::default_rules(&target)));
        let cli = TestClient::new(init_proxy_route(proxy));

        // When
        let resp = cli.post("/auth/login").send().await;

        // Expect
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_text("Invalid credentials").await;
        mock.assert_async().await;

        // When unmatched
        let resp = cli.get("/dashboard").send().await;

        // Expect unmatched
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_down_is_bad_gateway() {
        // Given
        let proxy = Arc::new(DevProxy::new(ProxyTable::default_rules(
            "http://127.0.0.1:9",
        )));
        let cli = TestClient::new(init_proxy_route(proxy));

        // When
        let resp = cli.get("/api/user/").send().await;

        // Expect
        resp.assert_status(StatusCode::BAD_GATEWAY);
        let text = resp.0.into_body().into_string().await.unwrap();
        assert!(text.starts_with("Proxy error: "));
    }
}
