use flight::{RouteLoadError, RouteSource};
use gloo_net::http::Request;

/// Route document served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRouteSource {
    url: String,
}

impl HttpRouteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RouteSource for HttpRouteSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, RouteLoadError> {
        let resp = Request::get(&self.url)
            .send()
            .await
            .map_err(|e| RouteLoadError::Fetch(e.to_string()))?;
        if !resp.ok() {
            return Err(RouteLoadError::Fetch(format!(
                "HTTP {} {}",
                resp.status(),
                resp.status_text()
            )));
        }
        resp.text()
            .await
            .map_err(|e| RouteLoadError::Fetch(e.to_string()))
    }
}
