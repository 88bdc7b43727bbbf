//! HTTP transport for STRATO node APIs.
//!
//! A thin layer over [`reqwest`]: it joins the node url with an already
//! composed path, attaches headers from [`Options`], completes JSON bodies
//! with [`compose_body`] and turns non-2xx answers into [`Error::Http`].

use crate::error::{Error, Result};
use crate::options::Options;
use crate::transactions::compose_body;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload<'a> {
    /// No body
    Empty,
    /// JSON body, completed with transaction parameters
    Json(Value),
    /// `application/x-www-form-urlencoded` body
    Form(&'a [(&'a str, &'a str)]),
}

/// Response with headers preserved.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed body: JSON if possible, string otherwise
    pub data: Value,
}

/// A simple HTTP REST client for STRATO nodes.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    }
}

fn header_map(options: &Options) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidHeader(format!("{name}: <invalid value>")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    //! Append `path` (with query) to the node url, keeping any path prefix
    //! the node url has.
    Ok(Url::parse(&format!(
        "{}{}",
        base.as_str().trim_end_matches('/'),
        path
    ))?)
}

impl HttpTransport {
    pub fn new() -> Self {
        //! Transport with a default [`Client`].
        Self::default()
    }

    pub const fn with_client(client: Client) -> Self {
        //! Transport reusing a preconfigured [`Client`] (timeouts, proxies, TLS).
        Self { client }
    }

    async fn send(
        &self,
        method: Method,
        base: &Url,
        path: &str,
        options: &Options,
        payload: Payload<'_>,
    ) -> Result<HttpResponse> {
        let url = join_url(base, path)?;
        if options.config.api_debug {
            debug!(%method, %url, "sending request");
        } else {
            trace!(%method, %url, "sending request");
        }
        let request = self
            .client
            .request(method, url.clone())
            .headers(header_map(options)?);
        let request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&compose_body(body, options)?),
            Payload::Form(form) => request.form(form),
        };
        let response = request.send().await?;
        Self::normalize(url, response).await
    }

    async fn normalize(url: Url, response: Response) -> Result<HttpResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let data = parse_body(&response.text().await?);
        debug!(%url, status = status.as_u16(), "received response");
        if status.is_success() {
            Ok(HttpResponse {
                status: status.as_u16(),
                headers,
                data,
            })
        } else {
            Err(Error::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                data,
            })
        }
    }

    pub async fn get(&self, base: &Url, path: &str, options: &Options) -> Result<Value> {
        //! `GET` and return the parsed body.
        Ok(self.get_response(base, path, options).await?.data)
    }

    pub async fn get_response(
        &self,
        base: &Url,
        path: &str,
        options: &Options,
    ) -> Result<HttpResponse> {
        //! `GET` and return the full response.
        self.send(Method::GET, base, path, options, Payload::Empty)
            .await
    }

    pub async fn post(
        &self,
        base: &Url,
        path: &str,
        body: Option<Value>,
        options: &Options,
    ) -> Result<Value> {
        //! `POST` a JSON body.
        let payload = body.map_or(Payload::Empty, Payload::Json);
        Ok(self
            .send(Method::POST, base, path, options, payload)
            .await?
            .data)
    }

    pub async fn post_urlencoded(
        &self,
        base: &Url,
        path: &str,
        form: &[(&str, &str)],
        options: &Options,
    ) -> Result<Value> {
        //! `POST` an url-encoded form.
        Ok(self
            .send(Method::POST, base, path, options, Payload::Form(form))
            .await?
            .data)
    }

    pub async fn put(
        &self,
        base: &Url,
        path: &str,
        body: Option<Value>,
        options: &Options,
    ) -> Result<Value> {
        //! `PUT` a JSON body.
        let payload = body.map_or(Payload::Empty, Payload::Json);
        Ok(self
            .send(Method::PUT, base, path, options, payload)
            .await?
            .data)
    }

    pub async fn put_urlencoded(
        &self,
        base: &Url,
        path: &str,
        form: &[(&str, &str)],
        options: &Options,
    ) -> Result<Value> {
        //! `PUT` an url-encoded form.
        Ok(self
            .send(Method::PUT, base, path, options, Payload::Form(form))
            .await?
            .data)
    }

    pub async fn delete(
        &self,
        base: &Url,
        path: &str,
        body: Option<Value>,
        options: &Options,
    ) -> Result<Value> {
        //! `DELETE`, optionally with a JSON body.
        let payload = body.map_or(Payload::Empty, Payload::Json);
        Ok(self
            .send(Method::DELETE, base, path, options, payload)
            .await?
            .data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_url_keeps_prefix() {
        let base: Url = "http://localhost:8080/bloc/v2.2/".parse().unwrap();
        assert_eq!(
            join_url(&base, "/users/alice?resolve=true").unwrap().as_str(),
            "http://localhost:8080/bloc/v2.2/users/alice?resolve=true"
        );
    }

    #[test]
    fn test_parse_body_falls_back_to_string() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("[1]"), serde_json::json!([1]));
        assert_eq!(parse_body("not json"), Value::String("not json".to_string()));
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let options = Options::default().with_header("bad header", "x");
        assert!(matches!(header_map(&options), Err(Error::InvalidHeader(_))));
    }
}
