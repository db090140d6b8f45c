use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::{ConnectorsError, Result};

/// HTTP methods supported by [`crate::HttpClient`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Response payload, parsed according to the declared content type.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    /// Body of a response whose content type contains `application/json`.
    Json(serde_json::Value),
    /// Raw body of any other response.
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Json(_) => None,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

/// Normalized response returned for successful requests.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    /// Lower-cased header names; repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl Response {
    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body into `T`.
    ///
    /// A text body is parsed as JSON, so servers that omit the content type
    /// can still be decoded.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let decoded = match &self.body {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(text) => serde_json::from_str(text),
        };
        decoded.map_err(|err| ConnectorsError::Decode(format!("invalid response body: {err}")))
    }
}

pub(crate) fn header_map_to_btree(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reqwest::header::{HeaderMap, HeaderValue};
    use serde::Deserialize;
    use serde_json::json;

    use super::header_map_to_btree;
    use crate::{ConnectorsError, Method, Response, ResponseBody};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        data: String,
    }

    fn response(body: ResponseBody) -> Response {
        Response {
            status: 200,
            headers: BTreeMap::from([("x-request-id".to_owned(), "abc".to_owned())]),
            body,
        }
    }

    #[test]
    fn method_names_and_conversion() {
        assert_eq!(Method::default(), Method::Get);
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("Content-Type", HeaderValue::from_static("text/plain"));

        let map = header_map_to_btree(&headers);
        assert_eq!(map["set-cookie"], "a=1, b=2");
        assert_eq!(map["content-type"], "text/plain");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = response(ResponseBody::Text(String::new()));
        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn json_decodes_structured_and_text_bodies() {
        let structured = response(ResponseBody::Json(json!({"data": "ok"})));
        let text = response(ResponseBody::Text(r#"{"data":"ok"}"#.to_owned()));

        let expected = Payload {
            data: "ok".to_owned(),
        };
        assert_eq!(structured.json::<Payload>().expect("json body"), expected);
        assert_eq!(text.json::<Payload>().expect("text body"), expected);
    }

    #[test]
    fn json_reports_decode_error() {
        let response = response(ResponseBody::Text("not json".to_owned()));
        let err = response.json::<Payload>().expect_err("must fail");
        assert!(matches!(err, ConnectorsError::Decode(_)));
    }

    #[test]
    fn body_accessors() {
        let json = ResponseBody::Json(json!([1, 2]));
        let text = ResponseBody::Text("hi".to_owned());
        assert!(json.is_json());
        assert_eq!(json.as_text(), None);
        assert_eq!(text.as_text(), Some("hi"));
        assert_eq!(text.as_json(), None);
    }
}
