//! Request and response values exchanged with the HTTP adaptor.

use std::collections::BTreeMap;

/// An incoming request, already decoded by the adaptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    form_values: BTreeMap<String, Vec<String>>,
    headers: BTreeMap<String, Vec<String>>,
    cookies: BTreeMap<String, Vec<String>>,
}

impl Request {
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    #[must_use]
    pub fn with_form_value(mut self, name: &str, value: &str) -> Self {
        self.form_values
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All values submitted under `name`. Empty when the field was not sent.
    #[must_use]
    pub fn form_values(&self, name: &str) -> &[String] {
        self.form_values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn has_form_value(&self, name: &str) -> bool {
        self.form_values.contains_key(name)
    }

    #[must_use]
    pub fn form_value_keys(&self) -> impl Iterator<Item = &str> {
        self.form_values.keys().map(String::as_str)
    }

    /// Header names are case-insensitive.
    #[must_use]
    pub fn headers(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// An outgoing response. Content is append-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: BTreeMap<String, Vec<String>>,
    cookies: BTreeMap<String, String>,
    content: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            content: String::new(),
        }
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// A response that sends the client somewhere else.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new().with_status(302);
        response.set_header("location", location);
        response
    }

    pub fn append_content_string(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Replaces any earlier values for `name`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), vec![value.to_string()]);
    }

    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_valued_form() {
        let request = Request::post("/wo/1.0")
            .with_form_value("tag", "a")
            .with_form_value("tag", "b");
        assert_eq!(request.form_values("tag"), ["a", "b"]);
        assert!(request.form_values("missing").is_empty());
        assert!(request.has_form_value("tag"));
        assert_eq!(request.method(), "POST");
    }

    #[test]
    fn test_headers_ignore_case() {
        let request = Request::get("/").with_header("Accept", "text/html");
        assert_eq!(request.headers("accept"), ["text/html"]);
    }

    #[test]
    fn test_response_builds_content() {
        let mut response = Response::new();
        response.append_content_string("<p>");
        response.append_content_string("</p>");
        response.append_header("Set-Thing", "1");
        response.append_header("set-thing", "2");
        assert_eq!(response.content(), "<p></p>");
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("SET-THING"), Some("1"));
    }

    #[test]
    fn test_redirect() {
        let response = Response::redirect("/login");
        assert_eq!(response.status(), 302);
        assert_eq!(response.header("Location"), Some("/login"));
    }
}
