use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use std::io::{self, Cursor, Read};
use tracing::{debug, info, warn};

/// A file part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field name the file was sent under
    pub field: String,
    /// Client-supplied file name
    pub filename: String,
    /// Part `Content-Type`, if sent
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// How a request body is encoded, as far as parameter binding cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    /// `application/x-www-form-urlencoded` or `multipart/form-data`
    Form,
    Other,
}

impl ContentKind {
    /// Classify a `Content-Type` header value.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(ct) = content_type else {
            return ContentKind::Other;
        };
        let mime = ct.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case("application/json") {
            ContentKind::Json
        } else if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded")
            || mime.eq_ignore_ascii_case("multipart/form-data")
        {
            ContentKind::Form
        } else {
            ContentKind::Other
        }
    }
}

/// Transport-independent view of an incoming request.
///
/// Built from a `may_minihttp::Request` by the server, or directly with the
/// builder methods in tests and embedding code.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Vec<u8>,
    form: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

impl HttpRequest {
    /// Create a request for `uri`, splitting off and decoding its query string.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, parse_pairs(query)),
            None => (uri, Vec::new()),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
            body: Vec::new(),
            form: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Add a header. Names or values that are not valid HTTP are dropped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid request header"),
        }
        self
    }

    /// Set the raw body. A urlencoded form body is parsed into form values.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.parse_form_body();
        self
    }

    /// Set a JSON body and its content type.
    #[must_use]
    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    /// Set a urlencoded form body and its content type.
    #[must_use]
    pub fn with_form(self, pairs: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(body)
    }

    /// Attach an uploaded file, as a multipart body would.
    #[must_use]
    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if it is valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Reader over the body bytes.
    #[must_use]
    pub fn body_reader(&self) -> impl Read + '_ {
        Cursor::new(self.body.as_slice())
    }

    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_content_type(self.header(CONTENT_TYPE.as_str()))
    }

    /// Query pairs in request order, repeated names included.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every query value for `name`, in request order.
    pub fn query_values<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.query
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Last query value for `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_values(name).last()
    }

    pub fn form_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.form.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn form_values<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.form
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Uploaded file sent under form field `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == name)
    }

    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    fn parse_form_body(&mut self) {
        let content_type = self.header(CONTENT_TYPE.as_str()).map(str::to_string);
        let Some(content_type) = content_type else {
            return;
        };
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            self.form = parse_pairs(&String::from_utf8_lossy(&self.body));
        } else if mime.eq_ignore_ascii_case("multipart/form-data") {
            match multipart_boundary(&content_type) {
                Some(boundary) => {
                    let (fields, files) = parse_multipart(&self.body, &boundary);
                    self.form = fields;
                    self.files = files;
                }
                None => warn!(content_type = %content_type, "Multipart body without boundary"),
            }
        }
    }

    /// Copy of the request line, query and headers without body or form data.
    #[must_use]
    pub fn head(&self) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: Vec::new(),
            form: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Convert a `may_minihttp` request, reading its body to the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not valid HTTP or the body cannot
    /// be read.
    pub fn from_minihttp(req: may_minihttp::Request) -> io::Result<Self> {
        let method = Method::from_bytes(req.method().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut out = HttpRequest::new(method, req.path());

        for header in req.headers() {
            match (
                HeaderName::from_bytes(header.name.as_bytes()),
                HeaderValue::from_bytes(header.value),
            ) {
                (Ok(name), Ok(value)) => {
                    out.headers.append(name, value);
                }
                _ => debug!(header = %header.name, "Skipping malformed header"),
            }
        }

        let mut body = Vec::new();
        req.body().read_to_end(&mut body)?;
        if !body.is_empty() {
            info!(
                body_size_bytes = body.len(),
                content_type = out.header("content-type").unwrap_or_default(),
                "Request body read"
            );
        }
        out.body = body;
        out.parse_form_body();

        debug!(
            method = %out.method,
            path = %out.path,
            header_count = out.headers.len(),
            query_count = out.query.len(),
            form_count = out.form.len(),
            file_count = out.files.len(),
            "HTTP request parsed"
        );
        Ok(out)
    }
}

fn multipart_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition.split(';').skip(1).find_map(|param| {
        let (k, v) = param.trim().split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
    })
}

/// Split a multipart body into plain fields and file parts.
fn parse_multipart(body: &[u8], boundary: &str) -> (Vec<(String, String)>, Vec<UploadedFile>) {
    let delimiter = format!("--{boundary}");
    let mut fields = Vec::new();
    let mut files = Vec::new();

    let mut rest = match find(body, delimiter.as_bytes()) {
        Some(start) => &body[start + delimiter.len()..],
        None => return (fields, files),
    };

    while !rest.starts_with(b"--") {
        let Some(next) = find(rest, delimiter.as_bytes()) else {
            break;
        };
        let part = rest[..next]
            .strip_prefix(b"\r\n")
            .unwrap_or(&rest[..next]);
        let part = part.strip_suffix(b"\r\n").unwrap_or(part);
        rest = &rest[next + delimiter.len()..];

        let Some(split) = find(part, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&part[..split]);
        let data = &part[split + 4..];

        let mut disposition = None;
        let mut content_type = None;
        for line in head.lines() {
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-disposition") {
                    disposition = Some(value.trim().to_string());
                } else if name.trim().eq_ignore_ascii_case("content-type") {
                    content_type = Some(value.trim().to_string());
                }
            }
        }
        let Some(disposition) = disposition else {
            continue;
        };
        let Some(field) = disposition_param(&disposition, "name") else {
            continue;
        };
        match disposition_param(&disposition, "filename") {
            Some(filename) => files.push(UploadedFile {
                field,
                filename,
                content_type,
                data: data.to_vec(),
            }),
            None => fields.push((field, String::from_utf8_lossy(data).into_owned())),
        }
    }
    (fields, files)
}
