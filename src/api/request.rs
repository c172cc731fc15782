use std::fmt;
use std::path::Path;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::{HyperproofError, Result};

/// Query parameters, in insertion order.
///
/// Parameters may be recorded without a value; those are left out of the
/// query string entirely, since the API treats "omitted" and "empty" differently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, Option<String>)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.with_opt(key, Some(value))
    }

    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, replacing any earlier value for it.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<impl ToString>) {
        let key = key.into();
        let value = value.map(|value| value.to_string());
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// The parameters that actually get sent.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
            .collect()
    }
}

/// A file to be sent as part of a multipart request.
#[derive(Clone)]
struct FilePart {
    field: String,
    file_name: String,
    contents: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Files plus their sibling text fields.
///
/// Contents are held in memory so a request can be rebuilt and re-sent.
#[derive(Clone, Debug, Default)]
pub struct Multipart {
    files: Vec<FilePart>,
    fields: Vec<(String, Option<String>)>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            contents: contents.into(),
        });
        self
    }

    /// Reads `path` and attaches it under `field`, named after the file.
    pub async fn file_from_path(
        self,
        field: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| HyperproofError::Upload {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(self.file(field, file_name, contents))
    }

    pub fn text(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.text_opt(key, Some(value))
    }

    /// Fields without a value are dropped when the form is built.
    pub fn text_opt(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.fields.push((key.into(), value.map(|value| value.to_string())));
        self
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    fn to_form(&self) -> Form {
        let form = self
            .fields
            .iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key.clone(), value)))
            .fold(Form::new(), |form, (key, value)| form.text(key, value));

        self.files.iter().fold(form, |form, file| {
            let part = Part::bytes(file.contents.clone()).file_name(file.file_name.clone());
            form.part(file.field.clone(), part)
        })
    }
}

/// What gets sent as the request body.
#[derive(Clone, Debug, Default)]
pub enum Body {
    #[default]
    None,
    Json(Value),
    Multipart(Multipart),
}

/// One API call, described independently of any particular attempt at sending it.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub query: QueryParams,
    pub body: Body,
    /// Return the body as text instead of parsing it.
    pub raw: bool,
}

impl RequestSpec {
    /// Targets `base` followed by `path`, e.g. (`.../v1/proof`, `/{id}`).
    pub fn new(method: Method, base: &str, path: &str) -> Self {
        Self {
            method,
            url: format!("{base}{path}"),
            query: QueryParams::default(),
            body: Body::None,
            raw: false,
        }
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn multipart(mut self, multipart: Multipart) -> Self {
        self.body = Body::Multipart(multipart);
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Produces a request ready to execute, with `headers` attached.
    pub(crate) fn build(
        &self,
        http: &reqwest::Client,
        mut headers: HeaderMap,
    ) -> Result<reqwest::Request> {
        let url = Url::parse(&self.url).map_err(|source| HyperproofError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        // Multipart bodies bring their own content type (with the boundary).
        if matches!(self.body, Body::Multipart(_)) {
            headers.remove(CONTENT_TYPE);
        }

        let mut request = http.request(self.method.clone(), url).headers(headers);

        let pairs = self.query.pairs();
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }

        request = match &self.body {
            Body::None => request,
            Body::Json(value) => request.json(value),
            Body::Multipart(multipart) => request.multipart(multipart.to_form()),
        };

        Ok(request.build()?)
    }
}
