use super::date::HarDate;
use super::entity::{comment_and_custom, FieldReader, HarObject, JsonWriter, ParseContext};
use super::json::JsonObject;
use super::options::ValidationMode;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use url::Url;

/// HAR format version written when the source has none
pub const HAR_VERSION: &str = "1.2";

/// Top-level HAR object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Har<E = Entry> {
    pub log: Log<E>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl<E> Har<E> {
    pub fn new(log: Log<E>) -> Self {
        Self {
            log,
            comment: None,
            custom: JsonObject::new(),
        }
    }
}

impl<E: HarObject> HarObject for Har<E> {
    const FIELDS: &'static [&'static str] = &["log", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            log: r.object("log"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.object("log", &self.log);
    }

    comment_and_custom!();
}

impl<E: HarObject> Serialize for Har<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json(false).serialize(serializer)
    }
}

impl<'de, E: HarObject> Deserialize<'de> for Har<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut cx = ParseContext::new(ValidationMode::default());
        let har = Har::from_value(&value, &mut cx);

        if cx.mode() == ValidationMode::Strict && !cx.anomalies().is_empty() {
            return Err(D::Error::custom(crate::Error::Anomalies(cx.into_anomalies())));
        }
        Ok(har)
    }
}

/// Main HAR log object
#[derive(Debug, Clone, PartialEq)]
pub struct Log<E = Entry> {
    pub version: String,
    pub creator: Creator,
    pub browser: Option<Creator>,
    pub pages: Option<Vec<Page>>,
    pub entries: Vec<E>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl<E> Log<E> {
    pub fn new(creator: Creator, entries: Vec<E>) -> Self {
        Self {
            version: HAR_VERSION.to_string(),
            creator,
            browser: None,
            pages: None,
            entries,
            comment: None,
            custom: JsonObject::new(),
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn with_browser(mut self, browser: Creator) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Look up a page by id
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.as_deref()?.iter().find(|p| p.id == id)
    }
}

impl<E> Default for Log<E> {
    fn default() -> Self {
        Self::new(Creator::default(), Vec::new())
    }
}

impl<E: HarObject> HarObject for Log<E> {
    const FIELDS: &'static [&'static str] = &[
        "version", "creator", "browser", "pages", "entries", "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            version: r.string_or("version", HAR_VERSION),
            creator: r.object("creator"),
            browser: r.opt_object("browser"),
            pages: r.opt_list("pages"),
            entries: r.list("entries"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("version", &self.version);
        w.object("creator", &self.creator);
        w.opt_object("browser", self.browser.as_ref());
        w.opt_list("pages", self.pages.as_deref());
        w.list("entries", &self.entries);
    }

    comment_and_custom!();
}

/// Creator/Browser information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Creator {
    pub name: String,
    pub version: String,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl Creator {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

impl HarObject for Creator {
    const FIELDS: &'static [&'static str] = &["name", "version", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            name: r.string("name"),
            version: r.string("version"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("name", &self.name);
        w.str("version", &self.version);
    }

    comment_and_custom!();
}

/// Page information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub started_date_time: HarDate,
    pub id: String,
    pub title: String,
    pub page_timings: PageTimings,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for Page {
    const FIELDS: &'static [&'static str] =
        &["startedDateTime", "id", "title", "pageTimings", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            started_date_time: r.date("startedDateTime"),
            id: r.string("id"),
            title: r.string("title"),
            page_timings: r.object("pageTimings"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.date("startedDateTime", &self.started_date_time);
        w.str("id", &self.id);
        w.str("title", &self.title);
        w.object("pageTimings", &self.page_timings);
    }

    comment_and_custom!();
}

/// Page timing information. `-1` marks a timing that does not apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTimings {
    pub on_content_load: Option<f64>,
    pub on_load: Option<f64>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for PageTimings {
    const FIELDS: &'static [&'static str] = &["onContentLoad", "onLoad", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            on_content_load: r.opt_millis("onContentLoad"),
            on_load: r.opt_millis("onLoad"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_millis("onContentLoad", self.on_content_load);
        w.opt_millis("onLoad", self.on_load);
    }

    comment_and_custom!();
}

/// Individual HTTP transaction entry.
///
/// Generic over its request, response and timings so extended schemas can
/// reuse the parsing here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry<Rq = Request, Rs = Response, T = Timings> {
    pub page_ref: Option<String>,
    pub started_date_time: HarDate,
    pub time: f64,
    pub request: Rq,
    pub response: Rs,
    pub cache: Cache,
    pub timings: T,
    pub server_ip_address: Option<String>,
    pub connection: Option<String>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl<Rq, Rs, T> Entry<Rq, Rs, T> {
    /// The page this entry belongs to, if any
    pub fn page<'p>(&self, pages: &'p [Page]) -> Option<&'p Page> {
        let page_ref = self.page_ref.as_deref()?;
        pages.iter().find(|p| p.id == page_ref)
    }
}

impl<Rq: HarObject, Rs: HarObject, T: HarObject> HarObject for Entry<Rq, Rs, T> {
    const FIELDS: &'static [&'static str] = &[
        "pageref",
        "startedDateTime",
        "time",
        "request",
        "response",
        "cache",
        "timings",
        "serverIPAddress",
        "connection",
        "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            page_ref: r.opt_string("pageref"),
            started_date_time: r.date("startedDateTime"),
            time: r.millis("time", 0.0),
            request: r.object("request"),
            response: r.object("response"),
            cache: r.object("cache"),
            timings: r.object("timings"),
            server_ip_address: r.opt_string("serverIPAddress"),
            connection: r.opt_string("connection"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_str("pageref", self.page_ref.as_deref());
        w.date("startedDateTime", &self.started_date_time);
        w.millis("time", self.time);
        w.object("request", &self.request);
        w.object("response", &self.response);
        w.object("cache", &self.cache);
        w.object("timings", &self.timings);
        w.opt_str("serverIPAddress", self.server_ip_address.as_deref());
        w.opt_str("connection", self.connection.as_deref());
    }

    comment_and_custom!();
}

/// Read access shared by every entry type, base or extended.
pub trait HarEntry: HarObject {
    fn method(&self) -> &str;

    fn url(&self) -> &str;

    fn status(&self) -> i64;

    fn page_ref(&self) -> Option<&str>;

    fn started_date_time(&self) -> &HarDate;

    /// Total elapsed time in milliseconds
    fn time(&self) -> f64;

    /// Exporter-assigned resource type, when the schema has one
    fn resource_type(&self) -> Option<&str> {
        None
    }
}

impl<C: HarObject, T: HarObject> HarEntry for Entry<Request<C>, Response<C>, T> {
    fn method(&self) -> &str {
        &self.request.method
    }

    fn url(&self) -> &str {
        &self.request.url
    }

    fn status(&self) -> i64 {
        self.response.status
    }

    fn page_ref(&self) -> Option<&str> {
        self.page_ref.as_deref()
    }

    fn started_date_time(&self) -> &HarDate {
        &self.started_date_time
    }

    fn time(&self) -> f64 {
        self.time
    }
}

/// HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct Request<C = Cookie> {
    pub method: String,
    pub url: String,
    pub http_version: String,
    pub cookies: Vec<C>,
    pub headers: Vec<Header>,
    pub query_string: Vec<QueryParam>,
    pub post_data: Option<PostData>,
    pub headers_size: i64,
    pub body_size: i64,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl<C> Request<C> {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// `url` as a parsed URL; the raw string is what gets serialized
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }

    /// First header with the given name, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl<C> Default for Request<C> {
    fn default() -> Self {
        Self {
            method: String::new(),
            url: String::new(),
            http_version: String::new(),
            cookies: Vec::new(),
            headers: Vec::new(),
            query_string: Vec::new(),
            post_data: None,
            headers_size: -1,
            body_size: -1,
            comment: None,
            custom: JsonObject::new(),
        }
    }
}

impl<C: HarObject> HarObject for Request<C> {
    const FIELDS: &'static [&'static str] = &[
        "method",
        "url",
        "httpVersion",
        "cookies",
        "headers",
        "queryString",
        "postData",
        "headersSize",
        "bodySize",
        "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            method: r.string("method"),
            url: r.string("url"),
            http_version: r.string("httpVersion"),
            cookies: r.list("cookies"),
            headers: r.list("headers"),
            query_string: r.list("queryString"),
            post_data: r.opt_object("postData"),
            headers_size: r.int("headersSize", -1),
            body_size: r.int("bodySize", -1),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("method", &self.method);
        w.str("url", &self.url);
        w.str("httpVersion", &self.http_version);
        w.list("cookies", &self.cookies);
        w.list("headers", &self.headers);
        w.list("queryString", &self.query_string);
        w.opt_object("postData", self.post_data.as_ref());
        w.int("headersSize", self.headers_size);
        w.int("bodySize", self.body_size);
    }

    comment_and_custom!();
}

/// HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct Response<C = Cookie> {
    pub status: i64,
    pub status_text: String,
    pub http_version: String,
    pub cookies: Vec<C>,
    pub headers: Vec<Header>,
    pub content: Content,
    pub redirect_url: String,
    pub headers_size: i64,
    pub body_size: i64,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl<C> Response<C> {
    pub fn new(status: i64, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            ..Default::default()
        }
    }

    /// `redirectURL` as a parsed URL, `None` when empty or invalid
    pub fn parsed_redirect_url(&self) -> Option<Url> {
        Url::parse(&self.redirect_url).ok()
    }

    /// First header with the given name, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl<C> Default for Response<C> {
    fn default() -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            http_version: String::new(),
            cookies: Vec::new(),
            headers: Vec::new(),
            content: Content::default(),
            redirect_url: String::new(),
            headers_size: -1,
            body_size: -1,
            comment: None,
            custom: JsonObject::new(),
        }
    }
}

impl<C: HarObject> HarObject for Response<C> {
    const FIELDS: &'static [&'static str] = &[
        "status",
        "statusText",
        "httpVersion",
        "cookies",
        "headers",
        "content",
        "redirectURL",
        "headersSize",
        "bodySize",
        "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            status: r.int("status", 0),
            status_text: r.string("statusText"),
            http_version: r.string("httpVersion"),
            cookies: r.list("cookies"),
            headers: r.list("headers"),
            content: r.object("content"),
            redirect_url: r.string("redirectURL"),
            headers_size: r.int("headersSize", -1),
            body_size: r.int("bodySize", -1),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.int("status", self.status);
        w.str("statusText", &self.status_text);
        w.str("httpVersion", &self.http_version);
        w.list("cookies", &self.cookies);
        w.list("headers", &self.headers);
        w.object("content", &self.content);
        w.str("redirectURL", &self.redirect_url);
        w.int("headersSize", self.headers_size);
        w.int("bodySize", self.body_size);
    }

    comment_and_custom!();
}

fn find_header<'h>(headers: &'h [Header], name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Cookie
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<HarDate>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: impl Into<HarDate>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }
}

impl HarObject for Cookie {
    const FIELDS: &'static [&'static str] = &[
        "name", "value", "path", "domain", "expires", "httpOnly", "secure", "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            name: r.string("name"),
            value: r.string("value"),
            path: r.opt_string("path"),
            domain: r.opt_string("domain"),
            expires: r.opt_date("expires"),
            http_only: r.opt_bool("httpOnly"),
            secure: r.opt_bool("secure"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("name", &self.name);
        w.str("value", &self.value);
        w.opt_str("path", self.path.as_deref());
        w.opt_str("domain", self.domain.as_deref());
        w.opt_date("expires", self.expires.as_ref());
        w.opt_bool("httpOnly", self.http_only);
        w.opt_bool("secure", self.secure);
    }

    comment_and_custom!();
}

/// HTTP header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

impl HarObject for Header {
    const FIELDS: &'static [&'static str] = &["name", "value", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            name: r.string("name"),
            value: r.string("value"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("name", &self.name);
        w.str("value", &self.value);
    }

    comment_and_custom!();
}

/// Query parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

impl HarObject for QueryParam {
    const FIELDS: &'static [&'static str] = &["name", "value", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            name: r.string("name"),
            value: r.string("value"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("name", &self.name);
        w.str("value", &self.value);
    }

    comment_and_custom!();
}

/// POST data. `params` and `text` are both kept when both are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostData {
    pub mime_type: String,
    pub params: Option<Vec<Param>>,
    pub text: Option<String>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for PostData {
    const FIELDS: &'static [&'static str] = &["mimeType", "params", "text", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            mime_type: r.string("mimeType"),
            params: r.opt_list("params"),
            text: r.opt_string("text"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("mimeType", &self.mime_type);
        w.opt_list("params", self.params.as_deref());
        w.opt_str("text", self.text.as_deref());
    }

    comment_and_custom!();
}

/// POST parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for Param {
    const FIELDS: &'static [&'static str] =
        &["name", "value", "fileName", "contentType", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            name: r.string("name"),
            value: r.opt_string("value"),
            file_name: r.opt_string("fileName"),
            content_type: r.opt_string("contentType"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.str("name", &self.name);
        w.opt_str("value", self.value.as_deref());
        w.opt_str("fileName", self.file_name.as_deref());
        w.opt_str("contentType", self.content_type.as_deref());
    }

    comment_and_custom!();
}

/// Response content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    pub size: i64,
    pub compression: Option<i64>,
    pub mime_type: String,
    pub text: Option<String>,
    pub encoding: Option<String>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for Content {
    const FIELDS: &'static [&'static str] = &[
        "size", "compression", "mimeType", "text", "encoding", "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            size: r.int("size", 0),
            compression: r.opt_int("compression"),
            mime_type: r.string("mimeType"),
            text: r.opt_string("text"),
            encoding: r.opt_string("encoding"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.int("size", self.size);
        w.opt_int("compression", self.compression);
        w.str("mimeType", &self.mime_type);
        w.opt_str("text", self.text.as_deref());
        w.opt_str("encoding", self.encoding.as_deref());
    }

    comment_and_custom!();
}

/// Cache information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache {
    pub before_request: Option<CacheEntry>,
    pub after_request: Option<CacheEntry>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for Cache {
    const FIELDS: &'static [&'static str] = &["beforeRequest", "afterRequest", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            before_request: r.opt_object("beforeRequest"),
            after_request: r.opt_object("afterRequest"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_object("beforeRequest", self.before_request.as_ref());
        w.opt_object("afterRequest", self.after_request.as_ref());
    }

    comment_and_custom!();
}

/// Cache entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    pub expires: Option<HarDate>,
    pub last_access: HarDate,
    pub e_tag: String,
    pub hit_count: i64,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for CacheEntry {
    const FIELDS: &'static [&'static str] =
        &["expires", "lastAccess", "eTag", "hitCount", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            expires: r.opt_date("expires"),
            last_access: r.date("lastAccess"),
            e_tag: r.string("eTag"),
            hit_count: r.int("hitCount", 0),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_date("expires", self.expires.as_ref());
        w.date("lastAccess", &self.last_access);
        w.str("eTag", &self.e_tag);
        w.int("hitCount", self.hit_count);
    }

    comment_and_custom!();
}

/// Timing information, in milliseconds.
///
/// The optional phases are `None` when absent and `Some(-1.0)` when they do
/// not apply to the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timings {
    pub blocked: Option<f64>,
    pub dns: Option<f64>,
    pub connect: Option<f64>,
    pub send: f64,
    pub wait: f64,
    pub receive: f64,
    pub ssl: Option<f64>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl Timings {
    /// Sum of the applicable phases. `ssl` is part of `connect` and is not
    /// counted again.
    pub fn total(&self) -> f64 {
        [self.blocked, self.dns, self.connect]
            .into_iter()
            .flatten()
            .chain([self.send, self.wait, self.receive])
            .filter(|t| *t >= 0.0)
            .sum()
    }
}

impl HarObject for Timings {
    const FIELDS: &'static [&'static str] = &[
        "blocked", "dns", "connect", "send", "wait", "receive", "ssl", "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            blocked: r.opt_millis("blocked"),
            dns: r.opt_millis("dns"),
            connect: r.opt_millis("connect"),
            send: r.millis("send", 0.0),
            wait: r.millis("wait", 0.0),
            receive: r.millis("receive", 0.0),
            ssl: r.opt_millis("ssl"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_millis("blocked", self.blocked);
        w.opt_millis("dns", self.dns);
        w.opt_millis("connect", self.connect);
        w.millis("send", self.send);
        w.millis("wait", self.wait);
        w.millis("receive", self.receive);
        w.opt_millis("ssl", self.ssl);
    }

    comment_and_custom!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn lenient() -> ParseContext {
        ParseContext::new(ValidationMode::Lenient)
    }

    fn parse<T: HarObject>(value: Value) -> (T, ParseContext) {
        let mut cx = lenient();
        let parsed = T::from_value(&value, &mut cx);
        (parsed, cx)
    }

    fn keys(map: &JsonObject) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_cookie_vendor_field_survives() {
        let (cookie, cx) = parse::<Cookie>(json!({"name": "a", "value": "b", "_customTool": "x"}));

        assert!(cx.anomalies().is_empty());
        assert_eq!(cookie.custom["_customTool"], json!("x"));

        let out = cookie.to_json(false);
        assert_eq!(out["_customTool"], json!("x"));
        assert_eq!(keys(&out), vec!["name", "value", "_customTool"]);
    }

    #[test]
    fn test_cookie_expires_raw_preserved() {
        let raw = "Sun, 15 Jul 2012 08:00:00 GMT";
        let (cookie, _) = parse::<Cookie>(json!({"name": "a", "value": "b", "expires": raw}));

        let expires = cookie.expires.as_ref().unwrap();
        assert_eq!(
            expires.value(),
            Utc.with_ymd_and_hms(2012, 7, 15, 8, 0, 0).unwrap()
        );
        assert_eq!(cookie.to_json(false)["expires"], json!(raw));
    }

    #[test]
    fn test_timings_whole_numbers_written_as_integers() {
        let timings = Timings {
            blocked: Some(-1.0),
            send: 42.0,
            wait: 42.5,
            receive: 3.0,
            ..Default::default()
        };

        let out = Value::Object(timings.to_json(false)).to_string();
        assert_eq!(out, r#"{"blocked":-1,"send":42,"wait":42.5,"receive":3}"#);
    }

    #[test]
    fn test_timings_include_nulls() {
        let out = Timings::default().to_json(true);
        assert_eq!(
            keys(&out),
            vec!["blocked", "dns", "connect", "send", "wait", "receive", "ssl", "comment"]
        );
        assert_eq!(out["dns"], Value::Null);
        assert_eq!(out["comment"], Value::Null);
    }

    #[test]
    fn test_timings_accept_string_measurements() {
        let (timings, cx) = parse::<Timings>(json!({
            "send": "1.5", "wait": 10, "receive": "0", "dns": -1
        }));

        assert!(cx.anomalies().is_empty());
        assert_eq!(timings.send, 1.5);
        assert_eq!(timings.dns, Some(-1.0));
        assert_eq!(timings.total(), 11.5);
    }

    #[test]
    fn test_headers_drop_non_object_elements() {
        let (request, cx) = parse::<Request>(json!({
            "method": "GET",
            "url": "https://example.com/",
            "httpVersion": "HTTP/1.1",
            "cookies": [],
            "headers": [{"name": "Accept", "value": "*/*"}, "Host: example.com"],
            "queryString": [],
            "headersSize": -1,
            "bodySize": 0
        }));

        assert!(cx.anomalies().is_empty());
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("accept"), Some("*/*"));
        assert_eq!(
            request.parsed_url().unwrap().host_str(),
            Some("example.com")
        );
    }

    #[test]
    fn test_wrong_shape_sub_object_defaults() {
        let (response, cx) = parse::<Response>(json!({
            "status": 200,
            "statusText": "OK",
            "httpVersion": "HTTP/2",
            "cookies": [],
            "headers": [],
            "content": "gzip",
            "redirectURL": "",
            "headersSize": 10,
            "bodySize": 20
        }));

        assert_eq!(response.content, Content::default());
        assert_eq!(response.status, 200);
        let paths: Vec<_> = cx.anomalies().iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["content"]);
    }

    #[test]
    fn test_request_defaults_match_documented_values() {
        let (request, _) = parse::<Request>(json!({}));
        assert_eq!(request, Request::<Cookie>::default());
        assert_eq!(request.headers_size, -1);
        assert_eq!(request.body_size, -1);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_post_data_keeps_text_and_params() {
        let (post, _) = parse::<PostData>(json!({
            "mimeType": "application/x-www-form-urlencoded",
            "text": "a=1",
            "params": [{"name": "a", "value": "1"}]
        }));

        assert_eq!(post.text.as_deref(), Some("a=1"));
        assert_eq!(post.params.as_ref().map(Vec::len), Some(1));

        let out = post.to_json(false);
        assert_eq!(keys(&out), vec!["mimeType", "params", "text"]);
    }

    #[test]
    fn test_entry_round_trip() {
        let entry: Entry = Entry {
            page_ref: Some("page_1".to_string()),
            started_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap().into(),
            time: 120.25,
            request: Request::new("POST", "https://api.example.com/items"),
            response: Response::new(201, "Created"),
            timings: Timings {
                send: 1.0,
                wait: 100.0,
                receive: 19.25,
                ..Default::default()
            },
            server_ip_address: Some("10.0.0.1".to_string()),
            ..Default::default()
        }
        .with_comment(Some("checkout".to_string()));

        let (parsed, cx) = parse::<Entry>(entry.to_value(false));

        assert!(cx.anomalies().is_empty(), "{:?}", cx.anomalies());
        assert_eq!(parsed, entry);
        assert!(parsed.connection.is_none());
    }

    #[test]
    fn test_include_nulls_is_superset() {
        let entry: Entry = Entry::default();
        let minimal = entry.to_json(false);
        let full = entry.to_json(true);

        assert!(minimal.keys().all(|k| full.contains_key(k)));
        assert!(full.contains_key("pageref"));
        assert!(!minimal.contains_key("pageref"));
    }

    /// Every key of `minimal`, at every depth, is also in `full`.
    fn assert_superset(minimal: &Value, full: &Value) {
        match (minimal, full) {
            (Value::Object(min), Value::Object(all)) => {
                for (key, value) in min {
                    let other = all.get(key).unwrap_or_else(|| panic!("{} missing", key));
                    assert_superset(value, other);
                }
            }
            (Value::Array(min), Value::Array(all)) => {
                assert_eq!(min.len(), all.len());
                for (a, b) in min.iter().zip(all) {
                    assert_superset(a, b);
                }
            }
            _ => {}
        }
    }

    fn programmatic_har() -> Har {
        let cookie = Cookie::new("sid", "abc")
            .with_path("/")
            .with_domain("example.com")
            .with_expires(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
            .with_http_only(true)
            .with_secure(true);

        let mut request = Request::new("GET", "https://example.com/login");
        request.http_version = "HTTP/1.1".to_string();
        request.cookies.push(cookie);

        let response = Response {
            redirect_url: "https://example.com/home".to_string(),
            ..Response::new(302, "Found")
        };

        let entry: Entry = Entry {
            started_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap().into(),
            time: 42.0,
            request,
            response,
            ..Default::default()
        };

        let log = Log::new(Creator::new("hartype", "0.1.0"), vec![entry])
            .with_browser(Creator::new("Firefox", "121.0"));
        Har::new(log)
    }

    #[test]
    fn test_programmatic_har_round_trip() {
        let har = programmatic_har();
        let (parsed, cx) = parse::<Har>(har.to_value(false));

        assert!(cx.anomalies().is_empty(), "{:?}", cx.anomalies());
        assert_eq!(parsed, har);

        let entry = &parsed.log.entries[0];
        let cookie = &entry.request.cookies[0];
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert_eq!(cookie.http_only, Some(true));
        assert_eq!(
            cookie.expires.as_ref().map(HarDate::to_har_string).as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
        assert_eq!(
            entry.response.parsed_redirect_url().map(|u| u.path().to_string()),
            Some("/home".to_string())
        );
        assert_eq!(
            parsed.log.browser.as_ref().map(|b| b.name.as_str()),
            Some("Firefox")
        );
    }

    #[test]
    fn test_har_include_nulls_is_superset_at_every_depth() {
        let har = programmatic_har();
        let minimal = har.to_value(false);
        let full = har.to_value(true);

        assert_superset(&minimal, &full);
        let request = full["log"]["entries"][0]["request"].as_object().unwrap();
        assert!(request.get("postData").is_some_and(Value::is_null));
        assert!(full["log"].get("pages").is_some_and(Value::is_null));
        assert!(minimal["log"].get("pages").is_none());
    }

    #[test]
    fn test_numeric_started_date_time_round_trips_as_number() {
        let (entry, cx) = parse::<Entry>(json!({"startedDateTime": 1342339200000_i64}));

        assert!(
            cx.anomalies()
                .iter()
                .all(|a| a.path != "startedDateTime")
        );
        assert_eq!(
            entry.started_date_time.value().to_rfc3339(),
            "2012-07-15T08:00:00+00:00"
        );

        let out = entry.to_json(false);
        assert_eq!(out["startedDateTime"], json!(1342339200000_i64));
    }

    #[test]
    fn test_out_of_range_size_is_a_mismatch() {
        let (request, cx) = parse::<Request>(json!({
            "method": "GET",
            "url": "https://example.com/",
            "httpVersion": "HTTP/1.1",
            "cookies": [],
            "headers": [],
            "queryString": [],
            "headersSize": -1,
            "bodySize": 18446744073709551615_u64
        }));

        assert_eq!(request.body_size, -1);
        let messages: Vec<_> = cx.anomalies().iter().map(|a| a.to_string()).collect();
        assert_eq!(messages, vec!["bodySize: expected integer, found number"]);
    }

    #[test]
    fn test_page_lookup_by_pageref() {
        let page = Page {
            id: "page_2".to_string(),
            title: "Checkout".to_string(),
            ..Default::default()
        };
        let log: Log = Log::new(Creator::new("test", "1.0"), vec![]).with_pages(vec![page]);
        let entry: Entry = Entry {
            page_ref: Some("page_2".to_string()),
            ..Default::default()
        };

        let pages = log.pages.as_deref().unwrap_or_default();
        assert_eq!(entry.page(pages).map(|p| p.title.as_str()), Some("Checkout"));
        assert!(log.page("page_9").is_none());
    }

    #[test]
    fn test_log_defaults_when_empty() {
        let (log, cx) = parse::<Log>(json!({}));

        assert_eq!(log.version, HAR_VERSION);
        assert_eq!(log.creator, Creator::default());
        assert!(log.entries.is_empty());

        let paths: Vec<_> = cx.anomalies().iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["version", "creator", "entries"]);
    }

    #[test]
    fn test_copy_with_keeps_other_fields() {
        let header = Header::new("Accept", "text/html");
        let copy = header.clone().with_comment(Some("from fixture".to_string()));

        assert_eq!(copy.name, header.name);
        assert_eq!(copy.comment(), Some("from fixture"));
        assert!(header.comment.is_none());
    }
}
