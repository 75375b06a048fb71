//! Browser DevTools extensions to HAR 1.2.
//!
//! Chromium-based exporters add `_`-prefixed fields to several objects. Each
//! type here wraps its HAR 1.2 counterpart, reads the base fields through it,
//! and claims its own keys so they are not duplicated into `custom`.
//!
//! Objects the exporter does not extend directly (request, log, root) are the
//! generic base types instantiated with the extended cookie and entry types.

use super::date::HarDate;
use super::entity::{
    comment_and_custom, har_enum, FieldReader, HarObject, JsonWriter, ParseContext,
};
use super::json::JsonObject;
use super::reader::HarReader;
use super::types::{Cookie, Entry, Har, HarEntry, Log, Request, Response, Timings};
use crate::Result;
use serde_json::Value;
use std::ops::Deref;

pub type DevToolsRequest = Request<DevToolsCookie>;
pub type DevToolsLog = Log<DevToolsEntry>;
pub type DevToolsHar = Har<DevToolsEntry>;

/// Parse a DevTools HAR document with the default [`super::ParseOptions`].
pub fn parse(text: &str) -> Result<DevToolsHar> {
    HarReader::from_str(text)
}

har_enum! {
    /// Cookie `SameSite` policy
    pub enum SameSite {
        Strict => "Strict",
        Lax => "Lax",
        None => "None",
    }
}

har_enum! {
    /// Resource loading priority
    pub enum Priority {
        VeryLow => "VeryLow",
        Low => "Low",
        Medium => "Medium",
        High => "High",
        VeryHigh => "VeryHigh",
    }
}

har_enum! {
    /// Which cache served a response
    pub enum CacheSource {
        Memory => "memory",
        Disk => "disk",
    }
}

har_enum! {
    pub enum InitiatorType {
        Parser => "parser",
        Script => "script",
        Preload => "preload",
        SignedExchange => "SignedExchange",
        Preflight => "preflight",
        Other => "other",
    }
}

har_enum! {
    pub enum WebSocketMessageType {
        Send => "send",
        Receive => "receive",
    }
}

/// Claimed keys for the wrapped type: ours plus whatever our caller claims.
fn claim<'k>(own: &[&'k str], claimed: &[&'k str]) -> Vec<&'k str> {
    own.iter().chain(claimed).copied().collect()
}

/// `comment` / `custom` live on the wrapped value.
macro_rules! delegate_to_base {
    ($field:ident) => {
        fn comment(&self) -> Option<&str> {
            self.$field.comment()
        }

        fn custom(&self) -> &JsonObject {
            self.$field.custom()
        }

        fn with_comment(self, comment: Option<String>) -> Self {
            Self {
                $field: self.$field.with_comment(comment),
                ..self
            }
        }

        fn with_custom(self, custom: JsonObject) -> Self {
            Self {
                $field: self.$field.with_custom(custom),
                ..self
            }
        }
    };
}

/// Cookie with its `sameSite` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct DevToolsCookie {
    pub cookie: Cookie,
    pub same_site: Option<SameSite>,
}

impl DevToolsCookie {
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

impl From<Cookie> for DevToolsCookie {
    fn from(cookie: Cookie) -> Self {
        Self {
            cookie,
            same_site: None,
        }
    }
}

impl Default for DevToolsCookie {
    fn default() -> Self {
        Cookie::default().into()
    }
}

impl Deref for DevToolsCookie {
    type Target = Cookie;

    fn deref(&self) -> &Cookie {
        &self.cookie
    }
}

impl HarObject for DevToolsCookie {
    const FIELDS: &'static [&'static str] = &["sameSite"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        // Read first: an unrecognized policy is left to the base `custom`
        let mut r = FieldReader::new(obj, cx);
        let same_site = r.opt_enum("sameSite");
        let own = r.claimable(Self::FIELDS);

        Self {
            cookie: Cookie::from_json_claiming(obj, cx, &claim(&own, claimed)),
            same_site,
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        self.cookie.write_fields(w);
        w.opt_enum("sameSite", self.same_site);
    }

    delegate_to_base!(cookie);
}

/// Timings with the breakdown of the `blocked` phase
#[derive(Debug, Clone, PartialEq)]
pub struct DevToolsTimings {
    pub timings: Timings,
    pub blocked_queueing: Option<f64>,
    pub blocked_proxy: Option<f64>,
}

impl From<Timings> for DevToolsTimings {
    fn from(timings: Timings) -> Self {
        Self {
            timings,
            blocked_queueing: None,
            blocked_proxy: None,
        }
    }
}

impl Default for DevToolsTimings {
    fn default() -> Self {
        Timings::default().into()
    }
}

impl Deref for DevToolsTimings {
    type Target = Timings;

    fn deref(&self) -> &Timings {
        &self.timings
    }
}

impl HarObject for DevToolsTimings {
    const FIELDS: &'static [&'static str] = &["_blocked_queueing", "_blocked_proxy"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let timings = Timings::from_json_claiming(obj, cx, &claim(Self::FIELDS, claimed));
        let mut r = FieldReader::new(obj, cx);
        Self {
            timings,
            blocked_queueing: r.opt_millis("_blocked_queueing"),
            blocked_proxy: r.opt_millis("_blocked_proxy"),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        self.timings.write_fields(w);
        w.opt_millis("_blocked_queueing", self.blocked_queueing);
        w.opt_millis("_blocked_proxy", self.blocked_proxy);
    }

    delegate_to_base!(timings);
}

impl From<Request> for DevToolsRequest {
    fn from(request: Request) -> Self {
        Request {
            method: request.method,
            url: request.url,
            http_version: request.http_version,
            cookies: request.cookies.into_iter().map(DevToolsCookie::from).collect(),
            headers: request.headers,
            query_string: request.query_string,
            post_data: request.post_data,
            headers_size: request.headers_size,
            body_size: request.body_size,
            comment: request.comment,
            custom: request.custom,
        }
    }
}

/// Response with on-wire size and network error
#[derive(Debug, Clone, PartialEq)]
pub struct DevToolsResponse {
    pub response: Response<DevToolsCookie>,
    pub transfer_size: Option<i64>,
    pub error: Option<String>,
}

impl From<Response> for DevToolsResponse {
    fn from(response: Response) -> Self {
        let response = Response {
            status: response.status,
            status_text: response.status_text,
            http_version: response.http_version,
            cookies: response.cookies.into_iter().map(DevToolsCookie::from).collect(),
            headers: response.headers,
            content: response.content,
            redirect_url: response.redirect_url,
            headers_size: response.headers_size,
            body_size: response.body_size,
            comment: response.comment,
            custom: response.custom,
        };
        Self {
            response,
            transfer_size: None,
            error: None,
        }
    }
}

impl Default for DevToolsResponse {
    fn default() -> Self {
        Response::<Cookie>::default().into()
    }
}

impl Deref for DevToolsResponse {
    type Target = Response<DevToolsCookie>;

    fn deref(&self) -> &Response<DevToolsCookie> {
        &self.response
    }
}

impl HarObject for DevToolsResponse {
    const FIELDS: &'static [&'static str] = &["_transferSize", "_error"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let response = Response::from_json_claiming(obj, cx, &claim(Self::FIELDS, claimed));
        let mut r = FieldReader::new(obj, cx);
        Self {
            response,
            transfer_size: r.opt_int("_transferSize"),
            error: r.opt_string("_error"),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        self.response.write_fields(w);
        w.opt_int("_transferSize", self.transfer_size);
        w.opt_str("_error", self.error.as_deref());
    }

    delegate_to_base!(response);
}

/// What triggered a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Initiator {
    pub kind: Option<InitiatorType>,
    pub url: Option<String>,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
    pub request_id: Option<String>,
    /// Call stack as exported, kept as raw JSON
    pub stack: Option<Value>,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for Initiator {
    const FIELDS: &'static [&'static str] = &[
        "type",
        "url",
        "lineNumber",
        "columnNumber",
        "requestId",
        "stack",
        "comment",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            kind: r.opt_enum("type"),
            url: r.opt_string("url"),
            line_number: r.opt_int("lineNumber"),
            column_number: r.opt_int("columnNumber"),
            request_id: r.opt_string("requestId"),
            stack: r.opt_value("stack"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_enum("type", self.kind);
        w.opt_str("url", self.url.as_deref());
        w.opt_int("lineNumber", self.line_number);
        w.opt_int("columnNumber", self.column_number);
        w.opt_str("requestId", self.request_id.as_deref());
        w.opt_value("stack", self.stack.as_ref());
    }

    comment_and_custom!();
}

/// One WebSocket frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebSocketMessage {
    pub kind: Option<WebSocketMessageType>,
    /// Seconds since the epoch, as exported
    pub time: f64,
    pub opcode: i64,
    pub data: String,
    pub comment: Option<String>,
    pub custom: JsonObject,
}

impl HarObject for WebSocketMessage {
    const FIELDS: &'static [&'static str] = &["type", "time", "opcode", "data", "comment"];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        Self {
            kind: r.opt_enum("type"),
            time: r.millis("time", 0.0),
            opcode: r.int("opcode", 0),
            data: r.string("data"),
            comment: r.comment(),
            custom: r.custom(Self::FIELDS, claimed),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        w.opt_enum("type", self.kind);
        w.millis("time", self.time);
        w.int("opcode", self.opcode);
        w.str("data", &self.data);
    }

    comment_and_custom!();
}

/// Entry with DevTools request metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevToolsEntry {
    pub entry: Entry<DevToolsRequest, DevToolsResponse, DevToolsTimings>,
    pub priority: Option<Priority>,
    pub resource_type: Option<String>,
    pub from_cache: Option<CacheSource>,
    pub from_service_worker: Option<bool>,
    pub initiator: Option<Initiator>,
    pub web_socket_messages: Option<Vec<WebSocketMessage>>,
    pub connection_id: Option<String>,
}

impl DevToolsEntry {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }
}

impl From<Entry> for DevToolsEntry {
    fn from(entry: Entry) -> Self {
        let entry: Entry<DevToolsRequest, DevToolsResponse, DevToolsTimings> = Entry {
            page_ref: entry.page_ref,
            started_date_time: entry.started_date_time,
            time: entry.time,
            request: entry.request.into(),
            response: entry.response.into(),
            cache: entry.cache,
            timings: entry.timings.into(),
            server_ip_address: entry.server_ip_address,
            connection: entry.connection,
            comment: entry.comment,
            custom: entry.custom,
        };
        Self {
            entry,
            ..Default::default()
        }
    }
}

impl Deref for DevToolsEntry {
    type Target = Entry<DevToolsRequest, DevToolsResponse, DevToolsTimings>;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

impl HarObject for DevToolsEntry {
    const FIELDS: &'static [&'static str] = &[
        "_priority",
        "_resourceType",
        "_fromCache",
        "_fromServiceWorker",
        "_initiator",
        "_webSocketMessages",
        "_connectionId",
    ];

    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self {
        let mut r = FieldReader::new(obj, cx);
        let priority = r.opt_enum("_priority");
        let from_cache = r.opt_enum("_fromCache");
        let own = r.claimable(Self::FIELDS);

        let entry = Entry::from_json_claiming(obj, cx, &claim(&own, claimed));
        let mut r = FieldReader::new(obj, cx);
        Self {
            entry,
            priority,
            resource_type: r.opt_string("_resourceType"),
            from_cache,
            from_service_worker: r.opt_bool("_fromServiceWorker"),
            initiator: r.opt_object("_initiator"),
            web_socket_messages: r.opt_list("_webSocketMessages"),
            connection_id: r.opt_string("_connectionId"),
        }
    }

    fn write_fields(&self, w: &mut JsonWriter) {
        self.entry.write_fields(w);
        w.opt_enum("_priority", self.priority);
        w.opt_str("_resourceType", self.resource_type.as_deref());
        w.opt_enum("_fromCache", self.from_cache);
        w.opt_bool("_fromServiceWorker", self.from_service_worker);
        w.opt_object("_initiator", self.initiator.as_ref());
        w.opt_list("_webSocketMessages", self.web_socket_messages.as_deref());
        w.opt_str("_connectionId", self.connection_id.as_deref());
    }

    delegate_to_base!(entry);
}

impl HarEntry for DevToolsEntry {
    fn method(&self) -> &str {
        &self.entry.request.method
    }

    fn url(&self) -> &str {
        &self.entry.request.url
    }

    fn status(&self) -> i64 {
        self.entry.response.status
    }

    fn page_ref(&self) -> Option<&str> {
        self.entry.page_ref.as_deref()
    }

    fn started_date_time(&self) -> &HarDate {
        &self.entry.started_date_time
    }

    fn time(&self) -> f64 {
        self.entry.time
    }

    fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }
}

impl From<Log> for DevToolsLog {
    fn from(log: Log) -> Self {
        Log {
            version: log.version,
            creator: log.creator,
            browser: log.browser,
            pages: log.pages,
            entries: log.entries.into_iter().map(DevToolsEntry::from).collect(),
            comment: log.comment,
            custom: log.custom,
        }
    }
}

impl From<Har> for DevToolsHar {
    fn from(har: Har) -> Self {
        Har {
            log: har.log.into(),
            comment: har.comment,
            custom: har.custom,
        }
    }
}
