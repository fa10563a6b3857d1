//! Payload construction.
//!
//! Maps a content type plus its loosely-typed field map onto the canonical string a scanner
//! recovers from the symbol: URLs, vCard and calendar records, WiFi credentials and the
//! various `scheme:` URIs. Encoding never fails; missing or malformed fields degrade to empty
//! strings or placeholders so interactive previews keep rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder encoded when a redirectable type has no URL yet.
pub const PLACEHOLDER_URL: &str = "https://example.com";

/// Characters left untouched, matching `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Width of a calendar timestamp: `yyyymmddThhmmss`.
const CALENDAR_STAMP_LEN: usize = 15;

/// The kind of content a symbol carries.
///
/// The first group encodes its literal content and is never routed through a tracking
/// redirect. The presentation types only carry content rendered elsewhere; in the payload they
/// behave like websites.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Website,
    Social,
    Video,
    VCard,
    Wifi,
    Email,
    Sms,
    Phone,
    Text,
    WhatsApp,
    Calendar,
    Bitcoin,
    Menu,
    Business,
    Coupon,
    SocialLinks,
    Pdf,
    App,
    Images,
    Mp3,
    Links,
    Feedback,
    Rating,
    EventPage,
    Landing,
    /// Anything the engine does not recognise.
    Other(String),
}

impl ContentType {
    /// Types whose payload is the literal content, never a redirect.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            ContentType::VCard
                | ContentType::Wifi
                | ContentType::Email
                | ContentType::Sms
                | ContentType::Phone
                | ContentType::Text
                | ContentType::Bitcoin
                | ContentType::Calendar
                | ContentType::WhatsApp
        )
    }

    /// Canonical tag, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Website => "website",
            ContentType::Social => "social",
            ContentType::Video => "video",
            ContentType::VCard => "vcard",
            ContentType::Wifi => "wifi",
            ContentType::Email => "email",
            ContentType::Sms => "sms",
            ContentType::Phone => "phone",
            ContentType::Text => "text",
            ContentType::WhatsApp => "whatsapp",
            ContentType::Calendar => "calendar",
            ContentType::Bitcoin => "bitcoin",
            ContentType::Menu => "menu",
            ContentType::Business => "business",
            ContentType::Coupon => "coupon",
            ContentType::SocialLinks => "social-links",
            ContentType::Pdf => "pdf",
            ContentType::App => "app",
            ContentType::Images => "images",
            ContentType::Mp3 => "mp3",
            ContentType::Links => "links",
            ContentType::Feedback => "feedback",
            ContentType::Rating => "rating",
            ContentType::EventPage => "event-page",
            ContentType::Landing => "landing",
            ContentType::Other(tag) => tag,
        }
    }
}

impl FromStr for ContentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        Ok(match tag.as_str() {
            "website" | "url" | "link" => ContentType::Website,
            "social" => ContentType::Social,
            "video" | "youtube" => ContentType::Video,
            "vcard" | "contact" => ContentType::VCard,
            "wifi" => ContentType::Wifi,
            "email" | "mail" => ContentType::Email,
            "sms" => ContentType::Sms,
            "phone" | "tel" | "call" => ContentType::Phone,
            "text" | "plaintext" => ContentType::Text,
            "whatsapp" => ContentType::WhatsApp,
            "calendar" | "event" => ContentType::Calendar,
            "bitcoin" | "crypto" => ContentType::Bitcoin,
            "menu" => ContentType::Menu,
            "business" | "businesspage" => ContentType::Business,
            "coupon" => ContentType::Coupon,
            "sociallinks" | "socialmedia" => ContentType::SocialLinks,
            "pdf" => ContentType::Pdf,
            "app" | "apps" => ContentType::App,
            "images" | "gallery" => ContentType::Images,
            "mp3" | "audio" => ContentType::Mp3,
            "links" | "listoflinks" => ContentType::Links,
            "feedback" => ContentType::Feedback,
            "rating" => ContentType::Rating,
            "eventpage" => ContentType::EventPage,
            "landing" | "landingpage" => ContentType::Landing,
            _ => ContentType::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ct) => ct,
            Err(never) => match never {},
        }
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        ct.as_str().to_string()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open, string-keyed field map. Absent fields read as the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContentFields(BTreeMap<String, String>);

impl ContentFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the trimmed field value, or `""` if absent.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(|v| v.trim()).unwrap_or("")
    }

    /// First non-empty value among `keys`.
    fn first_of(&self, keys: &[&str]) -> &str {
        keys.iter().map(|k| self.get(k)).find(|v| !v.is_empty()).unwrap_or("")
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.get(key).to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContentFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for ContentFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Number(n) => n.to_string(),
                    // Nested structures belong to presentation types and never reach a payload.
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect();
        Ok(Self(fields))
    }
}

/// Builds the string to be encoded into the symbol.
///
/// When `tracking_slug` is set and the type is redirectable, the payload is
/// `{origin}/r/{slug}` so the scan can be recorded before forwarding.
///
/// # Arguments
///
/// * `content_type` - What the symbol carries.
/// * `fields` - Semantic fields for that type.
/// * `tracking_slug` - Optional short id assigned by the persistence layer.
/// * `origin` - Scheme and host used for tracking redirects.
///
/// # Example
///
/// ```rust
/// use qirust_studio::payload::{encode_payload, ContentFields, ContentType};
///
/// let fields = ContentFields::new()
///     .with("ssid", "CafeNet")
///     .with("password", "brew1234")
///     .with("encryption", "WPA");
/// let payload = encode_payload(&ContentType::Wifi, &fields, None, "https://example.com");
/// assert_eq!(payload, "WIFI:T:WPA;S:CafeNet;P:brew1234;;");
/// ```
pub fn encode_payload(
    content_type: &ContentType,
    fields: &ContentFields,
    tracking_slug: Option<&str>,
    origin: &str,
) -> String {
    if let Some(slug) = tracking_slug.map(str::trim).filter(|s| !s.is_empty()) {
        if !content_type.is_static() {
            return format!("{}/r/{}", origin.trim_end_matches('/'), slug);
        }
    }

    match content_type {
        ContentType::VCard => vcard(fields),
        ContentType::Wifi => wifi(fields),
        ContentType::Email => email(fields),
        ContentType::Sms => sms(fields),
        ContentType::Phone => format!("tel:{}", fields.first_of(&["phone", "number"])),
        ContentType::WhatsApp => whatsapp(fields),
        ContentType::Calendar => calendar(fields),
        ContentType::Bitcoin => bitcoin(fields),
        ContentType::Text => fields.first_of(&["text", "content"]).to_string(),
        _ => url_or_placeholder(fields),
    }
}

fn url_or_placeholder(fields: &ContentFields) -> String {
    match fields.get("url") {
        "" => PLACEHOLDER_URL.to_string(),
        url => url.to_string(),
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Appends `key=value` pairs with non-empty values as a query string.
fn with_query(base: String, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={}", encode_component(v)))
        .collect();
    if query.is_empty() {
        base
    } else {
        format!("{base}?{}", query.join("&"))
    }
}

fn vcard(fields: &ContentFields) -> String {
    let first = fields.get("firstName");
    let last = fields.get("lastName");
    let full_name = [first, last].iter().filter(|s| !s.is_empty()).copied().collect::<Vec<_>>().join(" ");

    let mut lines = vec!["BEGIN:VCARD".to_string(), "VERSION:3.0".to_string()];
    if !full_name.is_empty() {
        lines.push(format!("N:{last};{first}"));
        lines.push(format!("FN:{full_name}"));
    }
    let simple = [
        ("ORG", fields.first_of(&["organization", "company"])),
        ("TITLE", fields.first_of(&["title", "jobTitle"])),
        ("TEL", fields.first_of(&["phone", "mobile"])),
        ("EMAIL", fields.get("email")),
        ("URL", fields.first_of(&["website", "url"])),
    ];
    for (tag, value) in simple {
        if !value.is_empty() {
            lines.push(format!("{tag}:{value}"));
        }
    }
    let address = [
        fields.get("street"),
        fields.get("city"),
        fields.get("state"),
        fields.get("zip"),
        fields.get("country"),
    ];
    if address.iter().any(|part| !part.is_empty()) {
        lines.push(format!("ADR:;;{}", address.join(";")));
    }
    if !fields.get("note").is_empty() {
        lines.push(format!("NOTE:{}", fields.get("note")));
    }
    lines.push("END:VCARD".to_string());
    lines.join("\n")
}

/// Backslash-escapes the characters reserved by the WiFi record format.
fn wifi_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn wifi(fields: &ContentFields) -> String {
    let auth = match fields.first_of(&["encryption", "security"]) {
        "" => "WPA",
        other => other,
    };
    let mut record = format!(
        "WIFI:T:{auth};S:{};P:{};",
        wifi_escape(fields.get("ssid")),
        wifi_escape(fields.get("password"))
    );
    if fields.flag("hidden") {
        record.push_str("H:true;");
    }
    record.push(';');
    record
}

fn email(fields: &ContentFields) -> String {
    with_query(
        format!("mailto:{}", fields.first_of(&["email", "to"])),
        &[("subject", fields.get("subject")), ("body", fields.first_of(&["body", "message"]))],
    )
}

fn sms(fields: &ContentFields) -> String {
    with_query(
        format!("sms:{}", fields.first_of(&["phone", "number"])),
        &[("body", fields.first_of(&["message", "body"]))],
    )
}

fn whatsapp(fields: &ContentFields) -> String {
    let digits: String = fields.first_of(&["phone", "number"]).chars().filter(char::is_ascii_digit).collect();
    with_query(format!("https://wa.me/{digits}"), &[("text", fields.first_of(&["message", "text"]))])
}

/// Normalises a datetime such as `2024-05-01T10:00` to `20240501T100000`.
fn calendar_stamp(raw: &str) -> String {
    let mut stamp: String = raw.chars().filter(|c| !matches!(c, '-' | ':')).collect();
    if stamp.contains('T') {
        while stamp.len() < CALENDAR_STAMP_LEN {
            stamp.push('0');
        }
    }
    stamp.chars().take(CALENDAR_STAMP_LEN).collect()
}

fn calendar(fields: &ContentFields) -> String {
    let mut lines = vec!["BEGIN:VEVENT".to_string()];
    lines.push(format!("SUMMARY:{}", fields.first_of(&["title", "summary"])));
    lines.push(format!("DTSTART:{}", calendar_stamp(fields.get("startDate"))));
    lines.push(format!("DTEND:{}", calendar_stamp(fields.get("endDate"))));
    for (tag, key) in [("LOCATION", "location"), ("DESCRIPTION", "description")] {
        if !fields.get(key).is_empty() {
            lines.push(format!("{tag}:{}", fields.get(key)));
        }
    }
    lines.push("END:VEVENT".to_string());
    lines.join("\n")
}

fn bitcoin(fields: &ContentFields) -> String {
    let address = fields.first_of(&["address", "wallet"]);
    if address.is_empty() {
        return "bitcoin:".to_string();
    }
    with_query(
        format!("bitcoin:{address}"),
        &[
            ("amount", fields.get("amount")),
            ("label", fields.get("label")),
            ("message", fields.get("message")),
        ],
    )
}
