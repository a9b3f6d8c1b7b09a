//! Request descriptors and issuance-time URL formatting.

use url::form_urlencoded;

/// A queued request: the endpoint URL and its position in submission order.
///
/// Locale and credential are not part of the descriptor; they are appended
/// by [`format_request_url`] when the request is actually issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: String,
    index: usize,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Append `locale` and `apikey` query parameters to `url`.
///
/// Empty values are skipped. The join character is `&` when the URL already
/// carries a query string and `?` otherwise.
pub fn format_request_url(url: &str, locale: Option<&str>, api_key: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut appended = false;

    if let Some(locale) = locale.filter(|l| !l.is_empty()) {
        query.append_pair("locale", locale);
        appended = true;
    }
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        query.append_pair("apikey", key);
        appended = true;
    }

    if !appended {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query.finish())
}
