//! Canonical URLs and sitemap generation.
//!
//! Only the document is produced here; writing `sitemap.xml` is up to the caller.

use crate::config::Config;
use crate::directory::Directory;
use crate::label::Label;

/// Canonical URL for a site-relative path
///
/// Paths without a file extension are treated as directories and get a
/// trailing slash.
///
/// ```
/// use venuedir_core::sitemap::canonical_url;
///
/// assert_eq!(canonical_url("https://freiburg.fit", "venue/alpha"), "https://freiburg.fit/venue/alpha/");
/// assert_eq!(canonical_url("https://freiburg.fit/", "/impressum.html"), "https://freiburg.fit/impressum.html");
/// assert_eq!(canonical_url("https://freiburg.fit", "/"), "https://freiburg.fit/");
/// ```
pub fn canonical_url(origin: &str, path: &str) -> String {
    let mut url = origin.trim_end_matches('/').to_string();
    if !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);
    if !path.contains('.') && !path.ends_with('/') {
        url.push('/');
    }
    url
}

/// Ordered list of canonical page URLs
#[derive(Debug, Clone)]
pub struct Sitemap {
    origin: String,
    urls: Vec<String>,
}

impl Sitemap {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            urls: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.site.url.clone())
    }

    /// Add a page by site-relative path; returns its canonical URL
    pub fn push(&mut self, path: &str) -> String {
        let url = canonical_url(&self.origin, path);
        self.urls.push(url.clone());
        url
    }

    /// Add every venue page, then every category page, then (optionally) tag pages
    pub fn extend_from_directory(&mut self, directory: &Directory, include_tags: bool) {
        for venue in directory.venues() {
            self.push(&venue.slug());
        }
        self.extend_labels(directory.categories());
        if include_tags {
            self.extend_labels(directory.tags());
        }
    }

    fn extend_labels(&mut self, labels: &[Label]) {
        for label in labels {
            self.push(&label.slug());
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Render a sitemaps.org 0.9 `urlset` document
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(url)));
            xml.push_str("  </url>\n");
        }
        xml.push_str("</urlset>\n");
        xml
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
