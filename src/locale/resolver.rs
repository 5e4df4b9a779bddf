// src/locale/resolver.rs
// Picks the reply language for a request

use tracing::debug;
use url::Url;

use super::LanguageCode;

/// Where a resolved language came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Explicit,
    Referer,
    AcceptLanguage,
    Default,
}

/// Resolves a request's language.
/// Precedence: explicit field > referer path segment > Accept-Language > default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageResolver {
    default: LanguageCode,
}

impl LanguageResolver {
    pub fn new(default: LanguageCode) -> Self {
        Self { default }
    }

    pub fn resolve(
        &self,
        explicit: Option<&str>,
        referer: Option<&str>,
        accept_language: Option<&str>,
    ) -> LanguageCode {
        self.resolve_with_source(explicit, referer, accept_language).0
    }

    pub fn resolve_with_source(
        &self,
        explicit: Option<&str>,
        referer: Option<&str>,
        accept_language: Option<&str>,
    ) -> (LanguageCode, ResolvedFrom) {
        if let Some(code) = explicit.and_then(LanguageCode::normalize) {
            return (code, ResolvedFrom::Explicit);
        }
        if let Some(code) = referer.and_then(from_referer) {
            return (code, ResolvedFrom::Referer);
        }
        if let Some(code) = accept_language.and_then(from_accept_language) {
            return (code, ResolvedFrom::AcceptLanguage);
        }
        debug!("No language hint recognized, using {}", self.default);
        (self.default, ResolvedFrom::Default)
    }
}

/// First path segment of the referer, matched exactly or by its primary subtag.
/// Prefix matching is deliberately not used here: "/kontakt" is not Korean.
fn from_referer(referer: &str) -> Option<LanguageCode> {
    let url = Url::parse(referer).ok()?;
    let segment = url.path_segments()?.find(|s| !s.is_empty())?;
    if let Some(code) = LanguageCode::from_exact(segment) {
        return Some(code);
    }
    let primary = segment.split(['-', '_']).next()?;
    if primary.len() == segment.len() {
        return None;
    }
    LanguageCode::from_exact(primary).or_else(|| match primary.to_uppercase().as_str() {
        "ZH" => Some(LanguageCode::Cn),
        _ => None,
    })
}

/// First tag of an Accept-Language header, e.g. "ko-KR,ko;q=0.9,en;q=0.8" -> KO.
fn from_accept_language(header: &str) -> Option<LanguageCode> {
    let first = header.split(',').next()?;
    let tag = first.split(';').next()?.trim();
    if tag == "*" {
        return None;
    }
    LanguageCode::normalize(tag)
}
