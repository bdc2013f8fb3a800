use shared_types::GTM_DEBUG_QUERY_FLAG;
use url::Url;

use crate::error::{OrchestratorError, Result};

/// The page URL as seen at injection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    href: Url,
}

impl PageLocation {
    pub fn parse(href: &str) -> Result<Self> {
        let href = Url::parse(href).map_err(|_| OrchestratorError::InvalidPageUrl(href.to_string()))?;
        Ok(Self { href })
    }

    /// `scheme://host[:port]`, or `null` for opaque origins.
    pub fn origin(&self) -> String {
        self.href.origin().ascii_serialization()
    }

    /// Set when the tag assistant opens the page with a non-empty `gtm_debug`.
    pub fn is_gtm_debug(&self) -> bool {
        self.href
            .query_pairs()
            .find(|(key, _)| key == GTM_DEBUG_QUERY_FLAG)
            .is_some_and(|(_, value)| !value.is_empty())
    }
}
