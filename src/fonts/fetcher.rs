//! Font family download
//!
//! Each family costs two requests: the stylesheet, fetched with the
//! configured user agent, and the font file it points to. Families are
//! processed independently; a failure is recorded in that family's
//! [`FamilyReport`] and the next family is still attempted.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;

use super::{convert_to_truetype, FontFormat, FontSource};
use crate::config::LEGACY_USER_AGENT;
use crate::errors::FontError;
use crate::layout::ThemeLayout;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static! {
    static ref FONT_SRC_RE: Regex =
        Regex::new(r"src:\s*url\(([^)]+)\)").expect("font src regex is valid");
}

/// HTTP access used by [`FontFetcher`]
pub trait FontTransport {
    /// GET a stylesheet, sending `user_agent`
    fn fetch_stylesheet(&self, url: &str, user_agent: &str) -> Result<String, FontError>;

    /// GET a binary resource with the client's default headers
    fn fetch_binary(&self, url: &str) -> Result<Vec<u8>, FontError>;
}

/// Blocking transport over `ureq`
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    fn get(&self, url: &str, user_agent: Option<&str>) -> Result<ureq::Response, FontError> {
        let mut request = self.agent.get(url);
        if let Some(user_agent) = user_agent {
            request = request.set("User-Agent", user_agent);
        }
        request.call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FontError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FontError::Http {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FontTransport for UreqTransport {
    fn fetch_stylesheet(&self, url: &str, user_agent: &str) -> Result<String, FontError> {
        Ok(self.get(url, Some(user_agent))?.into_string()?)
    }

    fn fetch_binary(&self, url: &str) -> Result<Vec<u8>, FontError> {
        let mut bytes = Vec::new();
        self.get(url, None)?.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// First `src: url(...)` target in a stylesheet, without quotes
pub fn extract_font_url(css: &str) -> Option<String> {
    FONT_SRC_RE
        .captures(css)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|url| !url.is_empty())
}

/// Result of processing one family
#[derive(Debug)]
pub enum FontOutcome {
    /// A TrueType file is in place
    Ready(PathBuf),
    /// Downloaded, but conversion failed; the download is kept at `path`
    Unconverted { path: PathBuf, error: FontError },
    /// Nothing usable was written
    Failed(FontError),
}

/// Per-family entry of [`FontFetcher::fetch_all`]
#[derive(Debug)]
pub struct FamilyReport {
    pub family: String,
    pub outcome: FontOutcome,
}

impl FamilyReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FontOutcome::Ready(_))
    }
}

/// Downloads font families into a theme's `fonts/` directory
pub struct FontFetcher<T: FontTransport> {
    transport: T,
    layout: ThemeLayout,
    user_agent: String,
}

impl<T: FontTransport> FontFetcher<T> {
    pub fn new(transport: T, layout: ThemeLayout) -> Self {
        Self {
            transport,
            layout,
            user_agent: LEGACY_USER_AGENT.to_string(),
        }
    }

    /// Set the user agent sent with stylesheet requests
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch every family, in order, isolating failures
    pub fn fetch_all(&self, sources: &[FontSource]) -> Vec<FamilyReport> {
        sources
            .iter()
            .map(|source| FamilyReport {
                family: source.family.clone(),
                outcome: self.fetch_family(source),
            })
            .collect()
    }

    /// Fetch one family and leave a TrueType file behind when possible
    pub fn fetch_family(&self, source: &FontSource) -> FontOutcome {
        match self.download(source) {
            Ok((path, data, format)) => self.convert(source, path, &data, format),
            Err(e) => {
                log::error!("Error downloading {}: {}", source.family, e);
                FontOutcome::Failed(e)
            }
        }
    }

    fn download(&self, source: &FontSource) -> Result<(PathBuf, Vec<u8>, FontFormat), FontError> {
        log::info!("Fetching CSS for {}...", source.family);
        let css = self
            .transport
            .fetch_stylesheet(&source.stylesheet_url, &self.user_agent)?;

        let font_url = extract_font_url(&css).ok_or_else(|| FontError::MissingFontUrl {
            family: source.family.clone(),
        })?;

        log::info!("Downloading font from {}...", font_url);
        let data = self.transport.fetch_binary(&font_url)?;

        let format = FontFormat::from_url(&font_url);
        fs::create_dir_all(self.layout.fonts_dir())?;
        let path = self.layout.font_path(&source.family, format.extension());
        fs::write(&path, &data)?;
        log::info!("Saved {}", path.display());

        Ok((path, data, format))
    }

    fn convert(
        &self,
        source: &FontSource,
        path: PathBuf,
        data: &[u8],
        format: FontFormat,
    ) -> FontOutcome {
        if !format.needs_conversion() {
            return FontOutcome::Ready(path);
        }

        log::info!("Converting {} to TTF...", format.extension().to_uppercase());
        let ttf_path = self.layout.font_path(&source.family, FontFormat::Ttf.extension());
        let result = convert_to_truetype(data, format)
            .and_then(|ttf| fs::write(&ttf_path, ttf).map_err(FontError::from));

        match result {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Could not remove {}: {}", path.display(), e);
                }
                log::info!("Converted to {}", ttf_path.display());
                FontOutcome::Ready(ttf_path)
            }
            Err(error) => {
                log::error!("Conversion failed for {}: {}", source.family, error);
                FontOutcome::Unconverted { path, error }
            }
        }
    }
}
