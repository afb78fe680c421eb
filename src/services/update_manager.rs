//! Update Manager for Val Browser.
//!
//! Asks the release endpoint for the latest tag on the selected channel and
//! compares it to the built-in version. One blocking request, no retry.

use crate::types::errors::UpdateError;
use crate::types::update::{ReleaseChannel, ReleaseInfo, UpdateStatus};

/// Version string this build reports and compares against.
pub const CURRENT_VERSION: &str = "14.0.1528.15";

/// Trait defining update management operations.
pub trait UpdateManagerTrait {
    fn check_for_updates(&self, channel: ReleaseChannel) -> Result<UpdateStatus, UpdateError>;
    fn get_current_version(&self) -> &str;
    fn version_info(&self, channel: ReleaseChannel) -> String;
}

/// Update manager implementation.
pub struct UpdateManager {
    endpoint: String,
    current_version: String,
}

impl UpdateManager {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            current_version: CURRENT_VERSION.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parses the JSON body of the release endpoint.
    pub fn parse_release(body: &str) -> Result<ReleaseInfo, UpdateError> {
        serde_json::from_str(body).map_err(|e| UpdateError::ParseError(e.to_string()))
    }

    /// Any tag that differs from `current` (ignoring a leading `v`) counts as
    /// an update, including older tags.
    pub fn compare(current: &str, latest_tag: &str) -> UpdateStatus {
        let strip = |v: &str| v.trim().trim_start_matches('v').to_string();
        if strip(current) == strip(latest_tag) {
            UpdateStatus::UpToDate
        } else {
            UpdateStatus::UpdateAvailable(latest_tag.to_string())
        }
    }

    fn fetch_release(&self, channel: ReleaseChannel) -> Result<ReleaseInfo, UpdateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("valbrowser/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpdateError::NetworkError(e.to_string()))?;

        let response = client
            .get(&self.endpoint)
            .query(&[("channel", channel.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| UpdateError::NetworkError(e.to_string()))?;

        let body = response
            .text()
            .map_err(|e| UpdateError::NetworkError(e.to_string()))?;
        Self::parse_release(&body)
    }
}

impl UpdateManagerTrait for UpdateManager {
    fn check_for_updates(&self, channel: ReleaseChannel) -> Result<UpdateStatus, UpdateError> {
        log::info!("checking {} for {} releases", self.endpoint, channel);
        let release = self.fetch_release(channel)?;
        Ok(Self::compare(&self.current_version, &release.tag_name))
    }

    fn get_current_version(&self) -> &str {
        &self.current_version
    }

    fn version_info(&self, channel: ReleaseChannel) -> String {
        format!(
            "Val Browser version: v{}, {} channel.\nCopyright (c) 2025 the Val Browser authors.",
            self.current_version, channel
        )
    }
}
