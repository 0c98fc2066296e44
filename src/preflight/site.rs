//! Video site preflight checks.

use super::CheckResult;
use crate::models::config::SiteConfig;
use crate::services::prehrajto::PrehrajtoClient;

/// Check that the site answers.
pub async fn check_reachable(client: &PrehrajtoClient) -> CheckResult {
    let url = format!("{}/", client.base_url());
    match client.fetch_page(&url).await {
        Ok(_) => CheckResult::ok("Video site", &format!("{} reachable", client.base_url())),
        Err(e) => CheckResult::fail(
            "Video site",
            &format!("{} unreachable: {}", client.base_url(), e),
            "Check your network connection or site.base_url",
        ),
    }
}

/// Check the premium login. `None` when no credentials are configured.
pub async fn check_login(client: &PrehrajtoClient, config: &SiteConfig) -> Option<CheckResult> {
    let (email, password) = config.credentials()?;
    Some(match client.login(email, password).await {
        Ok(()) => CheckResult::ok("Premium login", &format!("logged in as {}", email)),
        Err(e) => CheckResult::fail(
            "Premium login",
            &e.to_string(),
            "Check PLAYTO_EMAIL and PLAYTO_PASSWORD",
        ),
    })
}
