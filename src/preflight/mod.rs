//! Preflight checks module.

mod site;
mod tmdb;

use crate::models::config::Config;
use crate::services::prehrajto::PrehrajtoClient;
use crate::Result;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
pub async fn run_preflight_checks(config: &Config) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    // Check TMDB
    results.push(tmdb::check(&config.tmdb).await);

    // Check the video site, then the login when credentials are set
    let client = PrehrajtoClient::new(&config.site)?;
    results.push(site::check_reachable(&client).await);
    if let Some(login) = site::check_login(&client, &config.site).await {
        results.push(login);
    }

    Ok(results)
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_passed() {
        let results = vec![CheckResult::ok("a", "fine"), CheckResult::ok("b", "fine")];
        assert!(all_passed(&results));

        let results = vec![
            CheckResult::ok("a", "fine"),
            CheckResult::fail("b", "broken", "fix it"),
        ];
        assert!(!all_passed(&results));
        assert_eq!(results[1].hint.as_deref(), Some("fix it"));
    }
}
