//! Pure dispatch logic over filter results (spec §4.6). Kept free of
//! I/O and ports so it can be exercised directly in tests; the main
//! middleware use case is the only caller.

use ferrous_dns_domain::blocking_mode::{BlockingMode, ID_ADULT_BLOCKING, ID_SAFE_BROWSING};
use ferrous_dns_domain::filter_result::FilterResult;
use ferrous_dns_domain::request_info::ProfileInfo;

/// `(listID, ruleText, blocked)` derived from the request/response
/// filter results (spec §4.7.3/§4.7.4 "filteringData(fctx)"), with the
/// same request-result-wins precedence as §4.6.3.
#[derive(Debug, Clone, Default)]
pub struct FilteringData {
    pub list_id: Option<String>,
    pub rule: Option<String>,
    pub blocked: bool,
}

pub fn filtering_data(
    request_result: Option<&FilterResult>,
    response_result: Option<&FilterResult>,
) -> FilteringData {
    if let Some(result) = request_result {
        return FilteringData {
            list_id: Some(result.list_id().to_string()),
            rule: Some(result.rule().to_string()),
            blocked: result.is_blocked(),
        };
    }
    if let Some(result) = response_result {
        return FilteringData {
            list_id: Some(result.list_id().to_string()),
            rule: Some(result.rule().to_string()),
            blocked: result.is_blocked(),
        };
    }
    FilteringData::default()
}

/// Blocking-mode selection for a `Blocked` result (spec §4.6.5).
/// Anonymous requests (no profile) return `None`; the messages
/// constructor falls back to its own global default.
pub fn result_blocking_mode(profile: Option<&ProfileInfo>, list_id: &str) -> Option<BlockingMode> {
    let profile = profile?;
    let mode = match list_id {
        ID_ADULT_BLOCKING => profile
            .adult_blocking_mode
            .clone()
            .unwrap_or_else(|| profile.blocking_mode.clone()),
        ID_SAFE_BROWSING => profile
            .safe_browsing_blocking_mode
            .clone()
            .unwrap_or_else(|| profile.blocking_mode.clone()),
        _ => profile.blocking_mode.clone(),
    };
    Some(mode)
}

/// Blocking-mode selection applied to `ModifiedRequest`/`ModifiedResponse`
/// results (spec §4.6.4, §9 "possible source bugs": the override applies
/// iff `listID` is adult-blocking or safe-browsing — unlike
/// `result_blocking_mode`, every other list leaves the already-resolved
/// response untouched).
pub fn filter_blocking_mode(profile: Option<&ProfileInfo>, list_id: &str) -> Option<BlockingMode> {
    if list_id == ID_ADULT_BLOCKING || list_id == ID_SAFE_BROWSING {
        result_blocking_mode(profile, list_id)
    } else {
        None
    }
}
