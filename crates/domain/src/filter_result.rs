use hickory_proto::op::Message;

/// Tagged union a filter call returns for one side (request or response)
/// of a query (spec §4.6). `None` (absence of this type, i.e. the filter
/// found no match) is represented as `Option<FilterResult>` at call
/// sites, not as a fifth variant here.
#[derive(Debug, Clone)]
pub enum FilterResult {
    /// Matched an allow rule; do not block.
    Allowed { list_id: String, rule: String },
    /// Matched a block rule; response will be synthesized per blocking mode.
    Blocked { list_id: String, rule: String },
    /// Rewrite the question (CNAME chain); resolve under the new name.
    ModifiedRequest {
        list_id: String,
        rule: String,
        modified_msg: Message,
    },
    /// Replace the whole response (e.g. `$dnsrewrite`).
    ModifiedResponse {
        list_id: String,
        rule: String,
        modified_msg: Message,
    },
}

impl FilterResult {
    pub fn list_id(&self) -> &str {
        match self {
            FilterResult::Allowed { list_id, .. }
            | FilterResult::Blocked { list_id, .. }
            | FilterResult::ModifiedRequest { list_id, .. }
            | FilterResult::ModifiedResponse { list_id, .. } => list_id,
        }
    }

    pub fn rule(&self) -> &str {
        match self {
            FilterResult::Allowed { rule, .. }
            | FilterResult::Blocked { rule, .. }
            | FilterResult::ModifiedRequest { rule, .. }
            | FilterResult::ModifiedResponse { rule, .. } => rule,
        }
    }

    /// True for `Blocked` and any `Modified...` variant (spec §4.7.3:
    /// "isBlocked := filteringData(fctx).blocked").
    pub fn is_blocked(&self) -> bool {
        !matches!(self, FilterResult::Allowed { .. })
    }
}

/// Stable, on-wire numeric result codes (spec §4.6.3). Never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    Invalid = 0,
    None = 1,
    ReqBlocked = 2,
    RespBlocked = 3,
    ReqAllowed = 4,
    RespAllowed = 5,
    Modified = 6,
}

impl ResultCode {
    /// Derives the query-log `(resultCode, listID, rule)` triple from
    /// the request- and response-path filter results, applying the
    /// precedence rule of spec §4.6.3: request result wins if present.
    pub fn from_results<'a>(
        request_result: Option<&'a FilterResult>,
        response_result: Option<&'a FilterResult>,
    ) -> (ResultCode, Option<&'a str>, Option<&'a str>) {
        if let Some(result) = request_result {
            let code = match result {
                FilterResult::Blocked { .. } => ResultCode::ReqBlocked,
                FilterResult::Allowed { .. } => ResultCode::ReqAllowed,
                FilterResult::ModifiedRequest { .. } | FilterResult::ModifiedResponse { .. } => {
                    ResultCode::Modified
                }
            };
            return (code, Some(result.list_id()), Some(result.rule()));
        }
        if let Some(result) = response_result {
            let code = match result {
                FilterResult::Blocked { .. } => ResultCode::RespBlocked,
                FilterResult::Allowed { .. } => ResultCode::RespAllowed,
                FilterResult::ModifiedRequest { .. } | FilterResult::ModifiedResponse { .. } => {
                    ResultCode::Invalid
                }
            };
            return (code, Some(result.list_id()), Some(result.rule()));
        }
        (ResultCode::None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_result_takes_precedence() {
        let req = FilterResult::Blocked {
            list_id: "L1".into(),
            rule: "||blocked.test^".into(),
        };
        let resp = FilterResult::Allowed {
            list_id: "L2".into(),
            rule: "@@x".into(),
        };
        let (code, list_id, rule) = ResultCode::from_results(Some(&req), Some(&resp));
        assert_eq!(code, ResultCode::ReqBlocked);
        assert_eq!(list_id, Some("L1"));
        assert_eq!(rule, Some("||blocked.test^"));
    }

    #[test]
    fn response_result_used_when_no_request_result() {
        let resp = FilterResult::Allowed {
            list_id: "L2".into(),
            rule: "@@x".into(),
        };
        let (code, ..) = ResultCode::from_results(None, Some(&resp));
        assert_eq!(code, ResultCode::RespAllowed);
    }

    #[test]
    fn no_results_is_none_code() {
        let (code, list_id, rule) = ResultCode::from_results(None, None);
        assert_eq!(code, ResultCode::None);
        assert_eq!(list_id, None);
        assert_eq!(rule, None);
    }
}
