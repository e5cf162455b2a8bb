/// Rule-hit counter sink (spec §4.7.4 `ruleStat.collect(listID, ruleText)`).
pub trait RuleStatsCollectorPort: Send + Sync {
    fn collect(&self, list_id: &str, rule: &str);
}
