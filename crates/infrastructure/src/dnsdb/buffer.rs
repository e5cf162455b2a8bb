//! Bounded aggregation buffer (spec §4.1). A single mutex protects a
//! `(target, qtype) -> value` map capped at `max_size` distinct keys;
//! once full, only existing keys' hit counts keep climbing.

use ferrous_dns_domain::dnsdb::{DnsDbAnswer, DnsDbKey, DnsDbRecord, DnsDbValue};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use rustc_hash::FxHashMap;
use std::sync::Mutex;

pub struct BoundedBuffer {
    entries: Mutex<FxHashMap<DnsDbKey, DnsDbValue>>,
    max_size: usize,
}

/// One raw answer observed for a query, before it is folded into a
/// [`DnsDbAnswer`] (spec §3 "answerText is the stringified IP for
/// A/AAAA, dotless target for CNAME, else empty").
pub struct ObservedAnswer {
    pub value: String,
    pub rr_type: RecordType,
    pub rcode: ResponseCode,
}

impl BoundedBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            max_size,
        }
    }

    /// Spec §4.1 `add`: returns `(count, inserted)` where `count` is the
    /// number of distinct keys held *after* the operation.
    pub fn add(
        &self,
        target: &str,
        qtype: RecordType,
        answers: &[ObservedAnswer],
    ) -> (usize, bool) {
        let key = DnsDbKey {
            target: target.to_string(),
            qtype,
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = entries.get_mut(&key) {
            existing.hits += 1;
            return (entries.len(), false);
        }

        if entries.len() >= self.max_size {
            return (entries.len(), false);
        }

        let answer_set = answers
            .iter()
            .filter(|a| !a.value.is_empty())
            .map(|a| DnsDbAnswer {
                value: a.value.clone(),
                rr_type: a.rr_type,
                rcode: a.rcode,
            })
            .collect();

        entries.insert(
            key,
            DnsDbValue {
                answer_set,
                hits: 1,
            },
        );
        (entries.len(), true)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spec §4.1 `all()`: flattens each `(key, value)` pair into one or
    /// more [`DnsDbRecord`]s. Order is unspecified.
    pub fn all(&self) -> Vec<DnsDbRecord> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = Vec::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            if value.answer_set.is_empty() {
                out.push(DnsDbRecord {
                    domain_fqdn: key.target.clone(),
                    answer_text: String::new(),
                    qtype: key.qtype,
                    rcode: ResponseCode::NoError,
                    hits: value.hits,
                });
                continue;
            }
            for answer in &value.answer_set {
                out.push(DnsDbRecord {
                    domain_fqdn: key.target.clone(),
                    answer_text: answer.value.clone(),
                    qtype: answer.rr_type,
                    rcode: answer.rcode,
                    hits: value.hits,
                });
            }
        }
        out
    }
}
