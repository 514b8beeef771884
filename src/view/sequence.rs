use std::collections::HashMap;

/// Independent request streams. A newer request only supersedes older
/// requests with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    List,
    /// Full record behind an expanded tile.
    Detail,
    /// Full record for the info popup.
    Info,
    Birthdays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub key: QueryKey,
    pub seq: u64,
}

/// Monotonic counters per query key.
#[derive(Debug, Default)]
pub struct RequestSeq {
    latest: HashMap<QueryKey, u64>,
}

impl RequestSeq {
    pub fn issue(&mut self, key: QueryKey) -> Token {
        let seq = self.latest.entry(key).or_insert(0);
        *seq += 1;
        Token { key, seq: *seq }
    }

    pub fn is_current(&self, token: Token) -> bool {
        self.latest.get(&token.key).copied() == Some(token.seq)
    }

    /// Make every outstanding token for `key` stale.
    pub fn invalidate(&mut self, key: QueryKey) {
        self.issue(key);
    }
}
