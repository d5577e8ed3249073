//! Per-kind ordered rule storage.
//!
//! Rules are kept in insertion order; the sequence counter is advanced under
//! the write lock so the vector stays sorted by sequence. Lookups scan from
//! the back, which makes the most recently added matching rule win.

use super::kind::RuleKind;
use super::types::{Applied, Iterations, Rule, RuleId};
use crate::error::Result;
use crate::exchange::Exchange;
use crate::predicate::RequestMatch;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

pub struct RuleStore<P> {
    kind: RuleKind,
    rules: RwLock<Vec<Rule<P>>>,
    next_sequence: AtomicU64,
}

impl<P: Clone> RuleStore<P> {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            rules: RwLock::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Compile `predicate` and append a new rule.
    pub fn add(&self, predicate: RequestMatch, payload: P, iterations: Iterations) -> Result<RuleId> {
        let compiled = predicate.compile()?;
        let identifier = predicate.identifier();

        let mut rules = self.rules.write();
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let id = RuleId::new(&identifier, sequence);

        info!(
            kind = %self.kind,
            rule_id = %id,
            iterations = ?iterations,
            predicate = %predicate,
            "Rule added"
        );

        rules.push(Rule {
            id: id.clone(),
            predicate,
            compiled,
            payload,
            remaining: iterations,
            sequence,
        });
        Ok(id)
    }

    pub fn remove(&self, id: &RuleId) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| &r.id != id);
        let removed = rules.len() != before;
        if removed {
            info!(kind = %self.kind, rule_id = %id, "Rule removed");
        }
        removed
    }

    /// Remove every listed rule. True only if all of them were present.
    pub fn remove_many(&self, ids: &[RuleId]) -> bool {
        let mut rules = self.rules.write();
        let mut all_removed = true;
        for id in ids {
            let before = rules.len();
            rules.retain(|r| &r.id != id);
            if rules.len() == before {
                all_removed = false;
            } else {
                info!(kind = %self.kind, rule_id = %id, "Rule removed");
            }
        }
        all_removed
    }

    /// Remove every rule registered with a predicate equal to `predicate`.
    pub fn remove_matching(&self, predicate: &RequestMatch) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| &r.predicate != predicate);
        let count = before - rules.len();
        if count > 0 {
            info!(kind = %self.kind, count, predicate = %predicate, "Rules removed by predicate");
        }
        count > 0
    }

    /// Clear the store. Returns whether anything was removed.
    pub fn remove_all(&self) -> bool {
        let mut rules = self.rules.write();
        let count = rules.len();
        rules.clear();
        if count > 0 {
            info!(kind = %self.kind, count, "All rules removed");
        }
        count > 0
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<RuleId> {
        self.rules.read().iter().map(|r| r.id.clone()).collect()
    }

    /// Snapshot of every stored rule in insertion order, inert ones included.
    pub fn snapshot(&self) -> Vec<Rule<P>> {
        self.rules.read().clone()
    }

    pub fn get(&self, id: &RuleId) -> Option<Rule<P>> {
        self.rules.read().iter().find(|r| &r.id == id).cloned()
    }

    /// Most recently added rule matching `exchange`, without consuming it.
    pub fn find_best_match(&self, exchange: &Exchange) -> Option<Rule<P>> {
        self.rules
            .read()
            .iter()
            .rev()
            .find(|r| r.matches(exchange))
            .cloned()
    }

    /// Select the best match and consume one iteration of it.
    ///
    /// Matching runs under the read lock. Only a finite match takes the
    /// write lock, where selection is repeated so that decrement and
    /// retirement act on the current winner; concurrent callers racing for
    /// the last iteration cannot both win.
    pub fn take_best_match(&self, exchange: &Exchange) -> Option<Applied<P>> {
        {
            let rules = self.rules.read();
            let rule = rules.iter().rev().find(|r| r.matches(exchange))?;
            if rule.remaining.is_none() {
                return Some(Applied {
                    id: rule.id.clone(),
                    predicate: rule.predicate.clone(),
                    payload: rule.payload.clone(),
                    remaining: None,
                    retired: false,
                });
            }
        }

        let mut rules = self.rules.write();
        let index = rules.iter().rposition(|r| r.matches(exchange))?;

        let rule = &mut rules[index];
        if let Some(n) = rule.remaining.as_mut() {
            *n -= 1;
        }

        let retired = rule.remaining == Some(0);
        let applied = Applied {
            id: rule.id.clone(),
            predicate: rule.predicate.clone(),
            payload: rule.payload.clone(),
            remaining: rule.remaining,
            retired,
        };

        if retired {
            rules.remove(index);
            info!(kind = %self.kind, rule_id = %applied.id, "Rule exhausted and retired");
        } else {
            debug!(
                kind = %self.kind,
                rule_id = %applied.id,
                remaining = ?applied.remaining,
                "Rule applied"
            );
        }

        Some(applied)
    }

    /// Finite rules with iterations left, keyed by predicate, mapped to the
    /// remaining count. Rules applied fewer times than their budget are
    /// included with what is left.
    ///
    /// When several such rules share a predicate the most recently added
    /// one's count is reported.
    pub fn unused_finite_rules(&self) -> BTreeMap<RequestMatch, u32> {
        let rules = self.rules.read();
        let mut unused = BTreeMap::new();
        for rule in rules.iter().filter(|r| r.is_unused_finite()) {
            if let Some(n) = rule.remaining {
                unused.insert(rule.predicate.clone(), n);
            }
        }
        unused
    }
}
