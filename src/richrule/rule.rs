// Richrule - Rule Model
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! The [`Rule`] aggregate and the typed [`Action`] view over its action clauses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clause::{
    Accept, Audit, Clause, Destination, Drop, ForwardPort, IcmpBlock, IcmpType, Limit, Log, Mark,
    Port, Protocol, Reject, Service, Source,
};

/// A complete rich rule.
///
/// Every clause is independently optional (empty means absent). The action
/// clauses are stored flat, so a `Rule` can hold more than one action even
/// though firewalld accepts at most one. Use [`Rule::set_action`] to build
/// rules that are guaranteed to carry a single action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub family: String,
    pub source: Source,
    pub destination: Destination,
    pub service: Service,
    pub port: Port,
    pub protocol: Protocol,
    #[serde(rename = "icmpblock")]
    pub icmp_block: IcmpBlock,
    #[serde(rename = "icmptype")]
    pub icmp_type: IcmpType,
    #[serde(rename = "forwardport")]
    pub forward_port: ForwardPort,
    pub log: Log,
    pub audit: Audit,
    pub accept: Accept,
    pub reject: Reject,
    pub drop: Drop,
    pub mark: Mark,
}

/// What a rule does with matching traffic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Accept { limit: Limit },
    Reject { kind: String, limit: Limit },
    Drop { limit: Limit },
    Mark { set: String, limit: Limit },
}

impl Action {
    /// The clause keyword for this action.
    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Accept { .. } => Accept::KEYWORD,
            Action::Reject { .. } => Reject::KEYWORD,
            Action::Drop { .. } => Drop::KEYWORD,
            Action::Mark { .. } => Mark::KEYWORD,
        }
    }

    pub fn limit(&self) -> &Limit {
        match self {
            Action::Accept { limit }
            | Action::Reject { limit, .. }
            | Action::Drop { limit }
            | Action::Mark { limit, .. } => limit,
        }
    }
}

/// A rule carries more than one action clause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule carries {} actions ({}), at most one is allowed", .0.len(), .0.join(", "))]
pub struct ConflictingActions(pub Vec<&'static str>);

impl Rule {
    /// Create an empty rule for the given address family (`ipv4`, `ipv6` or empty).
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Default::default()
        }
    }

    /// All actions present on the rule, in rendering order.
    ///
    /// Accept and drop count as present only when their flag is set.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.accept.flag {
            actions.push(Action::Accept {
                limit: self.accept.limit.clone(),
            });
        }
        if !self.reject.is_empty() {
            actions.push(Action::Reject {
                kind: self.reject.kind.clone(),
                limit: self.reject.limit.clone(),
            });
        }
        if self.drop.flag {
            actions.push(Action::Drop {
                limit: self.drop.limit.clone(),
            });
        }
        if !self.mark.is_empty() {
            actions.push(Action::Mark {
                set: self.mark.set.clone(),
                limit: self.mark.limit.clone(),
            });
        }
        actions
    }

    /// The single action of the rule, if any.
    pub fn action(&self) -> Result<Option<Action>, ConflictingActions> {
        let mut actions = self.actions();
        match actions.len() {
            0 => Ok(None),
            1 => Ok(actions.pop()),
            _ => Err(ConflictingActions(
                actions.iter().map(Action::keyword).collect(),
            )),
        }
    }

    /// Replace whatever actions the rule has with `action`.
    pub fn set_action(&mut self, action: Option<Action>) {
        self.accept = Accept::default();
        self.reject = Reject::default();
        self.drop = Drop::default();
        self.mark = Mark::default();

        match action {
            None => {}
            Some(Action::Accept { limit }) => self.accept = Accept { flag: true, limit },
            Some(Action::Reject { kind, limit }) => self.reject = Reject { kind, limit },
            Some(Action::Drop { limit }) => self.drop = Drop { flag: true, limit },
            Some(Action::Mark { set, limit }) => self.mark = Mark { set, limit },
        }
    }

    /// Builder form of [`Rule::set_action`].
    pub fn with_action(mut self, action: Action) -> Self {
        self.set_action(Some(action));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_action() {
        let rule = Rule::new("ipv4");
        assert!(rule.actions().is_empty());
        assert_eq!(rule.action(), Ok(None));
    }

    #[test]
    fn test_single_action() {
        let rule = Rule::new("ipv4").with_action(Action::Drop {
            limit: Limit::new("2/s"),
        });
        assert!(rule.drop.flag);
        assert_eq!(rule.drop.limit.value, "2/s");
        assert_eq!(
            rule.action(),
            Ok(Some(Action::Drop {
                limit: Limit::new("2/s")
            }))
        );
    }

    #[test]
    fn test_action_keyword_and_limit() {
        let mark = Action::Mark {
            set: "0x1".into(),
            limit: Limit::new("3/m"),
        };
        assert_eq!(mark.keyword(), "mark");
        assert_eq!(mark.limit(), &Limit::new("3/m"));

        let accept = Action::Accept {
            limit: Limit::default(),
        };
        assert!(accept.limit().is_empty());
    }

    #[test]
    fn test_set_action_replaces_previous_actions() {
        let mut rule = Rule::new("ipv6");
        rule.accept = Accept::new();
        rule.mark = Mark::new("0x1");

        rule.set_action(Some(Action::Reject {
            kind: "icmp6-adm-prohibited".into(),
            limit: Limit::default(),
        }));

        assert!(!rule.accept.flag);
        assert!(rule.mark.is_empty());
        assert_eq!(rule.reject.kind, "icmp6-adm-prohibited");
        assert_eq!(rule.actions().len(), 1);

        rule.set_action(None);
        assert!(rule.actions().is_empty());
    }

    #[test]
    fn test_multiple_flat_actions_are_representable() {
        let mut rule = Rule::new("ipv4");
        rule.accept = Accept::new();
        rule.drop = Drop::new();

        let err = rule.action().unwrap_err();
        assert_eq!(err, ConflictingActions(vec!["accept", "drop"]));
        assert_eq!(
            err.to_string(),
            "rule carries 2 actions (accept, drop), at most one is allowed"
        );
    }

    #[test]
    fn test_limit_without_flag_is_not_an_action() {
        let mut rule = Rule::new("ipv4");
        rule.accept.limit = Limit::new("1/m");
        assert!(rule.actions().is_empty());
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let mut rule = Rule::new("ipv4");
        rule.forward_port = ForwardPort {
            port: "80".into(),
            protocol: "tcp".into(),
            to_port: "8080".into(),
            to_addr: String::new(),
        };
        rule.reject = Reject::new("tcp-reset");

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["forwardport"]["toport"], "8080");
        assert_eq!(json["reject"]["type"], "tcp-reset");
        assert_eq!(json["icmpblock"]["name"], "");

        let parsed: Rule =
            serde_json::from_str(r#"{"family":"ipv6","accept":{"flag":true}}"#).unwrap();
        assert_eq!(parsed.family, "ipv6");
        assert!(parsed.accept.flag);
        assert!(parsed.source.is_empty());
    }
}
