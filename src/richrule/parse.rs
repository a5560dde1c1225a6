// Richrule - Parser
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Parsing of rich rule text into [`Rule`] values.
//!
//! The input is split on single spaces into a flat token list and walked once
//! with a forward-only cursor. A token that equals a clause keyword opens that
//! clause, which then consumes the following `key=value` tokens whose key
//! belongs to it and stops at the first one that does not. Tokens that open no
//! clause and belong to none are dropped.
//!
//! The tokenizer does not understand quoting: a value containing a space,
//! such as `log prefix="FTP "`, is split in two and does not survive parsing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::clause::{
    Audit, Clause, Destination, ForwardPort, IcmpBlock, IcmpType, Limit, Log, Mark, Port, Protocol,
    Reject, Service, Source,
};
use super::rule::Rule;

/// Errors raised on malformed rich rule text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A clause needs another token but the rule has ended.
    #[error("`{keyword}` expects another token but the rule ends")]
    UnexpectedEnd { keyword: &'static str },

    /// A token that must be `key=value` has no `=`.
    #[error("token `{token}` in `{keyword}` clause is not a key=value pair")]
    MissingSeparator { keyword: &'static str, token: String },
}

/// How the `reject` clause reads its fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectMode {
    /// Matches on the value side of each token: `x=type` makes the next
    /// token the reject type and `x=limit` makes the next token the limit.
    /// A plain `type=icmp-host-prohibited` is therefore not recognised.
    /// This is how rules have always been read and stays the default.
    #[default]
    Compat,
    /// Matches on the key side, like every other clause:
    /// `reject type=<t> limit value=<rate>`.
    Keyed,
}

impl FromStr for RejectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compat" => Ok(RejectMode::Compat),
            "keyed" => Ok(RejectMode::Keyed),
            other => Err(format!("unknown reject mode `{}` (expected compat or keyed)", other)),
        }
    }
}

/// Clause keywords recognised at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Rule,
    Source,
    Destination,
    Service,
    Port,
    Protocol,
    IcmpBlock,
    IcmpType,
    ForwardPort,
    Log,
    Audit,
    Accept,
    Drop,
    Reject,
    Mark,
}

impl Keyword {
    pub const ALL: [Keyword; 15] = [
        Keyword::Rule,
        Keyword::Source,
        Keyword::Destination,
        Keyword::Service,
        Keyword::Port,
        Keyword::Protocol,
        Keyword::IcmpBlock,
        Keyword::IcmpType,
        Keyword::ForwardPort,
        Keyword::Log,
        Keyword::Audit,
        Keyword::Accept,
        Keyword::Drop,
        Keyword::Reject,
        Keyword::Mark,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Rule => "rule",
            Keyword::Source => "source",
            Keyword::Destination => "destination",
            Keyword::Service => "service",
            Keyword::Port => "port",
            Keyword::Protocol => "protocol",
            Keyword::IcmpBlock => "icmp-block",
            Keyword::IcmpType => "icmp-type",
            Keyword::ForwardPort => "forward-port",
            Keyword::Log => "log",
            Keyword::Audit => "audit",
            Keyword::Accept => "accept",
            Keyword::Drop => "drop",
            Keyword::Reject => "reject",
            Keyword::Mark => "mark",
        }
    }

    /// The keyword the token spells exactly, if any.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|keyword| keyword.as_str() == token)
    }
}

/// Forward-only cursor over the tokens of one rule.
struct Tokens<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split(' ').filter(|token| !token.is_empty()).collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// The next token, whatever it is.
    fn expect(&mut self, keyword: Keyword) -> Result<&'a str, ParseError> {
        self.next_token().ok_or(ParseError::UnexpectedEnd {
            keyword: keyword.as_str(),
        })
    }

    /// The value of the next token, whatever its key.
    fn expect_value(&mut self, keyword: Keyword) -> Result<&'a str, ParseError> {
        let token = self.expect(keyword)?;
        split_field(token)
            .1
            .ok_or_else(|| ParseError::MissingSeparator {
                keyword: keyword.as_str(),
                token: token.to_string(),
            })
    }

    /// Consumes the next token if it is `key=value` with a key from `keys`
    /// and returns the key with its value. A known key without `=` is an
    /// error unless it is also a keyword.
    ///
    /// A `limit` key takes its value from the token after it, so
    /// `limit value=1/m` yields `("limit", "1/m")`.
    fn field(
        &mut self,
        keyword: Keyword,
        keys: &[&str],
    ) -> Result<Option<(&'a str, &'a str)>, ParseError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        let (key, value) = split_field(token);
        if !keys.iter().any(|known| *known == key) {
            return Ok(None);
        }

        if key == Limit::KEYWORD {
            self.pos += 1;
            return self.expect_value(keyword).map(|rate| Some((key, rate)));
        }
        let Some(value) = value else {
            // A bare keyword such as `protocol` starts the next clause.
            if Keyword::from_token(key).is_some() {
                return Ok(None);
            }
            return Err(ParseError::MissingSeparator {
                keyword: keyword.as_str(),
                token: token.to_string(),
            });
        };
        self.pos += 1;
        Ok(Some((key, value)))
    }
}

/// Splits `key=value` at the first `=`. Tokens without `=` are all key.
fn split_field(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (token, None),
    }
}

/// Rich rule parser.
///
/// Parsing is pure; a `Parser` only carries options and can be shared freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parser {
    reject_mode: RejectMode,
}

impl Parser {
    pub fn new(reject_mode: RejectMode) -> Self {
        Self { reject_mode }
    }

    pub fn reject_mode(&self) -> RejectMode {
        self.reject_mode
    }

    /// Parse a single rich rule.
    pub fn parse(&self, text: &str) -> Result<Rule, ParseError> {
        let mut tokens = Tokens::new(text);
        let mut rule = Rule::default();

        while let Some(token) = tokens.next_token() {
            match Keyword::from_token(token) {
                Some(keyword) => {
                    trace!("clause `{}` at token {}", token, tokens.pos - 1);
                    self.clause(keyword, &mut tokens, &mut rule)?;
                }
                None => debug!("discarding token `{}` in rich rule", token),
            }
        }

        Ok(rule)
    }

    /// Parse every rule of a list, such as a `getRichRules` reply.
    ///
    /// Stops at the first malformed rule and returns its index.
    pub fn parse_all<I, S>(&self, texts: I) -> Result<Vec<Rule>, (usize, ParseError)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| self.parse(text.as_ref()).map_err(|err| (index, err)))
            .collect()
    }

    fn clause(
        &self,
        keyword: Keyword,
        tokens: &mut Tokens<'_>,
        rule: &mut Rule,
    ) -> Result<(), ParseError> {
        match keyword {
            Keyword::Rule => {
                while let Some((_, family)) = tokens.field(keyword, &["family"])? {
                    rule.family = family.to_string();
                }
            }
            Keyword::Source => {
                let mut source = Source::default();
                while let Some((key, value)) =
                    tokens.field(keyword, &["address", "mac", "ipset", "invert"])?
                {
                    let slot = match key {
                        "address" => &mut source.address,
                        "mac" => &mut source.mac,
                        "ipset" => &mut source.ipset,
                        _ => &mut source.invert,
                    };
                    *slot = value.to_string();
                }
                rule.source = source;
            }
            Keyword::Destination => {
                let mut destination = Destination::default();
                while let Some((key, value)) = tokens.field(keyword, &["address", "invert"])? {
                    match key {
                        "address" => destination.address = value.to_string(),
                        _ => destination.invert = value.to_string(),
                    }
                }
                rule.destination = destination;
            }
            Keyword::Service => {
                let mut service = Service::default();
                while let Some((_, name)) = tokens.field(keyword, &["name"])? {
                    service.name = name.to_string();
                }
                rule.service = service;
            }
            Keyword::Port => {
                let mut port = Port::default();
                while let Some((key, value)) =
                    tokens.field(keyword, &["name", "port", "protocol"])?
                {
                    match key {
                        "protocol" => port.protocol = value.to_string(),
                        _ => port.port = value.to_string(),
                    }
                }
                rule.port = port;
            }
            Keyword::Protocol => {
                rule.protocol = Protocol::new(tokens.expect_value(keyword)?);
            }
            Keyword::IcmpBlock => {
                rule.icmp_block = IcmpBlock::new(tokens.expect_value(keyword)?);
            }
            Keyword::IcmpType => {
                rule.icmp_type = IcmpType::new(tokens.expect_value(keyword)?);
            }
            Keyword::ForwardPort => {
                rule.forward_port = forward_port(tokens)?;
            }
            Keyword::Log => {
                rule.log = log(tokens)?;
            }
            Keyword::Audit => {
                let mut audit = Audit::default();
                while let Some((_, rate)) = tokens.field(keyword, &[Limit::KEYWORD])? {
                    audit.limit = Limit::new(rate);
                }
                rule.audit = audit;
            }
            Keyword::Accept => {
                rule.accept.flag = true;
                while let Some((_, rate)) = tokens.field(keyword, &[Limit::KEYWORD])? {
                    rule.accept.limit = Limit::new(rate);
                }
            }
            Keyword::Drop => {
                rule.drop.flag = true;
                while let Some((_, rate)) = tokens.field(keyword, &[Limit::KEYWORD])? {
                    rule.drop.limit = Limit::new(rate);
                }
            }
            Keyword::Reject => {
                rule.reject = match self.reject_mode {
                    RejectMode::Compat => reject_compat(tokens)?,
                    RejectMode::Keyed => reject_keyed(tokens)?,
                };
            }
            Keyword::Mark => {
                rule.mark = mark(tokens)?;
            }
        }
        Ok(())
    }
}

fn forward_port(tokens: &mut Tokens<'_>) -> Result<ForwardPort, ParseError> {
    let mut forward_port = ForwardPort::default();
    while let Some((key, value)) = tokens.field(
        Keyword::ForwardPort,
        &["port", "protocol", "to-port", "to-addr"],
    )? {
        let slot = match key {
            "port" => &mut forward_port.port,
            "protocol" => &mut forward_port.protocol,
            "to-port" => &mut forward_port.to_port,
            _ => &mut forward_port.to_addr,
        };
        *slot = value.to_string();
    }
    Ok(forward_port)
}

fn log(tokens: &mut Tokens<'_>) -> Result<Log, ParseError> {
    let mut log = Log::default();
    while let Some((key, value)) = tokens.field(Keyword::Log, &["prefix", "level", Limit::KEYWORD])? {
        match key {
            "prefix" => log.prefix = value.to_string(),
            "level" => log.level = value.to_string(),
            _ => log.limit = Limit::new(value),
        }
    }
    Ok(log)
}

fn mark(tokens: &mut Tokens<'_>) -> Result<Mark, ParseError> {
    let mut mark = Mark::default();
    while let Some((key, value)) = tokens.field(Keyword::Mark, &["set", Limit::KEYWORD])? {
        match key {
            "set" => mark.set = value.to_string(),
            _ => mark.limit = Limit::new(value),
        }
    }
    Ok(mark)
}

fn reject_keyed(tokens: &mut Tokens<'_>) -> Result<Reject, ParseError> {
    let mut reject = Reject::default();
    while let Some((key, value)) = tokens.field(Keyword::Reject, &["type", Limit::KEYWORD])? {
        match key {
            "type" => reject.kind = value.to_string(),
            _ => reject.limit = Limit::new(value),
        }
    }
    Ok(reject)
}

/// Reads reject fields keyed on the value side of each token.
///
/// For `x=type` the whole token after it becomes the type; for `x=limit` the
/// value of the token after it becomes the limit. Anything else ends the
/// clause, including the usual `type=<t>` spelling.
fn reject_compat(tokens: &mut Tokens<'_>) -> Result<Reject, ParseError> {
    let mut reject = Reject::default();
    while let Some(token) = tokens.peek() {
        match split_field(token).1 {
            Some("type") => {
                tokens.pos += 1;
                reject.kind = tokens.expect(Keyword::Reject)?.to_string();
            }
            Some("limit") => {
                tokens.pos += 1;
                reject.limit = Limit::new(tokens.expect_value(Keyword::Reject)?);
            }
            _ => break,
        }
    }
    Ok(reject)
}

/// Parse a rich rule with the default options.
pub fn parse_rule(text: &str) -> Result<Rule, ParseError> {
    Parser::default().parse(text)
}

impl FromStr for Rule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s)
    }
}
