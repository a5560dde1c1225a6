// Richrule - Codec Tests
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! End-to-end behaviour of the codec: rendering, parsing, and the round trip
//! between them.

use proptest::prelude::*;

use super::*;

fn ftp_from_subnet() -> Rule {
    Rule {
        family: "ipv4".into(),
        source: Source::address("10.0.0.0/24"),
        service: Service::new("ftp"),
        accept: Accept::new(),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_render_source_service_accept() {
    assert_eq!(
        ftp_from_subnet().to_string(),
        "rule family=ipv4 source address=10.0.0.0/24 service name=ftp accept  "
    );
}

#[test]
fn test_render_empty_rule() {
    assert_eq!(Rule::default().to_string(), "rule ");
}

#[test]
fn test_render_order_is_fixed() {
    // Fields set back to front still render front to back.
    let mut rule = Rule::default();
    rule.mark = Mark::new("0x2");
    rule.audit = Audit::default();
    rule.log.level = "warning".into();
    rule.forward_port.port = "2222".into();
    rule.icmp_type = IcmpType::new("echo-request");
    rule.icmp_block = IcmpBlock::new("router-advertisement");
    rule.protocol = Protocol::new("icmp");
    rule.port = Port::new("22", "tcp");
    rule.service = Service::new("ssh");
    rule.destination = Destination::address("10.0.0.1");
    rule.source = Source::ipset("admins");
    rule.family = "ipv4".into();

    let text = rule.to_string();
    let order = [
        "family=", " source ", " destination ", "service ", "port name=", "protocol value=",
        "icmp-block ", "icmp-type ", "forward-port ", "log ", "mark ",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("{} missing in {}", needle, text)))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{}", text);
    // An all-default audit clause is absent.
    assert!(!text.contains("audit"));
}

#[test]
fn test_render_source_prefers_address_over_mac() {
    let mut rule = Rule::new("ipv4");
    rule.source = Source {
        address: "192.168.1.0/24".into(),
        mac: "aa:bb:cc:dd:ee:ff".into(),
        ..Default::default()
    };
    let text = rule.to_string();
    assert!(text.contains("address=192.168.1.0/24"));
    assert!(!text.contains("mac="));
}

#[test]
fn test_render_never_fails_on_conflicting_actions() {
    let mut rule = ftp_from_subnet();
    rule.reject = Reject::new("icmp-host-prohibited");
    rule.mark = Mark::new("0x1");
    let text = rule.to_string();
    assert!(text.contains("accept"));
    assert!(text.contains("reject type=icmp-host-prohibited"));
    assert!(text.contains("mark set=0x1"));
    assert!(rule.action().is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_port_accept() {
    let rule = parse_rule("rule family=ipv4 port name=80 protocol=tcp accept ").unwrap();
    assert_eq!(
        rule,
        Rule {
            family: "ipv4".into(),
            port: Port::new("80", "tcp"),
            accept: Accept::new(),
            ..Default::default()
        }
    );
}

#[test]
fn test_parse_malformed_mark_limit_is_an_error() {
    assert_eq!(
        parse_rule("rule family=ipv4 mark set=0x1 limit=value=3/m"),
        Err(ParseError::UnexpectedEnd { keyword: "mark" })
    );
}

#[test]
fn test_parse_discards_noise() {
    let rule = parse_rule("rule family=ipv4 foo=bar service name=ssh bogus accept").unwrap();
    assert_eq!(
        rule,
        Rule {
            family: "ipv4".into(),
            service: Service::new("ssh"),
            accept: Accept::new(),
            ..Default::default()
        }
    );
}

#[test]
fn test_parse_reject_type_is_not_read_in_compat_mode() {
    let rule = parse_rule("rule family=ipv4 reject type=icmp-host-prohibited").unwrap();
    assert_ne!(rule.reject.kind, "icmp-host-prohibited");
    // Nothing was read, so the reject clause is absent altogether.
    assert!(rule.reject.is_empty());
    assert_eq!(rule.action(), Ok(None));
}

#[test]
fn test_parse_reject_type_in_keyed_mode() {
    let rule = Parser::new(RejectMode::Keyed)
        .parse("rule family=ipv4 reject type=icmp-host-prohibited")
        .unwrap();
    assert_eq!(
        rule.action(),
        Ok(Some(Action::Reject {
            kind: "icmp-host-prohibited".into(),
            limit: Limit::default(),
        }))
    );
}

#[test]
fn test_parse_keeps_multiple_actions() {
    let rule = parse_rule("rule family=ipv4 accept drop").unwrap();
    assert!(rule.accept.flag);
    assert!(rule.drop.flag);
    assert_eq!(rule.actions().len(), 2);
}

#[test]
fn test_parse_rule_from_str() {
    let rule: Rule = "rule family=ipv6 source address=fd00::/8 drop".parse().unwrap();
    assert_eq!(rule.source.address, "fd00::/8");
    assert!(rule.drop.flag);
}

// ═══════════════════════════════════════════════════════════════════════════
// Round trip
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_round_trip_every_clause() {
    let rule = Rule {
        family: "ipv4".into(),
        source: Source {
            address: "10.0.0.0/8".into(),
            invert: "true".into(),
            ..Default::default()
        },
        destination: Destination::address("192.168.10.20"),
        service: Service::new("http"),
        port: Port::new("8000-8100", "udp"),
        protocol: Protocol::new("sctp"),
        icmp_block: IcmpBlock::new("echo-request"),
        icmp_type: IcmpType::new("timestamp-request"),
        forward_port: ForwardPort {
            port: "80".into(),
            protocol: "tcp".into(),
            to_port: "8080".into(),
            to_addr: "10.0.0.9".into(),
        },
        log: Log {
            prefix: "web-".into(),
            level: "info".into(),
            limit: Limit::new("3/m"),
        },
        audit: Audit {
            limit: Limit::new("1/h"),
        },
        ..Default::default()
    }
    .with_action(Action::Reject {
        kind: "tcp-reset".into(),
        limit: Limit::new("10/s"),
    });

    let keyed = Parser::new(RejectMode::Keyed);
    assert_eq!(keyed.parse(&rule.to_string()), Ok(rule));
}

#[test]
fn test_round_trip_empty_rule() {
    assert_eq!(parse_rule(&Rule::default().to_string()), Ok(Rule::default()));
}

#[test]
fn test_round_trip_each_action() {
    let actions = [
        Action::Accept {
            limit: Limit::new("1/m"),
        },
        Action::Drop {
            limit: Limit::default(),
        },
        Action::Mark {
            set: "0x10/0xff".into(),
            limit: Limit::new("5/s"),
        },
    ];
    for action in actions {
        let rule = Rule::new("ipv6").with_action(action.clone());
        let parsed = parse_rule(&rule.to_string()).unwrap();
        assert_eq!(parsed.action(), Ok(Some(action)));
    }
}

fn value() -> impl Strategy<Value = String> {
    // Values never contain spaces: the grammar has no quoting.
    proptest::option::of("[a-z0-9./:-]{1,12}").prop_map(Option::unwrap_or_default)
}

fn limit() -> impl Strategy<Value = Limit> {
    value().prop_map(Limit::new)
}

fn action() -> impl Strategy<Value = Option<Action>> {
    prop_oneof![
        Just(None),
        limit().prop_map(|limit| Some(Action::Accept { limit })),
        (value(), limit()).prop_map(|(kind, limit)| Some(Action::Reject { kind, limit })),
        limit().prop_map(|limit| Some(Action::Drop { limit })),
        (value(), limit()).prop_map(|(set, limit)| Some(Action::Mark { set, limit })),
    ]
}

prop_compose! {
    fn arb_rule()(
        family in prop_oneof![Just(String::new()), Just("ipv4".to_string()), Just("ipv6".to_string())],
        address in value(),
        invert in value(),
        service in value(),
        port in (value(), value()),
        protocol in value(),
        icmp in (value(), value()),
        forward in (value(), value(), value(), value()),
        log in (value(), value(), limit()),
        audit in limit(),
        action in action(),
    ) -> Rule {
        let mut rule = Rule {
            family,
            source: Source { address, invert, ..Default::default() },
            service: Service::new(service),
            port: Port::new(port.0, port.1),
            protocol: Protocol::new(protocol),
            icmp_block: IcmpBlock::new(icmp.0),
            icmp_type: IcmpType::new(icmp.1),
            forward_port: ForwardPort {
                port: forward.0,
                protocol: forward.1,
                to_port: forward.2,
                to_addr: forward.3,
            },
            log: Log { prefix: log.0, level: log.1, limit: log.2 },
            audit: Audit { limit: audit },
            ..Default::default()
        };
        rule.set_action(action);
        rule
    }
}

proptest! {
    #[test]
    fn test_round_trip_preserves_clauses(rule in arb_rule()) {
        let parser = Parser::new(RejectMode::Keyed);
        let parsed = parser.parse(&rule.to_string());
        prop_assert_eq!(parsed, Ok(rule));
    }

    #[test]
    fn test_parse_never_panics(text in "\\PC*") {
        let _ = parse_rule(&text);
        let _ = Parser::new(RejectMode::Keyed).parse(&text);
    }

    #[test]
    fn test_parse_never_panics_on_keyword_soup(
        tokens in proptest::collection::vec(
            prop_oneof![
                proptest::sample::select(Keyword::ALL.to_vec()).prop_map(|k| k.as_str().to_string()),
                Just("limit".to_string()),
                Just("x=type".to_string()),
                Just("x=limit".to_string()),
                "[a-z-]{1,8}=[a-z0-9/]{0,6}",
            ],
            0..24,
        )
    ) {
        let _ = parse_rule(&tokens.join(" "));
    }
}
