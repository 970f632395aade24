use std::net::Ipv6Addr;

use gbsip::limits::MAX_CSEQ;
use gbsip::*;
use proptest::option;
use proptest::prelude::*;
use proptest::sample::select;
use strum::IntoEnumIterator;

fn identifier() -> impl Strategy<Value = String> {
    "[0-9]{20}"
}

fn ipv4() -> impl Strategy<Value = String> {
    (1u8..=223, any::<u8>(), any::<u8>(), 1u8..=254)
        .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
}

fn ipv6() -> impl Strategy<Value = String> {
    any::<[u16; 8]>().prop_map(|segments| Ipv6Addr::from(segments).to_string())
}

fn ip_host() -> impl Strategy<Value = String> {
    prop_oneof![ipv4(), ipv6()]
}

fn display_name() -> impl Strategy<Value = Option<String>> {
    option::of("[A-Za-z0-9][A-Za-z0-9 ]{0,10}[A-Za-z0-9]")
}

/// A URI that satisfies the GB28181 profile: realm host or IP host with port
fn valid_uri() -> impl Strategy<Value = Uri> {
    (identifier(), ip_host(), 1u16..=u16::MAX, any::<bool>(), any::<bool>()).prop_map(
        |(user, ip, port, use_ip, with_transport)| {
            let uri = if use_ip {
                Uri::new(user, ip).with_port(port)
            } else {
                let realm = user[..10].to_string();
                Uri::new(user, realm)
            };
            if with_transport {
                uri.with_param("transport", Some("udp"))
            } else {
                uri
            }
        },
    )
}

fn rport() -> impl Strategy<Value = Option<Rport>> {
    prop_oneof![
        Just(None),
        Just(Some(Rport::Requested)),
        (2u16..=u16::MAX).prop_map(|p| Some(Rport::Port(p))),
    ]
}

fn valid_via() -> impl Strategy<Value = Via> {
    (
        select(Transport::iter().collect::<Vec<_>>()),
        ip_host(),
        1u16..=u16::MAX,
        rport(),
        "z9hG4bK[0-9A-Za-z]{1,16}",
    )
        .prop_map(|(transport, host, port, rport, branch)| {
            let mut via = Via::new(transport, host.clone(), branch).with_port(port);
            via.rport = rport;
            if matches!(rport, Some(Rport::Port(_))) {
                via.received = Some(host);
            }
            via
        })
}

fn cseq() -> impl Strategy<Value = CSeq> {
    (0..=MAX_CSEQ, select(Method::iter().collect::<Vec<_>>()))
        .prop_map(|(seq, method)| CSeq::new(seq, method))
}

fn contact() -> impl Strategy<Value = Contact> {
    (valid_uri(), display_name(), option::of(any::<u32>())).prop_map(|(uri, name, expires)| {
        let mut contact = Contact::new(uri);
        contact.display_name = name;
        match expires {
            Some(expires) => contact.with_param("expires", Some(&expires.to_string())),
            None => contact,
        }
    })
}

fn route() -> impl Strategy<Value = Route> {
    (
        display_name(),
        prop::collection::vec((valid_uri(), any::<bool>()), 1..4),
    )
        .prop_map(|(name, hops)| {
            let mut route = Route::new(hops.into_iter().map(|(uri, loose)| {
                let mut entry = RouteEntry::new(uri);
                if loose {
                    entry.params.insert("lr", None);
                }
                entry
            }));
            route.display_name = name;
            route
        })
}

/// Parameters outside the recognised digest set, bare or quoted
fn auth_extra() -> impl Strategy<Value = Vec<AuthParam>> {
    let value = prop_oneof![
        "[A-Za-z0-9-]{0,8}",
        "[A-Za-z0-9,;= -]{0,12}".prop_map(|v| format!("\"{}\"", v)),
    ];
    prop::collection::vec(
        ("x-[a-z]{1,8}", value).prop_map(|(name, value)| AuthParam::new(name, value)),
        0..3,
    )
}

fn algorithm() -> impl Strategy<Value = Option<Algorithm>> {
    option::of(select(Algorithm::iter().collect::<Vec<_>>()))
}

fn authorization() -> impl Strategy<Value = Authorization> {
    (
        identifier(),
        "[0-9a-f]{6,16}",
        valid_uri(),
        "[0-9a-f]{32}",
        algorithm(),
        auth_extra(),
    )
        .prop_map(|(username, nonce, uri, response, algorithm, extra)| {
            let realm = username[..10].to_string();
            let mut auth = Authorization::digest(username, realm, nonce, uri, response);
            auth.algorithm = algorithm;
            auth.extra = extra;
            auth
        })
}

fn www_authenticate() -> impl Strategy<Value = WwwAuthenticate> {
    ("[0-9]{10}", "[0-9a-f]{6,16}", algorithm(), auth_extra()).prop_map(
        |(realm, nonce, algorithm, extra)| {
            let mut challenge = WwwAuthenticate::digest(realm, nonce);
            challenge.algorithm = algorithm;
            challenge.extra = extra;
            challenge
        },
    )
}

fn extensions() -> impl Strategy<Value = Vec<ExtensionField>> {
    prop::collection::vec(
        ("X-[A-Za-z]{1,8}", "[A-Za-z0-9][A-Za-z0-9 ./=;,]{0,14}[A-Za-z0-9]")
            .prop_map(|(name, value)| ExtensionField::new(name, value)),
        0..3,
    )
}

/// Every recognised field, the optional ones present or not
fn full_header() -> impl Strategy<Value = Header> {
    (
        (valid_via(), valid_uri(), valid_uri(), "[0-9a-f]{8,16}", cseq()),
        (
            option::of(contact()),
            option::of(route()),
            option::of(authorization()),
            option::of(www_authenticate()),
        ),
        (
            option::of(any::<u8>()),
            option::of(any::<u32>()),
            option::of("[A-Za-z0-9][A-Za-z0-9 ./()-]{0,14}[A-Za-z0-9]"),
            option::of("[a-z]{1,10}/[A-Za-z0-9+.-]{1,12}"),
            extensions(),
        ),
    )
        .prop_map(|(core, optional, rest)| {
            let (via, from, to, call_id, cseq) = core;
            let (contact, route, authorization, challenge) = optional;
            let (max_forwards, expires, user_agent, content_type, extensions) = rest;

            let mut header = Header::new()
                .with_via(via)
                .with_from(FromHeader::new(from).with_tag("1496731208"))
                .with_to(ToHeader::new(to))
                .with_call_id(CallId::new(call_id))
                .with_cseq(cseq)
                .with_content_length(ContentLength(0));
            if let Some(contact) = contact {
                header.set_contact(contact);
            }
            if let Some(route) = route {
                header.set_route(route);
            }
            if let Some(authorization) = authorization {
                header.set_authorization(authorization);
            }
            if let Some(challenge) = challenge {
                header.set_www_authenticate(challenge);
            }
            if let Some(hops) = max_forwards {
                header.set_max_forwards(MaxForwards(hops));
            }
            if let Some(expires) = expires {
                header.set_expires(Expires(expires));
            }
            if let Some(product) = user_agent {
                header.set_user_agent(UserAgent::new(product));
            }
            if let Some(media_type) = content_type {
                header.set_content_type(ContentType::new(media_type));
            }
            for extension in extensions {
                header.push_extension(extension);
            }
            header
        })
}

fn status_entry() -> impl Strategy<Value = (u16, String)> {
    let entries: Vec<(u16, String)> = Profile::global()
        .status()
        .iter()
        .flat_map(|table| table.iter().map(|(code, phrase)| (code, phrase.to_string())))
        .collect();
    select(entries)
}

fn start_line() -> impl Strategy<Value = StartLine> {
    prop_oneof![
        (select(Method::iter().collect::<Vec<_>>()), valid_uri())
            .prop_map(|(method, uri)| StartLine::from(RequestLine::new(method, uri))),
        status_entry().prop_map(|(code, phrase)| StartLine::from(StatusLine::new(code, phrase))),
    ]
}

proptest! {
    #[test]
    fn prop_uri_round_trip(uri in valid_uri()) {
        let wire = uri.serialize().unwrap();
        prop_assert_eq!(Uri::parse(&wire), Ok(uri));
    }

    #[test]
    fn prop_request_line_round_trip(
        uri in valid_uri(),
        method in select(Method::iter().collect::<Vec<_>>()),
    ) {
        let line = RequestLine::new(method, uri);
        let wire = line.serialize().unwrap();
        prop_assert!(wire.ends_with(" SIP/2.0\r\n"));
        prop_assert_eq!(RequestLine::parse(&wire), Ok(line));
    }

    #[test]
    fn prop_status_line_round_trip((code, phrase) in status_entry()) {
        let line = StatusLine::new(code, phrase);
        let wire = line.serialize().unwrap();
        prop_assert_eq!(StatusLine::parse(&wire), Ok(line));
    }

    #[test]
    fn prop_via_round_trip_keeps_rport_state(via in valid_via()) {
        let wire = via.serialize().unwrap();
        let parsed = Via::parse(&wire).unwrap();
        prop_assert_eq!(parsed.rport, via.rport);
        prop_assert_eq!(parsed, via);
    }

    #[test]
    fn prop_cseq_round_trip(cseq in cseq()) {
        let wire = cseq.serialize().unwrap();
        prop_assert_eq!(CSeq::parse(&wire), Ok(cseq));
    }

    #[test]
    fn prop_contact_and_route_round_trip(contact in contact(), route in route()) {
        let wire = contact.serialize().unwrap();
        prop_assert_eq!(Contact::parse(&wire), Ok(contact));
        let wire = route.serialize().unwrap();
        prop_assert_eq!(Route::parse(&wire), Ok(route));
    }

    #[test]
    fn prop_auth_round_trip_keeps_extra_params(
        auth in authorization(),
        challenge in www_authenticate(),
    ) {
        let wire = auth.serialize().unwrap();
        prop_assert_eq!(Authorization::parse(&wire), Ok(auth));
        let wire = challenge.serialize().unwrap();
        prop_assert_eq!(WwwAuthenticate::parse(&wire), Ok(challenge));
    }

    #[test]
    fn prop_unsigned_fields_never_truncate(digits in "[1-9][0-9]{10,40}") {
        let line = format!("Content-Length: {}", digits);
        prop_assert_eq!(
            ContentLength::parse(&line).unwrap_err().kind(),
            ErrorKind::NumericOverflow
        );
    }

    #[test]
    fn prop_header_round_trip(header in full_header()) {
        let wire = header.serialize().unwrap();
        prop_assert_eq!(Header::parse(&wire), Ok(header));
    }

    #[test]
    fn prop_message_round_trip(
        start_line in start_line(),
        header in full_header(),
        body in "[ -~\r\n]{0,64}",
    ) {
        let mut message = Message::new(start_line, header).with_body(body);
        message.sync_content_length().unwrap();
        let wire = serialize_message(&message).unwrap();
        let parsed = parse_message(&wire).unwrap();
        prop_assert!(parsed.validate_content_length().is_ok());
        prop_assert_eq!(parsed, message);
    }

    #[test]
    fn prop_validate_is_idempotent(
        user in "[0-9]{1,24}",
        host in prop_oneof![Just("3402000000".to_string()), ip_host(), "[a-z]{1,8}"],
        port in any::<u16>(),
    ) {
        let uri = Uri::new(user, host).with_port(port);
        let first = uri.validate();
        let snapshot = uri.clone();
        for _ in 0..3 {
            prop_assert_eq!(uri.validate(), first.clone());
        }
        prop_assert_eq!(uri, snapshot);
    }
}
