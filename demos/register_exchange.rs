//! Walks a GB28181 registration: the device registers, the platform
//! challenges, the device answers with credentials and is accepted.
//!
//! Run with `RUST_LOG=gbsip=trace cargo run --example register_exchange`
//! to see the codec's own events.

use gbsip::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEVICE_ID: &str = "34020000001320000001";
const PLATFORM_ID: &str = "34020000002000000001";
const REALM: &str = "3402000000";

fn device_register(cseq: u32, authorization: Option<Authorization>) -> CodecResult<Message> {
    let platform = Uri::new(PLATFORM_ID, REALM);
    let device = Uri::new(DEVICE_ID, REALM);

    let mut header = Header::new()
        .with_via(
            Via::new(Transport::UDP, "192.168.1.64", format!("z9hG4bK19231560{}", cseq))
                .with_port(5060)
                .with_rport(Rport::Requested),
        )
        .with_from(FromHeader::new(device.clone()).with_tag("1496731208"))
        .with_to(ToHeader::new(device))
        .with_call_id(CallId::new("1011877063"))
        .with_cseq(CSeq::new(cseq, Method::REGISTER))
        .with_contact(Contact::new(Uri::new(DEVICE_ID, "192.168.1.64").with_port(5060)))
        .with_max_forwards(MaxForwards(70))
        .with_expires(Expires(3600))
        .with_user_agent(UserAgent::new("IP Camera"));
    if let Some(authorization) = authorization {
        header.set_authorization(authorization);
    }

    let mut message = Message::new(RequestLine::new(Method::REGISTER, platform), header);
    message.sync_content_length()?;
    Ok(message)
}

/// Build a response that echoes the dialog fields of `request`.
fn platform_reply(request: &Message, code: u16, source: (&str, u16)) -> CodecResult<Message> {
    let mut header = Header::new();
    if let Some(via) = request.header.via() {
        let mut via = via.clone();
        via.stamp_source(source.0, source.1);
        header.set_via(via);
    }
    if let Some(from) = request.header.from() {
        header.set_from(from.clone());
    }
    if let Some(to) = request.header.to() {
        header.set_to(to.clone().with_tag("a81b4c"));
    }
    if let Some(call_id) = request.header.call_id() {
        header.set_call_id(call_id.clone());
    }
    if let Some(cseq) = request.header.cseq() {
        header.set_cseq(*cseq);
    }
    if code == 401 {
        header.set_www_authenticate(
            WwwAuthenticate::digest(REALM, "9bd055").with_algorithm(Algorithm::Md5),
        );
    }

    let mut reply = Message::new(StatusLine::for_code(code, Profile::global())?, header);
    reply.sync_content_length()?;
    Ok(reply)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let wire = serialize_message(&device_register(1, None)?)?;
    info!(bytes = wire.len(), "device -> platform\n{}", wire);

    let register = parse_message(&wire)?;
    let challenge = serialize_message(&platform_reply(&register, 401, ("192.168.1.64", 5060))?)?;
    info!("platform -> device\n{}", challenge);

    let challenge = parse_message(&challenge)?;
    let (realm, nonce) = challenge
        .header
        .www_authenticate()
        .map(|c| (c.realm.clone(), c.nonce.clone()))
        .ok_or("401 without a challenge")?;

    // Digest computation belongs to the device's auth layer; a fixed value
    // stands in for it here.
    let authorization = Authorization::digest(
        DEVICE_ID,
        realm,
        nonce,
        Uri::new(PLATFORM_ID, REALM),
        "f0a3b9f6a1b04e8b3bb6bb6a6b1d4e5f",
    );
    let wire = serialize_message(&device_register(2, Some(authorization))?)?;
    info!("device -> platform\n{}", wire);

    let register = parse_message(&wire)?;
    register.validate_content_length()?;
    let accepted = platform_reply(&register, 200, ("192.168.1.64", 5060))?;
    info!(
        status = accepted.start_line.status().map(|s| s.code),
        "platform -> device\n{}",
        serialize_message(&accepted)?
    );

    Ok(())
}
