//! Terminal walkthrough of the provider: derive a DID, sign a JWS, receive an
//! encrypted message, and answer an authentication challenge, all through
//! `send`.
//!
//! Run with:
//!   cargo run --example demo

use serde_json::{json, Map, Value};

use key_did_provider_ed25519::identity::did::decode_did;
use key_did_provider_ed25519::jose::encoding::base64pad_encode;
use key_did_provider_ed25519::jose::jwe::{encrypt_jwe, X25519Recipient};
use key_did_provider_ed25519::jose::jws::{verify_jws, GeneralJws};
use key_did_provider_ed25519::{DidProvider, Ed25519Provider, RpcRequest, Seed};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn step(n: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}[{n}] {title}{RESET}");
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("    {DIM}{label:<12}{RESET} {value}");
}

fn check(ok: bool, what: &str) {
    if ok {
        println!("    {GREEN}ok{RESET}   {what}");
    } else {
        println!("    {RED}FAIL{RESET} {what}");
    }
}

fn main() {
    println!("{BOLD}did:key Ed25519 provider demo{RESET}");

    // --- Identity ---
    step(1, "Derive the identity");
    let alice = Ed25519Provider::new(Seed::new(rand::random()));
    field("did", alice.did());
    field("x25519", hex::encode(alice.encryption_public_key()));
    check(alice.is_did_provider(), "is a DID provider");

    // --- Signing ---
    step(2, "Sign a payload with did_createJWS");
    let resp = alice.send(RpcRequest::new(
        1,
        "did_createJWS",
        json!({
            "payload": { "msg": "hello from alice" },
            "protected": { "typ": "JWT" },
            "did": alice.did(),
        }),
    ));
    let jws = resp
        .result
        .as_ref()
        .and_then(|r| r["jws"].as_str())
        .unwrap_or_default()
        .to_string();
    field("jws", format!("{}...", &jws[..jws.len().min(60)]));
    let public_key = decode_did(alice.did()).unwrap_or_default();
    check(verify_jws(&jws, &public_key).is_ok(), "verifies against the DID");

    // --- Encryption ---
    step(3, "Bob encrypts to Alice's DID, Alice decrypts");
    let secret = b"meet at the usual place";
    let jwe = X25519Recipient::from_did(alice.did())
        .and_then(|r| encrypt_jwe(secret, &[r], Map::new(), None))
        .map(|jwe| serde_json::to_value(jwe).unwrap_or_default())
        .unwrap_or_default();
    let resp = alice.send(RpcRequest::new(2, "did_decryptJWE", json!({ "jwe": jwe })));
    let cleartext = resp.result.as_ref().map(|r| r["cleartext"].clone());
    field("cleartext", cleartext.clone().unwrap_or(Value::Null));
    check(
        cleartext == Some(json!(base64pad_encode(secret))),
        "matches what Bob sent",
    );

    // --- Eavesdropper ---
    step(4, "Mallory tries the same JWE");
    let mallory = Ed25519Provider::new(Seed::new(rand::random()));
    let resp = mallory.send(RpcRequest::new(3, "did_decryptJWE", json!({ "jwe": jwe })));
    field("response", serde_json::to_string(&resp).unwrap_or_default());
    check(
        resp.error.map(|e| e.code) == Some(-32000),
        "gets the opaque failure",
    );

    // --- Authentication ---
    step(5, "Answer a relying party's challenge");
    let resp = alice.send(RpcRequest::new(
        4,
        "did_authenticate",
        json!({ "aud": "https://app.example", "nonce": "c0ffee", "paths": [] }),
    ));
    let general: Option<GeneralJws> = resp.result.and_then(|r| serde_json::from_value(r).ok());
    let verified = general
        .as_ref()
        .and_then(|g| g.to_compact(0))
        .and_then(|compact| verify_jws(&compact, &public_key).ok());
    if let Some(payload) = verified.as_ref().and_then(|v| v.payload_json::<Value>()) {
        field("aud", &payload["aud"]);
        field("exp", &payload["exp"]);
    }
    check(verified.is_some(), "signed by the DID");

    println!();
}
