use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use bullpen::auth::{ResetTokenError, ResetTokenService, PASSWORD_RESET_KIND};
use bullpen::config::ConfigError;

const SECRET: &str = "base-secret-for-reset-tests";

fn service() -> ResetTokenService {
    ResetTokenService::new(SECRET, Duration::minutes(15)).unwrap()
}

/// Sign arbitrary claims under the same derived key the service uses.
fn sign_raw(claims: &serde_json::Value, password_hash: &str) -> String {
    let key = format!("{SECRET}{password_hash}");
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .unwrap()
}

// ── Issue / verify ──────────────────────────────────────────────

#[test]
fn issued_token_verifies_with_same_hash() {
    let svc = service();
    let token = svc.issue("u1", "a@x.com", "hash-v1").unwrap();

    let claim = svc.verify(&token, "hash-v1").unwrap();
    assert_eq!(claim.subject, "u1");
    assert_eq!(claim.email, "a@x.com");
    assert_eq!(claim.kind, PASSWORD_RESET_KIND);
    assert!(claim.expires_at > claim.issued_at);
}

#[test]
fn default_ttl_is_fifteen_minutes() {
    let svc = service();
    let token = svc.issue("u1", "a@x.com", "hash-v1").unwrap();

    let claim = svc.verify(&token, "hash-v1").unwrap();
    assert_eq!(claim.expires_at - claim.issued_at, 15 * 60);
}

#[test]
fn verify_fails_after_password_change() {
    let svc = service();
    let token = svc.issue("u1", "a@x.com", "hash-v1").unwrap();

    let err = svc.verify(&token, "hash-v2").unwrap_err();
    assert!(matches!(err, ResetTokenError::InvalidToken));
}

#[test]
fn verify_fails_for_every_other_hash() {
    let svc = service();
    let hashes = ["", "hash-v1", "hash-v1 ", "HASH-V1", "$argon2id$v=19$m=19456,t=2,p=1$abc$def"];

    for issued_with in hashes {
        let token = svc.issue("u7", "coach@club.org", issued_with).unwrap();
        for checked_with in hashes.iter().filter(|h| **h != issued_with) {
            let err = svc.verify(&token, checked_with).unwrap_err();
            assert!(
                matches!(err, ResetTokenError::InvalidToken),
                "issued with {issued_with:?}, verified with {checked_with:?}"
            );
        }
    }
}

#[test]
fn already_expired_token_is_rejected() {
    let svc = service();
    let token = svc
        .issue_with_ttl("u1", "a@x.com", "hash-v1", Duration::seconds(-1))
        .unwrap();

    let err = svc.verify(&token, "hash-v1").unwrap_err();
    assert!(matches!(err, ResetTokenError::InvalidToken));
}

#[test]
fn short_lived_token_expires() {
    let svc = service();
    let token = svc
        .issue_with_ttl("u1", "a@x.com", "hash-v1", Duration::seconds(1))
        .unwrap();

    let claim = svc.verify(&token, "hash-v1").unwrap();
    assert_eq!(claim.subject, "u1");

    std::thread::sleep(std::time::Duration::from_millis(2100));

    let err = svc.verify(&token, "hash-v1").unwrap_err();
    assert!(matches!(err, ResetTokenError::InvalidToken));
}

#[test]
fn wrong_kind_is_rejected_even_when_signature_is_valid() {
    let svc = service();
    let now = Utc::now().timestamp();
    let token = sign_raw(
        &json!({
            "sub": "u1",
            "email": "a@x.com",
            "kind": "session",
            "iat": now,
            "exp": now + 600,
        }),
        "hash-v1",
    );

    let err = svc.verify(&token, "hash-v1").unwrap_err();
    match err {
        ResetTokenError::WrongClaimKind { found } => assert_eq!(found, "session"),
        other => panic!("expected WrongClaimKind, got {other:?}"),
    }
}

#[test]
fn hand_signed_reset_claim_is_accepted() {
    let svc = service();
    let now = Utc::now().timestamp();
    let token = sign_raw(
        &json!({
            "sub": "u9",
            "email": "parent@club.org",
            "kind": PASSWORD_RESET_KIND,
            "iat": now,
            "exp": now + 600,
        }),
        "hash-v1",
    );

    let claim = svc.verify(&token, "hash-v1").unwrap();
    assert_eq!(claim.subject, "u9");
    assert_eq!(claim.expires_at, now + 600);
}

#[test]
fn token_from_other_base_secret_is_rejected() {
    let other = ResetTokenService::new("a-different-secret", Duration::minutes(15)).unwrap();
    let token = other.issue("u1", "a@x.com", "hash-v1").unwrap();

    let err = service().verify(&token, "hash-v1").unwrap_err();
    assert!(matches!(err, ResetTokenError::InvalidToken));
}

#[test]
fn tampered_payload_is_rejected() {
    let svc = service();
    let token = svc.issue("u1", "a@x.com", "hash-v1").unwrap();
    let other_subject = svc.issue("u2", "a@x.com", "hash-v1").unwrap();

    // Second token's payload under the first token's signature
    let parts: Vec<&str> = token.split('.').collect();
    let forged_parts: Vec<&str> = other_subject.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

    let err = svc.verify(&spliced, "hash-v1").unwrap_err();
    assert!(matches!(err, ResetTokenError::InvalidToken));
}

#[test]
fn malformed_tokens_are_rejected() {
    let svc = service();
    for token in ["", "not-a-token", "a.b.c", "...."] {
        let err = svc.verify(token, "hash-v1").unwrap_err();
        assert!(matches!(err, ResetTokenError::InvalidToken), "token {token:?}");
    }
}

#[test]
fn empty_base_secret_is_a_configuration_error() {
    let err = ResetTokenService::new("", Duration::minutes(15)).unwrap_err();
    assert!(matches!(err, ConfigError::EmptySecret));
}

// ── Peek ────────────────────────────────────────────────────────

#[test]
fn peek_subject_reads_unverified_subject() {
    let svc = service();
    let token = svc.issue("u42", "a@x.com", "hash-v1").unwrap();

    assert_eq!(svc.peek_subject(&token).unwrap(), "u42");
}

#[test]
fn peek_subject_rejects_garbage_and_expired_tokens() {
    let svc = service();
    assert!(matches!(
        svc.peek_subject("garbage"),
        Err(ResetTokenError::InvalidToken)
    ));

    let expired = svc
        .issue_with_ttl("u1", "a@x.com", "hash-v1", Duration::seconds(-5))
        .unwrap();
    assert!(matches!(
        svc.peek_subject(&expired),
        Err(ResetTokenError::InvalidToken)
    ));
}

// ── Sharing ─────────────────────────────────────────────────────

#[test]
fn service_can_be_shared_across_threads() {
    let svc = service();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let svc = &svc;
            scope.spawn(move || {
                let subject = format!("u{i}");
                let hash = format!("hash-{i}");
                let token = svc.issue(&subject, "a@x.com", &hash).unwrap();
                assert_eq!(svc.verify(&token, &hash).unwrap().subject, subject);
            });
        }
    });
}

#[test]
fn services_with_different_secrets_coexist() {
    let a = ResetTokenService::new("secret-a", Duration::minutes(15)).unwrap();
    let b = ResetTokenService::new("secret-b", Duration::minutes(15)).unwrap();

    let from_a = a.issue("u1", "a@x.com", "hash-v1").unwrap();
    let from_b = b.issue("u1", "a@x.com", "hash-v1").unwrap();

    assert!(a.verify(&from_a, "hash-v1").is_ok());
    assert!(b.verify(&from_b, "hash-v1").is_ok());
    assert!(a.verify(&from_b, "hash-v1").is_err());
    assert!(b.verify(&from_a, "hash-v1").is_err());
}
