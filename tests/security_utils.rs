use hybrid_context::security::{
    require_valid, sanitize_input, validate_input, verify_secret, hash_secret, SecretHasher,
    ValidationError, SALT_HEX_LEN,
};

#[test]
fn hash_then_verify_with_custom_rounds() {
    let hasher = SecretHasher::new(1_000);
    let stored = hasher.hash("correct horse");

    assert_eq!(stored.len(), SALT_HEX_LEN + 128);
    assert!(stored.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hasher.verify(&stored, "correct horse"));
    assert!(!hasher.verify(&stored, "battery staple"));
}

#[test]
fn salts_differ_between_hashes() {
    let hasher = SecretHasher::new(10);
    let a = hasher.hash("same");
    let b = hasher.hash("same");

    assert_ne!(a, b);
    assert_ne!(&a[..SALT_HEX_LEN], &b[..SALT_HEX_LEN]);
}

#[test]
fn round_count_is_part_of_the_contract() {
    let stored = SecretHasher::new(10).hash("secret");
    assert!(!SecretHasher::new(11).verify(&stored, "secret"));
}

#[test]
fn default_hasher_round_trips() {
    let stored = hash_secret("pw");
    assert!(verify_secret(&stored, "pw"));
    assert!(!verify_secret(&stored, "pW"));
}

#[test]
fn truncated_or_garbage_hashes_never_verify() {
    let hasher = SecretHasher::new(10);
    assert!(!hasher.verify("", "x"));
    assert!(!hasher.verify("abc", "x"));
    let stored = hasher.hash("x");
    assert!(!hasher.verify(&stored[..SALT_HEX_LEN + 10], "x"));
}

#[test]
fn validation_rejects_statement_separators_and_comments() {
    assert!(validate_input("weather today"));
    assert!(!validate_input("a; b"));
    assert!(!validate_input("a -- b"));
    assert_eq!(
        require_valid("x--y"),
        Err(ValidationError::ForbiddenSequence { sequence: "--" })
    );
}

#[test]
fn sanitization_strips_forbidden_sequences() {
    assert_eq!(sanitize_input("a;b--c"), "abc");
    assert_eq!(sanitize_input("---"), "-");
    assert!(validate_input(&sanitize_input("drop;--table")));
    assert_eq!(sanitize_input("plain"), "plain");
}
