use keystone_credential::{CredentialManager, KdfParams, Salt, HASH_SIZE, SALT_SIZE};
use keystone_types::Credential;
use pretty_assertions::assert_eq;

fn manager() -> CredentialManager {
    CredentialManager::new(KdfParams::fast_insecure())
}

// ── hash / verify ────────────────────────────────────────────────

#[test]
fn correct_password_verifies() {
    let mgr = manager();
    let cred = mgr.hash("s3cr3t!").unwrap();
    assert!(mgr.verify("s3cr3t!", &cred));
}

#[test]
fn wrong_password_fails() {
    let mgr = manager();
    let cred = mgr.hash("s3cr3t!").unwrap();
    assert!(!mgr.verify("s3cr3t?", &cred));
    assert!(!mgr.verify("", &cred));
}

#[test]
fn hashing_twice_never_reuses_a_salt() {
    let mgr = manager();
    let first = mgr.hash("same-password").unwrap();
    let second = mgr.hash("same-password").unwrap();
    assert_ne!(first.salt, second.salt);
    assert_ne!(first.password_hash, second.password_hash);
}

#[test]
fn hash_with_salt_is_deterministic() {
    let mgr = manager();
    let salt = Salt::from_bytes([7u8; SALT_SIZE]);
    let a = mgr.hash_with_salt("pw", &salt).unwrap();
    let b = mgr.hash_with_salt("pw", &salt).unwrap();
    assert_eq!(a.password_hash, b.password_hash);
    assert_eq!(a.salt, b.salt);
}

#[test]
fn plaintext_never_appears_in_the_credential() {
    let mgr = manager();
    let cred = mgr.hash("hunter2hunter2").unwrap();
    assert!(!cred.password_hash.contains("hunter2"));
    assert!(!cred.salt.contains("hunter2"));
}

#[test]
fn unicode_passwords_roundtrip() {
    let mgr = manager();
    let cred = mgr.hash("p\u{00e4}ssw\u{00f6}rd\u{1f600}").unwrap();
    assert!(mgr.verify("p\u{00e4}ssw\u{00f6}rd\u{1f600}", &cred));
    assert!(!mgr.verify("password", &cred));
}

#[test]
fn tampered_hash_fails_closed() {
    let mgr = manager();
    let mut cred = mgr.hash("pw").unwrap();
    cred.password_hash = "not base64 at all!!".to_string();
    assert!(!mgr.verify("pw", &cred));
}

#[test]
fn tampered_salt_fails_closed() {
    let mgr = manager();
    let mut cred = mgr.hash("pw").unwrap();
    cred.salt = "AAAA".to_string(); // wrong decoded length
    assert!(!mgr.verify("pw", &cred));
}

#[test]
fn zero_time_cost_params_error_out() {
    let mgr = CredentialManager::new(KdfParams {
        memory_cost: 1024,
        time_cost: 0,
        parallelism: 1,
    });
    assert!(mgr.hash("pw").is_err());
}

// ── verify_dummy ─────────────────────────────────────────────────

#[test]
fn dummy_verify_is_always_false() {
    let mgr = manager();
    assert!(!mgr.verify_dummy("anything"));
    assert!(!mgr.verify_dummy(""));
}

// ── Salt ─────────────────────────────────────────────────────────

#[test]
fn random_salts_are_unique() {
    assert_ne!(Salt::random(), Salt::random());
}

#[test]
fn salt_base64_roundtrip() {
    let salt = Salt::from_bytes([42u8; SALT_SIZE]);
    let decoded = Salt::from_base64(&salt.to_base64()).unwrap();
    assert_eq!(salt, decoded);
}

#[test]
fn salt_rejects_wrong_length_base64() {
    assert!(Salt::from_base64("c2hvcnQ").is_none());
    assert!(Salt::from_base64("").is_none());
}

// ── stored form ──────────────────────────────────────────────────

#[test]
fn hash_output_is_32_bytes_base64() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let cred = manager().hash("pw").unwrap();
    assert_eq!(STANDARD.decode(&cred.password_hash).unwrap().len(), HASH_SIZE);
    assert_eq!(STANDARD.decode(&cred.salt).unwrap().len(), SALT_SIZE);
}

#[test]
fn credential_comparison_ignores_manager_instance() {
    // A credential hashed by one manager verifies under another with the
    // same parameters; parameters are not baked into the stored form.
    let cred = manager().hash("pw").unwrap();
    let other = CredentialManager::new(KdfParams::fast_insecure());
    assert!(other.verify("pw", &cred));
    let _ = Credential {
        password_hash: cred.password_hash.clone(),
        salt: cred.salt.clone(),
    };
}
