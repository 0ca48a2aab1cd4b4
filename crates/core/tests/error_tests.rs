// ═══════════════════════════════════════════════════════════════════
// Error Tests — messages and conversions
// ═══════════════════════════════════════════════════════════════════

use uuid::Uuid;

use finance_vault_core::errors::CoreError;

#[test]
fn display_messages() {
    assert_eq!(
        CoreError::Validation("Amount is required".into()).to_string(),
        "Validation failed: Amount is required"
    );
    assert_eq!(CoreError::UnsupportedVersion(9).to_string(), "Unsupported file version: 9");
    assert_eq!(
        CoreError::Api {
            backend: "PostgREST".into(),
            message: "insert transaction failed with 409".into(),
        }
        .to_string(),
        "Backend error (PostgREST): insert transaction failed with 409"
    );
    assert!(CoreError::Unauthenticated.to_string().contains("Not authenticated"));
    assert!(CoreError::Decryption.to_string().contains("wrong password"));
}

#[test]
fn not_found_helper() {
    let id = Uuid::nil();
    let err = CoreError::not_found("Transaction", id);
    assert!(matches!(err, CoreError::NotFound { entity: "Transaction", .. }));
    assert_eq!(err.to_string(), format!("Transaction not found: {id}"));
}

#[test]
fn io_error_becomes_file_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err: CoreError = io.into();
    assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("no such file")));
}

#[test]
fn json_error_becomes_deserialization() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: CoreError = parse.into();
    assert!(matches!(err, CoreError::Deserialization(_)));
}

#[test]
fn bincode_error_becomes_serialization() {
    let bad = bincode::deserialize::<String>(&[0xFF]).unwrap_err();
    let err: CoreError = bad.into();
    assert!(matches!(err, CoreError::Serialization(_)));
}

#[test]
fn errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + 'static>() {}
    assert_send_sync::<CoreError>();
}
