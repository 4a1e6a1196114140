use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PigmentError::allocation("x")
            .to_string()
            .contains("allocation failure:")
    );
    assert!(
        PigmentError::invalid_format("x")
            .to_string()
            .contains("invalid format:")
    );
    assert!(
        PigmentError::incompatible_format("x")
            .to_string()
            .contains("incompatible format:")
    );
    assert!(PigmentError::not_found("x").to_string().contains("not found:"));
    assert!(
        PigmentError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PigmentError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
