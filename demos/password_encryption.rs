//! Password-based encryption example
//!
//! This example demonstrates how to:
//! - Encrypt with a password instead of a raw key (Argon2id under the hood)
//! - Pick a KDF cost profile
//! - Observe authentication failure on a wrong password

use ruc::{decrypt_with_password, encrypt_with_password, Error, KdfProfile};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== RUC: Password-Based Encryption Example ===\n");

    let password = b"correct horse battery staple";
    let message = b"meet at the usual place, same time";

    println!("1. Encrypting with the default (Moderate) KDF profile...");
    let frame = encrypt_with_password(message, password, KdfProfile::default())?;
    println!("   frame size: {} bytes (salt + nonce + ciphertext + tag)", frame.len());

    println!("\n2. Decrypting with the correct password...");
    let recovered = decrypt_with_password(&frame, password, KdfProfile::default())?;
    assert_eq!(recovered, message);
    println!("   recovered: \"{}\"", String::from_utf8_lossy(&recovered));

    println!("\n3. Decrypting with the wrong password...");
    match decrypt_with_password(&frame, b"wrong password", KdfProfile::default()) {
        Err(Error::Authentication) => println!("   rejected, as expected"),
        other => panic!("expected an authentication failure, got {other:?}"),
    }

    println!("\n4. Using the Sensitive profile for a higher-value secret...");
    let sensitive_frame = encrypt_with_password(
        b"private key backup",
        password,
        KdfProfile::Sensitive,
    )?;
    let sensitive_recovered =
        decrypt_with_password(&sensitive_frame, password, KdfProfile::Sensitive)?;
    assert_eq!(sensitive_recovered, b"private key backup");
    println!("   Sensitive profile roundtrip succeeded (slower, more memory-hard)");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
