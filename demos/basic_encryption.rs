//! Basic key-based encryption example
//!
//! This example demonstrates how to:
//! - Derive key material directly from a 64-byte master key
//! - Encrypt and decrypt with the authenticated frame format
//! - Attach and verify associated data
//! - Use the raw CTR frame format when authentication is handled elsewhere

use ruc::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== RUC: Basic Encryption Example ===\n");

    println!("1. Generating a master key...");
    let mut key = [0u8; 64];
    getrandom::getrandom(&mut key)?;
    println!("   key size: {} bytes", key.len());

    println!("\n2. Encrypting with the AEAD frame...");
    let message = b"Hello, Random Universe!";
    let frame = aead_encrypt(message, &key, None, None)?;
    println!("   frame size: {} bytes (nonce + ciphertext + tag)", frame.len());

    println!("\n3. Decrypting...");
    let recovered = aead_decrypt(&frame, &key, None)?;
    assert_eq!(recovered, message);
    println!("   recovered: \"{}\"", String::from_utf8_lossy(&recovered));

    println!("\n4. Encrypting with associated data...");
    let ad = b"message-id:42";
    let frame_with_ad = aead_encrypt(message, &key, Some(ad), None)?;
    let recovered_with_ad = aead_decrypt(&frame_with_ad, &key, Some(ad))?;
    assert_eq!(recovered_with_ad, message);
    println!("   associated data verified alongside the ciphertext");

    println!("\n5. Wrong associated data is rejected...");
    match aead_decrypt(&frame_with_ad, &key, Some(b"message-id:43")) {
        Err(ruc::Error::Authentication) => println!("   rejected, as expected"),
        other => panic!("expected an authentication failure, got {other:?}"),
    }

    println!("\n6. Raw CTR frame (unauthenticated, smaller)...");
    let ctr_frame = encrypt_ctr(message, &key, None)?;
    let ctr_recovered = decrypt_ctr(&ctr_frame, &key)?;
    assert_eq!(ctr_recovered, message);
    println!("   CTR frame size: {} bytes (no tag)", ctr_frame.len());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
