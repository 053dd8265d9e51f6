//! End-to-end scenarios and universal invariants for the cipher (spec §8).

use ruc::block_core::{self, CipherState};
use ruc::key_material::{mix_iv, KeyMaterial};
use ruc::kdf::KdfProfile;
use ruc::modes::ctr;
use ruc::pipeline::{self, PipelineConfig};
use ruc::sbox;
use ruc::{aead_decrypt, aead_encrypt, decrypt_with_password, encrypt_with_password, Error};
use std::sync::Arc;

fn bit_difference_ratio(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let differing: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    differing as f64 / (a.len() as f64 * 8.0)
}

// S1: zero key, zero nonce, "hello world". Fixes the exact ciphertext a
// future refactor must continue to reproduce.
#[test]
fn s1_zero_key_zero_nonce_hello_world() {
    const EXPECTED: [u8; 32] = [
        0xe6, 0x64, 0x57, 0x05, 0x9f, 0xad, 0x98, 0x0a, 0xc3, 0xee, 0x5c, 0x27, 0x9f, 0xf9, 0x3f,
        0xc6, 0x02, 0x29, 0xac, 0xd6, 0x0c, 0x05, 0x83, 0x17, 0xc4, 0x54, 0xe4, 0x0d, 0x6b, 0x84,
        0xbe, 0xc7,
    ];

    let key = [0u8; 64];
    let nonce = [0u8; 16];
    let plaintext = b"hello world";

    let ciphertext = ctr::encrypt_ctr(plaintext, &key, Some(nonce)).unwrap();
    assert_eq!(ciphertext.len(), 16 + 32);
    assert_eq!(&ciphertext[..16], &nonce[..]);
    assert_eq!(&ciphertext[16..], &EXPECTED[..]);

    let decrypted = ctr::decrypt_ctr(&ciphertext, &key).unwrap();
    assert_eq!(decrypted, plaintext);
}

// S2: a 64-byte ramp key, nonce 0x10..0x1F, 4096 bytes of 0xAA.
#[test]
fn s2_large_uniform_plaintext_roundtrips_and_diffuses() {
    let mut key = [0u8; 64];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    let mut nonce = [0u8; 16];
    for (i, b) in nonce.iter_mut().enumerate() {
        *b = 0x10 + i as u8;
    }
    let plaintext = vec![0xAAu8; 4096];

    let ciphertext = ctr::encrypt_ctr(&plaintext, &key, Some(nonce)).unwrap();
    let decrypted = ctr::decrypt_ctr(&ciphertext, &key).unwrap();
    assert_eq!(decrypted, plaintext);

    let body = &ciphertext[16..];
    assert!(bit_difference_ratio(body, &plaintext) >= 0.45);
}

// S3: same key as S2; nonce A vs. nonce B with one LSB flipped.
#[test]
fn s3_nonce_avalanche() {
    let mut key = [0u8; 64];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    let plaintext = vec![0xAAu8; 4096];
    let nonce_a = [0u8; 16];
    let mut nonce_b = [0u8; 16];
    nonce_b[15] ^= 1;

    let ct_a = ctr::encrypt_ctr(&plaintext, &key, Some(nonce_a)).unwrap();
    let ct_b = ctr::encrypt_ctr(&plaintext, &key, Some(nonce_b)).unwrap();
    assert!(bit_difference_ratio(&ct_a[16..], &ct_b[16..]) >= 0.45);
}

// S4: password frame, tag tamper.
#[test]
fn s4_password_frame_tag_tamper_is_rejected() {
    let mut frame = encrypt_with_password(
        b"attack at dawn",
        b"correct horse battery staple",
        KdfProfile::Interactive,
    )
    .unwrap();
    let last = frame.len() - 1;
    frame[last] ^= 0xFF;

    let result = decrypt_with_password(&frame, b"correct horse battery staple", KdfProfile::Interactive);
    assert!(matches!(result, Err(Error::Authentication)));
}

// S5: S-box for key = [0xAA; 64], round 0.
#[test]
fn s5_sbox_bijective_and_nonlinear() {
    let key = [0xAAu8; 64];
    let generated = sbox::generate_sbox(&key, 0);
    assert!(sbox::is_bijective(&generated));
    assert!(sbox::nonlinearity(&generated) >= 100);
}

// S6: a 64 MiB stream, worker counts 1/2/8 all byte-identical.
#[test]
fn s6_parallel_equivalence_at_scale() {
    let key = [0x7Fu8; 64];
    let key_material = Arc::new(KeyMaterial::expand(&key).unwrap());
    let iv = ctr::derive_iv(&[0x21u8; 16]);

    let total_bytes = 64 * 1024 * 1024;
    let mut blocks = vec![0u8; total_bytes];
    for (i, b) in blocks.iter_mut().enumerate() {
        *b = (i % 251) as u8;
    }

    let mut outputs = Vec::new();
    for &workers in &[1usize, 2, 8] {
        let config = PipelineConfig {
            worker_count: workers,
            chunk_size_override: None,
            progress_rate_limit: 100,
        };
        outputs.push(pipeline::process_blocks(
            Arc::clone(&key_material),
            iv,
            0,
            blocks.clone(),
            &config,
            None,
        ));
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

// Universal invariant 1: roundtrip across CTR, AEAD, and password variants.
#[test]
fn roundtrip_across_every_frame_format() {
    let key = [5u8; 64];
    let plaintext = b"every format should get the plaintext back";

    let ctr_frame = ctr::encrypt_ctr(plaintext, &key, None).unwrap();
    assert_eq!(ctr::decrypt_ctr(&ctr_frame, &key).unwrap(), plaintext);

    let aead_frame = aead_encrypt(plaintext, &key, None, None).unwrap();
    assert_eq!(aead_decrypt(&aead_frame, &key, None).unwrap(), plaintext);

    let password_frame = encrypt_with_password(plaintext, b"hunter2", KdfProfile::Interactive).unwrap();
    assert_eq!(
        decrypt_with_password(&password_frame, b"hunter2", KdfProfile::Interactive).unwrap(),
        plaintext
    );
}

// Universal invariant 2: determinism.
#[test]
fn determinism_for_fixed_inputs() {
    let key = [9u8; 64];
    let nonce = [2u8; 16];
    let plaintext = b"same inputs, same output";
    let a = ctr::encrypt_ctr(plaintext, &key, Some(nonce)).unwrap();
    let b = ctr::encrypt_ctr(plaintext, &key, Some(nonce)).unwrap();
    assert_eq!(a, b);
}

// Universal invariant 4: key avalanche.
#[test]
fn key_avalanche() {
    let key_a = [3u8; 64];
    let mut key_b = key_a;
    key_b[0] ^= 1;
    let nonce = [0u8; 16];
    let plaintext = vec![0x5Au8; 4096];

    let ct_a = ctr::encrypt_ctr(&plaintext, &key_a, Some(nonce)).unwrap();
    let ct_b = ctr::encrypt_ctr(&plaintext, &key_b, Some(nonce)).unwrap();
    assert!(bit_difference_ratio(&ct_a[16..], &ct_b[16..]) >= 0.45);
}

// Universal invariant 6: selector properties hold across many keys.
#[test]
fn selector_properties_hold_across_keys() {
    for seed in 0u8..30 {
        let mut key = [0u8; 64];
        key[0] = seed;
        key[1] = seed.wrapping_mul(7);
        let material = KeyMaterial::expand(&key).unwrap();
        assert!(material.selectors.len() >= 16 && material.selectors.len() <= 31);
        for &sel in &material.selectors {
            assert_eq!(sel % 2, 1);
            assert_ne!(sel, 0);
        }
    }
}

// Universal invariant 7: AEAD authentication fails closed.
#[test]
fn aead_authentication_fails_closed_on_any_single_bit_flip() {
    let key = [11u8; 64];
    let frame = aead_encrypt(b"payload", &key, None, Some([4u8; 16])).unwrap();

    for bit_index in [0usize, frame.len() / 2, frame.len() - 1] {
        let mut tampered = frame.clone();
        tampered[bit_index] ^= 0x01;
        assert!(matches!(aead_decrypt(&tampered, &key, None), Err(Error::Authentication)));
    }
}

// Universal invariant 9: parallel equivalence for a smaller, fast case.
#[test]
fn parallel_equivalence_small() {
    let key = [6u8; 64];
    let key_material = Arc::new(KeyMaterial::expand(&key).unwrap());
    let iv = ctr::derive_iv(&[1u8; 16]);
    let blocks = vec![0x99u8; 32 * 50];

    let sequential = ctr::process_blocks(&key_material, &iv, 0, &blocks);
    for &workers in &[1usize, 4] {
        let config = PipelineConfig {
            worker_count: workers,
            chunk_size_override: Some(5),
            progress_rate_limit: 100,
        };
        let parallel = pipeline::process_blocks(
            Arc::clone(&key_material),
            iv,
            0,
            blocks.clone(),
            &config,
            None,
        );
        assert_eq!(parallel, sequential);
    }
}

// Universal invariant 10: key expansion is idempotent.
#[test]
fn key_expansion_is_idempotent() {
    let key = [13u8; 64];
    let a = KeyMaterial::expand(&key).unwrap();
    let b = KeyMaterial::expand(&key).unwrap();
    assert_eq!(a.registers, b.registers);
    assert_eq!(a.selectors, b.selectors);
    assert_eq!(a.round_keys, b.round_keys);
    assert_eq!(a.sboxes, b.sboxes);
}

// Single-block keystream derivation is usable directly, outside of CTR mode.
#[test]
fn block_core_keystream_is_reusable_across_states() {
    let key = [21u8; 64];
    let material = KeyMaterial::expand(&key).unwrap();
    let iv = [8u8; 32];
    let mut state = CipherState::new(mix_iv(&material.registers, &iv));
    let keystream = block_core::derive_keystream(&material, &iv, 0, &mut state);
    assert_eq!(keystream.len(), 32);
}
