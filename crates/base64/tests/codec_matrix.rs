//! Round-trip and interop matrix for the line codecs.

use rand::{Rng, SeedableRng};
use strpack_base64::{
    decode_lax, decode_strict, encode_strict, qp_decode, qp_encode, uu_decode, LineEncoder,
};

fn random_payloads() -> Vec<Vec<u8>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    (0..200)
        .map(|_| {
            let len = rng.gen_range(0..200);
            (0..len).map(|_| rng.gen()).collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// base64
// ---------------------------------------------------------------------------

#[test]
fn strict_round_trips_random_payloads() {
    for payload in random_payloads() {
        let encoded = encode_strict(&payload);
        assert!(!encoded.contains(&b'\n'));
        assert_eq!(decode_strict(&encoded), Ok(payload));
    }
}

#[test]
fn wrapped_round_trips_through_lax_decoder() {
    for payload in random_payloads() {
        let mut encoded = Vec::new();
        LineEncoder::BASE64.encode_lines(&mut encoded, &payload, 45).unwrap();
        assert_eq!(encoded.iter().filter(|&&b| b == b'\n').count(), payload.len().div_ceil(45));
        assert_eq!(decode_lax(&encoded), payload);
    }
}

#[test]
fn known_vectors() {
    let cases: [(&[u8], &[u8]); 4] = [
        (b"", b""),
        (b"f", b"Zg=="),
        (b"fo", b"Zm8="),
        (b"foobar", b"Zm9vYmFy"),
    ];
    for (plain, encoded) in cases {
        assert_eq!(encode_strict(plain), encoded);
        assert_eq!(decode_strict(encoded).as_deref(), Ok(plain));
    }
}

// ---------------------------------------------------------------------------
// uuencode
// ---------------------------------------------------------------------------

#[test]
fn uu_round_trips_random_payloads() {
    for payload in random_payloads() {
        let mut encoded = Vec::new();
        LineEncoder::UUENCODE.encode_lines(&mut encoded, &payload, 45).unwrap();
        assert_eq!(uu_decode(&encoded), payload);
    }
}

#[test]
fn uu_line_of_45_bytes_starts_with_m() {
    let mut encoded = Vec::new();
    LineEncoder::UUENCODE.encode_lines(&mut encoded, &[b'x'; 46], 45).unwrap();
    assert_eq!(encoded[0], b'M');
    assert_eq!(encoded[62], b'!');
}

// ---------------------------------------------------------------------------
// quoted-printable
// ---------------------------------------------------------------------------

#[test]
fn qp_round_trips_random_payloads() {
    for payload in random_payloads() {
        let mut encoded = Vec::new();
        qp_encode(&mut encoded, &payload, 72);
        assert!(encoded.iter().all(|&b| b == b'\n' || b == b'\t' || (32..127).contains(&b)));
        assert_eq!(qp_decode(&encoded), payload);
    }
}
