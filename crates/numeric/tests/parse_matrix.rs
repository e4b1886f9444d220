use std::io;
use std::sync::{Arc, Mutex};

use num_bigint::BigInt;
use proptest::prelude::*;
use strpack_buffers::{ByteList, ErrorKind};
use strpack_numeric::{byte_list_to_double, byte_list_to_inum, parse_double, parse_integer, Integer, NumberError};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&capture.0.lock().unwrap()).into_owned();
    (out, logs)
}

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

#[test]
fn integer_escalates_to_bignum() {
    let nines = "9".repeat(25);
    let expected = BigInt::from(10u8).pow(25) - 1u8;
    assert_eq!(
        parse_integer(nines.as_bytes(), 10, true),
        Ok(Integer::Bignum(expected))
    );

    let hex = format!("0x{}", "f".repeat(20));
    let value = parse_integer(hex.as_bytes(), 0, true).unwrap();
    assert_eq!(value.to_bigint(), (BigInt::from(1u8) << 80usize) - 1u8);

    let grouped = "1_000_000_000_000_000_000_000";
    assert_eq!(
        parse_integer(grouped.as_bytes(), 10, true).unwrap().to_string(),
        grouped.replace('_', "")
    );
}

#[test]
fn integer_bignum_rules_match_fixnum_rules() {
    let long = "1".repeat(30);
    for suffix in ["__1", "_", "x", " 1"] {
        let input = format!("{long}{suffix}");
        assert!(
            parse_integer(input.as_bytes(), 10, true).is_err(),
            "{input} should be rejected"
        );
    }
    let trailing_space = format!("{long}  \n");
    assert!(parse_integer(trailing_space.as_bytes(), 10, true).is_ok());

    let lax = format!("{long}__99");
    assert_eq!(
        parse_integer(lax.as_bytes(), 10, false).unwrap().to_string(),
        long
    );
}

#[test]
fn integer_error_kinds() {
    let err = parse_integer(b"zz", 10, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumberFormat);
    assert_eq!(err.to_string(), r#"invalid value for Integer(): "zz""#);

    let err = parse_integer(b"1", 99, true).unwrap_err();
    assert_eq!(err, NumberError::IllegalRadix(99));
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(err.to_string(), "illegal radix 99");
}

#[test]
fn integer_from_byte_list_view() {
    let mut list = ByteList::from_slice(b"xx0b1010yy");
    list.view(2, 6);
    assert_eq!(byte_list_to_inum(&list, 0, true), Ok(Integer::Fixnum(10)));
}

#[test]
fn integer_negative_base_is_default_radix() {
    assert_eq!(parse_integer(b"777", -8, true), Ok(Integer::Fixnum(0o777)));
    assert_eq!(parse_integer(b"0x10", -8, true), Ok(Integer::Fixnum(16)));
    assert_eq!(parse_integer(b"10", -1, true), Ok(Integer::Fixnum(10)));
}

// ---------------------------------------------------------------------------
// Floats
// ---------------------------------------------------------------------------

#[test]
fn float_strict_and_lax() {
    assert_eq!(parse_double(b"1.5", true), Ok(1.5));
    assert_eq!(parse_double(b"1.5  ", true), Ok(1.5));
    assert!(parse_double(b"1.5abc", true).is_err());
    assert_eq!(parse_double(b"1.5abc", false), Ok(1.5));
    assert_eq!(parse_double(b"", false), Ok(0.0));

    let err = parse_double(b"abc", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumberFormat);
    assert_eq!(err.to_string(), r#"invalid value for Float(): "abc""#);
}

#[test]
fn float_from_byte_list() {
    let list = ByteList::from("  6.02e23");
    assert_eq!(byte_list_to_double(&list, true), Ok(6.02e23));
}

#[test]
fn float_overflow_warns_and_clamps() {
    let (value, logs) = with_captured_logs(|| parse_double(b"1e400", true));
    assert_eq!(value, Ok(f64::MAX));
    assert!(logs.contains("Float 1e400 out of range"), "logs: {logs}");

    let long = format!("0.{}1e-400", "0".repeat(30));
    let (value, logs) = with_captured_logs(|| parse_double(long.as_bytes(), true));
    assert_eq!(value, Ok(f64::from_bits(1)));
    assert!(logs.contains("Float 0.000000000000000000... out of range"), "logs: {logs}");
}

#[test]
fn float_in_range_is_silent() {
    let (value, logs) = with_captured_logs(|| parse_double(b"1e300", true));
    assert_eq!(value, Ok(1e300));
    assert!(logs.is_empty(), "logs: {logs}");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn float_display_reparses_exactly(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        prop_assert_eq!(parse_double(format!("{v:e}").as_bytes(), true), Ok(v));
        prop_assert_eq!(parse_double(format!("{v:?}").as_bytes(), true), Ok(v));
    }

    #[test]
    fn float_parse_is_idempotent(s in "[0-9]{1,25}(\\.[0-9]{1,25})?([eE][+-]?[0-9]{1,3})?") {
        let first = parse_double(s.as_bytes(), true).unwrap();
        let again = parse_double(format!("{first:e}").as_bytes(), true).unwrap();
        prop_assert_eq!(first, again);
    }

    #[test]
    fn integer_matches_std_for_i64(v in any::<i64>(), radix in 2u32..=36) {
        let digits = strpack_numeric::i64_to_radix_bytes(v, radix, false).unwrap();
        prop_assert_eq!(parse_integer(&digits, radix as i32, true), Ok(Integer::Fixnum(v)));
    }

    #[test]
    fn sign_extended_digits_complement_the_value(v in i64::MIN..0, radix in prop::sample::select(vec![2u32, 4, 8, 16, 10, 36])) {
        let digits = strpack_numeric::twos_complement_digits(&BigInt::from(v), radix, false).unwrap();
        let fill = strpack_numeric::LOWER_DIGITS[radix as usize - 1];
        prop_assert_eq!(digits[0], fill);
        if digits.len() > 1 {
            prop_assert_ne!(digits[1], fill);
        }
        let unsigned = BigInt::parse_bytes(&digits, radix).unwrap();
        prop_assert_eq!(unsigned - BigInt::from(radix).pow(digits.len() as u32), BigInt::from(v));
    }

    #[test]
    fn integer_lax_never_fails(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
        prop_assert!(parse_integer(&bytes, 10, false).is_ok());
        prop_assert!(parse_double(&bytes, false).is_ok());
    }
}
