//! Property-based tests for the editor transport codec
//!
//! Any valid group record survives an encode/decode cycle unchanged, the
//! encoded form only uses URL-safe characters, and decoding arbitrary input
//! yields a value or an error without panicking.

use mcstatus_core::codec::{decode, encode};
use proptest::prelude::*;

use super::generators::arb_group;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Round-trip: decode(encode(x)) == x for every valid record
    #[test]
    fn codec_round_trip(config in arb_group()) {
        let encoded = encode(&config).expect("encoding a valid record should succeed");
        let decoded = decode(&encoded).expect("decoding our own output should succeed");
        prop_assert_eq!(decoded, config);
    }

    /// Encoded output never needs escaping in a URL query
    #[test]
    fn codec_output_is_url_safe(config in arb_group()) {
        let encoded = encode(&config).expect("encoding a valid record should succeed");
        prop_assert!(encoded
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    /// Arbitrary text never panics the decoder
    #[test]
    fn decode_arbitrary_text_does_not_panic(input in ".{0,256}") {
        let _ = decode(&input);
    }

    /// Arbitrary URL-safe text never panics the decoder
    #[test]
    fn decode_arbitrary_base64_does_not_panic(input in "[A-Za-z0-9_-]{0,256}") {
        let _ = decode(&input);
    }

    /// Padding and surrounding whitespace do not change the result
    #[test]
    fn decode_ignores_padding_and_whitespace(config in arb_group()) {
        let encoded = encode(&config).expect("encoding a valid record should succeed");
        let padding = "=".repeat((4 - encoded.len() % 4) % 4);
        let decorated = format!("\n {encoded}{padding} \t");
        prop_assert_eq!(decode(&decorated).expect("decorated input should decode"), config);
    }
}
