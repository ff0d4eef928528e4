//! Round-trip properties of the string and variant time codecs.

use comutil::{
    bytes_to_wide, to_calendar, to_variant, wide_to_bytes, CalendarTimestamp, CodePage,
    CodecContext, ComutilError, ErrorPolicy, VariantTime,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_western_bytes_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let wide = bytes_to_wide(&bytes, CodePage::WINDOWS_1252).unwrap();
        prop_assert_eq!(wide.len(), bytes.len());
        let back = wide_to_bytes(Some(&wide), CodePage::WINDOWS_1252, false).unwrap();
        prop_assert_eq!(back, bytes);
    }

    #[test]
    fn prop_utf8_round_trip(text in any::<String>()) {
        let wide = bytes_to_wide(text.as_bytes(), CodePage::UTF8).unwrap();
        prop_assert_eq!(&wide, &text.encode_utf16().collect::<Vec<u16>>());
        let back = wide_to_bytes(Some(&wide), CodePage::UTF8, true).unwrap();
        prop_assert_eq!(back.last(), Some(&0));
        prop_assert_eq!(&back[..back.len() - 1], text.as_bytes());
    }

    #[test]
    fn prop_calendar_round_trip(
        year in 100u16..=9999,
        month in 1u16..=12,
        day in 1u16..=28,
        hour in 0u16..24,
        minute in 0u16..60,
        second in 0u16..60,
        millisecond in 0u16..1000,
    ) {
        let stamp = CalendarTimestamp::new(year, month, day, hour, minute, second, millisecond).unwrap();
        let variant = to_variant(&stamp).unwrap();
        let back = to_calendar(variant).unwrap();
        prop_assert_eq!(back, stamp, "variant = {}", variant);
    }
}

#[test]
fn test_ver_laptop_scenario() {
    let ctx = CodecContext::new(CodePage::WINDOWS_1252);
    let wide = ctx.bytes_to_wide(b"Ver Laptop").unwrap();
    assert_eq!(wide.len(), 10);
    assert_eq!(ctx.wide_to_bytes(Some(&wide), false).unwrap(), b"Ver Laptop");
}

#[test]
fn test_millisecond_scenario() {
    let stamp = CalendarTimestamp::new(2008, 6, 15, 14, 30, 7, 250).unwrap();
    let back = to_calendar(to_variant(&stamp).unwrap()).unwrap();
    assert_eq!(back.millisecond(), 250);
    assert_eq!(back, stamp);
}

#[test]
fn test_zero_millisecond_scenario() {
    let stamp = CalendarTimestamp::new(2008, 6, 15, 14, 30, 7, 0).unwrap();
    let back = to_calendar(to_variant(&stamp).unwrap()).unwrap();
    assert_eq!(back.millisecond(), 0);
    assert_eq!(back.second(), 7);
}

#[test]
fn test_every_millisecond_of_a_second() {
    for ms in 0..1000 {
        let stamp = CalendarTimestamp::new(2031, 12, 31, 23, 59, 59, ms).unwrap();
        let back = to_calendar(to_variant(&stamp).unwrap()).unwrap();
        assert_eq!(back, stamp, "ms = {}", ms);
    }
}

#[test]
fn test_empty_and_null_inputs() {
    assert!(bytes_to_wide(b"", CodePage::WINDOWS_1252).unwrap().is_empty());
    assert!(wide_to_bytes(None, CodePage::WINDOWS_1252, false)
        .unwrap()
        .is_empty());
    assert_eq!(
        wide_to_bytes(None, CodePage::WINDOWS_1252, true).unwrap(),
        vec![0u8]
    );
}

#[test]
fn test_length_error_produces_no_output() {
    let ctx = CodecContext::new(CodePage::WINDOWS_1252).with_max_len(8);
    let wide: Vec<u16> = "nine char".encode_utf16().collect();
    match ctx.wide_to_bytes(Some(&wide), true) {
        Err(ComutilError::Length { len, max }) => {
            assert_eq!(len, 9);
            assert_eq!(max, 8);
        }
        other => panic!("expected length error, got {:?}", other),
    }
}

#[test]
fn test_compatibility_mode_hides_failures() {
    let strict = CodecContext::new(CodePage::SHIFT_JIS);
    let lenient = strict.clone().with_policy(ErrorPolicy::Degrade);
    let truncated = [b'a', 0x81];

    assert!(matches!(
        strict.bridge_bytes_to_wide(&truncated),
        Err(ComutilError::Encoding { .. })
    ));
    assert_eq!(lenient.bridge_bytes_to_wide(&truncated).unwrap(), Vec::<u16>::new());
}

#[test]
fn test_variant_out_of_range() {
    assert!(matches!(
        to_calendar(VariantTime::new(3_000_000.0)),
        Err(ComutilError::Range(_))
    ));
}
