use ir_proto::{analyze, forge, FormatTag, UnknownFormat};

#[test]
fn eof() {
    let empty: &[u8] = &[];
    assert_eq!(analyze(empty), Err(UnknownFormat));
}

#[test]
fn nec_round_trip_carries_custom_and_cmd() {
    let mut buf = [0u8; 256];
    forge::nec(&mut buf, 0xa55a, 0x7e);
    let decoded = analyze(&buf).unwrap();
    assert_eq!(decoded.tag, FormatTag::Nec);
    assert_eq!(decoded.summary, "custom=a55a cmd=7e");
}

#[test]
fn nec_distinct_cmds_decode_to_distinct_summaries() {
    let mut buf = [0u8; 256];
    forge::nec(&mut buf, 0x0001, 0x00);
    let mut other = [0u8; 256];
    forge::nec(&mut other, 0x0001, 0x01);
    assert_ne!(analyze(&buf).unwrap().summary, analyze(&other).unwrap().summary);
}

#[test]
fn aeha_round_trip_reports_custom_and_cmd() {
    let mut buf = [0u8; 256];
    forge::aeha(&mut buf, 0x2002, 0x0004_1213);
    let decoded = analyze(&buf).unwrap();
    assert_eq!(decoded.tag, FormatTag::Aeha);
    assert!(decoded.summary.starts_with("custom=2002"));
}

#[test]
fn daikin_round_trip_reports_custom_and_cmd() {
    let mut buf = [0u8; 256];
    forge::daikin(&mut buf, 0x1142, 0x0003_4455);
    let decoded = analyze(&buf).unwrap();
    assert_eq!(decoded.tag, FormatTag::Daikin);
    assert!(decoded.summary.starts_with("custom=1142"));
}

#[test]
fn sony_round_trip_with_extended_prod_field() {
    let mut buf = [0u8; 256];
    forge::sony(&mut buf, 0x03a1, 0x10);
    let decoded = analyze(&buf).unwrap();
    assert_eq!(decoded.tag, FormatTag::Sony);
    assert_eq!(decoded.summary, "prod=03a1 cmd=10");
}

#[test]
fn formats_are_tried_in_fixed_priority_order() {
    // AEHA is tried before NEC; a buffer holding a forged NEC waveform
    // must not be misclassified as AEHA just because AEHA goes first,
    // since AEHA's timing windows are disjoint from NEC's.
    let mut buf = [0u8; 256];
    forge::nec(&mut buf, 0x4242, 0x33);
    assert_eq!(analyze(&buf).unwrap().tag, FormatTag::Nec);
}

#[test]
fn truncated_waveform_is_unrecognized() {
    let mut buf = [0u8; 256];
    forge::nec(&mut buf, 0x1234, 0x56);
    // Cut the buffer off mid-leader: nothing should match a waveform
    // that never completes a single cycle.
    let truncated = &buf[..4];
    assert_eq!(analyze(truncated), Err(UnknownFormat));
}
