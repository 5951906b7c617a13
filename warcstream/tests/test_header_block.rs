use std::io::Read;

use warcstream::{
    read_header_block, DiagnosisType, Diagnostics, HeaderEncoding, HeaderLineKind,
    NewlineMode, NewlineRun, PushbackCountingSource, ReaderConfig,
};

const RECORD: &[u8] = b"WARC/1.0\r\n\
WARC-Type: response\r\n\
WARC-Target-URI: http://example.com/\r\n\
Content-Type: application/http;\r\n msgtype=response\r\n\
Content-Length: 34\r\n\
\r\n\
HTTP/1.1 200 OK\r\n\
Server: x\n\
\r\n\
hello\r\n\r\n";

#[test]
fn warc_record_with_http_payload() {
    let mut source = PushbackCountingSource::with_default_capacity(RECORD);
    let mut diagnostics = Diagnostics::new();

    let warc = read_header_block(&mut source, ReaderConfig::warc_header(), true, &mut diagnostics)
        .unwrap();
    assert!(warc.terminated);
    assert_eq!(warc.headers.status_line(), "WARC/1.0");
    assert_eq!(warc.headers.len(), 4);
    assert_eq!(
        warc.headers.get("content-type").as_deref(),
        Some("application/http; msgtype=response")
    );
    assert!(warc.anomalies.is_empty());
    assert!(!diagnostics.has_errors() && !diagnostics.has_warnings());
    assert_eq!(source.consumed(), warc.raw.len() as u64);

    source.set_counter(0);
    let length: u64 = warc.headers.get("Content-Length").unwrap().parse().unwrap();
    let http = read_header_block(&mut source, ReaderConfig::http_header(), true, &mut diagnostics)
        .unwrap();
    assert_eq!(http.headers.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(http.headers.get("server").as_deref(), Some("x"));
    assert_eq!(diagnostics.warnings().len(), 1);
    assert_eq!(diagnostics.warnings()[0].entity, "Server");
    assert_eq!(diagnostics.warnings()[0].kind, DiagnosisType::ErrorExpected);

    let remaining = length - source.counter();
    let mut body = Vec::new();
    (&mut source).take(remaining).read_to_end(&mut body).unwrap();
    assert_eq!(body, b"hello");

    let trailer = NewlineRun::parse(&mut source, NewlineMode::CrLf).unwrap();
    assert_eq!(trailer.count, 2);
    assert!(trailer.is_clean());
    assert_eq!(source.consumed(), RECORD.len() as u64);
}

#[test]
fn unterminated_block_and_invalid_lines() {
    let input = b"WARC/1.0\r\nno colon here\r\nWARC-Filename: \"broken\r\n";
    let mut source = PushbackCountingSource::with_default_capacity(&input[..]);
    let mut diagnostics = Diagnostics::new();
    let block = read_header_block(&mut source, ReaderConfig::warc_header(), true, &mut diagnostics)
        .unwrap();

    assert!(!block.terminated);
    assert!(block.headers.is_empty());
    assert_eq!(block.invalid_lines.len(), 2);
    assert_eq!(block.invalid_lines[0].kind(), HeaderLineKind::PlainLine);
    assert_eq!(block.invalid_lines[1].kind(), HeaderLineKind::Undecodable);
    assert_eq!(block.raw, input);

    let kinds: Vec<DiagnosisType> = diagnostics.errors().iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosisType::Invalid));
    assert!(kinds.contains(&DiagnosisType::Undecodable));
    assert!(kinds.contains(&DiagnosisType::ErrorExpected));
}

#[test]
fn empty_stream_has_no_status_line() {
    let mut source = PushbackCountingSource::with_default_capacity(&b""[..]);
    let mut diagnostics = Diagnostics::new();
    let block = read_header_block(
        &mut source,
        ReaderConfig::header(HeaderEncoding::UsAscii, false),
        true,
        &mut diagnostics,
    )
    .unwrap();
    assert!(block.raw.is_empty());
    assert_eq!(diagnostics.errors()[0].kind, DiagnosisType::UnexpectedEof);
}
