use std::io::Read;

use proptest::prelude::*;
use sha1::{Digest, Sha1};
use warcstream::{
    BoundedRecordingSource, CountingSource, DigestingSource, FixedLengthSource,
    HeaderLineReader, PushbackCountingSource, ReaderConfig, Source,
};

#[derive(Debug, Clone, Copy)]
enum Op {
    Byte,
    Bulk(usize),
    Skip(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Byte),
        (1usize..64).prop_map(Op::Bulk),
        (1u64..64).prop_map(Op::Skip),
    ]
}

/// Consume `source` with `ops` in a cycle until it is exhausted. Skipped
/// ranges are taken from `data` so the result can be compared with it.
fn drain<S: Source>(source: &mut S, data: &[u8], ops: &[Op]) -> Vec<u8> {
    let mut seen = Vec::new();
    let mut pos = 0usize;
    let mut idle = 0;
    for op in ops.iter().cycle() {
        let before = pos;
        match *op {
            Op::Byte => {
                let mut b = [0u8; 1];
                if source.read(&mut b).unwrap() == 1 {
                    seen.push(b[0]);
                    pos += 1;
                }
            }
            Op::Bulk(len) => {
                let mut buf = vec![0u8; len];
                let n = source.read(&mut buf).unwrap();
                seen.extend_from_slice(&buf[..n]);
                pos += n;
            }
            Op::Skip(n) => {
                let skipped = source.skip(n).unwrap() as usize;
                seen.extend_from_slice(&data[pos..pos + skipped]);
                pos += skipped;
            }
        }
        idle = if pos == before { idle + 1 } else { 0 };
        if pos >= data.len() && idle > ops.len() {
            break;
        }
    }
    seen
}

proptest! {
    #[test]
    fn layered_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        ops in proptest::collection::vec(op(), 1..16),
        order in 0usize..3,
    ) {
        let len = data.len() as u64;
        let seen = match order {
            0 => {
                let mut stack = PushbackCountingSource::new(
                    CountingSource::new(FixedLengthSource::new(
                        BoundedRecordingSource::new(&data[..], len),
                        len,
                    )),
                    16,
                ).unwrap();
                let seen = drain(&mut stack, &data, &ops);
                prop_assert_eq!(stack.consumed(), len);
                prop_assert_eq!(stack.into_inner().consumed(), len);
                seen
            }
            1 => {
                let mut stack = CountingSource::new(BoundedRecordingSource::with_recording(
                    PushbackCountingSource::new(&data[..], 8).unwrap(),
                    len,
                ));
                let seen = drain(&mut stack, &data, &ops);
                prop_assert_eq!(stack.consumed(), len);
                let bounded = stack.into_inner();
                prop_assert_eq!(bounded.recording(), &data[..]);
                prop_assert_eq!(bounded.into_inner().consumed(), len);
                seen
            }
            _ => {
                let mut stack = FixedLengthSource::new(
                    CountingSource::new(CountingSource::new(&data[..])),
                    len,
                );
                let seen = drain(&mut stack, &data, &ops);
                prop_assert_eq!(stack.remaining(), 0);
                let outer = stack.into_inner();
                prop_assert_eq!(outer.consumed(), len);
                prop_assert_eq!(outer.into_inner().consumed(), len);
                seen
            }
        };
        prop_assert_eq!(seen, data);
    }

    #[test]
    fn pushback_symmetry(
        data in proptest::collection::vec(any::<u8>(), 1..512),
        split in any::<prop::sample::Index>(),
        back in 0usize..32,
    ) {
        let mut source = PushbackCountingSource::new(&data[..], 32).unwrap();
        let prefix = split.index(data.len() + 1);
        let mut head = vec![0u8; prefix];
        source.read_exact(&mut head).unwrap();
        let back = back.min(prefix);

        source.unread(&head[prefix - back..]).unwrap();
        prop_assert_eq!(source.consumed(), (prefix - back) as u64);
        let mut again = vec![0u8; back];
        source.read_exact(&mut again).unwrap();
        prop_assert_eq!(&again[..], &head[prefix - back..]);
        prop_assert_eq!(source.consumed(), prefix as u64);
    }

    #[test]
    fn digest_invariance(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        ops in proptest::collection::vec(op(), 1..16),
    ) {
        let expected = Sha1::digest(&data).as_slice().to_vec();

        let mut direct = DigestingSource::new(&data[..], Sha1::new());
        drain(&mut direct, &data, &ops);
        prop_assert_eq!(direct.finalize(), expected.clone());

        let mut wrapped = PushbackCountingSource::new(
            DigestingSource::new(CountingSource::new(&data[..]), Sha1::new()),
            8,
        ).unwrap();
        drain(&mut wrapped, &data, &ops);
        prop_assert_eq!(wrapped.into_inner().finalize(), expected.clone());

        let mut outer = FixedLengthSource::new(
            DigestingSource::new(BoundedRecordingSource::new(&data[..], u64::MAX), Sha1::new()),
            data.len() as u64,
        );
        drain(&mut outer, &data, &ops);
        prop_assert_eq!(outer.into_inner().finalize(), expected);
    }

    #[test]
    fn bounded_eof(
        data in proptest::collection::vec(any::<u8>(), 0..256),
        limit in 0u64..300,
    ) {
        let expected = (limit as usize).min(data.len());

        let mut bounded = BoundedRecordingSource::new(&data[..], limit);
        let mut out = Vec::new();
        bounded.read_to_end(&mut out).unwrap();
        prop_assert_eq!(&out[..], &data[..expected]);
        prop_assert_eq!(bounded.skip(1).unwrap(), 0);
        if limit as usize <= data.len() {
            prop_assert_eq!(bounded.available(), 0);
        }

        let mut fixed = FixedLengthSource::new(&data[..], limit);
        prop_assert_eq!(fixed.skip(u64::MAX).unwrap() as usize, expected);
        prop_assert_eq!(fixed.read(&mut [0u8; 4]).unwrap(), 0);
        if limit as usize <= data.len() {
            prop_assert_eq!(fixed.remaining(), 0);
        }
    }

    #[test]
    fn reader_reproduces_raw_bytes(
        data in proptest::collection::vec(
            prop_oneof![
                Just(b'\r'), Just(b'\n'), Just(b' '), Just(b'\t'), Just(b':'),
                Just(b'"'), Just(b'\\'), Just(0xe2u8), Just(0x82u8), b'a'..=b'z',
            ],
            0..256,
        ),
        config in prop_oneof![
            Just(ReaderConfig::warc_header()),
            Just(ReaderConfig::http_header()),
            Just(ReaderConfig::header(warcstream::HeaderEncoding::UsAscii, false)),
            Just(ReaderConfig::line(warcstream::HeaderEncoding::Raw)),
        ],
    ) {
        let mut source = PushbackCountingSource::new(&data[..], 4).unwrap();
        let reader = HeaderLineReader::new(config);
        let mut joined = Vec::new();
        while let Some(line) = reader.read_line(&mut source).unwrap() {
            prop_assert!(!line.raw().is_empty());
            joined.extend_from_slice(line.raw());
        }
        prop_assert_eq!(joined, data);
    }
}
