use eetf_codec::{
    Atom, Compression, DecodeOptions, Decoder, EncodeOptions, Encoder, Error, Export,
    NoCompression, Pid, Port, Reference, StringPolicy, Term, ZlibCompression,
};
use num_bigint::BigInt;
use std::io::Cursor;

#[test]
fn tuple_with_list_and_text() {
    let term = Term::tuple(vec![
        Term::from(1),
        Term::list(vec![Term::from(2), Term::from(3)]),
        Term::from("hi"),
    ]);
    let bytes = eetf_codec::encode(&term).unwrap();
    assert_eq!(bytes[0], 131);
    assert!(bytes.contains(&104));

    assert_eq!(
        eetf_codec::decode(&bytes).unwrap(),
        Term::tuple(vec![
            Term::from(1),
            Term::list(vec![Term::from(2), Term::from(3)]),
            Term::binary(&b"hi"[..]),
        ])
    );
}

#[test]
fn nested_round_trip() {
    let term = Term::map(vec![
        (
            Term::atom("users"),
            Term::list(vec![
                Term::tuple(vec![Term::atom("user"), Term::from(1), Term::binary(&b"ann"[..])]),
                Term::tuple(vec![Term::atom("user"), Term::from(-70000), Term::Nil]),
            ]),
        ),
        (Term::from(2.5), Term::tuple(vec![])),
        (Term::binary(vec![0, 255]), Term::ByteString(b"abc".to_vec())),
        (Term::atom("enabled"), Term::Boolean(false)),
        (Term::atom("owner"), Term::None),
        (Term::atom("ĉapelo"), Term::from(u64::MAX)),
    ]);
    let bytes = eetf_codec::encode(&term).unwrap();
    assert_eq!(eetf_codec::decode(&bytes).unwrap(), term);
}

#[test]
fn big_integer_round_trip() {
    for &magnitude_len in &[1usize, 8, 255, 256, 1000] {
        let magnitude = BigInt::from(1) << (magnitude_len * 8 - 1);
        for value in [magnitude.clone(), -magnitude] {
            let term = Term::integer(value.clone());
            let bytes = eetf_codec::encode(&term).unwrap();
            let decoded = eetf_codec::decode(&bytes).unwrap();
            assert_eq!(decoded.as_bigint(), Some(value));
            if magnitude_len > 4 {
                assert_eq!(decoded, term);
            }
        }
    }
}

#[test]
fn large_tuple_round_trip() {
    let term = Term::tuple((0..300i32).map(Term::from).collect());
    let bytes = eetf_codec::encode(&term).unwrap();
    assert_eq!(&bytes[..6], &[131, 105, 0, 0, 1, 44]);
    assert_eq!(eetf_codec::decode(&bytes).unwrap(), term);
}

#[test]
fn handles_round_trip() {
    let term = Term::list(vec![
        Term::from(Pid::new("nonode@nohost", 85, 0, 0)),
        Term::from(Port::new("nonode@nohost", 7, 1)),
        Term::from(Reference::new("nonode@nohost", vec![1, 2, 3], 2)),
        Term::from(Export::new("lists", "map", 2)),
    ]);
    let bytes = eetf_codec::encode(&term).unwrap();
    let decoded = eetf_codec::decode(&bytes).unwrap();
    assert_eq!(decoded, term);
    assert_eq!(
        decoded.to_string(),
        "[<0.85.0>,#Port<1.7>,#Ref<2.1.2.3>,fun lists:map/2]"
    );
}

#[test]
fn sentinels_are_atoms_on_the_wire() {
    assert_eq!(
        eetf_codec::encode(&Term::None).unwrap(),
        b"\x83w\x04none".to_vec()
    );
    assert_eq!(
        eetf_codec::encode(&Term::Boolean(true)).unwrap(),
        b"\x83w\x04true".to_vec()
    );
    assert_eq!(
        eetf_codec::encode(&Term::Boolean(false)).unwrap(),
        b"\x83w\x05false".to_vec()
    );
    assert_eq!(
        eetf_codec::decode(b"\x83d\x00\x04true").unwrap(),
        Term::Boolean(true)
    );
    assert_eq!(eetf_codec::decode(b"\x83s\x04none").unwrap(), Term::None);
    assert_eq!(
        eetf_codec::decode(b"\x83w\x04nope").unwrap(),
        Term::Atom(Atom::new("nope"))
    );
}

#[test]
fn improper_lists_are_rejected() {
    // [1 | [2]]
    let bytes = [131, 108, 0, 0, 0, 1, 97, 1, 108, 0, 0, 0, 1, 97, 2, 106];
    assert!(matches!(
        eetf_codec::decode(&bytes),
        Err(Error::ImproperListUnsupported { tail_tag: 108 })
    ));

    // [1 | 2]
    let bytes = [131, 108, 0, 0, 0, 1, 97, 1, 97, 2];
    assert!(matches!(
        eetf_codec::decode(&bytes),
        Err(Error::ImproperListUnsupported { tail_tag: 97 })
    ));
}

#[test]
fn string_policies() {
    let term = Term::from("hi");
    let encode = |policy| {
        Encoder::with_options(EncodeOptions::new().string_policy(policy))
            .encode(&term)
            .unwrap()
    };
    assert_eq!(encode(StringPolicy::Binary), b"\x83m\x00\x00\x00\x02hi".to_vec());
    assert_eq!(encode(StringPolicy::ByteString), b"\x83k\x00\x02hi".to_vec());
    assert_eq!(
        eetf_codec::decode(&encode(StringPolicy::CodepointList)).unwrap(),
        Term::list(vec![Term::Int(104), Term::Int(105)])
    );
}

#[test]
fn compression_never_inflates() {
    let term = Term::tuple(vec![
        Term::from(1),
        Term::from(2),
        Term::from(3),
        Term::from(4),
    ]);
    let plain = eetf_codec::encode(&term).unwrap();
    assert_eq!(plain.len(), 11);

    let encoder = Encoder::with_options(EncodeOptions::new().compression_level(6));
    assert_eq!(encoder.encode(&term).unwrap(), plain);
}

#[test]
fn compressed_round_trip() {
    let term = Term::list(vec![Term::binary(vec![b'x'; 64]); 64]);
    let encoder = Encoder::with_options(EncodeOptions::new().compressed(true));
    let bytes = encoder.encode(&term).unwrap();
    let plain = eetf_codec::encode(&term).unwrap();
    assert_eq!(bytes[1], b'P');
    assert!(bytes.len() < plain.len());
    assert_eq!(&bytes[2..6], &(plain.len() as u32 - 1).to_be_bytes());
    assert_eq!(eetf_codec::decode(&bytes).unwrap(), term);
}

#[test]
fn compressed_input_without_capability() {
    let term = Term::list(vec![Term::atom("again"); 50]);
    let bytes = Encoder::with_options(EncodeOptions::new().compressed(true))
        .encode(&term)
        .unwrap();
    let decoder = Decoder::with_compression(DecodeOptions::new(), NoCompression);
    assert!(matches!(
        decoder.decode(&bytes),
        Err(Error::CompressionUnavailable)
    ));

    let encoder = Encoder::with_compression(EncodeOptions::new().compressed(true), NoCompression);
    assert!(matches!(
        encoder.encode(&term),
        Err(Error::CompressionUnavailable)
    ));
}

#[test]
fn compressed_length_mismatch() {
    let payload = [104, 0];
    let compressed = ZlibCompression.compress(&payload, 6).unwrap();
    let mut bytes = vec![131, b'P', 0, 0, 0, 3];
    bytes.extend_from_slice(&compressed);
    assert!(matches!(
        eetf_codec::decode(&bytes),
        Err(Error::LengthMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn truncated_compressed_streams() {
    let term = Term::list(vec![Term::atom("again"); 50]);
    let bytes = Encoder::with_options(EncodeOptions::new().compressed(true))
        .encode(&term)
        .unwrap();
    assert_eq!(bytes[1], b'P');
    for end in 0..bytes.len() {
        let result = eetf_codec::decode(&bytes[..end]);
        assert!(
            matches!(result, Err(Error::TruncatedInput { .. })),
            "prefix of {} bytes gave {:?}",
            end,
            result
        );
    }
}

#[test]
fn reader_and_writer() {
    let term = Term::tuple(vec![Term::atom("ok"), Term::binary(&b"payload"[..])]);
    let mut buf = Vec::new();
    Encoder::new().encode_to_writer(&term, &mut buf).unwrap();

    let decoded = Decoder::new().decode_from_reader(Cursor::new(buf)).unwrap();
    assert_eq!(decoded, term);
}

#[test]
fn concatenated_terms() {
    let mut buf = eetf_codec::encode(&Term::from(1)).unwrap();
    buf.extend(eetf_codec::encode(&Term::atom("two")).unwrap());

    let decoder = Decoder::new();
    let (first, used) = decoder.decode_prefix(&buf).unwrap();
    assert_eq!(first, Term::from(1));
    assert_eq!(used, 3);
    let (second, _) = decoder.decode_prefix(&buf[used..]).unwrap();
    assert_eq!(second, Term::atom("two"));
}

#[test]
fn serialize_host_values() {
    #[derive(serde::Serialize)]
    struct Reply {
        status: &'static str,
        code: u16,
    }

    let encoder = Encoder::new();
    let bytes = encoder
        .encode_value(&Reply {
            status: "ok",
            code: 200,
        })
        .unwrap();
    assert_eq!(
        eetf_codec::decode(&bytes).unwrap(),
        Term::map(vec![
            (Term::atom("status"), Term::binary(&b"ok"[..])),
            (Term::atom("code"), Term::from(200)),
        ])
    );
}
