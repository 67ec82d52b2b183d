use byteorder::{BigEndian, WriteBytesExt};
use seqfile_reader::{
    seqfile::{format, utils::ByteCursor},
    DecoderRegistry, SeqFileError, SequenceFileReader, SyncMarker, Value,
};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

const TYPED_BYTES: &str = "org.apache.hadoop.typedbytes.TypedBytesWritable";
const BYTES_WRITABLE: &str = "org.apache.hadoop.io.BytesWritable";
const SYNC: [u8; 16] = [
    0x5a, 0x01, 0xc3, 0x7e, 0x10, 0x22, 0x9f, 0x00, 0xff, 0x42, 0x13, 0x37, 0xab, 0xcd, 0xef, 0x08,
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Hadoop `WritableUtils.writeVLong`.
fn write_vlong(out: &mut Vec<u8>, mut value: i64) {
    if (-112..=127).contains(&value) {
        out.push(value as u8);
        return;
    }
    let mut len: i64 = -112;
    if value < 0 {
        value ^= -1;
        len = -120;
    }
    let mut tmp = value;
    while tmp != 0 {
        tmp >>= 8;
        len -= 1;
    }
    out.push(len as u8);
    let len = if len < -120 { -(len + 120) } else { -(len + 112) };
    for idx in (0..len).rev() {
        out.push(((value >> (idx * 8)) & 0xff) as u8);
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    write_vlong(out, s.len() as i64);
    out.extend_from_slice(s.as_bytes());
}

struct HeaderSpec<'a> {
    key_class: &'a str,
    value_class: &'a str,
    compressed: bool,
    block_compressed: bool,
    codec: Option<&'a str>,
    metadata: &'a [(&'a str, &'a str)],
    sync: [u8; 16],
}

impl Default for HeaderSpec<'_> {
    fn default() -> Self {
        Self {
            key_class: TYPED_BYTES,
            value_class: TYPED_BYTES,
            compressed: false,
            block_compressed: false,
            codec: None,
            metadata: &[],
            sync: SYNC,
        }
    }
}

fn header_bytes(spec: &HeaderSpec<'_>) -> Vec<u8> {
    let mut out = b"SEQ".to_vec();
    out.push(6);
    write_string(&mut out, spec.key_class);
    write_string(&mut out, spec.value_class);
    out.push(spec.compressed as u8);
    out.push(spec.block_compressed as u8);
    if let Some(codec) = spec.codec {
        write_string(&mut out, codec);
    }
    out.write_i32::<BigEndian>(spec.metadata.len() as i32).unwrap();
    for (k, v) in spec.metadata {
        write_string(&mut out, k);
        write_string(&mut out, v);
    }
    out.extend_from_slice(&spec.sync);
    out
}

/// A typed-bytes string payload.
fn tb_string(s: &str) -> Vec<u8> {
    let mut out = vec![7];
    out.write_i32::<BigEndian>(s.len() as i32).unwrap();
    out.extend_from_slice(s.as_bytes());
    out
}

fn tb_int(v: i32) -> Vec<u8> {
    let mut out = vec![3];
    out.write_i32::<BigEndian>(v).unwrap();
    out
}

/// A record frame whose key and value are `BytesWritable`-style payloads.
fn record_frame(key: &[u8], value: &[u8]) -> Vec<u8> {
    let key_len = key.len() + 4;
    let buf_len = key_len + 4 + value.len();
    let mut out = Vec::new();
    out.write_i32::<BigEndian>(buf_len as i32).unwrap();
    out.write_i32::<BigEndian>(key_len as i32).unwrap();
    out.write_i32::<BigEndian>(key.len() as i32).unwrap();
    out.extend_from_slice(key);
    out.write_i32::<BigEndian>(value.len() as i32).unwrap();
    out.extend_from_slice(value);
    out
}

fn sync_escape(sync: &[u8; 16]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i32::<BigEndian>(-1).unwrap();
    out.extend_from_slice(sync);
    out
}

fn open(bytes: Vec<u8>) -> seqfile_reader::Result<SequenceFileReader<Cursor<Vec<u8>>>> {
    init_logging();
    SequenceFileReader::open(Cursor::new(bytes))
}

fn two_record_file() -> Vec<u8> {
    let mut file = header_bytes(&HeaderSpec::default());
    file.extend(record_frame(&tb_string("alpha"), &tb_int(1)));
    file.extend(record_frame(&tb_string("beta"), &tb_int(2)));
    file
}

#[test]
fn vints_decode_known_fixtures() {
    let cases = [
        -1i64,
        0,
        1,
        127,
        -120,
        -121,
        -122,
        123456,
        -123456,
        i32::MIN as i64,
        i32::MAX as i64,
    ];
    for value in cases {
        let mut encoded = Vec::new();
        write_vlong(&mut encoded, value);
        let mut cursor = ByteCursor::from_slice(&encoded);
        assert_eq!(cursor.read_vlong().unwrap(), value, "encoding {:02x?}", encoded);
        assert_eq!(cursor.remaining(), 0, "leftover bytes for {}", value);
        let mut cursor = ByteCursor::from_slice(&encoded);
        assert_eq!(cursor.read_vint().unwrap() as i64, value);
    }
}

#[test]
fn header_fields_are_parsed() {
    let bytes = header_bytes(&HeaderSpec {
        key_class: "K",
        value_class: "V",
        ..Default::default()
    });
    let mut cursor = ByteCursor::new(Cursor::new(bytes));
    let header = format::header::parse(&mut cursor).expect("parse header");

    assert_eq!(header.version, 6);
    assert_eq!(header.key_class_name, "K");
    assert_eq!(header.value_class_name, "V");
    assert!(!header.compressed);
    assert!(!header.block_compressed);
    assert_eq!(header.compression_class_name, None);
    assert!(header.metadata.is_empty());
    assert_eq!(header.sync_marker, SyncMarker(SYNC));
}

#[test]
fn metadata_keeps_file_order_and_last_duplicate_wins() {
    let bytes = header_bytes(&HeaderSpec {
        metadata: &[("owner", "a"), ("created", "today"), ("owner", "b")],
        ..Default::default()
    });
    let reader = open(bytes).expect("open");
    let header = reader.header();
    assert_eq!(header.metadata.len(), 3);
    assert_eq!(header.metadata[1], ("created".to_string(), "today".to_string()));
    assert_eq!(header.metadata_value("owner"), Some("b"));
    assert_eq!(header.metadata_value("missing"), None);
}

#[test]
fn bad_magic_is_not_a_sequence_file() {
    let mut bytes = header_bytes(&HeaderSpec::default());
    bytes[0] = b'P';
    match open(bytes) {
        Err(SeqFileError::NotASequenceFile(magic)) => assert_eq!(&magic, b"PEQ"),
        other => panic!("expected NotASequenceFile, got {:?}", other),
    }
}

#[test]
fn compressed_files_are_unsupported() {
    let bytes = header_bytes(&HeaderSpec {
        key_class: "org.example.NoSuchKey",
        compressed: true,
        codec: Some("org.apache.hadoop.io.compress.DefaultCodec"),
        ..Default::default()
    });
    assert!(matches!(open(bytes), Err(SeqFileError::UnsupportedFeature(_))));

    let bytes = header_bytes(&HeaderSpec {
        block_compressed: true,
        ..Default::default()
    });
    assert!(matches!(open(bytes), Err(SeqFileError::UnsupportedFeature(_))));
}

#[test]
fn unknown_key_type_fails_at_open() {
    let mut bytes = header_bytes(&HeaderSpec {
        key_class: "org.example.NoSuchKey",
        ..Default::default()
    });
    bytes.extend(record_frame(&tb_string("x"), &tb_int(0)));
    match open(bytes) {
        Err(SeqFileError::UnknownType(name)) => assert_eq!(name, "org.example.NoSuchKey"),
        other => panic!("expected UnknownType, got {:?}", other),
    }
}

#[test]
fn unknown_value_type_fails_at_open() {
    let mut bytes = header_bytes(&HeaderSpec {
        value_class: "org.example.NoSuchValue",
        ..Default::default()
    });
    bytes.extend(record_frame(&tb_string("x"), &tb_int(0)));
    match open(bytes) {
        Err(SeqFileError::UnknownType(name)) => assert_eq!(name, "org.example.NoSuchValue"),
        other => panic!("expected UnknownType, got {:?}", other),
    }
}

#[test]
fn invalid_utf8_class_name_is_invalid_encoding() {
    let mut bytes = b"SEQ".to_vec();
    bytes.push(6);
    bytes.extend_from_slice(&[0x02, 0xc3, 0x28]);
    assert!(matches!(open(bytes), Err(SeqFileError::InvalidEncoding(_))));
}

#[test]
fn two_records_decode_in_file_order() {
    let mut reader = open(two_record_file()).expect("open");
    let records: Vec<(Value, Value)> = reader.records().map(|r| r.expect("record ok")).collect();
    assert_eq!(
        records,
        vec![
            (Value::from("alpha"), Value::Int(1)),
            (Value::from("beta"), Value::Int(2)),
        ]
    );
    assert!(reader.next_record().expect("clean end").is_none());
}

#[test]
fn value_projection_yields_values_only() {
    let mut reader = open(two_record_file()).expect("open");
    let values: Vec<Value> = reader.values().map(|r| r.expect("value ok")).collect();
    assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn inline_sync_marker_is_skipped() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.extend(record_frame(&tb_string("before"), &tb_int(1)));
    file.extend(sync_escape(&SYNC));
    file.extend(record_frame(&tb_string("after"), &tb_int(2)));

    let mut reader = open(file).expect("open");
    let keys: Vec<Value> = reader
        .records()
        .map(|r| r.expect("record ok").0)
        .collect();
    assert_eq!(keys, vec![Value::from("before"), Value::from("after")]);
}

#[test]
fn next_value_steps_across_sync_marker() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.extend(record_frame(&tb_string("first"), &tb_string("one")));
    file.extend(sync_escape(&SYNC));
    file.extend(record_frame(&tb_string("second"), &tb_int(9)));

    let mut reader = open(file).expect("open");
    let first = reader.next_value().unwrap().expect("first value");
    assert_eq!(first.as_str(), Some("one"));
    assert_eq!(reader.next_value().unwrap(), Some(Value::Int(9)));
    assert_eq!(reader.next_value().unwrap(), None);
}

#[test]
fn truncated_sync_marker_is_an_error() {
    let mut file = two_record_file();
    let mut escape = sync_escape(&SYNC);
    escape.truncate(4 + 10);
    file.extend(escape);

    let mut reader = open(file).expect("open");
    assert!(reader.next_record().unwrap().is_some());
    assert!(reader.next_record().unwrap().is_some());
    assert!(matches!(reader.next_record(), Err(SeqFileError::UnexpectedEndOfStream)));
}

#[test]
fn mismatched_sync_marker_is_corrupt() {
    let mut bad = SYNC;
    bad[15] ^= 0xff;
    let mut file = header_bytes(&HeaderSpec::default());
    file.extend(sync_escape(&bad));
    file.extend(record_frame(&tb_string("after"), &tb_int(2)));

    let mut reader = open(file).expect("open");
    let mut records = reader.records();
    assert!(matches!(records.next(), Some(Err(SeqFileError::CorruptFile(_)))));
    assert!(records.next().is_none(), "iteration stops after an error");
}

#[test]
fn trailing_sync_marker_ends_cleanly() {
    let mut file = two_record_file();
    file.extend(sync_escape(&SYNC));
    let mut reader = open(file).expect("open");
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn header_only_file_is_empty() {
    let mut reader = open(header_bytes(&HeaderSpec::default())).expect("open");
    assert!(reader.next_record().expect("clean end").is_none());
    assert_eq!(reader.records().count(), 0);
}

#[test]
fn partial_length_ends_cleanly() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.extend_from_slice(&[0x00, 0x00, 0x01]);
    let mut reader = open(file).expect("open");
    assert!(reader.next_record().expect("clean end").is_none());
}

#[test]
fn short_frame_buffer_is_an_error() {
    let mut file = two_record_file();
    file.truncate(file.len() - 3);
    let mut reader = open(file).expect("open");
    let results: Vec<_> = reader.records().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SeqFileError::UnexpectedEndOfStream)));
}

#[test]
fn missing_key_length_is_an_error() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.write_i32::<BigEndian>(20).unwrap();
    let mut reader = open(file).expect("open");
    assert!(matches!(reader.next_record(), Err(SeqFileError::UnexpectedEndOfStream)));
}

#[test]
fn inconsistent_key_length_is_rejected() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.write_i32::<BigEndian>(8).unwrap();
    file.write_i32::<BigEndian>(6).unwrap();
    file.extend_from_slice(&[0; 8]);
    let mut reader = open(file).expect("open");
    assert!(matches!(reader.next_record(), Err(SeqFileError::InvalidLength { .. })));
}

#[test]
fn negative_buffer_length_is_rejected() {
    let mut file = header_bytes(&HeaderSpec::default());
    file.write_i32::<BigEndian>(-7).unwrap();
    let mut reader = open(file).expect("open");
    assert!(matches!(reader.next_record(), Err(SeqFileError::InvalidLength { .. })));
}

#[test]
fn tell_and_seek_resume_at_a_frame() {
    let mut reader = open(two_record_file()).expect("open");
    let start = reader.tell().unwrap();
    assert_eq!(start, reader.data_start());

    reader.next_record().unwrap();
    let second = reader.tell().unwrap();
    let (key, _) = reader.next_record().unwrap().expect("second record");
    assert_eq!(key, Value::from("beta"));

    reader.seek(second).unwrap();
    let (key, _) = reader.next_record().unwrap().expect("second record again");
    assert_eq!(key, Value::from("beta"));

    reader.rewind().unwrap();
    let (key, _) = reader.next_record().unwrap().expect("first record again");
    assert_eq!(key, Value::from("alpha"));
}

#[test]
fn custom_registry_resolves_other_classes() {
    fn decode_text(span: &[u8]) -> seqfile_reader::Result<Value> {
        String::from_utf8(span.to_vec())
            .map(Value::String)
            .map_err(|e| SeqFileError::InvalidEncoding(e.to_string()))
    }

    let mut registry = DecoderRegistry::with_builtins();
    registry.register("org.example.RawText", decode_text);

    let mut file = header_bytes(&HeaderSpec {
        key_class: "org.example.RawText",
        value_class: BYTES_WRITABLE,
        ..Default::default()
    });
    file.extend(record_frame(b"plain key", &[0xde, 0xad]));

    init_logging();
    let mut reader =
        SequenceFileReader::open_with(Cursor::new(file), &registry).expect("open with registry");
    let (key, value) = reader.next_record().unwrap().expect("record");
    assert_eq!(key, Value::from("plain key"));
    assert_eq!(value, Value::Bytes(vec![0xde, 0xad]));
}

#[test]
fn empty_payloads_reach_decoders() {
    let mut file = header_bytes(&HeaderSpec {
        key_class: BYTES_WRITABLE,
        value_class: BYTES_WRITABLE,
        ..Default::default()
    });
    file.extend(record_frame(&[], &[]));
    let mut reader = open(file).expect("open");
    let (key, value) = reader.next_record().unwrap().expect("record");
    assert_eq!(key.as_bytes(), Some(b"".as_slice()));
    assert_eq!(value, Value::Bytes(Vec::new()));
}

#[test]
fn open_path_reads_a_file_on_disk() {
    init_logging();
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("part-00000");
    fs::write(&path, two_record_file()).expect("write fixture");

    let mut reader = SequenceFileReader::open_path(&path).expect("open path");
    assert_eq!(reader.header().key_class_name, TYPED_BYTES);
    let keys: Vec<Value> = reader
        .records()
        .map(|r| r.expect("record ok").0)
        .collect();
    assert_eq!(keys, vec![Value::from("alpha"), Value::from("beta")]);
}

#[test]
fn into_inner_returns_the_source_at_the_cursor() {
    let file = two_record_file();
    let total = file.len() as u64;
    let mut reader = open(file).expect("open");
    let start = reader.data_start();
    reader.next_record().unwrap();
    let after_first = reader.tell().unwrap();
    assert!(after_first > start);

    let source = reader.into_inner();
    assert_eq!(source.position(), after_first);
    assert_eq!(source.get_ref().len() as u64, total);
}
