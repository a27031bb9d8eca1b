use anyhow::anyhow;
use anyhow::Result;
use futures::stream;
use futures::StreamExt;
use futures::TryStreamExt;
use test_utils::chunk_bytes;
use test_utils::stream_fixture;

use super::StreamDecoder;
use crate::domain::models::ByteStream;

const HELLO: &str = "data: {\"content\":\"Hel\"}\n\ndata: {\"content\":\"lo\"}\n\n";

fn feed_all(chunks: Vec<Vec<u8>>) -> Vec<String> {
    let mut decoder = StreamDecoder::default();
    return chunks
        .iter()
        .flat_map(|chunk| return decoder.feed(chunk))
        .collect();
}

fn body(chunks: Vec<Vec<u8>>) -> ByteStream {
    return stream::iter(chunks.into_iter().map(Ok)).boxed();
}

#[test]
fn it_yields_deltas_regardless_of_chunking() {
    let one_shot = feed_all(vec![HELLO.as_bytes().to_vec()]);
    let byte_by_byte = feed_all(chunk_bytes(HELLO.as_bytes(), 1));

    assert_eq!(one_shot, vec!["Hel", "lo"]);
    assert_eq!(byte_by_byte, one_shot);
}

#[test]
fn it_yields_fixture_deltas_for_every_chunk_size() {
    let payload = stream_fixture().as_bytes();
    let expected = vec!["Here's ", "how to say ", "héllo: ", "こんにちは 👋"];

    for size in 1..=payload.len() {
        assert_eq!(feed_all(chunk_bytes(payload, size)), expected, "chunk size {size}");
    }
}

#[test]
fn it_skips_malformed_frames() {
    let payload = "data: {\"content\":\"a\"}\ndata: not-json\ndata: {\"content\":\"b\"}\n";
    assert_eq!(feed_all(vec![payload.as_bytes().to_vec()]), vec!["a", "b"]);
}

#[test]
fn it_ignores_frames_without_content() {
    let payload = "data: {\"done\":true}\ndata: {\"content\":\"\"}\ndata: {\"error\":\"Agent not found\"}\nevent: ping\n";
    assert!(feed_all(vec![payload.as_bytes().to_vec()]).is_empty());
}

#[test]
fn it_holds_partial_lines() {
    let mut decoder = StreamDecoder::default();

    assert!(decoder.feed(b"data: {\"content\":\"wa").is_empty());
    assert!(decoder.has_partial());
    assert_eq!(decoder.feed(b"it\"}\r\n"), vec!["wait"]);
    assert!(!decoder.has_partial());
}

#[test]
fn it_splits_lines_on_a_lone_carriage_return() {
    let payload = "data: {\"content\":\"Hel\"}\rdata: {\"content\":\"lo\"}\r\r";

    for size in 1..=payload.len() {
        let mut decoder = StreamDecoder::default();
        let mut deltas = chunk_bytes(payload.as_bytes(), size)
            .iter()
            .flat_map(|chunk| return decoder.feed(chunk))
            .collect::<Vec<String>>();
        deltas.extend(decoder.finish());

        assert_eq!(deltas, vec!["Hel", "lo"], "chunk size {size}");
    }
}

#[test]
fn it_waits_for_the_byte_after_a_carriage_return() {
    let mut decoder = StreamDecoder::default();

    assert!(decoder.feed(b"data: {\"content\":\"a\"}\r").is_empty());
    assert_eq!(decoder.feed(b"\ndata: {\"content\":\"b\"}\n"), vec!["a", "b"]);
    assert!(!decoder.has_partial());
}

#[test]
fn it_holds_split_code_points() {
    let mut decoder = StreamDecoder::default();
    let payload = "data: {\"content\":\"👋\"}\n".as_bytes();
    let split = payload.len() - 4;

    assert!(decoder.feed(&payload[..split]).is_empty());
    assert_eq!(decoder.feed(&payload[split..]), vec!["👋"]);
}

#[test]
fn it_replaces_invalid_bytes() {
    let mut payload = b"data: {\"content\":\"a".to_vec();
    payload.push(0xff);
    payload.extend_from_slice(b"b\"}\n");

    assert_eq!(feed_all(vec![payload]), vec!["a\u{FFFD}b"]);
}

#[tokio::test]
async fn it_decodes_a_body_stream() -> Result<()> {
    let deltas = StreamDecoder::decode(body(chunk_bytes(stream_fixture().as_bytes(), 7)))
        .try_collect::<Vec<String>>()
        .await?;

    assert_eq!(deltas.concat(), "Here's how to say héllo: こんにちは 👋");
    return Ok(());
}

#[tokio::test]
async fn it_drops_unterminated_final_line() -> Result<()> {
    let chunks = vec![
        b"data: {\"content\":\"done\"}\n".to_vec(),
        b"data: {\"content\":\"cut".to_vec(),
    ];

    let deltas = StreamDecoder::decode(body(chunks))
        .try_collect::<Vec<String>>()
        .await?;

    assert_eq!(deltas, vec!["done"]);
    return Ok(());
}

#[tokio::test]
async fn it_keeps_a_final_line_ended_by_a_carriage_return() -> Result<()> {
    let chunks = vec![b"data: {\"content\":\"last\"}\r".to_vec()];

    let deltas = StreamDecoder::decode(body(chunks))
        .try_collect::<Vec<String>>()
        .await?;

    assert_eq!(deltas, vec!["last"]);
    return Ok(());
}

#[tokio::test]
async fn it_ends_empty_for_empty_body() -> Result<()> {
    let deltas = StreamDecoder::decode(body(vec![]))
        .try_collect::<Vec<String>>()
        .await?;

    assert!(deltas.is_empty());
    return Ok(());
}

#[tokio::test]
async fn it_stops_after_transport_error() {
    let chunks: Vec<Result<Vec<u8>>> = vec![
        Ok(b"data: {\"content\":\"Hel\"}\n".to_vec()),
        Err(anyhow!("connection reset")),
        Ok(b"data: {\"content\":\"lo\"}\n".to_vec()),
    ];

    let results = StreamDecoder::decode(stream::iter(chunks).boxed())
        .collect::<Vec<Result<String>>>()
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap(), "Hel");
    assert_eq!(
        results[1].as_ref().unwrap_err().to_string(),
        "connection reset"
    );
}
