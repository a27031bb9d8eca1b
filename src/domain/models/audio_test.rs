use super::AudioBlob;

#[test]
fn it_joins_chunks_in_order() {
    let blob = AudioBlob::from_chunks(vec![b"RI".to_vec(), vec![], b"FF".to_vec()], "audio/wav");
    assert_eq!(blob.bytes, b"RIFF".to_vec());
    assert!(!blob.is_empty());
}

#[test]
fn it_derives_file_names_from_mime_types() {
    assert_eq!(AudioBlob::new(vec![1], "audio/webm;codecs=opus").file_name(), "audio.webm");
    assert_eq!(AudioBlob::new(vec![1], "audio/wav").file_name(), "audio.wav");
    assert_eq!(AudioBlob::new(vec![1], "audio/x-wav").file_name(), "audio.wav");
    assert_eq!(AudioBlob::new(vec![1], "audio/mpeg").file_name(), "audio.mp3");
    assert_eq!(AudioBlob::new(vec![1], "").file_name(), "audio.bin");
}
