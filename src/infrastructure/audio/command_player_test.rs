use anyhow::Result;

use super::CommandPlayer;
use crate::domain::models::AudioBlob;
use crate::domain::models::AudioSink;

#[tokio::test]
async fn it_hands_audio_to_the_player() -> Result<()> {
    let player = CommandPlayer::new("cat")?;

    player
        .play(AudioBlob::new(b"ID3".to_vec(), "audio/mpeg"))
        .await?;

    return Ok(());
}

#[tokio::test]
async fn it_fails_when_the_player_is_missing() -> Result<()> {
    let player = CommandPlayer::new("parley-no-such-player -")?;

    let res = player
        .play(AudioBlob::new(b"ID3".to_vec(), "audio/mpeg"))
        .await;

    assert!(res.is_err());
    return Ok(());
}

#[test]
fn it_rejects_blank_commands() {
    assert!(CommandPlayer::new("").is_err());
}
