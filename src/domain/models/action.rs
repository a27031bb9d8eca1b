use super::SlashCommand;

#[derive(Debug)]
pub enum Action {
    Command(SlashCommand),
    SendText(String),
    ToggleRecording(),
}
