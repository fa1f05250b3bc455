#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Reset,
    Quit,
    Docs,
    Preview {
        file_id: String,
        media_type: Option<String>,
    },
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or(trimmed).to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/reset" => SlashCommand::Reset,
        "/quit" => SlashCommand::Quit,
        "/docs" => SlashCommand::Docs,
        "/preview" => match parts.next() {
            Some(file_id) => SlashCommand::Preview {
                file_id: file_id.to_string(),
                media_type: parts.next().map(str::to_string),
            },
            None => SlashCommand::Unknown(command),
        },
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
