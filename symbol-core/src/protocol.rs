use crate::error::ProtocolError;

/// Команды текстового протокола сервера
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `MARKETS`
    Markets,
    /// `SYMBOLS <market> <length> [cursor]`
    ///
    /// Аргументы разделены пробелами, поэтому курсор без пробелов.
    /// Тикеры с пробелами парсер справочника не пропускает в таблицу.
    Symbols {
        market: String,
        length: usize,
        cursor: String,
    },
}

/// Парсит строку вида:
/// "SYMBOLS nasdaq 20 AAPL" или "MARKETS"
pub fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::EmptyCommand);
    }

    let mut parts = line.split_whitespace();
    let cmd = parts.next().ok_or(ProtocolError::EmptyCommand)?;

    let command = match cmd.to_ascii_uppercase().as_str() {
        "MARKETS" => Command::Markets,
        "SYMBOLS" => {
            let market = parts.next().ok_or(ProtocolError::MissingMarket)?;
            let length_raw = parts.next().ok_or(ProtocolError::MissingLength)?;
            let length: usize = length_raw
                .parse()
                .map_err(|_| ProtocolError::InvalidLength(length_raw.to_string()))?;
            // курсора нет => с начала
            let cursor = parts.next().unwrap_or("");

            Command::Symbols {
                market: market.to_ascii_lowercase(),
                length,
                cursor: cursor.to_string(),
            }
        }
        _ => return Err(ProtocolError::UnknownCommand(cmd.to_string())),
    };

    if parts.next().is_some() {
        return Err(ProtocolError::ExtraArgs);
    }

    Ok(command)
}

/// Команда одной строкой, с `\n` на конце
pub fn format_command_line(cmd: &Command) -> String {
    match cmd {
        Command::Markets => "MARKETS\n".to_string(),
        Command::Symbols {
            market,
            length,
            cursor,
        } if cursor.is_empty() => format!("SYMBOLS {market} {length}\n"),
        Command::Symbols {
            market,
            length,
            cursor,
        } => format!("SYMBOLS {market} {length} {cursor}\n"),
    }
}
