use std::io;

use thiserror::Error;

/// Верхнеуровневый тип ошибок запроса к таблице.
/// Загрузка возвращает свой [`IngestError`] отдельно.
#[derive(Debug, Error)]
pub enum SymbolCoreError {
    /// Ошибки постраничной выдачи
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Ошибки протокола
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Ошибки сериализации
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Ошибки загрузки
#[derive(Debug, Error)]
pub enum IngestError {
    /// Источник упал посреди чтения. Всё, что успели разобрать, остаётся в таблице.
    #[error("failed to read {market} source after {ingested} records")]
    Read {
        market: String,
        ingested: usize,
        #[source]
        source: io::Error,
    },
}

/// Ошибки постраничной выдачи
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    /// Курсор не найден в списке рынка
    #[error("cursor {cursor:?} not found in market {market:?}")]
    CursorNotFound { market: String, cursor: String },
}

/// Ошибки протокола
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// пустая команда
    #[error("empty command")]
    EmptyCommand,

    /// Неизвестная команда
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Строка команды длиннее лимита сервера
    #[error("command line longer than {0} bytes")]
    LineTooLong(usize),

    /// Не передан рынок
    #[error("missing market")]
    MissingMarket,

    /// Не передана длина страницы
    #[error("missing page length")]
    MissingLength,

    /// Длина страницы не число
    #[error("invalid page length: {0}")]
    InvalidLength(String),

    /// Лишние аргументы
    #[error("unexpected extra arguments")]
    ExtraArgs,
}

/// Ошибки сериализации
#[derive(Debug, Error)]
pub enum WireError {
    /// Ошибка JSON
    #[error("json encode/decode error: {0}")]
    Json(#[from] serde_json::Error),
}
