//! # symbol-core
//!
//! Справочник тикеров по рынкам и постраничная выдача по нему.
//!
//! Этот крейт содержит:
//!
//! - [`parser`] — потоковый разбор `|`-разделённого справочника (12 колонок)
//! - [`ingest`] — загрузка справочника из любого `Read` в таблицу
//! - [`table`] — таблица рынков: рынок -> упорядоченный список бумаг
//! - [`pagination`] — выдача окон по курсору (последний полученный тикер)
//! - [`wire`] — JSON-формат ответов (`{"Symbols": [...]}`, `{"Markets": [...]}`)
//! - [`protocol`] — текстовые команды сервера
//! - [`error`] — типы ошибок
//!
//! ## Пример: загрузка и постраничное чтение
//!
//! ```rust
//! use std::io::Cursor;
//! use symbol_core::ingest::ingest;
//! use symbol_core::SymbolTable;
//!
//! let data = "\
//! Nasdaq Traded|Symbol|Security Name|Listing Exchange|Market Category|ETF|Round Lot Size|Test Issue|Financial Status|CQS Symbol|NASDAQ Symbol|NextShares
//! Y|AAPL|Apple Inc|Q|Q|N|100|N|N||AAPL|N
//! Y|MSFT|Microsoft Corp|Q|Q|N|100|N|N||MSFT|N
//! Y|ZTS|Zoetis Inc|N| |N|100|N||ZTS|ZTS|N
//! ";
//!
//! let table = SymbolTable::new();
//! ingest(Cursor::new(data), &table, "nasdaq").unwrap();
//!
//! let page = table.page("nasdaq", "", 2).unwrap();
//! assert_eq!(page.symbols, vec!["AAPL", "MSFT"]);
//! assert!(!page.end_of_list);
//!
//! let page = table.page("nasdaq", "MSFT", 2).unwrap();
//! assert_eq!(page.symbols, vec!["ZTS"]);
//! assert!(page.end_of_list);
//! ```
//!
//! ## Пример: wire-формат
//!
//! ```rust
//! use symbol_core::wire::encode_page;
//! use symbol_core::Page;
//!
//! let page = Page { symbols: vec!["ZTS".to_string()], end_of_list: true };
//! assert_eq!(encode_page(page).unwrap(), r#"{"Symbols":["ZTS",""]}"#);
//! ```
//!
//! Наружу уходят только тикеры. Сами записи (`Record`) не сериализуются:
//!
//! ```compile_fail
//! fn wire<T: serde::Serialize>(_: &T) {}
//! wire(&symbol_core::Record::new("AAPL", "Apple Inc"));
//! ```
//!
//! ## Дизайн
//!
//! Core — "нулевая" зависимость для сервера, клиента и тестов:
//! чистые типы, разбор и сериализация, без runtime/async и сетевого кода.
//! Источник байтов (FTP, файл) — забота бинарников, сюда приходит просто `Read`.

#![forbid(unsafe_code)]

/// Текстовый протокол команд (`MARKETS`, `SYMBOLS nasdaq 20 AAPL`).
pub mod protocol;

/// Потоковый разбор справочника.
pub mod parser;

/// Загрузка справочника в таблицу.
pub mod ingest;

/// Таблица рынков.
pub mod table;

/// Постраничная выдача.
pub mod pagination;

/// Доменные типы.
pub mod types;

/// JSON wire-формат ответов.
pub mod wire;

/// Ошибки `symbol-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{COLUMN_COUNT, MAX_PAGE_LEN, READ_CHUNK_SIZE};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::{IngestError, PaginationError, ProtocolError, SymbolCoreError, WireError};
pub use crate::ingest::IngestReport;
pub use crate::protocol::Command;
pub use crate::table::SymbolTable;
pub use crate::types::{Attribute, Page, Record};
