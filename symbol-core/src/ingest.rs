use std::io::{self, Read};

use log::{error, info};

use crate::constants::READ_CHUNK_SIZE;
use crate::error::IngestError;
use crate::parser::ColumnParser;
use crate::table::{AppendStats, SymbolTable};

/// Итог загрузки одного рынка
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub market: String,
    /// строки данных в источнике
    pub rows: usize,
    /// записи, попавшие в таблицу
    pub records: usize,
    /// битые строки и строки без тикера
    pub skipped: usize,
    /// повторы тикеров
    pub duplicates: usize,
}

/// Загрузить справочник из `reader` в таблицу под ключом `market`.
///
/// Читает кусками, каждый разобранный кусок сразу дописывается в таблицу.
/// При ошибке чтения уже добавленные записи остаются (загрузка не транзакционная).
/// `reader` забирается во владение и закрывается на любом выходе.
pub fn ingest<R: Read>(
    mut reader: R,
    table: &SymbolTable,
    market: &str,
) -> Result<IngestReport, IngestError> {
    let mut parser = ColumnParser::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut batch = Vec::new();
    let mut appended = AppendStats::default();

    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(
                    "error reading {market} source after {} records: {e}",
                    appended.appended
                );
                return Err(IngestError::Read {
                    market: market.to_string(),
                    ingested: appended.appended,
                    source: e,
                });
            }
        };

        // 0 байт => источник исчерпан, пустой кусок дожимает последнюю строку
        parser.feed(&buf[..n], &mut batch);
        appended += table.append(market, batch.drain(..));

        if n == 0 {
            break;
        }
    }

    let stats = parser.stats();
    let report = IngestReport {
        market: market.to_string(),
        rows: stats.rows,
        records: appended.appended,
        skipped: stats.skipped,
        duplicates: appended.duplicates,
    };
    info!(
        "ingested {market}: rows={} records={} skipped={} duplicates={}",
        report.rows, report.records, report.skipped, report.duplicates
    );

    Ok(report)
}
