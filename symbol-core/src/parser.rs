use log::{debug, trace, warn};

use crate::constants::{COLUMN_COUNT, DELIMITER, NAME_COLUMN, NEWLINE, SYMBOL_COLUMN};
use crate::types::Record;

/// Счётчики разбора
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// непустые строки данных (без заголовка)
    pub rows: usize,
    /// строки, превратившиеся в [`Record`]
    pub records: usize,
    /// битые строки и строки без тикера
    pub skipped: usize,
}

/// Потоковый разбор справочника вида `col0|col1|...|col11\n`.
///
/// Байты подаются кусками произвольного размера через [`ColumnParser::feed`].
/// Поле или разделитель может оказаться на границе двух кусков, поэтому
/// недочитанное поле копится во внутреннем буфере, а не хранится смещением.
/// Строка 0 - заголовок, пропускается. Из остальных берём колонки 1 (тикер)
/// и 2 (название), остальное пропускаем по позиции.
#[derive(Debug, Default)]
pub struct ColumnParser {
    row: usize,
    col: usize,
    delimiters: usize,
    row_started: bool,
    field: Vec<u8>,
    symbol: Option<String>,
    name: Option<String>,
    stats: ParseStats,
}

impl ColumnParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Разобрать очередной кусок, готовые записи дописываются в `out`.
    ///
    /// Пустой кусок = конец потока, как 0 из `Read::read`: то же, что [`ColumnParser::finish`].
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<Record>) {
        if chunk.is_empty() {
            self.finish(out);
            return;
        }

        for &b in chunk {
            match b {
                NEWLINE => self.end_row(out),
                DELIMITER => {
                    self.row_started = true;
                    self.end_field();
                }
                _ => {
                    self.row_started = true;
                    if self.row > 0 && self.is_extracted_column() {
                        self.field.push(b);
                    }
                }
            }
        }
    }

    /// Конец потока: дожимаем последнюю строку без `\n`
    pub fn finish(&mut self, out: &mut Vec<Record>) {
        if self.row_started {
            self.end_row(out);
        }
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    fn is_extracted_column(&self) -> bool {
        self.col == SYMBOL_COLUMN || self.col == NAME_COLUMN
    }

    fn end_field(&mut self) {
        self.close_field();
        self.delimiters += 1;
        // 12 колонок, после 11-й снова 0
        self.col = (self.col + 1) % COLUMN_COUNT;
    }

    fn close_field(&mut self) {
        if self.row == 0 {
            return;
        }

        match self.col {
            SYMBOL_COLUMN => {
                let symbol = take_field(&mut self.field);
                trace!("row:{} column:{} symbol:{symbol}", self.row, self.col);
                self.symbol = Some(symbol);
            }
            NAME_COLUMN => {
                let name = take_field(&mut self.field);
                trace!("row:{} column:{} name:{name}", self.row, self.col);
                self.name = Some(name);
            }
            _ => {}
        }
    }

    fn end_row(&mut self, out: &mut Vec<Record>) {
        if self.row > 0 && self.row_started {
            self.close_field();
            self.emit_row(out);
        }

        self.row += 1;
        self.col = 0;
        self.delimiters = 0;
        self.row_started = false;
        self.field.clear();
        self.symbol = None;
        self.name = None;
    }

    fn emit_row(&mut self, out: &mut Vec<Record>) {
        let symbol = self.symbol.take().unwrap_or_default();
        let name = self.name.take().unwrap_or_default();

        // пустая строка / строка из одних пробелов
        if self.delimiters == 0 {
            return;
        }
        self.stats.rows += 1;

        if self.delimiters != COLUMN_COUNT - 1 {
            warn!(
                "row {} has {} columns, expected {COLUMN_COUNT}; skipped",
                self.row,
                self.delimiters + 1
            );
            self.stats.skipped += 1;
            return;
        }

        // например, хвостовая строка "File Creation Time: ...|||||||||||"
        if symbol.is_empty() {
            debug!("row {} has no symbol; skipped", self.row);
            self.stats.skipped += 1;
            return;
        }

        // такой тикер нельзя передать курсором в `SYMBOLS`
        if symbol.contains(char::is_whitespace) {
            warn!("row {} symbol {symbol:?} contains whitespace; skipped", self.row);
            self.stats.skipped += 1;
            return;
        }

        self.stats.records += 1;
        out.push(Record::new(symbol, name));
    }
}

fn take_field(field: &mut Vec<u8>) -> String {
    let s = String::from_utf8_lossy(field).trim().to_string();
    field.clear();
    s
}

/// Разобрать справочник, целиком лежащий в памяти
pub fn parse_all(bytes: &[u8]) -> Vec<Record> {
    let mut parser = ColumnParser::new();
    let mut out = Vec::new();
    parser.feed(bytes, &mut out);
    parser.finish(&mut out);
    out
}
