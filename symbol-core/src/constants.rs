/// Разделитель колонок в справочнике символов
pub const DELIMITER: u8 = b'|';

/// Конец строки
pub const NEWLINE: u8 = b'\n';

/// Количество колонок в строке nasdaqtraded.txt
pub const COLUMN_COUNT: usize = 12;

/// Колонка с тикером (0-based)
pub const SYMBOL_COLUMN: usize = 1;

/// Колонка с названием бумаги (0-based)
pub const NAME_COLUMN: usize = 2;

/// Максимальная длина страницы, всё что больше - молча урезается
pub const MAX_PAGE_LEN: usize = 100;

/// Размер буфера, которым читаем источник
pub const READ_CHUNK_SIZE: usize = 64 * 1024;
