/// Дополнительные данные по бумаге (опционы и т.п.).
/// В базовой загрузке справочника всегда пусто.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Put, Call и т.д.
    pub description: String,
    /// Срок в днях: 30, 60, 90...
    pub term_days: u32,
}

/// Нормализованная строка справочника
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub symbol: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Record {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            attributes: Vec::new(),
        }
    }
}

/// Окно символов + признак конца списка
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub symbols: Vec<String>,
    pub end_of_list: bool,
}

impl Page {
    /// Пустая страница в конце списка
    pub fn end() -> Self {
        Self {
            symbols: Vec::new(),
            end_of_list: true,
        }
    }

    /// Курсор для следующего запроса: последний реальный символ страницы
    pub fn last_symbol(&self) -> Option<&str> {
        self.symbols.last().map(String::as_str)
    }
}
