use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;
use std::sync::RwLock;

use log::warn;

use crate::error::PaginationError;
use crate::pagination;
use crate::types::{Page, Record};

/// Упорядоченный список бумаг одного рынка.
/// Порядок = порядок строк в источнике, после загрузки не меняется.
#[derive(Debug, Default)]
pub struct MarketSymbols {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl MarketSymbols {
    /// Добавить запись в конец. Повторный тикер не добавляется (`false`).
    pub fn push(&mut self, record: Record) -> bool {
        if self.index.contains_key(&record.symbol) {
            return false;
        }
        self.index.insert(record.symbol.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Позиция тикера в списке
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for MarketSymbols {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut symbols = Self::default();
        for record in iter {
            symbols.push(record);
        }
        symbols
    }
}

/// Итог одного [`SymbolTable::append`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendStats {
    pub appended: usize,
    pub duplicates: usize,
}

impl AddAssign for AppendStats {
    fn add_assign(&mut self, rhs: Self) {
        self.appended += rhs.appended;
        self.duplicates += rhs.duplicates;
    }
}

/// Таблица рынков: рынок -> упорядоченный список бумаг.
///
/// Одна на процесс, заполняется при старте и дальше только читается.
/// `RwLock` позволяет грузить несколько рынков параллельно и не пускает
/// чтение одновременно с записью в тот же рынок.
#[derive(Debug, Default)]
pub struct SymbolTable {
    markets: RwLock<BTreeMap<String, MarketSymbols>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Дописать записи в конец списка рынка.
    /// Рынок появляется в таблице только вместе с первой записью.
    pub fn append<I>(&self, market: &str, records: I) -> AppendStats
    where
        I: IntoIterator<Item = Record>,
    {
        let mut records = records.into_iter().peekable();
        let mut stats = AppendStats::default();
        if records.peek().is_none() {
            return stats;
        }

        let mut markets = match self.markets.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(), // продолжаем, несмотря на poison
        };
        let list = markets.entry(market.to_string()).or_default();

        for record in records {
            let symbol = record.symbol.clone();
            if list.push(record) {
                stats.appended += 1;
            } else {
                warn!("duplicate symbol {symbol} in market {market}; keeping the first one");
                stats.duplicates += 1;
            }
        }

        stats
    }

    /// Рынки, по которым есть хотя бы одна запись
    pub fn markets(&self) -> Vec<String> {
        let markets = match self.markets.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        markets.keys().cloned().collect()
    }

    /// Количество бумаг рынка (0 для неизвестного)
    pub fn len(&self, market: &str) -> usize {
        let markets = match self.markets.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        markets.get(market).map_or(0, MarketSymbols::len)
    }

    /// Запись по тикеру
    pub fn get(&self, market: &str, symbol: &str) -> Option<Record> {
        let markets = match self.markets.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let list = markets.get(market)?;
        list.position(symbol).map(|i| list.records()[i].clone())
    }

    /// Следующая страница символов рынка после `cursor` (пустой = с начала).
    /// Неизвестный рынок - пустая страница с признаком конца.
    pub fn page(&self, market: &str, cursor: &str, length: usize) -> Result<Page, PaginationError> {
        let markets = match self.markets.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        match markets.get(market) {
            Some(list) => pagination::paginate(market, list, cursor, length),
            None => Ok(Page::end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_source_order_and_drops_duplicates() {
        let table = SymbolTable::new();

        let st = table.append(
            "nasdaq",
            vec![
                Record::new("ZTS", "Zoetis"),
                Record::new("AAPL", "Apple"),
                Record::new("ZTS", "Zoetis again"),
            ],
        );
        assert_eq!(st, AppendStats { appended: 2, duplicates: 1 });

        let st = table.append("nasdaq", vec![Record::new("MSFT", "Microsoft")]);
        assert_eq!(st.appended, 1);

        let page = table.page("nasdaq", "", 10).unwrap();
        assert_eq!(page.symbols, vec!["ZTS", "AAPL", "MSFT"]);
        assert_eq!(table.get("nasdaq", "ZTS").unwrap().name, "Zoetis");
    }

    #[test]
    fn markets_lists_only_markets_with_records() {
        let table = SymbolTable::new();
        table.append("nyse", Vec::<Record>::new());
        table.append("nasdaq", vec![Record::new("AAPL", "Apple")]);

        assert_eq!(table.markets(), vec!["nasdaq"]);
        assert_eq!(table.len("nyse"), 0);
        assert_eq!(table.len("nasdaq"), 1);
    }

    #[test]
    fn unknown_market_gives_empty_end_page() {
        let table = SymbolTable::new();
        assert_eq!(table.page("lse", "", 10).unwrap(), Page::end());
        assert_eq!(table.page("lse", "AAPL", 10).unwrap(), Page::end());
    }

    #[test]
    fn concurrent_appends_to_different_markets() {
        let table = std::sync::Arc::new(SymbolTable::new());

        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|market| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        table.append(market, vec![Record::new(format!("S{i}"), "x")]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for market in ["a", "b", "c", "d"] {
            assert_eq!(table.len(market), 200);
            let page = table.page(market, "S98", 1).unwrap();
            assert_eq!(page.symbols, vec!["S99"]);
        }
    }
}
