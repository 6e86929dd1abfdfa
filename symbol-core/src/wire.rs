use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::types::Page;

/// Ответ на запрос символов: `{"Symbols": [...]}`.
/// Пустая строка последним элементом = конец списка.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolList {
    #[serde(rename = "Symbols")]
    pub symbols: Vec<String>,
}

/// Ответ на запрос рынков: `{"Markets": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketList {
    #[serde(rename = "Markets")]
    pub markets: Vec<String>,
}

/// Маркер конца списка
pub const END_OF_LIST: &str = "";

impl From<Page> for SymbolList {
    fn from(page: Page) -> Self {
        let mut symbols = page.symbols;
        if page.end_of_list {
            symbols.push(END_OF_LIST.to_string());
        }
        Self { symbols }
    }
}

impl From<SymbolList> for Page {
    fn from(list: SymbolList) -> Self {
        let mut symbols = list.symbols;
        let end_of_list = symbols.last().is_some_and(|s| s == END_OF_LIST);
        if end_of_list {
            symbols.pop();
        }
        Self {
            symbols,
            end_of_list,
        }
    }
}

pub fn encode_page(page: Page) -> Result<String, WireError> {
    Ok(serde_json::to_string(&SymbolList::from(page))?)
}

pub fn decode_page(s: &str) -> Result<Page, WireError> {
    let list: SymbolList = serde_json::from_str(s)?;
    Ok(list.into())
}

pub fn encode_markets(markets: Vec<String>) -> Result<String, WireError> {
    Ok(serde_json::to_string(&MarketList { markets })?)
}

pub fn decode_markets(s: &str) -> Result<Vec<String>, WireError> {
    let list: MarketList = serde_json::from_str(s)?;
    Ok(list.markets)
}
