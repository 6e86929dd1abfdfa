use log::trace;

use crate::constants::MAX_PAGE_LEN;
use crate::error::PaginationError;
use crate::table::MarketSymbols;
use crate::types::{Page, Record};

/// Длина страницы не больше [`MAX_PAGE_LEN`], лишнее молча отрезается
pub fn clamp_length(length: usize) -> usize {
    length.min(MAX_PAGE_LEN)
}

/// Страница символов рынка, начиная сразу после `cursor`.
///
/// - пустой `cursor` - с начала списка
/// - курсор, которого нет в списке - [`PaginationError::CursorNotFound`]
/// - окно упирается в конец списка - `end_of_list = true`
pub fn paginate(
    market: &str,
    symbols: &MarketSymbols,
    cursor: &str,
    length: usize,
) -> Result<Page, PaginationError> {
    let length = clamp_length(length);
    let start = resolve_cursor(market, symbols, cursor)?;
    trace!("market:{market} cursor:{cursor:?} start:{start} length:{length}");

    Ok(window(symbols.records(), start, length))
}

fn resolve_cursor(
    market: &str,
    symbols: &MarketSymbols,
    cursor: &str,
) -> Result<usize, PaginationError> {
    if cursor.is_empty() {
        return Ok(0);
    }

    symbols
        .position(cursor)
        .map(|i| i + 1)
        .ok_or_else(|| PaginationError::CursorNotFound {
            market: market.to_string(),
            cursor: cursor.to_string(),
        })
}

fn window(records: &[Record], start: usize, length: usize) -> Page {
    let total = records.len();
    let begin = start.min(total);
    let end = start.saturating_add(length).min(total);
    let end_of_list = start >= total || start.saturating_add(length) > total;

    Page {
        symbols: records[begin..end]
            .iter()
            .map(|r| r.symbol.clone())
            .collect(),
        end_of_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(symbols: &[&str]) -> MarketSymbols {
        symbols
            .iter()
            .map(|s| Record::new(*s, format!("{s} Inc")))
            .collect()
    }

    fn walk(list: &MarketSymbols, length: usize) -> (Vec<String>, usize) {
        let mut all = Vec::new();
        let mut cursor = String::new();
        let mut calls = 0;
        loop {
            let page = paginate("m", list, &cursor, length).unwrap();
            calls += 1;
            all.extend(page.symbols.iter().cloned());
            if page.end_of_list {
                return (all, calls);
            }
            if let Some(last) = page.last_symbol() {
                cursor = last.to_string();
            }
        }
    }

    #[test]
    fn first_and_next_page() {
        let list = market(&["AAPL", "MSFT", "ZTS"]);

        let first = paginate("nasdaq", &list, "", 2).unwrap();
        assert_eq!(first.symbols, vec!["AAPL", "MSFT"]);
        assert!(!first.end_of_list);

        let next = paginate("nasdaq", &list, "MSFT", 2).unwrap();
        assert_eq!(next.symbols, vec!["ZTS"]);
        assert!(next.end_of_list);
    }

    #[test]
    fn cursor_at_last_symbol_gives_empty_end_page() {
        let list = market(&["AAPL", "MSFT", "ZTS"]);
        let page = paginate("nasdaq", &list, "ZTS", 5).unwrap();
        assert_eq!(page, Page::end());

        let page = paginate("nasdaq", &list, "ZTS", 0).unwrap();
        assert_eq!(page, Page::end());
    }

    #[test]
    fn length_is_clamped_to_max() {
        let symbols: Vec<String> = (0..250).map(|i| format!("S{i:03}")).collect();
        let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
        let list = market(&refs);

        let page = paginate("m", &list, "", 1000).unwrap();
        assert_eq!(page.symbols.len(), MAX_PAGE_LEN);
        assert_eq!(page.symbols[0], "S000");
        assert!(!page.end_of_list);

        let page = paginate("m", &list, "S199", usize::MAX).unwrap();
        assert_eq!(page.symbols.len(), 50);
        assert!(page.end_of_list);
    }

    #[test]
    fn zero_length_is_empty_window_without_error() {
        let list = market(&["AAPL", "MSFT"]);
        let page = paginate("m", &list, "", 0).unwrap();
        assert!(page.symbols.is_empty());
        assert!(!page.end_of_list);

        let page = paginate("m", &list, "AAPL", 0).unwrap();
        assert!(page.symbols.is_empty());
        assert!(!page.end_of_list);
    }

    #[test]
    fn unknown_cursor_is_an_error() {
        let list = market(&["AAPL", "MSFT"]);
        let err = paginate("nasdaq", &list, "GOOG", 2).unwrap_err();
        assert_eq!(
            err,
            PaginationError::CursorNotFound {
                market: "nasdaq".to_string(),
                cursor: "GOOG".to_string(),
            }
        );
    }

    #[test]
    fn empty_market_is_end_of_list() {
        let list = market(&[]);
        assert_eq!(paginate("m", &list, "", 10).unwrap(), Page::end());
    }

    #[test]
    fn walking_with_cursor_reproduces_full_list() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let list = market(&names);

        for length in 1..=10 {
            let (all, calls) = walk(&list, length);
            assert_eq!(all, names, "length {length}");
            // каждая страница кроме последней полная
            assert_eq!(calls, names.len() / length + 1, "length {length}");
        }
    }
}
