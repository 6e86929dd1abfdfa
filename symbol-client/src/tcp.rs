use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use anyhow::Context;
use log::debug;
use symbol_core::Page;
use symbol_core::protocol::{Command, format_command_line};
use symbol_core::wire::{decode_markets, decode_page};

const TCP_READ_TIMEOUT_S: u64 = 5;
const TCP_WRITE_TIMEOUT_S: u64 = 5;

/// Соединение с symbol-server
pub(crate) struct QueryClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl QueryClient {
    pub(crate) fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("connect to symbol-server {addr}"))?;

        stream.set_nodelay(true).ok();
        stream
            .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT_S)))
            .ok();
        stream
            .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
            .ok();

        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }

    pub(crate) fn markets(&mut self) -> anyhow::Result<Vec<String>> {
        let reply = self.request(&Command::Markets)?;
        Ok(decode_markets(&reply)?)
    }

    pub(crate) fn page(&mut self, market: &str, cursor: &str, length: usize) -> anyhow::Result<Page> {
        let reply = self.request(&Command::Symbols {
            market: market.to_string(),
            length,
            cursor: cursor.to_string(),
        })?;
        Ok(decode_page(&reply)?)
    }

    /// Проходит весь список рынка: курсор = последний тикер предыдущей страницы.
    /// Возвращает количество полученных тикеров.
    pub(crate) fn walk(
        &mut self,
        market: &str,
        length: usize,
        mut on_page: impl FnMut(&Page),
    ) -> anyhow::Result<usize> {
        let mut cursor = String::new();
        let mut total = 0;

        loop {
            let page = self.page(market, &cursor, length)?;
            total += page.symbols.len();
            on_page(&page);

            if page.end_of_list {
                return Ok(total);
            }
            match page.last_symbol() {
                Some(last) => cursor = last.to_string(),
                None => anyhow::bail!("server returned an empty page before end of list"),
            }
        }
    }

    fn request(&mut self, cmd: &Command) -> anyhow::Result<String> {
        let line = format_command_line(cmd);
        debug!("-> {}", line.trim_end());

        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;

        let mut reply = String::new();
        let n = self.reader.read_line(&mut reply)?;
        if n == 0 {
            anyhow::bail!("server closed connection without response");
        }

        let reply = reply.trim_end_matches(&['\r', '\n'][..]);
        debug!("<- {reply}");

        if let Some(rest) = reply.strip_prefix("ERR") {
            anyhow::bail!("server error: {}", rest.trim());
        }

        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use symbol_core::protocol::parse_command;
    use symbol_core::wire::{encode_markets, encode_page};
    use symbol_core::{Record, SymbolTable};

    /// Мини-сервер: отвечает по таблице, пока клиент не закроет соединение
    fn spawn_server(symbols: Vec<&'static str>) -> (SocketAddr, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let h = thread::spawn(move || {
            let table = SymbolTable::new();
            table.append("nasdaq", symbols.iter().map(|s| Record::new(*s, "x")));

            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut requests = 0;

            for line in BufReader::new(stream).lines() {
                let line = line.unwrap();
                requests += 1;
                let reply = match parse_command(&line).unwrap() {
                    Command::Markets => encode_markets(table.markets()).unwrap(),
                    Command::Symbols {
                        market,
                        length,
                        cursor,
                    } => match table.page(&market, &cursor, length) {
                        Ok(page) => encode_page(page).unwrap(),
                        Err(e) => format!("ERR {e}"),
                    },
                };
                writer.write_all(format!("{reply}\n").as_bytes()).unwrap();
            }
            requests
        });

        (addr, h)
    }

    #[test]
    fn walk_collects_full_list_over_one_connection() {
        let symbols = vec!["A", "B", "C", "D", "E"];
        let (addr, h) = spawn_server(symbols.clone());

        let mut client = QueryClient::connect(addr).unwrap();
        let mut got = Vec::new();
        let total = client
            .walk("nasdaq", 2, |page| got.extend(page.symbols.iter().cloned()))
            .unwrap();
        drop(client);

        assert_eq!(total, 5);
        assert_eq!(got, symbols);
        // [A,B] [C,D] [E,""]
        assert_eq!(h.join().unwrap(), 3);
    }

    #[test]
    fn markets_and_single_page() {
        let (addr, h) = spawn_server(vec!["AAPL", "MSFT", "ZTS"]);

        let mut client = QueryClient::connect(addr).unwrap();
        assert_eq!(client.markets().unwrap(), vec!["nasdaq"]);

        let page = client.page("nasdaq", "MSFT", 2).unwrap();
        assert_eq!(page.symbols, vec!["ZTS"]);
        assert!(page.end_of_list);
        drop(client);

        h.join().unwrap();
    }

    #[test]
    fn server_err_becomes_error() {
        let (addr, h) = spawn_server(vec!["AAPL"]);

        let mut client = QueryClient::connect(addr).unwrap();
        let err = client.page("nasdaq", "GOOG", 2).unwrap_err();
        assert!(err.to_string().contains("server error"), "got {err}");
        drop(client);

        h.join().unwrap();
    }
}
