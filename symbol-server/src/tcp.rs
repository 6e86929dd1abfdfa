use log::{debug, info, warn};
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use std::time::Duration;
use symbol_core::protocol::{Command, parse_command};
use symbol_core::wire::{encode_markets, encode_page};
use symbol_core::{ProtocolError, SymbolCoreError, SymbolTable};

use anyhow::Context;

/// Тик чтения: на таймауте проверяем shutdown и ждём дальше
const TCP_READ_TICK_MS: u64 = 200;
const TCP_WRITE_TIMEOUT_S: u64 = 5;
/// Максимальная длина строки команды без `\n`
const MAX_LINE_LEN: usize = 1024;

// accept loop + обработка запросов по TCP
pub(crate) fn run_tcp_listener(
    listener: TcpListener,
    table: Arc<SymbolTable>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;
    let mut session_handles = Vec::new();

    loop {
        reap_finished_sessions(&mut session_handles);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("client connected: {addr}");
                stream
                    .set_nonblocking(false)
                    .context("stream.set_nonblocking(false)")?;

                stream.set_nodelay(true).ok();
                stream
                    .set_read_timeout(Some(Duration::from_millis(TCP_READ_TICK_MS)))
                    .ok();
                stream
                    .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
                    .ok();

                let table = table.clone();
                let shutdown = shutdown.clone();

                let h = thread::spawn(move || {
                    if let Err(e) = handle_conn(stream, table, shutdown) {
                        warn!("handle_conn error: {e}");
                    }
                });
                session_handles.push(h);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(Duration::from_millis(50));
            }
        }
    }

    for h in session_handles {
        if let Err(panic) = h.join() {
            warn!("session thread panicked: {:?}", panic);
        }
    }

    Ok(())
}

fn reap_finished_sessions(handles: &mut Vec<thread::JoinHandle<()>>) {
    let mut i = 0;
    while i < handles.len() {
        if handles[i].is_finished() {
            let h = handles.swap_remove(i);
            if let Err(panic) = h.join() {
                warn!("session thread panicked: {:?}", panic);
            }
        } else {
            i += 1;
        }
    }
}

/// Одна команда -> одна строка ответа (JSON или `ERR ...`), пока клиент не закроет соединение
fn handle_conn(
    stream: TcpStream,
    table: Arc<SymbolTable>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut writer = stream.try_clone().context("stream.try_clone()")?;
    let mut reader = BufReader::new(stream);
    let mut line: Vec<u8> = Vec::new();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("shutting down client session");
            break;
        }

        // при таймауте прочитанное остаётся в `line`, дочитываем на следующем тике
        let limit = (MAX_LINE_LEN + 1).saturating_sub(line.len()) as u64;
        let eof = match (&mut reader).take(limit).read_until(b'\n', &mut line) {
            Ok(0) => true,
            Ok(_) => !line.ends_with(b"\n"),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if eof && line.len() > MAX_LINE_LEN {
            let err = SymbolCoreError::from(ProtocolError::LineTooLong(MAX_LINE_LEN));
            warn!("client sent more than {MAX_LINE_LEN} bytes without newline; closing");
            writer.write_all(format!("ERR {err}\n").as_bytes())?;
            writer.flush()?;
            break;
        }

        let text = String::from_utf8_lossy(&line);
        if !text.trim().is_empty() {
            let mut reply = reply_for(&text, &table);
            reply.push('\n');
            writer.write_all(reply.as_bytes())?;
            writer.flush()?;
        }
        line.clear();

        if eof {
            break;
        }
    }

    Ok(())
}

fn reply_for(line: &str, table: &SymbolTable) -> String {
    match handle_line(line, table) {
        Ok(json) => json,
        Err(e) => {
            warn!("request {:?} failed: {e}", line.trim());
            format!("ERR {e}")
        }
    }
}

pub(crate) fn handle_line(line: &str, table: &SymbolTable) -> Result<String, SymbolCoreError> {
    match parse_command(line)? {
        Command::Markets => Ok(encode_markets(table.markets())?),
        Command::Symbols {
            market,
            length,
            cursor,
        } => {
            let page = table.page(&market, &cursor, length)?;
            Ok(encode_page(page)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::Shutdown;
    use symbol_core::Record;

    fn table() -> Arc<SymbolTable> {
        let table = SymbolTable::new();
        table.append(
            "nasdaq",
            vec![
                Record::new("AAPL", "Apple Inc"),
                Record::new("MSFT", "Microsoft Corp"),
                Record::new("ZTS", "Zoetis Inc"),
            ],
        );
        Arc::new(table)
    }

    fn connect_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();

        (client, server)
    }

    fn read_all(mut client: TcpStream) -> String {
        client
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();
        let mut out = String::new();
        client.read_to_string(&mut out).unwrap_or(0);
        out
    }

    #[test]
    fn handle_line_examples() {
        let table = table();

        assert_eq!(
            handle_line("SYMBOLS nasdaq 2", &table).unwrap(),
            r#"{"Symbols":["AAPL","MSFT"]}"#
        );
        assert_eq!(
            handle_line("SYMBOLS nasdaq 2 MSFT", &table).unwrap(),
            r#"{"Symbols":["ZTS",""]}"#
        );
        assert_eq!(
            handle_line("SYMBOLS nasdaq 2 ZTS", &table).unwrap(),
            r#"{"Symbols":[""]}"#
        );
        assert_eq!(
            handle_line("MARKETS", &table).unwrap(),
            r#"{"Markets":["nasdaq"]}"#
        );
    }

    #[test]
    fn handle_line_errors() {
        let table = table();

        assert!(matches!(
            handle_line("SYMBOLS nasdaq 2 GOOG", &table),
            Err(SymbolCoreError::Pagination(_))
        ));
        assert!(matches!(
            handle_line("HELLO", &table),
            Err(SymbolCoreError::Protocol(_))
        ));
    }

    #[test]
    fn handle_conn_answers_each_line_until_eof() {
        let (mut client, server) = connect_pair();
        client
            .write_all(b"MARKETS\nSYMBOLS nasdaq 2\n\nGARBAGE\nSYMBOLS nasdaq 2 MSFT")
            .unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        handle_conn(server, table(), shutdown).unwrap();

        let reply = read_all(client);
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 4, "reply: {reply:?}");
        assert_eq!(lines[0], r#"{"Markets":["nasdaq"]}"#);
        assert_eq!(lines[1], r#"{"Symbols":["AAPL","MSFT"]}"#);
        assert!(lines[2].starts_with("ERR "), "got {:?}", lines[2]);
        assert_eq!(lines[3], r#"{"Symbols":["ZTS",""]}"#);
    }

    #[test]
    fn overlong_line_gets_error_and_connection_closes() {
        let (mut client, server) = connect_pair();
        client.write_all(&[b'A'; 2000]).unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        handle_conn(server, table(), shutdown).unwrap();

        let reply = read_all(client);
        assert!(reply.starts_with("ERR "), "got {reply:?}");
        assert_eq!(reply.lines().count(), 1);
    }

    #[test]
    fn line_at_length_limit_is_still_served() {
        let (mut client, server) = connect_pair();
        let mut cmd = format!("SYMBOLS nasdaq 2{}", " ".repeat(MAX_LINE_LEN));
        cmd.truncate(MAX_LINE_LEN);
        cmd.push('\n');
        client.write_all(cmd.as_bytes()).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        handle_conn(server, table(), shutdown).unwrap();

        assert_eq!(read_all(client), "{\"Symbols\":[\"AAPL\",\"MSFT\"]}\n");
    }

    #[test]
    fn handle_conn_exits_on_shutdown() {
        let (_client, server) = connect_pair();
        server
            .set_read_timeout(Some(Duration::from_millis(TCP_READ_TICK_MS)))
            .unwrap();

        // shutdown=true => не ждём клиента
        let shutdown = Arc::new(AtomicBool::new(true));
        handle_conn(server, table(), shutdown).unwrap();
    }

    #[test]
    fn listener_serves_clients_and_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));

        let h = {
            let shutdown = shutdown.clone();
            thread::spawn(move || run_tcp_listener(listener, table(), shutdown))
        };

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"SYMBOLS NASDAQ 100\n").unwrap();
        client.shutdown(Shutdown::Write).unwrap();
        let reply = read_all(client);
        assert_eq!(reply, "{\"Symbols\":[\"AAPL\",\"MSFT\",\"ZTS\",\"\"]}\n");

        shutdown.store(true, Ordering::Relaxed);
        h.join().unwrap().unwrap();
    }
}
