use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Result, bail};
use clap::{ArgGroup, Parser};

/// Symbol Client - постраничное чтение справочника тикеров с symbol-server.
///
/// Одно TCP соединение на весь запуск: команды уходят по строке,
/// ответы приходят по строке (JSON или ERR).
#[derive(Parser, Debug, Clone)]
#[command(name = "symbol-client", version, about)]
#[command(
    group(
        ArgGroup::new("query")
            .required(true)
            .args(["markets", "market"])
    )
)]
pub(crate) struct Args {
    /// TCP адрес symbol-server, например 127.0.0.1:5555
    #[arg(long, default_value = "127.0.0.1:5555")]
    pub(crate) server: String,

    /// Показать список рынков
    #[arg(long, conflicts_with = "market")]
    pub(crate) markets: bool,

    /// Рынок, например nasdaq
    #[arg(long)]
    pub(crate) market: Option<String>,

    /// Длина страницы (сервер урезает до 100)
    #[arg(long, default_value_t = 20)]
    pub(crate) length: usize,

    /// Последний полученный тикер; пусто - с начала
    #[arg(long, default_value = "", conflicts_with = "all")]
    pub(crate) cursor: String,

    /// Пройти весь список рынка, печатая тикеры по одному на строку
    #[arg(long, requires = "market")]
    pub(crate) all: bool,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }
        if self.all && self.length == 0 {
            bail!("--all needs --length > 0");
        }

        Ok(())
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_or_markets_is_required() {
        assert!(Args::try_parse_from(["symbol-client"]).is_err());
        assert!(Args::try_parse_from(["symbol-client", "--markets", "--market", "nasdaq"]).is_err());

        let args = Args::try_parse_from(["symbol-client", "--market", "nasdaq"]).unwrap();
        assert_eq!(args.length, 20);
        assert_eq!(args.cursor, "");
        args.validate().unwrap();
    }

    #[test]
    fn all_with_zero_length_is_rejected() {
        let args =
            Args::try_parse_from(["symbol-client", "--market", "nasdaq", "--all", "--length", "0"])
                .unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn server_must_have_port() {
        let args =
            Args::try_parse_from(["symbol-client", "--markets", "--server", "localhost"]).unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["symbol-client", "--markets"]).unwrap();
        assert_eq!(
            args.server_socket_addr().unwrap(),
            "127.0.0.1:5555".parse().unwrap()
        );
    }
}
