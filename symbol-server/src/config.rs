use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use log::LevelFilter;

use crate::cli::Args;

pub(crate) const TCP_BIND_ADDR: &str = "0.0.0.0:5555";

// справочник NASDAQ: http://www.nasdaqtrader.com/trader.aspx?id=symboldirdefs
// NB: nasdaqlisted.txt имеет другой набор колонок, нам нужен nasdaqtraded.txt
pub(crate) const FTP_MARKET: &str = "nasdaq";
pub(crate) const FTP_SERVER: &str = "ftp.nasdaqtrader.com:21";
pub(crate) const FTP_USER: &str = "anonymous";
pub(crate) const FTP_PASSWORD: &str = "anonymous";
pub(crate) const FTP_PATH: &str = "symboldirectory";
pub(crate) const FTP_FILE: &str = "nasdaqtraded.txt";

/// Длина первой страницы в режиме `--no-serve`
pub(crate) const SNAPSHOT_PAGE_LEN: usize = 20;

/// Уровень логирования
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    Trace,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// Логи в stderr; RUST_LOG, если задан, уточняет фильтры поверх `--log-level`
pub(crate) fn init_logger(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FtpConfig {
    pub(crate) server: String,
    pub(crate) user: String,
    pub(crate) password: String,
    /// каталог на сервере, `None` - остаёмся в корне
    pub(crate) path: Option<String>,
    pub(crate) file: String,
}

/// Откуда брать справочник
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceConfig {
    Ftp(FtpConfig),
    File(PathBuf),
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConfig::Ftp(ftp) => match &ftp.path {
                Some(path) => write!(f, "ftp://{}/{}/{}", ftp.server, path, ftp.file),
                None => write!(f, "ftp://{}/{}", ftp.server, ftp.file),
            },
            SourceConfig::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Рынок + его источник
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarketSource {
    pub(crate) market: String,
    pub(crate) source: SourceConfig,
}

/// Список источников из CLI: FTP (если не `--no-ftp`) + все `--market-file`
pub(crate) fn market_sources(args: &Args) -> Vec<MarketSource> {
    let mut sources = Vec::new();

    if !args.no_ftp {
        let path = args.ftp_path.trim();
        sources.push(MarketSource {
            market: args.ftp_market.to_ascii_lowercase(),
            source: SourceConfig::Ftp(FtpConfig {
                server: args.ftp_server.clone(),
                user: args.ftp_user.clone(),
                password: args.ftp_password.clone(),
                path: (!path.is_empty()).then(|| path.to_string()),
                file: args.ftp_file.clone(),
            }),
        });
    }

    for (market, path) in &args.market_files {
        sources.push(MarketSource {
            market: market.clone(),
            source: SourceConfig::File(path.clone()),
        });
    }

    sources
}
