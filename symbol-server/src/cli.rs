use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::config::{self, LogLevel};

/// Symbol Server - грузит справочники тикеров по рынкам и отдаёт их постранично по TCP.
#[derive(Parser, Debug, Clone)]
#[command(name = "symbol-server", version, about)]
pub(crate) struct Args {
    /// TCP bind address, например 0.0.0.0:5555
    #[arg(long, default_value = config::TCP_BIND_ADDR)]
    pub(crate) tcp_bind: SocketAddr,

    /// Рынок, под которым сохраняется справочник с FTP
    #[arg(long, default_value = config::FTP_MARKET)]
    pub(crate) ftp_market: String,

    /// FTP сервер HOST:PORT
    #[arg(long, default_value = config::FTP_SERVER)]
    pub(crate) ftp_server: String,

    #[arg(long, default_value = config::FTP_USER)]
    pub(crate) ftp_user: String,

    #[arg(
        long,
        env = "SYMBOL_FTP_PASSWORD",
        hide_env_values = true,
        default_value = config::FTP_PASSWORD
    )]
    pub(crate) ftp_password: String,

    /// Каталог на FTP сервере (пусто - корень)
    #[arg(long, default_value = config::FTP_PATH)]
    pub(crate) ftp_path: String,

    /// Файл справочника на FTP сервере
    #[arg(long, default_value = config::FTP_FILE)]
    pub(crate) ftp_file: String,

    /// Не ходить на FTP (только --market-file)
    #[arg(long)]
    pub(crate) no_ftp: bool,

    /// Дополнительный рынок из локального файла того же формата: MARKET=PATH.
    /// Можно указывать несколько раз.
    #[arg(long = "market-file", value_name = "MARKET=PATH", value_parser = parse_market_file)]
    pub(crate) market_files: Vec<(String, PathBuf)>,

    /// Загрузить, напечатать список рынков и первую страницу каждого, выйти
    #[arg(long)]
    pub(crate) no_serve: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub(crate) log_level: LogLevel,
}

fn parse_market_file(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    let (market, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MARKET=PATH, got {raw:?}"))?;

    let market = market.trim();
    if market.is_empty() {
        return Err(format!("empty market in {raw:?}"));
    }
    if path.trim().is_empty() {
        return Err(format!("empty path in {raw:?}"));
    }

    Ok((market.to_ascii_lowercase(), PathBuf::from(path.trim())))
}

impl Args {
    /// Валидация аргументов (есть что грузить, файлы существуют, рынки не повторяются)
    pub(crate) fn validate(&self) -> Result<()> {
        if self.no_ftp && self.market_files.is_empty() {
            bail!("nothing to load: --no-ftp given without any --market-file");
        }

        if !self.no_ftp {
            if self.ftp_market.trim().is_empty() {
                bail!("--ftp-market is empty");
            }
            if !self.ftp_server.contains(':') {
                bail!("--ftp-server must look like HOST:PORT (got: {})", self.ftp_server);
            }
            if self.ftp_file.trim().is_empty() {
                bail!("--ftp-file is empty");
            }
        }

        for (_, path) in &self.market_files {
            let md = std::fs::metadata(path)
                .with_context(|| format!("source file not found: {:?}", path))?;
            if !md.is_file() {
                bail!("--market-file must point to a file: {:?}", path);
            }
        }

        // два писателя в один рынок не поддерживаются
        let mut seen = HashSet::new();
        for source in config::market_sources(self) {
            if !seen.insert(source.market.clone()) {
                bail!("market {} is configured more than once", source.market);
            }
        }

        Ok(())
    }
}
