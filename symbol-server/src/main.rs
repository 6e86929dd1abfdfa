//! Точка входа `symbol-server`.
//!
//! Жизненный цикл:
//! - парсинг CLI, настройка логов
//! - загрузка справочников всех рынков (по потоку на рынок), ожидание всех
//! - либо печать снимка и выход (`--no-serve`), либо TCP сервер запросов
//! - корректная остановка по `Ctrl+C`

mod cli;
mod config;
mod loader;
mod source;
mod tcp;

use std::net::TcpListener;
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::Context;
use clap::Parser;
use log::info;
use symbol_core::SymbolTable;
use symbol_core::wire::{encode_markets, encode_page};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    config::init_logger(args.log_level);
    args.validate()?;

    // загрузка блокирующая, до её конца Ctrl+C - обычный SIGINT (выход)
    let table = Arc::new(SymbolTable::new());
    loader::load_markets(config::market_sources(&args), table.clone());
    info!("supported markets: {}", table.markets().join(","));

    if args.no_serve {
        return print_snapshot(&table);
    }

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let listener = TcpListener::bind(args.tcp_bind)
        .with_context(|| format!("bind TCP listener {}", args.tcp_bind))?;
    info!("symbol-server listening on {}", args.tcp_bind);

    tcp::run_tcp_listener(listener, table, shutdown)
}

/// Список рынков и первая страница каждого - в stdout
fn print_snapshot(table: &SymbolTable) -> anyhow::Result<()> {
    let markets = table.markets();
    println!("{}", encode_markets(markets.clone())?);

    for market in markets {
        let page = table.page(&market, "", config::SNAPSHOT_PAGE_LEN)?;
        println!("{}", encode_page(page)?);
    }

    Ok(())
}
