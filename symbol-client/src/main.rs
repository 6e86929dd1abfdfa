//! Точка входа `symbol-client`.
//!
//! - `--markets` — список рынков
//! - `--market M [--cursor C] [--length N]` — одна страница в wire-формате
//! - `--market M --all` — весь список рынка, по тикеру на строку

mod cli;
mod tcp;

use clap::Parser;
use log::info;
use symbol_core::wire::encode_page;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/trace
    env_logger::init();

    let args = cli::Args::parse();
    args.validate()?;

    let mut client = tcp::QueryClient::connect(args.server_socket_addr()?)?;

    if args.markets {
        for market in client.markets()? {
            println!("{market}");
        }
        return Ok(());
    }

    let Some(market) = args.market.as_deref() else {
        anyhow::bail!("--market is required");
    };

    if args.all {
        let total = client.walk(market, args.length, |page| {
            for symbol in &page.symbols {
                println!("{symbol}");
            }
        })?;
        info!("{market}: {total} symbols");
    } else {
        let page = client.page(market, &args.cursor, args.length)?;
        println!("{}", encode_page(page)?);
    }

    Ok(())
}
