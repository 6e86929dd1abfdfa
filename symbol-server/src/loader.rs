use std::sync::Arc;
use std::thread;

use log::{error, info, warn};
use symbol_core::ingest::ingest;
use symbol_core::{IngestReport, SymbolTable};

use crate::config::MarketSource;
use crate::source;

/// Чем закончилась загрузка одного рынка
#[derive(Debug)]
pub(crate) struct IngestOutcome {
    pub(crate) market: String,
    pub(crate) result: anyhow::Result<IngestReport>,
}

/// Грузит все рынки параллельно, по потоку на рынок.
///
/// Возвращается только когда все потоки отчитались: это барьер перед
/// стартом сервера, запросы не видят таблицу в процессе записи.
/// Ошибка одного рынка не мешает остальным.
pub(crate) fn load_markets(
    sources: Vec<MarketSource>,
    table: Arc<SymbolTable>,
) -> Vec<IngestOutcome> {
    let (tx, rx) = crossbeam_channel::unbounded::<IngestOutcome>();
    let mut handles = Vec::with_capacity(sources.len());

    for src in sources {
        let tx = tx.clone();
        let table = table.clone();

        let h = thread::spawn(move || {
            let result = load_market(&src, &table);
            if tx
                .send(IngestOutcome {
                    market: src.market,
                    result,
                })
                .is_err()
            {
                warn!("ingest outcome dropped: receiver is gone");
            }
        });
        handles.push(h);
    }
    drop(tx);

    // канал закрывается, когда завершились все потоки
    let outcomes: Vec<IngestOutcome> = rx.iter().collect();

    for h in handles {
        if let Err(panic) = h.join() {
            warn!("ingest thread panicked: {:?}", panic);
        }
    }

    for o in &outcomes {
        match &o.result {
            Ok(report) => info!("market {} ready: {} symbols", o.market, report.records),
            Err(e) => error!(
                "market {} failed to load ({} symbols kept): {e:#}",
                o.market,
                table.len(&o.market)
            ),
        }
    }

    outcomes
}

fn load_market(src: &MarketSource, table: &SymbolTable) -> anyhow::Result<IngestReport> {
    info!("loading market {} from {}", src.market, src.source);

    let reader = source::open(&src.source)?;
    let report = ingest(reader, table, &src.market)?;

    Ok(report)
}
