use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use log::{debug, info, warn};
use suppaftp::{FtpError, FtpStream};
use thiserror::Error;

use crate::config::{FtpConfig, SourceConfig};

/// Ошибки получения источника
#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("ftp connect error: {server}")]
    Connect {
        server: String,
        #[source]
        source: FtpError,
    },

    #[error("ftp login error: {server}")]
    Login {
        server: String,
        #[source]
        source: FtpError,
    },

    #[error("ftp error changing to directory: {path}")]
    ChangeDir {
        path: String,
        #[source]
        source: FtpError,
    },

    #[error("ftp error retrieving file: {file}")]
    Retrieve {
        file: String,
        #[source]
        source: FtpError,
    },

    #[error("failed to open source file: {path:?}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Открыть источник как поток байтов
pub(crate) fn open(source: &SourceConfig) -> Result<Box<dyn Read>, SourceError> {
    match source {
        SourceConfig::Ftp(cfg) => Ok(Box::new(open_ftp(cfg)?)),
        SourceConfig::File(path) => {
            let f = File::open(path).map_err(|e| SourceError::OpenFile {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(f))
        }
    }
}

/// Поток RETR вместе с управляющим соединением.
///
/// Когда данные кончились (`read` вернул 0), читаем ответ сервера о конце
/// передачи: всё кроме 226/250 (например `426 transfer aborted`) - ошибка
/// чтения, а не чистый EOF. QUIT шлём на drop, так что соединение
/// закрывается на любом выходе, в том числе по ошибке.
///
/// Чтение блокирующее и без таймаута: зависший сервер держит загрузку.
/// Поэтому обработчик Ctrl+C ставится только после загрузки (см. `main`),
/// до этого SIGINT по-прежнему завершает процесс.
pub(crate) struct FtpReader {
    ftp: FtpStream,
    data: Option<Box<dyn Read>>,
}

impl Read for FtpReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(data) = self.data.as_mut() else {
            return Ok(0);
        };

        let n = data.read(buf)?;
        if n == 0 && !buf.is_empty() {
            if let Some(data) = self.data.take() {
                self.ftp
                    .finalize_retr_stream(data)
                    .map_err(|e| io::Error::other(format!("ftp transfer failed: {e}")))?;
                debug!("ftp transfer complete");
            }
        }
        Ok(n)
    }
}

impl Drop for FtpReader {
    fn drop(&mut self) {
        // сюда попадаем с открытым потоком только при досрочном выходе
        if let Some(data) = self.data.take() {
            if let Err(e) = self.ftp.finalize_retr_stream(data) {
                warn!("ftp transfer did not finish cleanly: {e}");
            }
        }
        match self.ftp.quit() {
            Ok(()) => debug!("ftp connection closed"),
            Err(e) => debug!("ftp quit error: {e}"),
        }
    }
}

pub(crate) fn open_ftp(cfg: &FtpConfig) -> Result<FtpReader, SourceError> {
    let mut ftp = FtpStream::connect(cfg.server.as_str()).map_err(|e| SourceError::Connect {
        server: cfg.server.clone(),
        source: e,
    })?;

    // дальше ftp закрываем сами: FtpReader ещё не создан
    if let Err(e) = ftp.login(&cfg.user, &cfg.password) {
        let _ = ftp.quit();
        return Err(SourceError::Login {
            server: cfg.server.clone(),
            source: e,
        });
    }

    if let Some(path) = &cfg.path {
        if let Err(e) = ftp.cwd(path) {
            let _ = ftp.quit();
            return Err(SourceError::ChangeDir {
                path: path.clone(),
                source: e,
            });
        }
    }

    let data = match ftp.retr_as_stream(&cfg.file) {
        Ok(d) => d,
        Err(e) => {
            let _ = ftp.quit();
            return Err(SourceError::Retrieve {
                file: cfg.file.clone(),
                source: e,
            });
        }
    };
    info!("ftp {}: retrieving {}", cfg.server, cfg.file);

    Ok(FtpReader {
        ftp,
        data: Some(Box::new(data)),
    })
}
