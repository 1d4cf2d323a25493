use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Config;
use crate::export::export_workbook;
use crate::loader::{LoadedData, load_all};
use crate::state::{Delta, ProviderCommand};

const TICK: Duration = Duration::from_millis(250);

/// Background worker: loads the dataset, reloads it on a timer or on request,
/// and writes exports. Everything it learns goes back to the UI as deltas.
pub fn spawn_provider(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut latest: Option<LoadedData> = None;
        refresh(&config, &tx, &mut latest);
        let mut last_refresh = Instant::now();

        loop {
            thread::sleep(TICK);

            if last_refresh.elapsed() >= config.refresh_interval {
                refresh(&config, &tx, &mut latest);
                last_refresh = Instant::now();
            }

            loop {
                match cmd_rx.try_recv() {
                    Ok(ProviderCommand::Refresh) => {
                        let _ = tx.send(Delta::Log("[INFO] Refreshing data".to_string()));
                        refresh(&config, &tx, &mut latest);
                        last_refresh = Instant::now();
                    }
                    Ok(ProviderCommand::Export { path }) => {
                        run_export(&path, latest.as_ref(), &tx);
                    }
                    Err(TryRecvError::Empty) => break,
                    // UI is gone.
                    Err(TryRecvError::Disconnected) => return,
                }
            }
        }
    });
}

fn refresh(config: &Config, tx: &Sender<Delta>, latest: &mut Option<LoadedData>) {
    match load_all(config) {
        Ok(data) => {
            *latest = Some(data.clone());
            let _ = tx.send(Delta::SetData(Box::new(data)));
        }
        Err(err) => {
            warn!("load failed: {err:#}");
            let _ = tx.send(Delta::LoadFailed(format!("{err:#}")));
        }
    }
}

fn run_export(path: &str, data: Option<&LoadedData>, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::ExportStarted {
        path: path.to_string(),
    });
    let Some(data) = data else {
        let _ = tx.send(Delta::ExportFailed {
            path: path.to_string(),
            error: "no data loaded yet".to_string(),
        });
        return;
    };
    match export_workbook(path, &data.matches, &data.overrides) {
        Ok(report) => {
            info!(path, fixtures = report.fixtures, tables = report.tables, "export written");
            let _ = tx.send(Delta::ExportFinished {
                path: path.to_string(),
                fixtures: report.fixtures,
                tables: report.tables,
            });
        }
        Err(err) => {
            warn!(path, "export failed: {err:#}");
            let _ = tx.send(Delta::ExportFailed {
                path: path.to_string(),
                error: format!("{err:#}"),
            });
        }
    }
}
