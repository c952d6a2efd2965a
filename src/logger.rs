use env_logger::Builder;
use log::LevelFilter;
use std::cell::Cell;
use std::io::Write;
use std::sync::Once;
use std::sync::OnceLock;

static INIT: Once = Once::new();

static RANK: OnceLock<usize> = OnceLock::new();

thread_local! {
    // set by in-process workers so their lines carry their own rank
    static WORKER: Cell<Option<usize>> = const { Cell::new(None) };
}

pub fn init(rank: usize, level: Option<LevelFilter>) {
    INIT.call_once(|| {
        let _ = RANK.set(rank);

        let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Some(level) = level {
            builder.filter_level(level);
        }

        let installed = builder
            .format(|buf, record| {
                let rank = WORKER
                    .with(Cell::get)
                    .or_else(|| RANK.get().copied())
                    .unwrap_or_default();
                writeln!(
                    buf,
                    "[RANK {}] {} - {}: {}",
                    rank,
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .try_init();

        if installed.is_err() {
            log::warn!("logger.rs: a logger was already installed");
        }
    });
}

/// Tag every following log line of the current thread with `rank`
pub fn set_worker(rank: usize) {
    WORKER.with(|worker| worker.set(Some(rank)));
}
