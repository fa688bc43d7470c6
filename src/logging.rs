use std::fs::File;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

fn builder(verbose: bool) -> Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    Builder::from_env(env)
}

/// Initializes the global logger from `RUST_LOG`, writing to stderr.
///
/// Without `RUST_LOG`, `verbose` selects debug output; otherwise info and
/// above are shown.
pub fn init(verbose: bool) {
    // A logger may already be installed (tests, embedding binaries).
    let _ = builder(verbose).try_init();
}

/// Same as [`init`] but appends to `path`, for when stderr belongs to the
/// game screen.
pub fn init_to_file(verbose: bool, path: &Path) -> io::Result<()> {
    let file = File::options().create(true).append(true).open(path)?;
    let _ = builder(verbose)
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}
