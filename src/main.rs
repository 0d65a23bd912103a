use anyhow::Result;
use clap::Parser;
use voxsphere::app::{self, ExitReason};
use voxsphere::audio::AudioInput;
use voxsphere::backend::BackendLink;
use voxsphere::config::AppConfig;
use voxsphere::logging;
use voxsphere::{Speaker, TranscriptEntry, TranscriptLog};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    logging::init_tracing(&config);

    if config.list_input_devices {
        for name in AudioInput::list_devices()? {
            println!("{name}");
        }
        return Ok(());
    }

    let log = TranscriptLog::new();
    log.push(TranscriptEntry::new(Speaker::Sidd, "System boot complete."));
    log.push(TranscriptEntry::new(Speaker::You, "Initialize diagnostics."));

    let mut backend = if config.no_backend {
        None
    } else {
        match BackendLink::spawn(&config.backend_cmd, &config.backend_args, log.clone()) {
            Ok(link) => Some(link),
            Err(err) => {
                // A missing backend degrades to a static transcript rather
                // than aborting the whole visualizer.
                tracing::warn!(error = %err, "backend failed to start");
                eprintln!("warning: backend failed to start: {err:#}");
                None
            }
        }
    };

    let exit = app::run(&config, &log, backend.as_mut());

    if let Some(mut link) = backend {
        link.shutdown();
    }

    match exit? {
        ExitReason::QuitRequested => {}
        ExitReason::BackendExited => eprintln!("backend process exited"),
    }
    Ok(())
}
