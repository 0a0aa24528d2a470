//! Rebuild the atlas whenever a shader source changes

use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use std::time::Duration;

use anyhow::Context;
use notify::{Event, RecursiveMode, Watcher};

use super::build_tasks::{self, Config};
use super::{FRAGMENT_FILE_SUFFIX, VERTEX_FILE_SUFFIX};

/// editors tend to write a file more than once per save;
/// rebuild once the directory has been quiet this long
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Blocks forever, calling `write_precompiled_shaders` after each change.
/// Build failures are logged rather than returned so a typo doesn't end the session.
pub fn watch_and_rebuild(config: &Config) -> anyhow::Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) if is_shader_source_change(&event) => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(e) => log::error!("watch error: {e}"),
        }
    })
    .context("failed to create file watcher")?;

    watcher
        .watch(&config.shaders_source_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {:?}", config.shaders_source_dir))?;

    log::info!("watching {:?} for shader changes", config.shaders_source_dir);

    while wait_until_quiet(&rx, DEBOUNCE) {
        match build_tasks::write_precompiled_shaders(config) {
            Ok(()) => log::info!("rebuilt shaders"),
            Err(e) => log::error!("shader rebuild failed: {e:#}"),
        }
    }

    Ok(())
}

/// Blocks for the next change, then absorbs the rest of its burst.
/// Returns false once the watcher is gone.
fn wait_until_quiet(rx: &Receiver<()>, quiet: Duration) -> bool {
    if rx.recv().is_err() {
        return false;
    }
    while rx.recv_timeout(quiet).is_ok() {}
    true
}

fn is_shader_source_change(event: &Event) -> bool {
    (event.kind.is_create() || event.kind.is_modify())
        && event.paths.iter().any(|path| is_shader_source(path))
}

fn is_shader_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name.ends_with(VERTEX_FILE_SUFFIX) || name.ends_with(FRAGMENT_FILE_SUFFIX)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use notify::EventKind;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(path.into())
    }

    #[test]
    fn shader_writes_trigger_a_rebuild() {
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert!(is_shader_source_change(&event(modify, "shaders/source/lit_mesh.frag")));
        assert!(is_shader_source_change(&event(
            EventKind::Create(CreateKind::File),
            "shaders/source/new.vert"
        )));
    }

    #[test]
    fn other_files_and_removals_are_ignored() {
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert!(!is_shader_source_change(&event(modify, "shaders/source/notes.txt")));
        assert!(!is_shader_source_change(&event(modify, "shaders/source/lit_mesh.frag~")));
        assert!(!is_shader_source_change(&event(
            EventKind::Remove(RemoveKind::File),
            "shaders/source/lit_mesh.vert"
        )));
    }

    #[test]
    fn a_burst_of_changes_is_one_rebuild() {
        let (tx, rx) = channel();
        tx.send(()).unwrap();
        let late = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            tx.send(()).unwrap();
        });

        assert!(wait_until_quiet(&rx, Duration::from_millis(500)));

        late.join().unwrap();
        assert!(rx.try_recv().is_err());
        assert!(!wait_until_quiet(&rx, Duration::from_millis(500)));
    }

    #[test]
    fn a_closed_watcher_ends_the_loop() {
        let (tx, rx) = channel::<()>();
        drop(tx);

        assert!(!wait_until_quiet(&rx, DEBOUNCE));
    }
}
