//! The `GPI_EXTRA` extension loader: a comma-separated list of
//! `path:entry_symbol` pairs, each loaded via the OS dynamic loader and
//! invoked with no arguments, letting additional backends register
//! themselves alongside whatever the simulator's own load-time entry point
//! already registered.

use libloading::{Library, Symbol};

/// Split one `path:entry_symbol` entry on its *last* `:`, so a Windows
/// drive-letter path (`C:\foo\bar.dll:entry`) doesn't get cut at the wrong
/// colon.
fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let idx = entry.rfind(':')?;
    let (path, symbol) = entry.split_at(idx);
    let symbol = &symbol[1..];
    if path.is_empty() || symbol.is_empty() {
        return None;
    }
    Some((path, symbol))
}

/// Load and call every extension named by the environment variable
/// `var_name`. Leaked on purpose: a loaded extension library must outlive
/// the process, since the simulator may call back into symbols it exports
/// at any point before shutdown.
pub fn load_from_env(var_name: &str) -> gpi_core::Result<()> {
    let Ok(value) = std::env::var(var_name) else {
        return Ok(());
    };
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        load_one(entry)?;
    }
    Ok(())
}

fn load_one(entry: &str) -> gpi_core::Result<()> {
    let (path, symbol) = split_entry(entry).ok_or_else(|| gpi_core::GpiError::MalformedExtensionSpec(entry.to_string()))?;

    let lib = unsafe { Library::new(path) }.map_err(|e| gpi_core::GpiError::ExtensionLoad {
        library: path.to_string(),
        symbol: symbol.to_string(),
        reason: e.to_string(),
    })?;

    unsafe {
        let entry_fn: Symbol<unsafe extern "C" fn()> =
            lib.get(symbol.as_bytes()).map_err(|e| gpi_core::GpiError::ExtensionLoad {
                library: path.to_string(),
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;
        entry_fn();
    }

    log::info!("gpi-capi: loaded extension {path}:{symbol}");
    // Leak the library handle: dropping it would unload the shared object
    // while the simulator might still hold callback pointers into it.
    std::mem::forget(lib);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_colon() {
        assert_eq!(split_entry("libfoo.so:my_entry"), Some(("libfoo.so", "my_entry")));
    }

    #[test]
    fn keeps_windows_drive_letter_intact() {
        assert_eq!(
            split_entry("C:\\extras\\foo.dll:my_entry"),
            Some(("C:\\extras\\foo.dll", "my_entry"))
        );
    }

    #[test]
    fn rejects_missing_colon() {
        assert_eq!(split_entry("no-colon-here"), None);
    }

    #[test]
    fn rejects_empty_symbol() {
        assert_eq!(split_entry("libfoo.so:"), None);
    }
}
