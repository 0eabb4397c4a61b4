//! PDFium library binding.
//!
//! pdfium-render loads `libpdfium` dynamically and only allows one set of
//! bindings per process, so the bound [`Pdfium`] lives in a process-wide
//! [`OnceLock`] and every conversion borrows it. The first successful bind
//! wins; a library path passed on later calls is ignored.
//!
//! Resolution order (first match wins):
//!
//! 1. the explicit path from the config (file or directory)
//! 2. `PDFIUM_LIB_PATH` (file or directory)
//! 3. the platform library name in the working directory
//! 4. the system library search path

use crate::error::Pdf2ImageError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info};

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

static ENGINE: OnceLock<Pdfium> = OnceLock::new();
static BIND_LOCK: Mutex<()> = Mutex::new(());

/// Borrow the process-wide pdfium instance, binding it on first use.
pub fn engine(library_path: Option<&Path>) -> Result<&'static Pdfium, Pdf2ImageError> {
    if let Some(pdfium) = ENGINE.get() {
        return Ok(pdfium);
    }

    let _guard = BIND_LOCK
        .lock()
        .map_err(|e| Pdf2ImageError::Internal(format!("pdfium bind lock poisoned: {e}")))?;

    // Another thread may have bound while we waited.
    if let Some(pdfium) = ENGINE.get() {
        return Ok(pdfium);
    }

    let pdfium = bind(library_path)?;
    Ok(ENGINE.get_or_init(|| pdfium))
}

/// True when a pdfium library can be (or already is) bound.
pub fn is_available(library_path: Option<&Path>) -> bool {
    engine(library_path).is_ok()
}

fn bind(library_path: Option<&Path>) -> Result<Pdfium, Pdf2ImageError> {
    let explicit = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        let lib = resolve_library_file(&path);
        debug!("Binding pdfium from {}", lib.display());
        let bindings = Pdfium::bind_to_library(&lib).map_err(|e| unavailable(&lib, &e))?;
        info!("pdfium bound from {}", lib.display());
        return Ok(Pdfium::new(bindings));
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    let bindings = Pdfium::bind_to_library(&local)
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Pdf2ImageError::ToolUnavailable {
            tool: "PDFium".into(),
            detail: format!("no library in the working directory or system path ({e})"),
        })?;
    info!("pdfium bound from the working directory or system path");
    Ok(Pdfium::new(bindings))
}

/// A directory means "the platform library inside it".
fn resolve_library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

fn unavailable(path: &Path, err: &PdfiumError) -> Pdf2ImageError {
    Pdf2ImageError::ToolUnavailable {
        tool: "PDFium".into(),
        detail: format!("failed to bind '{}': {err}", path.display()),
    }
}
