use std::{fs, path::Path};

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. A batch run has no scrape endpoint, so the
/// rendering is written out with [`write_textfile`] instead.
pub fn init() -> anyhow::Result<()> {
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus metrics recorder")?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Write the current metrics in the node-exporter textfile format.
///
/// The file is written next to its target and renamed into place so the
/// collector never reads a partial file.
pub fn write_textfile(path: &Path) -> anyhow::Result<()> {
    let handle = PROM_HANDLE
        .get()
        .context("Prometheus recorder not initialized")?;

    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, handle.render()).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to move metrics into {}", path.display()))?;

    tracing::debug!(path = %path.display(), "metrics textfile written");
    Ok(())
}
