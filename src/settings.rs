use std::path::Path;
use std::time::Duration;

use dsa_lib::{Config, DsaError, Viewport};

/// Audit flags that override config values when given.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditOverrides {
    pub viewport: Option<Viewport>,
    pub nav_timeout: Option<u64>,
    pub network_idle_timeout: Option<u64>,
    pub process_timeout: Option<u64>,
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/dsa/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, DsaError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        DsaError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        DsaError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Apply CLI flags on top of the loaded config. Zero timeouts are rejected.
pub fn apply_overrides(mut config: Config, flags: &AuditOverrides) -> Result<Config, DsaError> {
    let seconds = |name: &str, value: u64| {
        if value == 0 {
            Err(DsaError::Config(format!("--{} must be at least 1 second", name)))
        } else {
            Ok(Duration::from_secs(value))
        }
    };

    if let Some(viewport) = flags.viewport {
        config.viewport = viewport;
    }
    if let Some(v) = flags.nav_timeout {
        config.timeouts.navigation = seconds("nav-timeout", v)?;
    }
    if let Some(v) = flags.network_idle_timeout {
        config.timeouts.network_idle = seconds("network-idle-timeout", v)?;
    }
    if let Some(v) = flags.process_timeout {
        config.timeouts.process = seconds("process-timeout", v)?;
    }
    Ok(config)
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let t = &config.timeouts;
    let a = &config.analysis;
    format!(
        "Effective config [{source}]: viewport={}, timeouts: nav={:?}, network-idle={:?}, settle={:?}, process={:?}, retries={}, caps: text={}, layout={}, deltaE={:.1}, base-unit threshold={:.2}",
        config.viewport,
        t.navigation,
        t.network_idle,
        t.settle,
        t.process,
        config.browser.navigation_retries,
        config.sampling.max_text_elements,
        config.sampling.max_layout_elements,
        a.delta_e_threshold,
        a.base_unit_threshold,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overrides_win_over_config() {
        let mut config = Config::default();
        config.timeouts.navigation = Duration::from_secs(99);
        let flags = AuditOverrides {
            viewport: Some(Viewport { width: 800, height: 600 }),
            nav_timeout: Some(12),
            ..Default::default()
        };
        let resolved = apply_overrides(config, &flags).unwrap();
        assert_eq!(resolved.viewport, Viewport { width: 800, height: 600 });
        assert_eq!(resolved.timeouts.navigation, Duration::from_secs(12));
        assert_eq!(resolved.timeouts.process, Duration::from_secs(60));
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let mut config = Config::default();
        config.timeouts.process = Duration::from_secs(120);
        let resolved = apply_overrides(config, &AuditOverrides::default()).unwrap();
        assert_eq!(resolved.timeouts.process, Duration::from_secs(120));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let flags = AuditOverrides {
            process_timeout: Some(0),
            ..Default::default()
        };
        let err = apply_overrides(Config::default(), &flags).unwrap_err();
        assert!(matches!(err, DsaError::Config(msg) if msg.contains("process-timeout")));
    }

    #[test]
    fn load_config_reports_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ndelta_e_threshold = 0.0").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, DsaError::Config(msg) if msg.contains("delta_e_threshold")));
    }

    #[test]
    fn load_config_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "viewport = \"1024x768\"\n[timeouts]\nnavigation = \"15s\"\n[weights]\ncolors = 0.5"
        )
        .unwrap();
        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.viewport, Viewport { width: 1024, height: 768 });
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(15));
    }

    #[test]
    fn format_effective_config_names_the_source() {
        let line = format_effective_config(&Config::default(), None);
        assert!(line.contains("[defaults]"));
        assert!(line.contains("viewport=1440x900"));
    }
}
