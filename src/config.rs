//! Configuration management for PDF Ops Server

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server and resource limits
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Root under which each request gets its own scratch directory
    pub scratch_dir: PathBuf,
    /// Maximum request body size in bytes (default: 100MB)
    pub max_upload_bytes: usize,
    /// Number of PDF jobs allowed to run at once (default: 4)
    pub max_concurrent_jobs: usize,
    /// Upper bound for a single job (default: 120s)
    pub job_timeout: Duration,
    /// External PDF-to-Word command with `{input}` and `{output}` placeholders
    pub converter_command: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            scratch_dir: env::temp_dir().join("pdf-ops-server"),
            max_upload_bytes: 100 * 1024 * 1024, // 100MB
            max_concurrent_jobs: 4,
            job_timeout: Duration::from_secs(120),
            converter_command: "pdf2docx convert {input} {output}".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read overrides from `PDF_OPS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let max_concurrent_jobs =
            parse_var(&lookup, "PDF_OPS_MAX_JOBS")?.unwrap_or(defaults.max_concurrent_jobs);
        if max_concurrent_jobs == 0 {
            return Err(Error::Config {
                key: "PDF_OPS_MAX_JOBS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: lookup("PDF_OPS_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PDF_OPS_PORT")?.unwrap_or(defaults.port),
            scratch_dir: lookup("PDF_OPS_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            max_upload_bytes: parse_var(&lookup, "PDF_OPS_MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            max_concurrent_jobs,
            job_timeout: parse_var(&lookup, "PDF_OPS_JOB_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_timeout),
            converter_command: lookup("PDF_OPS_CONVERTER").unwrap_or(defaults.converter_command),
        })
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| Error::Config {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.job_timeout, Duration::from_secs(120));
        assert!(config.converter_command.contains("{input}"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PDF_OPS_HOST", "127.0.0.1"),
            ("PDF_OPS_PORT", "8080"),
            ("PDF_OPS_SCRATCH_DIR", "/srv/scratch"),
            ("PDF_OPS_MAX_JOBS", "2"),
            ("PDF_OPS_JOB_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.scratch_dir, PathBuf::from("/srv/scratch"));
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.job_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let err = ServerConfig::from_lookup(lookup(&[("PDF_OPS_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key == "PDF_OPS_PORT"));

        let err = ServerConfig::from_lookup(lookup(&[("PDF_OPS_MAX_JOBS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
