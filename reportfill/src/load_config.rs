/// `load_config` module: loads the YAML run configuration and applies environment overrides.
///
/// This module is the only place where the user's config file is parsed and mapped to
/// the strongly-typed settings the core pipelines take.
///
/// # Responsibilities
/// - Parse the YAML config file (template path, output folder, date format, layout overrides)
/// - Apply `REPORTFILL_TEMPLATE` / `REPORTFILL_OUTPUT_DIR` environment overrides
/// - Reject unusable date formats up front
/// - Produce clear diagnostics: every failure names the file and whether reading or parsing failed
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{anyhow, Result};
use reportfill_core::dates::{check_format, DEFAULT_DATE_FORMAT};
use reportfill_core::fill::FillConfig;
use reportfill_core::layout::TemplateLayout;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const TEMPLATE_ENV: &str = "REPORTFILL_TEMPLATE";
pub const OUTPUT_DIR_ENV: &str = "REPORTFILL_OUTPUT_DIR";

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_owned()
}

/// Run configuration. `template` and `output_dir` are only needed by `fill`,
/// so a config used just for `redate` may leave them out.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub layout: TemplateLayout,
}

impl CliConfig {
    pub fn fill_config(&self) -> Result<FillConfig> {
        let template = self
            .template
            .clone()
            .ok_or_else(|| anyhow!("Config has no template (set `template` or {TEMPLATE_ENV})"))?;
        Ok(FillConfig {
            template,
            layout: self.layout.clone(),
            date_format: self.date_format.clone(),
        })
    }

    pub fn output_dir(&self) -> Result<&Path> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| anyhow!("Config has no output_dir (set `output_dir` or {OUTPUT_DIR_ENV})"))
    }

    pub fn trace_loaded(&self) {
        info!(
            template = ?self.template,
            output_dir = ?self.output_dir,
            date_format = %self.date_format,
            overwrite = self.overwrite,
            "Loaded config"
        );
        tracing::debug!(layout = ?self.layout, "Template layout");
    }
}

/// Loads the YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path_ref));
        }
    };

    if let Ok(template) = std::env::var(TEMPLATE_ENV) {
        info!(template = %template, "Template overridden from {TEMPLATE_ENV}");
        config.template = Some(PathBuf::from(template));
    }
    if let Ok(output_dir) = std::env::var(OUTPUT_DIR_ENV) {
        info!(output_dir = %output_dir, "Output directory overridden from {OUTPUT_DIR_ENV}");
        config.output_dir = Some(PathBuf::from(output_dir));
    }

    if let Err(e) = check_format(&config.date_format) {
        error!(error = %e, "Unusable date_format in config");
        anyhow::bail!("Failed to parse config {:?}: {e}", path_ref);
    }

    config.trace_loaded();
    Ok(config)
}
