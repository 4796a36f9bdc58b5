mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Media, Providers, RoleConfig, Scheduler, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.storage.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, role) in [("analysis", &cfg.providers.analysis), ("image", &cfg.providers.image)] {
		if role.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if role.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if role.model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if role.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
		if !role.temperature.is_finite() || role.temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("Provider {label} temperature must be zero or greater."),
			});
		}
	}

	if cfg.media.enabled {
		if cfg.media.upload_url.trim().is_empty() {
			return Err(Error::Validation {
				message: "media.upload_url must be non-empty when media is enabled.".to_string(),
			});
		}
		if cfg.media.proxy_url.trim().is_empty() {
			return Err(Error::Validation {
				message: "media.proxy_url must be non-empty when media is enabled.".to_string(),
			});
		}
		if cfg.media.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "media.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.scheduler.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "scheduler.poll_interval_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	trim_trailing_slash(&mut cfg.storage.api_base);
	trim_trailing_slash(&mut cfg.providers.analysis.api_base);
	trim_trailing_slash(&mut cfg.providers.image.api_base);
	trim_trailing_slash(&mut cfg.media.upload_url);
	trim_trailing_slash(&mut cfg.media.proxy_url);

	if cfg.media.folder.trim().is_empty() {
		cfg.media.folder = "backgrounds".to_string();
	}
}

fn trim_trailing_slash(value: &mut String) {
	while value.ends_with('/') {
		value.pop();
	}
}
