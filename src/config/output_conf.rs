use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Output directory for PDFs generated by the inline endpoint.
///
/// The directory is created lazily on first write; filenames carry a unique
/// suffix so concurrent requests never collide.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let output_dir = env::var("QUOTE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("salidas"));
        debug!("Quote output directory: {}", output_dir.display());
        OutputConfig { output_dir }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            output_dir: PathBuf::from("salidas"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_dir() {
        let config = OutputConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("salidas"));
    }
}
