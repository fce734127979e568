// Startup settings, read from the environment. There are no command line flags.

use std::path::PathBuf;

use thiserror::Error;

pub const ENGINE_VAR: &str = "SATRANJ_ENGINE";
pub const PIECES_VAR: &str = "SATRANJ_PIECES";
pub const SQUARE_SIZE_VAR: &str = "SATRANJ_SQUARE_SIZE";
pub const FPS_VAR: &str = "SATRANJ_FPS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a number in {min}..={max}")]
    OutOfRange {
        var: &'static str,
        value: String,
        min: u32,
        max: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// UCI engine executable; a bare name is looked up in `PATH`.
    pub engine_path: PathBuf,
    /// Directory with wp.png .. bk.png.
    pub pieces_dir: PathBuf,
    pub square_size: f32,
    /// Fixed repaint rate of the main loop.
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("stockfish"),
            pieces_dir: PathBuf::from("assets/pieces"),
            square_size: 80.0,
            fps: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(ENGINE_VAR).filter(|v| !v.is_empty()) {
            config.engine_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(PIECES_VAR).filter(|v| !v.is_empty()) {
            config.pieces_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup(SQUARE_SIZE_VAR) {
            config.square_size = number(SQUARE_SIZE_VAR, &size, 16, 256)? as f32;
        }
        if let Some(fps) = lookup(FPS_VAR) {
            config.fps = number(FPS_VAR, &fps, 1, 240)?;
        }
        Ok(config)
    }

    /// Side length of the (square) window.
    pub fn board_size(&self) -> f32 {
        8.0 * self.square_size
    }
}

fn number(var: &'static str, value: &str, min: u32, max: u32) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| ConfigError::OutOfRange {
            var,
            value: value.to_owned(),
            min,
            max,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.board_size(), 640.0);
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENGINE_VAR, "/opt/sf/stockfish"),
            (PIECES_VAR, "/tmp/pieces"),
            (SQUARE_SIZE_VAR, " 64 "),
            (FPS_VAR, "60"),
        ]))
        .unwrap();
        assert_eq!(config.engine_path, PathBuf::from("/opt/sf/stockfish"));
        assert_eq!(config.pieces_dir, PathBuf::from("/tmp/pieces"));
        assert_eq!(config.board_size(), 512.0);
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn empty_paths_keep_defaults() {
        let config = Config::from_lookup(lookup(&[(ENGINE_VAR, "")])).unwrap();
        assert_eq!(config.engine_path, PathBuf::from("stockfish"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[(SQUARE_SIZE_VAR, "huge")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                var: SQUARE_SIZE_VAR,
                value: "huge".to_owned(),
                min: 16,
                max: 256
            }
        );
        assert!(Config::from_lookup(lookup(&[(FPS_VAR, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(SQUARE_SIZE_VAR, "1000")])).is_err());
    }
}
