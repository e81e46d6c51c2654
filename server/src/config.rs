// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command line and environment configuration for the server.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Personal task manager API")]
pub struct Config {
    /// Address the HTTP API listens on.
    #[arg(short, long, env = "TASKNEST_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// JSON seed file with `tasks` and `categories` (bundled data when absent).
    #[arg(short, long, env = "TASKNEST_SEED")]
    pub seed: Option<PathBuf>,

    /// Simulated latency of every task store call, in milliseconds.
    #[arg(long, env = "TASKNEST_TASK_LATENCY_MS", default_value_t = 300)]
    pub task_latency_ms: u64,

    /// Simulated latency of every category store call, in milliseconds.
    #[arg(long, env = "TASKNEST_CATEGORY_LATENCY_MS", default_value_t = 200)]
    pub category_latency_ms: u64,

    /// Log filter (trace, debug, info, warn, error or a full directive).
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn task_latency(&self) -> Duration {
        Duration::from_millis(self.task_latency_ms)
    }

    pub fn category_latency(&self) -> Duration {
        Duration::from_millis(self.category_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "tasknest",
            "--bind",
            "127.0.0.1:8080",
            "--seed",
            "data/seed.json",
            "--task-latency-ms",
            "0",
            "--category-latency-ms",
            "5",
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.seed, Some(PathBuf::from("data/seed.json")));
        assert_eq!(config.task_latency(), Duration::ZERO);
        assert_eq!(config.category_latency(), Duration::from_millis(5));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        assert!(Config::try_parse_from(["tasknest", "--bind", "not-an-address"]).is_err());
    }
}
