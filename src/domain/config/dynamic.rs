// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::config::Settings;
use crate::shared::error::{MaintenanceError, Result};
use std::collections::HashMap;
use std::str::FromStr;

/// Apply `-D key=value` overrides on top of file settings.
pub fn apply_to_settings(configs: &HashMap<String, String>, settings: &mut Settings) -> Result<()> {
    if let Some(host) = configs.get("registry.host") {
        settings.registry.host = host.clone();
    }

    if let Some(namespace) = configs.get("registry.namespace") {
        settings.registry.namespace = namespace.clone();
    }

    if let Some(username) = configs.get("registry.username") {
        settings.registry.username = if username.is_empty() {
            None
        } else {
            Some(username.clone())
        };
    }

    if let Some(insecure) = configs.get("registry.insecure") {
        settings.registry.insecure = parse_value("registry.insecure", insecure)?;
    }

    if let Some(retries) = configs.get("registry.retries") {
        settings.registry.retries = parse_value("registry.retries", retries)?;
    }

    if let Some(major) = configs.get("defaults.pg-major") {
        settings.defaults.pg_major = parse_value("defaults.pg-major", major)?;
    }

    if let Some(distribution) = configs.get("defaults.distribution") {
        settings.defaults.distribution = distribution.clone();
    }

    if let Some(supported) = configs.get("distributions.supported") {
        settings.distributions.supported = parse_list(supported);
    }

    if let Some(ignore) = configs.get("discovery.ignore") {
        settings.discovery.ignore = parse_list(ignore);
    }

    if let Some(runtime) = configs.get("container.runtime") {
        settings.container.runtime = runtime.clone();
    }

    if let Some(network) = configs.get("container.network") {
        settings.container.network = if network.is_empty() {
            None
        } else {
            Some(network.clone())
        };
    }

    if let Some(parallelism) = configs.get("container.parallelism") {
        settings.container.parallelism = parse_value("container.parallelism", parallelism)?;
    }

    if let Some(image) = configs.get("testing.chainsaw-image") {
        settings.testing.chainsaw_image = image.clone();
    }

    settings.validate()
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        MaintenanceError::config_error(format!("Invalid value for {}: '{}'", key, value))
    })
}

fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_overrides_applied() {
        let mut settings = Settings::default();
        apply_to_settings(
            &configs(&[
                ("registry.host", "localhost:5000"),
                ("registry.insecure", "true"),
                ("defaults.pg-major", "17"),
                ("distributions.supported", "bookworm, trixie ,forky"),
                ("container.network", "host"),
            ]),
            &mut settings,
        )
        .unwrap();

        assert_eq!(settings.registry.host, "localhost:5000");
        assert!(settings.registry.insecure);
        assert_eq!(settings.defaults.pg_major, 17);
        assert_eq!(
            settings.distributions.supported,
            vec!["bookworm", "trixie", "forky"]
        );
        assert_eq!(settings.container.network.as_deref(), Some("host"));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let mut settings = Settings::default();
        let err = apply_to_settings(&configs(&[("container.parallelism", "many")]), &mut settings)
            .unwrap_err();
        assert!(err.to_string().contains("container.parallelism"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut settings = Settings::default();
        apply_to_settings(&configs(&[("kubernetes.master.image", "x")]), &mut settings).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
