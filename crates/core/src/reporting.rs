//! Reporting of deployment times and gas costs.

use std::time::Duration;

use ansi_term::{ANSIStrings, Color};
use tracing::info;

use mtk_common::types::ArtifactName;
use mtk_config::ReportingConfiguration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentSpeed {
    Fast,
    Medium,
    Slow,
}

impl DeploymentSpeed {
    fn color(self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Medium => Color::Yellow,
            Self::Slow => Color::Red,
        }
    }
}

/// Deployments faster than `fast` are fast, faster than `medium` are medium and slow otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeploymentThresholds {
    pub fast: Duration,
    pub medium: Duration,
}

impl DeploymentThresholds {
    pub fn classify(&self, elapsed: Duration) -> DeploymentSpeed {
        if elapsed < self.fast {
            DeploymentSpeed::Fast
        } else if elapsed < self.medium {
            DeploymentSpeed::Medium
        } else {
            DeploymentSpeed::Slow
        }
    }
}

impl Default for DeploymentThresholds {
    fn default() -> Self {
        Self::from(&ReportingConfiguration::default())
    }
}

impl From<&ReportingConfiguration> for DeploymentThresholds {
    fn from(value: &ReportingConfiguration) -> Self {
        Self {
            fast: value.fast_deployment_threshold(),
            medium: value.medium_deployment_threshold(),
        }
    }
}

pub fn log_deployment_time(name: &ArtifactName, elapsed: Duration, thresholds: DeploymentThresholds) {
    let speed = thresholds.classify(elapsed);
    info!(
        %name,
        elapsed_ms = elapsed.as_millis() as u64,
        "{}",
        ANSIStrings(&[
            Color::Blue.paint(format!("Deployed: {name} ")),
            speed
                .color()
                .paint(format!("({} ms)", with_thousands_separators(elapsed.as_millis()))),
        ])
    );
}

/// The prices used to estimate what an amount of gas costs in dollars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasPricing {
    pub gas_price_gwei: u64,
    pub eth_price: u64,
}

impl GasPricing {
    /// The cost of the gas in cents, rounded to the nearest cent.
    pub fn cost_in_cents(&self, gas: u64) -> u128 {
        let numerator = gas as u128 * self.gas_price_gwei as u128 * self.eth_price as u128;
        (numerator + 5_000_000) / 10_000_000
    }

    /// The cost of the gas as a dollar amount, e.g. `$1,234.50`.
    pub fn format_cost(&self, gas: u64) -> String {
        let cents = self.cost_in_cents(gas);
        format!(
            "${}.{:02}",
            with_thousands_separators(cents / 100),
            cents % 100
        )
    }
}

impl Default for GasPricing {
    fn default() -> Self {
        Self::from(&ReportingConfiguration::default())
    }
}

impl From<&ReportingConfiguration> for GasPricing {
    fn from(value: &ReportingConfiguration) -> Self {
        Self {
            gas_price_gwei: value.gas_price_gwei,
            eth_price: value.eth_price,
        }
    }
}

pub fn log_gas(name: &str, gas: u64, pricing: GasPricing) {
    info!(name, gas, "\t{name}(): {gas} {}", pricing.format_cost(gas));
}

fn with_thousands_separators(value: u128) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
