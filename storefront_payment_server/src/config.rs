use std::{env, time::Duration};

use log::*;
use sps_common::{Money, Secret};
use storefront_payment_engine::{gateway::GatewayConfig, PricingPolicy};

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8360;
const DEFAULT_GATEWAY_BASE_URL: &str = "https://sandbox.epay.example.com";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Tax rate and delivery charge applied at checkout. Totals are fixed on the order at creation time.
    pub pricing: PricingPolicy,
    /// Everything needed to talk to the payment gateway. Constructed once, here, and passed into the adapter; the
    /// adapter itself holds no global state.
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            pricing: PricingPolicy { tax_percent: 0.0, delivery_charge: Money::from(0) },
            gateway: GatewayConfig {
                product_code: String::default(),
                secret_key: Secret::default(),
                base_url: DEFAULT_GATEWAY_BASE_URL.to_string(),
                success_url: String::default(),
                failure_url: String::default(),
                poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            },
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPS_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let pricing = pricing_from_env();
        let gateway = gateway_config_from_env();
        Self { host, port, database_url, pricing, gateway }
    }
}

fn pricing_from_env() -> PricingPolicy {
    let tax_percent = env::var("SPS_TAX_PERCENT")
        .map_err(|_| info!("🪛️ SPS_TAX_PERCENT is not set. No tax will be added to orders."))
        .and_then(|s| {
            s.parse::<f64>().map_err(|e| warn!("🪛️ Invalid configuration value for SPS_TAX_PERCENT. {e}"))
        })
        .ok()
        .unwrap_or(0.0);
    // The delivery charge is given in minor units (cents).
    let delivery_charge = env::var("SPS_DELIVERY_CHARGE")
        .map_err(|_| info!("🪛️ SPS_DELIVERY_CHARGE is not set. Delivery will be free."))
        .and_then(|s| {
            s.parse::<i64>().map_err(|e| warn!("🪛️ Invalid configuration value for SPS_DELIVERY_CHARGE. {e}"))
        })
        .map(Money::from)
        .ok()
        .unwrap_or_else(|| Money::from(0));
    PricingPolicy { tax_percent, delivery_charge }
}

fn gateway_config_from_env() -> GatewayConfig {
    let product_code = env::var("SPS_GATEWAY_PRODUCT_CODE").ok().unwrap_or_else(|| {
        error!("🪛️ SPS_GATEWAY_PRODUCT_CODE is not set. Please set it to your merchant code on the gateway.");
        String::default()
    });
    let secret_key = env::var("SPS_GATEWAY_SECRET_KEY").ok().unwrap_or_else(|| {
        error!("🪛️ SPS_GATEWAY_SECRET_KEY is not set. Please set it to the shared signing key for the gateway.");
        String::default()
    });
    let secret_key = Secret::new(secret_key);
    let base_url = env::var("SPS_GATEWAY_BASE_URL").ok().unwrap_or_else(|| {
        info!("🪛️ SPS_GATEWAY_BASE_URL is not set. Using the sandbox gateway at {DEFAULT_GATEWAY_BASE_URL}.");
        DEFAULT_GATEWAY_BASE_URL.to_string()
    });
    let success_url = env::var("SPS_GATEWAY_SUCCESS_URL").ok().unwrap_or_else(|| {
        warn!("🪛️ SPS_GATEWAY_SUCCESS_URL is not set. The gateway will not know where to send customers back to.");
        String::default()
    });
    let failure_url = env::var("SPS_GATEWAY_FAILURE_URL").ok().unwrap_or_else(|| {
        warn!("🪛️ SPS_GATEWAY_FAILURE_URL is not set. The gateway will not know where to send customers back to.");
        String::default()
    });
    let poll_timeout = env::var("SPS_GATEWAY_POLL_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ SPS_GATEWAY_POLL_TIMEOUT is not set. Using the default value of {DEFAULT_POLL_TIMEOUT_SECS} \
                 seconds."
            )
        })
        .and_then(|s| {
            s.parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for SPS_GATEWAY_POLL_TIMEOUT. {e}"))
        })
        .ok()
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS));
    GatewayConfig { product_code, secret_key, base_url, success_url, failure_url, poll_timeout }
}
