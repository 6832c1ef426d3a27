/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use log::{debug, info};
use yaml_rust::yaml;

use crate::config::{Environment, HttpClientConfig, InfluxdbReporterConfig, Settings};
use crate::delivery::{HttpDelivery, HttpTransport, ReqwestTransport};
use crate::encode::encode;
use crate::types::PeriodSnapshot;

/// Interface the host metrics framework drives a reporter through.
#[async_trait]
pub trait MetricReporter: Send + Sync {
    /// Called once per reporting period. Never fails, problems are logged.
    async fn report_period_snapshot(&self, snapshot: &PeriodSnapshot);

    /// Replace the whole configuration. On error the active one is kept.
    fn reconfigure(&self, config: &yaml::Hash) -> anyhow::Result<()>;

    fn stop(&self);
}

type TransportBuilder =
    Box<dyn Fn(&HttpClientConfig) -> anyhow::Result<Arc<dyn HttpTransport>> + Send + Sync>;

struct ReporterState {
    settings: Arc<Settings>,
    delivery: HttpDelivery,
}

pub struct InfluxdbReporter {
    environment: Environment,
    build_transport: TransportBuilder,
    state: ArcSwap<ReporterState>,
}

impl InfluxdbReporter {
    pub fn new(environment: Environment, config: &yaml::Hash) -> anyhow::Result<Self> {
        InfluxdbReporter::with_transport_builder(
            environment,
            config,
            Box::new(
                |c: &HttpClientConfig| -> anyhow::Result<Arc<dyn HttpTransport>> {
                    let transport = ReqwestTransport::new(c)?;
                    Ok(Arc::new(transport))
                },
            ),
        )
    }

    /// Use a custom transport, built again on every reconfiguration.
    pub fn with_transport_builder(
        environment: Environment,
        config: &yaml::Hash,
        build_transport: TransportBuilder,
    ) -> anyhow::Result<Self> {
        let state = build_state(&environment, config, &build_transport)?;
        info!("influxdb reporter started, posting to {}", state.settings.url());
        Ok(InfluxdbReporter {
            environment,
            build_transport,
            state: ArcSwap::from_pointee(state),
        })
    }

    /// The settings in use right now.
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.state.load().settings)
    }
}

fn build_state(
    environment: &Environment,
    config: &yaml::Hash,
    build_transport: &TransportBuilder,
) -> anyhow::Result<ReporterState> {
    let config = InfluxdbReporterConfig::parse(config)?;
    let settings = config.resolve(environment)?;
    let transport = build_transport(&config.client)?;
    let delivery = HttpDelivery::new(&settings, transport);
    Ok(ReporterState {
        settings: Arc::new(settings),
        delivery,
    })
}

#[async_trait]
impl MetricReporter for InfluxdbReporter {
    async fn report_period_snapshot(&self, snapshot: &PeriodSnapshot) {
        let state = self.state.load_full();
        let payload = encode(snapshot, &state.settings);
        // the error has been logged already
        let _ = state.delivery.deliver(payload).await;
    }

    fn reconfigure(&self, config: &yaml::Hash) -> anyhow::Result<()> {
        let state = build_state(&self.environment, config, &self.build_transport)?;
        info!(
            "influxdb reporter reconfigured, posting to {}",
            state.settings.url()
        );
        self.state.store(Arc::new(state));
        Ok(())
    }

    fn stop(&self) {
        debug!("influxdb reporter stopped");
    }
}
