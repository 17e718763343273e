//! The deployment cache: every (artifact, address) pair resolves to one shared contract instance.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use alloy::{dyn_abi::DynSolValue, primitives::Address};
use anyhow::{Context as _, Result};
use futures::{
    FutureExt as _,
    future::{BoxFuture, Shared},
};
use tracing::{debug, info, instrument};

use mtk_common::types::ArtifactName;
use mtk_format::contract::DeployedContract;
use mtk_node_interaction::{ArtifactRegistry, LookupError};

use crate::{
    error::DeploymentError,
    reporting::{DeploymentThresholds, log_deployment_time},
};

type DeploymentFuture = Shared<BoxFuture<'static, Result<Arc<DeployedContract>, DeploymentError>>>;

/// A cached lookup or deployment and whether a redeployment has since replaced it.
struct CacheEntry {
    future: DeploymentFuture,
    superseded: Arc<AtomicBool>,
}

impl CacheEntry {
    fn supersede(&self) {
        self.superseded.store(true, Ordering::SeqCst);
    }
}

/// The second half of a cache key: either the canonical instance or one at an explicit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKey {
    Default,
    Address(Address),
}

impl From<Option<Address>> for AddressKey {
    fn from(value: Option<Address>) -> Self {
        value.map_or(Self::Default, Self::Address)
    }
}

/// How to obtain an instance from the cache.
#[derive(Clone, Debug, Default)]
pub struct DeploymentArgs {
    /// Look the instance up at this address instead of using the canonical instance.
    pub address: Option<Address>,
    /// Deploy a new instance even if one is cached or can be looked up.
    pub redeploy: bool,
    /// The constructor arguments used when a new instance is deployed.
    pub args: Vec<DynSolValue>,
}

impl DeploymentArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_redeploy(mut self, redeploy: bool) -> Self {
        self.redeploy = redeploy;
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = DynSolValue>) -> Self {
        self.args = args.into_iter().collect();
        self
    }
}

/// Memoizes contract instances per artifact name and address.
///
/// The first request for a key installs a shared future into the cache before any registry work
/// starts, so every concurrent request for the same key awaits the same lookup or deployment and
/// receives the same [`Arc`]. Failures are cached too, until the key is force-redeployed.
///
/// A deployment whose entry was replaced by a redeployment before it finished doesn't become the
/// canonical instance, so it can't overwrite the instance of the redeployment.
pub struct DeploymentCache {
    registry: Arc<dyn ArtifactRegistry>,
    thresholds: DeploymentThresholds,
    entries: Mutex<HashMap<ArtifactName, HashMap<AddressKey, CacheEntry>>>,
}

impl DeploymentCache {
    pub fn new(registry: Arc<dyn ArtifactRegistry>) -> Self {
        Self::with_thresholds(registry, DeploymentThresholds::default())
    }

    pub fn with_thresholds(
        registry: Arc<dyn ArtifactRegistry>,
        thresholds: DeploymentThresholds,
    ) -> Self {
        Self {
            registry,
            thresholds,
            entries: Default::default(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn ArtifactRegistry> {
        &self.registry
    }

    /// Returns the cached instance for the name and address, looking it up or deploying it on the
    /// first request.
    pub async fn get_deployed_contract(
        &self,
        name: impl Into<ArtifactName>,
        options: DeploymentArgs,
    ) -> Result<Arc<DeployedContract>> {
        let name = name.into();
        let key = AddressKey::from(options.address);

        let future = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let instances = entries.entry(name.clone()).or_default();
            match instances.get(&key) {
                Some(entry) if !options.redeploy => entry.future.clone(),
                _ => {
                    let superseded = Arc::new(AtomicBool::new(false));
                    let future = lookup_or_deploy(
                        self.registry.clone(),
                        self.thresholds,
                        name.clone(),
                        key,
                        options.redeploy,
                        options.args,
                        superseded.clone(),
                    )
                    .boxed()
                    .shared();
                    let entry = CacheEntry {
                        future: future.clone(),
                        superseded,
                    };
                    if let Some(previous) = instances.insert(key, entry) {
                        previous.supersede();
                    }
                    future
                }
            }
        };

        future.await.map_err(Into::into)
    }

    /// Drops the cached instance for the name and address and deploys a new one.
    pub async fn redeploy_contract(
        &self,
        name: impl Into<ArtifactName>,
        options: DeploymentArgs,
    ) -> Result<Arc<DeployedContract>> {
        let name = name.into();
        let key = AddressKey::from(options.address);
        if let Some(instances) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&name)
        {
            if let Some(previous) = instances.remove(&key) {
                previous.supersede();
            }
        }

        self.get_deployed_contract(name, options.with_redeploy(true))
            .await
    }
}

#[instrument(level = "info", skip_all, fields(%name, ?key, redeploy), err)]
async fn lookup_or_deploy(
    registry: Arc<dyn ArtifactRegistry>,
    thresholds: DeploymentThresholds,
    name: ArtifactName,
    key: AddressKey,
    redeploy: bool,
    args: Vec<DynSolValue>,
    superseded: Arc<AtomicBool>,
) -> Result<Arc<DeployedContract>, DeploymentError> {
    let contract = resolve_instance(
        registry,
        thresholds,
        name.clone(),
        key,
        redeploy,
        args,
        &superseded,
    )
    .await
        .with_context(|| format!("Contract {name} not deployed"))?;
    Ok(Arc::new(contract))
}

async fn resolve_instance(
    registry: Arc<dyn ArtifactRegistry>,
    thresholds: DeploymentThresholds,
    name: ArtifactName,
    key: AddressKey,
    redeploy: bool,
    args: Vec<DynSolValue>,
    superseded: &AtomicBool,
) -> Result<DeployedContract> {
    if !redeploy {
        let lookup = match key {
            AddressKey::Default => registry.deployed(name.clone()).await,
            AddressKey::Address(address) => registry.at(name.clone(), address).await,
        };
        match lookup {
            Ok(contract) => {
                debug!(%name, address = %contract.address, "Found an existing instance");
                return Ok(contract);
            }
            Err(LookupError::Opaque(error)) => {
                return Err(error.context(format!("Failed to look up {name}")));
            }
            Err(error) if key != AddressKey::Default && error.is_no_deployed_instance(&name) => {
                return Err(error.into());
            }
            Err(error) => debug!(%name, %error, "No usable instance, deploying a new one"),
        }
    }

    let started = Instant::now();
    let contract = registry.deploy(name.clone(), args).await?;
    if key == AddressKey::Default && superseded.load(Ordering::SeqCst) {
        debug!(%name, address = %contract.address, "A redeployment replaced this instance, not setting it as deployed");
    } else if key == AddressKey::Default {
        registry
            .set_as_deployed(&contract)
            .with_context(|| format!("Failed to set {name} as deployed"))?;
    }
    log_deployment_time(&name, started.elapsed(), thresholds);
    info!(%name, address = %contract.address, "Using the newly deployed instance");
    Ok(contract)
}
