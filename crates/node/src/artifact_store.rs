//! An artifact registry backed by the Hardhat or Truffle artifact files on disk.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
};
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use mtk_common::{iterators::ArtifactFilesIterator, types::ArtifactName};
use mtk_format::contract::DeployedContract;
use mtk_node_interaction::{ArtifactRegistry, EthereumNode, LookupError};

/// The parts of an artifact file the store needs.
#[derive(Debug, Deserialize)]
struct ArtifactFile {
    abi: JsonAbi,
    bytecode: ArtifactBytecode,
}

/// Hardhat and Truffle store the creation code as a hex string, Foundry as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

/// A parsed contract artifact.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub abi: Arc<JsonAbi>,
    pub bytecode: Bytes,
}

impl From<ArtifactFile> for Artifact {
    fn from(value: ArtifactFile) -> Self {
        let bytecode = match value.bytecode {
            ArtifactBytecode::Hex(bytes) | ArtifactBytecode::Object { object: bytes } => bytes,
        };
        Self {
            abi: Arc::new(value.abi),
            bytecode,
        }
    }
}

/// Resolves artifact names into instances through an [`EthereumNode`].
///
/// Artifacts are indexed by file name when the store is created and only parsed the first time
/// they're needed. The store also remembers the canonical deployed instance of every artifact.
pub struct ArtifactStore {
    node: Arc<dyn EthereumNode>,
    artifact_paths: HashMap<ArtifactName, PathBuf>,
    artifacts: Mutex<HashMap<ArtifactName, Arc<Artifact>>>,
    canonical_instances: Mutex<HashMap<ArtifactName, DeployedContract>>,
}

impl ArtifactStore {
    pub fn new(node: Arc<dyn EthereumNode>, artifacts_directory: impl AsRef<Path>) -> Result<Self> {
        let artifacts_directory = artifacts_directory.as_ref();
        if !artifacts_directory.is_dir() {
            bail!(
                "The artifacts directory {} does not exist",
                artifacts_directory.display()
            );
        }

        // Shallower paths win over nested copies of the same contract, e.g. the ones under
        // `@openzeppelin/`, and equally deep paths are taken in lexical order.
        let mut paths = ArtifactFilesIterator::new(artifacts_directory).collect::<Vec<_>>();
        paths.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });

        let mut artifact_paths = HashMap::<ArtifactName, PathBuf>::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match artifact_paths.entry(ArtifactName::from(name)) {
                Entry::Occupied(entry) => warn!(
                    name,
                    kept = %entry.get().display(),
                    ignored = %path.display(),
                    "Found more than one artifact with the same name"
                ),
                Entry::Vacant(entry) => {
                    entry.insert(path);
                }
            }
        }

        info!(
            artifacts = artifact_paths.len(),
            directory = %artifacts_directory.display(),
            "Indexed the contract artifacts"
        );

        Ok(Self {
            node,
            artifact_paths,
            artifacts: Default::default(),
            canonical_instances: Default::default(),
        })
    }

    /// The names of all of the artifacts the store knows about.
    pub fn artifact_names(&self) -> impl Iterator<Item = &ArtifactName> {
        self.artifact_paths.keys()
    }

    /// Returns the parsed artifact, reading it from disk the first time it's requested.
    pub fn artifact(&self, name: &ArtifactName) -> Result<Arc<Artifact>> {
        if let Some(artifact) = self
            .artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(artifact.clone());
        }

        let path = self
            .artifact_paths
            .get(name)
            .with_context(|| format!("Could not find artifacts for {name}"))?;
        let file = File::open(path)
            .with_context(|| format!("Failed to open the artifact file {}", path.display()))?;
        let artifact_file: ArtifactFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse the artifact file {}", path.display()))?;
        debug!(%name, path = %path.display(), "Loaded the artifact");

        let artifact = Arc::new(Artifact::from(artifact_file));
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), artifact.clone());
        Ok(artifact)
    }

    async fn instance_at(
        &self,
        name: ArtifactName,
        address: Address,
    ) -> Result<DeployedContract, LookupError> {
        let artifact = self.artifact(&name)?;
        let code = self
            .node
            .code_at(address)
            .await
            .with_context(|| format!("Failed to get the code at {address}"))?;
        if code.is_empty() {
            return Err(LookupError::Message(format!(
                "Cannot create instance of {name}; no code at address {address}"
            )));
        }
        Ok(DeployedContract::new(
            name,
            address,
            artifact.abi.clone(),
            None,
        ))
    }

    fn canonical_instance(&self, name: &ArtifactName) -> Option<DeployedContract> {
        self.canonical_instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl ArtifactRegistry for ArtifactStore {
    fn at(
        &self,
        name: ArtifactName,
        address: Address,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>> {
        Box::pin(self.instance_at(name, address))
    }

    fn deployed(
        &self,
        name: ArtifactName,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>> {
        Box::pin(async move {
            // Unknown artifacts must fail as such rather than as a missing instance.
            self.artifact(&name)?;

            let Some(instance) = self.canonical_instance(&name) else {
                return Err(LookupError::no_deployed_instance(&name));
            };
            let mut contract = self.instance_at(name, instance.address).await?;
            contract.transaction_hash = instance.transaction_hash;
            Ok(contract)
        })
    }

    fn deploy(
        &self,
        name: ArtifactName,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract>> + Send + '_>> {
        Box::pin(async move {
            let artifact = self.artifact(&name)?;
            if artifact.bytecode.is_empty() {
                bail!("{name} has no bytecode and can't be deployed, is it abstract or an interface?");
            }

            let mut code = artifact.bytecode.to_vec();
            match artifact.abi.constructor() {
                Some(constructor) => code.extend(
                    constructor
                        .abi_encode_input(&args)
                        .with_context(|| format!("Failed to encode the constructor arguments of {name}"))?,
                ),
                None if !args.is_empty() => bail!(
                    "{name} has no constructor but {} arguments were provided",
                    args.len()
                ),
                None => {}
            }

            let transaction = TransactionBuilder::<Ethereum>::with_deploy_code(
                TransactionRequest::default().from(self.node.default_account()),
                code,
            );
            let receipt = self
                .node
                .execute_transaction(transaction)
                .await
                .inspect_err(|err| error!(?err, %name, "Failed to deploy the contract"))?;
            let address = receipt
                .contract_address
                .with_context(|| format!("The deployment of {name} did not create a contract"))?;

            info!(%name, %address, gas_used = receipt.gas_used, "Deployed the contract");
            Ok(DeployedContract::new(
                name,
                address,
                artifact.abi.clone(),
                Some(receipt.transaction_hash),
            ))
        })
    }

    fn set_as_deployed(&self, contract: &DeployedContract) -> Result<()> {
        self.canonical_instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(contract.name.clone(), contract.clone());
        Ok(())
    }
}
