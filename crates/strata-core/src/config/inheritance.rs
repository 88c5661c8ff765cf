//! `extends` chains: reference loading, cycle detection, and depth limits
//!
//! A layer may name a parent with `extends = "<reference>"`. The reference is
//! classified by shape:
//!
//! - `https://...` or `http://...` is a remote locator
//! - an absolute path, or one starting with `./` or `../`, or ending in
//!   `.toml` is a local file, relative to the referencing file's directory
//! - anything else is a profile name under the profile storage directory
//!
//! Profile names always load as profiles. Files and remote locators are
//! validated as the same kind of layer as the one that references them, so
//! a project may extend a shared project configuration.
//!
//! [`resolve_inheritance`] walks the chain through a [`ReferenceLoader`] and
//! merges it ancestor-first. All cycle and depth bookkeeping lives there, so
//! loaders only turn one reference into one node.

use crate::config::merge::merge;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use strata_fs::{NormalizedPath, validate_path_identifier};
use strata_meta::{LayerKind, Tree, parse_layer, read_layer, validate_layer};
use tokio::sync::Mutex;

/// Longest `extends` chain that resolves; one more link fails.
pub const MAX_INHERITANCE_DEPTH: usize = 10;

/// A loaded configuration awaiting inheritance resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceNode {
    /// The schema the tree was validated against
    pub kind: LayerKind,
    /// The tree with `extends` already removed
    pub tree: Tree,
    pub extends: Option<String>,
    /// Stable identity of the source (file path or URL), used for cycles
    pub origin: Option<String>,
    /// Directory that relative references in this node resolve against
    pub base_dir: Option<NormalizedPath>,
}

impl InheritanceNode {
    /// Split the `extends` key out of `tree`.
    pub fn new(
        kind: LayerKind,
        mut tree: Tree,
        origin: Option<String>,
        base_dir: Option<NormalizedPath>,
    ) -> Self {
        let extends = match tree.remove("extends") {
            Some(Value::String(reference)) => Some(reference),
            _ => None,
        };
        Self {
            kind,
            tree,
            extends,
            origin,
            base_dir,
        }
    }

    /// Node for a file on disk; relative references resolve next to it.
    ///
    /// The path is cleaned first so that every spelling of one file shares
    /// a single identity.
    pub fn from_file(kind: LayerKind, tree: Tree, path: &NormalizedPath) -> Self {
        let path = path.clean();
        Self::new(kind, tree, Some(path.as_str().to_string()), path.parent())
    }
}

/// The shape of an `extends` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    Url(&'a str),
    Path(&'a str),
    Name(&'a str),
}

impl<'a> Reference<'a> {
    pub fn classify(reference: &'a str) -> Self {
        if reference.starts_with("https://") || reference.starts_with("http://") {
            Self::Url(reference)
        } else if Path::new(reference).is_absolute()
            || reference.starts_with('/')
            || reference.starts_with("./")
            || reference.starts_with("../")
            || reference.ends_with(".toml")
        {
            Self::Path(reference)
        } else {
            Self::Name(reference)
        }
    }
}

/// Turns one reference into one node.
#[async_trait]
pub trait ReferenceLoader: Send + Sync {
    /// Load `reference`, resolving relative paths against `base_dir`.
    ///
    /// `kind` is the kind of the layer holding the reference.
    async fn load(
        &self,
        reference: &str,
        base_dir: Option<&NormalizedPath>,
        kind: LayerKind,
    ) -> Result<InheritanceNode>;
}

/// Loads profile names and local files.
#[derive(Debug, Clone)]
pub struct LocalReferenceLoader {
    profiles_dir: NormalizedPath,
}

impl LocalReferenceLoader {
    pub fn new(profiles_dir: NormalizedPath) -> Self {
        Self { profiles_dir }
    }

    /// The file a reference points at, with `.` and `..` resolved.
    pub fn locate(&self, reference: &str, base_dir: Option<&NormalizedPath>) -> Result<NormalizedPath> {
        match Reference::classify(reference) {
            Reference::Name(name) => {
                validate_path_identifier(name, "Profile name").map_err(|reason| {
                    Error::InvalidReference {
                        reference: reference.to_string(),
                        reason,
                    }
                })?;
                Ok(self.profiles_dir.join(&format!("{name}.toml")).clean())
            }
            Reference::Path(path) if Path::new(path).is_absolute() || path.starts_with('/') => {
                Ok(NormalizedPath::new(path).clean())
            }
            Reference::Path(path) => {
                let base = base_dir.unwrap_or(&self.profiles_dir);
                Ok(base.join(path).clean())
            }
            Reference::Url(_) => Err(Error::InvalidReference {
                reference: reference.to_string(),
                reason: "remote references need a remote loader".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ReferenceLoader for LocalReferenceLoader {
    async fn load(
        &self,
        reference: &str,
        base_dir: Option<&NormalizedPath>,
        kind: LayerKind,
    ) -> Result<InheritanceNode> {
        let path = self.locate(reference, base_dir)?;
        let kind = match Reference::classify(reference) {
            Reference::Name(_) => LayerKind::Profile,
            Reference::Path(_) | Reference::Url(_) => kind,
        };
        tracing::debug!(reference, %path, %kind, "Loading inherited configuration");
        let tree = read_layer(&path)
            .await?
            .ok_or_else(|| Error::ReferenceNotFound {
                reference: reference.to_string(),
            })?;
        let tree = validate_layer(kind, tree, &path)?;
        Ok(InheritanceNode::from_file(kind, tree, &path))
    }
}

/// Fetches the text of a remote configuration.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// The default fetcher: strata performs no network access on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

#[async_trait]
impl RemoteFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(Error::RemoteUnavailable {
            reference: url.to_string(),
        })
    }
}

/// Loads remote locators through a pluggable [`RemoteFetcher`].
#[derive(Clone)]
pub struct RemoteReferenceLoader {
    fetcher: Arc<dyn RemoteFetcher>,
}

impl RemoteReferenceLoader {
    pub fn new(fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineFetcher))
    }
}

#[async_trait]
impl ReferenceLoader for RemoteReferenceLoader {
    async fn load(
        &self,
        reference: &str,
        _base_dir: Option<&NormalizedPath>,
        kind: LayerKind,
    ) -> Result<InheritanceNode> {
        tracing::debug!(reference, "Fetching remote configuration");
        let content = self.fetcher.fetch(reference).await?;
        let source = NormalizedPath::new(reference);
        let tree = parse_layer(&content, &source)?;
        let tree = validate_layer(kind, tree, &source)?;
        Ok(InheritanceNode::new(kind, tree, Some(reference.to_string()), None))
    }
}

/// Routes each reference to the local or remote loader by its shape.
pub struct ReferenceDispatcher {
    local: Box<dyn ReferenceLoader>,
    remote: Box<dyn ReferenceLoader>,
}

impl ReferenceDispatcher {
    pub fn new(local: impl ReferenceLoader + 'static, remote: impl ReferenceLoader + 'static) -> Self {
        Self {
            local: Box::new(local),
            remote: Box::new(remote),
        }
    }
}

#[async_trait]
impl ReferenceLoader for ReferenceDispatcher {
    async fn load(
        &self,
        reference: &str,
        base_dir: Option<&NormalizedPath>,
        kind: LayerKind,
    ) -> Result<InheritanceNode> {
        match Reference::classify(reference) {
            Reference::Url(_) => self.remote.load(reference, base_dir, kind).await,
            Reference::Path(_) | Reference::Name(_) => {
                self.local.load(reference, base_dir, kind).await
            }
        }
    }
}

/// Memoizes another loader for the lifetime of one resolution.
///
/// Entries are keyed by the literal reference, the directory it was
/// resolved from and the referencing kind, so `./base.toml` in two
/// different directories stays distinct.
pub struct CachingLoader<L> {
    inner: L,
    cache: Mutex<HashMap<CacheKey, InheritanceNode>>,
}

type CacheKey = (String, Option<NormalizedPath>, LayerKind);

impl<L: ReferenceLoader> CachingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct references loaded so far.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

#[async_trait]
impl<L: ReferenceLoader> ReferenceLoader for CachingLoader<L> {
    async fn load(
        &self,
        reference: &str,
        base_dir: Option<&NormalizedPath>,
        kind: LayerKind,
    ) -> Result<InheritanceNode> {
        let key = match Reference::classify(reference) {
            Reference::Path(_) => (reference.to_string(), base_dir.cloned(), kind),
            Reference::Url(_) => (reference.to_string(), None, kind),
            Reference::Name(_) => (reference.to_string(), None, LayerKind::Profile),
        };

        let mut cache = self.cache.lock().await;
        if let Some(node) = cache.get(&key) {
            tracing::trace!(reference, "Inheritance cache hit");
            return Ok(node.clone());
        }
        let node = self.inner.load(reference, base_dir, kind).await?;
        cache.insert(key, node.clone());
        Ok(node)
    }
}

/// The merged result of an `extends` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Inherited {
    /// Ancestor-first merge with `extends` removed
    pub tree: Tree,
    /// References followed, nearest parent first
    pub chain: Vec<String>,
}

/// Follow `node`'s `extends` chain and merge it ancestor-first.
///
/// Fails with [`Error::CircularInheritance`] when a source repeats and with
/// [`Error::MaxDepthExceeded`] when more than [`MAX_INHERITANCE_DEPTH`] links
/// would be followed.
pub async fn resolve_inheritance(
    node: InheritanceNode,
    loader: &dyn ReferenceLoader,
) -> Result<Inherited> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut trail: Vec<String> = Vec::new();
    if let Some(origin) = &node.origin {
        visited.insert(origin.clone());
        trail.push(origin.clone());
    }

    let mut chain = Vec::new();
    let mut next = node.extends.clone();
    let mut base_dir = node.base_dir.clone();
    let mut kind = node.kind;
    let mut lineage = vec![node.tree];

    while let Some(reference) = next {
        if chain.len() == MAX_INHERITANCE_DEPTH {
            trail.push(reference);
            return Err(Error::MaxDepthExceeded {
                max: MAX_INHERITANCE_DEPTH,
                chain: trail,
            });
        }

        let parent = loader.load(&reference, base_dir.as_ref(), kind).await?;
        let identity = parent.origin.clone().unwrap_or_else(|| reference.clone());
        trail.push(reference.clone());
        if !visited.insert(identity) {
            return Err(Error::CircularInheritance {
                reference,
                chain: trail,
            });
        }

        tracing::debug!(reference, depth = chain.len() + 1, "Following extends");
        chain.push(reference);
        next = parent.extends;
        base_dir = parent.base_dir;
        kind = parent.kind;
        lineage.push(parent.tree);
    }

    Ok(Inherited {
        tree: merge(lineage.iter().rev()),
        chain,
    })
}
