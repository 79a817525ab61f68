//! Asset loading.
//!
//! Assets are fetched by an [`AssetFetcher`] collaborator, one independent
//! future per [`ResourceKey`]. Parsing the fetched bytes is the collaborator's
//! business; the core only needs an opaque [`AssetHandle`] plus the animation
//! clips an asset may carry. Completions are fed into a
//! [`join::JoinBarrier`], which assembles the scene once everything arrived.

use std::{fmt, sync::Arc};

use futures::{
    FutureExt,
    future::LocalBoxFuture,
    stream::FuturesUnordered,
};

use crate::resources::animation::AnimationClip;

pub mod animation;
pub mod join;

/// Identity of a fetchable asset; in practice its path below the asset root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A loaded asset as far as the core is concerned.
///
/// Geometry and materials stay opaque and are only handed back to the
/// renderer. Skinned assets expose their clips so players can be bound.
pub trait Asset: fmt::Debug {
    fn clips(&self) -> &[AnimationClip] {
        &[]
    }

    /// The unparsed bytes, for assets that keep them around.
    fn bytes(&self) -> Option<&[u8]> {
        None
    }
}

pub type AssetHandle = Arc<dyn Asset>;

/// The bytes of an asset exactly as they were fetched.
#[derive(Debug)]
pub struct RawAsset {
    pub key: ResourceKey,
    pub bytes: Vec<u8>,
}

impl Asset for RawAsset {
    fn bytes(&self) -> Option<&[u8]> {
        Some(&self.bytes)
    }
}

/// The resource-fetch collaborator.
///
/// Each call starts one independent load. Implementations report failures
/// through the returned result; they never panic on a missing file.
pub trait AssetFetcher {
    fn fetch(&self, key: &ResourceKey) -> LocalBoxFuture<'static, anyhow::Result<AssetHandle>>;
}

/// A finished fetch, tagged with the key it was issued for.
pub type Completion = (ResourceKey, anyhow::Result<AssetHandle>);

/// In-flight loads; completions come out in whatever order they finish.
pub type PendingLoads = FuturesUnordered<LocalBoxFuture<'static, Completion>>;

/// Issues one fetch per key and collects them into a single unordered stream.
pub fn load_all<F: AssetFetcher + ?Sized>(fetcher: &F, keys: &[ResourceKey]) -> PendingLoads {
    keys.iter()
        .map(|key| {
            let key = key.clone();
            let fut = fetcher.fetch(&key);
            async move {
                let result = fut.await;
                if let Err(e) = &result {
                    log::warn!("Fetching {} failed: {:#}", key, e);
                } else {
                    log::debug!("Fetched {}", key);
                }
                (key, result)
            }
            .boxed_local()
        })
        .collect()
}

/// Reads assets from `./assets` natively and from `<origin>/assets` on the web.
#[derive(Clone, Debug, Default)]
pub struct FsFetcher;

impl AssetFetcher for FsFetcher {
    fn fetch(&self, key: &ResourceKey) -> LocalBoxFuture<'static, anyhow::Result<AssetHandle>> {
        let key = key.clone();
        async move {
            let bytes = load_binary(key.as_str()).await?;
            Ok(Arc::new(RawAsset { key, bytes }) as AssetHandle)
        }
        .boxed_local()
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("window has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(path).await?
    };

    Ok(data)
}
