use std::path::PathBuf;

use face_ngin::resources::{AssetFetcher, FsFetcher, ResourceKey, load_binary};

/// Writes `bytes` below `./assets/` and removes the file again on drop.
struct AssetFile {
    path: PathBuf,
}

impl AssetFile {
    fn create(key: &str, bytes: &[u8]) -> Self {
        let path = PathBuf::from("./assets").join(key);
        std::fs::create_dir_all(path.parent().expect("key has a directory"))
            .expect("asset directory is writable");
        std::fs::write(&path, bytes).expect("asset file is writable");
        Self { path }
    }
}

impl Drop for AssetFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[tokio::test]
async fn should_fail_for_a_missing_asset() {
    let result = FsFetcher
        .fetch(&ResourceKey::new("models/missing/nothing.json"))
        .await;
    assert!(result.is_err());
    assert!(load_binary("models/missing/nothing.json").await.is_err());
}

#[tokio::test]
async fn should_return_the_bytes_of_an_asset_on_disk() {
    let key = "fetcher-test/frame.json";
    let contents = br#"{"vertices":[0,1,2]}"#;
    let _file = AssetFile::create(key, contents);

    let asset = FsFetcher
        .fetch(&ResourceKey::new(key))
        .await
        .expect("asset was written before fetching");

    assert_eq!(asset.bytes(), Some(&contents[..]));
    assert!(asset.clips().is_empty());
    assert_eq!(load_binary(key).await.expect("file exists"), contents.to_vec());
}
