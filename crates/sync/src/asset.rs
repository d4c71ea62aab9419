use wheelhouse_catalog::NewArtifact;
use wheelhouse_index::{Asset, MD5, SHA256};

/// Turn the index's description of a wheel into something the catalog can
/// store. Assets missing either digest can't be registered.
pub(crate) fn new_artifact(asset: &Asset) -> Option<NewArtifact> {
    let (Some(md5), Some(sha256)) = (asset.digest(MD5), asset.digest(SHA256)) else {
        tracing::warn!(filename = %asset.filename, "index reported asset without md5 and sha256 digests");
        return None;
    };
    Some(NewArtifact {
        filename: asset.filename.clone(),
        url: asset.url.clone(),
        size: asset.size,
        md5,
        sha256,
        uploaded: asset.upload_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::UtcDateTime;

    fn asset() -> Asset {
        Asset::new("a-1-py3-none-any.whl", "https://x/a", 3, "AB", "CD", UtcDateTime::UNIX_EPOCH)
    }

    #[test]
    fn test_digests_are_lowercased() {
        let artifact = new_artifact(&asset()).unwrap();
        assert_eq!(artifact.md5, "ab");
        assert_eq!(artifact.sha256, "cd");
        assert_eq!(artifact.size, 3);
    }

    #[rstest]
    #[case(MD5)]
    #[case(SHA256)]
    fn test_digests_are_required(#[case] missing: &str) {
        let mut asset = asset();
        asset.digests.remove(missing);
        assert_eq!(new_artifact(&asset), None);
    }
}
