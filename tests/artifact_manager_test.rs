use std::fs;
use tailor::engine::{COLUMNS_FILE, ENCODERS_FILE, MODEL_FILE};
use tailor::{
    ArtifactError, ArtifactInfo, ArtifactManager, ModelStatus, PersonalizationOrchestrator,
    PropertyStore,
};

fn write_bundle(manager: &ArtifactManager, name: &str) -> std::io::Result<()> {
    let dir = manager.bundle_dir(name);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(MODEL_FILE), b"not really a graph")?;
    fs::write(dir.join(COLUMNS_FILE), r#"["Age", "Gender"]"#)?;
    fs::write(dir.join(ENCODERS_FILE), r#"{"Gender": {"female": 0, "male": 1}}"#)?;
    Ok(())
}

#[tokio::test]
async fn test_cached_bundle_needs_no_download() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let manager = ArtifactManager::new(tmp.path())?;
    write_bundle(&manager, "engagement")?;

    // Nothing listens on the discard port; a download attempt would fail.
    let info = ArtifactInfo::new("engagement", "http://127.0.0.1:9");
    let loader = manager.ensure_downloaded(&info).await?;
    assert_eq!(loader.dir(), manager.bundle_dir("engagement"));
    assert!(loader.model_path().ends_with("engagement/model.onnx"));
    Ok(())
}

#[tokio::test]
async fn test_failed_download_leaves_no_partial_bundle() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let manager = ArtifactManager::new(tmp.path())?;

    let info = ArtifactInfo::new("engagement", "http://127.0.0.1:9");
    let result = manager.download(&info).await;
    assert!(matches!(result, Err(ArtifactError::DownloadError(_))));
    assert!(!manager.is_downloaded("engagement"));
    assert!(!manager.bundle_dir("engagement").join(MODEL_FILE).exists());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_graph_puts_orchestrator_in_error() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let manager = ArtifactManager::new(tmp.path())?;
    write_bundle(&manager, "engagement")?;

    let orchestrator = PersonalizationOrchestrator::new(std::sync::Arc::new(PropertyStore::new()));
    let result = orchestrator.initialize(&manager.loader("engagement")?).await;
    assert!(result.is_err());
    assert_eq!(orchestrator.model_status(), ModelStatus::Error);
    assert!(orchestrator.client().failure().is_some());
    Ok(())
}
